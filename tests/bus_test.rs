use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use buildmood::bus::{EventBus, MAX_PUBLISH_DEPTH};
use buildmood::events::{ScopeId, UserEvent, UserEventCategory, UserEventKind};

fn task_event(scope: ScopeId, message: &str) -> UserEvent {
    UserEvent::new(
        UserEventKind::Task,
        UserEventCategory::Neutral,
        message,
        scope,
    )
}

#[test]
fn test_delivery_follows_registration_order() {
    let bus = EventBus::new();
    let scope = ScopeId::next();
    let seen = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second", "third"] {
        let seen = Arc::clone(&seen);
        bus.subscribe(scope, move |_event| {
            seen.lock().unwrap().push(tag);
        });
    }

    bus.publish(&task_event(scope, "hello"));
    assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn test_publish_is_scoped() {
    let bus = EventBus::new();
    let mine = ScopeId::next();
    let other = ScopeId::next();

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    bus.subscribe(other, move |_event| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    bus.publish(&task_event(mine, "not for you"));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_broadcast_reaches_every_scope() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let counter = Arc::clone(&count);
        bus.subscribe(ScopeId::next(), move |_event| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    bus.broadcast(&UserEvent::new(
        UserEventKind::AssetUpdate,
        UserEventCategory::Neutral,
        "refresh",
        ScopeId::next(),
    ));
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn test_no_replay_for_late_subscribers() {
    let bus = EventBus::new();
    let scope = ScopeId::next();

    bus.publish(&task_event(scope, "gone"));

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    bus.subscribe(scope, move |_event| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(count.load(Ordering::SeqCst), 0, "bus must not replay history");
}

#[test]
fn test_unsubscribe_stops_delivery_and_is_idempotent() {
    let bus = EventBus::new();
    let scope = ScopeId::next();

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let handle = bus.subscribe(scope, move |_event| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    bus.publish(&task_event(scope, "one"));
    bus.unsubscribe(handle);
    bus.unsubscribe(handle); // repeated unsubscribe is a no-op
    bus.publish(&task_event(scope, "two"));

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unsubscribe_scope_removes_all_subscriptions() {
    let bus = EventBus::new();
    let scope = ScopeId::next();

    let count = Arc::new(AtomicUsize::new(0));
    for _ in 0..2 {
        let counter = Arc::clone(&count);
        bus.subscribe(scope, move |_event| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
    assert_eq!(bus.subscriber_count(scope), 2);

    bus.unsubscribe_scope(scope);
    assert_eq!(bus.subscriber_count(scope), 0);

    bus.publish(&task_event(scope, "after teardown"));
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn test_reentrant_publish_is_depth_capped() {
    let bus = Arc::new(EventBus::new());
    let scope = ScopeId::next();

    // A handler that republishes unconditionally would recurse forever
    // without the cap; with it, delivery stops at MAX_PUBLISH_DEPTH.
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let reentrant_bus = Arc::clone(&bus);
    bus.subscribe(scope, move |event| {
        counter.fetch_add(1, Ordering::SeqCst);
        reentrant_bus.publish(event);
    });

    bus.publish(&task_event(scope, "echo"));
    assert_eq!(count.load(Ordering::SeqCst), MAX_PUBLISH_DEPTH);
}

#[test]
fn test_handler_may_subscribe_during_publish() {
    let bus = Arc::new(EventBus::new());
    let scope = ScopeId::next();

    let inner_bus = Arc::clone(&bus);
    let added = Arc::new(AtomicUsize::new(0));
    let added_in_handler = Arc::clone(&added);
    bus.subscribe(scope, move |event| {
        let counter = Arc::clone(&added_in_handler);
        inner_bus.subscribe(event.scope, move |_event| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    });

    bus.publish(&task_event(scope, "grow"));
    // The subscriber registered mid-publish sees only later events.
    assert_eq!(added.load(Ordering::SeqCst), 0);
    assert_eq!(bus.subscriber_count(scope), 2);
}
