use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Mood of the decoration asked for by a notification body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Celebration,
    Motivation,
    Acknowledgement,
}

/// Catalog of decorative assets, used only to dress up notification bodies.
/// A miss is always acceptable; callers fall back to a fixed image.
pub trait AssetCatalog: Send + Sync {
    /// Pick a random asset URL for `category`, if the catalog has any.
    fn random_asset(&self, category: AssetCategory) -> Option<String>;
}

/// Catalog over a fixed, in-memory set of asset URLs.
pub struct StaticAssetCatalog {
    assets: HashMap<AssetCategory, Vec<String>>,
}

impl StaticAssetCatalog {
    pub fn empty() -> Self {
        Self {
            assets: HashMap::new(),
        }
    }

    /// The stock catalog shipped with the add-on.
    pub fn with_defaults() -> Self {
        let mut assets = HashMap::new();
        assets.insert(
            AssetCategory::Celebration,
            vec![
                "https://assets.buildmood.io/celebration/confetti.gif".to_string(),
                "https://assets.buildmood.io/celebration/fireworks.gif".to_string(),
                "https://assets.buildmood.io/celebration/high_five.gif".to_string(),
            ],
        );
        assets.insert(
            AssetCategory::Motivation,
            vec!["https://assets.buildmood.io/motivation/keep_going.gif".to_string()],
        );
        Self { assets }
    }

    pub fn insert(&mut self, category: AssetCategory, url: impl Into<String>) {
        self.assets.entry(category).or_default().push(url.into());
    }
}

impl AssetCatalog for StaticAssetCatalog {
    fn random_asset(&self, category: AssetCategory) -> Option<String> {
        self.assets
            .get(&category)
            .and_then(|urls| urls.choose(&mut rand::thread_rng()))
            .cloned()
    }
}
