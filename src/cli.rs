use clap::Parser;
use std::path::PathBuf;

use crate::tracker::BuildOutcome;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "buildmood")]
#[command(about = "Replay a sequence of build outcomes through the BuildMood notification core")]
pub struct CliArgs {
    /// Build outcomes to replay, in order (pass|fail)
    #[arg(value_parser = parse_outcome)]
    pub outcomes: Vec<BuildOutcome>,

    /// Path to the persisted configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report this as the installed add-on version instead of the crate version
    #[arg(long)]
    pub plugin_version: Option<String>,
}

fn parse_outcome(token: &str) -> Result<BuildOutcome, String> {
    match token.to_ascii_lowercase().as_str() {
        "pass" | "success" | "ok" => Ok(BuildOutcome::Success),
        "fail" | "failed" => Ok(BuildOutcome::Failed),
        other => Err(format!("expected 'pass' or 'fail', got '{other}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_outcomes() {
        let args = CliArgs::parse_from(["buildmood", "fail", "fail", "pass"]);
        assert_eq!(
            args.outcomes,
            vec![
                BuildOutcome::Failed,
                BuildOutcome::Failed,
                BuildOutcome::Success
            ]
        );
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_cli_parse_with_config_and_version() {
        let args = CliArgs::parse_from([
            "buildmood",
            "pass",
            "--config",
            "/custom/buildmood.toml",
            "--plugin-version",
            "2.1.0",
        ]);
        assert_eq!(args.outcomes, vec![BuildOutcome::Success]);
        assert_eq!(args.config, Some(PathBuf::from("/custom/buildmood.toml")));
        assert_eq!(args.plugin_version, Some("2.1.0".to_string()));
    }

    #[test]
    fn test_cli_rejects_unknown_outcome() {
        let result = CliArgs::try_parse_from(["buildmood", "wat"]);
        assert!(result.is_err());
    }
}
