//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8050");
        assert_eq!(config.campaigns.keywords_dir, PathBuf::from("keywords"));
        assert_eq!(config.campaigns.debounce_ms, 100);
        assert_eq!(config.matching.dnq_fallback_stages, vec!["s3", "s4"]);
        assert!(config.admin.api_key.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = parse_config(
            r#"
            [campaigns]
            keywords_dir = "/srv/keywords"
            debounce_ms = 250

            [matching]
            dnq_fallback_stages = ["s5"]

            [admin]
            api_key = "secret"
            "#,
        )
        .unwrap();
        assert_eq!(config.campaigns.keywords_dir, PathBuf::from("/srv/keywords"));
        assert_eq!(config.campaigns.debounce_ms, 250);
        assert_eq!(config.matching.to_options().dnq_fallback_stages, vec!["s5"]);
        assert_eq!(config.admin.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_config("[campaigns\n"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            parse_config("[listener]\nbind_address = \"nope\""),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            load_config(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
