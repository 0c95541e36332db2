//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::DevConfig;
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
pub fn parse_config(content: &str) -> Result<DevConfig, ConfigError> {
    let config: DevConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DevConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            entry = "./src/app.js"

            [dev_server]
            bind_address = "127.0.0.1:3000"
            allowed_hosts = ["example.test"]

            [[routes]]
            path = "/"
            name = "Home"
            component = "pages/home.vue"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.entry, "./src/app.js");
        assert_eq!(config.dev_server.allowed_hosts, vec!["example.test"]);
        assert_eq!(config.routes.len(), 1);
        assert!(config.watch);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("entry = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message_lists_all() {
        let err = parse_config(
            r#"
            entry = ""
            [timeouts]
            request_secs = 0
            "#,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Validation failed: entry must not be empty, request timeout must be greater than zero"
        );
    }

    #[test]
    fn test_entry_colliding_with_server_routes_rejected() {
        for text in ["entry = \"/__hot\"", "entry = \"./\""] {
            let err = parse_config(text).unwrap_err();
            assert!(
                matches!(&err, ConfigError::Validation(errors)
                    if matches!(errors.as_slice(), [ValidationError::ReservedEntryUrl(_)])),
                "{text}: {err}"
            );
        }
    }
}
