//! Server configuration.
//!
//! Settings come from an optional JSON file and are then overridden by the
//! `SWITCHBOARD_PREFIX` and `SWITCHBOARD_NAME` environment variables.
//!
//! ```json
//! {
//!   "prefix": "mcp",
//!   "server_name": "switchboard",
//!   "server_version": "0.1.0"
//! }
//! ```

use crate::capability::domain::NamePrefix;
use crate::capability::services::RegistryConfig;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Environment variable overriding the namespace prefix.
pub const PREFIX_ENV: &str = "SWITCHBOARD_PREFIX";

/// Environment variable overriding the advertised server name.
pub const NAME_ENV: &str = "SWITCHBOARD_NAME";

const DEFAULT_SERVER_NAME: &str = "switchboard";

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The configuration document is not valid.
    #[error("failed to parse config: {0}")]
    Parse(#[source] Arc<serde_json::Error>),

    /// The prefix contains characters outside `[A-Za-z0-9_-]`.
    #[error("invalid prefix '{0}': expected letters, digits, '_' or '-'")]
    InvalidPrefix(String),
}

/// Runtime settings for the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Namespace token applied to declared names; `None` disables prefixing.
    pub prefix: Option<String>,
    /// Name advertised during `initialize`.
    pub server_name: String,
    /// Version advertised during `initialize`.
    pub server_version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            server_name: DEFAULT_SERVER_NAME.to_owned(),
            server_version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

impl ServerConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields and
    /// [`ConfigError::InvalidPrefix`] for a malformed prefix.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)
            .map_err(|error| ConfigError::Parse(Arc::new(error)))?;
        config.validated()
    }

    /// Builds a configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefix`] for a malformed prefix.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from variables supplied by `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPrefix`] for a malformed prefix.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides(lookup)
    }

    /// Loads the file at `path`, when given, and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or the
    /// resulting prefix is invalid.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let base = path.map_or_else(
            || Ok(Self::default()),
            |file| Self::from_json_str(&read_config_file(file)?),
        )?;
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Returns the registry settings derived from this configuration.
    #[must_use]
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::new(NamePrefix::new(self.prefix.as_deref()))
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup(PREFIX_ENV) {
            self.prefix = Some(prefix);
        }
        if let Some(name) = lookup(NAME_ENV).filter(|name| !name.trim().is_empty()) {
            self.server_name = name;
        }
        self.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.prefix = self
            .prefix
            .map(|prefix| prefix.trim().to_owned())
            .filter(|prefix| !prefix.is_empty());
        if let Some(prefix) = &self.prefix
            && !prefix
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-')
        {
            return Err(ConfigError::InvalidPrefix(prefix.clone()));
        }
        Ok(self)
    }
}

fn read_config_file(path: &Utf8Path) -> Result<String, ConfigError> {
    let read_error = |source: io::Error| ConfigError::Read {
        path: path.to_string(),
        source: Arc::new(source),
    };
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path.file_name().ok_or_else(|| {
        read_error(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path has no file name",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read_to_string(file_name).map_err(read_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_disable_prefixing() {
        let config = ServerConfig::default();

        assert_eq!(config.prefix, None);
        assert_eq!(config.server_name, "switchboard");
        assert_eq!(config.registry_config().prefix.token(), None);
    }

    #[test]
    fn json_document_sets_every_field() {
        let config = ServerConfig::from_json_str(
            r#"{"prefix": "mcp", "server_name": "demo", "server_version": "9.9.9"}"#,
        )
        .expect("config should parse");

        assert_eq!(config.prefix.as_deref(), Some("mcp"));
        assert_eq!(config.server_name, "demo");
        assert_eq!(config.server_version, "9.9.9");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = ServerConfig::from_json_str(r#"{"prefx": "mcp"}"#)
            .expect_err("typo should be rejected");

        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[rstest]
    #[case("mcp", Some("mcp"))]
    #[case("  ", None)]
    #[case("team-a_1", Some("team-a_1"))]
    fn environment_prefix_is_normalised(#[case] raw: &str, #[case] expected: Option<&str>) {
        let config = ServerConfig::from_lookup(lookup_from(&[(PREFIX_ENV, raw)]))
            .expect("prefix should be accepted");

        assert_eq!(config.prefix.as_deref(), expected);
    }

    #[rstest]
    #[case("my prefix")]
    #[case("mcp.tools")]
    fn malformed_prefixes_are_rejected(#[case] raw: &str) {
        let error = ServerConfig::from_lookup(lookup_from(&[(PREFIX_ENV, raw)]))
            .expect_err("prefix should be rejected");

        assert!(matches!(error, ConfigError::InvalidPrefix(_)));
    }

    #[test]
    fn environment_name_overrides_default() {
        let config = ServerConfig::from_lookup(lookup_from(&[(NAME_ENV, "edge")]))
            .expect("config should build");

        assert_eq!(config.server_name, "edge");
    }

    #[test]
    fn missing_file_reports_read_error() {
        let error = ServerConfig::load(Some(Utf8Path::new("/nonexistent/switchboard.json")))
            .expect_err("missing file should fail");

        assert!(matches!(error, ConfigError::Read { .. }));
    }
}
