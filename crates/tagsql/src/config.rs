use derive_more::Display;
use serde::{Deserialize, Serialize};
use tagsql_core::{catalog::CatalogIdentity, check::CheckOptions, relation::DEFAULT_NAMESPACE};
use tagsql_ir::{AnalyzeOptions, ColumnNaming};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum ConfigError {
    #[error("invalid value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },

    #[error("config parse failed: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

///
/// FailurePolicy
///
/// What a batch compile does with a command that fails to compile.
/// Catalogue failures abort the batch under either policy.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    #[display("abort")]
    Abort,

    #[display("collect")]
    Collect,
}

///
/// IdentityConfig
///
/// Fixed catalogue cache key. Skips the `current_database()` probe.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    pub address: String,
    pub database: String,
}

impl From<IdentityConfig> for CatalogIdentity {
    fn from(config: IdentityConfig) -> Self {
        Self::new(config.address, config.database)
    }
}

///
/// CompilerConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Namespace for relation names without a qualifier.
    pub default_schema: String,
    pub column_naming: ColumnNaming,
    pub failure_policy: FailurePolicy,

    /// Server address half of the catalogue cache key.
    pub address: String,
    pub identity: Option<IdentityConfig>,
}

impl CompilerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_schema.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "default_schema",
                message: "must not be empty".to_string(),
            });
        }

        if let Some(identity) = &self.identity
            && identity.database.trim().is_empty()
        {
            return Err(ConfigError::Invalid {
                field: "identity.database",
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    #[must_use]
    pub const fn analyze_options(&self) -> AnalyzeOptions {
        AnalyzeOptions {
            column_naming: self.column_naming,
        }
    }

    #[must_use]
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions {
            default_namespace: self.default_schema.clone(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            default_schema: DEFAULT_NAMESPACE.to_string(),
            column_naming: ColumnNaming::default(),
            failure_policy: FailurePolicy::default(),
            address: "localhost:5432".to_string(),
            identity: None,
        }
    }
}
