use crate::config::ConfigError;
use derive_more::Display;
use serde::Serialize;
use tagsql_core::{
    catalog::CatalogError,
    check::{CheckError, CheckErrorClass},
    sql::BuildError,
};
use tagsql_ir::AnalyzeError;
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind taxonomy.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    /// Command being compiled when the error was raised.
    pub command: Option<String>,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            command: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Catalogue failures end the whole run regardless of failure policy.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self.kind, ErrorKind::Catalog | ErrorKind::Config)
    }
}

impl From<AnalyzeError> for Error {
    fn from(err: AnalyzeError) -> Self {
        Self::new(ErrorKind::Structural, err.to_string())
    }
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        Self::new(ErrorKind::Catalog, err.to_string())
    }
}

impl From<CheckError> for Error {
    fn from(err: CheckError) -> Self {
        let kind = match err.class() {
            CheckErrorClass::Catalog => ErrorKind::Catalog,
            CheckErrorClass::SchemaMismatch => ErrorKind::SchemaMismatch,
            CheckErrorClass::TypeCompatibility => ErrorKind::TypeCompatibility,
        };

        Self::new(kind, err.to_string())
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Self::new(ErrorKind::Build, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, err.to_string())
    }
}

///
/// ErrorKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The command record itself is malformed.
    #[display("structural")]
    Structural,

    /// Introspection failed.
    #[display("catalog")]
    Catalog,

    #[display("schema_mismatch")]
    SchemaMismatch,

    #[display("type_compatibility")]
    TypeCompatibility,

    /// Lowering hit a shape the checker should have rejected.
    #[display("build")]
    Build,

    #[display("config")]
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsql_core::db::ConnectionError;

    #[test]
    fn check_errors_keep_their_class() {
        let err = Error::from(CheckError::RelationNotFound {
            relation: "users".to_string(),
        });
        assert_eq!(err.kind, ErrorKind::SchemaMismatch);
        assert!(!err.is_fatal());

        let err = Error::from(CheckError::IllegalNullCheck {
            column: "email".to_string(),
        });
        assert_eq!(err.kind, ErrorKind::TypeCompatibility);

        let err = Error::from(CheckError::from(ConnectionError::Query {
            message: "timeout".to_string(),
        }));
        assert_eq!(err.kind, ErrorKind::Catalog);
        assert!(err.is_fatal());
    }

    #[test]
    fn command_name_is_attached_without_changing_the_message() {
        let err = Error::from(BuildError::MissingConflictTarget).with_command("InsertPost");

        assert_eq!(err.command.as_deref(), Some("InsertPost"));
        assert_eq!(err.to_string(), "ON CONFLICT DO UPDATE requires a conflict target");
    }
}
