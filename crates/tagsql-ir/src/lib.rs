//! Command IR for tagsql.
//!
//! The frontend reports annotated host records as [`HostField`] lists;
//! [`analyze_command`] turns one record into a [`Command`] that the checker
//! and statement builder in `tagsql-core` consume.

pub mod analyze;
pub mod command;
pub mod error;
pub mod host;
pub mod ident;
pub mod op;
pub mod predicate;
pub mod tag;

pub use analyze::{AnalyzeOptions, ColumnNaming, Directive, analyze_command};
pub use command::{Command, CommandKind};
pub use error::AnalyzeError;
pub use host::{HostField, HostKind, HostType};
pub use ident::{ColumnIdent, RelIdent};
pub use tag::Tag;
