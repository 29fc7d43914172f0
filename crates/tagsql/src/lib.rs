//! ## Crate layout
//! - `core`: catalogue snapshots, relation loading, type compatibility,
//!   command checking and statement building.
//! - `ir`: host field model, annotation analysis and the command IR.
//! - `utils`: naming and fingerprint helpers.
//!
//! The facade ties them together: a [`Compiler`] takes [`CommandSource`]
//! records, checks them against the live schema behind a
//! [`core::db::Connection`], and returns [`Compiled`] artifacts for code
//! emitters.

pub use tagsql_core as core;
pub use tagsql_ir as ir;
pub use tagsql_utils as utils;

mod artifact;
mod compiler;
mod config;
mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use artifact::{Batch, Compiled, STATEMENT_NAME_PREFIX};
pub use compiler::{CommandSource, Compiler};
pub use config::{CompilerConfig, ConfigError, FailurePolicy, IdentityConfig};
pub use error::{Error, ErrorKind};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Batch, CommandSource, Compiled, Compiler, CompilerConfig, Error, ErrorKind,
        FailurePolicy,
        core::{
            catalog::{CatalogCache, CatalogIdentity},
            db::Connection,
            obs::trace::{TraceEvent, TraceSink},
        },
        ir::{HostField, HostType, Tag},
    };
}
