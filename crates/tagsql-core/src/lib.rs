//! Core pipeline for tagsql: catalogue snapshots, relation loading, type
//! compatibility, command checking and statement building.
//!
//! Commands arrive as [`tagsql_ir::Command`] values from the analyzer. The
//! checker validates one command against a live schema through the
//! [`db::Connection`] seam; the builder lowers the checked command into a
//! parameterized PostgreSQL statement.

// public exports are one module level down
pub mod catalog;
pub mod check;
pub mod compat;
pub mod db;
pub mod obs;
pub mod relation;
pub mod sql;

// test
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
