//! Observability boundary.

pub mod trace;
