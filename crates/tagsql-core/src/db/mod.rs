//! Database connection seam.
//!
//! The compiler only issues catalogue introspection queries. Everything goes
//! through [`Connection`], so the pipeline can run against a live server
//! (feature `postgres`) or a scripted fake in tests.

mod connection;
#[cfg(feature = "postgres")]
mod pg;
mod row;

pub use connection::{ConnectOptions, Connection, ConnectionError, QueryParam};
#[cfg(feature = "postgres")]
pub use pg::PgConnection;
pub use row::{Cell, Row};
