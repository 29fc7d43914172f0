//! Scripted database fixtures for unit and integration tests.

mod catalog;
mod connection;
mod relation;

pub use catalog::{
    HSTORE_OID, MOOD_ARRAY_OID, MOOD_OID, standard_casts, standard_catalog, standard_operators,
    standard_procedures, standard_types,
};
pub use connection::{DEFAULT_SERVER_VERSION, FakeConnection};
pub use relation::{
    FakeColumn, FakeConstraint, FakeIndex, FakeRelation, posts_table, users_table,
};
