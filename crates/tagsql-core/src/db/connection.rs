use super::row::Row;
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// QueryParam
///
/// Positional parameter of an introspection query.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryParam<'a> {
    Text(&'a str),
    Oid(u32),
}

///
/// Connection
///
/// Synchronous request/response access to one database session.
///

pub trait Connection {
    fn query(&mut self, sql: &str, params: &[QueryParam<'_>]) -> Result<Vec<Row>, ConnectionError>;
}

impl<C: Connection + ?Sized> Connection for &mut C {
    fn query(&mut self, sql: &str, params: &[QueryParam<'_>]) -> Result<Vec<Row>, ConnectionError> {
        (**self).query(sql, params)
    }
}

///
/// ConnectionError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum ConnectionError {
    #[error("connection failed: {message}")]
    Connect { message: String },

    #[error("column {index}: expected {expected}, found {found}")]
    Decode {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("query failed: {message}")]
    Query { message: String },

    #[error("column {index} has unsupported type '{type_name}'")]
    UnsupportedType { index: usize, type_name: String },
}

///
/// ConnectOptions
///
/// Bounds applied to every introspection session.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConnectOptions {
    pub connect_timeout: Duration,
    /// Server-side `statement_timeout` for every query of the session.
    pub statement_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            statement_timeout: Duration::from_secs(30),
        }
    }
}
