//! StatementBuilder and the PostgreSQL statement tree it produces.

mod ast;
mod build;
mod error;
mod render;

#[cfg(test)]
mod tests;

pub use ast::{
    Condition, ConditionItem, ConditionNode, ConflictClause, ConflictDo, Delete, Expr, Insert,
    Join, OnConflict, OrderTerm, Select, Statement, TableRef, Update,
};
pub use build::{ArgSource, BoundStatement, FilterColumn, FilterMap, Lowered, build};
pub use error::BuildError;
pub use render::write_ident;
