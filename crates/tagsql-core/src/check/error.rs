use crate::{catalog::CatalogError, compat::Direction, db::ConnectionError};
use thiserror::Error as ThisError;

///
/// CheckError
///
/// Per-command validation failure. The checker stops at the first one.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum CheckError {
    #[error("truth test '{op}' requires a boolean column, '{column}' is not")]
    BadBoolColumn { column: String, op: String },

    #[error("text search column '{column}' has type '{type_name}', expected tsvector")]
    BadTextSearchColumnType { column: String, type_name: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("column '{column}' not found in relation '{relation}'")]
    ColumnNotFound { relation: String, column: String },

    #[error("constraint '{constraint}' not found on relation '{relation}'")]
    ConstraintNotFound { relation: String, constraint: String },

    #[error("constraint '{constraint}' is neither a primary key nor a unique constraint")]
    ConstraintNotUnique { constraint: String },

    #[error("field '{field}' writes column '{column}', which another field already writes")]
    DuplicateColumnBinding { field: String, column: String },

    #[error("relation key '{key}' is already in use; alias the joined relation")]
    DuplicateRelationKey { key: String },

    #[error("'{op}' comparison on column '{column}' requires an array operand")]
    IllegalArrayOperand { column: String, op: String },

    #[error("field '{field}' must be a sequence to be used with '{op}'")]
    IllegalFieldTypeForQuantifier { field: String, op: String },

    #[error("null check on column '{column}', which is NOT NULL")]
    IllegalNullCheck { column: String },

    #[error("optional field '{field}' cannot be compared to NOT NULL column '{column}'")]
    IllegalPointerFieldForNotNullColumn { field: String, column: String },

    #[error("column '{left}' cannot be compared to '{right}' with '{op}'")]
    IncomparableColumns {
        left: String,
        right: String,
        op: String,
    },

    #[error("field '{field}' cannot be compared to column '{column}' with '{op}'")]
    IncomparableFieldColumn {
        field: String,
        column: String,
        op: String,
    },

    #[error("index '{index}' not found on relation '{relation}'")]
    IndexNotFound { relation: String, index: String },

    #[error("index '{index}' is neither unique nor primary")]
    IndexNotUnique { index: String },

    #[error("column '{column}' has no default value")]
    NoColumnDefault { column: String },

    #[error("no record field maps to column '{column}'")]
    NoFieldForColumn { column: String },

    #[error("no unique index on '{relation}' matches columns ({columns})")]
    NoIndexForColumnList { relation: String, columns: String },

    #[error("no single-argument procedure '{func}' accepts type '{type_name}'")]
    NoProcedureForModifier { func: String, type_name: String },

    #[error("relation '{relation}' not found")]
    RelationNotFound { relation: String },

    #[error("field '{field}' ({signature}) cannot be {direction} column '{column}' ({type_name})")]
    UnassignableFieldColumn {
        field: String,
        signature: String,
        column: String,
        type_name: String,
        direction: Direction,
    },

    #[error("column '{column}' has unknown type oid {oid}")]
    UnknownColumnType { column: String, oid: u32 },
}

impl From<ConnectionError> for CheckError {
    fn from(err: ConnectionError) -> Self {
        Self::Catalog(CatalogError::Connection(err))
    }
}

///
/// CheckErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CheckErrorClass {
    /// Introspection failed; fatal for the whole run.
    Catalog,
    SchemaMismatch,
    TypeCompatibility,
}

impl CheckError {
    #[must_use]
    pub const fn class(&self) -> CheckErrorClass {
        match self {
            Self::Catalog(_) => CheckErrorClass::Catalog,

            Self::BadTextSearchColumnType { .. }
            | Self::ColumnNotFound { .. }
            | Self::ConstraintNotFound { .. }
            | Self::ConstraintNotUnique { .. }
            | Self::DuplicateColumnBinding { .. }
            | Self::DuplicateRelationKey { .. }
            | Self::IndexNotFound { .. }
            | Self::IndexNotUnique { .. }
            | Self::NoColumnDefault { .. }
            | Self::NoFieldForColumn { .. }
            | Self::NoIndexForColumnList { .. }
            | Self::NoProcedureForModifier { .. }
            | Self::RelationNotFound { .. }
            | Self::UnknownColumnType { .. } => CheckErrorClass::SchemaMismatch,

            Self::BadBoolColumn { .. }
            | Self::IllegalArrayOperand { .. }
            | Self::IllegalFieldTypeForQuantifier { .. }
            | Self::IllegalNullCheck { .. }
            | Self::IllegalPointerFieldForNotNullColumn { .. }
            | Self::IncomparableColumns { .. }
            | Self::IncomparableFieldColumn { .. }
            | Self::UnassignableFieldColumn { .. } => CheckErrorClass::TypeCompatibility,
        }
    }
}
