use thiserror::Error as ThisError;

///
/// AnalyzeError
///
/// Structural annotation errors. Raised before any database access.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum AnalyzeError {
    #[error("block '{block}' is not allowed in {kind} commands")]
    BlockNotAllowed { block: String, kind: String },

    #[error("blocks '{first}' and '{second}' cannot be combined")]
    ConflictingBlocks { first: String, second: String },

    #[error("connector '{field}' must sit between two predicates")]
    DanglingConnector { field: String },

    #[error("duplicate block '{block}'")]
    DuplicateBlock { block: String },

    #[error("predicate group '{field}' is empty")]
    EmptyPredicateGroup { field: String },

    #[error("field '{field}' has an invalid type for block '{block}'")]
    InvalidBlockType { block: String, field: String },

    #[error("invalid column identifier '{value}'")]
    InvalidColumnIdentifier { value: String },

    #[error("directive '{directive}' is not valid inside '{block}'")]
    InvalidDirectivePlacement { directive: String, block: String },

    #[error(
        "iterator field '{field}' must take exactly one record parameter and return exactly one error"
    )]
    InvalidIteratorType { field: String },

    #[error("invalid limit/offset value '{value}'")]
    InvalidLimitValue { value: String },

    #[error("invalid operator '{op}' on field '{field}'")]
    InvalidOperator { field: String, op: String },

    #[error("invalid predicate '{value}' on field '{field}'")]
    InvalidPredicate { field: String, value: String },

    #[error(
        "relation field '{field}' must be a record, an optional record, a sequence of records or an iterator"
    )]
    InvalidRecordFieldType { field: String },

    #[error("invalid relation identifier '{value}'")]
    InvalidRelationIdentifier { value: String },

    #[error("invalid tag on field '{field}': {message}")]
    InvalidTag { field: String, message: String },

    #[error("on-conflict block requires an action (Ignore or Update)")]
    MissingConflictAction,

    #[error("on-conflict update requires a conflict target")]
    MissingConflictTarget,

    #[error("join with '{rel}' requires at least one condition")]
    MissingJoinCondition { rel: String },

    #[error("predicate field '{field}' has no sql tag")]
    MissingPredicateTag { field: String },

    #[error("command '{command}' has no field with a relation annotation")]
    MissingRecordField { command: String },

    #[error("command '{command}' must declare a Where block or the All directive")]
    MissingWhereOrAll { command: String },

    #[error("fields '{first}' and '{second}' both carry a relation annotation")]
    MultipleRecordFields { first: String, second: String },

    #[error(
        "cannot infer command kind from '{name}'; expected an Insert, Update, Select, Delete or Filter prefix"
    )]
    UnrecognizedCommandKind { name: String },
}
