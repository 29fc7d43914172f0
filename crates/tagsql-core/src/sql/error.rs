use thiserror::Error as ThisError;

///
/// BuildError
///
/// The checked command violates an assumption lowering relies on. Checked
/// commands from [`check_command`](crate::check::check_command) only hit
/// these for shapes the database itself would reject.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum BuildError {
    #[error("conflict index '{index}' has expression key columns and cannot be used as a target")]
    ExpressionIndexTarget { index: String },

    #[error("ON CONFLICT DO UPDATE requires a conflict target")]
    MissingConflictTarget,

    #[error("checked command '{command}' has no target relation")]
    MissingTarget { command: String },

    #[error("select '{command}' reads no columns")]
    NoReadableColumns { command: String },

    #[error("update '{command}' writes no columns")]
    NoWritableColumns { command: String },

    #[error("constraint '{constraint}' not found on the target relation")]
    UnknownConstraint { constraint: String },

    #[error("index '{index}' not found on the target relation")]
    UnknownIndex { index: String },
}
