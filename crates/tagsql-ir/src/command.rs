//! Normalized command IR produced by the analyzer.

use crate::{
    host::{HostType, TypeName},
    ident::{ColumnIdent, RelIdent},
    predicate::{ColumnPredicate, FieldRef, PredicateItem, PredicateWalk},
    op::BoolOp,
    tag::FieldOptions,
};
use derive_more::{Display, FromStr};
use serde::Serialize;

///
/// CommandKind
///

#[derive(Clone, Copy, Debug, Display, Eq, FromStr, Hash, PartialEq, Serialize)]
pub enum CommandKind {
    Insert,
    Update,
    Select,
    Delete,
    Filter,
}

impl CommandKind {
    pub const ALL: [Self; 5] = [
        Self::Insert,
        Self::Update,
        Self::Select,
        Self::Delete,
        Self::Filter,
    ];

    /// Commands whose record fields flow into the database.
    #[must_use]
    pub const fn writes_record(self) -> bool {
        matches!(self, Self::Insert | Self::Update)
    }

    /// Commands whose record fields are populated from result rows.
    #[must_use]
    pub const fn reads_record(self) -> bool {
        matches!(self, Self::Select)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Select => "select",
            Self::Delete => "delete",
            Self::Filter => "filter",
        }
    }
}

///
/// IteratorKind
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IteratorKind {
    /// Single-method capability; the method name is kept for the emitter.
    Method { name: String },
    Func,
}

///
/// RecordShape
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RecordShape {
    pub sequence: bool,
    pub iterator: Option<IteratorKind>,
    /// The record itself (or each element) is optional.
    pub optional: bool,
}

impl RecordShape {
    /// Sequences and iterators carry any number of rows.
    #[must_use]
    pub const fn is_multi(&self) -> bool {
        self.sequence || self.iterator.is_some()
    }
}

///
/// FieldInfo
///
/// One leaf column field of a record, after flattening nested records.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldInfo {
    /// Host field names from the record type down to the leaf.
    pub path: Vec<String>,
    pub column: ColumnIdent,
    pub ty: HostType,
    pub options: FieldOptions,
}

impl FieldInfo {
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.last().map_or("", String::as_str)
    }

    #[must_use]
    pub fn key(&self) -> String {
        self.path.join(".")
    }
}

///
/// RecordDescriptor
///
/// The relation-bound record field of a command.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordDescriptor {
    pub field: String,
    pub type_name: Option<TypeName>,
    pub shape: RecordShape,
    pub rel: RelIdent,
    pub fields: Vec<FieldInfo>,
}

///
/// ResultDescriptor
///
/// A `Result` field receiving RETURNING rows of a write command.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultDescriptor {
    pub field: String,
    pub type_name: Option<TypeName>,
    pub shape: RecordShape,
    pub fields: Vec<FieldInfo>,
}

///
/// WhereBlock
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WhereBlock {
    pub field: String,
    pub items: Vec<PredicateItem>,
}

impl WhereBlock {
    #[must_use]
    pub fn walk(&self) -> PredicateWalk<'_> {
        PredicateWalk::new(&self.items)
    }
}

///
/// JoinKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Inner => "JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
            Self::Cross => "CROSS JOIN",
        }
    }
}

///
/// JoinCondition
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinCondition {
    pub connector: BoolOp,
    pub predicate: ColumnPredicate,
}

///
/// JoinItem
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinItem {
    pub kind: JoinKind,
    pub rel: RelIdent,
    pub conditions: Vec<JoinCondition>,
}

///
/// JoinBlock
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinBlock {
    pub field: String,
    pub items: Vec<JoinItem>,
}

///
/// ColumnList
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ColumnList {
    All,
    Columns(Vec<ColumnIdent>),
}

impl ColumnList {
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    #[must_use]
    pub fn columns(&self) -> &[ColumnIdent] {
        match self {
            Self::All => &[],
            Self::Columns(columns) => columns,
        }
    }
}

///
/// ConflictTarget
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConflictTarget {
    Columns(Vec<ColumnIdent>),
    Index(String),
    Constraint(String),
}

///
/// ConflictAction
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConflictAction {
    Ignore,
    Update(ColumnList),
}

///
/// OnConflictBlock
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OnConflictBlock {
    pub target: Option<ConflictTarget>,
    pub action: ConflictAction,
}

///
/// NullsOrder
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NullsOrder {
    First,
    Last,
}

///
/// OrderItem
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderItem {
    pub column: ColumnIdent,
    pub descending: bool,
    pub nulls: Option<NullsOrder>,
}

///
/// RowLimit
///
/// LIMIT/OFFSET value: a literal from the annotation or a bound field.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RowLimit {
    Literal(u64),
    Field(FieldRef),
}

///
/// Command
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Command {
    pub name: String,
    pub kind: CommandKind,
    pub record: RecordDescriptor,
    pub join: Option<JoinBlock>,
    pub where_block: Option<WhereBlock>,
    pub on_conflict: Option<OnConflictBlock>,
    pub order_by: Option<Vec<OrderItem>>,
    pub limit: Option<RowLimit>,
    pub offset: Option<RowLimit>,
    pub defaults: Option<ColumnList>,
    pub force: Option<ColumnList>,
    pub returning: Option<ColumnList>,
    pub text_search: Option<ColumnIdent>,
    pub result: Option<ResultDescriptor>,
    pub rows_affected: Option<FieldRef>,
    pub error_handler: Option<FieldRef>,
    /// Update/Delete explicitly affect every row.
    pub all: bool,
}

impl Command {
    /// Empty command of the given kind bound to `record`.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CommandKind, record: RecordDescriptor) -> Self {
        Self {
            name: name.into(),
            kind,
            record,
            join: None,
            where_block: None,
            on_conflict: None,
            order_by: None,
            limit: None,
            offset: None,
            defaults: None,
            force: None,
            returning: None,
            text_search: None,
            result: None,
            rows_affected: None,
            error_handler: None,
            all: false,
        }
    }

    #[must_use]
    pub fn join_items(&self) -> &[JoinItem] {
        self.join.as_ref().map_or(&[], |join| join.items.as_slice())
    }
}
