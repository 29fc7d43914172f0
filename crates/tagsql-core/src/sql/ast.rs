//! PostgreSQL statement tree produced by the builder.
//!
//! Nodes carry resolved identifiers and `$n` parameter ordinals only; the
//! text form comes from their `Display` impls in `render`.

use tagsql_ir::{
    ColumnIdent,
    command::{JoinKind, NullsOrder},
    op::{BetweenOp, BoolOp, CmpOp, Quantifier, UnaryOp},
};

///
/// Statement
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

impl Statement {
    /// Highest parameter ordinal referenced, which equals the parameter
    /// count for builder output.
    #[must_use]
    pub fn max_param(&self) -> usize {
        let mut max = 0;
        self.visit_params(&mut |n| max = max.max(n));
        max
    }

    /// Parameter ordinals in rendering order.
    #[must_use]
    pub fn params(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.visit_params(&mut |n| out.push(n));
        out
    }

    fn visit_params(&self, f: &mut dyn FnMut(usize)) {
        match self {
            Self::Select(select) => {
                for join in &select.joins {
                    join.visit_params(f);
                }
                if let Some(cond) = &select.filter {
                    cond.visit_params(f);
                }
                for expr in select.limit.iter().chain(&select.offset) {
                    expr.visit_params(f);
                }
            }
            Self::Insert(insert) => {
                for expr in &insert.values {
                    expr.visit_params(f);
                }
            }
            Self::Update(update) => {
                for (_, expr) in &update.set {
                    expr.visit_params(f);
                }
                for join in &update.joins {
                    join.visit_params(f);
                }
                if let Some(cond) = &update.filter {
                    cond.visit_params(f);
                }
            }
            Self::Delete(delete) => {
                for join in &delete.joins {
                    join.visit_params(f);
                }
                if let Some(cond) = &delete.filter {
                    cond.visit_params(f);
                }
            }
        }
    }
}

///
/// TableRef
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableRef {
    pub namespace: Option<String>,
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    /// Name the table's columns are qualified with.
    #[must_use]
    pub fn key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

///
/// Expr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expr {
    Column(ColumnIdent),
    /// `$n`, numbered from 1.
    Param(usize),
    /// Literal SQL text, emitted verbatim.
    Literal(String),
    Default,
    Call { func: String, arg: Box<Self> },
    /// `EXCLUDED.column` inside `ON CONFLICT DO UPDATE`.
    Excluded(String),
}

impl Expr {
    #[must_use]
    pub fn call(func: Option<&str>, arg: Self) -> Self {
        match func {
            Some(func) => Self::Call {
                func: func.to_string(),
                arg: Box::new(arg),
            },
            None => arg,
        }
    }

    fn visit_params(&self, f: &mut dyn FnMut(usize)) {
        match self {
            Self::Param(n) => f(*n),
            Self::Call { arg, .. } => arg.visit_params(f),
            Self::Column(_) | Self::Literal(_) | Self::Default | Self::Excluded(_) => {}
        }
    }
}

///
/// Condition
///
/// Flat `first (AND|OR) next ...` list; nested groups render parenthesized.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Condition {
    pub items: Vec<ConditionItem>,
}

impl Condition {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, connector: BoolOp, node: ConditionNode) {
        self.items.push(ConditionItem { connector, node });
    }

    fn visit_params(&self, f: &mut dyn FnMut(usize)) {
        for item in &self.items {
            match &item.node {
                ConditionNode::Compare { left, right, .. } => {
                    left.visit_params(f);
                    right.visit_params(f);
                }
                ConditionNode::Unary { expr, .. } => expr.visit_params(f),
                ConditionNode::Between {
                    expr, low, high, ..
                } => {
                    expr.visit_params(f);
                    low.visit_params(f);
                    high.visit_params(f);
                }
                ConditionNode::Group(group) => group.visit_params(f),
            }
        }
    }
}

///
/// ConditionItem
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConditionItem {
    /// Ignored on the first item of a list.
    pub connector: BoolOp,
    pub node: ConditionNode,
}

///
/// ConditionNode
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConditionNode {
    Compare {
        left: Expr,
        op: CmpOp,
        quantifier: Option<Quantifier>,
        right: Expr,
    },
    Unary {
        expr: Expr,
        op: UnaryOp,
    },
    Between {
        expr: Expr,
        op: BetweenOp,
        low: Expr,
        high: Expr,
    },
    Group(Condition),
}

///
/// Join
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: Option<Condition>,
}

impl Join {
    fn visit_params(&self, f: &mut dyn FnMut(usize)) {
        if let Some(on) = &self.on {
            on.visit_params(f);
        }
    }
}

///
/// OrderTerm
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderTerm {
    pub column: ColumnIdent,
    pub descending: bool,
    pub nulls: Option<NullsOrder>,
}

///
/// Select
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Select {
    pub columns: Vec<ColumnIdent>,
    pub from: TableRef,
    pub joins: Vec<Join>,
    pub filter: Option<Condition>,
    pub order_by: Vec<OrderTerm>,
    pub limit: Option<Expr>,
    pub offset: Option<Expr>,
}

///
/// ConflictClause
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConflictClause {
    Columns(Vec<String>),
    Constraint(String),
}

///
/// ConflictDo
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ConflictDo {
    Nothing,
    /// `SET c = EXCLUDED.c` for each column.
    Update(Vec<String>),
}

///
/// OnConflict
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OnConflict {
    pub target: Option<ConflictClause>,
    pub action: ConflictDo,
}

///
/// Insert
///
/// One row template; multi-row inserts repeat it per element.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Insert {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub values: Vec<Expr>,
    pub on_conflict: Option<OnConflict>,
    pub returning: Vec<ColumnIdent>,
}

///
/// Update
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Update {
    pub table: TableRef,
    pub set: Vec<(String, Expr)>,
    pub from: Option<TableRef>,
    pub joins: Vec<Join>,
    pub filter: Option<Condition>,
    pub returning: Vec<ColumnIdent>,
}

///
/// Delete
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Delete {
    pub table: TableRef,
    pub using: Option<TableRef>,
    pub joins: Vec<Join>,
    pub filter: Option<Condition>,
    pub returning: Vec<ColumnIdent>,
}
