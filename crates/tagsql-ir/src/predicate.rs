//! Predicate trees for WHERE blocks and join conditions.
//!
//! Trees are closed: every consumer matches [`Predicate`] exhaustively. The
//! checker and the statement builder both traverse trees through
//! [`PredicateWalk`], so validation order and parameter order cannot drift
//! apart.

use crate::{
    host::HostType,
    ident::ColumnIdent,
    op::{BetweenOp, BoolOp, CmpOp, Quantifier, UnaryOp},
};
use std::fmt;

///
/// FieldRef
///
/// A host field bound as a statement argument.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldRef {
    /// Host field names from the command root down to the field.
    pub path: Vec<String>,
    pub ty: HostType,
}

impl FieldRef {
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.last().map_or("", String::as_str)
    }

    /// Dotted path, used in diagnostics and argument lists.
    #[must_use]
    pub fn key(&self) -> String {
        self.path.join(".")
    }
}

///
/// ColumnExpr
///
/// A column optionally wrapped in a single-argument modifier function.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnExpr {
    pub column: ColumnIdent,
    pub func: Option<String>,
}

impl ColumnExpr {
    #[must_use]
    pub const fn plain(column: ColumnIdent) -> Self {
        Self { column, func: None }
    }
}

impl fmt::Display for ColumnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.func {
            Some(func) => write!(f, "{func}({})", self.column),
            None => write!(f, "{}", self.column),
        }
    }
}

///
/// Operand
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operand {
    Column(ColumnIdent),
    Field(FieldRef),
    /// Literal SQL text, emitted verbatim.
    Literal(String),
}

///
/// FieldPredicate
///
/// `<column> <op> [quantifier] <field>`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldPredicate {
    pub field: FieldRef,
    pub column: ColumnExpr,
    pub op: CmpOp,
    pub quantifier: Option<Quantifier>,
}

impl FieldPredicate {
    /// Explicit quantifier, or the one implied by a membership operator.
    #[must_use]
    pub const fn effective_quantifier(&self) -> Option<Quantifier> {
        match self.quantifier {
            Some(q) => Some(q),
            None => self.op.implied_quantifier(),
        }
    }
}

///
/// ColumnCondition
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ColumnCondition {
    Unary(UnaryOp),
    Binary {
        op: CmpOp,
        quantifier: Option<Quantifier>,
        rhs: Operand,
    },
}

///
/// ColumnPredicate
///
/// A predicate that binds no field: column against column or literal, or a
/// unary test.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ColumnPredicate {
    pub left: ColumnExpr,
    pub cond: ColumnCondition,
}

///
/// BetweenPredicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BetweenPredicate {
    pub name: String,
    pub column: ColumnIdent,
    pub op: BetweenOp,
    pub x: Operand,
    pub y: Operand,
}

///
/// NestedGroup
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NestedGroup {
    pub name: String,
    pub items: Vec<PredicateItem>,
}

///
/// Predicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Predicate {
    Field(FieldPredicate),
    Column(ColumnPredicate),
    Between(BetweenPredicate),
    Group(NestedGroup),
}

///
/// PredicateItem
///
/// One list entry; `connector` joins it to the previous entry and is
/// ignored for the first entry of a list.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PredicateItem {
    pub connector: BoolOp,
    pub predicate: Predicate,
}

impl PredicateItem {
    #[must_use]
    pub const fn and(predicate: Predicate) -> Self {
        Self {
            connector: BoolOp::And,
            predicate,
        }
    }

    #[must_use]
    pub const fn or(predicate: Predicate) -> Self {
        Self {
            connector: BoolOp::Or,
            predicate,
        }
    }
}

///
/// WalkEvent
///

#[derive(Clone, Copy, Debug)]
pub enum WalkEvent<'a> {
    /// A list entry, leaf or group, in declaration order. Group entries are
    /// followed by their children and then a matching `GroupEnd`.
    Item {
        item: &'a PredicateItem,
        depth: usize,
        first: bool,
    },
    GroupEnd {
        item: &'a PredicateItem,
        depth: usize,
    },
}

struct Frame<'a> {
    items: &'a [PredicateItem],
    next: usize,
    owner: Option<&'a PredicateItem>,
}

///
/// PredicateWalk
///
/// Depth-first, declaration-order traversal over a predicate list using an
/// explicit stack. Every item is yielded exactly once.
///

pub struct PredicateWalk<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> PredicateWalk<'a> {
    #[must_use]
    pub fn new(items: &'a [PredicateItem]) -> Self {
        Self {
            stack: vec![Frame {
                items,
                next: 0,
                owner: None,
            }],
        }
    }
}

impl<'a> Iterator for PredicateWalk<'a> {
    type Item = WalkEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let depth = self.stack.len().checked_sub(1)?;
        let frame = self.stack.last_mut()?;

        if let Some(item) = frame.items.get(frame.next) {
            let first = frame.next == 0;
            frame.next += 1;

            if let Predicate::Group(group) = &item.predicate {
                self.stack.push(Frame {
                    items: &group.items,
                    next: 0,
                    owner: Some(item),
                });
            }

            return Some(WalkEvent::Item { item, depth, first });
        }

        let finished = self.stack.pop()?;
        match finished.owner {
            Some(item) => Some(WalkEvent::GroupEnd {
                item,
                depth: depth - 1,
            }),
            None => None,
        }
    }
}
