//! StatementBuilder: lowers a checked command into a statement tree.
//!
//! Parameters are numbered in the order they render, so `args[n - 1]`
//! always describes `$n`. Lowering is pure; every lookup goes through the
//! relation set captured by the checker.

use super::{
    ast::{
        Condition, ConditionNode, ConflictClause, ConflictDo, Delete, Expr, Insert, Join,
        OnConflict, OrderTerm, Select, Statement, TableRef, Update,
    },
    error::BuildError,
};
use crate::{
    check::{CheckedCommand, Pairing, WriteValue},
    compat::Adapter,
    relation::{DEFAULT_NAMESPACE, Relation, RelationSet},
};
use serde::Serialize;
use tagsql_ir::{
    ColumnIdent, CommandKind, RelIdent,
    command::{
        ColumnList, ConflictAction, ConflictTarget, JoinCondition, JoinItem, OnConflictBlock,
        RowLimit,
    },
    op::BoolOp,
    predicate::{
        ColumnCondition, ColumnPredicate, FieldPredicate, FieldRef, Operand, Predicate,
        PredicateItem, WalkEvent,
    },
};

///
/// ArgSource
///
/// Where the value of one statement parameter comes from.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ArgSource {
    /// A record field, encoded with the pairing's adapter.
    Input { field: String, adapter: Adapter },
    /// A WHERE field, bound as-is.
    Predicate { field: String, signature: String },
    Limit { field: String },
    Offset { field: String },
}

impl ArgSource {
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Input { field, .. }
            | Self::Predicate { field, .. }
            | Self::Limit { field }
            | Self::Offset { field } => field,
        }
    }
}

///
/// BoundStatement
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoundStatement {
    pub statement: Statement,
    /// Parameter sources, `args[n - 1]` for `$n`.
    pub args: Vec<ArgSource>,
    /// The statement runs once per element of a sequence or iterator.
    pub multi_row: bool,
}

impl BoundStatement {
    #[must_use]
    pub fn sql(&self) -> String {
        self.statement.to_string()
    }
}

///
/// FilterColumn
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FilterColumn {
    pub field: String,
    pub column: String,
    pub adapter: Adapter,
}

///
/// FilterMap
///
/// Field-to-column lookup for runtime-assembled filters.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FilterMap {
    pub relation: String,
    pub columns: Vec<FilterColumn>,
    pub text_search: Option<String>,
}

///
/// Lowered
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Lowered {
    Statement(BoundStatement),
    Filter(FilterMap),
}

impl Lowered {
    #[must_use]
    pub const fn statement(&self) -> Option<&BoundStatement> {
        match self {
            Self::Statement(bound) => Some(bound),
            Self::Filter(_) => None,
        }
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&FilterMap> {
        match self {
            Self::Filter(map) => Some(map),
            Self::Statement(_) => None,
        }
    }
}

/// Lower `checked` into a statement, or a filter map for filter commands.
pub fn build(checked: &CheckedCommand) -> Result<Lowered, BuildError> {
    let cmd = &checked.command;
    let target = checked
        .target()
        .ok_or_else(|| BuildError::MissingTarget {
            command: cmd.name.clone(),
        })?;

    let mut builder = Builder {
        checked,
        target,
        qualify: checked.relations.len() > 1,
        args: Vec::new(),
    };

    let statement = match cmd.kind {
        CommandKind::Filter => return Ok(Lowered::Filter(builder.filter_map())),
        CommandKind::Select => Statement::Select(builder.select()?),
        CommandKind::Insert => Statement::Insert(builder.insert()?),
        CommandKind::Update => Statement::Update(builder.update()?),
        CommandKind::Delete => Statement::Delete(builder.delete()),
    };

    Ok(Lowered::Statement(BoundStatement {
        statement,
        args: builder.args,
        multi_row: cmd.record.shape.is_multi(),
    }))
}

///
/// Builder
///

struct Builder<'a> {
    checked: &'a CheckedCommand,
    target: &'a Relation,
    /// Column references carry their relation key once joins are present.
    qualify: bool,
    args: Vec<ArgSource>,
}

impl Builder<'_> {
    fn bind(&mut self, source: ArgSource) -> Expr {
        self.args.push(source);
        Expr::Param(self.args.len())
    }

    fn bind_field(&mut self, field: &FieldRef) -> Expr {
        self.bind(ArgSource::Predicate {
            field: field.key(),
            signature: field.ty.signature(),
        })
    }

    // Unqualified names belong to `default_key`.
    fn column(&self, ident: &ColumnIdent, default_key: &str) -> ColumnIdent {
        if !ident.qualifier.is_empty() || !self.qualify {
            ident.clone()
        } else {
            ColumnIdent::new(default_key, ident.name.clone())
        }
    }

    fn target_column(&self, ident: &ColumnIdent) -> ColumnIdent {
        self.column(ident, &self.target.key)
    }

    fn pairing_column(&self, pairing: &Pairing) -> ColumnIdent {
        if self.qualify {
            pairing.qualified_column()
        } else {
            ColumnIdent::new("", pairing.column.clone())
        }
    }

    fn table(&self, ident: &RelIdent) -> TableRef {
        table_ref(&self.checked.relations, ident)
    }

    //
    // statements
    //

    fn select(&mut self) -> Result<Select, BuildError> {
        let cmd = &self.checked.command;
        if self.checked.outputs.is_empty() {
            return Err(BuildError::NoReadableColumns {
                command: cmd.name.clone(),
            });
        }

        let columns = self
            .checked
            .outputs
            .iter()
            .map(|pairing| self.pairing_column(pairing))
            .collect();
        let joins = cmd
            .join_items()
            .iter()
            .map(|item| self.join(item))
            .collect();
        let filter = self.filter();
        let order_by = cmd
            .order_by
            .iter()
            .flatten()
            .map(|item| OrderTerm {
                column: self.target_column(&item.column),
                descending: item.descending,
                nulls: item.nulls,
            })
            .collect();

        let limit = match &cmd.limit {
            Some(limit) => Some(self.row_limit(limit, |field| ArgSource::Limit { field })),
            None if !cmd.record.shape.is_multi() => Some(Expr::Literal("1".to_string())),
            None => None,
        };
        let offset = cmd
            .offset
            .as_ref()
            .map(|offset| self.row_limit(offset, |field| ArgSource::Offset { field }));

        Ok(Select {
            columns,
            from: self.table(&cmd.record.rel),
            joins,
            filter,
            order_by,
            limit,
            offset,
        })
    }

    fn insert(&mut self) -> Result<Insert, BuildError> {
        let cmd = &self.checked.command;
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for write in &self.checked.writes {
            columns.push(write.column.clone());
            values.push(self.write_value(write.value));
        }

        let on_conflict = cmd
            .on_conflict
            .as_ref()
            .map(|block| self.on_conflict(block))
            .transpose()?;

        Ok(Insert {
            table: self.table(&cmd.record.rel),
            columns,
            values,
            on_conflict,
            returning: self.returning(),
        })
    }

    fn update(&mut self) -> Result<Update, BuildError> {
        let cmd = &self.checked.command;
        if self.checked.writes.is_empty() {
            return Err(BuildError::NoWritableColumns {
                command: cmd.name.clone(),
            });
        }

        let set = self
            .checked
            .writes
            .iter()
            .map(|write| (write.column.clone(), self.write_value(write.value)))
            .collect();
        let (from, joins, filter) = self.from_list();

        Ok(Update {
            table: self.table(&cmd.record.rel),
            set,
            from,
            joins,
            filter,
            returning: self.returning(),
        })
    }

    fn delete(&mut self) -> Delete {
        let (using, joins, filter) = self.from_list();

        Delete {
            table: self.table(&self.checked.command.record.rel),
            using,
            joins,
            filter,
            returning: self.returning(),
        }
    }

    fn filter_map(&self) -> FilterMap {
        let columns = self
            .checked
            .inputs
            .iter()
            .map(|pairing| FilterColumn {
                field: pairing.field(),
                column: pairing.qualified_column().to_string(),
                adapter: pairing.adapter.clone(),
            })
            .collect();

        let text_search = self.checked.command.text_search.as_ref().map(|ident| {
            ColumnIdent::new(self.target.key.clone(), ident.name.clone()).to_string()
        });

        FilterMap {
            relation: self.target.name.clone(),
            columns,
            text_search,
        }
    }

    //
    // clauses
    //

    fn write_value(&mut self, value: WriteValue) -> Expr {
        match value {
            WriteValue::Default => Expr::Default,
            WriteValue::Input(idx) => {
                let pairing = &self.checked.inputs[idx];
                let source = ArgSource::Input {
                    field: pairing.field(),
                    adapter: pairing.adapter.clone(),
                };
                self.bind(source)
            }
        }
    }

    fn returning(&self) -> Vec<ColumnIdent> {
        let cmd = &self.checked.command;
        if cmd.returning.is_none() && cmd.result.is_none() {
            return Vec::new();
        }
        // INSERT has no other relation in scope
        let qualify = self.qualify && cmd.kind != CommandKind::Insert;

        self.checked
            .outputs
            .iter()
            .map(|pairing| {
                if qualify {
                    pairing.qualified_column()
                } else {
                    ColumnIdent::new("", pairing.column.clone())
                }
            })
            .collect()
    }

    fn row_limit(&mut self, limit: &RowLimit, source: impl FnOnce(String) -> ArgSource) -> Expr {
        match limit {
            RowLimit::Literal(n) => Expr::Literal(n.to_string()),
            RowLimit::Field(field) => self.bind(source(field.key())),
        }
    }

    fn join(&mut self, item: &JoinItem) -> Join {
        let on = (!item.conditions.is_empty())
            .then(|| self.join_conditions(item, &item.conditions));

        Join {
            kind: item.kind,
            table: self.table(&item.rel),
            on,
        }
    }

    fn join_conditions(&mut self, item: &JoinItem, conditions: &[JoinCondition]) -> Condition {
        let mut cond = Condition::default();
        for JoinCondition {
            connector,
            predicate,
        } in conditions
        {
            let node = self.column_predicate(predicate, item.rel.key());
            cond.push(*connector, node);
        }

        cond
    }

    /// Update FROM / Delete USING: the first join item becomes the from
    /// list and its conditions lead the WHERE clause; later items join it.
    fn from_list(&mut self) -> (Option<TableRef>, Vec<Join>, Option<Condition>) {
        let cmd = &self.checked.command;
        let Some((first, rest)) = cmd.join_items().split_first() else {
            return (None, Vec::new(), self.filter());
        };

        let from = self.table(&first.rel);
        let leading = self.join_conditions(first, &first.conditions);
        let joins = rest.iter().map(|item| self.join(item)).collect();

        let filter = match (leading.is_empty(), self.filter()) {
            (true, filter) => filter,
            (false, None) => Some(leading),
            (false, Some(user)) => {
                let mut cond = leading;
                cond.push(BoolOp::And, ConditionNode::Group(user));
                Some(cond)
            }
        };

        (Some(from), joins, filter)
    }

    //
    // predicates
    //

    /// Lower the WHERE block. The root list renders bare; each nested
    /// group renders parenthesized in its parent.
    fn filter(&mut self) -> Option<Condition> {
        let block = self.checked.command.where_block.as_ref()?;
        let target = self.target;

        let mut stack: Vec<(BoolOp, Condition)> = vec![(BoolOp::And, Condition::default())];
        for event in block.walk() {
            match event {
                WalkEvent::Item { item, .. } => {
                    let PredicateItem {
                        connector,
                        predicate,
                    } = item;
                    let node = match predicate {
                        Predicate::Group(_) => {
                            stack.push((*connector, Condition::default()));
                            continue;
                        }
                        Predicate::Field(pred) => self.field_predicate(pred),
                        Predicate::Column(pred) => self.column_predicate(pred, &target.key),
                        Predicate::Between(pred) => {
                            let expr = Expr::Column(self.target_column(&pred.column));
                            let low = self.operand(&pred.x);
                            let high = self.operand(&pred.y);
                            ConditionNode::Between {
                                expr,
                                op: pred.op,
                                low,
                                high,
                            }
                        }
                    };
                    if let Some((_, cond)) = stack.last_mut() {
                        cond.push(*connector, node);
                    }
                }
                WalkEvent::GroupEnd { .. } => {
                    if stack.len() > 1
                        && let Some((connector, group)) = stack.pop()
                        && let Some((_, parent)) = stack.last_mut()
                    {
                        parent.push(connector, ConditionNode::Group(group));
                    }
                }
            }
        }

        stack
            .pop()
            .map(|(_, cond)| cond)
            .filter(|cond| !cond.is_empty())
    }

    fn field_predicate(&mut self, pred: &FieldPredicate) -> ConditionNode {
        let func = pred.column.func.as_deref();
        let quantifier = pred.effective_quantifier();
        let left = Expr::call(func, Expr::Column(self.target_column(&pred.column.column)));
        let param = self.bind_field(&pred.field);
        // an array operand is compared element-wise; the modifier stays
        // on the column side only
        let right = if quantifier.is_some() {
            param
        } else {
            Expr::call(func, param)
        };

        ConditionNode::Compare {
            left,
            op: pred.op,
            quantifier,
            right,
        }
    }

    fn column_predicate(&mut self, pred: &ColumnPredicate, left_key: &str) -> ConditionNode {
        let left = Expr::call(
            pred.left.func.as_deref(),
            Expr::Column(self.column(&pred.left.column, left_key)),
        );

        match &pred.cond {
            ColumnCondition::Unary(op) => ConditionNode::Unary { expr: left, op: *op },
            ColumnCondition::Binary {
                op,
                quantifier,
                rhs,
            } => ConditionNode::Compare {
                left,
                op: *op,
                quantifier: quantifier.or_else(|| op.implied_quantifier()),
                right: self.operand(rhs),
            },
        }
    }

    fn operand(&mut self, operand: &Operand) -> Expr {
        match operand {
            Operand::Column(ident) => Expr::Column(self.target_column(ident)),
            Operand::Field(field) => self.bind_field(field),
            Operand::Literal(literal) => Expr::Literal(literal.clone()),
        }
    }

    //
    // on conflict
    //

    fn on_conflict(&self, block: &OnConflictBlock) -> Result<OnConflict, BuildError> {
        let (target, target_columns) = match &block.target {
            Some(ConflictTarget::Columns(columns)) => {
                let names: Vec<String> = columns.iter().map(|col| col.name.clone()).collect();
                (Some(ConflictClause::Columns(names.clone())), names)
            }
            Some(ConflictTarget::Index(name)) => {
                let index = self
                    .target
                    .index(name)
                    .ok_or_else(|| BuildError::UnknownIndex {
                        index: name.clone(),
                    })?;
                if index.key.contains(&0) {
                    return Err(BuildError::ExpressionIndexTarget {
                        index: name.clone(),
                    });
                }
                let names = owned(self.target.key_columns(&index.key));
                (Some(ConflictClause::Columns(names.clone())), names)
            }
            Some(ConflictTarget::Constraint(name)) => {
                let constraint =
                    self.target
                        .constraint(name)
                        .ok_or_else(|| BuildError::UnknownConstraint {
                            constraint: name.clone(),
                        })?;
                let names = owned(self.target.key_columns(&constraint.key));
                (Some(ConflictClause::Constraint(name.clone())), names)
            }
            None => (None, Vec::new()),
        };

        let action = match &block.action {
            ConflictAction::Ignore => ConflictDo::Nothing,
            ConflictAction::Update(_) if target.is_none() => {
                return Err(BuildError::MissingConflictTarget);
            }
            ConflictAction::Update(ColumnList::All) => ConflictDo::Update(
                self.checked
                    .writes
                    .iter()
                    .filter(|write| write.value != WriteValue::Default)
                    .map(|write| write.column.clone())
                    .filter(|column| !target_columns.contains(column))
                    .collect(),
            ),
            ConflictAction::Update(ColumnList::Columns(columns)) => {
                ConflictDo::Update(columns.iter().map(|col| col.name.clone()).collect())
            }
        };

        Ok(OnConflict { target, action })
    }
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(str::to_string).collect()
}

// Relations outside the default namespace are rendered qualified.
fn table_ref(relations: &RelationSet, ident: &RelIdent) -> TableRef {
    let namespace = relations
        .get(ident.key())
        .map(|rel| rel.namespace.clone())
        .or_else(|| (!ident.qualifier.is_empty()).then(|| ident.qualifier.clone()))
        .filter(|namespace| namespace != DEFAULT_NAMESPACE);

    TableRef {
        namespace,
        name: ident.name.clone(),
        alias: (!ident.alias.is_empty()).then(|| ident.alias.clone()),
    }
}
