//! CommandChecker: validates one analysed command against the catalogue and
//! the relations it names.
//!
//! The checker is a small state machine over [`CheckStep`]. Every step is a
//! no-op unless the command carries the block it checks, and the first
//! failure ends the check. Successful checks produce the field/column
//! pairings the statement builder and the codec selection consume.

mod error;


pub use error::{CheckError, CheckErrorClass};

use crate::{
    catalog::{Catalog, CatalogType, Oid, oid, query},
    compat::{Adapter, Direction, assign_adapter, can_compare, field_type_candidate_oids},
    db::Connection,
    obs::trace::{CheckStep, TraceEvent, TraceSink, emit},
    relation::{Column, ConstraintKind, DEFAULT_NAMESPACE, Relation, RelationLoader, RelationSet},
};
use serde::Serialize;
use std::{collections::HashMap, fmt};
use tagsql_ir::{
    ColumnIdent, Command, CommandKind, HostType,
    command::{ColumnList, ConflictAction, ConflictTarget, FieldInfo, JoinItem},
    op::{CmpOp, UnaryOp},
    predicate::{
        BetweenPredicate, ColumnCondition, ColumnExpr, ColumnPredicate, FieldPredicate, FieldRef,
        Operand, Predicate, WalkEvent,
    },
};
use tracing::debug;

///
/// CheckOptions
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheckOptions {
    /// Namespace for relation identifiers without a qualifier.
    pub default_namespace: String,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

///
/// Pairing
///
/// A certified association between one host field and one column.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Pairing {
    /// Host field names from the record type down to the leaf.
    pub path: Vec<String>,
    pub signature: String,
    /// Registration key of the column's relation (alias or name).
    pub relation: String,
    pub column: String,
    pub type_oid: Oid,
    pub type_name: String,
    pub not_null: bool,
    pub adapter: Adapter,
}

impl Pairing {
    #[must_use]
    pub fn field(&self) -> String {
        self.path.join(".")
    }

    /// Column qualified by its relation key.
    #[must_use]
    pub fn qualified_column(&self) -> ColumnIdent {
        ColumnIdent::new(self.relation.clone(), self.column.clone())
    }
}

///
/// WriteValue
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum WriteValue {
    /// Bound from the input pairing at this index.
    Input(usize),
    Default,
}

///
/// WriteTarget
///
/// One column written by an insert or update, in record-field order.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct WriteTarget {
    pub column: String,
    pub value: WriteValue,
}

///
/// CheckedCommand
///

#[derive(Clone, Debug)]
pub struct CheckedCommand {
    pub command: Command,
    pub relations: RelationSet,
    /// Fields sent to the database: record fields of write commands and
    /// every leaf of filter commands.
    pub inputs: Vec<Pairing>,
    /// Fields populated from result rows.
    pub outputs: Vec<Pairing>,
    /// Insert/update column list.
    pub writes: Vec<WriteTarget>,
}

impl CheckedCommand {
    #[must_use]
    pub fn target(&self) -> Option<&Relation> {
        self.relations.target()
    }
}

/// Validate `cmd` and return its pairings.
pub fn check_command(
    conn: &mut dyn Connection,
    catalog: &Catalog,
    cmd: Command,
    options: &CheckOptions,
    trace: Option<&dyn TraceSink>,
) -> Result<CheckedCommand, CheckError> {
    let mut checker = Checker {
        catalog,
        conn,
        cmd: &cmd,
        loader: RelationLoader::new(catalog, options.default_namespace.clone()).with_trace(trace),
        trace,
        literals: HashMap::new(),
        inputs: Vec::new(),
        outputs: Vec::new(),
        writes: Vec::new(),
    };
    checker.run()?;

    let Checker {
        loader,
        inputs,
        outputs,
        writes,
        ..
    } = checker;
    let relations = loader.into_relations();
    debug!(
        command = %cmd.name,
        inputs = inputs.len(),
        outputs = outputs.len(),
        "command checked"
    );

    Ok(CheckedCommand {
        command: cmd,
        relations,
        inputs,
        outputs,
        writes,
    })
}

///
/// Checker
///

struct Checker<'a, 'c> {
    catalog: &'a Catalog,
    conn: &'c mut dyn Connection,
    cmd: &'a Command,
    loader: RelationLoader<'a>,
    trace: Option<&'a dyn TraceSink>,
    literals: HashMap<String, Oid>,
    inputs: Vec<Pairing>,
    outputs: Vec<Pairing>,
    writes: Vec<WriteTarget>,
}

impl Checker<'_, '_> {
    fn run(&mut self) -> Result<(), CheckError> {
        let mut step = CheckStep::LoadTarget;
        while step != CheckStep::Done {
            if self.applies(step) {
                emit(
                    self.trace,
                    TraceEvent::Step {
                        command: &self.cmd.name,
                        step,
                    },
                );
                self.step(step)?;
            }
            step = step.next();
        }

        Ok(())
    }

    fn applies(&self, step: CheckStep) -> bool {
        let cmd = self.cmd;
        match step {
            CheckStep::LoadTarget | CheckStep::CheckBindings => true,
            CheckStep::LoadJoins => cmd.join.is_some(),
            CheckStep::CheckOnConflict => cmd.on_conflict.is_some(),
            CheckStep::CheckWhere => cmd.where_block.is_some(),
            CheckStep::CheckOrderBy => cmd.order_by.is_some(),
            CheckStep::CheckDefaults => cmd.defaults.is_some(),
            CheckStep::CheckForce => cmd.force.is_some(),
            CheckStep::CheckReturning => cmd.returning.is_some(),
            CheckStep::CheckTextSearch => cmd.text_search.is_some(),
            CheckStep::Done => false,
        }
    }

    fn step(&mut self, step: CheckStep) -> Result<(), CheckError> {
        match step {
            CheckStep::LoadTarget => self.load_target(),
            CheckStep::LoadJoins => self.load_joins(),
            CheckStep::CheckOnConflict => self.check_on_conflict(),
            CheckStep::CheckWhere => self.check_where(),
            CheckStep::CheckOrderBy => self.check_order_by(),
            CheckStep::CheckDefaults => self.check_defaults(),
            CheckStep::CheckForce => self.check_force(),
            CheckStep::CheckReturning => self.check_returning(),
            CheckStep::CheckTextSearch => self.check_text_search(),
            CheckStep::CheckBindings => self.check_bindings(),
            CheckStep::Done => Ok(()),
        }
    }

    //
    // relations and columns
    //

    fn load_target(&mut self) -> Result<(), CheckError> {
        self.loader.load(&mut *self.conn, &self.cmd.record.rel)?;

        Ok(())
    }

    fn target(&self) -> Result<&Relation, CheckError> {
        self.loader
            .relations()
            .target()
            .ok_or_else(|| CheckError::RelationNotFound {
                relation: self.cmd.record.rel.to_string(),
            })
    }

    fn relation(&self, key: &str) -> Result<&Relation, CheckError> {
        self.loader
            .relations()
            .get(key)
            .ok_or_else(|| CheckError::RelationNotFound {
                relation: key.to_string(),
            })
    }

    /// Resolve a column; unqualified names resolve against the target, and
    /// with `search_all` against every loaded relation in load order.
    fn column(&self, ident: &ColumnIdent, search_all: bool) -> Result<(String, Column), CheckError> {
        if !ident.qualifier.is_empty() {
            let rel = self.relation(&ident.qualifier)?;
            return column_of(rel, &ident.name).map(|col| (rel.key.clone(), col.clone()));
        }

        let target = self.target()?;
        if let Some(col) = target.column(&ident.name) {
            return Ok((target.key.clone(), col.clone()));
        }
        if search_all
            && let Some((rel, col)) = self
                .loader
                .relations()
                .iter()
                .find_map(|rel| rel.column(&ident.name).map(|col| (rel, col)))
        {
            return Ok((rel.key.clone(), col.clone()));
        }

        Err(CheckError::ColumnNotFound {
            relation: target.name.clone(),
            column: ident.name.clone(),
        })
    }

    fn target_column(&self, ident: &ColumnIdent) -> Result<Column, CheckError> {
        let target = self.target()?;
        if !ident.qualifier.is_empty() && ident.qualifier != target.key {
            return Err(CheckError::RelationNotFound {
                relation: ident.qualifier.clone(),
            });
        }

        column_of(target, &ident.name).cloned()
    }

    /// Catalogue type of a value derived from `subject`.
    fn type_of(
        &self,
        subject: impl fmt::Display,
        type_oid: Oid,
    ) -> Result<&CatalogType, CheckError> {
        self.catalog
            .type_by_oid(type_oid)
            .ok_or_else(|| CheckError::UnknownColumnType {
                column: subject.to_string(),
                oid: type_oid,
            })
    }

    fn literal_type(&mut self, literal: &str) -> Result<Oid, CheckError> {
        if let Some(type_oid) = self.literals.get(literal) {
            return Ok(*type_oid);
        }

        let type_oid = query::literal_type(&mut *self.conn, literal)?;
        self.literals.insert(literal.to_string(), type_oid);

        Ok(type_oid)
    }

    //
    // joins
    //

    fn load_joins(&mut self) -> Result<(), CheckError> {
        let cmd = self.cmd;
        for item in cmd.join_items() {
            // every relation in one statement needs its own key
            if self.loader.relations().get(item.rel.key()).is_some() {
                return Err(CheckError::DuplicateRelationKey {
                    key: item.rel.key().to_string(),
                });
            }
            self.loader.load(&mut *self.conn, &item.rel)?;
            for cond in &item.conditions {
                let left = self.join_column(item, &cond.predicate.left)?;
                self.check_column_predicate(&left, &cond.predicate)?;
            }
        }

        Ok(())
    }

    // Join conditions read from the joined relation on the left.
    fn join_column(&self, item: &JoinItem, expr: &ColumnExpr) -> Result<Column, CheckError> {
        let key = item.rel.key();
        if !expr.column.qualifier.is_empty() && expr.column.qualifier != key {
            return Err(CheckError::RelationNotFound {
                relation: expr.column.qualifier.clone(),
            });
        }

        column_of(self.relation(key)?, &expr.column.name).cloned()
    }

    //
    // predicates
    //

    fn check_where(&mut self) -> Result<(), CheckError> {
        let cmd = self.cmd;
        let Some(block) = &cmd.where_block else {
            return Ok(());
        };

        for event in block.walk() {
            let WalkEvent::Item { item, depth, .. } = event else {
                continue;
            };
            emit(
                self.trace,
                TraceEvent::Predicate {
                    command: &cmd.name,
                    depth,
                    group: matches!(item.predicate, Predicate::Group(_)),
                },
            );

            match &item.predicate {
                Predicate::Field(pred) => self.check_field_predicate(pred)?,
                Predicate::Column(pred) => {
                    let (_, left) = self.column(&pred.left.column, false)?;
                    self.check_column_predicate(&left, pred)?;
                }
                Predicate::Between(pred) => self.check_between(pred)?,
                // children follow in the walk
                Predicate::Group(_) => {}
            }
        }

        Ok(())
    }

    fn check_field_predicate(&self, pred: &FieldPredicate) -> Result<(), CheckError> {
        let (_, column) = self.column(&pred.column.column, false)?;
        let field = &pred.field;

        if column.not_null && field.ty.is_optional() {
            return Err(CheckError::IllegalPointerFieldForNotNullColumn {
                field: field.key(),
                column: column.name.clone(),
            });
        }

        let mut value_ty = field.ty.deref_optional();
        if pred.effective_quantifier().is_some() {
            value_ty = value_ty.sequence_elem().ok_or_else(|| {
                CheckError::IllegalFieldTypeForQuantifier {
                    field: field.key(),
                    op: pred.op.sql().to_string(),
                }
            })?;
        }

        // self-encoding types bind whatever the column expects
        if value_ty.caps.encodes {
            return Ok(());
        }

        let mut candidates = field_type_candidate_oids(value_ty, self.catalog);
        let mut column_type = column.ty.clone();
        if let Some(func) = &pred.column.func {
            column_type = self
                .type_of(&pred.column, self.modifier_result(func, &column.ty)?)?
                .clone();
            candidates = vec![self.field_modifier_result(func, field, value_ty, &candidates)?];
        }

        if can_compare(self.catalog, &column_type, &candidates, pred.op) {
            Ok(())
        } else {
            Err(CheckError::IncomparableFieldColumn {
                field: field.key(),
                column: pred.column.to_string(),
                op: pred.op.sql().to_string(),
            })
        }
    }

    fn check_column_predicate(
        &mut self,
        left: &Column,
        pred: &ColumnPredicate,
    ) -> Result<(), CheckError> {
        let left_type = match &pred.left.func {
            Some(func) => self
                .type_of(&pred.left, self.modifier_result(func, &left.ty)?)?
                .clone(),
            None => left.ty.clone(),
        };

        match &pred.cond {
            ColumnCondition::Unary(op) => unary_check(left, &left_type, *op),
            ColumnCondition::Binary {
                op,
                quantifier,
                rhs,
            } => {
                let mut right = self.operand_type(rhs)?;
                if quantifier.is_some() || op.is_membership() {
                    let rhs_type = self.type_of(operand_label(rhs), right)?;
                    if !rhs_type.is_array() {
                        return Err(CheckError::IllegalArrayOperand {
                            column: pred.left.to_string(),
                            op: op.sql().to_string(),
                        });
                    }
                    right = rhs_type.element;
                }

                if can_compare(self.catalog, &left_type, &[right], *op) {
                    Ok(())
                } else {
                    Err(CheckError::IncomparableColumns {
                        left: pred.left.to_string(),
                        right: operand_label(rhs),
                        op: op.sql().to_string(),
                    })
                }
            }
        }
    }

    fn check_between(&mut self, pred: &BetweenPredicate) -> Result<(), CheckError> {
        let (_, column) = self.column(&pred.column, false)?;
        let catalog = self.catalog;
        let bounds_ok = |candidates: &[Oid]| {
            [CmpOp::Gte, CmpOp::Lte]
                .into_iter()
                .all(|op| can_compare(catalog, &column.ty, candidates, op))
        };

        for bound in [&pred.x, &pred.y] {
            if let Operand::Field(field) = bound {
                if column.not_null && field.ty.is_optional() {
                    return Err(CheckError::IllegalPointerFieldForNotNullColumn {
                        field: field.key(),
                        column: column.name.clone(),
                    });
                }
                let value_ty = field.ty.deref_optional();
                let candidates = field_type_candidate_oids(value_ty, catalog);
                if !value_ty.caps.encodes && !bounds_ok(&candidates) {
                    return Err(CheckError::IncomparableFieldColumn {
                        field: field.key(),
                        column: pred.column.to_string(),
                        op: pred.op.sql().to_string(),
                    });
                }
                continue;
            }

            let right = self.operand_type(bound)?;
            if !bounds_ok(&[right]) {
                return Err(CheckError::IncomparableColumns {
                    left: pred.column.to_string(),
                    right: operand_label(bound),
                    op: pred.op.sql().to_string(),
                });
            }
        }

        Ok(())
    }

    fn operand_type(&mut self, operand: &Operand) -> Result<Oid, CheckError> {
        match operand {
            Operand::Column(ident) => Ok(self.column(ident, false)?.1.ty.oid),
            Operand::Literal(literal) => self.literal_type(literal),
            Operand::Field(field) => Ok(field_type_candidate_oids(&field.ty, self.catalog)
                .first()
                .copied()
                .unwrap_or(oid::UNKNOWN)),
        }
    }

    /// Return type of the single-argument, non-aggregate overload of `func`
    /// accepting `arg`.
    fn modifier_result(&self, func: &str, arg: &CatalogType) -> Result<Oid, CheckError> {
        self.procedure_for(func, arg.oid)
            .ok_or_else(|| CheckError::NoProcedureForModifier {
                func: func.to_string(),
                type_name: arg.name.clone(),
            })
    }

    fn field_modifier_result(
        &self,
        func: &str,
        field: &FieldRef,
        value_ty: &HostType,
        candidates: &[Oid],
    ) -> Result<Oid, CheckError> {
        candidates
            .iter()
            .find_map(|candidate| self.procedure_for(func, *candidate))
            .ok_or_else(|| CheckError::NoProcedureForModifier {
                func: func.to_string(),
                type_name: format!("{} ({})", field.key(), value_ty.signature()),
            })
    }

    fn procedure_for(&self, func: &str, arg: Oid) -> Option<Oid> {
        self.catalog
            .procedures(func)
            .iter()
            .filter(|procedure| !procedure.aggregate)
            .find(|procedure| {
                procedure.arg == arg || self.catalog.can_cast_implicit(procedure.arg, arg)
            })
            .map(|procedure| procedure.ret)
    }

    //
    // insert blocks
    //

    fn check_on_conflict(&mut self) -> Result<(), CheckError> {
        let Some(block) = &self.cmd.on_conflict else {
            return Ok(());
        };
        let target = self.target()?;

        match &block.target {
            Some(ConflictTarget::Columns(columns)) => {
                for col in columns {
                    self.target_column(col)?;
                }
                let names: Vec<&str> = columns.iter().map(|col| col.name.as_str()).collect();
                if target.unique_index_for(&names).is_none() {
                    return Err(CheckError::NoIndexForColumnList {
                        relation: target.name.clone(),
                        columns: names.join(", "),
                    });
                }
            }
            Some(ConflictTarget::Index(name)) => {
                let index = target.index(name).ok_or_else(|| CheckError::IndexNotFound {
                    relation: target.name.clone(),
                    index: name.clone(),
                })?;
                if !index.is_unique_or_primary() {
                    return Err(CheckError::IndexNotUnique {
                        index: name.clone(),
                    });
                }
            }
            Some(ConflictTarget::Constraint(name)) => {
                let constraint =
                    target
                        .constraint(name)
                        .ok_or_else(|| CheckError::ConstraintNotFound {
                            relation: target.name.clone(),
                            constraint: name.clone(),
                        })?;
                if !matches!(
                    constraint.kind,
                    ConstraintKind::PrimaryKey | ConstraintKind::Unique
                ) {
                    return Err(CheckError::ConstraintNotUnique {
                        constraint: name.clone(),
                    });
                }
            }
            None => {}
        }

        if let ConflictAction::Update(list) = &block.action {
            for col in list.columns() {
                self.target_column(col)?;
            }
        }

        Ok(())
    }

    //
    // column lists
    //

    fn check_order_by(&mut self) -> Result<(), CheckError> {
        for item in self.cmd.order_by.iter().flatten() {
            self.column(&item.column, false)?;
        }

        Ok(())
    }

    fn check_defaults(&mut self) -> Result<(), CheckError> {
        let Some(list) = &self.cmd.defaults else {
            return Ok(());
        };

        for ident in list.columns() {
            let col = self.target_column(ident)?;
            if !col.has_default {
                return Err(CheckError::NoColumnDefault {
                    column: col.name.clone(),
                });
            }
        }

        Ok(())
    }

    fn check_force(&mut self) -> Result<(), CheckError> {
        for ident in self.cmd.force.iter().flat_map(ColumnList::columns) {
            self.target_column(ident)?;
        }

        Ok(())
    }

    fn check_returning(&mut self) -> Result<(), CheckError> {
        let cmd = self.cmd;
        let Some(list) = &cmd.returning else {
            return Ok(());
        };

        let target = self.target()?.clone();
        let mut outputs = Vec::new();
        match list {
            ColumnList::All => {
                for field in &cmd.record.fields {
                    if field.options.write_only {
                        continue;
                    }
                    if let Some(col) = target.column(&field.column.name) {
                        outputs.push(self.pair(field, &target.key, col, Direction::Read)?);
                    }
                }
            }
            ColumnList::Columns(columns) => {
                for ident in columns {
                    let col = self.target_column(ident)?;
                    let field = cmd
                        .record
                        .fields
                        .iter()
                        .find(|field| field.column.name == col.name)
                        .ok_or_else(|| CheckError::NoFieldForColumn {
                            column: col.name.clone(),
                        })?;
                    outputs.push(self.pair(field, &target.key, &col, Direction::Read)?);
                }
            }
        }
        self.outputs = outputs;

        Ok(())
    }

    fn check_text_search(&mut self) -> Result<(), CheckError> {
        let Some(ident) = &self.cmd.text_search else {
            return Ok(());
        };

        let col = self.target_column(ident)?;
        if col.ty.oid == oid::TSVECTOR {
            Ok(())
        } else {
            Err(CheckError::BadTextSearchColumnType {
                column: col.name.clone(),
                type_name: col.ty.name,
            })
        }
    }

    //
    // bindings
    //

    fn check_bindings(&mut self) -> Result<(), CheckError> {
        let cmd = self.cmd;
        match cmd.kind {
            CommandKind::Select => {
                self.outputs = self.read_pairings(&cmd.record.fields)?;
            }
            CommandKind::Insert | CommandKind::Update => self.write_bindings()?,
            CommandKind::Filter => {
                let target = self.target()?.clone();
                let mut inputs = Vec::new();
                for field in &cmd.record.fields {
                    let col = self.target_column(&field.column)?;
                    inputs.push(self.pair(field, &target.key, &col, Direction::Write)?);
                }
                self.inputs = inputs;
            }
            CommandKind::Delete => {}
        }

        if let Some(result) = &cmd.result {
            self.outputs = self.read_pairings(&result.fields)?;
        }

        Ok(())
    }

    fn read_pairings(&self, fields: &[FieldInfo]) -> Result<Vec<Pairing>, CheckError> {
        fields
            .iter()
            .filter(|field| !field.options.write_only)
            .map(|field| {
                let (key, col) = self.column(&field.column, true)?;
                self.pair(field, &key, &col, Direction::Read)
            })
            .collect()
    }

    fn write_bindings(&mut self) -> Result<(), CheckError> {
        let cmd = self.cmd;
        let target = self.target()?.clone();
        let forced = |name: &str| {
            cmd.force
                .as_ref()
                .is_some_and(|list| list.is_all() || list.columns().iter().any(|c| c.name == name))
        };
        let defaulted = |col: &Column| {
            cmd.defaults.as_ref().is_some_and(|list| match list {
                ColumnList::All => col.has_default,
                ColumnList::Columns(columns) => columns.iter().any(|c| c.name == col.name),
            })
        };

        let mut inputs = Vec::new();
        let mut writes = Vec::new();
        for field in &cmd.record.fields {
            if field.options.read_only && !forced(&field.column.name) {
                continue;
            }
            let col = self.target_column(&field.column)?;
            if writes.iter().any(|w: &WriteTarget| w.column == col.name) {
                return Err(CheckError::DuplicateColumnBinding {
                    field: field.key(),
                    column: col.name,
                });
            }

            let value = if defaulted(&col) {
                WriteValue::Default
            } else {
                inputs.push(self.pair(field, &target.key, &col, Direction::Write)?);
                WriteValue::Input(inputs.len() - 1)
            };
            writes.push(WriteTarget {
                column: col.name.clone(),
                value,
            });
        }

        // listed defaults without a record field are still written
        for ident in cmd.defaults.iter().flat_map(ColumnList::columns) {
            if !writes.iter().any(|w| w.column == ident.name) {
                writes.push(WriteTarget {
                    column: ident.name.clone(),
                    value: WriteValue::Default,
                });
            }
        }

        self.inputs = inputs;
        self.writes = writes;

        Ok(())
    }

    fn pair(
        &self,
        field: &FieldInfo,
        relation: &str,
        column: &Column,
        dir: Direction,
    ) -> Result<Pairing, CheckError> {
        let adapter = assign_adapter(self.catalog, column, field, dir).ok_or_else(|| {
            CheckError::UnassignableFieldColumn {
                field: field.key(),
                signature: field.ty.signature(),
                column: column.name.clone(),
                type_name: column.ty.name.clone(),
                direction: dir,
            }
        })?;

        Ok(Pairing {
            path: field.path.clone(),
            signature: field.ty.signature(),
            relation: relation.to_string(),
            column: column.name.clone(),
            type_oid: column.ty.oid,
            type_name: column.ty.name.clone(),
            not_null: column.not_null,
            adapter,
        })
    }
}

fn column_of<'r>(rel: &'r Relation, name: &str) -> Result<&'r Column, CheckError> {
    rel.column(name).ok_or_else(|| CheckError::ColumnNotFound {
        relation: rel.name.clone(),
        column: name.to_string(),
    })
}

fn unary_check(column: &Column, ty: &CatalogType, op: UnaryOp) -> Result<(), CheckError> {
    if op.is_null_check() {
        if column.not_null {
            return Err(CheckError::IllegalNullCheck {
                column: column.name.clone(),
            });
        }
        return Ok(());
    }

    if ty.oid == oid::BOOL {
        Ok(())
    } else {
        Err(CheckError::BadBoolColumn {
            column: column.name.clone(),
            op: op.sql().to_string(),
        })
    }
}

fn operand_label(operand: &Operand) -> String {
    match operand {
        Operand::Column(ident) => ident.to_string(),
        Operand::Field(field) => field.key(),
        Operand::Literal(literal) => literal.clone(),
    }
}
