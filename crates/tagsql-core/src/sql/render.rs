//! SQL text for the statement tree.

use super::ast::{
    Condition, ConditionNode, ConflictClause, ConflictDo, Delete, Expr, Insert, Join, OnConflict,
    OrderTerm, Select, Statement, TableRef, Update,
};
use std::fmt::{self, Display, Write};
use tagsql_ir::{ColumnIdent, command::NullsOrder, op::CmpOp};

// Keywords that cannot appear unquoted as a column or table name.
const RESERVED: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric", "both",
    "case", "cast", "check", "collate", "column", "constraint", "create", "current_catalog",
    "current_date", "current_role", "current_time", "current_timestamp", "current_user",
    "default", "deferrable", "desc", "distinct", "do", "else", "end", "except", "false",
    "fetch", "for", "foreign", "from", "grant", "group", "having", "in", "initially",
    "intersect", "into", "lateral", "leading", "limit", "localtime", "localtimestamp", "not",
    "null", "offset", "on", "only", "or", "order", "placing", "primary", "references",
    "returning", "select", "session_user", "some", "symmetric", "table", "then", "to",
    "trailing", "true", "union", "unique", "user", "using", "variadic", "when", "where",
    "window", "with",
];

/// Write `name` as an identifier, quoting it when it would not survive
/// unquoted.
pub fn write_ident(f: &mut impl Write, name: &str) -> fmt::Result {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '$')
        && !RESERVED.contains(&name);

    if plain {
        f.write_str(name)
    } else {
        write!(f, "\"{}\"", name.replace('"', "\"\""))
    }
}

fn write_column(f: &mut impl Write, column: &ColumnIdent) -> fmt::Result {
    if !column.qualifier.is_empty() {
        write_ident(f, &column.qualifier)?;
        f.write_char('.')?;
    }
    write_ident(f, &column.name)
}

fn write_list<T>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    mut each: impl FnMut(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        each(f, item)?;
    }

    Ok(())
}

fn write_returning(f: &mut fmt::Formatter<'_>, columns: &[ColumnIdent]) -> fmt::Result {
    if columns.is_empty() {
        return Ok(());
    }
    f.write_str(" RETURNING ")?;
    write_list(f, columns, |f, c| write_column(f, c))
}

fn write_filter(f: &mut fmt::Formatter<'_>, filter: Option<&Condition>) -> fmt::Result {
    match filter {
        Some(cond) if !cond.is_empty() => write!(f, " WHERE {cond}"),
        _ => Ok(()),
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(select) => select.fmt(f),
            Self::Insert(insert) => insert.fmt(f),
            Self::Update(update) => update.fmt(f),
            Self::Delete(delete) => delete.fmt(f),
        }
    }
}

impl Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write_ident(f, namespace)?;
            f.write_char('.')?;
        }
        write_ident(f, &self.name)?;
        if let Some(alias) = &self.alias {
            f.write_str(" AS ")?;
            write_ident(f, alias)?;
        }

        Ok(())
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(column) => write_column(f, column),
            Self::Param(n) => write!(f, "${n}"),
            Self::Literal(text) => f.write_str(text),
            Self::Default => f.write_str("DEFAULT"),
            Self::Call { func, arg } => write!(f, "{func}({arg})"),
            Self::Excluded(column) => {
                f.write_str("EXCLUDED.")?;
                write_ident(f, column)
            }
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, item) in self.items.iter().enumerate() {
            if idx > 0 {
                write!(f, " {} ", item.connector)?;
            }
            match &item.node {
                ConditionNode::Compare {
                    left,
                    op,
                    quantifier: Some(q),
                    right,
                } => write!(f, "{left} {} {q}({right})", op.sql())?,
                ConditionNode::Compare {
                    left,
                    op,
                    quantifier: None,
                    right,
                } => write!(f, "{left} {} {right}", compare_sql(*op))?,
                ConditionNode::Unary { expr, op } => write!(f, "{expr} {}", op.sql())?,
                ConditionNode::Between {
                    expr,
                    op,
                    low,
                    high,
                } => write!(f, "{expr} {} {low} AND {high}", op.sql())?,
                ConditionNode::Group(group) => write!(f, "({group})")?,
            }
        }

        Ok(())
    }
}

// Unquantified membership has no array operand to expand; builder output
// always quantifies it, so this only guards hand-built trees.
const fn compare_sql(op: CmpOp) -> &'static str {
    match op {
        CmpOp::IsIn => "IN",
        CmpOp::NotIn => "NOT IN",
        _ => op.sql(),
    }
}

impl Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.sql(), self.table)?;
        if let Some(on) = &self.on {
            write!(f, " ON {on}")?;
        }

        Ok(())
    }
}

impl Display for OrderTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_column(f, &self.column)?;
        if self.descending {
            f.write_str(" DESC")?;
        }
        match self.nulls {
            Some(NullsOrder::First) => f.write_str(" NULLS FIRST"),
            Some(NullsOrder::Last) => f.write_str(" NULLS LAST"),
            None => Ok(()),
        }
    }
}

impl Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        write_list(f, &self.columns, |f, c| write_column(f, c))?;
        write!(f, " FROM {}", self.from)?;
        for join in &self.joins {
            write!(f, " {join}")?;
        }
        write_filter(f, self.filter.as_ref())?;
        if !self.order_by.is_empty() {
            f.write_str(" ORDER BY ")?;
            write_list(f, &self.order_by, |f, term| term.fmt(f))?;
        }
        if let Some(limit) = &self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        if let Some(offset) = &self.offset {
            write!(f, " OFFSET {offset}")?;
        }

        Ok(())
    }
}

impl Display for OnConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(" ON CONFLICT")?;
        match &self.target {
            Some(ConflictClause::Columns(columns)) => {
                f.write_str(" (")?;
                write_list(f, columns, |f, c| write_ident(f, c))?;
                f.write_char(')')?;
            }
            Some(ConflictClause::Constraint(name)) => {
                f.write_str(" ON CONSTRAINT ")?;
                write_ident(f, name)?;
            }
            None => {}
        }

        match &self.action {
            ConflictDo::Nothing => f.write_str(" DO NOTHING"),
            ConflictDo::Update(columns) => {
                f.write_str(" DO UPDATE SET ")?;
                write_list(f, columns, |f, c| {
                    write_ident(f, c)?;
                    write!(f, " = {}", Expr::Excluded(c.clone()))
                })
            }
        }
    }
}

impl Display for Insert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "INSERT INTO {}", self.table)?;
        if self.columns.is_empty() {
            f.write_str(" DEFAULT VALUES")?;
        } else {
            f.write_str(" (")?;
            write_list(f, &self.columns, |f, c| write_ident(f, c))?;
            f.write_str(") VALUES (")?;
            write_list(f, &self.values, |f, v| v.fmt(f))?;
            f.write_char(')')?;
        }
        if let Some(on_conflict) = &self.on_conflict {
            on_conflict.fmt(f)?;
        }

        write_returning(f, &self.returning)
    }
}

impl Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPDATE {} SET ", self.table)?;
        write_list(f, &self.set, |f, (column, value)| {
            write_ident(f, column)?;
            write!(f, " = {value}")
        })?;
        if let Some(from) = &self.from {
            write!(f, " FROM {from}")?;
            for join in &self.joins {
                write!(f, " {join}")?;
            }
        }
        write_filter(f, self.filter.as_ref())?;

        write_returning(f, &self.returning)
    }
}

impl Display for Delete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {}", self.table)?;
        if let Some(using) = &self.using {
            write!(f, " USING {using}")?;
            for join in &self.joins {
                write!(f, " {join}")?;
            }
        }
        write_filter(f, self.filter.as_ref())?;

        write_returning(f, &self.returning)
    }
}
