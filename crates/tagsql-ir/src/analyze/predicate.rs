use super::{Directive, invalid_block_type};
use crate::{
    command::{JoinBlock, JoinCondition, JoinItem, JoinKind, WhereBlock},
    error::AnalyzeError,
    host::HostField,
    ident::{ColumnIdent, RelIdent, is_ident},
    op::{BetweenOp, BoolOp, CmpOp, Quantifier, UnaryOp},
    predicate::{
        BetweenPredicate, ColumnCondition, ColumnExpr, ColumnPredicate, FieldPredicate, FieldRef,
        NestedGroup, Operand, Predicate, PredicateItem,
    },
    tag::split_top_level,
};
use tagsql_utils::case::strip_prefix_ci;

// Bare words that are SQL literals rather than column references.
const LITERAL_KEYWORDS: &[&str] = &[
    "current_date",
    "current_time",
    "current_timestamp",
    "default",
    "false",
    "localtime",
    "localtimestamp",
    "null",
    "true",
];

/// Parse a `Where` block field into a predicate list.
pub(super) fn where_block(field: &HostField) -> Result<WhereBlock, AnalyzeError> {
    let Some(members) = field.ty.deref_optional().record_fields() else {
        return Err(invalid_block_type("Where", field));
    };

    let path = vec![field.name.clone()];
    let items = group_items(&field.name, members, &path)?;

    Ok(WhereBlock {
        field: field.name.clone(),
        items,
    })
}

fn group_items(
    group: &str,
    members: &[HostField],
    path: &[String],
) -> Result<Vec<PredicateItem>, AnalyzeError> {
    let mut items = Vec::new();
    let mut pending: Option<BoolOp> = None;

    for member in members {
        let predicate = match Directive::of(&member.ty) {
            Some(connector @ (Directive::And | Directive::Or)) => {
                if items.is_empty() || pending.is_some() {
                    return Err(AnalyzeError::DanglingConnector {
                        field: member.name.clone(),
                    });
                }
                pending = Some(if connector == Directive::Or {
                    BoolOp::Or
                } else {
                    BoolOp::And
                });
                continue;
            }
            Some(Directive::Column) => {
                let raw = required_sql(member)?;
                Predicate::Column(column_predicate(&member.name, raw)?)
            }
            Some(other) => {
                return Err(AnalyzeError::InvalidDirectivePlacement {
                    directive: other.name().to_string(),
                    block: group.to_string(),
                });
            }
            None => member_predicate(member, path)?,
        };

        items.push(PredicateItem {
            connector: pending.take().unwrap_or_default(),
            predicate,
        });
    }

    if let Some(last) = members.last()
        && pending.is_some()
    {
        return Err(AnalyzeError::DanglingConnector {
            field: last.name.clone(),
        });
    }
    if items.is_empty() {
        return Err(AnalyzeError::EmptyPredicateGroup {
            field: group.to_string(),
        });
    }

    Ok(items)
}

// Value fields, between records and nested groups.
fn member_predicate(member: &HostField, path: &[String]) -> Result<Predicate, AnalyzeError> {
    let mut member_path = path.to_vec();
    member_path.push(member.name.clone());
    let nested = member.ty.deref_optional().record_fields();

    match (member.tag.sql(), nested) {
        (Some(raw), Some(children)) => {
            between_predicate(member, raw, children, &member_path).map(Predicate::Between)
        }
        (Some(raw), None) => field_predicate(member, raw, member_path).map(Predicate::Field),
        (None, Some(children)) => Ok(Predicate::Group(NestedGroup {
            name: member.name.clone(),
            items: group_items(&member.name, children, &member_path)?,
        })),
        (None, None) => Err(AnalyzeError::MissingPredicateTag {
            field: member.name.clone(),
        }),
    }
}

// `[func(]column[)] [op [quantifier]]`
fn field_predicate(
    member: &HostField,
    raw: &str,
    path: Vec<String>,
) -> Result<FieldPredicate, AnalyzeError> {
    let (head, rest) = next_token(raw);
    let column = column_expr(&member.name, head)?;

    let (op_token, rest) = next_token(rest);
    let op = if op_token.is_empty() {
        CmpOp::Eq
    } else {
        CmpOp::parse(op_token).ok_or_else(|| invalid_operator(&member.name, op_token))?
    };

    let (quant_token, rest) = next_token(rest);
    let quantifier = parse_quantifier(&member.name, op, quant_token)?;
    if !rest.is_empty() {
        return Err(invalid_predicate(&member.name, raw));
    }

    Ok(FieldPredicate {
        field: FieldRef {
            path,
            ty: member.ty.clone(),
        },
        column,
        op,
        quantifier,
    })
}

fn between_predicate(
    member: &HostField,
    raw: &str,
    children: &[HostField],
    path: &[String],
) -> Result<BetweenPredicate, AnalyzeError> {
    let (head, rest) = next_token(raw);
    let (op_token, rest) = next_token(rest);
    if !rest.is_empty() {
        return Err(invalid_predicate(&member.name, raw));
    }
    let column = ColumnIdent::parse(head).ok_or_else(|| AnalyzeError::InvalidColumnIdentifier {
        value: head.to_string(),
    })?;
    let op = BetweenOp::parse(op_token).ok_or_else(|| invalid_operator(&member.name, op_token))?;

    let mut x = None;
    let mut y = None;
    for child in children {
        let (bound, slot) = match Directive::of(&child.ty) {
            Some(Directive::Column) => {
                let raw = required_sql(child)?;
                let parts = split_top_level(raw, ',');
                let [value, slot] = parts.as_slice() else {
                    return Err(invalid_predicate(&child.name, raw));
                };
                (operand(value), *slot)
            }
            Some(other) => {
                return Err(AnalyzeError::InvalidDirectivePlacement {
                    directive: other.name().to_string(),
                    block: member.name.clone(),
                });
            }
            None => {
                let slot = child.tag.sql().ok_or_else(|| AnalyzeError::MissingPredicateTag {
                    field: child.name.clone(),
                })?;
                let mut child_path = path.to_vec();
                child_path.push(child.name.clone());
                let field = FieldRef {
                    path: child_path,
                    ty: child.ty.clone(),
                };
                (Operand::Field(field), slot)
            }
        };

        let target = match slot.to_ascii_lowercase().as_str() {
            "x" => &mut x,
            "y" => &mut y,
            _ => return Err(invalid_predicate(&child.name, slot)),
        };
        if target.is_some() {
            return Err(invalid_predicate(&child.name, slot));
        }
        *target = Some(bound);
    }

    let (Some(x), Some(y)) = (x, y) else {
        return Err(AnalyzeError::InvalidPredicate {
            field: member.name.clone(),
            value: "between requires one 'x' and one 'y' operand".to_string(),
        });
    };

    Ok(BetweenPredicate {
        name: member.name.clone(),
        column,
        op,
        x,
        y,
    })
}

/// `column op [quantifier] rhs`, or `column unary-op`.
pub(super) fn column_predicate(field: &str, raw: &str) -> Result<ColumnPredicate, AnalyzeError> {
    let (head, rest) = next_token(raw);
    let left = column_expr(field, head)?;

    let (op_token, rest) = next_token(rest);
    if let Some(unary) = UnaryOp::parse(op_token) {
        if !rest.is_empty() {
            return Err(invalid_predicate(field, raw));
        }
        return Ok(ColumnPredicate {
            left,
            cond: ColumnCondition::Unary(unary),
        });
    }

    let op = CmpOp::parse(op_token).ok_or_else(|| invalid_operator(field, op_token))?;
    let (quant_token, after_quant) = next_token(rest);
    let (quantifier, rhs) = match Quantifier::parse(quant_token) {
        Some(_) => (parse_quantifier(field, op, quant_token)?, after_quant),
        None => (None, rest),
    };
    if rhs.is_empty() {
        return Err(invalid_predicate(field, raw));
    }

    Ok(ColumnPredicate {
        left,
        cond: ColumnCondition::Binary {
            op,
            quantifier,
            rhs: operand(rhs),
        },
    })
}

/// Parse a join block (`Join`, `From` or `Using`).
pub(super) fn join_block(field: &HostField) -> Result<JoinBlock, AnalyzeError> {
    let Some(members) = field.ty.deref_optional().record_fields() else {
        return Err(invalid_block_type(&field.name, field));
    };

    let mut items = Vec::with_capacity(members.len());
    for member in members {
        let kind = match Directive::of(&member.ty) {
            Some(Directive::Join) => JoinKind::Inner,
            Some(Directive::LeftJoin) => JoinKind::Left,
            Some(Directive::RightJoin) => JoinKind::Right,
            Some(Directive::FullJoin) => JoinKind::Full,
            Some(Directive::CrossJoin) => JoinKind::Cross,
            other => {
                return Err(AnalyzeError::InvalidDirectivePlacement {
                    directive: other.map_or_else(|| member.name.clone(), |d| d.name().to_string()),
                    block: field.name.clone(),
                });
            }
        };
        items.push(join_item(member, kind)?);
    }

    Ok(JoinBlock {
        field: field.name.clone(),
        items,
    })
}

fn join_item(member: &HostField, kind: JoinKind) -> Result<JoinItem, AnalyzeError> {
    let raw = required_sql(member)?;
    let parts = split_top_level(raw, ',');
    let Some((rel_raw, conds)) = parts.split_first() else {
        return Err(invalid_predicate(&member.name, raw));
    };

    let rel = RelIdent::parse(rel_raw).ok_or_else(|| AnalyzeError::InvalidRelationIdentifier {
        value: (*rel_raw).to_string(),
    })?;

    let mut conditions = Vec::with_capacity(conds.len());
    for cond in conds.iter().filter(|c| !c.is_empty()) {
        let (connector, text) = match strip_prefix_ci(cond, "or ") {
            Some(text) => (BoolOp::Or, text),
            None => (BoolOp::And, strip_prefix_ci(cond, "and ").unwrap_or(*cond)),
        };
        conditions.push(JoinCondition {
            connector,
            predicate: column_predicate(&member.name, text)?,
        });
    }

    match (kind, conditions.is_empty()) {
        (JoinKind::Cross, false) => Err(invalid_predicate(&member.name, raw)),
        (JoinKind::Cross, true) | (_, false) => Ok(JoinItem {
            kind,
            rel,
            conditions,
        }),
        (_, true) => Err(AnalyzeError::MissingJoinCondition {
            rel: rel.to_string(),
        }),
    }
}

// `column` or `func(column)`
fn column_expr(field: &str, raw: &str) -> Result<ColumnExpr, AnalyzeError> {
    let invalid_column = |value: &str| AnalyzeError::InvalidColumnIdentifier {
        value: value.to_string(),
    };

    if let Some((func, inner)) = raw.split_once('(') {
        let Some(inner) = inner.strip_suffix(')') else {
            return Err(invalid_predicate(field, raw));
        };
        if !is_ident(func) {
            return Err(invalid_predicate(field, raw));
        }
        let column = ColumnIdent::parse(inner).ok_or_else(|| invalid_column(inner))?;

        return Ok(ColumnExpr {
            column,
            func: Some(func.to_ascii_lowercase()),
        });
    }

    ColumnIdent::parse(raw)
        .map(ColumnExpr::plain)
        .ok_or_else(|| invalid_column(raw))
}

fn parse_quantifier(
    field: &str,
    op: CmpOp,
    token: &str,
) -> Result<Option<Quantifier>, AnalyzeError> {
    if token.is_empty() {
        return Ok(None);
    }
    let quantifier = Quantifier::parse(token).ok_or_else(|| invalid_predicate(field, token))?;
    if !op.is_quantifiable() {
        return Err(invalid_operator(field, &format!("{} {quantifier}", op.sql())));
    }

    Ok(Some(quantifier))
}

fn operand(raw: &str) -> Operand {
    let raw = raw.trim();
    let keyword = LITERAL_KEYWORDS
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(raw));

    match ColumnIdent::parse(raw) {
        Some(column) if !keyword => Operand::Column(column),
        _ => Operand::Literal(raw.to_string()),
    }
}

fn required_sql(field: &HostField) -> Result<&str, AnalyzeError> {
    field
        .tag
        .sql()
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| AnalyzeError::MissingPredicateTag {
            field: field.name.clone(),
        })
}

fn next_token(raw: &str) -> (&str, &str) {
    let raw = raw.trim_start();
    match raw.find(char::is_whitespace) {
        Some(idx) => (&raw[..idx], raw[idx..].trim()),
        None => (raw, ""),
    }
}

fn invalid_operator(field: &str, op: &str) -> AnalyzeError {
    AnalyzeError::InvalidOperator {
        field: field.to_string(),
        op: op.to_string(),
    }
}

fn invalid_predicate(field: &str, value: &str) -> AnalyzeError {
    AnalyzeError::InvalidPredicate {
        field: field.to_string(),
        value: value.to_string(),
    }
}
