use super::{Directive, allow, invalid_block_type, once};
use crate::{
    command::{
        ColumnList, Command, CommandKind, ConflictAction, ConflictTarget, NullsOrder,
        OnConflictBlock, OrderItem, RowLimit,
    },
    error::AnalyzeError,
    host::HostField,
    ident::{ColumnIdent, is_ident},
    tag::split_top_level,
};

/// Apply a directive declared directly on the command record.
pub(super) fn command_directive(
    cmd: &mut Command,
    field: &HostField,
    directive: Directive,
) -> Result<(), AnalyzeError> {
    let name = directive.name();

    match directive {
        Directive::OrderBy => {
            allow(cmd, name, &[CommandKind::Select])?;
            once(cmd.order_by.is_some(), name)?;
            cmd.order_by = Some(order_by(field)?);
        }
        Directive::Limit | Directive::Offset => {
            allow(cmd, name, &[CommandKind::Select])?;
            let slot = if directive == Directive::Limit {
                &mut cmd.limit
            } else {
                &mut cmd.offset
            };
            once(slot.is_some(), name)?;

            let raw = required(field)?;
            let value = raw
                .parse::<u64>()
                .map_err(|_| AnalyzeError::InvalidLimitValue {
                    value: raw.to_string(),
                })?;
            *slot = Some(RowLimit::Literal(value));
        }
        Directive::Default => {
            allow(cmd, name, &[CommandKind::Insert, CommandKind::Update])?;
            once(cmd.defaults.is_some(), name)?;
            cmd.defaults = Some(column_list(field)?);
        }
        Directive::Force => {
            allow(cmd, name, &[CommandKind::Insert, CommandKind::Update])?;
            once(cmd.force.is_some(), name)?;
            cmd.force = Some(column_list(field)?);
        }
        Directive::Return => {
            allow(
                cmd,
                name,
                &[CommandKind::Insert, CommandKind::Update, CommandKind::Delete],
            )?;
            once(cmd.returning.is_some(), name)?;
            cmd.returning = Some(column_list(field)?);
        }
        Directive::TextSearch => {
            allow(cmd, name, &[CommandKind::Filter])?;
            once(cmd.text_search.is_some(), name)?;
            let raw = required(field)?;
            cmd.text_search = Some(column(raw)?);
        }
        Directive::All => {
            allow(cmd, name, &[CommandKind::Update, CommandKind::Delete])?;
            once(cmd.all, name)?;
            cmd.all = true;
        }
        _ => {
            return Err(AnalyzeError::InvalidDirectivePlacement {
                directive: name.to_string(),
                block: cmd.name.clone(),
            });
        }
    }

    Ok(())
}

/// Parse an `OnConflict` block.
pub(super) fn on_conflict_block(field: &HostField) -> Result<OnConflictBlock, AnalyzeError> {
    let Some(members) = field.ty.deref_optional().record_fields() else {
        return Err(invalid_block_type("OnConflict", field));
    };

    let mut target = None;
    let mut action = None;
    for member in members {
        let Some(directive) = Directive::of(&member.ty) else {
            return Err(AnalyzeError::InvalidDirectivePlacement {
                directive: member.name.clone(),
                block: field.name.clone(),
            });
        };

        match directive {
            Directive::Column | Directive::Index | Directive::Constraint => {
                if target.is_some() {
                    return Err(AnalyzeError::DuplicateBlock {
                        block: "OnConflict target".to_string(),
                    });
                }
                target = Some(match directive {
                    Directive::Column => match column_list(member)? {
                        ColumnList::Columns(columns) => ConflictTarget::Columns(columns),
                        ColumnList::All => {
                            return Err(AnalyzeError::InvalidTag {
                                field: member.name.clone(),
                                message: "conflict target cannot be '*'".to_string(),
                            });
                        }
                    },
                    Directive::Index => ConflictTarget::Index(object_name(member)?),
                    _ => ConflictTarget::Constraint(object_name(member)?),
                });
            }
            Directive::Ignore | Directive::Update => {
                if action.is_some() {
                    return Err(AnalyzeError::DuplicateBlock {
                        block: "OnConflict action".to_string(),
                    });
                }
                action = Some(if directive == Directive::Ignore {
                    ConflictAction::Ignore
                } else {
                    ConflictAction::Update(column_list(member)?)
                });
            }
            other => {
                return Err(AnalyzeError::InvalidDirectivePlacement {
                    directive: other.name().to_string(),
                    block: field.name.clone(),
                });
            }
        }
    }

    let action = action.ok_or(AnalyzeError::MissingConflictAction)?;
    if matches!(action, ConflictAction::Update(_)) && target.is_none() {
        return Err(AnalyzeError::MissingConflictTarget);
    }

    Ok(OnConflictBlock { target, action })
}

// `[-]col[:nullsfirst|:nullslast],...`
fn order_by(field: &HostField) -> Result<Vec<OrderItem>, AnalyzeError> {
    let raw = required(field)?;

    split_top_level(raw, ',')
        .into_iter()
        .map(|part| {
            let (descending, rest) = match part.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, part),
            };
            let (col, nulls) = match rest.split_once(':') {
                Some((col, nulls)) => {
                    let nulls = match nulls.to_ascii_lowercase().as_str() {
                        "nullsfirst" => NullsOrder::First,
                        "nullslast" => NullsOrder::Last,
                        _ => {
                            return Err(AnalyzeError::InvalidTag {
                                field: field.name.clone(),
                                message: format!("unknown nulls order '{nulls}'"),
                            });
                        }
                    };
                    (col, Some(nulls))
                }
                None => (rest, None),
            };

            Ok(OrderItem {
                column: column(col)?,
                descending,
                nulls,
            })
        })
        .collect()
}

// `col,col` or `*`
fn column_list(field: &HostField) -> Result<ColumnList, AnalyzeError> {
    let raw = required(field)?;
    if raw == "*" {
        return Ok(ColumnList::All);
    }

    split_top_level(raw, ',')
        .into_iter()
        .map(column)
        .collect::<Result<Vec<_>, _>>()
        .map(ColumnList::Columns)
}

fn object_name(field: &HostField) -> Result<String, AnalyzeError> {
    let raw = required(field)?;
    if !is_ident(raw) {
        return Err(AnalyzeError::InvalidTag {
            field: field.name.clone(),
            message: format!("invalid object name '{raw}'"),
        });
    }

    Ok(raw.to_string())
}

fn column(raw: &str) -> Result<ColumnIdent, AnalyzeError> {
    ColumnIdent::parse(raw).ok_or_else(|| AnalyzeError::InvalidColumnIdentifier {
        value: raw.to_string(),
    })
}

fn required(field: &HostField) -> Result<&str, AnalyzeError> {
    field
        .tag
        .sql()
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| AnalyzeError::InvalidTag {
            field: field.name.clone(),
            message: "missing sql tag".to_string(),
        })
}
