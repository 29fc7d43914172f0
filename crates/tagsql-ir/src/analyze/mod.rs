//! SpecAnalyzer: parses the annotated fields of one command record into a
//! [`Command`]. Pure and deterministic; no database access.

mod blocks;
mod predicate;
mod record;

#[cfg(test)]
mod tests;

use crate::{
    command::{Command, CommandKind, RecordDescriptor, ResultDescriptor, RowLimit},
    error::AnalyzeError,
    host::{HostField, HostKind, HostType},
    ident::RelIdent,
    predicate::FieldRef,
};
use serde::{Deserialize, Serialize};
use tagsql_utils::case::strip_prefix_ci;

/// Module under which the frontend reports directive marker types.
pub const DIRECTIVE_MODULE: &str = "tagsql";

///
/// ColumnNaming
///
/// How record fields without a `sql` tag map to columns.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnNaming {
    /// Untagged fields are not columns.
    #[default]
    Tagged,
    /// Untagged fields map to the snake-case form of their name.
    SnakeCase,
}

///
/// AnalyzeOptions
///

#[derive(Clone, Copy, Debug, Default)]
pub struct AnalyzeOptions {
    pub column_naming: ColumnNaming,
}

///
/// Directive
///
/// Marker types recognised inside command records and their blocks.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Directive {
    All,
    And,
    Column,
    Constraint,
    CrossJoin,
    Default,
    Force,
    FullJoin,
    Ignore,
    Index,
    Join,
    LeftJoin,
    Limit,
    Offset,
    Or,
    OrderBy,
    Return,
    RightJoin,
    TextSearch,
    Update,
}

impl Directive {
    #[must_use]
    pub fn of(ty: &HostType) -> Option<Self> {
        let name = ty.name.as_ref()?;
        if name.module != DIRECTIVE_MODULE {
            return None;
        }

        let directive = match name.name.as_str() {
            "All" => Self::All,
            "And" => Self::And,
            "Column" => Self::Column,
            "Constraint" => Self::Constraint,
            "CrossJoin" => Self::CrossJoin,
            "Default" => Self::Default,
            "Force" => Self::Force,
            "FullJoin" => Self::FullJoin,
            "Ignore" => Self::Ignore,
            "Index" => Self::Index,
            "Join" => Self::Join,
            "LeftJoin" => Self::LeftJoin,
            "Limit" => Self::Limit,
            "Offset" => Self::Offset,
            "Or" => Self::Or,
            "OrderBy" => Self::OrderBy,
            "Return" => Self::Return,
            "RightJoin" => Self::RightJoin,
            "TextSearch" => Self::TextSearch,
            "Update" => Self::Update,
            _ => return None,
        };

        Some(directive)
    }

    /// Host type of this directive, as the frontend reports it.
    #[must_use]
    pub fn host_type(self) -> HostType {
        HostType::new(HostKind::Opaque).named(DIRECTIVE_MODULE, self.name())
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::And => "And",
            Self::Column => "Column",
            Self::Constraint => "Constraint",
            Self::CrossJoin => "CrossJoin",
            Self::Default => "Default",
            Self::Force => "Force",
            Self::FullJoin => "FullJoin",
            Self::Ignore => "Ignore",
            Self::Index => "Index",
            Self::Join => "Join",
            Self::LeftJoin => "LeftJoin",
            Self::Limit => "Limit",
            Self::Offset => "Offset",
            Self::Or => "Or",
            Self::OrderBy => "OrderBy",
            Self::Return => "Return",
            Self::RightJoin => "RightJoin",
            Self::TextSearch => "TextSearch",
            Self::Update => "Update",
        }
    }
}

/// Parse one command record into a [`Command`].
pub fn analyze_command(
    name: &str,
    fields: &[HostField],
    options: &AnalyzeOptions,
) -> Result<Command, AnalyzeError> {
    let kind = command_kind(name)?;
    let record_field = find_record_field(name, fields)?;
    let record = analyze_record(record_field, options)?;

    let mut cmd = Command::new(name, kind, record);
    for field in fields {
        if std::ptr::eq(field, record_field) {
            continue;
        }
        analyze_member(&mut cmd, field, options)?;
    }

    finish(&cmd)?;

    Ok(cmd)
}

/// Command kind from a case-insensitive name prefix.
pub fn command_kind(name: &str) -> Result<CommandKind, AnalyzeError> {
    CommandKind::ALL
        .into_iter()
        .find(|kind| strip_prefix_ci(name, &kind.to_string()).is_some())
        .ok_or_else(|| AnalyzeError::UnrecognizedCommandKind {
            name: name.to_string(),
        })
}

fn find_record_field<'a>(
    command: &str,
    fields: &'a [HostField],
) -> Result<&'a HostField, AnalyzeError> {
    let mut found: Option<&HostField> = None;
    for field in fields.iter().filter(|f| f.tag.rel().is_some()) {
        if let Some(first) = found {
            return Err(AnalyzeError::MultipleRecordFields {
                first: first.name.clone(),
                second: field.name.clone(),
            });
        }
        found = Some(field);
    }

    found.ok_or_else(|| AnalyzeError::MissingRecordField {
        command: command.to_string(),
    })
}

fn analyze_record(
    field: &HostField,
    options: &AnalyzeOptions,
) -> Result<RecordDescriptor, AnalyzeError> {
    let raw = field.tag.rel().unwrap_or_default();
    let rel = RelIdent::parse(raw).ok_or_else(|| AnalyzeError::InvalidRelationIdentifier {
        value: raw.to_string(),
    })?;

    let (shape, record_ty) = record::record_shape(field)?;
    let fields = record::flatten_fields(record_ty, options)?;

    Ok(RecordDescriptor {
        field: field.name.clone(),
        type_name: record_ty.name.clone(),
        shape,
        rel,
        fields,
    })
}

fn analyze_member(
    cmd: &mut Command,
    field: &HostField,
    options: &AnalyzeOptions,
) -> Result<(), AnalyzeError> {
    if let Some(directive) = Directive::of(&field.ty) {
        return blocks::command_directive(cmd, field, directive);
    }

    let block = field.name.to_ascii_lowercase();
    match block.as_str() {
        "where" => {
            allow(cmd, "Where", &[CommandKind::Select, CommandKind::Update, CommandKind::Delete])?;
            once(cmd.where_block.is_some(), "Where")?;
            cmd.where_block = Some(predicate::where_block(field)?);
        }
        "join" | "from" | "using" => {
            let allowed: &[CommandKind] = match block.as_str() {
                "from" => &[CommandKind::Update],
                "using" => &[CommandKind::Delete],
                _ => &[CommandKind::Select, CommandKind::Update, CommandKind::Delete],
            };
            allow(cmd, &field.name, allowed)?;
            once(cmd.join.is_some(), &field.name)?;
            cmd.join = Some(predicate::join_block(field)?);
        }
        "onconflict" => {
            allow(cmd, "OnConflict", &[CommandKind::Insert])?;
            once(cmd.on_conflict.is_some(), "OnConflict")?;
            cmd.on_conflict = Some(blocks::on_conflict_block(field)?);
        }
        "limit" | "offset" => {
            allow(cmd, &field.name, &[CommandKind::Select])?;
            if !field.ty.deref_optional().is_integer() {
                return Err(invalid_block_type(&field.name, field));
            }
            let slot = if block == "limit" {
                &mut cmd.limit
            } else {
                &mut cmd.offset
            };
            once(slot.is_some(), &field.name)?;
            *slot = Some(RowLimit::Field(field_ref(field)));
        }
        "result" => {
            allow(cmd, "Result", &[CommandKind::Insert, CommandKind::Update, CommandKind::Delete])?;
            once(cmd.result.is_some(), "Result")?;
            let (shape, record_ty) = record::record_shape(field)?;
            cmd.result = Some(ResultDescriptor {
                field: field.name.clone(),
                type_name: record_ty.name.clone(),
                shape,
                fields: record::flatten_fields(record_ty, options)?,
            });
        }
        "rowsaffected" => {
            allow(cmd, "RowsAffected", &[CommandKind::Insert, CommandKind::Update, CommandKind::Delete])?;
            once(cmd.rows_affected.is_some(), "RowsAffected")?;
            if !field.ty.is_integer() {
                return Err(invalid_block_type("RowsAffected", field));
            }
            cmd.rows_affected = Some(field_ref(field));
        }
        "errorhandler" => {
            once(cmd.error_handler.is_some(), "ErrorHandler")?;
            if !matches!(field.ty.kind, HostKind::Capability(_) | HostKind::Func(_)) {
                return Err(invalid_block_type("ErrorHandler", field));
            }
            cmd.error_handler = Some(field_ref(field));
        }
        _ => {
            // NOTE: unrelated host fields are ignored
        }
    }

    Ok(())
}

fn finish(cmd: &Command) -> Result<(), AnalyzeError> {
    if cmd.returning.is_some() && cmd.result.is_some() {
        return Err(AnalyzeError::ConflictingBlocks {
            first: "Return".to_string(),
            second: "Result".to_string(),
        });
    }

    if matches!(cmd.kind, CommandKind::Update | CommandKind::Delete) {
        if cmd.where_block.is_none() && !cmd.all {
            return Err(AnalyzeError::MissingWhereOrAll {
                command: cmd.name.clone(),
            });
        }
        if cmd.where_block.is_some() && cmd.all {
            return Err(AnalyzeError::ConflictingBlocks {
                first: "Where".to_string(),
                second: "All".to_string(),
            });
        }
    }

    Ok(())
}

pub(crate) fn allow(cmd: &Command, block: &str, kinds: &[CommandKind]) -> Result<(), AnalyzeError> {
    if kinds.contains(&cmd.kind) {
        Ok(())
    } else {
        Err(AnalyzeError::BlockNotAllowed {
            block: block.to_string(),
            kind: cmd.kind.to_string(),
        })
    }
}

pub(crate) fn once(present: bool, block: &str) -> Result<(), AnalyzeError> {
    if present {
        Err(AnalyzeError::DuplicateBlock {
            block: block.to_string(),
        })
    } else {
        Ok(())
    }
}

pub(crate) fn field_ref(field: &HostField) -> FieldRef {
    FieldRef {
        path: vec![field.name.clone()],
        ty: field.ty.clone(),
    }
}

pub(crate) fn invalid_block_type(block: &str, field: &HostField) -> AnalyzeError {
    AnalyzeError::InvalidBlockType {
        block: block.to_string(),
        field: field.name.clone(),
    }
}
