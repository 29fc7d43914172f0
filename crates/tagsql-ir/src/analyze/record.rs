use super::{AnalyzeOptions, ColumnNaming};
use crate::{
    command::{FieldInfo, IteratorKind, RecordShape},
    error::AnalyzeError,
    host::{HostField, HostKind, HostType, Signature},
    ident::ColumnIdent,
    tag::{ColumnTag, FieldOptions},
};
use tagsql_utils::case::column_name;

/// Classify a relation-bound field and return its record element type.
pub(super) fn record_shape(field: &HostField) -> Result<(RecordShape, &HostType), AnalyzeError> {
    let invalid = || AnalyzeError::InvalidRecordFieldType {
        field: field.name.clone(),
    };
    let ty = &field.ty;

    match &ty.kind {
        HostKind::Record(_) if ty.is_plain_record() => Ok((RecordShape::default(), ty)),
        HostKind::Optional(inner) if inner.is_plain_record() => Ok((
            RecordShape {
                optional: true,
                ..RecordShape::default()
            },
            inner.as_ref(),
        )),
        HostKind::Seq(elem) => {
            let (optional, record) = record_elem(elem).ok_or_else(invalid)?;
            Ok((
                RecordShape {
                    sequence: true,
                    optional,
                    iterator: None,
                },
                record,
            ))
        }
        HostKind::Capability(methods) => {
            let [method] = methods.as_slice() else {
                return Err(invalid_iterator(field));
            };
            let (optional, record) = iterator_elem(&method.sig).ok_or_else(|| invalid_iterator(field))?;
            Ok((
                RecordShape {
                    sequence: false,
                    optional,
                    iterator: Some(IteratorKind::Method {
                        name: method.name.clone(),
                    }),
                },
                record,
            ))
        }
        HostKind::Func(sig) => {
            let (optional, record) = iterator_elem(sig).ok_or_else(|| invalid_iterator(field))?;
            Ok((
                RecordShape {
                    sequence: false,
                    optional,
                    iterator: Some(IteratorKind::Func),
                },
                record,
            ))
        }
        _ => Err(invalid()),
    }
}

fn invalid_iterator(field: &HostField) -> AnalyzeError {
    AnalyzeError::InvalidIteratorType {
        field: field.name.clone(),
    }
}

// A record, or an optional record; the flag reports optionality.
fn record_elem(ty: &HostType) -> Option<(bool, &HostType)> {
    if ty.is_plain_record() {
        return Some((false, ty));
    }
    match &ty.kind {
        HostKind::Optional(inner) if inner.is_plain_record() => Some((true, inner.as_ref())),
        _ => None,
    }
}

// Iterators take exactly one (optional) record and return exactly one error.
fn iterator_elem(sig: &Signature) -> Option<(bool, &HostType)> {
    let [param] = sig.params.as_slice() else {
        return None;
    };
    let [result] = sig.results.as_slice() else {
        return None;
    };
    if !result.is_error_like() {
        return None;
    }

    record_elem(param)
}

/// Flatten a record type into its leaf column fields, depth-first in
/// declaration order.
pub(super) fn flatten_fields(
    record: &HostType,
    options: &AnalyzeOptions,
) -> Result<Vec<FieldInfo>, AnalyzeError> {
    let mut out = Vec::new();
    if let Some(fields) = record.record_fields() {
        flatten_into(fields, &[], "", options, &mut out)?;
    }

    Ok(out)
}

fn flatten_into(
    fields: &[HostField],
    path: &[String],
    prefix: &str,
    options: &AnalyzeOptions,
    out: &mut Vec<FieldInfo>,
) -> Result<(), AnalyzeError> {
    for field in fields {
        let mut field_path = path.to_vec();
        field_path.push(field.name.clone());

        let tag = match field.tag.sql() {
            Some(raw) => Some(ColumnTag::parse(raw).map_err(|message| AnalyzeError::InvalidTag {
                field: field.name.clone(),
                message,
            })?),
            None => None,
        };
        let nested = field.ty.deref_optional().record_fields();

        // embedded records flatten in place unless they name their own prefix
        if field.embedded
            && let Some(children) = nested
            && tag.as_ref().is_none_or(|t| t.nested_prefix().is_none())
        {
            flatten_into(children, &field_path, prefix, options, out)?;
            continue;
        }

        let tag = match tag {
            Some(tag) => tag,
            None => match options.column_naming {
                ColumnNaming::Tagged => continue,
                ColumnNaming::SnakeCase => ColumnTag {
                    column: column_name(&field.name),
                    options: FieldOptions::default(),
                },
            },
        };
        if tag.is_skip() {
            continue;
        }

        if let Some(child_prefix) = tag.nested_prefix() {
            let Some(children) = nested else {
                return Err(AnalyzeError::InvalidTag {
                    field: field.name.clone(),
                    message: "'>' requires a record-typed field".to_string(),
                });
            };
            let prefix = format!("{prefix}{child_prefix}");
            flatten_into(children, &field_path, &prefix, options, out)?;
            continue;
        }

        let column = ColumnIdent::parse(&tag.column).ok_or_else(|| {
            AnalyzeError::InvalidColumnIdentifier {
                value: tag.column.clone(),
            }
        })?;

        out.push(FieldInfo {
            path: field_path,
            column: column.prefixed(prefix),
            ty: field.ty.clone(),
            options: tag.options,
        });
    }

    Ok(())
}
