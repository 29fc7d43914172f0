use super::{Column, Constraint, ConstraintKind, Index, Relation, RelationKind};
use crate::{
    catalog::{
        Catalog, CatalogError, Oid,
        query::{invalid, small_int},
    },
    check::CheckError,
    db::{Connection, QueryParam, Row},
};
use tagsql_ir::RelIdent;

pub(crate) const RELATION: &str = "SELECT c.oid, c.relkind::text FROM pg_catalog.pg_class c \
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
WHERE c.relname = $1 AND n.nspname = $2";

pub(crate) const COLUMNS: &str = "SELECT a.attnum, a.attname::text, a.atttypmod, a.attndims, \
a.attnotnull, a.atthasdef, \
COALESCE((SELECT true FROM pg_catalog.pg_index i WHERE i.indrelid = a.attrelid \
AND i.indisprimary AND a.attnum = ANY(i.indkey) LIMIT 1), false), \
a.atttypid \
FROM pg_catalog.pg_attribute a \
WHERE a.attrelid = $1 AND a.attnum > 0 AND NOT a.attisdropped \
ORDER BY a.attnum";

pub(crate) const CONSTRAINTS: &str = "SELECT c.oid, c.conname::text, c.contype::text, \
c.condeferrable, c.condeferred, c.conkey, c.confkey \
FROM pg_catalog.pg_constraint c WHERE c.conrelid = $1 ORDER BY c.oid";

pub(crate) const INDEXES: &str = "SELECT c.relname::text, i.indnatts, i.indisunique, \
i.indisprimary, i.indisexclusion, i.indimmediate, i.indisready, i.indkey::int2[], \
pg_catalog.pg_get_indexdef(i.indexrelid) \
FROM pg_catalog.pg_index i JOIN pg_catalog.pg_class c ON c.oid = i.indexrelid \
WHERE i.indrelid = $1 ORDER BY i.indexrelid";

pub(super) fn load_relation(
    conn: &mut dyn Connection,
    catalog: &Catalog,
    ident: &RelIdent,
    namespace: &str,
) -> Result<Relation, CheckError> {
    let rows = conn.query(
        RELATION,
        &[QueryParam::Text(&ident.name), QueryParam::Text(namespace)],
    )?;
    let Some(row) = rows.first() else {
        return Err(CheckError::RelationNotFound {
            relation: format!("{namespace}.{}", ident.name),
        });
    };
    let oid = row.oid(0)?;
    let kind = RelationKind::from_char(row.char(1)?);

    let columns = load_columns(conn, catalog, oid, &ident.name)?;
    let constraints = load_constraints(conn, oid)?;
    let indexes = load_indexes(conn, oid)?;

    Ok(Relation {
        oid,
        name: ident.name.clone(),
        namespace: namespace.to_string(),
        key: ident.key().to_string(),
        kind,
        columns,
        constraints,
        indexes,
    })
}

fn load_columns(
    conn: &mut dyn Connection,
    catalog: &Catalog,
    relation: Oid,
    relation_name: &str,
) -> Result<Vec<Column>, CheckError> {
    conn.query(COLUMNS, &[QueryParam::Oid(relation)])?
        .iter()
        .map(|row| {
            let name = row.text(1)?.to_string();
            let type_oid = row.oid(7)?;
            let ty = catalog
                .type_by_oid(type_oid)
                .cloned()
                .ok_or_else(|| CheckError::UnknownColumnType {
                    column: format!("{relation_name}.{name}"),
                    oid: type_oid,
                })?;

            Ok(Column {
                ordinal: small_int(row, 0, "columns", "attnum")?,
                name,
                dims: int32(row, 3)?,
                typmod: int32(row, 2)?,
                not_null: row.bool(4)?,
                has_default: row.bool(5)?,
                is_primary: row.bool(6)?,
                ty,
            })
        })
        .collect()
}

fn load_constraints(conn: &mut dyn Connection, relation: Oid) -> Result<Vec<Constraint>, CheckError> {
    conn.query(CONSTRAINTS, &[QueryParam::Oid(relation)])?
        .iter()
        .map(|row| {
            let kind = row.char(2)?;

            Ok(Constraint {
                oid: row.oid(0)?,
                name: row.text(1)?.to_string(),
                kind: ConstraintKind::from_char(kind)
                    .ok_or_else(|| invalid("constraints", "contype", kind))?,
                deferrable: row.bool(3)?,
                deferred: row.bool(4)?,
                key: ordinals(row, 5, "conkey")?,
                foreign_key: ordinals(row, 6, "confkey")?,
            })
        })
        .collect()
}

fn load_indexes(conn: &mut dyn Connection, relation: Oid) -> Result<Vec<Index>, CheckError> {
    conn.query(INDEXES, &[QueryParam::Oid(relation)])?
        .iter()
        .map(|row| {
            Ok(Index {
                name: row.text(0)?.to_string(),
                attribute_count: small_int(row, 1, "indexes", "indnatts")?,
                unique: row.bool(2)?,
                primary: row.bool(3)?,
                exclusion: row.bool(4)?,
                immediate: row.bool(5)?,
                ready: row.bool(6)?,
                key: ordinals(row, 7, "indkey")?,
                definition: row.text(8)?.to_string(),
            })
        })
        .collect()
}

fn int32(row: &Row, index: usize) -> Result<i32, CheckError> {
    let value = row.int(index)?;
    i32::try_from(value).map_err(|_| {
        CheckError::Catalog(CatalogError::InvalidValue {
            query: "columns",
            field: "int4",
            value: value.to_string(),
        })
    })
}

fn ordinals(row: &Row, index: usize, field: &'static str) -> Result<Vec<i16>, CheckError> {
    row.int_array(index)?
        .into_iter()
        .map(|value| {
            i16::try_from(value).map_err(|_| {
                CheckError::Catalog(CatalogError::InvalidValue {
                    query: "relation",
                    field,
                    value: value.to_string(),
                })
            })
        })
        .collect()
}
