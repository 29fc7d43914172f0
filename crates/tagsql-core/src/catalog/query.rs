//! Catalogue introspection queries and their row decoders.
//!
//! The SQL text is part of the compiler's contract with the server; the
//! scripted test connection dispatches on these exact strings.

use super::{
    CastContext, CatalogCast, CatalogError, CatalogOperator, CatalogProcedure, CatalogType, Oid,
    TypeCategory, TypeClass,
};
use crate::db::{Connection, Row};

pub(crate) const CURRENT_DATABASE: &str = "SELECT pg_catalog.current_database()::text";

pub(crate) const SERVER_VERSION: &str = "SHOW server_version_num";

pub(crate) const TYPES: &str = "SELECT t.oid, t.typname::text, pg_catalog.format_type(t.oid, NULL), \
t.typlen, t.typtype::text, t.typcategory::text, t.typelem, t.typispreferred \
FROM pg_catalog.pg_type t";

pub(crate) const OPERATORS: &str = "SELECT o.oprname::text, o.oprleft, o.oprright, o.oprresult \
FROM pg_catalog.pg_operator o WHERE o.oprkind = 'b'";

pub(crate) const CASTS: &str = "SELECT c.casttarget, c.castsource, c.castcontext::text \
FROM pg_catalog.pg_cast c";

pub(crate) const PROCEDURES: &str = "SELECT p.proname::text, p.proargtypes[0], p.prorettype, \
p.prokind = 'a' FROM pg_catalog.pg_proc p WHERE p.pronargs = 1";

/// Before 11 the aggregate flag was a dedicated column.
pub(crate) const PROCEDURES_LEGACY: &str = "SELECT p.proname::text, p.proargtypes[0], \
p.prorettype, p.proisagg FROM pg_catalog.pg_proc p WHERE p.pronargs = 1";

/// First `server_version_num` with `pg_proc.prokind`.
pub(crate) const PROKIND_VERSION: i64 = 110_000;

/// Prefix of the per-literal type probe; the literal follows verbatim.
pub(crate) const LITERAL_TYPE_PREFIX: &str = "SELECT pg_catalog.pg_typeof(";

#[must_use]
pub(crate) fn literal_type_query(literal: &str) -> String {
    format!("{LITERAL_TYPE_PREFIX}{literal})::oid")
}

pub(crate) fn current_database(conn: &mut dyn Connection) -> Result<String, CatalogError> {
    let rows = conn.query(CURRENT_DATABASE, &[])?;
    let row = rows.first().ok_or(CatalogError::NoRows {
        query: "current_database",
    })?;

    Ok(row.text(0)?.to_string())
}

pub(crate) fn server_version(conn: &mut dyn Connection) -> Result<i64, CatalogError> {
    let rows = conn.query(SERVER_VERSION, &[])?;
    let row = rows.first().ok_or(CatalogError::NoRows {
        query: "server_version_num",
    })?;
    let raw = row.text(0)?;

    raw.trim()
        .parse()
        .map_err(|_| CatalogError::InvalidVersion {
            value: raw.to_string(),
        })
}

pub(crate) fn load_types(conn: &mut dyn Connection) -> Result<Vec<CatalogType>, CatalogError> {
    conn.query(TYPES, &[])?
        .iter()
        .map(|row| {
            let class = row.char(4)?;
            let category = row.char(5)?;

            Ok(CatalogType {
                oid: row.oid(0)?,
                name: row.text(1)?.to_string(),
                formatted_name: row.text(2)?.to_string(),
                length: small_int(row, 3, "types", "typlen")?,
                class: TypeClass::from_char(class)
                    .ok_or_else(|| invalid("types", "typtype", class))?,
                category: TypeCategory::from_char(category)
                    .ok_or_else(|| invalid("types", "typcategory", category))?,
                element: row.oid(6)?,
                preferred: row.bool(7)?,
            })
        })
        .collect()
}

pub(crate) fn load_operators(
    conn: &mut dyn Connection,
) -> Result<Vec<CatalogOperator>, CatalogError> {
    conn.query(OPERATORS, &[])?
        .iter()
        .map(|row| {
            Ok(CatalogOperator {
                name: row.text(0)?.to_string(),
                left: row.oid(1)?,
                right: row.oid(2)?,
                result: row.oid(3)?,
            })
        })
        .collect()
}

pub(crate) fn load_casts(conn: &mut dyn Connection) -> Result<Vec<CatalogCast>, CatalogError> {
    conn.query(CASTS, &[])?
        .iter()
        .map(|row| {
            let context = row.char(2)?;

            Ok(CatalogCast {
                target: row.oid(0)?,
                source: row.oid(1)?,
                context: CastContext::from_char(context)
                    .ok_or_else(|| invalid("casts", "castcontext", context))?,
            })
        })
        .collect()
}

/// Single-argument procedures; the query variant follows the server version.
pub(crate) fn load_procedures(
    conn: &mut dyn Connection,
    version: i64,
) -> Result<Vec<(String, CatalogProcedure)>, CatalogError> {
    let sql = if version >= PROKIND_VERSION {
        PROCEDURES
    } else {
        PROCEDURES_LEGACY
    };

    conn.query(sql, &[])?
        .iter()
        .map(|row| {
            Ok((
                row.text(0)?.to_string(),
                CatalogProcedure {
                    arg: row.oid(1)?,
                    ret: row.oid(2)?,
                    aggregate: row.bool(3)?,
                },
            ))
        })
        .collect()
}

/// Type of a literal as the server infers it.
pub(crate) fn literal_type(conn: &mut dyn Connection, literal: &str) -> Result<Oid, CatalogError> {
    let rows = conn.query(&literal_type_query(literal), &[])?;
    let row = rows.first().ok_or(CatalogError::NoRows {
        query: "pg_typeof",
    })?;

    Ok(row.oid(0)?)
}

pub(crate) fn small_int(
    row: &Row,
    index: usize,
    query: &'static str,
    field: &'static str,
) -> Result<i16, CatalogError> {
    let value = row.int(index)?;
    i16::try_from(value).map_err(|_| CatalogError::InvalidValue {
        query,
        field,
        value: value.to_string(),
    })
}

pub(crate) fn invalid(query: &'static str, field: &'static str, value: char) -> CatalogError {
    CatalogError::InvalidValue {
        query,
        field,
        value: value.to_string(),
    }
}
