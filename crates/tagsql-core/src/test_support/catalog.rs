//! Canned catalogue: the built-in types, operators, casts and procedures the
//! compiler relies on, plus `hstore` and one enum as user types.

use crate::catalog::{
    CastContext, Catalog, CatalogCast, CatalogOperator, CatalogProcedure, CatalogType, Oid,
    TypeCategory, TypeClass, oid,
};

pub const HSTORE_OID: Oid = 16_400;
pub const MOOD_OID: Oid = 16_410;
pub const MOOD_ARRAY_OID: Oid = 16_409;

const COMPARISON: &[&str] = &["=", "<>", "<", "<=", ">", ">="];
const EQUALITY: &[&str] = &["=", "<>"];
const PATTERN: &[&str] = &["~~", "!~~", "~~*", "!~~*", "~", "!~", "~*", "!~*"];

fn ty(oid: Oid, name: &str, formatted: &str, length: i16, category: char) -> CatalogType {
    CatalogType {
        oid,
        name: name.to_string(),
        formatted_name: formatted.to_string(),
        length,
        class: TypeClass::Base,
        category: TypeCategory::from_char(category).unwrap_or(TypeCategory::User),
        element: 0,
        preferred: false,
    }
}

fn preferred(mut t: CatalogType) -> CatalogType {
    t.preferred = true;
    t
}

fn class(mut t: CatalogType, class: TypeClass) -> CatalogType {
    t.class = class;
    t
}

fn array(oid: Oid, elem: &CatalogType) -> CatalogType {
    CatalogType {
        oid,
        name: format!("_{}", elem.name),
        formatted_name: format!("{}[]", elem.formatted_name),
        length: -1,
        class: TypeClass::Base,
        category: TypeCategory::Array,
        element: elem.oid,
        preferred: false,
    }
}

/// Every type of the canned catalogue.
#[must_use]
pub fn standard_types() -> Vec<CatalogType> {
    let scalars = vec![
        preferred(ty(oid::BOOL, "bool", "boolean", 1, 'B')),
        ty(oid::BYTEA, "bytea", "bytea", -1, 'U'),
        ty(oid::CHAR, "char", "\"char\"", 1, 'Z'),
        ty(oid::NAME, "name", "name", 64, 'S'),
        ty(oid::INT8, "int8", "bigint", 8, 'N'),
        ty(oid::INT2, "int2", "smallint", 2, 'N'),
        ty(oid::INT4, "int4", "integer", 4, 'N'),
        preferred(ty(oid::TEXT, "text", "text", -1, 'S')),
        preferred(ty(oid::OID, "oid", "oid", 4, 'N')),
        ty(oid::JSON, "json", "json", -1, 'U'),
        ty(oid::XML, "xml", "xml", -1, 'U'),
        ty(oid::POINT, "point", "point", 16, 'G'),
        ty(oid::LSEG, "lseg", "lseg", 32, 'G'),
        ty(oid::PATH, "path", "path", -1, 'G'),
        ty(oid::BOX, "box", "box", 32, 'G'),
        ty(oid::POLYGON, "polygon", "polygon", -1, 'G'),
        ty(oid::LINE, "line", "line", 24, 'G'),
        ty(oid::CIDR, "cidr", "cidr", -1, 'I'),
        ty(oid::FLOAT4, "float4", "real", 4, 'N'),
        preferred(ty(oid::FLOAT8, "float8", "double precision", 8, 'N')),
        class(ty(oid::UNKNOWN, "unknown", "unknown", -2, 'X'), TypeClass::Pseudo),
        ty(oid::CIRCLE, "circle", "circle", 24, 'G'),
        ty(oid::MACADDR8, "macaddr8", "macaddr8", 8, 'U'),
        ty(oid::MONEY, "money", "money", 8, 'N'),
        ty(oid::MACADDR, "macaddr", "macaddr", 6, 'U'),
        preferred(ty(oid::INET, "inet", "inet", -1, 'I')),
        ty(oid::BPCHAR, "bpchar", "character", -1, 'S'),
        ty(oid::VARCHAR, "varchar", "character varying", -1, 'S'),
        ty(oid::DATE, "date", "date", 4, 'D'),
        ty(oid::TIME, "time", "time without time zone", 8, 'D'),
        ty(oid::TIMESTAMP, "timestamp", "timestamp without time zone", 8, 'D'),
        preferred(ty(oid::TIMESTAMPTZ, "timestamptz", "timestamp with time zone", 8, 'D')),
        preferred(ty(oid::INTERVAL, "interval", "interval", 16, 'T')),
        ty(oid::TIMETZ, "timetz", "time with time zone", 12, 'D'),
        ty(oid::BIT, "bit", "bit", -1, 'V'),
        preferred(ty(oid::VARBIT, "varbit", "bit varying", -1, 'V')),
        ty(oid::NUMERIC, "numeric", "numeric", -1, 'N'),
        ty(oid::UUID, "uuid", "uuid", 16, 'U'),
        ty(oid::TSVECTOR, "tsvector", "tsvector", -1, 'U'),
        ty(oid::TSQUERY, "tsquery", "tsquery", -1, 'U'),
        ty(oid::JSONB, "jsonb", "jsonb", -1, 'U'),
        class(ty(oid::INT4RANGE, "int4range", "int4range", -1, 'R'), TypeClass::Range),
        class(ty(oid::NUMRANGE, "numrange", "numrange", -1, 'R'), TypeClass::Range),
        class(ty(oid::TSRANGE, "tsrange", "tsrange", -1, 'R'), TypeClass::Range),
        class(ty(oid::TSTZRANGE, "tstzrange", "tstzrange", -1, 'R'), TypeClass::Range),
        class(ty(oid::DATERANGE, "daterange", "daterange", -1, 'R'), TypeClass::Range),
        class(ty(oid::INT8RANGE, "int8range", "int8range", -1, 'R'), TypeClass::Range),
        class(ty(oid::ANY, "any", "\"any\"", 4, 'P'), TypeClass::Pseudo),
        class(ty(oid::ANYARRAY, "anyarray", "anyarray", -1, 'P'), TypeClass::Pseudo),
        class(ty(oid::ANYELEMENT, "anyelement", "anyelement", 4, 'P'), TypeClass::Pseudo),
        class(ty(oid::ANYENUM, "anyenum", "anyenum", 4, 'P'), TypeClass::Pseudo),
        class(ty(oid::ANYRANGE, "anyrange", "anyrange", -1, 'P'), TypeClass::Pseudo),
        ty(HSTORE_OID, "hstore", "hstore", -1, 'U'),
        class(ty(MOOD_OID, "mood", "mood", 4, 'E'), TypeClass::Enum),
    ];

    let arrays: &[(Oid, Oid)] = &[
        (oid::XML_ARRAY, oid::XML),
        (oid::JSON_ARRAY, oid::JSON),
        (oid::CIDR_ARRAY, oid::CIDR),
        (oid::CIRCLE_ARRAY, oid::CIRCLE),
        (oid::MONEY_ARRAY, oid::MONEY),
        (oid::BOOL_ARRAY, oid::BOOL),
        (oid::BYTEA_ARRAY, oid::BYTEA),
        (oid::CHAR_ARRAY, oid::CHAR),
        (oid::NAME_ARRAY, oid::NAME),
        (oid::INT2_ARRAY, oid::INT2),
        (oid::INT4_ARRAY, oid::INT4),
        (oid::TEXT_ARRAY, oid::TEXT),
        (oid::BPCHAR_ARRAY, oid::BPCHAR),
        (oid::VARCHAR_ARRAY, oid::VARCHAR),
        (oid::INT8_ARRAY, oid::INT8),
        (oid::POINT_ARRAY, oid::POINT),
        (oid::FLOAT4_ARRAY, oid::FLOAT4),
        (oid::FLOAT8_ARRAY, oid::FLOAT8),
        (oid::OID_ARRAY, oid::OID),
        (oid::MACADDR_ARRAY, oid::MACADDR),
        (oid::INET_ARRAY, oid::INET),
        (oid::TIMESTAMP_ARRAY, oid::TIMESTAMP),
        (oid::DATE_ARRAY, oid::DATE),
        (oid::TIME_ARRAY, oid::TIME),
        (oid::TIMESTAMPTZ_ARRAY, oid::TIMESTAMPTZ),
        (oid::INTERVAL_ARRAY, oid::INTERVAL),
        (oid::NUMERIC_ARRAY, oid::NUMERIC),
        (oid::UUID_ARRAY, oid::UUID),
        (oid::JSONB_ARRAY, oid::JSONB),
        (oid::INT4RANGE_ARRAY, oid::INT4RANGE),
        (MOOD_ARRAY_OID, MOOD_OID),
    ];

    let mut types = scalars;
    for (array_oid, elem_oid) in arrays {
        if let Some(elem) = types.iter().find(|t| t.oid == *elem_oid) {
            let t = array(*array_oid, elem);
            types.push(t);
        }
    }
    for (vector_oid, name, elem) in [
        (oid::INT2VECTOR, "int2vector", oid::INT2),
        (oid::OIDVECTOR, "oidvector", oid::OID),
    ] {
        let mut t = ty(vector_oid, name, name, -1, 'A');
        t.element = elem;
        types.push(t);
    }

    types
}

/// Binary operators; every result is `bool`.
#[must_use]
pub fn standard_operators() -> Vec<CatalogOperator> {
    let mut ops = Vec::new();
    let mut add = |names: &[&str], left: Oid, right: Oid| {
        for name in names {
            ops.push(CatalogOperator {
                name: (*name).to_string(),
                left,
                right,
                result: oid::BOOL,
            });
        }
    };

    add(EQUALITY, oid::BOOL, oid::BOOL);
    for same in [
        oid::INT2,
        oid::INT4,
        oid::INT8,
        oid::FLOAT4,
        oid::FLOAT8,
        oid::NUMERIC,
        oid::TEXT,
        oid::BPCHAR,
        oid::NAME,
        oid::CHAR,
        oid::BYTEA,
        oid::OID,
        oid::MONEY,
        oid::DATE,
        oid::TIME,
        oid::TIMETZ,
        oid::TIMESTAMP,
        oid::TIMESTAMPTZ,
        oid::INTERVAL,
        oid::UUID,
        oid::INET,
        oid::MACADDR,
        oid::MACADDR8,
        oid::BIT,
        oid::VARBIT,
        oid::JSONB,
        oid::TSVECTOR,
    ] {
        add(COMPARISON, same, same);
    }

    for (left, right) in [
        (oid::INT2, oid::INT4),
        (oid::INT4, oid::INT2),
        (oid::INT2, oid::INT8),
        (oid::INT8, oid::INT2),
        (oid::INT4, oid::INT8),
        (oid::INT8, oid::INT4),
        (oid::FLOAT4, oid::FLOAT8),
        (oid::FLOAT8, oid::FLOAT4),
    ] {
        add(COMPARISON, left, right);
    }

    add(PATTERN, oid::TEXT, oid::TEXT);
    add(PATTERN, oid::BPCHAR, oid::TEXT);
    add(PATTERN, oid::NAME, oid::TEXT);

    add(COMPARISON, oid::ANYARRAY, oid::ANYARRAY);
    add(COMPARISON, oid::ANYENUM, oid::ANYENUM);
    add(COMPARISON, oid::ANYRANGE, oid::ANYRANGE);

    ops
}

/// Implicit, assignment and explicit casts between built-in types.
#[must_use]
pub fn standard_casts() -> Vec<CatalogCast> {
    use CastContext::{Assignment, Explicit, Implicit};

    let table: &[(Oid, Oid, CastContext)] = &[
        // (source, target, context)
        (oid::INT2, oid::INT4, Implicit),
        (oid::INT2, oid::INT8, Implicit),
        (oid::INT2, oid::FLOAT4, Implicit),
        (oid::INT2, oid::FLOAT8, Implicit),
        (oid::INT2, oid::NUMERIC, Implicit),
        (oid::INT4, oid::INT8, Implicit),
        (oid::INT4, oid::FLOAT4, Implicit),
        (oid::INT4, oid::FLOAT8, Implicit),
        (oid::INT4, oid::NUMERIC, Implicit),
        (oid::INT8, oid::FLOAT4, Implicit),
        (oid::INT8, oid::FLOAT8, Implicit),
        (oid::INT8, oid::NUMERIC, Implicit),
        (oid::FLOAT4, oid::FLOAT8, Implicit),
        (oid::NUMERIC, oid::FLOAT4, Implicit),
        (oid::NUMERIC, oid::FLOAT8, Implicit),
        (oid::VARCHAR, oid::TEXT, Implicit),
        (oid::BPCHAR, oid::TEXT, Implicit),
        (oid::NAME, oid::TEXT, Implicit),
        (oid::TEXT, oid::VARCHAR, Implicit),
        (oid::TEXT, oid::BPCHAR, Implicit),
        (oid::TEXT, oid::NAME, Implicit),
        (oid::DATE, oid::TIMESTAMP, Implicit),
        (oid::DATE, oid::TIMESTAMPTZ, Implicit),
        (oid::TIMESTAMP, oid::TIMESTAMPTZ, Implicit),
        (oid::TIME, oid::INTERVAL, Implicit),
        (oid::TIME, oid::TIMETZ, Implicit),
        (oid::CIDR, oid::INET, Implicit),
        (oid::INT4, oid::INT2, Assignment),
        (oid::INT8, oid::INT2, Assignment),
        (oid::INT8, oid::INT4, Assignment),
        (oid::FLOAT8, oid::FLOAT4, Assignment),
        (oid::FLOAT8, oid::INT8, Assignment),
        (oid::NUMERIC, oid::INT2, Assignment),
        (oid::NUMERIC, oid::INT4, Assignment),
        (oid::NUMERIC, oid::INT8, Assignment),
        (oid::TIMESTAMPTZ, oid::TIMESTAMP, Assignment),
        (oid::TIMESTAMPTZ, oid::DATE, Assignment),
        (oid::TIMESTAMP, oid::DATE, Assignment),
        (oid::INET, oid::CIDR, Assignment),
        (oid::INT4, oid::BOOL, Explicit),
        (oid::BOOL, oid::INT4, Explicit),
        (oid::JSON, oid::JSONB, Explicit),
        (oid::JSONB, oid::JSON, Explicit),
    ];

    table
        .iter()
        .map(|(source, target, context)| CatalogCast {
            target: *target,
            source: *source,
            context: *context,
        })
        .collect()
}

/// Single-argument procedures, keyed by name.
#[must_use]
pub fn standard_procedures() -> Vec<(String, CatalogProcedure)> {
    let table: &[(&str, Oid, Oid, bool)] = &[
        ("lower", oid::TEXT, oid::TEXT, false),
        ("upper", oid::TEXT, oid::TEXT, false),
        ("length", oid::TEXT, oid::INT4, false),
        ("length", oid::BYTEA, oid::INT4, false),
        ("abs", oid::INT4, oid::INT4, false),
        ("abs", oid::INT8, oid::INT8, false),
        ("abs", oid::FLOAT8, oid::FLOAT8, false),
        ("date", oid::TIMESTAMPTZ, oid::DATE, false),
        ("max", oid::INT4, oid::INT4, true),
    ];

    table
        .iter()
        .map(|(name, arg, ret, aggregate)| {
            (
                (*name).to_string(),
                CatalogProcedure {
                    arg: *arg,
                    ret: *ret,
                    aggregate: *aggregate,
                },
            )
        })
        .collect()
}

/// The canned catalogue as a snapshot, for tests that skip introspection.
#[must_use]
pub fn standard_catalog() -> Catalog {
    Catalog::new(
        standard_types(),
        standard_operators(),
        standard_casts(),
        standard_procedures(),
    )
}
