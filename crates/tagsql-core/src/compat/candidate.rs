use crate::catalog::{Catalog, Oid, oid};
use tagsql_ir::HostType;

/// Extension types resolved by name, keyed by host signature.
const NAMED_CANDIDATES: &[(&str, &str)] = &[
    ("map<text, text>", "hstore"),
    ("map<text, ?text>", "hstore"),
];

/// Column types a host value of the given canonical signature can stand
/// for.
#[must_use]
pub fn signature_candidates(sig: &str) -> &'static [Oid] {
    match sig {
        "bool" => &[oid::BOOL],
        "i8" | "i16" | "u8" => &[oid::INT2],
        "i32" | "u16" => &[oid::INT4],
        "i64" | "u32" | "u64" => &[oid::INT8],
        "f32" => &[oid::FLOAT4],
        "f64" => &[oid::FLOAT8],
        "text" => &[oid::TEXT, oid::VARCHAR, oid::BPCHAR],
        "char" => &[oid::BPCHAR, oid::CHAR],
        "[u8]" => &[oid::BYTEA],
        "time" => &[
            oid::TIMESTAMPTZ,
            oid::TIMESTAMP,
            oid::DATE,
            oid::TIME,
            oid::TIMETZ,
        ],
        "big::Int" => &[oid::NUMERIC, oid::INT8],
        "big::Float" => &[oid::NUMERIC, oid::FLOAT8],
        "net::IpAddr" => &[oid::INET],
        "net::IpNet" => &[oid::CIDR, oid::INET],
        "net::MacAddr" => &[oid::MACADDR, oid::MACADDR8],

        "[bool]" => &[oid::BOOL_ARRAY],
        "[i16]" => &[oid::INT2_ARRAY],
        "[i32]" => &[oid::INT4_ARRAY],
        "[i64]" => &[oid::INT8_ARRAY],
        "[f32]" => &[oid::FLOAT4_ARRAY],
        "[f64]" => &[oid::FLOAT8_ARRAY],
        "[text]" | "[?text]" => &[oid::TEXT_ARRAY, oid::VARCHAR_ARRAY],
        "[[u8]]" => &[oid::BYTEA_ARRAY],
        "[time]" => &[oid::TIMESTAMPTZ_ARRAY, oid::TIMESTAMP_ARRAY, oid::DATE_ARRAY],
        "[net::IpAddr]" => &[oid::INET_ARRAY],

        "[f64; 2]" => &[oid::POINT, oid::NUMRANGE],
        "[[f64; 2]]" => &[oid::PATH, oid::POLYGON],
        "[[f64; 2]; 2]" => &[oid::LSEG, oid::BOX],
        "[f64; 3]" => &[oid::LINE, oid::CIRCLE],
        "[i32; 2]" => &[oid::INT4RANGE],
        "[i64; 2]" => &[oid::INT8RANGE],
        "[time; 2]" => &[oid::TSRANGE, oid::TSTZRANGE, oid::DATERANGE],
        "[u8; 16]" => &[oid::UUID],

        _ => &[],
    }
}

/// Candidate column type oids for a host field type. Optionality is not part
/// of the type identity and is stripped first.
#[must_use]
pub fn field_type_candidate_oids(ty: &HostType, catalog: &Catalog) -> Vec<Oid> {
    let sig = ty.deref_optional().signature();

    let mut out = signature_candidates(&sig).to_vec();
    out.extend(
        NAMED_CANDIDATES
            .iter()
            .filter(|(key, _)| *key == sig)
            .filter_map(|(_, name)| catalog.type_by_name(name))
            .map(|ty| ty.oid),
    );

    out
}
