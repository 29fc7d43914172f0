use super::{Adapter, Direction, coerce::can_coerce};
use crate::{
    catalog::{Catalog, Oid, TypeClass, oid},
    relation::Column,
};
use tagsql_ir::{HostType, command::FieldInfo};

///
/// Modifier
///
/// Type-modifier constraint of an assignment rule.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Modifier {
    Any,
    /// `char(1)` or `bit(1)`.
    Len1,
    /// `numeric(p, 0)`.
    NoScale,
}

impl Modifier {
    #[must_use]
    pub const fn matches(self, column: &Column) -> bool {
        match self {
            Self::Any => true,
            Self::Len1 => match column.ty.oid {
                // bpchar typmod carries the 4-byte varlena header
                oid::BPCHAR => column.typmod == 5,
                oid::BIT => column.typmod == 1,
                _ => false,
            },
            Self::NoScale => column.typmod != -1 && (column.typmod.wrapping_sub(4) & 0xffff) == 0,
        }
    }
}

///
/// RuleDirection
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuleDirection {
    Read,
    Write,
    Both,
}

impl RuleDirection {
    #[must_use]
    pub const fn allows(self, dir: Direction) -> bool {
        matches!(
            (self, dir),
            (Self::Both, _) | (Self::Read, Direction::Read) | (Self::Write, Direction::Write)
        )
    }
}

///
/// AssignRule
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AssignRule {
    pub oid: Oid,
    pub signature: &'static str,
    pub modifier: Modifier,
    pub direction: RuleDirection,
}

const fn rule(
    oid: Oid,
    signature: &'static str,
    modifier: Modifier,
    direction: RuleDirection,
) -> AssignRule {
    AssignRule {
        oid,
        signature,
        modifier,
        direction,
    }
}

use Modifier::{Any, Len1, NoScale};
use RuleDirection::{Both, Read, Write};

/// Host signatures each column type exchanges values with directly.
/// Wider host integers read narrower columns; narrower ones write wider
/// columns.
pub const ASSIGN_RULES: &[AssignRule] = &[
    rule(oid::BOOL, "bool", Any, Both),
    rule(oid::BIT, "bool", Len1, Both),
    rule(oid::BIT, "text", Any, Both),
    rule(oid::VARBIT, "text", Any, Both),
    // integers
    rule(oid::INT2, "i16", Any, Both),
    rule(oid::INT2, "i32", Any, Read),
    rule(oid::INT2, "i64", Any, Read),
    rule(oid::INT2, "i8", Any, Write),
    rule(oid::INT2, "u8", Any, Write),
    rule(oid::INT4, "i32", Any, Both),
    rule(oid::INT4, "i64", Any, Read),
    rule(oid::INT4, "i8", Any, Write),
    rule(oid::INT4, "i16", Any, Write),
    rule(oid::INT4, "u8", Any, Write),
    rule(oid::INT4, "u16", Any, Write),
    rule(oid::INT8, "i64", Any, Both),
    rule(oid::INT8, "i8", Any, Write),
    rule(oid::INT8, "i16", Any, Write),
    rule(oid::INT8, "i32", Any, Write),
    rule(oid::INT8, "u8", Any, Write),
    rule(oid::INT8, "u16", Any, Write),
    rule(oid::INT8, "u32", Any, Write),
    rule(oid::INT8, "big::Int", Any, Both),
    rule(oid::OID, "u32", Any, Both),
    rule(oid::OID, "i64", Any, Read),
    rule(oid::MONEY, "i64", Any, Both),
    rule(oid::MONEY, "text", Any, Both),
    // floating point and numeric
    rule(oid::FLOAT4, "f32", Any, Both),
    rule(oid::FLOAT4, "f64", Any, Read),
    rule(oid::FLOAT8, "f64", Any, Both),
    rule(oid::FLOAT8, "f32", Any, Write),
    rule(oid::FLOAT8, "big::Float", Any, Both),
    rule(oid::NUMERIC, "big::Int", NoScale, Both),
    rule(oid::NUMERIC, "i64", NoScale, Both),
    rule(oid::NUMERIC, "i32", NoScale, Write),
    rule(oid::NUMERIC, "big::Float", Any, Both),
    rule(oid::NUMERIC, "f64", Any, Both),
    rule(oid::NUMERIC, "f32", Any, Write),
    rule(oid::NUMERIC, "text", Any, Both),
    // character
    rule(oid::TEXT, "text", Any, Both),
    rule(oid::TEXT, "[u8]", Any, Both),
    rule(oid::VARCHAR, "text", Any, Both),
    rule(oid::VARCHAR, "[u8]", Any, Both),
    rule(oid::BPCHAR, "text", Any, Both),
    rule(oid::BPCHAR, "[u8]", Any, Both),
    rule(oid::BPCHAR, "char", Len1, Both),
    rule(oid::BPCHAR, "u8", Len1, Both),
    rule(oid::CHAR, "char", Any, Both),
    rule(oid::CHAR, "u8", Any, Both),
    rule(oid::NAME, "text", Any, Both),
    rule(oid::BYTEA, "[u8]", Any, Both),
    rule(oid::BYTEA, "text", Any, Both),
    rule(oid::UUID, "[u8; 16]", Any, Both),
    rule(oid::UUID, "[u8]", Any, Both),
    rule(oid::UUID, "text", Any, Both),
    // date and time
    rule(oid::DATE, "time", Any, Both),
    rule(oid::TIME, "time", Any, Both),
    rule(oid::TIMETZ, "time", Any, Both),
    rule(oid::TIMESTAMP, "time", Any, Both),
    rule(oid::TIMESTAMPTZ, "time", Any, Both),
    rule(oid::INTERVAL, "i64", Any, Both),
    rule(oid::INTERVAL, "text", Any, Both),
    // documents and text search
    rule(oid::JSON, "text", Any, Both),
    rule(oid::JSON, "[u8]", Any, Both),
    rule(oid::JSONB, "text", Any, Both),
    rule(oid::JSONB, "[u8]", Any, Both),
    rule(oid::XML, "text", Any, Both),
    rule(oid::XML, "[u8]", Any, Both),
    rule(oid::TSVECTOR, "text", Any, Both),
    rule(oid::TSQUERY, "text", Any, Both),
    // network
    rule(oid::INET, "net::IpAddr", Any, Both),
    rule(oid::INET, "net::IpNet", Any, Both),
    rule(oid::INET, "text", Any, Both),
    rule(oid::CIDR, "net::IpNet", Any, Both),
    rule(oid::CIDR, "text", Any, Both),
    rule(oid::MACADDR, "net::MacAddr", Any, Both),
    rule(oid::MACADDR, "text", Any, Both),
    rule(oid::MACADDR8, "net::MacAddr", Any, Both),
    rule(oid::MACADDR8, "text", Any, Both),
    // geometric
    rule(oid::POINT, "[f64; 2]", Any, Both),
    rule(oid::LSEG, "[[f64; 2]; 2]", Any, Both),
    rule(oid::BOX, "[[f64; 2]; 2]", Any, Both),
    rule(oid::PATH, "[[f64; 2]]", Any, Both),
    rule(oid::POLYGON, "[[f64; 2]]", Any, Both),
    rule(oid::LINE, "[f64; 3]", Any, Both),
    rule(oid::CIRCLE, "[f64; 3]", Any, Both),
    // ranges
    rule(oid::INT4RANGE, "[i32; 2]", Any, Both),
    rule(oid::INT8RANGE, "[i64; 2]", Any, Both),
    rule(oid::INT8RANGE, "[i32; 2]", Any, Write),
    rule(oid::NUMRANGE, "[f64; 2]", Any, Both),
    rule(oid::TSRANGE, "[time; 2]", Any, Both),
    rule(oid::TSTZRANGE, "[time; 2]", Any, Both),
    rule(oid::DATERANGE, "[time; 2]", Any, Both),
    // arrays
    rule(oid::BOOL_ARRAY, "[bool]", Any, Both),
    rule(oid::INT2_ARRAY, "[i16]", Any, Both),
    rule(oid::INT2_ARRAY, "[i32]", Any, Read),
    rule(oid::INT2_ARRAY, "[i64]", Any, Read),
    rule(oid::INT4_ARRAY, "[i32]", Any, Both),
    rule(oid::INT4_ARRAY, "[i64]", Any, Read),
    rule(oid::INT4_ARRAY, "[i16]", Any, Write),
    rule(oid::INT8_ARRAY, "[i64]", Any, Both),
    rule(oid::INT8_ARRAY, "[i16]", Any, Write),
    rule(oid::INT8_ARRAY, "[i32]", Any, Write),
    rule(oid::FLOAT4_ARRAY, "[f32]", Any, Both),
    rule(oid::FLOAT4_ARRAY, "[f64]", Any, Read),
    rule(oid::FLOAT8_ARRAY, "[f64]", Any, Both),
    rule(oid::FLOAT8_ARRAY, "[f32]", Any, Write),
    rule(oid::NUMERIC_ARRAY, "[f64]", Any, Both),
    rule(oid::TEXT_ARRAY, "[text]", Any, Both),
    rule(oid::TEXT_ARRAY, "[?text]", Any, Both),
    rule(oid::VARCHAR_ARRAY, "[text]", Any, Both),
    rule(oid::VARCHAR_ARRAY, "[?text]", Any, Both),
    rule(oid::BPCHAR_ARRAY, "[text]", Any, Both),
    rule(oid::BYTEA_ARRAY, "[[u8]]", Any, Both),
    rule(oid::UUID_ARRAY, "[[u8; 16]]", Any, Both),
    rule(oid::UUID_ARRAY, "[text]", Any, Both),
    rule(oid::DATE_ARRAY, "[time]", Any, Both),
    rule(oid::TIMESTAMP_ARRAY, "[time]", Any, Both),
    rule(oid::TIMESTAMPTZ_ARRAY, "[time]", Any, Both),
    rule(oid::INET_ARRAY, "[net::IpAddr]", Any, Both),
    rule(oid::CIDR_ARRAY, "[net::IpNet]", Any, Both),
    rule(oid::MACADDR_ARRAY, "[net::MacAddr]", Any, Both),
    rule(oid::POINT_ARRAY, "[[f64; 2]]", Any, Both),
];

const HSTORE: &str = "hstore";
const HSTORE_SIGNATURES: &[&str] = &["map<text, text>", "map<text, ?text>"];

/// First table rule admitting `(column, sig)` in direction `dir`.
#[must_use]
pub fn find_rule(column: &Column, sig: &str, dir: Direction) -> Option<&'static AssignRule> {
    ASSIGN_RULES.iter().find(|rule| {
        rule.oid == column.ty.oid
            && rule.signature == sig
            && rule.direction.allows(dir)
            && rule.modifier.matches(column)
    })
}

/// Adapter that moves values between `field` and `column` in direction
/// `dir`, if any does.
#[must_use]
pub fn assign_adapter(
    catalog: &Catalog,
    column: &Column,
    field: &FieldInfo,
    dir: Direction,
) -> Option<Adapter> {
    let ty = field.ty.deref_optional();

    let self_codec = match dir {
        Direction::Write => ty.caps.encodes,
        Direction::Read => ty.caps.decodes,
    };
    if self_codec {
        return Some(Adapter::SelfCodec);
    }

    if let Some(adapter) = document_adapter(column, field, ty, dir) {
        return Some(adapter);
    }

    let sig = ty.signature();
    if column.ty.name == HSTORE && HSTORE_SIGNATURES.contains(&sig.as_str()) {
        return Some(Adapter::Hstore);
    }

    if let Some(rule) = find_rule(column, &sig, dir) {
        return Some(Adapter::Table {
            type_name: column.ty.name.clone(),
            signature: rule.signature.to_string(),
        });
    }

    // enum labels travel as text
    if column.ty.class == TypeClass::Enum && sig == "text" {
        return Some(Adapter::Table {
            type_name: column.ty.name.clone(),
            signature: sig,
        });
    }

    if field.options.cast && can_coerce(catalog, column, ty) {
        return Some(Adapter::Coerce);
    }

    None
}

/// True if values can move between `field` and `column` in direction `dir`.
#[must_use]
pub fn can_assign(catalog: &Catalog, column: &Column, field: &FieldInfo, dir: Direction) -> bool {
    assign_adapter(catalog, column, field, dir).is_some()
}

// JSON and XML families, including arrays of them for sequence fields.
fn document_adapter(
    column: &Column,
    field: &FieldInfo,
    ty: &HostType,
    dir: Direction,
) -> Option<Adapter> {
    let (json_scalar, json_array, xml_scalar, xml_array) = (
        matches!(column.ty.oid, oid::JSON | oid::JSONB),
        matches!(column.ty.oid, oid::JSON_ARRAY | oid::JSONB_ARRAY),
        column.ty.oid == oid::XML,
        column.ty.oid == oid::XML_ARRAY,
    );

    let value = if json_array || xml_array {
        ty.sequence_elem()?.deref_optional()
    } else {
        ty
    };

    if json_scalar || json_array {
        let marshals = match dir {
            Direction::Write => value.caps.json_marshal,
            Direction::Read => value.caps.json_unmarshal,
        };
        return (field.options.json || marshals).then_some(Adapter::Json);
    }

    if xml_scalar || xml_array {
        let marshals = match dir {
            Direction::Write => value.caps.xml_marshal,
            Direction::Read => value.caps.xml_unmarshal,
        };
        return (field.options.xml || marshals).then_some(Adapter::Xml);
    }

    None
}
