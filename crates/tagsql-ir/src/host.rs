//! Host type model.
//!
//! This is the contract with the source-reflection frontend: for every field
//! of an annotated record it reports a name, the raw tag options and a type
//! shape. Nothing here knows about SQL; the compatibility engine consumes the
//! canonical signature produced by [`HostType::signature`].

use crate::tag::Tag;
use std::fmt::{self, Write as _};

///
/// ScalarKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScalarKind {
    Bool,
    Char,
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    Text,
    U8,
    U16,
    U32,
    U64,
}

impl ScalarKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Char => "char",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Text => "text",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }

    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// TypeName
///
/// Named-type identity: the owning module plus the declared name.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TypeName {
    pub module: String,
    pub name: String,
}

impl TypeName {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn is(&self, module: &str, name: &str) -> bool {
        self.module == module && self.name == name
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

/// Named host types with a dedicated column mapping. The frontend reports
/// library types under these canonical names.
pub const WELL_KNOWN_TYPES: &[(&str, &str)] = &[
    ("big", "Float"),
    ("big", "Int"),
    ("net", "IpAddr"),
    ("net", "IpNet"),
    ("net", "MacAddr"),
];

///
/// Capabilities
///
/// Capability flags the frontend derives from the methods a type implements.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[expect(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Encodes itself into a column value (write direction).
    pub encodes: bool,
    /// Decodes itself from a column value (read direction).
    pub decodes: bool,
    pub json_marshal: bool,
    pub json_unmarshal: bool,
    pub xml_marshal: bool,
    pub xml_unmarshal: bool,
    pub time_like: bool,
    pub error_like: bool,
}

///
/// Signature
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Signature {
    pub params: Vec<HostType>,
    pub results: Vec<HostType>,
}

///
/// HostMethod
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostMethod {
    pub name: String,
    pub sig: Signature,
}

///
/// HostKind
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HostKind {
    Scalar(ScalarKind),
    Array { len: usize, elem: Box<HostType> },
    Seq(Box<HostType>),
    Map { key: Box<HostType>, value: Box<HostType> },
    Optional(Box<HostType>),
    Record(Vec<HostField>),
    Capability(Vec<HostMethod>),
    Func(Signature),
    Opaque,
}

///
/// HostType
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostType {
    pub kind: HostKind,
    pub name: Option<TypeName>,
    pub caps: Capabilities,
}

impl HostType {
    #[must_use]
    pub const fn new(kind: HostKind) -> Self {
        Self {
            kind,
            name: None,
            caps: Capabilities {
                encodes: false,
                decodes: false,
                json_marshal: false,
                json_unmarshal: false,
                xml_marshal: false,
                xml_unmarshal: false,
                time_like: false,
                error_like: false,
            },
        }
    }

    #[must_use]
    pub const fn scalar(kind: ScalarKind) -> Self {
        Self::new(HostKind::Scalar(kind))
    }

    #[must_use]
    pub const fn text() -> Self {
        Self::scalar(ScalarKind::Text)
    }

    #[must_use]
    pub fn bytes() -> Self {
        Self::seq(Self::scalar(ScalarKind::U8))
    }

    #[must_use]
    pub fn seq(elem: Self) -> Self {
        Self::new(HostKind::Seq(Box::new(elem)))
    }

    #[must_use]
    pub fn array(len: usize, elem: Self) -> Self {
        Self::new(HostKind::Array {
            len,
            elem: Box::new(elem),
        })
    }

    #[must_use]
    pub fn map(key: Self, value: Self) -> Self {
        Self::new(HostKind::Map {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::new(HostKind::Optional(Box::new(inner)))
    }

    #[must_use]
    pub const fn record(fields: Vec<HostField>) -> Self {
        Self::new(HostKind::Record(fields))
    }

    #[must_use]
    pub fn func(params: Vec<Self>, results: Vec<Self>) -> Self {
        Self::new(HostKind::Func(Signature { params, results }))
    }

    #[must_use]
    pub fn capability(methods: Vec<HostMethod>) -> Self {
        Self::new(HostKind::Capability(methods))
    }

    /// An opaque named type implementing the error capability.
    #[must_use]
    pub fn error() -> Self {
        let mut ty = Self::new(HostKind::Opaque).named("builtin", "error");
        ty.caps.error_like = true;
        ty
    }

    /// An opaque time-like type.
    #[must_use]
    pub fn time() -> Self {
        let mut ty = Self::new(HostKind::Opaque).named("time", "Time");
        ty.caps.time_like = true;
        ty
    }

    #[must_use]
    pub fn named(mut self, module: &str, name: &str) -> Self {
        self.name = Some(TypeName::new(module, name));
        self
    }

    #[must_use]
    pub const fn with_caps(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self.kind, HostKind::Optional(_))
    }

    /// Strip one level of optionality.
    #[must_use]
    pub fn deref_optional(&self) -> &Self {
        match &self.kind {
            HostKind::Optional(inner) => inner,
            _ => self,
        }
    }

    #[must_use]
    pub fn is_well_known(&self) -> bool {
        self.name.as_ref().is_some_and(|name| {
            WELL_KNOWN_TYPES
                .iter()
                .any(|(module, ident)| name.is(module, ident))
        })
    }

    /// True for plain record shapes whose fields map to columns. Records
    /// that carry their own value semantics (time, codecs, well-known types)
    /// are leaves.
    #[must_use]
    pub fn is_plain_record(&self) -> bool {
        matches!(self.kind, HostKind::Record(_))
            && !self.caps.time_like
            && !self.caps.encodes
            && !self.caps.decodes
            && !self.is_well_known()
    }

    #[must_use]
    pub fn record_fields(&self) -> Option<&[HostField]> {
        match &self.kind {
            HostKind::Record(fields) if self.is_plain_record() => Some(fields),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self.kind, HostKind::Scalar(kind) if kind.is_integer())
    }

    #[must_use]
    pub const fn is_error_like(&self) -> bool {
        self.caps.error_like
    }

    /// Byte sequences are scalar values, not sequences of elements.
    #[must_use]
    pub const fn is_bytes(&self) -> bool {
        match &self.kind {
            HostKind::Seq(elem) => matches!(elem.kind, HostKind::Scalar(ScalarKind::U8)),
            _ => false,
        }
    }

    /// Element type of a sequence-shaped value (sequences and fixed arrays,
    /// byte sequences excluded).
    #[must_use]
    pub fn sequence_elem(&self) -> Option<&Self> {
        if self.is_bytes() || self.caps.encodes || self.caps.decodes {
            return None;
        }

        match &self.kind {
            HostKind::Seq(elem) | HostKind::Array { elem, .. } => Some(elem),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_sequence(&self) -> bool {
        self.sequence_elem().is_some()
    }

    /// Canonical signature used as the key of the compatibility tables.
    #[must_use]
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    fn write_signature(&self, out: &mut String) {
        if self.caps.time_like {
            out.push_str("time");
            return;
        }
        if self.is_well_known()
            && let Some(name) = &self.name
        {
            let _ = write!(out, "{name}");
            return;
        }

        match &self.kind {
            HostKind::Scalar(kind) => out.push_str(kind.as_str()),
            HostKind::Array { len, elem } => {
                out.push('[');
                elem.write_signature(out);
                let _ = write!(out, "; {len}]");
            }
            HostKind::Seq(elem) => {
                out.push('[');
                elem.write_signature(out);
                out.push(']');
            }
            HostKind::Map { key, value } => {
                out.push_str("map<");
                key.write_signature(out);
                out.push_str(", ");
                value.write_signature(out);
                out.push('>');
            }
            HostKind::Optional(inner) => {
                out.push('?');
                inner.write_signature(out);
            }
            HostKind::Record(_)
            | HostKind::Capability(_)
            | HostKind::Func(_)
            | HostKind::Opaque => match &self.name {
                Some(name) => {
                    let _ = write!(out, "{name}");
                }
                None => out.push_str("record"),
            },
        }
    }
}

///
/// HostField
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostField {
    pub name: String,
    pub tag: Tag,
    pub ty: HostType,
    pub embedded: bool,
}

impl HostField {
    pub fn new(name: impl Into<String>, tag: Tag, ty: HostType) -> Self {
        Self {
            name: name.into(),
            tag,
            ty,
            embedded: false,
        }
    }

    /// Field carrying a single `sql` tag value.
    pub fn sql(name: impl Into<String>, sql: &str, ty: HostType) -> Self {
        Self::new(name, Tag::new().with("sql", sql), ty)
    }

    #[must_use]
    pub const fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_renders_structural_shapes() {
        assert_eq!(HostType::text().signature(), "text");
        assert_eq!(HostType::bytes().signature(), "[u8]");
        assert_eq!(
            HostType::seq(HostType::optional(HostType::text())).signature(),
            "[?text]"
        );
        assert_eq!(
            HostType::array(2, HostType::scalar(ScalarKind::F64)).signature(),
            "[f64; 2]"
        );
        assert_eq!(
            HostType::map(HostType::text(), HostType::optional(HostType::text())).signature(),
            "map<text, ?text>"
        );
    }

    #[test]
    fn signature_prefers_time_and_well_known_names() {
        assert_eq!(HostType::time().signature(), "time");
        assert_eq!(
            HostType::seq(HostType::time()).signature(),
            "[time]"
        );

        let ip = HostType::bytes().named("net", "IpAddr");
        assert_eq!(ip.signature(), "net::IpAddr");

        let custom = HostType::text().named("app", "Status");
        assert_eq!(custom.signature(), "text", "named scalars use their structure");
    }

    #[test]
    fn bytes_are_not_sequences() {
        assert!(!HostType::bytes().is_sequence());
        assert!(HostType::seq(HostType::bytes()).is_sequence());
        assert!(HostType::array(3, HostType::text()).is_sequence());
    }

    #[test]
    fn records_with_value_semantics_are_not_plain() {
        let plain = HostType::record(Vec::new());
        assert!(plain.is_plain_record());

        let mut coded = HostType::record(Vec::new());
        coded.caps.encodes = true;
        assert!(!coded.is_plain_record());

        let mut time = HostType::record(Vec::new());
        time.caps.time_like = true;
        assert!(!time.is_plain_record());
    }
}
