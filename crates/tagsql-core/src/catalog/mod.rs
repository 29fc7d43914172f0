//! CatalogLoader: engine-wide type, operator, cast and procedure metadata.
//!
//! A [`Catalog`] is an immutable snapshot for one database identity. The
//! [`CatalogCache`] loads each identity once and shares the snapshot between
//! every command compiled against it.

mod cache;
pub mod oid;
pub(crate) mod query;


pub use cache::{CatalogCache, CatalogIdentity};

use crate::db::ConnectionError;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error as ThisError;

/// PostgreSQL object identifier.
pub type Oid = u32;

///
/// CatalogError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum CatalogError {
    #[error("catalogue cache lock poisoned")]
    CachePoisoned,

    #[error("catalogue introspection failed: {0}")]
    Connection(#[from] ConnectionError),

    #[error("unexpected value '{value}' for {field} in {query} query")]
    InvalidValue {
        query: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("invalid server_version_num '{value}'")]
    InvalidVersion { value: String },

    #[error("query '{query}' returned no rows")]
    NoRows { query: &'static str },
}

///
/// TypeClass
///
/// `pg_type.typtype`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum TypeClass {
    Base,
    Composite,
    Domain,
    Enum,
    Multirange,
    Pseudo,
    Range,
}

impl TypeClass {
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'b' => Some(Self::Base),
            'c' => Some(Self::Composite),
            'd' => Some(Self::Domain),
            'e' => Some(Self::Enum),
            'm' => Some(Self::Multirange),
            'p' => Some(Self::Pseudo),
            'r' => Some(Self::Range),
            _ => None,
        }
    }
}

///
/// TypeCategory
///
/// `pg_type.typcategory`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
pub enum TypeCategory {
    Array,
    BitString,
    Boolean,
    Composite,
    DateTime,
    Enum,
    Geometric,
    Internal,
    Network,
    Numeric,
    Pseudo,
    Range,
    String,
    Timespan,
    Unknown,
    User,
}

impl TypeCategory {
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        let category = match c {
            'A' => Self::Array,
            'B' => Self::Boolean,
            'C' => Self::Composite,
            'D' => Self::DateTime,
            'E' => Self::Enum,
            'G' => Self::Geometric,
            'I' => Self::Network,
            'N' => Self::Numeric,
            'P' => Self::Pseudo,
            'R' => Self::Range,
            'S' => Self::String,
            'T' => Self::Timespan,
            'U' => Self::User,
            'V' => Self::BitString,
            'X' => Self::Unknown,
            'Z' => Self::Internal,
            _ => return None,
        };

        Some(category)
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Array => 'A',
            Self::Boolean => 'B',
            Self::Composite => 'C',
            Self::DateTime => 'D',
            Self::Enum => 'E',
            Self::Geometric => 'G',
            Self::Network => 'I',
            Self::Numeric => 'N',
            Self::Pseudo => 'P',
            Self::Range => 'R',
            Self::String => 'S',
            Self::Timespan => 'T',
            Self::User => 'U',
            Self::BitString => 'V',
            Self::Unknown => 'X',
            Self::Internal => 'Z',
        }
    }
}

///
/// CatalogType
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CatalogType {
    pub oid: Oid,
    pub name: String,
    /// `format_type(oid, NULL)`, e.g. `character varying`.
    pub formatted_name: String,
    pub length: i16,
    pub class: TypeClass,
    pub category: TypeCategory,
    /// Element type of arrays, 0 otherwise.
    pub element: Oid,
    pub preferred: bool,
}

impl CatalogType {
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.category == TypeCategory::Array && self.element != 0
    }
}

///
/// CastContext
///
/// `pg_cast.castcontext`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CastContext {
    Explicit,
    Implicit,
    Assignment,
}

impl CastContext {
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'e' => Some(Self::Explicit),
            'i' => Some(Self::Implicit),
            'a' => Some(Self::Assignment),
            _ => None,
        }
    }
}

///
/// CatalogOperator
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CatalogOperator {
    pub name: String,
    pub left: Oid,
    pub right: Oid,
    pub result: Oid,
}

///
/// CatalogCast
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CatalogCast {
    pub target: Oid,
    pub source: Oid,
    pub context: CastContext,
}

///
/// CatalogProcedure
///
/// One single-argument overload.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CatalogProcedure {
    pub arg: Oid,
    pub ret: Oid,
    pub aggregate: bool,
}

///
/// Catalog
///
/// Immutable metadata snapshot of one database.
///

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    types: Vec<CatalogType>,
    by_oid: HashMap<Oid, usize>,
    operators: HashMap<(String, Oid, Oid), Oid>,
    casts: HashMap<(Oid, Oid), CastContext>,
    procedures: HashMap<String, Vec<CatalogProcedure>>,
}

impl Catalog {
    #[must_use]
    pub fn new(
        types: Vec<CatalogType>,
        operators: Vec<CatalogOperator>,
        casts: Vec<CatalogCast>,
        procedures: Vec<(String, CatalogProcedure)>,
    ) -> Self {
        let by_oid = types
            .iter()
            .enumerate()
            .map(|(idx, ty)| (ty.oid, idx))
            .collect();
        let operators = operators
            .into_iter()
            .map(|op| ((op.name, op.left, op.right), op.result))
            .collect();
        let casts = casts
            .into_iter()
            .map(|cast| ((cast.target, cast.source), cast.context))
            .collect();

        let mut by_name: HashMap<String, Vec<CatalogProcedure>> = HashMap::new();
        for (name, procedure) in procedures {
            by_name.entry(name).or_default().push(procedure);
        }

        Self {
            types,
            by_oid,
            operators,
            casts,
            procedures: by_name,
        }
    }

    #[must_use]
    pub fn type_by_oid(&self, oid: Oid) -> Option<&CatalogType> {
        self.by_oid.get(&oid).map(|idx| &self.types[*idx])
    }

    /// Linear scan; the type table is small and name lookups are rare.
    #[must_use]
    pub fn type_by_name(&self, name: &str) -> Option<&CatalogType> {
        self.types.iter().find(|ty| ty.name == name)
    }

    #[must_use]
    pub fn operator_exists(&self, name: &str, left: Oid, right: Oid) -> bool {
        self.operators
            .contains_key(&(name.to_string(), left, right))
    }

    #[must_use]
    pub fn can_cast_implicit_or_assignment(&self, target: Oid, source: Oid) -> bool {
        matches!(
            self.casts.get(&(target, source)),
            Some(CastContext::Implicit | CastContext::Assignment)
        )
    }

    #[must_use]
    pub fn can_cast_implicit(&self, target: Oid, source: Oid) -> bool {
        matches!(self.casts.get(&(target, source)), Some(CastContext::Implicit))
    }

    /// Single-argument overloads of `name`.
    #[must_use]
    pub fn procedures(&self, name: &str) -> &[CatalogProcedure] {
        self.procedures.get(name).map_or(&[], Vec::as_slice)
    }

    /// Resolve a binary operator the way the server would for plain
    /// operands: exact match first, then implicit casts of either side,
    /// then polymorphic pseudo-types. Returns the result type.
    #[must_use]
    pub fn resolve_operator(&self, name: &str, left: Oid, right: Oid) -> Option<Oid> {
        let lefts = self.operand_alternatives(left);
        let rights = self.operand_alternatives(right);

        lefts.iter().find_map(|l| {
            rights.iter().find_map(|r| {
                // polymorphic operands must resolve to one concrete type
                if (is_polymorphic(*l) || is_polymorphic(*r)) && left != right {
                    return None;
                }
                self.operators.get(&(name.to_string(), *l, *r)).copied()
            })
        })
    }

    // The operand itself, its implicit cast targets, then matching
    // polymorphic pseudo-types.
    fn operand_alternatives(&self, operand: Oid) -> Vec<Oid> {
        let mut out = vec![operand];
        let mut targets: Vec<Oid> = self
            .casts
            .iter()
            .filter(|((_, source), ctx)| *source == operand && **ctx == CastContext::Implicit)
            .map(|((target, _), _)| *target)
            .collect();
        targets.sort_unstable();
        out.extend(targets);

        if let Some(ty) = self.type_by_oid(operand) {
            if ty.is_array() {
                out.push(oid::ANYARRAY);
            }
            match ty.class {
                TypeClass::Enum => out.push(oid::ANYENUM),
                TypeClass::Range => out.push(oid::ANYRANGE),
                _ => {}
            }
        }
        out.push(oid::ANYELEMENT);

        out
    }

    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }

    #[must_use]
    pub fn cast_count(&self) -> usize {
        self.casts.len()
    }

    #[must_use]
    pub fn procedure_count(&self) -> usize {
        self.procedures.values().map(Vec::len).sum()
    }
}

const fn is_polymorphic(value: Oid) -> bool {
    matches!(
        value,
        oid::ANYARRAY | oid::ANYELEMENT | oid::ANYENUM | oid::ANYRANGE
    )
}
