//! TypeCompatibility: decides whether host field types and column types
//! compare, assign and coerce.
//!
//! Every decision is a pure function of the catalogue snapshot, the column
//! and the host type. Assignment is directional; read and write rules are
//! declared independently.

mod assign;
mod candidate;
mod coerce;
mod compare;

#[cfg(test)]
mod tests;

pub use assign::{
    ASSIGN_RULES, AssignRule, Modifier, RuleDirection, assign_adapter, can_assign, find_rule,
};
pub use candidate::{field_type_candidate_oids, signature_candidates};
pub use coerce::{can_coerce, coercible_oid};
pub use compare::can_compare;

use derive_more::Display;
use serde::Serialize;

///
/// Direction
///
/// Value flow relative to the database.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
pub enum Direction {
    /// Column value populates the field.
    #[display("read from")]
    Read,
    /// Field value is sent to the column.
    #[display("written to")]
    Write,
}

///
/// Adapter
///
/// How the runtime codec moves one certified field/column pair. The
/// compiler only selects adapters; the codec library implements them.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "adapter", rename_all = "snake_case")]
pub enum Adapter {
    /// The field type encodes or decodes itself.
    SelfCodec,
    Json,
    Xml,
    Hstore,
    /// A static table entry for the column type and host signature.
    Table {
        type_name: String,
        signature: String,
    },
    /// Server-side cast, opted into with the `cast` option.
    Coerce,
}

impl Adapter {
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::SelfCodec => "self".to_string(),
            Self::Json => "json".to_string(),
            Self::Xml => "xml".to_string(),
            Self::Hstore => "hstore".to_string(),
            Self::Table {
                type_name,
                signature,
            } => format!("{type_name}:{signature}"),
            Self::Coerce => "cast".to_string(),
        }
    }
}
