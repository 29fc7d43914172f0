//! Predicate operators as written in annotations.

use derive_more::Display;
use serde::Serialize;

///
/// BoolOp
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq, Serialize)]
pub enum BoolOp {
    #[default]
    #[display("AND")]
    And,
    #[display("OR")]
    Or,
}

///
/// CmpOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    ILike,
    NotILike,
    Similar,
    NotSimilar,
    Regex,
    RegexI,
    NotRegex,
    NotRegexI,
    IsDistinct,
    NotDistinct,
    IsIn,
    NotIn,
}

impl CmpOp {
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let op = match token.to_ascii_lowercase().as_str() {
            "=" | "==" => Self::Eq,
            "<>" | "!=" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "like" => Self::Like,
            "notlike" => Self::NotLike,
            "ilike" => Self::ILike,
            "notilike" => Self::NotILike,
            "similar" => Self::Similar,
            "notsimilar" => Self::NotSimilar,
            "~" => Self::Regex,
            "~*" => Self::RegexI,
            "!~" => Self::NotRegex,
            "!~*" => Self::NotRegexI,
            "isdistinct" => Self::IsDistinct,
            "notdistinct" => Self::NotDistinct,
            "isin" => Self::IsIn,
            "notin" => Self::NotIn,
            _ => return None,
        };

        Some(op)
    }

    /// Rendered SQL operator.
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::ILike => "ILIKE",
            Self::NotILike => "NOT ILIKE",
            Self::Similar => "SIMILAR TO",
            Self::NotSimilar => "NOT SIMILAR TO",
            Self::Regex => "~",
            Self::RegexI => "~*",
            Self::NotRegex => "!~",
            Self::NotRegexI => "!~*",
            Self::IsDistinct => "IS DISTINCT FROM",
            Self::NotDistinct => "IS NOT DISTINCT FROM",
            // membership is lowered to a quantified comparison
            Self::IsIn => "=",
            Self::NotIn => "<>",
        }
    }

    /// Catalogue operator name the comparison resolves to.
    #[must_use]
    pub const fn base_operator(self) -> &'static str {
        match self {
            Self::Eq | Self::IsDistinct | Self::NotDistinct | Self::IsIn => "=",
            Self::Ne | Self::NotIn => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "~~",
            Self::NotLike => "!~~",
            Self::ILike => "~~*",
            Self::NotILike => "!~~*",
            Self::Similar | Self::Regex => "~",
            Self::NotSimilar | Self::NotRegex => "!~",
            Self::RegexI => "~*",
            Self::NotRegexI => "!~*",
        }
    }

    #[must_use]
    pub const fn is_membership(self) -> bool {
        matches!(self, Self::IsIn | Self::NotIn)
    }

    /// Operators that accept an ANY/SOME/ALL quantifier.
    #[must_use]
    pub const fn is_quantifiable(self) -> bool {
        !matches!(
            self,
            Self::IsDistinct | Self::NotDistinct | Self::IsIn | Self::NotIn
        )
    }

    /// Quantifier implied by a membership operator.
    #[must_use]
    pub const fn implied_quantifier(self) -> Option<Quantifier> {
        match self {
            Self::IsIn => Some(Quantifier::Any),
            Self::NotIn => Some(Quantifier::All),
            _ => None,
        }
    }
}

///
/// UnaryOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum UnaryOp {
    IsNull,
    NotNull,
    IsTrue,
    NotTrue,
    IsFalse,
    NotFalse,
    IsUnknown,
    NotUnknown,
}

impl UnaryOp {
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let op = match token.to_ascii_lowercase().as_str() {
            "isnull" => Self::IsNull,
            "notnull" => Self::NotNull,
            "istrue" => Self::IsTrue,
            "nottrue" => Self::NotTrue,
            "isfalse" => Self::IsFalse,
            "notfalse" => Self::NotFalse,
            "isunknown" => Self::IsUnknown,
            "notunknown" => Self::NotUnknown,
            _ => return None,
        };

        Some(op)
    }

    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::IsNull => "IS NULL",
            Self::NotNull => "IS NOT NULL",
            Self::IsTrue => "IS TRUE",
            Self::NotTrue => "IS NOT TRUE",
            Self::IsFalse => "IS FALSE",
            Self::NotFalse => "IS NOT FALSE",
            Self::IsUnknown => "IS UNKNOWN",
            Self::NotUnknown => "IS NOT UNKNOWN",
        }
    }

    #[must_use]
    pub const fn is_null_check(self) -> bool {
        matches!(self, Self::IsNull | Self::NotNull)
    }
}

///
/// Quantifier
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum Quantifier {
    #[display("ANY")]
    Any,
    #[display("SOME")]
    Some,
    #[display("ALL")]
    All,
}

impl Quantifier {
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "any" => Some(Self::Any),
            "some" => Some(Self::Some),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

///
/// BetweenOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum BetweenOp {
    Between,
    NotBetween,
    BetweenSymmetric,
    NotBetweenSymmetric,
}

impl BetweenOp {
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "isbetween" => Some(Self::Between),
            "notbetween" => Some(Self::NotBetween),
            "isbetweensym" => Some(Self::BetweenSymmetric),
            "notbetweensym" => Some(Self::NotBetweenSymmetric),
            _ => None,
        }
    }

    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
            Self::BetweenSymmetric => "BETWEEN SYMMETRIC",
            Self::NotBetweenSymmetric => "NOT BETWEEN SYMMETRIC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_reduces_to_equality_class() {
        assert_eq!(CmpOp::IsIn.base_operator(), "=");
        assert_eq!(CmpOp::NotIn.base_operator(), "<>");
        assert_eq!(CmpOp::IsIn.implied_quantifier(), Some(Quantifier::Any));
        assert_eq!(CmpOp::NotIn.implied_quantifier(), Some(Quantifier::All));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(CmpOp::parse("ILIKE"), Some(CmpOp::ILike));
        assert_eq!(UnaryOp::parse("IsNull"), Some(UnaryOp::IsNull));
        assert_eq!(Quantifier::parse("Some"), Some(Quantifier::Some));
        assert_eq!(CmpOp::parse("isbetween"), None);
        assert_eq!(BetweenOp::parse("isBetweenSym"), Some(BetweenOp::BetweenSymmetric));
    }
}
