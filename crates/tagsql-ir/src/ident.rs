use serde::Serialize;
use std::fmt;

///
/// RelIdent
///
/// `[qualifier.]name[:alias]`, where the qualifier names a namespace.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct RelIdent {
    pub qualifier: String,
    pub name: String,
    pub alias: String,
}

impl RelIdent {
    /// Parse a relation identifier; `None` on any grammar violation.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (path, alias) = match raw.split_once(':') {
            Some((path, alias)) => {
                if !is_ident(alias) {
                    return None;
                }
                (path, alias)
            }
            None => (raw, ""),
        };

        let (qualifier, name) = match path.split_once('.') {
            Some((qualifier, name)) => {
                if !is_ident(qualifier) {
                    return None;
                }
                (qualifier, name)
            }
            None => ("", path),
        };
        if !is_ident(name) {
            return None;
        }

        Some(Self {
            qualifier: qualifier.to_string(),
            name: name.to_string(),
            alias: alias.to_string(),
        })
    }

    /// Key under which the loaded relation is registered for one check.
    #[must_use]
    pub fn key(&self) -> &str {
        if self.alias.is_empty() {
            &self.name
        } else {
            &self.alias
        }
    }
}

impl fmt::Display for RelIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.qualifier.is_empty() {
            write!(f, "{}.", self.qualifier)?;
        }
        f.write_str(&self.name)?;
        if !self.alias.is_empty() {
            write!(f, ":{}", self.alias)?;
        }

        Ok(())
    }
}

///
/// ColumnIdent
///
/// `[qualifier.]name`, where the qualifier is a relation alias or name.
///

#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ColumnIdent {
    pub qualifier: String,
    pub name: String,
}

impl ColumnIdent {
    pub fn new(qualifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (qualifier, name) = match raw.split_once('.') {
            Some((qualifier, name)) => {
                if !is_ident(qualifier) {
                    return None;
                }
                (qualifier, name)
            }
            None => ("", raw),
        };
        if !is_ident(name) {
            return None;
        }

        Some(Self::new(qualifier, name))
    }

    /// Same column with a prefix prepended to the unqualified name.
    #[must_use]
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self::new(self.qualifier.clone(), format!("{prefix}{}", self.name))
    }
}

impl fmt::Display for ColumnIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.qualifier.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.qualifier, self.name)
        }
    }
}

/// SQL identifier: a letter or underscore followed by letters, digits,
/// underscores or `$`.
#[must_use]
pub fn is_ident(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
