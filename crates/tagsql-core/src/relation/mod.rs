//! RelationLoader: per-check column, constraint and index metadata.

pub(crate) mod query;

#[cfg(test)]
mod tests;

use crate::{
    catalog::{Catalog, CatalogType, Oid},
    check::CheckError,
    db::Connection,
    obs::trace::{TraceEvent, TraceSink, emit},
};
use serde::Serialize;
use std::collections::HashMap;
use tagsql_ir::RelIdent;
use tracing::debug;

/// Namespace used for relation identifiers without a qualifier.
pub const DEFAULT_NAMESPACE: &str = "public";

///
/// RelationKind
///
/// `pg_class.relkind`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum RelationKind {
    Table,
    View,
    MaterializedView,
    ForeignTable,
    PartitionedTable,
    Other,
}

impl RelationKind {
    #[must_use]
    pub const fn from_char(c: char) -> Self {
        match c {
            'r' => Self::Table,
            'v' => Self::View,
            'm' => Self::MaterializedView,
            'f' => Self::ForeignTable,
            'p' => Self::PartitionedTable,
            _ => Self::Other,
        }
    }
}

///
/// ConstraintKind
///
/// `pg_constraint.contype`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum ConstraintKind {
    Check,
    ForeignKey,
    PrimaryKey,
    Unique,
    Trigger,
    Exclusion,
    NotNull,
}

impl ConstraintKind {
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'c' => Some(Self::Check),
            'f' => Some(Self::ForeignKey),
            'p' => Some(Self::PrimaryKey),
            'u' => Some(Self::Unique),
            't' => Some(Self::Trigger),
            'x' => Some(Self::Exclusion),
            'n' => Some(Self::NotNull),
            _ => None,
        }
    }
}

///
/// Column
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Column {
    pub ordinal: i16,
    pub name: String,
    pub dims: i32,
    /// `atttypmod`; -1 when the type has no modifier.
    pub typmod: i32,
    pub not_null: bool,
    pub has_default: bool,
    pub is_primary: bool,
    pub ty: CatalogType,
}

///
/// Constraint
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Constraint {
    pub oid: Oid,
    pub name: String,
    pub kind: ConstraintKind,
    pub deferrable: bool,
    pub deferred: bool,
    pub key: Vec<i16>,
    /// Referenced columns of foreign keys.
    pub foreign_key: Vec<i16>,
}

///
/// Index
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[expect(clippy::struct_excessive_bools)]
pub struct Index {
    pub name: String,
    pub attribute_count: i16,
    pub unique: bool,
    pub primary: bool,
    pub exclusion: bool,
    pub immediate: bool,
    pub ready: bool,
    /// Column ordinals; 0 marks an expression column.
    pub key: Vec<i16>,
    pub definition: String,
}

impl Index {
    #[must_use]
    pub const fn is_unique_or_primary(&self) -> bool {
        self.unique || self.primary
    }
}

///
/// Relation
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Relation {
    pub oid: Oid,
    pub name: String,
    pub namespace: String,
    /// Registration key: the alias if declared, else the name.
    pub key: String,
    pub kind: RelationKind,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    pub indexes: Vec<Index>,
}

impl Relation {
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.name == name)
    }

    #[must_use]
    pub fn column_by_ordinal(&self, ordinal: i16) -> Option<&Column> {
        self.columns.iter().find(|col| col.ordinal == ordinal)
    }

    #[must_use]
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|idx| idx.name == name)
    }

    #[must_use]
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|con| con.name == name)
    }

    /// Column names of an index key, in key order. Expression columns are
    /// skipped.
    #[must_use]
    pub fn key_columns(&self, key: &[i16]) -> Vec<&str> {
        key.iter()
            .filter_map(|ordinal| self.column_by_ordinal(*ordinal))
            .map(|col| col.name.as_str())
            .collect()
    }

    /// A unique or primary index whose key columns equal `columns` as a set.
    #[must_use]
    pub fn unique_index_for(&self, columns: &[&str]) -> Option<&Index> {
        let mut wanted: Vec<&str> = columns.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        self.indexes
            .iter()
            .filter(|idx| idx.is_unique_or_primary() && !idx.key.contains(&0))
            .find(|idx| {
                let mut key = self.key_columns(&idx.key);
                key.sort_unstable();
                key.dedup();
                key == wanted
            })
    }
}

///
/// RelationSet
///
/// Relations loaded for one command check, keyed by alias-or-name. The
/// first relation is also registered under the empty key.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RelationSet {
    relations: Vec<Relation>,
    keys: HashMap<String, usize>,
}

impl RelationSet {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Relation> {
        self.keys.get(key).map(|idx| &self.relations[*idx])
    }

    /// The command's target relation.
    #[must_use]
    pub fn target(&self) -> Option<&Relation> {
        self.get("")
    }

    /// Relations in load order, target first.
    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    fn register(&mut self, relation: Relation) -> usize {
        let idx = self.relations.len();
        if self.relations.is_empty() {
            self.keys.insert(String::new(), idx);
        }
        self.keys.insert(relation.key.clone(), idx);
        self.relations.push(relation);

        idx
    }
}

///
/// RelationLoader
///

pub struct RelationLoader<'a> {
    catalog: &'a Catalog,
    namespace: String,
    relations: RelationSet,
    trace: Option<&'a dyn TraceSink>,
}

impl<'a> RelationLoader<'a> {
    #[must_use]
    pub fn new(catalog: &'a Catalog, namespace: impl Into<String>) -> Self {
        Self {
            catalog,
            namespace: namespace.into(),
            relations: RelationSet::default(),
            trace: None,
        }
    }

    #[must_use]
    pub const fn with_trace(mut self, trace: Option<&'a dyn TraceSink>) -> Self {
        self.trace = trace;
        self
    }

    /// Load `ident` and register it; an identifier already registered under
    /// the same key returns the registered relation without querying.
    pub fn load(
        &mut self,
        conn: &mut dyn Connection,
        ident: &RelIdent,
    ) -> Result<&Relation, CheckError> {
        if let Some(idx) = self.relations.keys.get(ident.key()).copied() {
            return Ok(&self.relations.relations[idx]);
        }

        let namespace = if ident.qualifier.is_empty() {
            self.namespace.as_str()
        } else {
            ident.qualifier.as_str()
        };
        let relation = query::load_relation(conn, self.catalog, ident, namespace)?;

        debug!(
            relation = %ident,
            columns = relation.columns.len(),
            indexes = relation.indexes.len(),
            "relation loaded"
        );
        emit(
            self.trace,
            TraceEvent::RelationLoaded {
                relation: &relation.name,
                columns: relation.columns.len(),
            },
        );

        let idx = self.relations.register(relation);

        Ok(&self.relations.relations[idx])
    }

    #[must_use]
    pub const fn relations(&self) -> &RelationSet {
        &self.relations
    }

    #[must_use]
    pub fn into_relations(self) -> RelationSet {
        self.relations
    }
}
