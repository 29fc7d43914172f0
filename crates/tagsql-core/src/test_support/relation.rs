//! Relation fixtures served by [`super::FakeConnection`].

use crate::{
    catalog::{Oid, oid},
    db::{Cell, Row},
};

///
/// FakeColumn
///

#[derive(Clone, Debug)]
pub struct FakeColumn {
    pub name: String,
    pub type_oid: Oid,
    pub typmod: i32,
    pub dims: i32,
    pub not_null: bool,
    pub has_default: bool,
    pub primary: bool,
}

impl FakeColumn {
    #[must_use]
    pub fn new(name: &str, type_oid: Oid) -> Self {
        Self {
            name: name.to_string(),
            type_oid,
            typmod: -1,
            dims: 0,
            not_null: false,
            has_default: false,
            primary: false,
        }
    }

    /// `serial primary key`.
    #[must_use]
    pub fn serial(name: &str) -> Self {
        Self::new(name, oid::INT4).not_null().with_default().primary()
    }

    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    #[must_use]
    pub const fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    #[must_use]
    pub const fn primary(mut self) -> Self {
        self.primary = true;
        self.not_null = true;
        self
    }

    #[must_use]
    pub const fn typmod(mut self, typmod: i32) -> Self {
        self.typmod = typmod;
        self
    }

    #[must_use]
    pub const fn dims(mut self, dims: i32) -> Self {
        self.dims = dims;
        self
    }
}

///
/// FakeIndex
///

#[derive(Clone, Debug)]
pub struct FakeIndex {
    pub name: String,
    /// Column names; `None` marks an expression column.
    pub key: Vec<Option<String>>,
    pub unique: bool,
    pub primary: bool,
}

impl FakeIndex {
    #[must_use]
    pub fn new(name: &str, key: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            key: key.iter().map(|col| Some((*col).to_string())).collect(),
            unique: false,
            primary: false,
        }
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub const fn primary(mut self) -> Self {
        self.primary = true;
        self.unique = true;
        self
    }

    /// Append an expression key column.
    #[must_use]
    pub fn expression(mut self) -> Self {
        self.key.push(None);
        self
    }
}

///
/// FakeConstraint
///

#[derive(Clone, Debug)]
pub struct FakeConstraint {
    pub oid: Oid,
    pub name: String,
    /// `pg_constraint.contype`.
    pub kind: char,
    pub key: Vec<String>,
}

impl FakeConstraint {
    #[must_use]
    pub fn new(oid: Oid, name: &str, kind: char, key: &[&str]) -> Self {
        Self {
            oid,
            name: name.to_string(),
            kind,
            key: key.iter().map(|col| (*col).to_string()).collect(),
        }
    }
}

///
/// FakeRelation
///

#[derive(Clone, Debug)]
pub struct FakeRelation {
    pub oid: Oid,
    pub name: String,
    pub namespace: String,
    pub kind: char,
    pub columns: Vec<FakeColumn>,
    pub indexes: Vec<FakeIndex>,
    pub constraints: Vec<FakeConstraint>,
}

impl FakeRelation {
    #[must_use]
    pub fn table(oid: Oid, name: &str) -> Self {
        Self {
            oid,
            name: name.to_string(),
            namespace: "public".to_string(),
            kind: 'r',
            columns: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
        }
    }

    #[must_use]
    pub fn in_namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    #[must_use]
    pub fn column(mut self, column: FakeColumn) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn index(mut self, index: FakeIndex) -> Self {
        self.indexes.push(index);
        self
    }

    #[must_use]
    pub fn constraint(mut self, constraint: FakeConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn ordinal(&self, column: &str) -> i64 {
        self.columns
            .iter()
            .position(|c| c.name == column)
            .map_or(0, |idx| i64::try_from(idx + 1).unwrap_or(0))
    }

    pub(super) fn relation_row(&self) -> Row {
        Row::new(vec![Cell::Oid(self.oid), Cell::Text(self.kind.to_string())])
    }

    pub(super) fn column_rows(&self) -> Vec<Row> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                Row::new(vec![
                    Cell::Int(i64::try_from(idx + 1).unwrap_or(0)),
                    Cell::from(col.name.as_str()),
                    Cell::Int(i64::from(col.typmod)),
                    Cell::Int(i64::from(col.dims)),
                    Cell::Bool(col.not_null),
                    Cell::Bool(col.has_default),
                    Cell::Bool(col.primary),
                    Cell::Oid(col.type_oid),
                ])
            })
            .collect()
    }

    pub(super) fn constraint_rows(&self) -> Vec<Row> {
        self.constraints
            .iter()
            .map(|con| {
                let key: Vec<i64> = con.key.iter().map(|col| self.ordinal(col)).collect();
                Row::new(vec![
                    Cell::Oid(con.oid),
                    Cell::from(con.name.as_str()),
                    Cell::Text(con.kind.to_string()),
                    Cell::Bool(false),
                    Cell::Bool(false),
                    Cell::from(key),
                    Cell::Null,
                ])
            })
            .collect()
    }

    pub(super) fn index_rows(&self) -> Vec<Row> {
        self.indexes
            .iter()
            .map(|idx| {
                let key: Vec<i64> = idx
                    .key
                    .iter()
                    .map(|col| col.as_deref().map_or(0, |name| self.ordinal(name)))
                    .collect();
                let columns: Vec<&str> = idx
                    .key
                    .iter()
                    .map(|col| col.as_deref().unwrap_or("(expr)"))
                    .collect();
                let definition = format!(
                    "CREATE {}INDEX {} ON {}.{} USING btree ({})",
                    if idx.unique { "UNIQUE " } else { "" },
                    idx.name,
                    self.namespace,
                    self.name,
                    columns.join(", ")
                );

                Row::new(vec![
                    Cell::from(idx.name.as_str()),
                    Cell::Int(i64::try_from(key.len()).unwrap_or(0)),
                    Cell::Bool(idx.unique),
                    Cell::Bool(idx.primary),
                    Cell::Bool(false),
                    Cell::Bool(true),
                    Cell::Bool(true),
                    Cell::from(key),
                    Cell::Text(definition),
                ])
            })
            .collect()
    }
}

/// `users(id serial primary key, name text not null, email text not null
/// unique, nickname text, created_at timestamptz not null default now(),
/// active bool not null default true, score int4, tags text[], search
/// tsvector)`.
#[must_use]
pub fn users_table() -> FakeRelation {
    FakeRelation::table(20_001, "users")
        .column(FakeColumn::serial("id"))
        .column(FakeColumn::new("name", oid::TEXT).not_null())
        .column(FakeColumn::new("email", oid::TEXT).not_null())
        .column(FakeColumn::new("nickname", oid::TEXT))
        .column(FakeColumn::new("created_at", oid::TIMESTAMPTZ).not_null().with_default())
        .column(FakeColumn::new("active", oid::BOOL).not_null().with_default())
        .column(FakeColumn::new("score", oid::INT4))
        .column(FakeColumn::new("tags", oid::TEXT_ARRAY).dims(1))
        .column(FakeColumn::new("search", oid::TSVECTOR))
        .index(FakeIndex::new("users_pkey", &["id"]).primary())
        .index(FakeIndex::new("users_email_key", &["email"]).unique())
        .index(FakeIndex::new("users_lower_name_idx", &[]).expression())
        .constraint(FakeConstraint::new(30_001, "users_pkey", 'p', &["id"]))
        .constraint(FakeConstraint::new(30_002, "users_email_key", 'u', &["email"]))
        .constraint(FakeConstraint::new(30_003, "users_name_check", 'c', &["name"]))
}

/// `posts(id serial primary key, user_id int4 not null, title text not null,
/// body text, slug text not null, published bool not null default false)`
/// with a unique index on `(user_id, slug)`.
#[must_use]
pub fn posts_table() -> FakeRelation {
    FakeRelation::table(20_002, "posts")
        .column(FakeColumn::serial("id"))
        .column(FakeColumn::new("user_id", oid::INT4).not_null())
        .column(FakeColumn::new("title", oid::TEXT).not_null())
        .column(FakeColumn::new("body", oid::TEXT))
        .column(FakeColumn::new("slug", oid::TEXT).not_null())
        .column(FakeColumn::new("published", oid::BOOL).not_null().with_default())
        .index(FakeIndex::new("posts_pkey", &["id"]).primary())
        .index(FakeIndex::new("posts_user_slug_key", &["user_id", "slug"]).unique())
        .index(FakeIndex::new("posts_title_idx", &["title"]))
        .constraint(FakeConstraint::new(30_010, "posts_pkey", 'p', &["id"]))
        .constraint(FakeConstraint::new(
            30_011,
            "posts_user_fkey",
            'f',
            &["user_id"],
        ))
}
