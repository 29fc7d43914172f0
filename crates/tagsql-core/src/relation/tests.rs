use super::*;
use crate::{
    catalog::oid,
    test_support::{FakeColumn, FakeConnection, FakeRelation, posts_table, standard_catalog, users_table},
};

fn ident(raw: &str) -> RelIdent {
    RelIdent::parse(raw).unwrap()
}

fn connection() -> FakeConnection {
    FakeConnection::new()
        .with_relation(users_table())
        .with_relation(posts_table())
}

#[test]
fn load_reads_columns_in_ordinal_order() {
    let catalog = standard_catalog();
    let mut conn = connection();
    let mut loader = RelationLoader::new(&catalog, DEFAULT_NAMESPACE);

    let users = loader.load(&mut conn, &ident("users")).unwrap();
    let names: Vec<_> = users.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "id", "name", "email", "nickname", "created_at", "active", "score", "tags", "search"
        ]
    );
    assert_eq!(users.kind, RelationKind::Table);
    assert_eq!(users.namespace, "public");

    let created = users.column("created_at").unwrap();
    assert_eq!(created.ty.oid, oid::TIMESTAMPTZ);
    assert!(created.not_null && created.has_default);
    assert_eq!(users.column("tags").map(|c| c.dims), Some(1));
    assert_eq!(users.column_by_ordinal(1).map(|c| c.name.as_str()), Some("id"));
    assert!(users.column("id").unwrap().is_primary);
}

#[test]
fn first_relation_is_the_target() {
    let catalog = standard_catalog();
    let mut conn = connection();
    let mut loader = RelationLoader::new(&catalog, DEFAULT_NAMESPACE);

    loader.load(&mut conn, &ident("users:u")).unwrap();
    loader.load(&mut conn, &ident("posts:p")).unwrap();

    let set = loader.into_relations();
    assert_eq!(set.len(), 2);
    assert_eq!(set.target().map(|r| r.name.as_str()), Some("users"));
    assert_eq!(set.get("u").map(|r| r.name.as_str()), Some("users"));
    assert_eq!(set.get("p").map(|r| r.name.as_str()), Some("posts"));
    assert!(set.get("users").is_none());
    let order: Vec<_> = set.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(order, vec!["u", "p"]);
}

#[test]
fn reloading_a_key_issues_no_queries() {
    let catalog = standard_catalog();
    let mut conn = connection();
    let mut loader = RelationLoader::new(&catalog, DEFAULT_NAMESPACE);

    loader.load(&mut conn, &ident("users")).unwrap();
    assert_eq!(conn.query_count(), 4);

    conn.clear_log();
    loader.load(&mut conn, &ident("users")).unwrap();
    assert_eq!(conn.query_count(), 0);
    assert_eq!(loader.relations().len(), 1);
}

#[test]
fn qualifier_overrides_default_namespace() {
    let catalog = standard_catalog();
    let events = FakeRelation::table(20_100, "events")
        .in_namespace("audit")
        .column(FakeColumn::serial("id"));
    let mut conn = FakeConnection::new().with_relation(events);
    let mut loader = RelationLoader::new(&catalog, DEFAULT_NAMESPACE);

    let err = loader.load(&mut conn, &ident("events")).unwrap_err();
    assert_eq!(
        err,
        CheckError::RelationNotFound {
            relation: "public.events".to_string()
        }
    );

    let events = loader.load(&mut conn, &ident("audit.events")).unwrap();
    assert_eq!(events.namespace, "audit");
}

#[test]
fn unknown_column_type_is_reported() {
    let catalog = standard_catalog();
    let things = FakeRelation::table(20_200, "things").column(FakeColumn::new("weird", 99_999));
    let mut conn = FakeConnection::new().with_relation(things);

    let err = RelationLoader::new(&catalog, DEFAULT_NAMESPACE)
        .load(&mut conn, &ident("things"))
        .unwrap_err();
    assert_eq!(
        err,
        CheckError::UnknownColumnType {
            column: "things.weird".to_string(),
            oid: 99_999,
        }
    );
}

#[test]
fn constraints_and_indexes_resolve_key_columns() {
    let catalog = standard_catalog();
    let mut conn = connection();
    let mut loader = RelationLoader::new(&catalog, DEFAULT_NAMESPACE);
    let users = loader.load(&mut conn, &ident("users")).unwrap();

    let pkey = users.constraint("users_pkey").unwrap();
    assert_eq!(pkey.kind, ConstraintKind::PrimaryKey);
    assert_eq!(users.key_columns(&pkey.key), vec!["id"]);

    let email = users.index("users_email_key").unwrap();
    assert!(email.is_unique_or_primary());
    assert!(email.definition.starts_with("CREATE UNIQUE INDEX"));
    assert!(users.index("users_lower_name_idx").unwrap().key.contains(&0));
}

#[test]
fn unique_index_lookup_ignores_column_order() {
    let catalog = standard_catalog();
    let mut conn = connection();
    let mut loader = RelationLoader::new(&catalog, DEFAULT_NAMESPACE);

    let users = loader.load(&mut conn, &ident("users")).unwrap();
    assert_eq!(
        users.unique_index_for(&["email"]).map(|i| i.name.as_str()),
        Some("users_email_key")
    );
    assert_eq!(
        users.unique_index_for(&["id"]).map(|i| i.name.as_str()),
        Some("users_pkey")
    );
    assert!(users.unique_index_for(&["name"]).is_none());
    assert!(users.unique_index_for(&["id", "email"]).is_none());

    let posts = loader.load(&mut conn, &ident("posts")).unwrap();
    assert_eq!(
        posts
            .unique_index_for(&["slug", "user_id", "slug"])
            .map(|i| i.name.as_str()),
        Some("posts_user_slug_key")
    );
    assert!(posts.unique_index_for(&["title"]).is_none());
}

#[test]
fn kind_and_constraint_codes() {
    assert_eq!(RelationKind::from_char('v'), RelationKind::View);
    assert_eq!(RelationKind::from_char('?'), RelationKind::Other);
    assert_eq!(ConstraintKind::from_char('f'), Some(ConstraintKind::ForeignKey));
    assert_eq!(ConstraintKind::from_char('?'), None);
}
