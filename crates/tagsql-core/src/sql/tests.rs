use super::*;
use crate::{
    check::{CheckOptions, CheckedCommand, check_command},
    compat::Adapter,
    test_support::{
        FakeColumn, FakeConnection, FakeIndex, FakeRelation, posts_table, standard_catalog,
        users_table,
    },
};
use proptest::prelude::*;
use tagsql_ir::{
    AnalyzeOptions, Directive, HostField, HostType, Tag, analyze_command, host::ScalarKind,
};

fn int() -> HostType {
    HostType::scalar(ScalarKind::I32)
}

fn rel(name: &str, rel: &str, ty: HostType) -> HostField {
    HostField::new(name, Tag::new().with("rel", rel), ty)
}

fn directive(d: Directive, sql: &str) -> HostField {
    if sql.is_empty() {
        HostField::new("_", Tag::new(), d.host_type())
    } else {
        HostField::sql("_", sql, d.host_type())
    }
}

fn block(name: &str, members: Vec<HostField>) -> HostField {
    HostField::new(name, Tag::new(), HostType::record(members))
}

fn user_record() -> HostType {
    HostType::record(vec![
        HostField::sql("Id", "id", int()),
        HostField::sql("Name", "name", HostType::text()),
        HostField::sql("Email", "email", HostType::text()),
        HostField::sql("Nickname", "nickname", HostType::optional(HostType::text())),
        HostField::sql("CreatedAt", "created_at", HostType::time()),
        HostField::sql("Active", "active", HostType::scalar(ScalarKind::Bool)),
    ])
}

fn post_record() -> HostType {
    HostType::record(vec![
        HostField::sql("Id", "id", int()),
        HostField::sql("UserId", "user_id", int()),
        HostField::sql("Title", "title", HostType::text()),
        HostField::sql("Slug", "slug", HostType::text()),
    ])
}

fn checked_in(conn: &mut FakeConnection, name: &str, fields: &[HostField]) -> CheckedCommand {
    let catalog = standard_catalog();
    let cmd = analyze_command(name, fields, &AnalyzeOptions::default())
        .expect("command should analyze");

    check_command(conn, &catalog, cmd, &CheckOptions::default(), None)
        .expect("command should check")
}

fn lower(name: &str, fields: &[HostField]) -> Result<Lowered, BuildError> {
    let mut conn = FakeConnection::new()
        .with_relation(users_table())
        .with_relation(posts_table());

    build(&checked_in(&mut conn, name, fields))
}

fn statement(name: &str, fields: &[HostField]) -> BoundStatement {
    match lower(name, fields).expect("command should lower") {
        Lowered::Statement(bound) => bound,
        Lowered::Filter(map) => panic!("expected a statement, got {map:?}"),
    }
}

fn sql(name: &str, fields: &[HostField]) -> String {
    statement(name, fields).sql()
}

fn fields(bound: &BoundStatement) -> Vec<&str> {
    bound.args.iter().map(ArgSource::field).collect()
}

fn users_where(members: Vec<HostField>) -> String {
    sql(
        "SelectUsers",
        &[
            rel("Users", "users", HostType::seq(user_record())),
            block("Where", members),
        ],
    )
}

//
// select
//

#[test]
fn single_row_select_gets_implicit_limit() {
    let bound = statement(
        "SelectUser",
        &[
            rel("User", "users", user_record()),
            block("Where", vec![HostField::sql("Email", "email", HostType::text())]),
        ],
    );

    assert_eq!(
        bound.sql(),
        "SELECT id, name, email, nickname, created_at, active FROM users WHERE email = $1 LIMIT 1"
    );
    assert_eq!(
        bound.args,
        vec![ArgSource::Predicate {
            field: "Where.Email".to_string(),
            signature: "text".to_string(),
        }]
    );
    assert!(!bound.multi_row);
}

#[test]
fn sequence_select_has_no_implicit_limit() {
    let bound = statement(
        "SelectUsers",
        &[rel("Users", "users", HostType::seq(user_record()))],
    );

    assert_eq!(
        bound.sql(),
        "SELECT id, name, email, nickname, created_at, active FROM users"
    );
    assert!(bound.args.is_empty());
    assert!(bound.multi_row);
}

#[test]
fn joined_select_qualifies_every_column() {
    let record = HostType::record(vec![
        HostField::sql("Id", "id", int()),
        HostField::sql("Title", "p.title", HostType::text()),
    ]);
    let sql = sql(
        "SelectUserPosts",
        &[
            rel("Rows", "users:u", HostType::seq(record)),
            block(
                "Join",
                vec![directive(Directive::LeftJoin, "posts:p,p.user_id = u.id")],
            ),
            block("Where", vec![HostField::sql("Name", "name", HostType::text())]),
            directive(Directive::OrderBy, "-id:nullslast,p.title"),
        ],
    );

    assert_eq!(
        sql,
        "SELECT u.id, p.title FROM users AS u LEFT JOIN posts AS p ON p.user_id = u.id \
         WHERE u.name = $1 ORDER BY u.id DESC NULLS LAST, p.title"
    );
}

#[test]
fn limit_and_offset_follow_where_parameters() {
    let bound = statement(
        "SelectUsers",
        &[
            rel("Users", "users", HostType::seq(user_record())),
            block("Where", vec![HostField::sql("Name", "name", HostType::text())]),
            HostField::new("Limit", Tag::new(), int()),
            directive(Directive::Offset, "20"),
        ],
    );

    assert!(bound.sql().ends_with("WHERE name = $1 LIMIT $2 OFFSET 20"));
    assert_eq!(
        bound.args[1],
        ArgSource::Limit {
            field: "Limit".to_string()
        }
    );
}

#[test]
fn nested_groups_are_parenthesized_below_the_root() {
    let sql = users_where(vec![
        HostField::sql("Name", "name", HostType::text()),
        block(
            "Either",
            vec![
                HostField::sql("Email", "email", HostType::text()),
                directive(Directive::Or, ""),
                HostField::sql("Id", "id", int()),
            ],
        ),
    ]);

    assert!(sql.ends_with("WHERE name = $1 AND (email = $2 OR id = $3)"));
}

#[test]
fn predicate_forms_render() {
    let where_clause = |member: HostField| {
        let sql = users_where(vec![member]);
        sql.split_once(" WHERE ")
            .map(|(_, clause)| clause.to_string())
            .unwrap_or_default()
    };

    assert_eq!(
        where_clause(HostField::sql("Ids", "id isin", HostType::seq(int()))),
        "id = ANY($1)"
    );
    assert_eq!(
        where_clause(HostField::sql("Ids", "id notin", HostType::seq(int()))),
        "id <> ALL($1)"
    );
    assert_eq!(
        where_clause(HostField::sql("Email", "lower(email) =", HostType::text())),
        "lower(email) = lower($1)"
    );
    assert_eq!(
        where_clause(directive(Directive::Column, "name = any tags")),
        "name = ANY(tags)"
    );
    assert_eq!(
        where_clause(directive(Directive::Column, "nickname isnull")),
        "nickname IS NULL"
    );
    assert_eq!(
        where_clause(directive(Directive::Column, "score > 10")),
        "score > 10"
    );
}

#[test]
fn between_binds_both_bounds() {
    let range = HostField::new(
        "Created",
        Tag::new().with("sql", "created_at isbetween"),
        HostType::record(vec![
            HostField::sql("From", "x", HostType::time()),
            HostField::sql("To", "y", HostType::time()),
        ]),
    );
    let bound = statement(
        "SelectUsers",
        &[
            rel("Users", "users", HostType::seq(user_record())),
            block("Where", vec![range]),
        ],
    );

    assert!(bound.sql().ends_with("WHERE created_at BETWEEN $1 AND $2"));
    assert_eq!(fields(&bound), vec!["Where.Created.From", "Where.Created.To"]);
}

//
// insert
//

#[test]
fn insert_binds_inputs_and_renders_defaults() {
    let bound = statement(
        "InsertUser",
        &[
            rel("User", "users", user_record()),
            directive(Directive::Default, "id,created_at"),
        ],
    );

    assert_eq!(
        bound.sql(),
        "INSERT INTO users (id, name, email, nickname, created_at, active) \
         VALUES (DEFAULT, $1, $2, $3, DEFAULT, $4)"
    );
    assert_eq!(fields(&bound), vec!["Name", "Email", "Nickname", "Active"]);
    assert!(matches!(
        &bound.args[0],
        ArgSource::Input { adapter: Adapter::Table { type_name, .. }, .. } if type_name == "text"
    ));
}

#[test]
fn insert_returning_and_multi_row() {
    let bound = statement(
        "InsertUsers",
        &[
            rel("Users", "users", HostType::seq(user_record())),
            directive(Directive::Default, "id"),
            directive(Directive::Return, "id"),
        ],
    );

    assert!(bound.sql().ends_with("RETURNING id"));
    assert!(bound.multi_row);
    assert_eq!(bound.statement.max_param(), 5);
}

#[test]
fn insert_on_conflict_targets() {
    let insert_post = |members: Vec<HostField>| {
        sql(
            "InsertPost",
            &[
                rel("Post", "posts", post_record()),
                directive(Directive::Default, "id"),
                block("OnConflict", members),
            ],
        )
    };
    let prefix = "INSERT INTO posts (id, user_id, title, slug) VALUES (DEFAULT, $1, $2, $3)";

    assert_eq!(
        insert_post(vec![
            directive(Directive::Column, "slug,user_id"),
            directive(Directive::Update, "title"),
        ]),
        format!("{prefix} ON CONFLICT (slug, user_id) DO UPDATE SET title = EXCLUDED.title")
    );
    assert_eq!(
        insert_post(vec![
            directive(Directive::Index, "posts_user_slug_key"),
            directive(Directive::Update, "*"),
        ]),
        format!("{prefix} ON CONFLICT (user_id, slug) DO UPDATE SET title = EXCLUDED.title")
    );
    assert_eq!(
        insert_post(vec![
            directive(Directive::Constraint, "posts_pkey"),
            directive(Directive::Ignore, ""),
        ]),
        format!("{prefix} ON CONFLICT ON CONSTRAINT posts_pkey DO NOTHING")
    );
    assert_eq!(
        insert_post(vec![directive(Directive::Ignore, "")]),
        format!("{prefix} ON CONFLICT DO NOTHING")
    );
}

#[test]
fn conflict_update_needs_a_plain_target() {
    // the analyzer rejects this shape; hand-edited commands still fail
    let mut conn = FakeConnection::new().with_relation(posts_table());
    let mut checked = checked_in(
        &mut conn,
        "InsertPost",
        &[
            rel("Post", "posts", post_record()),
            block(
                "OnConflict",
                vec![
                    directive(Directive::Constraint, "posts_pkey"),
                    directive(Directive::Update, "title"),
                ],
            ),
        ],
    );
    if let Some(on_conflict) = checked.command.on_conflict.as_mut() {
        on_conflict.target = None;
    }
    assert_eq!(build(&checked).unwrap_err(), BuildError::MissingConflictTarget);

    let tokens = FakeRelation::table(20_300, "tokens")
        .column(FakeColumn::serial("id"))
        .column(FakeColumn::new("value", crate::catalog::oid::TEXT).not_null())
        .index(FakeIndex::new("tokens_lower_value_key", &[]).expression().unique());
    let mut conn = FakeConnection::new().with_relation(tokens);
    let record = HostType::record(vec![HostField::sql("Value", "value", HostType::text())]);
    let checked = checked_in(
        &mut conn,
        "InsertToken",
        &[
            rel("Token", "tokens", record),
            block(
                "OnConflict",
                vec![
                    directive(Directive::Index, "tokens_lower_value_key"),
                    directive(Directive::Ignore, ""),
                ],
            ),
        ],
    );

    assert_eq!(
        build(&checked).unwrap_err(),
        BuildError::ExpressionIndexTarget {
            index: "tokens_lower_value_key".to_string()
        }
    );
}

//
// update / delete
//

#[test]
fn update_binds_set_before_where() {
    let record = HostType::record(vec![
        HostField::sql("Name", "name", HostType::text()),
        HostField::sql("Email", "email", HostType::text()),
    ]);
    let bound = statement(
        "UpdateUser",
        &[
            rel("User", "users", record),
            block("Where", vec![HostField::sql("Id", "id", int())]),
            directive(Directive::Return, "*"),
        ],
    );

    assert_eq!(
        bound.sql(),
        "UPDATE users SET name = $1, email = $2 WHERE id = $3 RETURNING name, email"
    );
    assert_eq!(fields(&bound), vec!["Name", "Email", "Where.Id"]);
    assert!(matches!(bound.args[2], ArgSource::Predicate { .. }));
}

#[test]
fn update_from_moves_join_conditions_into_where() {
    let record = HostType::record(vec![HostField::sql(
        "Nickname",
        "nickname",
        HostType::optional(HostType::text()),
    )]);

    assert_eq!(
        sql(
            "UpdateUser",
            &[
                rel("User", "users:u", record),
                block("From", vec![directive(Directive::Join, "posts:p,p.user_id = u.id")]),
                block("Where", vec![HostField::sql("Title", "p.title", HostType::text())]),
            ],
        ),
        "UPDATE users AS u SET nickname = $1 FROM posts AS p \
         WHERE p.user_id = u.id AND (p.title = $2)"
    );
}

#[test]
fn update_without_columns_is_rejected() {
    let record = HostType::record(vec![HostField::sql("Id", "id,ro", int())]);
    let err = lower(
        "UpdateUsers",
        &[rel("User", "users", record), directive(Directive::All, "")],
    )
    .unwrap_err();

    assert!(matches!(err, BuildError::NoWritableColumns { ref command } if command == "UpdateUsers"));
}

#[test]
fn delete_forms() {
    assert_eq!(
        sql(
            "DeleteUser",
            &[
                rel("User", "users", user_record()),
                block("Where", vec![HostField::sql("Email", "email", HostType::text())]),
                directive(Directive::Return, "id"),
            ],
        ),
        "DELETE FROM users WHERE email = $1 RETURNING id"
    );

    assert_eq!(
        sql(
            "DeleteUsers",
            &[rel("User", "users", user_record()), directive(Directive::All, "")],
        ),
        "DELETE FROM users"
    );

    assert_eq!(
        sql(
            "DeleteUsers",
            &[
                rel("User", "users:u", user_record()),
                block("Using", vec![directive(Directive::Join, "posts:p,p.user_id = u.id")]),
                block("Where", vec![HostField::sql("Title", "p.title", HostType::text())]),
            ],
        ),
        "DELETE FROM users AS u USING posts AS p WHERE p.user_id = u.id AND (p.title = $1)"
    );
}

//
// filter
//

#[test]
fn filter_lowers_to_column_map() {
    let lowered = lower(
        "FilterUsers",
        &[
            rel("User", "users", user_record()),
            directive(Directive::TextSearch, "search"),
        ],
    )
    .unwrap();

    let map = lowered.filter().expect("filter commands lower to a map");
    assert!(lowered.statement().is_none());
    assert_eq!(map.relation, "users");
    assert_eq!(map.columns.len(), 6);
    assert_eq!(map.columns[0].field, "Id");
    assert_eq!(map.columns[0].column, "users.id");
    assert_eq!(map.text_search.as_deref(), Some("users.search"));
}

//
// rendering
//

#[test]
fn identifiers_are_quoted_when_needed() {
    let quoted = |name: &str| {
        let mut out = String::new();
        write_ident(&mut out, name).unwrap();
        out
    };

    assert_eq!(quoted("created_at"), "created_at");
    assert_eq!(quoted("order"), "\"order\"");
    assert_eq!(quoted("User"), "\"User\"");
    assert_eq!(quoted("odd\"name"), "\"odd\"\"name\"");
    assert_eq!(quoted("2fa"), "\"2fa\"");
}

#[test]
fn namespaced_tables_render_qualified() {
    let events = FakeRelation::table(20_100, "events")
        .in_namespace("audit")
        .column(FakeColumn::serial("id"));
    let mut conn = FakeConnection::new().with_relation(events);
    let record = HostType::record(vec![HostField::sql("Id", "id", int())]);
    let checked = checked_in(
        &mut conn,
        "SelectEvents",
        &[rel("Events", "audit.events", HostType::seq(record))],
    );

    let lowered = build(&checked).unwrap();
    assert_eq!(
        lowered.statement().map(BoundStatement::sql).as_deref(),
        Some("SELECT id FROM audit.events")
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn select_parameters_are_numbered_in_order(
        k in 1usize..6,
        limit in any::<bool>(),
        offset in any::<bool>(),
    ) {
        let members = (0..k)
            .map(|i| HostField::sql(format!("Id{i}"), "id", int()))
            .collect();
        let mut fields = vec![
            rel("Users", "users", HostType::seq(user_record())),
            block("Where", members),
        ];
        if limit {
            fields.push(HostField::new("Limit", Tag::new(), int()));
        }
        if offset {
            fields.push(HostField::new("Offset", Tag::new(), int()));
        }

        let bound = statement("SelectUsers", &fields);
        let m = usize::from(limit) + usize::from(offset);
        let expected: Vec<usize> = (1..=k + m).collect();

        prop_assert_eq!(bound.statement.params(), expected);
        prop_assert_eq!(bound.args.len(), k + m);
        prop_assert!(
            bound.args[..k].iter().all(|arg| matches!(arg, ArgSource::Predicate { .. })),
            "predicates bind first"
        );
        if limit {
            prop_assert!(matches!(bound.args[k], ArgSource::Limit { .. }), "limit follows predicates");
        }
        if offset {
            prop_assert!(matches!(bound.args[k + m - 1], ArgSource::Offset { .. }), "offset is last");
        }
    }
}
