use super::*;
use crate::{
    command::{ColumnList, ConflictAction, ConflictTarget, IteratorKind, JoinKind, NullsOrder},
    host::{Capabilities, HostMethod, ScalarKind, Signature},
    ident::ColumnIdent,
    op::{BetweenOp, BoolOp, CmpOp, Quantifier, UnaryOp},
    predicate::{ColumnCondition, Operand, Predicate, WalkEvent},
    tag::Tag,
};

fn rel(name: &str, rel: &str, ty: HostType) -> HostField {
    HostField::new(name, Tag::new().with("rel", rel), ty)
}

fn directive(name: &str, d: Directive, sql: &str) -> HostField {
    if sql.is_empty() {
        HostField::new(name, Tag::new(), d.host_type())
    } else {
        HostField::sql(name, sql, d.host_type())
    }
}

fn user_record() -> HostType {
    HostType::record(vec![
        HostField::sql("Id", "id", HostType::scalar(ScalarKind::I64)),
        HostField::sql("Name", "name", HostType::text()),
        HostField::sql("Email", "email", HostType::text()),
    ])
    .named("app", "User")
}

fn block(name: &str, members: Vec<HostField>) -> HostField {
    HostField::new(name, Tag::new(), HostType::record(members))
}

fn analyze(name: &str, fields: &[HostField]) -> Result<Command, AnalyzeError> {
    analyze_command(name, fields, &AnalyzeOptions::default())
}

#[test]
fn kind_is_inferred_from_case_insensitive_prefix() {
    assert_eq!(command_kind("InsertUser").unwrap(), CommandKind::Insert);
    assert_eq!(command_kind("selectUsers").unwrap(), CommandKind::Select);
    assert_eq!(command_kind("FILTERPosts").unwrap(), CommandKind::Filter);

    let err = command_kind("UpsertUser").unwrap_err();
    assert!(matches!(err, AnalyzeError::UnrecognizedCommandKind { .. }));
}

#[test]
fn insert_flattens_record_fields() {
    let cmd = analyze("InsertUser", &[rel("User", "users", user_record())]).unwrap();

    assert_eq!(cmd.kind, CommandKind::Insert);
    assert_eq!(cmd.record.rel.name, "users");
    let columns: Vec<_> = cmd.record.fields.iter().map(|f| f.column.name.as_str()).collect();
    assert_eq!(columns, vec!["id", "name", "email"]);
    assert!(!cmd.record.shape.is_multi());
}

#[test]
fn missing_and_duplicate_record_fields_are_rejected() {
    let err = analyze("InsertUser", &[block("Where", vec![])]).unwrap_err();
    assert!(matches!(err, AnalyzeError::MissingRecordField { .. }));

    let err = analyze(
        "InsertUser",
        &[
            rel("A", "users", user_record()),
            rel("B", "users", user_record()),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::MultipleRecordFields { .. }));
}

#[test]
fn malformed_relation_identifier_is_rejected() {
    let err = analyze("InsertUser", &[rel("User", "users:", user_record())]).unwrap_err();
    assert!(matches!(err, AnalyzeError::InvalidRelationIdentifier { .. }));
}

#[test]
fn scalar_relation_field_fails_before_any_database_access() {
    let err = analyze("InsertUser", &[rel("User", "users", HostType::text())]).unwrap_err();
    assert!(matches!(err, AnalyzeError::InvalidRecordFieldType { .. }));
}

#[test]
fn sequence_and_optional_records_are_accepted() {
    let cmd = analyze(
        "SelectUsers",
        &[rel("Users", "users", HostType::seq(HostType::optional(user_record())))],
    )
    .unwrap();
    assert!(cmd.record.shape.sequence);
    assert!(cmd.record.shape.optional);

    let cmd = analyze(
        "SelectUser",
        &[rel("User", "users", HostType::optional(user_record()))],
    )
    .unwrap();
    assert!(cmd.record.shape.optional);
    assert!(!cmd.record.shape.is_multi());
}

#[test]
fn iterator_shapes_are_validated() {
    let func = HostType::func(vec![user_record()], vec![HostType::error()]);
    let cmd = analyze("SelectUsers", &[rel("Users", "users", func)]).unwrap();
    assert_eq!(cmd.record.shape.iterator, Some(IteratorKind::Func));

    let method = HostMethod {
        name: "NextUser".to_string(),
        sig: Signature {
            params: vec![HostType::optional(user_record())],
            results: vec![HostType::error()],
        },
    };
    let cap = HostType::capability(vec![method]);
    let cmd = analyze("SelectUsers", &[rel("Users", "users", cap)]).unwrap();
    assert!(cmd.record.shape.optional);
    assert!(matches!(
        cmd.record.shape.iterator,
        Some(IteratorKind::Method { ref name }) if name == "NextUser"
    ));

    let bad = HostType::func(vec![user_record()], vec![HostType::text()]);
    let err = analyze("SelectUsers", &[rel("Users", "users", bad)]).unwrap_err();
    assert!(matches!(err, AnalyzeError::InvalidIteratorType { .. }));

    let two_params = HostType::func(
        vec![user_record(), user_record()],
        vec![HostType::error()],
    );
    let err = analyze("SelectUsers", &[rel("Users", "users", two_params)]).unwrap_err();
    assert!(matches!(err, AnalyzeError::InvalidIteratorType { .. }));
}

#[test]
fn nested_records_flatten_with_prefix_and_skip() {
    let address = HostType::record(vec![
        HostField::sql("City", "city", HostType::text()),
        HostField::sql("Zip", "zip", HostType::text()),
    ]);
    let record = HostType::record(vec![
        HostField::sql("Id", "id", HostType::scalar(ScalarKind::I64)),
        HostField::sql("Home", ">home_", address),
        HostField::sql("Secret", "-", HostType::text()),
        HostField::new("Base", Tag::new(), HostType::record(vec![
            HostField::sql("Created", "created_at", HostType::time()),
        ]))
        .embedded(),
        HostField::new("Untagged", Tag::new(), HostType::text()),
    ]);

    let cmd = analyze("InsertUser", &[rel("User", "users", record)]).unwrap();
    let columns: Vec<_> = cmd.record.fields.iter().map(|f| f.column.to_string()).collect();
    assert_eq!(columns, vec!["id", "home_city", "home_zip", "created_at"]);
    assert_eq!(cmd.record.fields[1].key(), "Home.City");
}

#[test]
fn snake_case_naming_maps_untagged_fields() {
    let record = HostType::record(vec![
        HostField::new("FullName", Tag::new(), HostType::text()),
        HostField::sql("Id", "id", HostType::scalar(ScalarKind::I64)),
    ]);
    let options = AnalyzeOptions {
        column_naming: ColumnNaming::SnakeCase,
    };

    let cmd = analyze_command("InsertUser", &[rel("User", "users", record)], &options).unwrap();
    let columns: Vec<_> = cmd.record.fields.iter().map(|f| f.column.name.as_str()).collect();
    assert_eq!(columns, vec!["full_name", "id"]);
}

#[test]
fn where_block_parses_field_column_and_between_predicates() {
    let between = HostField::new(
        "Created",
        Tag::new().with("sql", "created_at isbetween"),
        HostType::record(vec![
            HostField::sql("From", "x", HostType::time()),
            directive("To", Directive::Column, "now(),y"),
        ]),
    );
    let where_block = block(
        "Where",
        vec![
            HostField::sql("Email", "lower(email) = ", HostType::text()),
            directive("_", Directive::Or, ""),
            HostField::sql("Ids", "id isin", HostType::seq(HostType::scalar(ScalarKind::I64))),
            directive("_", Directive::Column, "deleted_at isnull"),
            between,
        ],
    );

    let cmd = analyze(
        "SelectUser",
        &[rel("User", "users", user_record()), where_block],
    )
    .unwrap();
    let items = &cmd.where_block.as_ref().unwrap().items;
    assert_eq!(items.len(), 4);

    let Predicate::Field(email) = &items[0].predicate else {
        panic!("expected field predicate");
    };
    assert_eq!(email.column.func.as_deref(), Some("lower"));
    assert_eq!(email.op, CmpOp::Eq);
    assert_eq!(email.field.key(), "Where.Email");

    assert_eq!(items[1].connector, BoolOp::Or);
    let Predicate::Field(ids) = &items[1].predicate else {
        panic!("expected field predicate");
    };
    assert_eq!(ids.effective_quantifier(), Some(Quantifier::Any));

    let Predicate::Column(deleted) = &items[2].predicate else {
        panic!("expected column predicate");
    };
    assert_eq!(deleted.cond, ColumnCondition::Unary(UnaryOp::IsNull));

    let Predicate::Between(created) = &items[3].predicate else {
        panic!("expected between predicate");
    };
    assert_eq!(created.op, BetweenOp::Between);
    assert!(matches!(&created.x, Operand::Field(f) if f.key() == "Where.Created.From"));
    assert_eq!(created.y, Operand::Literal("now()".to_string()));
}

#[test]
fn where_block_nested_groups_walk_in_declaration_order() {
    // (a AND b) OR c
    let group = block(
        "AB",
        vec![
            HostField::sql("A", "name", HostType::text()),
            HostField::sql("B", "email", HostType::text()),
        ],
    );
    let where_block = block(
        "Where",
        vec![
            group,
            directive("_", Directive::Or, ""),
            HostField::sql("C", "id", HostType::scalar(ScalarKind::I64)),
        ],
    );

    let cmd = analyze(
        "SelectUser",
        &[rel("User", "users", user_record()), where_block],
    )
    .unwrap();
    let walk = cmd.where_block.as_ref().unwrap().walk();

    let mut leaves = 0;
    let mut groups = 0;
    for event in walk {
        if let WalkEvent::Item { item, .. } = event {
            match item.predicate {
                Predicate::Group(_) => groups += 1,
                _ => leaves += 1,
            }
        }
    }
    assert_eq!((leaves, groups), (3, 1));
}

#[test]
fn connectors_must_sit_between_predicates() {
    let leading = block(
        "Where",
        vec![
            directive("_", Directive::Or, ""),
            HostField::sql("Id", "id", HostType::scalar(ScalarKind::I64)),
        ],
    );
    let err = analyze("SelectUser", &[rel("User", "users", user_record()), leading]).unwrap_err();
    assert!(matches!(err, AnalyzeError::DanglingConnector { .. }));

    let trailing = block(
        "Where",
        vec![
            HostField::sql("Id", "id", HostType::scalar(ScalarKind::I64)),
            directive("_", Directive::And, ""),
        ],
    );
    let err = analyze("SelectUser", &[rel("User", "users", user_record()), trailing]).unwrap_err();
    assert!(matches!(err, AnalyzeError::DanglingConnector { .. }));
}

#[test]
fn where_predicates_reject_bad_operators_and_quantifiers() {
    let bad_op = block(
        "Where",
        vec![HostField::sql("Id", "id ===", HostType::scalar(ScalarKind::I64))],
    );
    let err = analyze("SelectUser", &[rel("User", "users", user_record()), bad_op]).unwrap_err();
    assert!(matches!(err, AnalyzeError::InvalidOperator { .. }));

    let bad_quant = block(
        "Where",
        vec![HostField::sql(
            "Ids",
            "id isdistinct any",
            HostType::seq(HostType::scalar(ScalarKind::I64)),
        )],
    );
    let err = analyze("SelectUser", &[rel("User", "users", user_record()), bad_quant]).unwrap_err();
    assert!(matches!(err, AnalyzeError::InvalidOperator { .. }));

    let untagged = block("Where", vec![HostField::new("Id", Tag::new(), HostType::text())]);
    let err = analyze("SelectUser", &[rel("User", "users", user_record()), untagged]).unwrap_err();
    assert!(matches!(err, AnalyzeError::MissingPredicateTag { .. }));
}

#[test]
fn join_block_parses_conditions_and_kinds() {
    let join = block(
        "Join",
        vec![
            directive(
                "_",
                Directive::LeftJoin,
                "posts:p,p.user_id = u.id,or p.editor_id = u.id,p.draft isfalse",
            ),
            directive("_", Directive::CrossJoin, "tags:t"),
        ],
    );
    let cmd = analyze(
        "SelectUser",
        &[rel("User", "users:u", user_record()), join],
    )
    .unwrap();

    let items = cmd.join_items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].kind, JoinKind::Left);
    assert_eq!(items[0].rel.key(), "p");
    assert_eq!(items[0].conditions.len(), 3);
    assert_eq!(items[0].conditions[1].connector, BoolOp::Or);
    assert!(matches!(
        &items[0].conditions[0].predicate.cond,
        ColumnCondition::Binary { rhs: Operand::Column(c), .. } if *c == ColumnIdent::new("u", "id")
    ));
    assert_eq!(items[1].kind, JoinKind::Cross);
    assert!(items[1].conditions.is_empty());
}

#[test]
fn join_without_condition_is_rejected() {
    let join = block("Join", vec![directive("_", Directive::Join, "posts:p")]);
    let err = analyze("SelectUser", &[rel("User", "users:u", user_record()), join]).unwrap_err();
    assert!(matches!(err, AnalyzeError::MissingJoinCondition { .. }));
}

#[test]
fn join_aliases_are_restricted_by_kind() {
    let from = block("From", vec![directive("_", Directive::Join, "posts:p,p.user_id = u.id")]);
    let err = analyze("SelectUser", &[rel("User", "users:u", user_record()), from]).unwrap_err();
    assert!(matches!(err, AnalyzeError::BlockNotAllowed { .. }));
}

#[test]
fn on_conflict_block_parses_target_and_action() {
    let on_conflict = block(
        "OnConflict",
        vec![
            directive("_", Directive::Column, "a,b"),
            directive("_", Directive::Update, "name,email"),
        ],
    );
    let cmd = analyze(
        "InsertUser",
        &[rel("User", "users", user_record()), on_conflict],
    )
    .unwrap();

    let block = cmd.on_conflict.unwrap();
    assert_eq!(
        block.target,
        Some(ConflictTarget::Columns(vec![
            ColumnIdent::new("", "a"),
            ColumnIdent::new("", "b"),
        ]))
    );
    assert!(matches!(block.action, ConflictAction::Update(ColumnList::Columns(ref c)) if c.len() == 2));
}

#[test]
fn on_conflict_requires_action_and_target_for_update() {
    let no_action = block("OnConflict", vec![directive("_", Directive::Index, "users_email_idx")]);
    let err = analyze("InsertUser", &[rel("User", "users", user_record()), no_action]).unwrap_err();
    assert_eq!(err, AnalyzeError::MissingConflictAction);

    let no_target = block("OnConflict", vec![directive("_", Directive::Update, "*")]);
    let err = analyze("InsertUser", &[rel("User", "users", user_record()), no_target]).unwrap_err();
    assert_eq!(err, AnalyzeError::MissingConflictTarget);

    let ignore = block("OnConflict", vec![directive("_", Directive::Ignore, "")]);
    let cmd = analyze("InsertUser", &[rel("User", "users", user_record()), ignore]).unwrap();
    assert_eq!(cmd.on_conflict.unwrap().action, ConflictAction::Ignore);
}

#[test]
fn select_directives_parse_order_limit_and_offset() {
    let cmd = analyze(
        "SelectUsers",
        &[
            rel("Users", "users", HostType::seq(user_record())),
            directive("_", Directive::OrderBy, "-name:nullslast,id"),
            directive("_", Directive::Limit, "25"),
            HostField::new("Offset", Tag::new(), HostType::scalar(ScalarKind::I64)),
        ],
    )
    .unwrap();

    let order = cmd.order_by.unwrap();
    assert_eq!(order.len(), 2);
    assert!(order[0].descending);
    assert_eq!(order[0].nulls, Some(NullsOrder::Last));
    assert!(!order[1].descending);
    assert_eq!(cmd.limit, Some(RowLimit::Literal(25)));
    assert!(matches!(cmd.offset, Some(RowLimit::Field(ref f)) if f.name() == "Offset"));
}

#[test]
fn limit_rejects_non_numeric_literal_and_wrong_kind() {
    let err = analyze(
        "SelectUsers",
        &[
            rel("Users", "users", HostType::seq(user_record())),
            directive("_", Directive::Limit, "ten"),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::InvalidLimitValue { .. }));

    let err = analyze(
        "DeleteUsers",
        &[
            rel("Users", "users", user_record()),
            directive("_", Directive::All, ""),
            directive("_", Directive::Limit, "10"),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::BlockNotAllowed { .. }));
}

#[test]
fn update_and_delete_require_where_or_all() {
    let err = analyze("UpdateUser", &[rel("User", "users", user_record())]).unwrap_err();
    assert!(matches!(err, AnalyzeError::MissingWhereOrAll { .. }));

    let cmd = analyze(
        "DeleteUsers",
        &[
            rel("User", "users", user_record()),
            directive("_", Directive::All, ""),
        ],
    )
    .unwrap();
    assert!(cmd.all);

    let where_block = block("Where", vec![HostField::sql("Id", "id", HostType::scalar(ScalarKind::I64))]);
    let err = analyze(
        "DeleteUsers",
        &[
            rel("User", "users", user_record()),
            where_block,
            directive("_", Directive::All, ""),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::ConflictingBlocks { .. }));
}

#[test]
fn write_directives_parse_column_lists() {
    let cmd = analyze(
        "InsertUser",
        &[
            rel("User", "users", user_record()),
            directive("_", Directive::Default, "id"),
            directive("_", Directive::Force, "*"),
            directive("_", Directive::Return, "id,email"),
        ],
    )
    .unwrap();

    assert_eq!(cmd.defaults, Some(ColumnList::Columns(vec![ColumnIdent::new("", "id")])));
    assert_eq!(cmd.force, Some(ColumnList::All));
    assert_eq!(cmd.returning.unwrap().columns().len(), 2);
}

#[test]
fn return_and_result_are_exclusive() {
    let result = HostField::new(
        "Result",
        Tag::new(),
        HostType::record(vec![HostField::sql("Id", "id", HostType::scalar(ScalarKind::I64))]),
    );
    let err = analyze(
        "InsertUser",
        &[
            rel("User", "users", user_record()),
            directive("_", Directive::Return, "*"),
            result,
        ],
    )
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::ConflictingBlocks { .. }));
}

#[test]
fn filter_accepts_text_search_and_rejects_where() {
    let cmd = analyze(
        "FilterUsers",
        &[
            rel("User", "users", user_record()),
            directive("_", Directive::TextSearch, "document"),
        ],
    )
    .unwrap();
    assert_eq!(cmd.text_search, Some(ColumnIdent::new("", "document")));

    let where_block = block("Where", vec![HostField::sql("Id", "id", HostType::scalar(ScalarKind::I64))]);
    let err = analyze("FilterUsers", &[rel("User", "users", user_record()), where_block]).unwrap_err();
    assert!(matches!(err, AnalyzeError::BlockNotAllowed { .. }));
}

#[test]
fn auxiliary_fields_are_type_checked() {
    let err = analyze(
        "UpdateUser",
        &[
            rel("User", "users", user_record()),
            directive("_", Directive::All, ""),
            HostField::new("RowsAffected", Tag::new(), HostType::text()),
        ],
    )
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::InvalidBlockType { .. }));

    let handler = HostType::capability(vec![HostMethod {
        name: "HandleError".to_string(),
        sig: Signature {
            params: vec![HostType::error()],
            results: vec![HostType::error()],
        },
    }]);
    let cmd = analyze(
        "UpdateUser",
        &[
            rel("User", "users", user_record()),
            directive("_", Directive::All, ""),
            HostField::new("RowsAffected", Tag::new(), HostType::scalar(ScalarKind::I64)),
            HostField::new("ErrorHandler", Tag::new(), handler),
        ],
    )
    .unwrap();
    assert_eq!(cmd.rows_affected.unwrap().name(), "RowsAffected");
    assert!(cmd.error_handler.is_some());
}

#[test]
fn codec_records_are_leaf_fields() {
    let codec = HostType::record(vec![]).with_caps(Capabilities {
        encodes: true,
        decodes: true,
        ..Capabilities::default()
    });
    let record = HostType::record(vec![HostField::sql("Point", "location", codec)]);

    let cmd = analyze("InsertPlace", &[rel("Place", "places", record)]).unwrap();
    assert_eq!(cmd.record.fields.len(), 1);
    assert_eq!(cmd.record.fields[0].column.name, "location");
}
