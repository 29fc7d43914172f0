use super::*;
use crate::{
    catalog::{Catalog, Oid, TypeClass, TypeCategory, oid},
    relation::Column,
    test_support::{HSTORE_OID, MOOD_OID, standard_catalog},
};
use proptest::prelude::*;
use tagsql_ir::{
    ColumnIdent, HostType,
    command::FieldInfo,
    host::{Capabilities, ScalarKind},
    op::CmpOp,
    tag::FieldOptions,
};

const NUMERIC_10_0: i32 = (10 << 16) + 4;
const NUMERIC_10_2: i32 = (10 << 16) + 2 + 4;

fn column(catalog: &Catalog, type_oid: Oid, typmod: i32) -> Column {
    Column {
        ordinal: 1,
        name: "c".to_string(),
        dims: 0,
        typmod,
        not_null: false,
        has_default: false,
        is_primary: false,
        ty: catalog.type_by_oid(type_oid).cloned().unwrap(),
    }
}

fn field(ty: HostType) -> FieldInfo {
    FieldInfo {
        path: vec!["F".to_string()],
        column: ColumnIdent::new("", "c"),
        ty,
        options: FieldOptions::default(),
    }
}

fn with_options(ty: HostType, options: FieldOptions) -> FieldInfo {
    FieldInfo {
        options,
        ..field(ty)
    }
}

fn scalar(kind: ScalarKind) -> HostType {
    HostType::scalar(kind)
}

fn typmod_for(rule: &AssignRule) -> i32 {
    match rule.modifier {
        Modifier::Any => -1,
        Modifier::Len1 if rule.oid == oid::BIT => 1,
        Modifier::Len1 => 5,
        Modifier::NoScale => NUMERIC_10_0,
    }
}

//
// candidates
//

#[test]
fn text_candidates_cover_character_types() {
    let catalog = standard_catalog();

    assert_eq!(
        field_type_candidate_oids(&HostType::text(), &catalog),
        vec![oid::TEXT, oid::VARCHAR, oid::BPCHAR]
    );
    assert_eq!(
        field_type_candidate_oids(&HostType::optional(HostType::text()), &catalog),
        vec![oid::TEXT, oid::VARCHAR, oid::BPCHAR],
        "optionality does not change candidates"
    );
}

#[test]
fn map_candidates_resolve_extension_types_by_name() {
    let catalog = standard_catalog();
    let map = HostType::map(HostType::text(), HostType::optional(HostType::text()));

    assert_eq!(field_type_candidate_oids(&map, &catalog), vec![HSTORE_OID]);
    assert!(
        field_type_candidate_oids(&map, &Catalog::default()).is_empty(),
        "no hstore without the extension"
    );
}

#[test]
fn unknown_signatures_have_no_candidates() {
    let catalog = standard_catalog();
    let record = HostType::record(Vec::new()).named("app", "Thing");

    assert!(field_type_candidate_oids(&record, &catalog).is_empty());
    assert_eq!(signature_candidates("[u8; 16]"), &[oid::UUID]);
}

//
// compare
//

#[test]
fn compare_is_reflexive_for_types_with_same_oid_operators() {
    let catalog = standard_catalog();

    for ty in crate::test_support::standard_types() {
        for op in [CmpOp::Eq, CmpOp::Ne] {
            if catalog.operator_exists(op.base_operator(), ty.oid, ty.oid) {
                assert!(
                    can_compare(&catalog, &ty, &[ty.oid], op),
                    "{} should compare with itself",
                    ty.name
                );
            }
        }
    }
}

#[test]
fn string_columns_compare_with_untyped_literals() {
    let catalog = standard_catalog();
    let text = catalog.type_by_oid(oid::TEXT).unwrap();
    let int4 = catalog.type_by_oid(oid::INT4).unwrap();

    assert!(can_compare(&catalog, text, &[oid::UNKNOWN], CmpOp::Lt));
    assert!(!can_compare(&catalog, int4, &[oid::UNKNOWN], CmpOp::Eq));
}

#[test]
fn compare_uses_cross_type_operators_and_implicit_casts() {
    let catalog = standard_catalog();
    let int4 = catalog.type_by_oid(oid::INT4).unwrap();
    let varchar = catalog.type_by_oid(oid::VARCHAR).unwrap();
    let numeric = catalog.type_by_oid(oid::NUMERIC).unwrap();

    assert!(can_compare(&catalog, int4, &[oid::INT8], CmpOp::Gte));
    assert!(can_compare(&catalog, varchar, &[oid::TEXT], CmpOp::Like));
    assert!(can_compare(&catalog, numeric, &[oid::INT4], CmpOp::Eq));
    assert!(!can_compare(&catalog, int4, &[oid::TEXT, oid::VARCHAR], CmpOp::Eq));
    assert!(!can_compare(&catalog, int4, &[oid::INT4], CmpOp::Like));
}

#[test]
fn membership_compares_with_the_equality_class() {
    let catalog = standard_catalog();
    let text = catalog.type_by_oid(oid::TEXT).unwrap();

    assert!(can_compare(&catalog, text, &[oid::TEXT], CmpOp::IsIn));
    assert!(can_compare(&catalog, text, &[oid::TEXT], CmpOp::NotIn));
}

#[test]
fn polymorphic_operators_require_matching_operands() {
    let catalog = standard_catalog();
    let text_array = catalog.type_by_oid(oid::TEXT_ARRAY).unwrap();
    let mood = catalog.type_by_oid(MOOD_OID).unwrap();

    assert!(can_compare(&catalog, text_array, &[oid::TEXT_ARRAY], CmpOp::Eq));
    assert!(!can_compare(&catalog, text_array, &[oid::INT4_ARRAY], CmpOp::Eq));
    assert!(can_compare(&catalog, mood, &[MOOD_OID], CmpOp::Lt));
    assert!(can_compare(&catalog, mood, &[oid::TEXT], CmpOp::Eq), "labels bind as text");
}

//
// assign
//

#[test]
fn every_assign_rule_certifies_its_declared_directions() {
    let catalog = standard_catalog();

    for rule in ASSIGN_RULES {
        let col = column(&catalog, rule.oid, typmod_for(rule));
        for dir in [Direction::Read, Direction::Write] {
            if rule.direction.allows(dir) {
                assert!(
                    find_rule(&col, rule.signature, dir).is_some(),
                    "{} <-> {} should hold for {dir}",
                    col.ty.name,
                    rule.signature
                );
            }
        }
    }
}

proptest! {
    #[test]
    fn assign_rules_never_leak_into_the_other_direction(idx in 0..ASSIGN_RULES.len()) {
        let catalog = standard_catalog();
        let rule = &ASSIGN_RULES[idx];
        let col = column(&catalog, rule.oid, typmod_for(rule));

        for dir in [Direction::Read, Direction::Write] {
            let declared = ASSIGN_RULES.iter().any(|other| {
                other.oid == rule.oid
                    && other.signature == rule.signature
                    && other.direction.allows(dir)
                    && other.modifier.matches(&col)
            });
            prop_assert_eq!(find_rule(&col, rule.signature, dir).is_some(), declared);
        }
    }
}

#[test]
fn integer_widening_is_directional() {
    let catalog = standard_catalog();
    let int2 = column(&catalog, oid::INT2, -1);
    let int8 = column(&catalog, oid::INT8, -1);

    let wide = field(scalar(ScalarKind::I64));
    assert!(can_assign(&catalog, &int2, &wide, Direction::Read));
    assert!(!can_assign(&catalog, &int2, &wide, Direction::Write));

    let narrow = field(scalar(ScalarKind::I32));
    assert!(can_assign(&catalog, &int8, &narrow, Direction::Write));
    assert!(!can_assign(&catalog, &int8, &narrow, Direction::Read));
}

#[test]
fn modifiers_gate_char_and_numeric_rules() {
    let catalog = standard_catalog();
    let ch = field(scalar(ScalarKind::Char));
    let int = field(scalar(ScalarKind::I64));

    assert!(can_assign(&catalog, &column(&catalog, oid::BPCHAR, 5), &ch, Direction::Write));
    assert!(!can_assign(&catalog, &column(&catalog, oid::BPCHAR, 14), &ch, Direction::Write));
    assert!(can_assign(&catalog, &column(&catalog, oid::BIT, 1), &field(scalar(ScalarKind::Bool)), Direction::Read));

    assert!(can_assign(&catalog, &column(&catalog, oid::NUMERIC, NUMERIC_10_0), &int, Direction::Read));
    assert!(!can_assign(&catalog, &column(&catalog, oid::NUMERIC, NUMERIC_10_2), &int, Direction::Read));
    assert!(!can_assign(&catalog, &column(&catalog, oid::NUMERIC, -1), &int, Direction::Read));
}

#[test]
fn self_codecs_assign_per_direction() {
    let catalog = standard_catalog();
    let col = column(&catalog, oid::INT4, -1);
    let caps = Capabilities {
        encodes: true,
        ..Capabilities::default()
    };
    let coded = field(HostType::record(Vec::new()).named("app", "Money").with_caps(caps));

    assert_eq!(
        assign_adapter(&catalog, &col, &coded, Direction::Write),
        Some(Adapter::SelfCodec)
    );
    assert_eq!(assign_adapter(&catalog, &col, &coded, Direction::Read), None);
}

#[test]
fn json_columns_need_opt_in_or_marshal_capability() {
    let catalog = standard_catalog();
    let jsonb = column(&catalog, oid::JSONB, -1);
    let record = HostType::record(Vec::new()).named("app", "Prefs");

    assert_eq!(assign_adapter(&catalog, &jsonb, &field(record.clone()), Direction::Write), None);

    let opted = with_options(
        record.clone(),
        FieldOptions {
            json: true,
            ..FieldOptions::default()
        },
    );
    assert_eq!(
        assign_adapter(&catalog, &jsonb, &opted, Direction::Read),
        Some(Adapter::Json)
    );

    let marshals = record.with_caps(Capabilities {
        json_unmarshal: true,
        ..Capabilities::default()
    });
    assert!(can_assign(&catalog, &jsonb, &field(marshals.clone()), Direction::Read));
    assert!(!can_assign(&catalog, &jsonb, &field(marshals), Direction::Write));
}

#[test]
fn json_arrays_require_sequence_fields() {
    let catalog = standard_catalog();
    let json_array = column(&catalog, oid::JSONB_ARRAY, -1);
    let opt_in = FieldOptions {
        json: true,
        ..FieldOptions::default()
    };
    let element = HostType::record(Vec::new()).named("app", "Item");

    assert!(can_assign(
        &catalog,
        &json_array,
        &with_options(HostType::seq(element.clone()), opt_in),
        Direction::Write
    ));
    assert!(!can_assign(&catalog, &json_array, &with_options(element, opt_in), Direction::Write));
}

#[test]
fn xml_and_hstore_adapters() {
    let catalog = standard_catalog();
    let xml = column(&catalog, oid::XML, -1);
    let hstore = column(&catalog, HSTORE_OID, -1);
    let opt_in = FieldOptions {
        xml: true,
        ..FieldOptions::default()
    };

    assert_eq!(
        assign_adapter(
            &catalog,
            &xml,
            &with_options(HostType::record(Vec::new()).named("app", "Doc"), opt_in),
            Direction::Write
        ),
        Some(Adapter::Xml)
    );
    assert_eq!(
        assign_adapter(
            &catalog,
            &hstore,
            &field(HostType::map(HostType::text(), HostType::text())),
            Direction::Read
        ),
        Some(Adapter::Hstore)
    );
}

#[test]
fn table_adapters_name_the_pair() {
    let catalog = standard_catalog();
    let col = column(&catalog, oid::TIMESTAMPTZ, -1);
    let adapter = assign_adapter(&catalog, &col, &field(HostType::time()), Direction::Read).unwrap();

    assert_eq!(adapter.name(), "timestamptz:time");
}

#[test]
fn cast_option_falls_back_to_coercion() {
    let catalog = standard_catalog();
    let int2 = column(&catalog, oid::INT2, -1);
    let wide = scalar(ScalarKind::I64);
    let cast = FieldOptions {
        cast: true,
        ..FieldOptions::default()
    };

    assert!(!can_assign(&catalog, &int2, &field(wide.clone()), Direction::Write));
    assert_eq!(
        assign_adapter(&catalog, &int2, &with_options(wide, cast), Direction::Write),
        Some(Adapter::Coerce)
    );
}

//
// coerce
//

#[test]
fn string_columns_coerce_anything() {
    let catalog = standard_catalog();
    let varchar = column(&catalog, oid::VARCHAR, -1);

    assert!(can_coerce(&catalog, &varchar, &scalar(ScalarKind::F64)));
    assert!(can_coerce(&catalog, &varchar, &HostType::time()));
}

#[test]
fn coercion_follows_implicit_and_assignment_casts() {
    let catalog = standard_catalog();
    let int4 = column(&catalog, oid::INT4, -1);
    let boolean = column(&catalog, oid::BOOL, -1);

    assert!(can_coerce(&catalog, &int4, &scalar(ScalarKind::I64)), "assignment cast");
    assert!(can_coerce(&catalog, &int4, &scalar(ScalarKind::I16)), "implicit cast");
    assert!(!can_coerce(&catalog, &boolean, &scalar(ScalarKind::I32)), "explicit only");
}

#[test]
fn array_columns_coerce_elementwise() {
    let catalog = standard_catalog();
    let int8_array = column(&catalog, oid::INT8_ARRAY, -1);
    let text_array = column(&catalog, oid::TEXT_ARRAY, -1);
    let vector = column(&catalog, oid::INT2VECTOR, -1);

    assert!(can_coerce(&catalog, &int8_array, &HostType::seq(scalar(ScalarKind::U16))));
    assert!(can_coerce(&catalog, &text_array, &HostType::seq(scalar(ScalarKind::F64))));
    assert!(!can_coerce(&catalog, &text_array, &scalar(ScalarKind::F64)));
    assert!(!can_coerce(&catalog, &vector, &HostType::seq(scalar(ScalarKind::I16))));
}

#[test]
fn domain_columns_are_accepted_unchecked() {
    let catalog = standard_catalog();
    let mut domain = column(&catalog, oid::INT4, -1);
    domain.ty.class = TypeClass::Domain;
    domain.ty.category = TypeCategory::Numeric;

    assert!(can_coerce(&catalog, &domain, &scalar(ScalarKind::Bool)));
}

#[test]
fn direction_renders_for_messages() {
    assert_eq!(Direction::Read.to_string(), "read from");
    assert_eq!(Direction::Write.to_string(), "written to");
}
