use freightdesk_core::{
    CollectionParams, ContentRange, EntityConfig, FieldKind, OrderBy, Predicate, QueryAssembler,
    QueryError, RangeRequest, RangeTranslator,
};
use proptest::prelude::*;
use serde_json::json;

fn order_entity() -> EntityConfig {
    EntityConfig::builder("orders")
        .field("id", FieldKind::Text)
        .field("reference", FieldKind::Text)
        .field("pallets", FieldKind::Numeric)
        .field("priority", FieldKind::Boolean)
        .field("eta_date", FieldKind::Temporal)
        .sortable(["id", "reference"])
        .build()
        .unwrap()
}

fn compile(filter: serde_json::Value) -> Option<Predicate> {
    let cfg = order_entity();
    let params = CollectionParams::from_values(Some(filter), None, None).unwrap();
    let (data, _) = QueryAssembler::new(&cfg).assemble(&params).unwrap();
    data.predicate
}

#[test]
fn order_listing_scenario() {
    let cfg = order_entity();
    let params = CollectionParams::decode(
        Some(r#"{"reference":"TEST","pallets:gte":5}"#),
        Some(r#"["reference","ASC"]"#),
        Some("[0,4]"),
    )
    .unwrap();
    let (data, count) = QueryAssembler::new(&cfg).assemble(&params).unwrap();

    assert_eq!(
        data.predicate.as_ref().unwrap().to_string(),
        "reference ILIKE '%TEST%' AND pallets >= 5"
    );
    assert_eq!(data.order_by, Some(OrderBy::asc("reference")));
    assert_eq!(data.offset, Some(0));
    assert_eq!(data.limit, Some(5));
    assert_eq!(count.predicate, data.predicate);
    assert_eq!(ContentRange::format(params.range.as_ref(), 17), "0-4/17");
}

#[test]
fn uuid_id_or_group_is_substring_matched() {
    let p = compile(json!({"id|reference": "X"})).unwrap();
    assert_eq!(p.to_string(), "id ILIKE '%X%' OR reference ILIKE '%X%'");
}

#[test]
fn unknown_sort_field_is_dropped_but_bad_direction_fails() {
    let cfg = order_entity();
    let params = CollectionParams::decode(None, Some(r#"["unknown_field","ASC"]"#), None).unwrap();
    let (data, _) = QueryAssembler::new(&cfg).assemble(&params).unwrap();
    assert_eq!(data.order_by, None);

    let params = CollectionParams::decode(None, Some(r#"["reference","SIDEWAYS"]"#), None).unwrap();
    assert_eq!(
        QueryAssembler::new(&cfg).assemble(&params).unwrap_err(),
        QueryError::InvalidSortDirection("SIDEWAYS".into())
    );
}

#[test]
fn negative_end_disables_pagination() {
    let r = RangeRequest::new(5, -1).unwrap();
    assert_eq!(RangeTranslator::translate(Some(&r)), None);
}

fn operator_token() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("gt"),
        Just("gte"),
        Just("lt"),
        Just("lte"),
        Just("eq"),
        Just("ne"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// An operator token outside the known set compiles like no operator.
    #[test]
    fn prop_unknown_operator_equals_bare_key(
        token in "[a-z]{1,8}".prop_filter("must not be a known token", |t| {
            freightdesk_core::Operator::from_token(t).is_none()
        }),
        field in prop_oneof![Just("reference"), Just("pallets"), Just("priority")],
        value in prop_oneof![Just(json!("abc")), Just(json!(3)), Just(json!(true))],
    ) {
        let with_op = compile(json!({ format!("{field}:{token}"): value.clone() }));
        let bare = compile(json!({ field: value }));
        prop_assert_eq!(with_op, bare);
    }

    /// Comparable kinds perform the requested comparison, never substring matching.
    #[test]
    fn prop_comparable_kinds_never_use_substring(
        op in operator_token(),
        field in prop_oneof![Just("pallets"), Just("priority"), Just("eta_date")],
        n in 0i64..1000,
    ) {
        let p = compile(json!({ format!("{field}:{op}"): n })).unwrap();
        let is_compare = matches!(p, Predicate::Compare { .. });
        prop_assert!(is_compare, "expected comparison, got {:?}", p);
    }

    /// Text fields use substring match for any operator unless given a list.
    #[test]
    fn prop_text_fields_ignore_operators(
        op in operator_token(),
        needle in "[A-Za-z0-9]{1,12}",
    ) {
        let p = compile(json!({ format!("reference:{op}"): needle.clone() })).unwrap();
        prop_assert_eq!(
            p,
            Predicate::Contains { field: "reference".into(), needle }
        );
        let list = compile(json!({ format!("reference:{op}"): ["a", "b"] })).unwrap();
        let is_membership = matches!(list, Predicate::InList { .. });
        prop_assert!(is_membership);
    }

    /// Without a range the header spans the whole total.
    #[test]
    fn prop_content_range_without_range(total in 0u64..1_000_000) {
        prop_assert_eq!(
            ContentRange::format(None, total),
            format!("0-{total}/{total}")
        );
    }

    /// The header echoes requested bounds even past the total.
    #[test]
    fn prop_content_range_is_not_clamped(total in 0u64..10) {
        let r = RangeRequest::new(5, 9).unwrap();
        prop_assert_eq!(ContentRange::format(Some(&r), total), format!("5-9/{total}"));
    }

    /// Compiling the same input twice yields equal queries.
    #[test]
    fn prop_compilation_is_idempotent(
        needle in "[a-z]{0,6}",
        n in -50i64..50,
        start in 0i64..100,
        span in -1i64..50,
    ) {
        let cfg = order_entity();
        let filter = json!({"reference|id": needle, "pallets:lt": n, "_query": "q"});
        let range = json!([start, start + span]);
        let params = CollectionParams::from_values(
            Some(filter),
            Some(json!(["id", "DESC"])),
            Some(range),
        ).unwrap();
        let assembler = QueryAssembler::new(&cfg);
        let first = assembler.assemble(&params).unwrap();
        let second = assembler.assemble(&params).unwrap();
        prop_assert_eq!(first, second);
    }
}
