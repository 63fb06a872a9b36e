/// Property-based tests using proptest
/// Tests invariants of the consolidator that should hold for all inputs
use cliente_consolidado::consolidator::consolidate;
use cliente_consolidado::models::{NAME_UNAVAILABLE, NO_SEGMENT};
use proptest::prelude::*;
use serde_json::{json, Value};

/// A detail entry that is either valid (id present) or malformed in one of
/// the ways upstreams get it wrong.
fn detail_entry() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => (1u32..50, proptest::option::of(0u32..20)).prop_map(|(id, count)| match count {
            Some(count) => json!({"cliente_id": id, "cantidad_de_compras": count}),
            None => json!({"cliente_id": id}),
        }),
        1 => Just(json!({"cantidad_de_compras": 1})),
        1 => Just(json!({"cliente_id": null})),
        1 => "[a-z]{0,8}".prop_map(Value::String),
        1 => (0i64..100).prop_map(|n| json!(n)),
    ]
}

fn is_valid_detail(entry: &Value) -> bool {
    entry
        .get("cliente_id")
        .is_some_and(|id| !id.is_null())
}

fn lookup_list(field: &'static str) -> impl Strategy<Value = Value> {
    proptest::collection::vec((1u32..50, "[a-z]{1,6}"), 0..20).prop_map(move |pairs| {
        Value::Array(
            pairs
                .into_iter()
                .map(|(id, value)| json!({"cliente_id": id, field: value}))
                .collect(),
        )
    })
}

proptest! {
    #[test]
    fn one_record_per_valid_detail_in_order(
        segments in lookup_list("segmento"),
        customers in lookup_list("fullname"),
        page1 in proptest::collection::vec(detail_entry(), 0..30),
        page2 in proptest::collection::vec(detail_entry(), 0..30),
    ) {
        let expected_ids: Vec<Value> = page1
            .iter()
            .chain(page2.iter())
            .filter(|e| is_valid_detail(e))
            .map(|e| e["cliente_id"].clone())
            .collect();
        let total = page1.len() + page2.len();

        let result = consolidate(
            segments,
            customers,
            Value::Array(page1),
            Some(json!({"clientes_info": page2})),
        )
        .unwrap();

        let ids: Vec<Value> = result.records.iter().map(|r| r.customer_id.clone()).collect();
        prop_assert_eq!(ids, expected_ids);
        prop_assert_eq!(result.stats.processed + result.stats.skipped, total);
    }

    #[test]
    fn records_never_carry_null_fields(
        segments in lookup_list("segmento"),
        customers in lookup_list("fullname"),
        page1 in proptest::collection::vec(detail_entry(), 0..30),
    ) {
        let result = consolidate(segments, customers, Value::Array(page1), None).unwrap();

        for record in &result.records {
            prop_assert!(!record.name.is_null());
            prop_assert!(!record.segment.is_null());
            prop_assert!(!record.purchase_count.is_null());
            prop_assert!(!record.purchase_cost.is_null());
            prop_assert!(!record.ultima_compra.is_null());
        }
    }

    #[test]
    fn unknown_customers_get_sentinels(
        page1 in proptest::collection::vec(1u32..1000, 0..20),
    ) {
        let details: Vec<Value> = page1.iter().map(|id| json!({"cliente_id": id})).collect();
        let result = consolidate(json!([]), json!([]), Value::Array(details), None).unwrap();

        prop_assert_eq!(result.records.len(), page1.len());
        for record in &result.records {
            prop_assert_eq!(&record.name, &json!(NAME_UNAVAILABLE));
            prop_assert_eq!(&record.segment, &json!(NO_SEGMENT));
            prop_assert_eq!(&record.purchase_count, &json!(0));
            prop_assert_eq!(&record.purchase_cost, &json!(0));
            prop_assert_eq!(&record.ultima_compra, &json!(""));
        }
    }

    #[test]
    fn malformed_page2_equals_page1_only(
        page1 in proptest::collection::vec(detail_entry(), 0..20),
        garbage in prop_oneof![
            "\\PC*".prop_map(Value::String),
            Just(Value::Null),
            Just(json!({"message": "nothing here"})),
            any::<i64>().prop_map(|n| json!(n)),
        ],
    ) {
        let with_garbage =
            consolidate(json!([]), json!([]), Value::Array(page1.clone()), Some(garbage)).unwrap();
        let page1_only = consolidate(json!([]), json!([]), Value::Array(page1), None).unwrap();

        prop_assert_eq!(with_garbage, page1_only);
    }

    #[test]
    fn bare_string_required_sources_always_fail(text in "\\PC*") {
        prop_assert!(consolidate(Value::String(text.clone()), json!([]), json!([]), None).is_err());
        prop_assert!(consolidate(json!([]), Value::String(text.clone()), json!([]), None).is_err());
        prop_assert!(consolidate(json!([]), json!([]), Value::String(text), None).is_err());
    }
}
