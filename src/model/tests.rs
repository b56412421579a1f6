//! Tests for the model module

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;

const CUSTOMER: &str = "Winbooks.TORM.OM.Customer, Winbooks.TORM.OM";
const THIRD: &str = "Winbooks.TORM.OM.Third, Winbooks.TORM.OM";

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_resolve() {
    assert_eq!(ModelKind::resolve(CUSTOMER).unwrap(), ModelKind::Customer);
    assert_eq!(ModelKind::resolve("customers").unwrap(), ModelKind::Customer);
    assert_eq!(ModelKind::resolve("Third_Address").unwrap(), ModelKind::ThirdAddress);
    assert_eq!(ModelKind::resolve("ThirdAddress").unwrap(), ModelKind::ThirdAddress);
    assert_eq!(ModelKind::resolve("Journals").unwrap(), ModelKind::Journal);

    let err = ModelKind::resolve("Invoice").unwrap_err();
    assert!(matches!(err, Error::UndefinedObjectModel { .. }));
}

#[test]
fn test_registry_names() {
    assert_eq!(ModelKind::Customer.om(), "Customer");
    assert_eq!(ModelKind::Customer.oms(), "Customers");
    assert_eq!(ModelKind::ThirdCivility.oms(), "Third_Civilitys");
    assert_eq!(
        ModelKind::Journal.type_name(),
        "Winbooks.TORM.OM.Accounting.Journal, Winbooks.TORM.OM"
    );

    for kind in ModelKind::ALL {
        assert_eq!(ModelKind::from_type(kind.type_name()), Some(*kind));
    }
}

#[test]
fn test_is_model_type() {
    assert!(is_model_type(&json!(CUSTOMER)));
    assert!(!is_model_type(&json!("Winbooks.TORM.OM.Invoice, Winbooks.TORM.OM")));
    assert!(!is_model_type(&json!(42)));
    assert!(!is_model_type(&json!({"$type": CUSTOMER})));
}

#[test]
fn test_make_model_for_type() {
    let model = make_model_for_type(THIRD).unwrap();
    assert_eq!(model.kind(), ModelKind::Third);
    assert!(model.is_empty());

    assert!(matches!(
        make_model_for_type("nope"),
        Err(Error::UndefinedObjectModel { .. })
    ));
}

// ============================================================================
// Attribute access
// ============================================================================

#[test]
fn test_case_insensitive_access() {
    let mut model = ObjectModel::new(ModelKind::Customer);
    model.set("foo", "x");

    assert_eq!(model.get("FOO").and_then(Value::as_str), Some("x"));
    assert_eq!(model.get("foo").and_then(Value::as_str), Some("x"));
    assert_eq!(model.attributes().map(|(k, _)| k).collect::<Vec<_>>(), vec!["Foo"]);

    model.set("FOO", "y");
    assert_eq!(model.len(), 1);
    assert_eq!(model.get("Foo").and_then(Value::as_str), Some("y"));
}

#[test]
fn test_has_and_remove() {
    let mut model = ObjectModel::new(ModelKind::Customer);
    model.set("code", "A");
    assert!(model.has("CODE"));

    let removed = model.remove("code");
    assert_eq!(removed.as_ref().and_then(Value::as_str), Some("A"));
    assert!(!model.has("Code"));
}

#[test]
fn test_code_fallback() {
    let mut model = ObjectModel::new(ModelKind::Customer);
    assert_eq!(model.code(), None);

    model.set("Id", "1");
    assert_eq!(model.code().as_deref(), Some("1"));

    model.set("Code", "A");
    assert_eq!(model.code().as_deref(), Some("A"));

    let numeric = ObjectModel::with_attributes(
        ModelKind::Vat,
        json!({"Id": 21}).as_object().cloned().unwrap_or_default(),
    );
    assert_eq!(numeric.code().as_deref(), Some("21"));
}

#[test]
fn test_code_present_but_null_does_not_fall_back() {
    let model = ObjectModel::with_attributes(
        ModelKind::Customer,
        json!({"Code": null, "Id": "1"}).as_object().cloned().unwrap_or_default(),
    );
    assert!(model.has("Code"));
    assert_eq!(model.code(), None);
}

#[test]
fn test_get_keeps_raw_until_resolved() {
    let mut model = ObjectModel::with_attributes(
        ModelKind::Customer,
        json!({"Third": {"$type": "Winbooks.TORM.OM.Third, Winbooks.TORM.OM", "Code": "T"}})
            .as_object()
            .cloned()
            .unwrap_or_default(),
    );

    assert!(model.get("third").and_then(Value::as_model).is_none());
    assert!(model.get_model("third").is_some());
    assert!(model.get("third").and_then(Value::as_model).is_some());
}

// ============================================================================
// Promotion
// ============================================================================

#[test]
fn test_promote() {
    let value = Value::promote(json!({"$type": CUSTOMER, "Code": "ARTHUR"}));
    let model = value.as_model().unwrap();
    assert_eq!(model.kind(), ModelKind::Customer);
    assert!(!model.has("$type"));

    let raw = Value::promote(json!({"$type": "Unknown", "Code": "X"}));
    assert!(raw.as_model().is_none());
    assert_eq!(raw.as_raw().unwrap()["Code"], json!("X"));
}

#[test]
fn test_to_model_list() {
    let value = to_model(json!([
        {"$type": CUSTOMER, "Code": "A"},
        {"Code": "B"}
    ]));

    let items = value.as_list().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[0].as_model().is_some());
    assert!(items[1].as_raw().is_some());
}

#[test]
fn test_lazy_promotion_is_memoized() {
    let mut customer = ObjectModel::from_json(json!({
        "$type": CUSTOMER,
        "Code": "ARTHUR",
        "Third": {"$type": THIRD, "Name": "Arthur"}
    }))
    .unwrap();

    // Stored raw until accessed
    assert!(customer.get("third").and_then(Value::as_raw).is_some());

    let third = customer.get_model("third").unwrap();
    assert_eq!(third.kind(), ModelKind::Third);
    assert_eq!(third.get("name").and_then(Value::as_str), Some("Arthur"));

    assert!(customer.get("Third").and_then(Value::as_model).is_some());
}

#[test]
fn test_lazy_promotion_of_lists() {
    let mut third = ObjectModel::from_json(json!({
        "$type": THIRD,
        "Addresses": [
            {"$type": "Winbooks.TORM.OM.Address, Winbooks.TORM.OM", "City": "Liege"}
        ]
    }))
    .unwrap();

    let addresses = third.resolve("addresses").and_then(Value::as_list).unwrap();
    assert_eq!(addresses[0].as_model().map(ObjectModel::kind), Some(ModelKind::Address));
}

#[test]
fn test_from_json_unknown_type() {
    let err = ObjectModel::from_json(json!({"$type": "Nope", "Code": "A"})).unwrap_err();
    assert!(matches!(err, Error::UndefinedObjectModel { ref name } if name == "Nope"));
}

// ============================================================================
// Merge
// ============================================================================

#[test]
fn test_merge_maps_recursively_and_replaces_lists() {
    let mut customer = ObjectModel::from_json(json!({
        "$type": CUSTOMER,
        "Code": "A",
        "Memo": {"Lines": ["one"], "Author": "x"},
        "Tags": ["a", "b"]
    }))
    .unwrap();

    customer
        .merge_value(Value::from(json!({
            "memo": {"Lines": ["two"], "Date": "2024-01-01"},
            "Tags": ["c"],
            "Name": "Arthur"
        })))
        .unwrap();

    assert_eq!(
        customer.into_json(),
        json!({
            "$type": CUSTOMER,
            "Code": "A",
            "Memo": {"Lines": ["two"], "Author": "x", "Date": "2024-01-01"},
            "Tags": ["c"],
            "Name": "Arthur"
        })
    );
}

#[test]
fn test_merge_nested_models() {
    let mut customer = ObjectModel::from_json(json!({
        "$type": CUSTOMER,
        "Code": "A",
        "Third": {"$type": THIRD, "Name": "Arthur"}
    }))
    .unwrap();

    let update = ObjectModel::from_json(json!({
        "$type": CUSTOMER,
        "Third": {"$type": THIRD, "Vat": "BE0123"}
    }))
    .unwrap();

    customer.merge(update);

    let third = customer.get_model("Third").unwrap();
    assert_eq!(third.get("Name").and_then(Value::as_str), Some("Arthur"));
    assert_eq!(third.get("Vat").and_then(Value::as_str), Some("BE0123"));
}

#[test]
fn test_merge_rejects_scalars() {
    let mut model = ObjectModel::new(ModelKind::Customer);
    let err = model.merge_value(Value::from("nope")).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

// ============================================================================
// Serialization and relations
// ============================================================================

#[test]
fn test_serialization_starts_with_type() {
    let mut model = ObjectModel::new(ModelKind::Customer);
    model.set("code", "ARTHUR").set("name", "Arthur");

    assert_eq!(
        serde_json::to_string(&model).unwrap(),
        format!(r#"{{"$type":"{CUSTOMER}","Code":"ARTHUR","Name":"Arthur"}}"#)
    );
}

#[test]
fn test_model_relations() {
    let customer = ModelKind::Customer.make();
    let third = ModelKind::Third.make();

    let relation = customer.relation_for(&third).unwrap();
    assert_eq!(relation.name(), Some("third"));
    assert!(relation.fail_if_not_usable().is_ok());

    assert!(customer.relation("Third").is_ok());
    assert!(third.relation_for(&customer).is_none());

    let adhoc = customer.relates_to(ModelKind::Vat);
    assert_eq!(adhoc.get_alias(), "vat");
    assert!(adhoc.fail_if_not_usable().is_err());
}
