use serde_json::json;

use rust_data_operators::config::{from_json, from_json_value, to_json, to_json_pretty};
use rust_data_operators::processing::{
    AdaptedFunction, BinaryOperator, BinaryOperatorComposite, DefaultIfEmpty, Function, If,
    Predicate,
};
use rust_data_operators::tuple::{Selection, Tuple};
use rust_data_operators::types::{Value, ValueType};
use rust_data_operators::OperatorError;

fn document<T: serde::Serialize>(unit: &T) -> serde_json::Value {
    serde_json::from_str(&to_json(unit).unwrap()).unwrap()
}

#[test]
fn if_with_static_condition() {
    let conditional = Predicate::If(If::new(
        true,
        Predicate::is_a(ValueType::Utf8),
        Predicate::is_a(ValueType::Int32),
    ));
    assert_eq!(
        document(&conditional),
        json!({
            "class": "predicate.If",
            "condition": true,
            "then": { "class": "predicate.IsA", "type": "Utf8" },
            "otherwise": { "class": "predicate.IsA", "type": "Int32" }
        })
    );

    let back: Predicate = from_json(&to_json_pretty(&conditional).unwrap()).unwrap();
    assert_eq!(back, conditional);
    match back {
        Predicate::If(i) => {
            assert_eq!(i.condition(), Some(true));
            assert_eq!(i.then(), Some(&Predicate::is_a(ValueType::Utf8)));
        }
        other => panic!("unexpected predicate {other:?}"),
    }
}

#[test]
fn if_with_controlling_predicate() {
    let conditional = Predicate::If(If::with_predicate(
        Predicate::is_a(ValueType::Int32),
        Predicate::is_less_than(3i32),
        Predicate::is_a(ValueType::Utf8),
    ));
    let doc = document(&conditional);
    assert_eq!(
        doc,
        json!({
            "class": "predicate.If",
            "predicate": { "class": "predicate.IsA", "type": "Int32" },
            "then": { "class": "predicate.IsLessThan", "value": 3, "orEqualTo": false },
            "otherwise": { "class": "predicate.IsA", "type": "Utf8" }
        })
    );
    let back: Predicate = from_json_value(doc).unwrap();
    assert!(back.test(&Value::from(2i32)));
    assert!(!back.test(&Value::from(3i32)));
}

#[test]
fn numeric_kinds_survive_round_trips() {
    let values = vec![
        Value::from(5i16),
        Value::from(5i32),
        Value::from(5i64),
        Value::from(1.5f32),
        Value::from(1.5f64),
        Value::Null,
    ];
    let predicate = Predicate::is_in(values.clone());
    assert_eq!(
        document(&predicate)["values"],
        json!([{ "Int16": 5 }, 5, { "Int64": 5 }, { "Float32": 1.5 }, 1.5, null])
    );
    let back: Predicate = from_json(&to_json(&predicate).unwrap()).unwrap();
    assert_eq!(back, predicate);
    assert!(back.test(&Value::from(5i64)));
    assert!(!back.test(&Value::from(6i64)));
}

#[test]
fn default_if_empty_uses_default_value_field() {
    let f = Function::DefaultIfEmpty(DefaultIfEmpty::new("NOTHING"));
    assert_eq!(
        document(&f),
        json!({ "class": "function.DefaultIfEmpty", "defaultValue": "NOTHING" })
    );
}

#[test]
fn adapted_units_serialise_their_selections() {
    let adapted = Function::Adapted(Box::new(
        AdaptedFunction::new(
            Selection::new(["name"]).unwrap(),
            Function::DefaultIfEmpty(DefaultIfEmpty::new("unknown")),
            Some(Selection::new(["name"]).unwrap()),
        )
        .unwrap(),
    ));
    let doc = document(&adapted);
    assert_eq!(doc["class"], "tuple.AdaptedFunction");
    assert_eq!(doc["selection"], json!(["name"]));
    assert_eq!(doc["projection"], json!(["name"]));

    let back: Function = from_json_value(doc).unwrap();
    let record = Value::Tuple(Tuple::named([("name", ""), ("id", "7")]));
    assert_eq!(
        back.apply(record).unwrap(),
        Value::Tuple(Tuple::named([("name", "unknown"), ("id", "7")]))
    );
}

#[test]
fn composite_documents_round_trip() {
    let composite = BinaryOperator::Composite(
        BinaryOperatorComposite::builder()
            .select([0usize])
            .execute(BinaryOperator::Sum)
            .select([1usize])
            .execute(BinaryOperator::Max)
            .build()
            .unwrap(),
    );
    let doc = document(&composite);
    assert_eq!(doc["class"], "binaryoperator.Composite");
    assert_eq!(doc["operators"][1]["operator"]["class"], "binaryoperator.Max");
    let back: BinaryOperator = from_json_value(doc).unwrap();
    assert_eq!(back, composite);
}

#[test]
fn bad_documents_are_rejected_while_parsing() {
    let empty_selection = json!({
        "class": "tuple.AdaptedPredicate",
        "selection": [],
        "predicate": { "class": "predicate.Exists" }
    });
    assert!(matches!(
        from_json_value::<Predicate>(empty_selection),
        Err(OperatorError::Json(_))
    ));

    let wrong_arity = json!({
        "class": "tuple.AdaptedPredicate",
        "selection": [0],
        "predicate": { "class": "predicate.IsXLessThanY" }
    });
    assert!(from_json_value::<Predicate>(wrong_arity).is_err());

    assert!(from_json::<Function>("{not json").is_err());
}

#[test]
fn fully_qualified_class_names_are_accepted() {
    let static_condition: Predicate = from_json_value(json!({
        "class": "uk.gov.gchq.koryphe.impl.predicate.If",
        "condition": true,
        "then": { "class": "uk.gov.gchq.koryphe.impl.predicate.IsA", "type": "java.lang.String" },
        "otherwise": { "class": "uk.gov.gchq.koryphe.impl.predicate.IsA", "type": "java.lang.Integer" }
    }))
    .unwrap();
    assert_eq!(
        static_condition,
        Predicate::If(If::new(
            true,
            Predicate::is_a(ValueType::Utf8),
            Predicate::is_a(ValueType::Int32),
        ))
    );
    assert!(static_condition.test(&Value::from("x")));
    assert!(!static_condition.test(&Value::from(1i32)));

    let controlled: Predicate = from_json_value(json!({
        "class": "uk.gov.gchq.koryphe.impl.predicate.If",
        "predicate": { "class": "uk.gov.gchq.koryphe.impl.predicate.IsA", "type": "java.lang.Integer" },
        "then": { "class": "uk.gov.gchq.koryphe.impl.predicate.IsLessThan", "value": 3, "orEqualTo": false },
        "otherwise": { "class": "uk.gov.gchq.koryphe.impl.predicate.IsA", "type": "java.lang.String" }
    }))
    .unwrap();
    assert!(controlled.test(&Value::from(2i32)));
    assert!(!controlled.test(&Value::from(3i32)));
    assert!(controlled.test(&Value::from("three")));

    let sum: BinaryOperator =
        from_json(r#"{"class": "uk.gov.gchq.koryphe.impl.binaryoperator.Sum"}"#).unwrap();
    assert_eq!(sum, BinaryOperator::Sum);
    // aliases are read-only: documents are always written with the short names
    assert_eq!(document(&sum), json!({ "class": "binaryoperator.Sum" }));

    let multiply: Function = from_json(
        r#"{"class": "uk.gov.gchq.koryphe.impl.function.MultiplyLongBy", "by": 4}"#,
    )
    .unwrap();
    assert_eq!(multiply.apply(Value::from(5i64)).unwrap(), Value::from(20i64));
}

#[test]
fn tuple_adapted_composite_document_with_jvm_names() {
    let composite: BinaryOperator = from_json_value(json!({
        "class": "uk.gov.gchq.koryphe.tuple.binaryoperator.TupleAdaptedBinaryOperatorComposite",
        "operators": [
            {
                "class": "uk.gov.gchq.koryphe.tuple.binaryoperator.TupleAdaptedBinaryOperator",
                "selection": ["A"],
                "binaryOperator": { "class": "uk.gov.gchq.koryphe.impl.binaryoperator.Product" }
            },
            {
                "class": "uk.gov.gchq.koryphe.tuple.binaryoperator.TupleAdaptedBinaryOperator",
                "selection": ["B"],
                "binaryOperator": { "class": "uk.gov.gchq.koryphe.impl.binaryoperator.Sum" }
            }
        ]
    }))
    .unwrap();
    let record = |a: i32, b: i32| Value::Tuple(Tuple::named([("A", a), ("B", b)]));
    assert_eq!(
        composite.fold([record(2, 1), record(3, 2), record(4, 3)]).unwrap(),
        record(24, 6)
    );
}
