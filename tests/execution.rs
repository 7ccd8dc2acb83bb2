use std::sync::{Arc, Mutex};

use rust_data_operators::config::from_json;
use rust_data_operators::execution::{
    ExecutionEngine, ExecutionEvent, ExecutionObserver, ExecutionOptions, TracingExecutionObserver,
};
use rust_data_operators::processing::{BinaryOperator, BinaryOperatorComposite, Predicate};
use rust_data_operators::tuple::Tuple;
use rust_data_operators::types::Value;
use rust_data_operators::OperatorError;

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl ExecutionObserver for RecordingObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        let name = match event {
            ExecutionEvent::RunStarted { operation, .. } => format!("start:{operation}"),
            ExecutionEvent::FoldMerged { partials } => format!("merge:{partials}"),
            ExecutionEvent::RunFailed { .. } => "failed".to_string(),
            ExecutionEvent::RunFinished { .. } => "finish".to_string(),
            _ => return,
        };
        self.events.lock().unwrap().push(name);
    }
}

fn engine_from(json: &str) -> ExecutionEngine {
    ExecutionEngine::new(from_json::<ExecutionOptions>(json).unwrap()).unwrap()
}

fn record(a: i32, b: i64) -> Value {
    Value::Tuple(Tuple::named([("A", Value::from(a)), ("B", Value::from(b))]))
}

#[test]
fn parallel_composite_fold_matches_sequential() {
    let engine = engine_from(r#"{"numThreads": 4, "chunkSize": 3, "maxInFlightChunks": 2}"#)
        .with_observer(Arc::new(TracingExecutionObserver));
    let op = BinaryOperator::Composite(
        BinaryOperatorComposite::builder()
            .select(["A"])
            .execute(BinaryOperator::Max)
            .select(["B"])
            .execute(BinaryOperator::Sum)
            .build()
            .unwrap(),
    );
    let records: Vec<Value> = (0..50).map(|i| record(i % 11, i64::from(i))).collect();

    let sequential = engine.fold(&records, &op).unwrap();
    let parallel = engine.fold_parallel(&records, &op).unwrap();
    assert_eq!(parallel, sequential);
    assert_eq!(
        parallel.as_tuple().unwrap().get(&"B".into()),
        Some(&Value::from(1_225i64))
    );
}

#[test]
fn parallel_fold_of_a_nested_composite_counts_each_record_once() {
    let engine = engine_from(r#"{"numThreads": 4, "chunkSize": 4, "maxInFlightChunks": 4}"#);
    let inner = BinaryOperatorComposite::builder()
        .select(["A"])
        .execute(BinaryOperator::Sum)
        .select(["B"])
        .execute(BinaryOperator::Sum)
        .project(["total"])
        .build()
        .unwrap();
    let nested = BinaryOperator::Composite(BinaryOperatorComposite::new(vec![
        BinaryOperator::Composite(inner),
    ]));
    // 30 records split into chunks starting mid-stream at 4, 8, ..., 28
    let records: Vec<Value> = (1..=30).map(|i| record(i, i64::from(i))).collect();

    let parallel = engine.fold_parallel(&records, &nested).unwrap();
    assert_eq!(parallel, engine.fold(&records, &nested).unwrap());
    let parallel = parallel.as_tuple().unwrap();
    assert_eq!(parallel.get(&"A".into()), Some(&Value::from(465i32)));
    assert_eq!(parallel.get(&"total".into()), Some(&Value::from(465i64)));
    assert_eq!(parallel.get(&"B".into()), Some(&Value::from(1i64)));
}

#[test]
fn observer_sees_run_lifecycle_and_failures() {
    let observer = Arc::new(RecordingObserver::default());
    let engine = engine_from(r#"{"numThreads": 2, "chunkSize": 4, "maxInFlightChunks": 1}"#)
        .with_observer(observer.clone());

    let records = vec![Value::from(1i32), Value::from(2i32), Value::from(3i64)];
    let err = engine.fold_parallel(&records, &BinaryOperator::Sum).unwrap_err();
    assert!(matches!(err, OperatorError::TypeMismatch { .. }));

    let kept = engine
        .filter_parallel(&records, &Predicate::is_a(rust_data_operators::types::ValueType::Int32))
        .unwrap();
    assert_eq!(kept.len(), 2);

    let events = observer.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "start:fold_parallel",
            "failed",
            "finish",
            "start:filter",
            "finish"
        ]
    );
}

#[test]
fn empty_input_folds_to_null() {
    let engine = engine_from(r#"{"chunkSize": 8}"#);
    assert_eq!(engine.fold_parallel(&[], &BinaryOperator::Sum).unwrap(), Value::Null);
    assert!(engine.apply_parallel(&[], &rust_data_operators::processing::Function::Identity)
        .unwrap()
        .is_empty());
}
