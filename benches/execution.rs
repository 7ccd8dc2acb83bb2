use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rust_data_operators::execution::{ExecutionEngine, ExecutionOptions};
use rust_data_operators::processing::{BinaryOperator, Function, MultiplyLongBy, Predicate};
use rust_data_operators::types::Value;

pub fn criterion_benchmark(c: &mut Criterion) {
    let records: Vec<Value> = (0..200_000i64).map(Value::from).collect();
    let engine = ExecutionEngine::new(ExecutionOptions::default()).expect("default options");

    let double = Function::MultiplyLongBy(MultiplyLongBy::new(2));
    c.bench_function("apply_parallel 200k", |b| {
        b.iter(|| engine.apply_parallel(black_box(&records), &double))
    });

    let predicate = Predicate::is_more_than(100_000i64);
    c.bench_function("filter_parallel 200k", |b| {
        b.iter(|| engine.filter_parallel(black_box(&records), &predicate))
    });

    c.bench_function("fold 200k", |b| {
        b.iter(|| engine.fold(black_box(&records), &BinaryOperator::Sum))
    });
    c.bench_function("fold_parallel 200k", |b| {
        b.iter(|| engine.fold_parallel(black_box(&records), &BinaryOperator::Sum))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
