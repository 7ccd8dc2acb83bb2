//! Execution engine for running configured units over many records.
//!
//! The units in [`crate::processing`] are synchronous and record-at-a-time. This module sits
//! above them and provides:
//!
//! - Parallel (chunked) `apply`, `filter` and `fold` over a slice of records
//! - Resource limits / throttling (bounded in-flight chunks)
//! - Per-run reports, engine-wide totals and observer hooks for monitoring
//!
//! A parallel fold gives every chunk its own state, folded from `Null`, and merges the
//! partial states in chunk order with [`BinaryOperator::merge`]. Kind locks therefore hold
//! across chunk boundaries: mixing numeric kinds fails the same way it does sequentially.

mod observer;
mod semaphore;

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{OperatorError, OperatorResult};
use crate::processing::{BinaryOperator, Function, Predicate};
use crate::types::Value;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, RunReport,
    TracingExecutionObserver,
};

use observer::{RunCounters, RunHeader};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of records per chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks, on top of `num_threads`.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_parallelism();
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n,
        }
    }
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// A configurable, rayon-backed engine for applying units to record slices.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails with a configuration error if `chunk_size`, `max_in_flight_chunks` or
    /// `num_threads` is zero.
    pub fn new(opts: ExecutionOptions) -> OperatorResult<Self> {
        if opts.chunk_size == 0 {
            return Err(OperatorError::configuration("chunkSize must be > 0"));
        }
        if opts.max_in_flight_chunks == 0 {
            return Err(OperatorError::configuration(
                "maxInFlightChunks must be > 0",
            ));
        }
        if opts.num_threads == Some(0) {
            return Err(OperatorError::configuration(
                "numThreads must be > 0 when set",
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.num_threads.unwrap_or_else(available_parallelism))
            .build()
            .map_err(|e| {
                OperatorError::configuration(format!("failed to build thread pool: {e}"))
            })?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events.
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.opts
    }

    /// Totals across every run of this engine and the report of the latest finished run.
    ///
    /// Runs may execute concurrently on one engine; each keeps its own counters and
    /// publishes its [`RunReport`] when it finishes.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Apply `function` to every record, keeping record order.
    pub fn apply_parallel(
        &self,
        records: &[Value],
        function: &Function,
    ) -> OperatorResult<Vec<Value>> {
        self.run("apply", function.name(), records, |chunk, _| {
            chunk.iter().map(|r| function.apply(r.clone())).collect()
        })
        .map(|chunks| chunks.into_iter().flatten().collect())
    }

    /// Keep the records `predicate` accepts, in their original order.
    pub fn filter_parallel(
        &self,
        records: &[Value],
        predicate: &Predicate,
    ) -> OperatorResult<Vec<Value>> {
        self.run("filter", predicate.name(), records, |chunk, counters| {
            let kept: Vec<Value> = chunk
                .iter()
                .filter(|r| predicate.test(r))
                .cloned()
                .collect();
            counters.on_records_rejected(chunk.len() - kept.len());
            Ok(kept)
        })
        .map(|chunks| chunks.into_iter().flatten().collect())
    }

    /// Fold every record into one state, sequentially, starting from `Null`.
    pub fn fold(&self, records: &[Value], operator: &BinaryOperator) -> OperatorResult<Value> {
        let (header, counters, start) = self.begin("fold", operator.name(), records.len());
        let result = operator.fold(records.iter().cloned());
        if result.is_ok() {
            counters.on_records_processed(records.len());
        }
        self.finish(header, &counters, start, result)
    }

    /// Fold chunks of records in parallel and merge the partial states in chunk order.
    pub fn fold_parallel(
        &self,
        records: &[Value],
        operator: &BinaryOperator,
    ) -> OperatorResult<Value> {
        let (header, counters, start) =
            self.begin("fold_parallel", operator.name(), records.len());
        let partials = self.pool.install(|| {
            self.chunked(records, &counters, |chunk, _| {
                operator.fold(chunk.iter().cloned()).map(|state| vec![state])
            })
        });
        let result = partials.and_then(|partials| {
            let count = partials.len();
            self.emit(ExecutionEvent::FoldMerged { partials: count });
            let merged = partials
                .into_iter()
                .flatten()
                .try_fold(Value::Null, |left, right| operator.merge(left, right))?;
            counters.on_partials_merged(count);
            Ok(merged)
        });
        self.finish(header, &counters, start, result)
    }

    fn run<F>(
        &self,
        operation: &'static str,
        unit: &'static str,
        records: &[Value],
        per_chunk: F,
    ) -> OperatorResult<Vec<Vec<Value>>>
    where
        F: Fn(&[Value], &RunCounters) -> OperatorResult<Vec<Value>> + Send + Sync,
    {
        let (header, counters, start) = self.begin(operation, unit, records.len());
        let result = self
            .pool
            .install(|| self.chunked(records, &counters, per_chunk));
        self.finish(header, &counters, start, result)
    }

    fn chunked<F>(
        &self,
        records: &[Value],
        counters: &RunCounters,
        per_chunk: F,
    ) -> OperatorResult<Vec<Vec<Value>>>
    where
        F: Fn(&[Value], &RunCounters) -> OperatorResult<Vec<Value>> + Send + Sync,
    {
        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        chunk_ranges(records.len(), self.opts.chunk_size)
            .into_par_iter()
            .map(|range| {
                let (_permit, waited) = sem.guard();
                if waited > Duration::ZERO {
                    counters.on_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                counters.on_chunk_start();
                self.emit(ExecutionEvent::ChunkStarted {
                    start_record: range.start,
                    record_count: range.len(),
                });

                let chunk = &records[range];
                let out = per_chunk(chunk, counters);

                self.emit(ExecutionEvent::ChunkFinished {
                    output_records: out.as_ref().map_or(0, Vec::len),
                });
                counters.on_chunk_end(chunk.len(), out.is_ok());
                out
            })
            .collect()
    }

    fn begin(
        &self,
        operation: &'static str,
        unit: &'static str,
        records: usize,
    ) -> (RunHeader, RunCounters, Instant) {
        let header = RunHeader {
            run_id: self.metrics.start_run(),
            operation,
            unit,
            records,
        };
        self.emit(ExecutionEvent::RunStarted {
            run_id: header.run_id,
            operation,
            unit,
            records,
        });
        (header, RunCounters::default(), Instant::now())
    }

    fn finish<T>(
        &self,
        header: RunHeader,
        counters: &RunCounters,
        start: Instant,
        result: OperatorResult<T>,
    ) -> OperatorResult<T> {
        if let Err(e) = &result {
            tracing::warn!(run_id = header.run_id, error = %e, "execution run failed");
            self.emit(ExecutionEvent::RunFailed {
                message: e.to_string(),
            });
        }
        let report = counters.report(header, start.elapsed(), result.is_err());
        self.metrics.record(&report);
        self.emit(ExecutionEvent::RunFinished { report });
        result
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn chunk_ranges(record_count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    (0..record_count)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(record_count))
        .collect()
}
