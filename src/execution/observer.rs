use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Execution events emitted by the engine.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        run_id: u64,
        operation: &'static str,
        unit: &'static str,
        records: usize,
    },
    ThrottleWaited { duration: Duration },
    ChunkStarted { start_record: usize, record_count: usize },
    ChunkFinished { output_records: usize },
    /// Partial fold states are about to be merged in chunk order.
    FoldMerged { partials: usize },
    RunFailed { message: String },
    RunFinished { report: RunReport },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// Forwards execution events to `tracing`.
///
/// Chunk-level events go out at `trace`, run-level events at `debug`, failures at `warn`.
#[derive(Debug, Default)]
pub struct TracingExecutionObserver;

impl ExecutionObserver for TracingExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        match event {
            ExecutionEvent::RunStarted {
                run_id,
                operation,
                unit,
                records,
            } => tracing::debug!(run_id, operation, unit, records, "run started"),
            ExecutionEvent::ThrottleWaited { duration } => {
                tracing::trace!(?duration, "throttled before chunk")
            }
            ExecutionEvent::ChunkStarted {
                start_record,
                record_count,
            } => tracing::trace!(start_record, record_count, "chunk started"),
            ExecutionEvent::ChunkFinished { output_records } => {
                tracing::trace!(output_records, "chunk finished")
            }
            ExecutionEvent::FoldMerged { partials } => {
                tracing::debug!(partials, "merging partial fold states")
            }
            ExecutionEvent::RunFailed { message } => tracing::warn!(%message, "run failed"),
            ExecutionEvent::RunFinished { report } => {
                tracing::debug!(run_id = report.run_id, %report, "run finished")
            }
        }
    }
}

/// Counters owned by a single run. Concurrent runs each have their own.
#[derive(Debug, Default)]
pub(crate) struct RunCounters {
    records_processed: AtomicU64,
    records_rejected: AtomicU64,
    chunks: AtomicU64,
    chunks_failed: AtomicU64,
    partials_merged: AtomicU64,
    throttle_wait_ns: AtomicU64,
    active_chunks: AtomicUsize,
    peak_active_chunks: AtomicUsize,
}

impl RunCounters {
    pub(crate) fn on_throttle_wait(&self, d: Duration) {
        self.throttle_wait_ns
            .fetch_add(saturating_nanos(d), Ordering::Relaxed);
    }

    pub(crate) fn on_chunk_start(&self) {
        let now = self.active_chunks.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active_chunks.fetch_max(now, Ordering::SeqCst);
    }

    /// A chunk's records only count as processed when the chunk succeeded.
    pub(crate) fn on_chunk_end(&self, records: usize, succeeded: bool) {
        self.active_chunks.fetch_sub(1, Ordering::SeqCst);
        self.chunks.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.on_records_processed(records);
        } else {
            self.chunks_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn on_records_processed(&self, n: usize) {
        self.records_processed.fetch_add(n as u64, Ordering::Relaxed);
    }

    /// Records a filter dropped.
    pub(crate) fn on_records_rejected(&self, n: usize) {
        self.records_rejected.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn on_partials_merged(&self, n: usize) {
        self.partials_merged.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn report(&self, header: RunHeader, elapsed: Duration, failed: bool) -> RunReport {
        RunReport {
            run_id: header.run_id,
            operation: header.operation,
            unit: header.unit,
            records: header.records,
            records_processed: self.records_processed.load(Ordering::Relaxed),
            records_rejected: self.records_rejected.load(Ordering::Relaxed),
            chunks: self.chunks.load(Ordering::Relaxed),
            chunks_failed: self.chunks_failed.load(Ordering::Relaxed),
            partials_merged: self.partials_merged.load(Ordering::Relaxed),
            peak_active_chunks: self.peak_active_chunks.load(Ordering::SeqCst),
            throttle_wait: Duration::from_nanos(self.throttle_wait_ns.load(Ordering::Relaxed)),
            elapsed,
            failed,
        }
    }
}

/// What a run was asked to do.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RunHeader {
    pub run_id: u64,
    pub operation: &'static str,
    pub unit: &'static str,
    pub records: usize,
}

/// Outcome of one finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub run_id: u64,
    /// `apply`, `filter`, `fold` or `fold_parallel`.
    pub operation: &'static str,
    pub unit: &'static str,
    /// Input records handed to the run.
    pub records: usize,
    /// Input records of successful chunks (or of a successful sequential fold).
    pub records_processed: u64,
    /// Records a filter did not accept.
    pub records_rejected: u64,
    pub chunks: u64,
    pub chunks_failed: u64,
    /// Partial fold states combined by a parallel fold.
    pub partials_merged: u64,
    pub peak_active_chunks: usize,
    pub throttle_wait: Duration,
    pub elapsed: Duration,
    pub failed: bool,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {}({}) {}: processed {}/{} records, rejected {}, chunks {} ({} failed), merged {} partials, peak {} chunks, throttled {:?}, took {:?}",
            self.run_id,
            self.operation,
            self.unit,
            if self.failed { "failed" } else { "ok" },
            self.records_processed,
            self.records,
            self.records_rejected,
            self.chunks,
            self.chunks_failed,
            self.partials_merged,
            self.peak_active_chunks,
            self.throttle_wait,
            self.elapsed
        )
    }
}

/// Totals across every run of one engine, plus the most recently finished run.
///
/// Counters only grow, so runs executing concurrently on the same engine add up instead of
/// resetting each other.
#[derive(Debug, Default)]
pub struct ExecutionMetrics {
    runs_started: AtomicU64,
    runs_failed: AtomicU64,
    records_processed: AtomicU64,
    records_rejected: AtomicU64,
    partials_merged: AtomicU64,
    last_run: Mutex<Option<RunReport>>,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the id of a new run.
    pub(crate) fn start_run(&self) -> u64 {
        self.runs_started.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn record(&self, report: &RunReport) {
        if report.failed {
            self.runs_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.records_processed
            .fetch_add(report.records_processed, Ordering::Relaxed);
        self.records_rejected
            .fetch_add(report.records_rejected, Ordering::Relaxed);
        self.partials_merged
            .fetch_add(report.partials_merged, Ordering::Relaxed);
        *self.last_run.lock().unwrap_or_else(PoisonError::into_inner) = Some(report.clone());
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        ExecutionMetricsSnapshot {
            runs_started: self.runs_started.load(Ordering::SeqCst),
            runs_failed: self.runs_failed.load(Ordering::Relaxed),
            records_processed: self.records_processed.load(Ordering::Relaxed),
            records_rejected: self.records_rejected.load(Ordering::Relaxed),
            partials_merged: self.partials_merged.load(Ordering::Relaxed),
            last_run: self
                .last_run
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}

fn saturating_nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    pub runs_started: u64,
    pub runs_failed: u64,
    pub records_processed: u64,
    pub records_rejected: u64,
    pub partials_merged: u64,
    pub last_run: Option<RunReport>,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} runs ({} failed), {} records processed, {} rejected, {} partials merged",
            self.runs_started,
            self.runs_failed,
            self.records_processed,
            self.records_rejected,
            self.partials_merged
        )?;
        if let Some(last) = &self.last_run {
            write!(f, "; last {last}")?;
        }
        Ok(())
    }
}
