use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use once_cell::sync::Lazy;

/// Global runtime metrics for the collector.
///
/// Purpose:
/// - Track pass outcomes
/// - Track page and record throughput
/// - Track error classes
///
/// Design:
/// - Lock-free (Atomics)
/// - Cheap to update
/// - Safe in async + multithreaded contexts
#[derive(Default)]
pub struct RuntimeMetrics {
    // Passes
    pub passes_started: AtomicUsize,
    pub passes_completed: AtomicUsize,
    pub passes_failed: AtomicUsize,

    // Throughput
    pub pages_fetched: AtomicUsize,
    pub records_emitted: AtomicUsize,
    pub boundary_suppressed: AtomicUsize,
    pub samples_exported: AtomicUsize,

    // Error classes
    pub transport_errors: AtomicUsize,
    pub decode_errors: AtomicUsize,
    pub protocol_errors: AtomicUsize,
}

/// Global metrics registry (singleton)
pub static METRICS: Lazy<Arc<RuntimeMetrics>> =
    Lazy::new(|| Arc::new(RuntimeMetrics::default()));
