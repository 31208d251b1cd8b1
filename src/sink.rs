use async_trait::async_trait;

use crate::catalog::MetricDef;
use crate::schema::EndpointStats;

/// RecordSink is the seam between the collection walk and whatever
/// consumes deduplicated records.
///
/// CONTRACT:
/// - `emit` is called once per unique record, in dedup-filtered
///   page-traversal order, and the sink must preserve that order.
/// - An error means the sink can no longer accept records; the
///   caller aborts the current pass.
///
/// THREAD SAFETY:
/// - Must be Send + Sync; one sink instance is shared across passes.
///
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn emit(&self, record: &EndpointStats) -> anyhow::Result<()>;
}

/// One translated metric emission.
///
/// Samples flow through a single channel, so their order is the
/// order `emit` produced them in.
#[derive(Debug, Clone)]
pub struct MetricSample {
    /// Resolved catalog definition
    pub metric: &'static MetricDef,

    /// Counter value at decode time
    pub value: f64,

    /// Scope label
    pub vpn_name: String,

    /// Endpoint label
    pub endpoint_name: String,

    /// Translation timestamp (Unix millis)
    pub timestamp_ms: i64,
}
