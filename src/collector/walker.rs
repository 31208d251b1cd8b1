use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::collector::{decoder, dedup};
use crate::errors::CollectError;
use crate::metrics::METRICS;
use crate::schema::ResultStatus;
use crate::sink::RecordSink;
use crate::transport::adapter::Transport;

/// Page size cap requested from the broker.
const PAGE_SIZE: usize = 100;

/// Builds the first request of a pass.
///
/// Only the first: every later request is the verbatim continuation
/// payload returned by the broker, never a re-templated command.
pub fn initial_request(endpoint_filter: &str, vpn_filter: &str) -> String {
    format!(
        "<rpc><show><topic-endpoint><name>{endpoint_filter}</name>\
         <vpn-name>{vpn_filter}</vpn-name><stats/><count/>\
         <num-elements>{PAGE_SIZE}</num-elements></topic-endpoint></show></rpc>"
    )
}

/// Outcome of one completed collection pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// Pages fetched and decoded
    pub pages: usize,

    /// Records forwarded to the sink
    pub emitted: usize,

    /// Boundary duplicates suppressed
    pub suppressed: usize,
}

/// Drives one paginated collection pass per call.
///
/// RESPONSIBILITIES:
/// - Request/decode/filter/emit loop
/// - Termination (empty continuation) and error propagation
/// - Cancellation checks between pages
///
/// NOT RESPONSIBLE FOR:
/// - Wire specifics (transport / decoder)
/// - Metric naming (translator / catalog)
/// - Retry policy (caller's schedule)
///
pub struct CollectionWalker {
    transport: Arc<dyn Transport>,
    sink: Arc<dyn RecordSink>,
    cancel: Arc<AtomicBool>,
}

impl CollectionWalker {
    pub fn new(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn RecordSink>,
        cancel: Arc<AtomicBool>,
    ) -> Self {
        Self {
            transport,
            sink,
            cancel,
        }
    }

    /// Runs one collection pass for the given filters.
    ///
    /// LOOP INVARIANT: while the pending request body is non-empty,
    /// exactly one page is fetched, decoded, status-checked, and its
    /// records are dedup-filtered and emitted in broker order. The
    /// continuation of each page becomes the entire next request.
    ///
    /// GUARANTEES:
    /// - One request in flight at a time; each page body is dropped
    ///   before the next request is issued.
    /// - Any failure aborts the pass immediately. Records emitted for
    ///   earlier pages stay emitted; no record of the failing page is.
    /// - The cancel flag is honored before a request goes out, never
    ///   mid-page.
    ///
    pub async fn run(
        &self,
        endpoint_filter: &str,
        vpn_filter: &str,
    ) -> Result<PassSummary, CollectError> {
        let mut next_request = initial_request(endpoint_filter, vpn_filter);
        let mut last_emitted_key = String::new();
        let mut summary = PassSummary::default();

        while !next_request.is_empty() {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(CollectError::Cancelled);
            }

            // The page body lives for exactly one iteration: fetched,
            // decoded, drained, dropped.
            let body = self.transport.send(&next_request).await.map_err(|err| {
                METRICS.transport_errors.fetch_add(1, Ordering::Relaxed);
                CollectError::Transport(err)
            })?;
            summary.pages += 1;
            METRICS.pages_fetched.fetch_add(1, Ordering::Relaxed);

            let page = decoder::decode(&body).map_err(|err| {
                METRICS.decode_errors.fetch_add(1, Ordering::Relaxed);
                CollectError::Decode(err)
            })?;
            drop(body);

            if let ResultStatus::Failed(code) = page.status {
                METRICS.protocol_errors.fetch_add(1, Ordering::Relaxed);
                return Err(CollectError::Protocol { code });
            }

            debug!(
                "page {}: {} records, cursor {}",
                summary.pages,
                page.records.len(),
                if page.continuation.is_empty() {
                    "end"
                } else {
                    "present"
                }
            );

            next_request = page.continuation;

            for record in page.records {
                let key = record.key();

                if !dedup::should_emit(&last_emitted_key, &key) {
                    summary.suppressed += 1;
                    METRICS.boundary_suppressed.fetch_add(1, Ordering::Relaxed);
                    debug!("suppressed boundary duplicate {key}");
                    continue;
                }

                last_emitted_key = key;
                self.sink
                    .emit(&record)
                    .await
                    .map_err(CollectError::Sink)?;
                summary.emitted += 1;
                METRICS.records_emitted.fetch_add(1, Ordering::Relaxed);
            }
        }

        Ok(summary)
    }
}
