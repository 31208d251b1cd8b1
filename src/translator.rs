use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::catalog::{ENDPOINT_SPOOL, MetricCatalog};
use crate::schema::EndpointStats;
use crate::sink::{MetricSample, RecordSink};
use crate::util;

/// Maps deduplicated records to metric samples.
///
/// For every counter of a record the translator resolves a definition
/// from the injected catalog and forwards one sample into the sample
/// channel. Counters the catalog does not know are skipped.
///
/// DESIGN:
/// - The catalog is an explicit capability, not ambient state.
/// - One bounded channel carries all samples, so downstream sees them
///   in exactly the order records were emitted.
///
pub struct MetricTranslator {
    catalog: MetricCatalog,
    samples: mpsc::Sender<MetricSample>,
}

impl MetricTranslator {
    pub fn new(catalog: MetricCatalog, samples: mpsc::Sender<MetricSample>) -> Self {
        Self { catalog, samples }
    }
}

#[async_trait]
impl RecordSink for MetricTranslator {
    async fn emit(&self, record: &EndpointStats) -> anyhow::Result<()> {
        let timestamp_ms = util::now_ms();

        for (field, value) in record.spool.counters() {
            // Unrecognized fields are ignored, not an error.
            let Some(metric) = self.catalog.lookup(ENDPOINT_SPOOL, field) else {
                continue;
            };

            self.samples
                .send(MetricSample {
                    metric,
                    value,
                    vpn_name: record.vpn_name.clone(),
                    endpoint_name: record.endpoint_name.clone(),
                    timestamp_ms,
                })
                .await
                .map_err(|_| anyhow!("sample channel closed"))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MetricDef;
    use crate::schema::SpoolStats;

    fn record() -> EndpointStats {
        let mut spool = SpoolStats::default();
        spool.total_bytes_spooled = 1024.0;
        spool.total_messages_spooled = 10.0;
        EndpointStats {
            vpn_name: "default".to_string(),
            endpoint_name: "orders".to_string(),
            spool,
        }
    }

    #[tokio::test]
    async fn emits_one_sample_per_cataloged_counter() {
        let (tx, mut rx) = mpsc::channel(64);
        let translator = MetricTranslator::new(MetricCatalog::broker_defaults(), tx);

        translator.emit(&record()).await.unwrap();
        drop(translator);

        let mut samples = Vec::new();
        while let Some(sample) = rx.recv().await {
            samples.push(sample);
        }

        assert_eq!(samples.len(), 16);
        assert_eq!(samples[0].metric.field, "total_bytes_spooled");
        assert_eq!(samples[0].value, 1024.0);
        assert!(samples.iter().all(|s| s.vpn_name == "default"));
        assert!(samples.iter().all(|s| s.endpoint_name == "orders"));
    }

    #[tokio::test]
    async fn uncataloged_counters_are_skipped() {
        static ONE_METRIC: &[MetricDef] = &[MetricDef {
            category: ENDPOINT_SPOOL,
            field: "total_messages_spooled",
            name: "broker_endpoint_total_messages_spooled",
            help: "Total messages spooled for the endpoint",
        }];

        let (tx, mut rx) = mpsc::channel(64);
        let translator = MetricTranslator::new(MetricCatalog::new(ONE_METRIC), tx);

        translator.emit(&record()).await.unwrap();
        drop(translator);

        let mut samples = Vec::new();
        while let Some(sample) = rx.recv().await {
            samples.push(sample);
        }

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].metric.field, "total_messages_spooled");
        assert_eq!(samples[0].value, 10.0);
    }

    #[tokio::test]
    async fn closed_channel_is_an_error() {
        let (tx, rx) = mpsc::channel(64);
        drop(rx);
        let translator = MetricTranslator::new(MetricCatalog::broker_defaults(), tx);

        assert!(translator.emit(&record()).await.is_err());
    }
}
