use std::collections::HashMap;
use std::sync::atomic::Ordering;

use anyhow::{Context, Result};
use log::{debug, trace};
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tokio::sync::mpsc;

use crate::catalog::{MetricCatalog, SAMPLE_LABELS};
use crate::metrics::METRICS;
use crate::sink::MetricSample;

/// Applies translated samples to a Prometheus registry.
///
/// One gauge family per catalog definition, labeled by scope and
/// endpoint name. The exporter owns the registry; the rest of the
/// pipeline only sees the sample channel.
///
pub struct MetricExporter {
    registry: Registry,
    gauges: HashMap<&'static str, GaugeVec>,
}

impl MetricExporter {
    /// Builds one gauge family per catalog definition and registers
    /// them all.
    pub fn new(catalog: &MetricCatalog) -> Result<Self> {
        let registry = Registry::new();
        let mut gauges = HashMap::new();

        for def in catalog.defs() {
            let gauge = GaugeVec::new(Opts::new(def.name, def.help), &SAMPLE_LABELS)
                .with_context(|| format!("invalid metric definition {}", def.name))?;
            registry
                .register(Box::new(gauge.clone()))
                .with_context(|| format!("failed to register {}", def.name))?;
            gauges.insert(def.name, gauge);
        }

        Ok(Self { registry, gauges })
    }

    /// Applies one sample to its gauge family.
    ///
    /// Samples for metrics outside the catalog cannot occur (the
    /// translator only emits resolved definitions); an unknown name
    /// is ignored rather than panicking.
    pub fn apply(&self, sample: &MetricSample) {
        if let Some(gauge) = self.gauges.get(sample.metric.name) {
            gauge
                .with_label_values(&[sample.vpn_name.as_str(), sample.endpoint_name.as_str()])
                .set(sample.value);
        }
    }

    /// Renders the registry in the Prometheus text format.
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buf)
            .context("failed to encode registry")?;
        Ok(String::from_utf8(buf)?)
    }

    /// Drains the sample channel until every translator is gone.
    ///
    /// Channel order is emission order, so gauge updates land in the
    /// dedup-filtered page-traversal order of each pass.
    pub async fn run(&self, mut samples: mpsc::Receiver<MetricSample>) {
        while let Some(sample) = samples.recv().await {
            trace!(
                "sample {} [{} / {}] = {} @{}",
                sample.metric.name,
                sample.vpn_name,
                sample.endpoint_name,
                sample.value,
                sample.timestamp_ms,
            );
            self.apply(&sample);
            METRICS.samples_exported.fetch_add(1, Ordering::Relaxed);
        }

        debug!("sample channel closed; exporter stopping");
    }
}
