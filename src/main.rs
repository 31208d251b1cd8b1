use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio::time::sleep;

use spool_stats_collector::catalog::MetricCatalog;
use spool_stats_collector::collector::walker::CollectionWalker;
use spool_stats_collector::config::Config;
use spool_stats_collector::exporter::MetricExporter;
use spool_stats_collector::metrics::METRICS;
use spool_stats_collector::sink::MetricSample;
use spool_stats_collector::translator::MetricTranslator;
use spool_stats_collector::transport::http::HttpTransport;

// ------------------------------------------------------------
// Application entry point
// ------------------------------------------------------------
//
// This is the main runtime for the broker spool-stats collector.
//
// Responsibilities:
// - Load configuration
// - Wire the sample pipeline (translator -> channel -> registry)
// - Run collection passes for every target on a fixed interval
// - Stop cleanly on Ctrl-C
//
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config: Config = load_config("config.json")?;
    let debug_dump = config
        .debug
        .as_ref()
        .map_or(false, |d| d.log.unwrap_or(false));

    // --------------------------------------------------------
    // Sample pipeline
    //
    // The translator resolves record counters against the catalog
    // and pushes samples into a bounded channel; the exporter task
    // drains that channel into the Prometheus registry. A single
    // channel keeps samples in emission order.
    // --------------------------------------------------------
    let catalog = MetricCatalog::broker_defaults();
    let exporter = Arc::new(MetricExporter::new(&catalog)?);
    let (sample_tx, sample_rx) = mpsc::channel::<MetricSample>(10_000);

    tokio::spawn({
        let exporter = exporter.clone();
        async move { exporter.run(sample_rx).await }
    });

    let translator = Arc::new(MetricTranslator::new(catalog, sample_tx));
    let transport = Arc::new(HttpTransport::new(&config.broker)?);

    // Flipped on Ctrl-C; walkers notice it before issuing the next
    // request, so no request is ever abandoned mid-flight.
    let cancel = Arc::new(AtomicBool::new(false));

    // --------------------------------------------------------
    // Runtime-metrics reporter (periodic, low-noise)
    // --------------------------------------------------------
    tokio::spawn(async {
        loop {
            sleep(Duration::from_secs(10)).await;

            info!(
                "[METRICS] passes={}/{}/{} pages={} emitted={} suppressed={} samples={} errs t/d/p={}/{}/{}",
                METRICS.passes_started.load(Ordering::Relaxed),
                METRICS.passes_completed.load(Ordering::Relaxed),
                METRICS.passes_failed.load(Ordering::Relaxed),
                METRICS.pages_fetched.load(Ordering::Relaxed),
                METRICS.records_emitted.load(Ordering::Relaxed),
                METRICS.boundary_suppressed.load(Ordering::Relaxed),
                METRICS.samples_exported.load(Ordering::Relaxed),
                METRICS.transport_errors.load(Ordering::Relaxed),
                METRICS.decode_errors.load(Ordering::Relaxed),
                METRICS.protocol_errors.load(Ordering::Relaxed),
            );
        }
    });

    // --------------------------------------------------------
    // Scrape loop
    //
    // One round per interval tick; every round walks each target
    // sequentially. Passes never overlap within a round.
    // --------------------------------------------------------
    let walker = CollectionWalker::new(transport, translator, cancel.clone());
    let mut ticker = tokio::time::interval(Duration::from_secs(config.scrape.interval_secs));

    info!(
        "collector started: {} target(s), interval {}s",
        config.targets.len(),
        config.scrape.interval_secs
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_round(&config, &walker, &cancel).await;

                if debug_dump {
                    match exporter.render() {
                        Ok(text) => debug!("registry after round:\n{text}"),
                        Err(err) => error!("failed to render registry: {err:#}"),
                    }
                }

                if cancel.load(Ordering::Relaxed) {
                    break;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                cancel.store(true, Ordering::Relaxed);
                break;
            }
        }
    }

    info!("collector stopped");
    Ok(())
}

/// Runs one collection pass per configured target.
///
/// A failed pass is logged and counted; the remaining targets still
/// run. Retrying a failed pass is left to the next interval tick.
async fn run_round(config: &Config, walker: &CollectionWalker, cancel: &Arc<AtomicBool>) {
    for target in &config.targets {
        if cancel.load(Ordering::Relaxed) {
            return;
        }

        METRICS.passes_started.fetch_add(1, Ordering::Relaxed);

        match walker.run(&target.endpoint_filter, &target.vpn_filter).await {
            Ok(summary) => {
                METRICS.passes_completed.fetch_add(1, Ordering::Relaxed);
                info!(
                    "pass done vpn={} endpoint={}: {} page(s), {} emitted, {} suppressed",
                    target.vpn_filter,
                    target.endpoint_filter,
                    summary.pages,
                    summary.emitted,
                    summary.suppressed
                );
            }
            Err(err) => {
                METRICS.passes_failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    "pass failed vpn={} endpoint={}: {err}",
                    target.vpn_filter, target.endpoint_filter
                );
            }
        }
    }
}

// ------------------------------------------------------------
// Configuration loader
// ------------------------------------------------------------
//
// Reads a JSON configuration file from disk and deserializes
// it into the strongly typed `Config` structure.
//
// TODO:
// - Support CLI override (e.g. --config path)
//
fn load_config(path: &str) -> Result<Config> {
    let data = fs::read_to_string(path)?;
    let cfg = serde_json::from_str(&data)?;
    Ok(cfg)
}
