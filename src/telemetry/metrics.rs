//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Alerts that qualified in a cycle
    AlertsEmitted,
    /// Alerts that created a new store row
    SignalsPersisted,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Games with reference data in the last cycle
    GamesEvaluated,
}

/// Install the Prometheus exporter listening on `port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics exporter: {}", e))?;
    tracing::info!(%addr, "Prometheus metrics listening");
    Ok(())
}

/// Count a finished cycle and record how long it took
pub fn record_cycle(outcome: &'static str, duration: Duration) {
    metrics::counter!("hrev_cycles_total", "outcome" => outcome).increment(1);
    metrics::histogram!("hrev_cycle_duration_ms").record(duration.as_secs_f64() * 1000.0);
}

/// Increment a counter
pub fn increment(metric: CounterMetric, value: u64) {
    let metric_name = match metric {
        CounterMetric::AlertsEmitted => "hrev_alerts_emitted_total",
        CounterMetric::SignalsPersisted => "hrev_signals_persisted_total",
    };
    metrics::counter!(metric_name).increment(value);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::GamesEvaluated => "hrev_games_evaluated",
    };
    metrics::gauge!(metric_name).set(value);
}
