//! Application metrics
//!
//! Samples are emitted as structured `tracing` events on the `metrics` target
//! (so any log shipper can forward them) and aggregated in memory.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::http::Method;

use crate::core::config::MetricsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Count,
    Milliseconds,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Count => "Count",
            MetricUnit::Milliseconds => "Milliseconds",
        }
    }
}

/// Aggregate of every sample recorded under one metric name
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub unit: MetricUnit,
    pub count: u64,
    pub sum: f64,
    pub last: f64,
}

pub struct Metrics {
    enabled: bool,
    namespace: String,
    app_name: String,
    registry: Mutex<HashMap<String, MetricSummary>>,
}

impl Metrics {
    pub fn new(config: &MetricsConfig) -> Self {
        Self {
            enabled: config.enabled,
            namespace: config.namespace.clone(),
            app_name: config.app_name.clone(),
            registry: Mutex::new(HashMap::new()),
        }
    }

    /// Record a single sample
    pub fn send(&self, name: &str, value: f64, unit: MetricUnit) {
        if !self.enabled {
            return;
        }

        {
            let mut registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            let entry = registry.entry(name.to_string()).or_insert(MetricSummary {
                unit,
                count: 0,
                sum: 0.0,
                last: 0.0,
            });
            entry.count += 1;
            entry.sum += value;
            entry.last = value;
        }

        tracing::info!(
            target: "metrics",
            namespace = %self.namespace,
            app = %self.app_name,
            metric = %name,
            value,
            unit = unit.as_str(),
            "Metric sent"
        );
    }

    /// Call count and latency for an HTTP route
    pub fn record_api_call(&self, method: &Method, route: &str, elapsed: Duration) {
        self.send(
            &format!("API.{}.{}.CallCount", method, route),
            1.0,
            MetricUnit::Count,
        );
        self.send(
            &format!("API.{}.{}.Duration", method, route),
            as_millis(elapsed),
            MetricUnit::Milliseconds,
        );
    }

    pub fn track_db(&self, operation: &str, table: &str, start: Instant) {
        self.send(
            &format!("Database.{}.{}.Duration", operation, table),
            as_millis(start.elapsed()),
            MetricUnit::Milliseconds,
        );
    }

    pub fn track_storage(&self, operation: &str, start: Instant) {
        self.send(
            &format!("S3.{}.Duration", operation),
            as_millis(start.elapsed()),
            MetricUnit::Milliseconds,
        );
    }

    #[allow(dead_code)]
    pub fn summary(&self, name: &str) -> Option<MetricSummary> {
        let registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        registry.get(name).copied()
    }
}

fn as_millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool) -> MetricsConfig {
        MetricsConfig {
            enabled,
            namespace: "Test/Metrics".to_string(),
            app_name: "Test".to_string(),
        }
    }

    #[test]
    fn test_send_aggregates_samples() {
        let metrics = Metrics::new(&config(true));
        metrics.send("Custom.Value", 2.0, MetricUnit::Count);
        metrics.send("Custom.Value", 5.0, MetricUnit::Count);

        let summary = metrics.summary("Custom.Value").unwrap();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.sum, 7.0);
        assert_eq!(summary.last, 5.0);
        assert_eq!(summary.unit, MetricUnit::Count);
    }

    #[test]
    fn test_record_api_call_names() {
        let metrics = Metrics::new(&config(true));
        metrics.record_api_call(&Method::GET, "/healthz", Duration::from_millis(12));

        let calls = metrics.summary("API.GET./healthz.CallCount").unwrap();
        assert_eq!(calls.count, 1);
        let duration = metrics.summary("API.GET./healthz.Duration").unwrap();
        assert_eq!(duration.unit, MetricUnit::Milliseconds);
        assert!(duration.last >= 12.0);
    }

    #[test]
    fn test_db_and_storage_names() {
        let metrics = Metrics::new(&config(true));
        metrics.track_db("insert", "files", Instant::now());
        metrics.track_storage("PutObject", Instant::now());

        assert!(metrics.summary("Database.insert.files.Duration").is_some());
        assert!(metrics.summary("S3.PutObject.Duration").is_some());
    }

    #[test]
    fn test_disabled_metrics_record_nothing() {
        let metrics = Metrics::new(&config(false));
        metrics.send("Custom.Value", 1.0, MetricUnit::Count);
        assert!(metrics.summary("Custom.Value").is_none());
    }
}
