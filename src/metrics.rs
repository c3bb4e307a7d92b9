//! Performance metrics and statistics tracking for the screening service.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the prediction service
pub struct ServiceMetrics {
    /// Total predictions served
    pub predictions_served: AtomicU64,
    /// Total requests rejected with a client error
    pub requests_rejected: AtomicU64,
    /// Predictions by confidence tier
    predictions_by_tier: RwLock<HashMap<String, u64>>,
    /// End-to-end handler times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Model inference times (in microseconds)
    model_times: RwLock<HashMap<String, Vec<u64>>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl ServiceMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            requests_rejected: AtomicU64::new(0),
            predictions_by_tier: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            model_times: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Record a served prediction
    pub fn record_prediction(&self, processing_time: Duration, tier: &str) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only recent samples for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        if let Ok(mut by_tier) = self.predictions_by_tier.write() {
            *by_tier.entry(tier.to_string()).or_insert(0) += 1;
        }
    }

    /// Record a rejected request (validation or unknown-model errors)
    pub fn record_rejection(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record model inference time
    pub fn record_model_time(&self, model_name: &str, duration: Duration) {
        if let Ok(mut times) = self.model_times.write() {
            let model_times = times.entry(model_name.to_string()).or_insert_with(Vec::new);
            model_times.push(duration.as_micros() as u64);
            if model_times.len() > 1000 {
                model_times.drain(0..500);
            }
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = self.processing_times.read().unwrap();
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get per-model inference stats
    pub fn get_model_stats(&self) -> HashMap<String, ModelStats> {
        let times = self.model_times.read().unwrap();
        let mut stats = HashMap::new();

        for (model, model_times) in times.iter() {
            if model_times.is_empty() {
                continue;
            }

            let mut sorted: Vec<u64> = model_times.clone();
            sorted.sort();

            let sum: u64 = sorted.iter().sum();
            let count = sorted.len();

            stats.insert(
                model.clone(),
                ModelStats {
                    calls: count as u64,
                    mean_us: sum / count as u64,
                    p50_us: sorted[count / 2],
                    p99_us: sorted[(count as f64 * 0.99) as usize],
                },
            );
        }

        stats
    }

    /// Get current throughput (predictions per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get predictions by confidence tier
    pub fn get_predictions_by_tier(&self) -> HashMap<String, u64> {
        self.predictions_by_tier.read().unwrap().clone()
    }

    /// Serializable snapshot for the metrics endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            predictions_served: self.predictions_served.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            throughput_per_sec: self.get_throughput(),
            predictions_by_tier: self.get_predictions_by_tier(),
            processing: self.get_processing_stats(),
            models: self.get_model_stats(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let served = self.predictions_served.load(Ordering::Relaxed);
        let rejected = self.requests_rejected.load(Ordering::Relaxed);
        let processing = self.get_processing_stats();
        let by_tier = self.get_predictions_by_tier();

        info!(
            predictions_served = served,
            requests_rejected = rejected,
            throughput = format!("{:.2}/s", self.get_throughput()),
            "Service metrics summary"
        );
        info!(
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            "Handler latency (μs)"
        );
        for (tier, count) in &by_tier {
            let pct = if served > 0 {
                (*count as f64 / served as f64) * 100.0
            } else {
                0.0
            };
            info!(tier = %tier, count = count, pct = format!("{:.1}%", pct), "Predictions by tier");
        }
        for (model, stats) in &self.get_model_stats() {
            info!(
                model = %model,
                calls = stats.calls,
                mean_us = stats.mean_us,
                p99_us = stats.p99_us,
                "Model inference times (μs)"
            );
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Model-specific statistics
#[derive(Debug, Clone, Serialize)]
pub struct ModelStats {
    pub calls: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
}

/// Point-in-time view of all service metrics
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub predictions_served: u64,
    pub requests_rejected: u64,
    pub throughput_per_sec: f64,
    pub predictions_by_tier: HashMap<String, u64>,
    pub processing: ProcessingStats,
    pub models: HashMap<String, ModelStats>,
    pub uptime_secs: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: std::sync::Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), "high");
        metrics.record_prediction(Duration::from_micros(200), "uncertain");
        metrics.record_rejection();

        assert_eq!(metrics.predictions_served.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.requests_rejected.load(Ordering::Relaxed), 1);

        let by_tier = metrics.get_predictions_by_tier();
        assert_eq!(by_tier.get("high"), Some(&1));
        assert_eq!(by_tier.get("uncertain"), Some(&1));
    }

    #[test]
    fn test_processing_stats() {
        let metrics = ServiceMetrics::new();
        for us in [100, 200, 300, 400] {
            metrics.record_prediction(Duration::from_micros(us), "moderate");
        }

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.max_us, 400);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = ServiceMetrics::new();
        metrics.record_prediction(Duration::from_micros(150), "very_high");
        metrics.record_model_time("biomarker", Duration::from_micros(90));

        let snapshot = metrics.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("predictions_served"));
        assert!(json.contains("biomarker"));
    }
}
