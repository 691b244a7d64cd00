//! Estimate statistics, summarized at shutdown.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Upper edges of the price distribution buckets; the last bucket is open
const PRICE_BUCKET_EDGES: [f64; 5] = [100_000.0, 300_000.0, 500_000.0, 1_000_000.0, 2_500_000.0];

/// Metrics collector for served estimates
pub struct EstimatorMetrics {
    /// Total estimates returned
    pub estimates_served: AtomicU64,
    /// Total failed requests
    pub estimates_failed: AtomicU64,
    /// Failures by error kind
    failures_by_kind: RwLock<BTreeMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Price distribution buckets
    price_buckets: RwLock<[u64; PRICE_BUCKET_EDGES.len() + 1]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl EstimatorMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            estimates_served: AtomicU64::new(0),
            estimates_failed: AtomicU64::new(0),
            failures_by_kind: RwLock::new(BTreeMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            price_buckets: RwLock::new([0; PRICE_BUCKET_EDGES.len() + 1]),
            start_time: Instant::now(),
        }
    }

    /// Record a successful estimate
    pub fn record_estimate(&self, processing_time: Duration, price: f64) {
        self.estimates_served.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = PRICE_BUCKET_EDGES
            .iter()
            .position(|&edge| price < edge)
            .unwrap_or(PRICE_BUCKET_EDGES.len());
        if let Ok(mut buckets) = self.price_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a failed request
    pub fn record_failure(&self, kind: &str) {
        self.estimates_failed.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_kind) = self.failures_by_kind.write() {
            *by_kind.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let Ok(times) = self.processing_times.read() else {
            return ProcessingStats::default();
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();
        let percentile = |p: f64| sorted[((count as f64 * p) as usize).min(count - 1)];

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Get current throughput (estimates per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.estimates_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get price distribution
    pub fn get_price_distribution(&self) -> [u64; PRICE_BUCKET_EDGES.len() + 1] {
        self.price_buckets
            .read()
            .map(|b| *b)
            .unwrap_or([0; PRICE_BUCKET_EDGES.len() + 1])
    }

    /// Get failures by error kind
    pub fn get_failures_by_kind(&self) -> BTreeMap<String, u64> {
        self.failures_by_kind
            .read()
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let served = self.estimates_served.load(Ordering::Relaxed);
        let failed = self.estimates_failed.load(Ordering::Relaxed);
        let total = served + failed;
        let failure_rate = if total > 0 {
            (failed as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              CAR PRICE ESTIMATOR - SESSION SUMMARY           ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Estimates Served: {:>8}  │  Throughput: {:>8.1} est/s     ║",
            served,
            self.get_throughput()
        );
        info!(
            "║ Requests Failed:  {:>8}  │  Failure Rate: {:>6.1}%         ║",
            failed, failure_rate
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );

        let failures = self.get_failures_by_kind();
        if !failures.is_empty() {
            info!("╠══════════════════════════════════════════════════════════════╣");
            info!("║ Failures by Kind:                                            ║");
            for (kind, count) in &failures {
                info!("║   {:18}: {:>6}                                 ║", kind, count);
            }
        }

        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Price Distribution:                                          ║");
        let distribution = self.get_price_distribution();
        let bucketed: u64 = distribution.iter().sum();
        for (i, &count) in distribution.iter().enumerate() {
            let pct = if bucketed > 0 {
                (count as f64 / bucketed as f64) * 100.0
            } else {
                0.0
            };
            let bar: String = "█".repeat(((pct / 5.0) as usize).min(20));
            info!(
                "║   {:>21}: {:>6} ({:>5.1}%) {}",
                bucket_label(i),
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

fn bucket_label(index: usize) -> String {
    match index {
        0 => format!("< {}", PRICE_BUCKET_EDGES[0]),
        i if i < PRICE_BUCKET_EDGES.len() => {
            format!("{}-{}", PRICE_BUCKET_EDGES[i - 1], PRICE_BUCKET_EDGES[i])
        }
        _ => format!(">= {}", PRICE_BUCKET_EDGES[PRICE_BUCKET_EDGES.len() - 1]),
    }
}

impl Default for EstimatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}
