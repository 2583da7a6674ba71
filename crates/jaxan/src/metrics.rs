//! Analysis metrics using metrics-rs.
//!
//! Recording goes through the `metrics` facade, so any installed recorder receives the
//! values. [`MemoryRecorder`] keeps them in memory for summaries and tests.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit, counter,
    describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use parking_lot::RwLock;

use crate::analyzer::MethodAnalysis;
use crate::error::Result;

pub const METHODS_ANALYZED: &str = "jaxan_methods_analyzed_total";
pub const METHODS_FAILED: &str = "jaxan_methods_failed_total";
pub const POOL_METHODS: &str = "jaxan_pool_methods";
pub const RESULT_VALUES: &str = "jaxan_result_values";
pub const RUN_DURATION: &str = "jaxan_run_duration_seconds";

/// Register metric descriptions. Call once after installing a recorder.
pub fn init() {
    describe_counter!(METHODS_ANALYZED, Unit::Count, "Methods analyzed successfully");
    describe_counter!(METHODS_FAILED, Unit::Count, "Methods whose analysis failed");
    describe_gauge!(
        POOL_METHODS,
        Unit::Count,
        "Methods requested from the pool during the last run"
    );
    describe_histogram!(
        RESULT_VALUES,
        Unit::Count,
        "Possible result values per analyzed method"
    );
    describe_histogram!(RUN_DURATION, Unit::Seconds, "Duration of an analysis run");
}

/// Record the outcome of one method analysis.
#[allow(clippy::cast_precision_loss)]
pub fn record_method(result: &Result<MethodAnalysis>) {
    match result {
        Ok(analysis) => {
            counter!(METHODS_ANALYZED).increment(1);
            histogram!(RESULT_VALUES).record(analysis.result.values().len() as f64);
        }
        Err(_) => counter!(METHODS_FAILED).increment(1),
    }
}

/// Record totals of one analysis run.
#[allow(clippy::cast_precision_loss)]
pub fn record_run(pool_methods: usize, elapsed: Duration) {
    gauge!(POOL_METHODS).set(pool_methods as f64);
    histogram!(RUN_DURATION).record(elapsed.as_secs_f64());
}

#[derive(Debug, Default)]
struct Storage {
    counters: RwLock<BTreeMap<String, u64>>,
    gauges: RwLock<BTreeMap<String, f64>>,
    histograms: RwLock<BTreeMap<String, Vec<f64>>>,
}

struct MemoryCounter {
    key: String,
    storage: Arc<Storage>,
}

impl metrics::CounterFn for MemoryCounter {
    fn increment(&self, value: u64) {
        *self.storage.counters.write().entry(self.key.clone()).or_insert(0) += value;
    }

    fn absolute(&self, value: u64) {
        self.storage.counters.write().insert(self.key.clone(), value);
    }
}

struct MemoryGauge {
    key: String,
    storage: Arc<Storage>,
}

impl metrics::GaugeFn for MemoryGauge {
    fn increment(&self, value: f64) {
        *self.storage.gauges.write().entry(self.key.clone()).or_insert(0.0) += value;
    }

    fn decrement(&self, value: f64) {
        *self.storage.gauges.write().entry(self.key.clone()).or_insert(0.0) -= value;
    }

    fn set(&self, value: f64) {
        self.storage.gauges.write().insert(self.key.clone(), value);
    }
}

struct MemoryHistogram {
    key: String,
    storage: Arc<Storage>,
}

impl metrics::HistogramFn for MemoryHistogram {
    fn record(&self, value: f64) {
        self.storage
            .histograms
            .write()
            .entry(self.key.clone())
            .or_default()
            .push(value);
    }
}

/// Recorder that keeps every metric in memory.
#[derive(Debug, Default)]
pub struct MemoryRecorder {
    storage: Arc<Storage>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for reading the recorded values.
    pub fn handle(&self) -> MetricsHandle {
        MetricsHandle {
            storage: Arc::clone(&self.storage),
        }
    }

    /// Install as the global recorder. Returns `None` if one is already installed.
    pub fn install(self) -> Option<MetricsHandle> {
        let handle = self.handle();
        metrics::set_global_recorder(self).ok()?;
        Some(handle)
    }
}

fn key_to_string(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|label| format!("{}={}", label.key(), label.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

impl Recorder for MemoryRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(Arc::new(MemoryCounter {
            key: key_to_string(key),
            storage: Arc::clone(&self.storage),
        }))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(Arc::new(MemoryGauge {
            key: key_to_string(key),
            storage: Arc::clone(&self.storage),
        }))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(Arc::new(MemoryHistogram {
            key: key_to_string(key),
            storage: Arc::clone(&self.storage),
        }))
    }
}

/// Read access to a [`MemoryRecorder`]'s values.
#[derive(Clone, Debug)]
pub struct MetricsHandle {
    storage: Arc<Storage>,
}

impl MetricsHandle {
    pub fn counter(&self, key: &str) -> Option<u64> {
        self.storage.counters.read().get(key).copied()
    }

    pub fn gauge(&self, key: &str) -> Option<f64> {
        self.storage.gauges.read().get(key).copied()
    }

    pub fn histogram(&self, key: &str) -> Option<Vec<f64>> {
        self.storage.histograms.read().get(key).cloned()
    }
}

impl fmt::Display for MetricsHandle {
    #[allow(clippy::cast_precision_loss)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.storage.counters.read().iter() {
            writeln!(f, "{key}: {value}")?;
        }
        for (key, value) in self.storage.gauges.read().iter() {
            writeln!(f, "{key}: {value:.3}")?;
        }
        for (key, values) in self.storage.histograms.read().iter() {
            if values.is_empty() {
                continue;
            }
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let avg = values.iter().sum::<f64>() / values.len() as f64;
            writeln!(
                f,
                "{key}: count={}, min={min:.3}, max={max:.3}, avg={avg:.3}",
                values.len()
            )?;
        }
        Ok(())
    }
}
