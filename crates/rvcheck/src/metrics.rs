//! Metrics collection and reporting using metrics-rs.
//!
//! Commands record what they did through the `metrics` facade; with
//! `--metrics` a [`CliRecorder`] collects the values in memory and prints a
//! summary when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::{
    Counter, CounterFn, Gauge, GaugeFn, Histogram, HistogramFn, Key, KeyName, Metadata, Recorder,
    SharedString, Unit, counter, describe_counter, describe_gauge, describe_histogram, gauge,
    histogram,
};
use parking_lot::RwLock;

use crate::golden::ConvertStats;
use crate::patch::PatchReport;
use crate::trace::{Trace, TraceComparison};

// ============================================================================
// Metric descriptions
// ============================================================================

/// Register metric descriptions. Call once at startup.
pub fn init() {
    describe_counter!(
        "rvcheck_records_total",
        Unit::Count,
        "Commit records read from a trace"
    );
    describe_counter!(
        "rvcheck_lines_skipped_total",
        Unit::Count,
        "Header, divider, comment and blank lines skipped"
    );
    describe_counter!(
        "rvcheck_records_matched_total",
        Unit::Count,
        "Records that matched the golden trace"
    );
    describe_counter!(
        "rvcheck_verdicts_total",
        Unit::Count,
        "Comparison verdicts by result"
    );
    describe_counter!(
        "rvcheck_convert_lines_total",
        Unit::Count,
        "Spike log lines by conversion outcome"
    );
    describe_counter!(
        "rvcheck_patch_substitutions_total",
        Unit::Count,
        "Assembly substitutions applied"
    );
    describe_gauge!(
        "rvcheck_trailing_records",
        Unit::Count,
        "Benign trailing RTL records ignored"
    );
    describe_histogram!(
        "rvcheck_compare_duration_seconds",
        Unit::Seconds,
        "Time spent loading and comparing traces"
    );
}

// ============================================================================
// Metric recording functions
// ============================================================================

/// Record a loaded trace; `role` is `rtl` or `golden`.
pub fn record_trace(role: &'static str, trace: &Trace) {
    let labels = [("trace", role)];
    counter!("rvcheck_records_total", &labels).increment(trace.len() as u64);
    counter!("rvcheck_lines_skipped_total", &labels).increment(trace.skipped_lines() as u64);
}

/// Record the outcome of one comparison.
pub fn record_comparison(result: &TraceComparison, duration_secs: f64) {
    let verdict = result
        .divergence
        .as_ref()
        .map_or("pass", |d| d.kind().as_str());

    counter!("rvcheck_records_matched_total").increment(result.matched as u64);
    counter!("rvcheck_verdicts_total", "result" => verdict).increment(1);
    gauge!("rvcheck_trailing_records").set(result.trailing.len() as f64);
    histogram!("rvcheck_compare_duration_seconds").record(duration_secs);
}

/// Record converter outcomes.
pub fn record_convert(stats: &ConvertStats) {
    let outcomes = [
        ("emitted", stats.emitted),
        ("boot_region", stats.boot_region),
        ("no_effect", stats.no_effect),
        ("ignored", stats.ignored),
    ];
    for (outcome, count) in outcomes {
        counter!("rvcheck_convert_lines_total", "outcome" => outcome).increment(count as u64);
    }
}

/// Record applied patch substitutions.
pub fn record_patch(report: &PatchReport) {
    counter!("rvcheck_patch_substitutions_total", "kind" => "stack")
        .increment(report.stack_replacements as u64);
    counter!("rvcheck_patch_substitutions_total", "kind" => "exit")
        .increment(report.exit_replacements as u64);
}

// ============================================================================
// CLI Recorder for terminal output
// ============================================================================

/// Values collected by a [`CliRecorder`], keyed by `name{label=value,...}`.
#[derive(Default)]
struct MetricStore {
    counters: RwLock<HashMap<String, u64>>,
    gauges: RwLock<HashMap<String, f64>>,
    histograms: RwLock<HashMap<String, Vec<f64>>>,
}

impl MetricStore {
    fn update_gauge(&self, key: &str, f: impl FnOnce(f64) -> f64) {
        let mut gauges = self.gauges.write();
        let value = gauges.entry(key.to_string()).or_insert(0.0);
        *value = f(*value);
    }
}

/// One registered metric: its rendered key and the shared store.
///
/// The same handle backs counters, gauges and histograms; the recorder only
/// hands it out wrapped in the matching facade type.
struct CliMetric {
    key: String,
    store: Arc<MetricStore>,
}

impl CounterFn for CliMetric {
    fn increment(&self, value: u64) {
        *self.store.counters.write().entry(self.key.clone()).or_insert(0) += value;
    }

    fn absolute(&self, value: u64) {
        self.store.counters.write().insert(self.key.clone(), value);
    }
}

impl GaugeFn for CliMetric {
    fn increment(&self, value: f64) {
        self.store.update_gauge(&self.key, |v| v + value);
    }

    fn decrement(&self, value: f64) {
        self.store.update_gauge(&self.key, |v| v - value);
    }

    fn set(&self, value: f64) {
        self.store.update_gauge(&self.key, |_| value);
    }
}

impl HistogramFn for CliMetric {
    fn record(&self, value: f64) {
        self.store
            .histograms
            .write()
            .entry(self.key.clone())
            .or_default()
            .push(value);
    }
}

/// In-memory recorder behind `--metrics`.
///
/// Every registered metric writes into one shared store. A
/// [`CliRecorderHandle`] reads the same store once the command has finished,
/// so the recorder itself can be moved into the global slot.
#[derive(Default)]
pub struct CliRecorder {
    store: Arc<MetricStore>,
}

impl CliRecorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the global recorder.
    ///
    /// Returns `None` if a recorder was already installed.
    #[must_use]
    pub fn install(self) -> Option<CliRecorderHandle> {
        let handle = self.handle();
        metrics::set_global_recorder(self).ok()?;
        Some(handle)
    }

    /// Handle sharing this recorder's storage.
    #[must_use]
    pub fn handle(&self) -> CliRecorderHandle {
        CliRecorderHandle {
            store: Arc::clone(&self.store),
        }
    }

    fn metric(&self, key: &Key) -> Arc<CliMetric> {
        Arc::new(CliMetric {
            key: key_to_string(key),
            store: Arc::clone(&self.store),
        })
    }
}

/// Render `key` as `name` or `name{label=value,...}`.
fn key_to_string(key: &Key) -> String {
    let labels: Vec<String> = key
        .labels()
        .map(|l| format!("{}={}", l.key(), l.value()))
        .collect();
    if labels.is_empty() {
        key.name().to_string()
    } else {
        format!("{}{{{}}}", key.name(), labels.join(","))
    }
}

impl Recorder for CliRecorder {
    // Descriptions are only for exporters; the summary prints raw keys.
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        Counter::from_arc(self.metric(key))
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::from_arc(self.metric(key))
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        Histogram::from_arc(self.metric(key))
    }
}

/// Read access to the values collected by a [`CliRecorder`].
pub struct CliRecorderHandle {
    store: Arc<MetricStore>,
}

impl CliRecorderHandle {
    /// Current value of the counter rendered as `key`.
    #[must_use]
    pub fn get_counter(&self, key: &str) -> Option<u64> {
        self.store.counters.read().get(key).copied()
    }

    /// Last value set on the gauge rendered as `key`.
    #[must_use]
    pub fn get_gauge(&self, key: &str) -> Option<f64> {
        self.store.gauges.read().get(key).copied()
    }

    /// Samples recorded into the histogram rendered as `key`.
    #[must_use]
    pub fn get_histogram(&self, key: &str) -> Option<Vec<f64>> {
        self.store.histograms.read().get(key).cloned()
    }

    /// Print all collected metrics to stdout, sorted by key.
    pub fn print_summary(&self) {
        let counters = self.store.counters.read();
        let gauges = self.store.gauges.read();
        let histograms = self.store.histograms.read();

        if counters.is_empty() && gauges.is_empty() && histograms.is_empty() {
            println!("No metrics collected.");
            return;
        }

        println!();
        println!("## Metrics Summary");
        println!();

        if !counters.is_empty() {
            println!("### Counters");
            for (key, value) in sorted(&counters) {
                println!("  {key}: {value}");
            }
            println!();
        }

        if !gauges.is_empty() {
            println!("### Gauges");
            for (key, value) in sorted(&gauges) {
                println!("  {key}: {value:.6}");
            }
            println!();
        }

        let histograms: Vec<_> = sorted(&histograms)
            .into_iter()
            .filter(|(_, samples)| !samples.is_empty())
            .collect();
        if !histograms.is_empty() {
            println!("### Histograms");
            for (key, samples) in histograms {
                let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
                let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let avg = samples.iter().sum::<f64>() / samples.len() as f64;
                println!(
                    "  {key}: count={}, min={min:.6}, max={max:.6}, avg={avg:.6}",
                    samples.len()
                );
            }
            println!();
        }
    }
}

fn sorted<V>(map: &HashMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}
