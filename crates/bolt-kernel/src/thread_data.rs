//! Thread-data service: maps a shaft diameter to a thread designation.

use bolt_types::ThreadRecommendation;
use tracing::debug;

/// Lookup of recommended thread sizes.
pub trait ThreadDataQuery {
    /// Name of the metric thread family.
    fn default_metric_thread_type(&self) -> String;

    /// Recommendation for a diameter in canonical units (cm), or `None`.
    fn recommend_thread_data(
        &self,
        diameter: f64,
        internal: bool,
        thread_type: &str,
    ) -> Option<ThreadRecommendation>;
}

/// ISO 261 coarse-pitch series: (nominal diameter mm, pitch mm).
const ISO_COARSE: &[(f64, f64)] = &[
    (1.6, 0.35),
    (2.0, 0.4),
    (2.5, 0.45),
    (3.0, 0.5),
    (3.5, 0.6),
    (4.0, 0.7),
    (5.0, 0.8),
    (6.0, 1.0),
    (8.0, 1.25),
    (10.0, 1.5),
    (12.0, 1.75),
    (14.0, 2.0),
    (16.0, 2.0),
    (18.0, 2.5),
    (20.0, 2.5),
    (22.0, 2.5),
    (24.0, 3.0),
    (27.0, 3.0),
    (30.0, 3.5),
    (33.0, 3.5),
    (36.0, 4.0),
    (39.0, 4.0),
    (42.0, 4.5),
    (45.0, 4.5),
    (48.0, 5.0),
    (52.0, 5.0),
    (56.0, 5.5),
    (60.0, 5.5),
    (64.0, 6.0),
];

/// ISO metric coarse thread table.
#[derive(Debug, Clone)]
pub struct MetricThreadTable {
    /// Largest accepted |d - nominal| / nominal.
    pub max_relative_deviation: f64,
}

impl MetricThreadTable {
    pub const THREAD_TYPE: &'static str = "ISO Metric profile";

    pub fn new() -> Self {
        Self {
            max_relative_deviation: 0.025,
        }
    }
}

impl Default for MetricThreadTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadDataQuery for MetricThreadTable {
    fn default_metric_thread_type(&self) -> String {
        Self::THREAD_TYPE.to_string()
    }

    fn recommend_thread_data(
        &self,
        diameter: f64,
        internal: bool,
        thread_type: &str,
    ) -> Option<ThreadRecommendation> {
        if thread_type != Self::THREAD_TYPE || !diameter.is_finite() || diameter <= 0.0 {
            return None;
        }
        let diameter_mm = diameter * 10.0;
        let (nominal, pitch) = ISO_COARSE.iter().copied().min_by(|a, b| {
            (a.0 - diameter_mm)
                .abs()
                .partial_cmp(&(b.0 - diameter_mm).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        let deviation = (nominal - diameter_mm).abs() / nominal;
        if deviation > self.max_relative_deviation {
            debug!(diameter_mm, nominal, deviation, "no metric thread within tolerance");
            return None;
        }
        Some(ThreadRecommendation {
            designation: format!("M{}x{}", nominal, pitch),
            class: if internal { "6H" } else { "6g" }.to_string(),
        })
    }
}

/// A thread service with empty tables.
#[derive(Debug, Clone, Default)]
pub struct NoThreadData;

impl ThreadDataQuery for NoThreadData {
    fn default_metric_thread_type(&self) -> String {
        MetricThreadTable::THREAD_TYPE.to_string()
    }

    fn recommend_thread_data(&self, _: f64, _: bool, _: &str) -> Option<ThreadRecommendation> {
        None
    }
}
