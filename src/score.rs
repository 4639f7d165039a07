//! Score combination and report rounding.

use crate::metrics::{Metric, MetricsSummary};

/// Values below this are reported as `0.0`.
pub const REPORT_FLOOR: f64 = 0.0001;

/// Decimal places kept in reported values.
const REPORT_DECIMALS: usize = 5;

/// The nine OVERALL sub-metrics carried by a score report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreDetail {
    pub mota: f64,
    /// Mean IoU of matched boxes, i.e. `1 - motp` of the summary
    pub motp: f64,
    pub idf1: f64,
    pub mostly_tracked: f64,
    pub mostly_lost: f64,
    pub false_positives: f64,
    pub misses: f64,
    pub switches: f64,
    pub fragmentations: f64,
}

impl ScoreDetail {
    /// Read the OVERALL row of a summary.
    pub fn from_summary(summary: &MetricsSummary) -> Self {
        Self {
            mota: summary.overall(Metric::Mota),
            motp: 1.0 - summary.overall(Metric::Motp),
            idf1: summary.overall(Metric::Idf1),
            mostly_tracked: summary.overall(Metric::MostlyTracked),
            mostly_lost: summary.overall(Metric::MostlyLost),
            false_positives: summary.overall(Metric::NumFalsePositives),
            misses: summary.overall(Metric::NumMisses),
            switches: summary.overall(Metric::NumSwitches),
            fragmentations: summary.overall(Metric::NumFragmentations),
        }
    }

    /// The nine metrics in report order: MOTA, MOTP, IDF1, MT, ML, FP, FN, IDs, Frag.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64, f64, f64, f64, f64, f64) {
        (
            self.mota,
            self.motp,
            self.idf1,
            self.mostly_tracked,
            self.mostly_lost,
            self.false_positives,
            self.misses,
            self.switches,
            self.fragmentations,
        )
    }
}

/// Combined score plus its sub-metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreReport {
    pub score: f64,
    pub detail: ScoreDetail,
}

impl ScoreReport {
    /// Combine the detail's MOTA and MOTP; `None` when the pair is degenerate.
    pub fn from_detail(detail: ScoreDetail) -> Option<Self> {
        combine(detail.mota, detail.motp).map(|score| Self { score, detail })
    }
}

/// Harmonic-style combination `2 * MOTA * MOTP / (MOTA + MOTP)`.
///
/// Returns `None` when `MOTA + MOTP <= 0`. A NaN input never compares as
/// degenerate and yields a NaN score.
pub fn combine(mota: f64, motp: f64) -> Option<f64> {
    let sum = mota + motp;
    if sum <= 0.0 {
        return None;
    }
    Some(2.0 * mota * motp / sum)
}

/// Render a metric for a report: rounded to 5 decimals, or `0.0` when it is
/// below [`REPORT_FLOOR`] (including NaN).
pub fn format_metric(value: f64) -> String {
    if value >= REPORT_FLOOR {
        float_repr(round_decimals(value))
    } else {
        "0.0".to_string()
    }
}

/// Like [`format_metric`] but the floor itself is also reported as `0.0`.
pub fn format_score(value: f64) -> String {
    if value > REPORT_FLOOR {
        float_repr(round_decimals(value))
    } else {
        "0.0".to_string()
    }
}

/// Round the exact binary value, not a rescaled copy of it.
fn round_decimals(value: f64) -> f64 {
    format!("{:.*}", REPORT_DECIMALS, value)
        .parse()
        .unwrap_or(value)
}

/// Shortest round-trip representation, always with a decimal point.
fn float_repr(value: f64) -> String {
    let repr = value.to_string();
    if repr.contains('.') || !value.is_finite() {
        repr
    } else {
        format!("{}.0", repr)
    }
}
