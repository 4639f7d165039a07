//! Metric summary table: one row per sequence plus OVERALL.

use crate::internal::motmetrics::MOTMetrics;
use crate::{Error, Result};
use comfy_table::{presets::NOTHING, Cell, CellAlignment, Table};
use std::fmt;
use std::str::FromStr;

/// Metrics that can be read from a [`MetricsSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    NumFrames,
    NumObjects,
    NumPredictions,
    NumMatches,
    NumDetections,
    Idf1,
    Idp,
    Idr,
    Recall,
    Precision,
    NumUniqueObjects,
    MostlyTracked,
    PartiallyTracked,
    MostlyLost,
    NumFalsePositives,
    NumMisses,
    NumSwitches,
    NumFragmentations,
    Mota,
    Motp,
}

impl Metric {
    /// The MOTChallenge metric set, in display order.
    pub const MOT_CHALLENGE: [Metric; 15] = [
        Metric::Idf1,
        Metric::Idp,
        Metric::Idr,
        Metric::Recall,
        Metric::Precision,
        Metric::NumUniqueObjects,
        Metric::MostlyTracked,
        Metric::PartiallyTracked,
        Metric::MostlyLost,
        Metric::NumFalsePositives,
        Metric::NumMisses,
        Metric::NumSwitches,
        Metric::NumFragmentations,
        Metric::Mota,
        Metric::Motp,
    ];

    const ALL: [Metric; 20] = [
        Metric::NumFrames,
        Metric::NumObjects,
        Metric::NumPredictions,
        Metric::NumMatches,
        Metric::NumDetections,
        Metric::Idf1,
        Metric::Idp,
        Metric::Idr,
        Metric::Recall,
        Metric::Precision,
        Metric::NumUniqueObjects,
        Metric::MostlyTracked,
        Metric::PartiallyTracked,
        Metric::MostlyLost,
        Metric::NumFalsePositives,
        Metric::NumMisses,
        Metric::NumSwitches,
        Metric::NumFragmentations,
        Metric::Mota,
        Metric::Motp,
    ];

    /// Column name used in summaries, e.g. `mostly_tracked`.
    pub fn name(self) -> &'static str {
        match self {
            Metric::NumFrames => "num_frames",
            Metric::NumObjects => "num_objects",
            Metric::NumPredictions => "num_predictions",
            Metric::NumMatches => "num_matches",
            Metric::NumDetections => "num_detections",
            Metric::Idf1 => "idf1",
            Metric::Idp => "idp",
            Metric::Idr => "idr",
            Metric::Recall => "recall",
            Metric::Precision => "precision",
            Metric::NumUniqueObjects => "num_unique_objects",
            Metric::MostlyTracked => "mostly_tracked",
            Metric::PartiallyTracked => "partially_tracked",
            Metric::MostlyLost => "mostly_lost",
            Metric::NumFalsePositives => "num_false_positives",
            Metric::NumMisses => "num_misses",
            Metric::NumSwitches => "num_switches",
            Metric::NumFragmentations => "num_fragmentations",
            Metric::Mota => "mota",
            Metric::Motp => "motp",
        }
    }

    /// Short MOTChallenge header, e.g. `MT`.
    pub fn header(self) -> &'static str {
        match self {
            Metric::NumFrames => "Frames",
            Metric::NumObjects => "Objs",
            Metric::NumPredictions => "Preds",
            Metric::NumMatches => "Matches",
            Metric::NumDetections => "Dets",
            Metric::Idf1 => "IDF1",
            Metric::Idp => "IDP",
            Metric::Idr => "IDR",
            Metric::Recall => "Rcll",
            Metric::Precision => "Prcn",
            Metric::NumUniqueObjects => "GT",
            Metric::MostlyTracked => "MT",
            Metric::PartiallyTracked => "PT",
            Metric::MostlyLost => "ML",
            Metric::NumFalsePositives => "FP",
            Metric::NumMisses => "FN",
            Metric::NumSwitches => "IDs",
            Metric::NumFragmentations => "FM",
            Metric::Mota => "MOTA",
            Metric::Motp => "MOTP",
        }
    }

    /// Read this metric from a set of counts.
    pub fn value(self, m: &MOTMetrics) -> f64 {
        match self {
            Metric::NumFrames => m.num_frames as f64,
            Metric::NumObjects => m.num_objects as f64,
            Metric::NumPredictions => m.num_predictions as f64,
            Metric::NumMatches => m.num_matches as f64,
            Metric::NumDetections => m.num_detections() as f64,
            Metric::Idf1 => m.idf1(),
            Metric::Idp => m.idp(),
            Metric::Idr => m.idr(),
            Metric::Recall => m.recall(),
            Metric::Precision => m.precision(),
            Metric::NumUniqueObjects => m.num_unique_objects as f64,
            Metric::MostlyTracked => m.mostly_tracked as f64,
            Metric::PartiallyTracked => m.partially_tracked as f64,
            Metric::MostlyLost => m.mostly_lost as f64,
            Metric::NumFalsePositives => m.num_false_positives as f64,
            Metric::NumMisses => m.num_misses as f64,
            Metric::NumSwitches => m.num_switches as f64,
            Metric::NumFragmentations => m.num_fragmentations as f64,
            Metric::Mota => m.mota(),
            Metric::Motp => m.motp(),
        }
    }

    fn format(self, value: f64) -> String {
        match self {
            Metric::Idf1
            | Metric::Idp
            | Metric::Idr
            | Metric::Recall
            | Metric::Precision
            | Metric::Mota => format!("{:.1}%", value * 100.0),
            Metric::Motp => format!("{:.3}", value),
            _ => format!("{}", value),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| Error::MetricsError(format!("unknown metric: {}", s)))
    }
}

/// Metrics per sequence plus the OVERALL aggregate.
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    rows: Vec<(String, MOTMetrics)>,
    overall: MOTMetrics,
}

impl MetricsSummary {
    /// Name of the aggregate row.
    pub const OVERALL: &'static str = "OVERALL";

    /// Build a summary from per-sequence metrics; OVERALL sums their counts.
    pub fn new(rows: Vec<(String, MOTMetrics)>) -> Self {
        let overall = MOTMetrics::merge(rows.iter().map(|(_, m)| m));
        Self { rows, overall }
    }

    /// Look up a metric by row name (a sequence name or [`Self::OVERALL`]).
    pub fn get(&self, metric: Metric, row: &str) -> Option<f64> {
        if row == Self::OVERALL {
            return Some(metric.value(&self.overall));
        }
        self.rows
            .iter()
            .find(|(name, _)| name == row)
            .map(|(_, m)| metric.value(m))
    }

    /// A metric of the OVERALL row.
    pub fn overall(&self, metric: Metric) -> f64 {
        metric.value(&self.overall)
    }

    /// Sequence names in evaluation order, without OVERALL.
    pub fn sequence_names(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(name, _)| name.as_str())
    }

    /// Render the MOTChallenge metric set as a text table.
    pub fn render(&self) -> String {
        let mut table = Table::new();
        table.load_preset(NOTHING);

        let mut header = vec![Cell::new("")];
        header.extend(Metric::MOT_CHALLENGE.iter().map(|m| Cell::new(m.header())));
        table.set_header(header);

        let all_rows = self
            .rows
            .iter()
            .map(|(name, m)| (name.as_str(), m))
            .chain(std::iter::once((Self::OVERALL, &self.overall)));

        for (name, m) in all_rows {
            let mut cells = vec![Cell::new(name)];
            cells.extend(
                Metric::MOT_CHALLENGE
                    .iter()
                    .map(|metric| Cell::new(metric.format(metric.value(m))).set_alignment(CellAlignment::Right)),
            );
            table.add_row(cells);
        }

        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(objects: usize, matches: usize, misses: usize) -> MOTMetrics {
        MOTMetrics {
            num_frames: objects,
            num_objects: objects,
            num_predictions: matches,
            num_unique_objects: 1,
            num_matches: matches,
            num_misses: misses,
            total_distance: 0.1 * matches as f64,
            idtp: matches,
            ..MOTMetrics::default()
        }
    }

    #[test]
    fn test_metric_names_round_trip_through_from_str() {
        for metric in Metric::ALL {
            assert_eq!(metric.name().parse::<Metric>().unwrap(), metric);
        }
        assert!("not_a_metric".parse::<Metric>().is_err());
    }

    #[test]
    fn test_summary_lookup() {
        let summary = MetricsSummary::new(vec![
            ("seq-a".to_string(), counts(4, 4, 0)),
            ("seq-b".to_string(), counts(4, 2, 2)),
        ]);

        assert_eq!(summary.get(Metric::Mota, "seq-a"), Some(1.0));
        assert_eq!(summary.get(Metric::Mota, "seq-b"), Some(0.5));
        assert_eq!(summary.get(Metric::Mota, "OVERALL"), Some(0.75));
        assert_eq!(summary.get(Metric::Mota, "missing"), None);
        assert_eq!(summary.overall(Metric::NumMisses), 2.0);
        assert_eq!(summary.sequence_names().collect::<Vec<_>>(), vec!["seq-a", "seq-b"]);
    }

    #[test]
    fn test_render_contains_rows_and_headers() {
        let summary = MetricsSummary::new(vec![("seq-a".to_string(), counts(4, 4, 0))]);
        let rendered = summary.render();

        assert!(rendered.contains("MOTA"));
        assert!(rendered.contains("IDF1"));
        assert!(rendered.contains("seq-a"));
        assert!(rendered.contains("OVERALL"));
        assert!(rendered.contains("100.0%"));
    }
}
