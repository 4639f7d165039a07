//! MOTChallenge evaluation functions.

use super::{MetricsSummary, TrackTable};
use crate::internal::motmetrics::{iou_distance_matrix, MOTAccumulator};
use crate::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Default IoU distance threshold: boxes match when `1 - IoU <= 0.5`.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.5;

/// Minimum confidence of ground truth rows.
pub const GROUND_TRUTH_MIN_CONFIDENCE: f64 = 1.0;

/// Minimum confidence of submitted rows.
pub const SUBMISSION_MIN_CONFIDENCE: f64 = -1.0;

/// Per-sequence accumulators produced by [`compare_sequences`].
#[derive(Debug, Default)]
pub struct SequenceComparison {
    /// (sequence name, accumulator) in ground truth order
    pub accumulators: Vec<(String, MOTAccumulator)>,
    /// False when a ground truth sequence had no submission and the
    /// comparison stopped early.
    pub complete: bool,
}

/// Build the accumulator for one sequence.
///
/// Walks the union of frames of both tables; in each frame objects and
/// hypotheses are compared with the `1 - IoU` distance, pairs above
/// `iou_threshold` being unmatchable.
pub fn compare_to_groundtruth(
    gt: &TrackTable,
    hypotheses: &TrackTable,
    iou_threshold: f64,
) -> MOTAccumulator {
    let frames: BTreeSet<i32> = gt.frame_ids().chain(hypotheses.frame_ids()).collect();
    let mut acc = MOTAccumulator::new();

    for frame in frames {
        let (object_ids, object_boxes) = gt.frame_boxes(frame);
        let (hypothesis_ids, hypothesis_boxes) = hypotheses.frame_boxes(frame);
        let distances = iou_distance_matrix(&object_boxes, &hypothesis_boxes, iou_threshold);
        acc.update(frame, &object_ids, &hypothesis_ids, &distances);
    }

    acc
}

/// Build one accumulator per ground truth sequence.
///
/// Stops at the first ground truth sequence without a submission and returns
/// what was compared so far with `complete = false`.
pub fn compare_sequences(
    gt: &BTreeMap<String, TrackTable>,
    submissions: &BTreeMap<String, TrackTable>,
    iou_threshold: f64,
) -> SequenceComparison {
    let mut comparison = SequenceComparison::default();

    for (name, gt_table) in gt {
        let Some(ts_table) = submissions.get(name) else {
            tracing::warn!("No submission for {}, skipping.", name);
            return comparison;
        };
        tracing::info!("Comparing {}...", name);
        let acc = compare_to_groundtruth(gt_table, ts_table, iou_threshold);
        comparison.accumulators.push((name.clone(), acc));
    }

    comparison.complete = true;
    comparison
}

/// Compute per-sequence metrics and the OVERALL aggregate.
pub fn compute_summary(comparison: &SequenceComparison) -> Result<MetricsSummary> {
    if comparison.accumulators.is_empty() {
        return Err(Error::MetricsError(
            "no sequences to evaluate".to_string(),
        ));
    }

    let rows = comparison
        .accumulators
        .iter()
        .map(|(name, acc)| (name.clone(), acc.compute_metrics()))
        .collect();

    Ok(MetricsSummary::new(rows))
}

/// Load `{stem: table}` for a list of sequence files.
pub fn load_sequences<P: AsRef<Path>>(
    files: &[P],
    min_confidence: f64,
) -> Result<BTreeMap<String, TrackTable>> {
    files
        .iter()
        .map(|file| {
            let path = file.as_ref();
            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    Error::MetricsError(format!("invalid sequence file name: {}", path.display()))
                })?
                .to_string();
            let table = TrackTable::load(path, min_confidence)?;
            if table.is_empty() {
                tracing::warn!("{} has no rows above confidence {}", path.display(), min_confidence);
            } else {
                tracing::debug!("Loaded {} rows from {}", table.len(), path.display());
            }
            Ok((name, table))
        })
        .collect()
}

/// Evaluate matched ground truth and submission files.
///
/// Both slices must name the same sequences; the completeness flag of the
/// comparison is only logged.
pub fn eval_mot_challenge<P1: AsRef<Path>, P2: AsRef<Path>>(
    gt_files: &[P1],
    submission_files: &[P2],
    iou_threshold: f64,
) -> Result<MetricsSummary> {
    tracing::info!("Loading files.");
    let gt = load_sequences(gt_files, GROUND_TRUTH_MIN_CONFIDENCE)?;
    let submissions = load_sequences(submission_files, SUBMISSION_MIN_CONFIDENCE)?;

    let comparison = compare_sequences(&gt, &submissions, iou_threshold);
    tracing::debug!(complete = comparison.complete, "Sequence comparison finished");

    tracing::info!("Running metrics");
    let summary = compute_summary(&comparison)?;
    tracing::info!("Completed");
    Ok(summary)
}
