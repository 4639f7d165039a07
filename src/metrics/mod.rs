//! MOTChallenge metrics evaluation module.
//!
//! This module provides tools for evaluating multi-object tracking results
//! in the MOTChallenge format. It includes:
//!
//! - `TrackTable` - Parse MOT15-2D sequence files
//! - `compare_sequences` - Build one accumulator per sequence
//! - `MetricsSummary` - Per-sequence and OVERALL metrics (MOTA, MOTP, IDF1, etc.)

mod evaluation;
mod sequence_file;
mod summary;

pub use crate::internal::motmetrics::{Event, EventType, MOTAccumulator, MOTMetrics};
pub use evaluation::{
    compare_sequences, compare_to_groundtruth, compute_summary, eval_mot_challenge,
    load_sequences, SequenceComparison, DEFAULT_IOU_THRESHOLD, GROUND_TRUTH_MIN_CONFIDENCE,
    SUBMISSION_MIN_CONFIDENCE,
};
pub use sequence_file::{TrackRow, TrackTable};
pub use summary::{Metric, MetricsSummary};
