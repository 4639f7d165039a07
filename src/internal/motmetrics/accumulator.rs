//! MOT metrics accumulator for tracking evaluation.
//!
//! Ported from py-motmetrics.
//! License: MIT (Christoph Heindl, Jack Valmadre)

use nalgebra::DMatrix;
use std::collections::{BTreeMap, HashMap};

use crate::internal::scipy::linear_sum_assignment;

/// Coverage ratio at or above which a ground truth track is mostly tracked.
pub const MOSTLY_TRACKED_RATIO: f64 = 0.8;

/// Coverage ratio below which a ground truth track is mostly lost.
pub const MOSTLY_LOST_RATIO: f64 = 0.2;

/// Event types for MOT evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Match,
    Switch,
    Miss,
    FalsePositive,
}

/// Single tracking event
#[derive(Debug, Clone)]
pub struct Event {
    pub frame_id: i32,
    pub event_type: EventType,
    pub object_id: Option<i32>,
    pub hypothesis_id: Option<i32>,
    pub distance: Option<f64>,
}

/// Track lifecycle for computing MT/ML/PT and fragmentation metrics.
///
/// Records, for each frame a ground truth object appears in, whether it was
/// tracked (matched or switched) or missed.
#[derive(Debug, Clone, Default)]
pub struct TrackLifecycle {
    states: Vec<bool>,
}

impl TrackLifecycle {
    /// Record one frame of presence.
    pub fn push(&mut self, tracked: bool) {
        self.states.push(tracked);
    }

    /// Number of frames the object was present in ground truth.
    pub fn detected_frames(&self) -> usize {
        self.states.len()
    }

    /// Number of frames the object was tracked.
    pub fn tracked_frames(&self) -> usize {
        self.states.iter().filter(|&&s| s).count()
    }

    /// Calculate coverage ratio (tracked_frames / detected_frames).
    pub fn coverage(&self) -> f64 {
        if self.states.is_empty() {
            0.0
        } else {
            self.tracked_frames() as f64 / self.detected_frames() as f64
        }
    }

    /// Number of tracked -> missed transitions between the first and last
    /// tracked frame.
    pub fn fragmentations(&self) -> usize {
        let first = match self.states.iter().position(|&s| s) {
            Some(idx) => idx,
            None => return 0,
        };
        let last = self.states.iter().rposition(|&s| s).unwrap_or(first);

        self.states[first..=last]
            .windows(2)
            .filter(|pair| pair[0] && !pair[1])
            .count()
    }
}

/// Accumulator for MOT metrics computation.
///
/// Collects tracking events across frames for later metric computation.
/// Frames must be fed in increasing order.
#[derive(Debug, Default)]
pub struct MOTAccumulator {
    events: Vec<Event>,
    /// object_id -> hypothesis_id of its most recent match
    last_match: HashMap<i32, i32>,
    lifecycles: BTreeMap<i32, TrackLifecycle>,
    hypothesis_frames: BTreeMap<i32, usize>,
    /// (object_id, hypothesis_id) -> frames where the pair was within threshold
    id_overlaps: HashMap<(i32, i32), usize>,
    num_frames: usize,
}

impl MOTAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far, in frame order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Update the accumulator with one frame.
    ///
    /// Correspondences from earlier frames that are still within threshold are
    /// kept first; the remaining objects and hypotheses are assigned with the
    /// Hungarian algorithm. A new match for an object that was previously
    /// matched to a different hypothesis counts as a switch.
    ///
    /// # Arguments
    /// * `frame_id` - Current frame number
    /// * `object_ids` - Ground truth object IDs present in this frame
    /// * `hypothesis_ids` - Predicted track IDs present in this frame
    /// * `distances` - Distance matrix (objects x hypotheses), NaN for invalid pairs
    pub fn update(
        &mut self,
        frame_id: i32,
        object_ids: &[i32],
        hypothesis_ids: &[i32],
        distances: &DMatrix<f64>,
    ) {
        self.num_frames += 1;

        for &hyp_id in hypothesis_ids {
            *self.hypothesis_frames.entry(hyp_id).or_default() += 1;
        }
        for (i, &obj_id) in object_ids.iter().enumerate() {
            for (j, &hyp_id) in hypothesis_ids.iter().enumerate() {
                if distances[(i, j)].is_finite() {
                    *self.id_overlaps.entry((obj_id, hyp_id)).or_default() += 1;
                }
            }
        }

        let mut object_matched = vec![false; object_ids.len()];
        let mut hypothesis_matched = vec![false; hypothesis_ids.len()];
        let mut tracked: Vec<(usize, usize, EventType)> = Vec::new();

        // Re-establish correspondences from previous frames
        for (i, &obj_id) in object_ids.iter().enumerate() {
            let Some(&prev_hyp) = self.last_match.get(&obj_id) else {
                continue;
            };
            let candidate = hypothesis_ids
                .iter()
                .enumerate()
                .find(|&(j, &hyp_id)| !hypothesis_matched[j] && hyp_id == prev_hyp);
            if let Some((j, _)) = candidate {
                if distances[(i, j)].is_finite() {
                    object_matched[i] = true;
                    hypothesis_matched[j] = true;
                    tracked.push((i, j, EventType::Match));
                }
            }
        }

        // Assign the rest
        let open_objects: Vec<usize> = (0..object_ids.len()).filter(|&i| !object_matched[i]).collect();
        let open_hypotheses: Vec<usize> = (0..hypothesis_ids.len())
            .filter(|&j| !hypothesis_matched[j])
            .collect();
        let sub_distances = DMatrix::from_fn(open_objects.len(), open_hypotheses.len(), |r, c| {
            distances[(open_objects[r], open_hypotheses[c])]
        });

        for assignment in linear_sum_assignment(&sub_distances).assignments {
            let i = open_objects[assignment.row_idx];
            let j = open_hypotheses[assignment.col_idx];
            let obj_id = object_ids[i];
            let hyp_id = hypothesis_ids[j];

            let event_type = match self.last_match.get(&obj_id) {
                Some(&prev_hyp) if prev_hyp != hyp_id => EventType::Switch,
                _ => EventType::Match,
            };

            object_matched[i] = true;
            hypothesis_matched[j] = true;
            tracked.push((i, j, event_type));
        }

        for (i, j, event_type) in tracked {
            let obj_id = object_ids[i];
            let hyp_id = hypothesis_ids[j];
            self.last_match.insert(obj_id, hyp_id);
            self.events.push(Event {
                frame_id,
                event_type,
                object_id: Some(obj_id),
                hypothesis_id: Some(hyp_id),
                distance: Some(distances[(i, j)]),
            });
        }

        // Misses (unmatched ground truth)
        for (i, &obj_id) in object_ids.iter().enumerate() {
            self.lifecycles.entry(obj_id).or_default().push(object_matched[i]);
            if !object_matched[i] {
                self.events.push(Event {
                    frame_id,
                    event_type: EventType::Miss,
                    object_id: Some(obj_id),
                    hypothesis_id: None,
                    distance: None,
                });
            }
        }

        // False positives (unmatched hypotheses)
        for (j, &hyp_id) in hypothesis_ids.iter().enumerate() {
            if !hypothesis_matched[j] {
                self.events.push(Event {
                    frame_id,
                    event_type: EventType::FalsePositive,
                    object_id: None,
                    hypothesis_id: Some(hyp_id),
                    distance: None,
                });
            }
        }
    }

    /// Compute summary metrics.
    pub fn compute_metrics(&self) -> MOTMetrics {
        let mut metrics = MOTMetrics {
            num_frames: self.num_frames,
            num_unique_objects: self.lifecycles.len(),
            ..MOTMetrics::default()
        };

        for event in &self.events {
            match event.event_type {
                EventType::Match => metrics.num_matches += 1,
                EventType::Switch => metrics.num_switches += 1,
                EventType::Miss => metrics.num_misses += 1,
                EventType::FalsePositive => metrics.num_false_positives += 1,
            }
            if let Some(d) = event.distance {
                metrics.total_distance += d;
            }
        }

        for lifecycle in self.lifecycles.values() {
            metrics.num_objects += lifecycle.detected_frames();
            metrics.num_fragmentations += lifecycle.fragmentations();

            let coverage = lifecycle.coverage();
            if coverage >= MOSTLY_TRACKED_RATIO {
                metrics.mostly_tracked += 1;
            } else if coverage < MOSTLY_LOST_RATIO {
                metrics.mostly_lost += 1;
            } else {
                metrics.partially_tracked += 1;
            }
        }
        metrics.num_predictions = self.hypothesis_frames.values().sum();
        metrics.idtp = self.global_id_true_positives();

        metrics
    }

    /// Frames covered by the best one-to-one mapping of object IDs to
    /// hypothesis IDs over the whole sequence.
    fn global_id_true_positives(&self) -> usize {
        let object_ids: Vec<i32> = self.lifecycles.keys().copied().collect();
        let hypothesis_ids: Vec<i32> = self.hypothesis_frames.keys().copied().collect();

        let overlap = |r: usize, c: usize| -> usize {
            self.id_overlaps
                .get(&(object_ids[r], hypothesis_ids[c]))
                .copied()
                .unwrap_or(0)
        };
        let cost = DMatrix::from_fn(object_ids.len(), hypothesis_ids.len(), |r, c| {
            -(overlap(r, c) as f64)
        });

        linear_sum_assignment(&cost)
            .assignments
            .iter()
            .map(|a| overlap(a.row_idx, a.col_idx))
            .sum()
    }
}

/// Summary metrics from MOT evaluation.
///
/// Count fields add up across sequences; ratios are derived from the counts,
/// so an aggregate of several sequences is computed with [`MOTMetrics::merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MOTMetrics {
    pub num_frames: usize,
    pub num_objects: usize,
    pub num_predictions: usize,
    pub num_unique_objects: usize,
    pub num_matches: usize,
    pub num_switches: usize,
    pub num_false_positives: usize,
    pub num_misses: usize,
    pub num_fragmentations: usize,
    pub mostly_tracked: usize,
    pub partially_tracked: usize,
    pub mostly_lost: usize,
    pub total_distance: f64,
    pub idtp: usize,
}

impl MOTMetrics {
    /// Sum the counts of several sequences.
    pub fn merge<'a>(parts: impl IntoIterator<Item = &'a MOTMetrics>) -> Self {
        parts.into_iter().fold(Self::default(), |acc, m| Self {
            num_frames: acc.num_frames + m.num_frames,
            num_objects: acc.num_objects + m.num_objects,
            num_predictions: acc.num_predictions + m.num_predictions,
            num_unique_objects: acc.num_unique_objects + m.num_unique_objects,
            num_matches: acc.num_matches + m.num_matches,
            num_switches: acc.num_switches + m.num_switches,
            num_false_positives: acc.num_false_positives + m.num_false_positives,
            num_misses: acc.num_misses + m.num_misses,
            num_fragmentations: acc.num_fragmentations + m.num_fragmentations,
            mostly_tracked: acc.mostly_tracked + m.mostly_tracked,
            partially_tracked: acc.partially_tracked + m.partially_tracked,
            mostly_lost: acc.mostly_lost + m.mostly_lost,
            total_distance: acc.total_distance + m.total_distance,
            idtp: acc.idtp + m.idtp,
        })
    }

    /// Matches including switches.
    pub fn num_detections(&self) -> usize {
        self.num_matches + self.num_switches
    }

    /// Predictions outside the global ID mapping. Saturates when an ID
    /// repeats within a frame.
    pub fn idfp(&self) -> usize {
        self.num_predictions.saturating_sub(self.idtp)
    }

    pub fn idfn(&self) -> usize {
        self.num_objects.saturating_sub(self.idtp)
    }

    /// MOTA = 1 - (FN + FP + IDSW) / num_objects
    pub fn mota(&self) -> f64 {
        1.0 - ratio(
            self.num_misses + self.num_false_positives + self.num_switches,
            self.num_objects,
        )
    }

    /// Mean `1 - IoU` distance of all detections.
    pub fn motp(&self) -> f64 {
        match self.num_detections() {
            0 => f64::NAN,
            n => self.total_distance / n as f64,
        }
    }

    pub fn recall(&self) -> f64 {
        ratio(self.num_detections(), self.num_objects)
    }

    pub fn precision(&self) -> f64 {
        ratio(self.num_detections(), self.num_detections() + self.num_false_positives)
    }

    pub fn idp(&self) -> f64 {
        ratio(self.idtp, self.num_predictions)
    }

    pub fn idr(&self) -> f64 {
        ratio(self.idtp, self.num_objects)
    }

    pub fn idf1(&self) -> f64 {
        ratio(2 * self.idtp, self.num_objects + self.num_predictions)
    }
}

/// Quotient that is NaN for an empty denominator.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        f64::NAN
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single(distance: f64) -> DMatrix<f64> {
        DMatrix::from_row_slice(1, 1, &[distance])
    }

    // ===== Basic Accumulator Tests =====

    #[test]
    fn test_accumulator_new() {
        let metrics = MOTAccumulator::new().compute_metrics();

        assert_eq!(metrics.num_matches, 0);
        assert_eq!(metrics.num_misses, 0);
        assert_eq!(metrics.num_false_positives, 0);
        assert_eq!(metrics.num_switches, 0);
        assert!(metrics.mota().is_nan());
    }

    #[test]
    fn test_accumulator_only_predictions() {
        let mut acc = MOTAccumulator::new();
        acc.update(1, &[], &[1, 2, 3], &DMatrix::zeros(0, 3));

        let metrics = acc.compute_metrics();
        assert_eq!(metrics.num_false_positives, 3);
        assert_eq!(metrics.num_predictions, 3);
        assert_eq!(metrics.num_matches, 0);
    }

    #[test]
    fn test_accumulator_only_gt() {
        let mut acc = MOTAccumulator::new();
        acc.update(1, &[1, 2], &[], &DMatrix::zeros(2, 0));

        let metrics = acc.compute_metrics();
        assert_eq!(metrics.num_misses, 2);
        assert_eq!(metrics.num_objects, 2);
        assert_relative_eq!(metrics.mota(), 0.0, epsilon = 1e-10);
        assert!(metrics.motp().is_nan());
    }

    #[test]
    fn test_accumulator_partial_match() {
        let mut acc = MOTAccumulator::new();
        let distances = DMatrix::from_row_slice(2, 2, &[
            0.1, f64::NAN,
            f64::NAN, f64::NAN,
        ]);
        acc.update(1, &[1, 2], &[1, 2], &distances);

        let metrics = acc.compute_metrics();
        assert_eq!(metrics.num_matches, 1);
        assert_eq!(metrics.num_misses, 1);
        assert_eq!(metrics.num_false_positives, 1);
    }

    // ===== ID Switch Detection Tests =====

    #[test]
    fn test_accumulator_id_switch() {
        let mut acc = MOTAccumulator::new();
        acc.update(1, &[1], &[1], &single(0.0));
        acc.update(2, &[1], &[2], &single(0.0));

        let metrics = acc.compute_metrics();
        assert_eq!(metrics.num_switches, 1);
        assert_eq!(metrics.num_matches, 1);
        assert_eq!(metrics.num_detections(), 2);

        let switch = &acc.events()[1];
        assert_eq!(switch.event_type, EventType::Switch);
        assert_eq!(switch.frame_id, 2);
        assert_eq!((switch.object_id, switch.hypothesis_id), (Some(1), Some(2)));
    }

    #[test]
    fn test_accumulator_switch_after_gap() {
        let mut acc = MOTAccumulator::new();
        acc.update(1, &[1], &[1], &single(0.0));
        acc.update(2, &[1], &[], &DMatrix::zeros(1, 0));
        acc.update(3, &[1], &[2], &single(0.0));

        let metrics = acc.compute_metrics();
        assert_eq!(metrics.num_switches, 1);
        assert_eq!(metrics.num_misses, 1);
    }

    #[test]
    fn test_accumulator_keeps_previous_correspondence() {
        let mut acc = MOTAccumulator::new();
        acc.update(1, &[1], &[7], &single(0.3));

        // Hypothesis 8 fits better, but 7 is still within threshold
        let distances = DMatrix::from_row_slice(1, 2, &[0.4, 0.0]);
        acc.update(2, &[1], &[7, 8], &distances);

        let metrics = acc.compute_metrics();
        assert_eq!(metrics.num_switches, 0);
        assert_eq!(metrics.num_matches, 2);
        assert_eq!(metrics.num_false_positives, 1);
    }

    // ===== Metric Computation Tests =====

    #[test]
    fn test_metrics_mota() {
        let mut acc = MOTAccumulator::new();

        // 8 matches, 1 miss, 1 FP on 9 GT objects
        for frame in 0..8 {
            acc.update(frame, &[1], &[1], &single(0.1));
        }
        acc.update(8, &[1], &[], &DMatrix::zeros(1, 0));
        acc.update(9, &[], &[2], &DMatrix::zeros(0, 1));

        let metrics = acc.compute_metrics();
        assert_relative_eq!(metrics.mota(), 1.0 - 2.0 / 9.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.motp(), 0.1, epsilon = 1e-10);
    }

    #[test]
    fn test_metrics_mostly_tracked_and_lost() {
        let mut acc = MOTAccumulator::new();
        let distances = DMatrix::from_row_slice(2, 1, &[0.0, f64::NAN]);

        // Object 1 always tracked, object 2 never
        for frame in 0..5 {
            acc.update(frame, &[1, 2], &[1], &distances);
        }

        let metrics = acc.compute_metrics();
        assert_eq!(metrics.mostly_tracked, 1);
        assert_eq!(metrics.mostly_lost, 1);
        assert_eq!(metrics.partially_tracked, 0);
        assert_eq!(metrics.num_unique_objects, 2);
    }

    #[test]
    fn test_metrics_fragmentations() {
        let mut acc = MOTAccumulator::new();
        let miss = DMatrix::zeros(1, 0);

        // miss, track, miss, track, miss: one interruption between tracked frames
        acc.update(0, &[1], &[], &miss);
        acc.update(1, &[1], &[1], &single(0.0));
        acc.update(2, &[1], &[], &miss);
        acc.update(3, &[1], &[1], &single(0.0));
        acc.update(4, &[1], &[], &miss);

        let metrics = acc.compute_metrics();
        assert_eq!(metrics.num_fragmentations, 1);
    }

    #[test]
    fn test_metrics_idf1_uses_best_global_mapping() {
        let mut acc = MOTAccumulator::new();

        // Object 1 follows hypothesis 1 for 3 frames, then hypothesis 2 for 1
        for frame in 0..3 {
            acc.update(frame, &[1], &[1], &single(0.0));
        }
        acc.update(3, &[1], &[2], &single(0.0));

        let metrics = acc.compute_metrics();
        assert_eq!(metrics.idtp, 3);
        assert_eq!(metrics.idfn(), 1);
        assert_eq!(metrics.idfp(), 1);
        assert_relative_eq!(metrics.idf1(), 6.0 / 8.0, epsilon = 1e-10);
    }

    #[test]
    fn test_metrics_repeated_id_in_frame() {
        let mut acc = MOTAccumulator::new();
        let distances = DMatrix::from_row_slice(2, 1, &[0.0, 0.0]);
        acc.update(0, &[1, 1], &[5], &distances);

        let metrics = acc.compute_metrics();
        assert_eq!(metrics.num_predictions, 1);
        assert_eq!(metrics.idtp, 2);
        assert_eq!(metrics.idfp(), 0);
        assert_eq!(metrics.idfn(), 0);
    }

    #[test]
    fn test_metrics_merge() {
        let mut a = MOTAccumulator::new();
        a.update(0, &[1], &[1], &single(0.2));
        let mut b = MOTAccumulator::new();
        b.update(0, &[1], &[], &DMatrix::zeros(1, 0));

        let merged = MOTMetrics::merge([&a.compute_metrics(), &b.compute_metrics()]);
        assert_eq!(merged.num_objects, 2);
        assert_eq!(merged.num_matches, 1);
        assert_eq!(merged.num_misses, 1);
        assert_relative_eq!(merged.mota(), 0.5, epsilon = 1e-10);
        assert_relative_eq!(merged.motp(), 0.2, epsilon = 1e-10);
    }

    #[test]
    fn test_lifecycle_fragmentations_ignore_edges() {
        let mut lifecycle = TrackLifecycle::default();
        for tracked in [false, true, true, false, false, true, false] {
            lifecycle.push(tracked);
        }
        assert_eq!(lifecycle.fragmentations(), 1);
        assert_relative_eq!(lifecycle.coverage(), 3.0 / 7.0, epsilon = 1e-10);
    }
}
