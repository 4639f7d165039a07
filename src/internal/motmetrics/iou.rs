//! IoU (Intersection over Union) distances for MOT evaluation.

use nalgebra::DMatrix;

/// Compute IoU matrix between two sets of bounding boxes.
///
/// # Arguments
/// * `boxes_a` - First set of boxes, shape (n, 4), format [x, y, width, height]
/// * `boxes_b` - Second set of boxes, shape (m, 4), format [x, y, width, height]
///
/// # Returns
/// IoU matrix of shape (n, m)
pub fn iou_matrix(boxes_a: &DMatrix<f64>, boxes_b: &DMatrix<f64>) -> DMatrix<f64> {
    let n = boxes_a.nrows();
    let m = boxes_b.nrows();

    DMatrix::from_fn(n, m, |i, j| {
        let (a_x1, a_y1) = (boxes_a[(i, 0)], boxes_a[(i, 1)]);
        let (a_x2, a_y2) = (a_x1 + boxes_a[(i, 2)], a_y1 + boxes_a[(i, 3)]);
        let (b_x1, b_y1) = (boxes_b[(j, 0)], boxes_b[(j, 1)]);
        let (b_x2, b_y2) = (b_x1 + boxes_b[(j, 2)], b_y1 + boxes_b[(j, 3)]);

        let inter_w = (a_x2.min(b_x2) - a_x1.max(b_x1)).max(0.0);
        let inter_h = (a_y2.min(b_y2) - a_y1.max(b_y1)).max(0.0);
        let inter_area = inter_w * inter_h;

        let a_area = boxes_a[(i, 2)] * boxes_a[(i, 3)];
        let b_area = boxes_b[(j, 2)] * boxes_b[(j, 3)];
        let union_area = a_area + b_area - inter_area;

        if union_area > 0.0 {
            inter_area / union_area
        } else {
            0.0
        }
    })
}

/// Compute the `1 - IoU` distance matrix used by the accumulator.
///
/// Pairs whose distance exceeds `max_distance` are forbidden and set to NaN,
/// so with `max_distance = 0.5` only boxes overlapping with IoU >= 0.5 can match.
pub fn iou_distance_matrix(
    gt_boxes: &DMatrix<f64>,
    hyp_boxes: &DMatrix<f64>,
    max_distance: f64,
) -> DMatrix<f64> {
    iou_matrix(gt_boxes, hyp_boxes).map(|iou| {
        let distance = 1.0 - iou;
        if distance > max_distance {
            f64::NAN
        } else {
            distance
        }
    })
}
