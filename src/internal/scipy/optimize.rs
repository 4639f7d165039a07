//! SciPy optimization functions port.
//!
//! Ported from scipy.optimize.linear_sum_assignment
//! License: BSD 3-Clause (SciPy Developers)
#![allow(clippy::needless_range_loop)]

use nalgebra::DMatrix;

/// Represents a match between a row index and column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub row_idx: usize,
    pub col_idx: usize,
}

/// Result of linear sum assignment.
#[derive(Debug, Clone, Default)]
pub struct AssignmentResult {
    /// Valid assignments (row, col pairs), sorted by row
    pub assignments: Vec<Assignment>,
    /// Indices of rows that were not matched
    pub unmatched_rows: Vec<usize>,
    /// Indices of columns that were not matched
    pub unmatched_cols: Vec<usize>,
}

/// Solve the linear sum assignment problem using the Hungarian algorithm.
///
/// Non-finite entries (`NaN`, `inf`) mark forbidden pairs. The solver first
/// maximizes the number of allowed pairs, then minimizes their total cost;
/// forbidden pairs never appear in the result.
///
/// # Arguments
/// * `cost_matrix` - (rows x cols) cost matrix, any shape
///
/// # Returns
/// AssignmentResult with the chosen pairs and the unmatched rows and columns.
pub fn linear_sum_assignment(cost_matrix: &DMatrix<f64>) -> AssignmentResult {
    let num_rows = cost_matrix.nrows();
    let num_cols = cost_matrix.ncols();

    if num_rows == 0 || num_cols == 0 {
        return AssignmentResult {
            assignments: Vec::new(),
            unmatched_rows: (0..num_rows).collect(),
            unmatched_cols: (0..num_cols).collect(),
        };
    }

    let penalized = penalize_forbidden(cost_matrix);

    // The potential method below needs rows <= cols
    let row_to_col = if num_rows <= num_cols {
        hungarian(&penalized)
    } else {
        let col_to_row = hungarian(&penalized.transpose());
        let mut row_to_col = vec![None; num_rows];
        for (col, row) in col_to_row.into_iter().enumerate() {
            if let Some(row) = row {
                row_to_col[row] = Some(col);
            }
        }
        row_to_col
    };

    let mut assignments = Vec::new();
    let mut matched_rows = vec![false; num_rows];
    let mut matched_cols = vec![false; num_cols];

    for (row_idx, col) in row_to_col.into_iter().enumerate() {
        if let Some(col_idx) = col {
            if cost_matrix[(row_idx, col_idx)].is_finite() {
                assignments.push(Assignment { row_idx, col_idx });
                matched_rows[row_idx] = true;
                matched_cols[col_idx] = true;
            }
        }
    }

    AssignmentResult {
        assignments,
        unmatched_rows: (0..num_rows).filter(|&i| !matched_rows[i]).collect(),
        unmatched_cols: (0..num_cols).filter(|&j| !matched_cols[j]).collect(),
    }
}

/// Replace forbidden entries with a cost larger than any sum of allowed ones.
fn penalize_forbidden(cost_matrix: &DMatrix<f64>) -> DMatrix<f64> {
    let allowed_total: f64 = cost_matrix
        .iter()
        .filter(|c| c.is_finite())
        .map(|c| c.abs())
        .sum();
    let penalty = 2.0 * allowed_total + 1.0;

    cost_matrix.map(|c| if c.is_finite() { c } else { penalty })
}

/// Hungarian algorithm with row/column potentials, O(n^2 m).
///
/// Requires `rows <= cols` and finite costs. Returns `result[i] = Some(j)`
/// when row i is assigned to column j.
fn hungarian(cost: &DMatrix<f64>) -> Vec<Option<usize>> {
    let n = cost.nrows();
    let m = cost.ncols();

    // 1-indexed; column 0 is a virtual column holding the row being inserted
    let mut u = vec![0.0; n + 1];
    let mut v = vec![0.0; m + 1];
    let mut col_owner = vec![0usize; m + 1];
    let mut way = vec![0usize; m + 1];

    for row in 1..=n {
        col_owner[0] = row;
        let mut j0 = 0;
        let mut min_slack = vec![f64::INFINITY; m + 1];
        let mut used = vec![false; m + 1];

        loop {
            used[j0] = true;
            let i0 = col_owner[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0;

            for j in 1..=m {
                if used[j] {
                    continue;
                }
                let slack = cost[(i0 - 1, j - 1)] - u[i0] - v[j];
                if slack < min_slack[j] {
                    min_slack[j] = slack;
                    way[j] = j0;
                }
                if min_slack[j] < delta {
                    delta = min_slack[j];
                    j1 = j;
                }
            }

            for j in 0..=m {
                if used[j] {
                    u[col_owner[j]] += delta;
                    v[j] -= delta;
                } else {
                    min_slack[j] -= delta;
                }
            }

            j0 = j1;
            if col_owner[j0] == 0 {
                break;
            }
        }

        // Augment along the alternating path
        loop {
            let j1 = way[j0];
            col_owner[j0] = col_owner[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut result = vec![None; n];
    for j in 1..=m {
        if col_owner[j] != 0 {
            result[col_owner[j] - 1] = Some(j - 1);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_cost(cost: &DMatrix<f64>, result: &AssignmentResult) -> f64 {
        result
            .assignments
            .iter()
            .map(|a| cost[(a.row_idx, a.col_idx)])
            .sum()
    }

    #[test]
    fn test_linear_sum_assignment_basic_square() {
        let cost = DMatrix::from_row_slice(3, 3, &[
            4.0, 1.0, 3.0,
            2.0, 0.0, 5.0,
            3.0, 2.0, 2.0,
        ]);
        let result = linear_sum_assignment(&cost);

        assert_eq!(result.assignments.len(), 3);
        assert!(result.unmatched_rows.is_empty());
        assert!(result.unmatched_cols.is_empty());
        // Optimal: (0,1)=1 + (1,0)=2 + (2,2)=2 = 5
        assert!((total_cost(&cost, &result) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_linear_sum_assignment_beats_greedy() {
        // Greedy takes (0,0)=1 first and is forced into (1,1)=10
        let cost = DMatrix::from_row_slice(2, 2, &[
            1.0, 2.0,
            2.0, 10.0,
        ]);
        let result = linear_sum_assignment(&cost);
        assert!((total_cost(&cost, &result) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_linear_sum_assignment_rectangular_more_rows() {
        let cost = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let result = linear_sum_assignment(&cost);

        assert_eq!(result.assignments.len(), 2);
        assert_eq!(result.unmatched_rows.len(), 1);
        assert!(result.unmatched_cols.is_empty());
    }

    #[test]
    fn test_linear_sum_assignment_rectangular_more_cols() {
        let cost = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let result = linear_sum_assignment(&cost);

        assert_eq!(result.assignments.len(), 2);
        assert!(result.unmatched_rows.is_empty());
        assert_eq!(result.unmatched_cols.len(), 1);
    }

    #[test]
    fn test_linear_sum_assignment_empty_matrix() {
        let result = linear_sum_assignment(&DMatrix::zeros(0, 0));
        assert!(result.assignments.is_empty());
        assert!(result.unmatched_rows.is_empty());
        assert!(result.unmatched_cols.is_empty());

        let result = linear_sum_assignment(&DMatrix::zeros(2, 0));
        assert_eq!(result.unmatched_rows, vec![0, 1]);
    }

    #[test]
    fn test_linear_sum_assignment_forbidden_pairs() {
        let cost = DMatrix::from_row_slice(2, 2, &[
            0.1, f64::NAN,
            f64::INFINITY, f64::NAN,
        ]);
        let result = linear_sum_assignment(&cost);

        assert_eq!(result.assignments, vec![Assignment { row_idx: 0, col_idx: 0 }]);
        assert_eq!(result.unmatched_rows, vec![1]);
        assert_eq!(result.unmatched_cols, vec![1]);
    }

    #[test]
    fn test_linear_sum_assignment_prefers_more_pairs() {
        // Taking the cheap (0,0) pair would leave row 1 without a partner
        let cost = DMatrix::from_row_slice(2, 2, &[
            0.0, 0.4,
            0.3, f64::INFINITY,
        ]);
        let result = linear_sum_assignment(&cost);

        assert_eq!(result.assignments.len(), 2);
        assert!((total_cost(&cost, &result) - 0.7).abs() < 1e-10);
    }
}
