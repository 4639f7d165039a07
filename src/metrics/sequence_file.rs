//! Sequence file parser for the MOTChallenge 2D text format.

use crate::{Error, Result};
use nalgebra::DMatrix;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Minimum number of fields a row needs: frame, id and the four box values.
const REQUIRED_FIELDS: usize = 6;

/// One detection row of a sequence file.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRow {
    pub frame: i32,
    pub id: i32,
    /// Bounding box as [x, y, width, height] in image coordinates
    pub bbox: [f64; 4],
    pub confidence: f64,
}

/// Detections of one sequence grouped by frame.
///
/// Reads files in the MOT15-2D convention, one detection per line with
/// fields separated by commas or whitespace:
/// `frame,id,bb_left,bb_top,bb_width,bb_height,conf[,class,visibility,unused]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTable {
    frames: BTreeMap<i32, Vec<TrackRow>>,
}

impl TrackTable {
    /// Load a sequence file, keeping rows with `confidence >= min_confidence`.
    ///
    /// Rows without a confidence value never pass the filter.
    pub fn load<P: AsRef<Path>>(file_path: P, min_confidence: f64) -> Result<Self> {
        let path = file_path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::IoError(std::io::Error::new(
                e.kind(),
                format!("failed to open sequence file '{}': {}", path.display(), e),
            ))
        })?;

        Self::parse(BufReader::new(file), path, min_confidence)
    }

    /// Parse sequence rows from a reader. `path` is only used in error messages.
    pub fn parse<R: BufRead>(reader: R, path: &Path, min_confidence: f64) -> Result<Self> {
        let mut table = Self::default();

        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let malformed = |reason: String| Error::MalformedSequence {
                path: path.to_path_buf(),
                line: idx + 1,
                reason,
            };

            let fields: Vec<&str> = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < REQUIRED_FIELDS {
                return Err(malformed(format!(
                    "expected at least {} fields, got {}",
                    REQUIRED_FIELDS,
                    fields.len()
                )));
            }

            let mut values = [0.0; REQUIRED_FIELDS];
            for (value, field) in values.iter_mut().zip(&fields) {
                *value = field
                    .parse::<f64>()
                    .map_err(|_| malformed(format!("'{}' is not a number", field)))?;
            }
            let confidence: Option<f64> = match fields.get(REQUIRED_FIELDS) {
                Some(field) => Some(
                    field
                        .parse::<f64>()
                        .map_err(|_| malformed(format!("'{}' is not a number", field)))?,
                ),
                None => None,
            };

            let Some(confidence) = confidence.filter(|&c| c >= min_confidence) else {
                continue;
            };

            table.push(TrackRow {
                frame: integral(values[0]).ok_or_else(|| malformed("frame is not an integer".into()))?,
                id: integral(values[1]).ok_or_else(|| malformed("id is not an integer".into()))?,
                bbox: [values[2], values[3], values[4], values[5]],
                confidence,
            });
        }

        Ok(table)
    }

    /// Build a table from rows, e.g. for tests and benchmarks.
    pub fn from_rows(rows: impl IntoIterator<Item = TrackRow>) -> Self {
        let mut table = Self::default();
        for row in rows {
            table.push(row);
        }
        table
    }

    fn push(&mut self, row: TrackRow) {
        self.frames.entry(row.frame).or_default().push(row);
    }

    /// Frame numbers with at least one row, in increasing order.
    pub fn frame_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.frames.keys().copied()
    }

    /// Rows of one frame.
    pub fn frame(&self, frame: i32) -> &[TrackRow] {
        self.frames.get(&frame).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// IDs and (n x 4) box matrix of one frame.
    pub fn frame_boxes(&self, frame: i32) -> (Vec<i32>, DMatrix<f64>) {
        let rows = self.frame(frame);
        let ids = rows.iter().map(|r| r.id).collect();
        let boxes = DMatrix::from_fn(rows.len(), 4, |i, j| rows[i].bbox[j]);
        (ids, boxes)
    }

    /// Total number of rows.
    pub fn len(&self) -> usize {
        self.frames.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

fn integral(value: f64) -> Option<i32> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}
