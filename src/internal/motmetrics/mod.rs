//! MOTChallenge metrics port.
//!
//! Ported from py-motmetrics
//! License: MIT (Christoph Heindl, Jack Valmadre)

mod accumulator;
mod iou;

pub use accumulator::*;
pub use iou::*;
