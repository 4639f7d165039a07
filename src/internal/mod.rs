//! Internal modules ported from external libraries.
//!
//! These modules contain code adapted from:
//! - scipy: Linear sum assignment
//! - motmetrics: MOTChallenge accumulation and IoU distances

pub mod scipy;
pub mod motmetrics;
