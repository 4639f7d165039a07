//! SciPy functions port.
//!
//! Ported from:
//! - scipy.optimize
//!
//! License: BSD 3-Clause

mod optimize;

pub use optimize::*;
