//! # mot-eval - MOTChallenge submission scoring
//!
//! Evaluates a multi-object-tracking submission against ground truth and
//! reports the result to a callback URL.
//!
//! ## Workflow
//!
//! 1. Check that `results.zip` exists next to the submitted archive
//! 2. Extract the archive and check that every ground-truth sequence has a
//!    like-named file under `results/`
//! 3. Compute MOTChallenge metrics (MOTA, MOTP, IDF1, MT, ML, FP, FN, IDs, Frag)
//! 4. Combine MOTA and MOTP into a single score
//! 5. POST either a score payload or an error payload as JSON
//! 6. Remove the extracted `results/` directory
//!
//! ## Example
//!
//! ```rust,ignore
//! use mot_eval::{Evaluator, EvaluationConfig, HttpReporter, Profile};
//!
//! let config = EvaluationConfig::new(
//!     "/data/gt", "/data/submit/42/results.zip", "http://scores/api", "GigaMOT", "key-42",
//! ).with_profile(Profile::Mot);
//! let reporter = HttpReporter::new(&config.callback_url, config.http_timeout)?;
//! let outcome = Evaluator::new(config, reporter).run();
//! ```

// Internal modules (ports of scipy and motmetrics)
pub(crate) mod internal;

// Public modules
pub mod config;
pub mod metrics;
pub mod report;
pub mod score;
pub mod submission;
pub mod logging;
pub mod evaluator;

// Re-exports for convenience
pub use config::{EvaluationConfig, Profile};
pub use evaluator::{Evaluator, Outcome};
pub use metrics::{Metric, MetricsSummary, TrackTable};
pub use report::{HttpReporter, ReportPayload, ReportSink};
pub use score::{ScoreDetail, ScoreReport};
pub use submission::SubmissionError;

// Error types
pub use crate::error::{Error, Result};

mod error {
    use std::path::PathBuf;
    use thiserror::Error;

    /// Errors that can occur while computing a score.
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Malformed sequence file {path}:{line}: {reason}")]
        MalformedSequence {
            path: PathBuf,
            line: usize,
            reason: String,
        },

        #[error("Metrics evaluation error: {0}")]
        MetricsError(String),

        #[error("Archive error: {0}")]
        ArchiveError(#[from] zip::result::ZipError),

        #[error("Report delivery error: {0}")]
        ReportError(#[from] reqwest::Error),

        #[error("Serialization error: {0}")]
        SerializationError(#[from] serde_json::Error),

        #[error("Logging setup error: {0}")]
        LoggingError(#[from] tracing_subscriber::util::TryInitError),

        #[error("IO error: {0}")]
        IoError(#[from] std::io::Error),
    }

    /// Result type for mot-eval operations
    pub type Result<T> = std::result::Result<T, Error>;
}
