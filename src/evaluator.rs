//! End-to-end evaluation of one submission.

use crate::config::EvaluationConfig;
use crate::metrics::eval_mot_challenge;
use crate::report::{ErrorPayload, ReportPayload, ReportSink, ScorePayload};
use crate::score::{ScoreDetail, ScoreReport};
use crate::submission::{
    extract_archive, ground_truth_files, match_submission, ExtractedResults, SubmissionError,
};
use crate::{Error, Result};

/// How an evaluation ended.
#[derive(Debug)]
pub enum Outcome {
    /// Metrics computed and the score report delivered
    Scored(ScoreReport),
    /// Structural validation failed and an error report was delivered
    Rejected(SubmissionError),
    /// `MOTA + MOTP <= 0`; logged, nothing delivered
    Degenerate { mota: f64, motp: f64 },
    /// Computation failed; logged, nothing delivered
    Failed(Error),
}

impl Outcome {
    /// The nine OVERALL metrics when the submission was scored.
    pub fn metrics(&self) -> Option<(f64, f64, f64, f64, f64, f64, f64, f64, f64)> {
        match self {
            Outcome::Scored(report) => Some(report.detail.as_tuple()),
            _ => None,
        }
    }
}

/// Runs validation, metrics, scoring and reporting for one submission.
pub struct Evaluator<S: ReportSink> {
    config: EvaluationConfig,
    sink: S,
}

impl<S: ReportSink> Evaluator<S> {
    pub fn new(config: EvaluationConfig, sink: S) -> Self {
        Self { config, sink }
    }

    /// Evaluate the submission. At most one report is delivered.
    pub fn run(&self) -> Outcome {
        match self.evaluate() {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Evaluation failed: {}", e);
                Outcome::Failed(e)
            }
        }
    }

    fn evaluate(&self) -> Result<Outcome> {
        let config = &self.config;
        tracing::info!("submit_dir is {}", config.submit_dir().display());
        tracing::info!("Read standard from {}", config.ground_truth_dir().display());
        tracing::info!("Read user submit file from {}", config.result_archive.display());
        tracing::info!("Save scores to: {}", config.callback_url);

        if !config.expected_archive().exists() {
            return Ok(self.reject(SubmissionError::MissingArchive));
        }

        // Removes results/ on every path from here on
        let results = ExtractedResults::new(config.results_dir());
        extract_archive(&config.result_archive, config.submit_dir(), config.profile)?;

        if !results.path().is_dir() {
            return Ok(self.reject(SubmissionError::MissingResultsDir));
        }

        let gt_files = ground_truth_files(&config.ground_truth_dir())?;
        let ts_files = match match_submission(&gt_files, results.path()) {
            Ok(files) => files,
            Err(e) => return Ok(self.reject(e)),
        };
        tracing::info!(
            "Found {} groundtruths and {} test files.",
            gt_files.len(),
            ts_files.len()
        );

        let summary = eval_mot_challenge(&gt_files, &ts_files, config.iou_threshold)?;
        println!("{}", summary.render());

        let detail = ScoreDetail::from_summary(&summary);
        let Some(report) = ScoreReport::from_detail(detail) else {
            tracing::error!("MOTA + MOTP <= 0, wrong.");
            return Ok(Outcome::Degenerate {
                mota: detail.mota,
                motp: detail.motp,
            });
        };

        let payload = ScorePayload::new(&report, &config.union_key);
        tracing::info!(
            score = %payload.score,
            mota = %payload.mota,
            motp = %payload.motp,
            status = payload.status,
            "Reporting score"
        );
        self.deliver(payload.into());
        Ok(Outcome::Scored(report))
    }

    fn reject(&self, error: SubmissionError) -> Outcome {
        tracing::info!("{}", error);
        self.deliver(ErrorPayload::new(error.to_string(), &self.config.union_key).into());
        Outcome::Rejected(error)
    }

    fn deliver(&self, payload: ReportPayload) {
        if let Err(e) = self.sink.deliver(&payload) {
            tracing::warn!("Failed to deliver report: {}", e);
        }
    }
}
