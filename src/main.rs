//! mot-eval CLI
//!
//! Scores a MOTChallenge submission and reports the result to a callback URL.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use mot_eval::config::DEFAULT_HTTP_TIMEOUT;
use mot_eval::metrics::DEFAULT_IOU_THRESHOLD;
use mot_eval::{logging, EvaluationConfig, Evaluator, HttpReporter, Outcome, Profile};

#[derive(Parser, Debug)]
#[command(name = "mot-eval")]
#[command(author, version, about = "Score a MOTChallenge tracking submission")]
struct Cli {
    /// Ground truth root; sequences are read from <GT_ROOT>/<CHALLENGE>/mot_anno_full
    gt_root: PathBuf,

    /// Submitted results archive
    result_root: PathBuf,

    /// URL the JSON report is POSTed to
    callback_url: String,

    /// Challenge name
    challenge: String,

    /// Correlation key echoed in the report
    union_key: String,

    /// Challenge variant
    #[arg(long, value_enum, default_value_t = Profile::Mot, env = "MOT_EVAL_PROFILE")]
    profile: Profile,

    /// Timeout of the callback request in seconds
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT.as_secs(), env = "MOT_EVAL_HTTP_TIMEOUT_SECS")]
    http_timeout_secs: u64,

    /// Maximum 1 - IoU distance of a match
    #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD, env = "MOT_EVAL_IOU_THRESHOLD")]
    iou_threshold: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = EvaluationConfig::new(
        cli.gt_root,
        cli.result_root,
        cli.callback_url,
        cli.challenge,
        cli.union_key,
    )
    .with_profile(cli.profile)
    .with_iou_threshold(cli.iou_threshold)
    .with_http_timeout(Duration::from_secs(cli.http_timeout_secs));
    config.validate()?;

    logging::init(&config.log_file())
        .with_context(|| format!("cannot open log file {}", config.log_file().display()))?;

    let reporter = HttpReporter::new(&config.callback_url, config.http_timeout)
        .context("failed to build HTTP client")?;
    let outcome = Evaluator::new(config, reporter).run();

    match &outcome {
        Outcome::Scored(report) => {
            tracing::info!("Score: {:.5}", report.score);
            if let Some(metrics) = outcome.metrics() {
                tracing::info!("(MOTA, MOTP, IDF1, MT, ML, FP, FN, IDs, Frag) = {:?}", metrics);
            }
        }
        Outcome::Rejected(e) => tracing::info!("Submission rejected: {}", e),
        Outcome::Degenerate { mota, motp } => {
            tracing::info!("No score reported (MOTA = {}, MOTP = {})", mota, motp)
        }
        Outcome::Failed(e) => tracing::info!("No score reported: {}", e),
    }

    Ok(())
}
