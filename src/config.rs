//! Evaluation configuration.

use crate::metrics::DEFAULT_IOU_THRESHOLD;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default timeout of the score callback request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Challenge variant. Both share the workflow and differ in how the
/// submitted archive is unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Profile {
    /// Only `.txt` entries of the archive are extracted
    #[default]
    Mot,
    /// Every entry of the archive is extracted
    Tracking,
}

impl Profile {
    /// Whether an archive entry should be extracted.
    pub fn accepts_entry(self, name: &str) -> bool {
        match self {
            Profile::Mot => name.ends_with(".txt"),
            Profile::Tracking => true,
        }
    }
}

/// Configuration of one evaluation run.
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    /// Root holding `{challenge}/mot_anno_full/*.txt`
    pub gt_root: PathBuf,
    /// Submitted archive; its parent directory is the working directory
    pub result_archive: PathBuf,
    /// URL the report is POSTed to
    pub callback_url: String,
    pub challenge: String,
    /// Opaque key echoed in every report
    pub union_key: String,
    pub profile: Profile,
    /// Maximum `1 - IoU` distance of a match
    pub iou_threshold: f64,
    pub http_timeout: Duration,
}

impl EvaluationConfig {
    /// Create a configuration with default profile, threshold and timeout.
    pub fn new(
        gt_root: impl Into<PathBuf>,
        result_archive: impl Into<PathBuf>,
        callback_url: impl Into<String>,
        challenge: impl Into<String>,
        union_key: impl Into<String>,
    ) -> Self {
        Self {
            gt_root: gt_root.into(),
            result_archive: result_archive.into(),
            callback_url: callback_url.into(),
            challenge: challenge.into(),
            union_key: union_key.into(),
            profile: Profile::default(),
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f64) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_http_timeout(mut self, http_timeout: Duration) -> Self {
        self.http_timeout = http_timeout;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(Error::InvalidConfig(format!(
                "iou_threshold must be within [0, 1], got {}",
                self.iou_threshold
            )));
        }
        if self.http_timeout.is_zero() {
            return Err(Error::InvalidConfig("http_timeout must be positive".to_string()));
        }
        if self.result_archive.file_name().is_none() {
            return Err(Error::InvalidConfig(format!(
                "result archive path has no file name: {}",
                self.result_archive.display()
            )));
        }
        Ok(())
    }

    /// Directory containing the submitted archive.
    pub fn submit_dir(&self) -> &Path {
        self.result_archive.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Directory of ground truth sequence files.
    pub fn ground_truth_dir(&self) -> PathBuf {
        self.gt_root.join(&self.challenge).join("mot_anno_full")
    }

    /// Archive whose presence is required before extraction.
    pub fn expected_archive(&self) -> PathBuf {
        self.submit_dir().join("results.zip")
    }

    /// Directory the archive is expected to unpack into.
    pub fn results_dir(&self) -> PathBuf {
        self.submit_dir().join("results")
    }

    /// Append-mode run log.
    pub fn log_file(&self) -> PathBuf {
        self.submit_dir().join("evaluate.log")
    }
}
