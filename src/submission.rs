//! Submission archive handling and structure validation.

use crate::config::Profile;
use crate::Result;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A submission failed structural validation. The message is what the
/// callback receives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Cannot find results.zip file!")]
    MissingArchive,

    #[error("Cannot find the results folder after unzipping the results.zip file!")]
    MissingResultsDir,

    #[error("Cannot find {0} in results/ folder!")]
    MissingSequence(String),
}

/// Extract the entries of `archive` accepted by `profile` into `dst_dir`.
///
/// A file that is not a zip archive is logged and left alone. Entries whose
/// names would escape `dst_dir` are skipped. Returns the number of files
/// written.
pub fn extract_archive(archive: &Path, dst_dir: &Path, profile: Profile) -> Result<usize> {
    let opened = File::open(archive)
        .map_err(zip::result::ZipError::from)
        .and_then(zip::ZipArchive::new);
    let mut zip = match opened {
        Ok(zip) => zip,
        Err(e) => {
            tracing::warn!("This is not zip: {} ({})", archive.display(), e);
            return Ok(0);
        }
    };

    let mut extracted = 0;
    for idx in 0..zip.len() {
        let mut entry = zip.by_index(idx)?;
        let name = entry.name().to_string();
        if !profile.accepts_entry(&name) {
            continue;
        }
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!("Skipping archive entry outside the extraction directory: {}", name);
            continue;
        };

        let out_path = dst_dir.join(relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        extracted += 1;
    }

    tracing::debug!("Extracted {} files from {}", extracted, archive.display());
    Ok(extracted)
}

/// Ground truth `*.txt` files of a directory, sorted by name.
///
/// A missing directory yields no files.
pub fn ground_truth_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Pair every ground truth file with the like-named file in `results_dir`.
///
/// Fails on the first ground truth file without a submission.
pub fn match_submission(
    gt_files: &[PathBuf],
    results_dir: &Path,
) -> std::result::Result<Vec<PathBuf>, SubmissionError> {
    gt_files
        .iter()
        .map(|gt_file| {
            let file_name = gt_file.file_name().unwrap_or_default();
            let submitted = results_dir.join(file_name);
            if submitted.exists() {
                Ok(submitted)
            } else {
                Err(SubmissionError::MissingSequence(
                    file_name.to_string_lossy().into_owned(),
                ))
            }
        })
        .collect()
}

/// Removes the extracted results directory when dropped.
#[derive(Debug)]
pub struct ExtractedResults {
    dir: PathBuf,
}

impl ExtractedResults {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

impl Drop for ExtractedResults {
    fn drop(&mut self) {
        if !self.dir.exists() {
            return;
        }
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => tracing::debug!("Removed {}", self.dir.display()),
            Err(e) => tracing::warn!("Failed to remove {}: {}", self.dir.display(), e),
        }
    }
}
