use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod backend;
pub mod batch;
pub mod config_file;
pub mod convert;
pub mod discover;
pub mod markdown;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod naming;
pub mod text;

// Re-export for convenience
pub use backend::{BackendError, PageText, PdfBackend};
pub use batch::{BatchConverter, run};
pub use convert::convert_one;
pub use discover::discover;
pub use naming::{PlannedOutput, plan_outputs};

/// Suffix appended to the document stem to form the output file name.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "-with-no-image-refs";

/// What to do when two documents would be written to the same output file.
///
/// Names are compared case-insensitively, since on case-insensitive
/// filesystems `Report.md` and `report.md` are the same file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Later documents get a numeric suffix: `<stem>-2<suffix>.md`, `<stem>-3<suffix>.md`, ...
    #[default]
    Suffix,
    /// Later documents fail without writing anything.
    Fail,
}

impl std::str::FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "suffix" => Ok(CollisionPolicy::Suffix),
            "fail" => Ok(CollisionPolicy::Fail),
            other => Err(format!(
                "unknown collision policy '{other}' (expected 'suffix' or 'fail')"
            )),
        }
    }
}

/// Configuration for a conversion run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Relative input directory names are resolved against this directory.
    pub base_dir: PathBuf,
    pub output_suffix: String,
    pub on_collision: CollisionPolicy,
    /// Replace typographic ligatures (U+FB00..U+FB06) in extracted text.
    pub expand_ligatures: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            on_collision: CollisionPolicy::default(),
            expand_ligatures: false,
        }
    }
}

/// A page that failed to extract and was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// 1-based page number.
    pub page: usize,
    pub message: String,
}

/// Result of converting a single document successfully.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub source: PathBuf,
    pub stem: String,
    pub output: PathBuf,
    pub pages_total: usize,
    /// Pages that produced a `## Page <n>` section.
    pub pages_written: usize,
    /// Pages that extracted but held only whitespace.
    pub pages_blank: usize,
    pub page_failures: Vec<PageFailure>,
}

/// Final state of one document within a run.
#[derive(Debug, Clone)]
pub enum DocumentStatus {
    Succeeded(DocumentReport),
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub source: PathBuf,
    pub status: DocumentStatus,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, DocumentStatus::Succeeded(_))
    }
}

/// Summary of a complete run. `elapsed` is the only timing measurement.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
    pub documents: Vec<DocumentOutcome>,
}

impl RunSummary {
    /// Fold a document outcome into the counters.
    pub fn record(&mut self, outcome: DocumentOutcome) {
        self.total += 1;
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.documents.push(outcome);
    }
}

/// Progress events emitted during a run.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// Discovery found nothing; the run ends here.
    NoInput { input_dir: PathBuf },
    Discovered {
        input_dir: PathBuf,
        documents: Vec<PathBuf>,
    },
    Processing {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    PageFailed {
        index: usize,
        path: PathBuf,
        page: usize,
        message: String,
    },
    Exported {
        index: usize,
        total: usize,
        stem: String,
        output: PathBuf,
    },
    DocumentFailed {
        index: usize,
        total: usize,
        path: PathBuf,
        message: String,
    },
}

/// Document-level conversion failure.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("cannot derive a file stem from {}", .path.display())]
    NoStem { path: PathBuf },
    #[error("failed to read {}: {source}", .path.display())]
    Backend {
        path: PathBuf,
        source: BackendError,
    },
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("output file {} is already taken by {}", .output.display(), .other.display())]
    Collision { output: PathBuf, other: PathBuf },
}

/// Run-level failure. These end the run; per-document failures never do.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to list {}: {source}", .path.display())]
    Discover {
        path: PathBuf,
        source: std::io::Error,
    },
}
