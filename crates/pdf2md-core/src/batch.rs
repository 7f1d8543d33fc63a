use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::convert::convert_to;
use crate::discover::discover;
use crate::naming::{PlannedOutput, plan_outputs};
use crate::{
    BatchError, BatchEvent, Config, DocumentOutcome, DocumentStatus, PdfBackend, RunSummary,
};

/// Sequential batch converter: discovers PDFs in one directory and writes
/// one Markdown file per document into another.
pub struct BatchConverter<'a> {
    backend: &'a dyn PdfBackend,
    config: Config,
}

impl<'a> BatchConverter<'a> {
    pub fn new(backend: &'a dyn PdfBackend, config: Config) -> Self {
        Self { backend, config }
    }

    /// Resolve an input directory name against the configured base directory.
    /// Absolute paths are returned unchanged.
    pub fn resolve_input(&self, input_dir: &Path) -> PathBuf {
        self.config.base_dir.join(input_dir)
    }

    /// Discover documents and decide their output files without converting.
    pub fn plan(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<Vec<PlannedOutput>, BatchError> {
        let input_dir = self.resolve_input(input_dir);
        let sources = discover(&input_dir).map_err(|source| BatchError::Discover {
            path: input_dir.clone(),
            source,
        })?;
        Ok(plan_outputs(
            &sources,
            output_dir,
            &self.config.output_suffix,
            self.config.on_collision,
        ))
    }

    /// Convert every PDF in `input_dir` into `output_dir`.
    ///
    /// Documents are converted one at a time, in sorted order, each exactly
    /// once. A failing document is counted and the run moves on; only a
    /// failure to create `output_dir` or to list `input_dir` ends the run.
    pub fn run(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        progress: impl Fn(BatchEvent),
    ) -> Result<RunSummary, BatchError> {
        let start = Instant::now();
        let resolved_input = self.resolve_input(input_dir);

        let mut summary = RunSummary {
            input_dir: resolved_input.clone(),
            output_dir: output_dir.to_path_buf(),
            ..RunSummary::default()
        };

        std::fs::create_dir_all(output_dir).map_err(|source| BatchError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let plans = self.plan(input_dir, output_dir)?;
        if plans.is_empty() {
            tracing::info!(dir = %resolved_input.display(), "no PDFs found");
            progress(BatchEvent::NoInput {
                input_dir: resolved_input,
            });
            summary.elapsed = start.elapsed();
            return Ok(summary);
        }

        let total = plans.len();
        tracing::info!(dir = %resolved_input.display(), count = total, "discovered PDFs");
        progress(BatchEvent::Discovered {
            input_dir: resolved_input,
            documents: plans.iter().map(|p| p.source.clone()).collect(),
        });

        for (index, plan) in plans.into_iter().enumerate() {
            progress(BatchEvent::Processing {
                index,
                total,
                path: plan.source.clone(),
            });

            let result = plan.target.and_then(|output| {
                convert_to(self.backend, &plan.source, &plan.stem, &output, &self.config)
            });

            let status = match result {
                Ok(report) => {
                    for failure in &report.page_failures {
                        progress(BatchEvent::PageFailed {
                            index,
                            path: plan.source.clone(),
                            page: failure.page,
                            message: failure.message.clone(),
                        });
                    }
                    progress(BatchEvent::Exported {
                        index,
                        total,
                        stem: report.stem.clone(),
                        output: report.output.clone(),
                    });
                    DocumentStatus::Succeeded(report)
                }
                Err(e) => {
                    let reason = e.to_string();
                    progress(BatchEvent::DocumentFailed {
                        index,
                        total,
                        path: plan.source.clone(),
                        message: reason.clone(),
                    });
                    DocumentStatus::Failed { reason }
                }
            };

            summary.record(DocumentOutcome {
                source: plan.source,
                status,
            });
        }

        summary.elapsed = start.elapsed();
        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            elapsed_secs = summary.elapsed.as_secs_f64(),
            "run complete"
        );
        Ok(summary)
    }
}

/// Convert every PDF in `input_dir` into `output_dir` using `backend`.
///
/// Convenience wrapper around [`BatchConverter::run`].
pub fn run(
    backend: &dyn PdfBackend,
    input_dir: &Path,
    output_dir: &Path,
    config: Config,
    progress: impl Fn(BatchEvent),
) -> Result<RunSummary, BatchError> {
    BatchConverter::new(backend, config).run(input_dir, output_dir, progress)
}
