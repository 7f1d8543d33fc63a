use std::io::Write;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use pdf2md_core::{BatchEvent, PlannedOutput, RunSummary};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print a real-time progress event.
pub fn print_event(w: &mut dyn Write, event: &BatchEvent, color: ColorMode) -> std::io::Result<()> {
    match event {
        BatchEvent::NoInput { input_dir } => {
            writeln!(w, "No PDFs found in {}", input_dir.display())?;
        }
        BatchEvent::Discovered {
            input_dir,
            documents,
        } => {
            writeln!(
                w,
                "Found {} PDF(s) in {}:",
                documents.len(),
                input_dir.display()
            )?;
            for doc in documents {
                writeln!(w, "  - {}", file_name(doc))?;
            }
            writeln!(w, "Starting conversion of {} document(s)...", documents.len())?;
        }
        BatchEvent::Processing { index, path, .. } => {
            if color.enabled() {
                writeln!(
                    w,
                    "{} Processing {}: {}",
                    "[convert]".cyan(),
                    index + 1,
                    file_name(path)
                )?;
            } else {
                writeln!(w, "[convert] Processing {}: {}", index + 1, file_name(path))?;
            }
        }
        BatchEvent::PageFailed {
            path,
            page,
            message,
            ..
        } => {
            let msg = format!(
                "Failed to extract text from page {} of {}: {}",
                page,
                file_name(path),
                message
            );
            if color.enabled() {
                writeln!(w, "{} {}", "[warning]".yellow(), msg)?;
            } else {
                writeln!(w, "[warning] {}", msg)?;
            }
        }
        BatchEvent::Exported { stem, output, .. } => {
            if color.enabled() {
                writeln!(
                    w,
                    "{} {}: Successfully extracted text to {}",
                    "[export]".green(),
                    stem,
                    output.display()
                )?;
            } else {
                writeln!(
                    w,
                    "[export] {}: Successfully extracted text to {}",
                    stem,
                    output.display()
                )?;
            }
        }
        BatchEvent::DocumentFailed { path, message, .. } => {
            if color.enabled() {
                writeln!(
                    w,
                    "{} Conversion failed for: {} - {}",
                    "[error]".red(),
                    file_name(path),
                    message
                )?;
            } else {
                writeln!(
                    w,
                    "[error] Conversion failed for: {} - {}",
                    file_name(path),
                    message
                )?;
            }
        }
    }
    Ok(())
}

/// Print the final totals line.
pub fn print_summary(
    w: &mut dyn Write,
    summary: &RunSummary,
    color: ColorMode,
) -> std::io::Result<()> {
    let elapsed = summary.elapsed.as_secs_f64();
    if summary.total == 0 {
        writeln!(w, "Nothing to convert. Elapsed: {:.2} seconds.", elapsed)?;
        return Ok(());
    }

    writeln!(w)?;
    if color.enabled() {
        let failed = format!("Failed: {}", summary.failed);
        let failed = if summary.failed > 0 {
            failed.red().to_string()
        } else {
            failed.dimmed().to_string()
        };
        writeln!(
            w,
            "Processed {} document(s). {}, {}. Elapsed: {:.2} seconds.",
            summary.total.bold(),
            format!("Successful: {}", summary.succeeded).green(),
            failed,
            elapsed
        )?;
    } else {
        writeln!(
            w,
            "Processed {} document(s). Successful: {}, Failed: {}. Elapsed: {:.2} seconds.",
            summary.total, summary.succeeded, summary.failed, elapsed
        )?;
    }
    Ok(())
}

/// Print the output plan for `--dry-run`.
pub fn print_plan(
    w: &mut dyn Write,
    input_dir: &Path,
    plans: &[PlannedOutput],
    color: ColorMode,
) -> std::io::Result<()> {
    if plans.is_empty() {
        writeln!(w, "No PDFs found in {}", input_dir.display())?;
        return Ok(());
    }

    if color.enabled() {
        writeln!(
            w,
            "{} {} PDF(s) in {}\n",
            "DRY RUN:".bold().cyan(),
            plans.len(),
            input_dir.display()
        )?;
    } else {
        writeln!(w, "DRY RUN: {} PDF(s) in {}\n", plans.len(), input_dir.display())?;
    }

    for plan in plans {
        match &plan.target {
            Ok(output) => {
                writeln!(w, "  {} -> {}", file_name(&plan.source), output.display())?;
            }
            Err(e) => {
                let skipped = format!("SKIPPED ({})", e);
                if color.enabled() {
                    writeln!(w, "  {} -> {}", file_name(&plan.source), skipped.red())?;
                } else {
                    writeln!(w, "  {} -> {}", file_name(&plan.source), skipped)?;
                }
            }
        }
    }
    Ok(())
}

/// Document-level progress bar on stderr, advanced as documents finish.
///
/// Hidden when disabled; indicatif also hides it when stderr is not a
/// terminal.
pub fn document_bar(enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner:.green} [{bar:40.green/dim}] {pos}/{len} {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// Update the progress bar for an event.
pub fn advance_bar(bar: &ProgressBar, event: &BatchEvent) {
    match event {
        BatchEvent::Discovered { documents, .. } => {
            bar.set_length(documents.len() as u64);
        }
        BatchEvent::Processing { path, .. } => {
            bar.set_message(file_name(path));
        }
        BatchEvent::Exported { .. } | BatchEvent::DocumentFailed { .. } => {
            bar.inc(1);
        }
        BatchEvent::NoInput { .. } | BatchEvent::PageFailed { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use pdf2md_core::{CollisionPolicy, DEFAULT_OUTPUT_SUFFIX, plan_outputs};

    const PLAIN: ColorMode = ColorMode(false);

    fn render(event: BatchEvent) -> String {
        let mut buf = Vec::new();
        print_event(&mut buf, &event, PLAIN).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn discovered_lists_files() {
        let out = render(BatchEvent::Discovered {
            input_dir: PathBuf::from("reports"),
            documents: vec![PathBuf::from("reports/a.pdf"), PathBuf::from("reports/b.pdf")],
        });
        assert_eq!(
            out,
            "Found 2 PDF(s) in reports:\n  - a.pdf\n  - b.pdf\nStarting conversion of 2 document(s)...\n"
        );
    }

    #[test]
    fn processing_is_one_based() {
        let out = render(BatchEvent::Processing {
            index: 0,
            total: 3,
            path: PathBuf::from("reports/a.pdf"),
        });
        assert_eq!(out, "[convert] Processing 1: a.pdf\n");
    }

    #[test]
    fn page_warning_names_the_page() {
        let out = render(BatchEvent::PageFailed {
            index: 0,
            path: PathBuf::from("reports/a.pdf"),
            page: 2,
            message: "bad stream".into(),
        });
        assert_eq!(
            out,
            "[warning] Failed to extract text from page 2 of a.pdf: bad stream\n"
        );
    }

    #[test]
    fn document_failure_line() {
        let out = render(BatchEvent::DocumentFailed {
            index: 1,
            total: 2,
            path: PathBuf::from("reports/b.pdf"),
            message: "not a PDF".into(),
        });
        assert_eq!(out, "[error] Conversion failed for: b.pdf - not a PDF\n");
    }

    #[test]
    fn summary_line() {
        let summary = RunSummary {
            total: 3,
            succeeded: 2,
            failed: 1,
            elapsed: Duration::from_millis(1250),
            ..RunSummary::default()
        };
        let mut buf = Vec::new();
        print_summary(&mut buf, &summary, PLAIN).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "\nProcessed 3 document(s). Successful: 2, Failed: 1. Elapsed: 1.25 seconds.\n"
        );
    }

    #[test]
    fn plan_marks_collisions() {
        let sources = vec![PathBuf::from("in/A.pdf"), PathBuf::from("in/a.pdf")];
        let plans = plan_outputs(
            &sources,
            Path::new("out"),
            DEFAULT_OUTPUT_SUFFIX,
            CollisionPolicy::Fail,
        );
        let mut buf = Vec::new();
        print_plan(&mut buf, Path::new("in"), &plans, PLAIN).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("DRY RUN: 2 PDF(s) in in\n"));
        assert!(out.contains("  A.pdf -> out/A-with-no-image-refs.md\n"));
        assert!(out.contains("  a.pdf -> SKIPPED (output file"));
    }
}
