use std::cell::RefCell;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use pdf2md_core::config_file::{self, ConfigFile};
use pdf2md_core::{BatchConverter, CollisionPolicy, Config};
use pdf2md_mupdf::MupdfBackend;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod output;

use output::ColorMode;

/// PDF to Markdown - Extract the text of every PDF in a folder into Markdown files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Folder containing the PDFs, relative to the base directory
    #[arg(default_value = "reports")]
    input_dir: PathBuf,

    /// Folder to write the Markdown files into
    #[arg(default_value = "out")]
    output_dir: PathBuf,

    /// Directory that relative input folders are resolved against
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Path to a TOML config file (overrides the default config locations)
    #[arg(long)]
    config: Option<PathBuf>,

    /// What to do when two PDFs map to the same output file: suffix or fail
    #[arg(long)]
    on_collision: Option<CollisionPolicy>,

    /// Text appended to the PDF stem to form the output file name
    #[arg(long)]
    output_suffix: Option<String>,

    /// Replace typographic ligatures (ﬁ, ﬂ, ...) with plain letters
    #[arg(long)]
    expand_ligatures: bool,

    /// Fraction of page height at the top to drop as header (0 disables)
    #[arg(long)]
    header_exclusion: Option<f32>,

    /// Fraction of page height at the bottom to drop as footer (0 disables)
    #[arg(long)]
    footer_exclusion: Option<f32>,

    /// Dry run: list the PDFs and their output files without converting
    #[arg(long)]
    dry_run: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Log to stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    let file = match cli.config {
        Some(ref path) => config_file::load_strict(path)?,
        None => config_file::load_config(),
    };
    let config = resolve_config(&cli, &file);
    let backend = build_backend(&cli, &file);
    tracing::debug!(?config, ?backend, "resolved configuration");

    let color = ColorMode(!cli.no_color && std::env::var_os("NO_COLOR").is_none());
    let converter = BatchConverter::new(&backend, config);

    if cli.dry_run {
        let plans = converter.plan(&cli.input_dir, &cli.output_dir)?;
        let mut stdout = std::io::stdout();
        output::print_plan(
            &mut stdout,
            &converter.resolve_input(&cli.input_dir),
            &plans,
            color,
        )?;
        return Ok(());
    }

    let bar = output::document_bar(!cli.no_progress);
    let writer: RefCell<Box<dyn Write>> = RefCell::new(Box::new(std::io::stdout()));
    let progress = |event: pdf2md_core::BatchEvent| {
        output::advance_bar(&bar, &event);
        bar.suspend(|| {
            let mut w = writer.borrow_mut();
            let _ = output::print_event(&mut **w, &event, color);
            let _ = w.flush();
        });
    };

    let summary = converter.run(&cli.input_dir, &cli.output_dir, progress)?;
    bar.finish_and_clear();

    let mut w = writer.into_inner();
    output::print_summary(&mut *w, &summary, color)?;

    Ok(())
}

/// Resolve configuration: CLI flags > env vars > config file > defaults.
fn resolve_config(cli: &Cli, file: &ConfigFile) -> Config {
    let mut config = file.apply_to(Config::default());

    if let Some(base_dir) = std::env::var_os("PDF2MD_BASE_DIR") {
        config.base_dir = PathBuf::from(base_dir);
    }
    if let Ok(suffix) = std::env::var("PDF2MD_OUTPUT_SUFFIX") {
        config.output_suffix = suffix;
    }

    if let Some(ref base_dir) = cli.base_dir {
        config.base_dir = base_dir.clone();
    }
    if let Some(ref suffix) = cli.output_suffix {
        config.output_suffix = suffix.clone();
    }
    if let Some(policy) = cli.on_collision {
        config.on_collision = policy;
    }
    if cli.expand_ligatures {
        config.expand_ligatures = true;
    }
    config
}

fn build_backend(cli: &Cli, file: &ConfigFile) -> MupdfBackend {
    let extraction = file.extraction.clone().unwrap_or_default();
    let header = cli
        .header_exclusion
        .or(extraction.header_exclusion_ratio)
        .unwrap_or(0.0);
    let footer = cli
        .footer_exclusion
        .or(extraction.footer_exclusion_ratio)
        .unwrap_or(0.0);
    MupdfBackend::new()
        .with_header_exclusion(header)
        .with_footer_exclusion(footer)
}

/// Install the tracing subscriber.
///
/// Stderr logging is off unless `-v` or `RUST_LOG` asks for it, since the
/// console report already shows warnings and failures. `--log-file` gets
/// `info` and above by default.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = std::env::var("RUST_LOG").ok();
    let default_level = match verbose {
        0 if log_file.is_some() => "info",
        0 => "off",
        1 => "info",
        _ => "debug",
    };
    let filter = match env_filter {
        Some(ref directives) => EnvFilter::new(directives),
        None => EnvFilter::new(default_level),
    };

    let stderr_layer = (verbose > 0 || env_filter.is_some()).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
