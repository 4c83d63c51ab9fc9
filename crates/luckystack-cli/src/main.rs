mod progress;
mod summary;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use luckystack_core::io::SerDecoder;
use luckystack_core::pipeline::config::PipelineConfig;
use luckystack_core::pipeline::run_pipeline;
use luckystack_core::stack::CoaddMode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::progress::BarReporter;
use crate::summary::Level;

/// Malformed or invalid arguments.
const EXIT_USAGE: u8 = 1;
/// `--videos` missing.
const EXIT_MISSING_INPUT: u8 = 2;
/// Config file unreadable or parameters rejected.
const EXIT_CONFIG: u8 = 3;
/// At least one video could not be processed.
const EXIT_VIDEO_FAILED: u8 = 4;

#[derive(Parser)]
#[command(name = "luckystack", about = "Lucky imaging: coadd and sharpen telescope videos")]
#[command(version)]
struct Cli {
    /// Input video files (SER)
    #[arg(short = 'v', long, num_args = 1.., required_unless_present = "config")]
    videos: Vec<PathBuf>,

    /// Number of frames to combine (accepted, not yet applied)
    #[arg(short, long)]
    nframes: Option<usize>,

    /// Super-resolution factor applied to each frame before coadding [default: 2.3]
    #[arg(short, long)]
    superres: Option<f64>,

    /// Unsharp mask kernel size; even sizes are bumped to the next odd one [default: 7]
    #[arg(short, long)]
    kernel: Option<usize>,

    /// Unsharp mask blur sigma, also sets the strength to 2*sigma/100 [default: 25]
    #[arg(long)]
    sigma: Option<f64>,

    /// Sharpening strength independent of sigma
    #[arg(long)]
    amount: Option<f64>,

    /// Directory for result images [default: .]
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also write the unsharpened coadd as 16-bit TIFF
    #[arg(long)]
    save_coadd: bool,

    /// Split frame accumulation across threads
    #[arg(long)]
    parallel: bool,

    /// Pipeline config file (TOML); flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return parse_failure(e),
    };

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(ConfigFailure::MissingInput) => {
            return parse_failure(Cli::command().error(
                ErrorKind::MissingRequiredArgument,
                "no input videos: pass --videos or set `videos` in the config file",
            ));
        }
        Err(ConfigFailure::Invalid(e)) => {
            summary::print_status(Level::Error, &format!("{e:#}"));
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    summary::print_run_summary(&config);

    let reporter = BarReporter::new();
    let reports = match run_pipeline(&SerDecoder, &config, &reporter) {
        Ok(reports) => reports,
        Err(e) => {
            summary::print_status(Level::Error, &e.to_string());
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let mut failed = 0;
    for report in &reports {
        summary::print_video_report(report);
        if report.outcome.is_err() {
            failed += 1;
        }
    }

    if failed > 0 {
        summary::print_status(
            Level::Error,
            &format!("{failed} of {} video(s) failed", reports.len()),
        );
        ExitCode::from(EXIT_VIDEO_FAILED)
    } else {
        ExitCode::SUCCESS
    }
}

/// Exit class for a clap parse error.
fn parse_exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 0,
        ErrorKind::MissingRequiredArgument => EXIT_MISSING_INPUT,
        _ => EXIT_USAGE,
    }
}

fn parse_failure(e: clap::Error) -> ExitCode {
    let _ = e.print();
    ExitCode::from(parse_exit_code(e.kind()))
}

#[derive(Debug)]
enum ConfigFailure {
    /// Neither `--videos` nor the config file named an input.
    MissingInput,
    Invalid(anyhow::Error),
}

impl From<anyhow::Error> for ConfigFailure {
    fn from(e: anyhow::Error) -> Self {
        Self::Invalid(e)
    }
}

fn build_config(cli: &Cli) -> Result<PipelineConfig, ConfigFailure> {
    let mut config = if let Some(ref config_path) = cli.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid pipeline config")?
    } else {
        PipelineConfig::default()
    };

    if !cli.videos.is_empty() {
        config.videos = cli.videos.clone();
    }
    if cli.nframes.is_some() {
        config.nframes = cli.nframes;
    }
    if let Some(superres) = cli.superres {
        config.superres = superres;
    }
    if let Some(kernel) = cli.kernel {
        config.sharpen.kernel_size = kernel;
    }
    if let Some(sigma) = cli.sigma {
        config.sharpen.sigma = sigma;
    }
    if cli.amount.is_some() {
        config.sharpen.amount = cli.amount;
    }
    if let Some(ref dir) = cli.output_dir {
        config.output.dir = Some(dir.clone());
    }
    if cli.save_coadd {
        config.output.save_coadd = true;
    }
    if cli.parallel {
        config.coadd.mode = CoaddMode::Parallel;
    }

    if config.videos.is_empty() {
        return Err(ConfigFailure::MissingInput);
    }
    config.validate().context("Invalid pipeline parameters")?;
    debug!(?config, "Resolved pipeline config");
    Ok(config)
}
