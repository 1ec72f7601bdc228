mod config;
mod logging;
mod render;

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use pst_model::ReportContext;
use tracing::info;

use crate::config::UserConfig;

#[derive(Debug, Parser)]
#[command(name = "pst-reports", version, about = "Generate power reports from PST stress-test results")]
struct Cli {
    /// Root directory containing the test run folders
    #[arg(short, long)]
    dir: PathBuf,

    /// First free-text report header line
    #[arg(short = '1', long)]
    header1: Option<String>,

    /// Second free-text report header line
    #[arg(short = '2', long)]
    header2: Option<String>,

    /// Harness version to report, overriding the one found in the traces
    #[arg(long)]
    pst_version: Option<String>,

    /// Include the active energy drain rate column
    #[arg(long)]
    show_active_energy: bool,

    /// Output file path (defaults to PowerReport.<format> under the root)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let user_config = UserConfig::load();

    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| user_config.log_level.clone());
    let _log_guard = logging::init(&level, user_config.log_to_file);

    let mut ctx = ReportContext::new(cli.dir.clone());
    ctx.header1 = cli.header1.unwrap_or_default();
    ctx.header2 = cli.header2.unwrap_or_default();
    ctx.pst_version = cli.pst_version.unwrap_or_default();
    ctx.show_active_energy = cli.show_active_energy || user_config.show_active_energy;

    let processed = pst_extract::run_pipeline(&mut ctx)
        .wrap_err_with(|| format!("failed to process {}", cli.dir.display()))?;
    if processed == 0 {
        return Err(eyre!(
            "no run folders produced records under {}",
            cli.dir.display()
        ));
    }
    info!(processed, "extraction complete");

    let output_path = cli.output.unwrap_or_else(|| {
        user_config
            .output_dir
            .clone()
            .unwrap_or_else(|| cli.dir.clone())
            .join(format!("PowerReport.{}", cli.format.extension()))
    });

    let rendered = match cli.format {
        Format::Csv => render::render_csv(&ctx),
        Format::Json => render::render_json(&ctx)?,
    };
    fs::write(&output_path, rendered)
        .wrap_err_with(|| format!("failed to write {}", output_path.display()))?;

    println!(
        "Report written: {} ({} records)",
        output_path.display(),
        processed
    );
    Ok(())
}
