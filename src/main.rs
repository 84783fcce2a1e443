use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gphviz::pipeline::{run_batch, BatchConfig};
use gphviz::OutputFormat;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Png,
    Svg,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Png => OutputFormat::Png,
            FormatArg::Svg => OutputFormat::Svg,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "gphviz")]
#[command(about = "Render .gph edge-list graphs as layout diagrams", long_about = None)]
struct Args {
    /// Graph files to render, relative to the input directory
    /// (default: small.gph medium.gph large.gph)
    files: Vec<String>,

    /// JSON config file; command-line flags take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the .gph files
    #[arg(short, long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    /// Directory the images are written to (created if missing)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Image format for the output files
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Output resolution in dots per inch
    #[arg(long)]
    dpi: Option<u32>,
}

impl Args {
    fn into_config(self) -> Result<BatchConfig> {
        let mut config = match &self.config {
            Some(path) => BatchConfig::load(path)?,
            None => BatchConfig::default(),
        };
        if !self.files.is_empty() {
            config.files = self.files;
        }
        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(format) = self.format {
            config.format = format.into();
        }
        if let Some(dpi) = self.dpi {
            config.render.dpi = dpi;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Args::parse().into_config()?;
    let report = run_batch(&config).context("Batch run failed")?;

    info!(
        rendered = report.rendered.len(),
        skipped = report.skipped.len(),
        missing = report.missing.len(),
        failed = report.failed.len(),
        "done"
    );

    if report.has_failures() {
        anyhow::bail!("{} file(s) failed to render", report.failed.len());
    }
    Ok(())
}
