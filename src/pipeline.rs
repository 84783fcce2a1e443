// Batch driver: .gph files in, one image per graph out

use crate::canvas::PlottersProvider;
use crate::layout::default_engine;
use crate::parser;
use crate::render::{render, RenderOutcome};
use crate::tier::{base_name, select_tier};
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// File names looked up inside `input_dir`
    #[serde(default = "default_files")]
    pub files: Vec<String>,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub render: RenderOptions,
}

fn default_input_dir() -> PathBuf { PathBuf::from("submission_graphs") }
fn default_output_dir() -> PathBuf { PathBuf::from("visualizations") }
fn default_files() -> Vec<String> {
    vec!["small.gph".to_string(), "medium.gph".to_string(), "large.gph".to_string()]
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            files: default_files(),
            format: OutputFormat::default(),
            render: RenderOptions::default(),
        }
    }
}

impl BatchConfig {
    /// Load a JSON config; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }
}

/// Per-file results of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub rendered: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Title drawn above each figure
pub fn graph_title(name: &str) -> String {
    format!("Learned Bayesian Network Structure for '{}'", name)
}

/// `<output_dir>/<file stem>.<format extension>`
pub fn output_path(output_dir: &Path, file_name: &str, format: OutputFormat) -> PathBuf {
    output_dir.join(Path::new(file_name).with_extension(format.extension()))
}

/// Parse one `.gph` file and render it to `output`
pub fn visualize_file(input: &Path, output: &Path, options: &RenderOptions) -> Result<RenderOutcome> {
    let graph = parser::parse(input)?;
    if graph.is_empty() {
        warn!("No nodes found in {}. Skipping.", input.display());
        return Ok(RenderOutcome::Skipped);
    }

    let name = base_name(input);
    let tier = select_tier(&name);

    render(
        &graph,
        &tier,
        &graph_title(&name),
        output,
        &default_engine(),
        &PlottersProvider,
        options,
    )
}

/// Render every configured file. A file that is missing or fails to render
/// is logged and recorded; the rest of the batch still runs.
pub fn run_batch(config: &BatchConfig) -> Result<BatchReport> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let mut report = BatchReport::default();
    for file_name in &config.files {
        let input = config.input_dir.join(file_name);
        let output = output_path(&config.output_dir, file_name, config.format);

        if !input.exists() {
            error!("Could not find file {}", input.display());
            report.missing.push(input);
            continue;
        }

        match visualize_file(&input, &output, &config.render) {
            Ok(RenderOutcome::Rendered { layout }) => {
                info!(nodes = layout.len(), "Saved {}", output.display());
                report.rendered.push(output);
            }
            Ok(RenderOutcome::Skipped) => {
                report.skipped.push(input);
            }
            Err(err) => {
                error!("Failed to visualize {}: {:#}", input.display(), err);
                report.failed.push((input, err));
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = LogBuffer;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_empty_graph_warning_names_input_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("blank.gph");
        let output = dir.path().join("blank.png");
        fs::write(&input, "\nnot-an-edge\n").unwrap();

        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let outcome = tracing::subscriber::with_default(subscriber, || {
            visualize_file(&input, &output, &RenderOptions::default())
        })
        .unwrap();

        assert_eq!(outcome, RenderOutcome::Skipped);
        assert!(!output.exists());
        let logged = logs.contents();
        assert!(logged.contains("No nodes found in"), "{}", logged);
        assert!(logged.contains("blank.gph"), "{}", logged);
    }

    #[test]
    fn test_title() {
        assert_eq!(
            graph_title("small"),
            "Learned Bayesian Network Structure for 'small'"
        );
    }

    #[test]
    fn test_output_path_swaps_extension() {
        assert_eq!(
            output_path(Path::new("out"), "medium.gph", OutputFormat::Svg),
            PathBuf::from("out/medium.svg")
        );
        assert_eq!(
            output_path(Path::new("out"), "large", OutputFormat::Png),
            PathBuf::from("out/large.png")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: BatchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.input_dir, PathBuf::from("submission_graphs"));
        assert_eq!(config.output_dir, PathBuf::from("visualizations"));
        assert_eq!(config.files, vec!["small.gph", "medium.gph", "large.gph"]);
        assert_eq!(config.format, OutputFormat::Png);
        assert_eq!(config.render.dpi, 150);
    }

    #[test]
    fn test_config_overrides() {
        let config: BatchConfig = serde_json::from_str(
            r#"{"files": ["a.gph"], "format": "svg", "render": {"dpi": 96}}"#,
        )
        .unwrap();
        assert_eq!(config.files, vec!["a.gph"]);
        assert_eq!(config.format, OutputFormat::Svg);
        assert_eq!(config.render.dpi, 96);
        assert!(config.render.tight);
    }
}
