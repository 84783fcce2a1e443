// Drawing surface used by the renderer

use crate::backend;
use crate::layout::Point;
use crate::scene::{DrawCommand, EdgeStyle, LabelStyle, NodeStyle, Scene, Title};
use crate::tier::FigureSize;
use crate::RenderOptions;
use anyhow::Result;
use std::path::Path;
use tracing::trace;

/// A figure being composed for one render call.
///
/// Dropping the canvas releases everything it holds.
pub trait Canvas {
    fn draw_nodes(&mut self, points: &[Point], style: &NodeStyle) -> Result<()>;

    fn draw_edges(&mut self, segments: &[(Point, Point)], style: &EdgeStyle) -> Result<()>;

    fn draw_labels(&mut self, labels: &[(String, Point)], style: &LabelStyle) -> Result<()>;

    fn set_title(&mut self, text: &str, size: f64);

    fn set_axis_visible(&mut self, visible: bool);

    /// Write the composed figure to `path`
    fn export(&mut self, path: &Path) -> Result<()>;
}

/// Creates a fresh canvas per render
pub trait CanvasProvider {
    type Canvas: Canvas;

    fn open(&self, figure: FigureSize, options: &RenderOptions) -> Result<Self::Canvas>;
}

/// Canvas that records a `Scene` and exports it through plotters
#[derive(Debug)]
pub struct SceneCanvas {
    scene: Scene,
    options: RenderOptions,
}

impl SceneCanvas {
    pub fn new(figure: FigureSize, options: &RenderOptions) -> Self {
        Self {
            scene: Scene::new(figure, options.dpi),
            options: options.clone(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

impl Canvas for SceneCanvas {
    fn draw_nodes(&mut self, points: &[Point], style: &NodeStyle) -> Result<()> {
        self.scene.commands.push(DrawCommand::DrawNodes {
            points: points.to_vec(),
            style: style.clone(),
        });
        Ok(())
    }

    fn draw_edges(&mut self, segments: &[(Point, Point)], style: &EdgeStyle) -> Result<()> {
        self.scene.commands.push(DrawCommand::DrawEdges {
            segments: segments.to_vec(),
            style: style.clone(),
        });
        Ok(())
    }

    fn draw_labels(&mut self, labels: &[(String, Point)], style: &LabelStyle) -> Result<()> {
        self.scene.commands.push(DrawCommand::DrawLabels {
            labels: labels.to_vec(),
            style: style.clone(),
        });
        Ok(())
    }

    fn set_title(&mut self, text: &str, size: f64) {
        self.scene.title = Some(Title {
            text: text.to_string(),
            size,
        });
    }

    fn set_axis_visible(&mut self, visible: bool) {
        self.scene.axis_visible = visible;
    }

    fn export(&mut self, path: &Path) -> Result<()> {
        backend::export(&self.scene, path, &self.options)
    }
}

impl Drop for SceneCanvas {
    fn drop(&mut self) {
        trace!(commands = self.scene.commands.len(), "releasing canvas");
    }
}

/// Provider for `SceneCanvas`
#[derive(Debug, Clone, Copy, Default)]
pub struct PlottersProvider;

impl CanvasProvider for PlottersProvider {
    type Canvas = SceneCanvas;

    fn open(&self, figure: FigureSize, options: &RenderOptions) -> Result<SceneCanvas> {
        if options.dpi == 0 {
            anyhow::bail!("dpi must be positive");
        }
        Ok(SceneCanvas::new(figure, options))
    }
}
