// Renderer: lays out a graph and draws it onto a canvas

use crate::canvas::{Canvas, CanvasProvider};
use crate::graph::Graph;
use crate::layout::{Layout, LayoutEngine, Point};
use crate::scene::{EdgeStyle, LabelStyle, NodeStyle, Rgb};
use crate::tier::RenderTier;
use crate::RenderOptions;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, warn};

/// What a render call did
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// The graph had no nodes; nothing was written
    Skipped,
    Rendered { layout: Layout },
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered { .. })
    }
}

/// Draw `graph` with the sizes from `tier` and export it to `output`.
///
/// An empty graph is skipped with a warning. The canvas only lives for the
/// duration of this call and is dropped on every return path.
pub fn render<E, P>(
    graph: &Graph,
    tier: &RenderTier,
    title: &str,
    output: &Path,
    engine: &E,
    provider: &P,
    options: &RenderOptions,
) -> Result<RenderOutcome>
where
    E: LayoutEngine,
    P: CanvasProvider,
{
    if graph.is_empty() {
        warn!(output = %output.display(), "No nodes found in graph. Skipping.");
        return Ok(RenderOutcome::Skipped);
    }

    let mut canvas = provider
        .open(tier.figure, options)
        .context("Failed to open canvas")?;

    let layout = engine.layout(graph).context("Failed to compute layout")?;
    debug!(
        engine = engine.name(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "layout computed"
    );

    draw_graph(&mut canvas, graph, &layout, tier)?;
    canvas.set_title(title, options.title_size);
    canvas.set_axis_visible(false);
    canvas
        .export(output)
        .with_context(|| format!("Failed to export {}", output.display()))?;

    Ok(RenderOutcome::Rendered { layout })
}

/// Nodes, then edges, then labels
fn draw_graph<C: Canvas>(
    canvas: &mut C,
    graph: &Graph,
    layout: &Layout,
    tier: &RenderTier,
) -> Result<()> {
    let position = |label: &str| -> Result<Point> {
        layout
            .get(label)
            .with_context(|| format!("Layout has no position for node '{}'", label))
    };

    let points = graph.nodes().map(position).collect::<Result<Vec<_>>>()?;
    canvas.draw_nodes(
        &points,
        &NodeStyle {
            color: Rgb::SKYBLUE,
            size: tier.node_size,
        },
    )?;

    let segments = graph
        .edges()
        .map(|(parent, child)| -> Result<(Point, Point)> {
            Ok((position(parent)?, position(child)?))
        })
        .collect::<Result<Vec<_>>>()?;
    canvas.draw_edges(
        &segments,
        &EdgeStyle {
            color: Rgb::GRAY,
            node_size: tier.node_size,
            arrow_size: tier.arrow_size,
            width: 1.0,
        },
    )?;

    let labels = graph
        .nodes()
        .zip(points)
        .map(|(label, p)| (label.to_string(), p))
        .collect::<Vec<_>>();
    canvas.draw_labels(
        &labels,
        &LabelStyle {
            color: Rgb::BLACK,
            font_size: tier.font_size,
            family: "sans-serif".to_string(),
        },
    )?;

    Ok(())
}
