// Node placement engines

pub mod kamada_kawai;
pub mod spring;

use crate::graph::Graph;
use indexmap::IndexMap;
use tracing::debug;

pub use kamada_kawai::KamadaKawai;
pub use spring::SpringLayout;

/// Seed used by the fallback spring layout
pub const FALLBACK_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("graph has no nodes")]
    Empty,
    #[error("graph is disconnected ({components} components)")]
    Disconnected { components: usize },
    #[error("layout did not converge to finite positions")]
    Diverged,
}

/// Coordinates for every node of a graph, in the graph's node order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    positions: IndexMap<String, Point>,
}

impl Layout {
    /// Pair positions with node labels. `points` is indexed like `graph.nodes()`.
    pub fn from_points(graph: &Graph, points: Vec<Point>) -> Self {
        let positions = graph
            .nodes()
            .map(str::to_string)
            .zip(points)
            .collect();
        Self { positions }
    }

    pub fn get(&self, label: &str) -> Option<Point> {
        self.positions.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Point)> {
        self.positions.iter().map(|(label, p)| (label.as_str(), *p))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }
}

/// Something that can place the nodes of a graph in the plane
pub trait LayoutEngine {
    fn name(&self) -> &'static str;

    fn layout(&self, graph: &Graph) -> Result<Layout, LayoutError>;
}

/// Run `primary`; if it fails, run `fallback` instead.
#[derive(Debug, Clone)]
pub struct Fallback<P, F> {
    pub primary: P,
    pub fallback: F,
}

impl<P, F> Fallback<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: LayoutEngine, F: LayoutEngine> LayoutEngine for Fallback<P, F> {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    fn layout(&self, graph: &Graph) -> Result<Layout, LayoutError> {
        match self.primary.layout(graph) {
            Ok(layout) => Ok(layout),
            Err(LayoutError::Empty) => Err(LayoutError::Empty),
            Err(err) => {
                debug!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    "primary layout failed ({}), falling back",
                    err
                );
                self.fallback.layout(graph)
            }
        }
    }
}

/// Kamada-Kawai with a seeded spring layout behind it
pub fn default_engine() -> Fallback<KamadaKawai, SpringLayout> {
    Fallback::new(KamadaKawai::default(), SpringLayout::seeded(FALLBACK_SEED))
}

/// Center points on their mean and scale so the largest coordinate is `scale`
pub(crate) fn rescale(points: &mut [Point], scale: f64) {
    if points.is_empty() {
        return;
    }
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;

    let mut lim: f64 = 0.0;
    for p in points.iter_mut() {
        p.x -= cx;
        p.y -= cy;
        lim = lim.max(p.x.abs()).max(p.y.abs());
    }

    if lim > 0.0 {
        for p in points.iter_mut() {
            p.x *= scale / lim;
            p.y *= scale / lim;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    struct AlwaysFails;

    impl LayoutEngine for AlwaysFails {
        fn name(&self) -> &'static str {
            "fails"
        }

        fn layout(&self, graph: &Graph) -> Result<Layout, LayoutError> {
            if graph.is_empty() {
                return Err(LayoutError::Empty);
            }
            Err(LayoutError::Diverged)
        }
    }

    #[test]
    fn test_rescale_centers_and_bounds() {
        let mut pts = vec![Point::new(0.0, 0.0), Point::new(4.0, 2.0)];
        rescale(&mut pts, 1.0);
        assert_eq!(pts[0], Point::new(-1.0, -0.5));
        assert_eq!(pts[1], Point::new(1.0, 0.5));
    }

    #[test]
    fn test_rescale_single_point_goes_to_origin() {
        let mut pts = vec![Point::new(3.0, -7.0)];
        rescale(&mut pts, 1.0);
        assert_eq!(pts[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn test_fallback_used_when_primary_fails() {
        let g = parse_str("A,B\nB,C\n");
        let engine = Fallback::new(AlwaysFails, SpringLayout::seeded(FALLBACK_SEED));
        let layout = engine.layout(&g).unwrap();
        let expected = SpringLayout::seeded(FALLBACK_SEED).layout(&g).unwrap();
        assert_eq!(layout, expected);
    }

    #[test]
    fn test_fallback_does_not_hide_empty() {
        let engine = Fallback::new(AlwaysFails, SpringLayout::seeded(FALLBACK_SEED));
        assert_eq!(engine.layout(&Graph::new()), Err(LayoutError::Empty));
    }

    #[test]
    fn test_default_engine_handles_disconnected_graph() {
        let g = parse_str("A,B\nC,D\n");
        assert!(matches!(
            KamadaKawai::default().layout(&g),
            Err(LayoutError::Disconnected { components: 2 })
        ));
        let layout = default_engine().layout(&g).unwrap();
        let labels: Vec<&str> = layout.labels().collect();
        assert_eq!(labels, vec!["A", "B", "C", "D"]);
        assert!(layout.iter().all(|(_, p)| p.is_finite()));
    }

    #[test]
    fn test_default_engine_connected_uses_primary() {
        let g = parse_str("A,B\nB,C\nA,C\n");
        let layout = default_engine().layout(&g).unwrap();
        assert_eq!(layout, KamadaKawai::default().layout(&g).unwrap());
    }
}
