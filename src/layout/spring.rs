// Fruchterman-Reingold spring layout

use super::{rescale, Layout, LayoutEngine, LayoutError, Point};
use crate::graph::Graph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Force-directed layout from a seeded random start.
///
/// Works for any non-empty graph, connected or not, and gives the same
/// positions for the same graph and seed.
#[derive(Debug, Clone)]
pub struct SpringLayout {
    pub seed: u64,
    pub iterations: usize,
    /// Early exit once the mean displacement per node drops below this
    pub threshold: f64,
}

impl SpringLayout {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            iterations: 50,
            threshold: 1e-4,
        }
    }
}

impl LayoutEngine for SpringLayout {
    fn name(&self) -> &'static str {
        "spring"
    }

    fn layout(&self, graph: &Graph) -> Result<Layout, LayoutError> {
        let n = graph.node_count();
        if n == 0 {
            return Err(LayoutError::Empty);
        }
        if n == 1 {
            return Ok(Layout::from_points(graph, vec![Point::default()]));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pos: Vec<Point> = (0..n)
            .map(|_| Point::new(rng.gen::<f64>(), rng.gen::<f64>()))
            .collect();

        let mut adjacent = vec![vec![false; n]; n];
        for (i, row) in graph.undirected_neighbors().into_iter().enumerate() {
            for j in row {
                adjacent[i][j] = true;
            }
        }

        // optimal distance between nodes
        let k = (1.0 / n as f64).sqrt();
        let mut temperature = 0.1 * spread(&pos);
        let cooling = temperature / (self.iterations as f64 + 1.0);

        for _ in 0..self.iterations {
            let mut moved = 0.0;
            let mut next = pos.clone();

            for i in 0..n {
                let (mut fx, mut fy) = (0.0, 0.0);
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i].x - pos[j].x;
                    let dy = pos[i].y - pos[j].y;
                    let d = (dx * dx + dy * dy).sqrt().max(0.01);
                    let attraction = if adjacent[i][j] { d / k } else { 0.0 };
                    let f = k * k / (d * d) - attraction;
                    fx += dx * f;
                    fy += dy * f;
                }

                let length = (fx * fx + fy * fy).sqrt().max(0.01);
                let step_x = fx * temperature / length;
                let step_y = fy * temperature / length;
                next[i].x += step_x;
                next[i].y += step_y;
                moved += (step_x * step_x + step_y * step_y).sqrt();
            }

            pos = next;
            temperature -= cooling;
            if moved / (n as f64) < self.threshold {
                break;
            }
        }

        if !pos.iter().all(Point::is_finite) {
            return Err(LayoutError::Diverged);
        }
        rescale(&mut pos, 1.0);
        Ok(Layout::from_points(graph, pos))
    }
}

/// Larger of the x and y extents
fn spread(points: &[Point]) -> f64 {
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    (max_x - min_x).max(max_y - min_y)
}
