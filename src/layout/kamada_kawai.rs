// Kamada-Kawai stress layout

use super::{rescale, Layout, LayoutEngine, LayoutError, Point};
use crate::graph::Graph;
use std::collections::VecDeque;
use std::f64::consts::PI;

/// Energy-minimizing layout that uses shortest-path lengths as target
/// distances between every pair of nodes.
///
/// Edge direction is ignored. The graph must be connected: there is no
/// target distance between components.
#[derive(Debug, Clone)]
pub struct KamadaKawai {
    /// Stop once every node's energy gradient is below this
    pub tolerance: f64,
    /// Upper bound on node moves, per node
    pub max_moves_per_node: usize,
    /// Newton steps spent on one node before picking the next
    pub max_inner_steps: usize,
    /// Cap on node-pair evaluations for the whole run
    pub max_pair_evaluations: usize,
}

impl Default for KamadaKawai {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_moves_per_node: 100,
            max_inner_steps: 50,
            max_pair_evaluations: 20_000_000,
        }
    }
}

impl LayoutEngine for KamadaKawai {
    fn name(&self) -> &'static str {
        "kamada_kawai"
    }

    fn layout(&self, graph: &Graph) -> Result<Layout, LayoutError> {
        let n = graph.node_count();
        if n == 0 {
            return Err(LayoutError::Empty);
        }
        if n == 1 {
            return Ok(Layout::from_points(graph, vec![Point::default()]));
        }

        let dist = shortest_paths(&graph.undirected_neighbors())?;
        let mut solver = Solver::new(dist);
        solver.run(self);

        let mut points = solver.pos;
        if !points.iter().all(Point::is_finite) {
            return Err(LayoutError::Diverged);
        }
        rescale(&mut points, 1.0);
        Ok(Layout::from_points(graph, points))
    }
}

/// All-pairs hop counts by BFS. Fails if any pair is unreachable.
fn shortest_paths(neighbors: &[Vec<usize>]) -> Result<Vec<Vec<f64>>, LayoutError> {
    let n = neighbors.len();
    let mut dist = vec![vec![f64::INFINITY; n]; n];

    for (source, row) in dist.iter_mut().enumerate() {
        row[source] = 0.0;
        let mut queue = VecDeque::from([source]);
        while let Some(u) = queue.pop_front() {
            for &v in &neighbors[u] {
                if row[v].is_infinite() {
                    row[v] = row[u] + 1.0;
                    queue.push_back(v);
                }
            }
        }
    }

    if dist[0].iter().any(|d| d.is_infinite()) {
        return Err(LayoutError::Disconnected {
            components: count_components(neighbors),
        });
    }
    Ok(dist)
}

fn count_components(neighbors: &[Vec<usize>]) -> usize {
    let mut seen = vec![false; neighbors.len()];
    let mut components = 0;
    for start in 0..neighbors.len() {
        if seen[start] {
            continue;
        }
        components += 1;
        seen[start] = true;
        let mut stack = vec![start];
        while let Some(u) = stack.pop() {
            for &v in &neighbors[u] {
                if !seen[v] {
                    seen[v] = true;
                    stack.push(v);
                }
            }
        }
    }
    components
}

/// Closest two nodes may get before their distance is clamped
const MIN_DIST: f64 = 1e-9;

/// Gradient contribution of a spring with rest length `d` and stiffness `k`
fn spring_term(d: f64, k: f64, at: Point, other: Point) -> (f64, f64) {
    let dx = at.x - other.x;
    let dy = at.y - other.y;
    let len = (dx * dx + dy * dy).sqrt().max(MIN_DIST);
    (k * (dx - d * dx / len), k * (dy - d * dy / len))
}

struct Solver {
    dist: Vec<Vec<f64>>,
    /// Spring stiffness per pair, `1 / d^2`
    stiffness: Vec<Vec<f64>>,
    /// Node-pair evaluations spent so far
    work: usize,
    pos: Vec<Point>,
    /// Per-node energy gradient, kept in sync with `pos`
    grad: Vec<(f64, f64)>,
}

impl Solver {
    fn new(dist: Vec<Vec<f64>>) -> Self {
        let n = dist.len();
        let diameter = dist
            .iter()
            .flat_map(|row| row.iter().copied())
            .fold(0.0, f64::max);
        let radius = (diameter / 2.0).max(1.0);

        // circular start, like a ring of the nodes in order
        let pos: Vec<Point> = (0..n)
            .map(|i| {
                let theta = 2.0 * PI * i as f64 / n as f64;
                Point::new(radius * theta.cos(), radius * theta.sin())
            })
            .collect();

        let stiffness: Vec<Vec<f64>> = dist
            .iter()
            .map(|row| row.iter().map(|&d| 1.0 / (d * d)).collect::<Vec<f64>>())
            .collect();

        let mut solver = Self {
            dist,
            stiffness,
            work: 0,
            pos,
            grad: vec![(0.0, 0.0); n],
        };
        for m in 0..n {
            solver.grad[m] = solver.gradient(m);
        }
        solver
    }

    fn gradient(&self, m: usize) -> (f64, f64) {
        let at = self.pos[m];
        (0..self.pos.len())
            .filter(|&i| i != m)
            .fold((0.0, 0.0), |(gx, gy), i| {
                let (tx, ty) = spring_term(self.dist[m][i], self.stiffness[m][i], at, self.pos[i]);
                (gx + tx, gy + ty)
            })
    }

    fn magnitude(&self, m: usize) -> f64 {
        let (gx, gy) = self.grad[m];
        (gx * gx + gy * gy).sqrt()
    }

    /// One Newton-Raphson step for node `m`. Returns false if the Hessian is singular.
    fn newton_step(&mut self, m: usize) -> bool {
        let at = self.pos[m];
        let (mut a, mut b, mut c) = (0.0, 0.0, 0.0);
        for i in 0..self.pos.len() {
            if i == m {
                continue;
            }
            let d = self.dist[m][i];
            let k = self.stiffness[m][i];
            let dx = at.x - self.pos[i].x;
            let dy = at.y - self.pos[i].y;
            let len = (dx * dx + dy * dy).sqrt().max(MIN_DIST);
            let cube = len * len * len;
            a += k * (1.0 - d * dy * dy / cube);
            b += k * d * dx * dy / cube;
            c += k * (1.0 - d * dx * dx / cube);
        }

        let det = a * c - b * b;
        if det.abs() < 1e-12 || !det.is_finite() {
            return false;
        }
        let (gx, gy) = self.grad[m];
        let step_x = (b * gy - c * gx) / det;
        let step_y = (b * gx - a * gy) / det;
        self.move_node(m, Point::new(at.x + step_x, at.y + step_y));
        true
    }

    /// Move node `m`, updating every other node's gradient in place
    fn move_node(&mut self, m: usize, to: Point) {
        let from = self.pos[m];
        for i in 0..self.pos.len() {
            if i == m {
                continue;
            }
            let at = self.pos[i];
            let (d, k) = (self.dist[i][m], self.stiffness[i][m]);
            let (ox, oy) = spring_term(d, k, at, from);
            let (nx, ny) = spring_term(d, k, at, to);
            self.grad[i].0 += nx - ox;
            self.grad[i].1 += ny - oy;
        }
        self.pos[m] = to;
        self.grad[m] = self.gradient(m);
        // hessian, neighbour updates and the fresh gradient
        self.work = self.work.saturating_add(3 * self.pos.len());
    }

    fn run(&mut self, opts: &KamadaKawai) {
        let n = self.pos.len();
        let budget = opts.max_moves_per_node.saturating_mul(n);

        for _ in 0..budget {
            if self.work >= opts.max_pair_evaluations {
                return;
            }
            let Some((m, delta)) = (0..n)
                .map(|i| (i, self.magnitude(i)))
                .max_by(|a, b| a.1.total_cmp(&b.1))
            else {
                return;
            };
            if delta < opts.tolerance || !delta.is_finite() {
                return;
            }

            self.work = self.work.saturating_add(n);
            for _ in 0..opts.max_inner_steps {
                if self.work >= opts.max_pair_evaluations {
                    return;
                }
                if !self.newton_step(m) || self.magnitude(m) < opts.tolerance {
                    break;
                }
            }
        }
    }
}
