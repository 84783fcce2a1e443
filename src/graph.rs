// Directed graph keyed by node label

use indexmap::{IndexMap, IndexSet};

/// A directed graph whose nodes are identified by their string label.
///
/// Nodes keep the order in which they were first seen. Each node owns the
/// ordered set of its successors, so re-adding an edge is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: IndexMap<String, IndexSet<String>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if it is not already present. Returns its index.
    pub fn add_node(&mut self, label: &str) -> usize {
        if let Some(idx) = self.adjacency.get_index_of(label) {
            return idx;
        }
        let (idx, _) = self
            .adjacency
            .insert_full(label.to_string(), IndexSet::new());
        idx
    }

    /// Add a directed edge `parent -> child`, inserting both endpoints
    /// (parent first). Returns `false` if the edge already existed.
    pub fn add_edge(&mut self, parent: &str, child: &str) -> bool {
        self.add_node(parent);
        self.add_node(child);
        match self.adjacency.get_mut(parent) {
            Some(successors) => successors.insert(child.to_string()),
            None => false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn contains_node(&self, label: &str) -> bool {
        self.adjacency.contains_key(label)
    }

    pub fn contains_edge(&self, parent: &str, child: &str) -> bool {
        self.adjacency
            .get(parent)
            .map_or(false, |successors| successors.contains(child))
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.adjacency.get_index_of(label)
    }

    /// Nodes in first-appearance order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    /// Edges grouped by parent, parents in node order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.adjacency.iter().flat_map(|(parent, successors)| {
            successors
                .iter()
                .map(move |child| (parent.as_str(), child.as_str()))
        })
    }

    pub fn successors(&self, label: &str) -> impl Iterator<Item = &str> {
        self.adjacency
            .get(label)
            .into_iter()
            .flat_map(|successors| successors.iter().map(String::as_str))
    }

    /// Adjacency by node index with edge direction ignored.
    ///
    /// Self-loops are dropped; each neighbour appears once.
    pub fn undirected_neighbors(&self) -> Vec<Vec<usize>> {
        let mut neighbors: Vec<IndexSet<usize>> = vec![IndexSet::new(); self.node_count()];
        for (parent, child) in self.edges() {
            let (Some(a), Some(b)) = (self.index_of(parent), self.index_of(child)) else {
                continue;
            };
            if a == b {
                continue;
            }
            neighbors[a].insert(b);
            neighbors[b].insert(a);
        }
        neighbors
            .into_iter()
            .map(|set| set.into_iter().collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_inserts_endpoints_in_order() {
        let mut g = Graph::new();
        g.add_edge("B", "A");
        g.add_edge("A", "C");
        let nodes: Vec<&str> = g.nodes().collect();
        assert_eq!(nodes, vec!["B", "A", "C"]);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_duplicate_edge_is_noop() {
        let mut g = Graph::new();
        assert!(g.add_edge("A", "B"));
        assert!(!g.add_edge("A", "B"));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_direction_matters() {
        let mut g = Graph::new();
        g.add_edge("A", "B");
        g.add_edge("B", "A");
        assert_eq!(g.edge_count(), 2);
        assert!(g.contains_edge("A", "B"));
        assert!(g.contains_edge("B", "A"));
        assert!(!g.contains_edge("A", "C"));
    }

    #[test]
    fn test_successors() {
        let mut g = Graph::new();
        g.add_edge("A", "B");
        g.add_edge("A", "C");
        let succ: Vec<&str> = g.successors("A").collect();
        assert_eq!(succ, vec!["B", "C"]);
        assert_eq!(g.successors("missing").count(), 0);
    }

    #[test]
    fn test_undirected_neighbors_ignore_direction_and_loops() {
        let mut g = Graph::new();
        g.add_edge("A", "B");
        g.add_edge("B", "A");
        g.add_edge("C", "C");
        let n = g.undirected_neighbors();
        assert_eq!(n[0], vec![1]);
        assert_eq!(n[1], vec![0]);
        assert!(n[2].is_empty());
    }
}
