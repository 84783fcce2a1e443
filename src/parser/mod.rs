// Parser for .gph edge-list files

pub mod record;

use crate::graph::Graph;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub use record::{parse_record, Record};

/// Read a `.gph` file and build its directed graph
pub fn parse(path: &Path) -> Result<Graph> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph file {}", path.display()))?;
    Ok(parse_str(&text))
}

/// Build a graph from `.gph` text.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`. Each line is trimmed; blank
/// lines and lines that do not split into exactly two comma-separated
/// fields are skipped without notice.
pub fn parse_str(text: &str) -> Graph {
    let mut graph = Graph::new();
    for line in text.split(|c: char| c == '\n' || c == '\r') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(record) = parse_record(line) {
            graph.add_edge(record.parent, record.child);
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(graph: &Graph) -> Vec<(String, String)> {
        graph
            .edges()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_basic_file() {
        let g = parse_str("A,B\nB,C\n\nA,C\n");
        let nodes: Vec<&str> = g.nodes().collect();
        assert_eq!(nodes, vec!["A", "B", "C"]);
        assert_eq!(g.edge_count(), 3);
        assert!(g.contains_edge("A", "B"));
        assert!(g.contains_edge("B", "C"));
        assert!(g.contains_edge("A", "C"));
    }

    #[test]
    fn test_malformed_lines_ignored() {
        let g = parse_str("A,B,C\nD\n\nE,F\n");
        let nodes: Vec<&str> = g.nodes().collect();
        assert_eq!(nodes, vec!["E", "F"]);
        assert_eq!(edges(&g), vec![("E".to_string(), "F".to_string())]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let g = parse_str("A,B\nA,B\n  A,B  \n");
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_line_trim_only() {
        let g = parse_str("  x y , z\t\r\n");
        assert!(g.contains_edge("x y ", " z"));
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let g = parse_str("A,B\rC,D\r");
        let nodes: Vec<&str> = g.nodes().collect();
        assert_eq!(nodes, vec!["A", "B", "C", "D"]);
        assert!(g.contains_edge("A", "B"));
        assert!(g.contains_edge("C", "D"));

        let g = parse_str("A,B\r\nB,C\r\n");
        assert_eq!(g.edge_count(), 2);
        assert!(g.contains_edge("B", "C"));
    }

    #[test]
    fn test_empty_input_is_empty_graph() {
        assert!(parse_str("").is_empty());
        assert!(parse_str("\n   \nno-comma\n").is_empty());
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = parse(Path::new("/definitely/not/here.gph")).unwrap_err();
        assert!(err.to_string().contains("Failed to read graph file"));
    }
}
