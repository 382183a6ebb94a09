use std::collections::HashMap;
use std::path::Path;

use petgraph::algo::connected_components;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{NodeIndex, UnGraph};
use tracing::{info, warn};

use crate::adjacency::AdjacencyMatrix;
use crate::error::Result;
use crate::metadata::{LegislatorDirectory, LegislatorInfo};

#[derive(Debug, Clone, PartialEq)]
pub struct LegislatorNode {
    pub id: i64,
    pub info: LegislatorInfo,
}

/// Unweighted, undirected co-voting graph.
#[derive(Debug, Clone)]
pub struct LegislatorGraph {
    graph: UnGraph<LegislatorNode, ()>,
    nodes: HashMap<i64, NodeIndex>,
}

impl LegislatorGraph {
    pub fn graph(&self) -> &UnGraph<LegislatorNode, ()> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, id: i64) -> Option<&LegislatorNode> {
        self.nodes.get(&id).map(|&ix| &self.graph[ix])
    }

    pub fn has_edge(&self, a: i64, b: i64) -> bool {
        match (self.nodes.get(&a), self.nodes.get(&b)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Neighbor ids, ascending.
    pub fn neighbors(&self, id: i64) -> Vec<i64> {
        let Some(&ix) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut ids = self
            .graph
            .neighbors(ix)
            .map(|n| self.graph[n].id)
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    /// Attaches the metadata of `legislature` to each node. Nodes without a
    /// record keep empty attributes.
    pub fn annotate(mut self, directory: &LegislatorDirectory, legislature: u32) -> Self {
        let infos = directory.for_legislature(legislature);
        let mut missing = 0usize;

        for node in self.graph.node_weights_mut() {
            match infos.get(&node.id) {
                Some(info) => node.info = info.clone(),
                None => missing += 1,
            }
        }

        if missing > 0 {
            warn!(legislature, missing, "legislators without metadata left unannotated");
        }
        self
    }
}

/// Keeps the pairs of distinct legislators whose score is strictly above
/// `threshold`.
pub fn threshold_graph(adjacency: &AdjacencyMatrix, threshold: f64) -> LegislatorGraph {
    let mut graph = UnGraph::<LegislatorNode, ()>::with_capacity(adjacency.len(), 0);
    let mut nodes = HashMap::with_capacity(adjacency.len());
    let mut indices = Vec::with_capacity(adjacency.len());

    for &id in adjacency.legislators() {
        let ix = graph.add_node(LegislatorNode {
            id,
            info: LegislatorInfo::default(),
        });
        nodes.insert(id, ix);
        indices.push(ix);
    }

    let values = adjacency.values();
    for i in 0..indices.len() {
        for j in i + 1..indices.len() {
            if values[[i, j]] > threshold {
                graph.add_edge(indices[i], indices[j], ());
            }
        }
    }

    info!(
        threshold,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "thresholded adjacency matrix"
    );

    LegislatorGraph { graph, nodes }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub density: f64,
    pub components: usize,
    pub average_clustering: f64,
}

impl GraphSummary {
    pub fn of(graph: &LegislatorGraph) -> Self {
        let g = graph.graph();
        let nodes = g.node_count();
        let edges = g.edge_count();
        let density = if nodes > 1 {
            2.0 * edges as f64 / (nodes * (nodes - 1)) as f64
        } else {
            0.0
        };
        let average_clustering = if nodes > 0 {
            g.node_indices().map(|n| clustering_coefficient(g, n)).sum::<f64>() / nodes as f64
        } else {
            0.0
        };

        GraphSummary {
            nodes,
            edges,
            density,
            components: connected_components(g),
            average_clustering,
        }
    }
}

// Share of a node's neighbor pairs that are themselves connected.
fn clustering_coefficient(graph: &UnGraph<LegislatorNode, ()>, node: NodeIndex) -> f64 {
    let neighbors: Vec<_> = graph.neighbors(node).collect();
    if neighbors.len() < 2 {
        return 0.0;
    }

    let mut edges_between_neighbors = 0;
    for (i, &ni) in neighbors.iter().enumerate() {
        for &nj in &neighbors[i + 1..] {
            if graph.contains_edge(ni, nj) {
                edges_between_neighbors += 1;
            }
        }
    }

    let total_possible_edges = neighbors.len() * (neighbors.len() - 1) / 2;
    edges_between_neighbors as f64 / total_possible_edges as f64
}

fn node_label(node: &LegislatorNode) -> String {
    let name = node
        .info
        .name
        .clone()
        .unwrap_or_else(|| node.id.to_string());
    let label = match &node.info.party {
        Some(party) => format!("{name} ({party})"),
        None => name,
    };
    label.replace('"', "'")
}

pub fn export_to_graphviz(graph: &LegislatorGraph, path: &Path) -> Result<()> {
    let g = graph.graph();
    let viz = Dot::with_attr_getters(
        g,
        &[Config::EdgeNoLabel, Config::NodeNoLabel],
        &|_, _| String::new(),
        &|_, (_, node)| match &node.info.region {
            Some(region) => format!("label=\"{}\" region=\"{}\"", node_label(node), region),
            None => format!("label=\"{}\"", node_label(node)),
        },
    );

    std::fs::write(path, format!("{:?}", viz))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn adjacency() -> AdjacencyMatrix {
        // 1-2-3 triangle above 0.5, 4 hangs off 1, 5 is isolated.
        AdjacencyMatrix::new(
            vec![1, 2, 3, 4, 5],
            array![
                [1.0, 0.8, 0.6, 0.7, 0.1],
                [0.8, 1.0, 0.9, 0.2, 0.0],
                [0.6, 0.9, 1.0, 0.5, 0.0],
                [0.7, 0.2, 0.5, 1.0, -0.3],
                [0.1, 0.0, 0.0, -0.3, 1.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn edges_need_strictly_greater_scores() {
        let graph = threshold_graph(&adjacency(), 0.5);

        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);
        assert!(graph.has_edge(1, 2));
        assert!(graph.has_edge(3, 2));
        assert!(graph.has_edge(4, 1));
        // exactly at the threshold
        assert!(!graph.has_edge(3, 4));
        assert_eq!(graph.neighbors(1), vec![2, 3, 4]);
        assert!(graph.neighbors(5).is_empty());
        assert!(graph.neighbors(99).is_empty());
    }

    #[test]
    fn one_unit_above_threshold_creates_an_edge() {
        let adj = AdjacencyMatrix::new(vec![7, 8], array![[0.0, 3.0], [3.0, 0.0]]).unwrap();
        assert!(!threshold_graph(&adj, 3.0).has_edge(7, 8));
        assert!(threshold_graph(&adj, 2.0).has_edge(7, 8));
    }

    #[test]
    fn diagonal_never_makes_self_loops() {
        let graph = threshold_graph(&adjacency(), 0.0);
        for id in 1..=5 {
            assert!(!graph.has_edge(id, id));
        }
    }

    #[test]
    fn summary_of_triangle_with_pendant() {
        let summary = GraphSummary::of(&threshold_graph(&adjacency(), 0.5));

        assert_eq!(summary.nodes, 5);
        assert_eq!(summary.edges, 4);
        assert_eq!(summary.components, 2);
        assert!((summary.density - 0.4).abs() < 1e-12);
        // 1/3 + 1 + 1 + 0 + 0 over five nodes
        assert!((summary.average_clustering - 7.0 / 15.0).abs() < 1e-12);
    }

    #[test]
    fn annotation_is_best_effort() {
        let directory = LegislatorDirectory::from_reader(
            "id,nome,siglaPartido,siglaUf,idLegislatura\n\
             1,Ana,PT,BA,56\n\
             2,Bruno,PL,RS,56\n\
             3,Clara,MDB,GO,55\n"
                .as_bytes(),
        )
        .unwrap();

        let graph = threshold_graph(&adjacency(), 0.5).annotate(&directory, 56);

        let ana = graph.node(1).unwrap();
        assert_eq!(ana.info.party.as_deref(), Some("PT"));
        assert_eq!(ana.info.region.as_deref(), Some("Nordeste"));
        assert_eq!(graph.node(2).unwrap().info.region.as_deref(), Some("Sul"));
        // other legislature
        assert_eq!(graph.node(3).unwrap().info, LegislatorInfo::default());
        assert_eq!(graph.node(5).unwrap().info, LegislatorInfo::default());
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn graphviz_export_labels_nodes() {
        let directory = LegislatorDirectory::from_reader(
            "id,nome,siglaPartido,siglaUf,idLegislatura\n1,Ana,PT,BA,56\n".as_bytes(),
        )
        .unwrap();
        let graph = threshold_graph(&adjacency(), 0.5).annotate(&directory, 56);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.dot");
        export_to_graphviz(&graph, &path).unwrap();

        let dot = std::fs::read_to_string(&path).unwrap();
        assert!(dot.starts_with("graph {"));
        assert!(dot.contains("label=\"Ana (PT)\" region=\"Nordeste\""));
        assert!(dot.contains("label=\"5\""));
        assert!(dot.contains("--"));
    }
}
