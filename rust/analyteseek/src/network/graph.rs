use crate::models::ExperimentAnalyteId;
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityNode {
    pub id: ExperimentAnalyteId,
    pub blank: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub source: ExperimentAnalyteId,
    pub target: ExperimentAnalyteId,
    pub weight: f64,
}

/// Undirected graph of spectrally similar experiment analytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityGraph {
    pub nodes: Vec<SimilarityNode>,
    pub edges: Vec<SimilarityEdge>,
}

impl SimilarityGraph {
    /// Assembles the graph from a square score matrix indexed like `nodes`.
    ///
    /// A pair is joined when either direction scores strictly above
    /// `threshold`; the edge carries the larger score. The diagonal is ignored.
    pub fn from_matrix(nodes: Vec<SimilarityNode>, matrix: &[Vec<f64>], threshold: f64) -> Self {
        let mut edges = Vec::new();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let weight = matrix[i][j].max(matrix[j][i]);
                if weight > threshold {
                    edges.push(SimilarityEdge {
                        source: nodes[i].id,
                        target: nodes[j].id,
                        weight,
                    });
                }
            }
        }
        Self { nodes, edges }
    }

    pub fn neighbors(&self, id: ExperimentAnalyteId) -> impl Iterator<Item = ExperimentAnalyteId> + '_ {
        self.edges.iter().filter_map(move |e| {
            if e.source == id {
                Some(e.target)
            } else if e.target == id {
                Some(e.source)
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(n: u32) -> Vec<SimilarityNode> {
        (1..=n)
            .map(|id| SimilarityNode {
                id,
                blank: id == 2,
            })
            .collect()
    }

    #[test]
    fn test_threshold_is_strict_and_symmetric() {
        let matrix = vec![
            vec![1.0, 0.5, 0.2],
            vec![0.4, 1.0, 0.9],
            vec![0.7, 0.1, 1.0],
        ];
        let graph = SimilarityGraph::from_matrix(nodes(3), &matrix, 0.5);
        assert_eq!(
            graph.edges,
            vec![
                SimilarityEdge {
                    source: 1,
                    target: 3,
                    weight: 0.7
                },
                SimilarityEdge {
                    source: 2,
                    target: 3,
                    weight: 0.9
                },
            ]
        );
        assert_eq!(graph.neighbors(3).collect::<Vec<_>>(), vec![1, 2]);
        assert!(graph.nodes[1].blank);
    }
}
