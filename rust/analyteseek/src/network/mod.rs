pub mod deisotope;
pub mod graph;
pub mod offsets;
pub mod similarity;

pub use graph::{
    SimilarityEdge,
    SimilarityGraph,
    SimilarityNode,
};

use crate::models::ExperimentAnalyte;
use analytecore::Tolerance;
use deisotope::deisotoped_masses;
use offsets::detect_mass_offset;
use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use similarity::spectral_similarity;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// A mass offset must explain at least this many mass pairs.
    pub minimum_mass_offset_instances: usize,
    /// Pairs scoring strictly above this are joined by an edge.
    pub spectral_matching_minimum_cosine_score: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            minimum_mass_offset_instances: 2,
            spectral_matching_minimum_cosine_score: 0.5,
        }
    }
}

pub struct SimilarityNetworkBuilder<'a> {
    pub tolerance: &'a Tolerance,
    pub config: &'a NetworkConfig,
}

impl<'a> SimilarityNetworkBuilder<'a> {
    pub fn new(tolerance: &'a Tolerance, config: &'a NetworkConfig) -> Self {
        Self { tolerance, config }
    }

    /// Pairwise scores, `matrix[i][j]` aligning analyte `i` against analyte `j`.
    ///
    /// Offsets are detected on deisotoped masses, scores use the full spectra.
    #[cfg_attr(
        feature = "instrumentation",
        tracing::instrument(skip_all, level = "trace")
    )]
    pub fn similarity_matrix(&self, analytes: &[ExperimentAnalyte]) -> Vec<Vec<f64>> {
        let st = Instant::now();
        let deisotoped: Vec<Vec<f64>> = analytes
            .par_iter()
            .map(|a| deisotoped_masses(&a.spectrum, self.tolerance.max_charge))
            .collect();

        let matrix: Vec<Vec<f64>> = analytes
            .par_iter()
            .zip(deisotoped.par_iter())
            .map(|(a, a_masses)| {
                analytes
                    .iter()
                    .zip(deisotoped.iter())
                    .map(|(b, b_masses)| {
                        let offset = detect_mass_offset(
                            a_masses,
                            b_masses,
                            self.config.minimum_mass_offset_instances,
                        );
                        spectral_similarity(&a.spectrum, &b.spectrum, offset)
                    })
                    .collect()
            })
            .collect();

        let elapsed = st.elapsed();
        let pairs = analytes.len() * analytes.len();
        info!(
            "Scoring {} pairs took: {:?} throughput: {:.2}/s",
            pairs,
            elapsed,
            pairs as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
        );
        matrix
    }

    pub fn build(&self, analytes: &[ExperimentAnalyte]) -> SimilarityGraph {
        let matrix = self.similarity_matrix(analytes);
        let nodes = analytes
            .iter()
            .map(|a| SimilarityNode {
                id: a.id,
                blank: a.is_blank,
            })
            .collect();
        let graph = SimilarityGraph::from_matrix(
            nodes,
            &matrix,
            self.config.spectral_matching_minimum_cosine_score,
        );
        info!(
            "Similarity network: {} nodes, {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExperimentAnalyteMassPeak;

    fn ea(id: u32, blank: bool, peaks: &[(f64, f64)]) -> ExperimentAnalyte {
        ExperimentAnalyte {
            id,
            members: vec![],
            retention_time: 1.0,
            spectrum: peaks
                .iter()
                .map(|(m, r)| ExperimentAnalyteMassPeak {
                    average_mass: *m,
                    relative_intensity: *r,
                    contributions: vec![],
                })
                .collect(),
            is_blank: blank,
        }
    }

    #[test]
    fn test_network_joins_related_analytes() {
        let analytes = vec![
            ea(1, false, &[(200.0, 100.0), (150.0, 50.0), (120.0, 20.0)]),
            // shifted by +14 Da on two masses
            ea(2, true, &[(214.0, 100.0), (164.0, 50.0), (120.0, 20.0)]),
            ea(3, false, &[(500.0, 100.0), (600.0, 30.0)]),
        ];
        let tol = Tolerance::default();
        let config = NetworkConfig::default();
        let builder = SimilarityNetworkBuilder::new(&tol, &config);

        let matrix = builder.similarity_matrix(&analytes);
        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix[0][0], 1.0);
        assert_eq!(matrix[0][2], 0.0);

        let graph = builder.build(&analytes);
        assert_eq!(graph.nodes.len(), 3);
        assert!(graph.nodes[1].blank);
        assert_eq!(graph.edges.len(), 1);
        assert_eq!((graph.edges[0].source, graph.edges[0].target), (1, 2));
        assert!(graph.edges.iter().all(|e| e.source != e.target));
    }
}
