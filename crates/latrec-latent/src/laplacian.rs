//! Latent factors of a neighbor-aggregation operator
//!
//! Instead of multiplying by the adjacency matrix, every entity's new
//! coordinate is an aggregate of its neighbors' current coordinates. With
//! [`WeightedMean`] this is the random-walk operator `D⁻¹A`, whose dominant
//! eigenvector is constant on every connected component; the following
//! dimensions are the smooth (Laplacian) embeddings used for link
//! prediction. [`WeightedSum`] reproduces plain adjacency multiplication.
//!
//! Neighborhoods are undirected and span every relation touching a type:
//! out-neighbors through rows, in-neighbors through columns.

use crate::config::ConvergenceConfig;
use crate::decomposition::Decomposition;
use crate::eigen::relative_change;
use crate::error::{LatentError, LatentResult};
use crate::model::LatentFactorModel;
use crate::network::Network;
use crate::utils::ORTHONORMAL_TOLERANCE;
use scirs2_core::ndarray_ext::Array2;
use scirs2_core::random::Rng;
use std::fmt;
use tracing::{debug, trace};

/// Reduction of weighted neighbor values to one coordinate
pub trait Aggregator: fmt::Debug {
    /// Start a new neighborhood
    fn reset(&mut self);

    /// Account for a neighbor with coordinate `value` and edge weight `weight`
    fn add(&mut self, value: f64, weight: f64);

    /// Aggregate of the values added since the last reset
    fn result(&self) -> f64;
}

/// Σ w·x / Σ |w|; zero for an empty neighborhood
#[derive(Debug, Clone, Default)]
pub struct WeightedMean {
    sum: f64,
    total: f64,
}

impl Aggregator for WeightedMean {
    fn reset(&mut self) {
        self.sum = 0.0;
        self.total = 0.0;
    }

    fn add(&mut self, value: f64, weight: f64) {
        self.sum += weight * value;
        self.total += weight.abs();
    }

    fn result(&self) -> f64 {
        if self.total == 0.0 {
            0.0
        } else {
            self.sum / self.total
        }
    }
}

/// Σ w·x
#[derive(Debug, Clone, Default)]
pub struct WeightedSum {
    sum: f64,
}

impl Aggregator for WeightedSum {
    fn reset(&mut self) {
        self.sum = 0.0;
    }

    fn add(&mut self, value: f64, weight: f64) {
        self.sum += weight * value;
    }

    fn result(&self) -> f64 {
        self.sum
    }
}

/// `(type, id, weight)` of one neighbor
type Neighbor = (usize, usize, f64);

/// Neighbor lists of every entity, indexed `[type][id]`
fn neighborhoods(network: &Network) -> Vec<Vec<Vec<Neighbor>>> {
    let mut lists: Vec<Vec<Vec<Neighbor>>> = network
        .type_sizes()
        .into_iter()
        .map(|n| vec![Vec::new(); n])
        .collect();

    for relation in network.relations() {
        let s = relation.source.index();
        let t = relation.target.index();
        let w = relation.weight;

        for (i, row) in relation.matrix.get_rows().enumerate() {
            for (j, value) in row.iter() {
                lists[s][i].push((t, j, w * value));
            }
        }
        if !relation.is_self_symmetric() {
            for (j, col) in relation.matrix.get_cols().enumerate() {
                for (i, value) in col.iter() {
                    lists[t][j].push((s, i, w * value));
                }
            }
        }
    }
    lists
}

/// Latent factors of the aggregation operator of a [`Network`]
///
/// # Examples
///
/// ```
/// use latrec_latent::{ConvergenceConfig, Decomposition, LaplacianDecomposition, Network, WeightedMean};
/// use latrec_sparse::{MatrixFactory, ValueDomain};
/// use scirs2_core::random::{rngs::StdRng, SeedableRng};
///
/// let mut a = MatrixFactory::new_symmetric(4, ValueDomain::Unweighted);
/// for (i, j) in [(0, 1), (1, 2), (2, 0), (2, 3)] {
///     a.set(i, j, 1.0);
/// }
/// let (network, _) = Network::unipartite("node", a)?;
///
/// let mut rng = StdRng::seed_from_u64(5);
/// let mut laplacian =
///     LaplacianDecomposition::new(&network, 1, WeightedMean::default(), ConvergenceConfig::default(), &mut rng)?;
/// assert!(laplacian.update().converged);
/// assert!((laplacian.model().lambda()[0] - 1.0).abs() < 1e-5);
/// # Ok::<(), latrec_latent::LatentError>(())
/// ```
#[derive(Debug)]
pub struct LaplacianDecomposition<A: Aggregator = WeightedMean> {
    neighbors: Vec<Vec<Vec<Neighbor>>>,
    aggregator: A,
    model: LatentFactorModel,
    config: ConvergenceConfig,
}

impl<A: Aggregator> LaplacianDecomposition<A> {
    /// Decomposition of `network` starting from a random orthonormal basis
    pub fn new<R: Rng>(
        network: &Network,
        rank: usize,
        aggregator: A,
        config: ConvergenceConfig,
        rng: &mut R,
    ) -> LatentResult<Self> {
        let model = LatentFactorModel::random(&network.type_sizes(), rank, true, rng)?;
        Self::with_model(network, model, aggregator, config)
    }

    /// Decomposition of `network` continuing from a symmetric `model`
    pub fn with_model(
        network: &Network,
        mut model: LatentFactorModel,
        aggregator: A,
        config: ConvergenceConfig,
    ) -> LatentResult<Self> {
        config.validate()?;
        if !model.is_symmetric() || model.type_sizes() != network.type_sizes() {
            return Err(LatentError::ShapeMismatch(format!(
                "laplacian decomposition needs a symmetric model over {:?}",
                network.type_sizes()
            )));
        }

        let neighbors = neighborhoods(network);
        let edges: usize = neighbors.iter().flatten().map(Vec::len).sum();
        model.set_order(config.order);
        if model.orthogonality_error() > ORTHONORMAL_TOLERANCE {
            model.orthogonalize();
        }
        debug!(rank = model.rank(), edges, ?aggregator, "laplacian decomposition initialized");

        Ok(Self {
            neighbors,
            aggregator,
            model,
            config,
        })
    }

    pub fn into_model(self) -> LatentFactorModel {
        self.model
    }
}

impl<A: Aggregator> Decomposition for LaplacianDecomposition<A> {
    fn model(&self) -> &LatentFactorModel {
        &self.model
    }

    fn model_mut(&mut self) -> &mut LatentFactorModel {
        &mut self.model
    }

    fn config(&self) -> &ConvergenceConfig {
        &self.config
    }

    fn iterate(&mut self) -> f64 {
        let previous = self.model.u_blocks().to_vec();
        let mut next: Vec<Array2<f64>> = previous
            .iter()
            .map(|b| Array2::zeros(b.raw_dim()))
            .collect();
        let rank = self.model.rank();

        for (t, entities) in self.neighbors.iter().enumerate() {
            for (id, list) in entities.iter().enumerate() {
                for k in 0..rank {
                    self.aggregator.reset();
                    for &(nt, nid, w) in list {
                        self.aggregator.add(previous[nt][[k, nid]], w);
                    }
                    next[t][[k, id]] = self.aggregator.result();
                }
            }
        }

        self.model.replace_u(next);
        let change = self.model.orthogonalize_against(Some(&previous));
        let change = relative_change(change, &self.model);
        trace!(change, "laplacian iteration");
        change
    }
}
