//! Eigen decomposition of a multi-relational network by subspace iteration
//!
//! The operator is the symmetrized block adjacency matrix of the network:
//! every relation `A` from type `S` to type `T` with weight `w` contributes
//! `w·A` to block `(S, T)` and `w·Aᵀ` to block `(T, S)`. One iteration
//! multiplies the current basis by this operator, rotates it onto the Ritz
//! vectors of the projected operator and re-orthonormalizes it, so the
//! basis converges to the eigenvectors of largest `|λ|`, signs included.

use crate::config::ConvergenceConfig;
use crate::decomposition::Decomposition;
use crate::error::{LatentError, LatentResult};
use crate::model::LatentFactorModel;
use crate::network::Network;
use crate::utils::{rayleigh_ritz, set_row, ORTHONORMAL_TOLERANCE};
use scirs2_core::ndarray_ext::Array2;
use scirs2_core::random::Rng;
use tracing::{debug, trace, warn};

/// Signed eigen decomposition of a [`Network`]
///
/// # Examples
///
/// ```
/// use latrec_latent::{ConvergenceConfig, Decomposition, EigenDecomposition, Entity, Network};
/// use latrec_sparse::{MatrixFactory, ValueDomain};
/// use scirs2_core::random::{rngs::StdRng, SeedableRng};
///
/// // triangle 0 - 1 - 2, spectrum {2, -1, -1}
/// let mut a = MatrixFactory::new_symmetric(3, ValueDomain::Unweighted);
/// a.set(0, 1, 1.0);
/// a.set(1, 2, 1.0);
/// a.set(2, 0, 1.0);
/// let (network, nodes) = Network::unipartite("node", a)?;
///
/// let mut rng = StdRng::seed_from_u64(3);
/// let mut eigen = EigenDecomposition::new(&network, 1, ConvergenceConfig::default(), &mut rng)?;
/// let info = eigen.update();
/// assert!(info.converged);
/// assert!((eigen.model().lambda()[0] - 2.0).abs() < 1e-5);
///
/// let score = eigen.model().predict(Entity::new(nodes, 0), Entity::new(nodes, 2));
/// assert!(score > 0.0);
/// # Ok::<(), latrec_latent::LatentError>(())
/// ```
#[derive(Debug)]
pub struct EigenDecomposition<'a> {
    network: &'a Network,
    model: LatentFactorModel,
    config: ConvergenceConfig,
}

impl<'a> EigenDecomposition<'a> {
    /// Decomposition of `network` starting from a random orthonormal basis
    pub fn new<R: Rng>(
        network: &'a Network,
        rank: usize,
        config: ConvergenceConfig,
        rng: &mut R,
    ) -> LatentResult<Self> {
        let model = LatentFactorModel::random(&network.type_sizes(), rank, true, rng)?;
        Self::with_model(network, model, config)
    }

    /// Decomposition of `network` continuing from `model`
    ///
    /// `model` must be symmetric and have one block per entity type.
    pub fn with_model(
        network: &'a Network,
        mut model: LatentFactorModel,
        config: ConvergenceConfig,
    ) -> LatentResult<Self> {
        config.validate()?;
        if !model.is_symmetric() {
            return Err(LatentError::ShapeMismatch(
                "eigen decomposition needs a symmetric model".to_string(),
            ));
        }
        if model.type_sizes() != network.type_sizes() {
            return Err(LatentError::ShapeMismatch(format!(
                "model type sizes {:?} do not match network {:?}",
                model.type_sizes(),
                network.type_sizes()
            )));
        }

        model.set_order(config.order);
        if model.orthogonality_error() > ORTHONORMAL_TOLERANCE {
            model.orthogonalize();
        }
        debug!(
            rank = model.rank(),
            types = network.n_types(),
            relations = network.relations().len(),
            "eigen decomposition initialized"
        );
        Ok(Self {
            network,
            model,
            config,
        })
    }

    pub fn into_model(self) -> LatentFactorModel {
        self.model
    }
}

/// `y = M x` for the symmetrized operator of `network`, one dimension per row
pub(crate) fn apply_operator(network: &Network, x: &[Array2<f64>]) -> Vec<Array2<f64>> {
    let mut y: Vec<Array2<f64>> = x.iter().map(|b| Array2::zeros(b.raw_dim())).collect();
    let rank = x.first().map_or(0, |b| b.nrows());

    for relation in network.relations() {
        let s = relation.source.index();
        let t = relation.target.index();
        let w = relation.weight;

        for k in 0..rank {
            let forward = relation
                .matrix
                .mult(&x[t].row(k).to_vec(), Some(y[s].row(k).to_vec()), w);
            set_row(&mut y[s], k, &forward);

            if !relation.is_self_symmetric() {
                let backward = relation
                    .matrix
                    .mult_t(&x[s].row(k).to_vec(), Some(y[t].row(k).to_vec()), w);
                set_row(&mut y[t], k, &backward);
            }
        }
    }
    y
}

/// Largest `|Δλ|` relative to the spectral radius (at least 1)
pub(crate) fn relative_change(change: f64, model: &LatentFactorModel) -> f64 {
    let radius = model.lambda().iter().fold(1.0f64, |acc, l| acc.max(l.abs()));
    change / radius
}

impl Decomposition for EigenDecomposition<'_> {
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
        let basis = self.model.u_blocks().to_vec();
        let image = apply_operator(self.network, &basis);
        let (basis, image) = match rayleigh_ritz(&basis, &image) {
            Ok(rotated) => rotated,
            Err(err) => {
                warn!(%err, "ritz rotation failed, continuing with the unrotated basis");
                (basis, image)
            }
        };
        self.model.replace_u(image);
        let change = self.model.orthogonalize_against(Some(&basis));
        let change = relative_change(change, &self.model);
        trace!(change, "eigen iteration");
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Entity;
    use latrec_sparse::{MatrixFactory, ValueDomain};
    use scirs2_core::random::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_apply_operator_bipartite() {
        // A = [[1, 2]] from a 1-entity type to a 2-entity type
        let mut network = Network::new();
        let s = network.add_entity_type("s", 1);
        let t = network.add_entity_type("t", 2);
        let mut a = MatrixFactory::new_matrix(1, 2, ValueDomain::Int);
        a.set(0, 0, 1.0);
        a.set(0, 1, 2.0);
        network.add_relation(s, t, a, 0.5).unwrap();

        let x = vec![
            Array2::from_shape_vec((1, 1), vec![4.0]).unwrap(),
            Array2::from_shape_vec((1, 2), vec![1.0, 1.0]).unwrap(),
        ];
        let y = apply_operator(&network, &x);
        assert_eq!(y[0][[0, 0]], 1.5);
        assert_eq!(y[1].row(0).to_vec(), vec![2.0, 4.0]);
    }

    #[test]
    fn test_self_symmetric_relation_applied_once() {
        let mut a = MatrixFactory::new_symmetric(2, ValueDomain::Double);
        a.set(0, 1, 1.0);
        let (network, _) = Network::unipartite("node", a).unwrap();
        let x = vec![Array2::from_shape_vec((1, 2), vec![1.0, 0.0]).unwrap()];
        let y = apply_operator(&network, &x);
        assert_eq!(y[0].row(0).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_general_storage_relation_is_symmetrized() {
        let mut a = MatrixFactory::new_matrix(2, 2, ValueDomain::Double);
        a.set(0, 1, 1.0);
        let (network, _) = Network::unipartite("node", a).unwrap();
        let x = vec![Array2::from_shape_vec((1, 2), vec![1.0, 0.0]).unwrap()];
        let y = apply_operator(&network, &x);
        // (A + Aᵀ) e0 = e1
        assert_eq!(y[0].row(0).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_rejects_mismatched_model() {
        let a = MatrixFactory::new_symmetric(3, ValueDomain::Double);
        let (network, _) = Network::unipartite("node", a).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let asymmetric = LatentFactorModel::random(&[3], 1, false, &mut rng).unwrap();
        assert!(EigenDecomposition::with_model(&network, asymmetric, ConvergenceConfig::default())
            .is_err());
        let wrong_size = LatentFactorModel::random(&[4], 1, true, &mut rng).unwrap();
        assert!(EigenDecomposition::with_model(&network, wrong_size, ConvergenceConfig::default())
            .is_err());
    }

    #[test]
    fn test_star_graph_spectrum() {
        // star with center 0 and 4 leaves: eigenvalues ±2, the rest 0
        let mut a = MatrixFactory::new_symmetric(5, ValueDomain::Unweighted);
        for leaf in 1..5 {
            a.set(0, leaf, 1.0);
        }
        let (network, nodes) = Network::unipartite("node", a).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let config = ConvergenceConfig::default().with_tolerance(1e-10);
        let mut eigen = EigenDecomposition::new(&network, 2, config, &mut rng).unwrap();
        let info = eigen.update();

        assert!(info.converged, "{}", info);
        let mut lambda = eigen.model().lambda().to_vec();
        lambda.sort_by(f64::total_cmp);
        assert!((lambda[0] + 2.0).abs() < 1e-6);
        assert!((lambda[1] - 2.0).abs() < 1e-6);

        // rank 2 reproduces the star exactly
        let model = eigen.into_model();
        let edge = model.predict(Entity::new(nodes, 0), Entity::new(nodes, 3));
        let non_edge = model.predict(Entity::new(nodes, 1), Entity::new(nodes, 2));
        assert!((edge - 1.0).abs() < 1e-5);
        assert!(non_edge.abs() < 1e-5);
    }
}
