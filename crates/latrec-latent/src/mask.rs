//! Successive rank-1 extraction with residual downdating
//!
//! The decomposition works on one relation `R` (source type `S`, target
//! type `T`) with distinct source and target factors. Dimension `k` is found
//! by alternating power iteration on the residual:
//!
//! u ← R v / ‖R v‖,  v ← Rᵀ u / ‖Rᵀ u‖,  λₖ = ‖Rᵀ u‖
//!
//! Once `λₖ` settles, the residual is downdated by `λₖ uₖ vₖᵀ` on its
//! occupied cells only, and extraction moves on to dimension `k + 1`.
//! Unobserved cells never enter the residual, which is what makes the
//! predictions at those cells meaningful.

use crate::config::ConvergenceConfig;
use crate::decomposition::Decomposition;
use crate::error::{LatentError, LatentResult};
use crate::model::LatentFactorModel;
use crate::network::{EntityType, Network};
use crate::utils::{norm, set_row, DEGENERATE_RATIO};
use latrec_sparse::{Matrix, MatrixFactory};
use scirs2_core::ndarray_ext::{Array1, Array2};
use scirs2_core::random::Rng;
use tracing::{debug, trace, warn};

/// Rank-1-at-a-time factorization of a single relation
///
/// # Examples
///
/// ```
/// use latrec_latent::{ConvergenceConfig, Decomposition, Entity, MaskDecomposition, Network};
/// use latrec_sparse::{MatrixFactory, ValueDomain};
/// use scirs2_core::random::{rngs::StdRng, SeedableRng};
///
/// let mut network = Network::new();
/// let users = network.add_entity_type("user", 2);
/// let items = network.add_entity_type("item", 2);
/// let mut ratings = MatrixFactory::new_matrix(2, 2, ValueDomain::Int);
/// ratings.set(0, 0, 2.0);
/// ratings.set(0, 1, 4.0);
/// ratings.set(1, 0, 1.0);
/// let relation = network.add_relation(users, items, ratings, 1.0)?;
///
/// let mut rng = StdRng::seed_from_u64(9);
/// let mut mask = MaskDecomposition::new(&network, relation, 1, ConvergenceConfig::default(), &mut rng)?;
/// assert!(mask.update().converged);
///
/// // the unobserved cell (1, 1) is filled in from the rank-1 structure
/// let guess = mask.model().predict(Entity::new(users, 1), Entity::new(items, 1));
/// assert!(guess > 0.0);
/// # Ok::<(), latrec_latent::LatentError>(())
/// ```
#[derive(Debug)]
pub struct MaskDecomposition {
    source: EntityType,
    target: EntityType,
    residual: Box<dyn Matrix>,
    scale: f64,
    model: LatentFactorModel,
    config: ConvergenceConfig,
    current: usize,
    steps: usize,
}

impl MaskDecomposition {
    /// Decomposition of relation `relation` of `network`
    ///
    /// Factors of the source (`u`) and target (`v`) types are the only
    /// non-zero blocks of the model; `v` starts random, `u` and `lambda`
    /// start at zero.
    ///
    /// # Errors
    ///
    /// - [`LatentError::UnknownRelation`] if `relation` does not exist
    /// - [`LatentError::InvalidRank`] if `rank` is 0 or exceeds the smaller
    ///   side of the relation matrix
    pub fn new<R: Rng>(
        network: &Network,
        relation: usize,
        rank: usize,
        config: ConvergenceConfig,
        rng: &mut R,
    ) -> LatentResult<Self> {
        config.validate()?;
        let rel = network.relation(relation)?;
        let max = rel.matrix.rows().min(rel.matrix.cols());
        if rank == 0 || rank > max {
            return Err(LatentError::InvalidRank { rank, max });
        }

        let mut residual = MatrixFactory::to_double(rel.matrix.as_ref());
        if rel.weight != 1.0 {
            let mut cursor = residual.all();
            while let Some((_, _, value)) = cursor.next_entry() {
                cursor.set(value * rel.weight);
            }
        }
        let scale = frobenius(residual.as_ref());

        let sizes = network.type_sizes();
        let zeros = |n: usize| Array2::zeros((rank, n));
        let u: Vec<Array2<f64>> = sizes.iter().map(|&n| zeros(n)).collect();
        let mut v: Vec<Array2<f64>> = sizes.iter().map(|&n| zeros(n)).collect();
        v[rel.target.index()] = Array2::from_shape_fn((rank, sizes[rel.target.index()]), |_| {
            rng.random_range(-1.0..1.0)
        });

        let mut model = LatentFactorModel::from_factors(u, Some(v), Array1::zeros(rank))?;
        model.set_order(config.order);
        debug!(
            rank,
            rows = residual.rows(),
            cols = residual.cols(),
            nnz = residual.nnz(),
            "mask decomposition initialized"
        );

        Ok(Self {
            source: rel.source,
            target: rel.target,
            residual,
            scale,
            model,
            config,
            current: 0,
            steps: 0,
        })
    }

    /// Index of the dimension being extracted (`rank` once all are done)
    pub fn current_dimension(&self) -> usize {
        self.current
    }

    /// What is left of the relation after the finished dimensions
    pub fn residual(&self) -> &dyn Matrix {
        self.residual.as_ref()
    }

    pub fn into_model(self) -> LatentFactorModel {
        self.model
    }

    /// Subtract `λₖ uₖ vₖᵀ` from the occupied cells of the residual
    fn downdate(&mut self, k: usize) {
        let lambda = self.model.lambda()[k];
        let u = self.model.u(self.source).row(k).to_owned();
        let v = self.model.v(self.target).row(k).to_owned();

        let mut cursor = self.residual.all();
        while let Some((i, j, value)) = cursor.next_entry() {
            cursor.set(value - lambda * u[i] * v[j]);
        }
    }

    /// Close dimension `k` and move on
    fn finish_dimension(&mut self, k: usize) {
        self.downdate(k);
        debug!(
            dimension = k,
            lambda = self.model.lambda()[k],
            steps = self.steps,
            "mask dimension extracted"
        );
        self.current += 1;
        self.steps = 0;
    }

    /// Dimension `k` has nothing left to extract
    fn exhaust_dimension(&mut self, k: usize) -> f64 {
        let previous = self.model.lambda()[k];
        self.model.lambda_mut()[k] = 0.0;
        self.model.u_mut(self.source).row_mut(k).fill(0.0);
        self.model.v_mut(self.target).row_mut(k).fill(0.0);
        self.current += 1;
        self.steps = 0;
        debug!(dimension = k, "residual exhausted");
        previous.abs()
    }
}

fn frobenius(matrix: &dyn Matrix) -> f64 {
    matrix.entries().map(|(_, _, x)| x * x).sum::<f64>().sqrt()
}

impl Decomposition for MaskDecomposition {
    fn model(&self) -> &LatentFactorModel {
        &self.model
    }

    fn model_mut(&mut self) -> &mut LatentFactorModel {
        &mut self.model
    }

    fn config(&self) -> &ConvergenceConfig {
        &self.config
    }

    /// Each dimension may use the full budget
    fn budget(&self) -> usize {
        self.config.max_iterations.saturating_mul(self.model.rank())
    }

    /// Converged once every dimension has been extracted
    fn is_converged(&self, _change: f64) -> bool {
        self.current >= self.model.rank()
    }

    fn iterate(&mut self) -> f64 {
        let k = self.current;
        if k >= self.model.rank() {
            return 0.0;
        }
        let threshold = DEGENERATE_RATIO.sqrt() * self.scale;

        let v = self.model.v(self.target).row(k).to_vec();
        let mut u = self.residual.mult(&v, None, 1.0);
        let u_norm = norm(&u);
        if u_norm <= threshold {
            return self.exhaust_dimension(k);
        }
        u.iter_mut().for_each(|x| *x /= u_norm);

        let mut v = self.residual.mult_t(&u, None, 1.0);
        let sigma = norm(&v);
        if sigma <= threshold {
            return self.exhaust_dimension(k);
        }
        v.iter_mut().for_each(|x| *x /= sigma);

        set_row(self.model.u_mut(self.source), k, &u);
        set_row(self.model.v_mut(self.target), k, &v);
        let previous = self.model.lambda()[k];
        self.model.lambda_mut()[k] = sigma;
        self.steps += 1;

        let change = (sigma - previous).abs() / sigma.max(1.0);
        trace!(dimension = k, sigma, change, "mask step");
        if change < self.config.tolerance {
            self.finish_dimension(k);
        } else if self.steps >= self.config.max_iterations {
            warn!(dimension = k, change, "mask dimension did not settle, downdating anyway");
            self.finish_dimension(k);
        }
        change
    }
}
