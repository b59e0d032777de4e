//! Low-rank latent factor model
//!
//! The model approximates a (multi-relational) adjacency structure as
//!
//! X ≈ Σₖ λₖ uₖ vₖᵀ
//!
//! Where:
//! - `k` runs over the `rank` latent dimensions
//! - `uₖ` and `vₖ` span every entity type; they are stored as one block per
//!   type, block `T` having shape `(rank, |T|)`
//! - `v` aliases `u` for symmetric models, so `λ` is a signed spectrum
//!
//! After [`LatentFactorModel::orthogonalize`] the dimensions of `u` (and of
//! `v` when distinct) are orthonormal with respect to the aggregate dot
//! product, the sum over all type blocks.

use crate::config::GramSchmidtOrder;
use crate::error::{LatentError, LatentResult};
use crate::network::{Entity, EntityType};
use crate::spectral::SpectralTransform;
use crate::utils::{block_dot, block_scale, block_sub_scaled, block_sum, DEGENERATE_RATIO};
use scirs2_core::ndarray_ext::{Array1, Array2};
use scirs2_core::random::Rng;

/// Lifecycle of a model inside a decomposition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Factors seeded or supplied, never iterated
    Initialized,
    /// At least one iteration ran without meeting the convergence criterion
    Iterating { iterations: usize },
    /// The last `update()` met its convergence criterion
    ///
    /// Calling `update()` again moves the model back to `Iterating`.
    Converged { iterations: usize },
}

/// Latent factors and scaling values of a rank-`rank` approximation
#[derive(Debug, Clone)]
pub struct LatentFactorModel {
    rank: usize,
    u: Vec<Array2<f64>>,
    v: Option<Vec<Array2<f64>>>,
    lambda: Array1<f64>,
    order: GramSchmidtOrder,
    state: ModelState,
}

impl LatentFactorModel {
    /// Model with factors drawn uniformly from `[-1, 1)`
    ///
    /// `type_sizes[t]` is the entity count of type `t`. A `symmetric` model
    /// shares one factor set between sources and targets; otherwise `v` is
    /// drawn independently. `lambda` starts at zero.
    ///
    /// # Errors
    ///
    /// - [`LatentError::EmptyNetwork`] if `type_sizes` is empty
    /// - [`LatentError::InvalidRank`] if `rank` is 0 or exceeds the entity count
    ///
    /// # Examples
    ///
    /// ```
    /// use latrec_latent::LatentFactorModel;
    /// use scirs2_core::random::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let mut model = LatentFactorModel::random(&[4, 6], 3, true, &mut rng)?;
    /// model.orthogonalize();
    /// assert!(model.orthogonality_error() < 1e-10);
    /// # Ok::<(), latrec_latent::LatentError>(())
    /// ```
    pub fn random<R: Rng>(
        type_sizes: &[usize],
        rank: usize,
        symmetric: bool,
        rng: &mut R,
    ) -> LatentResult<Self> {
        validate_rank(type_sizes, rank)?;

        let mut block = |n: usize| Array2::from_shape_fn((rank, n), |_| rng.random_range(-1.0..1.0));
        let u: Vec<Array2<f64>> = type_sizes.iter().map(|&n| block(n)).collect();
        let v = if symmetric {
            None
        } else {
            Some(type_sizes.iter().map(|&n| block(n)).collect())
        };

        Ok(Self {
            rank,
            u,
            v,
            lambda: Array1::zeros(rank),
            order: GramSchmidtOrder::default(),
            state: ModelState::Initialized,
        })
    }

    /// Model from supplied factors
    ///
    /// Every block of `u` must have `lambda.len()` rows; `v`, when given,
    /// must have one block per type with the same shapes as `u`.
    pub fn from_factors(
        u: Vec<Array2<f64>>,
        v: Option<Vec<Array2<f64>>>,
        lambda: Array1<f64>,
    ) -> LatentResult<Self> {
        let rank = lambda.len();
        let type_sizes: Vec<usize> = u.iter().map(|b| b.ncols()).collect();
        validate_rank(&type_sizes, rank)?;

        for (t, block) in u.iter().enumerate() {
            if block.nrows() != rank {
                return Err(LatentError::ShapeMismatch(format!(
                    "u block {} has {} rows, expected rank {}",
                    t,
                    block.nrows(),
                    rank
                )));
            }
        }
        if let Some(v) = &v {
            if v.len() != u.len() {
                return Err(LatentError::ShapeMismatch(format!(
                    "v has {} type blocks, u has {}",
                    v.len(),
                    u.len()
                )));
            }
            for (t, (vb, ub)) in v.iter().zip(&u).enumerate() {
                if vb.dim() != ub.dim() {
                    return Err(LatentError::ShapeMismatch(format!(
                        "v block {} has shape {:?}, expected {:?}",
                        t,
                        vb.dim(),
                        ub.dim()
                    )));
                }
            }
        }

        Ok(Self {
            rank,
            u,
            v,
            lambda,
            order: GramSchmidtOrder::default(),
            state: ModelState::Initialized,
        })
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn lambda(&self) -> &Array1<f64> {
        &self.lambda
    }

    /// Source-side factor block of `ty`, shape `(rank, |ty|)`
    pub fn u(&self, ty: EntityType) -> &Array2<f64> {
        &self.u[ty.index()]
    }

    /// Target-side factor block of `ty`; the `u` block for symmetric models
    pub fn v(&self, ty: EntityType) -> &Array2<f64> {
        match &self.v {
            Some(v) => &v[ty.index()],
            None => &self.u[ty.index()],
        }
    }

    /// Whether `v` aliases `u`
    pub fn is_symmetric(&self) -> bool {
        self.v.is_none()
    }

    pub fn n_types(&self) -> usize {
        self.u.len()
    }

    pub fn type_sizes(&self) -> Vec<usize> {
        self.u.iter().map(|b| b.ncols()).collect()
    }

    /// Raw `(lambda, u)` for nearest-neighbour search in the latent space
    pub fn spectrum(&self) -> (&Array1<f64>, &[Array2<f64>]) {
        (&self.lambda, &self.u)
    }

    /// Coordinates of `entity` in the latent space (its `u` column)
    pub fn embedding(&self, entity: Entity) -> Array1<f64> {
        self.u[entity.ty.index()].column(entity.id).to_owned()
    }

    pub fn state(&self) -> ModelState {
        self.state
    }

    /// Iterations recorded since construction
    pub fn iterations(&self) -> usize {
        match self.state {
            ModelState::Initialized => 0,
            ModelState::Iterating { iterations } | ModelState::Converged { iterations } => {
                iterations
            }
        }
    }

    pub fn order(&self) -> GramSchmidtOrder {
        self.order
    }

    pub fn set_order(&mut self, order: GramSchmidtOrder) {
        self.order = order;
    }

    /// Aggregate dot product of dimensions `k1` and `k2` of `u` over all types
    pub fn dimension_dot(&self, k1: usize, k2: usize) -> f64 {
        block_dot(&self.u, k1, &self.u, k2)
    }

    /// Largest deviation of the factor Gram matrices from the identity
    ///
    /// Covers `u` and, when distinct, `v`. Zero for a perfectly orthonormal
    /// model.
    pub fn orthogonality_error(&self) -> f64 {
        let mut error = gram_error(&self.u, self.rank);
        if let Some(v) = &self.v {
            error = error.max(gram_error(v, self.rank));
        }
        error
    }

    /// Approximated value of the edge `source → target`
    ///
    /// Σₖ λₖ · u[k][source] · v[k][target]. Entity ids outside their type
    /// are a contract violation and panic.
    pub fn predict(&self, source: Entity, target: Entity) -> f64 {
        self.predict_with(source, target, &SpectralTransform::Identity)
    }

    /// Like [`predict`](Self::predict) with `transform` applied to each `λₖ`
    pub fn predict_with(&self, source: Entity, target: Entity, transform: &SpectralTransform) -> f64 {
        let u = self.u(source.ty);
        let v = self.v(target.ty);
        (0..self.rank)
            .map(|k| transform.apply(self.lambda[k]) * u[[k, source.id]] * v[[k, target.id]])
            .sum()
    }

    /// Dense `|source| × |target|` reconstruction
    pub fn reconstruct(&self, source: EntityType, target: EntityType) -> Array2<f64> {
        let u = self.u(source);
        let v = self.v(target);
        let mut out = Array2::zeros((u.ncols(), v.ncols()));
        for k in 0..self.rank {
            let lambda = self.lambda[k];
            for ((i, j), cell) in out.indexed_iter_mut() {
                *cell += lambda * u[[k, i]] * v[[k, j]];
            }
        }
        out
    }

    /// Re-orthonormalize the factors and extract new scaling values
    ///
    /// The current factors are taken to carry the scale of each dimension:
    /// `lambda[k]` becomes the signed norm of dimension `k` after
    /// Gram-Schmidt (the product of the `u` and `v` norms for distinct `v`).
    /// The sign follows the sum of the dimension's coordinates. Returns the
    /// largest change of any `lambda[k]`.
    pub fn orthogonalize(&mut self) -> f64 {
        self.orthogonalize_against(None)
    }

    /// Gram-Schmidt with signs aligned to `reference`, the previous `u`
    ///
    /// Power iteration flips the sign of directions with negative
    /// eigenvalue on every step; aligning with the previous basis keeps the
    /// basis fixed and moves the sign into `lambda`.
    pub(crate) fn orthogonalize_against(&mut self, reference: Option<&[Array2<f64>]>) -> f64 {
        let order = self.processing_order();
        let u_scales = orthonormalize(&mut self.u, &order, reference);
        let scales: Vec<f64> = match self.v.as_mut() {
            None => u_scales,
            Some(v) => {
                let v_scales = orthonormalize(v, &order, None);
                u_scales.iter().zip(&v_scales).map(|(a, b)| a * b).collect()
            }
        };

        let lambda = Array1::from(scales);
        let change = (&lambda - &self.lambda)
            .iter()
            .fold(0.0f64, |acc, d| acc.max(d.abs()));
        self.lambda = lambda;
        change
    }

    fn processing_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.rank).collect();
        if self.order == GramSchmidtOrder::ByMagnitude {
            order.sort_by(|&a, &b| self.lambda[b].abs().total_cmp(&self.lambda[a].abs()));
        }
        order
    }

    pub(crate) fn u_blocks(&self) -> &[Array2<f64>] {
        &self.u
    }

    pub(crate) fn replace_u(&mut self, u: Vec<Array2<f64>>) {
        debug_assert!(u.iter().zip(&self.u).all(|(a, b)| a.dim() == b.dim()));
        self.u = u;
    }

    pub(crate) fn u_mut(&mut self, ty: EntityType) -> &mut Array2<f64> {
        &mut self.u[ty.index()]
    }

    pub(crate) fn v_mut(&mut self, ty: EntityType) -> &mut Array2<f64> {
        match self.v.as_mut() {
            Some(v) => &mut v[ty.index()],
            None => &mut self.u[ty.index()],
        }
    }

    pub(crate) fn lambda_mut(&mut self) -> &mut Array1<f64> {
        &mut self.lambda
    }

    pub(crate) fn record_iteration(&mut self) {
        self.state = ModelState::Iterating {
            iterations: self.iterations() + 1,
        };
    }

    pub(crate) fn mark_converged(&mut self) {
        self.state = ModelState::Converged {
            iterations: self.iterations(),
        };
    }
}

fn validate_rank(type_sizes: &[usize], rank: usize) -> LatentResult<()> {
    if type_sizes.is_empty() {
        return Err(LatentError::EmptyNetwork);
    }
    let max = type_sizes.iter().sum();
    if rank == 0 || rank > max {
        return Err(LatentError::InvalidRank { rank, max });
    }
    Ok(())
}

fn gram_error(blocks: &[Array2<f64>], rank: usize) -> f64 {
    let mut error = 0.0f64;
    for a in 0..rank {
        for b in a..rank {
            let target = if a == b { 1.0 } else { 0.0 };
            error = error.max((block_dot(blocks, a, blocks, b) - target).abs());
        }
    }
    error
}

/// Modified Gram-Schmidt over the dimensions of `blocks`, visiting them in `order`
///
/// Returns the signed norm of every dimension after projection (0 for
/// degenerate dimensions, which are completed with a unit vector).
fn orthonormalize(
    blocks: &mut [Array2<f64>],
    order: &[usize],
    reference: Option<&[Array2<f64>]>,
) -> Vec<f64> {
    let mut scales = vec![0.0; order.len()];
    let mut done: Vec<usize> = Vec::with_capacity(order.len());

    for &k in order {
        let initial = block_dot(blocks, k, blocks, k);
        for &j in &done {
            let overlap = block_dot(blocks, j, blocks, k);
            block_sub_scaled(blocks, k, j, overlap);
        }
        let norm_sq = block_dot(blocks, k, blocks, k);

        if norm_sq == 0.0 || norm_sq <= DEGENERATE_RATIO * initial {
            complete_with_unit(blocks, k, &done);
        } else {
            let direction = match reference {
                Some(previous) => block_dot(blocks, k, previous, k),
                None => block_sum(blocks, k),
            };
            let sign = if direction < 0.0 { -1.0 } else { 1.0 };
            let norm = norm_sq.sqrt();
            block_scale(blocks, k, sign / norm);
            scales[k] = sign * norm;
        }
        done.push(k);
    }
    scales
}

/// Replace dimension `k` by the unit vector least covered by the `done` dimensions
///
/// Ties go to the first type block and the lowest id.
fn complete_with_unit(blocks: &mut [Array2<f64>], k: usize, done: &[usize]) {
    let mut best: Option<(usize, usize, f64)> = None;
    for (t, block) in blocks.iter().enumerate() {
        for id in 0..block.ncols() {
            let residual = 1.0 - done.iter().map(|&j| block[[j, id]].powi(2)).sum::<f64>();
            let better = match best {
                Some((_, _, r)) => residual > r + DEGENERATE_RATIO,
                None => true,
            };
            if better {
                best = Some((t, id, residual));
            }
        }
    }

    for block in blocks.iter_mut() {
        block.row_mut(k).fill(0.0);
    }
    if let Some((t, id, _)) = best {
        blocks[t][[k, id]] = 1.0;
        for &j in done {
            let overlap = block_dot(blocks, j, blocks, k);
            block_sub_scaled(blocks, k, j, overlap);
        }
        let norm = block_dot(blocks, k, blocks, k).sqrt();
        if norm > 0.0 {
            block_scale(blocks, k, 1.0 / norm);
        }
    }
}
