//! Dense helpers over factor blocks
//!
//! A latent dimension spans every entity type, so its vector is split into
//! one row per type block. These helpers treat row `k` of all blocks as one
//! concatenated vector.

use scirs2_core::ndarray_ext::{Array2, Axis};
use scirs2_linalg::{eigh, LinalgError};

/// Fraction of its squared norm a direction must keep after projection
///
/// Below it the direction is taken to lie in the span of the finished ones.
pub(crate) const DEGENERATE_RATIO: f64 = 1e-12;

/// Gram matrix deviation under which a basis is taken as orthonormal
pub(crate) const ORTHONORMAL_TOLERANCE: f64 = 1e-9;

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Aggregate dot product of dimension `a` of `left` and dimension `b` of `right`
pub(crate) fn block_dot(left: &[Array2<f64>], a: usize, right: &[Array2<f64>], b: usize) -> f64 {
    left.iter()
        .zip(right)
        .map(|(l, r)| l.row(a).dot(&r.row(b)))
        .sum()
}

/// Sum of all coordinates of dimension `k`
pub(crate) fn block_sum(blocks: &[Array2<f64>], k: usize) -> f64 {
    blocks.iter().map(|b| b.row(k).sum()).sum()
}

/// `blocks[k] -= alpha * blocks[j]`
pub(crate) fn block_sub_scaled(blocks: &mut [Array2<f64>], k: usize, j: usize, alpha: f64) {
    for block in blocks.iter_mut() {
        let source = block.row(j).to_owned();
        block.row_mut(k).scaled_add(-alpha, &source);
    }
}

pub(crate) fn block_scale(blocks: &mut [Array2<f64>], k: usize, factor: f64) {
    for block in blocks.iter_mut() {
        block.row_mut(k).mapv_inplace(|x| x * factor);
    }
}

/// Overwrite row `k` of `block` with `values`
pub(crate) fn set_row(block: &mut Array2<f64>, k: usize, values: &[f64]) {
    for (dst, &src) in block.row_mut(k).iter_mut().zip(values) {
        *dst = src;
    }
}

/// Rayleigh-Ritz step of subspace iteration
///
/// `basis` is orthonormal and `image` is the operator applied to it. Both
/// are rotated onto the Ritz vectors of the projected operator, ordered by
/// decreasing `|θ|` (positive first on ties). Pairs of eigenvalues with
/// equal magnitude and opposite sign, as in every bipartite graph, are only
/// separated by this rotation; plain power iteration mixes them forever.
///
/// # Errors
///
/// Fails when the eigensolver rejects the projected `rank × rank` matrix.
pub(crate) fn rayleigh_ritz(
    basis: &[Array2<f64>],
    image: &[Array2<f64>],
) -> Result<(Vec<Array2<f64>>, Vec<Array2<f64>>), LinalgError> {
    let rank = basis.first().map_or(0, |b| b.nrows());
    let mut h = Array2::zeros((rank, rank));
    for a in 0..rank {
        for b in a..rank {
            let value = 0.5 * (block_dot(basis, a, image, b) + block_dot(basis, b, image, a));
            h[[a, b]] = value;
            h[[b, a]] = value;
        }
    }

    let (theta, w) = eigh(&h.view(), None)?;
    let mut order: Vec<usize> = (0..rank).collect();
    order.sort_by(|&a, &b| {
        theta[b]
            .abs()
            .total_cmp(&theta[a].abs())
            .then(theta[b].total_cmp(&theta[a]))
    });
    let w = w.select(Axis(1), &order);

    let rotate = |blocks: &[Array2<f64>]| -> Vec<Array2<f64>> {
        blocks.iter().map(|b| w.t().dot(b)).collect()
    };
    Ok((rotate(basis), rotate(image)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    #[test]
    fn test_dense_helpers() {
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, -1.0, 0.5]), 3.5);
        assert_eq!(norm(&[3.0, 4.0]), 5.0);
    }

    #[test]
    fn test_block_ops_span_all_types() {
        let mut blocks = vec![array![[1.0, 2.0], [0.0, 1.0]], array![[2.0], [1.0]]];
        assert_eq!(block_dot(&blocks, 0, &blocks, 0), 9.0);
        assert_eq!(block_dot(&blocks, 0, &blocks, 1), 4.0);
        assert_eq!(block_sum(&blocks, 0), 5.0);

        block_sub_scaled(&mut blocks, 1, 0, 0.5);
        assert_eq!(blocks[0].row(1).to_vec(), vec![-0.5, 0.0]);
        assert_eq!(blocks[1].row(1).to_vec(), vec![0.0]);

        block_scale(&mut blocks, 0, 2.0);
        assert_eq!(blocks[1][[0, 0]], 4.0);

        set_row(&mut blocks[0], 1, &[7.0, 8.0]);
        assert_eq!(blocks[0][[1, 1]], 8.0);
    }

    #[test]
    fn test_rayleigh_ritz_orders_by_magnitude() {
        // operator diag(1, -3, 2) on the identity basis
        let basis = vec![Array2::eye(3)];
        let image = vec![array![[1.0, 0.0, 0.0], [0.0, -3.0, 0.0], [0.0, 0.0, 2.0]]];
        let (basis, image) = rayleigh_ritz(&basis, &image).unwrap();

        for (k, want) in [-3.0, 2.0, 1.0].into_iter().enumerate() {
            assert!((block_dot(&basis, k, &image, k) - want).abs() < 1e-12);
            assert!((block_dot(&basis, k, &basis, k) - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rayleigh_ritz_separates_opposite_pair() {
        // operator diag(1, -1) on a basis mixing both eigenvectors
        let c = std::f64::consts::FRAC_1_SQRT_2;
        let basis = vec![array![[c, c], [c, -c]]];
        let image = vec![array![[c, -c], [c, c]]];
        let (basis, image) = rayleigh_ritz(&basis, &image).unwrap();

        assert!((basis[0][[0, 0]].abs() - 1.0).abs() < 1e-12);
        assert!((basis[0][[1, 1]].abs() - 1.0).abs() < 1e-12);
        // positive eigenvalue first
        assert!((block_dot(&basis, 0, &image, 0) - 1.0).abs() < 1e-12);
        assert!((block_dot(&basis, 1, &image, 1) + 1.0).abs() < 1e-12);
    }
}
