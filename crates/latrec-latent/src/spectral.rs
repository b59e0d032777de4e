//! Spectral transformations applied to `lambda` at prediction time
//!
//! Link prediction often scores a pair with a function of the adjacency
//! spectrum rather than the spectrum itself: `exp(αA)` counts walks of all
//! lengths with factorial damping, `(I - αA)⁻¹` is the Neumann (Katz) kernel,
//! and so on. Because the factors are orthonormal, applying `f` to every
//! `lambda[k]` is the same as applying `f` to the reconstructed matrix.

use scirs2_core::ndarray_ext::Array1;

/// Function applied elementwise to the scaling factors
#[derive(Debug, Clone, Copy, Default)]
pub enum SpectralTransform {
    /// `λ`
    #[default]
    Identity,
    /// `exp(αλ)`
    Exponential(f64),
    /// `1 / (1 - αλ)`, falling back to `λ` when `αλ ≥ 1` where the series diverges
    NeumannKernel(f64),
    /// `sinh(αλ)`, the odd part of the exponential (alternating paths)
    HyperbolicSine(f64),
    /// `λⁿ`, paths of exactly `n` steps
    Power(i32),
    /// `|λ|`
    Absolute,
    /// Caller-supplied function
    Custom(fn(f64) -> f64),
}

impl SpectralTransform {
    pub fn apply(&self, lambda: f64) -> f64 {
        match *self {
            SpectralTransform::Identity => lambda,
            SpectralTransform::Exponential(alpha) => (alpha * lambda).exp(),
            SpectralTransform::NeumannKernel(alpha) => {
                let scaled = alpha * lambda;
                if scaled >= 1.0 {
                    lambda
                } else {
                    1.0 / (1.0 - scaled)
                }
            }
            SpectralTransform::HyperbolicSine(alpha) => (alpha * lambda).sinh(),
            SpectralTransform::Power(n) => lambda.powi(n),
            SpectralTransform::Absolute => lambda.abs(),
            SpectralTransform::Custom(f) => f(lambda),
        }
    }

    /// Transformed copy of a whole spectrum
    pub fn apply_all(&self, lambda: &Array1<f64>) -> Array1<f64> {
        lambda.mapv(|x| self.apply(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    fn square(x: f64) -> f64 {
        x * x
    }

    #[test]
    fn test_transforms() {
        assert_eq!(SpectralTransform::Identity.apply(-2.0), -2.0);
        assert!((SpectralTransform::Exponential(0.5).apply(2.0) - 1.0f64.exp()).abs() < 1e-12);
        assert!((SpectralTransform::NeumannKernel(0.25).apply(1.0) - 4.0 / 3.0).abs() < 1e-12);
        assert!((SpectralTransform::NeumannKernel(0.25).apply(-2.0) - 2.0 / 3.0).abs() < 1e-12);
        assert!((SpectralTransform::HyperbolicSine(1.0).apply(0.0)).abs() < 1e-12);
        assert_eq!(SpectralTransform::Power(3).apply(-2.0), -8.0);
        assert_eq!(SpectralTransform::Absolute.apply(-3.0), 3.0);
        assert_eq!(SpectralTransform::Custom(square).apply(3.0), 9.0);
    }

    #[test]
    fn test_neumann_kernel_outside_radius() {
        // 0.5 * 4 = 2 lies outside the convergence radius
        assert_eq!(SpectralTransform::NeumannKernel(0.5).apply(4.0), 4.0);
        assert_eq!(SpectralTransform::NeumannKernel(0.5).apply(2.0), 2.0);
    }

    #[test]
    fn test_apply_all() {
        let spectrum = array![1.0, -2.0];
        let t = SpectralTransform::Absolute.apply_all(&spectrum);
        assert_eq!(t, array![1.0, 2.0]);
    }
}
