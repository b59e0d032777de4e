//! Convergence settings shared by every decomposition

use crate::error::{LatentError, LatentResult};

/// Default threshold on the relative change of the scaling factors
pub const DEFAULT_TOLERANCE: f64 = 1e-7;

/// Default iteration budget of [`Decomposition::update`](crate::Decomposition::update)
pub const DEFAULT_MAX_ITERATIONS: usize = 500;

/// Order in which Gram-Schmidt visits the latent dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GramSchmidtOrder {
    /// Dimension 0 first, then 1, 2, ...
    #[default]
    Sequential,
    /// Largest `|lambda|` of the previous iteration first
    ///
    /// Keeps the dominant directions stable when two eigenvalues swap
    /// their magnitude order during iteration.
    ByMagnitude,
}

/// Convergence criteria for iterative decompositions
///
/// # Examples
///
/// ```
/// use latrec_latent::{ConvergenceConfig, GramSchmidtOrder};
///
/// let config = ConvergenceConfig::default()
///     .with_tolerance(1e-9)
///     .with_max_iterations(2_000)
///     .with_order(GramSchmidtOrder::ByMagnitude);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceConfig {
    /// Iteration stops once the change reported by `iterate()` drops below this
    pub tolerance: f64,

    /// Upper bound on `iterate()` calls made by a single `update()`
    pub max_iterations: usize,

    /// Gram-Schmidt processing order
    pub order: GramSchmidtOrder,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            order: GramSchmidtOrder::Sequential,
        }
    }
}

impl ConvergenceConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_order(mut self, order: GramSchmidtOrder) -> Self {
        self.order = order;
        self
    }

    /// Reject non-positive tolerances and empty budgets
    pub fn validate(&self) -> LatentResult<()> {
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(LatentError::InvalidTolerance(self.tolerance));
        }
        if self.max_iterations == 0 {
            return Err(LatentError::InvalidBudget(self.max_iterations));
        }
        Ok(())
    }
}
