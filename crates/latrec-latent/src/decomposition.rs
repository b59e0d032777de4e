//! The iterate/update protocol shared by all decompositions

use crate::config::ConvergenceConfig;
use crate::model::LatentFactorModel;
use std::fmt;
use tracing::{debug, warn};

/// Outcome of [`Decomposition::update`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceInfo {
    /// `iterate()` calls made by this update
    pub iterations: usize,
    /// Change reported by the last iteration
    pub change: f64,
    /// Whether the criterion was met before the budget ran out
    pub converged: bool,
}

impl fmt::Display for ConvergenceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} after {} iterations (change {:.3e})",
            if self.converged { "converged" } else { "not converged" },
            self.iterations,
            self.change
        )
    }
}

/// A variant-specific way of driving a [`LatentFactorModel`] towards convergence
///
/// Implementors provide one step (`iterate`) and access to their model and
/// settings; `update` repeats the step until the variant reports
/// convergence or the budget is spent.
pub trait Decomposition {
    fn model(&self) -> &LatentFactorModel;

    fn model_mut(&mut self) -> &mut LatentFactorModel;

    fn config(&self) -> &ConvergenceConfig;

    /// One refinement step; returns the variant's convergence measure
    fn iterate(&mut self) -> f64;

    /// Whether the decomposition is done given the last measure
    fn is_converged(&self, change: f64) -> bool {
        change < self.config().tolerance
    }

    /// Iteration budget of a single `update()`
    fn budget(&self) -> usize {
        self.config().max_iterations
    }

    /// Iterate until converged or out of budget
    ///
    /// Non-convergence is not an error: the model keeps its last factors and
    /// the returned info has `converged == false`.
    fn update(&mut self) -> ConvergenceInfo {
        let budget = self.budget();
        let mut change = f64::INFINITY;

        for iteration in 1..=budget {
            change = self.iterate();
            self.model_mut().record_iteration();

            if self.is_converged(change) {
                self.model_mut().mark_converged();
                debug!(iterations = iteration, change, "decomposition converged");
                return ConvergenceInfo {
                    iterations: iteration,
                    change,
                    converged: true,
                };
            }
        }

        warn!(
            iterations = budget,
            change,
            tolerance = self.config().tolerance,
            "decomposition did not converge within its iteration budget"
        );
        ConvergenceInfo {
            iterations: budget,
            change,
            converged: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelState;
    use scirs2_core::ndarray_ext::array;

    /// Halves its reported change on every step
    struct Halving {
        model: LatentFactorModel,
        config: ConvergenceConfig,
        change: f64,
    }

    impl Decomposition for Halving {
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
            self.change /= 2.0;
            self.change
        }
    }

    fn halving(tolerance: f64, max_iterations: usize) -> Halving {
        let model =
            LatentFactorModel::from_factors(vec![array![[1.0]]], None, array![1.0]).unwrap();
        Halving {
            model,
            config: ConvergenceConfig::default()
                .with_tolerance(tolerance)
                .with_max_iterations(max_iterations),
            change: 1.0,
        }
    }

    #[test]
    fn test_update_stops_at_tolerance() {
        let mut d = halving(0.1, 100);
        let info = d.update();
        // 1/16 is the first value below 0.1
        assert!(info.converged);
        assert_eq!(info.iterations, 4);
        assert_eq!(info.change, 0.0625);
        assert_eq!(d.model().state(), ModelState::Converged { iterations: 4 });
    }

    #[test]
    fn test_update_reports_exhausted_budget() {
        let mut d = halving(1e-9, 3);
        let info = d.update();
        assert!(!info.converged);
        assert_eq!(info.iterations, 3);
        assert_eq!(d.model().state(), ModelState::Iterating { iterations: 3 });
        assert!(info.to_string().starts_with("not converged after 3"));
    }
}
