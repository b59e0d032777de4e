//! # latrec-latent
//!
//! Latent factor models for link prediction and recommendation over typed,
//! multi-relational networks.
//!
//! A [`Network`] holds entity types (users, items, tags, ...) and weighted
//! sparse relations between them. A [`LatentFactorModel`] approximates the
//! network as
//!
//! ```text
//! X ≈ Σₖ λₖ uₖ vₖᵀ
//! ```
//!
//! and predicts the strength of any edge from its factors. The factors are
//! computed by one of three [`Decomposition`]s:
//!
//! - [`EigenDecomposition`]: signed eigenvectors of the symmetrized
//!   block adjacency matrix by subspace iteration
//! - [`LaplacianDecomposition`]: eigenvectors of a neighbor-aggregation
//!   operator ([`WeightedMean`], [`WeightedSum`] or any [`Aggregator`])
//! - [`MaskDecomposition`]: successive rank-1 extraction from one relation,
//!   downdating only the observed cells
//!
//! All of them iterate until the change reported by `iterate()` drops below
//! [`ConvergenceConfig::tolerance`] or the iteration budget is spent;
//! running out of budget is reported, not raised.
//!
//! ## Quick Start
//!
//! ```
//! use latrec_latent::{ConvergenceConfig, Decomposition, EigenDecomposition, Entity, Network, SpectralTransform};
//! use latrec_sparse::{MatrixFactory, ValueDomain};
//! use scirs2_core::random::{rngs::StdRng, SeedableRng};
//!
//! let mut network = Network::new();
//! let users = network.add_entity_type("user", 3);
//! let items = network.add_entity_type("item", 4);
//! let mut likes = MatrixFactory::new_matrix(3, 4, ValueDomain::Unweighted);
//! likes.set(0, 0, 1.0);
//! likes.set(0, 1, 1.0);
//! likes.set(1, 1, 1.0);
//! likes.set(2, 3, 1.0);
//! network.add_relation(users, items, likes, 1.0)?;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut eigen = EigenDecomposition::new(&network, 2, ConvergenceConfig::default(), &mut rng)?;
//! let info = eigen.update();
//! println!("{}", info);
//!
//! let model = eigen.into_model();
//! let score = model.predict_with(
//!     Entity::new(users, 1),
//!     Entity::new(items, 0),
//!     &SpectralTransform::HyperbolicSine(1.0),
//! );
//! assert!(score.is_finite());
//! # Ok::<(), latrec_latent::LatentError>(())
//! ```

#![deny(warnings)]

pub mod config;
pub mod decomposition;
pub mod eigen;
pub mod error;
pub mod laplacian;
pub mod mask;
pub mod model;
pub mod network;
pub mod spectral;
pub mod utils;

// Re-exports
pub use config::{ConvergenceConfig, GramSchmidtOrder, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
pub use decomposition::{ConvergenceInfo, Decomposition};
pub use eigen::EigenDecomposition;
pub use error::*;
pub use laplacian::{Aggregator, LaplacianDecomposition, WeightedMean, WeightedSum};
pub use mask::MaskDecomposition;
pub use model::{LatentFactorModel, ModelState};
pub use network::{Entity, EntityType, Network, Relation};
pub use spectral::SpectralTransform;
