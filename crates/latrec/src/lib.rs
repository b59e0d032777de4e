//! # latrec - Latent Factor Recommendation Substrate
//!
//! Sparse storage and spectral latent factor models for recommendation and
//! link prediction over typed, multi-relational networks.
//!
//! This is the **meta crate** that re-exports the latrec components for
//! convenient access.
//!
//! ## Quick Start
//!
//! ```
//! use latrec::prelude::*;
//! use scirs2_core::random::{rngs::StdRng, SeedableRng};
//!
//! // a small friendship graph
//! let mut friends = MatrixFactory::new_symmetric(5, ValueDomain::Unweighted);
//! for (a, b) in [(0, 1), (1, 2), (2, 0), (2, 3), (3, 4)] {
//!     friends.set(a, b, 1.0);
//! }
//! let (network, people) = Network::unipartite("person", friends)?;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut eigen = EigenDecomposition::new(&network, 2, ConvergenceConfig::default(), &mut rng)?;
//! eigen.update();
//!
//! let model = eigen.into_model();
//! let score = model.predict_with(
//!     Entity::new(people, 0),
//!     Entity::new(people, 3),
//!     &SpectralTransform::Exponential(0.5),
//! );
//! assert!(score.is_finite());
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! ### Sparse Storage ([`sparse`])
//!
//! Sparse vectors and matrices with consistent row and column views, dense
//! products, mutating cursors and width-selecting construction.
//!
//! ```
//! use latrec::sparse::{MatrixFactory, ValueDomain};
//!
//! let mut m = MatrixFactory::new_matrix(300, 20, ValueDomain::Short);
//! m.set(299, 4, 7.0);
//! assert_eq!(m.index_type(), "char");
//! assert_eq!(m.col(4).get(299), 7.0);
//! ```
//!
//! ### Latent Models ([`latent`])
//!
//! Networks of typed relations, latent factor models and their eigen,
//! Laplacian and mask decompositions.
//!
//! ### Logging ([`logging`])
//!
//! `tracing-subscriber` setup for the events the numeric crates emit
//! (enabled by the default `logging` feature).

#![deny(warnings)]

pub use latrec_latent as latent;
pub use latrec_sparse as sparse;

#[cfg(feature = "logging")]
pub mod logging;

/// Prelude module for convenient imports
///
/// ```
/// use latrec::prelude::*;
/// ```
pub mod prelude {
    pub use crate::latent::{
        Aggregator, ConvergenceConfig, ConvergenceInfo, Decomposition, EigenDecomposition,
        Entity, EntityType, GramSchmidtOrder, LaplacianDecomposition, LatentError,
        LatentFactorModel, LatentResult, MaskDecomposition, ModelState, Network,
        SpectralTransform, WeightedMean, WeightedSum,
    };
    pub use crate::sparse::{
        Matrix, MatrixFactory, SparseError, SparseMatrix, SparseResult, SparseVector,
        ValueDomain, Vector,
    };

    pub use anyhow::{Context, Result};
}
