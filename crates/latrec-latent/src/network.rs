//! Typed entities and the weighted relations between them
//!
//! A [`Network`] is the dataset a decomposition runs over: a list of entity
//! types (users, items, tags, ...) with their sizes, and a list of relations,
//! each a sparse matrix whose rows index the source type and whose columns
//! index the target type. Shapes are checked when a relation is added, so the
//! decompositions can index factor blocks without further validation.

use crate::error::{LatentError, LatentResult};
use latrec_sparse::Matrix;

/// Handle of an entity type inside a [`Network`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityType(usize);

impl EntityType {
    /// Handle for the `index`-th registered type
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// A single entity: its type and its id within that type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    pub ty: EntityType,
    pub id: usize,
}

impl Entity {
    pub fn new(ty: EntityType, id: usize) -> Self {
        Self { ty, id }
    }
}

/// Weighted relation from `source` entities (rows) to `target` entities (columns)
#[derive(Debug)]
pub struct Relation {
    pub source: EntityType,
    pub target: EntityType,
    pub matrix: Box<dyn Matrix>,
    pub weight: f64,
}

impl Relation {
    /// Whether the relation links a type to itself through symmetric storage
    ///
    /// Such a relation already is its own transpose and is applied once.
    pub fn is_self_symmetric(&self) -> bool {
        self.source == self.target && self.matrix.is_symmetric()
    }
}

#[derive(Debug, Clone)]
struct TypeInfo {
    name: String,
    size: usize,
}

/// Entity types and the relations over them
#[derive(Debug, Default)]
pub struct Network {
    types: Vec<TypeInfo>,
    relations: Vec<Relation>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Network with one type of `matrix.rows()` entities and one relation on it
    ///
    /// # Errors
    ///
    /// Returns [`LatentError::RelationShape`] if `matrix` is not square.
    ///
    /// # Examples
    ///
    /// ```
    /// use latrec_latent::Network;
    /// use latrec_sparse::{MatrixFactory, ValueDomain};
    ///
    /// let mut a = MatrixFactory::new_symmetric(4, ValueDomain::Unweighted);
    /// a.set(0, 1, 1.0);
    /// let (network, nodes) = Network::unipartite("node", a)?;
    /// assert_eq!(network.size(nodes), 4);
    /// assert_eq!(network.relations().len(), 1);
    /// # Ok::<(), latrec_latent::LatentError>(())
    /// ```
    pub fn unipartite(name: &str, matrix: Box<dyn Matrix>) -> LatentResult<(Self, EntityType)> {
        let mut network = Self::new();
        let ty = network.add_entity_type(name, matrix.rows());
        network.add_relation(ty, ty, matrix, 1.0)?;
        Ok((network, ty))
    }

    /// Register a type of `size` entities
    pub fn add_entity_type(&mut self, name: &str, size: usize) -> EntityType {
        self.types.push(TypeInfo {
            name: name.to_string(),
            size,
        });
        EntityType(self.types.len() - 1)
    }

    /// Add a relation and return its index
    ///
    /// # Errors
    ///
    /// - [`LatentError::UnknownEntityType`] if either type was not registered
    /// - [`LatentError::RelationShape`] if `matrix` is not `|source| × |target|`
    /// - [`LatentError::InvalidWeight`] if `weight` is not finite
    pub fn add_relation(
        &mut self,
        source: EntityType,
        target: EntityType,
        matrix: Box<dyn Matrix>,
        weight: f64,
    ) -> LatentResult<usize> {
        let expected_rows = self.checked_size(source)?;
        let expected_cols = self.checked_size(target)?;
        if matrix.rows() != expected_rows || matrix.cols() != expected_cols {
            return Err(LatentError::RelationShape {
                source_type: source.0,
                target_type: target.0,
                expected_rows,
                expected_cols,
                rows: matrix.rows(),
                cols: matrix.cols(),
            });
        }
        if !weight.is_finite() {
            return Err(LatentError::InvalidWeight(weight));
        }

        self.relations.push(Relation {
            source,
            target,
            matrix,
            weight,
        });
        Ok(self.relations.len() - 1)
    }

    pub fn n_types(&self) -> usize {
        self.types.len()
    }

    /// Entity count of `ty`
    ///
    /// Panics if `ty` does not belong to this network.
    pub fn size(&self, ty: EntityType) -> usize {
        self.types[ty.0].size
    }

    pub fn name(&self, ty: EntityType) -> &str {
        &self.types[ty.0].name
    }

    /// Handle of the type registered under `name`
    pub fn entity_type(&self, name: &str) -> Option<EntityType> {
        self.types.iter().position(|t| t.name == name).map(EntityType)
    }

    /// Entity counts indexed by type
    pub fn type_sizes(&self) -> Vec<usize> {
        self.types.iter().map(|t| t.size).collect()
    }

    /// Number of entities over all types
    pub fn total_entities(&self) -> usize {
        self.types.iter().map(|t| t.size).sum()
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn relation(&self, index: usize) -> LatentResult<&Relation> {
        self.relations
            .get(index)
            .ok_or(LatentError::UnknownRelation(index))
    }

    fn checked_size(&self, ty: EntityType) -> LatentResult<usize> {
        self.types
            .get(ty.0)
            .map(|t| t.size)
            .ok_or(LatentError::UnknownEntityType(ty.0))
    }
}
