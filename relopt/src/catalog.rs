//! Base relations known to the optimiser.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{OptResult, OptimiserError};
use crate::stat::{Attribute, Column, Relation};

pub type NamedRelationRef = Arc<NamedRelation>;

/// A base relation registered in a [`Catalogue`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct NamedRelation {
    name: String,
    #[serde(flatten)]
    relation: Relation,
}

impl NamedRelation {
    pub fn new<S, I>(name: S, tuple_count: u64, attributes: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = Attribute>,
    {
        Self {
            name: name.into(),
            relation: Relation::with_attributes(tuple_count, attributes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub fn contains(&self, column: &Column) -> bool {
        self.relation.contains(column)
    }
}

/// Maps relation names to base relations.
///
/// The catalogue is read only during optimisation, and is shared by all optimisation calls.
/// It can be deserialized from a list of relations:
///
/// ```yaml
/// - name: R
///   tuple_count: 1000
///   attributes:
///     - { name: R.a, value_count: 100 }
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(from = "Vec<NamedRelation>")]
pub struct Catalogue {
    relations: HashMap<String, NamedRelationRef>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a relation, replacing any relation with same name.
    pub fn register(&mut self, relation: NamedRelation) -> NamedRelationRef {
        let relation = Arc::new(relation);
        self.relations
            .insert(relation.name().to_string(), relation.clone());
        relation
    }

    pub fn create_relation<S, I>(
        &mut self,
        name: S,
        tuple_count: u64,
        attributes: I,
    ) -> NamedRelationRef
    where
        S: Into<String>,
        I: IntoIterator<Item = Attribute>,
    {
        self.register(NamedRelation::new(name, tuple_count, attributes))
    }

    pub fn relation(&self, name: &str) -> OptResult<NamedRelationRef> {
        self.relations
            .get(name)
            .cloned()
            .ok_or_else(|| OptimiserError::UnknownRelation(name.to_string()).into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl From<Vec<NamedRelation>> for Catalogue {
    fn from(relations: Vec<NamedRelation>) -> Self {
        let mut catalogue = Catalogue::new();
        for relation in relations {
            catalogue.register(relation);
        }
        catalogue
    }
}
