use derive_more::Display;
use itertools::Itertools;
use serde::Deserialize;

use crate::error::{OptResult, OptimiserError};

/// Reference to an attribute by name.
///
/// Predicates and projections only refer to attributes, they never carry statistics. Two
/// attributes are the same attribute if and only if their names are equal.
#[derive(Clone, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct Column(String);

impl Column {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::new(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column(name)
    }
}

/// Statistics of one attribute.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash, Deserialize)]
#[display(fmt = "{}:{}", name, value_count)]
pub struct Attribute {
    name: Column,
    /// Number of distinct values.
    ///
    /// This maybe an estimated value.
    value_count: u64,
}

impl Attribute {
    pub fn new<C: Into<Column>>(name: C, value_count: u64) -> Self {
        Self {
            name: name.into(),
            value_count,
        }
    }

    pub fn column(&self) -> &Column {
        &self.name
    }

    pub fn name(&self) -> &str {
        self.name.name()
    }

    pub fn value_count(&self) -> u64 {
        self.value_count
    }

    /// Same attribute with another value count.
    pub fn with_value_count(&self, value_count: u64) -> Self {
        Self {
            name: self.name.clone(),
            value_count,
        }
    }
}

/// Estimated output of a plan node.
///
/// Attributes are kept in output order, and names are expected to be unique.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Relation {
    /// Total number of tuples.
    ///
    /// This maybe an estimated value.
    tuple_count: u64,
    #[serde(default)]
    attributes: Vec<Attribute>,
}

impl Relation {
    pub fn new(tuple_count: u64) -> Self {
        Self {
            tuple_count,
            attributes: vec![],
        }
    }

    pub fn with_attributes<I>(tuple_count: u64, attributes: I) -> Self
    where
        I: IntoIterator<Item = Attribute>,
    {
        Self {
            tuple_count,
            attributes: attributes.into_iter().collect(),
        }
    }

    pub fn tuple_count(&self) -> u64 {
        self.tuple_count
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.attributes.iter().map(Attribute::column)
    }

    pub fn attribute(&self, column: &Column) -> Option<&Attribute> {
        self.attributes.iter().find(|attr| attr.column() == column)
    }

    pub fn contains(&self, column: &Column) -> bool {
        self.attribute(column).is_some()
    }

    /// Like [`Relation::attribute`], but a missing attribute is an error.
    pub fn resolve(&self, column: &Column) -> OptResult<&Attribute> {
        self.attribute(column).ok_or_else(|| {
            OptimiserError::UnknownAttribute {
                column: column.clone(),
                available: self.columns().join(", "),
            }
            .into()
        })
    }
}
