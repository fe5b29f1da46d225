use std::fmt::{Display, Formatter};

use smallvec::{smallvec, SmallVec};

use crate::stat::{Column, Relation};

/// Equality predicate of a selection or join.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Predicate {
    /// `attribute = value`
    EqualsValue { attribute: Column, value: String },
    /// `left = right`
    EqualsAttribute { left: Column, right: Column },
}

impl Predicate {
    pub fn equals_value<C: Into<Column>, S: Into<String>>(attribute: C, value: S) -> Self {
        Predicate::EqualsValue {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn equals_attribute<L: Into<Column>, R: Into<Column>>(left: L, right: R) -> Self {
        Predicate::EqualsAttribute {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn is_equals_value(&self) -> bool {
        matches!(self, Predicate::EqualsValue { .. })
    }

    pub fn left_attribute(&self) -> &Column {
        match self {
            Predicate::EqualsValue { attribute, .. } => attribute,
            Predicate::EqualsAttribute { left, .. } => left,
        }
    }

    /// `None` for `attribute = value`.
    pub fn right_attribute(&self) -> Option<&Column> {
        match self {
            Predicate::EqualsValue { .. } => None,
            Predicate::EqualsAttribute { right, .. } => Some(right),
        }
    }

    /// All referenced attributes, left first.
    pub fn columns(&self) -> SmallVec<[&Column; 2]> {
        match self {
            Predicate::EqualsValue { attribute, .. } => smallvec![attribute],
            Predicate::EqualsAttribute { left, right } => smallvec![left, right],
        }
    }

    /// Whether every referenced attribute is visible in `relation`.
    pub fn is_covered_by(&self, relation: &Relation) -> bool {
        self.columns().into_iter().all(|c| relation.contains(c))
    }

    /// Swaps both sides of `left = right`. `attribute = value` is returned as is.
    pub fn swapped(&self) -> Self {
        match self {
            Predicate::EqualsValue { .. } => self.clone(),
            Predicate::EqualsAttribute { left, right } => Predicate::EqualsAttribute {
                left: right.clone(),
                right: left.clone(),
            },
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Predicate::EqualsValue { attribute, value } => {
                write!(f, "{} = {:?}", attribute, value)
            }
            Predicate::EqualsAttribute { left, right } => write!(f, "{} = {}", left, right),
        }
    }
}
