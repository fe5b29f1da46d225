use std::fmt::Formatter;

use crate::catalog::NamedRelationRef;
use crate::operator::DisplayFields;

/// Leaf operator reading a base relation.
#[derive(Clone, Debug, PartialEq)]
pub struct Scan {
    relation: NamedRelationRef,
}

impl Scan {
    pub fn new(relation: NamedRelationRef) -> Self {
        Self { relation }
    }

    pub fn relation(&self) -> &NamedRelationRef {
        &self.relation
    }
}

impl DisplayFields for Scan {
    fn display(&self, fmt: &mut Formatter) -> std::fmt::Result {
        fmt.debug_struct("")
            .field("relation", &self.relation.name())
            .finish()
    }
}
