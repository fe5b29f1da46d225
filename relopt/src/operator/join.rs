use std::fmt::Formatter;

use crate::operator::{DisplayFields, Predicate};

/// Logical equi join.
///
/// Never appears in a canonical plan, joins are only created by fusing a selection with the
/// product below it.
#[derive(Clone, Debug, PartialEq)]
pub struct Join {
    predicate: Predicate,
}

impl Join {
    pub fn new(predicate: Predicate) -> Self {
        Self { predicate }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl DisplayFields for Join {
    fn display(&self, fmt: &mut Formatter) -> std::fmt::Result {
        fmt.debug_struct("")
            .field("predicate", &format_args!("{}", self.predicate))
            .finish()
    }
}
