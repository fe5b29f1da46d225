use std::fmt::Formatter;

use crate::operator::{DisplayFields, Predicate};

/// Logical selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Select {
    predicate: Predicate,
}

impl Select {
    pub fn new(predicate: Predicate) -> Self {
        Self { predicate }
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl DisplayFields for Select {
    fn display(&self, fmt: &mut Formatter) -> std::fmt::Result {
        fmt.debug_struct("")
            .field("predicate", &format_args!("{}", self.predicate))
            .finish()
    }
}
