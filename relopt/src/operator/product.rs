use std::fmt::Formatter;

use crate::operator::DisplayFields;

/// Cartesian product of two inputs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Product {}

impl Product {
    pub fn new() -> Self {
        Self {}
    }
}

impl DisplayFields for Product {
    fn display(&self, _fmt: &mut Formatter) -> std::fmt::Result {
        Ok(())
    }
}
