use std::fmt::Formatter;

use itertools::Itertools;

use crate::operator::DisplayFields;
use crate::stat::Column;

/// Logical projection, without duplicate elimination.
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    columns: Vec<Column>,
}

impl Project {
    pub fn new<I, C>(columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl DisplayFields for Project {
    fn display(&self, fmt: &mut Formatter) -> std::fmt::Result {
        fmt.debug_struct("")
            .field("columns", &format_args!("[{}]", self.columns.iter().join(", ")))
            .finish()
    }
}
