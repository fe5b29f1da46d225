//! Contains relational operators such as scan, selection, projection, product and join.
//!
//! The set of operators is closed: the estimator and every rewrite rule match on [`Operator`]
//! exhaustively, so adding an operator forces all of them to handle it.
mod predicate;
pub use predicate::*;
mod scan;
pub use scan::*;
mod select;
pub use select::*;
mod projection;
pub use projection::*;
mod product;
pub use product::*;
mod join;
pub use join::*;

use std::fmt::{Display, Formatter};

use enum_as_inner::EnumAsInner;
use enum_dispatch::enum_dispatch;
use strum_macros::AsRefStr;

/// Logical relational operator.
#[derive(Clone, Debug, PartialEq, EnumAsInner, AsRefStr)]
#[enum_dispatch]
pub enum Operator {
    LogicalScan(Scan),
    LogicalSelect(Select),
    LogicalProject(Project),
    LogicalProduct(Product),
    LogicalJoin(Join),
}

impl Operator {
    /// Number of inputs this operator requires.
    pub fn arity(&self) -> usize {
        match self {
            Operator::LogicalScan(_) => 0,
            Operator::LogicalSelect(_) | Operator::LogicalProject(_) => 1,
            Operator::LogicalProduct(_) | Operator::LogicalJoin(_) => 2,
        }
    }

    /// Predicate of selection or join.
    pub fn predicate(&self) -> Option<&Predicate> {
        match self {
            Operator::LogicalSelect(select) => Some(select.predicate()),
            Operator::LogicalJoin(join) => Some(join.predicate()),
            _ => None,
        }
    }
}

/// Writes operator specific fields after operator name.
#[enum_dispatch(Operator)]
pub trait DisplayFields {
    fn display(&self, fmt: &mut Formatter) -> std::fmt::Result;
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())?;
        self.display(f)
    }
}
