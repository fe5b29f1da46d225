//! Defines cost model.
//!
//! The cost of a plan node is its estimated output cardinality. The [`Estimator`] derives it
//! bottom up, together with the number of distinct values of every output attribute, which is
//! what later selectivity estimates depend on.

mod estimator;
pub use estimator::*;
