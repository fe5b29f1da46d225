//! ## Background
//!
//! The optimiser accepts a canonical logical query plan, and outputs a cheaper plan which returns
//! the same result. A canonical plan is built directly from query syntax: every relation in the
//! `FROM` clause is scanned, the scans are combined with cartesian products in a left deep chain,
//! the `WHERE` conditions become selections above the chain, and an optional projection sits at
//! the top.
//!
//! Such a plan is correct but expensive, since every product materializes the full cross product
//! of its inputs. This crate implements a heuristic rewriter for it. It does not enumerate the
//! plan space as a cost based optimiser would [1]; instead it applies a fixed sequence of rewrite
//! phases, and uses a statistical cost model to make local decisions inside each phase.
//!
//! ## Design
//!
//! * [`stat`] Attributes, relations and their statistics.
//! * [`catalog`] Named base relations.
//! * [`operator`] Relational operators and predicates.
//! * [`plan`] Plan tree, builder and explain utilities.
//! * [`cost`] Cardinality estimation.
//! * [`rules`] Rewrite phases.
//! * [`optimiser`] Pipeline driving the rewrite phases.
//!
//! The estimator follows the classic uniform distribution model: an equality selection on
//! attribute `A` keeps `1/V(A)` of its input, where `V(A)` is the number of distinct values of `A`,
//! and an equi-join keeps `1/max(V(A), V(B))` of the cartesian product [1][2].
//!
//! ## Reference
//!
//! 1. Selinger, P. Griffiths, et al. "Access path selection in a relational database management
//! system." Readings in Artificial Intelligence and Databases. Morgan Kaufmann, 1989. 511-522.
//! 2. Garcia-Molina, H., Ullman, J.D. and Widom, J., 2008. Database Systems: The Complete Book,
//! chapter 16, "The Query Compiler".

#[macro_use]
extern crate prettytable;

pub mod catalog;
pub mod cost;
pub mod error;
pub mod operator;
pub mod optimiser;
pub mod plan;
pub mod rules;
pub mod stat;

#[cfg(test)]
pub(crate) mod test_utils;
