//! Rewrite rules.
//!
//! A rule consumes a whole estimated plan and produces an equivalent plan, which is assumed to be
//! cheaper than the original one. Rules never modify their input plan, they build new nodes and
//! may share unchanged subtrees with the input.
//!
//! The rules are order dependent, [`Optimiser`](crate::optimiser::Optimiser) applies them in a
//! fixed sequence:
//!
//! 1. [`PushSelectsDownRule`] moves every selection to the lowest position where all of its
//! attributes are visible.
//! 2. [`ReorderProductsRule`] moves the smallest inputs of a chain of products to the bottom.
//! 3. [`PushSelectsDownRule`] again, to place the selections detached by reordering.
//! 4. [`FuseJoinsRule`] merges each product with the selection above it into a join.
//! 5. [`PushProjectsDownRule`] projects away attributes as early as possible.
//!
//! ```no
//!  Project[R.a, S.c]                                    Project[R.a, S.c]
//!         |                                                    |
//!  Select[R.b = S.b]                                    Join[R.b = S.b]
//!         |                     -------->                  /        \
//!      Product                                        Scan(R)      Scan(S)
//!      /     \
//!  Scan(R)  Scan(S)
//! ```
mod pool;
mod select_push_down;
pub use select_push_down::*;
mod product_reorder;
pub use product_reorder::*;
mod join;
pub use join::*;
mod project_push_down;
pub use project_push_down::*;

use std::fmt::{Debug, Formatter};

use enum_dispatch::enum_dispatch;
use enumset::EnumSetType;
use strum_macros::AsRefStr;

use crate::error::OptResult;
use crate::optimiser::OptimiserContext;
use crate::plan::Plan;

#[enum_dispatch(RuleImpl)]
pub trait Rule {
    /// Rewrites the whole plan.
    fn apply(&self, plan: &Plan, context: &mut OptimiserContext) -> OptResult<Plan>;

    /// Use to identify each rule.
    ///
    /// This is used to switch rules off in [`OptimiserConfig`](crate::optimiser::OptimiserConfig).
    fn rule_id(&self) -> RuleId;
}

#[enum_dispatch]
#[derive(Clone, AsRefStr)]
pub enum RuleImpl {
    PushSelectsDownRule,
    ReorderProductsRule,
    FuseJoinsRule,
    PushProjectsDownRule,
}

#[derive(EnumSetType, Debug)]
pub enum RuleId {
    PushSelectsDown,
    ReorderProducts,
    FuseJoins,
    PushProjectsDown,
}

impl Debug for RuleImpl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_ref())
    }
}
