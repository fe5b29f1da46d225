use anyhow::bail;
use itertools::Itertools;
use log::trace;

use crate::error::{OptResult, OptimiserError};
use crate::operator::Operator;
use crate::optimiser::OptimiserContext;
use crate::plan::{Plan, PlanNodeRef};
use crate::rules::pool::PredicatePool;
use crate::rules::RuleId::PushSelectsDown;
use crate::rules::{Rule, RuleId};

/// Moves each selection to the lowest position where its attributes are visible.
///
/// Selections are collected in a pool on the way down, keyed by the id of their node. A scan
/// takes the `attribute = value` selections on its own attributes, a product or join takes every
/// selection covered by its output. A selection nobody below took stays where it was. Projections
/// are transparent and nothing else moves.
#[derive(Clone, Default)]
pub struct PushSelectsDownRule {}

impl PushSelectsDownRule {
    pub fn new() -> Self {
        Self {}
    }

    fn push_down(
        &self,
        node: &PlanNodeRef,
        pool: &mut PredicatePool,
        context: &mut OptimiserContext,
    ) -> OptResult<PlanNodeRef> {
        match node.operator() {
            Operator::LogicalScan(scan) => {
                let relation = scan.relation();
                let predicates = pool.take_if(|predicate| {
                    predicate.is_equals_value() && relation.contains(predicate.left_attribute())
                });
                for predicate in &predicates {
                    trace!("Placing {} above scan of {}", predicate, relation.name());
                }
                context.wrap_selects(node.clone(), predicates)
            }
            Operator::LogicalSelect(select) => {
                pool.push(node.id(), select.predicate().clone());
                let input = self.push_down(node.input(0)?, pool, context)?;
                if pool.remove(node.id()) {
                    trace!("Keeping {} in place", select.predicate());
                    context.new_node(node.operator().clone(), vec![input])
                } else {
                    Ok(input)
                }
            }
            Operator::LogicalProject(_) => {
                let input = self.push_down(node.input(0)?, pool, context)?;
                context.new_node(node.operator().clone(), vec![input])
            }
            Operator::LogicalProduct(_) | Operator::LogicalJoin(_) => {
                let left = self.push_down(node.input(0)?, pool, context)?;
                let right = self.push_down(node.input(1)?, pool, context)?;
                let rebuilt = context.new_node(node.operator().clone(), vec![left, right])?;

                let output = rebuilt.output()?;
                let predicates = pool.take_if(|predicate| predicate.is_covered_by(output));
                for predicate in &predicates {
                    trace!("Placing {} above {}", predicate, rebuilt.operator());
                }
                context.wrap_selects(rebuilt.clone(), predicates)
            }
        }
    }
}

impl Rule for PushSelectsDownRule {
    fn apply(&self, plan: &Plan, context: &mut OptimiserContext) -> OptResult<Plan> {
        let mut pool = PredicatePool::default();
        let root = self.push_down(&plan.root(), &mut pool, context)?;
        if !pool.is_empty() {
            bail!(OptimiserError::MalformedPlan(format!(
                "selections left unplaced: {}",
                pool.iter().map(|pending| &pending.predicate).join(", ")
            )));
        }
        Ok(Plan::new(root))
    }

    fn rule_id(&self) -> RuleId {
        PushSelectsDown
    }
}
