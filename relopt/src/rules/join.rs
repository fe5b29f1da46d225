use log::{trace, warn};

use crate::error::OptResult;
use crate::operator::{Join, Operator, Predicate, Select};
use crate::optimiser::OptimiserContext;
use crate::plan::{Plan, PlanNodeId, PlanNodeRef};
use crate::rules::pool::PredicatePool;
use crate::rules::RuleId::FuseJoins;
use crate::rules::{Rule, RuleId};
use crate::stat::Relation;

/// Fuses a product and an `left = right` selection above it into a join.
///
/// `left = right` selections are collected on the way down. At a product, every collected
/// predicate equating an attribute of one input with an attribute of the other is a candidate,
/// and the one with the smallest estimated output wins. A predicate on attributes of a single
/// input stays a selection. Each input of a product starts with an empty worklist, so a predicate
/// is only tested against the product where both sides first meet.
///
/// The winner's selection is dropped, the others stay where they are.
#[derive(Clone, Default)]
pub struct FuseJoinsRule {}

impl FuseJoinsRule {
    pub fn new() -> Self {
        Self {}
    }

    fn fuse(
        &self,
        node: &PlanNodeRef,
        worklist: &mut PredicatePool,
        context: &mut OptimiserContext,
    ) -> OptResult<PlanNodeRef> {
        match node.operator() {
            Operator::LogicalSelect(select) if !select.predicate().is_equals_value() => {
                worklist.push(node.id(), select.predicate().clone());
                let input = self.fuse(node.input(0)?, worklist, context)?;
                if worklist.remove(node.id()) {
                    context.new_node(node.operator().clone(), vec![input])
                } else {
                    Ok(input)
                }
            }
            Operator::LogicalSelect(_) | Operator::LogicalProject(_) => {
                let input = self.fuse(node.input(0)?, worklist, context)?;
                context.new_node(node.operator().clone(), vec![input])
            }
            Operator::LogicalProduct(_) => {
                let chosen = self.choose_predicate(node, worklist, context)?;
                let left = self.fuse(node.input(0)?, &mut PredicatePool::default(), context)?;
                let right = self.fuse(node.input(1)?, &mut PredicatePool::default(), context)?;

                match chosen {
                    Some((handle, predicate)) => {
                        if predicate.is_equals_value() {
                            warn!("Joining on value predicate {}", predicate);
                        }
                        worklist.remove(handle);
                        let predicate = if left.output()?.contains(predicate.left_attribute()) {
                            predicate
                        } else {
                            predicate.swapped()
                        };
                        trace!("Fusing product with {}", predicate);
                        context.new_node(Join::new(predicate).into(), vec![left, right])
                    }
                    None => context.new_node(node.operator().clone(), vec![left, right]),
                }
            }
            Operator::LogicalJoin(_) => {
                let left = self.fuse(node.input(0)?, &mut PredicatePool::default(), context)?;
                let right = self.fuse(node.input(1)?, &mut PredicatePool::default(), context)?;
                context.new_node(node.operator().clone(), vec![left, right])
            }
            Operator::LogicalScan(_) => Ok(node.clone()),
        }
    }

    /// Picks the pending predicate giving the smallest output when applied to `product`.
    fn choose_predicate(
        &self,
        product: &PlanNodeRef,
        worklist: &PredicatePool,
        context: &OptimiserContext,
    ) -> OptResult<Option<(PlanNodeId, Predicate)>> {
        let output = product.output()?;
        let (left, right) = (product.input(0)?.output()?, product.input(1)?.output()?);
        let candidates: Vec<_> = worklist
            .iter()
            .filter(|pending| connects(&pending.predicate, left, right))
            .collect();
        if candidates.len() > 1 {
            warn!(
                "{} join predicates apply to product (id {})",
                candidates.len(),
                product.id()
            );
        }

        let mut chosen: Option<(PlanNodeId, Predicate, u64)> = None;
        for pending in candidates {
            let selected = Select::new(pending.predicate.clone());
            let tuples = context
                .estimator()
                .estimate_operator(&selected.into(), &[output])?
                .tuple_count();
            trace!("Candidate {} yields {} tuples", pending.predicate, tuples);
            if chosen.as_ref().map_or(true, |(_, _, min)| tuples < *min) {
                chosen = Some((pending.handle, pending.predicate.clone(), tuples));
            }
        }

        Ok(chosen.map(|(handle, predicate, _)| (handle, predicate)))
    }
}

/// Whether `predicate` equates an attribute of `left` with an attribute of `right`, in either
/// order.
fn connects(predicate: &Predicate, left: &Relation, right: &Relation) -> bool {
    match predicate.right_attribute() {
        Some(other) => {
            let attr = predicate.left_attribute();
            (left.contains(attr) && right.contains(other))
                || (left.contains(other) && right.contains(attr))
        }
        None => false,
    }
}

impl Rule for FuseJoinsRule {
    fn apply(&self, plan: &Plan, context: &mut OptimiserContext) -> OptResult<Plan> {
        let mut worklist = PredicatePool::default();
        let root = self.fuse(&plan.root(), &mut worklist, context)?;
        Ok(Plan::new(root))
    }

    fn rule_id(&self) -> RuleId {
        FuseJoins
    }
}
