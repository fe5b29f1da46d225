use std::collections::HashSet;

use log::trace;

use crate::error::OptResult;
use crate::operator::{Operator, Predicate};
use crate::optimiser::OptimiserContext;
use crate::plan::{Plan, PlanNodeRef};
use crate::rules::RuleId::ReorderProducts;
use crate::rules::{Rule, RuleId};
use crate::stat::Column;

/// Moves small inputs of a left deep chain of products towards the bottom.
///
/// The right input of every product is stashed in a pool on the way down. Then:
///
/// 1. At the deepest product only, the smallest pooled subtree replaces the left input if it is
/// smaller. The displaced left input takes its place in the pool.
/// 2. At every product, the smallest unplaced subtree replaces the right input if it is smaller.
///
/// This makes a single greedy decision per plan instead of enumerating join orders.
///
/// Selections referring to an attribute of a moved subtree may no longer be legal where they are,
/// they are detached and put back above the whole chain, under the projection at the root if
/// there is one. [`PushSelectsDownRule`](crate::rules::PushSelectsDownRule) is expected to run
/// next and move them down again.
#[derive(Clone, Default)]
pub struct ReorderProductsRule {}

impl ReorderProductsRule {
    pub fn new() -> Self {
        Self {}
    }
}

impl Rule for ReorderProductsRule {
    fn apply(&self, plan: &Plan, context: &mut OptimiserContext) -> OptResult<Plan> {
        let mut reorderer = Reorderer::new(context);
        let root = reorderer.reorder(&plan.root())?;
        Ok(Plan::new(reorderer.reattach(root)?))
    }

    fn rule_id(&self) -> RuleId {
        ReorderProducts
    }
}

struct PooledSubtree {
    subtree: PlanNodeRef,
    placed: bool,
}

struct Reorderer<'a> {
    context: &'a mut OptimiserContext,
    pool: Vec<PooledSubtree>,
    reorder_deepest: bool,
    /// Attributes of every subtree that moved.
    reordered: HashSet<Column>,
    detached: Vec<Predicate>,
}

impl<'a> Reorderer<'a> {
    fn new(context: &'a mut OptimiserContext) -> Self {
        Self {
            context,
            pool: vec![],
            reorder_deepest: true,
            reordered: HashSet::new(),
            detached: vec![],
        }
    }

    fn reorder(&mut self, node: &PlanNodeRef) -> OptResult<PlanNodeRef> {
        match node.operator() {
            Operator::LogicalProduct(_) => self.reorder_product(node),
            Operator::LogicalSelect(select) => {
                let input = self.reorder(node.input(0)?)?;
                let predicate = select.predicate();
                if predicate
                    .columns()
                    .into_iter()
                    .any(|column| self.reordered.contains(column))
                {
                    trace!("Detaching {}", predicate);
                    self.detached.push(predicate.clone());
                    Ok(input)
                } else {
                    self.context
                        .new_node(node.operator().clone(), vec![input])
                }
            }
            Operator::LogicalProject(_) => {
                let input = self.reorder(node.input(0)?)?;
                self.context
                    .new_node(node.operator().clone(), vec![input])
            }
            Operator::LogicalScan(_) | Operator::LogicalJoin(_) => Ok(node.clone()),
        }
    }

    fn reorder_product(&mut self, node: &PlanNodeRef) -> OptResult<PlanNodeRef> {
        let slot = self.pool.len();
        self.pool.push(PooledSubtree {
            subtree: node.input(1)?.clone(),
            placed: false,
        });

        let mut left = self.reorder(node.input(0)?)?;
        if self.reorder_deepest {
            self.reorder_deepest = false;
            let left_tuples = left.output()?.tuple_count();
            if let Some(idx) = self.smallest_unplaced(Some(slot), left_tuples)? {
                let displaced = left;
                left = std::mem::replace(&mut self.pool[idx].subtree, displaced.clone());
                trace!(
                    "Swapped left input {} with smaller {}",
                    displaced.operator(),
                    left.operator()
                );
                self.mark_reordered(&left)?;
                self.mark_reordered(&displaced)?;
            }
        }

        self.pool[slot].placed = true;
        let original = self.pool[slot].subtree.clone();
        let right_tuples = original.output()?.tuple_count();
        let right = match self.smallest_unplaced(None, right_tuples)? {
            Some(idx) => {
                let right = std::mem::replace(&mut self.pool[idx].subtree, original.clone());
                self.pool[slot].subtree = right.clone();
                trace!(
                    "Swapped right input {} with smaller {}",
                    original.operator(),
                    right.operator()
                );
                self.mark_reordered(&right)?;
                self.mark_reordered(&original)?;
                right
            }
            None => original,
        };

        self.context
            .new_node(node.operator().clone(), vec![left, right])
    }

    /// Index of the smallest unplaced subtree with fewer tuples than `than`.
    fn smallest_unplaced(&self, exclude: Option<usize>, than: u64) -> OptResult<Option<usize>> {
        let mut smallest: Option<(usize, u64)> = None;
        for (idx, pooled) in self.pool.iter().enumerate() {
            if pooled.placed || Some(idx) == exclude {
                continue;
            }
            let tuples = pooled.subtree.output()?.tuple_count();
            if tuples < than && smallest.map_or(true, |(_, min)| tuples < min) {
                smallest = Some((idx, tuples));
            }
        }
        Ok(smallest.map(|(idx, _)| idx))
    }

    fn mark_reordered(&mut self, subtree: &PlanNodeRef) -> OptResult<()> {
        self.reordered
            .extend(subtree.output()?.columns().cloned());
        Ok(())
    }

    /// Puts detached selections back above the chain.
    fn reattach(self, root: PlanNodeRef) -> OptResult<PlanNodeRef> {
        if self.detached.is_empty() {
            return Ok(root);
        }

        if matches!(root.operator(), Operator::LogicalProject(_)) {
            let input = self
                .context
                .wrap_selects(root.input(0)?.clone(), self.detached)?;
            self.context
                .new_node(root.operator().clone(), vec![input])
        } else {
            self.context.wrap_selects(root, self.detached)
        }
    }
}
