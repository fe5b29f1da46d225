use std::collections::HashSet;

use log::trace;

use crate::error::OptResult;
use crate::operator::{Operator, Project};
use crate::optimiser::OptimiserContext;
use crate::plan::{Plan, PlanNodeRef};
use crate::rules::RuleId::PushProjectsDown;
use crate::rules::{Rule, RuleId};
use crate::stat::Column;

/// Projects away attributes as early as possible.
///
/// Only applies when the plan's root is a projection. The set of needed attributes starts with
/// the root's columns and grows with the predicate attributes of every selection and join on the
/// way down. Existing projections are replaced: every scan, selection, product and join gets a
/// projection on top of it keeping the needed attributes, unless that projection would keep all
/// attributes or none.
#[derive(Clone, Default)]
pub struct PushProjectsDownRule {}

impl PushProjectsDownRule {
    pub fn new() -> Self {
        Self {}
    }

    fn push_down(
        &self,
        node: &PlanNodeRef,
        needed: &HashSet<Column>,
        context: &mut OptimiserContext,
    ) -> OptResult<PlanNodeRef> {
        match node.operator() {
            Operator::LogicalProject(project) => {
                let mut needed = needed.clone();
                needed.extend(project.columns().iter().cloned());
                self.push_down(node.input(0)?, &needed, context)
            }
            Operator::LogicalSelect(_) | Operator::LogicalJoin(_) => {
                let mut input_needed = needed.clone();
                if let Some(predicate) = node.operator().predicate() {
                    input_needed.extend(predicate.columns().into_iter().cloned());
                }
                let inputs = node
                    .inputs()
                    .iter()
                    .map(|input| self.push_down(input, &input_needed, context))
                    .collect::<OptResult<Vec<PlanNodeRef>>>()?;
                let rebuilt = context.new_node(node.operator().clone(), inputs)?;
                append_project(rebuilt, needed, context)
            }
            Operator::LogicalProduct(_) => {
                let inputs = node
                    .inputs()
                    .iter()
                    .map(|input| self.push_down(input, needed, context))
                    .collect::<OptResult<Vec<PlanNodeRef>>>()?;
                let rebuilt = context.new_node(node.operator().clone(), inputs)?;
                append_project(rebuilt, needed, context)
            }
            Operator::LogicalScan(_) => append_project(node.clone(), needed, context),
        }
    }
}

/// Puts a projection on `needed` above `node` unless it would keep all attributes or none.
fn append_project(
    node: PlanNodeRef,
    needed: &HashSet<Column>,
    context: &mut OptimiserContext,
) -> OptResult<PlanNodeRef> {
    let output = node.output()?;
    let columns: Vec<Column> = output
        .columns()
        .filter(|column| needed.contains(*column))
        .cloned()
        .collect();
    if columns.is_empty() || columns.len() == output.attributes().len() {
        return Ok(node);
    }

    let project: Operator = Project::new(columns).into();
    trace!("Placing {} above {}", project, node.operator());
    context.new_node(project, vec![node])
}

impl Rule for PushProjectsDownRule {
    fn apply(&self, plan: &Plan, context: &mut OptimiserContext) -> OptResult<Plan> {
        let root = plan.root();
        if !matches!(root.operator(), Operator::LogicalProject(_)) {
            return Ok(Plan::new(root));
        }

        let root = self.push_down(&root, &HashSet::new(), context)?;
        Ok(Plan::new(root))
    }

    fn rule_id(&self) -> RuleId {
        PushProjectsDown
    }
}
