use std::sync::Arc;

use crate::error::{OptResult, OptimiserError};
use crate::operator::Operator;
use crate::stat::Relation;

pub mod explain;
mod logical;
pub use logical::*;

pub type PlanNodeId = u32;

pub type PlanNodeRef = Arc<PlanNode>;

#[derive(Clone, Debug, Default)]
pub struct PlanNodeIdGen {
    next: PlanNodeId,
}

impl PlanNodeIdGen {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn gen_next(&mut self) -> PlanNodeId {
        self.next += 1;
        self.next
    }
}

/// One node in a plan.
///
/// Nodes are immutable once built. Every rewrite builds new nodes, unchanged subtrees may be
/// shared between the input and output plan of a rewrite.
#[derive(Debug)]
pub struct PlanNode {
    id: PlanNodeId,
    operator: Operator,
    inputs: Vec<PlanNodeRef>,
    /// Estimated output, `None` until estimated.
    output: Option<Relation>,
}

/// The `eq` should ignore `id`.
impl PartialEq for PlanNode {
    fn eq(&self, other: &Self) -> bool {
        self.operator == other.operator
            && self.inputs == other.inputs
            && self.output == other.output
    }
}

/// A query plan, a tree with a single root.
#[derive(PartialEq, Debug)]
pub struct Plan {
    root: PlanNodeRef,
}

/// Pre order iterator of a plan.
struct PreOrderPlanNodeIter {
    stack: Vec<PlanNodeRef>,
}

impl Iterator for PreOrderPlanNodeIter {
    type Item = PlanNodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push in reverse so that the left most input is visited first
        self.stack.extend(node.inputs.iter().rev().cloned());
        Some(node)
    }
}

impl Plan {
    pub fn new(root: PlanNodeRef) -> Self {
        Self { root }
    }

    pub fn root(&self) -> PlanNodeRef {
        self.root.clone()
    }

    /// Root's estimated output.
    pub fn output(&self) -> OptResult<&Relation> {
        self.root.output()
    }

    pub fn nodes_iter(&self) -> impl Iterator<Item = PlanNodeRef> {
        PreOrderPlanNodeIter {
            stack: vec![self.root.clone()],
        }
    }
}

impl PlanNode {
    pub fn new(id: PlanNodeId, operator: Operator, inputs: Vec<PlanNodeRef>) -> Self {
        Self {
            id,
            operator,
            inputs,
            output: None,
        }
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn id(&self) -> PlanNodeId {
        self.id
    }

    pub fn inputs(&self) -> &[PlanNodeRef] {
        &self.inputs
    }

    pub fn input(&self, idx: usize) -> OptResult<&PlanNodeRef> {
        self.inputs.get(idx).ok_or_else(|| {
            OptimiserError::MalformedPlan(format!(
                "{} (id {}) has no input {}",
                self.operator, self.id, idx
            ))
            .into()
        })
    }

    /// Estimated output, estimating a node's inputs must happen before the node itself.
    pub fn output(&self) -> OptResult<&Relation> {
        self.output.as_ref().ok_or_else(|| {
            OptimiserError::MalformedPlan(format!(
                "{} (id {}) has not been estimated",
                self.operator, self.id
            ))
            .into()
        })
    }

    pub fn is_estimated(&self) -> bool {
        self.output.is_some()
    }

    /// Attaches an estimated output, replacing any previous estimation.
    pub fn with_output(mut self, output: Relation) -> Self {
        self.output = Some(output);
        self
    }
}

pub struct PlanNodeBuilder {
    plan_node: PlanNode,
}

impl PlanNodeBuilder {
    pub fn new(id: PlanNodeId, operator: Operator) -> Self {
        Self {
            plan_node: PlanNode::new(id, operator, vec![]),
        }
    }

    pub fn add_inputs<I>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = PlanNodeRef>,
    {
        self.plan_node.inputs.extend(inputs);
        self
    }

    pub fn build(self) -> PlanNode {
        self.plan_node
    }
}
