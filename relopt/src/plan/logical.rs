use std::sync::Arc;

use crate::catalog::NamedRelationRef;
use crate::operator::{Join, Operator, Predicate, Product, Project, Scan, Select};
use crate::plan::{Plan, PlanNode, PlanNodeIdGen, PlanNodeRef};
use crate::stat::Column;

/// Builds plans bottom up, starting from a scan.
///
/// Node ids assigned here are only labels, the optimiser assigns its own ids when it copies the
/// plan.
pub struct LogicalPlanBuilder {
    root: PlanNodeRef,
    id_gen: PlanNodeIdGen,
}

impl LogicalPlanBuilder {
    pub fn scan(relation: NamedRelationRef) -> Self {
        let mut id_gen = PlanNodeIdGen::new();
        let root = Arc::new(PlanNode::new(
            id_gen.gen_next(),
            Operator::LogicalScan(Scan::new(relation)),
            vec![],
        ));

        Self { root, id_gen }
    }

    fn reset_root<I>(mut self, operator: Operator, other_inputs: I) -> Self
    where
        I: IntoIterator<Item = PlanNodeRef>,
    {
        let mut inputs = vec![self.root];
        inputs.extend(other_inputs);
        self.root = Arc::new(PlanNode::new(self.id_gen.gen_next(), operator, inputs));
        self
    }

    pub fn select(self, predicate: Predicate) -> Self {
        self.reset_root(Operator::LogicalSelect(Select::new(predicate)), vec![])
    }

    pub fn project<I, C>(self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.reset_root(Operator::LogicalProject(Project::new(columns)), vec![])
    }

    /// Cartesian product, current plan becomes the left input.
    pub fn product(self, right: Plan) -> Self {
        self.reset_root(Operator::LogicalProduct(Product::new()), vec![right.root()])
    }

    /// Equi join, current plan becomes the left input.
    pub fn join(self, predicate: Predicate, right: Plan) -> Self {
        self.reset_root(Operator::LogicalJoin(Join::new(predicate)), vec![right.root()])
    }

    pub fn build(self) -> Plan {
        Plan::new(self.root)
    }
}
