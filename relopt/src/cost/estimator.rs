use std::cmp::{max, min};
use std::sync::Arc;

use crate::error::{OptResult, OptimiserError};
use crate::operator::{Join, Operator, Predicate, Project, Scan, Select};
use crate::plan::{Plan, PlanNode, PlanNodeBuilder, PlanNodeRef};
use crate::stat::{Attribute, Column, Relation};

/// Estimates output relation of operators.
///
/// Estimation is a pure function of the operator and its inputs' outputs, so estimating a node
/// twice with unchanged inputs yields the same relation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Estimator {}

impl Estimator {
    pub fn new() -> Self {
        Self {}
    }

    /// Estimates `node` from its inputs' outputs, which must already be estimated.
    pub fn estimate(&self, node: &PlanNode) -> OptResult<Relation> {
        let inputs = node
            .inputs()
            .iter()
            .map(|input| input.output())
            .collect::<OptResult<Vec<&Relation>>>()?;
        self.estimate_operator(node.operator(), &inputs)
    }

    /// Estimates `node` and attaches the result to it.
    pub fn annotate(&self, node: PlanNode) -> OptResult<PlanNode> {
        let output = self.estimate(&node)?;
        Ok(node.with_output(output))
    }

    /// Rebuilds the whole plan bottom up, attaching a freshly estimated output to every node.
    pub fn estimate_plan(&self, plan: &Plan) -> OptResult<Plan> {
        Ok(Plan::new(self.estimate_subtree(&plan.root())?))
    }

    fn estimate_subtree(&self, node: &PlanNodeRef) -> OptResult<PlanNodeRef> {
        let inputs = node
            .inputs()
            .iter()
            .map(|input| self.estimate_subtree(input))
            .collect::<OptResult<Vec<PlanNodeRef>>>()?;
        let node = PlanNodeBuilder::new(node.id(), node.operator().clone())
            .add_inputs(inputs)
            .build();
        Ok(Arc::new(self.annotate(node)?))
    }

    /// Output of `operator` applied to `inputs`.
    pub fn estimate_operator(
        &self,
        operator: &Operator,
        inputs: &[&Relation],
    ) -> OptResult<Relation> {
        if inputs.len() != operator.arity() {
            return Err(OptimiserError::MalformedPlan(format!(
                "{} expects {} inputs, got {}",
                operator,
                operator.arity(),
                inputs.len()
            ))
            .into());
        }

        match operator {
            Operator::LogicalScan(scan) => Ok(self.estimate_scan(scan)),
            Operator::LogicalProject(project) => self.estimate_project(project, inputs[0]),
            Operator::LogicalSelect(select) => self.estimate_select(select, inputs[0]),
            Operator::LogicalProduct(_) => Ok(self.estimate_product(inputs[0], inputs[1])),
            Operator::LogicalJoin(join) => self.estimate_join(join, inputs[0], inputs[1]),
        }
    }

    fn estimate_scan(&self, scan: &Scan) -> Relation {
        scan.relation().relation().clone()
    }

    /// Keeps input attributes listed in the projection, in input order.
    fn estimate_project(&self, project: &Project, input: &Relation) -> OptResult<Relation> {
        for column in project.columns() {
            input.resolve(column)?;
        }

        Ok(Relation::with_attributes(
            input.tuple_count(),
            input
                .attributes()
                .iter()
                .filter(|attr| project.columns().contains(attr.column()))
                .cloned(),
        ))
    }

    fn estimate_select(&self, select: &Select, input: &Relation) -> OptResult<Relation> {
        match select.predicate() {
            Predicate::EqualsValue { attribute, .. } => {
                let attr = input.resolve(attribute)?;
                let tuple_count = input.tuple_count() / distinct_values(attr)?;

                Ok(Relation::with_attributes(
                    tuple_count,
                    narrow(input, &[attribute], 1),
                ))
            }
            Predicate::EqualsAttribute { left, right } => {
                let left_attr = input.resolve(left)?;
                let right_attr = input.resolve(right)?;
                let (left_count, right_count) =
                    (distinct_values(left_attr)?, distinct_values(right_attr)?);
                let tuple_count = input.tuple_count() / max(left_count, right_count);

                Ok(Relation::with_attributes(
                    tuple_count,
                    narrow(input, &[left, right], min(left_count, right_count)),
                ))
            }
        }
    }

    fn estimate_product(&self, left: &Relation, right: &Relation) -> Relation {
        Relation::with_attributes(
            left.tuple_count().saturating_mul(right.tuple_count()),
            left.attributes()
                .iter()
                .chain(right.attributes().iter())
                .cloned(),
        )
    }

    /// The predicate's left attribute is expected in the left input, a predicate written the
    /// other way round is swapped first.
    fn estimate_join(
        &self,
        join: &Join,
        left: &Relation,
        right: &Relation,
    ) -> OptResult<Relation> {
        let (left_column, right_column) = match join.predicate() {
            Predicate::EqualsAttribute { left: a, right: b } if left.contains(a) => (a, b),
            Predicate::EqualsAttribute { left: a, right: b } => (b, a),
            Predicate::EqualsValue { .. } => {
                return Err(OptimiserError::MalformedPlan(format!(
                    "join predicate {} is not an equi join predicate",
                    join.predicate()
                ))
                .into())
            }
        };

        let left_count = distinct_values(left.resolve(left_column)?)?;
        let right_count = distinct_values(right.resolve(right_column)?)?;
        let value_count = min(left_count, right_count);
        let tuple_count = left.tuple_count().saturating_mul(right.tuple_count())
            / max(left_count, right_count);

        Ok(Relation::with_attributes(
            tuple_count,
            narrow(left, &[left_column], value_count)
                .chain(narrow(right, &[right_column], value_count)),
        ))
    }
}

/// Value count of an attribute used as a selectivity denominator.
fn distinct_values(attr: &Attribute) -> OptResult<u64> {
    if attr.value_count() == 0 {
        Err(OptimiserError::DivisionDegenerate(attr.column().clone()).into())
    } else {
        Ok(attr.value_count())
    }
}

/// Input attributes, with `columns` replaced by copies holding `value_count`.
fn narrow<'a>(
    input: &'a Relation,
    columns: &'a [&'a Column],
    value_count: u64,
) -> impl Iterator<Item = Attribute> + 'a {
    input.attributes().iter().map(move |attr| {
        if columns.contains(&attr.column()) {
            attr.with_value_count(value_count)
        } else {
            attr.clone()
        }
    })
}

#[cfg(test)]
mod tests {
    use crate::cost::Estimator;
    use crate::error::OptimiserError;
    use crate::operator::{Operator, Predicate, Product, Select};
    use crate::plan::{LogicalPlanBuilder, Plan};
    use crate::stat::{Attribute, Relation};
    use crate::test_utils::test_catalogue;

    fn scan(name: &str) -> Plan {
        LogicalPlanBuilder::scan(test_catalogue().relation(name).unwrap()).build()
    }

    #[test]
    fn test_estimate_scan() {
        let plan = Estimator::default().estimate_plan(&scan("R")).unwrap();

        assert_eq!(
            &Relation::with_attributes(
                1000,
                vec![Attribute::new("R.a", 100), Attribute::new("R.b", 50)]
            ),
            plan.output().unwrap()
        );
    }

    #[test]
    fn test_estimate_select_equals_value() {
        let plan = LogicalPlanBuilder::scan(test_catalogue().relation("R").unwrap())
            .select(Predicate::equals_value("R.a", "5"))
            .build();
        let plan = Estimator::default().estimate_plan(&plan).unwrap();

        assert_eq!(
            &Relation::with_attributes(
                10,
                vec![Attribute::new("R.a", 1), Attribute::new("R.b", 50)]
            ),
            plan.output().unwrap()
        );
    }

    #[test]
    fn test_estimate_product_and_select_equals_attribute() {
        let plan = scan_r()
            .product(scan("S"))
            .select(Predicate::equals_attribute("R.b", "S.b"))
            .build();
        let plan = Estimator::default().estimate_plan(&plan).unwrap();

        let product = plan.root().input(0).unwrap().clone();
        assert_eq!(500000, product.output().unwrap().tuple_count());

        assert_eq!(
            &Relation::with_attributes(
                10000,
                vec![
                    Attribute::new("R.a", 100),
                    Attribute::new("R.b", 50),
                    Attribute::new("S.b", 50),
                    Attribute::new("S.c", 20),
                ]
            ),
            plan.output().unwrap()
        );
    }

    #[test]
    fn test_estimate_select_narrows_both_attributes() {
        let plan = LogicalPlanBuilder::scan(test_catalogue().relation("S").unwrap())
            .product(scan("T"))
            .select(Predicate::equals_attribute("S.b", "T.d"))
            .build();
        let plan = Estimator::default().estimate_plan(&plan).unwrap();
        let output = plan.output().unwrap();

        // 500 * 20 / max(50, 10)
        assert_eq!(200, output.tuple_count());
        assert_eq!(
            vec![10, 20, 20, 10],
            output
                .attributes()
                .iter()
                .map(Attribute::value_count)
                .collect::<Vec<u64>>()
        );
    }

    #[test]
    fn test_estimate_project_keeps_input_order() {
        let plan = scan_r()
            .product(scan("S"))
            .project(vec!["S.c", "R.a"])
            .build();
        let plan = Estimator::default().estimate_plan(&plan).unwrap();

        assert_eq!(
            &Relation::with_attributes(
                500000,
                vec![Attribute::new("R.a", 100), Attribute::new("S.c", 20)]
            ),
            plan.output().unwrap()
        );
    }

    #[test]
    fn test_estimate_join() {
        let plan = scan_r()
            .join(Predicate::equals_attribute("R.b", "S.b"), scan("S"))
            .build();
        let swapped = scan_r()
            .join(Predicate::equals_attribute("S.b", "R.b"), scan("S"))
            .build();
        let estimator = Estimator::default();

        let output = estimator.estimate_plan(&plan).unwrap();
        assert_eq!(10000, output.output().unwrap().tuple_count());
        assert_eq!(
            output.output().unwrap(),
            estimator.estimate_plan(&swapped).unwrap().output().unwrap()
        );
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let plan = scan_r()
            .select(Predicate::equals_value("R.a", "1"))
            .product(scan("S"))
            .select(Predicate::equals_attribute("R.b", "S.b"))
            .build();
        let estimator = Estimator::default();

        let once = estimator.estimate_plan(&plan).unwrap();
        let twice = estimator.estimate_plan(&once).unwrap();

        assert_eq!(once, twice);
        for node in once.nodes_iter() {
            assert_eq!(
                node.output().unwrap(),
                &estimator.estimate(&node).unwrap()
            );
        }
    }

    #[test]
    fn test_estimate_rounds_down_to_zero() {
        let estimator = Estimator::default();
        let input = Relation::with_attributes(3, vec![Attribute::new("R.a", 100)]);
        let output = estimator
            .estimate_operator(
                &Operator::from(Select::new(Predicate::equals_value("R.a", "x"))),
                &[&input],
            )
            .unwrap();

        assert_eq!(0, output.tuple_count());
    }

    #[test]
    fn test_estimate_unknown_attribute() {
        let plan = scan_r()
            .select(Predicate::equals_value("R.z", "1"))
            .build();
        let err = Estimator::default().estimate_plan(&plan).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OptimiserError>(),
            Some(OptimiserError::UnknownAttribute { .. })
        ));

        let plan = scan_r().project(vec!["R.a", "S.b"]).build();
        let err = Estimator::default().estimate_plan(&plan).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<OptimiserError>(),
            Some(OptimiserError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn test_estimate_zero_value_count() {
        let estimator = Estimator::default();
        let input = Relation::with_attributes(3, vec![Attribute::new("R.a", 0)]);
        let err = estimator
            .estimate_operator(
                &Operator::from(Select::new(Predicate::equals_value("R.a", "x"))),
                &[&input],
            )
            .unwrap_err();

        assert_eq!(
            Some(&OptimiserError::DivisionDegenerate("R.a".into())),
            err.downcast_ref::<OptimiserError>()
        );
    }

    #[test]
    fn test_estimate_wrong_arity() {
        let input = Relation::new(3);
        let err = Estimator::default()
            .estimate_operator(&Operator::from(Product::new()), &[&input])
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OptimiserError>(),
            Some(OptimiserError::MalformedPlan(_))
        ));
    }

    fn scan_r() -> LogicalPlanBuilder {
        LogicalPlanBuilder::scan(test_catalogue().relation("R").unwrap())
    }
}
