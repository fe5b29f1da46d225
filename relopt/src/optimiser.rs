use std::sync::Arc;

use enumset::EnumSet;
use log::{debug, trace};

use crate::catalog::Catalogue;
use crate::cost::Estimator;
use crate::error::{OptResult, OptimiserError};
use crate::operator::{Operator, Predicate, Scan, Select};
use crate::plan::explain::explain_to_string;
use crate::plan::{Plan, PlanNodeBuilder, PlanNodeId, PlanNodeIdGen, PlanNodeRef};
use crate::rules::{
    FuseJoinsRule, PushProjectsDownRule, PushSelectsDownRule, ReorderProductsRule, Rule,
    RuleId, RuleImpl,
};

/// Context for optimisation. Includes access to catalogue and the cost model.
///
/// Each optimisation call works on its own copy of the context, so nothing but the read only
/// catalogue is shared between calls.
#[derive(Clone)]
pub struct OptimiserContext {
    pub catalogue: Arc<Catalogue>,
    estimator: Estimator,
    plan_node_gen: PlanNodeIdGen,
}

impl OptimiserContext {
    pub fn new(catalogue: Arc<Catalogue>) -> Self {
        Self {
            catalogue,
            estimator: Estimator::new(),
            plan_node_gen: PlanNodeIdGen::new(),
        }
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn next_plan_node_id(&mut self) -> PlanNodeId {
        self.plan_node_gen.gen_next()
    }

    /// Builds a new node with a fresh id, and estimates its output.
    pub fn new_node<I>(&mut self, operator: Operator, inputs: I) -> OptResult<PlanNodeRef>
    where
        I: IntoIterator<Item = PlanNodeRef>,
    {
        let node = PlanNodeBuilder::new(self.next_plan_node_id(), operator)
            .add_inputs(inputs)
            .build();
        Ok(Arc::new(self.estimator.annotate(node)?))
    }

    /// Stacks selections over `input`, the first predicate ends up lowest.
    pub fn wrap_selects<I>(&mut self, input: PlanNodeRef, predicates: I) -> OptResult<PlanNodeRef>
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut node = input;
        for predicate in predicates {
            node = self.new_node(Operator::LogicalSelect(Select::new(predicate)), vec![node])?;
        }
        Ok(node)
    }
}

/// Tunables of an [`Optimiser`].
#[derive(Clone, Debug, Default)]
pub struct OptimiserConfig {
    /// Rules which are skipped by the pipeline.
    pub disabled_rules: EnumSet<RuleId>,
    /// Logs the plan after each rule at debug level.
    pub explain_phases: bool,
}

/// Heuristic optimiser.
///
/// Rewrites a canonical plan by applying a fixed sequence of rules, each rule consumes the whole
/// plan and produces a new one. The default sequence is:
///
/// 1. [`PushSelectsDownRule`]
/// 2. [`ReorderProductsRule`]
/// 3. [`PushSelectsDownRule`], placing the selections detached by reordering.
/// 4. [`FuseJoinsRule`]
/// 5. [`PushProjectsDownRule`]
pub struct Optimiser {
    rules: Vec<RuleImpl>,
    config: OptimiserConfig,
    context: OptimiserContext,
}

impl Optimiser {
    pub fn new(context: OptimiserContext) -> Self {
        Self::with_rules(Self::default_rules(), context)
    }

    pub fn with_rules(rules: Vec<RuleImpl>, context: OptimiserContext) -> Self {
        Self {
            rules,
            config: OptimiserConfig::default(),
            context,
        }
    }

    pub fn with_config(mut self, config: OptimiserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_rules() -> Vec<RuleImpl> {
        vec![
            PushSelectsDownRule::new().into(),
            ReorderProductsRule::new().into(),
            PushSelectsDownRule::new().into(),
            FuseJoinsRule::new().into(),
            PushProjectsDownRule::new().into(),
        ]
    }

    pub fn config(&self) -> &OptimiserConfig {
        &self.config
    }

    /// Optimises a canonical plan.
    ///
    /// The input plan is left untouched, the returned plan is built from new nodes and every
    /// node of it is estimated.
    pub fn optimise(&self, canonical_plan: &Plan) -> OptResult<Plan> {
        let mut context = self.context.clone();
        let mut revised_plan = Plan::new(copy_canonical_plan(
            &canonical_plan.root(),
            &mut context,
        )?);

        for rule in &self.rules {
            if self.config.disabled_rules.contains(rule.rule_id()) {
                trace!("Skipped disabled rule {:?}", rule);
                continue;
            }

            debug!("Applying rule {:?}", rule);
            revised_plan = rule.apply(&revised_plan, &mut context)?;
            if self.config.explain_phases {
                debug!(
                    "Plan after applying rule {:?} is\n{}",
                    rule,
                    explain_to_string(&revised_plan)?
                );
            }
        }

        Ok(revised_plan)
    }
}

/// Copies a canonical plan node by node, checking its shape on the way.
///
/// Scans are resolved against the catalogue again, and every copied node is estimated, so
/// unknown relations and attributes are reported before any rewrite happens.
fn copy_canonical_plan(
    node: &PlanNodeRef,
    context: &mut OptimiserContext,
) -> OptResult<PlanNodeRef> {
    let operator = node.operator();
    if node.inputs().len() != operator.arity() {
        return Err(OptimiserError::MalformedPlan(format!(
            "{} expects {} inputs, got {}",
            operator,
            operator.arity(),
            node.inputs().len()
        ))
        .into());
    }

    match operator {
        Operator::LogicalScan(scan) => {
            let relation = context.catalogue.relation(scan.relation().name())?;
            context.new_node(Operator::LogicalScan(Scan::new(relation)), vec![])
        }
        Operator::LogicalJoin(join) => Err(OptimiserError::MalformedPlan(format!(
            "canonical plan contains join on {}",
            join.predicate()
        ))
        .into()),
        Operator::LogicalSelect(_) | Operator::LogicalProject(_) | Operator::LogicalProduct(_) => {
            let inputs = node
                .inputs()
                .iter()
                .map(|input| copy_canonical_plan(input, context))
                .collect::<OptResult<Vec<PlanNodeRef>>>()?;
            context.new_node(operator.clone(), inputs)
        }
    }
}
