use std::sync::Arc;

use maplit::hashmap;

use crate::catalog::{Catalogue, NamedRelation};
use crate::optimiser::{Optimiser, OptimiserContext};
use crate::plan::{LogicalPlanBuilder, Plan};
use crate::rules::RuleImpl;
use crate::stat::Attribute;

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn catalogue_from_json(json: &str) -> Catalogue {
    serde_json::from_str(json).unwrap()
}

/// Catalogue with relations:
///
/// * `R(R.a:100, R.b:50)` with 1000 tuples
/// * `S(S.b:50, S.c:20)` with 500 tuples
/// * `T(T.c:20, T.d:10)` with 20 tuples
pub(crate) fn test_catalogue() -> Arc<Catalogue> {
    let relations = hashmap! {
        "R" => (1000, vec![("R.a", 100), ("R.b", 50)]),
        "S" => (500, vec![("S.b", 50), ("S.c", 20)]),
        "T" => (20, vec![("T.c", 20), ("T.d", 10)]),
    };

    let mut catalogue = Catalogue::new();
    for (name, (tuple_count, attributes)) in relations {
        catalogue.register(NamedRelation::new(
            name,
            tuple_count,
            attributes
                .into_iter()
                .map(|(attr, value_count)| Attribute::new(attr, value_count)),
        ));
    }
    Arc::new(catalogue)
}

pub(crate) fn test_context() -> OptimiserContext {
    init_logger();
    OptimiserContext::new(test_catalogue())
}

pub(crate) fn scan(name: &str) -> LogicalPlanBuilder {
    LogicalPlanBuilder::scan(test_catalogue().relation(name).unwrap())
}

/// Runs `rules` over `plan` with the test catalogue.
pub(crate) fn apply_rules(rules: Vec<RuleImpl>, plan: &Plan) -> Plan {
    Optimiser::with_rules(rules, test_context())
        .optimise(plan)
        .unwrap()
}
