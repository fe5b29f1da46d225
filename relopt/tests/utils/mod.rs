use std::collections::HashSet;
use std::fmt::Debug;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use itertools::Itertools;
use serde::Deserialize;

use relopt::catalog::Catalogue;
use relopt::cost::Estimator;
use relopt::operator::{Operator, Predicate};
use relopt::optimiser::{Optimiser, OptimiserConfig, OptimiserContext};
use relopt::plan::explain::explain_to_string;
use relopt::plan::{LogicalPlanBuilder, Plan};
use relopt::stat::Column;

/// A canonical query: products of `relations` from left to right, the `predicates` as
/// selections stacked on top (first one lowest), and an optional projection at the root.
#[derive(Deserialize)]
pub struct TestCase {
    pub name: String,
    pub relations: Vec<String>,
    #[serde(default)]
    pub predicates: Vec<String>,
    pub project: Option<Vec<String>>,
    pub expected_optimised_plan: String,
}

pub struct TestCaseRunner {
    /// Input file path.
    pub paths: Vec<PathBuf>,
    pub catalogue: Arc<Catalogue>,
    pub config: OptimiserConfig,
    /// Compare with `expected_optimised_plan`, only equivalence is checked otherwise.
    pub compare_plans: bool,
}

impl TestCaseRunner {
    pub fn run(self) {
        let _ = env_logger::builder().is_test(true).try_init();

        for path in &self.paths {
            let file = File::options()
                .read(true)
                .open(path)
                .with_context(|| format!("Failed to open test case file: {:?}", &path))
                .unwrap();

            let test_cases: Vec<TestCase> = serde_yaml::from_reader(file)
                .with_context(|| format!("Failed to load test cases from file: {:?}", &path))
                .unwrap();

            for test_case in test_cases {
                self.run_case(path, test_case);
            }
        }
    }

    fn run_case<P: AsRef<Path> + Debug>(&self, path: &P, test_case: TestCase) {
        let canonical_plan = self.to_canonical_plan(&test_case);

        let optimised_plan = Optimiser::new(OptimiserContext::new(self.catalogue.clone()))
            .with_config(self.config.clone())
            .optimise(&canonical_plan)
            .with_context(|| format!("Failed to optimise {} in {:?}", test_case.name, path))
            .unwrap();

        if self.compare_plans {
            assert_eq!(
                test_case.expected_optimised_plan,
                explain_to_string(&optimised_plan).unwrap(),
                "Plan for {} in {:?} is different.",
                test_case.name,
                path
            );
        }

        check_equivalent(&test_case.name, &canonical_plan, &optimised_plan);
    }

    fn to_canonical_plan(&self, test_case: &TestCase) -> Plan {
        let mut scans = test_case
            .relations
            .iter()
            .map(|name| LogicalPlanBuilder::scan(self.catalogue.relation(name).unwrap()));

        let mut builder = scans
            .next()
            .unwrap_or_else(|| panic!("{} scans no relation", test_case.name));
        for right in scans {
            builder = builder.product(right.build());
        }
        for predicate in &test_case.predicates {
            builder = builder.select(parse_predicate(predicate));
        }
        if let Some(columns) = &test_case.project {
            builder = builder.project(columns.clone());
        }

        builder.build()
    }
}

pub fn resource_path<P: AsRef<Path>>(name: P) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/resources")
        .join(name)
}

pub fn load_catalogue<P: AsRef<Path> + Debug>(path: P) -> Arc<Catalogue> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open catalogue file: {:?}", &path))
        .unwrap();
    let catalogue: Catalogue = serde_yaml::from_reader(file)
        .with_context(|| format!("Failed to load catalogue from file: {:?}", &path))
        .unwrap();
    Arc::new(catalogue)
}

/// Parses `R.a = S.b` or `R.a = "value"`.
pub fn parse_predicate(text: &str) -> Predicate {
    let (left, right) = text
        .split_once(" = ")
        .unwrap_or_else(|| panic!("Invalid predicate: {}", text));

    match right.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        Some(value) => Predicate::equals_value(left, value),
        None => Predicate::equals_attribute(left, right),
    }
}

/// Checks that `optimised` keeps every scan and predicate of `canonical`, places them legally
/// and yields the same attributes.
pub fn check_equivalent(name: &str, canonical: &Plan, optimised: &Plan) {
    assert!(
        optimised.nodes_iter().all(|node| node.is_estimated()),
        "{} has nodes without estimation",
        name
    );
    assert_eq!(scans(canonical), scans(optimised), "Scans of {} differ", name);
    assert_eq!(
        predicates(canonical),
        predicates(optimised),
        "Predicates of {} differ",
        name
    );
    check_placement(name, optimised);

    let canonical = Estimator::new().estimate_plan(canonical).unwrap();
    assert_eq!(
        root_columns(&canonical),
        root_columns(optimised),
        "Attributes of {} differ",
        name
    );
}

fn scans(plan: &Plan) -> Vec<String> {
    plan.nodes_iter()
        .filter_map(|node| {
            node.operator()
                .as_logical_scan()
                .map(|scan| scan.relation().name().to_string())
        })
        .sorted()
        .collect()
}

/// Predicates of selections and joins, with `left = right` written in a fixed orientation.
fn predicates(plan: &Plan) -> Vec<String> {
    plan.nodes_iter()
        .filter_map(|node| {
            node.operator().predicate().map(|predicate| {
                match predicate.right_attribute() {
                    Some(right) if right < predicate.left_attribute() => {
                        predicate.swapped().to_string()
                    }
                    _ => predicate.to_string(),
                }
            })
        })
        .sorted()
        .collect()
}

fn check_placement(name: &str, plan: &Plan) {
    for node in plan.nodes_iter() {
        match node.operator() {
            Operator::LogicalSelect(select) => {
                let input = node.input(0).unwrap().output().unwrap();
                assert!(
                    select.predicate().is_covered_by(input),
                    "{} in {} is placed above {}",
                    select.predicate(),
                    name,
                    input
                        .columns()
                        .join(", ")
                );
            }
            Operator::LogicalJoin(join) => {
                let predicate = join.predicate();
                let left = node.input(0).unwrap().output().unwrap();
                let right = node.input(1).unwrap().output().unwrap();
                assert!(
                    left.contains(predicate.left_attribute())
                        && predicate
                            .right_attribute()
                            .map_or(false, |column| right.contains(column)),
                    "Join on {} in {} does not match its inputs",
                    predicate,
                    name
                );
            }
            _ => {}
        }
    }
}

fn root_columns(plan: &Plan) -> HashSet<Column> {
    plan.output().unwrap().columns().cloned().collect()
}
