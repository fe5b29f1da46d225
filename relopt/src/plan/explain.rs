use std::borrow::Cow;
use std::default::Default;
use std::io::{Error, ErrorKind, Write};

use itertools::Itertools;
use prettytable::Table;
use ptree::print_config::UTF_CHARS;
use ptree::{write_tree_with, PrintConfig, Style, TreeItem};

use crate::plan::{Plan, PlanNode};

impl<'a> TreeItem for &'a PlanNode {
    type Child = Self;

    fn write_self<W: Write>(&self, f: &mut W, style: &Style) -> std::io::Result<()> {
        write!(f, "{}", style.paint(&self.operator))?;
        if let Some(output) = &self.output {
            write!(f, " (tuples: {})", output.tuple_count())?;
        }
        Ok(())
    }

    fn children(&self) -> Cow<[Self::Child]> {
        Cow::from(
            self.inputs
                .iter()
                .map(|c| &**c)
                .collect::<Vec<&'a PlanNode>>(),
        )
    }
}

pub fn explain<W: Write>(plan: &Plan, output: &mut W) -> std::io::Result<()> {
    let config = PrintConfig {
        indent: 3,
        characters: UTF_CHARS.into(),
        ..Default::default()
    };
    write_tree_with(&&*plan.root, output, &config)
}

pub fn explain_to_string(plan: &Plan) -> std::io::Result<String> {
    let mut buf = Vec::new();
    explain(plan, &mut buf)?;
    String::from_utf8(buf).map_err(|e| Error::new(ErrorKind::InvalidData, e))
}

/// Estimated statistics of every node, in pre order.
pub fn statistics_table(plan: &Plan) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["id", "operator", "tuples", "attributes"]);

    for node in plan.nodes_iter() {
        let (tuples, attributes) = match &node.output {
            Some(output) => (
                output.tuple_count().to_string(),
                output.attributes().iter().join(", "),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        table.add_row(row![node.id, node.operator, tuples, attributes]);
    }

    table
}
