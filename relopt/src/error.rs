use thiserror::Error;

use crate::stat::Column;

pub type OptResult<T> = anyhow::Result<T>;

/// Failures which abort an optimisation call.
///
/// They are raised through [`OptResult`], callers can recover the variant with
/// `err.downcast_ref::<OptimiserError>()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptimiserError {
    #[error("Attribute {column} not found in [{available}]")]
    UnknownAttribute { column: Column, available: String },
    #[error("Relation {0:?} not exists in catalogue")]
    UnknownRelation(String),
    #[error("Malformed plan: {0}")]
    MalformedPlan(String),
    #[error("Attribute {0} has no distinct values, can't estimate selectivity")]
    DivisionDegenerate(Column),
}
