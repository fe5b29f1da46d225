use crate::operator::Predicate;
use crate::plan::PlanNodeId;

/// A predicate waiting for a position, keyed by the id of the select node it comes from.
///
/// The id is what identifies an entry: two selects with equal predicates in different places of
/// a plan are different entries.
#[derive(Clone, Debug)]
pub(crate) struct PendingPredicate {
    pub(crate) handle: PlanNodeId,
    pub(crate) predicate: Predicate,
}

/// Predicates collected during a top down traversal, consumed by nodes further down.
///
/// Entries keep insertion order.
#[derive(Debug, Default)]
pub(crate) struct PredicatePool {
    pending: Vec<PendingPredicate>,
}

impl PredicatePool {
    pub(crate) fn push(&mut self, handle: PlanNodeId, predicate: Predicate) {
        self.pending.push(PendingPredicate { handle, predicate });
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &PendingPredicate> {
        self.pending.iter()
    }

    /// Removes an entry, returns whether it was still pending.
    pub(crate) fn remove(&mut self, handle: PlanNodeId) -> bool {
        match self.pending.iter().position(|p| p.handle == handle) {
            Some(idx) => {
                self.pending.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Removes and returns all predicates accepted by `filter`, in insertion order.
    pub(crate) fn take_if<F>(&mut self, filter: F) -> Vec<Predicate>
    where
        F: Fn(&Predicate) -> bool,
    {
        let (taken, kept): (Vec<PendingPredicate>, Vec<PendingPredicate>) =
            std::mem::take(&mut self.pending)
                .into_iter()
                .partition(|p| filter(&p.predicate));
        self.pending = kept;
        taken.into_iter().map(|p| p.predicate).collect()
    }
}
