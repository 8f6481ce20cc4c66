use crate::LabelId;
use crate::State;

/// The narrow boundary the dominance core consumes from the (external)
/// generic search engine (spec 6, "exposed to search"/"consumed from the
/// FTS"): generating applicable operators, the successor they produce, the
/// label they carry, and their cost. Everything else about the search
/// engine — open lists, plan reconstruction, heuristics — is out of scope.
pub trait SearchTask {
    /// An opaque handle to one ground operator. Kept `Copy` since operator
    /// lists are scanned repeatedly during pruning.
    type Operator: Copy + Eq;

    /// Appends every operator applicable in `state` to `out`, clearing it
    /// first.
    fn generate_applicable_ops(&self, state: &State, out: &mut Vec<Self::Operator>);

    /// The state reached by applying `op` in `state`.
    fn generate_successor(&self, state: &State, op: Self::Operator) -> State;

    /// The label `op` is grounded from (used to index into the label
    /// dominance relation).
    fn get_label(&self, op: Self::Operator) -> LabelId;

    /// The (non-adjusted) cost of `op`, matching spec 9's resolved Open
    /// Question: "raw cost is used" in the action-selection check.
    fn get_label_cost(&self, op: Self::Operator) -> i64;
}

/// One ground operator of a [`VecSearchTask`]: a conjunctive precondition
/// and effect over local states, plus its label and cost.
#[derive(Clone, Debug)]
pub struct OperatorDef {
    pub label: LabelId,
    pub cost: i64,
    pub preconditions: Vec<(usize, usize)>,
    pub effects: Vec<(usize, usize)>,
}

/// A handle into a [`VecSearchTask`]'s operator table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperatorId(usize);

/// A minimal in-memory [`SearchTask`] fixture for tests: plain conjunctive
/// operators over world-state components, no grounding or PDDL semantics.
/// Not a general planning engine.
pub struct VecSearchTask {
    operators: Vec<OperatorDef>,
}

impl VecSearchTask {
    pub fn new(operators: Vec<OperatorDef>) -> Self {
        Self { operators }
    }
}

impl SearchTask for VecSearchTask {
    type Operator = OperatorId;

    fn generate_applicable_ops(&self, state: &State, out: &mut Vec<OperatorId>) {
        out.clear();
        for (index, op) in self.operators.iter().enumerate() {
            if op.preconditions.iter().all(|&(ts, s)| state.component(ts) == s) {
                out.push(OperatorId(index));
            }
        }
    }

    fn generate_successor(&self, state: &State, op: OperatorId) -> State {
        let def = &self.operators[op.0];
        let mut components = state.components().to_vec();
        for &(ts, s) in &def.effects {
            components[ts] = s;
        }
        State::new(components)
    }

    fn get_label(&self, op: OperatorId) -> LabelId {
        self.operators[op.0].label
    }

    fn get_label_cost(&self, op: OperatorId) -> i64 {
        self.operators[op.0].cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applicable_ops_respects_preconditions() {
        let task = VecSearchTask::new(vec![
            OperatorDef { label: LabelId::new(0), cost: 1, preconditions: vec![(0, 0)], effects: vec![(0, 1)] },
            OperatorDef { label: LabelId::new(1), cost: 1, preconditions: vec![(0, 1)], effects: vec![(0, 0)] },
        ]);

        let mut applicable = Vec::new();
        task.generate_applicable_ops(&State::new(vec![0]), &mut applicable);
        assert_eq!(applicable, vec![OperatorId(0)]);

        let successor = task.generate_successor(&State::new(vec![0]), applicable[0]);
        assert_eq!(successor, State::new(vec![1]));
    }
}
