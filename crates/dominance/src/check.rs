use numdom_lts::SearchTask;
use numdom_lts::State;
use numdom_lts::DEAD_END;
use numdom_number::Cost;

use crate::builder::DominanceFunction;

/// Search-time dominance pruning (spec 4.5). Owns scratch buffers that are
/// reused across queries to avoid per-call allocation; this makes
/// `DominanceCheck` exclusive per search thread (spec 5 "the pruning-check
/// component owns scratch vectors ... that are reused across queries and
/// therefore are exclusive per search thread — if parallel search is added,
/// each worker must own its own check instance"). Ownership can still be
/// moved across threads (e.g. handing a worker its own instance); only
/// concurrent *use* of one instance is unsound.
pub struct DominanceCheck<'a, C: Cost> {
    dominance: &'a DominanceFunction<C>,
    parent: Vec<usize>,
    succ: Vec<usize>,
}

impl<'a, C: Cost> DominanceCheck<'a, C> {
    pub fn new(dominance: &'a DominanceFunction<C>) -> Self {
        Self { dominance, parent: Vec::new(), succ: Vec::new() }
    }

    /// True iff `state` dominates `initial` and `initial` does not dominate
    /// `state` back (spec 4.5 `strictly_dominates_initial_state`).
    pub fn strictly_dominates_initial_state(&self, state: &State, initial: &State) -> bool {
        self.dominates(state.components(), initial.components()) && !self.dominates(initial.components(), state.components())
    }

    fn dominates(&self, reference: &[usize], candidate: &[usize]) -> bool {
        self.dominance.sum_local_values(reference, candidate) >= C::zero()
    }

    /// Dominated-by-`reference` test with the strict cost term from spec
    /// 4.5's key identity: `Σ R_i(ref_i, succ_i) + cost ≥ 0` (or `> 0` when
    /// `cost == 0`, via `epsilon_if_zero`). Dead-end successors are never
    /// dominated — callers remove them unconditionally instead. Used by
    /// `prune_dominated_by_parent_or_initial_state`, which asks "is this
    /// successor no better than something `reference` already reaches for
    /// less" — not by `action_selection_pruning`, whose identity runs the
    /// opposite way (see `action_dominates_state` below).
    fn successor_dominated_by_with_cost(&self, reference: &[usize], successor: &[usize], cost: i64) -> bool {
        if successor.iter().any(|&c| c == DEAD_END) {
            return false;
        }
        let sum = self.dominance.sum_local_values(reference, successor);
        sum.saturating_add(C::epsilon_if_zero(cost)) >= C::zero()
    }

    /// `action_selection_pruning`'s own identity (spec 4.5: "compute
    /// `Σ R_i(succ_i, state_i) − cost(op)`"; the C++ original's
    /// `dominance_check.cc` computes `q_simulates(succ_id, parent[sim])`
    /// then checks `total_value - cost >= 0`): the *successor* is the first
    /// argument to `R_i`, and the op's cost is *subtracted*, not added.
    /// `epsilon_if_zero` is still applied to the cost so a literal no-op
    /// (`succ == state`, cost `0`) subtracts a strictly positive amount from
    /// the reflexive sum of `0` and therefore never satisfies `≥ 0` — this is
    /// what makes "no-ops never trigger" hold (spec 4.5), in contrast to
    /// `successor_dominated_by_with_cost`'s addition, which instead makes a
    /// zero-cost no-op dominated (and hence removable) by design.
    fn action_dominates_state(&self, successor: &[usize], state: &[usize], cost: i64) -> bool {
        if successor.iter().any(|&c| c == DEAD_END) {
            return false;
        }
        let sum = self.dominance.sum_local_values(successor, state);
        sum.saturating_add(C::epsilon_if_zero(cost).negate()) >= C::zero()
    }

    /// Spec 4.5 `action_selection_pruning`: if some applicable op's
    /// successor dominates `state` via `action_dominates_state`, keep only
    /// that op and discard the rest. Returns whether pruning fired. No-ops
    /// (`succ == state`) never trigger since the check is strict via the
    /// cost term.
    pub fn action_selection_pruning<T: SearchTask>(&mut self, task: &T, state: &State, applicable: &mut Vec<T::Operator>) -> bool {
        for (index, &op) in applicable.iter().enumerate() {
            let successor = task.generate_successor(state, op);
            let cost = task.get_label_cost(op);
            self.succ.clear();
            self.succ.extend_from_slice(successor.components());

            if self.action_dominates_state(&self.succ, state.components(), cost) {
                let winner = applicable[index];
                applicable.clear();
                applicable.push(winner);
                return true;
            }
        }
        false
    }

    /// Spec 4.5 `prune_dominated_by_parent_or_initial_state`: removes every
    /// applicable op whose successor is a dead end, or is dominated by the
    /// parent state or the initial state.
    pub fn prune_dominated_by_parent_or_initial_state<T: SearchTask>(
        &mut self,
        task: &T,
        state: &State,
        applicable: &mut Vec<T::Operator>,
        parent_state: Option<&State>,
        cmp_parent: bool,
        cmp_initial: Option<&State>,
    ) {
        applicable.retain(|&op| {
            let successor = task.generate_successor(state, op);
            self.succ.clear();
            self.succ.extend_from_slice(successor.components());

            if self.succ.iter().any(|&c| c == DEAD_END) {
                return false;
            }

            let cost = task.get_label_cost(op);

            if cmp_parent {
                if let Some(parent_state) = parent_state {
                    self.parent.clear();
                    self.parent.extend_from_slice(parent_state.components());
                    if self.successor_dominated_by_with_cost(&self.parent, &self.succ, cost) {
                        return false;
                    }
                }
            }

            if let Some(initial_state) = cmp_initial {
                self.parent.clear();
                self.parent.extend_from_slice(initial_state.components());
                if self.successor_dominated_by_with_cost(&self.parent, &self.succ, cost) {
                    return false;
                }
            }

            true
        });
    }
}

#[cfg(test)]
mod tests {
    use numdom_lts::FactoredTransitionSystem;
    use numdom_lts::LabelId;
    use numdom_lts::Labels;
    use numdom_lts::OperatorDef;
    use numdom_lts::TransitionSystem;
    use numdom_lts::VecSearchTask;
    use numdom_number::IntCost;

    use super::*;
    use crate::builder::build_dominance_function;
    use crate::config::DominanceConfig;

    fn two_lts_chain() -> FactoredTransitionSystem {
        // Scenario 2: two LTSs, both {s0,s1}, both driven by label `a`,
        // goal is (s1,s1).
        let ts = TransitionSystem::new(2, 0, vec![false, true], 1, vec![vec![(0, 1)]]).unwrap();
        FactoredTransitionSystem::new(vec![ts.clone(), ts], Labels::new(vec![1]))
    }

    #[test]
    fn action_selection_never_fires_on_a_true_noop() {
        // A zero-cost, zero-effect op is its own successor, so
        // `sum_local_values(succ, state)` is the reflexive `0` — but the
        // subtracted `epsilon_if_zero(0)` term is still strictly positive,
        // so the check must stay below `0` and never fire (spec 4.5 "no-ops
        // never trigger action_selection_pruning").
        let fts = two_lts_chain();
        let task = VecSearchTask::new(vec![
            OperatorDef { label: LabelId::new(0), cost: 1, preconditions: vec![], effects: vec![(0, 1), (1, 1)] },
            OperatorDef { label: LabelId::new(0), cost: 0, preconditions: vec![], effects: vec![] },
        ]);
        let dominance = build_dominance_function::<IntCost>(&fts, &DominanceConfig::default());
        let mut check = DominanceCheck::new(&dominance);

        let state = State::new(vec![1, 0]);
        let mut applicable = Vec::new();
        task.generate_applicable_ops(&state, &mut applicable);
        assert_eq!(applicable.len(), 2);

        let pruned = check.action_selection_pruning(&task, &state, &mut applicable);
        assert!(!pruned, "a zero-cost no-op must never trigger action_selection_pruning");
        assert_eq!(applicable.len(), 2, "no applicable op should be discarded when nothing dominates via cost");
    }

    #[test]
    fn dead_end_successor_is_always_pruned() {
        let fts = two_lts_chain();
        let task = VecSearchTask::new(vec![OperatorDef { label: LabelId::new(0), cost: 1, preconditions: vec![], effects: vec![(0, DEAD_END)] }]);
        let dominance = build_dominance_function::<IntCost>(&fts, &DominanceConfig::default());
        let mut check = DominanceCheck::new(&dominance);

        let state = State::new(vec![0, 0]);
        let mut applicable = Vec::new();
        task.generate_applicable_ops(&state, &mut applicable);

        check.prune_dominated_by_parent_or_initial_state(&task, &state, &mut applicable, None, false, None);
        assert!(applicable.is_empty());
    }

    #[test]
    fn parent_dominated_zero_cost_successor_is_pruned() {
        // Scenario 3: a zero-cost op whose successor equals the parent must
        // still be pruned (epsilon strictness).
        let ts = TransitionSystem::new(1, 0, vec![true], 1, vec![vec![(0, 0)]]).unwrap();
        let fts = FactoredTransitionSystem::new(vec![ts], Labels::new(vec![0]));
        let task = VecSearchTask::new(vec![OperatorDef { label: LabelId::new(0), cost: 0, preconditions: vec![], effects: vec![] }]);
        let dominance = build_dominance_function::<numdom_number::EpsilonCost>(&fts, &DominanceConfig::default());
        let mut check = DominanceCheck::new(&dominance);

        let state = State::new(vec![0]);
        let mut applicable = Vec::new();
        task.generate_applicable_ops(&state, &mut applicable);

        check.prune_dominated_by_parent_or_initial_state(&task, &state, &mut applicable, Some(&state), true, None);
        assert!(applicable.is_empty());
    }
}
