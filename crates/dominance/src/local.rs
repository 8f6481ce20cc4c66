use numdom_lts::LabelGroupId;
use numdom_lts::Labels;
use numdom_lts::StateIndex;
use numdom_lts::TransitionSystem;
use numdom_number::Cost;

use crate::budget::TimeBudget;
use crate::label::LabelDominanceFunction;
use crate::tau::TauDistances;

/// Per-LTS table of q-simulation values `R_i(s, t)` (spec 4.1). Lower is
/// more conservative; `neg_infinity` means "no simulation possible".
pub struct LocalDominanceFunction<C: Cost> {
    table: Vec<Vec<C>>,
    truncate_value: i64,
    cancelled: bool,
}

impl<C: Cost> LocalDominanceFunction<C> {
    /// `R_i(s,t) = 0` unless `t` is a goal and `s` isn't, in which case
    /// `-infinity` (spec 4.1 `init_goal_respecting`). `R_i(s,s) = 0` always.
    pub fn init_goal_respecting(ts: &TransitionSystem, truncate_value: i64) -> Self {
        let n = ts.num_states();
        let mut table = vec![vec![C::zero(); n]; n];
        for s in 0..n {
            for t in 0..n {
                if s != t && ts.is_goal(t) && !ts.is_goal(s) {
                    table[s][t] = C::neg_infinity();
                }
            }
        }
        Self { table, truncate_value, cancelled: false }
    }

    /// Freezes the relation at its current (possibly still goal-respecting
    /// only) value because the LTS is too large to refine further (spec
    /// 4.1, spec 7 "Resource exhaustion").
    pub fn cancel_simulation_computation(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn num_states(&self) -> usize {
        self.table.len()
    }

    pub fn q_simulates(&self, s: StateIndex, t: StateIndex) -> C {
        self.table[s][t]
    }

    pub fn simulates(&self, s: StateIndex, t: StateIndex) -> bool {
        self.q_simulates(s, t) >= C::zero()
    }

    pub fn may_simulate(&self, s: StateIndex, t: StateIndex) -> bool {
        !self.q_simulates(s, t).is_neg_infinity()
    }

    pub fn strictly_simulates(&self, s: StateIndex, t: StateIndex) -> bool {
        self.simulates(s, t) && !self.simulates(t, s)
    }

    pub fn similar(&self, s: StateIndex, t: StateIndex) -> bool {
        self.simulates(s, t) && self.simulates(t, s)
    }

    fn set_value(&mut self, s: StateIndex, t: StateIndex, value: C) -> bool {
        let truncated = value.truncate(self.truncate_value);
        if truncated < self.table[s][t] {
            self.table[s][t] = truncated;
            true
        } else {
            false
        }
    }

    /// Bellman-style relaxation passes until no cell decreases or the
    /// budget is exhausted (spec 4.1 `update`). Returns the number of inner
    /// passes performed.
    pub fn update(
        &mut self,
        ts_index: usize,
        ts: &TransitionSystem,
        labels: &Labels,
        label: &LabelDominanceFunction<C>,
        tau_distances: &TauDistances<C>,
        budget: &mut TimeBudget,
    ) -> usize {
        if self.cancelled {
            return 0;
        }
        let _ = labels;

        let n = ts.num_states();
        let mut passes = 0;
        loop {
            if budget.expired() {
                break;
            }

            let mut changed = false;
            for s in 0..n {
                // Spec 4.1's third `best(...)` disjunct bounds s's own tau
                // goal distance, not s's response target, so it is computed
                // once per `s` rather than once per candidate transition
                // (matches the original `compare_transitions`/`compare_noop`
                // signature, which both thread a single `tau_distance`
                // value through every alternative considered for one (s,t)
                // pair; see DESIGN.md for this resolved ambiguity).
                let tau_goal_distance = tau_distances.goal_distance(s);
                for t in 0..n {
                    if s == t {
                        continue;
                    }
                    if let Some(new_value) = self.compare_transitions(ts, label, ts_index, s, t, tau_goal_distance) {
                        changed |= self.set_value(s, t, new_value);
                    }
                }
            }

            passes += 1;
            if !changed || budget.epoch_expired(passes) {
                break;
            }
        }
        passes
    }

    /// `min` over `t`'s outgoing transitions of `best(t, g_t, t')` (spec
    /// 4.1). `None` if `t` has no outgoing transitions (no constraint
    /// imposed on this pair this pass).
    fn compare_transitions(
        &self,
        ts: &TransitionSystem,
        label: &LabelDominanceFunction<C>,
        ts_index: usize,
        s: StateIndex,
        t: StateIndex,
        tau_goal_distance: Option<C>,
    ) -> Option<C> {
        let mut best_over_t_transitions: Option<C> = None;

        for (g_t, group_t) in ts.groups() {
            for transition in group_t.transitions_from(t) {
                let t_prime = transition.target;
                let response = self
                    .best_response(ts, label, ts_index, g_t, s, t_prime)
                    .max(self.compare_noop(label, ts_index, g_t, s, t_prime))
                    .max(self.compare_tau_move(label, ts_index, g_t, tau_goal_distance));

                best_over_t_transitions = Some(match best_over_t_transitions {
                    None => response,
                    Some(current) => current.min(response),
                });
            }
        }

        best_over_t_transitions
    }

    /// `max over (s -g_s-> s') of L_i(g_s, g_t) + R_i(s', t')`.
    fn best_response(&self, ts: &TransitionSystem, label: &LabelDominanceFunction<C>, ts_index: usize, g_t: LabelGroupId, s: StateIndex, t_prime: StateIndex) -> C {
        let mut best = C::neg_infinity();
        for (g_s, group_s) in ts.groups() {
            for transition in group_s.transitions_from(s) {
                let candidate = label.q_dominates(g_s, g_t, ts_index).saturating_add(self.q_simulates(transition.target, t_prime));
                if candidate > best {
                    best = candidate;
                }
            }
        }
        best
    }

    /// `simulates_irrelevant(g_t) + R_i(s, t')`: staying in `s` via a
    /// self-loop dominated by `g_t`.
    fn compare_noop(&self, label: &LabelDominanceFunction<C>, ts_index: usize, g_t: LabelGroupId, s: StateIndex, t_prime: StateIndex) -> C {
        label.q_dominates_noop(g_t, ts_index).saturating_add(self.q_simulates(s, t_prime))
    }

    /// `-tau_goal_distance(s) + q_dominated_by_noop(g_t)` (spec 4.1's third
    /// `best(...)` disjunct): `s` may ignore `t`'s real transition entirely
    /// and instead drift for free along its own tau-labelled edges toward a
    /// goal, provided `g_t` itself could always be replaced by doing
    /// nothing. `neg_infinity` if `s` cannot reach a goal via tau at all.
    fn compare_tau_move(&self, label: &LabelDominanceFunction<C>, ts_index: usize, g_t: LabelGroupId, tau_goal_distance: Option<C>) -> C {
        match tau_goal_distance {
            Some(distance) => label.q_dominated_by_noop(g_t, ts_index).saturating_add(distance.negate()),
            None => C::neg_infinity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use numdom_lts::Labels;
    use numdom_lts::TransitionSystem;
    use numdom_number::IntCost;

    use super::*;
    use crate::label::LabelDominanceFunction;

    fn two_state_chain() -> (TransitionSystem, Labels) {
        // s0 --a--> s1, s1 is the only goal state (spec 8 scenario 1).
        (TransitionSystem::new(2, 0, vec![false, true], 1, vec![vec![(0, 1)]]).unwrap(), Labels::new(vec![1]))
    }

    #[test]
    fn goal_respecting_init_matches_scenario_one() {
        let (ts, _) = two_state_chain();
        let local = LocalDominanceFunction::<IntCost>::init_goal_respecting(&ts, 1000);
        assert_eq!(local.q_simulates(0, 0), IntCost::zero());
        assert_eq!(local.q_simulates(1, 1), IntCost::zero());
        assert_eq!(local.q_simulates(1, 0), IntCost::zero());
        assert!(local.q_simulates(0, 1).is_neg_infinity());
    }

    #[test]
    fn update_is_a_no_op_once_goal_respecting_is_stable() {
        let (ts, labels) = two_state_chain();
        let mut local = LocalDominanceFunction::<IntCost>::init_goal_respecting(&ts, 1000);
        let label_dom = LabelDominanceFunction::init(
            &numdom_lts::FactoredTransitionSystem::new(vec![ts.clone()], labels.clone()),
            std::slice::from_ref(&local),
            1000,
        );
        let mut budget = TimeBudget::new(std::time::Duration::from_secs(1), 4);
        let tau_labels = crate::tau::TauLabels::<IntCost>::new();
        let tau_distances = TauDistances::precompute(&ts, &tau_labels, &labels, false, crate::tau::TauVersion::new(0));
        let passes = local.update(0, &ts, &labels, &label_dom, &tau_distances, &mut budget);
        assert!(passes >= 1);
        assert!(local.q_simulates(0, 1).is_neg_infinity());
        assert_eq!(local.q_simulates(1, 0), IntCost::zero());
    }

    /// Spec 8 invariant 3: "across any pair of consecutive inner iterations,
    /// R_i values only decrease." Each `update` call runs to convergence (or
    /// budget exhaustion); repeating it can therefore only ever hold values
    /// steady or push them down further, never back up.
    #[test]
    fn successive_passes_never_increase_any_cell() {
        let ts = TransitionSystem::new(3, 0, vec![false, false, true], 2, vec![vec![(0, 1)], vec![(1, 2)]]).unwrap();
        let labels = Labels::new(vec![1, 1]);
        let fts = numdom_lts::FactoredTransitionSystem::new(vec![ts.clone()], labels.clone());
        let mut local = LocalDominanceFunction::<IntCost>::init_goal_respecting(&ts, 1000);
        let label_dom = LabelDominanceFunction::init(&fts, std::slice::from_ref(&local), 1000);
        let tau_labels = crate::tau::TauLabels::<IntCost>::new();
        let tau_distances = TauDistances::precompute(&ts, &tau_labels, &labels, false, crate::tau::TauVersion::new(0));

        let snapshot = |local: &LocalDominanceFunction<IntCost>| -> Vec<Vec<IntCost>> {
            (0..local.num_states()).map(|s| (0..local.num_states()).map(|t| local.q_simulates(s, t)).collect()).collect()
        };

        let mut previous = snapshot(&local);
        for _ in 0..5 {
            let mut budget = TimeBudget::new(std::time::Duration::from_secs(1), 1);
            local.update(0, &ts, &labels, &label_dom, &tau_distances, &mut budget);
            let current = snapshot(&local);
            for s in 0..current.len() {
                for t in 0..current.len() {
                    assert!(current[s][t] <= previous[s][t], "R({s},{t}) increased from {:?} to {:?}", previous[s][t], current[s][t]);
                }
            }
            previous = current;
        }
    }
}
