use std::collections::BTreeSet;

use log::debug;
use numdom_lts::FactoredTransitionSystem;
use numdom_lts::LabelId;
use numdom_lts::Transition;
use numdom_number::Cost;

use crate::builder::DominanceFunction;

/// Decides whether removing `transition` (carrying `label`, value `s -l-> t`
/// already known to be safely removable by the caller's dominance check) is
/// still sound once the removal actually happens: `s` must still be
/// simulated by some remaining transition on `l`, or `l` must still simulate
/// noop. Spec 4.6: "this sub-check verifies that after deletion, s can still
/// be simulated by some remaining transition on l or that l still simulates
/// noop".
fn propagate_transition_pruning<C: Cost>(fts: &FactoredTransitionSystem, dominance: &DominanceFunction<C>, ts_index: usize, transition: Transition, label: LabelId) -> bool {
    let ts = fts.get_ts(ts_index);
    let group = ts.group_of(label);
    let local = dominance.local(ts_index);

    if dominance.label().q_dominates_noop(group, ts_index) >= C::zero() {
        return true;
    }

    ts.group(group)
        .transitions_from(transition.source)
        .iter()
        .any(|other| *other != transition && local.q_simulates(other.target, transition.target) >= C::zero())
}

/// Offline FTS transition pruning (spec 4.6). Mutates `fts` in place and
/// returns the set of LTS ids whose transitions or label set changed, so
/// tau-distances may be recomputed upstream.
pub fn prune_dominated_transitions<C: Cost>(fts: &mut FactoredTransitionSystem, dominance: &DominanceFunction<C>) -> BTreeSet<usize> {
    let mut changed = BTreeSet::new();

    phase_a_noop_dominated(fts, dominance, &mut changed);
    phase_b_sibling_dominated(fts, dominance, &mut changed);

    changed
}

/// (A) Transitions dominated by noop: if `l` is dominated-by-noop in `ts`
/// with total value `>= 0`, every transition on `l` with `R_i(s,t) >= 0` is
/// removable (subject to `propagate_transition_pruning`). If `l` is
/// dominated-by-noop in every LTS, it is removed from the alphabet globally.
fn phase_a_noop_dominated<C: Cost>(fts: &mut FactoredTransitionSystem, dominance: &DominanceFunction<C>, changed: &mut BTreeSet<usize>) {
    let num_labels = fts.get_labels().num_labels();
    let num_ts = fts.get_size();

    for label_value in 0..num_labels {
        let label = LabelId::new(label_value);
        if fts.get_labels().is_removed(label) {
            continue;
        }

        let mut dominated_by_noop_everywhere = true;

        for ts_index in 0..num_ts {
            let group = fts.get_ts(ts_index).group_of(label);
            if dominance.label().q_dominates_noop(group, ts_index) < C::zero() {
                dominated_by_noop_everywhere = false;
                continue;
            }

            let local = dominance.local(ts_index);
            let removable: Vec<Transition> = fts
                .get_ts(ts_index)
                .group(group)
                .transitions()
                .iter()
                .copied()
                .filter(|t| local.q_simulates(t.source, t.target) >= C::zero())
                .filter(|&t| propagate_transition_pruning(fts, dominance, ts_index, t, label))
                .collect();

            for transition in removable {
                if fts.get_ts_mut(ts_index).remove_transition(group, transition) {
                    changed.insert(ts_index);
                }
            }
        }

        if dominated_by_noop_everywhere {
            debug!("label {label_value} dominated by noop in every ts, removing globally");
            fts.remove_label_globally(label);
            changed.extend(0..num_ts);
        }
    }
}

/// (B) Transitions dominated by sibling transitions: for `s -l2-> t2` and
/// `s -l1-> t1` in the same LTS, if
/// `L_i(l1,l2) + R_i(t1,t2) - cost(l1) + cost(l2) >= 0` and
/// `propagate_transition_pruning` succeeds, `s -l2-> t2` is removed.
/// Iterates actual label pairs (not label groups) since the comparison uses
/// per-label costs, even though transitions are stored at group
/// granularity.
fn phase_b_sibling_dominated<C: Cost>(fts: &mut FactoredTransitionSystem, dominance: &DominanceFunction<C>, changed: &mut BTreeSet<usize>) {
    let num_labels = fts.get_labels().num_labels();
    let num_ts = fts.get_size();

    for ts_index in 0..num_ts {
        for l1_value in 0..num_labels {
            let l1 = LabelId::new(l1_value);
            if fts.get_labels().is_removed(l1) {
                continue;
            }
            for l2_value in 0..num_labels {
                let l2 = LabelId::new(l2_value);
                if l1_value == l2_value || fts.get_labels().is_removed(l2) {
                    continue;
                }

                let g1 = fts.get_ts(ts_index).group_of(l1);
                let g2 = fts.get_ts(ts_index).group_of(l2);
                let l_value = dominance.label().q_dominates(g1, g2, ts_index);
                if l_value.is_neg_infinity() {
                    continue;
                }

                let cost_term = fts.get_labels().cost(l2) - fts.get_labels().cost(l1);
                let local = dominance.local(ts_index);

                let mut removable = Vec::new();
                for t2 in fts.get_ts(ts_index).group(g2).transitions() {
                    for t1 in fts.get_ts(ts_index).group(g1).transitions_from(t2.source) {
                        let r_value = local.q_simulates(t1.target, t2.target);
                        if r_value.is_neg_infinity() {
                            continue;
                        }
                        let sum = l_value.saturating_add(r_value).saturating_add(C::from_finite(cost_term));
                        if sum >= C::zero() && propagate_transition_pruning(fts, dominance, ts_index, *t2, l2) {
                            removable.push(*t2);
                            break;
                        }
                    }
                }

                for transition in removable {
                    if fts.get_ts_mut(ts_index).remove_transition(g2, transition) {
                        changed.insert(ts_index);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use numdom_lts::Labels;
    use numdom_lts::TransitionSystem;
    use numdom_number::IntCost;

    use super::*;
    use crate::builder::build_dominance_function;
    use crate::config::DominanceConfig;

    #[test]
    fn sibling_transition_is_removed_when_dominated() {
        // s0 --l1--> t1, s0 --l2--> t2, both cost 1, t1 ~ t2 (same goal
        // status) so R(t1,t2) = 0 and L(g1,g2) ends up >= 0. Spec 8
        // scenario 6.
        let ts = TransitionSystem::new(3, 0, vec![false, true, true], 2, vec![vec![(0, 1)], vec![(0, 2)]]).unwrap();
        let mut fts = FactoredTransitionSystem::new(vec![ts], Labels::new(vec![1, 1]));
        let dominance = build_dominance_function::<IntCost>(&fts, &DominanceConfig::default());

        let changed = prune_dominated_transitions(&mut fts, &dominance);
        assert!(!changed.is_empty());

        let ts_after = fts.get_ts(0);
        let g2 = ts_after.group_of(LabelId::new(1));
        assert!(ts_after.group(g2).transitions_from(0).is_empty());
    }

    #[test]
    fn pruning_twice_is_idempotent() {
        let ts = TransitionSystem::new(3, 0, vec![false, true, true], 2, vec![vec![(0, 1)], vec![(0, 2)]]).unwrap();
        let mut fts = FactoredTransitionSystem::new(vec![ts], Labels::new(vec![1, 1]));
        let dominance = build_dominance_function::<IntCost>(&fts, &DominanceConfig::default());

        prune_dominated_transitions(&mut fts, &dominance);
        let second_pass = prune_dominated_transitions(&mut fts, &dominance);
        assert!(second_pass.is_empty());
    }
}
