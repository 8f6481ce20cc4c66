use rand::Rng;

use crate::FactoredTransitionSystem;
use crate::Labels;
use crate::TransitionSystem;

/// Generates a small, valid factored transition system for randomized
/// testing of the dominance fixpoint (spec 8 "end-to-end scenarios" and
/// invariants 1-4), following the teacher's `random_lts` generator: pick
/// sizes, then wire up random transitions per label, discarding anything
/// that would fail [`TransitionSystem::new`]'s validation (out-of-range
/// states can't occur here since every state index is drawn from
/// `0..num_states`).
pub fn random_fts(rng: &mut impl Rng, num_ts: usize, num_states: usize, num_labels: usize, max_transitions_per_label: usize) -> FactoredTransitionSystem {
    let costs = (0..num_labels).map(|_| rng.random_range(0..3)).collect();
    let labels = Labels::new(costs);

    let transition_systems = (0..num_ts)
        .map(|_| random_transition_system(rng, num_states, num_labels, max_transitions_per_label))
        .collect();

    FactoredTransitionSystem::new(transition_systems, labels)
}

fn random_transition_system(rng: &mut impl Rng, num_states: usize, num_labels: usize, max_transitions_per_label: usize) -> TransitionSystem {
    let initial_state = rng.random_range(0..num_states);
    let goal: Vec<bool> = (0..num_states).map(|_| rng.random_bool(0.3)).collect();

    let label_transitions = (0..num_labels)
        .map(|_| {
            let num_transitions = rng.random_range(0..=max_transitions_per_label);
            (0..num_transitions).map(|_| (rng.random_range(0..num_states), rng.random_range(0..num_states))).collect()
        })
        .collect();

    TransitionSystem::new(num_states, initial_state, goal, num_labels, label_transitions)
        .expect("random_fts only ever generates in-range states")
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn random_fts_is_well_formed() {
        let mut rng = StdRng::seed_from_u64(42);
        let fts = random_fts(&mut rng, 3, 4, 3, 3);
        assert_eq!(fts.get_size(), 3);
        assert_eq!(fts.get_labels().num_labels(), 3);
        for ts_index in 0..fts.get_size() {
            assert_eq!(fts.get_ts(ts_index).num_states(), 4);
        }
    }
}
