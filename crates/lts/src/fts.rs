use numdom_collections::VecSet;

use crate::FtsError;
use crate::LabelGroupId;
use crate::LabelId;
use crate::Labels;
use crate::StateIndex;

/// Sentinel local-state value denoting that a component of a world state is a
/// dead end (spec: "any component = -1"). Kept as a reserved `usize` value
/// rather than `Option<StateIndex>` inside [`State`] so world states stay a
/// flat, copyable-friendly `Vec<StateIndex>`; the narrow boundary that talks
/// to an external search engine (see [`crate::SearchTask`]) is the place that
/// should translate to/from `Option<StateIndex>`.
pub const DEAD_END: StateIndex = usize::MAX;

/// A single transition `source --> target` within one label group of one
/// transition system. Ordered by `(source, target)` so a group's transition
/// list can be binary-searched by source state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Transition {
    pub source: StateIndex,
    pub target: StateIndex,
}

/// A label group: the set of labels that have an identical transition
/// relation in one transition system (spec: "Label groups"), plus that
/// shared relation itself, sorted by source state.
#[derive(Clone, Debug)]
pub struct LabelGroup {
    labels: VecSet<LabelId>,
    transitions: Vec<Transition>,
}

impl LabelGroup {
    pub fn labels(&self) -> &VecSet<LabelId> {
        &self.labels
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Transitions leaving `source`, found by binary search since
    /// `transitions` is sorted by `(source, target)`.
    pub fn transitions_from(&self, source: StateIndex) -> &[Transition] {
        let start = self.transitions.partition_point(|t| t.source < source);
        let end = self.transitions.partition_point(|t| t.source <= source);
        &self.transitions[start..end]
    }

    fn remove_transition(&mut self, transition: Transition) -> bool {
        if let Ok(pos) = self.transitions.binary_search(&transition) {
            self.transitions.remove(pos);
            true
        } else {
            false
        }
    }
}

/// One LTS of the factored transition system: states (with goal flags and a
/// distinguished initial state), the label groups induced by its transition
/// relation, and per-label irrelevance (spec 3 "Transition system (LTS)").
#[derive(Clone, Debug)]
pub struct TransitionSystem {
    num_states: usize,
    initial_state: StateIndex,
    goal: Vec<bool>,
    groups: Vec<LabelGroup>,
    label_group_of: Vec<LabelGroupId>,
    irrelevant: Vec<bool>,
}

impl TransitionSystem {
    /// Builds a transition system from raw per-label transitions
    /// (`label_transitions[label]` lists every `(source, target)` pair that
    /// label induces), normalizing labels with an identical transition
    /// relation into a single [`LabelGroup`] (spec 3 "Label groups").
    pub fn new(
        num_states: usize,
        initial_state: StateIndex,
        goal: Vec<bool>,
        num_labels: usize,
        label_transitions: Vec<Vec<(StateIndex, StateIndex)>>,
    ) -> Result<Self, FtsError> {
        if initial_state >= num_states {
            return Err(FtsError::InitialStateOutOfRange { initial_state, num_states });
        }
        if goal.len() != num_states {
            return Err(FtsError::GoalFlagsLengthMismatch { actual: goal.len(), expected: num_states });
        }
        if label_transitions.len() != num_labels {
            return Err(FtsError::LabelTransitionsLengthMismatch { actual: label_transitions.len(), expected: num_labels });
        }

        let mut normalized: Vec<Vec<Transition>> = Vec::with_capacity(num_labels);
        for (label, transitions) in label_transitions.iter().enumerate() {
            let mut sorted = Vec::with_capacity(transitions.len());
            for &(source, target) in transitions {
                if source >= num_states {
                    return Err(FtsError::StateOutOfRange { state: source, num_states });
                }
                if target >= num_states {
                    return Err(FtsError::StateOutOfRange { state: target, num_states });
                }
                let _ = label;
                sorted.push(Transition { source, target });
            }
            sorted.sort_unstable();
            sorted.dedup();
            normalized.push(sorted);
        }

        // Group labels with an identical transition relation together.
        let mut groups: Vec<LabelGroup> = Vec::new();
        let mut label_group_of = vec![LabelGroupId::new(0); num_labels];
        for label in 0..num_labels {
            let existing = groups.iter().position(|g| g.transitions == normalized[label]);
            match existing {
                Some(index) => {
                    groups[index].labels.insert(LabelId::new(label));
                    label_group_of[label] = LabelGroupId::new(index);
                }
                None => {
                    let mut labels = VecSet::new();
                    labels.insert(LabelId::new(label));
                    label_group_of[label] = LabelGroupId::new(groups.len());
                    groups.push(LabelGroup { labels, transitions: normalized[label].clone() });
                }
            }
        }

        // A label is irrelevant iff every state has a self-loop with it.
        let irrelevant = (0..num_labels)
            .map(|label| {
                let group = &groups[label_group_of[label].value()];
                (0..num_states).all(|s| group.transitions_from(s).iter().any(|t| t.target == s))
            })
            .collect();

        Ok(Self { num_states, initial_state, goal, groups, label_group_of, irrelevant })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn initial_state(&self) -> StateIndex {
        self.initial_state
    }

    pub fn is_goal(&self, state: StateIndex) -> bool {
        self.goal[state]
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn group(&self, group: LabelGroupId) -> &LabelGroup {
        &self.groups[group.value()]
    }

    pub fn groups(&self) -> impl Iterator<Item = (LabelGroupId, &LabelGroup)> {
        self.groups.iter().enumerate().map(|(i, g)| (LabelGroupId::new(i), g))
    }

    pub fn group_of(&self, label: LabelId) -> LabelGroupId {
        self.label_group_of[label.value()]
    }

    pub fn is_irrelevant_label(&self, label: LabelId) -> bool {
        self.irrelevant[label.value()]
    }

    /// Removes one transition from a label group, used by the offline
    /// transition-pruning phase (spec 4.6). Returns `true` if a transition
    /// was actually removed.
    pub fn remove_transition(&mut self, group: LabelGroupId, transition: Transition) -> bool {
        self.groups[group.value()].remove_transition(transition)
    }
}

/// The shared-alphabet factored transition system (spec 3 "FTS"): a fixed
/// vector of [`TransitionSystem`]s plus the [`Labels`] alphabet they all
/// refer to.
#[derive(Clone, Debug)]
pub struct FactoredTransitionSystem {
    transition_systems: Vec<TransitionSystem>,
    labels: Labels,
}

impl FactoredTransitionSystem {
    pub fn new(transition_systems: Vec<TransitionSystem>, labels: Labels) -> Self {
        Self { transition_systems, labels }
    }

    /// Number of LTSs (spec 6: `get_size`).
    pub fn get_size(&self) -> usize {
        self.transition_systems.len()
    }

    /// Spec 6: `get_ts(i)`.
    pub fn get_ts(&self, i: usize) -> &TransitionSystem {
        &self.transition_systems[i]
    }

    pub fn get_ts_mut(&mut self, i: usize) -> &mut TransitionSystem {
        &mut self.transition_systems[i]
    }

    /// Spec 6: `get_labels()`.
    pub fn get_labels(&self) -> &Labels {
        &self.labels
    }

    pub fn get_labels_mut(&mut self) -> &mut Labels {
        &mut self.labels
    }

    /// Marks `label` globally removed from the alphabet (spec 4.6.A: "If l
    /// is dominated-by-noop in every LTS, remove l globally").
    pub fn remove_label_globally(&mut self, label: LabelId) {
        self.labels.mark_removed(label);
    }
}

/// A world state: one local state per transition system. `DEAD_END` marks a
/// component that has no valid local state (spec 4.5 "dead-end successor").
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct State(Vec<StateIndex>);

impl State {
    pub fn new(components: Vec<StateIndex>) -> Self {
        Self(components)
    }

    pub fn num_components(&self) -> usize {
        self.0.len()
    }

    pub fn component(&self, ts: usize) -> StateIndex {
        self.0[ts]
    }

    pub fn components(&self) -> &[StateIndex] {
        &self.0
    }

    pub fn is_dead_end(&self) -> bool {
        self.0.iter().any(|&c| c == DEAD_END)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_state_chain() -> TransitionSystem {
        // s0 --a--> s1, s1 is the only goal state.
        TransitionSystem::new(2, 0, vec![false, true], 1, vec![vec![(0, 1)]]).unwrap()
    }

    #[test]
    fn groups_labels_with_identical_relations() {
        // Two labels inducing the same transition relation end up in one group.
        let ts = TransitionSystem::new(2, 0, vec![false, true], 2, vec![vec![(0, 1)], vec![(0, 1)]]).unwrap();
        assert_eq!(ts.num_groups(), 1);
        assert_eq!(ts.group_of(LabelId::new(0)), ts.group_of(LabelId::new(1)));
    }

    #[test]
    fn irrelevant_label_has_self_loop_everywhere() {
        let ts = TransitionSystem::new(2, 0, vec![false, true], 2, vec![vec![(0, 1)], vec![(0, 0), (1, 1)]]).unwrap();
        assert!(!ts.is_irrelevant_label(LabelId::new(0)));
        assert!(ts.is_irrelevant_label(LabelId::new(1)));
    }

    #[test]
    fn transitions_from_binary_searches_by_source() {
        let ts = two_state_chain();
        let group = ts.group(ts.group_of(LabelId::new(0)));
        assert_eq!(group.transitions_from(0), &[Transition { source: 0, target: 1 }]);
        assert!(group.transitions_from(1).is_empty());
    }

    #[test]
    fn rejects_out_of_range_state() {
        let err = TransitionSystem::new(2, 0, vec![false, true], 1, vec![vec![(0, 5)]]).unwrap_err();
        assert!(matches!(err, FtsError::StateOutOfRange { state: 5, num_states: 2 }));
    }

    #[test]
    fn state_detects_dead_end_component() {
        let state = State::new(vec![0, DEAD_END, 2]);
        assert!(state.is_dead_end());
        assert!(!State::new(vec![0, 1, 2]).is_dead_end());
    }
}
