use numdom_lts::FactoredTransitionSystem;
use numdom_lts::SearchTask;
use numdom_lts::State;
use numdom_number::Cost;

use crate::builder::build_dominance_function;
use crate::builder::DominanceFunction;
use crate::check::DominanceCheck;
use crate::config::DominanceConfig;
use crate::fts_pruning::prune_dominated_transitions;

/// The narrow "exposed to search" boundary (spec 6): `initialize` triggers
/// the build, `prune_operators` may shrink or reorder `applicable` but never
/// grows it and is never called on goal states.
pub trait PruningMethod<T: SearchTask> {
    fn initialize(&mut self, fts: &mut FactoredTransitionSystem);

    fn prune_operators(&mut self, task: &T, state: &State, parent: Option<&State>, initial: &State, applicable: &mut Vec<T::Operator>);
}

/// Matches `pruning/null_pruning_method.*`: does nothing, logs that pruning
/// is disabled.
#[derive(Default)]
pub struct NullPruningMethod;

impl<T: SearchTask> PruningMethod<T> for NullPruningMethod {
    fn initialize(&mut self, _fts: &mut FactoredTransitionSystem) {
        log::info!("pruning disabled (NullPruningMethod)");
    }

    fn prune_operators(&mut self, _task: &T, _state: &State, _parent: Option<&State>, _initial: &State, _applicable: &mut Vec<T::Operator>) {}
}

/// Matches `numeric_dominance_pruning.cc::prune_operators`: builds the
/// dominance artifact at `initialize`, optionally prunes FTS transitions
/// offline, then dispatches to `action_selection_pruning` and/or
/// `prune_dominated_by_parent_or_initial_state` per the config's toggles.
pub struct NumericDominancePruning<C: Cost> {
    config: DominanceConfig,
    dominance: Option<DominanceFunction<C>>,
}

impl<C: Cost> NumericDominancePruning<C> {
    pub fn new(config: DominanceConfig) -> Self {
        Self { config, dominance: None }
    }

    fn dominance(&self) -> &DominanceFunction<C> {
        self.dominance.as_ref().expect("initialize must be called before prune_operators")
    }
}

impl<T: SearchTask, C: Cost> PruningMethod<T> for NumericDominancePruning<C> {
    fn initialize(&mut self, fts: &mut FactoredTransitionSystem) {
        if self.config.prune_before {
            let dominance = build_dominance_function::<C>(fts, &self.config);
            prune_dominated_transitions(fts, &dominance);
            self.dominance = Some(dominance);
        } else {
            self.dominance = Some(build_dominance_function::<C>(fts, &self.config));
        }

        if self.config.exit_after_preprocessing {
            log::info!("exit_after_preprocessing set, dominance relation built and no search will run");
        }
    }

    fn prune_operators(&mut self, task: &T, state: &State, parent: Option<&State>, initial: &State, applicable: &mut Vec<T::Operator>) {
        let dominance = self.dominance();
        let mut check = DominanceCheck::new(dominance);

        if self.config.prune_successors {
            check.action_selection_pruning(task, state, applicable);
        }

        if self.config.prune_dominated_by_parent || self.config.prune_dominated_by_initial_state {
            let initial_ref = self.config.prune_dominated_by_initial_state.then_some(initial);
            check.prune_dominated_by_parent_or_initial_state(task, state, applicable, parent, self.config.prune_dominated_by_parent, initial_ref);
        }
    }
}

#[cfg(test)]
mod tests {
    use numdom_lts::LabelId;
    use numdom_lts::Labels;
    use numdom_lts::OperatorDef;
    use numdom_lts::TransitionSystem;
    use numdom_lts::VecSearchTask;
    use numdom_number::IntCost;

    use super::*;

    #[test]
    fn numeric_dominance_pruning_builds_on_initialize() {
        let ts = TransitionSystem::new(2, 0, vec![false, true], 1, vec![vec![(0, 1)]]).unwrap();
        let mut fts = FactoredTransitionSystem::new(vec![ts], Labels::new(vec![1]));
        let task = VecSearchTask::new(vec![OperatorDef { label: LabelId::new(0), cost: 1, preconditions: vec![], effects: vec![(0, 1)] }]);

        let config = DominanceConfig { prune_successors: true, ..Default::default() };
        let mut method = NumericDominancePruning::<IntCost>::new(config);
        method.initialize(&mut fts);

        let state = State::new(vec![0]);
        let initial = state.clone();
        let mut applicable = Vec::new();
        task.generate_applicable_ops(&state, &mut applicable);

        method.prune_operators(&task, &state, None, &initial, &mut applicable);
        assert_eq!(applicable.len(), 1);
    }

    #[test]
    fn null_pruning_method_never_shrinks_or_grows() {
        let mut method = NullPruningMethod;
        let ts = TransitionSystem::new(2, 0, vec![false, true], 1, vec![vec![(0, 1)]]).unwrap();
        let mut fts = FactoredTransitionSystem::new(vec![ts], Labels::new(vec![1]));
        <NullPruningMethod as PruningMethod<VecSearchTask>>::initialize(&mut method, &mut fts);

        let task = VecSearchTask::new(vec![OperatorDef { label: LabelId::new(0), cost: 1, preconditions: vec![], effects: vec![(0, 1)] }]);
        let state = State::new(vec![0]);
        let mut applicable = vec![];
        task.generate_applicable_ops(&state, &mut applicable);
        let before = applicable.len();
        method.prune_operators(&task, &state, None, &state, &mut applicable);
        assert_eq!(applicable.len(), before);
    }
}
