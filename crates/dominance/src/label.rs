use numdom_lts::FactoredTransitionSystem;
use numdom_lts::LabelGroupId;
use numdom_lts::LabelId;
use numdom_lts::TransitionSystem;
use numdom_number::Cost;

use crate::local::LocalDominanceFunction;

/// A practical stand-in for "+infinity": the seed value every `L_i(g1,g2)`
/// cell starts at before its first refinement pass clamps it down to a real
/// value (spec 4.2 `init`: "seed L with +inf"). Large enough that no real
/// `saturating_add` in this crate's formulas can reach it by accident.
const OPTIMISTIC_MAGNITUDE: i64 = i64::MAX / 4;

/// Summary of which LTS (if any) a label pair may still dominate in at the
/// label level (spec 3 "A derived summary `may_dominate(l1,l2)`").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DominatesIn {
    /// Dominates in every LTS.
    All,
    /// Dominates in no LTS.
    None,
    /// Dominates only in this specific LTS (as far as is currently known).
    Only(usize),
}

/// Cross-LTS label dominance: a per-LTS table of `L_i(g1,g2)` values plus the
/// two "simulates/simulated-by irrelevant" vectors and (when the label
/// alphabet is small enough) the `may_dominate` summary (spec 4.2).
pub struct LabelDominanceFunction<C: Cost> {
    table: Vec<Vec<Vec<C>>>,
    simulates_irrelevant: Vec<Vec<C>>,
    simulated_by_irrelevant: Vec<Vec<C>>,
    may_dominate: Option<Vec<Vec<DominatesIn>>>,
}

impl<C: Cost> LabelDominanceFunction<C> {
    /// Allocates the tables and runs the first refinement pass over every
    /// LTS (spec 4.2 `init`). The summary matrix is only allocated when
    /// `|labels| <= num_labels_to_use_dominates_in`.
    pub fn init(fts: &FactoredTransitionSystem, locals: &[LocalDominanceFunction<C>], num_labels_to_use_dominates_in: usize) -> Self {
        let use_summary = fts.get_labels().num_labels() <= num_labels_to_use_dominates_in;
        let mut this = Self::new_uninitialized(fts, use_summary);
        for ts_index in 0..fts.get_size() {
            this.refine_ts(fts, ts_index, &locals[ts_index]);
        }
        this
    }

    fn new_uninitialized(fts: &FactoredTransitionSystem, use_summary: bool) -> Self {
        let table = (0..fts.get_size())
            .map(|ts_index| {
                let n = fts.get_ts(ts_index).num_groups();
                let mut t = vec![vec![C::from_finite(OPTIMISTIC_MAGNITUDE); n]; n];
                for row in 0..n {
                    // Reflexivity of L: L_i(g,g) = 0 (spec invariant 5), held
                    // fixed and never refined away.
                    t[row][row] = C::zero();
                }
                t
            })
            .collect();

        let simulates_irrelevant =
            (0..fts.get_size()).map(|ts_index| vec![C::from_finite(OPTIMISTIC_MAGNITUDE); fts.get_ts(ts_index).num_groups()]).collect();
        let simulated_by_irrelevant = simulates_irrelevant.clone();

        let num_labels = fts.get_labels().num_labels();
        let may_dominate = use_summary.then(|| vec![vec![DominatesIn::All; num_labels]; num_labels]);

        Self { table, simulates_irrelevant, simulated_by_irrelevant, may_dominate }
    }

    /// One round of refinement for `ts_index` (spec 4.2 `update`, applied
    /// per LTS). Returns whether any value decreased.
    pub fn refine_ts(&mut self, fts: &FactoredTransitionSystem, ts_index: usize, local: &LocalDominanceFunction<C>) -> bool {
        let ts = fts.get_ts(ts_index);
        let num_groups = ts.num_groups();
        let mut changed = false;

        for g1 in 0..num_groups {
            for g2 in 0..num_groups {
                if g1 == g2 {
                    continue;
                }
                if !self.may_still_dominate(fts, ts_index, g1, g2) {
                    continue;
                }
                if let Some(new_value) = Self::compute_label_value(ts, local, LabelGroupId::new(g1), LabelGroupId::new(g2)) {
                    let old = self.table[ts_index][g1][g2];
                    if new_value < old {
                        self.table[ts_index][g1][g2] = new_value;
                        changed = true;
                    }
                }
            }

            let group = LabelGroupId::new(g1);
            if let Some(new_value) = Self::compute_simulates_irrelevant(ts, local, group) {
                let old = self.simulates_irrelevant[ts_index][g1];
                if new_value < old {
                    self.simulates_irrelevant[ts_index][g1] = new_value;
                    changed = true;
                }
            }
            if let Some(new_value) = Self::compute_simulated_by_irrelevant(ts, local, group) {
                let old = self.simulated_by_irrelevant[ts_index][g1];
                if new_value < old {
                    self.simulated_by_irrelevant[ts_index][g1] = new_value;
                    changed = true;
                }
            }
        }

        if changed && self.may_dominate.is_some() {
            self.recompute_summary(fts);
        }
        changed
    }

    /// Runs one refinement round over every LTS (spec 4.2 `update`).
    /// Returns whether anything decreased anywhere.
    pub fn update(&mut self, fts: &FactoredTransitionSystem, locals: &[LocalDominanceFunction<C>]) -> bool {
        let mut changed = false;
        for ts_index in 0..fts.get_size() {
            changed |= self.refine_ts(fts, ts_index, &locals[ts_index]);
        }
        changed
    }

    /// Cheap gate used to skip pairs the summary already knows dominate
    /// nowhere. Purely a performance hint: query methods always re-read the
    /// per-LTS table directly, so a stale/optimistic `true` here can never
    /// cause unsound pruning downstream.
    fn may_still_dominate(&self, fts: &FactoredTransitionSystem, ts_index: usize, g1: usize, g2: usize) -> bool {
        let Some(summary) = &self.may_dominate else { return true };
        let ts = fts.get_ts(ts_index);
        ts.group(LabelGroupId::new(g1))
            .labels()
            .iter()
            .any(|&l1| ts.group(LabelGroupId::new(g2)).labels().iter().any(|&l2| summary[l1.value()][l2.value()] != DominatesIn::None))
    }

    /// `min over (s -g2-> t) of max over (s -g1-> t') of R_i(t', t)` (spec
    /// 4.2). `None` if `g2` has no transitions (no constraint this pass).
    fn compute_label_value(ts: &TransitionSystem, local: &LocalDominanceFunction<C>, g1: LabelGroupId, g2: LabelGroupId) -> Option<C> {
        let group2 = ts.group(g2);
        if group2.transitions().is_empty() {
            return None;
        }
        let group1 = ts.group(g1);

        let mut min_value: Option<C> = None;
        for t2 in group2.transitions() {
            let responses = group1.transitions_from(t2.source);
            let max_value = responses.iter().map(|t1| local.q_simulates(t1.target, t2.target)).max().unwrap_or_else(C::neg_infinity);
            min_value = Some(match min_value {
                None => max_value,
                Some(current) => current.min(max_value),
            });
        }
        min_value
    }

    fn compute_simulates_irrelevant(ts: &TransitionSystem, local: &LocalDominanceFunction<C>, group: LabelGroupId) -> Option<C> {
        let transitions = ts.group(group).transitions();
        if transitions.is_empty() {
            return None;
        }
        transitions.iter().map(|t| local.q_simulates(t.source, t.target)).reduce(|a, b| a.min(b))
    }

    fn compute_simulated_by_irrelevant(ts: &TransitionSystem, local: &LocalDominanceFunction<C>, group: LabelGroupId) -> Option<C> {
        let transitions = ts.group(group).transitions();
        if transitions.is_empty() {
            return None;
        }
        transitions.iter().map(|t| local.q_simulates(t.target, t.source)).reduce(|a, b| a.min(b))
    }

    fn recompute_summary(&mut self, fts: &FactoredTransitionSystem) {
        let Some(summary) = &mut self.may_dominate else { return };
        let num_labels = fts.get_labels().num_labels();

        for l1 in 0..num_labels {
            for l2 in 0..num_labels {
                if l1 == l2 {
                    summary[l1][l2] = DominatesIn::All;
                    continue;
                }

                let mut dominates_in_ts = None;
                let mut count = 0;
                for ts_index in 0..fts.get_size() {
                    let ts = fts.get_ts(ts_index);
                    let g1 = ts.group_of(LabelId::new(l1));
                    let g2 = ts.group_of(LabelId::new(l2));
                    if !self.table[ts_index][g1.value()][g2.value()].is_neg_infinity() {
                        count += 1;
                        dominates_in_ts = Some(ts_index);
                    }
                }

                summary[l1][l2] = if count == fts.get_size() {
                    DominatesIn::All
                } else if count == 0 {
                    DominatesIn::None
                } else if count == 1 {
                    DominatesIn::Only(dominates_in_ts.expect("count == 1 implies one recorded ts"))
                } else {
                    // More than one, but not all, LTS still allow it: kept
                    // optimistically as `All` so `may_still_dominate` never
                    // skips a pair that genuinely still needs refining.
                    DominatesIn::All
                };
            }
        }
    }

    pub fn q_dominates(&self, g1: LabelGroupId, g2: LabelGroupId, ts_index: usize) -> C {
        self.table[ts_index][g1.value()][g2.value()]
    }

    pub fn may_dominate(&self, l1: LabelId, l2: LabelId) -> DominatesIn {
        self.may_dominate.as_ref().map(|summary| summary[l1.value()][l2.value()]).unwrap_or(DominatesIn::All)
    }

    pub fn may_simulate(&self, g1: LabelGroupId, g2: LabelGroupId, ts_index: usize) -> bool {
        !self.q_dominates(g1, g2, ts_index).is_neg_infinity()
    }

    /// `L_i(noop, g)`: how well doing nothing simulates `g`.
    pub fn q_dominates_noop(&self, g: LabelGroupId, ts_index: usize) -> C {
        self.simulates_irrelevant[ts_index][g.value()]
    }

    /// `L_i(g, noop)`: how well `g` simulates doing nothing.
    pub fn q_dominated_by_noop(&self, g: LabelGroupId, ts_index: usize) -> C {
        self.simulated_by_irrelevant[ts_index][g.value()]
    }

    pub fn get_label_simulates_irrelevant(&self, ts_index: usize, g: LabelGroupId) -> C {
        self.q_dominates_noop(g, ts_index)
    }
}

#[cfg(test)]
mod tests {
    use numdom_lts::Labels;
    use numdom_lts::TransitionSystem;
    use numdom_number::IntCost;

    use super::*;

    #[test]
    fn reflexivity_holds_after_init() {
        let ts = TransitionSystem::new(2, 0, vec![false, true], 1, vec![vec![(0, 1)]]).unwrap();
        let labels = Labels::new(vec![1]);
        let fts = FactoredTransitionSystem::new(vec![ts.clone()], labels);
        let local = LocalDominanceFunction::<IntCost>::init_goal_respecting(&ts, 1000);
        let label = LabelDominanceFunction::init(&fts, &[local], 1000);

        let group = fts.get_ts(0).group_of(LabelId::new(0));
        assert_eq!(label.q_dominates(group, group, 0), IntCost::zero());
    }

    #[test]
    fn summary_reports_all_when_single_lts() {
        let ts = TransitionSystem::new(2, 0, vec![false, true], 2, vec![vec![(0, 1)], vec![(0, 0), (1, 1)]]).unwrap();
        let labels = Labels::new(vec![1, 0]);
        let fts = FactoredTransitionSystem::new(vec![ts.clone()], labels);
        let local = LocalDominanceFunction::<IntCost>::init_goal_respecting(&ts, 1000);
        let label = LabelDominanceFunction::init(&fts, &[local], 1000);

        // Label 1 (the self-loop) dominates noop trivially in the only LTS,
        // so it should never report `None`.
        assert_ne!(label.may_dominate(LabelId::new(1), LabelId::new(0)), DominatesIn::None);
    }
}
