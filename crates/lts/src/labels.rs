use crate::ids::LabelId;

/// The shared, task-wide label alphabet: a count of labels plus a
/// non-negative integer cost per label (spec: "Label alphabet").
#[derive(Clone, Debug)]
pub struct Labels {
    cost_of_label: Vec<i64>,
    /// Labels dominated-by-noop in every LTS are removed from the alphabet
    /// entirely by the offline transition-pruning phase (spec 4.6.A). We
    /// keep the slot (to avoid renumbering every other label) and just mark
    /// it dead instead.
    removed: Vec<bool>,
}

impl Labels {
    /// Creates an alphabet with the given per-label costs. Costs must be
    /// non-negative, matching the SAS+ operator-cost model.
    pub fn new(cost_of_label: Vec<i64>) -> Self {
        debug_assert!(cost_of_label.iter().all(|&c| c >= 0), "label costs must be non-negative");
        let num_labels = cost_of_label.len();
        Self { cost_of_label, removed: vec![false; num_labels] }
    }

    pub fn num_labels(&self) -> usize {
        self.cost_of_label.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = LabelId> {
        (0..self.num_labels()).map(LabelId::new)
    }

    pub fn cost(&self, label: LabelId) -> i64 {
        self.cost_of_label[label.value()]
    }

    pub fn is_removed(&self, label: LabelId) -> bool {
        self.removed[label.value()]
    }

    /// Marks a label as globally removed (spec 4.6.A: "If l is
    /// dominated-by-noop in every LTS, remove l globally from the label
    /// alphabet").
    pub fn mark_removed(&mut self, label: LabelId) {
        self.removed[label.value()] = true;
    }
}
