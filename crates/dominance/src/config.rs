/// Every option the dominance builder and the search glue recognize (spec
/// 6). A plain, directly-constructed struct — no plugin/option-parser
/// machinery (spec's Non-goals exclude that surface; spec 9's redesign
/// guidance replaces it with a tagged variant + a factory, see
/// [`crate::pruning_method`]).
#[derive(Clone, Debug)]
pub struct DominanceConfig {
    /// Any local-dominance value below `-truncate_value` collapses to
    /// `neg_infinity` to guarantee termination.
    pub truncate_value: i64,
    /// Per-LTS time budget ceiling, in milliseconds.
    pub max_simulation_time: u64,
    /// Per-LTS time budget floor, in milliseconds.
    pub min_simulation_time: u64,
    /// Overall builder time budget, in milliseconds.
    pub max_total_time: u64,
    /// LTSs with more states than this are skipped (identity relation via
    /// `cancel_simulation_computation`).
    pub max_lts_size_to_compute_simulation: usize,
    /// The label-dominance summary matrix is only allocated below this
    /// label count.
    pub num_labels_to_use_dominates_in: usize,
    /// Enables the self-loop rule for initial tau-label discovery.
    pub tau_labels_self_loops: bool,
    /// Enables the recursive tau-label extension (invertibility-based).
    pub tau_labels_recursive: bool,
    /// Enables the noop-dominance tau-label extension, which can restart
    /// the whole fixpoint.
    pub tau_labels_noop: bool,
    /// Prunes operators whose successor is dominated by the parent state.
    pub prune_dominated_by_parent: bool,
    /// Prunes operators whose successor is dominated by the initial state.
    pub prune_dominated_by_initial_state: bool,
    /// Enables `action_selection_pruning` (keep only a dominating op).
    pub prune_successors: bool,
    /// Runs the offline FTS transition-pruning phase before search.
    pub prune_before: bool,
    /// Re-runs transition pruning after each merge-and-shrink iteration (the
    /// driver of that iteration is out of scope here; this flag is just
    /// carried through for the glue that calls into this crate repeatedly).
    pub prune_after: bool,
    /// Enables diagnostic dumping via `numdom_io::DumpFiles`.
    pub dump: bool,
    /// Stops after building the dominance relation, without ever entering
    /// search (used for offline analysis runs).
    pub exit_after_preprocessing: bool,
}

impl Default for DominanceConfig {
    fn default() -> Self {
        Self {
            truncate_value: 1_000,
            max_simulation_time: 2_000,
            min_simulation_time: 1_000,
            max_total_time: 600_000,
            max_lts_size_to_compute_simulation: 1_000_000,
            num_labels_to_use_dominates_in: 1_000,
            tau_labels_self_loops: true,
            tau_labels_recursive: true,
            tau_labels_noop: false,
            prune_dominated_by_parent: true,
            prune_dominated_by_initial_state: false,
            prune_successors: false,
            prune_before: true,
            prune_after: false,
            dump: false,
            exit_after_preprocessing: false,
        }
    }
}
