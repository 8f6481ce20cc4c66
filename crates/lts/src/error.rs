use thiserror::Error;

/// Errors raised while constructing or mutating a factored transition system.
/// Mirrors the teacher's `libraries/io/src/aut.rs::IOError` shape: a small,
/// enumerated set of `thiserror` variants rather than a string-typed error.
#[derive(Error, Debug)]
pub enum FtsError {
    #[error("transition references state {state} but the transition system only has {num_states} states")]
    StateOutOfRange { state: usize, num_states: usize },

    #[error("transition references label {label} but the label alphabet only has {num_labels} labels")]
    LabelOutOfRange { label: usize, num_labels: usize },

    #[error("initial state {initial_state} is out of range for {num_states} states")]
    InitialStateOutOfRange { initial_state: usize, num_states: usize },

    #[error("goal-state flags has length {actual}, expected {expected}")]
    GoalFlagsLengthMismatch { actual: usize, expected: usize },

    #[error("label_transitions has length {actual}, expected {expected} (one entry per label)")]
    LabelTransitionsLengthMismatch { actual: usize, expected: usize },
}
