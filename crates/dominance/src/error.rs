use thiserror::Error;

/// Invariant violations detected while refining a dominance relation (spec
/// 7 "Invariant violation"). These are always bugs in the fixpoint itself,
/// never a consequence of a malformed task, so they are asserted against
/// rather than routed through `Result` in the hot loops; this enum exists
/// for the few call sites (e.g. diagnostic dumps) that want a structured
/// description of what tripped.
#[derive(Error, Debug)]
pub enum InvariantError {
    #[error("R_{ts}({s}, {t}) = {value}, but {t} is a goal state and {s} is not (goal-respecting violated)")]
    GoalRespectingViolated { ts: usize, s: usize, t: usize, value: String },

    #[error("R_{ts}({s}, {s}) = {value}, expected 0 (reflexivity)")]
    NotReflexive { ts: usize, s: usize, value: String },

    #[error("R_{ts}({s}, {t}) = {value} is outside [-infinity, 0]")]
    OutOfRange { ts: usize, s: usize, t: usize, value: String },

    #[error("poison value observed while refining the dominance relation for ts {ts}")]
    Poison { ts: usize },
}
