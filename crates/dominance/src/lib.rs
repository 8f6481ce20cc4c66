//! Numeric dominance pruning core: the cost type's static consumer, tau
//! labels and tau-distances, the local and label dominance fixpoints, the
//! builder that coordinates them, the search-time dominance check, offline
//! FTS transition pruning, and the glue that presents all of this to a
//! search loop as a pruning service.
#![forbid(unsafe_code)]

mod budget;
mod builder;
mod check;
mod config;
mod error;
mod fts_pruning;
mod label;
mod local;
mod pruning_method;
mod tau;

pub use budget::TimeBudget;
pub use builder::build_dominance_function;
pub use builder::DominanceFunction;
pub use check::DominanceCheck;
pub use config::DominanceConfig;
pub use error::InvariantError;
pub use fts_pruning::prune_dominated_transitions;
pub use label::DominatesIn;
pub use label::LabelDominanceFunction;
pub use local::LocalDominanceFunction;
pub use pruning_method::NullPruningMethod;
pub use pruning_method::NumericDominancePruning;
pub use pruning_method::PruningMethod;
pub use tau::TauDistances;
pub use tau::TauLabelManager;
pub use tau::TauLabels;
pub use tau::TauVersion;
