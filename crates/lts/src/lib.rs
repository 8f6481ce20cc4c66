//! Factored transition system data model: the LTSs, the shared label
//! alphabet, label groups and irrelevance, and the narrow `SearchTask`
//! boundary the dominance core consumes from the (external) search engine.
//!
//! This crate owns no planning semantics of its own — it is the concrete
//! shape of the "consumed"/"exposed" interfaces the specification treats as
//! external collaborators (SAS-file parsing, merge-and-shrink construction,
//! the generic search engine) so that the dominance core has something
//! real to build and test against.
#![forbid(unsafe_code)]

mod error;
mod fts;
mod ids;
mod labels;
mod random_fts;
mod search_task;

pub use error::*;
pub use fts::*;
pub use ids::*;
pub use labels::*;
pub use random_fts::*;
pub use search_task::*;
