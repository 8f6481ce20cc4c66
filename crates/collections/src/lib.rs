//! Compact collection types used by the dominance and tau-label fixpoints.
#![forbid(unsafe_code)]

mod vecset;

pub use vecset::*;
