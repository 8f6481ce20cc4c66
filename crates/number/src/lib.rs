//! Epsilon-augmented integer cost type shared by the two dominance-fixpoint
//! instantiations. Models the `-infinity` lattice bottom explicitly instead
//! of relying on saturating machine integers, so that accidental arithmetic
//! across the bottom is caught in debug builds rather than silently wrapping.
#![forbid(unsafe_code)]

mod cost;
mod epsilon_cost;
mod int_cost;

pub use cost::Cost;
pub use epsilon_cost::EpsilonCost;
pub use int_cost::IntCost;
