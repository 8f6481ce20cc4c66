//! Small utility types shared across the dominance-pruning crates: a
//! backtrace-carrying error type, tagged indices, wall-clock timing, and the
//! seeded random-test harness used by the rest of the workspace.
#![forbid(unsafe_code)]

#[macro_use]
mod cast_macro;

mod error;
mod no_hasher;
mod random_test;
mod tagged_index;
mod test_logger;
mod timing;

pub use error::*;
pub use no_hasher::*;
pub use random_test::*;
pub use tagged_index::*;
pub use test_logger::*;
pub use timing::*;
