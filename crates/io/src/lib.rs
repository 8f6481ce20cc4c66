//! Diagnostic I/O helpers: test-artifact dumping and human-readable number/progress formatting.
#![forbid(unsafe_code)]

mod dumpfiles;
mod format;
mod progress;

pub use dumpfiles::*;
pub use format::*;
pub use progress::*;
