//! External process execution.
//!
//! `spawn` runs a child process and captures its output; `tiger` wraps that
//! into the [`TigerCli`] seam the rest of the program talks to.

mod spawn;
mod tiger;

pub use tiger::{CommandOutput, SystemCli, TigerCli};
