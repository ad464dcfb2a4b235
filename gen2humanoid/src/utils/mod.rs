//! Shared utilities for the g2h CLI

pub mod format;
pub mod output;
pub mod subprocess;
pub mod tree;

pub use format::*;
pub use output::*;
pub use subprocess::*;
pub use tree::*;
