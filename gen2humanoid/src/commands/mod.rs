//! Command implementations

pub mod convert;
pub mod mjcf;
pub mod pipeline;
pub mod play;
pub mod robots;
