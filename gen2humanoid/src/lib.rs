//! gen2humanoid library
//!
//! Command implementations behind the `g2h` binary: pipeline orchestration,
//! motion conversion, robot description inspection and headless playback.

pub mod cli;
pub mod commands;
pub mod config;
pub mod utils;
