//! Motion records exchanged by the gen2humanoid pipeline.
//!
//! - [`GeneratedMotion`]: raw text-to-motion generator output
//! - [`SmplxMotion`]: the AMASS SMPL-X container the retargeter consumes
//! - [`RobotMotion`]: retargeted root trajectory and joint angles
//!
//! Records are stored as JSON or YAML; the format is chosen by file
//! extension.

pub mod convert;
pub mod error;
pub mod generated;
pub mod io;
pub mod robot;
pub mod smplx;

pub use convert::{ConversionSummary, convert_directory, convert_file};
pub use error::{MotionError, Result};
pub use generated::GeneratedMotion;
pub use robot::{QuatOrder, RobotMotion};
pub use smplx::{Gender, SmplxFrame, SmplxMotion};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
