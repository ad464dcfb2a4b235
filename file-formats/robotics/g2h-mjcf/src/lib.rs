//! # g2h_mjcf - MJCF robot kinematics
//!
//! Reads MuJoCo (MJCF) robot descriptions into the two structures a motion
//! replay needs:
//!
//! - a [`KinematicModel`]: the body tree flattened into a pre-ordered array
//!   with parent indices and at most one hinge joint per body
//! - a [`VisualGeometry`]: the mesh geoms of every body, scaled, transformed
//!   into the body frame and colored
//!
//! [`forward`] then turns a root trajectory and joint angles into world poses
//! for every body and frame.
//!
//! ## Example
//!
//! ```rust
//! use g2h_mjcf::KinematicModel;
//! use glam::{Quat, Vec3};
//!
//! # fn main() -> g2h_mjcf::Result<()> {
//! let model = KinematicModel::parse(r#"
//!     <mujoco>
//!       <worldbody>
//!         <body name="base">
//!           <body name="link_a" pos="0 0 1">
//!             <joint axis="0 0 1"/>
//!             <body name="link_b" pos="0 0 1"/>
//!           </body>
//!         </body>
//!       </worldbody>
//!     </mujoco>
//! "#)?;
//!
//! let poses = model.forward(
//!     &[Vec3::ZERO],
//!     &[Quat::IDENTITY],
//!     &[[std::f32::consts::FRAC_PI_2]],
//! )?;
//! let tip = poses.position(0, 2).unwrap_or_default();
//! assert!((tip - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod coordinate;
pub mod document;
pub mod error;
pub mod geometry;
pub mod kinematics;
pub mod mesh;
pub mod topology;

pub use coordinate::{CoordinateSystem, CoordinateTransformer};
pub use error::{MjcfError, Result};
pub use geometry::{BodyGeometry, VisualGeometry};
pub use kinematics::{FramePoses, forward};
pub use mesh::{MeshFormat, SurfaceMesh};
pub use topology::{Body, KinematicModel};

/// Load both the kinematic model and the visual geometry of one MJCF file
///
/// The file is read and parsed once.
pub fn load_robot(path: impl AsRef<std::path::Path>) -> Result<(KinematicModel, VisualGeometry)> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let doc = roxmltree::Document::parse(&text)?;
    let base_dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));

    let model = KinematicModel::from_document(&doc)?;
    let geometry = VisualGeometry::from_document(&doc, base_dir)?;
    log::info!(
        "Loaded robot {}: {} bodies, {} DOF, {} meshes",
        path.display(),
        model.len(),
        model.num_dof(),
        geometry.mesh_count()
    );
    Ok((model, geometry))
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
