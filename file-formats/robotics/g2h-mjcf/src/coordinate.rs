//! Coordinate system transformations between motion sources and viewers
//!
//! MuJoCo descriptions and the motion records produced from them use a
//! right-handed, Z-up coordinate system. Most interactive viewers expect a
//! right-handed, Y-up system instead. Both are related by a fixed rotation,
//! so positions and world orientations are remapped by pre-multiplying with
//! that rotation.
//!
//! # Examples
//!
//! ```rust
//! use g2h_mjcf::coordinate::{CoordinateSystem, CoordinateTransformer};
//! use glam::Vec3;
//!
//! let transformer = CoordinateTransformer::new(CoordinateSystem::ZUp, CoordinateSystem::YUp);
//! let up = transformer.transform_position(Vec3::Z);
//! assert!((up - Vec3::Y).length() < 1e-6);
//! ```
//!
//! Quaternions are stored in `glam` order internally. Helpers at the bottom of
//! this module convert from and to the scalar-first (`w, x, y, z`) layout that
//! MJCF files, motion records and viewers exchange.

use glam::{Mat3, Quat, Vec3};

use crate::kinematics::FramePoses;

/// Supported coordinate systems (all right-handed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSystem {
    /// MuJoCo / robotics convention: Forward=X+, Left=Y+, Up=Z+
    #[default]
    ZUp,
    /// Viewer convention: Right=X+, Up=Y+, Backward=Z+
    YUp,
}

impl CoordinateSystem {
    /// Rotation taking this system's axes onto the Z-up system
    fn to_z_up(self) -> Quat {
        match self {
            Self::ZUp => Quat::IDENTITY,
            // Inverse of the Z-up → Y-up rotation below
            Self::YUp => Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        }
    }

    /// Rotation taking Z-up axes onto this system
    fn from_z_up(self) -> Quat {
        match self {
            Self::ZUp => Quat::IDENTITY,
            // (x, y, z) → (x, z, -y): up becomes +Y
            Self::YUp => Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
        }
    }
}

/// Rotation that maps coordinates expressed in `from` into `to`
pub fn conversion_rotation(from: CoordinateSystem, to: CoordinateSystem) -> Quat {
    to.from_z_up() * from.to_z_up()
}

/// Transform a position between coordinate systems
pub fn transform_position(pos: Vec3, from: CoordinateSystem, to: CoordinateSystem) -> Vec3 {
    conversion_rotation(from, to) * pos
}

/// Transform a world orientation between coordinate systems
///
/// The body's own frame is left untouched; only the world frame it is
/// expressed in changes, so the conversion is applied on the left.
pub fn transform_quaternion(quat: Quat, from: CoordinateSystem, to: CoordinateSystem) -> Quat {
    conversion_rotation(from, to) * quat
}

/// A coordinate transformer that applies one fixed conversion to many values
#[derive(Debug, Clone, Copy)]
pub struct CoordinateTransformer {
    rotation: Quat,
}

impl CoordinateTransformer {
    /// Create a new coordinate transformer
    pub fn new(from: CoordinateSystem, to: CoordinateSystem) -> Self {
        Self {
            rotation: conversion_rotation(from, to),
        }
    }

    /// Whether this transformer leaves values unchanged
    pub fn is_identity(&self) -> bool {
        self.rotation == Quat::IDENTITY
    }

    /// Transform a single position
    pub fn transform_position(&self, pos: Vec3) -> Vec3 {
        self.rotation * pos
    }

    /// Transform a single world orientation
    pub fn transform_quaternion(&self, quat: Quat) -> Quat {
        self.rotation * quat
    }

    /// Transform multiple positions
    pub fn transform_positions(&self, positions: &[Vec3]) -> Vec<Vec3> {
        positions
            .iter()
            .map(|&pos| self.transform_position(pos))
            .collect()
    }

    /// Transform multiple orientations
    pub fn transform_quaternions(&self, quaternions: &[Quat]) -> Vec<Quat> {
        quaternions
            .iter()
            .map(|&quat| self.transform_quaternion(quat))
            .collect()
    }

    /// Remap a full forward kinematics buffer in place
    pub fn transform_poses(&self, poses: &mut FramePoses) {
        if self.is_identity() {
            return;
        }
        for pos in poses.positions_mut() {
            *pos = self.rotation * *pos;
        }
        for rot in poses.orientations_mut() {
            *rot = self.rotation * *rot;
        }
    }
}

/// Utility functions for working with conversion matrices
pub mod matrix {
    use super::{CoordinateSystem, conversion_rotation};
    use glam::Mat3;

    /// Get the rotation matrix converting `from` coordinates into `to`
    pub fn get_transform_matrix(from: CoordinateSystem, to: CoordinateSystem) -> Mat3 {
        Mat3::from_quat(conversion_rotation(from, to))
    }

    /// Re-express a rotation matrix in the target system: `T * M`
    pub fn transform_rotation_matrix(
        matrix: Mat3,
        from: CoordinateSystem,
        to: CoordinateSystem,
    ) -> Mat3 {
        get_transform_matrix(from, to) * matrix
    }
}

/// Build a quaternion from scalar-first components
pub fn quat_from_wxyz(wxyz: [f32; 4]) -> Quat {
    Quat::from_xyzw(wxyz[1], wxyz[2], wxyz[3], wxyz[0])
}

/// Build a quaternion from scalar-last components
pub fn quat_from_xyzw(xyzw: [f32; 4]) -> Quat {
    Quat::from_array(xyzw)
}

/// Scalar-first components of a quaternion, as viewers expect them
pub fn quat_to_wxyz(quat: Quat) -> [f32; 4] {
    [quat.w, quat.x, quat.y, quat.z]
}

/// Matrix form of the Z-up → Y-up conversion, handy for debugging output
pub fn z_up_to_y_up_matrix() -> Mat3 {
    matrix::get_transform_matrix(CoordinateSystem::ZUp, CoordinateSystem::YUp)
}
