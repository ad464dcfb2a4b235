//! Parametric human body models
//!
//! The human player only needs a body model to turn shape and pose
//! parameters into vertex positions over a fixed face list. Skinning itself
//! lives behind [`BodyModel`].

use std::path::Path;

use g2h_mjcf::SurfaceMesh;
use g2h_motion::{Gender, SmplxFrame};
use glam::{Quat, Vec3};

use crate::error::{Result, ViewerError};

/// Parameters for one body model evaluation
#[derive(Debug, Clone, Copy)]
pub struct BodyPose<'a> {
    /// Shape parameters
    pub betas: &'a [f32],
    /// Pose of one frame; `None` evaluates the rest pose
    pub frame: Option<SmplxFrame<'a>>,
}

impl<'a> BodyPose<'a> {
    pub fn rest(betas: &'a [f32]) -> Self {
        Self { betas, frame: None }
    }

    pub fn frame(betas: &'a [f32], frame: SmplxFrame<'a>) -> Self {
        Self {
            betas,
            frame: Some(frame),
        }
    }
}

/// A skinned body model evaluated on the CPU
pub trait BodyModel {
    /// Triangles of the body mesh; fixed for the model's lifetime
    fn faces(&self) -> &[[u32; 3]];

    /// Number of vertices every evaluation returns
    fn vertex_count(&self) -> usize;

    /// The currently selected gendered variant, if the model has any
    fn gender(&self) -> Option<Gender> {
        None
    }

    /// Select the gendered variant of the model
    fn set_gender(&mut self, gender: Gender) -> Result<()> {
        let _ = gender;
        Ok(())
    }

    /// Vertex positions for the given shape and pose
    fn evaluate(&self, pose: &BodyPose<'_>) -> Result<Vec<Vec3>>;
}

/// A rigid stand-in body: a template mesh moved by the root pose only
///
/// Shape, body, hand and face parameters are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidTemplate {
    vertices: Vec<Vec3>,
    faces: Vec<[u32; 3]>,
}

impl RigidTemplate {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Result<Self> {
        let count = vertices.len();
        if let Some(face) = faces.iter().find(|f| f.iter().any(|&i| i as usize >= count)) {
            return Err(ViewerError::BodyModel(format!(
                "face {face:?} references a vertex past {count}"
            )));
        }
        Ok(Self { vertices, faces })
    }

    /// Use a mesh file (STL or OBJ) as the template
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mesh = SurfaceMesh::load(path)?;
        Self::new(mesh.vertices, mesh.faces)
    }
}

impl BodyModel for RigidTemplate {
    fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn evaluate(&self, pose: &BodyPose<'_>) -> Result<Vec<Vec3>> {
        let Some(frame) = pose.frame else {
            return Ok(self.vertices.clone());
        };
        let rotation = Quat::from_scaled_axis(Vec3::from_array(*frame.root_orient));
        let translation = Vec3::from_array(*frame.trans);
        Ok(self
            .vertices
            .iter()
            .map(|&v| rotation * v + translation)
            .collect())
    }
}
