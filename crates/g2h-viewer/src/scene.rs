//! Viewer primitives the players drive
//!
//! Nodes are addressed by slash separated paths such as
//! `/robot_root/pelvis/geom_0`. A node's parent is the node named by its
//! path without the last segment; top-level nodes hang off the scene root.
//! Transforms set on a node are relative to its parent.

use std::fmt;

use glam::Vec3;
use serde::Serialize;

use crate::error::Result;

/// Handle to a node owned by a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Renderable triangle data for a new mesh node
#[derive(Debug, Clone, Copy)]
pub struct MeshData<'a> {
    pub vertices: &'a [Vec3],
    pub faces: &'a [[u32; 3]],
    /// 8-bit RGBA, uniform over all faces
    pub color: [u8; 4],
}

/// A 3-D scene exposing persistent transform and mesh nodes
pub trait Scene {
    /// Create a transform node at `path`
    fn add_frame(&mut self, path: &str) -> Result<NodeId>;

    /// Create a mesh node at `path`
    fn add_mesh(&mut self, path: &str, mesh: MeshData<'_>) -> Result<NodeId>;

    /// Set a node's position relative to its parent
    fn set_position(&mut self, node: NodeId, position: Vec3) -> Result<()>;

    /// Set a node's orientation from a scalar-first unit quaternion
    fn set_orientation(&mut self, node: NodeId, wxyz: [f32; 4]) -> Result<()>;

    /// Set a node's uniform scale
    fn set_scale(&mut self, node: NodeId, scale: f32) -> Result<()>;

    /// Replace the vertex positions of a mesh node, keeping its faces
    fn set_mesh_vertices(&mut self, node: NodeId, vertices: &[Vec3]) -> Result<()>;
}

/// Parent path of a node path, `None` for top-level nodes
pub fn parent_path(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => None,
        Some(i) => Some(&trimmed[..i]),
    }
}
