//! In-memory scene graph for headless playback
//!
//! Keeps every node's local transform and mesh data so that playback can be
//! inspected, compared or exported without a display.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use glam::{Quat, Vec3};
use log::trace;
use serde::Serialize;

use crate::error::{Result, ViewerError};
use crate::scene::{MeshData, NodeId, Scene, parent_path};

/// Payload of a recorded node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Frame,
    Mesh {
        vertices: Vec<Vec3>,
        faces: Vec<[u32; 3]>,
        color: [u8; 4],
    },
}

/// One node of a [`RecordingScene`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedNode {
    pub path: String,
    pub parent: Option<NodeId>,
    pub kind: NodeKind,
    pub position: Vec3,
    /// Scalar-first orientation as last pushed
    pub wxyz: [f32; 4],
    pub scale: f32,
}

impl RecordedNode {
    fn new(path: &str, parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self {
            path: path.to_string(),
            parent,
            kind,
            position: Vec3::ZERO,
            wxyz: [1.0, 0.0, 0.0, 0.0],
            scale: 1.0,
        }
    }

    pub fn orientation(&self) -> Quat {
        let [w, x, y, z] = self.wxyz;
        Quat::from_xyzw(x, y, z, w)
    }
}

/// Serialized view of one node
#[derive(Debug, Serialize)]
struct NodeSnapshot<'a> {
    id: NodeId,
    path: &'a str,
    parent: Option<&'a str>,
    kind: &'static str,
    position: [f32; 3],
    wxyz: [f32; 4],
    scale: f32,
    world_position: [f32; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    vertex_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    face_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<[u8; 4]>,
}

#[derive(Debug, Serialize)]
struct SceneSnapshot<'a> {
    updates: u64,
    nodes: Vec<NodeSnapshot<'a>>,
}

/// A [`Scene`] that records its state in memory
#[derive(Debug, Default)]
pub struct RecordingScene {
    nodes: Vec<RecordedNode>,
    by_path: HashMap<String, NodeId>,
    updates: u64,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of transform or vertex updates applied so far
    pub fn update_count(&self) -> u64 {
        self.updates
    }

    pub fn node(&self, id: NodeId) -> Option<&RecordedNode> {
        self.nodes.get(id.0)
    }

    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &RecordedNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Direct children of a node, in creation order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, n)| n.parent == Some(id))
            .map(|(child, _)| child)
            .collect()
    }

    /// Compose local transforms from the scene root down to `id`
    ///
    /// Returns world position, orientation and uniform scale.
    pub fn world_transform(&self, id: NodeId) -> Result<(Vec3, Quat, f32)> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id).ok_or(ViewerError::UnknownNode(node_id))?;
            chain.push(node);
            current = node.parent;
        }

        let mut position = Vec3::ZERO;
        let mut rotation = Quat::IDENTITY;
        let mut scale = 1.0;
        for node in chain.iter().rev() {
            position += rotation * (node.position * scale);
            rotation *= node.orientation();
            scale *= node.scale;
        }
        Ok((position, rotation, scale))
    }

    /// Write the current scene state as pretty JSON
    pub fn write_snapshot<W: Write>(&self, writer: W) -> Result<()> {
        let nodes = self
            .nodes()
            .map(|(id, node)| {
                let world_position = self
                    .world_transform(id)
                    .map(|(p, _, _)| p)
                    .unwrap_or(node.position);
                let (kind, vertex_count, face_count, color) = match &node.kind {
                    NodeKind::Frame => ("frame", None, None, None),
                    NodeKind::Mesh {
                        vertices,
                        faces,
                        color,
                    } => ("mesh", Some(vertices.len()), Some(faces.len()), Some(*color)),
                };
                NodeSnapshot {
                    id,
                    path: &node.path,
                    parent: node
                        .parent
                        .and_then(|p| self.node(p))
                        .map(|p| p.path.as_str()),
                    kind,
                    position: node.position.to_array(),
                    wxyz: node.wxyz,
                    scale: node.scale,
                    world_position: world_position.to_array(),
                    vertex_count,
                    face_count,
                    color,
                }
            })
            .collect();

        let snapshot = SceneSnapshot {
            updates: self.updates,
            nodes,
        };
        serde_json::to_writer_pretty(writer, &snapshot)?;
        Ok(())
    }

    /// Export the current scene state to a JSON file
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_snapshot(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn insert(&mut self, path: &str, kind: NodeKind) -> Result<NodeId> {
        let path = path.trim_end_matches('/');
        if self.by_path.contains_key(path) {
            return Err(ViewerError::DuplicateNode(path.to_string()));
        }
        let parent = match parent_path(path) {
            Some(parent) => Some(
                self.find(parent)
                    .ok_or_else(|| ViewerError::MissingParent(path.to_string()))?,
            ),
            None => None,
        };

        let id = NodeId(self.nodes.len());
        self.nodes.push(RecordedNode::new(path, parent, kind));
        self.by_path.insert(path.to_string(), id);
        trace!("Added scene node {} at {}", id, path);
        Ok(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut RecordedNode> {
        let node = self.nodes.get_mut(id.0).ok_or(ViewerError::UnknownNode(id))?;
        self.updates += 1;
        Ok(node)
    }
}

impl Scene for RecordingScene {
    fn add_frame(&mut self, path: &str) -> Result<NodeId> {
        self.insert(path, NodeKind::Frame)
    }

    fn add_mesh(&mut self, path: &str, mesh: MeshData<'_>) -> Result<NodeId> {
        self.insert(
            path,
            NodeKind::Mesh {
                vertices: mesh.vertices.to_vec(),
                faces: mesh.faces.to_vec(),
                color: mesh.color,
            },
        )
    }

    fn set_position(&mut self, node: NodeId, position: Vec3) -> Result<()> {
        self.node_mut(node)?.position = position;
        Ok(())
    }

    fn set_orientation(&mut self, node: NodeId, wxyz: [f32; 4]) -> Result<()> {
        self.node_mut(node)?.wxyz = wxyz;
        Ok(())
    }

    fn set_scale(&mut self, node: NodeId, scale: f32) -> Result<()> {
        self.node_mut(node)?.scale = scale;
        Ok(())
    }

    fn set_mesh_vertices(&mut self, node: NodeId, new_vertices: &[Vec3]) -> Result<()> {
        match &mut self.node_mut(node)?.kind {
            NodeKind::Mesh { vertices, .. } if vertices.len() == new_vertices.len() => {
                vertices.copy_from_slice(new_vertices);
                Ok(())
            }
            NodeKind::Mesh { vertices, .. } => Err(ViewerError::VertexCountMismatch {
                node,
                expected: vertices.len(),
                actual: new_vertices.len(),
            }),
            NodeKind::Frame => Err(ViewerError::UnknownNode(node)),
        }
    }
}
