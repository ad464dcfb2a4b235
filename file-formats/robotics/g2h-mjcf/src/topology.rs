//! Skeleton topology extracted from an MJCF body tree
//!
//! The recursive `<body>` hierarchy is flattened into an index array with
//! parent back-references. Bodies are stored in pre-order, so iterating them
//! in index order always visits a parent before its children.

use std::fs;
use std::path::Path;

use glam::{Quat, Vec3};
use log::{debug, info, warn};
use roxmltree::Document;

use crate::attributes::{BodyAttributes, JointAttributes};
use crate::document::{BodyVisit, child_elements, preorder_bodies};
use crate::error::Result;
use crate::kinematics::{self, FramePoses};

/// One node of the kinematic tree
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct Body {
    /// Body name (generated as `body_<index>` when the element is unnamed)
    pub name: String,
    /// Parent index, -1 for the root
    pub parent: i32,
    /// Position relative to the parent frame
    pub local_offset: Vec3,
    /// Orientation relative to the parent frame
    pub local_orientation: Quat,
    /// Rotation axis of the single hinge joint, if the body has one
    pub joint_axis: Option<Vec3>,
}

impl Body {
    /// Number of joint angles this body consumes (0 or 1)
    pub fn dof(&self) -> usize {
        usize::from(self.joint_axis.is_some())
    }

    /// Whether this is the root of the tree
    pub fn is_root(&self) -> bool {
        self.parent < 0
    }

    /// Parent index as `usize`, `None` for the root
    pub fn parent_index(&self) -> Option<usize> {
        usize::try_from(self.parent).ok()
    }
}

/// The parsed skeleton: bodies in pre-order plus the total joint count
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct KinematicModel {
    bodies: Vec<Body>,
    num_dof: usize,
}

impl KinematicModel {
    /// Parse the kinematic tree of an MJCF file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let model = Self::parse(&text)?;
        info!(
            "Loaded kinematic model from {}: {} bodies, {} DOF",
            path.display(),
            model.len(),
            model.num_dof()
        );
        Ok(model)
    }

    /// Parse the kinematic tree of an MJCF document held in memory
    pub fn parse(xml: &str) -> Result<Self> {
        let doc = Document::parse(xml)?;
        Self::from_document(&doc)
    }

    pub(crate) fn from_document(doc: &Document<'_>) -> Result<Self> {
        let visits = preorder_bodies(doc)?;
        let bodies = visits
            .iter()
            .map(parse_body)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_bodies(bodies))
    }

    /// Build a model from bodies that are already in pre-order
    pub fn from_bodies(bodies: Vec<Body>) -> Self {
        let num_dof = bodies.iter().map(Body::dof).sum();
        Self { bodies, num_dof }
    }

    /// All bodies in pre-order
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Body by index
    pub fn body(&self, index: usize) -> Option<&Body> {
        self.bodies.get(index)
    }

    /// Index of the body with the given name
    pub fn body_index(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|b| b.name == name)
    }

    /// Number of bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the model has no bodies
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Total number of active joint angles
    pub fn num_dof(&self) -> usize {
        self.num_dof
    }

    /// Parent index of every body (-1 for the root)
    pub fn parents(&self) -> Vec<i32> {
        self.bodies.iter().map(|b| b.parent).collect()
    }

    /// Names of the bodies that own a joint, in joint-angle column order
    pub fn joint_body_names(&self) -> Vec<&str> {
        self.bodies
            .iter()
            .filter(|b| b.joint_axis.is_some())
            .map(|b| b.name.as_str())
            .collect()
    }

    /// Evaluate forward kinematics for a whole motion sequence
    ///
    /// See [`kinematics::forward`].
    pub fn forward<R: AsRef<[f32]>>(
        &self,
        root_pos: &[Vec3],
        root_rot: &[Quat],
        dof_pos: &[R],
    ) -> Result<FramePoses> {
        kinematics::forward(self, root_pos, root_rot, dof_pos)
    }
}

fn parse_body(visit: &BodyVisit<'_, '_>) -> Result<Body> {
    let attrs = BodyAttributes::from_node(visit.node)?;
    let name = visit.name();

    let joints: Vec<_> = child_elements(visit.node, "joint").collect();
    let joint_axis = match joints.as_slice() {
        [joint] => Some(JointAttributes::from_node(*joint)?.axis),
        [] => None,
        _ => {
            warn!(
                "Body '{}' has {} joints; treating it as rigidly attached",
                name,
                joints.len()
            );
            None
        }
    };

    let parent = visit
        .parent
        .map_or(-1, |p| i32::try_from(p).unwrap_or(i32::MAX));

    debug!(
        "Body {} '{}': parent={}, dof={}",
        visit.index,
        name,
        parent,
        usize::from(joint_axis.is_some())
    );

    Ok(Body {
        name,
        parent,
        local_offset: attrs.pos,
        local_orientation: attrs.quat,
        joint_axis,
    })
}
