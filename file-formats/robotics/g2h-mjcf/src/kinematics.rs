//! Forward kinematics over a pre-ordered body array
//!
//! World transforms are computed in a single pass per frame. Because every
//! body's parent has a smaller index, the parent's world transform is always
//! available when a body is visited.
//!
//! For body `i` with parent `p`:
//!
//! ```text
//! world_rot[i] = world_rot[p] * local_rot[i] * joint_rot[i]
//! world_pos[i] = world_pos[p] + world_rot[p] * local_offset[i]
//! ```
//!
//! The joint rotation only reaches a body's descendants; its own position is
//! fixed by the parent's frame. Quaternions are not renormalized after
//! composition.

use glam::{Quat, Vec3};
use log::debug;

use crate::error::{MjcfError, Result};
use crate::topology::KinematicModel;

/// World-space pose of every body for every frame
///
/// Stored flat in frame-major order, `T * B` entries per buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePoses {
    frame_count: usize,
    body_count: usize,
    positions: Vec<Vec3>,
    orientations: Vec<Quat>,
}

impl FramePoses {
    /// An empty buffer shaped for `frame_count` frames of `body_count` bodies
    fn with_shape(frame_count: usize, body_count: usize) -> Self {
        let len = frame_count * body_count;
        Self {
            frame_count,
            body_count,
            positions: vec![Vec3::ZERO; len],
            orientations: vec![Quat::IDENTITY; len],
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn body_count(&self) -> usize {
        self.body_count
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// World position of one body in one frame
    pub fn position(&self, frame: usize, body: usize) -> Option<Vec3> {
        self.index(frame, body).map(|i| self.positions[i])
    }

    /// World orientation of one body in one frame
    pub fn orientation(&self, frame: usize, body: usize) -> Option<Quat> {
        self.index(frame, body).map(|i| self.orientations[i])
    }

    /// All body positions of one frame
    pub fn frame_positions(&self, frame: usize) -> Option<&[Vec3]> {
        self.frame_range(frame).map(|r| &self.positions[r])
    }

    /// All body orientations of one frame
    pub fn frame_orientations(&self, frame: usize) -> Option<&[Quat]> {
        self.frame_range(frame).map(|r| &self.orientations[r])
    }

    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    pub fn orientations_mut(&mut self) -> &mut [Quat] {
        &mut self.orientations
    }

    fn index(&self, frame: usize, body: usize) -> Option<usize> {
        (frame < self.frame_count && body < self.body_count)
            .then(|| frame * self.body_count + body)
    }

    fn frame_range(&self, frame: usize) -> Option<std::ops::Range<usize>> {
        (frame < self.frame_count)
            .then(|| frame * self.body_count..(frame + 1) * self.body_count)
    }
}

/// Rotation of a hinge joint about `axis` by `angle` radians
///
/// The axis is used as declared, so a non-unit axis scales the angle the
/// same way a rotation vector would.
pub fn joint_rotation(axis: Vec3, angle: f32) -> Quat {
    Quat::from_scaled_axis(axis * angle)
}

/// Evaluate world poses of every body for a whole motion sequence
///
/// `root_pos`, `root_rot` and `dof_pos` must all have one entry per frame,
/// and every `dof_pos` row must hold exactly [`KinematicModel::num_dof`]
/// angles in body order. A hinge on the root body owns column 0, but the
/// root pose itself always comes from `root_pos` and `root_rot`.
pub fn forward<R: AsRef<[f32]>>(
    model: &KinematicModel,
    root_pos: &[Vec3],
    root_rot: &[Quat],
    dof_pos: &[R],
) -> Result<FramePoses> {
    let frames = root_pos.len();
    if root_rot.len() != frames || dof_pos.len() != frames {
        return Err(MjcfError::DimensionMismatch(format!(
            "root_pos has {} frames, root_rot has {}, dof_pos has {}",
            frames,
            root_rot.len(),
            dof_pos.len()
        )));
    }

    let num_dof = model.num_dof();
    if let Some((frame, row)) = dof_pos
        .iter()
        .enumerate()
        .find(|(_, row)| row.as_ref().len() != num_dof)
    {
        return Err(MjcfError::DimensionMismatch(format!(
            "frame {} has {} joint angles, model expects {}",
            frame,
            row.as_ref().len(),
            num_dof
        )));
    }

    let bodies = model.bodies();
    let mut poses = FramePoses::with_shape(frames, bodies.len());
    if bodies.is_empty() {
        return Ok(poses);
    }

    for (frame, angles) in dof_pos.iter().enumerate() {
        let angles = angles.as_ref();
        let base = frame * bodies.len();
        let positions = &mut poses.positions[base..base + bodies.len()];
        let orientations = &mut poses.orientations[base..base + bodies.len()];

        positions[0] = root_pos[frame];
        orientations[0] = root_rot[frame];

        let mut dof_index = bodies[0].dof();
        for (i, body) in bodies.iter().enumerate().skip(1) {
            let joint = match body.joint_axis {
                Some(axis) => {
                    let rot = joint_rotation(axis, angles[dof_index]);
                    dof_index += 1;
                    rot
                }
                None => Quat::IDENTITY,
            };

            let parent = match body.parent_index() {
                Some(p) if p < i => p,
                _ => {
                    return Err(MjcfError::MalformedTopology {
                        element: body.name.clone(),
                        attribute: "parent".to_string(),
                        reason: format!("parent {} does not precede body {}", body.parent, i),
                    });
                }
            };
            let parent_rot = orientations[parent];
            orientations[i] = parent_rot * body.local_orientation * joint;
            positions[i] = positions[parent] + parent_rot * body.local_offset;
        }
    }

    debug!(
        "Forward kinematics: {} frames x {} bodies",
        frames,
        bodies.len()
    );

    Ok(poses)
}
