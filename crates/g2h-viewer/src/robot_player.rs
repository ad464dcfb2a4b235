//! Replay of retargeted robot motion on an MJCF robot
//!
//! World poses for the whole clip are computed once when an animation is
//! loaded, converted from the Z-up motion convention to the Y-up viewer
//! convention and cached. Showing a frame is a lookup plus one transform
//! update per body that has visual geometry.

use std::path::Path;

use g2h_mjcf::coordinate::quat_to_wxyz;
use g2h_mjcf::{
    CoordinateSystem, CoordinateTransformer, FramePoses, KinematicModel, VisualGeometry,
    load_robot,
};
use g2h_motion::RobotMotion;
use glam::Vec3;
use log::{debug, info};

use crate::error::{Result, ViewerError};
use crate::scene::{MeshData, NodeId, Scene};

/// Scene path of the robot's root node
pub const ROBOT_ROOT: &str = "/robot_root";

/// Everything that belongs to one loaded animation
///
/// Replaced as a whole by every successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub fps: f32,
    pub poses: FramePoses,
    pub cur_frame: usize,
}

impl PlayerState {
    pub fn frame_count(&self) -> usize {
        self.poses.frame_count()
    }

    fn check_frame(&self, frame: usize) -> Result<usize> {
        if frame < self.frame_count() {
            Ok(frame)
        } else {
            Err(ViewerError::FrameOutOfRange {
                frame,
                count: self.frame_count(),
            })
        }
    }
}

/// Scene node driven by one body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BodyNode {
    body_index: usize,
    node: NodeId,
}

/// Plays robot motion records through a [`Scene`]
#[derive(Debug)]
pub struct RobotPlayer {
    model: KinematicModel,
    root: NodeId,
    body_nodes: Vec<BodyNode>,
    transformer: CoordinateTransformer,
    state: Option<PlayerState>,
}

impl RobotPlayer {
    /// Load a robot description and create its nodes in the scene
    pub fn new<S: Scene + ?Sized>(scene: &mut S, xml_path: impl AsRef<Path>) -> Result<Self> {
        let (model, geometry) = load_robot(xml_path)?;
        Self::from_parts(scene, model, &geometry, ROBOT_ROOT)
    }

    /// Create the robot's nodes under `root_path` from an already parsed robot
    ///
    /// Each body with geometry gets a transform node named after the body,
    /// holding one mesh node per attached mesh.
    pub fn from_parts<S: Scene + ?Sized>(
        scene: &mut S,
        model: KinematicModel,
        geometry: &VisualGeometry,
        root_path: &str,
    ) -> Result<Self> {
        let root = scene.add_frame(root_path)?;

        let mut body_nodes = Vec::with_capacity(geometry.len());
        for body in geometry {
            let node = scene.add_frame(&format!("{root_path}/{}", body.name))?;
            for (i, mesh) in body.meshes.iter().enumerate() {
                scene.add_mesh(
                    &format!("{root_path}/{}/geom_{i}", body.name),
                    MeshData {
                        vertices: &mesh.vertices,
                        faces: &mesh.faces,
                        color: mesh.color,
                    },
                )?;
            }
            body_nodes.push(BodyNode {
                body_index: body.body_index,
                node,
            });
        }

        debug!(
            "Created {} body nodes under {}",
            body_nodes.len(),
            root_path
        );

        Ok(Self {
            model,
            root,
            body_nodes,
            transformer: CoordinateTransformer::new(CoordinateSystem::ZUp, CoordinateSystem::YUp),
            state: None,
        })
    }

    pub fn model(&self) -> &KinematicModel {
        &self.model
    }

    pub fn root_node(&self) -> NodeId {
        self.root
    }

    /// The currently loaded animation, if any
    pub fn state(&self) -> Option<&PlayerState> {
        self.state.as_ref()
    }

    /// Load a motion record file and precompute every frame
    pub fn load_anim(&mut self, motion_path: impl AsRef<Path>) -> Result<()> {
        let motion_path = motion_path.as_ref();
        let motion = RobotMotion::load(motion_path)?;
        self.load_motion(&motion)?;
        info!(
            "Loaded robot animation {}: {} frames at {} fps",
            motion_path.display(),
            motion.frame_count(),
            motion.fps
        );
        Ok(())
    }

    /// Precompute every frame of an in-memory motion record
    ///
    /// On failure the previously loaded animation stays in place.
    pub fn load_motion(&mut self, motion: &RobotMotion) -> Result<()> {
        motion.validate()?;
        let mut poses = self.model.forward(
            &motion.root_positions(),
            &motion.root_orientations(),
            &motion.dof_pos,
        )?;
        self.transformer.transform_poses(&mut poses);

        self.state = Some(PlayerState {
            fps: motion.fps,
            poses,
            cur_frame: 0,
        });
        Ok(())
    }

    /// Push the poses of `frame` (or the current frame) to the scene
    ///
    /// Does not move the cursor.
    pub fn get_frame<S: Scene + ?Sized>(&self, scene: &mut S, frame: Option<usize>) -> Result<()> {
        let state = self.state.as_ref().ok_or(ViewerError::NotLoaded)?;
        let frame = state.check_frame(frame.unwrap_or(state.cur_frame))?;

        for body in &self.body_nodes {
            let (Some(position), Some(orientation)) = (
                state.poses.position(frame, body.body_index),
                state.poses.orientation(frame, body.body_index),
            ) else {
                continue;
            };
            scene.set_position(body.node, position)?;
            scene.set_orientation(body.node, quat_to_wxyz(orientation))?;
        }
        Ok(())
    }

    /// Number of frames in the loaded animation, 0 when none is loaded
    pub fn get_frame_count(&self) -> usize {
        self.state.as_ref().map_or(0, PlayerState::frame_count)
    }

    pub fn get_cur_frame(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.cur_frame)
    }

    pub fn reset_cur_frame(&mut self) {
        if let Some(state) = &mut self.state {
            state.cur_frame = 0;
        }
    }

    /// Move the cursor; the frame must exist
    pub fn set_cur_frame(&mut self, frame: usize) -> Result<()> {
        let state = self.state.as_mut().ok_or(ViewerError::NotLoaded)?;
        state.cur_frame = state.check_frame(frame)?;
        Ok(())
    }

    /// Playback rate of the loaded animation
    pub fn fps(&self) -> Option<f32> {
        self.state.as_ref().map(|s| s.fps)
    }

    /// Uniformly scale the whole robot
    pub fn set_scale<S: Scene + ?Sized>(&self, scene: &mut S, scale: f32) -> Result<()> {
        scene.set_scale(self.root, scale)
    }

    /// Move the whole robot
    pub fn set_position<S: Scene + ?Sized>(&self, scene: &mut S, position: Vec3) -> Result<()> {
        scene.set_position(self.root, position)
    }
}
