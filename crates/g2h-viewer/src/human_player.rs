//! Replay of SMPL-X motion through a body model
//!
//! Unlike the robot player, frames are not precomputed: the body model is
//! evaluated for each shown frame and the mesh vertices are replaced. Body
//! models work in the Z-up motion convention, so evaluated vertices go
//! through the same Z-up to Y-up remap as robot poses.

use std::path::Path;

use g2h_mjcf::{CoordinateSystem, CoordinateTransformer};
use g2h_motion::SmplxMotion;
use glam::Vec3;
use log::{info, warn};

use crate::body_model::{BodyModel, BodyPose};
use crate::error::{Result, ViewerError};
use crate::scene::{MeshData, NodeId, Scene};

/// Scene path of the human's root node
pub const HUMAN_ROOT: &str = "/human_root";

/// Face color of the human mesh
pub const HUMAN_COLOR: [u8; 4] = [180, 200, 255, 255];

#[derive(Debug, Clone, PartialEq)]
struct HumanState {
    motion: SmplxMotion,
    cur_frame: usize,
}

/// Plays SMPL-X motion records through a [`Scene`]
#[derive(Debug)]
pub struct HumanPlayer<M> {
    model: M,
    root: NodeId,
    mesh_path: String,
    mesh: Option<NodeId>,
    transformer: CoordinateTransformer,
    state: Option<HumanState>,
}

impl<M: BodyModel> HumanPlayer<M> {
    /// Create the human's root node; the mesh node follows the first load
    pub fn new<S: Scene + ?Sized>(scene: &mut S, model: M) -> Result<Self> {
        Self::with_root(scene, model, HUMAN_ROOT)
    }

    pub fn with_root<S: Scene + ?Sized>(scene: &mut S, model: M, root_path: &str) -> Result<Self> {
        let root = scene.add_frame(root_path)?;
        Ok(Self {
            model,
            root,
            mesh_path: format!("{root_path}/human"),
            mesh: None,
            transformer: CoordinateTransformer::new(CoordinateSystem::ZUp, CoordinateSystem::YUp),
            state: None,
        })
    }

    pub fn body_model(&self) -> &M {
        &self.model
    }

    pub fn root_node(&self) -> NodeId {
        self.root
    }

    pub fn mesh_node(&self) -> Option<NodeId> {
        self.mesh
    }

    /// The currently loaded motion, if any
    pub fn motion(&self) -> Option<&SmplxMotion> {
        self.state.as_ref().map(|s| &s.motion)
    }

    /// Load an SMPL-X record file
    pub fn load_anim<S: Scene + ?Sized>(&mut self, scene: &mut S, motion_path: impl AsRef<Path>) -> Result<()> {
        let motion_path = motion_path.as_ref();
        let motion = SmplxMotion::load(motion_path)?;
        info!(
            "Loaded SMPL-X animation {}: {} frames at {} fps",
            motion_path.display(),
            motion.frame_count(),
            motion.mocap_frame_rate
        );
        self.load_motion(scene, motion)
    }

    /// Take ownership of a motion and show its rest-pose body
    ///
    /// The mesh node is created on the first load and reused afterwards. A
    /// rejected load leaves the previous motion and body model selection.
    pub fn load_motion<S: Scene + ?Sized>(&mut self, scene: &mut S, motion: SmplxMotion) -> Result<()> {
        motion.validate()?;
        let previous = self.model.gender();
        self.model.set_gender(motion.gender)?;

        if let Err(e) = self.show_rest(scene, &motion) {
            if let Some(gender) = previous
                && let Err(restore) = self.model.set_gender(gender)
            {
                warn!("Failed to restore {gender:?} body model: {restore}");
            }
            return Err(e);
        }

        self.state = Some(HumanState {
            motion,
            cur_frame: 0,
        });
        Ok(())
    }

    fn show_rest<S: Scene + ?Sized>(&mut self, scene: &mut S, motion: &SmplxMotion) -> Result<()> {
        let rest = self
            .transformer
            .transform_positions(&self.model.evaluate(&BodyPose::rest(&motion.betas))?);

        match self.mesh {
            Some(node) => scene.set_mesh_vertices(node, &rest)?,
            None => {
                let node = scene.add_mesh(
                    &self.mesh_path,
                    MeshData {
                        vertices: &rest,
                        faces: self.model.faces(),
                        color: HUMAN_COLOR,
                    },
                )?;
                self.mesh = Some(node);
            }
        }
        Ok(())
    }

    /// Evaluate `frame` (or the current frame) and push the vertices
    pub fn get_frame<S: Scene + ?Sized>(&self, scene: &mut S, frame: Option<usize>) -> Result<()> {
        let state = self.state.as_ref().ok_or(ViewerError::NotLoaded)?;
        let mesh = self.mesh.ok_or(ViewerError::NotLoaded)?;
        let index = frame.unwrap_or(state.cur_frame);
        let pose = state
            .motion
            .frame(index)
            .ok_or(ViewerError::FrameOutOfRange {
                frame: index,
                count: state.motion.frame_count(),
            })?;

        let vertices = self
            .model
            .evaluate(&BodyPose::frame(&state.motion.betas, pose))?;
        scene.set_mesh_vertices(mesh, &self.transformer.transform_positions(&vertices))
    }

    pub fn get_frame_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.motion.frame_count())
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
        let count = state.motion.frame_count();
        if frame >= count {
            return Err(ViewerError::FrameOutOfRange { frame, count });
        }
        state.cur_frame = frame;
        Ok(())
    }

    /// Playback rate of the loaded motion
    pub fn fps(&self) -> Option<f32> {
        self.state.as_ref().map(|s| s.motion.mocap_frame_rate)
    }

    /// Uniformly scale the whole body
    pub fn set_scale<S: Scene + ?Sized>(&self, scene: &mut S, scale: f32) -> Result<()> {
        scene.set_scale(self.root, scale)
    }

    /// Move the whole body
    pub fn set_position<S: Scene + ?Sized>(&self, scene: &mut S, position: Vec3) -> Result<()> {
        scene.set_position(self.root, position)
    }
}
