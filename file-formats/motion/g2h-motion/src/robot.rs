//! Retargeted robot motion: root trajectory plus joint angles

use std::path::Path;

use glam::{Quat, Vec3};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::io::{read_record, write_record};

/// Component order of the stored root quaternions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuatOrder {
    /// Scalar first
    #[default]
    Wxyz,
    /// Scalar last
    Xyzw,
}

impl QuatOrder {
    pub fn to_quat(self, q: [f32; 4]) -> Quat {
        match self {
            Self::Wxyz => Quat::from_xyzw(q[1], q[2], q[3], q[0]),
            Self::Xyzw => Quat::from_array(q),
        }
    }
}

/// A robot motion record
///
/// `dof_pos` holds one column per active joint, in the body order of the
/// robot description the motion was retargeted to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotMotion {
    /// Playback rate in frames per second
    pub fps: f32,
    pub root_pos: Vec<[f32; 3]>,
    pub root_rot: Vec<[f32; 4]>,
    pub dof_pos: Vec<Vec<f32>>,
    #[serde(default)]
    pub root_rot_order: QuatOrder,
}

impl RobotMotion {
    /// Load and validate a record from a JSON or YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let motion: Self = read_record(path)?;
        motion.validate()?;
        debug!(
            "Loaded robot motion {}: {} frames, {} DOF at {} fps",
            path.display(),
            motion.frame_count(),
            motion.num_dof(),
            motion.fps
        );
        Ok(motion)
    }

    /// Write the record; the format follows the file extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_record(path.as_ref(), self)
    }

    /// Check that every per-frame array has the same length and width
    pub fn validate(&self) -> Result<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(MotionError::invalid("fps", format!("{} is not a positive rate", self.fps)));
        }

        let frames = self.root_pos.len();
        if self.root_rot.len() != frames || self.dof_pos.len() != frames {
            return Err(MotionError::DimensionMismatch(format!(
                "root_pos has {} frames, root_rot has {}, dof_pos has {}",
                frames,
                self.root_rot.len(),
                self.dof_pos.len()
            )));
        }

        let width = self.num_dof();
        if let Some((frame, row)) = self
            .dof_pos
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != width)
        {
            return Err(MotionError::DimensionMismatch(format!(
                "dof_pos frame {} has {} columns, frame 0 has {}",
                frame,
                row.len(),
                width
            )));
        }

        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.root_pos.len()
    }

    /// Joint angles per frame, taken from the first frame
    pub fn num_dof(&self) -> usize {
        self.dof_pos.first().map_or(0, Vec::len)
    }

    /// Length of the clip in seconds
    pub fn duration(&self) -> f32 {
        self.frame_count() as f32 / self.fps
    }

    pub fn root_positions(&self) -> Vec<Vec3> {
        self.root_pos.iter().copied().map(Vec3::from_array).collect()
    }

    /// Root orientations, decoded according to [`Self::root_rot_order`]
    pub fn root_orientations(&self) -> Vec<Quat> {
        self.root_rot
            .iter()
            .map(|&q| self.root_rot_order.to_quat(q))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn clip(frames: usize, dof: usize) -> RobotMotion {
        RobotMotion {
            fps: 30.0,
            root_pos: vec![[0.0, 0.0, 0.79]; frames],
            root_rot: vec![[1.0, 0.0, 0.0, 0.0]; frames],
            dof_pos: vec![vec![0.0; dof]; frames],
            root_rot_order: QuatOrder::Wxyz,
        }
    }

    #[test]
    fn test_valid_clip() {
        let motion = clip(10, 29);
        motion.validate().unwrap();
        assert_eq!(motion.frame_count(), 10);
        assert_eq!(motion.num_dof(), 29);
        assert!((motion.duration() - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_frame_count_mismatch() {
        let mut motion = clip(10, 3);
        motion.root_rot.pop();
        assert!(matches!(motion.validate(), Err(MotionError::DimensionMismatch(_))));
    }

    #[test]
    fn test_ragged_dof_rows() {
        let mut motion = clip(4, 3);
        motion.dof_pos[2].push(0.1);
        assert!(matches!(motion.validate(), Err(MotionError::DimensionMismatch(_))));
    }

    #[test]
    fn test_non_positive_fps() {
        let mut motion = clip(4, 3);
        motion.fps = 0.0;
        assert!(matches!(motion.validate(), Err(MotionError::InvalidField { .. })));
    }

    #[test]
    fn test_root_rotation_orders() {
        let mut motion = clip(1, 0);
        motion.root_rot = vec![[0.0, 0.0, 0.0, 1.0]];
        assert_eq!(motion.root_orientations()[0], Quat::from_xyzw(0.0, 0.0, 1.0, 0.0));

        motion.root_rot_order = QuatOrder::Xyzw;
        assert_eq!(motion.root_orientations()[0], Quat::IDENTITY);
    }

    #[test]
    fn test_order_defaults_to_scalar_first() {
        let json = r#"{"fps": 50, "root_pos": [[0,0,1]], "root_rot": [[1,0,0,0]], "dof_pos": [[0.5]]}"#;
        let motion: RobotMotion = serde_json::from_str(json).unwrap();
        assert_eq!(motion.root_rot_order, QuatOrder::Wxyz);
        assert_eq!(motion.root_positions(), vec![Vec3::Z]);
        assert_eq!(motion.root_orientations(), vec![Quat::IDENTITY]);
    }
}
