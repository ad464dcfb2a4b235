//! Text-to-motion generator output and its conversion to SMPL-X
//!
//! The generator writes full-body SMPL-X pose rows without face parameters.
//! Conversion keeps root, body and hand segments, zero-fills jaw and eyes,
//! and pads every row to the AMASS width.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{MotionError, Result};
use crate::smplx::{
    BODY_RANGE, EYE_WIDTH, Gender, HAND_RANGE, JAW_WIDTH, POSES_WIDTH, SmplxMotion,
};

/// Frame rate assumed when a generated clip does not carry one
pub const DEFAULT_FRAME_RATE: f32 = 30.0;

/// One clip as written by the text-to-motion generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMotion {
    /// Pose rows, at least root + body + hands wide
    pub poses: Vec<Vec<f32>>,
    pub trans: Vec<[f32; 3]>,
    /// Shape parameters, stored flat or as a single-row matrix
    #[serde(deserialize_with = "squeeze_betas")]
    pub betas: Vec<f32>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
}

impl GeneratedMotion {
    pub fn frame_count(&self) -> usize {
        self.poses.len()
    }

    /// Reformat into the AMASS SMPL-X container
    ///
    /// `frame_rate` overrides the clip's own rate; without either,
    /// [`DEFAULT_FRAME_RATE`] is used.
    pub fn to_smplx(&self, frame_rate: Option<f32>) -> Result<SmplxMotion> {
        let frames = self.frame_count();
        let fps = frame_rate.or(self.fps).unwrap_or(DEFAULT_FRAME_RATE);
        if !(fps.is_finite() && fps > 0.0) {
            return Err(MotionError::invalid("fps", format!("{fps} is not a positive rate")));
        }

        if self.trans.len() != frames {
            return Err(MotionError::DimensionMismatch(format!(
                "trans has {} frames, poses has {}",
                self.trans.len(),
                frames
            )));
        }

        let mut poses = Vec::with_capacity(frames);
        let mut root_orient = Vec::with_capacity(frames);
        let mut pose_body = Vec::with_capacity(frames);
        let mut pose_hand = Vec::with_capacity(frames);

        for (frame, row) in self.poses.iter().enumerate() {
            if row.len() < HAND_RANGE.end {
                return Err(MotionError::DimensionMismatch(format!(
                    "poses frame {} has {} values, need at least {}",
                    frame,
                    row.len(),
                    HAND_RANGE.end
                )));
            }

            let mut full = vec![0.0; POSES_WIDTH];
            full[..HAND_RANGE.end].copy_from_slice(&row[..HAND_RANGE.end]);

            root_orient.push([full[0], full[1], full[2]]);
            pose_body.push(full[BODY_RANGE].to_vec());
            pose_hand.push(full[HAND_RANGE].to_vec());
            poses.push(full);
        }

        let motion = SmplxMotion {
            poses,
            trans: self.trans.clone(),
            betas: self.betas.clone(),
            root_orient,
            pose_body,
            pose_hand,
            pose_jaw: vec![[0.0; JAW_WIDTH]; frames],
            pose_eye: vec![[0.0; EYE_WIDTH]; frames],
            gender: self.gender,
            mocap_frame_rate: fps,
            mocap_time_length: frames as f32 / fps,
        };
        motion.validate()?;
        Ok(motion)
    }
}

fn squeeze_betas<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<f32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Betas {
        Flat(Vec<f32>),
        Rows(Vec<Vec<f32>>),
    }

    Ok(match Betas::deserialize(deserializer)? {
        Betas::Flat(values) => values,
        Betas::Rows(rows) => rows.into_iter().flatten().collect(),
    })
}
