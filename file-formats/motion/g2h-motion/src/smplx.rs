//! AMASS-style SMPL-X motion container
//!
//! Pose parameters are axis-angle triples. The full `poses` row is the
//! concatenation of every segment:
//!
//! | range     | segment         |
//! |-----------|-----------------|
//! | 0..3      | root orientation |
//! | 3..66     | body (21 joints) |
//! | 66..156   | hands (2 x 15)   |
//! | 156..159  | jaw              |
//! | 159..165  | eyes (2)         |

use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::io::{read_record, write_record};

pub const ROOT_WIDTH: usize = 3;
pub const BODY_WIDTH: usize = 63;
pub const HAND_WIDTH: usize = 90;
pub const JAW_WIDTH: usize = 3;
pub const EYE_WIDTH: usize = 6;
pub const TRANS_WIDTH: usize = 3;
pub const POSES_WIDTH: usize = ROOT_WIDTH + BODY_WIDTH + HAND_WIDTH + JAW_WIDTH + EYE_WIDTH;

pub const ROOT_RANGE: Range<usize> = 0..ROOT_WIDTH;
pub const BODY_RANGE: Range<usize> = ROOT_RANGE.end..ROOT_RANGE.end + BODY_WIDTH;
pub const HAND_RANGE: Range<usize> = BODY_RANGE.end..BODY_RANGE.end + HAND_WIDTH;
pub const JAW_RANGE: Range<usize> = HAND_RANGE.end..HAND_RANGE.end + JAW_WIDTH;
pub const EYE_RANGE: Range<usize> = JAW_RANGE.end..JAW_RANGE.end + EYE_WIDTH;

/// Body model gender label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Neutral,
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neutral" => Ok(Self::Neutral),
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(MotionError::invalid("gender", format!("unknown gender '{other}'"))),
        }
    }
}

/// A human motion clip in the AMASS SMPL-X layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmplxMotion {
    /// Full pose rows, [`POSES_WIDTH`] values per frame
    pub poses: Vec<Vec<f32>>,
    pub trans: Vec<[f32; 3]>,
    /// Shape parameters, fixed over the clip
    pub betas: Vec<f32>,
    pub root_orient: Vec<[f32; 3]>,
    pub pose_body: Vec<Vec<f32>>,
    /// Left hand then right hand, 45 values each
    pub pose_hand: Vec<Vec<f32>>,
    pub pose_jaw: Vec<[f32; 3]>,
    /// Left eye then right eye
    pub pose_eye: Vec<[f32; 6]>,
    #[serde(default)]
    pub gender: Gender,
    pub mocap_frame_rate: f32,
    /// Clip length in seconds
    pub mocap_time_length: f32,
}

/// Borrowed pose parameters of a single frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmplxFrame<'a> {
    pub root_orient: &'a [f32; 3],
    pub body: &'a [f32],
    pub left_hand: &'a [f32],
    pub right_hand: &'a [f32],
    pub jaw: &'a [f32; 3],
    pub left_eye: &'a [f32],
    pub right_eye: &'a [f32],
    pub trans: &'a [f32; 3],
}

impl SmplxMotion {
    /// Load and validate a record from a JSON or YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let motion: Self = read_record(path)?;
        motion.validate()?;
        debug!(
            "Loaded SMPL-X motion {}: {} frames at {} fps, gender {}",
            path.display(),
            motion.frame_count(),
            motion.mocap_frame_rate,
            motion.gender
        );
        Ok(motion)
    }

    /// Write the record; the format follows the file extension
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_record(path.as_ref(), self)
    }

    pub fn frame_count(&self) -> usize {
        self.root_orient.len()
    }

    /// Playback rate rounded to whole frames per second
    pub fn fps(&self) -> u32 {
        self.mocap_frame_rate.round().max(0.0) as u32
    }

    /// Check per-frame lengths and segment widths
    pub fn validate(&self) -> Result<()> {
        if !(self.mocap_frame_rate.is_finite() && self.mocap_frame_rate > 0.0) {
            return Err(MotionError::invalid(
                "mocap_frame_rate",
                format!("{} is not a positive rate", self.mocap_frame_rate),
            ));
        }

        let frames = self.frame_count();
        let lengths = [
            ("poses", self.poses.len()),
            ("trans", self.trans.len()),
            ("pose_body", self.pose_body.len()),
            ("pose_hand", self.pose_hand.len()),
            ("pose_jaw", self.pose_jaw.len()),
            ("pose_eye", self.pose_eye.len()),
        ];
        for (field, len) in lengths {
            if len != frames {
                return Err(MotionError::DimensionMismatch(format!(
                    "{field} has {len} frames, root_orient has {frames}"
                )));
            }
        }

        check_widths("poses", &self.poses, POSES_WIDTH)?;
        check_widths("pose_body", &self.pose_body, BODY_WIDTH)?;
        check_widths("pose_hand", &self.pose_hand, HAND_WIDTH)?;
        Ok(())
    }

    /// Pose parameters of one frame, `None` when out of range
    ///
    /// Only meaningful on a validated record.
    pub fn frame(&self, index: usize) -> Option<SmplxFrame<'_>> {
        let hand = self.pose_hand.get(index)?;
        let eye = self.pose_eye.get(index)?;
        let half_hand = HAND_WIDTH / 2;
        let half_eye = EYE_WIDTH / 2;
        Some(SmplxFrame {
            root_orient: self.root_orient.get(index)?,
            body: self.pose_body.get(index)?,
            left_hand: hand.get(..half_hand)?,
            right_hand: hand.get(half_hand..)?,
            jaw: self.pose_jaw.get(index)?,
            left_eye: &eye[..half_eye],
            right_eye: &eye[half_eye..],
            trans: self.trans.get(index)?,
        })
    }
}

fn check_widths(field: &str, rows: &[Vec<f32>], width: usize) -> Result<()> {
    match rows.iter().enumerate().find(|(_, row)| row.len() != width) {
        Some((frame, row)) => Err(MotionError::DimensionMismatch(format!(
            "{field} frame {frame} has {} values, expected {width}",
            row.len()
        ))),
        None => Ok(()),
    }
}
