//! Headless side-by-side playback of robot and human motion

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use g2h_viewer::{
    HumanPlayer, Playable, PlaybackDriver, RecordingScene, RigidTemplate, RobotPlayer,
};
use glam::Vec3;
use log::info;

use crate::config::Config;
use crate::utils::{
    format_clip_length, format_duration, report_row, report_table, status_spinner,
};

/// Where the robot stands relative to the human
pub const ROBOT_OFFSET: Vec3 = Vec3::new(1.0, 0.7, 0.0);

#[derive(Args, Debug, Clone, Default)]
pub struct PlayArgs {
    /// Playback rate (defaults to the configured fps)
    #[arg(long)]
    pub fps: Option<f32>,

    /// Registered robot name or path to an MJCF file
    #[arg(long)]
    pub robot: Option<String>,

    /// Robot motion record
    #[arg(long)]
    pub robot_motion: Option<PathBuf>,

    /// Show the human motion
    #[arg(long)]
    pub show_smplx: bool,

    /// SMPL-X motion record
    #[arg(long)]
    pub smplx_motion: Option<PathBuf>,

    /// Mesh (STL or OBJ) moved rigidly in place of the human body
    #[arg(long)]
    pub body_template: Option<PathBuf>,

    /// Stop at the end of the shortest clip instead of looping
    #[arg(long)]
    pub once: bool,

    /// Stop after this many frames
    #[arg(long)]
    pub frames: Option<usize>,

    /// Run as fast as possible instead of in real time
    #[arg(long)]
    pub fast: bool,

    /// Write the final scene state as JSON
    #[arg(long)]
    pub snapshot: Option<PathBuf>,
}

impl PlayArgs {
    pub fn validate(&self) -> Result<()> {
        if self.robot.is_none() && !self.show_smplx {
            bail!("At least one of --robot or --show-smplx must be specified.");
        }
        if self.robot.is_some() && self.robot_motion.is_none() {
            bail!("--robot is specified but --robot-motion is missing.");
        }
        if self.show_smplx && self.smplx_motion.is_none() {
            bail!("--show-smplx is specified but --smplx-motion is missing.");
        }
        if let Some(fps) = self.fps
            && !(fps.is_finite() && fps > 0.0)
        {
            bail!("--fps must be positive, got {fps}");
        }
        Ok(())
    }
}

/// Small tetrahedron used when no body template is given
///
/// Built Z-up like any body model; the human player turns it upright in the
/// viewer.
fn marker_body() -> Result<RigidTemplate> {
    Ok(RigidTemplate::new(
        vec![
            Vec3::new(0.15, -0.1, -0.9),
            Vec3::new(-0.15, -0.1, -0.9),
            Vec3::new(0.0, 0.2, -0.9),
            Vec3::new(0.0, 0.0, 0.8),
        ],
        vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]],
    )?)
}

pub fn execute(config: &Config, args: PlayArgs) -> Result<()> {
    args.validate()?;
    let fps = args.fps.unwrap_or(config.fps);
    let mut scene = RecordingScene::new();

    let mut robot = match (&args.robot, &args.robot_motion) {
        (Some(robot), Some(motion)) => {
            let xml = config.resolve_robot(robot)?;
            let spinner = status_spinner(&format!("Loading {}", xml.display()));
            let mut player = RobotPlayer::new(&mut scene, &xml)
                .with_context(|| format!("Failed to load robot {}", xml.display()))?;
            player
                .load_anim(motion)
                .with_context(|| format!("Failed to load robot motion {}", motion.display()))?;
            player.set_position(&mut scene, ROBOT_OFFSET)?;
            spinner.finish_and_clear();
            Some(player)
        }
        _ => None,
    };

    let mut human = match (&args.smplx_motion, args.show_smplx) {
        (Some(motion), true) => {
            let body = match &args.body_template {
                Some(path) => RigidTemplate::from_file(path)
                    .with_context(|| format!("Failed to load body template {}", path.display()))?,
                None => marker_body()?,
            };
            let mut player = HumanPlayer::new(&mut scene, body)?;
            player
                .load_anim(&mut scene, motion)
                .with_context(|| format!("Failed to load SMPL-X motion {}", motion.display()))?;
            player.set_position(&mut scene, Vec3::ZERO)?;
            Some(player)
        }
        _ => None,
    };

    let mut driver = PlaybackDriver::new(fps)
        .with_loop(!args.once)
        .with_realtime(!args.fast);
    if let Some(frames) = args.frames {
        driver = driver.with_frame_limit(frames);
    }

    let mut table = report_table(&["Player", "Clip", "Final frame"]);
    let stats = {
        let mut players: Vec<&mut dyn Playable> = Vec::new();
        if let Some(player) = robot.as_mut() {
            players.push(player);
        }
        if let Some(player) = human.as_mut() {
            players.push(player);
        }
        info!("Playing at {} fps", driver.fps());
        driver.run(&mut scene, &mut players)?
    };

    if let Some(player) = &robot {
        report_row(
            &mut table,
            [
                "robot".to_string(),
                format_clip_length(player.get_frame_count(), player.fps().unwrap_or(fps)),
                player.get_cur_frame().to_string(),
            ],
        );
    }
    if let Some(player) = &human {
        report_row(
            &mut table,
            [
                "human".to_string(),
                format_clip_length(player.get_frame_count(), player.fps().unwrap_or(fps)),
                player.get_cur_frame().to_string(),
            ],
        );
    }

    table.printstd();
    println!(
        "Played {} frames in {} ({:?})",
        stats.ticks,
        format_duration(stats.elapsed),
        stats.reason
    );

    if let Some(path) = &args.snapshot {
        scene
            .export_json(path)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        println!("Scene snapshot written to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> PlayArgs {
        PlayArgs::default()
    }

    #[test]
    fn test_nothing_to_show() {
        let err = args().validate().unwrap_err().to_string();
        assert_eq!(err, "At least one of --robot or --show-smplx must be specified.");
    }

    #[test]
    fn test_robot_requires_motion() {
        let args = PlayArgs {
            robot: Some("unitree_g1".to_string()),
            ..args()
        };
        let err = args.validate().unwrap_err().to_string();
        assert_eq!(err, "--robot is specified but --robot-motion is missing.");
    }

    #[test]
    fn test_smplx_requires_motion() {
        let args = PlayArgs {
            show_smplx: true,
            ..args()
        };
        let err = args.validate().unwrap_err().to_string();
        assert_eq!(err, "--show-smplx is specified but --smplx-motion is missing.");
    }

    #[test]
    fn test_valid_combinations() {
        PlayArgs {
            show_smplx: true,
            smplx_motion: Some(PathBuf::from("walk.json")),
            ..args()
        }
        .validate()
        .unwrap();

        PlayArgs {
            robot: Some("unitree_g1".to_string()),
            robot_motion: Some(PathBuf::from("walk_g1.json")),
            fps: Some(60.0),
            ..args()
        }
        .validate()
        .unwrap();
    }

    #[test]
    fn test_marker_body_is_valid() {
        use g2h_viewer::BodyModel;
        let body = marker_body().unwrap();
        assert_eq!(body.vertex_count(), 4);
        assert_eq!(body.faces().len(), 4);
    }

    #[test]
    fn test_marker_stands_upright_in_viewer() {
        use g2h_motion::SmplxMotion;
        use g2h_motion::smplx::{BODY_WIDTH, HAND_WIDTH, POSES_WIDTH};
        use g2h_viewer::recording::NodeKind;

        let mut scene = RecordingScene::new();
        let mut human = HumanPlayer::new(&mut scene, marker_body().unwrap()).unwrap();
        human
            .load_motion(
                &mut scene,
                SmplxMotion {
                    poses: vec![vec![0.0; POSES_WIDTH]],
                    trans: vec![[0.0; 3]],
                    betas: vec![0.0; 10],
                    root_orient: vec![[0.0; 3]],
                    pose_body: vec![vec![0.0; BODY_WIDTH]],
                    pose_hand: vec![vec![0.0; HAND_WIDTH]],
                    pose_jaw: vec![[0.0; 3]],
                    pose_eye: vec![[0.0; 6]],
                    gender: g2h_motion::Gender::Neutral,
                    mocap_frame_rate: 30.0,
                    mocap_time_length: 1.0 / 30.0,
                },
            )
            .unwrap();
        human.get_frame(&mut scene, None).unwrap();

        let mesh = human.mesh_node().unwrap();
        let NodeKind::Mesh { vertices, .. } = &scene.node(mesh).unwrap().kind else {
            panic!("human node is not a mesh");
        };
        let apex = vertices[3];
        assert!((apex.y - 0.8).abs() < 1e-6);
        assert!(vertices[..3].iter().all(|v| (v.y + 0.9).abs() < 1e-6));
    }
}
