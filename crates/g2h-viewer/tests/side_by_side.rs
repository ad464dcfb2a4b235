//! Human playback and the combined robot/human driver

use std::fs;

use g2h_motion::smplx::{BODY_WIDTH, HAND_WIDTH, POSES_WIDTH};
use g2h_motion::{Gender, QuatOrder, RobotMotion, SmplxMotion};
use g2h_viewer::recording::NodeKind;
use g2h_viewer::{
    HumanPlayer, PlaybackDriver, RecordingScene, RigidTemplate, RobotPlayer,
    StopReason, ViewerError,
};
use glam::Vec3;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const ARM_XML: &str = r#"
<mujoco model="arm">
  <asset><mesh file="plate.obj"/></asset>
  <worldbody>
    <body name="base">
      <geom type="mesh" mesh="plate"/>
      <body name="forearm" pos="0 0 0.5">
        <joint axis="1 0 0"/>
        <geom type="mesh" mesh="plate"/>
      </body>
    </body>
  </worldbody>
</mujoco>
"#;

fn template() -> RigidTemplate {
    RigidTemplate::new(
        vec![Vec3::ZERO, Vec3::X, Vec3::Y],
        vec![[0, 1, 2]],
    )
    .unwrap()
}

fn walking_clip(frames: usize) -> SmplxMotion {
    SmplxMotion {
        poses: vec![vec![0.0; POSES_WIDTH]; frames],
        trans: (0..frames).map(|f| [f as f32 * 0.1, 0.0, 0.9]).collect(),
        betas: vec![0.0; 16],
        root_orient: vec![[0.0; 3]; frames],
        pose_body: vec![vec![0.0; BODY_WIDTH]; frames],
        pose_hand: vec![vec![0.0; HAND_WIDTH]; frames],
        pose_jaw: vec![[0.0; 3]; frames],
        pose_eye: vec![[0.0; 6]; frames],
        gender: Gender::Male,
        mocap_frame_rate: 30.0,
        mocap_time_length: frames as f32 / 30.0,
    }
}

fn mesh_vertices(scene: &RecordingScene, path: &str) -> Vec<Vec3> {
    match &scene.node(scene.find(path).unwrap()).unwrap().kind {
        NodeKind::Mesh { vertices, .. } => vertices.clone(),
        NodeKind::Frame => panic!("{path} is not a mesh"),
    }
}

#[test]
fn test_human_mesh_created_once() {
    let mut scene = RecordingScene::new();
    let mut human = HumanPlayer::new(&mut scene, template()).unwrap();
    assert!(human.mesh_node().is_none());

    human.load_motion(&mut scene, walking_clip(4)).unwrap();
    let mesh = human.mesh_node().unwrap();
    let nodes = scene.len();

    human.load_motion(&mut scene, walking_clip(9)).unwrap();
    assert_eq!(human.mesh_node(), Some(mesh));
    assert_eq!(scene.len(), nodes);
    assert_eq!(human.get_frame_count(), 9);

    match &scene.node(mesh).unwrap().kind {
        NodeKind::Mesh { color, faces, .. } => {
            assert_eq!(*color, [180, 200, 255, 255]);
            assert_eq!(faces.as_slice(), &[[0u32, 1, 2]]);
        }
        NodeKind::Frame => panic!("human node is not a mesh"),
    }
}

#[test]
fn test_human_frame_moves_vertices() {
    let mut scene = RecordingScene::new();
    let mut human = HumanPlayer::new(&mut scene, template()).unwrap();
    human.load_motion(&mut scene, walking_clip(5)).unwrap();

    human.get_frame(&mut scene, Some(3)).unwrap();
    let vertices = mesh_vertices(&scene, "/human_root/human");
    assert!((vertices[0] - Vec3::new(0.3, 0.9, 0.0)).length() < 1e-5);
    assert_eq!(human.get_cur_frame(), 0);

    assert!(matches!(
        human.get_frame(&mut scene, Some(5)),
        Err(ViewerError::FrameOutOfRange { frame: 5, count: 5 })
    ));
}

#[test]
fn test_human_rejects_inconsistent_clip() {
    let mut scene = RecordingScene::new();
    let mut human = HumanPlayer::new(&mut scene, template()).unwrap();
    human.load_motion(&mut scene, walking_clip(5)).unwrap();

    let mut broken = walking_clip(3);
    broken.pose_body[1].pop();
    assert!(matches!(
        human.load_motion(&mut scene, broken),
        Err(ViewerError::Motion(_))
    ));
    assert_eq!(human.get_frame_count(), 5);
}

#[test]
fn test_human_record_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("walk.json");
    walking_clip(6).save(&path).unwrap();

    let mut scene = RecordingScene::new();
    let mut human = HumanPlayer::new(&mut scene, template()).unwrap();
    human.load_anim(&mut scene, &path).unwrap();
    assert_eq!(human.get_frame_count(), 6);
    assert_eq!(human.fps(), Some(30.0));
}

#[test]
fn test_driver_plays_robot_and_human_together() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("plate.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
    let xml = dir.path().join("arm.xml");
    fs::write(&xml, ARM_XML).unwrap();

    let mut scene = RecordingScene::new();
    let mut robot = RobotPlayer::new(&mut scene, &xml).unwrap();
    let mut human = HumanPlayer::new(&mut scene, template()).unwrap();

    robot
        .load_motion(&RobotMotion {
            fps: 30.0,
            root_pos: vec![[0.0, 0.0, 0.0]; 8],
            root_rot: vec![[1.0, 0.0, 0.0, 0.0]; 8],
            dof_pos: (0..8).map(|f| vec![f as f32 * 0.1]).collect(),
            root_rot_order: QuatOrder::Wxyz,
        })
        .unwrap();
    human.load_motion(&mut scene, walking_clip(5)).unwrap();
    robot.set_position(&mut scene, Vec3::new(1.0, 0.7, 0.0)).unwrap();

    let stats = PlaybackDriver::new(30.0)
        .with_realtime(false)
        .with_loop(false)
        .run(&mut scene, &mut [&mut robot, &mut human])
        .unwrap();

    // the human clip is shorter and ends playback
    assert_eq!(stats.reason, StopReason::EndOfClip);
    assert_eq!(stats.ticks, 5);
    assert_eq!(robot.get_cur_frame(), 5);

    let vertices = mesh_vertices(&scene, "/human_root/human");
    assert!((vertices[0] - Vec3::new(0.4, 0.9, 0.0)).length() < 1e-5);

    let forearm = scene.find("/robot_root/forearm").unwrap();
    let (world, _, _) = scene.world_transform(forearm).unwrap();
    assert!((world - Vec3::new(1.0, 1.2, 0.0)).length() < 1e-5);
}

#[test]
fn test_robot_and_human_share_up_axis() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("plate.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
    let xml = dir.path().join("arm.xml");
    fs::write(&xml, ARM_XML).unwrap();

    let mut scene = RecordingScene::new();
    let mut robot = RobotPlayer::new(&mut scene, &xml).unwrap();
    let mut human = HumanPlayer::new(&mut scene, template()).unwrap();

    robot
        .load_motion(&RobotMotion {
            fps: 30.0,
            root_pos: vec![[0.0, 0.0, 0.9]],
            root_rot: vec![[1.0, 0.0, 0.0, 0.0]],
            dof_pos: vec![vec![0.0]],
            root_rot_order: QuatOrder::Wxyz,
        })
        .unwrap();
    let mut clip = walking_clip(1);
    clip.trans = vec![[0.0, 0.0, 0.9]];
    human.load_motion(&mut scene, clip).unwrap();

    robot.get_frame(&mut scene, None).unwrap();
    human.get_frame(&mut scene, None).unwrap();

    let base = scene.find("/robot_root/base").unwrap();
    let (robot_root, _, _) = scene.world_transform(base).unwrap();
    let human_root = mesh_vertices(&scene, "/human_root/human")[0];
    assert!((robot_root - Vec3::new(0.0, 0.9, 0.0)).length() < 1e-5);
    assert!((human_root - robot_root).length() < 1e-5);

    // template +Y lands on viewer -Z
    let overhead = mesh_vertices(&scene, "/human_root/human")[2];
    assert!((overhead - human_root - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
}
