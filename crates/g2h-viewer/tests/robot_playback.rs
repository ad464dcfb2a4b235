//! Robot player behaviour against a recording scene

use std::f32::consts::FRAC_PI_2;
use std::fs;
use std::path::PathBuf;

use g2h_motion::{QuatOrder, RobotMotion};
use g2h_viewer::{RecordingScene, RobotPlayer, Scene, ViewerError};
use glam::{Quat, Vec3};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use tempfile::TempDir;

const CHAIN_XML: &str = r#"
<mujoco model="chain">
  <asset><mesh name="link" file="link.obj"/></asset>
  <worldbody>
    <body name="root">
      <geom type="mesh" mesh="link"/>
      <body name="link_a" pos="0 0 1">
        <joint axis="0 0 1"/>
        <geom type="mesh" mesh="link"/>
        <body name="link_b" pos="0 0 1">
          <geom type="mesh" mesh="link"/>
        </body>
        <body name="link_c" pos="1 0 0"/>
      </body>
    </body>
  </worldbody>
</mujoco>
"#;

const LINK_OBJ: &str = "v 0 0 0\nv 0.1 0 0\nv 0 0.1 0\nf 1 2 3\n";

struct Robot {
    dir: TempDir,
    xml: PathBuf,
}

#[fixture]
fn robot() -> Robot {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("link.obj"), LINK_OBJ).unwrap();
    let xml = dir.path().join("chain.xml");
    fs::write(&xml, CHAIN_XML).unwrap();
    Robot { dir, xml }
}

fn motion(frames: usize, angle: f32) -> RobotMotion {
    RobotMotion {
        fps: 30.0,
        root_pos: (0..frames).map(|f| [f as f32, 0.0, 0.0]).collect(),
        root_rot: vec![[1.0, 0.0, 0.0, 0.0]; frames],
        dof_pos: vec![vec![angle]; frames],
        root_rot_order: QuatOrder::Wxyz,
    }
}

fn write_motion(robot: &Robot, name: &str, motion: &RobotMotion) -> PathBuf {
    let path = robot.dir.path().join(name);
    motion.save(&path).unwrap();
    path
}

fn node_position(scene: &RecordingScene, path: &str) -> Vec3 {
    scene.node(scene.find(path).unwrap()).unwrap().position
}

#[rstest]
fn test_nodes_created_for_bodies_with_geometry(robot: Robot) {
    let mut scene = RecordingScene::new();
    let _player = RobotPlayer::new(&mut scene, &robot.xml).unwrap();

    assert!(scene.find("/robot_root").is_some());
    assert!(scene.find("/robot_root/link_a/geom_0").is_some());
    assert!(scene.find("/robot_root/link_b").is_some());
    // link_c has no geometry
    assert!(scene.find("/robot_root/link_c").is_none());
}

#[rstest]
fn test_frame_count_and_cursor(robot: Robot) {
    let mut scene = RecordingScene::new();
    let mut player = RobotPlayer::new(&mut scene, &robot.xml).unwrap();
    assert_eq!(player.get_frame_count(), 0);

    player.load_anim(write_motion(&robot, "ten.json", &motion(10, 0.0))).unwrap();
    assert_eq!(player.get_frame_count(), 10);
    assert_eq!(player.get_cur_frame(), 0);

    player.set_cur_frame(7).unwrap();
    assert_eq!(player.get_cur_frame(), 7);
    player.reset_cur_frame();
    assert_eq!(player.get_cur_frame(), 0);
}

#[rstest]
fn test_out_of_range_frame_rejected(robot: Robot) {
    let mut scene = RecordingScene::new();
    let mut player = RobotPlayer::new(&mut scene, &robot.xml).unwrap();
    player.load_motion(&motion(10, 0.0)).unwrap();

    assert!(matches!(
        player.get_frame(&mut scene, Some(15)),
        Err(ViewerError::FrameOutOfRange { frame: 15, count: 10 })
    ));
    assert!(player.set_cur_frame(10).is_err());
}

#[rstest]
fn test_get_frame_before_load(robot: Robot) {
    let mut scene = RecordingScene::new();
    let player = RobotPlayer::new(&mut scene, &robot.xml).unwrap();
    assert!(matches!(
        player.get_frame(&mut scene, None),
        Err(ViewerError::NotLoaded)
    ));
}

#[rstest]
fn test_poses_pushed_in_viewer_convention(robot: Robot) {
    let mut scene = RecordingScene::new();
    let mut player = RobotPlayer::new(&mut scene, &robot.xml).unwrap();
    player.load_motion(&motion(3, FRAC_PI_2)).unwrap();

    player.get_frame(&mut scene, Some(2)).unwrap();

    // Z-up (2, 0, 2) becomes Y-up (2, 2, 0)
    let b = node_position(&scene, "/robot_root/link_b");
    assert!((b - Vec3::new(2.0, 2.0, 0.0)).length() < 1e-5, "{b:?}");

    let node = scene.node(scene.find("/robot_root/link_a").unwrap()).unwrap();
    let expected = Quat::from_rotation_x(-FRAC_PI_2) * Quat::from_rotation_z(FRAC_PI_2);
    assert!(node.orientation().abs_diff_eq(expected, 1e-5));
    // scalar first
    assert!((node.wxyz[0] - expected.w).abs() < 1e-6);
}

#[rstest]
fn test_get_frame_is_idempotent(robot: Robot) {
    let mut scene = RecordingScene::new();
    let mut player = RobotPlayer::new(&mut scene, &robot.xml).unwrap();
    player.load_motion(&motion(5, 0.3)).unwrap();

    player.get_frame(&mut scene, Some(3)).unwrap();
    let first: Vec<_> = scene.nodes().map(|(_, n)| n.clone()).collect();
    player.get_frame(&mut scene, Some(3)).unwrap();
    let second: Vec<_> = scene.nodes().map(|(_, n)| n.clone()).collect();

    assert_eq!(first, second);
    assert_eq!(player.get_cur_frame(), 0);
}

#[rstest]
fn test_second_load_replaces_first(robot: Robot) {
    let mut scene = RecordingScene::new();
    let mut player = RobotPlayer::new(&mut scene, &robot.xml).unwrap();

    player.load_motion(&motion(10, 0.0)).unwrap();
    player.set_cur_frame(4).unwrap();
    player.load_motion(&motion(6, 0.0)).unwrap();

    assert_eq!(player.get_frame_count(), 6);
    assert_eq!(player.get_cur_frame(), 0);
}

#[rstest]
fn test_rejected_load_keeps_previous_animation(robot: Robot) {
    let mut scene = RecordingScene::new();
    let mut player = RobotPlayer::new(&mut scene, &robot.xml).unwrap();
    player.load_motion(&motion(10, 0.0)).unwrap();
    player.set_cur_frame(4).unwrap();

    let mut bad = motion(8, 0.0);
    bad.dof_pos = vec![vec![0.0, 0.0]; 8];
    assert!(matches!(player.load_motion(&bad), Err(ViewerError::Mjcf(_))));

    let mut ragged = motion(8, 0.0);
    ragged.root_rot.pop();
    assert!(matches!(player.load_motion(&ragged), Err(ViewerError::Motion(_))));

    assert_eq!(player.get_frame_count(), 10);
    assert_eq!(player.get_cur_frame(), 4);
}

#[rstest]
fn test_root_scale_and_position(robot: Robot) {
    let mut scene = RecordingScene::new();
    let mut player = RobotPlayer::new(&mut scene, &robot.xml).unwrap();
    player.load_motion(&motion(1, 0.0)).unwrap();

    player.set_position(&mut scene, Vec3::new(1.0, 0.7, 0.0)).unwrap();
    player.set_scale(&mut scene, 2.0).unwrap();
    player.get_frame(&mut scene, None).unwrap();

    // per-body transforms are untouched, the root composes on top
    let a = scene.find("/robot_root/link_a").unwrap();
    assert!((scene.node(a).unwrap().position - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
    let (world, _, scale) = scene.world_transform(a).unwrap();
    assert!((world - Vec3::new(1.0, 2.7, 0.0)).length() < 1e-5);
    assert_eq!(scale, 2.0);

    let root = scene.node(player.root_node()).unwrap();
    assert_eq!(root.scale, 2.0);
}

#[rstest]
fn test_player_in_dyn_scene(robot: Robot) {
    let mut recording = RecordingScene::new();
    let scene: &mut dyn Scene = &mut recording;
    let mut player = RobotPlayer::new(scene, &robot.xml).unwrap();
    player.load_motion(&motion(2, 0.0)).unwrap();
    player.get_frame(scene, Some(1)).unwrap();
    assert!(recording.update_count() > 0);
}
