//! Real-time playback loop over several players
//!
//! Players are advanced in lock-step: every tick shows the current frame of
//! each player, then moves its cursor one frame forward. At the end of a clip
//! the cursor wraps to 0 when looping; otherwise playback stops as soon as
//! any player has shown its last frame.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::body_model::BodyModel;
use crate::error::Result;
use crate::human_player::HumanPlayer;
use crate::robot_player::RobotPlayer;
use crate::scene::Scene;

/// A player the driver can advance
pub trait Playable {
    fn frame_count(&self) -> usize;
    fn cur_frame(&self) -> usize;
    fn set_cur_frame(&mut self, frame: usize) -> Result<()>;
    /// Push the current frame to the scene
    fn show_frame(&self, scene: &mut dyn Scene) -> Result<()>;
}

impl Playable for RobotPlayer {
    fn frame_count(&self) -> usize {
        self.get_frame_count()
    }

    fn cur_frame(&self) -> usize {
        self.get_cur_frame()
    }

    fn set_cur_frame(&mut self, frame: usize) -> Result<()> {
        Self::set_cur_frame(self, frame)
    }

    fn show_frame(&self, scene: &mut dyn Scene) -> Result<()> {
        self.get_frame(scene, None)
    }
}

impl<M: BodyModel> Playable for HumanPlayer<M> {
    fn frame_count(&self) -> usize {
        self.get_frame_count()
    }

    fn cur_frame(&self) -> usize {
        self.get_cur_frame()
    }

    fn set_cur_frame(&mut self, frame: usize) -> Result<()> {
        Self::set_cur_frame(self, frame)
    }

    fn show_frame(&self, scene: &mut dyn Scene) -> Result<()> {
        self.get_frame(scene, None)
    }
}

/// Why a playback run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A player reached its last frame without looping
    EndOfClip,
    /// The configured tick limit was reached
    FrameLimit,
    /// The stop flag was raised
    Cancelled,
    /// No player had anything to show
    Empty,
}

/// Summary of a playback run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackStats {
    pub ticks: usize,
    pub elapsed: Duration,
    pub reason: StopReason,
}

/// Drives players at a fixed frame rate
#[derive(Debug, Clone)]
pub struct PlaybackDriver {
    fps: f32,
    looping: bool,
    realtime: bool,
    max_ticks: Option<usize>,
    stop: Option<Arc<AtomicBool>>,
}

impl PlaybackDriver {
    /// Looping, real-time playback at `fps` (non-positive rates fall back to 30)
    pub fn new(fps: f32) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 30.0 };
        Self {
            fps,
            looping: true,
            realtime: true,
            max_ticks: None,
            stop: None,
        }
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Disable pacing to run as fast as possible
    pub fn with_realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    /// Stop after this many ticks
    pub fn with_frame_limit(mut self, ticks: usize) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Stop at the next tick boundary once `flag` is set
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps))
    }

    /// Run until a clip ends, the frame limit is hit or the stop flag is set
    ///
    /// Players without a loaded animation are skipped.
    pub fn run(&self, scene: &mut dyn Scene, players: &mut [&mut dyn Playable]) -> Result<PlaybackStats> {
        let start = Instant::now();
        let period = self.frame_period();
        let mut ticks = 0;

        if players.iter().all(|p| p.frame_count() == 0) {
            return Ok(self.stats(ticks, start, StopReason::Empty));
        }

        debug!(
            "Playing {} players at {} fps (loop: {})",
            players.len(),
            self.fps,
            self.looping
        );

        loop {
            if self.cancelled() {
                return Ok(self.stats(ticks, start, StopReason::Cancelled));
            }
            if self.max_ticks.is_some_and(|max| ticks >= max) {
                return Ok(self.stats(ticks, start, StopReason::FrameLimit));
            }

            let tick_start = Instant::now();
            let mut finished = false;
            for player in players.iter_mut() {
                let count = player.frame_count();
                if count == 0 {
                    continue;
                }
                player.show_frame(scene)?;

                let next = player.cur_frame() + 1;
                if next < count {
                    player.set_cur_frame(next)?;
                } else if self.looping {
                    player.set_cur_frame(0)?;
                } else {
                    finished = true;
                }
            }
            ticks += 1;
            trace!("Tick {} took {:?}", ticks, tick_start.elapsed());

            if finished {
                return Ok(self.stats(ticks, start, StopReason::EndOfClip));
            }

            if self.realtime {
                if let Some(remaining) = period.checked_sub(tick_start.elapsed()) {
                    thread::sleep(remaining);
                }
            }
        }
    }

    fn cancelled(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn stats(&self, ticks: usize, start: Instant, reason: StopReason) -> PlaybackStats {
        let stats = PlaybackStats {
            ticks,
            elapsed: start.elapsed(),
            reason,
        };
        debug!("Playback stopped: {:?}", stats);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingScene;
    use crate::scene::NodeId;
    use glam::Vec3;
    use pretty_assertions::assert_eq;

    /// Records every shown frame in the x position of one node
    struct Counter {
        node: NodeId,
        frames: usize,
        cur: usize,
        shown: std::cell::RefCell<Vec<usize>>,
    }

    impl Counter {
        fn new(scene: &mut RecordingScene, path: &str, frames: usize) -> Self {
            Self {
                node: scene.add_frame(path).unwrap(),
                frames,
                cur: 0,
                shown: std::cell::RefCell::new(Vec::new()),
            }
        }
    }

    impl Playable for Counter {
        fn frame_count(&self) -> usize {
            self.frames
        }

        fn cur_frame(&self) -> usize {
            self.cur
        }

        fn set_cur_frame(&mut self, frame: usize) -> Result<()> {
            self.cur = frame;
            Ok(())
        }

        fn show_frame(&self, scene: &mut dyn Scene) -> Result<()> {
            self.shown.borrow_mut().push(self.cur);
            scene.set_position(self.node, Vec3::new(self.cur as f32, 0.0, 0.0))
        }
    }

    fn fast(fps: f32) -> PlaybackDriver {
        PlaybackDriver::new(fps).with_realtime(false)
    }

    #[test]
    fn test_looping_wraps_cursor() {
        let mut scene = RecordingScene::new();
        let mut a = Counter::new(&mut scene, "/a", 3);

        let stats = fast(30.0)
            .with_frame_limit(7)
            .run(&mut scene, &mut [&mut a])
            .unwrap();

        assert_eq!(stats.ticks, 7);
        assert_eq!(stats.reason, StopReason::FrameLimit);
        assert_eq!(*a.shown.borrow(), vec![0, 1, 2, 0, 1, 2, 0]);
        assert_eq!(a.cur, 1);
    }

    #[test]
    fn test_stop_at_end_of_shortest_clip() {
        let mut scene = RecordingScene::new();
        let mut long = Counter::new(&mut scene, "/long", 10);
        let mut short = Counter::new(&mut scene, "/short", 4);

        let stats = fast(30.0)
            .with_loop(false)
            .run(&mut scene, &mut [&mut long, &mut short])
            .unwrap();

        assert_eq!(stats.reason, StopReason::EndOfClip);
        assert_eq!(stats.ticks, 4);
        assert_eq!(*short.shown.borrow(), vec![0, 1, 2, 3]);
        assert_eq!(long.cur, 4);
    }

    #[test]
    fn test_unloaded_players_skipped() {
        let mut scene = RecordingScene::new();
        let mut empty = Counter::new(&mut scene, "/empty", 0);
        let stats = fast(30.0).run(&mut scene, &mut [&mut empty]).unwrap();
        assert_eq!(stats.reason, StopReason::Empty);
        assert_eq!(stats.ticks, 0);
    }

    #[test]
    fn test_stop_flag() {
        let mut scene = RecordingScene::new();
        let mut a = Counter::new(&mut scene, "/a", 5);
        let flag = Arc::new(AtomicBool::new(true));

        let stats = fast(30.0)
            .with_stop_flag(flag)
            .run(&mut scene, &mut [&mut a])
            .unwrap();
        assert_eq!(stats.reason, StopReason::Cancelled);
        assert!(a.shown.borrow().is_empty());
    }

    #[test]
    fn test_realtime_pacing() {
        let mut scene = RecordingScene::new();
        let mut a = Counter::new(&mut scene, "/a", 3);

        let stats = PlaybackDriver::new(100.0)
            .with_loop(false)
            .run(&mut scene, &mut [&mut a])
            .unwrap();

        // sleeps after the first two ticks only
        assert!(stats.elapsed >= Duration::from_millis(18), "{:?}", stats.elapsed);
    }

    #[test]
    fn test_invalid_fps_falls_back() {
        assert_eq!(PlaybackDriver::new(0.0).fps(), 30.0);
        assert_eq!(PlaybackDriver::new(f32::NAN).fps(), 30.0);
        assert_eq!(PlaybackDriver::new(50.0).frame_period(), Duration::from_millis(20));
    }
}
