//! Formatting utilities

use std::time::Duration;

use glam::Vec3;
use humansize::{DECIMAL, format_size};

/// Format file size in human-readable format
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Format a vector with fixed precision
pub fn format_vec3(v: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", v.x, v.y, v.z)
}

/// Format a clip length given in frames
pub fn format_clip_length(frames: usize, fps: f32) -> String {
    if fps > 0.0 {
        format!("{} frames ({:.2}s @ {} fps)", frames, frames as f32 / fps, fps)
    } else {
        format!("{frames} frames")
    }
}

pub fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1.02 kB");
        assert_eq!(format_bytes(1048576), "1.05 MB");
    }

    #[test]
    fn test_format_vec3() {
        assert_eq!(format_vec3(Vec3::new(0.0, 0.7, -1.0)), "(0.000, 0.700, -1.000)");
    }

    #[test]
    fn test_format_clip_length() {
        assert_eq!(format_clip_length(90, 30.0), "90 frames (3.00s @ 30 fps)");
        assert_eq!(format_clip_length(4, 0.0), "4 frames");
    }
}
