//! Alien Hunter - A vertical arcade shoot-em-up
//!
//! Core modules:
//! - `sim`: Frame simulation (entities, collisions, progression, upgrades)
//! - `session`: Run lifecycle, persistence hooks, error halting
//! - `platform`: Browser/native input abstraction
//! - `persistence`: Durable key-value storage for currency and upgrades
//! - `tuning`: Data-driven game balance

pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use session::{FrameOutcome, GameSession};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default viewport (resized by the driver)
    pub const DEFAULT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_HEIGHT: f32 = 720.0;

    /// Longest frame the driver will feed the simulation (ms).
    /// Tab switches can produce multi-second gaps.
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Frame used when no previous timestamp exists (ms)
    pub const FIRST_FRAME_MS: f32 = 1000.0 / 60.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit direction for a heading (screen space, +y down)
#[inline]
pub fn angle_to_vec(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Heading of a direction vector
#[inline]
pub fn vec_angle(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(5.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
        assert!((normalize_angle(0.25) - 0.25).abs() < 1e-6);
        // Rounding decides which side of the seam an odd multiple of π lands on
        assert!((normalize_angle(3.0 * PI).abs() - PI).abs() < 1e-5);
        assert!((-PI..PI).contains(&normalize_angle(-7.0 * PI)));
    }

    #[test]
    fn test_angle_vec_round_trip() {
        let a = 1.2;
        assert!((vec_angle(angle_to_vec(a)) - a).abs() < 1e-5);
    }
}
