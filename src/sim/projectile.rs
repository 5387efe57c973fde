//! Projectiles: cannon shots, missiles and enemy lasers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::ProjectileTuning;
use crate::{angle_to_vec, normalize_angle, vec_angle};

/// Who fired it and what it looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Cannon,
    Missile,
    EnemyLaser,
}

impl ProjectileKind {
    pub fn is_player_owned(&self) -> bool {
        !matches!(self, ProjectileKind::EnemyLaser)
    }

    /// Trail tint and size
    pub fn trail(&self) -> (u32, f32) {
        match self {
            ProjectileKind::Cannon => (0xffff00, 6.0),
            ProjectileKind::Missile => (0xffaa00, 10.0),
            ProjectileKind::EnemyLaser => (0x00ff00, 6.0),
        }
    }
}

/// Flight behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    Normal,
    /// Steers toward the nearest enemy in range
    Tracking,
    /// Reflects off enemies instead of being destroyed
    Ricochet { bounces_left: u32 },
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub kind: ProjectileKind,
    pub behavior: Behavior,
    pub pos: Vec2,
    /// Heading (radians)
    pub angle: f32,
    pub speed: f32,
    pub radius: f32,
    pub damage: f32,
    pub life_ms: f32,
    pub bounces: u32,
    /// Rolled a critical hit when fired
    pub crit: bool,
}

/// Why a projectile stopped flying this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    TimedOut,
    OutOfBounds,
}

impl Projectile {
    pub fn new(
        kind: ProjectileKind,
        behavior: Behavior,
        pos: Vec2,
        angle: f32,
        damage: f32,
        tuning: &ProjectileTuning,
    ) -> Self {
        let stats = tuning.kind(kind);
        // Missiles always home in
        let behavior = match (kind, behavior) {
            (ProjectileKind::Missile, Behavior::Normal) => Behavior::Tracking,
            (_, b) => b,
        };
        Self {
            kind,
            behavior,
            pos,
            angle,
            speed: stats.speed,
            radius: stats.radius,
            damage,
            life_ms: stats.life_ms,
            bounces: 0,
            crit: false,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        angle_to_vec(self.angle) * self.speed
    }

    /// Advance one frame. `targets` are live enemy positions used for tracking.
    pub fn update(
        &mut self,
        dt_ms: f32,
        targets: &[Vec2],
        bounds: Vec2,
        tuning: &ProjectileTuning,
    ) -> Option<Expiry> {
        self.life_ms -= dt_ms;
        if self.life_ms <= 0.0 {
            return Some(Expiry::TimedOut);
        }
        let dt = dt_ms / 1000.0;

        if self.behavior == Behavior::Tracking {
            self.steer(targets, tuning.tracking_radius, tuning.turn_rate * dt);
        }

        self.pos += self.velocity() * dt;

        let margin = tuning.bounds_margin;
        if self.pos.x < -margin
            || self.pos.x > bounds.x + margin
            || self.pos.y < -margin
            || self.pos.y > bounds.y + margin
        {
            return Some(Expiry::OutOfBounds);
        }
        None
    }

    /// Turn toward the nearest target inside `radius`, by at most `max_turn`
    fn steer(&mut self, targets: &[Vec2], radius: f32, max_turn: f32) {
        let nearest = targets
            .iter()
            .map(|t| (*t, t.distance(self.pos)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        if let Some((target, dist)) = nearest
            && dist < radius
        {
            let desired = vec_angle(target - self.pos);
            let diff = normalize_angle(desired - self.angle);
            self.angle += diff.signum() * diff.abs().min(max_turn);
        }
    }

    /// Reflect the heading off a surface normal. Consumes one bounce; returns
    /// false (heading unchanged) when the projectile cannot ricochet.
    pub fn bounce(&mut self, normal: Vec2) -> bool {
        let Behavior::Ricochet { bounces_left } = self.behavior else {
            return false;
        };
        if bounces_left == 0 {
            return false;
        }

        let reflected = super::collision::reflect(angle_to_vec(self.angle), normal);
        self.angle = vec_angle(reflected);
        self.behavior = Behavior::Ricochet {
            bounces_left: bounces_left - 1,
        };
        self.bounces += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn tuning() -> ProjectileTuning {
        ProjectileTuning::default()
    }

    const BOUNDS: Vec2 = Vec2::new(1280.0, 720.0);

    #[test]
    fn test_missile_defaults_to_tracking() {
        let p = Projectile::new(
            ProjectileKind::Missile,
            Behavior::Normal,
            Vec2::ZERO,
            0.0,
            10.0,
            &tuning(),
        );
        assert_eq!(p.behavior, Behavior::Tracking);
        assert_eq!(p.speed, 400.0);
        assert_eq!(p.life_ms, 3000.0);
    }

    #[test]
    fn test_straight_flight() {
        let mut p = Projectile::new(
            ProjectileKind::Cannon,
            Behavior::Normal,
            Vec2::new(100.0, 100.0),
            0.0,
            10.0,
            &tuning(),
        );
        assert_eq!(p.update(100.0, &[], BOUNDS, &tuning()), None);
        assert!((p.pos.x - 160.0).abs() < 1e-3);
        assert!((p.pos.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_times_out() {
        let mut p = Projectile::new(
            ProjectileKind::Cannon,
            Behavior::Normal,
            Vec2::new(100.0, 100.0),
            FRAC_PI_2,
            10.0,
            &tuning(),
        );
        p.life_ms = 10.0;
        assert_eq!(p.update(16.0, &[], BOUNDS, &tuning()), Some(Expiry::TimedOut));
    }

    #[test]
    fn test_leaves_bounds() {
        let mut p = Projectile::new(
            ProjectileKind::EnemyLaser,
            Behavior::Normal,
            Vec2::new(10.0, 100.0),
            PI,
            10.0,
            &tuning(),
        );
        // 300 px/s * 0.25 s = 75 px left of x=10
        assert_eq!(p.update(250.0, &[], BOUNDS, &tuning()), Some(Expiry::OutOfBounds));
    }

    #[test]
    fn test_tracking_turn_is_rate_limited() {
        let mut p = Projectile::new(
            ProjectileKind::Missile,
            Behavior::Tracking,
            Vec2::new(100.0, 100.0),
            0.0,
            10.0,
            &tuning(),
        );
        // Target straight "down" the screen; 5 rad/s * 0.1 s = 0.5 rad max turn
        p.update(100.0, &[Vec2::new(100.0, 300.0)], BOUNDS, &tuning());
        assert!((p.angle - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_tracking_ignores_distant_targets() {
        let mut p = Projectile::new(
            ProjectileKind::Missile,
            Behavior::Tracking,
            Vec2::new(100.0, 100.0),
            0.0,
            10.0,
            &tuning(),
        );
        p.update(100.0, &[Vec2::new(100.0, 700.0)], BOUNDS, &tuning());
        assert_eq!(p.angle, 0.0);
    }

    #[test]
    fn test_tracking_picks_nearest() {
        let mut p = Projectile::new(
            ProjectileKind::Missile,
            Behavior::Tracking,
            Vec2::new(100.0, 100.0),
            0.0,
            10.0,
            &tuning(),
        );
        p.update(100.0, &[Vec2::new(100.0, 400.0), Vec2::new(100.0, 20.0)], BOUNDS, &tuning());
        assert!(p.angle < 0.0);
    }

    #[test]
    fn test_bounce_consumes_uses() {
        let mut p = Projectile::new(
            ProjectileKind::Cannon,
            Behavior::Ricochet { bounces_left: 1 },
            Vec2::ZERO,
            0.0,
            10.0,
            &tuning(),
        );
        assert!(p.bounce(Vec2::new(-1.0, 0.0)));
        assert!((p.angle.abs() - PI).abs() < 1e-4);
        assert_eq!(p.bounces, 1);
        assert!(!p.bounce(Vec2::new(1.0, 0.0)));
        assert_eq!(p.bounces, 1);
    }

    #[test]
    fn test_normal_projectile_never_bounces() {
        let mut p = Projectile::new(
            ProjectileKind::Cannon,
            Behavior::Normal,
            Vec2::ZERO,
            0.3,
            10.0,
            &tuning(),
        );
        assert!(!p.bounce(Vec2::new(0.0, 1.0)));
        assert_eq!(p.angle, 0.3);
    }
}
