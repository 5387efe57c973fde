//! Cosmetic effects and screen shake
//!
//! Nothing in here feeds back into gameplay. Every effect has the same
//! contract: `update` ages it, `expired` says when to drop it.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;

use crate::angle_to_vec;

/// Flash lifetime for explosions
pub const FLASH_MS: f32 = 200.0;
/// Projectile trail lifetime
pub const TRAIL_MS: f32 = 200.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Debris flying outward
    Spark {
        pos: Vec2,
        vel: Vec2,
        color: u32,
        size: f32,
        life_ms: f32,
        max_life_ms: f32,
    },
    /// Expanding glow at an explosion center
    Flash {
        pos: Vec2,
        color: u32,
        radius: f32,
        life_ms: f32,
    },
    /// Fading dot left behind by a projectile
    Trail {
        pos: Vec2,
        color: u32,
        size: f32,
        life_ms: f32,
    },
}

impl Effect {
    pub fn update(&mut self, dt_ms: f32) {
        match self {
            Effect::Spark {
                pos, vel, life_ms, ..
            } => {
                *pos += *vel * (dt_ms / 1000.0);
                *life_ms -= dt_ms;
            }
            Effect::Flash { life_ms, .. } | Effect::Trail { life_ms, .. } => {
                *life_ms -= dt_ms;
            }
        }
    }

    pub fn expired(&self) -> bool {
        self.life_ms() <= 0.0
    }

    pub fn pos(&self) -> Vec2 {
        match self {
            Effect::Spark { pos, .. }
            | Effect::Flash { pos, .. }
            | Effect::Trail { pos, .. } => *pos,
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            Effect::Spark { color, .. }
            | Effect::Flash { color, .. }
            | Effect::Trail { color, .. } => *color,
        }
    }

    /// Remaining life as 0..1, for fading
    pub fn alpha(&self) -> f32 {
        let total = match self {
            Effect::Spark { max_life_ms, .. } => *max_life_ms,
            Effect::Flash { .. } => FLASH_MS,
            Effect::Trail { .. } => TRAIL_MS,
        };
        (self.life_ms() / total).clamp(0.0, 1.0)
    }

    fn life_ms(&self) -> f32 {
        match self {
            Effect::Spark { life_ms, .. }
            | Effect::Flash { life_ms, .. }
            | Effect::Trail { life_ms, .. } => *life_ms,
        }
    }
}

/// Live effects with a cap. When full, the oldest effect is dropped.
#[derive(Debug, Clone)]
pub struct Effects {
    items: VecDeque<Effect>,
    cap: usize,
    trails: bool,
}

impl Effects {
    pub fn new(cap: usize, trails: bool) -> Self {
        Self {
            items: VecDeque::new(),
            cap,
            trails,
        }
    }

    /// Apply new limits; trims immediately if the cap shrank
    pub fn configure(&mut self, cap: usize, trails: bool) {
        self.cap = cap;
        self.trails = trails;
        if self.items.len() > cap {
            let excess = self.items.len() - cap;
            self.items.drain(..excess);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Effect> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn push(&mut self, effect: Effect) {
        if self.cap == 0 {
            return;
        }
        if self.items.len() >= self.cap {
            self.items.pop_front();
        }
        self.items.push_back(effect);
    }

    pub fn update(&mut self, dt_ms: f32) {
        for effect in &mut self.items {
            effect.update(dt_ms);
        }
        self.items.retain(|e| !e.expired());
    }

    /// Flash plus `count` sparks
    pub fn explosion(&mut self, pos: Vec2, color: u32, count: usize, rng: &mut impl Rng) {
        self.push(Effect::Flash {
            pos,
            color,
            radius: 10.0 + count as f32 * 2.0,
            life_ms: FLASH_MS,
        });
        self.sparks(pos, color, count, rng);
    }

    /// Impact sparks without the flash
    pub fn sparks(&mut self, pos: Vec2, color: u32, count: usize, rng: &mut impl Rng) {
        for _ in 0..count {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(50.0..150.0);
            let life = rng.random_range(200.0..700.0);
            self.push(Effect::Spark {
                pos,
                vel: angle_to_vec(angle) * speed,
                color,
                size: rng.random_range(1.0..4.0),
                life_ms: life,
                max_life_ms: life,
            });
        }
    }

    pub fn trail(&mut self, pos: Vec2, color: u32, size: f32) {
        if !self.trails {
            return;
        }
        self.push(Effect::Trail {
            pos,
            color,
            size,
            life_ms: TRAIL_MS,
        });
    }

    /// Exhaust sparks below the ship
    pub fn thruster(&mut self, pos: Vec2, rng: &mut impl Rng) {
        let angle = std::f32::consts::FRAC_PI_2 + rng.random_range(-0.3..0.3);
        let life = rng.random_range(100.0..300.0);
        self.push(Effect::Spark {
            pos,
            vel: angle_to_vec(angle) * rng.random_range(50.0..150.0),
            color: 0x00aaff,
            size: rng.random_range(1.0..3.0),
            life_ms: life,
            max_life_ms: life,
        });
    }
}

/// Camera shake. A new shake replaces the current one.
#[derive(Debug, Clone, Default)]
pub struct ScreenShake {
    intensity: f32,
    remaining_ms: f32,
    offset: Vec2,
    enabled: bool,
}

impl ScreenShake {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.stop();
        }
    }

    pub fn shake(&mut self, intensity: f32, duration_ms: f32) {
        if !self.enabled {
            return;
        }
        self.intensity = intensity;
        self.remaining_ms = duration_ms;
    }

    pub fn is_active(&self) -> bool {
        self.remaining_ms > 0.0
    }

    /// This frame's camera offset
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn stop(&mut self) {
        self.intensity = 0.0;
        self.remaining_ms = 0.0;
        self.offset = Vec2::ZERO;
    }

    pub fn update(&mut self, dt_ms: f32, rng: &mut impl Rng) {
        if !self.is_active() {
            self.offset = Vec2::ZERO;
            return;
        }
        self.remaining_ms -= dt_ms;
        if self.remaining_ms <= 0.0 {
            self.stop();
            return;
        }
        let i = self.intensity;
        self.offset = Vec2::new(rng.random_range(-i..=i), rng.random_range(-i..=i));
    }
}
