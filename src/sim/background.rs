//! Parallax starfield

use glam::Vec2;
use rand::Rng;

/// (star count, scroll speed px/s) per layer, far to near
pub const LAYERS: [(usize, f32); 3] = [(100, 20.0), (100, 50.0), (50, 100.0)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub pos: Vec2,
    pub speed: f32,
    pub size: f32,
}

#[derive(Debug, Clone, Default)]
pub struct Starfield {
    pub stars: Vec<Star>,
}

impl Starfield {
    pub fn new(bounds: Vec2, rng: &mut impl Rng) -> Self {
        let mut stars = Vec::with_capacity(LAYERS.iter().map(|(n, _)| n).sum());
        for (layer, &(count, speed)) in LAYERS.iter().enumerate() {
            for _ in 0..count {
                stars.push(Star {
                    pos: Vec2::new(
                        rng.random_range(0.0..bounds.x.max(1.0)),
                        rng.random_range(0.0..bounds.y.max(1.0)),
                    ),
                    speed,
                    size: 1.0 + layer as f32,
                });
            }
        }
        Self { stars }
    }

    /// Scroll down; stars leaving the bottom re-enter at the top at a random x
    pub fn update(&mut self, dt_ms: f32, bounds: Vec2, rng: &mut impl Rng) {
        let dt = dt_ms / 1000.0;
        for star in &mut self.stars {
            star.pos.y += star.speed * dt;
            if star.pos.y > bounds.y {
                star.pos.y = 0.0;
                star.pos.x = rng.random_range(0.0..bounds.x.max(1.0));
            }
        }
    }
}
