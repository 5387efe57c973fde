//! Idle/demo mode: the AI plays the game

use glam::Vec2;

use crate::sim::{FrameInput, GameState};

/// Lasers closer than this make the autopilot dash away
const DODGE_RADIUS: f32 = 80.0;

/// Choose this frame's input from the current state
pub fn autopilot(state: &GameState) -> FrameInput {
    let ship = state.ship.pos;

    // Nearest enemy is the target
    let target = state
        .enemies
        .iter_active()
        .map(|(_, e)| e.pos)
        .min_by(|a, b| {
            a.distance(ship)
                .partial_cmp(&b.distance(ship))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let threat = state
        .projectiles
        .iter_active()
        .filter(|(_, p)| !p.kind.is_player_owned())
        .map(|(_, p)| p.pos)
        .find(|pos| pos.distance(ship) < DODGE_RADIUS);

    let Some(target) = target else {
        // Drift back toward the middle and wait
        let center = state.bounds.x / 2.0;
        return FrameInput {
            move_axis: axis_toward(ship.x, center),
            pointer: Vec2::new(ship.x, 0.0),
            ..Default::default()
        };
    };

    // Sway a little so the run isn't a straight line
    let time = state.elapsed_ms as f32 * 0.001;
    let sway = (time.sin() * 0.7 + (time * 1.3).sin() * 0.3) * 60.0;

    let (move_axis, dash) = match threat {
        // Dodge: move away from the laser
        Some(laser) => (if laser.x > ship.x { -1.0 } else { 1.0 }, true),
        None => (axis_toward(ship.x, target.x + sway), false),
    };

    FrameInput {
        move_axis,
        pointer: target,
        fire_cannon: true,
        fire_missile: true,
        dash,
    }
}

fn axis_toward(from: f32, to: f32) -> f32 {
    let dx = to - from;
    if dx.abs() < 5.0 { 0.0 } else { dx.signum() }
}
