//! Per-frame simulation step
//!
//! Advances the game state by one variable-length frame in a fixed order:
//! ambient, ship, effects, shake, projectiles, loot, spawning, enemies,
//! collisions, cleanup.

use glam::Vec2;
use rand::Rng;

use super::collision::{self, circles_overlap};
use super::error::SimError;
use super::loot::LootKind;
use super::ship::FrameInput;
use super::state::{GameEvent, GamePhase, GameState};

/// Sparks left where loot is picked up
const PICKUP_SPARKS: usize = 8;

/// Advance the game state by `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &FrameInput, dt_ms: f32) -> Result<(), SimError> {
    if !dt_ms.is_finite() {
        return Err(SimError::NonFiniteDelta { dt_ms });
    }
    if dt_ms < 0.0 {
        return Err(SimError::NegativeDelta { dt_ms });
    }
    if state.phase != GamePhase::Playing {
        return Ok(());
    }
    state.elapsed_ms += dt_ms as f64;

    update_ambient(state, input, dt_ms);
    state.shake.update(dt_ms, &mut state.fx_rng);
    update_projectiles(state, dt_ms);
    update_loot(state, dt_ms);
    update_spawning(state, dt_ms);
    update_enemies(state, dt_ms);

    collision::resolve(state);

    state.enemies.sweep();
    state.projectiles.sweep();
    state.validate_invariants()?;
    Ok(())
}

/// Starfield, ship and cosmetic effects
fn update_ambient(state: &mut GameState, input: &FrameInput, dt_ms: f32) {
    let bounds = state.bounds;
    state.starfield.update(dt_ms, bounds, &mut state.fx_rng);

    let shots = state
        .ship
        .update(dt_ms, input, bounds.x, &state.tuning.ship, &mut state.rng);
    for shot in shots {
        state.spawn_shot(shot);
    }
    if state.ship.thrusting {
        let exhaust = state.ship.pos + Vec2::new(0.0, state.ship.radius);
        state.effects.thruster(exhaust, &mut state.fx_rng);
    }

    state.effects.update(dt_ms);
}

fn update_projectiles(state: &mut GameState, dt_ms: f32) {
    let targets: Vec<Vec2> = state.enemies.iter_active().map(|(_, e)| e.pos).collect();
    let bounds = state.bounds;

    let mut expired = Vec::new();
    for (handle, projectile) in state.projectiles.iter_active_mut() {
        let (color, size) = projectile.kind.trail();
        state.effects.trail(projectile.pos, color, size);

        // Enemy lasers never home in
        let seek: &[Vec2] = if projectile.kind.is_player_owned() {
            &targets
        } else {
            &[]
        };
        if projectile
            .update(dt_ms, seek, bounds, &state.tuning.projectile)
            .is_some()
        {
            expired.push(handle);
        }
    }

    for handle in expired {
        state.projectiles.mark_for_removal(handle);
    }
    state.projectiles.sweep();
}

fn update_loot(state: &mut GameState, dt_ms: f32) {
    let ship_pos = state.ship.pos;
    let ship_radius = state.ship.radius;

    let mut expired = Vec::new();
    let mut collected = Vec::new();
    for (handle, loot) in state.loot.iter_active_mut() {
        if loot.update(dt_ms, ship_pos, &state.tuning.loot) {
            expired.push(handle);
        } else if circles_overlap(loot.pos, loot.radius, ship_pos, ship_radius) {
            collected.push((handle, loot.kind, loot.pos));
        }
    }

    for handle in expired {
        state.loot.mark_for_removal(handle);
    }
    for (handle, kind, pos) in collected {
        state.loot.mark_for_removal(handle);
        collect_loot(state, kind, pos);
    }
    state.loot.sweep();
}

fn collect_loot(state: &mut GameState, kind: LootKind, pos: Vec2) {
    log::debug!("Collected {:?} loot", kind);
    state
        .effects
        .sparks(pos, kind.color(), PICKUP_SPARKS, &mut state.fx_rng);
    match kind {
        LootKind::Currency => {
            let value = state.tuning.loot.currency_value;
            state.add_currency(value);
        }
        LootKind::Shield => state.ship.activate_shield(&state.tuning.ship),
        LootKind::Speed => state.ship.activate_speed_boost(&state.tuning.ship),
        LootKind::Weapon => {}
    }
    state.emit(GameEvent::LootCollected { kind });
}

fn update_spawning(state: &mut GameState, dt_ms: f32) {
    state.spawn_timer_ms += dt_ms;
    if state.spawn_timer_ms <= state.level.config().spawn_interval_ms as f32 {
        return;
    }
    state.spawn_timer_ms = 0.0;

    let variant = state.level.next_enemy_type(&mut state.rng);
    let x = state.rng.random_range(0.0..state.bounds.x.max(1.0));
    let pos = Vec2::new(x, state.tuning.enemy.spawn_y);
    state.spawn_enemy(variant, pos);
}

fn update_enemies(state: &mut GameState, dt_ms: f32) {
    let ship_pos = state.ship.pos;
    let bounds = state.bounds;
    let despawn = state.tuning.enemy.despawn_margin;

    let mut shots = Vec::new();
    let mut strays = Vec::new();
    for (handle, enemy) in state.enemies.iter_active_mut() {
        if let Some(angle) = enemy.update(dt_ms, ship_pos, bounds.y, &state.tuning.enemy) {
            shots.push((enemy.pos, angle));
        }
        if let Some(margin) = despawn
            && enemy.is_far_off_screen(bounds.x, bounds.y, margin)
        {
            strays.push(handle);
        }
    }

    for (pos, angle) in shots {
        state.spawn_enemy_laser(pos, angle);
    }
    for handle in strays {
        state.enemies.mark_for_removal(handle);
    }
}
