//! Collision detection and response
//!
//! Everything is a circle. Detection is a strict center-distance test; the
//! response passes run pairwise over the arenas after entities have moved and
//! only ever mark entities for removal, so nothing is dropped mid-pass.

use glam::Vec2;

use super::arena::Handle;
use super::enemy::EnemyVariant;
use super::level::Progress;
use super::projectile::ProjectileKind;
use super::state::{GameEvent, GamePhase, GameState};

/// Sparks left at every projectile impact
const IMPACT_SPARKS: usize = 5;

/// Whether two circles overlap (touching does not count)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Reflect direction `d` off a surface with unit normal `n`
#[inline]
pub fn reflect(d: Vec2, n: Vec2) -> Vec2 {
    d - 2.0 * d.dot(n) * n
}

/// Run every collision pass for this frame. Stops as soon as the run ends.
pub fn resolve(state: &mut GameState) {
    player_shots_vs_enemies(state);
    if state.phase != GamePhase::Playing {
        return;
    }
    lasers_vs_ship(state);
    if state.phase != GamePhase::Playing {
        return;
    }
    ship_vs_enemies(state);
}

fn player_shots_vs_enemies(state: &mut GameState) {
    let shots: Vec<Handle> = state
        .projectiles
        .iter_active()
        .filter(|(_, p)| p.kind.is_player_owned())
        .map(|(h, _)| h)
        .collect();
    let enemies = state.enemies.active_handles();

    for shot in shots {
        for &target in &enemies {
            if state.phase != GamePhase::Playing {
                return;
            }
            if !state.enemies.is_active(target) || !state.projectiles.is_active(shot) {
                continue;
            }
            let (Some(p), Some(e)) = (state.projectiles.get(shot), state.enemies.get(target)) else {
                continue;
            };
            if !circles_overlap(p.pos, p.radius, e.pos, e.radius) {
                continue;
            }
            projectile_hits_enemy(state, shot, target);
            // A bounced shot carries on to the remaining enemies
            if !state.projectiles.is_active(shot) {
                break;
            }
        }
    }
}

fn projectile_hits_enemy(state: &mut GameState, shot: Handle, target: Handle) {
    let flash_ms = state.tuning.enemy.flash_ms;
    let Some(p) = state.projectiles.get(shot) else {
        return;
    };
    let (damage, crit, impact) = (p.damage, p.crit, p.pos);
    let Some(enemy) = state.enemies.get_mut(target) else {
        return;
    };
    let killed = enemy.take_hit(damage, flash_ms);
    let (enemy_pos, enemy_radius) = (enemy.pos, enemy.radius);
    let (variant, score_value) = (enemy.variant, enemy.score_value);

    if state.damage_numbers {
        state.emit(GameEvent::DamageNumber {
            pos: enemy_pos,
            amount: damage.floor() as u32,
            crit,
        });
    }

    // Projectile first: bounce off the enemy-to-projectile normal or die
    let normal = (impact - enemy_pos)
        .try_normalize()
        .unwrap_or(Vec2::new(0.0, 1.0));
    let bounced = match state.projectiles.get_mut(shot) {
        Some(p) => {
            let bounced = p.bounce(normal);
            if bounced {
                // Park it on the surface so it can't re-hit next frame
                p.pos = enemy_pos + normal * (enemy_radius + p.radius);
            }
            bounced
        }
        None => false,
    };
    if !bounced {
        state.projectiles.mark_for_removal(shot);
    }
    let color = ProjectileKind::Cannon.trail().0;
    state
        .effects
        .sparks(impact, color, IMPACT_SPARKS, &mut state.fx_rng);

    if killed {
        state.enemies.mark_for_removal(target);
        enemy_destroyed(state, variant, enemy_pos, score_value);
    }
}

/// Rewards and progression for a kill
fn enemy_destroyed(state: &mut GameState, variant: EnemyVariant, pos: Vec2, score_value: u32) {
    state.score += score_value as u64;
    state.add_currency(score_value as u64 / 2);
    state.emit(GameEvent::EnemyDestroyed { variant, pos });

    let sparks = if variant == EnemyVariant::Boss { 50 } else { 20 };
    state
        .effects
        .explosion(pos, variant.color(), sparks, &mut state.fx_rng);
    state.shake.shake(5.0, 100.0);
    state.roll_loot(pos);

    match state.level.enemy_defeated() {
        Progress::Continue => {}
        Progress::StageStarted { level, stage } => {
            state.emit(GameEvent::StageStarted { level, stage });
        }
        Progress::LevelStarted { level } => {
            state.emit(GameEvent::LevelStarted { level });
        }
        Progress::Victory => {
            state.trigger_victory();
        }
    }
}

fn lasers_vs_ship(state: &mut GameState) {
    let ship_pos = state.ship.pos;
    let ship_radius = state.ship.radius;
    let hits: Vec<(Handle, f32)> = state
        .projectiles
        .iter_active()
        .filter(|(_, p)| !p.kind.is_player_owned())
        .filter(|(_, p)| circles_overlap(p.pos, p.radius, ship_pos, ship_radius))
        .map(|(h, p)| (h, p.damage))
        .collect();

    for (laser, damage) in hits {
        state.projectiles.mark_for_removal(laser);
        if ship_takes_damage(state, damage, 10.0) {
            return;
        }
    }
}

fn ship_vs_enemies(state: &mut GameState) {
    let ship_pos = state.ship.pos;
    let ship_radius = state.ship.radius;
    let rams: Vec<(Handle, Vec2, EnemyVariant)> = state
        .enemies
        .iter_active()
        .filter(|(_, e)| circles_overlap(e.pos, e.radius, ship_pos, ship_radius))
        .map(|(h, e)| (h, e.pos, e.variant))
        .collect();

    let damage = state.tuning.ship.ram_damage;
    for (enemy, pos, variant) in rams {
        state.enemies.mark_for_removal(enemy);
        state
            .effects
            .explosion(pos, variant.color(), 30, &mut state.fx_rng);
        if ship_takes_damage(state, damage, 20.0) {
            return;
        }
    }
}

/// Apply damage to the ship with feedback. Returns true if the run just ended.
fn ship_takes_damage(state: &mut GameState, damage: f32, shake: f32) -> bool {
    let dead = state.ship.take_damage(damage);
    state.emit(GameEvent::ShipHit { damage });
    state.shake.shake(shake, 200.0);
    state
        .effects
        .explosion(state.ship.pos, 0xff0000, 10, &mut state.fx_rng);
    dead && state.trigger_game_over()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle_to_vec as heading;
    use crate::settings::Settings;
    use crate::sim::projectile::{Behavior, Projectile};
    use crate::sim::ship::ShipMotion;
    use crate::sim::upgrades::UpgradeManager;
    use crate::tuning::Tuning;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn state() -> GameState {
        let mut state = GameState::new(
            9,
            Vec2::new(1280.0, 720.0),
            UpgradeManager::new().loadout(),
            0,
            Tuning::default(),
            &Settings::default(),
        );
        state.ship.motion = ShipMotion::Flying;
        state.ship.pos = Vec2::new(640.0, 570.0);
        state
    }

    fn cannon(
        state: &mut GameState,
        pos: Vec2,
        angle: f32,
        damage: f32,
        behavior: Behavior,
    ) -> Handle {
        let p = Projectile::new(
            ProjectileKind::Cannon,
            behavior,
            pos,
            angle,
            damage,
            &state.tuning.projectile,
        );
        state.projectiles.insert(p)
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        a.distance(b) < 1e-5
    }

    #[test]
    fn test_overlap_is_strict() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.9, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 1.0, Vec2::new(3.0, 4.0), 3.0));
    }

    #[test]
    fn test_reflect_off_floor() {
        // Heading along +x off a (0,1) normal is unchanged
        assert!(close(reflect(heading(0.0), Vec2::new(0.0, 1.0)), Vec2::new(1.0, 0.0)));
        // Straight down off (0,-1) comes straight back up
        assert!(close(
            reflect(heading(FRAC_PI_2), Vec2::new(0.0, -1.0)),
            Vec2::new(0.0, -1.0)
        ));
    }

    #[test]
    fn test_reflect_diagonal() {
        let d = heading(FRAC_PI_4);
        let r = reflect(d, Vec2::new(-1.0, 0.0));
        assert!(close(r, Vec2::new(-d.x, d.y)));

        let r = reflect(heading(PI), Vec2::new(1.0, 0.0));
        assert!(close(r, Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_hit_damages_and_flashes() {
        let mut state = state();
        let enemy = state.spawn_enemy(EnemyVariant::Normal, Vec2::new(100.0, 100.0));
        let start = Vec2::new(100.0, 120.0);
        let shot = cannon(&mut state, start, -FRAC_PI_2, 10.0, Behavior::Normal);

        resolve(&mut state);

        let e = state.enemies.get(enemy).expect("enemy");
        assert_eq!(e.health, 20.0);
        assert!(e.is_flashing());
        assert!(state.enemies.is_active(enemy));
        assert!(!state.projectiles.is_active(shot));
        assert!(state.drain_events().contains(&GameEvent::DamageNumber {
            pos: Vec2::new(100.0, 100.0),
            amount: 10,
            crit: false,
        }));
    }

    #[test]
    fn test_damage_number_is_floored_and_flags_crits() {
        let mut state = state();
        state.spawn_enemy(EnemyVariant::Boss, Vec2::new(100.0, 100.0));
        let shot = cannon(&mut state, Vec2::new(100.0, 100.0), 0.0, 12.7, Behavior::Normal);
        state.projectiles.get_mut(shot).expect("projectile").crit = true;

        resolve(&mut state);

        assert!(state.drain_events().contains(&GameEvent::DamageNumber {
            pos: Vec2::new(100.0, 100.0),
            amount: 12,
            crit: true,
        }));
    }

    #[test]
    fn test_ricochet_hits_several_enemies_in_one_frame() {
        let mut state = state();
        let first = state.spawn_enemy(EnemyVariant::Normal, Vec2::new(100.0, 100.0));
        let second = state.spawn_enemy(EnemyVariant::Normal, Vec2::new(140.0, 100.0));
        let shot = cannon(
            &mut state,
            Vec2::new(120.0, 100.0),
            0.0,
            5.0,
            Behavior::Ricochet { bounces_left: 2 },
        );

        resolve(&mut state);

        assert_eq!(state.enemies.get(first).expect("first").health, 25.0);
        assert_eq!(state.enemies.get(second).expect("second").health, 25.0);
        let p = state.projectiles.get(shot).expect("projectile");
        assert_eq!(p.behavior, Behavior::Ricochet { bounces_left: 0 });
        // Parked on the second enemy's near side
        assert!(close(p.pos, Vec2::new(112.0, 100.0)));
    }

    #[test]
    fn test_kill_rewards() {
        let mut state = state();
        let enemy = state.spawn_enemy(EnemyVariant::Elite, Vec2::new(100.0, 100.0));
        cannon(&mut state, Vec2::new(100.0, 100.0), 0.0, 500.0, Behavior::Normal);

        resolve(&mut state);

        assert!(!state.enemies.is_active(enemy));
        assert_eq!(state.score, 50);
        assert_eq!(state.currency, 25);
        assert!(state.currency_dirty);
        assert_eq!(state.level.enemies_defeated(), 1);
        assert!(state.shake.is_active());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::EnemyDestroyed {
            variant: EnemyVariant::Elite,
            pos: Vec2::new(100.0, 100.0)
        }));
        assert!(events.contains(&GameEvent::CurrencyChanged { currency: 25 }));
    }

    #[test]
    fn test_dead_enemy_is_not_hit_twice() {
        let mut state = state();
        state.spawn_enemy(EnemyVariant::Normal, Vec2::new(100.0, 100.0));
        let first = cannon(&mut state, Vec2::new(100.0, 100.0), 0.0, 100.0, Behavior::Normal);
        let second = cannon(&mut state, Vec2::new(101.0, 100.0), 0.0, 100.0, Behavior::Normal);

        resolve(&mut state);

        assert!(!state.projectiles.is_active(first));
        assert!(state.projectiles.is_active(second));
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_ricochet_bounces_off_surface() {
        let mut state = state();
        state.spawn_enemy(EnemyVariant::Boss, Vec2::new(300.0, 300.0));
        // Coming in from the left, moving +x, hits the left side of the boss
        let shot = cannon(
            &mut state,
            Vec2::new(245.0, 300.0),
            0.0,
            1.0,
            Behavior::Ricochet { bounces_left: 1 },
        );

        resolve(&mut state);

        assert!(state.projectiles.is_active(shot));
        let p = state.projectiles.get(shot).expect("projectile");
        assert!(close(heading(p.angle), Vec2::new(-1.0, 0.0)));
        assert!(close(p.pos, Vec2::new(237.0, 300.0)));
        assert_eq!(p.behavior, Behavior::Ricochet { bounces_left: 0 });

        // Out of bounces: the next hit destroys it
        state.projectiles.get_mut(shot).expect("projectile").pos = Vec2::new(250.0, 300.0);
        resolve(&mut state);
        assert!(!state.projectiles.is_active(shot));
    }

    #[test]
    fn test_laser_hits_ship() {
        let mut state = state();
        let laser = state.spawn_enemy_laser(state.ship.pos, FRAC_PI_2);

        resolve(&mut state);

        assert_eq!(state.ship.health, 90.0);
        assert!(!state.projectiles.is_active(laser));
        assert!(state.shake.is_active());
        assert!(state.drain_events().contains(&GameEvent::ShipHit { damage: 10.0 }));
    }

    #[test]
    fn test_player_shots_ignore_ship() {
        let mut state = state();
        let pos = state.ship.pos;
        let shot = cannon(&mut state, pos, 0.0, 10.0, Behavior::Normal);
        resolve(&mut state);
        assert_eq!(state.ship.health, 100.0);
        assert!(state.projectiles.is_active(shot));
    }

    #[test]
    fn test_ram() {
        let mut state = state();
        let beside = state.ship.pos + Vec2::new(30.0, 0.0);
        let enemy = state.spawn_enemy(EnemyVariant::Normal, beside);

        resolve(&mut state);

        assert_eq!(state.ship.health, 80.0);
        assert!(!state.enemies.is_active(enemy));
        assert_eq!(state.score, 0);
        assert_eq!(state.level.enemies_defeated(), 0);
    }

    #[test]
    fn test_game_over_triggers_once() {
        let mut state = state();
        state.ship.health = 15.0;
        state.spawn_enemy_laser(state.ship.pos, 0.0);
        state.spawn_enemy_laser(state.ship.pos, 0.0);
        state.spawn_enemy(EnemyVariant::Normal, state.ship.pos);

        resolve(&mut state);

        assert_eq!(state.phase, GamePhase::GameOver);
        let game_overs = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);
    }

    #[test]
    fn test_final_kill_wins() {
        let mut state = state();
        state.level.jump_to(5, 5);
        let boss = state.spawn_enemy(EnemyVariant::Boss, Vec2::new(100.0, 100.0));
        state.enemies.get_mut(boss).expect("boss").health = 1.0;
        cannon(&mut state, Vec2::new(100.0, 100.0), 0.0, 10.0, Behavior::Normal);
        // Would also be a ram, but the run is already over
        state.spawn_enemy(EnemyVariant::Normal, state.ship.pos);

        resolve(&mut state);

        assert_eq!(state.phase, GamePhase::Victory);
        assert_eq!(state.ship.health, 100.0);
        assert!(state.drain_events().contains(&GameEvent::Victory { score: 1500 }));
    }

    proptest! {
        #[test]
        fn prop_overlap_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0, ra in 0.0f32..100.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0, rb in 0.0f32..100.0,
        ) {
            let (a, b) = (Vec2::new(ax, ay), Vec2::new(bx, by));
            prop_assert_eq!(circles_overlap(a, ra, b, rb), circles_overlap(b, rb, a, ra));
        }

        #[test]
        fn prop_reflect_preserves_length(angle in -PI..PI, normal in -PI..PI) {
            let r = reflect(heading(angle), heading(normal));
            prop_assert!((r.length() - 1.0).abs() < 1e-4);
            // Normal component flips, tangent component survives
            let n = heading(normal);
            prop_assert!((r.dot(n) + heading(angle).dot(n)).abs() < 1e-4);
        }
    }
}
