//! The player ship

use glam::Vec2;
use rand::Rng;

use super::projectile::{Behavior, ProjectileKind};
use super::upgrades::Loadout;
use crate::tuning::ShipTuning;
use crate::vec_angle;

/// Per-frame player intent
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Horizontal intent: -1 left, 0 idle, +1 right
    pub move_axis: f32,
    /// Pointer position in screen space
    pub pointer: Vec2,
    pub fire_cannon: bool,
    pub fire_missile: bool,
    pub dash: bool,
}

/// Entry animation, then free horizontal flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShipMotion {
    /// Climbing from below the screen toward `rest_y`
    Entering,
    Flying,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DashState {
    Idle,
    Dashing { remaining_ms: f32 },
}

/// An effect that runs out at a deadline. Re-triggering restarts it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedEffect {
    pub remaining_ms: f32,
}

impl TimedEffect {
    pub fn new(duration_ms: f32) -> Self {
        Self {
            remaining_ms: duration_ms,
        }
    }

    /// Returns true when the effect just expired
    fn tick(&mut self, dt_ms: f32) -> bool {
        self.remaining_ms -= dt_ms;
        self.remaining_ms <= 0.0
    }
}

/// A projectile the ship wants spawned this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub kind: ProjectileKind,
    pub behavior: Behavior,
    pub pos: Vec2,
    pub angle: f32,
    pub damage: f32,
    pub crit: bool,
}

#[derive(Debug, Clone)]
pub struct Ship {
    pub pos: Vec2,
    pub radius: f32,
    /// Facing (radians), tracks the pointer
    pub angle: f32,
    pub rest_y: f32,
    pub motion: ShipMotion,
    pub health: f32,
    pub max_health: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub dash: DashState,
    pub shield: Option<TimedEffect>,
    pub speed_boost: Option<TimedEffect>,
    pub loadout: Loadout,
    pub cannon_ready_in_ms: f32,
    pub missile_ready_in_ms: f32,
    /// Moved or dashed this frame (drives thruster sparks)
    pub thrusting: bool,
}

impl Ship {
    /// New ship below the bottom edge, about to fly in
    pub fn new(loadout: Loadout, screen: Vec2, tuning: &ShipTuning) -> Self {
        Self {
            pos: Vec2::new(screen.x / 2.0, screen.y + tuning.spawn_offset),
            radius: tuning.radius,
            angle: -std::f32::consts::FRAC_PI_2,
            rest_y: screen.y - tuning.rest_offset,
            motion: ShipMotion::Entering,
            health: loadout.max_health,
            max_health: loadout.max_health,
            energy: tuning.max_energy,
            max_energy: tuning.max_energy,
            dash: DashState::Idle,
            shield: None,
            speed_boost: None,
            loadout,
            cannon_ready_in_ms: 0.0,
            missile_ready_in_ms: 0.0,
            thrusting: false,
        }
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.dash, DashState::Dashing { .. })
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// 0 when no shield is up
    pub fn shield_charge(&self, tuning: &ShipTuning) -> f32 {
        if self.shield.is_some() {
            tuning.shield_charge
        } else {
            0.0
        }
    }

    /// Base speed with any active boost applied
    pub fn current_speed(&self, tuning: &ShipTuning) -> f32 {
        match self.speed_boost {
            Some(_) => self.loadout.speed * tuning.speed_boost_multiplier,
            None => self.loadout.speed,
        }
    }

    pub fn activate_shield(&mut self, tuning: &ShipTuning) {
        if self.shield.is_some() {
            log::debug!("Shield restarted");
        } else {
            log::info!("Shield activated");
        }
        self.shield = Some(TimedEffect::new(tuning.shield_duration_ms));
    }

    pub fn activate_speed_boost(&mut self, tuning: &ShipTuning) {
        if self.speed_boost.is_some() {
            log::debug!("Speed boost restarted");
        } else {
            log::info!("Speed boost activated");
        }
        self.speed_boost = Some(TimedEffect::new(tuning.speed_boost_duration_ms));
    }

    /// Subtract damage; returns true if the ship is now dead
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        !self.is_alive()
    }

    /// Advance one frame and return the shots fired
    pub fn update(
        &mut self,
        dt_ms: f32,
        input: &FrameInput,
        screen_width: f32,
        tuning: &ShipTuning,
        rng: &mut impl Rng,
    ) -> Vec<Shot> {
        let dt = dt_ms / 1000.0;
        self.cannon_ready_in_ms = (self.cannon_ready_in_ms - dt_ms).max(0.0);
        self.missile_ready_in_ms = (self.missile_ready_in_ms - dt_ms).max(0.0);
        self.tick_effects(dt_ms);

        if self.motion == ShipMotion::Entering {
            self.pos.y -= tuning.entry_speed * dt;
            if self.pos.y <= self.rest_y {
                self.pos.y = self.rest_y;
                self.motion = ShipMotion::Flying;
            }
            self.thrusting = true;
            return Vec::new();
        }

        self.energy = (self.energy + tuning.energy_regen * dt).min(self.max_energy);
        self.angle = vec_angle(input.pointer - self.pos);

        let mut shots = Vec::new();
        if input.fire_cannon {
            self.fire_cannon(tuning, rng, &mut shots);
        }
        if input.fire_missile {
            self.fire_missile(tuning, rng, &mut shots);
        }

        if input.dash && !self.is_dashing() && self.energy >= tuning.dash_cost {
            self.energy -= tuning.dash_cost;
            self.dash = DashState::Dashing {
                remaining_ms: tuning.dash_duration_ms,
            };
        }

        let mut speed = self.current_speed(tuning);
        if let DashState::Dashing { remaining_ms } = self.dash {
            speed *= tuning.dash_speed_multiplier;
            let remaining_ms = remaining_ms - dt_ms;
            self.dash = if remaining_ms <= 0.0 {
                DashState::Idle
            } else {
                DashState::Dashing { remaining_ms }
            };
        }

        let vx = input.move_axis.clamp(-1.0, 1.0) * speed;
        let max_x = (screen_width - self.radius).max(self.radius);
        self.pos.x = (self.pos.x + vx * dt).clamp(self.radius, max_x);
        self.pos.y = self.rest_y;
        self.thrusting = vx != 0.0 || self.is_dashing();

        shots
    }

    fn tick_effects(&mut self, dt_ms: f32) {
        if self.shield.as_mut().is_some_and(|s| s.tick(dt_ms)) {
            self.shield = None;
            log::info!("Shield deactivated");
        }
        if self.speed_boost.as_mut().is_some_and(|s| s.tick(dt_ms)) {
            self.speed_boost = None;
            log::info!("Speed boost deactivated");
        }
    }

    /// Damage for one trigger pull, with the crit roll
    fn roll_damage(&self, rng: &mut impl Rng) -> (f32, bool) {
        let base = self.loadout.damage * self.loadout.damage_amp;
        if rng.random::<f32>() < self.loadout.crit_chance {
            (base * 2.0, true)
        } else {
            (base, false)
        }
    }

    fn fire_cannon(&mut self, tuning: &ShipTuning, rng: &mut impl Rng, shots: &mut Vec<Shot>) {
        if self.cannon_ready_in_ms > 0.0 {
            return;
        }
        let (damage, crit) = self.roll_damage(rng);
        let behavior = if self.loadout.ricochet_bounces > 0 {
            Behavior::Ricochet {
                bounces_left: self.loadout.ricochet_bounces,
            }
        } else {
            Behavior::Normal
        };

        let count = 1 + self.loadout.multishot;
        let center = (count - 1) as f32 / 2.0;
        for i in 0..count {
            shots.push(Shot {
                kind: ProjectileKind::Cannon,
                behavior,
                pos: self.pos,
                angle: self.angle + (i as f32 - center) * tuning.multishot_spread,
                damage,
                crit,
            });
        }
        self.cannon_ready_in_ms = self.loadout.fire_interval_ms;
    }

    fn fire_missile(&mut self, tuning: &ShipTuning, rng: &mut impl Rng, shots: &mut Vec<Shot>) {
        if self.missile_ready_in_ms > 0.0 {
            return;
        }
        let (damage, crit) = self.roll_damage(rng);
        shots.push(Shot {
            kind: ProjectileKind::Missile,
            behavior: Behavior::Tracking,
            pos: self.pos,
            angle: self.angle,
            damage,
            crit,
        });
        self.missile_ready_in_ms = tuning.missile_cooldown_ms;
    }
}
