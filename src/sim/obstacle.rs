//! Obstacles, monsters and electrified hazards
//!
//! Every obstacle shares a common body (position, size, health) plus a
//! per-variant payload. Hazards run an explicit four-state cycle whose
//! transitions are a pure function of (kind, state).

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::events::{GameEvent, SoundEffect};
use super::state::SimulationContext;
use crate::consts::*;

/// Obstacle types (payload-free, for tables and matching)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Skeleton,
    Bat,
    Vampire,
    Spider,
    Wolf,
    /// The boss
    AlphaWolf,
    Rock,
    /// Ammo crate disguised as an obstacle
    BoltBox,
    TeslaCoil,
    FrankensteinTable,
}

/// Static per-type properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleConfig {
    pub width: f32,
    pub height: f32,
    pub health: u32,
    /// Points for destroying it at level 1
    pub base_points: u32,
}

/// Health given to hazards; never reduced since bullets ignore them
pub const INDESTRUCTIBLE_HEALTH: u32 = 999;

impl ObstacleKind {
    pub fn config(&self) -> ObstacleConfig {
        let (width, height, health, base_points) = match self {
            ObstacleKind::Skeleton => (30.0, 50.0, 2, 15),
            ObstacleKind::Bat => (32.0, 20.0, 1, 20),
            ObstacleKind::Vampire => (30.0, 35.0, 3, 30),
            ObstacleKind::Spider => (36.0, 20.0, 1, 20),
            ObstacleKind::Wolf => (50.0, 25.0, 2, 25),
            ObstacleKind::AlphaWolf => (70.0, 45.0, 6, 100),
            ObstacleKind::Rock => (40.0, 30.0, 4, 5),
            ObstacleKind::BoltBox => (30.0, 30.0, 1, 5),
            ObstacleKind::TeslaCoil => (40.0, 60.0, INDESTRUCTIBLE_HEALTH, 0),
            ObstacleKind::FrankensteinTable => (80.0, 40.0, INDESTRUCTIBLE_HEALTH, 0),
        };
        ObstacleConfig {
            width,
            height,
            health,
            base_points,
        }
    }

    /// Never drift with the scroll
    pub fn is_stationary(&self) -> bool {
        matches!(
            self,
            ObstacleKind::Rock
                | ObstacleKind::BoltBox
                | ObstacleKind::TeslaCoil
                | ObstacleKind::FrankensteinTable
        )
    }

    pub fn is_boss(&self) -> bool {
        *self == ObstacleKind::AlphaWolf
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Skeleton => "skeleton",
            ObstacleKind::Bat => "bat",
            ObstacleKind::Vampire => "vampire",
            ObstacleKind::Spider => "spider",
            ObstacleKind::Wolf => "wolf",
            ObstacleKind::AlphaWolf => "alphaWolf",
            ObstacleKind::Rock => "rock",
            ObstacleKind::BoltBox => "boltBox",
            ObstacleKind::TeslaCoil => "teslaCoil",
            ObstacleKind::FrankensteinTable => "frankensteinTable",
        }
    }
}

/// Which hazard a cycle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardKind {
    /// Hangs from the ceiling, beam goes down to the ground
    Tesla,
    /// Sits on the ground, beam goes up to the ceiling
    Frankenstein,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardState {
    Idle,
    Charging,
    Zapping,
    Cooldown,
}

/// Side effect of a hazard transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardEffect {
    BeamOn,
    BeamOff,
}

/// Transition table for the hazard cycle
///
/// Tesla coils loop charging → zapping → cooldown → charging; Frankenstein
/// tables rest in idle after cooling down.
pub fn hazard_transition(kind: HazardKind, state: HazardState) -> (HazardState, Option<HazardEffect>) {
    match (kind, state) {
        (_, HazardState::Idle) => (HazardState::Charging, None),
        (_, HazardState::Charging) => (HazardState::Zapping, Some(HazardEffect::BeamOn)),
        (_, HazardState::Zapping) => (HazardState::Cooldown, Some(HazardEffect::BeamOff)),
        (HazardKind::Tesla, HazardState::Cooldown) => (HazardState::Charging, None),
        (HazardKind::Frankenstein, HazardState::Cooldown) => (HazardState::Idle, None),
    }
}

pub const HAZARD_CHARGE_TIME: f32 = 120.0;
pub const HAZARD_ZAP_DURATION: f32 = 120.0;
pub const HAZARD_COOLDOWN: f32 = 120.0;

/// Electrified hazard state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardCycle {
    pub kind: HazardKind,
    pub state: HazardState,
    /// Ticks spent in the current state
    pub state_timer: f32,
    pub charge_time: f32,
    pub zap_duration: f32,
    pub cooldown: f32,
    pub zap_active: bool,
    pub is_permanent: bool,
    pub is_indestructible: bool,
}

impl HazardCycle {
    /// New hazards start charging, never idle
    pub fn new(kind: HazardKind) -> Self {
        Self {
            kind,
            state: HazardState::Charging,
            state_timer: 0.0,
            charge_time: HAZARD_CHARGE_TIME,
            zap_duration: HAZARD_ZAP_DURATION,
            cooldown: HAZARD_COOLDOWN,
            zap_active: false,
            is_permanent: true,
            is_indestructible: true,
        }
    }

    /// How long the given state lasts (idle rests as long as a cooldown)
    pub fn duration(&self, state: HazardState) -> f32 {
        match state {
            HazardState::Idle | HazardState::Cooldown => self.cooldown,
            HazardState::Charging => self.charge_time,
            HazardState::Zapping => self.zap_duration,
        }
    }

    /// Advance the timer, returning the side effect of any transition taken
    pub fn advance(&mut self, dt: f32) -> Option<HazardEffect> {
        self.state_timer += dt;
        if self.state_timer < self.duration(self.state) {
            return None;
        }
        let (next, effect) = hazard_transition(self.kind, self.state);
        self.state = next;
        self.state_timer = 0.0;
        match effect {
            Some(HazardEffect::BeamOn) => self.zap_active = true,
            Some(HazardEffect::BeamOff) => self.zap_active = false,
            None => {}
        }
        effect
    }

    pub fn beam_live(&self) -> bool {
        self.state == HazardState::Zapping && self.zap_active
    }

    /// Where the lightning leaves the hazard
    pub fn emission_point(&self, pos: Vec2, size: Vec2) -> Vec2 {
        match self.kind {
            HazardKind::Tesla => Vec2::new(pos.x + size.x / 2.0, pos.y + size.y),
            HazardKind::Frankenstein => Vec2::new(pos.x + size.x / 2.0, pos.y),
        }
    }

    /// Damaging column while the beam is live
    pub fn beam_rect(&self, pos: Vec2, size: Vec2) -> Rect {
        let center_x = pos.x + size.x / 2.0;
        match self.kind {
            HazardKind::Tesla => {
                let top = pos.y + size.y;
                Rect::new(center_x - 8.0, top, 16.0, (GROUND_Y - top).max(0.0))
            }
            HazardKind::Frankenstein => Rect::new(center_x - 12.0, 0.0, 24.0, pos.y.max(0.0)),
        }
    }

    /// Far end of the beam, opposite the emission point
    fn beam_end(&self, pos: Vec2, size: Vec2) -> Vec2 {
        match self.kind {
            HazardKind::Tesla => Vec2::new(pos.x + size.x / 2.0, GROUND_Y),
            HazardKind::Frankenstein => Vec2::new(pos.x + size.x / 2.0, 0.0),
        }
    }
}

/// The alpha wolf's periodic hop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WolfJump {
    pub vertical_movement: f32,
    pub jump_timer: f32,
    pub original_y: f32,
}

pub const WOLF_JUMP_VELOCITY: f32 = -5.0;
pub const WOLF_GRAVITY: f32 = 0.5;

/// Ticks between hops; level scaling bottoms out at the floor
pub fn wolf_jump_frequency(level: u32) -> f32 {
    (60.0 - level as f32 * 5.0).max(60.0)
}

impl WolfJump {
    pub fn new<R: Rng + ?Sized>(original_y: f32, level: u32, rng: &mut R) -> Self {
        Self {
            vertical_movement: 0.0,
            jump_timer: Self::next_timer(level, rng),
            original_y,
        }
    }

    fn next_timer<R: Rng + ?Sized>(level: u32, rng: &mut R) -> f32 {
        let freq = wolf_jump_frequency(level);
        crate::draw(rng) * 2.0 * freq + freq
    }

    /// Integrate one tick and return the new y
    pub fn step<R: Rng + ?Sized>(&mut self, y: f32, level: u32, slow: f32, dt: f32, rng: &mut R) -> f32 {
        let resting = y >= self.original_y && self.vertical_movement == 0.0;
        if resting {
            self.jump_timer -= dt;
            if self.jump_timer <= 0.0 {
                self.vertical_movement = WOLF_JUMP_VELOCITY;
                self.jump_timer = Self::next_timer(level, rng);
            } else {
                return self.original_y;
            }
        }

        let mut y = y + self.vertical_movement * slow * dt;
        self.vertical_movement += WOLF_GRAVITY * slow * dt;
        if y >= self.original_y {
            y = self.original_y;
            self.vertical_movement = 0.0;
        }
        y
    }
}

pub const BAT_BOB_AMPLITUDE: f32 = 20.0;
pub const BAT_BOB_SPEED: f32 = 3.0;

/// Per-variant payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObstacleVariant {
    Skeleton,
    Bat { phase: f32, base_y: f32 },
    Vampire,
    Spider,
    Wolf,
    AlphaWolf(WolfJump),
    Rock,
    BoltBox,
    TeslaCoil(HazardCycle),
    FrankensteinTable(HazardCycle),
}

impl ObstacleVariant {
    pub fn kind(&self) -> ObstacleKind {
        match self {
            ObstacleVariant::Skeleton => ObstacleKind::Skeleton,
            ObstacleVariant::Bat { .. } => ObstacleKind::Bat,
            ObstacleVariant::Vampire => ObstacleKind::Vampire,
            ObstacleVariant::Spider => ObstacleKind::Spider,
            ObstacleVariant::Wolf => ObstacleKind::Wolf,
            ObstacleVariant::AlphaWolf(_) => ObstacleKind::AlphaWolf,
            ObstacleVariant::Rock => ObstacleKind::Rock,
            ObstacleVariant::BoltBox => ObstacleKind::BoltBox,
            ObstacleVariant::TeslaCoil(_) => ObstacleKind::TeslaCoil,
            ObstacleVariant::FrankensteinTable(_) => ObstacleKind::FrankensteinTable,
        }
    }

    /// Attach the type-specific starting state
    pub fn for_kind<R: Rng + ?Sized>(kind: ObstacleKind, y: f32, level: u32, rng: &mut R) -> Self {
        match kind {
            ObstacleKind::Skeleton => ObstacleVariant::Skeleton,
            ObstacleKind::Bat => ObstacleVariant::Bat {
                phase: crate::draw(rng) * std::f32::consts::TAU,
                base_y: y,
            },
            ObstacleKind::Vampire => ObstacleVariant::Vampire,
            ObstacleKind::Spider => ObstacleVariant::Spider,
            ObstacleKind::Wolf => ObstacleVariant::Wolf,
            ObstacleKind::AlphaWolf => ObstacleVariant::AlphaWolf(WolfJump::new(y, level, rng)),
            ObstacleKind::Rock => ObstacleVariant::Rock,
            ObstacleKind::BoltBox => ObstacleVariant::BoltBox,
            ObstacleKind::TeslaCoil => ObstacleVariant::TeslaCoil(HazardCycle::new(HazardKind::Tesla)),
            ObstacleKind::FrankensteinTable => {
                ObstacleVariant::FrankensteinTable(HazardCycle::new(HazardKind::Frankenstein))
            }
        }
    }
}

/// An obstacle entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Top-left corner in world space
    pub pos: Vec2,
    pub size: Vec2,
    /// Set once when the right edge crosses the player's left edge
    pub passed: bool,
    pub health: u32,
    pub max_health: u32,
    pub animation_time: f32,
    pub variant: ObstacleVariant,
}

impl Obstacle {
    pub fn new(id: u32, pos: Vec2, variant: ObstacleVariant) -> Self {
        let config = variant.kind().config();
        Self {
            id,
            pos,
            size: Vec2::new(config.width, config.height),
            passed: false,
            health: config.health,
            max_health: config.health,
            animation_time: 0.0,
            variant,
        }
    }

    pub fn kind(&self) -> ObstacleKind {
        self.variant.kind()
    }

    pub fn hazard(&self) -> Option<&HazardCycle> {
        match &self.variant {
            ObstacleVariant::TeslaCoil(h) | ObstacleVariant::FrankensteinTable(h) => Some(h),
            _ => None,
        }
    }

    pub fn hazard_mut(&mut self) -> Option<&mut HazardCycle> {
        match &mut self.variant {
            ObstacleVariant::TeslaCoil(h) | ObstacleVariant::FrankensteinTable(h) => Some(h),
            _ => None,
        }
    }

    /// Bullets pass straight through indestructible hazards
    pub fn is_indestructible(&self) -> bool {
        self.hazard().is_some_and(|h| h.is_indestructible)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    /// Forgiving hitbox used against the player (80% on each axis, centered)
    pub fn hitbox(&self) -> Rect {
        self.bounds().shrunk(0.2)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn right_edge(&self) -> f32 {
        self.pos.x + self.size.x
    }

    /// Beam rectangle if this is a hazard with a live beam
    pub fn live_beam(&self) -> Option<Rect> {
        self.hazard()
            .filter(|h| h.beam_live())
            .map(|h| h.beam_rect(self.pos, self.size))
    }
}

/// Advance every obstacle one tick: drift, per-type behavior, passing awards
/// and off-screen culling
pub fn update_obstacles(ctx: &mut SimulationContext, dt: f32) {
    let drift = ctx.run.game_speed * ctx.run.enemy_slow_factor * 0.7 * dt;
    let slow = ctx.run.enemy_slow_factor;
    let level = ctx.run.level;
    let magnet_range = ctx.run.magnet_range;
    let player_left = ctx.player.pos.x;
    let player_center = ctx.player.center();
    let time_secs = ctx.time_ticks as f32 / TICKS_PER_SECOND;

    for obstacle in ctx.obstacles.iter_mut() {
        let kind = obstacle.kind();
        obstacle.animation_time += dt;

        if !kind.is_stationary() {
            obstacle.pos.x -= drift;
        }

        let (pos, size) = (obstacle.pos, obstacle.size);
        match &mut obstacle.variant {
            ObstacleVariant::Bat { phase, base_y } => {
                obstacle.pos.y =
                    *base_y + (time_secs * BAT_BOB_SPEED + *phase).sin() * BAT_BOB_AMPLITUDE;
            }
            ObstacleVariant::AlphaWolf(jump) => {
                obstacle.pos.y = jump.step(pos.y, level, slow, dt, &mut ctx.rng);
            }
            ObstacleVariant::TeslaCoil(hazard) | ObstacleVariant::FrankensteinTable(hazard) => {
                if hazard.advance(dt) == Some(HazardEffect::BeamOn) {
                    ctx.events.push(GameEvent::Lightning {
                        from: hazard.emission_point(pos, size),
                        to: hazard.beam_end(pos, size),
                    });
                    ctx.events.push(GameEvent::Sound(SoundEffect::Zap));
                }
            }
            ObstacleVariant::BoltBox if magnet_range > 0.0 => {
                let to_player = player_center - (pos + size * 0.5);
                let distance = to_player.length();
                if distance > 0.0 && distance < magnet_range {
                    let strength = (magnet_range - distance) / magnet_range;
                    obstacle.pos += to_player * strength * 0.5 * 0.2 * dt;
                    obstacle.pos.y = obstacle.pos.y.min(GROUND_Y - size.y);
                }
            }
            _ => {}
        }

        if !obstacle.passed && obstacle.right_edge() < player_left {
            obstacle.passed = true;
            let run = &mut ctx.run;
            run.score += run.scaled(10.0);
            run.obstacles_avoided += 1;
            run.add_progress(PROGRESS_PER_AVOID);
            run.add_combo();
            if run.obstacles_avoided.is_multiple_of(10) {
                run.bullets += AVOID_AMMO_BONUS;
            }
        }
    }

    // Mark-and-compact culling, permanent hazards included
    let cull_x = ctx.camera.left_edge() - OFFSCREEN_MARGIN;
    ctx.obstacles.retain(|o| o.right_edge() >= cull_x);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRng;

    fn place(ctx: &mut SimulationContext, kind: ObstacleKind, x: f32) -> u32 {
        let config = kind.config();
        let y = GROUND_Y - config.height;
        let variant = ObstacleVariant::for_kind(kind, y, 1, &mut ctx.rng);
        let id = ctx.next_entity_id();
        ctx.obstacles.push(Obstacle::new(id, Vec2::new(x, y), variant));
        id
    }

    #[test]
    fn test_hazard_transition_table() {
        use HazardState::*;
        assert_eq!(hazard_transition(HazardKind::Tesla, Charging), (Zapping, Some(HazardEffect::BeamOn)));
        assert_eq!(hazard_transition(HazardKind::Tesla, Zapping), (Cooldown, Some(HazardEffect::BeamOff)));
        assert_eq!(hazard_transition(HazardKind::Tesla, Cooldown), (Charging, None));
        assert_eq!(hazard_transition(HazardKind::Frankenstein, Cooldown), (Idle, None));
        assert_eq!(hazard_transition(HazardKind::Frankenstein, Idle), (Charging, None));
    }

    #[test]
    fn test_hazard_zaps_after_charge_time() {
        let mut cycle = HazardCycle::new(HazardKind::Tesla);
        for _ in 0..119 {
            assert_eq!(cycle.advance(1.0), None);
        }
        assert_eq!(cycle.advance(1.0), Some(HazardEffect::BeamOn));
        assert!(cycle.beam_live());
        for _ in 0..119 {
            cycle.advance(1.0);
        }
        assert_eq!(cycle.advance(1.0), Some(HazardEffect::BeamOff));
        assert_eq!(cycle.state, HazardState::Cooldown);
        assert!(!cycle.zap_active);
    }

    #[test]
    fn test_stationary_types_do_not_drift() {
        let mut ctx = SimulationContext::new(1);
        ctx.reset_game(0);
        let rock = place(&mut ctx, ObstacleKind::Rock, 600.0);
        let skeleton = place(&mut ctx, ObstacleKind::Skeleton, 600.0);
        update_obstacles(&mut ctx, 1.0);
        let find = |id| ctx.obstacles.iter().find(|o| o.id == id).unwrap().pos.x;
        assert_eq!(find(rock), 600.0);
        let expected = 600.0 - ctx.run.game_speed * 0.7;
        assert!((find(skeleton) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_passing_awards_once() {
        let mut ctx = SimulationContext::new(1);
        ctx.reset_game(0);
        // Right edge already behind the player's left edge
        let x = ctx.player.pos.x - 45.0;
        place(&mut ctx, ObstacleKind::Rock, x);
        update_obstacles(&mut ctx, 1.0);
        assert_eq!(ctx.run.score, 10);
        assert_eq!(ctx.run.obstacles_avoided, 1);
        assert_eq!(ctx.run.level_progress, 2.0);
        update_obstacles(&mut ctx, 1.0);
        assert_eq!(ctx.run.score, 10);
        assert_eq!(ctx.run.obstacles_avoided, 1);
    }

    #[test]
    fn test_every_tenth_avoid_grants_ammo() {
        let mut ctx = SimulationContext::new(1);
        ctx.reset_game(0);
        ctx.run.obstacles_avoided = 9;
        let ammo = ctx.run.bullets;
        let x = ctx.player.pos.x - 45.0;
        place(&mut ctx, ObstacleKind::Rock, x);
        update_obstacles(&mut ctx, 1.0);
        assert_eq!(ctx.run.bullets, ammo + AVOID_AMMO_BONUS);
    }

    #[test]
    fn test_hazards_culled_only_off_screen() {
        let mut ctx = SimulationContext::new(1);
        ctx.reset_game(0);
        place(&mut ctx, ObstacleKind::TeslaCoil, 10.0);
        ctx.camera.x = 100.0;
        update_obstacles(&mut ctx, 1.0);
        assert_eq!(ctx.obstacles.len(), 1);
        ctx.camera.x = 151.0;
        update_obstacles(&mut ctx, 1.0);
        assert!(ctx.obstacles.is_empty());
    }

    #[test]
    fn test_wolf_hops_and_lands() {
        let mut rng = ScriptedRng::new(&[0.0]);
        let mut jump = WolfJump::new(300.0, 1, &mut rng);
        assert_eq!(jump.jump_timer, 60.0);
        let mut y = 300.0;
        for _ in 0..60 {
            y = jump.step(y, 1, 1.0, 1.0, &mut rng);
        }
        assert!(y < 300.0);
        let mut airborne = 0;
        while y < 300.0 {
            y = jump.step(y, 1, 1.0, 1.0, &mut rng);
            airborne += 1;
            assert!(airborne < 100);
        }
        assert_eq!(y, 300.0);
        assert_eq!(jump.vertical_movement, 0.0);
    }

    #[test]
    fn test_wolf_frequency_floor() {
        assert_eq!(wolf_jump_frequency(1), 60.0);
        assert_eq!(wolf_jump_frequency(20), 60.0);
    }

    #[test]
    fn test_magnet_pulls_bolt_box() {
        let mut ctx = SimulationContext::new(1);
        ctx.reset_game(0);
        ctx.run.magnet_range = 200.0;
        let x = ctx.player.pos.x + 120.0;
        let id = place(&mut ctx, ObstacleKind::BoltBox, x);
        let before = ctx.obstacles[0].pos.x;
        update_obstacles(&mut ctx, 1.0);
        let after = ctx.obstacles.iter().find(|o| o.id == id).unwrap();
        assert!(after.pos.x < before);
        assert!(after.pos.y <= GROUND_Y - after.size.y);
    }
}
