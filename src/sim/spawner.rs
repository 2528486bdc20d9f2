//! Procedural obstacle spawning
//!
//! A countdown drives spawn attempts. Each attempt draws one value against
//! cumulative probability bands derived from the level, validates spacing
//! against recent spawns and schedules the next attempt with an exponential
//! speed-up by level.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::obstacle::{Obstacle, ObstacleKind, ObstacleVariant};
use super::state::SimulationContext;
use crate::consts::*;
use crate::tuning::Tuning;

/// Draws below this become a bolt box while the level quota lasts
pub const BOLT_BOX_CHANCE: f32 = 0.15;
/// Fixed-width wolf band on top of the medium band
pub const WOLF_BAND: f32 = 0.05;
/// New obstacles appear this far past the right edge of the view
pub const SPAWN_AHEAD: f32 = 50.0;
/// Delay before the first attempt of a run
pub const INITIAL_SPAWN_DELAY: f32 = 60.0;

pub fn boss_chance(level: u32) -> f32 {
    (0.02 + (level as f32 - 1.0) * 0.01).min(0.15)
}

/// Cumulative upper bounds, in selection order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBands {
    pub boss: f32,
    pub flying: f32,
    pub medium: f32,
    pub wolf: f32,
    pub human: f32,
    pub skeleton: f32,
    pub tesla: f32,
    pub frankenstein: f32,
    pub rock: f32,
}

impl SpawnBands {
    pub fn for_level(level: u32) -> Self {
        let l = level as f32;
        let boss = boss_chance(level);
        let flying = boss + (0.20 + l * 0.015).min(0.45);
        let medium = flying + (0.10 + l * 0.01).min(0.20);
        let human = medium + (0.05 + l * 0.005).min(0.10);
        // Static obstacles share whatever mass is left: 40/20/15/25
        let rest = 1.0 - human;
        Self {
            boss,
            flying,
            medium,
            wolf: medium + WOLF_BAND,
            human,
            skeleton: human + rest * 0.40,
            tesla: human + rest * 0.60,
            frankenstein: human + rest * 0.75,
            rock: human + rest,
        }
    }

    /// Thresholds paired with the type they select
    pub fn table(&self) -> [(f32, ObstacleKind); 9] {
        [
            (self.boss, ObstacleKind::AlphaWolf),
            (self.flying, ObstacleKind::Bat),
            (self.medium, ObstacleKind::Spider),
            (self.wolf, ObstacleKind::Wolf),
            (self.human, ObstacleKind::Vampire),
            (self.skeleton, ObstacleKind::Skeleton),
            (self.tesla, ObstacleKind::TeslaCoil),
            (self.frankenstein, ObstacleKind::FrankensteinTable),
            (self.rock, ObstacleKind::Rock),
        ]
    }

    /// Combined tesla + frankenstein probability
    pub fn special_hazard_chance(&self) -> f32 {
        self.frankenstein - self.skeleton
    }
}

/// Pick the obstacle type for a single uniform draw
pub fn select_kind(level: u32, roll: f32, bolt_boxes_this_level: u32) -> ObstacleKind {
    if roll < BOLT_BOX_CHANCE && bolt_boxes_this_level < MAX_BOLT_BOXES_PER_LEVEL {
        return ObstacleKind::BoltBox;
    }
    SpawnBands::for_level(level)
        .table()
        .into_iter()
        .find(|(upper, _)| roll < *upper)
        .map(|(_, kind)| kind)
        // Rounding can leave the last band just under the draw
        .unwrap_or(ObstacleKind::Rock)
}

/// Countdown between attempts, shrinking exponentially with level
pub fn calculate_spawn_timer(base_timer: f32, min_timer: f32, level: u32) -> f32 {
    let reduction = base_timer * 0.65 * (1.0 - (-(level as f32) * 0.25).exp());
    (base_timer - reduction).max(min_timer.max(base_timer * 0.25))
}

/// Vertical placement for a freshly spawned obstacle
pub fn spawn_y<R: Rng + ?Sized>(kind: ObstacleKind, rng: &mut R) -> f32 {
    let height = kind.config().height;
    match kind {
        ObstacleKind::Spider => GROUND_Y - 20.0,
        ObstacleKind::Wolf => GROUND_Y - 25.0,
        ObstacleKind::Vampire => GROUND_Y - 35.0,
        ObstacleKind::Bat => crate::draw_range(rng, 150.0, 250.0),
        ObstacleKind::TeslaCoil => 0.0,
        ObstacleKind::FrankensteinTable => GROUND_Y - height + 100.0,
        ObstacleKind::Skeleton
        | ObstacleKind::BoltBox
        | ObstacleKind::AlphaWolf
        | ObstacleKind::Rock => GROUND_Y - height,
    }
}

/// Horizontal footprint of a recent spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    pub x: f32,
    pub width: f32,
}

/// Everything an attempt needs to know about the world
#[derive(Debug, Clone, Copy)]
pub struct SpawnRequest {
    pub level: u32,
    pub time_slow_factor: f32,
    pub camera_right: f32,
    pub bolt_boxes_this_level: u32,
}

/// A validated spawn, waiting for an entity ID
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPlan {
    pub kind: ObstacleKind,
    pub pos: Vec2,
    pub variant: ObstacleVariant,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpawnOutcome {
    /// Countdown still running
    Waiting,
    Spawned(SpawnPlan),
    /// No clear spot found; backing off
    Starved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    /// Ticks until the next attempt
    pub timer: f32,
    pub base_timer: f32,
    pub min_timer: f32,
    pub min_distance: f32,
    /// Last spawn footprints, oldest first
    pub recent: VecDeque<SpawnRecord>,
}

impl Spawner {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            timer: INITIAL_SPAWN_DELAY,
            base_timer: tuning.base_spawn_timer,
            min_timer: tuning.min_spawn_timer,
            min_distance: tuning.min_spawn_distance,
            recent: VecDeque::with_capacity(SPAWN_HISTORY),
        }
    }

    /// True if `[x, x+width]` keeps its distance from every recent spawn
    ///
    /// Both intervals are padded by the minimum distance.
    pub fn is_clear(&self, x: f32, width: f32) -> bool {
        let d = self.min_distance;
        self.recent.iter().all(|r| {
            let overlaps = x - d < r.x + r.width + d && x + width + d > r.x - d;
            !overlaps
        })
    }

    fn record(&mut self, x: f32, width: f32) {
        self.recent.push_back(SpawnRecord { x, width });
        while self.recent.len() > SPAWN_HISTORY {
            self.recent.pop_front();
        }
    }

    /// Run the countdown and, when due, attempt one spawn
    pub fn try_spawn<R: Rng + ?Sized>(
        &mut self,
        request: &SpawnRequest,
        dt: f32,
        rng: &mut R,
    ) -> SpawnOutcome {
        self.timer -= dt * request.time_slow_factor;
        if self.timer > 0.0 {
            return SpawnOutcome::Waiting;
        }

        let roll = crate::draw(rng);
        let kind = select_kind(request.level, roll, request.bolt_boxes_this_level);
        let width = kind.config().width;

        let mut x = request.camera_right + SPAWN_AHEAD;
        let mut found = false;
        for attempt in 0..SPAWN_ATTEMPTS {
            if self.is_clear(x, width) {
                found = true;
                break;
            }
            if attempt + 1 < SPAWN_ATTEMPTS {
                x += self.min_distance + crate::draw_range(rng, 0.0, 40.0);
            }
        }
        if !found {
            log::debug!("No room for {} after {} attempts", kind.as_str(), SPAWN_ATTEMPTS);
            self.timer = SPAWN_RETRY_TICKS;
            return SpawnOutcome::Starved;
        }

        let y = spawn_y(kind, rng);
        let variant = ObstacleVariant::for_kind(kind, y, request.level, rng);
        self.record(x, width);
        self.timer = calculate_spawn_timer(self.base_timer, self.min_timer, request.level)
            / request.time_slow_factor;

        SpawnOutcome::Spawned(SpawnPlan {
            kind,
            pos: Vec2::new(x, y),
            variant,
        })
    }

    /// Keep the screen from going empty for long
    pub fn catch_up(&mut self, visible_obstacles: usize) {
        if visible_obstacles == 0 {
            self.timer = self.timer.min(5.0);
        } else if visible_obstacles < 2 {
            self.timer = self.timer.min(30.0);
        }
    }
}

/// Spawner step of the tick: attempt, push the new obstacle, then catch up
pub fn spawn_obstacles(ctx: &mut SimulationContext, dt: f32) {
    let request = SpawnRequest {
        level: ctx.run.level,
        time_slow_factor: ctx.run.time_slow_factor,
        camera_right: ctx.camera.right_edge(),
        bolt_boxes_this_level: ctx.run.bolt_boxes_this_level,
    };

    match ctx.spawner.try_spawn(&request, dt, &mut ctx.rng) {
        SpawnOutcome::Waiting => return,
        SpawnOutcome::Starved => {}
        SpawnOutcome::Spawned(plan) => {
            if plan.kind == ObstacleKind::BoltBox {
                ctx.run.bolt_boxes_this_level += 1;
            }
            log::debug!(
                "Spawned {} at ({:.0}, {:.0})",
                plan.kind.as_str(),
                plan.pos.x,
                plan.pos.y
            );
            let id = ctx.next_entity_id();
            ctx.obstacles.push(Obstacle::new(id, plan.pos, plan.variant));
        }
    }

    let visible = ctx.visible_obstacle_count();
    ctx.spawner.catch_up(visible);
}
