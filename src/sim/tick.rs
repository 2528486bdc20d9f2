//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation deterministically.

use serde::{Deserialize, Serialize};

use super::collision::resolve_player_collisions;
use super::combat::{shoot, update_bullets};
use super::drops::{update_drop_buffs, update_drops};
use super::events::{GameEvent, SoundEffect};
use super::level::check_level_progress;
use super::obstacle::update_obstacles;
use super::player::{MovementIntent, request_jump, update_player};
use super::spawner::spawn_obstacles;
use super::state::{GamePhase, SimulationContext};
use crate::achievements::{AchievementHook, NoAchievements};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    /// Jump pressed this tick
    pub jump: bool,
    /// Jump button held (variable jump height)
    pub jump_held: bool,
    /// Fire pressed this tick
    pub shoot: bool,
    pub left: bool,
    pub right: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    pub fn movement(&self) -> MovementIntent {
        MovementIntent {
            left: self.left,
            right: self.right,
        }
    }
}

/// Advance the simulation by one fixed timestep without achievement checks
pub fn tick(ctx: &mut SimulationContext, input: &TickInput, dt: f32) {
    tick_with(ctx, input, dt, &mut NoAchievements);
}

/// Advance the simulation by one fixed timestep
///
/// `dt` is the normalized delta (1.0 == one 60 Hz frame). Nothing advances
/// outside [`GamePhase::Playing`].
pub fn tick_with(
    ctx: &mut SimulationContext,
    input: &TickInput,
    dt: f32,
    hook: &mut dyn AchievementHook,
) {
    // Handle pause toggle
    if input.pause {
        match ctx.phase {
            GamePhase::Playing => {
                ctx.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => ctx.phase = GamePhase::Playing,
            _ => {}
        }
    }

    if ctx.phase != GamePhase::Playing {
        return;
    }

    ctx.time_ticks += 1;
    ctx.run.tick_timers(dt);

    // Player
    if input.jump {
        request_jump(&mut ctx.player, &ctx.run, &mut ctx.events);
    }
    update_player(
        &mut ctx.player,
        &mut ctx.camera,
        &ctx.run,
        input.movement(),
        input.jump_held,
        dt,
    );
    if input.shoot {
        shoot(ctx);
    }

    // World
    spawn_obstacles(ctx, dt);
    update_obstacles(ctx, dt);
    update_bullets(ctx, dt);
    update_drops(ctx, dt);

    if resolve_player_collisions(ctx) {
        end_run(ctx);
        return;
    }

    update_drop_buffs(ctx, dt);
    check_level_progress(ctx, hook);
}

fn end_run(ctx: &mut SimulationContext) {
    ctx.phase = GamePhase::GameOver;
    let score = ctx.run.score;
    let level = ctx.run.level;
    if score > ctx.run.high_score {
        log::info!("New high score: {}", score);
        ctx.run.high_score = score;
    }
    log::info!(
        "Game over at tick {}: score {}, level {}",
        ctx.time_ticks,
        score,
        level
    );
    ctx.emit(GameEvent::Sound(SoundEffect::Death));
    ctx.emit(GameEvent::GameOver { score, level });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::obstacle::{Obstacle, ObstacleVariant};
    use glam::Vec2;

    fn playing(seed: u64) -> SimulationContext {
        let mut ctx = SimulationContext::new(seed);
        ctx.reset_game(0);
        ctx
    }

    fn skeleton_on_player(ctx: &mut SimulationContext) {
        let id = ctx.next_entity_id();
        let pos = Vec2::new(ctx.player.pos.x, crate::consts::GROUND_Y - 50.0);
        ctx.obstacles
            .push(Obstacle::new(id, pos, ObstacleVariant::Skeleton));
    }

    #[test]
    fn test_start_phase_does_not_tick() {
        let mut ctx = SimulationContext::new(1);
        tick(&mut ctx, &TickInput::default(), 1.0);
        assert_eq!(ctx.time_ticks, 0);
        assert_eq!(ctx.phase, GamePhase::Start);
    }

    #[test]
    fn test_pause_toggle() {
        let mut ctx = playing(1);
        tick(&mut ctx, &TickInput::default(), 1.0);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut ctx, &pause, 1.0);
        assert_eq!(ctx.phase, GamePhase::Paused);
        let x = ctx.player.pos.x;
        for _ in 0..30 {
            tick(&mut ctx, &TickInput::default(), 1.0);
        }
        assert_eq!(ctx.player.pos.x, x);
        assert_eq!(ctx.time_ticks, 1);

        tick(&mut ctx, &pause, 1.0);
        assert_eq!(ctx.phase, GamePhase::Playing);
        assert_eq!(ctx.time_ticks, 2);
    }

    #[test]
    fn test_jump_input() {
        let mut ctx = playing(1);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut ctx, &jump, 1.0);
        assert!(!ctx.player.grounded);
        assert!(ctx.events.contains(&GameEvent::Sound(SoundEffect::Jump)));
    }

    #[test]
    fn test_shoot_input_spends_ammo() {
        let mut ctx = playing(1);
        let ammo = ctx.run.bullets;
        let fire = TickInput {
            shoot: true,
            ..Default::default()
        };
        tick(&mut ctx, &fire, 1.0);
        assert_eq!(ctx.run.bullets, ammo - 1);
        assert_eq!(ctx.bullets.len(), 1);
    }

    #[test]
    fn test_last_life_ends_run() {
        let mut ctx = playing(1);
        ctx.run.lives = 1;
        skeleton_on_player(&mut ctx);
        tick(&mut ctx, &TickInput::default(), 1.0);
        assert_eq!(ctx.phase, GamePhase::GameOver);
        assert!(ctx
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::GameOver { level: 1, .. })));

        // Terminal until reset
        let before = ctx.time_ticks;
        tick(&mut ctx, &TickInput::default(), 1.0);
        assert_eq!(ctx.time_ticks, before);
    }

    #[test]
    fn test_level_complete_halts_until_choice() {
        let mut ctx = playing(1);
        ctx.run.level_progress = 100.0;
        tick(&mut ctx, &TickInput::default(), 1.0);
        assert_eq!(ctx.phase, GamePhase::LevelComplete);
        let ticks = ctx.time_ticks;
        tick(&mut ctx, &TickInput::default(), 1.0);
        assert_eq!(ctx.time_ticks, ticks);
    }

    #[test]
    fn test_same_seed_same_run() {
        let script = |i: u64| TickInput {
            jump: i % 45 == 0,
            jump_held: i % 45 < 10,
            shoot: i % 20 == 0,
            ..Default::default()
        };
        let run = |seed: u64| {
            let mut ctx = playing(seed);
            for i in 0..1500 {
                tick(&mut ctx, &script(i), 1.0);
            }
            serde_json::to_string(&ctx).unwrap()
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn test_spawns_over_time() {
        let mut ctx = playing(5);
        for _ in 0..600 {
            tick(&mut ctx, &TickInput::default(), 1.0);
            if ctx.is_game_over() {
                break;
            }
        }
        assert!(ctx.next_entity_id() > 1);
        assert!(!ctx.obstacles.is_empty() || ctx.run.obstacles_avoided > 0 || ctx.is_game_over());
    }
}
