//! Crypt Runner headless runner
//!
//! Plays a seeded run with a simple autopilot and records the score.
//!
//! Usage:
//!   crypt-runner --seed <n> --ticks <n> [--tuning <file>] [--scores <file>] [--save <file>]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;

use crypt_runner::consts::*;
use crypt_runner::persistence;
use crypt_runner::platform::input::Action;
use crypt_runner::platform::{FrameClock, InputState};
use crypt_runner::sim::{
    GameEvent, GamePhase, ObstacleKind, SimulationContext, choose_buff, tick_with,
};
use crypt_runner::{AchievementTracker, HighScores, Tuning};

/// Jump when a hostile is this close ahead of the player (pixels)
const JUMP_LOOKAHEAD: f32 = 70.0;
/// Only shoot at targets inside this range
const SHOOT_RANGE: f32 = 450.0;
/// Ticks between autopilot shots
const SHOOT_INTERVAL: u64 = 12;

#[derive(Parser)]
#[command(name = "crypt-runner")]
#[command(about = "Crypt Runner headless simulation with an autopilot player")]
struct Args {
    /// RNG seed for the run
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Maximum simulation ticks (60 per second)
    #[arg(long, default_value_t = 60 * 60 * 5)]
    ticks: u64,

    /// Balance tuning JSON file
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// High score file
    #[arg(long, default_value = "highscores.json")]
    scores: PathBuf,

    /// Write a snapshot of the final state here
    #[arg(long)]
    save: Option<PathBuf>,
}

/// Decides what to press each tick
#[derive(Default)]
struct Autopilot {
    jump_hold: u32,
}

impl Autopilot {
    fn drive(&mut self, ctx: &SimulationContext, input: &mut InputState) {
        let player = &ctx.player;
        let front = player.pos.x + player.size.x;

        let threat = ctx.obstacles.iter().any(|o| {
            let gap = o.pos.x - front;
            let dangerous = match o.kind() {
                ObstacleKind::Rock | ObstacleKind::BoltBox => false,
                // Bats fly over a grounded runner's head
                ObstacleKind::Bat => o.pos.y + o.size.y > player.pos.y + 10.0,
                _ => true,
            };
            dangerous && (-o.size.x..JUMP_LOOKAHEAD).contains(&gap)
        });

        if threat && player.grounded {
            input.press(Action::Jump);
            self.jump_hold = MAX_JUMP_HOLD as u32;
        } else if self.jump_hold > 0 {
            self.jump_hold -= 1;
            if self.jump_hold == 0 {
                input.release(Action::Jump);
            }
        }

        let target = ctx.obstacles.iter().any(|o| {
            !o.is_indestructible()
                && o.kind() != ObstacleKind::Rock
                && (0.0..SHOOT_RANGE).contains(&(o.pos.x - front))
        });
        if target && ctx.time_ticks % SHOOT_INTERVAL == 0 {
            input.press(Action::Shoot);
        }
    }
}

fn unix_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("Failed to load tuning from {}", path.display()))?,
        None => Tuning::default(),
    };
    let mut scores = HighScores::load(&args.scores).context("Failed to load high scores")?;

    let mut ctx = SimulationContext::with_tuning(args.seed, tuning);
    let mut achievements = AchievementTracker::new();
    ctx.reset_game(scores.load_high_score());

    let mut clock = FrameClock::default();
    let mut input = InputState::new();
    let mut autopilot = Autopilot::default();
    let frame_secs = 1.0 / TICKS_PER_SECOND;
    let mut level_ups = 0u32;

    while ctx.time_ticks < args.ticks && !ctx.is_game_over() {
        for _ in 0..clock.advance(frame_secs) {
            match ctx.phase {
                GamePhase::LevelComplete => {
                    if let Some(&power) = ctx.run.available_buffs.first() {
                        log::info!("Autopilot picks {}", power.as_str());
                        choose_buff(&mut ctx, power);
                    }
                }
                GamePhase::Playing => {
                    autopilot.drive(&ctx, &mut input);
                    tick_with(&mut ctx, &input.take(), clock.delta(), &mut achievements);
                }
                _ => break,
            }

            for event in ctx.drain_events() {
                match event {
                    GameEvent::LevelUp { .. } => level_ups += 1,
                    GameEvent::AchievementUnlocked { name } => {
                        log::info!("Achievement: {}", name)
                    }
                    _ => {}
                }
            }
        }
    }

    let run = &ctx.run;
    log::info!(
        "Run finished after {} ticks: score {}, level {} ({} level-ups), {} kills, {} avoided, {} lives left",
        ctx.time_ticks,
        run.score,
        run.level,
        level_ups,
        run.enemies_defeated,
        run.obstacles_avoided,
        run.lives
    );
    let powers: Vec<&str> = run.active_buffs.iter().map(|p| p.as_str()).collect();
    log::info!("Powers: [{}]", powers.join(", "));

    if let Some(rank) = scores.add_score(run.score, run.level, unix_time()) {
        log::info!("High score rank #{}", rank);
        scores.save(&args.scores).context("Failed to save high scores")?;
    }

    if let Some(path) = &args.save {
        persistence::save_to_file(&ctx, path)
            .with_context(|| format!("Failed to save snapshot to {}", path.display()))?;
    }

    Ok(())
}
