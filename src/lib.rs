//! Crypt Runner - a side-scrolling dungeon runner/shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, combat, collisions, run state)
//! - `platform`: Frame clock and input translation
//! - `persistence`: Versioned save/restore of a full simulation snapshot
//! - `tuning`: Data-driven game balance
//! - `highscores` / `achievements`: Collaborators the simulation calls out to

pub mod achievements;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use achievements::{AchievementTracker, Unlocks};
pub use highscores::HighScores;
pub use tuning::Tuning;

use rand::Rng;

/// Game configuration constants
///
/// All durations are in ticks of the normalized 60 Hz frame.
pub mod consts {
    /// Simulation rate the normalized delta is expressed in
    pub const TICKS_PER_SECOND: f32 = 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Viewport
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 400.0;
    pub const GROUND_Y: f32 = 350.0;
    /// Where the camera keeps the player on screen
    pub const PLAYER_SCREEN_X: f32 = 150.0;
    /// Entities further than this outside the viewport are culled
    pub const OFFSCREEN_MARGIN: f32 = 100.0;

    /// Player body
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;
    pub const PLAYER_MOVE_SPEED: f32 = 3.0;
    pub const GRAVITY: f32 = 0.6;
    pub const JUMP_POWER: f32 = -12.0;
    pub const DOUBLE_JUMP_POWER: f32 = -10.0;
    pub const TRIPLE_JUMP_POWER: f32 = -9.0;
    /// Ticks the jump button may be held for extra height
    pub const MAX_JUMP_HOLD: f32 = 15.0;
    pub const JUMP_HOLD_BOOST: f32 = 0.3;
    pub const DAMAGE_RESISTANCE_TIME: f32 = 60.0;

    /// Bullets
    pub const BULLET_SPEED: f32 = 10.0;
    pub const BULLET_WIDTH: f32 = 8.0;
    pub const BULLET_HEIGHT: f32 = 4.0;
    /// Vertical offset between chain-lightning fan bullets
    pub const FAN_OFFSET: f32 = 8.0;

    /// Run state
    pub const MAX_LIVES_CAP: u32 = 5;
    pub const COMBO_WINDOW: f32 = 300.0;
    pub const POST_DAMAGE_INVULNERABILITY: f32 = 60.0;
    pub const POST_BUFF_INVULNERABILITY: f32 = 120.0;
    pub const LEVEL_SPEED_RAMP: f32 = 1.1;
    pub const PROGRESS_PER_AVOID: f32 = 2.0;
    pub const PROGRESS_PER_KILL: f32 = 3.0;
    pub const LEVEL_PROGRESS_GOAL: f32 = 100.0;
    /// Rolling window for the "recent score" counter (30 seconds)
    pub const RECENT_SCORE_WINDOW: u64 = 30 * 60;

    /// Spawning
    pub const MAX_BOLT_BOXES_PER_LEVEL: u32 = 4;
    pub const SPAWN_HISTORY: usize = 10;
    pub const SPAWN_ATTEMPTS: u32 = 5;
    pub const SPAWN_RETRY_TICKS: f32 = 300.0;

    /// Pickups
    pub const BOLT_BOX_AMMO: u32 = 10;
    pub const MEGA_AMMO: u32 = 15;
    pub const AVOID_AMMO_BONUS: u32 = 5;
}

/// Uniform draw in [0, 1)
///
/// Every random decision in the simulation goes through this so a scripted
/// RNG can force exact outcomes.
#[inline]
pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.random::<f32>()
}

/// Uniform draw in [min, max)
#[inline]
pub fn draw_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + draw(rng) * (max - min)
}
