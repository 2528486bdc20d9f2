//! Game state and core simulation types
//!
//! Everything that must survive a save/restore lives in [`SimulationContext`].
//! Collaborator events are the only thing deliberately left out of snapshots.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combat::Bullet;
use super::drops::{Pickup, TimedBuffs};
use super::events::GameEvent;
use super::obstacle::Obstacle;
use super::spawner::Spawner;
use crate::achievements::Unlocks;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulated yet
    Start,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Waiting for the player to pick a permanent power
    LevelComplete,
    /// Run ended
    GameOver,
}

/// Permanent powers offered between levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerId {
    /// Fire a three-bullet fan of enhanced bullets
    ChainLightning,
    /// Life regen needs 10 kills instead of 15
    UndeadResilience,
    /// Stronger jumps
    ShadowLeap,
    /// Bullets are fired piercing
    SilverBullets,
    /// Grants a shield the moment it is chosen
    GraveWard,
}

impl PowerId {
    pub const ALL: [PowerId; 5] = [
        PowerId::ChainLightning,
        PowerId::UndeadResilience,
        PowerId::ShadowLeap,
        PowerId::SilverBullets,
        PowerId::GraveWard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerId::ChainLightning => "chainLightning",
            PowerId::UndeadResilience => "undeadResilience",
            PowerId::ShadowLeap => "shadowLeap",
            PowerId::SilverBullets => "silverBullets",
            PowerId::GraveWard => "graveWard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str().eq_ignore_ascii_case(s))
    }
}

/// Powers unlocked for the rest of the run (at most one instance each)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentBuffs(BTreeSet<PowerId>);

impl PermanentBuffs {
    pub fn contains(&self, power: PowerId) -> bool {
        self.0.contains(&power)
    }

    /// Returns false if the power was already active
    pub fn insert(&mut self, power: PowerId) -> bool {
        self.0.insert(power)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PowerId> + '_ {
        self.0.iter().copied()
    }
}

/// Score, lives, counters and modifiers for one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    pub lives: u32,
    pub max_lives: u32,
    /// Ammo; ignored while berserker
    pub bullets: u32,
    pub level: u32,
    /// 0..=100 gauge toward the next level
    pub level_progress: f32,
    pub game_speed: f32,

    pub combo_count: u32,
    /// Ticks left before the combo resets
    pub combo_timer: f32,

    pub post_damage_invulnerability: f32,
    pub post_buff_invulnerability: f32,

    pub enemies_defeated: u32,
    pub obstacles_avoided: u32,
    /// Kills toward the next life regen; reset on damage
    pub bullets_hit: u32,
    pub consecutive_hits: u32,
    pub bosses_killed: u32,
    pub damage_this_level: u32,
    pub levels_completed: u32,
    pub bolt_boxes_this_level: u32,

    pub score_multiplier: f32,
    pub speed_multiplier: f32,
    pub magnet_range: f32,
    pub enemy_slow_factor: f32,
    pub time_slow_factor: f32,
    pub has_shield: bool,
    pub is_ghost_walking: bool,
    pub is_berserker: bool,
    /// Set by SilverBullets; bullets fired while set carry `piercing`
    pub has_piercing_bullets: bool,

    pub active_buffs: PermanentBuffs,
    /// Powers still offerable at future level-ups
    pub available_buffs: Vec<PowerId>,
    pub drop_buffs: TimedBuffs,

    /// Score earned from kills within the rolling window
    pub recent_score: u64,
    pub last_score_tick: u64,
    /// Best score loaded from persistence at run start
    pub high_score: u64,
}

impl RunState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            lives: tuning.starting_lives,
            max_lives: tuning.starting_max_lives,
            bullets: tuning.starting_ammo,
            level: 1,
            level_progress: 0.0,
            game_speed: tuning.base_game_speed,
            combo_count: 0,
            combo_timer: 0.0,
            post_damage_invulnerability: 0.0,
            post_buff_invulnerability: 0.0,
            enemies_defeated: 0,
            obstacles_avoided: 0,
            bullets_hit: 0,
            consecutive_hits: 0,
            bosses_killed: 0,
            damage_this_level: 0,
            levels_completed: 0,
            bolt_boxes_this_level: 0,
            score_multiplier: 1.0,
            speed_multiplier: 1.0,
            magnet_range: 0.0,
            enemy_slow_factor: 1.0,
            time_slow_factor: 1.0,
            has_shield: false,
            is_ghost_walking: false,
            is_berserker: false,
            has_piercing_bullets: false,
            active_buffs: PermanentBuffs::default(),
            available_buffs: PowerId::ALL.to_vec(),
            drop_buffs: TimedBuffs::default(),
            recent_score: 0,
            last_score_tick: 0,
            high_score: 0,
        }
    }

    pub fn has_power(&self, power: PowerId) -> bool {
        self.active_buffs.contains(power)
    }

    /// Points scaled by the current score multiplier
    pub fn scaled(&self, base: f32) -> u64 {
        (base * self.score_multiplier).round().max(0.0) as u64
    }

    /// Bump the combo; the reset timer only runs from a combo of two up
    pub fn add_combo(&mut self) {
        self.combo_count += 1;
        if self.combo_count >= 2 {
            self.combo_timer = COMBO_WINDOW;
        }
    }

    pub fn reset_combo(&mut self) {
        self.combo_count = 0;
        self.combo_timer = 0.0;
    }

    pub fn add_progress(&mut self, amount: f32) {
        self.level_progress = (self.level_progress + amount).min(LEVEL_PROGRESS_GOAL);
    }

    /// +1 life (raising max lives up to the cap), or `bonus` points when capped
    ///
    /// Returns true if a life was granted.
    pub fn grant_life(&mut self, bonus: u64) -> bool {
        if self.lives < MAX_LIVES_CAP {
            self.lives += 1;
            if self.lives > self.max_lives {
                self.max_lives = self.lives;
            }
            true
        } else {
            self.score += bonus;
            false
        }
    }

    /// Ammo is unlimited in berserker mode
    pub fn has_ammo(&self, needed: u32) -> bool {
        self.is_berserker || self.bullets >= needed
    }

    /// Decrement per-tick counters (invulnerability windows and combo)
    pub fn tick_timers(&mut self, dt: f32) {
        if self.post_damage_invulnerability > 0.0 {
            self.post_damage_invulnerability = (self.post_damage_invulnerability - dt).max(0.0);
        }
        if self.post_buff_invulnerability > 0.0 {
            self.post_buff_invulnerability = (self.post_buff_invulnerability - dt).max(0.0);
        }
        if self.combo_timer > 0.0 {
            self.combo_timer -= dt;
            if self.combo_timer <= 0.0 {
                self.reset_combo();
            }
        }
    }
}

/// The player's runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner in world space
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub grounded: bool,
    pub jumping: bool,
    pub jump_hold_time: f32,
    pub double_jump_used: bool,
    pub triple_jump_used: bool,
    /// Ticks of damage immunity after being hit
    pub damage_resistance: f32,
    /// +1 facing right, -1 facing left
    pub facing: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_SCREEN_X, GROUND_Y - PLAYER_HEIGHT),
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            grounded: true,
            jumping: false,
            jump_hold_time: 0.0,
            double_jump_used: false,
            triple_jump_used: false,
            damage_resistance: 0.0,
            facing: 1.0,
        }
    }
}

impl Player {
    pub fn ground_y(&self) -> f32 {
        GROUND_Y - self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// One-directional horizontal scroll
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
}

impl Camera {
    /// Follow the player, never scrolling back
    pub fn follow(&mut self, player_x: f32) {
        self.x = self.x.max(player_x - PLAYER_SCREEN_X);
    }

    pub fn left_edge(&self) -> f32 {
        self.x
    }

    pub fn right_edge(&self) -> f32 {
        self.x + CANVAS_WIDTH
    }

    /// Horizontal overlap with the viewport
    pub fn is_visible(&self, x: f32, width: f32) -> bool {
        x + width > self.left_edge() && x < self.right_edge()
    }
}

/// Owns the whole simulation: run state, player, camera and every entity list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationContext {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Single random source for every gameplay draw
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub run: RunState,
    pub player: Player,
    pub camera: Camera,
    pub spawner: Spawner,
    /// Active obstacles (in spawn order)
    pub obstacles: Vec<Obstacle>,
    pub bullets: Vec<Bullet>,
    pub drops: Vec<Pickup>,
    /// Achievement unlocks feeding back into combat and drops
    pub unlocks: Unlocks,
    pub tuning: Tuning,
    /// Collaborator notifications (drained by the host each frame)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl SimulationContext {
    /// Create a context with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Start,
            time_ticks: 0,
            run: RunState::new(&tuning),
            player: Player::default(),
            camera: Camera::default(),
            spawner: Spawner::new(&tuning),
            obstacles: Vec::new(),
            bullets: Vec::new(),
            drops: Vec::new(),
            unlocks: Unlocks::default(),
            tuning,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Fully reset the run and start playing
    ///
    /// The RNG keeps its stream so consecutive runs differ; achievement
    /// unlocks and the loaded high score carry over.
    pub fn reset_game(&mut self, high_score: u64) {
        self.run = RunState::new(&self.tuning);
        self.run.high_score = high_score;
        self.player = Player::default();
        self.camera = Camera::default();
        self.spawner = Spawner::new(&self.tuning);
        self.obstacles.clear();
        self.bullets.clear();
        self.drops.clear();
        self.events.clear();
        self.time_ticks = 0;
        self.next_id = 1;
        self.phase = GamePhase::Playing;
        log::info!(
            "Run started (seed {}, high score {})",
            self.seed,
            self.run.high_score
        );
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the pending events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Obstacles currently overlapping the viewport
    pub fn visible_obstacle_count(&self) -> usize {
        self.obstacles
            .iter()
            .filter(|o| self.camera.is_visible(o.pos.x, o.size.x))
            .count()
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}
