//! Drop rolls, pickups and timed drop buffs
//!
//! Timed drop buffs are tracked separately from the permanent powers chosen
//! at level-up. When one runs out, the run field it controls goes back to
//! its neutral value.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::events::{GameEvent, SoundEffect};
use super::obstacle::ObstacleKind;
use super::state::{RunState, SimulationContext};
use crate::consts::*;

/// Drop types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropKind {
    ExtraLife,
    MegaAmmo,
    SpeedBoost,
    JumpBoost,
    ScoreMultiplier,
    Magnet,
    BerserkerMode,
    GhostWalk,
    TimeSlow,
    Shield,
}

impl DropKind {
    /// The timed buff this drop feeds, if any
    pub fn timed_buff(&self) -> Option<TimedBuff> {
        match self {
            DropKind::SpeedBoost => Some(TimedBuff::SpeedBoost),
            DropKind::JumpBoost => Some(TimedBuff::JumpBoost),
            DropKind::ScoreMultiplier => Some(TimedBuff::ScoreMultiplier),
            DropKind::Magnet => Some(TimedBuff::Magnet),
            DropKind::BerserkerMode => Some(TimedBuff::BerserkerMode),
            DropKind::GhostWalk => Some(TimedBuff::GhostWalk),
            DropKind::TimeSlow => Some(TimedBuff::TimeSlow),
            DropKind::ExtraLife | DropKind::MegaAmmo | DropKind::Shield => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DropKind::ExtraLife => "Extra Life",
            DropKind::MegaAmmo => "Mega Ammo",
            DropKind::SpeedBoost => "Speed Boost",
            DropKind::JumpBoost => "Jump Boost",
            DropKind::ScoreMultiplier => "Score x2",
            DropKind::Magnet => "Magnet",
            DropKind::BerserkerMode => "Berserker",
            DropKind::GhostWalk => "Ghost Walk",
            DropKind::TimeSlow => "Time Slow",
            DropKind::Shield => "Shield",
        }
    }
}

/// Buffs with a remaining duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimedBuff {
    SpeedBoost,
    JumpBoost,
    ScoreMultiplier,
    Magnet,
    BerserkerMode,
    GhostWalk,
    TimeSlow,
}

impl TimedBuff {
    /// Accumulated duration never exceeds this
    pub fn cap(&self) -> f32 {
        match self {
            TimedBuff::JumpBoost => 3600.0,
            TimedBuff::GhostWalk | TimedBuff::TimeSlow => 1200.0,
            TimedBuff::SpeedBoost
            | TimedBuff::ScoreMultiplier
            | TimedBuff::Magnet
            | TimedBuff::BerserkerMode => 1800.0,
        }
    }

    /// Put the controlled run field back to neutral
    fn revert(&self, run: &mut RunState) {
        match self {
            TimedBuff::SpeedBoost => run.speed_multiplier = 1.0,
            TimedBuff::ScoreMultiplier => run.score_multiplier = 1.0,
            TimedBuff::Magnet => run.magnet_range = 0.0,
            TimedBuff::BerserkerMode => run.is_berserker = false,
            TimedBuff::GhostWalk => run.is_ghost_walking = false,
            TimedBuff::TimeSlow => {
                run.enemy_slow_factor = 1.0;
                run.time_slow_factor = 1.0;
            }
            // Read straight from the map, nothing to undo
            TimedBuff::JumpBoost => {}
        }
    }
}

/// Remaining ticks per active timed buff
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimedBuffs(BTreeMap<TimedBuff, f32>);

impl TimedBuffs {
    pub fn is_active(&self, buff: TimedBuff) -> bool {
        self.0.contains_key(&buff)
    }

    pub fn remaining(&self, buff: TimedBuff) -> Option<f32> {
        self.0.get(&buff).copied()
    }

    /// Add duration on top of what is left, up to the buff's cap
    pub fn extend(&mut self, buff: TimedBuff, duration: f32) {
        let entry = self.0.entry(buff).or_insert(0.0);
        *entry = (*entry + duration).min(buff.cap());
    }

    /// Count down and drop expired entries, returning them
    pub fn tick(&mut self, dt: f32) -> Vec<TimedBuff> {
        let mut expired = Vec::new();
        for (buff, remaining) in self.0.iter_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(*buff);
            }
        }
        for buff in &expired {
            self.0.remove(buff);
        }
        expired
    }

    pub fn iter(&self) -> impl Iterator<Item = (TimedBuff, f32)> + '_ {
        self.0.iter().map(|(b, r)| (*b, *r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One row of a drop table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropEntry {
    pub kind: DropKind,
    /// Relative weight within the table
    pub chance: f32,
    /// Buff duration in ticks (0 for instant drops)
    pub duration: f32,
}

const fn entry(kind: DropKind, chance: f32, duration: f32) -> DropEntry {
    DropEntry {
        kind,
        chance,
        duration,
    }
}

pub const NORMAL_DROP_CHANCE: f32 = 0.15;
pub const BOSS_DROP_CHANCE: f32 = 0.6;
/// Combo from which a boss kill always drops
pub const GUARANTEED_BOSS_COMBO: u32 = 20;
pub const LUCKY_DROP_BONUS: f32 = 0.1;

pub const NORMAL_DROPS: [DropEntry; 10] = [
    entry(DropKind::MegaAmmo, 0.25, 0.0),
    entry(DropKind::SpeedBoost, 0.12, 600.0),
    entry(DropKind::JumpBoost, 0.12, 900.0),
    entry(DropKind::ScoreMultiplier, 0.12, 900.0),
    entry(DropKind::Magnet, 0.12, 900.0),
    entry(DropKind::Shield, 0.08, 0.0),
    entry(DropKind::TimeSlow, 0.07, 600.0),
    entry(DropKind::GhostWalk, 0.05, 300.0),
    entry(DropKind::BerserkerMode, 0.04, 420.0),
    entry(DropKind::ExtraLife, 0.03, 0.0),
];

pub const BOSS_DROPS: [DropEntry; 7] = [
    entry(DropKind::ExtraLife, 0.20, 0.0),
    entry(DropKind::BerserkerMode, 0.15, 600.0),
    entry(DropKind::Shield, 0.15, 0.0),
    entry(DropKind::ScoreMultiplier, 0.15, 1200.0),
    entry(DropKind::MegaAmmo, 0.15, 0.0),
    entry(DropKind::GhostWalk, 0.10, 600.0),
    entry(DropKind::TimeSlow, 0.10, 900.0),
];

/// Cumulative-weight pick for a draw in [0, 1)
pub fn pick_entry(table: &[DropEntry], roll: f32) -> DropEntry {
    let total: f32 = table.iter().map(|e| e.chance).sum();
    let target = roll * total;
    let mut cumulative = 0.0;
    for e in table {
        cumulative += e.chance;
        if target < cumulative {
            return *e;
        }
    }
    // Float rounding can leave the target unmatched
    table[table.len() - 1]
}

pub const DROP_SIZE: f32 = 24.0;
const DROP_LAUNCH_VELOCITY: f32 = -4.0;

/// A collectible dropped by a destroyed obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: DropKind,
    pub velocity_y: f32,
    pub rotation: f32,
    pub glow_intensity: f32,
    /// Buff duration granted on pickup
    pub duration: f32,
}

impl Pickup {
    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

/// Decide whether a kill drops something and which table row it is
///
/// Bosses killed at a combo of [`GUARANTEED_BOSS_COMBO`] or more skip the
/// chance roll.
pub fn choose_drop<R: Rng + ?Sized>(
    rng: &mut R,
    enemy: ObstacleKind,
    combo: u32,
    lucky: bool,
) -> Option<DropEntry> {
    let luck = if lucky { LUCKY_DROP_BONUS } else { 0.0 };
    let combo_bonus = (combo as f32 * 0.01).min(0.2);
    let boss = enemy.is_boss();
    let (table, base): (&[DropEntry], f32) = if boss {
        (&BOSS_DROPS, BOSS_DROP_CHANCE)
    } else {
        (&NORMAL_DROPS, NORMAL_DROP_CHANCE)
    };

    let guaranteed = boss && combo >= GUARANTEED_BOSS_COMBO;
    if !guaranteed && crate::draw(rng) >= base + luck + combo_bonus {
        return None;
    }
    Some(pick_entry(table, crate::draw(rng)))
}

/// Roll for a drop at `center`; returns what dropped
pub fn roll_for_drop(ctx: &mut SimulationContext, enemy: ObstacleKind, center: Vec2) -> Option<DropKind> {
    let picked = choose_drop(
        &mut ctx.rng,
        enemy,
        ctx.run.combo_count,
        ctx.unlocks.lucky_looter,
    )?;
    let id = ctx.next_entity_id();
    let size = Vec2::splat(DROP_SIZE);
    ctx.drops.push(Pickup {
        id,
        pos: center - size * 0.5,
        size,
        kind: picked.kind,
        velocity_y: DROP_LAUNCH_VELOCITY,
        rotation: 0.0,
        glow_intensity: 1.0,
        duration: picked.duration,
    });
    ctx.emit(GameEvent::DropSpawned {
        kind: picked.kind,
        pos: center,
    });
    Some(picked.kind)
}

pub const EXTRA_LIFE_CAPPED_BONUS: u64 = 1000;
pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
pub const SCORE_BOOST_MULTIPLIER: f32 = 2.0;
pub const MAGNET_RANGE: f32 = 200.0;
pub const TIME_SLOW_FACTOR: f32 = 0.5;

/// Apply a picked-up drop to the run
pub fn collect_drop(ctx: &mut SimulationContext, kind: DropKind, duration: f32) {
    let run = &mut ctx.run;
    match kind {
        DropKind::ExtraLife => {
            run.grant_life(EXTRA_LIFE_CAPPED_BONUS);
        }
        DropKind::MegaAmmo => run.bullets += MEGA_AMMO,
        DropKind::SpeedBoost => run.speed_multiplier = SPEED_BOOST_MULTIPLIER,
        DropKind::JumpBoost => {}
        DropKind::ScoreMultiplier => run.score_multiplier = SCORE_BOOST_MULTIPLIER,
        DropKind::Magnet => run.magnet_range = MAGNET_RANGE,
        DropKind::BerserkerMode => run.is_berserker = true,
        DropKind::GhostWalk => run.is_ghost_walking = true,
        DropKind::TimeSlow => {
            run.enemy_slow_factor = TIME_SLOW_FACTOR;
            run.time_slow_factor = TIME_SLOW_FACTOR;
        }
        DropKind::Shield => run.has_shield = true,
    }
    if let Some(buff) = kind.timed_buff() {
        run.drop_buffs.extend(buff, duration);
    }

    let pos = ctx.player.center();
    ctx.emit(GameEvent::Popup {
        pos,
        text: kind.label().to_string(),
    });
    ctx.emit(GameEvent::Sound(SoundEffect::Pickup));
    if kind.timed_buff().is_some() || kind == DropKind::Shield {
        ctx.emit(GameEvent::Sound(SoundEffect::Powerup));
    }
}

/// Drops fall to the ground, drift toward a magnet and get picked up
pub fn update_drops(ctx: &mut SimulationContext, dt: f32) {
    let player_box = Rect::from_pos_size(ctx.player.pos, ctx.player.size);
    let player_center = ctx.player.center();
    let magnet_range = ctx.run.magnet_range;
    let time_secs = ctx.time_ticks as f32 / TICKS_PER_SECOND;
    let cull_x = ctx.camera.left_edge() - OFFSCREEN_MARGIN;

    let mut i = ctx.drops.len();
    while i > 0 {
        i -= 1;
        let drop = &mut ctx.drops[i];
        drop.velocity_y += GRAVITY * dt;
        drop.pos.y += drop.velocity_y * dt;
        let floor = GROUND_Y - drop.size.y;
        if drop.pos.y >= floor {
            drop.pos.y = floor;
            drop.velocity_y = 0.0;
        }
        drop.rotation += 0.05 * dt;
        drop.glow_intensity = 0.75 + 0.25 * (time_secs * 4.0).sin();

        if magnet_range > 0.0 {
            let to_player = player_center - (drop.pos + drop.size * 0.5);
            let distance = to_player.length();
            if distance > 0.0 && distance < magnet_range {
                let strength = (magnet_range - distance) / magnet_range;
                drop.pos += to_player * strength * 0.5 * 0.2 * dt;
                drop.pos.y = drop.pos.y.min(floor);
            }
        }

        if drop.bounds().intersects(&player_box) {
            let picked = ctx.drops.remove(i);
            collect_drop(ctx, picked.kind, picked.duration);
        } else if drop.pos.x + drop.size.x < cull_x {
            ctx.drops.remove(i);
        }
    }
}

/// Count down timed buffs and revert the ones that ran out
pub fn update_drop_buffs(ctx: &mut SimulationContext, dt: f32) {
    let expired = ctx.run.drop_buffs.tick(dt);
    for buff in expired {
        buff.revert(&mut ctx.run);
        log::debug!("{buff:?} expired");
    }
}
