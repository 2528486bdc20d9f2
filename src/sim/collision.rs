//! Collision detection and the player damage arbiter
//!
//! Everything in the dungeon is an axis-aligned box, so detection is plain
//! AABB overlap. The interesting part is resolution: each obstacle type has
//! its own outcome, and invulnerability and shields carve out exceptions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{GameEvent, SoundEffect};
use super::obstacle::ObstacleKind;
use super::state::SimulationContext;
use crate::consts::*;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    /// Strict overlap; touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Shrink by `fraction` of each dimension, keeping the center
    pub fn shrunk(&self, fraction: f32) -> Rect {
        let dw = self.w * fraction;
        let dh = self.h * fraction;
        Rect::new(self.x + dw / 2.0, self.y + dh / 2.0, self.w - dw, self.h - dh)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Popup text shown when a shield absorbs a hit
pub const SHIELD_BROKEN_TEXT: &str = "Shield Broken!";

/// Resolve player-vs-obstacle contact for this tick
///
/// Returns true the instant the run ends (lives reach zero); the caller must
/// stop resolving collisions for the tick.
pub fn resolve_player_collisions(ctx: &mut SimulationContext) -> bool {
    let run = &ctx.run;
    let invulnerable = ctx.player.damage_resistance > 0.0
        || run.post_buff_invulnerability > 0.0
        || run.post_damage_invulnerability > 0.0
        || run.has_shield
        || run.is_ghost_walking;

    if invulnerable {
        if run.has_shield && !run.is_ghost_walking {
            absorb_with_shield(ctx);
        } else {
            collect_bolt_boxes(ctx);
        }
        return false;
    }

    let player_box = Rect::from_pos_size(ctx.player.pos, ctx.player.size);
    let mut i = ctx.obstacles.len();
    while i > 0 {
        i -= 1;
        let obstacle = &ctx.obstacles[i];
        match obstacle.kind() {
            ObstacleKind::BoltBox => {
                if obstacle.hitbox().intersects(&player_box) {
                    collect_bolt_box(ctx, i);
                }
            }
            ObstacleKind::Rock => continue,
            ObstacleKind::TeslaCoil | ObstacleKind::FrankensteinTable => {
                let Some(beam) = obstacle.live_beam() else {
                    continue;
                };
                if beam.intersects(&player_box) {
                    return take_damage(ctx);
                }
            }
            _ => {
                if obstacle.hitbox().intersects(&player_box) {
                    ctx.obstacles.remove(i);
                    return take_damage(ctx);
                }
            }
        }
    }
    false
}

/// Shield path: the first hit consumes the shield instead of a life
fn absorb_with_shield(ctx: &mut SimulationContext) {
    let player_box = Rect::from_pos_size(ctx.player.pos, ctx.player.size);
    let mut i = ctx.obstacles.len();
    while i > 0 {
        i -= 1;
        let obstacle = &ctx.obstacles[i];
        match obstacle.kind() {
            ObstacleKind::BoltBox => {
                if obstacle.hitbox().intersects(&player_box) {
                    collect_bolt_box(ctx, i);
                }
            }
            ObstacleKind::Rock => continue,
            ObstacleKind::TeslaCoil | ObstacleKind::FrankensteinTable => {
                // Inactive beams leave the shield alone
                let Some(beam) = obstacle.live_beam() else {
                    continue;
                };
                if beam.intersects(&player_box) {
                    break_shield(ctx);
                    return;
                }
            }
            _ => {
                if obstacle.hitbox().intersects(&player_box) {
                    ctx.obstacles.remove(i);
                    break_shield(ctx);
                    return;
                }
            }
        }
    }
}

/// Invulnerable without a shield: only pickups still register
fn collect_bolt_boxes(ctx: &mut SimulationContext) {
    let player_box = Rect::from_pos_size(ctx.player.pos, ctx.player.size);
    let mut i = ctx.obstacles.len();
    while i > 0 {
        i -= 1;
        let obstacle = &ctx.obstacles[i];
        if obstacle.kind() == ObstacleKind::BoltBox && obstacle.hitbox().intersects(&player_box) {
            collect_bolt_box(ctx, i);
        }
    }
}

fn collect_bolt_box(ctx: &mut SimulationContext, index: usize) {
    let bolt_box = ctx.obstacles.remove(index);
    ctx.run.bullets += BOLT_BOX_AMMO;
    ctx.emit(GameEvent::Popup {
        pos: bolt_box.center(),
        text: format!("+{} Ammo", BOLT_BOX_AMMO),
    });
    ctx.emit(GameEvent::Sound(SoundEffect::Pickup));
}

fn break_shield(ctx: &mut SimulationContext) {
    ctx.run.has_shield = false;
    // Grace window so the same contact cannot cost a life next tick
    ctx.run.post_damage_invulnerability = POST_DAMAGE_INVULNERABILITY;
    let pos = ctx.player.center();
    ctx.emit(GameEvent::Popup {
        pos,
        text: SHIELD_BROKEN_TEXT.to_string(),
    });
    ctx.emit(GameEvent::Sound(SoundEffect::Hit));
    log::debug!("Shield absorbed a hit");
}

/// One life lost; returns true if that was the last one
fn take_damage(ctx: &mut SimulationContext) -> bool {
    let run = &mut ctx.run;
    run.lives = run.lives.saturating_sub(1);
    run.damage_this_level += 1;
    run.post_damage_invulnerability = POST_DAMAGE_INVULNERABILITY;
    run.bullets_hit = 0;
    run.consecutive_hits = 0;
    run.reset_combo();
    ctx.player.damage_resistance = DAMAGE_RESISTANCE_TIME;

    let pos = ctx.player.center();
    ctx.emit(GameEvent::Blood { pos });
    ctx.emit(GameEvent::Sound(SoundEffect::Damage));
    log::debug!("Player hit, {} lives left", ctx.run.lives);
    ctx.run.lives == 0
}
