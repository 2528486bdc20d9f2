//! Shooting, bullet travel and obstacle destruction
//!
//! Kills feed the score, combo, level gauge, drop rolls and the life-regen
//! counter.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::drops::roll_for_drop;
use super::events::{GameEvent, SoundEffect};
use super::state::{PowerId, SimulationContext};
use crate::consts::*;

/// Kills needed for a life with and without the Undead Resilience power
pub const REGEN_HITS: u32 = 15;
pub const REGEN_HITS_RESILIENT: u32 = 10;
/// Score awarded instead of a life when already at the cap
pub const REGEN_CAPPED_BONUS: u64 = 500;

/// A player bullet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    /// Signed by direction
    pub speed: f32,
    /// Chain-lightning bullets deal double damage
    pub enhanced: bool,
    pub direction: f32,
    pub piercing: bool,
    /// Obstacles a piercing bullet already went through
    #[serde(default)]
    pub pierced: Vec<u32>,
}

impl Bullet {
    pub fn hitbox(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, BULLET_WIDTH, BULLET_HEIGHT)
    }
}

/// Fire from the player's muzzle; returns the number of bullets fired
pub fn shoot(ctx: &mut SimulationContext) -> u32 {
    let run = &ctx.run;
    if run.bullets == 0 && !run.is_berserker {
        return 0;
    }

    let fan = run.has_power(PowerId::ChainLightning) && run.has_ammo(3);
    let direction = ctx.player.facing;
    let speed = BULLET_SPEED * direction * ctx.unlocks.bullet_speed_multiplier();
    let muzzle_x = if direction > 0.0 {
        ctx.player.pos.x + ctx.player.size.x
    } else {
        ctx.player.pos.x - BULLET_WIDTH
    };
    let muzzle = Vec2::new(
        muzzle_x,
        ctx.player.pos.y + ctx.player.size.y / 2.0 - BULLET_HEIGHT / 2.0,
    );
    let offsets: &[f32] = if fan {
        &[-FAN_OFFSET, 0.0, FAN_OFFSET]
    } else {
        &[0.0]
    };
    let piercing = run.has_piercing_bullets;

    for offset in offsets {
        ctx.bullets.push(Bullet {
            pos: muzzle + Vec2::new(0.0, *offset),
            speed,
            enhanced: fan,
            direction,
            piercing,
            pierced: Vec::new(),
        });
    }

    let fired = offsets.len() as u32;
    if !ctx.run.is_berserker {
        ctx.run.bullets = ctx.run.bullets.saturating_sub(fired);
    }
    ctx.emit(GameEvent::Sound(SoundEffect::Shoot));
    fired
}

/// Move bullets, resolve hits and cull the ones that left the view
pub fn update_bullets(ctx: &mut SimulationContext, dt: f32) {
    let min_x = ctx.camera.left_edge() - OFFSCREEN_MARGIN;
    let max_x = ctx.camera.right_edge() + OFFSCREEN_MARGIN;
    // Piercing rounds only continue once the unlock is earned
    let pierce_through = ctx.unlocks.piercing_bullets;

    let mut b = ctx.bullets.len();
    while b > 0 {
        b -= 1;
        let bullet = &mut ctx.bullets[b];
        bullet.pos.x += bullet.speed * dt;
        let hitbox = bullet.hitbox();
        let damage = if bullet.enhanced { 2 } else { 1 };
        let keeps_going = bullet.piercing && pierce_through;

        let mut spent = false;
        let mut o = ctx.obstacles.len();
        while o > 0 {
            o -= 1;
            let obstacle = &mut ctx.obstacles[o];
            // Hazard bodies are transparent to bullets
            if obstacle.is_indestructible() || !obstacle.bounds().intersects(&hitbox) {
                continue;
            }
            if ctx.bullets[b].pierced.contains(&obstacle.id) {
                continue;
            }

            obstacle.health = obstacle.health.saturating_sub(damage);
            let destroyed = obstacle.health == 0;
            let obstacle_id = obstacle.id;
            ctx.run.consecutive_hits += 1;
            ctx.emit(GameEvent::HitSpark {
                pos: hitbox.center(),
            });
            ctx.emit(GameEvent::Sound(SoundEffect::Hit));
            if destroyed {
                handle_obstacle_destroyed(ctx, o);
            }

            if keeps_going {
                ctx.bullets[b].pierced.push(obstacle_id);
            } else {
                spent = true;
                break;
            }
        }

        let x = ctx.bullets[b].pos.x;
        if spent || x > max_x || x + BULLET_WIDTH < min_x {
            ctx.bullets.remove(b);
        }
    }
}

/// Score, drop roll and bookkeeping for a destroyed obstacle
pub fn handle_obstacle_destroyed(ctx: &mut SimulationContext, index: usize) {
    let obstacle = ctx.obstacles.remove(index);
    let kind = obstacle.kind();
    let center = obstacle.center();

    let base = kind.config().base_points as f32 + (ctx.run.level as f32 - 1.0) * 5.0;
    let points = ctx.run.scaled(base);
    ctx.run.score += points;
    ctx.emit(GameEvent::Popup {
        pos: center,
        text: format!("+{points}"),
    });
    ctx.emit(GameEvent::DamageNumber {
        pos: center,
        amount: points,
    });

    let now = ctx.time_ticks;
    if now.saturating_sub(ctx.run.last_score_tick) > RECENT_SCORE_WINDOW {
        ctx.run.recent_score = 0;
    }
    ctx.run.recent_score += points;
    ctx.run.last_score_tick = now;

    roll_for_drop(ctx, kind, center);

    let run = &mut ctx.run;
    if kind.is_boss() {
        run.bosses_killed += 1;
        log::info!("Alpha wolf down ({} total)", run.bosses_killed);
    }
    run.enemies_defeated += 1;
    run.bullets_hit += 1;
    run.add_progress(PROGRESS_PER_KILL);
    run.add_combo();

    let needed = if run.has_power(PowerId::UndeadResilience) {
        REGEN_HITS_RESILIENT
    } else {
        REGEN_HITS
    };
    if run.bullets_hit >= needed {
        run.bullets_hit = 0;
        let text = if run.grant_life(REGEN_CAPPED_BONUS) {
            "+1 Life".to_string()
        } else {
            format!("+{REGEN_CAPPED_BONUS}")
        };
        let pos = ctx.player.center();
        ctx.emit(GameEvent::Popup { pos, text });
        ctx.emit(GameEvent::Sound(SoundEffect::Powerup));
    }
}
