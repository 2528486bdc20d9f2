//! Level progression and the between-level power choice

use super::events::{GameEvent, SoundEffect};
use super::state::{GamePhase, PowerId, SimulationContext};
use crate::achievements::AchievementHook;
use crate::consts::*;

/// Bonus ammo granted per level reached
pub const LEVEL_AMMO_BONUS: u32 = 10;

/// Outcome of the per-tick level check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelCheck {
    /// Progress below the goal
    Continue,
    /// Level advanced in place
    Advanced(u32),
    /// Simulation halted for a power choice
    AwaitingChoice,
}

/// Check the progress gauge and advance or pause for a power choice
pub fn check_level_progress(
    ctx: &mut SimulationContext,
    hook: &mut dyn AchievementHook,
) -> LevelCheck {
    if ctx.phase != GamePhase::Playing || ctx.run.level_progress < LEVEL_PROGRESS_GOAL {
        return LevelCheck::Continue;
    }

    ctx.run.levels_completed += 1;
    apply_achievements(ctx, hook);

    let next_level = ctx.run.level + 1;
    if next_level % 2 == 0 && !ctx.run.available_buffs.is_empty() {
        ctx.phase = GamePhase::LevelComplete;
        let options = ctx.run.available_buffs.clone();
        log::info!(
            "Level {} complete, offering {} powers",
            ctx.run.level,
            options.len()
        );
        ctx.emit(GameEvent::BuffChoiceOffered { options });
        return LevelCheck::AwaitingChoice;
    }

    advance_level(ctx);
    LevelCheck::Advanced(ctx.run.level)
}

fn apply_achievements(ctx: &mut SimulationContext, hook: &mut dyn AchievementHook) {
    let reported = hook.check_achievements(&ctx.run);
    for name in ctx.unlocks.newly_unlocked(&reported) {
        ctx.emit(GameEvent::AchievementUnlocked { name });
    }
    ctx.unlocks = ctx.unlocks.merge(&reported);
}

/// Shared by the in-place advance and the resume after a power choice
fn advance_level(ctx: &mut SimulationContext) {
    let run = &mut ctx.run;
    run.level += 1;
    run.level_progress = 1.0;
    run.damage_this_level = 0;
    run.bolt_boxes_this_level = 0;
    run.game_speed = (run.game_speed * LEVEL_SPEED_RAMP).min(ctx.tuning.max_game_speed);
    run.bullets += LEVEL_AMMO_BONUS * run.level;

    let level = run.level;
    log::info!("Level {} (speed {:.2})", level, ctx.run.game_speed);
    ctx.emit(GameEvent::LevelUp { level });
    ctx.emit(GameEvent::Sound(SoundEffect::LevelUp));
}

/// Resume from a level-complete pause with the chosen power
///
/// Returns false (and leaves the state untouched) if no choice is pending or
/// the power is not on offer.
pub fn choose_buff(ctx: &mut SimulationContext, power: PowerId) -> bool {
    if ctx.phase != GamePhase::LevelComplete {
        log::warn!("Ignoring power choice {} outside level complete", power.as_str());
        return false;
    }
    let Some(index) = ctx.run.available_buffs.iter().position(|&p| p == power) else {
        log::warn!("Ignoring power choice {}: not on offer", power.as_str());
        return false;
    };

    ctx.run.available_buffs.remove(index);
    ctx.run.active_buffs.insert(power);
    match power {
        PowerId::GraveWard => ctx.run.has_shield = true,
        PowerId::SilverBullets => ctx.run.has_piercing_bullets = true,
        PowerId::ChainLightning | PowerId::UndeadResilience | PowerId::ShadowLeap => {}
    }
    ctx.emit(GameEvent::Sound(SoundEffect::Powerup));

    advance_level(ctx);
    ctx.run.post_buff_invulnerability = POST_BUFF_INVULNERABILITY;
    ctx.phase = GamePhase::Playing;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::{AchievementTracker, NoAchievements, Unlocks};

    fn playing() -> SimulationContext {
        let mut ctx = SimulationContext::new(3);
        ctx.reset_game(0);
        ctx
    }

    #[test]
    fn test_below_goal_continues() {
        let mut ctx = playing();
        ctx.run.level_progress = 99.0;
        assert_eq!(check_level_progress(&mut ctx, &mut NoAchievements), LevelCheck::Continue);
        assert_eq!(ctx.run.levels_completed, 0);
    }

    #[test]
    fn test_auto_advance_to_odd_level() {
        let mut ctx = playing();
        ctx.run.level = 2;
        ctx.run.level_progress = 100.0;
        ctx.run.damage_this_level = 2;
        ctx.run.bolt_boxes_this_level = 3;
        ctx.run.bullets = 0;
        let speed = ctx.run.game_speed;

        assert_eq!(check_level_progress(&mut ctx, &mut NoAchievements), LevelCheck::Advanced(3));
        assert_eq!(ctx.phase, GamePhase::Playing);
        assert_eq!(ctx.run.level_progress, 1.0);
        assert_eq!(ctx.run.damage_this_level, 0);
        assert_eq!(ctx.run.bolt_boxes_this_level, 0);
        assert_eq!(ctx.run.bullets, 30);
        assert!((ctx.run.game_speed - speed * 1.1).abs() < 1e-5);
        assert!(ctx.events.contains(&GameEvent::LevelUp { level: 3 }));
    }

    #[test]
    fn test_speed_ramp_is_capped() {
        let mut ctx = playing();
        ctx.run.level = 4;
        ctx.run.game_speed = 5.9;
        ctx.run.level_progress = 100.0;
        check_level_progress(&mut ctx, &mut NoAchievements);
        assert_eq!(ctx.run.game_speed, 6.0);
    }

    #[test]
    fn test_even_level_waits_for_choice() {
        let mut ctx = playing();
        ctx.run.level_progress = 100.0;
        assert_eq!(
            check_level_progress(&mut ctx, &mut NoAchievements),
            LevelCheck::AwaitingChoice
        );
        assert_eq!(ctx.phase, GamePhase::LevelComplete);
        assert_eq!(ctx.run.level, 1);
        assert_eq!(ctx.run.levels_completed, 1);
        assert!(ctx.events.iter().any(|e| matches!(
            e,
            GameEvent::BuffChoiceOffered { options } if options.len() == 5
        )));
    }

    #[test]
    fn test_no_powers_left_auto_advances() {
        let mut ctx = playing();
        ctx.run.available_buffs.clear();
        ctx.run.level_progress = 100.0;
        assert_eq!(check_level_progress(&mut ctx, &mut NoAchievements), LevelCheck::Advanced(2));
    }

    #[test]
    fn test_choose_buff_resumes() {
        let mut ctx = playing();
        ctx.run.level_progress = 100.0;
        ctx.run.bullets = 0;
        check_level_progress(&mut ctx, &mut NoAchievements);

        assert!(choose_buff(&mut ctx, PowerId::GraveWard));
        assert_eq!(ctx.phase, GamePhase::Playing);
        assert_eq!(ctx.run.level, 2);
        assert_eq!(ctx.run.level_progress, 1.0);
        assert_eq!(ctx.run.bullets, 20);
        assert_eq!(ctx.run.post_buff_invulnerability, POST_BUFF_INVULNERABILITY);
        assert!(ctx.run.has_shield);
        assert!(ctx.run.has_power(PowerId::GraveWard));
        assert!(!ctx.run.available_buffs.contains(&PowerId::GraveWard));
    }

    #[test]
    fn test_invalid_choice_is_ignored() {
        let mut ctx = playing();
        assert!(!choose_buff(&mut ctx, PowerId::ShadowLeap));
        assert_eq!(ctx.run.level, 1);

        ctx.run.level_progress = 100.0;
        check_level_progress(&mut ctx, &mut NoAchievements);
        ctx.run.available_buffs.retain(|&p| p != PowerId::ShadowLeap);
        assert!(!choose_buff(&mut ctx, PowerId::ShadowLeap));
        assert_eq!(ctx.phase, GamePhase::LevelComplete);
    }

    #[test]
    fn test_silver_bullets_turn_on_piercing() {
        let mut ctx = playing();
        ctx.run.level_progress = 100.0;
        check_level_progress(&mut ctx, &mut NoAchievements);
        choose_buff(&mut ctx, PowerId::SilverBullets);
        assert!(ctx.run.has_piercing_bullets);
    }

    #[test]
    fn test_achievements_reported_once() {
        let mut ctx = playing();
        let mut tracker = AchievementTracker::new();
        ctx.run.bosses_killed = 2;
        ctx.run.level = 2;
        ctx.run.level_progress = 100.0;
        check_level_progress(&mut ctx, &mut tracker);
        assert!(ctx.unlocks.piercing_bullets && ctx.unlocks.lucky_looter);
        assert!(!ctx.run.has_piercing_bullets);
        let reported = ctx
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::AchievementUnlocked { .. }))
            .count();
        assert_eq!(reported, 2);

        ctx.run.level_progress = 100.0;
        ctx.run.level = 4;
        check_level_progress(&mut ctx, &mut tracker);
        assert!(!ctx
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::AchievementUnlocked { .. })));
        assert_eq!(
            ctx.unlocks,
            Unlocks {
                piercing_bullets: true,
                swift_shots: false,
                lucky_looter: true,
            }
        );
    }
}
