//! Achievement collaborator
//!
//! Checked once per completed level. Unlocks are sticky for the rest of the
//! session and feed back into combat (bullet speed, piercing) and drops.

use serde::{Deserialize, Serialize};

use crate::sim::RunState;

/// Bullet speed multiplier while Swift Shots is unlocked
pub const SWIFT_SHOTS_SPEED_MULTIPLIER: f32 = 1.25;

/// Bosses needed for Piercing Bullets
pub const PIERCING_BOSSES: u32 = 2;
/// Kills needed for Swift Shots
pub const SWIFT_SHOTS_KILLS: u32 = 50;

/// Flags the simulation reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlocks {
    pub piercing_bullets: bool,
    pub swift_shots: bool,
    pub lucky_looter: bool,
}

impl Unlocks {
    pub fn bullet_speed_multiplier(&self) -> f32 {
        if self.swift_shots {
            SWIFT_SHOTS_SPEED_MULTIPLIER
        } else {
            1.0
        }
    }

    /// Union of both sets
    pub fn merge(&self, other: &Unlocks) -> Unlocks {
        Unlocks {
            piercing_bullets: self.piercing_bullets || other.piercing_bullets,
            swift_shots: self.swift_shots || other.swift_shots,
            lucky_looter: self.lucky_looter || other.lucky_looter,
        }
    }

    /// Display names of flags set in `other` but not in `self`
    pub fn newly_unlocked(&self, other: &Unlocks) -> Vec<&'static str> {
        let mut names = Vec::new();
        if other.piercing_bullets && !self.piercing_bullets {
            names.push("Piercing Bullets");
        }
        if other.swift_shots && !self.swift_shots {
            names.push("Swift Shots");
        }
        if other.lucky_looter && !self.lucky_looter {
            names.push("Lucky Looter");
        }
        names
    }
}

/// Called by the level state machine every time a level completes
pub trait AchievementHook {
    fn check_achievements(&mut self, run: &RunState) -> Unlocks;
}

/// Hook that never unlocks anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAchievements;

impl AchievementHook for NoAchievements {
    fn check_achievements(&mut self, _run: &RunState) -> Unlocks {
        Unlocks::default()
    }
}

/// Default achievement rules, remembering what has been earned
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementTracker {
    unlocked: Unlocks,
}

impl AchievementTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from unlocks earned in an earlier session
    pub fn with_unlocks(unlocked: Unlocks) -> Self {
        Self { unlocked }
    }

    pub fn unlocks(&self) -> Unlocks {
        self.unlocked
    }
}

impl AchievementHook for AchievementTracker {
    fn check_achievements(&mut self, run: &RunState) -> Unlocks {
        let earned = Unlocks {
            piercing_bullets: run.bosses_killed >= PIERCING_BOSSES,
            swift_shots: run.enemies_defeated >= SWIFT_SHOTS_KILLS,
            lucky_looter: run.damage_this_level == 0,
        };

        for name in self.unlocked.newly_unlocked(&earned) {
            log::info!("Achievement unlocked: {}", name);
        }
        self.unlocked = self.unlocked.merge(&earned);
        self.unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn run() -> RunState {
        RunState::new(&Tuning::default())
    }

    #[test]
    fn test_flawless_level_unlocks_lucky_looter() {
        let mut tracker = AchievementTracker::new();
        let unlocks = tracker.check_achievements(&run());
        assert!(unlocks.lucky_looter);
        assert!(!unlocks.piercing_bullets);
        assert!(!unlocks.swift_shots);
    }

    #[test]
    fn test_thresholds() {
        let mut tracker = AchievementTracker::new();
        let mut state = run();
        state.damage_this_level = 1;
        state.bosses_killed = 1;
        state.enemies_defeated = 49;
        assert_eq!(tracker.check_achievements(&state), Unlocks::default());

        state.bosses_killed = 2;
        state.enemies_defeated = 50;
        let unlocks = tracker.check_achievements(&state);
        assert!(unlocks.piercing_bullets && unlocks.swift_shots);
        assert!(!unlocks.lucky_looter);
    }

    #[test]
    fn test_unlocks_are_sticky() {
        let mut tracker = AchievementTracker::new();
        tracker.check_achievements(&run());
        let mut hurt = run();
        hurt.damage_this_level = 3;
        assert!(tracker.check_achievements(&hurt).lucky_looter);
    }

    #[test]
    fn test_newly_unlocked_reports_only_new_flags() {
        let before = Unlocks {
            swift_shots: true,
            ..Default::default()
        };
        let after = Unlocks {
            swift_shots: true,
            lucky_looter: true,
            ..Default::default()
        };
        assert_eq!(before.newly_unlocked(&after), vec!["Lucky Looter"]);
        assert!(after.newly_unlocked(&before).is_empty());
    }

    #[test]
    fn test_bullet_speed_multiplier() {
        assert_eq!(Unlocks::default().bullet_speed_multiplier(), 1.0);
        let swift = Unlocks {
            swift_shots: true,
            ..Default::default()
        };
        assert_eq!(swift.bullet_speed_multiplier(), 1.25);
    }
}
