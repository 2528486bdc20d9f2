//! Events the simulation emits for its collaborators
//!
//! Fire-and-forget: the host drains the queue once per frame and routes
//! sounds to audio, effects to the renderer and popups to the HUD.

use glam::Vec2;

use super::drops::DropKind;
use super::state::PowerId;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    Shoot,
    /// Bullet struck an obstacle
    Hit,
    /// Player lost a life
    Damage,
    /// Run ended
    Death,
    /// Drop or bolt box collected
    Pickup,
    /// Timed buff or permanent power gained
    Powerup,
    /// Hazard beam fired
    Zap,
    LevelUp,
}

/// A single collaborator notification
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(SoundEffect),
    /// Hazard beam discharge between two points
    Lightning { from: Vec2, to: Vec2 },
    HitSpark { pos: Vec2 },
    Blood { pos: Vec2 },
    Popup { pos: Vec2, text: String },
    DamageNumber { pos: Vec2, amount: u64 },
    DropSpawned { kind: DropKind, pos: Vec2 },
    LevelUp { level: u32 },
    /// Level complete; waiting for `choose_buff` with one of these
    BuffChoiceOffered { options: Vec<PowerId> },
    AchievementUnlocked { name: &'static str },
    GameOver { score: u64, level: u32 },
}
