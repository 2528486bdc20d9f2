//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (normalized delta, 1.0 == one 60 Hz frame)
//! - Seeded RNG only, owned by [`SimulationContext`]
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies; those consume [`GameEvent`]s
//!
//! Entity removal during a scan walks the list in reverse by index so a
//! removal never shifts an element that is still to be visited. Bulk culling
//! of off-screen entities with no per-entity side effects uses `retain`.

pub mod collision;
pub mod combat;
pub mod drops;
pub mod events;
pub mod level;
pub mod obstacle;
pub mod player;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::Rect;
pub use combat::{Bullet, shoot};
pub use drops::{DropKind, Pickup, TimedBuff, TimedBuffs};
pub use events::{GameEvent, SoundEffect};
pub use level::{LevelCheck, choose_buff};
pub use obstacle::{HazardState, Obstacle, ObstacleKind, ObstacleVariant};
pub use spawner::{SpawnBands, Spawner};
pub use state::{
    Camera, GamePhase, PermanentBuffs, Player, PowerId, RunState, SimulationContext,
};
pub use tick::{TickInput, tick, tick_with};
