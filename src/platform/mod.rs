//! Platform abstraction layer
//!
//! Turns wall-clock time into fixed simulation ticks and device input into
//! per-tick [`TickInput`](crate::sim::TickInput) commands.

pub mod input;
pub mod time;

pub use input::InputState;
pub use time::FrameClock;
