//! Versioned save envelope

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::SimulationContext;

/// Current save format version
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed save data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Snapshot of a whole run at a tick boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    /// `time_ticks` when the snapshot was taken
    pub saved_at_tick: u64,
    pub state: SimulationContext,
}

/// Only the header, so the version can be checked before the body is parsed
#[derive(Deserialize)]
struct EnvelopeHeader {
    version: u32,
}

impl SaveEnvelope {
    pub fn capture(ctx: &SimulationContext) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at_tick: ctx.time_ticks,
            state: ctx.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let header: EnvelopeHeader = serde_json::from_str(json)?;
        if header.version != SAVE_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: header.version,
                expected: SAVE_VERSION,
            });
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Unwrap into a context ready to keep ticking
    pub fn restore(self) -> SimulationContext {
        self.state
    }
}

/// Write a snapshot, replacing any previous save only once fully written
pub fn save_to_file(ctx: &SimulationContext, path: impl AsRef<Path>) -> Result<(), PersistError> {
    let path = path.as_ref();
    let json = SaveEnvelope::capture(ctx).to_json()?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    log::info!(
        "Game saved to {} (tick {}, level {})",
        path.display(),
        ctx.time_ticks,
        ctx.run.level
    );
    Ok(())
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<SimulationContext, PersistError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let envelope = SaveEnvelope::from_json(&json)?;
    log::info!(
        "Loaded save from {} (tick {})",
        path.display(),
        envelope.saved_at_tick
    );
    Ok(envelope.restore())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{TickInput, tick};

    fn played(ticks: u32) -> SimulationContext {
        let mut ctx = SimulationContext::new(11);
        ctx.reset_game(0);
        for i in 0..ticks {
            let input = TickInput {
                jump: i % 50 == 0,
                shoot: i % 25 == 0,
                ..Default::default()
            };
            tick(&mut ctx, &input, 1.0);
        }
        ctx
    }

    #[test]
    fn test_envelope_round_trip() {
        let ctx = played(300);
        let json = SaveEnvelope::capture(&ctx).to_json().unwrap();
        let envelope = SaveEnvelope::from_json(&json).unwrap();
        assert_eq!(envelope.version, SAVE_VERSION);
        assert_eq!(envelope.saved_at_tick, ctx.time_ticks);
        let restored = envelope.restore();
        assert_eq!(restored.run.score, ctx.run.score);
        assert_eq!(restored.obstacles.len(), ctx.obstacles.len());
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut envelope = SaveEnvelope::capture(&played(10));
        envelope.version = 99;
        let json = serde_json::to_string(&envelope).unwrap();
        match SaveEnvelope::from_json(&json) {
            Err(PersistError::UnsupportedVersion { found, expected }) => {
                assert_eq!((found, expected), (99, SAVE_VERSION));
            }
            other => panic!("expected version error, got {:?}", other.map(|e| e.version)),
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            SaveEnvelope::from_json("{\"version\": 1}"),
            Err(PersistError::Json(_))
        ));
        assert!(matches!(SaveEnvelope::from_json("nope"), Err(PersistError::Json(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let ctx = played(120);
        let path = std::env::temp_dir().join(format!("crypt-runner-save-{}.json", std::process::id()));
        save_to_file(&ctx, &path).unwrap();
        let restored = load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(restored.time_ticks, ctx.time_ticks);
        assert_eq!(restored.player.pos, ctx.player.pos);
    }
}
