//! Save/load persistence
//!
//! Features:
//! - Versioned JSON envelope around a full simulation snapshot
//! - Unknown versions rejected with a typed error
//! - Atomic file writes (tmp file, then rename)

pub mod envelope;

pub use envelope::{PersistError, SAVE_VERSION, SaveEnvelope, load_from_file, save_to_file};
