use edex_types::{Endpoint, SpawnError};
use thiserror::Error;

/// Errors raised by the terminal session manager
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("{0} is not available")]
    PrerequisiteMissing(&'static str),

    #[error("slot index {index} is out of range (0..{max})")]
    InvalidIndex { index: usize, max: usize },

    #[error("slot {0} already holds a session; destroy it before creating a new one")]
    SlotBusy(usize),

    #[error("mount point '{0}' does not exist")]
    MountMissing(String),

    #[error("failed to open transport to {endpoint}: {reason}")]
    TransportOpen { endpoint: Endpoint, reason: String },

    #[error("transport {0} is already attached to a surface")]
    AlreadyAttached(u64),

    #[error("surface already has an input listener")]
    ListenerRegistered,

    #[error("a key observer is already registered")]
    KeyObserverRegistered,

    #[error("slot {0} was torn down while its transport was connecting")]
    Superseded(usize),

    #[error("shell allocation failed: {0}")]
    Spawn(#[from] SpawnError),

    #[error("backend call failed: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, TerminalError>;
