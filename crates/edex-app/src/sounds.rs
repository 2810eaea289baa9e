// Sound feedback: an explicit key -> player map with a silent default

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Sound keys the dashboard plays
pub const SOUND_KEYS: [&str; 12] = [
    "stdout", "stdin", "folder", "granted", "keyboard", "theme", "expand", "panels", "scan",
    "denied", "info", "alarm",
];

/// Playback contract every sound handle honours
pub trait SoundPlayer: Send + Sync {
    fn play(&self);
    fn stop(&self);
    fn pause(&self);
    fn set_volume(&self, volume: f32);
    fn name(&self) -> &str;
}

/// Player that does nothing; handed out for unknown keys and when audio is off
#[derive(Debug, Default)]
pub struct NullPlayer;

impl SoundPlayer for NullPlayer {
    fn play(&self) {}
    fn stop(&self) {}
    fn pause(&self) {}
    fn set_volume(&self, _volume: f32) {}

    fn name(&self) -> &str {
        "null"
    }
}

/// Player with no audio device behind it: records playback in the log
#[derive(Debug)]
pub struct LogPlayer {
    name: String,
    volume: Mutex<f32>,
}

impl LogPlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume: Mutex::new(1.0),
        }
    }

    pub fn volume(&self) -> f32 {
        *self.volume.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SoundPlayer for LogPlayer {
    fn play(&self) {
        log::trace!("sound '{}' at volume {:.2}", self.name, self.volume());
    }

    fn stop(&self) {
        log::trace!("sound '{}' stopped", self.name);
    }

    fn pause(&self) {
        log::trace!("sound '{}' paused", self.name);
    }

    fn set_volume(&self, volume: f32) {
        *self.volume.lock().unwrap_or_else(|e| e.into_inner()) = volume.clamp(0.0, 1.0);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Looks sounds up by key
pub struct SoundBoard {
    players: HashMap<String, Arc<dyn SoundPlayer>>,
    fallback: Arc<dyn SoundPlayer>,
}

impl SoundBoard {
    /// Board with a player for every known key, or an empty one when audio is
    /// disabled
    pub fn new(enabled: bool) -> Self {
        let mut board = Self::empty();
        if enabled {
            for key in SOUND_KEYS {
                board.register(key, Arc::new(LogPlayer::new(key)));
            }
        }
        board
    }

    pub fn empty() -> Self {
        Self {
            players: HashMap::new(),
            fallback: Arc::new(NullPlayer),
        }
    }

    pub fn register(&mut self, key: impl Into<String>, player: Arc<dyn SoundPlayer>) {
        self.players.insert(key.into(), player);
    }

    /// The player for `key`, or the silent one
    pub fn get(&self, key: &str) -> Arc<dyn SoundPlayer> {
        self.players
            .get(key)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    pub fn play(&self, key: &str) {
        self.get(key).play();
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.players.contains_key(key)
    }
}

impl std::fmt::Debug for SoundBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundBoard")
            .field("players", &self.players.len())
            .finish()
    }
}
