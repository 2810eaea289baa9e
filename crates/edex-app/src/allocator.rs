use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use edex_terminal::{Result, ShellAllocator};
use edex_types::{SpawnReply, MAX_SLOTS, SPAWN_ERROR_PREFIX};

/// Hands out the fixed ports of a shell server that pre-spawns its extra
/// shells on `base + 2`, `base + 3`, ...
///
/// Replies use the server's sentinel format so callers parse them the same
/// way as a live backend reply.
#[derive(Debug)]
pub struct StaticPortAllocator {
    base_port: u16,
    in_use: Mutex<BTreeSet<u16>>,
}

impl StaticPortAllocator {
    pub fn new(base_port: u16) -> Self {
        Self {
            base_port,
            in_use: Mutex::new(BTreeSet::new()),
        }
    }

    fn candidates(&self) -> impl Iterator<Item = u16> + '_ {
        (0..(MAX_SLOTS - 1) as u16).filter_map(move |i| self.base_port.checked_add(2 + i))
    }

    /// Free every allocated port that no session holds any more
    pub fn reclaim(&self, held: &[u16]) {
        self.in_use
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|port| held.contains(port));
    }

    pub fn allocated(&self) -> Vec<u16> {
        self.in_use
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .copied()
            .collect()
    }
}

#[async_trait]
impl ShellAllocator for StaticPortAllocator {
    async fn spawn_tty(&self) -> Result<String> {
        let mut in_use = self.in_use.lock().unwrap_or_else(|e| e.into_inner());
        let free = self.candidates().find(|port| !in_use.contains(port));
        Ok(match free {
            Some(port) => {
                in_use.insert(port);
                SpawnReply { port }.to_wire()
            }
            None => format!("{}: all shells are in use", SPAWN_ERROR_PREFIX),
        })
    }
}
