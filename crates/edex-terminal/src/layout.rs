use std::collections::HashMap;

use edex_types::{mount_key, tab_key, MAX_SLOTS};

use super::fit::ContainerSize;

/// Mount points the manager renders into
///
/// Holds one container per mount key with its current pixel size, and the
/// set of tab-label keys. The manager never round-trips state through here;
/// it only asks whether a mount exists and how big it is.
#[derive(Debug, Clone)]
pub struct Layout {
    window: ContainerSize,
    mounts: HashMap<String, ContainerSize>,
    tabs: Vec<String>,
}

impl Layout {
    /// Empty layout for a window of the given size
    pub fn new(window: ContainerSize) -> Self {
        Self {
            window,
            mounts: HashMap::new(),
            tabs: Vec::new(),
        }
    }

    /// Layout with the per-slot containers and tab labels already in place
    pub fn scaffolded(window: ContainerSize) -> Self {
        let mut layout = Self::new(window);
        layout.scaffold();
        layout
    }

    /// Create any missing `terminal{i}` container and `shell_tab{i}` label
    pub fn scaffold(&mut self) {
        for index in 0..MAX_SLOTS {
            let window = self.window;
            self.mounts.entry(mount_key(index)).or_insert(window);
            let tab = tab_key(index);
            if !self.tabs.contains(&tab) {
                self.tabs.push(tab);
            }
        }
    }

    pub fn add_mount(&mut self, key: impl Into<String>, size: ContainerSize) {
        self.mounts.insert(key.into(), size);
    }

    pub fn remove_mount(&mut self, key: &str) -> bool {
        self.mounts.remove(key).is_some()
    }

    pub fn has_mount(&self, key: &str) -> bool {
        self.mounts.contains_key(key)
    }

    pub fn container(&self, key: &str) -> Option<ContainerSize> {
        self.mounts.get(key).copied()
    }

    /// Resize one container; returns false when the mount does not exist
    pub fn set_container(&mut self, key: &str, size: ContainerSize) -> bool {
        match self.mounts.get_mut(key) {
            Some(container) => {
                *container = size;
                true
            }
            None => false,
        }
    }

    /// Window resize: every container follows the window
    pub fn resize_window(&mut self, size: ContainerSize) {
        self.window = size;
        for container in self.mounts.values_mut() {
            *container = size;
        }
    }

    pub fn window(&self) -> ContainerSize {
        self.window
    }

    pub fn tab_keys(&self) -> &[String] {
        &self.tabs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scaffold_is_idempotent() {
        let mut layout = Layout::new(ContainerSize::new(720, 432));
        assert!(!layout.has_mount("terminal0"));

        layout.scaffold();
        layout.set_container("terminal3", ContainerSize::new(100, 100));
        layout.scaffold();

        assert!(layout.has_mount("terminal4"));
        assert_eq!(layout.tab_keys().len(), MAX_SLOTS);
        assert_eq!(layout.container("terminal3"), Some(ContainerSize::new(100, 100)));
    }

    #[test]
    fn test_resize_window_updates_every_mount() {
        let mut layout = Layout::scaffolded(ContainerSize::new(720, 432));
        layout.add_mount("extra", ContainerSize::new(1, 1));
        layout.resize_window(ContainerSize::new(1920, 1080));

        assert_eq!(layout.container("terminal0"), Some(ContainerSize::new(1920, 1080)));
        assert_eq!(layout.container("extra"), Some(ContainerSize::new(1920, 1080)));
        assert!(!layout.set_container("missing", ContainerSize::new(1, 1)));
    }
}
