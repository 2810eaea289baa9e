use std::sync::{Arc, Mutex};

use super::error::{Result, TerminalError};

/// A key on the physical or on-screen keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Tab,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Delete,
    PageUp,
    PageDown,
}

/// A key press with its modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub alt: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            alt: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            alt: false,
        }
    }

    /// Bytes an xterm-compatible terminal sends for this key
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = match self.key {
            Key::Char(c) if self.ctrl && c.is_ascii_alphabetic() => {
                vec![(c.to_ascii_lowercase() as u8) & 0x1f]
            }
            Key::Char(' ') if self.ctrl => vec![0x00],
            Key::Char(c) => c.to_string().into_bytes(),
            Key::Enter => b"\r".to_vec(),
            Key::Backspace => b"\x7f".to_vec(),
            Key::Tab => b"\t".to_vec(),
            Key::Escape => b"\x1b".to_vec(),
            Key::Up => b"\x1b[A".to_vec(),
            Key::Down => b"\x1b[B".to_vec(),
            Key::Right => b"\x1b[C".to_vec(),
            Key::Left => b"\x1b[D".to_vec(),
            Key::Home => b"\x1b[H".to_vec(),
            Key::End => b"\x1b[F".to_vec(),
            Key::Delete => b"\x1b[3~".to_vec(),
            Key::PageUp => b"\x1b[5~".to_vec(),
            Key::PageDown => b"\x1b[6~".to_vec(),
        };
        if self.alt {
            bytes.insert(0, 0x1b);
        }
        bytes
    }
}

impl std::str::FromStr for KeyEvent {
    type Err = String;

    /// Parses names like `enter`, `up`, `x`, `ctrl+c`, `alt+b`, `ctrl+alt+d`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split('+').collect();
        // a literal plus sign
        if s.ends_with("++") || s == "+" {
            parts.retain(|p| !p.is_empty());
            parts.push("+");
        }
        let name = parts.pop().filter(|p| !p.is_empty()).ok_or_else(|| format!("Invalid key: '{}'", s))?;

        let mut event = KeyEvent::new(Key::Enter);
        for modifier in parts {
            match modifier.to_lowercase().as_str() {
                "ctrl" | "control" => event.ctrl = true,
                "alt" | "meta" => event.alt = true,
                other => return Err(format!("Unknown modifier '{}' in key '{}'", other, s)),
            }
        }

        let mut chars = name.chars();
        event.key = match (chars.next(), chars.next()) {
            (Some(c), None) => Key::Char(c),
            _ => match name.to_lowercase().as_str() {
                "enter" | "return" => Key::Enter,
                "backspace" => Key::Backspace,
                "tab" => Key::Tab,
                "esc" | "escape" => Key::Escape,
                "up" => Key::Up,
                "down" => Key::Down,
                "left" => Key::Left,
                "right" => Key::Right,
                "home" => Key::Home,
                "end" => Key::End,
                "delete" | "del" => Key::Delete,
                "pageup" => Key::PageUp,
                "pagedown" => Key::PageDown,
                "space" => Key::Char(' '),
                _ => return Err(format!("Unknown key name: '{}'", name)),
            },
        };
        Ok(event)
    }
}

/// Callback an external key observer registers
pub type KeyHook = Box<dyn Fn(&KeyEvent) + Send + Sync>;

/// Shared registration point for the on-screen keyboard
///
/// Every surface the manager creates holds a clone; a key delivered to any
/// surface is shown to the observer before it becomes input.
#[derive(Clone, Default)]
pub struct KeyboardBridge {
    observer: Arc<Mutex<Option<KeyHook>>>,
}

impl std::fmt::Debug for KeyboardBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyboardBridge")
            .field("observer", &self.has_observer())
            .finish()
    }
}

impl KeyboardBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the observer; the previous one must be unregistered first
    pub fn register(&self, hook: KeyHook) -> Result<()> {
        let mut observer = self.observer.lock().unwrap_or_else(|e| e.into_inner());
        if observer.is_some() {
            return Err(TerminalError::KeyObserverRegistered);
        }
        *observer = Some(hook);
        Ok(())
    }

    /// Remove the observer; returns whether one was installed
    pub fn unregister(&self) -> bool {
        self.observer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .is_some()
    }

    pub fn has_observer(&self) -> bool {
        self.observer
            .lock()
            .map(|o| o.is_some())
            .unwrap_or(false)
    }

    pub(crate) fn notify(&self, event: &KeyEvent) {
        let observer = self.observer.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(hook) = observer.as_ref() {
            hook(event);
        }
    }
}
