use edex_types::{DEFAULT_PORT, MAX_SLOTS};

use super::session::{SlotInfo, SlotStatus};

/// What a tab label shows; a pure function of slot state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub index: usize,
    pub label: String,
    pub active: bool,
}

impl TabView {
    pub fn from_info(info: &SlotInfo) -> Self {
        Self {
            index: info.index,
            label: tab_label(info),
            active: info.focused,
        }
    }
}

fn tab_label(info: &SlotInfo) -> String {
    match &info.status {
        SlotStatus::Connecting => "LOADING...".to_string(),
        SlotStatus::Failed(_) => "ERROR".to_string(),
        SlotStatus::Detached => "EMPTY".to_string(),
        SlotStatus::Empty if info.index == 0 => "MAIN SHELL".to_string(),
        SlotStatus::Empty => format!("SHELL {}", info.index + 1),
        SlotStatus::Live if info.index == 0 => "MAIN SHELL".to_string(),
        SlotStatus::Live if !info.title.is_empty() => {
            format!("#{} - {}", info.index + 1, info.title)
        }
        SlotStatus::Live => match &info.endpoint {
            Some(endpoint) if endpoint.port != DEFAULT_PORT => format!("::{}", endpoint.port),
            _ => format!("SHELL {}", info.index + 1),
        },
    }
}

/// Keyboard shortcuts that move between tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabShortcut {
    Next,
    Previous,
    /// Zero-based slot index
    Goto(usize),
}

impl TabShortcut {
    /// Slot the shortcut leads to, given the focused index and which slots
    /// hold a surface. Next/previous only visit slots with a surface and fall
    /// back to slot 0; `Goto` may land on an empty slot, which creates it.
    pub fn target(&self, current: usize, has_surface: &[bool]) -> usize {
        let count = has_surface.len().max(1);
        let step = |offset: usize| -> usize {
            (1..count)
                .map(|n| (current + offset * n) % count)
                .find(|&i| has_surface.get(i).copied().unwrap_or(false))
                .unwrap_or(0)
        };
        match self {
            Self::Next => step(1),
            Self::Previous => step(count - 1),
            Self::Goto(index) => *index,
        }
    }
}

impl std::str::FromStr for TabShortcut {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NEXT_TAB" => Ok(Self::Next),
            "PREVIOUS_TAB" => Ok(Self::Previous),
            other => other
                .strip_prefix("TAB_")
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|n| (1..=MAX_SLOTS).contains(n))
                .map(|n| Self::Goto(n - 1))
                .ok_or_else(|| {
                    format!(
                        "Invalid tab shortcut: '{}'. Valid options: NEXT_TAB, PREVIOUS_TAB, TAB_1..TAB_{}",
                        s, MAX_SLOTS
                    )
                }),
        }
    }
}

impl std::fmt::Display for TabShortcut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Next => write!(f, "NEXT_TAB"),
            Self::Previous => write!(f, "PREVIOUS_TAB"),
            Self::Goto(index) => write!(f, "TAB_{}", index + 1),
        }
    }
}
