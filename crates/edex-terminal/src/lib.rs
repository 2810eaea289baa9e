// Terminal session management module
//
// This module owns the dashboard's fixed set of terminal tabs: each tab pairs a
// VT100/ANSI emulation surface with a WebSocket byte stream to a remote shell,
// and the manager handles creation, focus, resize propagation and teardown.

mod manager;
mod session;
mod surface;
mod theme;
mod fit;
mod layout;
mod transport;
mod attach;
mod keys;
mod tabs;
mod error;
pub mod backend;

// Re-export public API
pub use manager::{ConnectOutcome, ManagerOptions, PendingSession, SessionOptions, SlotEvent, SlotEventKind, TerminalManager};
pub use session::{SessionSlot, SlotInfo, SlotStatus};
pub use surface::{lock_surface, SharedSurface, SurfaceId, TerminalSurface, Vt100Backend};
pub use theme::{mix_colors, CellMetrics, CursorStyle, Palette, SurfaceConfig, DEFAULT_FONT_SIZE};
pub use fit::{ContainerSize, FitAddon, Geometry};
pub use layout::Layout;
pub use transport::{Link, Outbound, Transport, TransportId, WsConnector};
pub use attach::{AttachOptions, Attachment};
pub use keys::{Key, KeyEvent, KeyHook, KeyboardBridge};
pub use tabs::{TabShortcut, TabView};
pub use error::{Result, TerminalError};
pub use backend::{Connector, ShellAllocator, SurfaceBackend};

pub use edex_types::{Endpoint, MAX_SLOTS};

// Constants
pub const DEFAULT_SCROLLBACK_LINES: usize = 1000;
pub const DEFAULT_ROWS: u16 = 24;
pub const DEFAULT_COLS: u16 = 80;
