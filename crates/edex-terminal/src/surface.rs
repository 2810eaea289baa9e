use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc::UnboundedSender;
use vt100::Parser;

use super::backend::SurfaceBackend;
use super::error::{Result, TerminalError};
use super::fit::{ContainerSize, FitAddon, Geometry};
use super::keys::{KeyEvent, KeyboardBridge};
use super::theme::SurfaceConfig;
use super::{DEFAULT_COLS, DEFAULT_ROWS};

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a surface for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u64);

impl SurfaceId {
    fn next() -> Self {
        Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// A surface shared between its slot and the attachment pumps
pub type SharedSurface = Arc<Mutex<TerminalSurface>>;

/// Lock a shared surface, recovering the guard if a pump panicked while
/// holding it
pub fn lock_surface(surface: &SharedSurface) -> MutexGuard<'_, TerminalSurface> {
    surface.lock().unwrap_or_else(|e| e.into_inner())
}

/// Character-cell terminal emulation surface bound to a mount point
pub struct TerminalSurface {
    id: SurfaceId,
    mount: String,
    config: SurfaceConfig,
    parser: Parser,
    fit: Option<FitAddon>,
    focused: bool,
    disposed: bool,
    data_listener: Option<UnboundedSender<Vec<u8>>>,
    keyboard: Option<KeyboardBridge>,
}

impl std::fmt::Debug for TerminalSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSurface")
            .field("id", &self.id)
            .field("mount", &self.mount)
            .field("geometry", &self.geometry())
            .field("focused", &self.focused)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl TerminalSurface {
    /// Create a new surface mounted at `mount`
    pub fn new(mount: impl Into<String>, config: SurfaceConfig) -> Self {
        let parser = Parser::new(DEFAULT_ROWS, DEFAULT_COLS, config.scrollback);

        Self {
            id: SurfaceId::next(),
            mount: mount.into(),
            config,
            parser,
            fit: None,
            focused: false,
            disposed: false,
            data_listener: None,
            keyboard: None,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Render output bytes (feed to VT100 parser)
    pub fn write(&mut self, data: &[u8]) {
        if self.disposed {
            return;
        }
        self.parser.process(data);
    }

    /// Render a line of text followed by CRLF
    pub fn writeln(&mut self, text: &str) {
        self.write(text.as_bytes());
        self.write(b"\r\n");
    }

    /// Input produced on the surface (typed or pasted); goes to the data
    /// listener, or nowhere if none is registered
    pub fn input(&mut self, data: &[u8]) {
        if self.disposed || data.is_empty() {
            return;
        }
        if let Some(listener) = &self.data_listener {
            if listener.send(data.to_vec()).is_err() {
                log::debug!("{}: input listener has gone away", self.id);
                self.data_listener = None;
            }
        }
    }

    pub fn paste(&mut self, text: &str) {
        self.input(text.as_bytes());
    }

    /// A key press on this surface; the key observer sees it first
    pub fn key_down(&mut self, event: &KeyEvent) {
        if self.disposed {
            return;
        }
        if let Some(keyboard) = &self.keyboard {
            keyboard.notify(event);
        }
        self.input(&event.to_bytes());
    }

    /// Register the single input listener
    pub fn on_data(&mut self, listener: UnboundedSender<Vec<u8>>) -> Result<()> {
        if self.data_listener.is_some() {
            return Err(TerminalError::ListenerRegistered);
        }
        self.data_listener = Some(listener);
        Ok(())
    }

    /// Remove the input listener; returns whether one was registered
    pub fn off_data(&mut self) -> bool {
        self.data_listener.take().is_some()
    }

    pub fn has_data_listener(&self) -> bool {
        self.data_listener.is_some()
    }

    pub(crate) fn set_keyboard(&mut self, keyboard: KeyboardBridge) {
        self.keyboard = Some(keyboard);
    }

    /// Load the fit capability, sized from this surface's cell metrics
    pub fn load_fit(&mut self) {
        self.fit = Some(FitAddon::new(self.config.cell_metrics()));
    }

    pub fn has_fit(&self) -> bool {
        self.fit.is_some()
    }

    /// Resize to fill `container`; returns the new geometry if it changed
    pub fn fit(&mut self, container: ContainerSize) -> Option<Geometry> {
        if self.disposed {
            return None;
        }
        let geometry = self.fit.as_mut()?.fit(container)?;
        if geometry == self.geometry() {
            return None;
        }
        self.resize(geometry);
        Some(geometry)
    }

    /// Resize the screen, keeping its contents
    pub fn resize(&mut self, geometry: Geometry) {
        self.parser.set_size(geometry.rows, geometry.cols);
    }

    pub fn geometry(&self) -> Geometry {
        let (rows, cols) = self.parser.screen().size();
        Geometry { rows, cols }
    }

    /// Scroll the viewport; negative moves up into the scrollback.
    /// Returns the resulting offset from the bottom.
    pub fn scroll_lines(&mut self, amount: i32) -> usize {
        let current = self.parser.screen().scrollback() as i64;
        let target = (current - amount as i64).max(0) as usize;
        self.parser.set_scrollback(target);
        self.parser.screen().scrollback()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.parser.set_scrollback(0);
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused && !self.disposed;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Visible screen as plain text
    pub fn contents(&self) -> String {
        self.parser.screen().contents()
    }

    /// Visible screen with ANSI attributes
    pub fn contents_formatted(&self) -> Vec<u8> {
        self.parser.screen().contents_formatted()
    }

    /// Cursor position (row, col)
    pub fn cursor(&self) -> (u16, u16) {
        self.parser.screen().cursor_position()
    }

    /// Window title set by the remote program (OSC 0/2)
    pub fn title(&self) -> &str {
        self.parser.screen().title()
    }

    /// Detach everything from the surface; it renders nothing afterwards
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        log::debug!("Disposing {} at '{}'", self.id, self.mount);
        self.disposed = true;
        self.focused = false;
        self.data_listener = None;
        self.keyboard = None;
        self.fit = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Surface backend rendering into in-memory VT100 screens
#[derive(Debug, Default, Clone)]
pub struct Vt100Backend;

impl Vt100Backend {
    pub fn new() -> Self {
        Self
    }
}

impl SurfaceBackend for Vt100Backend {
    fn open(&self, mount: &str, config: &SurfaceConfig) -> Result<TerminalSurface> {
        Ok(TerminalSurface::new(mount, config.clone()))
    }

    fn backend_name(&self) -> &str {
        "vt100"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc;

    fn surface() -> TerminalSurface {
        Vt100Backend::new()
            .open("terminal0", &SurfaceConfig::default())
            .unwrap()
    }

    #[test]
    fn test_write_renders_text() {
        let mut surface = surface();
        surface.writeln("Welcome");
        surface.write(b"\x1b[31mred\x1b[0m");

        assert_eq!(surface.contents(), "Welcome\nred");
        assert_eq!(surface.cursor(), (1, 3));
        assert!(String::from_utf8_lossy(&surface.contents_formatted()).contains("red"));
    }

    #[test]
    fn test_title_from_osc() {
        let mut surface = surface();
        surface.write(b"\x1b]0;vim\x07");
        assert_eq!(surface.title(), "vim");
    }

    #[test]
    fn test_single_input_listener() {
        let mut surface = surface();
        let (tx, mut rx) = mpsc::unbounded_channel();
        surface.on_data(tx).unwrap();

        let (other, _rx) = mpsc::unbounded_channel();
        assert!(matches!(surface.on_data(other), Err(TerminalError::ListenerRegistered)));

        surface.paste("ls");
        surface.key_down(&KeyEvent::new(Key::Enter));
        assert_eq!(rx.try_recv().unwrap(), b"ls".to_vec());
        assert_eq!(rx.try_recv().unwrap(), b"\r".to_vec());

        assert!(surface.off_data());
        surface.paste("dropped");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_fit_resizes_once() {
        let mut surface = surface();
        assert_eq!(surface.fit(ContainerSize::new(900, 360)), None, "no fit loaded");

        surface.load_fit();
        assert_eq!(surface.fit(ContainerSize::new(900, 360)), Some(Geometry::new(20, 100)));
        assert_eq!(surface.fit(ContainerSize::new(900, 360)), None);
        assert_eq!(surface.geometry(), Geometry::new(20, 100));
    }

    #[test]
    fn test_scrollback() {
        let mut surface = surface();
        for i in 0..60 {
            surface.writeln(&format!("line {}", i));
        }
        assert_eq!(surface.scroll_lines(-10), 10);
        assert_eq!(surface.scroll_lines(4), 6);
        assert_eq!(surface.scroll_lines(100), 0);
    }

    #[test]
    fn test_dispose() {
        let mut surface = surface();
        let (tx, _rx) = mpsc::unbounded_channel();
        surface.on_data(tx).unwrap();
        surface.load_fit();
        surface.set_focus(true);

        surface.dispose();
        surface.write(b"ignored");
        surface.set_focus(true);

        assert!(surface.is_disposed());
        assert!(!surface.is_focused());
        assert!(!surface.has_data_listener());
        assert!(!surface.has_fit());
        assert_eq!(surface.contents(), "");
    }
}
