use std::sync::{Arc, Mutex};

use chrono::Utc;
use edex_types::{mount_key, Endpoint, SpawnReply, DEFAULT_HOST, DEFAULT_PORT, MAX_SLOTS};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::attach::{AttachOptions, Attachment};
use super::backend::{Connector, ShellAllocator, SurfaceBackend};
use super::error::{Result, TerminalError};
use super::fit::{ContainerSize, Geometry};
use super::keys::{KeyEvent, KeyHook, KeyboardBridge};
use super::layout::Layout;
use super::session::{SessionSlot, SlotInfo, SlotStatus};
use super::surface::{lock_surface, SharedSurface, Vt100Backend};
use super::tabs::{TabShortcut, TabView};
use super::theme::SurfaceConfig;
use super::transport::{Link, Transport, WsConnector};
use super::{DEFAULT_COLS, DEFAULT_ROWS};

/// Manager-wide settings
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Theme-derived configuration every surface is created with
    pub surface: SurfaceConfig,
    /// Where sessions connect when the caller does not say
    pub default_endpoint: Endpoint,
    /// Initial window size; every terminal container starts at this size
    pub window: ContainerSize,
    /// Line written into the main shell after initialization
    pub welcome: Option<String>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        let surface = SurfaceConfig::default();
        let cell = surface.cell_metrics();
        Self {
            window: ContainerSize::new(
                (cell.width * DEFAULT_COLS as f32).ceil() as u32,
                (cell.height * DEFAULT_ROWS as f32).ceil() as u32,
            ),
            surface,
            default_endpoint: Endpoint::default(),
            welcome: None,
        }
    }
}

/// Where a new session connects and renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub host: String,
    pub port: u16,
    /// Mount key; `terminal{index}` when unset
    pub mount: Option<String>,
}

impl SessionOptions {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            mount: None,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl From<Endpoint> for SessionOptions {
    fn from(endpoint: Endpoint) -> Self {
        Self::new(endpoint.host, endpoint.port)
    }
}

/// Lifecycle notification of one slot incarnation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotEventKind {
    Opened,
    Closed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotEvent {
    pub index: usize,
    pub generation: u64,
    pub kind: SlotEventKind,
}

/// A creation waiting on its transport
///
/// Holds nothing borrowed from the manager, so the manager stays usable
/// while `connect` is pending.
pub struct PendingSession {
    index: usize,
    generation: u64,
    endpoint: Endpoint,
    surface: SharedSurface,
    connector: Arc<dyn Connector>,
}

impl std::fmt::Debug for PendingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSession")
            .field("index", &self.index)
            .field("generation", &self.generation)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl PendingSession {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The surface created for this session
    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    /// Open the transport
    pub async fn connect(self) -> ConnectOutcome {
        log::debug!(
            "Slot {}: opening {} transport to {}",
            self.index,
            self.connector.connector_name(),
            self.endpoint
        );
        let result = self.connector.connect(&self.endpoint).await;
        ConnectOutcome {
            index: self.index,
            generation: self.generation,
            endpoint: self.endpoint,
            result,
        }
    }
}

/// Result of `PendingSession::connect`, handed back to `finish_session`
#[derive(Debug)]
pub struct ConnectOutcome {
    index: usize,
    generation: u64,
    endpoint: Endpoint,
    result: Result<Link>,
}

/// Owns the fixed set of terminal slots and the single focus among them
pub struct TerminalManager {
    surfaces: Option<Arc<dyn SurfaceBackend>>,
    connector: Option<Arc<dyn Connector>>,
    options: ManagerOptions,
    layout: Layout,
    slots: Vec<SessionSlot>,
    current: usize,
    initialized: bool,
    keyboard: KeyboardBridge,
    events_tx: UnboundedSender<SlotEvent>,
    events_rx: UnboundedReceiver<SlotEvent>,
}

impl std::fmt::Debug for TerminalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalManager")
            .field(
                "surfaces",
                &self.surfaces.as_ref().map(|s| s.backend_name().to_string()),
            )
            .field(
                "connector",
                &self.connector.as_ref().map(|c| c.connector_name().to_string()),
            )
            .field("current", &self.current)
            .field("initialized", &self.initialized)
            .field("slots", &self.slots)
            .finish()
    }
}

impl TerminalManager {
    /// Create a manager with no surface backend or connector installed;
    /// `initialize` fails until both are provided
    pub fn new(options: ManagerOptions) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            surfaces: None,
            connector: None,
            layout: Layout::scaffolded(options.window),
            options,
            slots: (0..MAX_SLOTS).map(SessionSlot::new).collect(),
            current: 0,
            initialized: false,
            keyboard: KeyboardBridge::new(),
            events_tx,
            events_rx,
        }
    }

    /// Create a manager rendering into VT100 screens over WebSockets
    pub fn websocket(options: ManagerOptions) -> Self {
        Self::new(options)
            .with_surface_backend(Arc::new(Vt100Backend::new()))
            .with_connector(Arc::new(WsConnector::new()))
    }

    pub fn with_surface_backend(mut self, backend: Arc<dyn SurfaceBackend>) -> Self {
        self.surfaces = Some(backend);
        self
    }

    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    fn check_index(index: usize) -> Result<()> {
        if index >= MAX_SLOTS {
            return Err(TerminalError::InvalidIndex {
                index,
                max: MAX_SLOTS,
            });
        }
        Ok(())
    }

    fn prerequisites(&self) -> Result<(Arc<dyn SurfaceBackend>, Arc<dyn Connector>)> {
        let surfaces = self
            .surfaces
            .clone()
            .ok_or(TerminalError::PrerequisiteMissing("terminal surface backend"))?;
        let connector = self
            .connector
            .clone()
            .ok_or(TerminalError::PrerequisiteMissing("transport connector"))?;
        Ok((surfaces, connector))
    }

    fn default_session_options(&self) -> SessionOptions {
        SessionOptions::from(self.options.default_endpoint.clone())
    }

    /// Bring the manager up: verify the backends, build the mount scaffold,
    /// create and focus the main shell
    ///
    /// Only missing backends are an error. If the main shell fails to connect
    /// slot 0 is left `Failed` and the manager still comes up.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            log::warn!("Terminal manager already initialized");
            return Ok(());
        }

        if let Err(e) = self.prerequisites() {
            log::error!("Cannot start terminal manager: {}", e);
            return Err(e);
        }

        self.layout.scaffold();

        // a main shell that cannot connect only marks its tab; the other
        // slots stay usable
        let options = self.default_session_options();
        if let Err(e) = self.create_session(0, options).await {
            log::error!("Failed to start main shell: {}", e);
        }

        self.initialized = true;
        self.set_focus(0);
        self.fit(0)?;

        if let Some(welcome) = self.options.welcome.clone() {
            if let Some(surface) = self.slots[0].surface() {
                lock_surface(surface).writeln(&welcome);
            }
        }

        log::info!("Terminal manager initialized ({} slots)", MAX_SLOTS);
        Ok(())
    }

    /// Create, connect and attach a session in slot `index`
    ///
    /// The slot must be vacant; destroy it first to recreate. On failure the
    /// slot is left holding nothing, with status `Failed`.
    pub async fn create_session(
        &mut self,
        index: usize,
        options: SessionOptions,
    ) -> Result<SharedSurface> {
        let pending = self.begin_session(index, options)?;
        let outcome = pending.connect().await;
        self.finish_session(outcome)
    }

    /// Synchronous half of creation: surface, fit and keyboard hook
    pub fn begin_session(
        &mut self,
        index: usize,
        options: SessionOptions,
    ) -> Result<PendingSession> {
        Self::check_index(index)?;
        self.process_events();
        let (surfaces, connector) = self.prerequisites()?;

        if !self.slots[index].is_vacant() {
            return Err(TerminalError::SlotBusy(index));
        }

        let mount = options.mount.clone().unwrap_or_else(|| mount_key(index));
        let container = self
            .layout
            .container(&mount)
            .ok_or_else(|| TerminalError::MountMissing(mount.clone()))?;

        let mut surface = match surfaces.open(&mount, &self.options.surface) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Slot {}: failed to create surface: {}", index, e);
                self.slots[index].status = SlotStatus::Failed(e.to_string());
                return Err(e);
            }
        };
        surface.load_fit();
        surface.fit(container);
        surface.set_keyboard(self.keyboard.clone());

        let surface = Arc::new(Mutex::new(surface));
        let endpoint = options.endpoint();

        let slot = &mut self.slots[index];
        slot.generation += 1;
        slot.surface = Some(Arc::clone(&surface));
        slot.endpoint = Some(endpoint.clone());
        slot.status = SlotStatus::Connecting;

        log::debug!("Slot {}: surface mounted at '{}'", index, mount);

        Ok(PendingSession {
            index,
            generation: slot.generation,
            endpoint,
            surface,
            connector,
        })
    }

    /// Final half of creation: attach the opened transport, or clean up
    /// after a failed one. Must run inside a tokio runtime.
    pub fn finish_session(&mut self, outcome: ConnectOutcome) -> Result<SharedSurface> {
        let ConnectOutcome {
            index,
            generation,
            endpoint,
            result,
        } = outcome;
        Self::check_index(index)?;
        self.process_events();

        let slot = &self.slots[index];
        if slot.generation != generation || slot.status != SlotStatus::Connecting {
            log::debug!("Slot {}: dropping transport of a superseded creation", index);
            return Err(TerminalError::Superseded(index));
        }

        let link = match result {
            Ok(link) => link,
            Err(e) => return Err(self.fail_session(index, e)),
        };

        let surface = match self.slots[index].surface.clone() {
            Some(surface) => surface,
            None => return Err(TerminalError::Superseded(index)),
        };

        let mut transport = Transport::new(endpoint.clone(), link);
        let events = self.events_tx.clone();
        let attach_options = AttachOptions {
            bidirectional: true,
            local_echo: Arc::clone(&self.slots[index].local_echo),
        };
        let attachment = match Attachment::attach(
            &mut transport,
            Arc::clone(&surface),
            attach_options,
            move || {
                let _ = events.send(SlotEvent {
                    index,
                    generation,
                    kind: SlotEventKind::Closed,
                });
            },
        ) {
            Ok(attachment) => attachment,
            Err(e) => return Err(self.fail_session(index, e)),
        };

        let slot = &mut self.slots[index];
        slot.transport = Some(transport);
        slot.attachment = Some(attachment);
        slot.status = SlotStatus::Live;
        slot.created_at = Some(Utc::now());

        // The backend learns the geometry once, then on every change
        let geometry = match self.fit(index)? {
            Some(geometry) => geometry,
            None => {
                let geometry = lock_surface(&surface).geometry();
                if let Some(transport) = self.slots[index].transport() {
                    transport.send(&geometry.resize_sequence());
                }
                geometry
            }
        };

        log::info!("Slot {}: connected to {} ({})", index, endpoint, geometry);
        self.notify(index, generation, SlotEventKind::Opened);
        Ok(surface)
    }

    fn fail_session(&mut self, index: usize, error: TerminalError) -> TerminalError {
        log::error!("Slot {}: {}", index, error);
        let slot = &mut self.slots[index];
        let generation = slot.generation;
        slot.teardown();
        slot.status = SlotStatus::Failed(error.to_string());
        self.notify(index, generation, SlotEventKind::Failed(error.to_string()));
        error
    }

    fn notify(&self, index: usize, generation: u64, kind: SlotEventKind) {
        let _ = self.events_tx.send(SlotEvent {
            index,
            generation,
            kind,
        });
    }

    /// Apply a lifecycle event; stale events from an older incarnation of the
    /// slot are dropped
    fn apply_event(&mut self, event: SlotEvent) -> Option<SlotEvent> {
        let slot = self.slots.get_mut(event.index)?;
        match event.kind {
            SlotEventKind::Closed => {
                if slot.generation != event.generation || slot.status != SlotStatus::Live {
                    log::debug!(
                        "Slot {}: ignoring close of generation {}",
                        event.index,
                        event.generation
                    );
                    return None;
                }
                slot.detach();
                log::info!("Slot {}: remote shell closed the connection", event.index);
            }
            // Failure bumps the generation past the failed incarnation
            SlotEventKind::Failed(_) => {}
            SlotEventKind::Opened => {
                if slot.generation != event.generation {
                    return None;
                }
            }
        }
        Some(event)
    }

    /// Apply every pending lifecycle event; returns the ones that took effect
    pub fn process_events(&mut self) -> Vec<SlotEvent> {
        let mut applied = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            if let Some(event) = self.apply_event(event) {
                applied.push(event);
            }
        }
        applied
    }

    /// Wait for the next lifecycle event that takes effect
    pub async fn next_event(&mut self) -> Option<SlotEvent> {
        loop {
            let event = self.events_rx.recv().await?;
            if let Some(event) = self.apply_event(event) {
                return Some(event);
            }
        }
    }

    fn set_focus(&mut self, index: usize) {
        for (i, slot) in self.slots.iter().enumerate() {
            if let Some(surface) = slot.surface() {
                lock_surface(surface).set_focus(i == index);
            }
        }
        self.current = index;
    }

    /// Focus slot `index`, creating it first if it holds no surface
    ///
    /// If creation fails the error is returned and focus stays where it was.
    pub async fn focus_session(&mut self, index: usize) -> Result<()> {
        Self::check_index(index)?;
        self.process_events();

        if !self.slots[index].has_surface() {
            let options = self.default_session_options();
            self.create_session(index, options).await?;
        }

        self.set_focus(index);
        self.fit(index)?;
        log::debug!("Focused slot {}", index);
        Ok(())
    }

    /// Refit slot `index` to its container; a no-op without a surface.
    /// Returns the new geometry when it changed.
    pub fn fit(&mut self, index: usize) -> Result<Option<Geometry>> {
        Self::check_index(index)?;
        let slot = &self.slots[index];
        let Some(surface) = slot.surface() else {
            return Ok(None);
        };

        let mut surface = lock_surface(surface);
        let Some(container) = self.layout.container(surface.mount()) else {
            return Ok(None);
        };
        let Some(geometry) = surface.fit(container) else {
            return Ok(None);
        };
        drop(surface);

        if let Some(transport) = slot.transport().filter(|t| t.is_open()) {
            transport.send(&geometry.resize_sequence());
        }
        log::debug!("Slot {}: resized to {}", index, geometry);
        Ok(Some(geometry))
    }

    /// Refit every slot that holds a surface
    pub fn fit_all(&mut self) {
        self.process_events();
        for index in 0..MAX_SLOTS {
            if let Err(e) = self.fit(index) {
                log::warn!("Slot {}: fit failed: {}", index, e);
            }
        }
    }

    /// Window resize handler: every container follows the window, then refit
    pub fn resize_window(&mut self, size: ContainerSize) {
        self.layout.resize_window(size);
        self.fit_all();
    }

    /// Send raw bytes to the slot's transport; dropped if it is not open
    pub fn write(&mut self, index: usize, data: &[u8]) -> Result<()> {
        Self::check_index(index)?;
        self.process_events();
        if let Some(transport) = self.slots[index].transport() {
            transport.send(data);
        }
        Ok(())
    }

    /// `write` followed by CRLF
    pub fn write_line(&mut self, index: usize, text: &str) -> Result<()> {
        let mut data = text.as_bytes().to_vec();
        data.extend_from_slice(b"\r\n");
        self.write(index, &data)
    }

    /// Tear down slot `index`; a no-op on an empty slot
    ///
    /// If the focused slot goes away, focus moves to the nearest live slot
    /// before it.
    pub fn destroy_session(&mut self, index: usize) -> Result<()> {
        Self::check_index(index)?;
        self.process_events();
        self.slots[index].teardown();

        if self.initialized && index == self.current {
            let fallback = (1..MAX_SLOTS)
                .map(|n| (index + MAX_SLOTS - n) % MAX_SLOTS)
                .find(|&i| self.slots[i].has_surface());
            if let Some(fallback) = fallback {
                self.set_focus(fallback);
                log::debug!("Slot {} closed, focus moved to {}", index, fallback);
            }
        }
        Ok(())
    }

    /// Tear down every slot; used at shutdown. Safe to call repeatedly.
    pub fn destroy_all(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.teardown();
        }
        // Anything still queued belongs to incarnations that no longer exist
        while self.events_rx.try_recv().is_ok() {}
        if self.initialized {
            log::info!("All terminal sessions destroyed");
        }
        self.current = 0;
        self.initialized = false;
    }

    /// Ask the backend for a new shell and open a session on it
    pub async fn open_shell(
        &mut self,
        index: usize,
        allocator: &dyn ShellAllocator,
    ) -> Result<SharedSurface> {
        Self::check_index(index)?;
        let reply = allocator.spawn_tty().await?;
        let port = SpawnReply::parse(&reply)
            .inspect_err(|e| log::error!("Slot {}: {}", index, e))?
            .port;
        let options = SessionOptions::new(self.options.default_endpoint.host.clone(), port);
        self.create_session(index, options).await
    }

    /// Follow a tab shortcut; returns the slot that ends up focused
    pub async fn apply_shortcut(&mut self, shortcut: TabShortcut) -> Result<usize> {
        self.process_events();
        let has_surface: Vec<bool> = self.slots.iter().map(SessionSlot::has_surface).collect();
        let target = shortcut.target(self.current, &has_surface);
        self.focus_session(target).await?;
        Ok(self.current)
    }

    /// Inject a synthetic key into the focused surface; false if nothing is
    /// focused
    pub fn send_key(&mut self, event: &KeyEvent) -> bool {
        match self.slots[self.current].surface() {
            Some(surface) if self.initialized => {
                lock_surface(surface).key_down(event);
                true
            }
            _ => false,
        }
    }

    /// Install the on-screen keyboard's key observer
    pub fn register_key_observer(&mut self, hook: KeyHook) -> Result<()> {
        self.keyboard.register(hook)
    }

    pub fn unregister_key_observer(&mut self) -> bool {
        self.keyboard.unregister()
    }

    /// Turn local rendering of typed input on or off for a slot
    pub fn set_local_echo(&mut self, index: usize, enabled: bool) -> Result<()> {
        Self::check_index(index)?;
        self.slots[index]
            .local_echo
            .store(enabled, std::sync::atomic::Ordering::Relaxed);
        Ok(())
    }

    /// Record the working directory reported by the remote shell
    pub fn report_cwd(&mut self, index: usize, path: impl Into<String>) -> Result<()> {
        Self::check_index(index)?;
        let slot = &mut self.slots[index];
        if slot.has_surface() {
            slot.working_directory = path.into();
        }
        Ok(())
    }

    pub fn cwd(&self, index: usize) -> Result<&str> {
        Self::check_index(index)?;
        Ok(self.slots[index].working_directory())
    }

    /// Working directory of the focused slot
    pub fn current_cwd(&self) -> &str {
        self.slots[self.current].working_directory()
    }

    /// Scroll slot `index`'s viewport; returns the offset from the bottom
    pub fn scroll_lines(&mut self, index: usize, amount: i32) -> Result<Option<usize>> {
        Self::check_index(index)?;
        Ok(self.slots[index]
            .surface()
            .map(|surface| lock_surface(surface).scroll_lines(amount)))
    }

    /// Plain-text screen of slot `index`, if it has a surface
    pub fn screen(&self, index: usize) -> Result<Option<String>> {
        Self::check_index(index)?;
        Ok(self.slots[index]
            .surface()
            .map(|surface| lock_surface(surface).contents()))
    }

    pub fn slot(&self, index: usize) -> Result<&SessionSlot> {
        Self::check_index(index)?;
        Ok(&self.slots[index])
    }

    pub fn slot_info(&self) -> Vec<SlotInfo> {
        self.slots
            .iter()
            .map(|slot| slot.info(self.initialized && slot.index() == self.current))
            .collect()
    }

    pub fn tabs(&self) -> Vec<TabView> {
        self.slot_info().iter().map(TabView::from_info).collect()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }
}

impl Drop for TerminalManager {
    fn drop(&mut self) {
        self.destroy_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_window_fits_default_geometry() {
        let options = ManagerOptions::default();
        let manager = TerminalManager::new(options);
        assert_eq!(manager.layout().container("terminal4"), Some(ContainerSize::new(720, 432)));
    }

    #[tokio::test]
    async fn test_initialize_without_backends_is_fatal() {
        let mut manager = TerminalManager::new(ManagerOptions::default());
        assert!(matches!(
            manager.initialize().await,
            Err(TerminalError::PrerequisiteMissing("terminal surface backend"))
        ));

        let mut manager = TerminalManager::new(ManagerOptions::default())
            .with_surface_backend(Arc::new(Vt100Backend::new()));
        assert!(matches!(
            manager.initialize().await,
            Err(TerminalError::PrerequisiteMissing("transport connector"))
        ));
        assert!(!manager.is_initialized());
    }

    #[test]
    fn test_invalid_index_fails_fast() {
        let mut manager = TerminalManager::websocket(ManagerOptions::default());
        assert!(matches!(
            manager.write(MAX_SLOTS, b"x"),
            Err(TerminalError::InvalidIndex { index: 5, max: 5 })
        ));
        assert!(manager.fit(7).is_err());
        assert!(manager.destroy_session(99).is_err());
        assert!(manager.cwd(5).is_err());
    }

    /// Keeps the far ends of every link alive
    #[derive(Default)]
    struct LoopbackConnector {
        far_ends: Mutex<Vec<(UnboundedReceiver<crate::transport::Outbound>, UnboundedSender<Vec<u8>>)>>,
    }

    #[async_trait::async_trait]
    impl Connector for LoopbackConnector {
        async fn connect(&self, _endpoint: &Endpoint) -> Result<Link> {
            let (link, rx, tx) = Link::pair();
            self.far_ends.lock().unwrap().push((rx, tx));
            Ok(link)
        }

        fn connector_name(&self) -> &str {
            "loopback"
        }
    }

    #[tokio::test]
    async fn test_stale_close_is_ignored() {
        let mut manager = TerminalManager::new(ManagerOptions::default())
            .with_surface_backend(Arc::new(Vt100Backend::new()))
            .with_connector(Arc::new(LoopbackConnector::default()));
        manager.create_session(1, SessionOptions::default()).await.unwrap();
        manager.process_events();
        let generation = manager.slot(1).unwrap().generation();

        manager.notify(1, generation - 1, SlotEventKind::Closed);
        assert!(manager.process_events().is_empty());
        assert!(manager.slot(1).unwrap().is_live());

        manager.notify(1, generation, SlotEventKind::Closed);
        assert_eq!(manager.process_events().len(), 1);
        assert_eq!(manager.slot(1).unwrap().status(), &SlotStatus::Detached);

        // a repeated close for the same incarnation changes nothing
        manager.notify(1, generation, SlotEventKind::Closed);
        assert!(manager.process_events().is_empty());
    }

    #[test]
    fn test_operations_on_empty_slots_are_noops() {
        let mut manager = TerminalManager::websocket(ManagerOptions::default());
        assert_eq!(manager.fit(3).unwrap(), None);
        manager.write_line(3, "ignored").unwrap();
        manager.destroy_session(3).unwrap();
        manager.destroy_all();
        manager.destroy_all();
        assert!(!manager.send_key(&KeyEvent::new(crate::keys::Key::Enter)));
        assert_eq!(manager.screen(3).unwrap(), None);
    }
}
