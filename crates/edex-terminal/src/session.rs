use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use edex_types::Endpoint;

use super::attach::Attachment;
use super::fit::Geometry;
use super::surface::{lock_surface, SharedSurface};
use super::transport::Transport;

/// Lifecycle status of a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    /// Never created, or destroyed
    Empty,
    /// Surface exists, transport is being opened
    Connecting,
    /// Surface, transport and attachment all present
    Live,
    /// Remote end hung up; the surface is kept for viewing
    Detached,
    /// The last creation failed; nothing is held
    Failed(String),
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Connecting => write!(f, "connecting"),
            Self::Live => write!(f, "live"),
            Self::Detached => write!(f, "detached"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Snapshot of one slot
#[derive(Debug, Clone, PartialEq)]
pub struct SlotInfo {
    pub index: usize,
    pub status: SlotStatus,
    pub focused: bool,
    pub geometry: Option<Geometry>,
    pub endpoint: Option<Endpoint>,
    pub working_directory: String,
    pub local_echo: bool,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// One tab's terminal session: surface, transport and the attachment
/// between them
pub struct SessionSlot {
    index: usize,
    pub(crate) surface: Option<SharedSurface>,
    pub(crate) transport: Option<Transport>,
    pub(crate) attachment: Option<Attachment>,
    pub(crate) working_directory: String,
    pub(crate) local_echo: Arc<AtomicBool>,
    pub(crate) status: SlotStatus,
    pub(crate) generation: u64,
    pub(crate) endpoint: Option<Endpoint>,
    pub(crate) created_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for SessionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSlot")
            .field("index", &self.index)
            .field("status", &self.status)
            .field("generation", &self.generation)
            .field("surface", &self.surface.is_some())
            .field("transport", &self.transport)
            .field("attachment", &self.attachment)
            .finish()
    }
}

impl SessionSlot {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            surface: None,
            transport: None,
            attachment: None,
            working_directory: String::new(),
            local_echo: Arc::new(AtomicBool::new(false)),
            status: SlotStatus::Empty,
            generation: 0,
            endpoint: None,
            created_at: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn status(&self) -> &SlotStatus {
        &self.status
    }

    pub fn surface(&self) -> Option<&SharedSurface> {
        self.surface.as_ref()
    }

    pub fn transport(&self) -> Option<&Transport> {
        self.transport.as_ref()
    }

    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }

    /// Holds nothing and is not waiting on a connect
    pub fn is_vacant(&self) -> bool {
        self.surface.is_none()
            && self.transport.is_none()
            && self.attachment.is_none()
            && self.status != SlotStatus::Connecting
    }

    pub fn is_live(&self) -> bool {
        self.status == SlotStatus::Live
    }

    pub fn working_directory(&self) -> &str {
        &self.working_directory
    }

    pub fn local_echo(&self) -> bool {
        self.local_echo.load(Ordering::Relaxed)
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        self.endpoint.as_ref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Current incarnation; bumped whenever the slot is (re)created or torn down
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn transport_open(&self) -> bool {
        self.transport.as_ref().map(Transport::is_open).unwrap_or(false)
    }

    /// Remote end hung up: drop the attachment and transport, keep the surface
    pub(crate) fn detach(&mut self) {
        if let Some(mut attachment) = self.attachment.take() {
            attachment.dispose();
        }
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        if self.surface.is_some() {
            self.status = SlotStatus::Detached;
        }
    }

    /// Close the transport, dispose the attachment, dispose the surface and
    /// forget the working directory
    pub(crate) fn teardown(&mut self) {
        let held = !self.is_vacant();

        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        if let Some(mut attachment) = self.attachment.take() {
            attachment.dispose();
        }
        if let Some(surface) = self.surface.take() {
            lock_surface(&surface).dispose();
        }

        self.working_directory.clear();
        self.endpoint = None;
        self.created_at = None;
        self.status = SlotStatus::Empty;
        self.generation += 1;

        if held {
            log::debug!("Slot {} torn down", self.index);
        }
    }

    pub fn info(&self, focused: bool) -> SlotInfo {
        let (geometry, title) = match &self.surface {
            Some(surface) => {
                let surface = lock_surface(surface);
                (Some(surface.geometry()), surface.title().to_string())
            }
            None => (None, String::new()),
        };

        SlotInfo {
            index: self.index,
            status: self.status.clone(),
            focused,
            geometry,
            endpoint: self.endpoint.clone(),
            working_directory: self.working_directory.clone(),
            local_echo: self.local_echo(),
            title,
            created_at: self.created_at,
        }
    }
}

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.teardown();
    }
}
