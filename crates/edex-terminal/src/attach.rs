use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::error::Result;
use super::surface::{lock_surface, SharedSurface};
use super::transport::{Outbound, Transport, TransportId};

/// How an attachment pipes bytes
#[derive(Debug, Clone)]
pub struct AttachOptions {
    /// Forward input produced on the surface to the remote end
    pub bidirectional: bool,
    /// Render forwarded input locally as well; shared with the slot so it
    /// can be toggled while attached
    pub local_echo: Arc<AtomicBool>,
}

impl Default for AttachOptions {
    fn default() -> Self {
        Self {
            bidirectional: true,
            local_echo: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Bridge that pipes bytes between a transport and a surface
///
/// Two pumps run as tokio tasks: remote output into the surface and, when
/// bidirectional, surface input to the remote end. `on_close` runs once when
/// the remote end hangs up; it does not run if the attachment is disposed
/// first.
pub struct Attachment {
    transport_id: TransportId,
    surface: SharedSurface,
    pumps: Vec<JoinHandle<()>>,
    listening: bool,
    disposed: bool,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("transport", &self.transport_id)
            .field("pumps", &self.pumps.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Attachment {
    /// Attach `transport` to `surface`. Must be called inside a tokio runtime.
    pub fn attach<F>(
        transport: &mut Transport,
        surface: SharedSurface,
        options: AttachOptions,
        on_close: F,
    ) -> Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let transport_id = transport.id();

        // Claim the input listener before taking the stream, so a refusal
        // leaves the transport untouched
        let input = if options.bidirectional {
            let (tx, rx) = mpsc::unbounded_channel::<Vec<u8>>();
            lock_surface(&surface).on_data(tx)?;
            Some(rx)
        } else {
            None
        };

        let mut inbound = match transport.take_inbound() {
            Ok(inbound) => inbound,
            Err(e) => {
                if input.is_some() {
                    lock_surface(&surface).off_data();
                }
                return Err(e);
            }
        };

        let mut pumps = Vec::with_capacity(2);

        let output_surface = Arc::clone(&surface);
        pumps.push(tokio::spawn(async move {
            while let Some(data) = inbound.recv().await {
                lock_surface(&output_surface).write(&data);
            }
            log::debug!("{}: remote end closed", transport_id);
            on_close();
        }));

        let listening = input.is_some();
        if let Some(mut input) = input {
            let outbound = transport.sender();
            let echo_surface = Arc::clone(&surface);
            let local_echo = options.local_echo;
            pumps.push(tokio::spawn(async move {
                while let Some(data) = input.recv().await {
                    if local_echo.load(Ordering::Relaxed) {
                        lock_surface(&echo_surface).write(&data);
                    }
                    if outbound.send(Outbound::Data(data)).is_err() {
                        break;
                    }
                }
            }));
        }

        log::debug!("{} attached to {}", transport_id, lock_surface(&surface).id());

        Ok(Self {
            transport_id,
            surface,
            pumps,
            listening,
            disposed: false,
        })
    }

    pub fn transport_id(&self) -> TransportId {
        self.transport_id
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Stop both pumps and give the surface's input listener back
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for pump in self.pumps.drain(..) {
            pump.abort();
        }
        if self.listening {
            lock_surface(&self.surface).off_data();
        }
        log::debug!("{} detached", self.transport_id);
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::TerminalSurface;
    use crate::theme::SurfaceConfig;
    use crate::transport::Link;
    use edex_types::Endpoint;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn shared_surface() -> SharedSurface {
        Arc::new(Mutex::new(TerminalSurface::new("terminal0", SurfaceConfig::default())))
    }

    #[tokio::test]
    async fn test_bytes_flow_both_ways() {
        let (link, mut remote_rx, remote_tx) = Link::pair();
        let mut transport = Transport::new(Endpoint::default(), link);
        let surface = shared_surface();

        let _attachment =
            Attachment::attach(&mut transport, Arc::clone(&surface), AttachOptions::default(), || {})
                .unwrap();

        remote_tx.send(b"hello".to_vec()).unwrap();
        lock_surface(&surface).paste("pwd\r");

        assert_eq!(remote_rx.recv().await, Some(Outbound::Data(b"pwd\r".to_vec())));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(lock_surface(&surface).contents(), "hello");
    }

    #[tokio::test]
    async fn test_local_echo() {
        let (link, mut remote_rx, _remote_tx) = Link::pair();
        let mut transport = Transport::new(Endpoint::default(), link);
        let surface = shared_surface();
        let options = AttachOptions::default();
        options.local_echo.store(true, Ordering::Relaxed);

        let _attachment =
            Attachment::attach(&mut transport, Arc::clone(&surface), options, || {}).unwrap();
        lock_surface(&surface).paste("echo");

        assert_eq!(remote_rx.recv().await, Some(Outbound::Data(b"echo".to_vec())));
        assert_eq!(lock_surface(&surface).contents(), "echo");
    }

    #[tokio::test]
    async fn test_remote_close_fires_once() {
        let (link, _remote_rx, remote_tx) = Link::pair();
        let mut transport = Transport::new(Endpoint::default(), link);
        let (closed_tx, closed_rx) = oneshot::channel();

        let _attachment = Attachment::attach(
            &mut transport,
            shared_surface(),
            AttachOptions::default(),
            move || {
                let _ = closed_tx.send(());
            },
        )
        .unwrap();

        drop(remote_tx);
        assert!(closed_rx.await.is_ok());
    }

    #[tokio::test]
    async fn test_dispose_releases_surface() {
        let (link, _remote_rx, remote_tx) = Link::pair();
        let mut transport = Transport::new(Endpoint::default(), link);
        let surface = shared_surface();
        let (closed_tx, mut closed_rx) = oneshot::channel::<()>();

        let mut attachment = Attachment::attach(
            &mut transport,
            Arc::clone(&surface),
            AttachOptions::default(),
            move || {
                let _ = closed_tx.send(());
            },
        )
        .unwrap();
        assert!(lock_surface(&surface).has_data_listener());

        attachment.dispose();
        attachment.dispose();
        assert!(!lock_surface(&surface).has_data_listener());

        // a disposed attachment never reports the close
        drop(remote_tx);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(closed_rx.try_recv().is_err());

        // the surface is free for another attachment, the transport is not
        assert!(Attachment::attach(&mut transport, surface, AttachOptions::default(), || {}).is_err());
    }
}
