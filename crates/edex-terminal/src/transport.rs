use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use edex_types::Endpoint;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_tungstenite::tungstenite::Message;

use super::backend::Connector;
use super::error::{Result, TerminalError};

static NEXT_TRANSPORT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a transport for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportId(u64);

impl TransportId {
    fn next() -> Self {
        Self(NEXT_TRANSPORT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TransportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "transport-{}", self.0)
    }
}

/// Message toward the remote end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Data(Vec<u8>),
    Close,
}

/// The two halves of an open byte stream, as handed out by a connector
///
/// `inbound` ends (yields `None`) when the remote side hangs up.
#[derive(Debug)]
pub struct Link {
    pub outbound: UnboundedSender<Outbound>,
    pub inbound: UnboundedReceiver<Vec<u8>>,
}

impl Link {
    /// An in-process link plus the far ends of both channels
    pub fn pair() -> (Self, UnboundedReceiver<Outbound>, UnboundedSender<Vec<u8>>) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();
        (
            Self {
                outbound: out_tx,
                inbound: in_rx,
            },
            out_rx,
            in_tx,
        )
    }
}

/// An open bidirectional byte stream to one remote shell
///
/// Owned by exactly one slot. Dropping it closes the stream.
pub struct Transport {
    id: TransportId,
    endpoint: Endpoint,
    outbound: UnboundedSender<Outbound>,
    inbound: Option<UnboundedReceiver<Vec<u8>>>,
    closed: bool,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Transport {
    pub fn new(endpoint: Endpoint, link: Link) -> Self {
        Self {
            id: TransportId::next(),
            endpoint,
            outbound: link.outbound,
            inbound: Some(link.inbound),
            closed: false,
        }
    }

    pub fn id(&self) -> TransportId {
        self.id
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Open until closed locally or until the stream's writer has gone away
    pub fn is_open(&self) -> bool {
        !self.closed && !self.outbound.is_closed()
    }

    /// Fire-and-forget send; returns false if the bytes were dropped
    pub fn send(&self, data: &[u8]) -> bool {
        if !self.is_open() {
            return false;
        }
        self.outbound.send(Outbound::Data(data.to_vec())).is_ok()
    }

    /// Ask the stream to close; does not wait for the remote end
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.outbound.send(Outbound::Close);
        log::debug!("{} to {} closed", self.id, self.endpoint);
    }

    /// Hand the receiving half to an attachment; only one may take it
    pub(crate) fn take_inbound(&mut self) -> Result<UnboundedReceiver<Vec<u8>>> {
        self.inbound
            .take()
            .ok_or(TerminalError::AlreadyAttached(self.id.value()))
    }

    pub(crate) fn sender(&self) -> UnboundedSender<Outbound> {
        self.outbound.clone()
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.close();
    }
}

/// WebSocket connector speaking binary frames to `ws://host:port/webterminal`
#[derive(Debug, Default, Clone)]
pub struct WsConnector;

impl WsConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Link> {
        let url = endpoint.url();
        log::debug!("Connecting to {}", url);

        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| TerminalError::TransportOpen {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        let (mut sink, mut stream) = ws_stream.split();

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Outbound>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<Vec<u8>>();

        // Writer: local bytes become binary frames
        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                match message {
                    Outbound::Data(data) => {
                        if let Err(e) = sink.send(Message::Binary(data)).await {
                            log::debug!("WebSocket send failed: {}", e);
                            break;
                        }
                    }
                    Outbound::Close => break,
                }
            }
            let _ = sink.close().await;
        });

        // Reader: frames become bytes; the end of the stream stops the writer
        let closer = out_tx.clone();
        let remote = endpoint.clone();
        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                let data = match frame {
                    Ok(Message::Binary(data)) => data,
                    Ok(Message::Text(text)) => text.into_bytes(),
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        log::debug!("WebSocket to {} failed: {}", remote, e);
                        break;
                    }
                };
                if in_tx.send(data).is_err() {
                    break;
                }
            }
            let _ = closer.send(Outbound::Close);
        });

        Ok(Link {
            outbound: out_tx,
            inbound: in_rx,
        })
    }

    fn connector_name(&self) -> &str {
        "websocket"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_send_and_close() {
        let (link, mut remote_rx, _remote_tx) = Link::pair();
        let mut transport = Transport::new(Endpoint::default(), link);

        assert!(transport.is_open());
        assert!(transport.send(b"ls\r"));
        transport.close();
        transport.close();
        assert!(!transport.is_open());
        assert!(!transport.send(b"dropped"));

        assert_eq!(remote_rx.try_recv().unwrap(), Outbound::Data(b"ls\r".to_vec()));
        assert_eq!(remote_rx.try_recv().unwrap(), Outbound::Close);
        assert!(remote_rx.try_recv().is_err());
    }

    #[test]
    fn test_writer_gone_means_closed() {
        let (link, remote_rx, _remote_tx) = Link::pair();
        let transport = Transport::new(Endpoint::default(), link);
        drop(remote_rx);
        assert!(!transport.is_open());
    }

    #[test]
    fn test_inbound_taken_once() {
        let (link, _remote_rx, _remote_tx) = Link::pair();
        let mut transport = Transport::new(Endpoint::default(), link);
        assert!(transport.take_inbound().is_ok());
        assert!(matches!(transport.take_inbound(), Err(TerminalError::AlreadyAttached(_))));
    }

    #[test]
    fn test_ids_are_unique() {
        let (a, _ra, _ta) = Link::pair();
        let (b, _rb, _tb) = Link::pair();
        let a = Transport::new(Endpoint::default(), a);
        let b = Transport::new(Endpoint::default(), b);
        assert!(a.id() != b.id());
    }
}
