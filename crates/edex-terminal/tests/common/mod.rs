use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use edex_terminal::{
    Connector, Endpoint, Link, ManagerOptions, Outbound, Result, ShellAllocator, TerminalError,
    TerminalManager, Vt100Backend,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Far end of an in-memory transport, standing in for the remote shell
pub struct RemoteShell {
    pub endpoint: Endpoint,
    from_client: UnboundedReceiver<Outbound>,
    to_client: Option<UnboundedSender<Vec<u8>>>,
}

impl RemoteShell {
    /// Send shell output to the client
    pub fn say(&self, data: &str) {
        if let Some(tx) = &self.to_client {
            let _ = tx.send(data.as_bytes().to_vec());
        }
    }

    /// Remote end hangs up
    pub fn hang_up(&mut self) {
        self.to_client = None;
    }

    /// Next data the client sent, skipping resize requests
    pub async fn next_input(&mut self) -> Option<Vec<u8>> {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(2), self.from_client.recv())
                .await
                .ok()??;
            match message {
                Outbound::Data(data) if is_resize(&data) => continue,
                Outbound::Data(data) => return Some(data),
                Outbound::Close => return None,
            }
        }
    }

    /// Everything already sent by the client
    pub fn drain(&mut self) -> Vec<Outbound> {
        let mut messages = Vec::new();
        while let Ok(message) = self.from_client.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// Whether the client side has let go of the stream
    pub async fn client_closed(&mut self) -> bool {
        loop {
            match tokio::time::timeout(Duration::from_secs(2), self.from_client.recv()).await {
                Ok(Some(Outbound::Close)) | Ok(None) => return true,
                Ok(Some(Outbound::Data(_))) => continue,
                Err(_) => return false,
            }
        }
    }
}

pub fn is_resize(data: &[u8]) -> bool {
    data.starts_with(b"\x1b[8;") && data.ends_with(b"t")
}

/// Connector that opens in-process links and hands the far ends to the test
pub struct MemoryConnector {
    refuse: AtomicBool,
    remotes: UnboundedSender<RemoteShell>,
}

impl MemoryConnector {
    pub fn new() -> (Arc<Self>, UnboundedReceiver<RemoteShell>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                refuse: AtomicBool::new(false),
                remotes: tx,
            }),
            rx,
        )
    }

    /// Refuse every following connection attempt
    pub fn refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Link> {
        if self.refuse.load(Ordering::SeqCst) || endpoint.host == "refused.invalid" {
            return Err(TerminalError::TransportOpen {
                endpoint: endpoint.clone(),
                reason: "connection refused".to_string(),
            });
        }
        let (link, from_client, to_client) = Link::pair();
        let _ = self.remotes.send(RemoteShell {
            endpoint: endpoint.clone(),
            from_client,
            to_client: Some(to_client),
        });
        Ok(link)
    }

    fn connector_name(&self) -> &str {
        "memory"
    }
}

/// Backend allocator that always gives the same reply
pub struct StubAllocator(pub &'static str);

#[async_trait]
impl ShellAllocator for StubAllocator {
    async fn spawn_tty(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

pub fn manager_with(connector: Arc<MemoryConnector>) -> TerminalManager {
    let options = ManagerOptions {
        welcome: Some("Welcome to eDEX-UI v1.0.0".to_string()),
        ..ManagerOptions::default()
    };
    TerminalManager::new(options)
        .with_surface_backend(Arc::new(Vt100Backend::new()))
        .with_connector(connector)
}

/// Poll a slot's screen until it contains `text`
pub async fn wait_for_screen(manager: &TerminalManager, index: usize, text: &str) -> bool {
    for _ in 0..100 {
        if let Ok(Some(screen)) = manager.screen(index) {
            if screen.contains(text) {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
