/// Pluggable collaborators of the terminal manager: the emulation surface
/// library, the transport connector and the backend shell allocator
use async_trait::async_trait;
use edex_types::Endpoint;

use super::error::Result;
use super::surface::TerminalSurface;
use super::theme::SurfaceConfig;
use super::transport::Link;

/// Terminal emulation library - creates surfaces bound to a mount point
pub trait SurfaceBackend: Send + Sync {
    /// Create a surface mounted at `mount`
    fn open(&self, mount: &str, config: &SurfaceConfig) -> Result<TerminalSurface>;

    /// Get backend name for debugging
    fn backend_name(&self) -> &str;
}

/// Opens byte-stream transports to remote shells
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a transport to `endpoint`
    /// Resolves once the stream is open; errors are connection failures
    async fn connect(&self, endpoint: &Endpoint) -> Result<Link>;

    /// Get connector name for debugging
    fn connector_name(&self) -> &str;
}

/// Backend RPC that allocates a new remote shell
#[async_trait]
pub trait ShellAllocator: Send + Sync {
    /// Ask the backend for a new shell
    /// Returns the raw sentinel reply ("SUCCESS: <port>" or "ERROR...")
    async fn spawn_tty(&self) -> Result<String>;
}
