//! Shared connection handle and the process-wide registry.
//!
//! [`SkyxConnection`] is a cheap, cloneable handle around one endpoint and
//! its transport settings. Every clone shares the same state, so a
//! [`reconfigure`](SkyxConnection::reconfigure) is seen by every wrapper that
//! holds a clone, without rebuilding anything.
//!
//! Pass a handle explicitly where possible. For callers that want the
//! "configure once, use everywhere" style, [`get_or_create`] hands out a
//! single lazily created handle for the whole process.

use crate::error::AppResult;
use crate::transport::{send_script, Endpoint, ScriptTransport, TransportSettings};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug)]
struct ConnectionState {
    endpoint: Endpoint,
    settings: TransportSettings,
}

/// Handle to the TheSkyX TCP server.
///
/// No socket is held between calls: each [`send`](ScriptTransport::send)
/// dials the endpoint current at that moment, and the endpoint is read under
/// a lock so a concurrent reconfigure never yields a mixed host/port pair.
#[derive(Debug, Clone)]
pub struct SkyxConnection {
    state: Arc<RwLock<ConnectionState>>,
}

impl SkyxConnection {
    /// Create a handle for `host:port` with default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> AppResult<Self> {
        Ok(Self::with_settings(
            Endpoint::new(host, port)?,
            TransportSettings::default(),
        ))
    }

    /// Create a handle from an already validated endpoint and explicit settings.
    pub fn with_settings(endpoint: Endpoint, settings: TransportSettings) -> Self {
        Self {
            state: Arc::new(RwLock::new(ConnectionState { endpoint, settings })),
        }
    }

    /// Endpoint currently in effect.
    pub fn endpoint(&self) -> Endpoint {
        self.state.read().endpoint.clone()
    }

    /// Transport settings currently in effect.
    pub fn settings(&self) -> TransportSettings {
        self.state.read().settings
    }

    /// Point this handle, and every clone of it, at a new endpoint.
    pub fn reconfigure(&self, host: impl Into<String>, port: u16) -> AppResult<()> {
        let endpoint = Endpoint::new(host, port)?;
        let mut state = self.state.write();
        tracing::info!(from = %state.endpoint, to = %endpoint, "Reconfiguring TheSkyX endpoint");
        state.endpoint = endpoint;
        Ok(())
    }

    /// Replace the timeouts and read bound for every clone of this handle.
    pub fn set_settings(&self, settings: TransportSettings) {
        self.state.write().settings = settings;
    }

    /// This handle as a trait object, ready to hand to a device wrapper.
    pub fn transport(&self) -> Arc<dyn ScriptTransport> {
        Arc::new(self.clone())
    }

    /// Whether two handles share the same underlying state.
    pub fn same_as(&self, other: &SkyxConnection) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn snapshot(&self) -> (Endpoint, TransportSettings) {
        let state = self.state.read();
        (state.endpoint.clone(), state.settings)
    }
}

impl Default for SkyxConnection {
    fn default() -> Self {
        Self::with_settings(Endpoint::default(), TransportSettings::default())
    }
}

#[async_trait]
impl ScriptTransport for SkyxConnection {
    async fn send(&self, script: &str) -> AppResult<String> {
        let (endpoint, settings) = self.snapshot();
        send_script(&endpoint, &settings, script).await
    }
}

// =============================================================================
// Process-wide registry
// =============================================================================

static SHARED: OnceCell<SkyxConnection> = OnceCell::new();

/// Return the process-wide handle, creating it for `host:port` on first use.
///
/// Later calls ignore their arguments and return the existing handle; use
/// [`reconfigure`] to move it.
pub fn get_or_create(host: &str, port: u16) -> AppResult<SkyxConnection> {
    SHARED
        .get_or_try_init(|| SkyxConnection::new(host, port))
        .cloned()
}

/// Return the process-wide handle if it has been created.
pub fn shared() -> Option<SkyxConnection> {
    SHARED.get().cloned()
}

/// Point the process-wide handle at a new endpoint, creating it if needed.
pub fn reconfigure(host: &str, port: u16) -> AppResult<SkyxConnection> {
    let connection = get_or_create(host, port)?;
    connection.reconfigure(host, port)?;
    Ok(connection)
}
