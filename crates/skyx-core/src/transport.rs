//! Script transport for the TheSkyX TCP server.
//!
//! Every request opens a fresh TCP connection, writes one framed script,
//! performs a single bounded read, and closes the socket again. There is no
//! length prefix on the wire: the script is wrapped in two comment lines the
//! host listener recognises, and the host ends its reply with a `|` followed
//! by a status trailer that is discarded here.
//!
//! # Known limitation
//!
//! The reply is taken from exactly one read of at most
//! [`TransportSettings::max_response_bytes`]. A reply that is longer, or that
//! arrives split across TCP segments, will be missing its `|` terminator and
//! is reported as [`SkyxError::ResponseUnterminated`] instead of being
//! silently truncated.

use crate::error::{AppResult, SkyxError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Default host of the TheSkyX TCP server
pub const DEFAULT_HOST: &str = "localhost";

/// Default TheSkyX TCP server port
pub const DEFAULT_PORT: u16 = 3040;

/// Default connect timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

/// Default write/read timeout in milliseconds
///
/// Kept generous because the host only replies once the script finishes,
/// and slews or exposures can take a while.
pub const DEFAULT_IO_TIMEOUT_MS: u64 = 30_000;

/// Default bound for the single reply read
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 2048;

/// Marks the end of the meaningful part of a reply.
pub const REPLY_TERMINATOR: char = '|';

const PACKET_HEADER: &str = "/* Java Script */\n/* Socket Start Packet */\n";
const PACKET_FOOTER: &str = "\n/* Socket End Packet */\n";

/// Host and port of the TheSkyX TCP listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Hostname or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
}

impl Endpoint {
    /// Create an endpoint, rejecting an empty host or port 0.
    pub fn new(host: impl Into<String>, port: u16) -> AppResult<Self> {
        let endpoint = Self {
            host: host.into(),
            port,
        };
        endpoint.validate()?;
        Ok(endpoint)
    }

    /// Check that the endpoint can be dialled.
    pub fn validate(&self) -> AppResult<()> {
        if self.host.trim().is_empty() {
            return Err(SkyxError::InvalidConfiguration(
                "host must not be empty".into(),
            ));
        }
        if self.port == 0 {
            return Err(SkyxError::InvalidConfiguration(
                "port must be between 1 and 65535".into(),
            ));
        }
        Ok(())
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Timeouts and read bound applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportSettings {
    /// Bound on establishing the TCP connection
    pub connect_timeout: Duration,
    /// Bound on each write and on the reply read
    pub io_timeout: Duration,
    /// Size of the single reply read
    pub max_response_bytes: usize,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            io_timeout: Duration::from_millis(DEFAULT_IO_TIMEOUT_MS),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl TransportSettings {
    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the write/read timeout
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Set the reply read bound
    pub fn with_max_response_bytes(mut self, bytes: usize) -> Self {
        self.max_response_bytes = bytes;
        self
    }
}

/// Send a script, receive the text before the reply terminator.
///
/// Implemented by [`SkyxConnection`](crate::connection::SkyxConnection) for
/// the real TCP server and by [`MockTransport`](crate::mock::MockTransport)
/// for tests. Device wrappers only ever see this trait.
#[async_trait]
pub trait ScriptTransport: Send + Sync {
    /// Execute `script` on the host and return its output.
    async fn send(&self, script: &str) -> AppResult<String>;
}

/// Wrap a script in the start/end packet comments the host listener expects.
pub fn frame_script(script: &str) -> String {
    format!("{PACKET_HEADER}{script}{PACKET_FOOTER}")
}

/// Decode a raw reply and keep only the text before the first `|`.
///
/// `limit` is only used to report the read bound when the terminator is missing.
pub fn extract_payload(raw: &[u8], limit: usize) -> AppResult<String> {
    let text = String::from_utf8_lossy(raw);
    match text.find(REPLY_TERMINATOR) {
        Some(end) => Ok(text[..end].to_string()),
        None => Err(SkyxError::ResponseUnterminated {
            bytes: raw.len(),
            limit,
        }),
    }
}

/// Write `payload` and perform one bounded read on an already open stream.
///
/// The stream is taken by value so it is closed on every return path,
/// including a failed write. On success the write half is shut down before
/// the stream is dropped.
pub async fn exchange<S>(
    mut stream: S,
    payload: &[u8],
    limit: usize,
    io_timeout: Duration,
) -> io::Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    timeout(io_timeout, stream.write_all(payload))
        .await
        .map_err(|_| timed_out("write", io_timeout))??;
    timeout(io_timeout, stream.flush())
        .await
        .map_err(|_| timed_out("flush", io_timeout))??;

    let mut buffer = vec![0u8; limit];
    let bytes_read = timeout(io_timeout, stream.read(&mut buffer))
        .await
        .map_err(|_| timed_out("read", io_timeout))??;

    if bytes_read == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "connection closed by host before replying",
        ));
    }
    buffer.truncate(bytes_read);

    if let Err(e) = stream.shutdown().await {
        tracing::debug!("Socket shutdown after reply failed: {}", e);
    }

    Ok(buffer)
}

/// Run one script against `endpoint` over a fresh TCP connection.
pub async fn send_script(
    endpoint: &Endpoint,
    settings: &TransportSettings,
    script: &str,
) -> AppResult<String> {
    tracing::debug!(%endpoint, "Sending script:\n{}", script);
    let stream = connect(endpoint, settings).await?;
    send_over(stream, endpoint, settings, script).await
}

/// Open a TCP connection to `endpoint` within the connect timeout.
pub async fn connect(endpoint: &Endpoint, settings: &TransportSettings) -> AppResult<TcpStream> {
    let stream = timeout(
        settings.connect_timeout,
        TcpStream::connect((endpoint.host.as_str(), endpoint.port)),
    )
    .await
    .map_err(|_| {
        connection_failure(
            endpoint,
            format!("connect timed out after {:?}", settings.connect_timeout),
        )
    })?
    .map_err(|e| connection_failure(endpoint, e.to_string()))?;

    stream
        .set_nodelay(true)
        .map_err(|e| connection_failure(endpoint, e.to_string()))?;
    Ok(stream)
}

/// Frame `script`, exchange it over an open stream and extract the reply.
///
/// Consumes the stream; it is closed whether or not the exchange succeeds.
/// I/O errors are reported as [`SkyxError::ConnectionFailure`] for `endpoint`.
pub async fn send_over<S>(
    stream: S,
    endpoint: &Endpoint,
    settings: &TransportSettings,
    script: &str,
) -> AppResult<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let framed = frame_script(script);
    let raw = exchange(
        stream,
        framed.as_bytes(),
        settings.max_response_bytes,
        settings.io_timeout,
    )
    .await
    .map_err(|e| connection_failure(endpoint, e.to_string()))?;

    tracing::debug!(
        %endpoint,
        bytes = raw.len(),
        "Reply: {:?}",
        String::from_utf8_lossy(&raw)
    );

    extract_payload(&raw, settings.max_response_bytes)
}

fn connection_failure(endpoint: &Endpoint, cause: String) -> SkyxError {
    SkyxError::ConnectionFailure {
        endpoint: endpoint.to_string(),
        cause,
    }
}

fn timed_out(step: &str, after: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("{step} timed out after {after:?}"),
    )
}
