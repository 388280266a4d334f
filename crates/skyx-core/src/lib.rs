//! `skyx-core`
//!
//! Transport and reply-parsing layer for the TheSkyX TCP script server.
//!
//! TheSkyX accepts short JavaScript fragments on a TCP port, runs them
//! against live application state, and answers with plain text. This crate
//! owns everything about that exchange that is not device-specific:
//!
//! - [`transport`] - framing, one-socket-per-call send, bounded read
//! - [`connection`] - the shared, reconfigurable endpoint handle
//! - [`response`] - turning reply text into typed values or errors
//! - [`mock`] - an in-memory [`ScriptTransport`] for tests
//!
//! ## Example
//!
//! ```rust,no_run
//! use skyx_core::{AppResult, ScriptTransport, SkyxConnection};
//! use skyx_core::response::parse_scalar;
//!
//! # async fn example() -> AppResult<()> {
//! let conn = SkyxConnection::new("localhost", 3040)?;
//! let reply = conn.send("ccdsoftCamera.BinX").await?;
//! let binning: i64 = parse_scalar(&reply, "BinX")?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod mock;
pub mod response;
pub mod transport;

pub use connection::SkyxConnection;
pub use error::{AppResult, SkyxError};
pub use mock::MockTransport;
pub use response::ObjectProperties;
pub use transport::{Endpoint, ScriptTransport, TransportSettings};
