//! # skyx-remote
//!
//! Client for the TheSkyX astronomy application's TCP script server.
//!
//! TheSkyX accepts JavaScript snippets over a plain TCP socket and answers
//! with the script's output followed by a `|`-separated status trailer. This
//! crate wraps that protocol in typed device handles:
//!
//! - [`skyx_core`] - transport, shared connection handle, reply parsing, errors
//! - [`skyx_devices`] - camera, telescope, target lookup and toolbar actions
//! - [`config`] - layered configuration (file + `SKYX_` environment)
//! - [`logging`] - `tracing` subscriber setup
//!
//! ```rust,no_run
//! use skyx_remote::{config::SkyxConfig, skyx_devices::Camera};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SkyxConfig::load()?;
//! config.validate()?;
//! let conn = config.connection.build()?;
//!
//! let camera = Camera::connect(conn.transport()).await?;
//! camera.set_exposure_time(30.0).await?;
//! camera.take_image().await?;
//! println!("saved {}", camera.last_image_file_name().await?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod logging;

pub use skyx_core;
pub use skyx_devices;

pub use skyx_core::{AppResult, SkyxConnection, SkyxError};
