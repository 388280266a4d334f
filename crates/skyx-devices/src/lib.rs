//! TheSkyX device wrappers
//!
//! Thin, stateless wrappers over the TheSkyX script server. Each public
//! operation renders one [`Request`], sends it through a shared
//! [`ScriptTransport`](skyx_core::ScriptTransport), and parses the reply with
//! the conventions in [`skyx_core::response`]. Nothing is cached between calls.
//!
//! # Devices
//!
//! - [`Camera`] - `ccdsoftCamera`: exposure, binning, frame type, images
//! - [`Telescope`] - `sky6RASCOMTele`: slews, tracking rates, pointing
//! - [`TargetInformation`] - `sky6StarChart` / `sky6ObjectInformation` lookups
//! - [`SkyxAction`] - `TheSkyXAction` toolbar commands and raw scripts
//!
//! # Usage
//!
//! ```rust,no_run
//! use skyx_core::SkyxConnection;
//! use skyx_devices::{Telescope, TargetInformation};
//! use std::sync::Arc;
//!
//! # async fn example() -> skyx_core::AppResult<()> {
//! let conn = Arc::new(SkyxConnection::new("localhost", 3040)?);
//!
//! let info = TargetInformation::new(conn.clone());
//! let m42 = info.resolve("M42").await?;
//!
//! let mount = Telescope::connect(conn).await?;
//! mount.slew_to_ra_dec(m42.require("ra_now")?, m42.require("dec_now")?).await?;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod camera;
pub mod request;
pub mod target;
pub mod telescope;

pub use action::SkyxAction;
pub use camera::{Camera, FrameType};
pub use request::Request;
pub use target::{Epoch, TargetInformation};
pub use telescope::Telescope;
