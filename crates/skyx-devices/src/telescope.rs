//! Telescope mount (`sky6RASCOMTele`).

use crate::request::Request;
use crate::target::TargetInformation;
use skyx_core::response::{parse_fields_f64, parse_lines_f64, parse_scalar};
use skyx_core::{AppResult, ScriptTransport, SkyxError};
use std::sync::Arc;

/// Wrapper for the mount selected in the host's equipment profile.
pub struct Telescope {
    transport: Arc<dyn ScriptTransport>,
}

impl Telescope {
    /// Connect the mount and return a handle to it.
    ///
    /// Fails unless the host reports `IsConnected == 1`.
    pub async fn connect(transport: Arc<dyn ScriptTransport>) -> AppResult<Self> {
        let telescope = Self { transport };
        telescope.connect_device().await?;
        Ok(telescope)
    }

    async fn call(&self, request: Request) -> AppResult<String> {
        tracing::debug!(request = request.name(), "Telescope request");
        self.transport.send(&request.render()).await
    }

    async fn connection_state(&self, request: Request) -> AppResult<i64> {
        let reply = self.call(request).await?;
        parse_scalar(&reply, "IsConnected")
    }

    /// Reconnect the mount.
    pub async fn connect_device(&self) -> AppResult<()> {
        let state = self.connection_state(Request::TelescopeConnect).await?;
        if state != 1 {
            return Err(SkyxError::unexpected("telescope IsConnected", state.to_string()));
        }
        tracing::info!("Telescope connected");
        Ok(())
    }

    /// Disconnect the mount.
    pub async fn disconnect(&self) -> AppResult<()> {
        let state = self.connection_state(Request::TelescopeDisconnect).await?;
        if state != 0 {
            return Err(SkyxError::unexpected("telescope IsConnected", state.to_string()));
        }
        tracing::info!("Telescope disconnected");
        Ok(())
    }

    /// Slew to RA/Dec in degrees. Returns once the host reports the slew done.
    pub async fn slew_to_ra_dec(&self, ra_deg: f64, dec_deg: f64) -> AppResult<()> {
        self.call(Request::SlewToRaDec { ra_deg, dec_deg }).await?;
        Ok(())
    }

    /// RA and Dec tracking rates in arcseconds per second.
    pub async fn tracking_rates(&self) -> AppResult<(f64, f64)> {
        let reply = self.call(Request::GetTrackingRates).await?;
        let rates = parse_lines_f64(&reply, 2, "tracking rates")?;
        Ok((rates[0], rates[1]))
    }

    /// Enable tracking at custom RA/Dec rates in arcseconds per second.
    pub async fn set_tracking_rates(&self, ra_rate_asps: f64, dec_rate_asps: f64) -> AppResult<()> {
        self.call(Request::SetTrackingRates {
            ra_rate_asps,
            dec_rate_asps,
        })
        .await?;
        Ok(())
    }

    /// Track at the sidereal rate (zero offset rates).
    pub async fn sidereal_tracking(&self) -> AppResult<()> {
        self.set_tracking_rates(0.0, 0.0).await
    }

    /// Current pointing RA and Dec in degrees.
    pub async fn pointing_ra_dec(&self) -> AppResult<(f64, f64)> {
        let reply = self.call(Request::GetPointing).await?;
        let values = parse_fields_f64(&reply, 2, "pointing")?;
        Ok((values[0], values[1]))
    }

    /// Slew to RA/Dec, then start tracking at the given rates.
    ///
    /// Sent as two scripts; the second is only sent if the slew succeeded.
    pub async fn slew_to_ra_dec_and_track(
        &self,
        ra_deg: f64,
        dec_deg: f64,
        ra_rate_asps: f64,
        dec_rate_asps: f64,
    ) -> AppResult<()> {
        self.slew_to_ra_dec(ra_deg, dec_deg).await?;
        self.set_tracking_rates(ra_rate_asps, dec_rate_asps).await
    }

    /// Look up a satellite by designator, slew to it and track it.
    pub async fn slew_and_track_satellite(&self, designator: &str) -> AppResult<()> {
        let info = TargetInformation::new(self.transport.clone());
        let target = info.resolve(designator).await?;
        tracing::info!(designator, "Tracking satellite");
        self.slew_to_ra_dec_and_track(
            target.require("ra_now")?,
            target.require("dec_now")?,
            target.require("ra_rate_aspersec")?,
            target.require("dec_rate_aspersec")?,
        )
        .await
    }
}
