//! Imaging camera (`ccdsoftCamera`).
//!
//! # Parameters
//!
//! - `ExposureTime` - seconds, checked on write with a 1e-6 tolerance
//! - `BinX` - NxN binning factor, checked exactly on write
//! - `Frame` - [`FrameType`] code 1-4
//! - `AutoSaveOn` - whether the host saves each image automatically
//! - `Temperature`, `LastImageFileName` - read-only
//!
//! Selecting [`FrameType::Dark`] opens a dialog in the host UI on some
//! camera drivers.

use crate::request::Request;
use serde::{Deserialize, Serialize};
use skyx_core::response::{expect_status, parse_scalar, verify_exact, verify_f64};
use skyx_core::{AppResult, ScriptTransport, SkyxError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Status text the camera reports once connected and idle.
pub const STATUS_READY: &str = "Ready";

/// Status text the camera reports after a disconnect.
pub const STATUS_DISCONNECTED: &str = "Not Connected";

/// Frame types known to the host, with their script codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameType {
    /// Normal exposure
    Light,
    /// Zero-length readout
    Bias,
    /// Shutter-closed exposure
    Dark,
    /// Flat-field exposure
    #[serde(rename = "Flat Field")]
    FlatField,
}

impl FrameType {
    /// Every frame type, in code order.
    pub const ALL: [FrameType; 4] = [
        FrameType::Light,
        FrameType::Bias,
        FrameType::Dark,
        FrameType::FlatField,
    ];

    /// Code used by `ccdsoftCamera.Frame`.
    pub fn code(self) -> i64 {
        match self {
            FrameType::Light => 1,
            FrameType::Bias => 2,
            FrameType::Dark => 3,
            FrameType::FlatField => 4,
        }
    }

    /// Frame type for a `ccdsoftCamera.Frame` code.
    pub fn from_code(code: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|frame| frame.code() == code)
    }

    /// Display name as shown in the host UI.
    pub fn name(self) -> &'static str {
        match self {
            FrameType::Light => "Light",
            FrameType::Bias => "Bias",
            FrameType::Dark => "Dark",
            FrameType::FlatField => "Flat Field",
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FrameType {
    type Err = SkyxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| !c.is_whitespace() && *c != '_').collect();
        Self::ALL
            .into_iter()
            .find(|frame| frame.name().replace(' ', "").eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                let names: Vec<_> = Self::ALL.iter().map(|f| f.name()).collect();
                SkyxError::InvalidConfiguration(format!(
                    "Unknown frame type '{}'. Must be one of: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

/// Wrapper for the camera selected in the host's equipment profile.
pub struct Camera {
    transport: Arc<dyn ScriptTransport>,
}

impl Camera {
    /// Connect the camera synchronously and return a handle to it.
    ///
    /// Fails unless the host reports the camera as ready.
    pub async fn connect(transport: Arc<dyn ScriptTransport>) -> AppResult<Self> {
        Self::connect_with(transport, false).await
    }

    /// Connect the camera in the given exposure mode and return a handle to it.
    pub async fn connect_with(
        transport: Arc<dyn ScriptTransport>,
        asynchronous: bool,
    ) -> AppResult<Self> {
        let camera = Self { transport };
        camera.connect_device(asynchronous).await?;
        Ok(camera)
    }

    async fn call(&self, request: Request) -> AppResult<String> {
        self.transport.send(&request.render()).await
    }

    /// Reconnect the camera, optionally in asynchronous exposure mode.
    pub async fn connect_device(&self, asynchronous: bool) -> AppResult<()> {
        let reply = self.call(Request::CameraConnect { asynchronous }).await?;
        expect_status(&reply, STATUS_READY, "camera status")?;
        tracing::info!(asynchronous, "Camera connected");
        Ok(())
    }

    /// Disconnect the camera.
    pub async fn disconnect(&self) -> AppResult<()> {
        let reply = self.call(Request::CameraDisconnect).await?;
        expect_status(&reply, STATUS_DISCONNECTED, "camera status")?;
        tracing::info!("Camera disconnected");
        Ok(())
    }

    /// Current exposure time in seconds.
    pub async fn exposure_time(&self) -> AppResult<f64> {
        let reply = self.call(Request::GetExposureTime).await?;
        parse_scalar(&reply, "ExposureTime")
    }

    /// Set the exposure time and confirm the host accepted it.
    pub async fn set_exposure_time(&self, seconds: f64) -> AppResult<f64> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(SkyxError::InvalidConfiguration(format!(
                "exposure time must be a non-negative number of seconds, got {seconds}"
            )));
        }
        let reply = self.call(Request::SetExposureTime { seconds }).await?;
        verify_f64("ExposureTime", seconds, &reply)
    }

    /// Current binning factor (NxN, read from BinX).
    pub async fn binning(&self) -> AppResult<u32> {
        let reply = self.call(Request::GetBinning).await?;
        parse_scalar(&reply, "BinX")
    }

    /// Set NxN binning and confirm the host accepted it.
    pub async fn set_binning(&self, factor: u32) -> AppResult<u32> {
        if factor == 0 {
            return Err(SkyxError::InvalidConfiguration(
                "binning factor must be at least 1".into(),
            ));
        }
        let reply = self.call(Request::SetBinning { factor }).await?;
        verify_exact("BinX", &factor, &reply)
    }

    /// Current frame type.
    pub async fn frame_type(&self) -> AppResult<FrameType> {
        let reply = self.call(Request::GetFrame).await?;
        let code: i64 = parse_scalar(&reply, "Frame")?;
        FrameType::from_code(code).ok_or_else(|| SkyxError::unexpected("Frame", code.to_string()))
    }

    /// Select a frame type and confirm the host accepted it.
    pub async fn set_frame_type(&self, frame: FrameType) -> AppResult<FrameType> {
        let reply = self.call(Request::SetFrame { frame }).await?;
        verify_exact("Frame", &frame.code(), &reply)?;
        Ok(frame)
    }

    /// Start an exposure with the current settings.
    pub async fn take_image(&self) -> AppResult<()> {
        self.call(Request::TakeImage).await?;
        Ok(())
    }

    /// Path of the last image the host saved.
    pub async fn last_image_file_name(&self) -> AppResult<String> {
        let reply = self.call(Request::LastImageFileName).await?;
        Ok(reply.trim().to_string())
    }

    /// Sensor temperature in degrees Celsius.
    pub async fn temperature(&self) -> AppResult<f64> {
        let reply = self.call(Request::CameraTemperature).await?;
        parse_scalar(&reply, "Temperature")
    }

    /// Whether images are saved automatically.
    pub async fn auto_save(&self) -> AppResult<bool> {
        let reply = self.call(Request::GetAutoSave).await?;
        let flag: i64 = parse_scalar(&reply, "AutoSaveOn")?;
        Ok(flag != 0)
    }

    /// Turn automatic saving on or off.
    pub async fn set_auto_save(&self, enabled: bool) -> AppResult<()> {
        self.call(Request::SetAutoSave { enabled }).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyx_core::MockTransport;

    async fn connected(replies: &[&str]) -> (Arc<MockTransport>, Camera) {
        let mock = Arc::new(MockTransport::with_replies(
            std::iter::once("Ready").chain(replies.iter().copied()),
        ));
        let camera = Camera::connect(mock.clone()).await.unwrap();
        (mock, camera)
    }

    #[test]
    fn test_frame_type_codes_and_names() {
        assert_eq!(FrameType::from_code(1), Some(FrameType::Light));
        assert_eq!(FrameType::from_code(4), Some(FrameType::FlatField));
        assert_eq!(FrameType::from_code(5), None);
        assert_eq!(FrameType::FlatField.to_string(), "Flat Field");

        assert_eq!("flat field".parse::<FrameType>().unwrap(), FrameType::FlatField);
        assert_eq!("FLAT_FIELD".parse::<FrameType>().unwrap(), FrameType::FlatField);
        assert_eq!("dark".parse::<FrameType>().unwrap(), FrameType::Dark);
        assert!(matches!(
            "Sky".parse::<FrameType>(),
            Err(SkyxError::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn test_connect_requires_ready() {
        let mock = Arc::new(MockTransport::with_replies(["Not Connected"]));
        let result = Camera::connect(mock.clone()).await;
        assert!(matches!(result, Err(SkyxError::UnexpectedValue { .. })));
        assert_eq!(mock.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_blocks_further_requests() {
        let mock = Arc::new(MockTransport::responding(|script| {
            Ok(if script.contains("Imager.Connect();") {
                "Not Connected"
            } else {
                "2"
            }
            .to_string())
        }));

        assert!(Camera::connect(mock.clone()).await.is_err());
        assert_eq!(mock.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_with_asynchronous_mode() {
        let mock = Arc::new(MockTransport::with_replies(["Ready"]));
        Camera::connect_with(mock.clone(), true).await.unwrap();
        assert!(mock.last_sent().unwrap().contains("Imager.Asynchronous = 1;"));
    }

    #[tokio::test]
    async fn test_disconnect() {
        let (_, camera) = connected(&["Not Connected"]).await;
        camera.disconnect().await.unwrap();

        let (_, camera) = connected(&["Ready"]).await;
        assert!(camera.disconnect().await.is_err());
    }

    #[tokio::test]
    async fn test_binning_round_trip() {
        let (mock, camera) = connected(&["2", "1"]).await;

        assert_eq!(camera.set_binning(2).await.unwrap(), 2);
        assert_eq!(mock.last_sent().unwrap(), "ccdsoftCamera.BinX = 2;");

        let err = camera.set_binning(2).await.unwrap_err();
        assert_eq!(
            err,
            SkyxError::SetValueRejected {
                property: "BinX".into(),
                requested: "2".into(),
                observed: "1".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_binning_zero_fails_without_round_trip() {
        let (mock, camera) = connected(&[]).await;
        assert!(matches!(
            camera.set_binning(0).await,
            Err(SkyxError::InvalidConfiguration(_))
        ));
        assert_eq!(mock.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_exposure_time_tolerance() {
        let (_, camera) = connected(&["5.0000001", "5.01"]).await;
        assert!(camera.set_exposure_time(5.0).await.is_ok());
        assert!(matches!(
            camera.set_exposure_time(5.0).await,
            Err(SkyxError::SetValueRejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_exposure_time_rejects_negative() {
        let (_, camera) = connected(&[]).await;
        assert!(matches!(
            camera.set_exposure_time(-1.0).await,
            Err(SkyxError::InvalidConfiguration(_))
        ));
        assert!(camera.set_exposure_time(f64::NAN).await.is_err());
    }

    #[tokio::test]
    async fn test_frame_type_get_and_set() {
        let (mock, camera) = connected(&["3", "4", "1", "9"]).await;

        assert_eq!(camera.frame_type().await.unwrap(), FrameType::Dark);
        assert_eq!(
            camera.set_frame_type(FrameType::FlatField).await.unwrap(),
            FrameType::FlatField
        );
        assert_eq!(mock.last_sent().unwrap(), "ccdsoftCamera.Frame = 4;");

        assert!(matches!(
            camera.set_frame_type(FrameType::Bias).await,
            Err(SkyxError::SetValueRejected { .. })
        ));
        assert!(matches!(
            camera.frame_type().await,
            Err(SkyxError::UnexpectedValue { .. })
        ));
    }

    #[tokio::test]
    async fn test_readouts() {
        let (_, camera) = connected(&["-20.5", "C:/Images/Light_001.fit\n", "1", "0.5"]).await;

        assert_eq!(camera.temperature().await.unwrap(), -20.5);
        assert_eq!(
            camera.last_image_file_name().await.unwrap(),
            "C:/Images/Light_001.fit"
        );
        assert!(camera.auto_save().await.unwrap());
        assert_eq!(camera.exposure_time().await.unwrap(), 0.5);
    }
}
