//! Script templates for every operation the wrappers perform.
//!
//! Each operation is a [`Request`] variant carrying typed parameters. The
//! JavaScript text is produced by [`Request::render`] only when the request
//! is handed to the transport, so tests can assert on the exact payload.
//!
//! Property IDs used by the object-information requests are the
//! `sk6ObjInfoProp` numbers from the TheSkyX scripting reference.

use crate::camera::FrameType;
use crate::target::Epoch;
use std::fmt::Write as _;

/// Properties read by [`Request::ResolveTarget`], with the reply key for each.
pub const RESOLVE_PROPERTIES: [(u32, &str); 6] = [
    (54, "RA_NOW"),
    (55, "DEC_NOW"),
    (58, "AZM"),
    (59, "ALT"),
    (77, "RA_RATE_ASPERSEC"),
    (78, "DEC_RATE_ASPERSEC"),
];

/// Prefix the host-side script puts in front of every resolved property name.
pub const PROPERTY_PREFIX: &str = "sk6ObjInfoProp";

/// One script sent to TheSkyX.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Select an object on the star chart by name or "ra,dec"
    Find {
        /// Object name or decimal coordinates
        target: String,
    },
    /// Run a toolbar/preferences command via `TheSkyXAction`
    RunAction {
        /// Action identifier, e.g. `"TARGETFIND"`
        action: String,
    },
    /// Read one object-information property of the current target
    ObjectProperty {
        /// `sk6ObjInfoProp` number
        id: u32,
    },
    /// Read RA/Dec of the current target, space separated
    TargetCoordinates {
        /// Which coordinate epoch to read
        epoch: Epoch,
    },
    /// Find a target and read position and rates in one script
    ResolveTarget {
        /// Object name or designator
        target: String,
    },

    /// Connect the camera and report its status
    CameraConnect {
        /// Whether exposures should return before completion
        asynchronous: bool,
    },
    /// Disconnect the camera and report its status
    CameraDisconnect,
    /// Read the exposure time in seconds
    GetExposureTime,
    /// Write the exposure time in seconds
    SetExposureTime {
        /// Exposure in seconds
        seconds: f64,
    },
    /// Read the X binning factor
    GetBinning,
    /// Write the X binning factor
    SetBinning {
        /// NxN binning factor
        factor: u32,
    },
    /// Read the frame type code
    GetFrame,
    /// Write the frame type code
    SetFrame {
        /// Frame to select
        frame: FrameType,
    },
    /// Start an exposure
    TakeImage,
    /// Read the path of the last saved image
    LastImageFileName,
    /// Read the sensor temperature
    CameraTemperature,
    /// Read the auto-save flag
    GetAutoSave,
    /// Write the auto-save flag
    SetAutoSave {
        /// New flag value
        enabled: bool,
    },

    /// Connect the mount and report `IsConnected`
    TelescopeConnect,
    /// Disconnect the mount and report `IsConnected`
    TelescopeDisconnect,
    /// Slew to equatorial coordinates
    SlewToRaDec {
        /// Right ascension in degrees
        ra_deg: f64,
        /// Declination in degrees
        dec_deg: f64,
    },
    /// Read RA and Dec tracking rates, one per line
    GetTrackingRates,
    /// Enable tracking at the given rates
    SetTrackingRates {
        /// RA rate in arcseconds per second
        ra_rate_asps: f64,
        /// Dec rate in arcseconds per second
        dec_rate_asps: f64,
    },
    /// Read current pointing RA and Dec, space separated
    GetPointing,

    /// Caller-supplied script, sent unchanged
    Raw(String),
}

impl Request {
    /// Short name used in logs and error context.
    pub fn name(&self) -> &'static str {
        match self {
            Request::Find { .. } => "find",
            Request::RunAction { .. } => "action",
            Request::ObjectProperty { .. } => "object property",
            Request::TargetCoordinates { .. } => "target coordinates",
            Request::ResolveTarget { .. } => "resolve target",
            Request::CameraConnect { .. } => "camera connect",
            Request::CameraDisconnect => "camera disconnect",
            Request::GetExposureTime | Request::SetExposureTime { .. } => "ExposureTime",
            Request::GetBinning | Request::SetBinning { .. } => "BinX",
            Request::GetFrame | Request::SetFrame { .. } => "Frame",
            Request::TakeImage => "take image",
            Request::LastImageFileName => "LastImageFileName",
            Request::CameraTemperature => "Temperature",
            Request::GetAutoSave | Request::SetAutoSave { .. } => "AutoSaveOn",
            Request::TelescopeConnect => "telescope connect",
            Request::TelescopeDisconnect => "telescope disconnect",
            Request::SlewToRaDec { .. } => "slew",
            Request::GetTrackingRates | Request::SetTrackingRates { .. } => "tracking rates",
            Request::GetPointing => "pointing",
            Request::Raw(_) => "raw script",
        }
    }

    /// Render the JavaScript sent to the host.
    pub fn render(&self) -> String {
        match self {
            Request::Find { target } => {
                format!("sky6StarChart.Find({});", js_string(target))
            }
            Request::RunAction { action } => {
                format!("TheSkyXAction.execute({});", js_string(action))
            }
            Request::ObjectProperty { id } => format!(
                "var Out = \"\";\n\
                 sky6ObjectInformation.Property({id});\n\
                 Out = String(sky6ObjectInformation.ObjInfoPropOut);"
            ),
            Request::TargetCoordinates { epoch } => {
                let (ra, dec) = epoch.property_ids();
                format!(
                    "var Out = \"\";\n\
                     sky6ObjectInformation.Property({ra});\n\
                     var TargetRa = sky6ObjectInformation.ObjInfoPropOut;\n\
                     sky6ObjectInformation.Property({dec});\n\
                     var TargetDec = sky6ObjectInformation.ObjInfoPropOut;\n\
                     Out = String(TargetRa) + \" \" + String(TargetDec);"
                )
            }
            Request::ResolveTarget { target } => render_resolve(target),

            Request::CameraConnect { asynchronous } => format!(
                "var Imager = ccdsoftCamera;\n\
                 var Out = \"\";\n\
                 Imager.Connect();\n\
                 Imager.Asynchronous = {};\n\
                 Out = Imager.Status;",
                u8::from(*asynchronous)
            ),
            Request::CameraDisconnect => "var Imager = ccdsoftCamera;\n\
                 var Out = \"\";\n\
                 Imager.Disconnect();\n\
                 Out = Imager.Status;"
                .to_string(),
            Request::GetExposureTime => "ccdsoftCamera.ExposureTime".to_string(),
            Request::SetExposureTime { seconds } => {
                format!("ccdsoftCamera.ExposureTime = {seconds};")
            }
            Request::GetBinning => "ccdsoftCamera.BinX".to_string(),
            Request::SetBinning { factor } => format!("ccdsoftCamera.BinX = {factor};"),
            Request::GetFrame => "ccdsoftCamera.Frame".to_string(),
            Request::SetFrame { frame } => format!("ccdsoftCamera.Frame = {};", frame.code()),
            Request::TakeImage => "var Out = \"\";\nccdsoftCamera.TakeImage();".to_string(),
            Request::LastImageFileName => {
                "var Out = \"\";\nOut += ccdsoftCamera.LastImageFileName;".to_string()
            }
            Request::CameraTemperature => {
                "var Out = \"\";\nOut += ccdsoftCamera.Temperature;".to_string()
            }
            Request::GetAutoSave => "var Out = \"\";\nOut += ccdsoftCamera.AutoSaveOn;".to_string(),
            Request::SetAutoSave { enabled } => {
                format!("ccdsoftCamera.AutoSaveOn = {};", u8::from(*enabled))
            }

            Request::TelescopeConnect => "var Out = \"\";\n\
                 sky6RASCOMTele.Connect();\n\
                 Out = sky6RASCOMTele.IsConnected;"
                .to_string(),
            Request::TelescopeDisconnect => "var Out = \"\";\n\
                 sky6RASCOMTele.Disconnect();\n\
                 Out = sky6RASCOMTele.IsConnected;"
                .to_string(),
            Request::SlewToRaDec { ra_deg, dec_deg } => format!(
                "var Out = \"\";\n\
                 sky6RASCOMTele.SlewToRaDec({ra_deg}, {dec_deg}, \"\");"
            ),
            Request::GetTrackingRates => "var Out = \"\";\n\
                 Out += sky6RASCOMTele.dRaTrackingRate + \"\\n\";\n\
                 Out += sky6RASCOMTele.dDecTrackingRate;"
                .to_string(),
            Request::SetTrackingRates {
                ra_rate_asps,
                dec_rate_asps,
            } => format!("sky6RASCOMTele.SetTracking(1, 0, {ra_rate_asps}, {dec_rate_asps});"),
            Request::GetPointing => "var Out = \"\";\n\
                 sky6RASCOMTele.GetRaDec();\n\
                 Out = String(sky6RASCOMTele.dRa) + \" \" + String(sky6RASCOMTele.dDec);"
                .to_string(),

            Request::Raw(script) => script.clone(),
        }
    }
}

fn render_resolve(target: &str) -> String {
    let mut script = format!(
        "var Target = {};\n\
         var Out = \"\";\n\
         try {{\n    \
             sky6StarChart.Find(Target);\n",
        js_string(target)
    );
    for (id, key) in RESOLVE_PROPERTIES {
        // Writing to a String cannot fail.
        let _ = write!(
            script,
            "    sky6ObjectInformation.Property({id});\n    \
             Out += \"{PROPERTY_PREFIX}_{key}:\" + String(sky6ObjectInformation.ObjInfoPropOut) + \"\\n\";\n"
        );
    }
    script.push_str("} catch (e) {\n    Out = Target + \" not found.\";\n}");
    script
}

/// Quote `value` as a JavaScript string literal.
fn js_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_quotes_target() {
        assert_eq!(
            Request::Find { target: "M42".into() }.render(),
            "sky6StarChart.Find(\"M42\");"
        );
        assert_eq!(
            Request::Find { target: "say \"hi\"\\".into() }.render(),
            "sky6StarChart.Find(\"say \\\"hi\\\"\\\\\");"
        );
    }

    #[test]
    fn test_setters_render_values() {
        assert_eq!(
            Request::SetBinning { factor: 2 }.render(),
            "ccdsoftCamera.BinX = 2;"
        );
        assert_eq!(
            Request::SetExposureTime { seconds: 0.5 }.render(),
            "ccdsoftCamera.ExposureTime = 0.5;"
        );
        assert_eq!(
            Request::SetFrame { frame: FrameType::FlatField }.render(),
            "ccdsoftCamera.Frame = 4;"
        );
        assert_eq!(
            Request::SetAutoSave { enabled: true }.render(),
            "ccdsoftCamera.AutoSaveOn = 1;"
        );
    }

    #[test]
    fn test_camera_connect_sets_asynchronous_flag() {
        let script = Request::CameraConnect { asynchronous: false }.render();
        assert!(script.contains("Imager.Connect();"));
        assert!(script.contains("Imager.Asynchronous = 0;"));
        assert!(script.ends_with("Out = Imager.Status;"));
    }

    #[test]
    fn test_target_coordinates_epochs() {
        let now = Request::TargetCoordinates { epoch: Epoch::Now }.render();
        assert!(now.contains("Property(54)") && now.contains("Property(55)"));

        let j2000 = Request::TargetCoordinates { epoch: Epoch::J2000 }.render();
        assert!(j2000.contains("Property(56)") && j2000.contains("Property(57)"));
    }

    #[test]
    fn test_resolve_reads_all_properties_in_one_script() {
        let script = Request::ResolveTarget { target: "25544".into() }.render();

        assert!(script.starts_with("var Target = \"25544\";"));
        let find = script.find("sky6StarChart.Find(Target);").unwrap();
        for (id, key) in RESOLVE_PROPERTIES {
            let read = script.find(&format!("Property({id});")).unwrap();
            assert!(read > find, "property {id} read before find");
            assert!(script.contains(&format!("\"sk6ObjInfoProp_{key}:\"")));
        }
        assert!(script.contains("Out = Target + \" not found.\";"));
    }

    #[test]
    fn test_slew_and_tracking_scripts() {
        let slew = Request::SlewToRaDec { ra_deg: 180.0, dec_deg: 45.0 }.render();
        assert!(slew.contains("sky6RASCOMTele.SlewToRaDec(180, 45, \"\");"));

        let track = Request::SetTrackingRates { ra_rate_asps: 0.1, dec_rate_asps: -0.1 }.render();
        assert_eq!(track, "sky6RASCOMTele.SetTracking(1, 0, 0.1, -0.1);");
    }

    #[test]
    fn test_raw_is_unchanged() {
        let script = "var Out = 6 * 7;";
        assert_eq!(Request::Raw(script.into()).render(), script);
        assert_eq!(Request::Raw(script.into()).name(), "raw script");
    }
}
