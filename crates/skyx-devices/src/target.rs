//! Star chart lookup and object information (`sky6StarChart`,
//! `sky6ObjectInformation`).

use crate::request::{Request, RESOLVE_PROPERTIES};
use serde::{Deserialize, Serialize};
use skyx_core::response::{expect_undefined, parse_fields_f64, parse_properties};
use skyx_core::{AppResult, ObjectProperties, ScriptTransport, SkyxError};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Coordinate epoch for reads of the current target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Epoch {
    /// Apparent coordinates for the current date
    #[default]
    Now,
    /// J2000.0 catalogue coordinates
    #[serde(rename = "2000")]
    J2000,
}

impl Epoch {
    /// `sk6ObjInfoProp` numbers for (RA, Dec) in this epoch.
    pub fn property_ids(self) -> (u32, u32) {
        match self {
            Epoch::Now => (54, 55),
            Epoch::J2000 => (56, 57),
        }
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Epoch::Now => f.write_str("now"),
            Epoch::J2000 => f.write_str("2000"),
        }
    }
}

impl FromStr for Epoch {
    type Err = SkyxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "now" => Ok(Epoch::Now),
            "2000" | "j2000" => Ok(Epoch::J2000),
            other => Err(SkyxError::InvalidConfiguration(format!(
                "Unknown epoch '{other}'. Must be one of: now, 2000"
            ))),
        }
    }
}

/// Object lookup against the host's star chart and object database.
pub struct TargetInformation {
    transport: Arc<dyn ScriptTransport>,
}

impl TargetInformation {
    /// Build a handle; no request is sent.
    pub fn new(transport: Arc<dyn ScriptTransport>) -> Self {
        Self { transport }
    }

    /// Select `target` on the star chart.
    ///
    /// `target` is an object name or decimal "ra,dec".
    pub async fn find(&self, target: &str) -> AppResult<()> {
        let request = Request::Find {
            target: target.to_string(),
        };
        let reply = self.transport.send(&request.render()).await?;
        expect_undefined(&reply, request.name())
            .map_err(|_| SkyxError::TargetNotFound(target.to_string()))
    }

    /// Raw text of one object-information property of the current target.
    pub async fn property(&self, id: u32) -> AppResult<String> {
        let reply = self
            .transport
            .send(&Request::ObjectProperty { id }.render())
            .await?;
        Ok(reply.trim().to_string())
    }

    /// RA and Dec of the current target, in degrees for the given epoch.
    pub async fn current_target_ra_dec(&self, epoch: Epoch) -> AppResult<(f64, f64)> {
        let request = Request::TargetCoordinates { epoch };
        let reply = self.transport.send(&request.render()).await?;
        let values = parse_fields_f64(&reply, 2, request.name())?;
        Ok((values[0], values[1]))
    }

    /// Find `target` and read its position and rates in a single script.
    ///
    /// Returns `ra_now`, `dec_now`, `azm`, `alt`, `ra_rate_aspersec` and
    /// `dec_rate_aspersec`. A lookup failure, or a reply with no properties,
    /// is [`SkyxError::TargetNotFound`]; a reply missing any of the six is
    /// [`SkyxError::UnexpectedValue`].
    pub async fn resolve(&self, target: &str) -> AppResult<ObjectProperties> {
        let request = Request::ResolveTarget {
            target: target.to_string(),
        };
        let reply = self.transport.send(&request.render()).await?;
        let properties = parse_properties(&reply, target)?;

        // No key-value lines at all: the lookup did not run, or its
        // not-found text was lost (a `|` in the name ends the reply early).
        if properties.is_empty() {
            return Err(SkyxError::TargetNotFound(target.to_string()));
        }
        for (_, key) in RESOLVE_PROPERTIES {
            let name = key.to_lowercase();
            if properties.get(&name).is_none() {
                return Err(SkyxError::unexpected(format!("resolve {target}"), name));
            }
        }
        tracing::debug!(name = target, count = properties.len(), "Resolved target");
        Ok(properties)
    }
}
