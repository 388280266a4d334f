//! Reply parsing conventions.
//!
//! The host answers every script with plain text: whatever the script left in
//! its `Out` variable, or the value of its last expression. Which shape to
//! expect is known per call site, so each wrapper picks one of:
//!
//! - a single scalar on the first line ([`parse_scalar`], [`expect_status`])
//! - several scalars whose position carries the meaning
//!   ([`parse_lines_f64`], [`parse_fields_f64`])
//! - a `<prefix>_<name>:<value>` block ([`parse_properties`])
//! - a read-back check after a property write ([`verify_f64`], [`verify_exact`])
//!
//! The host has no error channel of its own. Failure sentinels embedded in
//! the text are translated here and nowhere else.

use crate::error::{AppResult, SkyxError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Sentinel the object-lookup scripts write when a target cannot be resolved.
pub const NOT_FOUND_MARKER: &str = "not found";

/// What the host prints for a script whose last statement returns nothing.
pub const UNDEFINED: &str = "undefined";

/// Tolerance for read-back comparison of floating-point properties.
pub const FLOAT_EPSILON: f64 = 1e-6;

/// First line of a reply, trimmed.
pub fn first_line<'a>(reply: &'a str, context: &str) -> AppResult<&'a str> {
    reply
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .ok_or_else(|| SkyxError::unexpected(context, reply))
}

/// Parse the first line of a reply as `T`.
pub fn parse_scalar<T: FromStr>(reply: &str, context: &str) -> AppResult<T> {
    let line = first_line(reply, context)?;
    line.parse::<T>()
        .map_err(|_| SkyxError::unexpected(context, line))
}

/// Require the first line of a reply to contain `expected`.
pub fn expect_status(reply: &str, expected: &str, context: &str) -> AppResult<()> {
    let line = reply.lines().next().unwrap_or_default().trim();
    if line.contains(expected) {
        Ok(())
    } else {
        Err(SkyxError::unexpected(context, line))
    }
}

/// Require a void call to have returned `undefined`.
pub fn expect_undefined(reply: &str, context: &str) -> AppResult<()> {
    let trimmed = reply.trim();
    if trimmed == UNDEFINED {
        Ok(())
    } else {
        Err(SkyxError::unexpected(context, trimmed))
    }
}

/// Parse exactly `count` floats, one per non-empty line, in order.
pub fn parse_lines_f64(reply: &str, count: usize, context: &str) -> AppResult<Vec<f64>> {
    let values = reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<f64>()
                .map_err(|_| SkyxError::unexpected(context, line))
        })
        .collect::<AppResult<Vec<_>>>()?;

    if values.len() != count {
        return Err(SkyxError::unexpected(context, reply));
    }
    Ok(values)
}

/// Parse exactly `count` whitespace-separated floats from the first line.
pub fn parse_fields_f64(reply: &str, count: usize, context: &str) -> AppResult<Vec<f64>> {
    let line = first_line(reply, context)?;
    let values = line
        .split_whitespace()
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|_| SkyxError::unexpected(context, line))
        })
        .collect::<AppResult<Vec<_>>>()?;

    if values.len() != count {
        return Err(SkyxError::unexpected(context, line));
    }
    Ok(values)
}

/// Named numeric properties read from a key-value reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectProperties {
    values: BTreeMap<String, f64>,
}

impl ObjectProperties {
    /// Value for a lower-cased property name, if present.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Value for a property the caller cannot do without.
    pub fn require(&self, name: &str) -> AppResult<f64> {
        self.get(name)
            .ok_or_else(|| SkyxError::unexpected(format!("property {name}"), "<missing>"))
    }

    /// Number of properties parsed.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was parsed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate properties in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.values
    }
}

impl FromIterator<(String, f64)> for ObjectProperties {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Parse a `<prefix>_<name>:<value>` block.
///
/// The whole reply is checked for [`NOT_FOUND_MARKER`] before any line is
/// parsed, so a lookup failure is always `TargetNotFound` and never a partial
/// result. Lines without a colon are skipped; a malformed colon line aborts.
pub fn parse_properties(reply: &str, target: &str) -> AppResult<ObjectProperties> {
    if reply.lines().any(|line| line.contains(NOT_FOUND_MARKER)) {
        return Err(SkyxError::TargetNotFound(target.to_string()));
    }

    reply
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| {
            let name = key
                .trim()
                .split_once('_')
                .map(|(_, rest)| rest.to_lowercase())
                .filter(|rest| !rest.is_empty())
                .ok_or_else(|| SkyxError::unexpected("property key", key))?;
            let value = value
                .trim()
                .parse::<f64>()
                .map_err(|_| SkyxError::unexpected(format!("property {name}"), value))?;
            Ok((name, value))
        })
        .collect()
}

/// Check a floating-point write against the host's read-back.
pub fn verify_f64(property: &str, requested: f64, reply: &str) -> AppResult<f64> {
    let observed: f64 = parse_scalar(reply, property)?;
    if (observed - requested).abs() > FLOAT_EPSILON {
        tracing::warn!(property, requested, observed, "Host rejected value");
        return Err(SkyxError::rejected(property, requested, observed));
    }
    Ok(observed)
}

/// Check an integer or string write against the host's read-back.
pub fn verify_exact<T>(property: &str, requested: &T, reply: &str) -> AppResult<T>
where
    T: FromStr + PartialEq + Display,
{
    let line = first_line(reply, property)?;
    match line.parse::<T>() {
        Ok(observed) if observed == *requested => Ok(observed),
        _ => {
            tracing::warn!(property, %requested, observed = line, "Host rejected value");
            Err(SkyxError::rejected(property, requested, line))
        }
    }
}
