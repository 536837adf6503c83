//! Barometric pressure to equivalent depth of water.
//!
//! 1 hPa = 10.1971636 mmH2O, taken here as 0.0102 m of water.

use anyhow::{Context, Result};
use std::path::Path;

use crate::model::Channel;

/// Standard sea level pressure (hPa).
pub const STANDARD_PRESSURE_HPA: f64 = 1013.0;
/// Metres of water per hPa.
pub const METRES_WATER_PER_HPA: f64 = 0.0102;

/// `LastValue` of the first channel named exactly `name`, or `None` if there is none.
///
/// Channels after the first match are not looked at.
pub fn select_reading(channels: &[Channel], name: &str) -> Result<Option<f64>> {
    match channels.iter().find(|c| c.name == name) {
        Some(channel) => channel.last_value_f64().map(Some),
        None => Ok(None),
    }
}

/// Depth of water (m) equivalent to the difference between `pressure_hpa` and standard pressure.
pub fn pressure_to_depth(pressure_hpa: f64) -> f64 {
    (pressure_hpa - STANDARD_PRESSURE_HPA) * METRES_WATER_PER_HPA
}

/// Rounds to 2 decimals.
///
/// Goes through decimal formatting so the exact binary value is rounded, not `x * 100`:
/// `-0.765000000000000013` becomes `-0.77` even though `x * 100` is exactly `-76.5`.
pub fn round2(x: f64) -> f64 {
    format!("{:.2}", x).parse().unwrap_or(x)
}

/// Renders a depth the way the web page consumes it: rounded to 2 decimals,
/// at least one fractional digit, followed by `!`.
pub fn format_depth(depth: f64) -> String {
    let d = round2(depth);
    if d.fract() == 0.0 {
        format!("{:.1}!", d)
    } else {
        format!("{}!", d)
    }
}

/// Writes the depth for `pressure_hpa` to `path`, replacing its contents.
///
/// Nothing is written unless the reading is strictly positive; the check is on the raw
/// pressure, so a reading of exactly standard pressure still writes `0.0!`.
/// Returns the unrounded depth when a file was written.
pub fn write_depth_file(pressure_hpa: f64, path: &Path) -> Result<Option<f64>> {
    if pressure_hpa.is_nan() || pressure_hpa <= 0.0 {
        return Ok(None);
    }
    let depth = pressure_to_depth(pressure_hpa);
    std::fs::write(path, format_depth(depth))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(Some(depth))
}
