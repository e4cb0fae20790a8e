//! Text readout of the current sensor state.
//!
//! Absent values render as [`PLACEHOLDER`] so the display never shows a
//! fabricated number.

use bearing_types::{NormalizedHeading, OrientationSample, PositionSample};
use chrono::Local;

use crate::stream_manager::SensorSnapshot;

/// Shown in place of any value that has not been measured.
pub const PLACEHOLDER: &str = "---";

/// Display-ready strings for every HUD line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudSnapshot {
    pub latitude: String,
    pub longitude: String,
    pub accuracy: String,
    pub updated: String,
    pub heading: String,
    pub alpha: String,
    pub beta: String,
    pub gamma: String,
    /// Whether the orientation stream is live. When false the presentation
    /// layer offers an "enable orientation" action.
    pub orientation_enabled: bool,
}

fn or_placeholder<T>(value: Option<T>, fmt: impl FnOnce(T) -> String) -> String {
    value.map(fmt).unwrap_or_else(|| PLACEHOLDER.to_string())
}

impl HudSnapshot {
    pub fn new(snapshot: &SensorSnapshot, orientation_enabled: bool) -> Self {
        let position: Option<&PositionSample> = snapshot.position.as_ref();
        let orientation: Option<&OrientationSample> = snapshot.orientation.as_ref();
        let axis = |pick: fn(&OrientationSample) -> Option<f64>| {
            or_placeholder(
                orientation.and_then(pick).filter(|v| v.is_finite()),
                |v| format!("{v:.1}°"),
            )
        };

        Self {
            latitude: or_placeholder(position, |p| format!("{:.6}", p.latitude)),
            longitude: or_placeholder(position, |p| format!("{:.6}", p.longitude)),
            accuracy: or_placeholder(position, |p| format!("±{:.2} m", p.accuracy_meters)),
            updated: or_placeholder(position, |p| {
                p.captured_at
                    .with_timezone(&Local)
                    .format("%H:%M:%S")
                    .to_string()
            }),
            heading: or_placeholder(snapshot.heading, |h: NormalizedHeading| h.to_string()),
            alpha: axis(|o| o.alpha),
            beta: axis(|o| o.beta),
            gamma: axis(|o| o.gamma),
            orientation_enabled,
        }
    }
}

impl std::fmt::Display for HudSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Lat:      {}", self.latitude)?;
        writeln!(f, "Lng:      {}", self.longitude)?;
        writeln!(f, "Accuracy: {}", self.accuracy)?;
        writeln!(f, "Updated:  {}", self.updated)?;
        writeln!(f, "Heading:  {}", self.heading)?;
        writeln!(f, "Alpha:    {}", self.alpha)?;
        writeln!(f, "Beta:     {}", self.beta)?;
        write!(f, "Gamma:    {}", self.gamma)
    }
}
