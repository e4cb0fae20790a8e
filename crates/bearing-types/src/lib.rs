use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifies which platform sensor a sample, fault, or permission refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Continuous position watch (GPS / network location).
    Geolocation,
    /// Device-orientation event stream (compass heading, alpha/beta/gamma).
    Orientation,
    /// Rear-facing camera feed. Only ever reported, never consumed here.
    Camera,
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorKind::Geolocation => write!(f, "geolocation"),
            SensorKind::Orientation => write!(f, "orientation"),
            SensorKind::Camera => write!(f, "camera"),
        }
    }
}

/// A single position fix. Superseded by the next fix; no history is kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Horizontal accuracy radius in metres (`>= 0`).
    pub accuracy_meters: f64,
    /// When the platform measured this fix.
    pub captured_at: DateTime<Utc>,
}

/// A raw, pre-normalization device-orientation sample.
///
/// Every field is optional because platforms differ in what they report.
/// `compass_heading` is the platform-native absolute bearing, present only
/// on platforms that expose one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
    pub compass_heading: Option<f64>,
}

impl OrientationSample {
    /// Sample carrying only a platform-native compass heading.
    pub fn from_compass(heading: f64) -> Self {
        Self {
            compass_heading: Some(heading),
            ..Self::default()
        }
    }

    /// Sample carrying only the alpha rotation axis.
    pub fn from_alpha(alpha: f64) -> Self {
        Self {
            alpha: Some(alpha),
            ..Self::default()
        }
    }
}

/// Compass heading in whole degrees, always within `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct NormalizedHeading(u16);

impl NormalizedHeading {
    /// Checked constructor. Returns `None` for `degrees >= 360`.
    pub fn new(degrees: u16) -> Option<Self> {
        (degrees < 360).then_some(Self(degrees))
    }

    pub fn degrees(self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for NormalizedHeading {
    type Error = BearingError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| {
            BearingError::MalformedSample(format!("heading {value} is outside [0, 360)"))
        })
    }
}

impl From<NormalizedHeading> for u16 {
    fn from(value: NormalizedHeading) -> Self {
        value.0
    }
}

impl std::fmt::Display for NormalizedHeading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Whether the device currently faces the target bearing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacingState(pub bool);

impl FacingState {
    pub const FACING: Self = Self(true);
    pub const AWAY: Self = Self(false);

    pub fn is_facing(self) -> bool {
        self.0
    }
}

impl From<FacingState> for bool {
    fn from(value: FacingState) -> Self {
        value.0
    }
}

/// Visibility of the supplementary-content overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayState {
    #[default]
    Hidden,
    Revealed,
}

// ────────────────────────────────────────────────────────────────────────────
// Supplementary content payload
// ────────────────────────────────────────────────────────────────────────────

/// Whether an estimate is a monthly rent or a sale price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateKind {
    Rent,
    Price,
}

impl std::fmt::Display for EstimateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimateKind::Rent => write!(f, "rent"),
            EstimateKind::Price => write!(f, "price"),
        }
    }
}

/// Current monetary estimate for a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryEstimate {
    pub kind: EstimateKind,
    pub amount: String,
    pub currency: String,
    pub confidence: String,
    pub notes: String,
}

/// Projected future values for a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceProjection {
    pub one_year: String,
    pub five_year: String,
    pub trend: String,
    pub confidence: String,
    pub notes: String,
}

/// Read-only payload rendered while the overlay is revealed.
///
/// The core never inspects these fields; they are only carried from a
/// content provider to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySnapshot {
    pub building_name: String,
    pub location: String,
    pub estimate: MonetaryEstimate,
    pub projection: PriceProjection,
    pub nearby_grocery: Vec<String>,
    pub nearby_schools: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Event envelope
// ────────────────────────────────────────────────────────────────────────────

/// Unified event wrapper for the sensor event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g., "bearing-runtime::stream_manager"
    pub source: String,
    pub payload: EventPayload,
}

impl Event {
    /// Wrap `payload` in a fresh envelope stamped with the current time.
    pub fn new(source: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Variants of data that can be routed over the sensor event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Position(PositionSample),
    /// A raw orientation sample together with its normalized heading, if any.
    Orientation {
        sample: OrientationSample,
        heading: Option<NormalizedHeading>,
    },
    Facing(FacingState),
    Overlay(OverlayState),
    SensorFault { sensor: SensorKind, message: String },
}

/// Error type shared by every crate in the workspace.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BearingError {
    #[error("Sensor unavailable: {sensor}: {details}")]
    SensorUnavailable { sensor: SensorKind, details: String },

    #[error("Permission denied for {0}")]
    PermissionDenied(SensorKind),

    #[error("Malformed sample: {0}")]
    MalformedSample(String),

    #[error("Event bus error: {0}")]
    Channel(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
