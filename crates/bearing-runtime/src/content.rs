//! Supplementary content shown while the overlay is revealed.
//!
//! The core treats the payload as opaque; [`ContentProvider`] is the seam
//! where any data source (fixed payload, local file, remote service) plugs
//! in.

use bearing_types::{
    BearingError, EstimateKind, MonetaryEstimate, PriceProjection, PropertySnapshot,
};

/// Yields the read-only payload rendered in the revealed overlay.
pub trait ContentProvider: Send + Sync {
    /// Produce the current payload.
    ///
    /// # Errors
    ///
    /// Provider-specific; the overlay stays hidden when this fails.
    fn snapshot(&self) -> Result<PropertySnapshot, BearingError>;
}

/// A provider that always returns the same payload.
#[derive(Debug, Clone)]
pub struct StaticContentProvider {
    snapshot: PropertySnapshot,
}

impl StaticContentProvider {
    pub fn new(snapshot: PropertySnapshot) -> Self {
        Self { snapshot }
    }

    /// Parse a payload from JSON.
    pub fn from_json(raw: &str) -> Result<Self, BearingError> {
        serde_json::from_str(raw)
            .map(Self::new)
            .map_err(|e| BearingError::Config(format!("invalid content payload: {e}")))
    }

    /// The demo payload used by the CLI when no content file is configured.
    pub fn demo() -> Self {
        Self::new(PropertySnapshot {
            building_name: "14 Arnall Avenue".to_string(),
            location: "Toronto, Canada".to_string(),
            estimate: MonetaryEstimate {
                kind: EstimateKind::Rent,
                amount: "3500".to_string(),
                currency: "CAD".to_string(),
                confidence: "medium".to_string(),
                notes: "Estimated monthly rent for a typical residential unit in the \
                        Scarborough area, reflecting current market conditions for \
                        similar properties."
                    .to_string(),
            },
            projection: PriceProjection {
                one_year: "3605".to_string(),
                five_year: "4025".to_string(),
                trend: "up".to_string(),
                confidence: "medium".to_string(),
                notes: "Projections based on historical performance of Toronto's \
                        residential market and anticipated economic stability, with \
                        moderate growth expected."
                    .to_string(),
            },
            nearby_grocery: vec![
                "FreshCo (Sheppard & Markham)".to_string(),
                "Walmart Supercentre (Sheppard Ave E)".to_string(),
                "T&T Supermarket (Middlefield Rd)".to_string(),
            ],
            nearby_schools: vec![
                "Mary Ward Catholic Secondary School".to_string(),
                "Silver Springs Public School".to_string(),
                "Agincourt Junior Public School".to_string(),
            ],
        })
    }
}

impl ContentProvider for StaticContentProvider {
    fn snapshot(&self) -> Result<PropertySnapshot, BearingError> {
        Ok(self.snapshot.clone())
    }
}
