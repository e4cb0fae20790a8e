//! Heading normalization.
//!
//! Platforms disagree on how they report compass direction. Some expose an
//! absolute, platform-native compass heading; others only provide the alpha
//! rotation axis, whose value may be negative or exceed a full turn. This
//! module folds both into one reference frame:
//!
//! ```text
//! raw = compass_heading ?? alpha
//! h   = round(((raw % 360) + 360) % 360) % 360
//! ```
//!
//! # Example
//!
//! ```rust
//! use bearing_perception::heading::normalize;
//! use bearing_types::OrientationSample;
//!
//! let h = normalize(&OrientationSample::from_compass(-10.0)).unwrap();
//! assert_eq!(h.degrees(), 350);
//!
//! assert!(normalize(&OrientationSample::default()).is_none());
//! ```

use bearing_types::{NormalizedHeading, OrientationSample};

const FULL_TURN: f64 = 360.0;

/// Pick the raw heading a sample offers.
///
/// The platform-native compass heading wins when it is a finite number;
/// otherwise the alpha axis is used. `NaN` and infinities count as missing.
pub fn raw_heading(sample: &OrientationSample) -> Option<f64> {
    sample
        .compass_heading
        .filter(|v| v.is_finite())
        .or_else(|| sample.alpha.filter(|v| v.is_finite()))
}

/// Reduce any finite angle in degrees to whole degrees in `[0, 360)`.
///
/// Rounds half up, so `359.5` wraps to `0`. Returns `None` for non-finite
/// input.
pub fn normalize_degrees(raw: f64) -> Option<NormalizedHeading> {
    if !raw.is_finite() {
        return None;
    }
    let reduced = ((raw % FULL_TURN) + FULL_TURN) % FULL_TURN;
    let rounded = (reduced + 0.5).floor() % FULL_TURN;
    NormalizedHeading::new(rounded as u16)
}

/// Normalize a raw orientation sample into a canonical heading.
///
/// Returns `None` when the sample carries no usable heading, which callers
/// must treat as "no data" rather than any particular direction.
pub fn normalize(sample: &OrientationSample) -> Option<NormalizedHeading> {
    raw_heading(sample).and_then(normalize_degrees)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deg(sample: OrientationSample) -> Option<u16> {
        normalize(&sample).map(NormalizedHeading::degrees)
    }

    #[test]
    fn compass_heading_takes_priority_over_alpha() {
        let sample = OrientationSample {
            alpha: Some(90.0),
            compass_heading: Some(180.0),
            ..OrientationSample::default()
        };
        assert_eq!(deg(sample), Some(180));
    }

    #[test]
    fn falls_back_to_alpha() {
        assert_eq!(deg(OrientationSample::from_alpha(42.4)), Some(42));
    }

    #[test]
    fn non_finite_compass_falls_back_to_alpha() {
        let sample = OrientationSample {
            alpha: Some(10.0),
            compass_heading: Some(f64::NAN),
            ..OrientationSample::default()
        };
        assert_eq!(deg(sample), Some(10));
    }

    #[test]
    fn missing_or_non_numeric_yields_none() {
        assert_eq!(deg(OrientationSample::default()), None);
        assert_eq!(deg(OrientationSample::from_alpha(f64::NAN)), None);
        assert_eq!(deg(OrientationSample::from_compass(f64::INFINITY)), None);
        // beta/gamma alone never produce a heading
        let tilt_only = OrientationSample {
            beta: Some(45.0),
            gamma: Some(-12.0),
            ..OrientationSample::default()
        };
        assert_eq!(deg(tilt_only), None);
    }

    #[test]
    fn boundary_values() {
        assert_eq!(deg(OrientationSample::from_compass(0.0)), Some(0));
        assert_eq!(deg(OrientationSample::from_compass(360.0)), Some(0));
        assert_eq!(deg(OrientationSample::from_compass(-360.0)), Some(0));
        assert_eq!(deg(OrientationSample::from_compass(359.4)), Some(359));
        assert_eq!(deg(OrientationSample::from_compass(359.5)), Some(0));
    }

    #[test]
    fn negative_and_oversized_inputs_wrap() {
        assert_eq!(deg(OrientationSample::from_compass(-10.0)), Some(350));
        assert_eq!(deg(OrientationSample::from_alpha(-725.0)), Some(355));
        assert_eq!(deg(OrientationSample::from_alpha(1090.0)), Some(10));
    }

    #[test]
    fn result_is_congruent_and_in_range_across_sweep() {
        let mut raw = -1080.0;
        while raw <= 1080.0 {
            let h = normalize_degrees(raw).expect("finite input").degrees();
            assert!(h < 360, "raw {raw} produced {h}");
            let diff = (f64::from(h) - raw).rem_euclid(360.0);
            let distance = diff.min(360.0 - diff);
            assert!(distance <= 0.5 + 1e-9, "raw {raw} produced {h}");
            raw += 7.25;
        }
    }
}
