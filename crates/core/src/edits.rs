//! Non-destructive edit parameters, their validation, and snapshot diffing.
//!
//! An [`EditParameters`] value is a complete, self-contained recipe applied at
//! render/export time. Every numeric knob has a closed inclusive range;
//! out-of-range input is rejected with [`EditValidationError::OutOfRange`]
//! rather than clamped, so callers learn about bad values instead of having
//! their edits silently altered.
//!
//! The persisted JSON shape evolves additively only: every struct is
//! `#[serde(default)]` so snapshots written before a field existed still
//! deserialize when replayed by a revert.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diff::FieldChange;

/* --------------------------------------------------------------------------
Ranges
-------------------------------------------------------------------------- */

/// An inclusive numeric range for one edit knob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `true` when `value` is finite and within `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

pub const EXPOSURE_RANGE: ParamRange = ParamRange::new(-5.0, 5.0);
/// Shared by contrast, highlights, shadows, whites, blacks, saturation and vibrance.
pub const TONE_RANGE: ParamRange = ParamRange::new(-100.0, 100.0);
/// White balance in Kelvin.
pub const TEMPERATURE_RANGE: ParamRange = ParamRange::new(2000.0, 10000.0);
pub const TINT_RANGE: ParamRange = ParamRange::new(-150.0, 150.0);
pub const SHARPENING_AMOUNT_RANGE: ParamRange = ParamRange::new(0.0, 150.0);
pub const SHARPENING_RADIUS_RANGE: ParamRange = ParamRange::new(0.5, 3.0);
/// Shared by sharpening detail/masking and both noise reduction knobs.
pub const PERCENT_RANGE: ParamRange = ParamRange::new(0.0, 100.0);

/// Tolerance when checking that a crop stays inside the unit square.
const GEOMETRY_EPSILON: f64 = 1e-9;

/* --------------------------------------------------------------------------
Errors
-------------------------------------------------------------------------- */

/// Reasons an edit snapshot is refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid crop geometry: {0}")]
    InvalidGeometry(String),
}

/* --------------------------------------------------------------------------
Parameter model
-------------------------------------------------------------------------- */

/// Sharpening controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sharpening {
    pub amount: f64,
    pub radius: f64,
    pub detail: f64,
    pub masking: f64,
}

impl Default for Sharpening {
    fn default() -> Self {
        Self {
            amount: 40.0,
            radius: 1.0,
            detail: 25.0,
            masking: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseReduction {
    pub luminance: f64,
    pub color: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensCorrections {
    pub distortion: bool,
    pub vignette: bool,
    pub chromatic_aberration: bool,
}

/// Crop aspect constraint, serialized as `"free"` or `"W:H"` (e.g. `"16:9"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AspectRatio {
    /// Unconstrained. A free crop may extend outside the unit square.
    Free,
    Fixed { width: u32, height: u32 },
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => f.write_str("free"),
            Self::Fixed { width, height } => write!(f, "{width}:{height}"),
        }
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("free") {
            return Ok(Self::Free);
        }
        let (w, h) = trimmed
            .split_once(':')
            .ok_or_else(|| format!("Invalid aspect ratio '{value}'. Expected 'free' or 'W:H'"))?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("Invalid aspect ratio width in '{value}'"))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("Invalid aspect ratio height in '{value}'"))?;
        if width == 0 || height == 0 {
            return Err(format!("Aspect ratio '{value}' must have non-zero sides"));
        }
        Ok(Self::Fixed { width, height })
    }
}

impl From<AspectRatio> for String {
    fn from(value: AspectRatio) -> Self {
        value.to_string()
    }
}

/// Crop rectangle in normalized image-fraction units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default, alias = "rotation")]
    pub rotation_degrees: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
}

impl Crop {
    fn is_free(&self) -> bool {
        self.aspect_ratio == Some(AspectRatio::Free)
    }

    fn validate(mut self) -> Result<Self, EditValidationError> {
        let coords = [self.x, self.y, self.width, self.height];
        if coords.iter().any(|v| !v.is_finite()) {
            return Err(EditValidationError::InvalidGeometry(
                "crop coordinates must be finite numbers".to_string(),
            ));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(EditValidationError::InvalidGeometry(format!(
                "crop width and height must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.is_free() {
            let right = self.x + self.width;
            let bottom = self.y + self.height;
            if self.x < 0.0
                || self.y < 0.0
                || right > 1.0 + GEOMETRY_EPSILON
                || bottom > 1.0 + GEOMETRY_EPSILON
            {
                return Err(EditValidationError::InvalidGeometry(format!(
                    "crop must stay within the image: x={}, y={}, x+width={right}, y+height={bottom}",
                    self.x, self.y
                )));
            }
        }
        self.rotation_degrees = normalize_rotation(self.rotation_degrees)?;
        Ok(self)
    }
}

/// Wrap a rotation into `[0, 360)`.
fn normalize_rotation(degrees: f64) -> Result<f64, EditValidationError> {
    if !degrees.is_finite() {
        return Err(EditValidationError::InvalidGeometry(
            "crop rotation must be a finite number".to_string(),
        ));
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round tiny negatives up to exactly 360.0.
    Ok(if wrapped >= 360.0 { 0.0 } else { wrapped })
}

/// A complete edit snapshot for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditParameters {
    pub exposure: f64,
    pub contrast: f64,
    pub highlights: f64,
    pub shadows: f64,
    pub whites: f64,
    pub blacks: f64,
    pub temperature: f64,
    pub tint: f64,
    pub saturation: f64,
    pub vibrance: f64,
    pub sharpening: Sharpening,
    pub noise_reduction: NoiseReduction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
    pub lens_corrections: LensCorrections,
}

impl Default for EditParameters {
    /// The baseline applied to new images and by "reset to default".
    fn default() -> Self {
        Self {
            exposure: 0.0,
            contrast: 0.0,
            highlights: 0.0,
            shadows: 0.0,
            whites: 0.0,
            blacks: 0.0,
            temperature: 5500.0,
            tint: 0.0,
            saturation: 0.0,
            vibrance: 0.0,
            sharpening: Sharpening::default(),
            noise_reduction: NoiseReduction::default(),
            crop: None,
            lens_corrections: LensCorrections::default(),
        }
    }
}

fn check(field: &'static str, value: f64, range: ParamRange) -> Result<(), EditValidationError> {
    if range.contains(value) {
        Ok(())
    } else {
        Err(EditValidationError::OutOfRange {
            field,
            value,
            min: range.min,
            max: range.max,
        })
    }
}

impl EditParameters {
    /// Validate every field and normalize the crop rotation.
    ///
    /// Pure: a snapshot that is already valid comes back unchanged, apart
    /// from rotation wraparound into `[0, 360)`.
    pub fn validate(mut self) -> Result<Self, EditValidationError> {
        check("exposure", self.exposure, EXPOSURE_RANGE)?;
        check("contrast", self.contrast, TONE_RANGE)?;
        check("highlights", self.highlights, TONE_RANGE)?;
        check("shadows", self.shadows, TONE_RANGE)?;
        check("whites", self.whites, TONE_RANGE)?;
        check("blacks", self.blacks, TONE_RANGE)?;
        check("temperature", self.temperature, TEMPERATURE_RANGE)?;
        check("tint", self.tint, TINT_RANGE)?;
        check("saturation", self.saturation, TONE_RANGE)?;
        check("vibrance", self.vibrance, TONE_RANGE)?;

        check("sharpening.amount", self.sharpening.amount, SHARPENING_AMOUNT_RANGE)?;
        check("sharpening.radius", self.sharpening.radius, SHARPENING_RADIUS_RANGE)?;
        check("sharpening.detail", self.sharpening.detail, PERCENT_RANGE)?;
        check("sharpening.masking", self.sharpening.masking, PERCENT_RANGE)?;

        check(
            "noise_reduction.luminance",
            self.noise_reduction.luminance,
            PERCENT_RANGE,
        )?;
        check("noise_reduction.color", self.noise_reduction.color, PERCENT_RANGE)?;

        if let Some(crop) = self.crop {
            self.crop = Some(crop.validate()?);
        }

        Ok(self)
    }

    /// Fields that differ between `self` (before) and `other` (after).
    pub fn diff(&self, other: &Self) -> Vec<FieldChange> {
        let (a, b) = (self, other);
        [
            FieldChange::between("exposure", Some(&a.exposure), Some(&b.exposure)),
            FieldChange::between("contrast", Some(&a.contrast), Some(&b.contrast)),
            FieldChange::between("highlights", Some(&a.highlights), Some(&b.highlights)),
            FieldChange::between("shadows", Some(&a.shadows), Some(&b.shadows)),
            FieldChange::between("whites", Some(&a.whites), Some(&b.whites)),
            FieldChange::between("blacks", Some(&a.blacks), Some(&b.blacks)),
            FieldChange::between("temperature", Some(&a.temperature), Some(&b.temperature)),
            FieldChange::between("tint", Some(&a.tint), Some(&b.tint)),
            FieldChange::between("saturation", Some(&a.saturation), Some(&b.saturation)),
            FieldChange::between("vibrance", Some(&a.vibrance), Some(&b.vibrance)),
            FieldChange::between(
                "sharpening.amount",
                Some(&a.sharpening.amount),
                Some(&b.sharpening.amount),
            ),
            FieldChange::between(
                "sharpening.radius",
                Some(&a.sharpening.radius),
                Some(&b.sharpening.radius),
            ),
            FieldChange::between(
                "sharpening.detail",
                Some(&a.sharpening.detail),
                Some(&b.sharpening.detail),
            ),
            FieldChange::between(
                "sharpening.masking",
                Some(&a.sharpening.masking),
                Some(&b.sharpening.masking),
            ),
            FieldChange::between(
                "noise_reduction.luminance",
                Some(&a.noise_reduction.luminance),
                Some(&b.noise_reduction.luminance),
            ),
            FieldChange::between(
                "noise_reduction.color",
                Some(&a.noise_reduction.color),
                Some(&b.noise_reduction.color),
            ),
            FieldChange::between("crop", a.crop.as_ref(), b.crop.as_ref()),
            FieldChange::between(
                "lens_corrections.distortion",
                Some(&a.lens_corrections.distortion),
                Some(&b.lens_corrections.distortion),
            ),
            FieldChange::between(
                "lens_corrections.vignette",
                Some(&a.lens_corrections.vignette),
                Some(&b.lens_corrections.vignette),
            ),
            FieldChange::between(
                "lens_corrections.chromatic_aberration",
                Some(&a.lens_corrections.chromatic_aberration),
                Some(&b.lens_corrections.chromatic_aberration),
            ),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::diff::DiffStatus;

    fn crop(x: f64, y: f64, width: f64, height: f64) -> Crop {
        Crop {
            x,
            y,
            width,
            height,
            rotation_degrees: 0.0,
            aspect_ratio: None,
        }
    }

    #[test]
    fn default_matches_documented_baseline() {
        let d = EditParameters::default();
        assert_eq!(d.temperature, 5500.0);
        assert_eq!(d.sharpening.amount, 40.0);
        assert_eq!(d.sharpening.radius, 1.0);
        assert_eq!(d.sharpening.detail, 25.0);
        assert_eq!(d.sharpening.masking, 0.0);
        assert_eq!(d.exposure, 0.0);
        assert!(d.crop.is_none());
        assert!(!d.lens_corrections.distortion);
    }

    #[test]
    fn default_is_valid() {
        let d = EditParameters::default();
        assert_eq!(d.clone().validate().unwrap(), d);
    }

    #[test]
    fn valid_boundaries_are_returned_unchanged() {
        let params = EditParameters {
            exposure: -5.0,
            contrast: 100.0,
            highlights: -100.0,
            temperature: 10000.0,
            tint: -150.0,
            sharpening: Sharpening {
                amount: 150.0,
                radius: 0.5,
                detail: 100.0,
                masking: 100.0,
            },
            noise_reduction: NoiseReduction {
                luminance: 100.0,
                color: 0.0,
            },
            crop: Some(crop(0.0, 0.0, 1.0, 1.0)),
            ..EditParameters::default()
        };
        assert_eq!(params.clone().validate().unwrap(), params);
    }

    #[test]
    fn out_of_range_names_the_field() {
        let params = EditParameters {
            exposure: 5.5,
            ..EditParameters::default()
        };
        assert_matches!(
            params.validate(),
            Err(EditValidationError::OutOfRange { field: "exposure", value, min, max })
                if value == 5.5 && min == -5.0 && max == 5.0
        );
    }

    #[test]
    fn out_of_range_nested_field() {
        let params = EditParameters {
            sharpening: Sharpening {
                radius: 0.4,
                ..Sharpening::default()
            },
            ..EditParameters::default()
        };
        assert_matches!(
            params.validate(),
            Err(EditValidationError::OutOfRange { field: "sharpening.radius", .. })
        );
    }

    #[test]
    fn temperature_below_range_rejected() {
        let params = EditParameters {
            temperature: 1999.0,
            ..EditParameters::default()
        };
        assert_matches!(
            params.validate(),
            Err(EditValidationError::OutOfRange { field: "temperature", .. })
        );
    }

    #[test]
    fn nan_is_rejected_not_clamped() {
        let params = EditParameters {
            tint: f64::NAN,
            ..EditParameters::default()
        };
        assert_matches!(
            params.validate(),
            Err(EditValidationError::OutOfRange { field: "tint", .. })
        );
    }

    #[test]
    fn crop_past_right_edge_is_invalid_geometry() {
        let params = EditParameters {
            crop: Some(crop(0.9, 0.0, 0.3, 0.5)),
            ..EditParameters::default()
        };
        assert_matches!(params.validate(), Err(EditValidationError::InvalidGeometry(_)));
    }

    #[test]
    fn crop_with_zero_height_is_invalid() {
        let params = EditParameters {
            crop: Some(crop(0.1, 0.1, 0.5, 0.0)),
            ..EditParameters::default()
        };
        assert_matches!(params.validate(), Err(EditValidationError::InvalidGeometry(_)));
    }

    #[test]
    fn free_crop_may_leave_unit_square() {
        let params = EditParameters {
            crop: Some(Crop {
                aspect_ratio: Some(AspectRatio::Free),
                ..crop(0.9, -0.1, 0.3, 0.5)
            }),
            ..EditParameters::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn fixed_aspect_crop_must_stay_inside() {
        let params = EditParameters {
            crop: Some(Crop {
                aspect_ratio: Some(AspectRatio::Fixed { width: 16, height: 9 }),
                ..crop(0.9, 0.0, 0.3, 0.5)
            }),
            ..EditParameters::default()
        };
        assert_matches!(params.validate(), Err(EditValidationError::InvalidGeometry(_)));
    }

    #[test]
    fn rotation_wraps_into_range() {
        assert_eq!(normalize_rotation(370.0).unwrap(), 10.0);
        assert_eq!(normalize_rotation(-90.0).unwrap(), 270.0);
        assert_eq!(normalize_rotation(360.0).unwrap(), 0.0);
        assert_eq!(normalize_rotation(45.0).unwrap(), 45.0);
        assert!(normalize_rotation(f64::INFINITY).is_err());
    }

    #[test]
    fn validate_normalizes_crop_rotation() {
        let params = EditParameters {
            crop: Some(Crop {
                rotation_degrees: -30.0,
                ..crop(0.1, 0.1, 0.5, 0.5)
            }),
            ..EditParameters::default()
        };
        let validated = params.validate().unwrap();
        assert_eq!(validated.crop.unwrap().rotation_degrees, 330.0);
    }

    #[test]
    fn aspect_ratio_parses_and_displays() {
        assert_eq!(AspectRatio::try_from("free".to_string()), Ok(AspectRatio::Free));
        assert_eq!(
            AspectRatio::try_from("16:9".to_string()),
            Ok(AspectRatio::Fixed { width: 16, height: 9 })
        );
        assert!(AspectRatio::try_from("16x9".to_string()).is_err());
        assert!(AspectRatio::try_from("0:9".to_string()).is_err());
        assert_eq!(AspectRatio::Fixed { width: 4, height: 3 }.to_string(), "4:3");
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let parsed: EditParameters = serde_json::from_str(r#"{"exposure": 1.5}"#).unwrap();
        assert_eq!(parsed.exposure, 1.5);
        assert_eq!(parsed.temperature, 5500.0);
        assert_eq!(parsed.sharpening.amount, 40.0);
    }

    #[test]
    fn crop_accepts_legacy_rotation_key() {
        let parsed: Crop = serde_json::from_str(
            r#"{"x": 0, "y": 0, "width": 0.5, "height": 0.5, "rotation": 90, "aspect_ratio": "4:3"}"#,
        )
        .unwrap();
        assert_eq!(parsed.rotation_degrees, 90.0);
        assert_eq!(parsed.aspect_ratio, Some(AspectRatio::Fixed { width: 4, height: 3 }));
    }

    #[test]
    fn diff_reports_only_changed_fields() {
        let before = EditParameters::default();
        let after = EditParameters {
            exposure: 1.5,
            temperature: 6500.0,
            ..EditParameters::default()
        };
        let changes = before.diff(&after);
        let fields: Vec<&str> = changes.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["exposure", "temperature"]);
        assert!(changes.iter().all(|c| c.status == DiffStatus::Changed));
    }

    #[test]
    fn diff_of_identical_snapshots_is_empty() {
        let a = EditParameters::default();
        assert!(a.diff(&a.clone()).is_empty());
    }

    #[test]
    fn diff_marks_added_crop() {
        let before = EditParameters::default();
        let after = EditParameters {
            crop: Some(crop(0.0, 0.0, 0.5, 0.5)),
            ..EditParameters::default()
        };
        let changes = before.diff(&after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "crop");
        assert_eq!(changes[0].status, DiffStatus::Added);
        assert!(changes[0].before.is_none());
    }
}
