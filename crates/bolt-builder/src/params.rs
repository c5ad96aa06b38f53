use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Bolt";
pub const DEFAULT_HEAD_DIAMETER: f64 = 0.75;
pub const DEFAULT_BODY_DIAMETER: f64 = 0.5;
pub const DEFAULT_HEAD_HEIGHT: f64 = 0.3125;
pub const DEFAULT_BODY_LENGTH: f64 = 2.0;
pub const DEFAULT_CUT_ANGLE: f64 = PI / 6.0;
pub const DEFAULT_CHAMFER_DISTANCE: f64 = 0.03845;
pub const DEFAULT_FILLET_RADIUS: f64 = 0.02994;

/// Validated bolt dimensions in canonical units (cm, radians).
///
/// Only the resolver builds these from user input, so every value here has
/// passed validation: lengths are finite and positive, the head is wider
/// than the body and the cut angle lies strictly between 0 and 90 degrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoltParameters {
    name: String,
    head_diameter: f64,
    body_diameter: f64,
    head_height: f64,
    body_length: f64,
    cut_angle: f64,
    chamfer_distance: f64,
    fillet_radius: f64,
}

impl BoltParameters {
    /// Assemble already-validated values. Callers go through
    /// [`crate::resolve::resolve_parameters`].
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_validated(
        name: String,
        head_diameter: f64,
        body_diameter: f64,
        head_height: f64,
        body_length: f64,
        cut_angle: f64,
        chamfer_distance: f64,
        fillet_radius: f64,
    ) -> Self {
        Self {
            name,
            head_diameter,
            body_diameter,
            head_height,
            body_length,
            cut_angle,
            chamfer_distance,
            fillet_radius,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn head_diameter(&self) -> f64 {
        self.head_diameter
    }

    pub fn body_diameter(&self) -> f64 {
        self.body_diameter
    }

    pub fn head_height(&self) -> f64 {
        self.head_height
    }

    pub fn body_length(&self) -> f64 {
        self.body_length
    }

    /// Under-head cut angle in radians.
    pub fn cut_angle(&self) -> f64 {
        self.cut_angle
    }

    pub fn chamfer_distance(&self) -> f64 {
        self.chamfer_distance
    }

    pub fn fillet_radius(&self) -> f64 {
        self.fillet_radius
    }
}

impl Default for BoltParameters {
    fn default() -> Self {
        Self::from_validated(
            DEFAULT_NAME.to_string(),
            DEFAULT_HEAD_DIAMETER,
            DEFAULT_BODY_DIAMETER,
            DEFAULT_HEAD_HEIGHT,
            DEFAULT_BODY_LENGTH,
            DEFAULT_CUT_ANGLE,
            DEFAULT_CHAMFER_DISTANCE,
            DEFAULT_FILLET_RADIUS,
        )
    }
}

/// One unresolved numeric input: a canonical real or an expression with
/// optional units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Real(f64),
    Expression(String),
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Real(value)
    }
}

impl From<&str> for RawValue {
    fn from(expression: &str) -> Self {
        RawValue::Expression(expression.to_string())
    }
}

impl From<String> for RawValue {
    fn from(expression: String) -> Self {
        RawValue::Expression(expression)
    }
}

/// Bolt inputs as a user or file supplies them. Missing fields take the
/// default bolt's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawBoltParameters {
    pub name: String,
    pub head_diameter: RawValue,
    pub body_diameter: RawValue,
    pub head_height: RawValue,
    pub body_length: RawValue,
    pub cut_angle: RawValue,
    pub chamfer_distance: RawValue,
    pub fillet_radius: RawValue,
}

impl RawBoltParameters {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for RawBoltParameters {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            head_diameter: RawValue::Real(DEFAULT_HEAD_DIAMETER),
            body_diameter: RawValue::Real(DEFAULT_BODY_DIAMETER),
            head_height: RawValue::Real(DEFAULT_HEAD_HEIGHT),
            body_length: RawValue::Real(DEFAULT_BODY_LENGTH),
            cut_angle: RawValue::Real(DEFAULT_CUT_ANGLE),
            chamfer_distance: RawValue::Real(DEFAULT_CHAMFER_DISTANCE),
            fillet_radius: RawValue::Real(DEFAULT_FILLET_RADIUS),
        }
    }
}
