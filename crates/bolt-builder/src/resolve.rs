//! Parameter resolution: raw user input to validated `BoltParameters`.

use std::f64::consts::FRAC_PI_2;

use tracing::debug;

use crate::error::ValidationError;
use crate::params::{BoltParameters, RawBoltParameters, RawValue};
use crate::units::LengthResolver;

/// Angles this close to 0 or 90 degrees count as the bound itself.
const ANGLE_EPSILON: f64 = 1e-9;

fn length(
    resolver: &dyn LengthResolver,
    field: &'static str,
    raw: &RawValue,
) -> Result<f64, ValidationError> {
    let value = match raw {
        RawValue::Real(v) => *v,
        RawValue::Expression(expr) => resolver
            .resolve_length(expr)
            .map_err(|source| ValidationError::Expression { field, source })?,
    };
    positive(field, value)
}

fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field, value });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveLength { field, value });
    }
    Ok(value)
}

/// Resolve and validate every bolt input. Pure: touches no kernel.
pub fn resolve_parameters(
    raw: &RawBoltParameters,
    resolver: &dyn LengthResolver,
) -> Result<BoltParameters, ValidationError> {
    let name = raw.name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let head_diameter = length(resolver, "head_diameter", &raw.head_diameter)?;
    let body_diameter = length(resolver, "body_diameter", &raw.body_diameter)?;
    let head_height = length(resolver, "head_height", &raw.head_height)?;
    let body_length = length(resolver, "body_length", &raw.body_length)?;
    let chamfer_distance = length(resolver, "chamfer_distance", &raw.chamfer_distance)?;
    let fillet_radius = length(resolver, "fillet_radius", &raw.fillet_radius)?;

    let cut_angle = match &raw.cut_angle {
        RawValue::Real(v) => *v,
        RawValue::Expression(expr) => {
            resolver
                .resolve_angle(expr)
                .map_err(|source| ValidationError::Expression {
                    field: "cut_angle",
                    source,
                })?
        }
    };
    if !cut_angle.is_finite() {
        return Err(ValidationError::NonFinite {
            field: "cut_angle",
            value: cut_angle,
        });
    }
    if cut_angle <= ANGLE_EPSILON || cut_angle >= FRAC_PI_2 - ANGLE_EPSILON {
        return Err(ValidationError::CutAngleOutOfRange {
            degrees: cut_angle.to_degrees(),
        });
    }

    if head_diameter <= body_diameter {
        return Err(ValidationError::HeadNotWiderThanBody {
            head: head_diameter,
            body: body_diameter,
        });
    }

    debug!(
        name,
        head_diameter, body_diameter, head_height, body_length, cut_angle, "parameters resolved"
    );
    Ok(BoltParameters::from_validated(
        name.to_string(),
        head_diameter,
        body_diameter,
        head_height,
        body_length,
        cut_angle,
        chamfer_distance,
        fillet_radius,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitsManager;
    use approx::assert_relative_eq;

    fn resolve(raw: &RawBoltParameters) -> Result<BoltParameters, ValidationError> {
        resolve_parameters(raw, &UnitsManager::new())
    }

    #[test]
    fn defaults_resolve_to_default_parameters() {
        let params = resolve(&RawBoltParameters::default()).unwrap();
        assert_eq!(params, BoltParameters::default());
    }

    #[test]
    fn expressions_use_default_units() {
        let raw = RawBoltParameters {
            head_diameter: "8 mm".into(),
            body_diameter: "0.5".into(),
            body_length: "1 in".into(),
            cut_angle: "30".into(),
            ..RawBoltParameters::default()
        };
        let params = resolve(&raw).unwrap();
        assert_relative_eq!(params.head_diameter(), 0.8, epsilon = 1e-12);
        assert_relative_eq!(params.body_diameter(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(params.body_length(), 2.54, epsilon = 1e-12);
        assert_relative_eq!(params.cut_angle(), std::f64::consts::PI / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn name_is_trimmed_and_required() {
        let raw = RawBoltParameters {
            name: "  ".to_string(),
            ..RawBoltParameters::default()
        };
        assert_eq!(resolve(&raw), Err(ValidationError::EmptyName));

        let raw = RawBoltParameters {
            name: " Hex M5 ".to_string(),
            ..RawBoltParameters::default()
        };
        assert_eq!(resolve(&raw).unwrap().name(), "Hex M5");
    }

    #[test]
    fn head_must_be_wider_than_body() {
        let raw = RawBoltParameters {
            head_diameter: 0.4.into(),
            ..RawBoltParameters::default()
        };
        assert!(matches!(
            resolve(&raw),
            Err(ValidationError::HeadNotWiderThanBody { .. })
        ));
        let raw = RawBoltParameters {
            head_diameter: 0.5.into(),
            ..RawBoltParameters::default()
        };
        assert!(resolve(&raw).is_err(), "equal diameters are rejected");
    }

    #[test]
    fn cut_angle_bounds_are_exclusive() {
        for angle in ["0", "90", "-10 deg", "2 rad"] {
            let raw = RawBoltParameters {
                cut_angle: angle.into(),
                ..RawBoltParameters::default()
            };
            assert!(
                matches!(resolve(&raw), Err(ValidationError::CutAngleOutOfRange { .. })),
                "{angle} should be rejected"
            );
        }
    }

    #[test]
    fn non_positive_and_non_finite_lengths() {
        let raw = RawBoltParameters {
            chamfer_distance: 0.0.into(),
            ..RawBoltParameters::default()
        };
        assert_eq!(
            resolve(&raw),
            Err(ValidationError::NonPositiveLength {
                field: "chamfer_distance",
                value: 0.0
            })
        );
        let raw = RawBoltParameters {
            body_length: f64::INFINITY.into(),
            ..RawBoltParameters::default()
        };
        assert!(matches!(
            resolve(&raw),
            Err(ValidationError::NonFinite { field: "body_length", .. })
        ));
    }

    #[test]
    fn bad_expression_names_the_field() {
        let raw = RawBoltParameters {
            fillet_radius: "2 *".into(),
            ..RawBoltParameters::default()
        };
        match resolve(&raw) {
            Err(ValidationError::Expression { field, .. }) => assert_eq!(field, "fillet_radius"),
            other => panic!("expected expression error, got {:?}", other),
        }
    }
}
