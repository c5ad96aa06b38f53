//! Hexagonal head: a six-sided prism on the component's XY plane.

use std::f64::consts::PI;

use bolt_kernel::ExtrudeSpec;
use bolt_types::{ConstructionPlane, ExtentDirection, FeatureOperation, Point2, Point3, SketchCurve};
use modeling_ops::{
    execute_extrude, execute_sketch, to_sketch_space, FeatureResult, KernelBundle, OpError,
};
use tracing::{info, instrument};

use crate::context::BuildContext;
use crate::error::{GeometryError, Stage};
use crate::params::BoltParameters;

/// Corners of the head hexagon, counter-clockwise from the +u axis.
pub fn hexagon_vertices(center: Point2, head_diameter: f64) -> [Point2; 6] {
    let radius = head_diameter / 2.0;
    std::array::from_fn(|i| {
        let angle = i as f64 * PI / 3.0;
        Point2::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        )
    })
}

/// Hexagon sides drawn from corner i+1 back to corner i. The loop winds
/// clockwise about the sketch normal, which puts the head extrude's end
/// face on the sketch plane.
pub fn hexagon_curves(center: Point2, head_diameter: f64) -> Vec<SketchCurve> {
    let v = hexagon_vertices(center, head_diameter);
    (0..6)
        .map(|i| SketchCurve::Line {
            start: v[(i + 1) % 6],
            end: v[i],
        })
        .collect()
}

/// Sketch the hexagon, extrude it into a new body and give the body the
/// bolt's name.
#[instrument(skip(kb, ctx, params), fields(head_diameter = params.head_diameter()))]
pub fn build_head(
    kb: &mut dyn KernelBundle,
    ctx: &mut BuildContext,
    params: &BoltParameters,
) -> Result<FeatureResult, GeometryError> {
    let fail = |e| GeometryError::new(Stage::Head, e);
    let center = to_sketch_space(ConstructionPlane::XY, Point3::ORIGIN);
    let sketch = execute_sketch(
        kb,
        ctx.component,
        ConstructionPlane::XY,
        &hexagon_curves(center, params.head_diameter()),
    )
    .map_err(fail)?;
    let profile = sketch
        .profiles
        .first()
        .copied()
        .ok_or_else(|| fail(OpError::NoProfiles))?;

    let spec = ExtrudeSpec {
        distance: params.head_height(),
        direction: ExtentDirection::Positive,
        operation: FeatureOperation::NewBody,
        target: None,
    };
    let head = execute_extrude(kb, profile, &spec).map_err(fail)?;
    kb.rename_body(head.body, params.name())
        .map_err(|e| GeometryError::new(Stage::Head, e))?;

    ctx.record(Stage::Head, &head);
    info!(body = %head.body, name = params.name(), "head extruded");
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn vertices_sit_on_the_circumscribed_circle() {
        let v = hexagon_vertices(Point2::new(0.0, 0.0), 0.75);
        for (i, p) in v.iter().enumerate() {
            assert_relative_eq!(p.x.hypot(p.y), 0.375, epsilon = 1e-12);
            let angle = p.y.atan2(p.x).rem_euclid(2.0 * PI);
            assert_relative_eq!(angle, i as f64 * PI / 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn curves_run_in_reverse_order() {
        let v = hexagon_vertices(Point2::new(0.0, 0.0), 1.0);
        let curves = hexagon_curves(Point2::new(0.0, 0.0), 1.0);
        assert_eq!(curves.len(), 6);
        assert_eq!(
            curves[0],
            SketchCurve::Line {
                start: v[1],
                end: v[0]
            }
        );
        assert_eq!(
            curves[5],
            SketchCurve::Line {
                start: v[0],
                end: v[5]
            }
        );
    }

    #[test]
    fn reverse_loop_is_clockwise() {
        let profile = bolt_types::SketchProfile::from_loop(
            ConstructionPlane::XY,
            hexagon_curves(Point2::new(0.0, 0.0), 0.75),
        );
        assert_eq!(profile.winding, bolt_types::Winding::Clockwise);
    }
}
