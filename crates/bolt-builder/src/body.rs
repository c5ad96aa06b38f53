//! Cylindrical shaft joined under the head.

use bolt_kernel::{BodyHandle, ExtrudeSpec};
use bolt_types::{ConstructionPlane, ExtentDirection, FeatureOperation, Point3, SketchCurve};
use modeling_ops::{
    execute_extrude, execute_sketch, to_sketch_space, FeatureResult, KernelBundle, OpError,
};
use tracing::{info, instrument};

use crate::context::BuildContext;
use crate::error::{GeometryError, Stage};
use crate::params::BoltParameters;

/// Draw the shaft circle on the head's sketch plane and extrude it away
/// from the head, joined to `body`.
///
/// A circle wider than the hexagon flats still joins; the head face keeps
/// only the part outside the shaft.
#[instrument(skip(kb, ctx, params), fields(body_diameter = params.body_diameter()))]
pub fn build_body(
    kb: &mut dyn KernelBundle,
    ctx: &mut BuildContext,
    body: BodyHandle,
    params: &BoltParameters,
) -> Result<FeatureResult, GeometryError> {
    let fail = |e| GeometryError::new(Stage::Body, e);
    let circle = SketchCurve::Circle {
        center: to_sketch_space(ConstructionPlane::XY, Point3::ORIGIN),
        radius: params.body_diameter() / 2.0,
    };
    let sketch = execute_sketch(kb, ctx.component, ConstructionPlane::XY, &[circle]).map_err(fail)?;
    let profile = sketch
        .profiles
        .first()
        .copied()
        .ok_or_else(|| fail(OpError::NoProfiles))?;

    let spec = ExtrudeSpec {
        distance: params.body_length(),
        direction: ExtentDirection::Negative,
        operation: FeatureOperation::Join,
        target: Some(body),
    };
    let shaft = execute_extrude(kb, profile, &spec).map_err(fail)?;

    ctx.record(Stage::Body, &shaft);
    info!(
        body = %shaft.body,
        length = params.body_length(),
        faces = kb.face_count(shaft.body),
        "shaft joined"
    );
    Ok(shaft)
}
