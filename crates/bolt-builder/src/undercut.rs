//! Under-head chamfer: two triangles revolved around the bolt axis cut the
//! hexagon's corners at the top and bottom of the head.

use std::f64::consts::{FRAC_PI_6, TAU};

use bolt_kernel::{BodyHandle, RevolveSpec};
use bolt_types::{ConstructionAxis, ConstructionPlane, FeatureOperation, Point2, Point3, SketchCurve};
use modeling_ops::{
    execute_revolve, execute_sketch, to_sketch_space, FeatureResult, KernelBundle, OpError,
};
use tracing::{info, instrument};

use crate::context::BuildContext;
use crate::error::{GeometryError, Stage};
use crate::params::BoltParameters;

/// The two cutting triangles in XZ sketch coordinates (u = model x,
/// v = model z), each in drawing order.
///
/// Both span from the hexagon's apothem to its corner radius. The first
/// rises from the head's bottom face, the second hangs from its top face;
/// `cut_angle` sets the slope of their hypotenuses.
pub fn under_head_triangles(
    head_diameter: f64,
    head_height: f64,
    cut_angle: f64,
) -> [[Point2; 3]; 2] {
    let r = head_diameter / 2.0;
    let apothem = r * FRAC_PI_6.cos();
    let rise = (r - apothem) * cut_angle.tan();
    let to_sketch = |x: f64, z: f64| to_sketch_space(ConstructionPlane::XZ, Point3::new(x, 0.0, z));
    [
        [to_sketch(apothem, 0.0), to_sketch(r, 0.0), to_sketch(r, rise)],
        [
            to_sketch(apothem, head_height),
            to_sketch(r, head_height),
            to_sketch(r, head_height - rise),
        ],
    ]
}

fn triangle_curves(triangles: &[[Point2; 3]; 2]) -> Vec<SketchCurve> {
    triangles
        .iter()
        .flat_map(|t| {
            (0..3).map(move |i| SketchCurve::Line {
                start: t[i],
                end: t[(i + 1) % 3],
            })
        })
        .collect()
}

/// Sketch both triangles on XZ, then revolve the first profile and the
/// second as full-turn cuts around Z.
#[instrument(skip(kb, ctx, params), fields(cut_angle = params.cut_angle()))]
pub fn cut_under_head(
    kb: &mut dyn KernelBundle,
    ctx: &mut BuildContext,
    body: BodyHandle,
    params: &BoltParameters,
) -> Result<Vec<FeatureResult>, GeometryError> {
    let fail = |e| GeometryError::new(Stage::UnderHeadCut, e);
    let triangles =
        under_head_triangles(params.head_diameter(), params.head_height(), params.cut_angle());
    let sketch = execute_sketch(
        kb,
        ctx.component,
        ConstructionPlane::XZ,
        &triangle_curves(&triangles),
    )
    .map_err(fail)?;
    let [first, second] = sketch.profiles.as_slice() else {
        return Err(fail(OpError::InvalidParameter {
            reason: format!(
                "under-head sketch has {} profiles, expected 2",
                sketch.profiles.len()
            ),
        }));
    };

    let spec = RevolveSpec {
        axis: ConstructionAxis::Z,
        angle: TAU,
        operation: FeatureOperation::Cut,
        target: Some(body),
    };
    let mut cuts = Vec::with_capacity(2);
    for profile in [*first, *second] {
        let cut = execute_revolve(kb, profile, &spec).map_err(fail)?;
        ctx.record(Stage::UnderHeadCut, &cut);
        info!(%profile, faces = cut.provenance.role_assignments.len(), "under-head cut");
        cuts.push(cut);
    }
    Ok(cuts)
}
