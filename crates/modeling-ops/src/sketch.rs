use bolt_kernel::{ComponentId, ProfileId, SketchId};
use bolt_types::{ConstructionPlane, Point2, Point3, SketchCurve};
use tracing::debug;

use crate::kernel_ext::KernelBundle;
use crate::types::OpError;

/// A sketch and the closed profiles the kernel found in it.
#[derive(Debug, Clone)]
pub struct SketchResult {
    pub sketch: SketchId,
    /// Profiles in the order their first curve was drawn.
    pub profiles: Vec<ProfileId>,
}

/// Draw `curves` on a new sketch and extract its profiles.
///
/// Curves are issued to the kernel in slice order. A sketch without any
/// closed loop is an error.
pub fn execute_sketch(
    kb: &mut dyn KernelBundle,
    component: ComponentId,
    plane: ConstructionPlane,
    curves: &[SketchCurve],
) -> Result<SketchResult, OpError> {
    let sketch = kb.create_sketch(component, plane)?;
    for curve in curves {
        match *curve {
            SketchCurve::Line { start, end } => kb.add_line(sketch, start, end)?,
            SketchCurve::Circle { center, radius } => kb.add_circle(sketch, center, radius)?,
        }
    }
    let profiles = kb.profiles(sketch)?;
    if profiles.is_empty() {
        return Err(OpError::NoProfiles);
    }
    debug!(%sketch, curves = curves.len(), profiles = profiles.len(), "sketch ready");
    Ok(SketchResult { sketch, profiles })
}

/// Map a model-space point into the coordinates of a sketch on `plane`.
pub fn to_sketch_space(plane: ConstructionPlane, p: Point3) -> Point2 {
    plane.frame().to_plane(p)
}
