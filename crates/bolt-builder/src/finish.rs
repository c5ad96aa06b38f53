//! Edge finishing: chamfer on the shaft tip, fillet under the head.

use bolt_kernel::BodyHandle;
use bolt_types::Role;
use modeling_ops::{
    execute_chamfer, execute_fillet, single_edge_loop, EdgeSelection, FeatureResult,
    KernelBundle, OpError,
};
use tracing::{info, instrument};

use crate::context::BuildContext;
use crate::error::{GeometryError, Stage};

/// Chamfer every edge bounding the shaft's end face in one feature.
#[instrument(skip(kb, ctx, shaft))]
pub fn chamfer_shaft_tip(
    kb: &mut dyn KernelBundle,
    ctx: &mut BuildContext,
    body: BodyHandle,
    shaft: &FeatureResult,
    distance: f64,
) -> Result<FeatureResult, GeometryError> {
    let fail = |e| GeometryError::new(Stage::Chamfer, e);
    let tip = shaft
        .face_with_role(&Role::EndFace)
        .ok_or_else(|| {
            fail(OpError::SelectionFailed {
                reason: "shaft extrude reported no end face".to_string(),
            })
        })?;
    let edges = EdgeSelection::from_face(kb.as_introspect(), tip);
    let chamfer = execute_chamfer(kb, body, &edges, distance).map_err(fail)?;

    ctx.record(Stage::Chamfer, &chamfer);
    info!(%tip, edges = edges.len(), distance, "shaft tip chamfered");
    Ok(chamfer)
}

/// Fillet the head-to-shaft junction: the single-edge loop the shaft join
/// left on the head's end face.
#[instrument(skip(kb, ctx, head))]
pub fn fillet_head_junction(
    kb: &mut dyn KernelBundle,
    ctx: &mut BuildContext,
    body: BodyHandle,
    head: &FeatureResult,
    radius: f64,
) -> Result<FeatureResult, GeometryError> {
    let fail = |e| GeometryError::new(Stage::Fillet, e);
    let face = head
        .face_with_role(&Role::EndFace)
        .ok_or_else(|| {
            fail(OpError::SelectionFailed {
                reason: "head extrude reported no end face".to_string(),
            })
        })?;
    let junction = single_edge_loop(kb.as_introspect(), face).map_err(fail)?;
    let edges = EdgeSelection::from_loop(&junction);
    let fillet = execute_fillet(kb, body, &edges, radius, true).map_err(fail)?;

    ctx.record(Stage::Fillet, &fillet);
    info!(%face, radius, "head junction filleted");
    Ok(fillet)
}
