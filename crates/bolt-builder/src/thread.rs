use bolt_kernel::BodyHandle;
use bolt_types::{Role, ThreadInfo};
use modeling_ops::{execute_thread, recommend_metric_thread, FeatureResult, KernelBundle, OpError};
use tracing::{info, instrument};

use crate::context::BuildContext;
use crate::error::{GeometryError, Stage};

/// Thread the shaft's lateral face with the kernel's recommended metric
/// thread for `diameter`.
///
/// Returns `Ok(None)` when the thread tables have no size for the shaft.
/// That is not an error: the bolt is complete without a thread.
#[instrument(skip(kb, ctx, shaft))]
pub fn thread_shaft(
    kb: &mut dyn KernelBundle,
    ctx: &mut BuildContext,
    body: BodyHandle,
    shaft: &FeatureResult,
    diameter: f64,
) -> Result<Option<ThreadInfo>, GeometryError> {
    let Some(info) = recommend_metric_thread(kb, diameter) else {
        info!(diameter, "no thread recommendation, skipping thread");
        return Ok(None);
    };
    let side = shaft
        .face_with_role(&Role::SideFace { index: 0 })
        .ok_or_else(|| {
            GeometryError::new(
                Stage::Thread,
                OpError::SelectionFailed {
                    reason: "shaft extrude reported no side face".to_string(),
                },
            )
        })?;
    let thread =
        execute_thread(kb, body, side, &info).map_err(|e| GeometryError::new(Stage::Thread, e))?;

    ctx.record(Stage::Thread, &thread);
    info!(%side, designation = %info.designation, class = %info.class, "shaft threaded");
    Ok(Some(info))
}
