use std::time::Instant;

use bolt_kernel::BodyHandle;
use bolt_types::Role;
use tracing::debug;

use crate::diff;
use crate::kernel_ext::KernelBundle;
use crate::selection::EdgeSelection;
use crate::types::{Diagnostics, FeatureResult, OpError, Provenance};

/// Execute a constant-radius fillet on every selected edge of a body.
///
/// With `tangent_chain` the kernel extends the selection along edges that
/// continue tangentially.
pub fn execute_fillet(
    kb: &mut dyn KernelBundle,
    body: BodyHandle,
    edges: &EdgeSelection,
    radius: f64,
    tangent_chain: bool,
) -> Result<FeatureResult, OpError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: "fillet radius must be positive".to_string(),
        });
    }
    if edges.is_empty() {
        return Err(OpError::SelectionFailed {
            reason: "no edges selected for fillet".to_string(),
        });
    }

    let before = kb.snapshot_body(body);
    let started = Instant::now();
    let output = kb.fillet(body, edges.edges(), radius, tangent_chain)?;
    let kernel_time_ms = started.elapsed().as_secs_f64() * 1000.0;
    let after = kb.snapshot_body(output.body);
    let diff_result = diff::diff(&before, &after);

    let role_assignments = output
        .faces
        .iter()
        .enumerate()
        .map(|(index, &face)| (face, Role::FilletFace { index }))
        .collect();

    debug!(feature = %output.feature, edges = edges.len(), radius, tangent_chain, "fillet");

    Ok(FeatureResult {
        feature: output.feature,
        body: output.body,
        provenance: Provenance {
            created: diff_result.created,
            deleted: diff_result.deleted,
            modified: diff_result.modified,
            role_assignments,
        },
        diagnostics: Diagnostics {
            warnings: Vec::new(),
            kernel_time_ms,
        },
    })
}
