use std::time::Instant;

use bolt_kernel::BodyHandle;
use bolt_types::Role;
use tracing::debug;

use crate::diff;
use crate::kernel_ext::KernelBundle;
use crate::selection::EdgeSelection;
use crate::types::{Diagnostics, FeatureResult, OpError, Provenance};

/// Execute an equal-distance chamfer on every selected edge of a body.
pub fn execute_chamfer(
    kb: &mut dyn KernelBundle,
    body: BodyHandle,
    edges: &EdgeSelection,
    distance: f64,
) -> Result<FeatureResult, OpError> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: "chamfer distance must be positive".to_string(),
        });
    }
    if edges.is_empty() {
        return Err(OpError::SelectionFailed {
            reason: "no edges selected for chamfer".to_string(),
        });
    }

    let before = kb.snapshot_body(body);
    let started = Instant::now();
    let output = kb.chamfer(body, edges.edges(), distance)?;
    let kernel_time_ms = started.elapsed().as_secs_f64() * 1000.0;
    let after = kb.snapshot_body(output.body);
    let diff_result = diff::diff(&before, &after);

    // New faces created by chamfer get ChamferFace roles.
    let role_assignments = output
        .faces
        .iter()
        .enumerate()
        .map(|(index, &face)| (face, Role::ChamferFace { index }))
        .collect();

    debug!(feature = %output.feature, edges = edges.len(), distance, "chamfer");

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
