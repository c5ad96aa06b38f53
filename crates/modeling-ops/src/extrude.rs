use std::time::Instant;

use bolt_kernel::{ExtrudeSpec, ProfileId};
use bolt_types::{FeatureOperation, Role};
use tracing::debug;

use crate::diff::{self, TopoSnapshot};
use crate::kernel_ext::KernelBundle;
use crate::types::{Diagnostics, FeatureResult, OpError, Provenance};

/// Execute an extrude operation.
///
/// Extrudes a sketch profile as a new body or joins it to `spec.target`,
/// and returns a FeatureResult with full provenance tracking. The kernel's
/// start, end and side faces are reported as `StartFace`, `EndFace` and
/// `SideFace` roles; caps a join merged away get no role.
pub fn execute_extrude(
    kb: &mut dyn KernelBundle,
    profile: ProfileId,
    spec: &ExtrudeSpec,
) -> Result<FeatureResult, OpError> {
    if !spec.distance.is_finite() || spec.distance <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: format!("extrude distance must be positive, got {}", spec.distance),
        });
    }
    let before = match (spec.operation, spec.target) {
        (FeatureOperation::NewBody, _) | (_, None) => TopoSnapshot::default(),
        (_, Some(target)) => kb.snapshot_body(target),
    };

    let started = Instant::now();
    let output = kb.extrude(profile, spec)?;
    let kernel_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    let after = kb.snapshot_body(output.body);
    let diff_result = diff::diff(&before, &after);

    let mut role_assignments = Vec::new();
    role_assignments.extend(output.start_faces.iter().map(|&f| (f, Role::StartFace)));
    role_assignments.extend(output.end_faces.iter().map(|&f| (f, Role::EndFace)));
    role_assignments.extend(
        output
            .side_faces
            .iter()
            .enumerate()
            .map(|(index, &f)| (f, Role::SideFace { index })),
    );

    let mut warnings = Vec::new();
    if spec.operation == FeatureOperation::Join && output.start_faces.is_empty() {
        warnings.push("start cap merged into the target body".to_string());
    }
    debug!(
        feature = %output.feature,
        created = diff_result.created.len(),
        modified = diff_result.modified.len(),
        "extrude"
    );

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
            warnings,
            kernel_time_ms,
        },
    })
}
