use std::time::Instant;

use bolt_kernel::{ProfileId, RevolveSpec};
use bolt_types::{FeatureOperation, Role};
use tracing::debug;

use crate::diff::{self, TopoSnapshot};
use crate::kernel_ext::KernelBundle;
use crate::types::{Diagnostics, FeatureResult, OpError, Provenance};

/// Execute a revolve operation.
///
/// A cut assigns `RevolveCutFace` roles to the faces it leaves on the
/// target; a new body assigns `SideFace` roles to every face it creates.
pub fn execute_revolve(
    kb: &mut dyn KernelBundle,
    profile: ProfileId,
    spec: &RevolveSpec,
) -> Result<FeatureResult, OpError> {
    if !spec.angle.is_finite() || spec.angle <= 0.0 {
        return Err(OpError::InvalidParameter {
            reason: format!("revolve angle must be positive, got {}", spec.angle),
        });
    }
    if spec.operation != FeatureOperation::NewBody && spec.target.is_none() {
        return Err(OpError::InvalidParameter {
            reason: "revolve cut or join needs a target body".to_string(),
        });
    }
    let before = match spec.target {
        Some(target) if spec.operation != FeatureOperation::NewBody => {
            kb.snapshot_body(target)
        }
        _ => TopoSnapshot::default(),
    };

    let started = Instant::now();
    let output = kb.revolve(profile, spec)?;
    let kernel_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    let after = kb.snapshot_body(output.body);
    let diff_result = diff::diff(&before, &after);

    let role_assignments = output
        .faces
        .iter()
        .enumerate()
        .map(|(index, &face)| match spec.operation {
            FeatureOperation::Cut => (face, Role::RevolveCutFace { index }),
            _ => (face, Role::SideFace { index }),
        })
        .collect();

    debug!(
        feature = %output.feature,
        faces = output.faces.len(),
        "revolve"
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
            warnings: Vec::new(),
            kernel_time_ms,
        },
    })
}
