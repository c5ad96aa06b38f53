use std::time::Instant;

use bolt_kernel::{BodyHandle, KernelId, ThreadInfo};
use bolt_types::Role;
use tracing::debug;

use crate::kernel_ext::KernelBundle;
use crate::types::{Diagnostics, FeatureResult, OpError, Provenance};

/// Ask the kernel's thread tables for an external metric thread fitting a
/// shaft of `diameter`. `None` when the tables have no match.
pub fn recommend_metric_thread(kb: &mut dyn KernelBundle, diameter: f64) -> Option<ThreadInfo> {
    let thread_type = kb.default_metric_thread_type();
    let recommendation = kb.recommend_thread_data(diameter, false, &thread_type)?;
    Some(ThreadInfo {
        internal: false,
        thread_type,
        designation: recommendation.designation,
        class: recommendation.class,
    })
}

/// Apply a thread to one face of a body. The body's topology is unchanged;
/// the face gets the `ThreadedFace` role.
pub fn execute_thread(
    kb: &mut dyn KernelBundle,
    body: BodyHandle,
    face: KernelId,
    info: &ThreadInfo,
) -> Result<FeatureResult, OpError> {
    if info.designation.is_empty() {
        return Err(OpError::InvalidParameter {
            reason: "thread designation is empty".to_string(),
        });
    }
    let started = Instant::now();
    let output = kb.apply_thread(body, face, info)?;
    let kernel_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    debug!(feature = %output.feature, %face, designation = %info.designation, "thread");

    Ok(FeatureResult {
        feature: output.feature,
        body: output.body,
        provenance: Provenance {
            role_assignments: output
                .faces
                .iter()
                .map(|&f| (f, Role::ThreadedFace))
                .collect(),
            ..Provenance::default()
        },
        diagnostics: Diagnostics {
            warnings: Vec::new(),
            kernel_time_ms,
        },
    })
}
