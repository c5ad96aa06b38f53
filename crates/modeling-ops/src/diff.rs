use std::collections::HashMap;

use bolt_kernel::{BodyHandle, KernelId, KernelIntrospect};
use bolt_types::{TopoKind, TopoSignature};

use crate::types::{EntityRecord, Rewrite, RewriteReason};

/// Signatures this close are treated as the same geometry.
const UNCHANGED_SIMILARITY: f64 = 0.999;

/// A snapshot of the topology of a body at a point in time.
#[derive(Debug, Clone, Default)]
pub struct TopoSnapshot {
    pub faces: Vec<(KernelId, TopoSignature)>,
    pub edges: Vec<(KernelId, TopoSignature)>,
}

/// Take a topology snapshot of a body for diffing.
pub fn snapshot(introspect: &dyn KernelIntrospect, body: BodyHandle) -> TopoSnapshot {
    let sign = |ids: Vec<KernelId>, kind| {
        ids.into_iter()
            .map(|id| (id, introspect.compute_signature(id, kind)))
            .collect()
    };
    TopoSnapshot {
        faces: sign(introspect.body_faces(body), TopoKind::Face),
        edges: sign(introspect.body_edges(body), TopoKind::Edge),
    }
}

/// Result of diffing two topology snapshots.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Entities present in `after` but not in `before`.
    pub created: Vec<EntityRecord>,
    /// Entities present in `before` but not in `after`.
    pub deleted: Vec<EntityRecord>,
    /// Entities present in both whose signature changed.
    pub modified: Vec<Rewrite>,
    /// Ids present in both snapshots.
    pub survived: Vec<KernelId>,
}

/// Diff two topology snapshots. Kernel ids are stable across features, so
/// entities correspond by id; signatures only classify what changed.
/// For a feature that creates a body, pass `TopoSnapshot::default()` as `before`.
pub fn diff(before: &TopoSnapshot, after: &TopoSnapshot) -> DiffResult {
    let mut result = DiffResult::default();
    diff_kind(&before.faces, &after.faces, TopoKind::Face, &mut result);
    diff_kind(&before.edges, &after.edges, TopoKind::Edge, &mut result);
    result
}

fn diff_kind(
    before: &[(KernelId, TopoSignature)],
    after: &[(KernelId, TopoSignature)],
    kind: TopoKind,
    result: &mut DiffResult,
) {
    let before_map: HashMap<KernelId, &TopoSignature> =
        before.iter().map(|(id, sig)| (*id, sig)).collect();
    let after_map: HashMap<KernelId, &TopoSignature> =
        after.iter().map(|(id, sig)| (*id, sig)).collect();

    for (id, sig) in after {
        match before_map.get(id) {
            None => result.created.push(EntityRecord {
                kernel_id: *id,
                kind,
                signature: sig.clone(),
            }),
            Some(old) => {
                result.survived.push(*id);
                if signature_similarity(old, sig) < UNCHANGED_SIMILARITY {
                    let reason = if old.loop_count != sig.loop_count || old.area != sig.area {
                        RewriteReason::Trimmed
                    } else {
                        RewriteReason::Moved
                    };
                    result.modified.push(Rewrite {
                        entity: *id,
                        kind,
                        reason,
                    });
                }
            }
        }
    }

    for (id, sig) in before {
        if !after_map.contains_key(id) {
            result.deleted.push(EntityRecord {
                kernel_id: *id,
                kind,
                signature: sig.clone(),
            });
        }
    }
}

/// Compute similarity between two topology signatures (0.0 to 1.0).
/// Higher means more similar.
pub fn signature_similarity(a: &TopoSignature, b: &TopoSignature) -> f64 {
    let mut score = 0.0;
    let mut weight = 0.0;

    // Surface type match (high weight)
    if let (Some(st_a), Some(st_b)) = (&a.surface_type, &b.surface_type) {
        weight += 3.0;
        if st_a == st_b {
            score += 3.0;
        }
    }

    if let (Some(area_a), Some(area_b)) = (a.area, b.area) {
        weight += 2.0;
        score += 2.0 * relative_closeness(area_a, area_b);
    }

    if let (Some(c_a), Some(c_b)) = (a.centroid, b.centroid) {
        weight += 2.0;
        let dist =
            ((c_a[0] - c_b[0]).powi(2) + (c_a[1] - c_b[1]).powi(2) + (c_a[2] - c_b[2]).powi(2))
                .sqrt();
        score += 2.0 * (1.0 - (dist / 10.0).min(1.0));
    }

    if let (Some(n_a), Some(n_b)) = (a.normal, b.normal) {
        weight += 2.0;
        let dot = n_a[0] * n_b[0] + n_a[1] * n_b[1] + n_a[2] * n_b[2];
        score += 2.0 * ((dot + 1.0) / 2.0).max(0.0);
    }

    if let (Some(len_a), Some(len_b)) = (a.length, b.length) {
        weight += 2.0;
        score += 2.0 * relative_closeness(len_a, len_b);
    }

    if let (Some(l_a), Some(l_b)) = (a.loop_count, b.loop_count) {
        weight += 1.0;
        if l_a == l_b {
            score += 1.0;
        }
    }

    if weight > 0.0 {
        score / weight
    } else {
        0.0
    }
}

fn relative_closeness(a: f64, b: f64) -> f64 {
    let max = a.abs().max(b.abs());
    if max > 1e-12 {
        1.0 - ((a - b).abs() / max).min(1.0)
    } else {
        1.0
    }
}
