use bolt_kernel::{BodyHandle, FeatureId, KernelError, KernelId};
use bolt_types::{Role, TopoKind, TopoSignature};

/// Complete result of a modeling operation.
/// Contains everything the bolt builder needs to locate the faces a later
/// stage works on.
#[derive(Debug, Clone)]
pub struct FeatureResult {
    /// The feature the kernel added to the timeline.
    pub feature: FeatureId,
    /// The body the feature created or modified.
    pub body: BodyHandle,
    /// Provenance: what entities were created, deleted, and modified.
    pub provenance: Provenance,
    /// Non-fatal warnings and timing information.
    pub diagnostics: Diagnostics,
}

impl FeatureResult {
    /// First face assigned `role`.
    pub fn face_with_role(&self, role: &Role) -> Option<KernelId> {
        self.provenance
            .role_assignments
            .iter()
            .find(|(_, r)| r == role)
            .map(|(id, _)| *id)
    }

    /// All faces whose role matches the predicate, in assignment order.
    pub fn faces_where(&self, pred: impl Fn(&Role) -> bool) -> Vec<KernelId> {
        self.provenance
            .role_assignments
            .iter()
            .filter(|(_, r)| pred(r))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Number of entities of `kind` the feature created.
    pub fn created_count(&self, kind: TopoKind) -> usize {
        self.provenance
            .created
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }
}

/// Provenance tracking: what happened to topology during an operation.
#[derive(Debug, Clone, Default)]
pub struct Provenance {
    /// Entities that exist in the result but not in the input.
    pub created: Vec<EntityRecord>,
    /// Entities that existed in the input but not in the result.
    pub deleted: Vec<EntityRecord>,
    /// Entities that kept their id but changed shape.
    pub modified: Vec<Rewrite>,
    /// Semantic role assignments for created/surviving entities.
    pub role_assignments: Vec<(KernelId, Role)>,
}

/// Record of a topological entity with its kernel ID and signature.
#[derive(Debug, Clone)]
pub struct EntityRecord {
    pub kernel_id: KernelId,
    pub kind: TopoKind,
    /// Geometric signature at the time of the snapshot.
    pub signature: TopoSignature,
}

/// Record of a topological entity that was modified by an operation.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub entity: KernelId,
    pub kind: TopoKind,
    pub reason: RewriteReason,
}

/// Why a topological entity was modified during an operation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum RewriteReason {
    /// Face gained or lost boundary, e.g. a hole from a join or a trimmed
    /// edge from a chamfer.
    Trimmed,
    /// Entity kept its boundary but its geometry moved.
    Moved,
}

/// Non-fatal diagnostics from an operation.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    /// Time taken for the kernel operation, in milliseconds.
    pub kernel_time_ms: f64,
}

/// Errors from modeling operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OpError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("no profiles available for operation")]
    NoProfiles,

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("selection failed: {reason}")]
    SelectionFailed { reason: String },
}
