use serde::{Deserialize, Serialize};
use std::fmt;

use bolt_types::{
    ConstructionAxis, ExtentDirection, FeatureOperation, Point3, Vector3,
};

// Re-export shared types from bolt-types
pub use bolt_types::{SketchProfile, ThreadInfo, ThreadRecommendation, TopoKind, TopoSignature};

/// Transient kernel-internal identifier of a face or edge.
/// Stable for the lifetime of one kernel session; faces and edges keep
/// their id when later features trim them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KernelId(pub u64);

/// Handle to a solid body in the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyHandle(pub(crate) u64);

/// Handle to a component (the container owning sketches and bodies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SketchId(pub(crate) u64);

/// A closed region extracted from a sketch, usable by exactly one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub(crate) u64);

/// Identifier of a feature in the component's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub(crate) u64);

macro_rules! display_id {
    ($($ty:ident => $label:literal),* $(,)?) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " #{}"), self.0)
            }
        })*
    };
}

display_id!(
    KernelId => "entity",
    BodyHandle => "body",
    ComponentId => "component",
    SketchId => "sketch",
    ProfileId => "profile",
    FeatureId => "feature",
);

/// Geometry of an edge, in model space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EdgeCurve {
    Line {
        start: Point3,
        end: Point3,
    },
    Circle {
        center: Point3,
        axis: Vector3,
        radius: f64,
    },
    /// Closed curve where a cut surface meets the body; carried without an
    /// analytic form.
    Intersection {
        anchor: Point3,
        length: f64,
    },
}

impl EdgeCurve {
    pub fn kind_name(&self) -> &'static str {
        match self {
            EdgeCurve::Line { .. } => "line",
            EdgeCurve::Circle { .. } => "circle",
            EdgeCurve::Intersection { .. } => "intersection",
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            EdgeCurve::Line { start, end } => start.distance_to(end),
            EdgeCurve::Circle { radius, .. } => std::f64::consts::TAU * radius,
            EdgeCurve::Intersection { length, .. } => *length,
        }
    }

    /// A point representative of the edge's location.
    pub fn anchor(&self) -> Point3 {
        match self {
            EdgeCurve::Line { start, end } => {
                Point3::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0, (start.z + end.z) / 2.0)
            }
            EdgeCurve::Circle { center, .. } => *center,
            EdgeCurve::Intersection { anchor, .. } => *anchor,
        }
    }
}

/// Geometry of a face's underlying surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FaceSurface {
    Planar { origin: Point3, normal: Vector3 },
    Cylindrical { origin: Point3, axis: Vector3, radius: f64 },
    Conical { origin: Point3, axis: Vector3 },
    Toroidal { center: Point3, axis: Vector3, minor_radius: f64 },
}

impl FaceSurface {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FaceSurface::Planar { .. } => "planar",
            FaceSurface::Cylindrical { .. } => "cylindrical",
            FaceSurface::Conical { .. } => "conical",
            FaceSurface::Toroidal { .. } => "toroidal",
        }
    }
}

/// One boundary loop of a face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLoop {
    /// Ordered edges of the loop.
    pub edges: Vec<KernelId>,
    /// The outer boundary of the face, as opposed to a hole.
    pub is_outer: bool,
}

/// Parameters of an extrude feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrudeSpec {
    pub distance: f64,
    pub direction: ExtentDirection,
    pub operation: FeatureOperation,
    /// Body to join to or cut from. Ignored for `NewBody`.
    pub target: Option<BodyHandle>,
}

/// Parameters of a revolve feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevolveSpec {
    pub axis: ConstructionAxis,
    /// Sweep angle in radians.
    pub angle: f64,
    pub operation: FeatureOperation,
    pub target: Option<BodyHandle>,
}

/// Faces produced by an extrude, split the way the host reports them.
/// Caps consumed by a join are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudeOutput {
    pub feature: FeatureId,
    pub body: BodyHandle,
    pub start_faces: Vec<KernelId>,
    pub end_faces: Vec<KernelId>,
    pub side_faces: Vec<KernelId>,
}

/// Faces produced or touched by a revolve, chamfer, fillet or thread feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureOutput {
    pub feature: FeatureId,
    pub body: BodyHandle,
    pub faces: Vec<KernelId>,
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("entity not found: {id}")]
    EntityNotFound { id: KernelId },

    #[error("{kind} #{id} not found")]
    UnknownHandle { kind: &'static str, id: u64 },

    #[error("degenerate profile: {reason}")]
    DegenerateProfile { reason: String },

    #[error("{profile} was already consumed by another feature")]
    ProfileConsumed { profile: ProfileId },

    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("chamfer failed: {reason}")]
    ChamferFailed { reason: String },

    #[error("fillet failed: {reason}")]
    FilletFailed { reason: String },

    #[error("revolve failed: {reason}")]
    RevolveFailed { reason: String },

    #[error("thread failed: {reason}")]
    ThreadFailed { reason: String },

    #[error("component creation failed: {reason}")]
    ComponentFailed { reason: String },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}
