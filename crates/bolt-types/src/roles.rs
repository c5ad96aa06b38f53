use serde::{Deserialize, Serialize};

/// Semantic role assigned to faces by modeling operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Role {
    /// An extrude's start cap. Which cap this is depends on the profile winding.
    StartFace,
    /// An extrude's end cap. Which cap this is depends on the profile winding.
    EndFace,
    /// A lateral face created by sweeping one profile curve.
    SideFace { index: usize },
    /// A face created by a chamfer operation.
    ChamferFace { index: usize },
    /// A face created by a fillet operation.
    FilletFace { index: usize },
    /// A face left behind by a revolve cut.
    RevolveCutFace { index: usize },
    /// A face carrying a thread feature.
    ThreadedFace,
}
