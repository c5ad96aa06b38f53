use serde::{Deserialize, Serialize};

/// How a feature's result combines with existing bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeatureOperation {
    /// The feature creates a new body.
    NewBody,
    /// The feature's result is unioned into the target body.
    Join,
    /// The feature's result is subtracted from the target body.
    Cut,
}

/// Which side of the sketch plane an extrude runs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExtentDirection {
    /// Along the sketch plane normal.
    Positive,
    /// Against the sketch plane normal.
    Negative,
}

impl ExtentDirection {
    pub fn sign(&self) -> f64 {
        match self {
            ExtentDirection::Positive => 1.0,
            ExtentDirection::Negative => -1.0,
        }
    }
}

/// Thread description applied to a cylindrical face.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadInfo {
    /// `true` for a tapped hole, `false` for a bolt shank.
    pub internal: bool,
    /// Thread family, e.g. "ISO Metric profile".
    pub thread_type: String,
    /// Size designation, e.g. "M5x0.8".
    pub designation: String,
    /// Tolerance class, e.g. "6g".
    pub class: String,
}

/// A thread-data service answer for one diameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRecommendation {
    pub designation: String,
    pub class: String,
}
