use serde::{Deserialize, Serialize};

/// The kind of topological entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TopoKind {
    Edge,
    Face,
    Body,
}

/// Geometric signature of a face or edge, for logging and provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopoSignature {
    /// Surface type for faces (planar, cylindrical, conical, toroidal),
    /// curve type for edges (line, circle, intersection).
    pub surface_type: Option<String>,
    /// Surface area (faces).
    pub area: Option<f64>,
    /// Representative point on the entity [x, y, z].
    pub centroid: Option<[f64; 3]>,
    /// Outward normal (planar faces only).
    pub normal: Option<[f64; 3]>,
    /// Edge length (edges).
    pub length: Option<f64>,
    /// Number of boundary loops (faces).
    pub loop_count: Option<usize>,
}

impl TopoSignature {
    pub fn empty() -> Self {
        Self {
            surface_type: None,
            area: None,
            centroid: None,
            normal: None,
            length: None,
            loop_count: None,
        }
    }
}
