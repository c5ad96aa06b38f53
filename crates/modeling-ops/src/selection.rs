//! Edge and loop selection over face boundaries.

use bolt_kernel::{FaceLoop, KernelId, KernelIntrospect};

use crate::types::OpError;

/// Ordered, de-duplicated set of edges for one chamfer or fillet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeSelection {
    edges: Vec<KernelId>,
}

impl EdgeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every edge bounding `face`, across all of its loops.
    pub fn from_face(introspect: &dyn KernelIntrospect, face: KernelId) -> Self {
        let mut selection = Self::new();
        for edge in introspect.face_edges(face) {
            selection.add(edge);
        }
        selection
    }

    /// The edges of one boundary loop.
    pub fn from_loop(face_loop: &FaceLoop) -> Self {
        let mut selection = Self::new();
        for &edge in &face_loop.edges {
            selection.add(edge);
        }
        selection
    }

    /// Add an edge; returns false if it was already selected.
    pub fn add(&mut self, edge: KernelId) -> bool {
        if self.edges.contains(&edge) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn edges(&self) -> &[KernelId] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// First boundary loop of `face` matching the predicate.
pub fn find_loop(
    introspect: &dyn KernelIntrospect,
    face: KernelId,
    pred: impl Fn(&FaceLoop) -> bool,
) -> Option<FaceLoop> {
    introspect.face_loops(face).into_iter().find(|l| pred(l))
}

/// The loop of `face` made of exactly one edge.
pub fn single_edge_loop(
    introspect: &dyn KernelIntrospect,
    face: KernelId,
) -> Result<FaceLoop, OpError> {
    find_loop(introspect, face, |l| l.edges.len() == 1).ok_or_else(|| {
        let sizes: Vec<usize> = introspect
            .face_loops(face)
            .iter()
            .map(|l| l.edges.len())
            .collect();
        OpError::SelectionFailed {
            reason: format!(
                "{} has no single-edge boundary loop (loop sizes {:?})",
                face, sizes
            ),
        }
    })
}
