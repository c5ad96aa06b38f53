use crate::types::*;
use bolt_types::{ConstructionPlane, Point2};

/// Core geometry kernel trait: every mutating call the bolt pipeline issues.
/// Implemented by MockKernel (deterministic double) and JournalingKernel
/// (call recorder around any other kernel).
pub trait Kernel {
    /// Create a new component under the document root.
    fn create_component(&mut self, name: &str) -> Result<ComponentId, KernelError>;

    /// Start an empty sketch on one of the component's construction planes.
    fn create_sketch(
        &mut self,
        component: ComponentId,
        plane: ConstructionPlane,
    ) -> Result<SketchId, KernelError>;

    /// Draw a line from `start` to `end`, in sketch coordinates.
    fn add_line(&mut self, sketch: SketchId, start: Point2, end: Point2) -> Result<(), KernelError>;

    /// Draw a circle, in sketch coordinates.
    fn add_circle(
        &mut self,
        sketch: SketchId,
        center: Point2,
        radius: f64,
    ) -> Result<(), KernelError>;

    /// Extract the closed profiles of a sketch, in the order their first
    /// curve was drawn.
    fn profiles(&mut self, sketch: SketchId) -> Result<Vec<ProfileId>, KernelError>;

    /// Extrude a profile by a distance.
    fn extrude(
        &mut self,
        profile: ProfileId,
        spec: &ExtrudeSpec,
    ) -> Result<ExtrudeOutput, KernelError>;

    /// Revolve a profile around a construction axis.
    fn revolve(
        &mut self,
        profile: ProfileId,
        spec: &RevolveSpec,
    ) -> Result<FeatureOutput, KernelError>;

    /// Equal-distance chamfer of all `edges` in one feature.
    fn chamfer(
        &mut self,
        body: BodyHandle,
        edges: &[KernelId],
        distance: f64,
    ) -> Result<FeatureOutput, KernelError>;

    /// Constant-radius fillet of all `edges` in one feature.
    fn fillet(
        &mut self,
        body: BodyHandle,
        edges: &[KernelId],
        radius: f64,
        tangent_chain: bool,
    ) -> Result<FeatureOutput, KernelError>;

    fn rename_body(&mut self, body: BodyHandle, name: &str) -> Result<(), KernelError>;

    /// The thread family the host uses for metric threads.
    fn default_metric_thread_type(&mut self) -> String;

    /// Recommended designation and class for a shaft (or hole) diameter.
    /// `None` when the thread tables have no match.
    fn recommend_thread_data(
        &mut self,
        diameter: f64,
        internal: bool,
        thread_type: &str,
    ) -> Option<ThreadRecommendation>;

    /// Apply a thread feature to a cylindrical face.
    fn apply_thread(
        &mut self,
        body: BodyHandle,
        face: KernelId,
        info: &ThreadInfo,
    ) -> Result<FeatureOutput, KernelError>;
}

/// Topology introspection trait. Read-only queries on kernel geometry.
pub trait KernelIntrospect {
    /// The region behind a profile id, if it exists.
    fn profile(&self, profile: ProfileId) -> Option<SketchProfile>;

    fn body_name(&self, body: BodyHandle) -> Option<String>;

    /// All faces of a body.
    fn body_faces(&self, body: BodyHandle) -> Vec<KernelId>;

    /// All edges of a body.
    fn body_edges(&self, body: BodyHandle) -> Vec<KernelId>;

    /// Boundary loops of a face, outer loop first.
    fn face_loops(&self, face: KernelId) -> Vec<FaceLoop>;

    /// Every edge bounding a face, across all its loops.
    fn face_edges(&self, face: KernelId) -> Vec<KernelId> {
        self.face_loops(face)
            .into_iter()
            .flat_map(|l| l.edges)
            .collect()
    }

    /// Faces adjacent to an edge.
    fn edge_faces(&self, edge: KernelId) -> Vec<KernelId>;

    fn edge_curve(&self, edge: KernelId) -> Option<EdgeCurve>;

    fn face_surface(&self, face: KernelId) -> Option<FaceSurface>;

    /// Thread applied to a face, if any.
    fn face_thread(&self, face: KernelId) -> Option<ThreadInfo>;

    /// Compute the geometric signature of a single entity.
    fn compute_signature(&self, entity: KernelId, kind: TopoKind) -> TopoSignature;
}
