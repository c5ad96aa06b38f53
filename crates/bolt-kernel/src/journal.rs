//! JournalingKernel: records every call the pipeline makes into a kernel.
//!
//! The journal is the observable contract between the builder and the host:
//! two builds with equal parameters issue equal journals, whichever kernel
//! answers them.

use bolt_types::{ConstructionPlane, Point2};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;

/// One recorded kernel call, with the arguments it was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum KernelCall {
    CreateComponent {
        name: String,
    },
    CreateSketch {
        component: ComponentId,
        plane: ConstructionPlane,
    },
    AddLine {
        sketch: SketchId,
        start: Point2,
        end: Point2,
    },
    AddCircle {
        sketch: SketchId,
        center: Point2,
        radius: f64,
    },
    Profiles {
        sketch: SketchId,
    },
    Extrude {
        profile: ProfileId,
        spec: ExtrudeSpec,
    },
    Revolve {
        profile: ProfileId,
        spec: RevolveSpec,
    },
    Chamfer {
        body: BodyHandle,
        edges: Vec<KernelId>,
        distance: f64,
    },
    Fillet {
        body: BodyHandle,
        edges: Vec<KernelId>,
        radius: f64,
        tangent_chain: bool,
    },
    RenameBody {
        body: BodyHandle,
        name: String,
    },
    DefaultMetricThreadType,
    RecommendThreadData {
        diameter: f64,
        internal: bool,
        thread_type: String,
    },
    ApplyThread {
        body: BodyHandle,
        face: KernelId,
        info: ThreadInfo,
    },
}

impl KernelCall {
    /// Short name of the call, as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            KernelCall::CreateComponent { .. } => "create_component",
            KernelCall::CreateSketch { .. } => "create_sketch",
            KernelCall::AddLine { .. } => "add_line",
            KernelCall::AddCircle { .. } => "add_circle",
            KernelCall::Profiles { .. } => "profiles",
            KernelCall::Extrude { .. } => "extrude",
            KernelCall::Revolve { .. } => "revolve",
            KernelCall::Chamfer { .. } => "chamfer",
            KernelCall::Fillet { .. } => "fillet",
            KernelCall::RenameBody { .. } => "rename_body",
            KernelCall::DefaultMetricThreadType => "default_metric_thread_type",
            KernelCall::RecommendThreadData { .. } => "recommend_thread_data",
            KernelCall::ApplyThread { .. } => "apply_thread",
        }
    }
}

/// Wraps a kernel and appends each mutating call (and each thread query) to
/// a journal before delegating. Calls are recorded even when they fail.
pub struct JournalingKernel<K> {
    inner: K,
    journal: Vec<KernelCall>,
}

impl<K> JournalingKernel<K> {
    pub fn new(inner: K) -> Self {
        Self {
            inner,
            journal: Vec::new(),
        }
    }

    /// Calls recorded so far, in issue order.
    pub fn journal(&self) -> &[KernelCall] {
        &self.journal
    }

    pub fn inner(&self) -> &K {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut K {
        &mut self.inner
    }

    /// Split into the wrapped kernel and the journal.
    pub fn into_parts(self) -> (K, Vec<KernelCall>) {
        (self.inner, self.journal)
    }

    fn record(&mut self, call: KernelCall) {
        trace!(call = call.name(), index = self.journal.len(), "kernel call");
        self.journal.push(call);
    }
}

impl<K: Kernel> Kernel for JournalingKernel<K> {
    fn create_component(&mut self, name: &str) -> Result<ComponentId, KernelError> {
        self.record(KernelCall::CreateComponent {
            name: name.to_string(),
        });
        self.inner.create_component(name)
    }

    fn create_sketch(
        &mut self,
        component: ComponentId,
        plane: ConstructionPlane,
    ) -> Result<SketchId, KernelError> {
        self.record(KernelCall::CreateSketch { component, plane });
        self.inner.create_sketch(component, plane)
    }

    fn add_line(&mut self, sketch: SketchId, start: Point2, end: Point2) -> Result<(), KernelError> {
        self.record(KernelCall::AddLine { sketch, start, end });
        self.inner.add_line(sketch, start, end)
    }

    fn add_circle(
        &mut self,
        sketch: SketchId,
        center: Point2,
        radius: f64,
    ) -> Result<(), KernelError> {
        self.record(KernelCall::AddCircle {
            sketch,
            center,
            radius,
        });
        self.inner.add_circle(sketch, center, radius)
    }

    fn profiles(&mut self, sketch: SketchId) -> Result<Vec<ProfileId>, KernelError> {
        self.record(KernelCall::Profiles { sketch });
        self.inner.profiles(sketch)
    }

    fn extrude(
        &mut self,
        profile: ProfileId,
        spec: &ExtrudeSpec,
    ) -> Result<ExtrudeOutput, KernelError> {
        self.record(KernelCall::Extrude {
            profile,
            spec: *spec,
        });
        self.inner.extrude(profile, spec)
    }

    fn revolve(
        &mut self,
        profile: ProfileId,
        spec: &RevolveSpec,
    ) -> Result<FeatureOutput, KernelError> {
        self.record(KernelCall::Revolve {
            profile,
            spec: *spec,
        });
        self.inner.revolve(profile, spec)
    }

    fn chamfer(
        &mut self,
        body: BodyHandle,
        edges: &[KernelId],
        distance: f64,
    ) -> Result<FeatureOutput, KernelError> {
        self.record(KernelCall::Chamfer {
            body,
            edges: edges.to_vec(),
            distance,
        });
        self.inner.chamfer(body, edges, distance)
    }

    fn fillet(
        &mut self,
        body: BodyHandle,
        edges: &[KernelId],
        radius: f64,
        tangent_chain: bool,
    ) -> Result<FeatureOutput, KernelError> {
        self.record(KernelCall::Fillet {
            body,
            edges: edges.to_vec(),
            radius,
            tangent_chain,
        });
        self.inner.fillet(body, edges, radius, tangent_chain)
    }

    fn rename_body(&mut self, body: BodyHandle, name: &str) -> Result<(), KernelError> {
        self.record(KernelCall::RenameBody {
            body,
            name: name.to_string(),
        });
        self.inner.rename_body(body, name)
    }

    fn default_metric_thread_type(&mut self) -> String {
        self.record(KernelCall::DefaultMetricThreadType);
        self.inner.default_metric_thread_type()
    }

    fn recommend_thread_data(
        &mut self,
        diameter: f64,
        internal: bool,
        thread_type: &str,
    ) -> Option<ThreadRecommendation> {
        self.record(KernelCall::RecommendThreadData {
            diameter,
            internal,
            thread_type: thread_type.to_string(),
        });
        self.inner
            .recommend_thread_data(diameter, internal, thread_type)
    }

    fn apply_thread(
        &mut self,
        body: BodyHandle,
        face: KernelId,
        info: &ThreadInfo,
    ) -> Result<FeatureOutput, KernelError> {
        self.record(KernelCall::ApplyThread {
            body,
            face,
            info: info.clone(),
        });
        self.inner.apply_thread(body, face, info)
    }
}

impl<K: KernelIntrospect> KernelIntrospect for JournalingKernel<K> {
    fn profile(&self, profile: ProfileId) -> Option<SketchProfile> {
        self.inner.profile(profile)
    }

    fn body_name(&self, body: BodyHandle) -> Option<String> {
        self.inner.body_name(body)
    }

    fn body_faces(&self, body: BodyHandle) -> Vec<KernelId> {
        self.inner.body_faces(body)
    }

    fn body_edges(&self, body: BodyHandle) -> Vec<KernelId> {
        self.inner.body_edges(body)
    }

    fn face_loops(&self, face: KernelId) -> Vec<FaceLoop> {
        self.inner.face_loops(face)
    }

    fn edge_faces(&self, edge: KernelId) -> Vec<KernelId> {
        self.inner.edge_faces(edge)
    }

    fn edge_curve(&self, edge: KernelId) -> Option<EdgeCurve> {
        self.inner.edge_curve(edge)
    }

    fn face_surface(&self, face: KernelId) -> Option<FaceSurface> {
        self.inner.face_surface(face)
    }

    fn face_thread(&self, face: KernelId) -> Option<ThreadInfo> {
        self.inner.face_thread(face)
    }

    fn compute_signature(&self, entity: KernelId, kind: TopoKind) -> TopoSignature {
        self.inner.compute_signature(entity, kind)
    }
}
