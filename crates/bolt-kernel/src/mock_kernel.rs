//! MockKernel: deterministic kernel double implementing Kernel + KernelIntrospect.
//!
//! Tracks synthetic B-rep topology: faces with boundary loops and edges with
//! analytic curves. Alongside the topology each body keeps the prisms it was
//! built from and its revolve cuts, which answers point-membership questions
//! for cut features.
//! Used by modeling-ops and bolt-builder for unit testing and by the CLI.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::{PI, TAU};

use bolt_types::{
    ConstructionPlane, FeatureOperation, PlaneFrame, Point2, Point3, SketchCurve, Vector3, Winding,
};
use tracing::debug;

use crate::thread_data::{MetricThreadTable, ThreadDataQuery};
use crate::traits::{Kernel, KernelIntrospect};
use crate::types::*;
use crate::Tolerance;

/// Angular resolution used when sampling solids of revolution.
const ANGULAR_SAMPLES: usize = 360;

/// Points sampled on a circle's boundary when testing containment.
const CIRCLE_SAMPLES: usize = 64;

/// Evenly spaced stations sampled along each edge of a revolve-cut section.
const EDGE_STATIONS: usize = 8;

/// Halvings toward each end of a section edge beyond the even stations.
const EDGE_REFINEMENTS: usize = 24;

/// Grid cells per side when measuring how much of a join cap lands on a face.
const OVERLAP_GRID: usize = 64;

#[derive(Debug, Clone)]
struct MockEdge {
    id: KernelId,
    curve: EdgeCurve,
}

#[derive(Debug, Clone)]
struct MockFace {
    id: KernelId,
    surface: FaceSurface,
    loops: Vec<FaceLoop>,
    area: f64,
    anchor: Point3,
    /// Region of a planar cap, in its own frame.
    outline: Option<(PlaneFrame, SketchProfile)>,
    thread: Option<ThreadInfo>,
}

impl MockFace {
    fn has_edge(&self, edge: KernelId) -> bool {
        self.loops.iter().any(|l| l.edges.contains(&edge))
    }
}

/// A profile swept between two heights along its plane normal.
#[derive(Debug, Clone)]
struct Prism {
    frame: PlaneFrame,
    profile: SketchProfile,
    low: f64,
    high: f64,
}

impl Prism {
    fn contains(&self, p: Point3, tol: f64) -> bool {
        let h = self.frame.height_of(p);
        h >= self.low - tol
            && h <= self.high + tol
            && self.profile.contains(self.frame.to_plane(p), tol)
    }

    /// Interior points used to decide whether a cut leaves anything behind.
    fn interior_samples(&self) -> Vec<Point3> {
        let mid = (self.low + self.high) / 2.0;
        let lift = |p: Point2| self.frame.to_model(p) + self.frame.normal * mid;
        let centroid = self.profile.centroid();
        let mut samples = vec![lift(centroid)];
        if let Some((center, radius)) = self.profile.as_circle() {
            for k in 0..6 {
                let t = TAU * k as f64 / 6.0;
                samples.push(lift(Point2::new(
                    center.x + radius / 2.0 * t.cos(),
                    center.y + radius / 2.0 * t.sin(),
                )));
            }
        } else {
            for v in self.profile.vertices() {
                samples.push(lift(centroid.midpoint(&v)));
            }
        }
        samples
    }
}

/// A full revolution of a section given in (radius, axial) coordinates.
#[derive(Debug, Clone)]
struct Revolution {
    origin: Point3,
    axis: Vector3,
    section: SketchProfile,
}

impl Revolution {
    fn contains(&self, p: Point3, tol: f64) -> bool {
        self.section
            .contains(radial_coords(self.origin, self.axis, p), tol)
    }
}

#[derive(Debug, Clone)]
struct MockBody {
    component: ComponentId,
    name: String,
    faces: Vec<MockFace>,
    edges: Vec<MockEdge>,
    /// Swept material, joined.
    solids: Vec<Prism>,
    cuts: Vec<Revolution>,
}

impl MockBody {
    fn is_material(&self, p: Point3, tol: f64) -> bool {
        self.solids.iter().any(|s| s.contains(p, tol))
            && !self.cuts.iter().any(|c| c.contains(p, tol))
    }

    fn edge(&self, id: KernelId) -> Option<&MockEdge> {
        self.edges.iter().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone)]
struct MockSketch {
    component: ComponentId,
    plane: ConstructionPlane,
    curves: Vec<SketchCurve>,
}

#[derive(Debug, Clone)]
struct MockProfile {
    component: ComponentId,
    profile: SketchProfile,
    consumed: bool,
}

/// Topology of a freshly swept prism, before it is merged into a body.
struct PrismTopology {
    faces: Vec<MockFace>,
    edges: Vec<MockEdge>,
    sketch_cap: KernelId,
    far_cap: KernelId,
    sides: Vec<KernelId>,
}

/// A tool cap absorbed into a coplanar face of the join target.
struct JoinMerge {
    cap: KernelId,
    face: KernelId,
    /// Face area the cap covers.
    overlap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Containment {
    Inside,
    Disjoint,
    Crossing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinishKind {
    Chamfer,
    Fillet,
}

impl FinishKind {
    fn name(&self) -> &'static str {
        match self {
            FinishKind::Chamfer => "chamfer",
            FinishKind::Fillet => "fillet",
        }
    }

    fn error(&self, reason: String) -> KernelError {
        match self {
            FinishKind::Chamfer => KernelError::ChamferFailed { reason },
            FinishKind::Fillet => KernelError::FilletFailed { reason },
        }
    }
}

/// One edge replacement planned by a chamfer or fillet.
struct FinishPlan {
    edge: KernelId,
    faces: [KernelId; 2],
    new_circles: [(Point3, f64); 2],
    center: Point3,
    axis: Vector3,
    radius: f64,
}

/// Deterministic test double for the geometry kernel.
/// Implements both Kernel and KernelIntrospect.
pub struct MockKernel {
    next_id: u64,
    tolerance: Tolerance,
    components: BTreeMap<u64, String>,
    sketches: HashMap<u64, MockSketch>,
    profiles: HashMap<u64, MockProfile>,
    bodies: BTreeMap<u64, MockBody>,
    thread_data: Box<dyn ThreadDataQuery>,
    reject_components: bool,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            tolerance: Tolerance::default(),
            components: BTreeMap::new(),
            sketches: HashMap::new(),
            profiles: HashMap::new(),
            bodies: BTreeMap::new(),
            thread_data: Box::new(MetricThreadTable::new()),
            reject_components: false,
        }
    }

    /// Replace the thread tables the kernel answers thread queries from.
    pub fn with_thread_data(mut self, thread_data: Box<dyn ThreadDataQuery>) -> Self {
        self.thread_data = thread_data;
        self
    }

    /// Make every later `create_component` fail, as a host with a read-only
    /// document would.
    pub fn set_reject_components(&mut self, reject: bool) {
        self.reject_components = reject;
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// All bodies in creation order.
    pub fn bodies(&self) -> Vec<BodyHandle> {
        self.bodies.keys().map(|&k| BodyHandle(k)).collect()
    }

    pub fn component_name(&self, component: ComponentId) -> Option<&str> {
        self.components.get(&component.0).map(String::as_str)
    }

    fn alloc_raw(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn alloc_id(&mut self) -> KernelId {
        KernelId(self.alloc_raw())
    }

    fn body(&self, body: BodyHandle) -> Result<&MockBody, KernelError> {
        self.bodies.get(&body.0).ok_or(KernelError::UnknownHandle {
            kind: "body",
            id: body.0,
        })
    }

    fn find_face(&self, face: KernelId) -> Option<&MockFace> {
        self.bodies
            .values()
            .flat_map(|b| b.faces.iter())
            .find(|f| f.id == face)
    }

    fn find_edge(&self, edge: KernelId) -> Option<&MockEdge> {
        self.bodies
            .values()
            .flat_map(|b| b.edges.iter())
            .find(|e| e.id == edge)
    }

    /// Look up a profile that has not been consumed yet.
    fn available_profile(&self, profile: ProfileId) -> Result<&MockProfile, KernelError> {
        let entry = self
            .profiles
            .get(&profile.0)
            .ok_or(KernelError::UnknownHandle {
                kind: "profile",
                id: profile.0,
            })?;
        if entry.consumed {
            return Err(KernelError::ProfileConsumed { profile });
        }
        Ok(entry)
    }

    fn consume_profile(&mut self, profile: ProfileId) {
        if let Some(entry) = self.profiles.get_mut(&profile.0) {
            entry.consumed = true;
        }
    }

    fn next_body_name(&self, component: ComponentId) -> String {
        let count = self
            .bodies
            .values()
            .filter(|b| b.component == component)
            .count();
        format!("Body{}", count + 1)
    }

    /// Sweep a profile from its sketch plane to height `far` along the plane normal.
    fn build_prism(&mut self, profile: &SketchProfile, far: f64) -> PrismTopology {
        let frame = profile.plane.frame();
        let n = frame.normal;
        let lift = move |p: Point2, h: f64| frame.to_model(p) + n * h;
        let sketch_cap_normal = n * -far.signum();
        let far_cap_normal = n * far.signum();
        let far_frame = PlaneFrame {
            origin: frame.origin + n * far,
            ..frame
        };
        let sketch_cap_id = self.alloc_id();
        let far_cap_id = self.alloc_id();

        let mut edges = Vec::new();
        let mut faces = Vec::new();
        let mut sides = Vec::new();
        let sketch_loop;
        let far_loop;

        if let Some((center, radius)) = profile.as_circle() {
            let bottom = MockEdge {
                id: self.alloc_id(),
                curve: EdgeCurve::Circle {
                    center: lift(center, 0.0),
                    axis: n,
                    radius,
                },
            };
            let top = MockEdge {
                id: self.alloc_id(),
                curve: EdgeCurve::Circle {
                    center: lift(center, far),
                    axis: n,
                    radius,
                },
            };
            let side_id = self.alloc_id();
            faces.push(MockFace {
                id: side_id,
                surface: FaceSurface::Cylindrical {
                    origin: lift(center, 0.0),
                    axis: n,
                    radius,
                },
                loops: vec![
                    FaceLoop {
                        edges: vec![bottom.id],
                        is_outer: true,
                    },
                    FaceLoop {
                        edges: vec![top.id],
                        is_outer: false,
                    },
                ],
                area: TAU * radius * far.abs(),
                anchor: lift(Point2::new(center.x + radius, center.y), far / 2.0),
                outline: None,
                thread: None,
            });
            sides.push(side_id);
            sketch_loop = vec![bottom.id];
            far_loop = vec![top.id];
            edges.push(bottom);
            edges.push(top);
        } else {
            let pts = profile.vertices();
            let count = pts.len();
            let bottom: Vec<KernelId> = (0..count).map(|_| self.alloc_id()).collect();
            let top: Vec<KernelId> = (0..count).map(|_| self.alloc_id()).collect();
            let vertical: Vec<KernelId> = (0..count).map(|_| self.alloc_id()).collect();
            for i in 0..count {
                let j = (i + 1) % count;
                edges.push(MockEdge {
                    id: bottom[i],
                    curve: EdgeCurve::Line {
                        start: lift(pts[i], 0.0),
                        end: lift(pts[j], 0.0),
                    },
                });
                edges.push(MockEdge {
                    id: top[i],
                    curve: EdgeCurve::Line {
                        start: lift(pts[i], far),
                        end: lift(pts[j], far),
                    },
                });
                edges.push(MockEdge {
                    id: vertical[i],
                    curve: EdgeCurve::Line {
                        start: lift(pts[i], 0.0),
                        end: lift(pts[i], far),
                    },
                });
            }
            for i in 0..count {
                let j = (i + 1) % count;
                let (dx, dy) = (pts[j].x - pts[i].x, pts[j].y - pts[i].y);
                let len = (dx * dx + dy * dy).sqrt();
                let outward = match profile.winding {
                    Winding::CounterClockwise => Point2::new(dy / len, -dx / len),
                    Winding::Clockwise => Point2::new(-dy / len, dx / len),
                };
                let side_id = self.alloc_id();
                faces.push(MockFace {
                    id: side_id,
                    surface: FaceSurface::Planar {
                        origin: lift(pts[i], 0.0),
                        normal: frame.x_axis * outward.x + frame.y_axis * outward.y,
                    },
                    loops: vec![FaceLoop {
                        edges: vec![bottom[i], vertical[j], top[i], vertical[i]],
                        is_outer: true,
                    }],
                    area: len * far.abs(),
                    anchor: lift(pts[i].midpoint(&pts[j]), far / 2.0),
                    outline: None,
                    thread: None,
                });
                sides.push(side_id);
            }
            sketch_loop = bottom;
            far_loop = top;
        }

        let centroid = profile.centroid();
        faces.insert(
            0,
            MockFace {
                id: far_cap_id,
                surface: FaceSurface::Planar {
                    origin: lift(centroid, far),
                    normal: far_cap_normal,
                },
                loops: vec![FaceLoop {
                    edges: far_loop,
                    is_outer: true,
                }],
                area: profile.area(),
                anchor: lift(centroid, far),
                outline: Some((far_frame, profile.clone())),
                thread: None,
            },
        );
        faces.insert(
            0,
            MockFace {
                id: sketch_cap_id,
                surface: FaceSurface::Planar {
                    origin: lift(centroid, 0.0),
                    normal: sketch_cap_normal,
                },
                loops: vec![FaceLoop {
                    edges: sketch_loop,
                    is_outer: true,
                }],
                area: profile.area(),
                anchor: lift(centroid, 0.0),
                outline: Some((frame, profile.clone())),
                thread: None,
            },
        );

        PrismTopology {
            faces,
            edges,
            sketch_cap: sketch_cap_id,
            far_cap: far_cap_id,
            sides,
        }
    }

    /// Decide which caps of a tool prism merge into coplanar faces of the
    /// target body.
    ///
    /// A cap inside the face becomes a hole in it. A cap crossing the face
    /// boundary still merges; the face keeps its outline and loses the
    /// overlapping area.
    fn plan_join(&self, target: &MockBody, tool: &PrismTopology) -> Vec<JoinMerge> {
        let tol = self.tolerance.coincidence;
        let mut merges = Vec::new();
        for cap_id in [tool.sketch_cap, tool.far_cap] {
            let Some(cap) = tool.faces.iter().find(|f| f.id == cap_id) else {
                continue;
            };
            let (Some((cap_frame, cap_profile)), FaceSurface::Planar { normal: cap_normal, .. }) =
                (&cap.outline, cap.surface)
            else {
                continue;
            };
            for face in &target.faces {
                let (Some((face_frame, face_profile)), FaceSurface::Planar { normal, .. }) =
                    (&face.outline, face.surface)
                else {
                    continue;
                };
                let opposed = normal.dot(&cap_normal) < -1.0 + self.tolerance.angular.max(1e-9);
                let coplanar = face_frame.height_of(cap_frame.origin).abs() <= tol;
                if !(opposed && coplanar) {
                    continue;
                }
                let overlap =
                    match containment(face_frame, face_profile, cap_frame, cap_profile, tol) {
                        Containment::Inside => cap.area,
                        Containment::Disjoint => continue,
                        Containment::Crossing => {
                            let overlap =
                                overlap_area(face_frame, face_profile, cap_frame, cap_profile);
                            debug!(
                                cap = cap_id.0,
                                face = face.id.0,
                                overlap,
                                "cap crosses face boundary"
                            );
                            overlap
                        }
                    };
                merges.push(JoinMerge {
                    cap: cap_id,
                    face: face.id,
                    overlap,
                });
            }
        }
        merges
    }

    /// Validate a chamfer or fillet and compute the replacement circles.
    fn plan_finish(
        &self,
        body: &MockBody,
        edges: &[KernelId],
        amount: f64,
        kind: FinishKind,
    ) -> Result<Vec<FinishPlan>, KernelError> {
        let tol = self.tolerance.coincidence;
        if !amount.is_finite() || amount <= tol {
            return Err(kind.error(format!("{} size must be positive, got {}", kind.name(), amount)));
        }
        if edges.is_empty() {
            return Err(kind.error("no edges selected".to_string()));
        }
        let mut plans = Vec::new();
        for &edge_id in edges {
            let edge = body
                .edge(edge_id)
                .ok_or(KernelError::EntityNotFound { id: edge_id })?;
            let EdgeCurve::Circle {
                center,
                axis,
                radius,
            } = edge.curve
            else {
                return Err(KernelError::NotSupported {
                    operation: format!("{} of {} edges", kind.name(), edge.curve.kind_name()),
                });
            };
            let adjacent: Vec<&MockFace> =
                body.faces.iter().filter(|f| f.has_edge(edge_id)).collect();
            let [first, second] = adjacent.as_slice() else {
                return Err(kind.error(format!(
                    "{} bounds {} faces, expected 2",
                    edge_id,
                    adjacent.len()
                )));
            };
            let mut new_circles = [(center, radius); 2];
            for (slot, face) in [first, second].into_iter().enumerate() {
                let room = face_clearance(body, face, edge_id, center, axis, radius);
                if amount >= room - tol {
                    return Err(kind.error(format!(
                        "{} {} does not fit on {} next to {} (room {:.5})",
                        kind.name(),
                        amount,
                        face.id,
                        edge_id,
                        room
                    )));
                }
                new_circles[slot] = offset_into_face(body, face, edge_id, center, axis, radius, amount);
            }
            plans.push(FinishPlan {
                edge: edge_id,
                faces: [first.id, second.id],
                new_circles,
                center,
                axis,
                radius,
            });
        }
        Ok(plans)
    }

    fn finish_edges(
        &mut self,
        body_handle: BodyHandle,
        edges: &[KernelId],
        amount: f64,
        kind: FinishKind,
    ) -> Result<FeatureOutput, KernelError> {
        let mut unique = edges.to_vec();
        unique.sort();
        unique.dedup();
        let plans = self.plan_finish(self.body(body_handle)?, &unique, amount, kind)?;

        let mut created = Vec::new();
        for plan in plans {
            let new_edges: [KernelId; 2] = [self.alloc_id(), self.alloc_id()];
            let face_id = self.alloc_id();
            let [(c1, r1), (c2, r2)] = plan.new_circles;
            let slant = ((r1 - r2).powi(2) + (c1 - c2).length().powi(2)).sqrt();
            let (surface, area) = match kind {
                FinishKind::Chamfer => (
                    FaceSurface::Conical {
                        origin: plan.center,
                        axis: plan.axis,
                    },
                    PI * (r1 + r2) * slant,
                ),
                FinishKind::Fillet => (
                    FaceSurface::Toroidal {
                        center: plan.center,
                        axis: plan.axis,
                        minor_radius: amount,
                    },
                    PI / 2.0 * amount * TAU * plan.radius,
                ),
            };
            let anchor = plan.center + any_perpendicular(plan.axis) * plan.radius;

            let Some(body) = self.bodies.get_mut(&body_handle.0) else {
                break;
            };
            body.edges.retain(|e| e.id != plan.edge);
            for (slot, (center, radius)) in plan.new_circles.into_iter().enumerate() {
                body.edges.push(MockEdge {
                    id: new_edges[slot],
                    curve: EdgeCurve::Circle {
                        center,
                        axis: plan.axis,
                        radius,
                    },
                });
            }
            for face in body.faces.iter_mut() {
                let Some(slot) = plan.faces.iter().position(|&f| f == face.id) else {
                    continue;
                };
                for lp in face.loops.iter_mut() {
                    for e in lp.edges.iter_mut() {
                        if *e == plan.edge {
                            *e = new_edges[slot];
                        }
                    }
                }
            }
            body.faces.push(MockFace {
                id: face_id,
                surface,
                loops: vec![
                    FaceLoop {
                        edges: vec![new_edges[0]],
                        is_outer: true,
                    },
                    FaceLoop {
                        edges: vec![new_edges[1]],
                        is_outer: false,
                    },
                ],
                area,
                anchor,
                outline: None,
                thread: None,
            });
            created.push(face_id);
            debug!(edge = plan.edge.0, face = face_id.0, kind = kind.name(), "replaced edge");
        }

        Ok(FeatureOutput {
            feature: FeatureId(self.alloc_raw()),
            body: body_handle,
            faces: created,
        })
    }

    /// Map a profile into the (radius, axial) half-plane of a revolve axis,
    /// rejecting axes outside the sketch plane and profiles crossing the axis.
    fn revolve_section(
        &self,
        profile: &SketchProfile,
        origin: Point3,
        axis: Vector3,
    ) -> Result<(SketchProfile, Vector3), KernelError> {
        let tol = self.tolerance.coincidence;
        let frame = profile.plane.frame();
        if axis.dot(&frame.normal).abs() > self.tolerance.angular.max(1e-9)
            || frame.height_of(origin).abs() > tol
        {
            return Err(KernelError::RevolveFailed {
                reason: "revolve axis does not lie in the sketch plane".to_string(),
            });
        }
        let boundary: Vec<Point2> = match profile.as_circle() {
            Some((center, radius)) => (0..CIRCLE_SAMPLES)
                .map(|k| {
                    let t = TAU * k as f64 / CIRCLE_SAMPLES as f64;
                    Point2::new(center.x + radius * t.cos(), center.y + radius * t.sin())
                })
                .collect(),
            None => profile.vertices(),
        };
        let across = frame.normal.cross(&axis);
        let sides: Vec<f64> = boundary
            .iter()
            .map(|p| (frame.to_model(*p) - origin).dot(&across))
            .collect();
        let positive = sides.iter().any(|s| *s > tol);
        let negative = sides.iter().any(|s| *s < -tol);
        if positive && negative {
            return Err(KernelError::RevolveFailed {
                reason: "profile crosses the revolve axis".to_string(),
            });
        }
        let e1 = if negative { -across } else { across };
        let section_pts: Vec<Point2> = boundary
            .iter()
            .map(|p| radial_coords(origin, axis, frame.to_model(*p)))
            .collect();
        let curves = (0..section_pts.len())
            .map(|i| SketchCurve::Line {
                start: section_pts[i],
                end: section_pts[(i + 1) % section_pts.len()],
            })
            .collect();
        Ok((SketchProfile::from_loop(ConstructionPlane::XY, curves), e1))
    }

    /// Faces a full-revolution cut leaves behind: one per contiguous angular
    /// run of material bounded by each section edge.
    ///
    /// Each edge is sampled at stations along its length. A station counts at
    /// an angle when its point on the cut surface lies in the body and there
    /// is material just outside the section.
    fn plan_revolve_cut(
        &self,
        body: &MockBody,
        section: &SketchProfile,
        origin: Point3,
        axis: Vector3,
        e1: Vector3,
    ) -> Result<Vec<CutPatch>, KernelError> {
        let tol = self.tolerance.coincidence;
        let e2 = axis.cross(&e1);
        let at = |p: Point2, theta: f64| {
            origin + axis * p.y + (e1 * theta.cos() + e2 * theta.sin()) * p.x
        };
        let thetas: Vec<f64> = (0..ANGULAR_SAMPLES)
            .map(|k| TAU * k as f64 / ANGULAR_SAMPLES as f64)
            .collect();

        let pts = section.vertices();
        let eps = (shortest_edge(&pts) * 1e-3).max(10.0 * tol);
        let remaining: Vec<Point3> = body
            .solids
            .iter()
            .flat_map(Prism::interior_samples)
            .filter(|p| body.is_material(*p, tol))
            .collect();
        let tool = Revolution {
            origin,
            axis,
            section: section.clone(),
        };
        let intersects = remaining.iter().any(|p| tool.contains(*p, tol))
            || section_interior(section, eps)
                .iter()
                .any(|p| thetas.iter().any(|&t| body.is_material(at(*p, t), tol)));
        if !intersects {
            return Err(KernelError::BooleanFailed {
                reason: "revolve cut does not intersect the target body".to_string(),
            });
        }
        if remaining.iter().all(|p| tool.contains(*p, tol)) {
            return Err(KernelError::BooleanFailed {
                reason: "revolve cut removes the entire body".to_string(),
            });
        }

        let mut patches = Vec::new();
        for i in 0..pts.len() {
            let (a, b) = (pts[i], pts[(i + 1) % pts.len()]);
            let len = a.distance_to(&b);
            if len <= tol {
                continue;
            }
            let normal = outward_normal(section, a, b);
            let mut flags = vec![false; ANGULAR_SAMPLES];
            for d in edge_stations(len, 4.0 * eps) {
                let on_edge = along(a, b, d / len);
                let outside = offset(on_edge, normal, eps);
                if outside.x <= 0.0 {
                    continue;
                }
                for (flag, &t) in flags.iter_mut().zip(&thetas) {
                    if !*flag {
                        *flag = body.is_material(at(outside, t), tol)
                            && body.is_material(at(on_edge, t), 0.0);
                    }
                }
            }
            let mid = a.midpoint(&b);
            for (start, run) in angular_runs(&flags) {
                let fraction = run as f64 / ANGULAR_SAMPLES as f64;
                let theta_mid = TAU * (start as f64 + run as f64 / 2.0) / ANGULAR_SAMPLES as f64;
                let surface = if (a.x - b.x).abs() <= tol {
                    FaceSurface::Cylindrical {
                        origin: origin + axis * mid.y,
                        axis,
                        radius: mid.x,
                    }
                } else if (a.y - b.y).abs() <= tol {
                    FaceSurface::Planar {
                        origin: origin + axis * mid.y,
                        normal: axis * -normal.y.signum(),
                    }
                } else {
                    FaceSurface::Conical {
                        origin: origin + axis * mid.y,
                        axis,
                    }
                };
                patches.push(CutPatch {
                    surface,
                    area: PI * (a.x + b.x) * len * fraction,
                    anchor: at(mid, theta_mid),
                    boundary_length: 2.0 * len + TAU * mid.x * fraction * 2.0,
                });
            }
        }
        Ok(patches)
    }
}

/// A face left behind by a revolve cut.
struct CutPatch {
    surface: FaceSurface,
    area: f64,
    anchor: Point3,
    boundary_length: f64,
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// (radius, axial) coordinates of a point relative to an axis.
fn radial_coords(origin: Point3, axis: Vector3, p: Point3) -> Point2 {
    let d = p - origin;
    let a = d.dot(&axis);
    Point2::new((d - axis * a).length(), a)
}

/// A unit vector orthogonal to `n`.
fn any_perpendicular(n: Vector3) -> Vector3 {
    let up = if n.x.abs() < 0.9 { Vector3::X } else { Vector3::Y };
    up.cross(&n).normalized().unwrap_or(Vector3::Y)
}

fn shortest_edge(pts: &[Point2]) -> f64 {
    (0..pts.len())
        .map(|i| pts[i].distance_to(&pts[(i + 1) % pts.len()]))
        .fold(f64::INFINITY, f64::min)
}

/// Point at fraction `t` of the way from `a` to `b`.
fn along(a: Point2, b: Point2, t: f64) -> Point2 {
    Point2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

fn offset(p: Point2, direction: Point2, distance: f64) -> Point2 {
    Point2::new(p.x + direction.x * distance, p.y + direction.y * distance)
}

/// Unit normal of the polygon edge `a -> b` pointing away from the region.
fn outward_normal(profile: &SketchProfile, a: Point2, b: Point2) -> Point2 {
    let len = a.distance_to(&b);
    let (dx, dy) = ((b.x - a.x) / len, (b.y - a.y) / len);
    match profile.winding {
        Winding::CounterClockwise => Point2::new(dy, -dx),
        Winding::Clockwise => Point2::new(-dy, dx),
    }
}

/// Distances along an edge of length `len` to sample: evenly spaced, then
/// halving toward both ends until `floor`.
fn edge_stations(len: f64, floor: f64) -> Vec<f64> {
    let mut stations: Vec<f64> = (1..EDGE_STATIONS)
        .map(|k| len * k as f64 / EDGE_STATIONS as f64)
        .collect();
    let mut d = len / (2 * EDGE_STATIONS) as f64;
    for _ in 0..EDGE_REFINEMENTS {
        if d < floor {
            break;
        }
        stations.push(d);
        stations.push(len - d);
        d /= 2.0;
    }
    stations
}

/// Points strictly inside a polygonal section: its centroid, points pulled
/// from each vertex toward the centroid and points just inside every edge.
/// Thin sections put most of their area near the edges.
fn section_interior(section: &SketchProfile, eps: f64) -> Vec<Point2> {
    let pts = section.vertices();
    let centroid = section.centroid();
    let mut samples = vec![centroid];
    for v in &pts {
        for f in [0.5, 1e-1, 1e-2, 1e-3] {
            samples.push(along(*v, centroid, f));
        }
    }
    for i in 0..pts.len() {
        let (a, b) = (pts[i], pts[(i + 1) % pts.len()]);
        let len = a.distance_to(&b);
        if len <= eps {
            continue;
        }
        let inward = outward_normal(section, a, b);
        let inward = Point2::new(-inward.x, -inward.y);
        for d in edge_stations(len, 4.0 * eps) {
            let reach = eps.min(d * 1e-3);
            samples.push(offset(along(a, b, d / len), inward, reach));
        }
    }
    samples.retain(|p| section.contains(*p, 0.0) && section.boundary_distance(*p) > 0.0);
    samples
}

/// Axis-aligned bounds of a profile in its own plane.
fn profile_bounds(profile: &SketchProfile) -> (Point2, Point2) {
    if let Some((center, radius)) = profile.as_circle() {
        return (
            Point2::new(center.x - radius, center.y - radius),
            Point2::new(center.x + radius, center.y + radius),
        );
    }
    let (mut min, mut max) = (Point2::new(f64::MAX, f64::MAX), Point2::new(f64::MIN, f64::MIN));
    for p in profile.vertices() {
        min = Point2::new(min.x.min(p.x), min.y.min(p.y));
        max = Point2::new(max.x.max(p.x), max.y.max(p.y));
    }
    (min, max)
}

/// Area of a tool cap that lands on a coplanar target face, counted on a
/// grid over the cap.
fn overlap_area(
    face_frame: &PlaneFrame,
    face_profile: &SketchProfile,
    cap_frame: &PlaneFrame,
    cap_profile: &SketchProfile,
) -> f64 {
    let (min, max) = profile_bounds(cap_profile);
    let (w, h) = (
        (max.x - min.x) / OVERLAP_GRID as f64,
        (max.y - min.y) / OVERLAP_GRID as f64,
    );
    let mut hits = 0usize;
    for i in 0..OVERLAP_GRID {
        for j in 0..OVERLAP_GRID {
            let p = Point2::new(min.x + w * (i as f64 + 0.5), min.y + h * (j as f64 + 0.5));
            let on_face = face_frame.to_plane(cap_frame.to_model(p));
            if cap_profile.contains(p, 0.0) && face_profile.contains(on_face, 0.0) {
                hits += 1;
            }
        }
    }
    hits as f64 * w * h
}

/// Contiguous runs of `true` in a circular sequence, as (start, length).
fn angular_runs(flags: &[bool]) -> Vec<(usize, usize)> {
    let n = flags.len();
    if n == 0 || flags.iter().all(|f| !f) {
        return Vec::new();
    }
    if flags.iter().all(|f| *f) {
        return vec![(0, n)];
    }
    let first_gap = flags.iter().position(|f| !f).unwrap_or(0);
    let mut runs = Vec::new();
    let mut current: Option<(usize, usize)> = None;
    for step in 1..=n {
        let idx = (first_gap + step) % n;
        match (flags[idx], current.as_mut()) {
            (true, Some((_, len))) => *len += 1,
            (true, None) => current = Some((idx, 1)),
            (false, Some(_)) => runs.extend(current.take()),
            (false, None) => {}
        }
    }
    runs.extend(current);
    runs
}

/// Where a tool cap sits relative to a coplanar target face.
fn containment(
    face_frame: &PlaneFrame,
    face_profile: &SketchProfile,
    cap_frame: &PlaneFrame,
    cap_profile: &SketchProfile,
    tol: f64,
) -> Containment {
    let boundary: Vec<Point2> = match cap_profile.as_circle() {
        Some((center, radius)) => (0..CIRCLE_SAMPLES)
            .map(|k| {
                let t = TAU * k as f64 / CIRCLE_SAMPLES as f64;
                Point2::new(center.x + radius * t.cos(), center.y + radius * t.sin())
            })
            .collect(),
        None => {
            let pts = cap_profile.vertices();
            let mids: Vec<Point2> = (0..pts.len())
                .map(|i| pts[i].midpoint(&pts[(i + 1) % pts.len()]))
                .collect();
            pts.into_iter().chain(mids).collect()
        }
    };
    let in_face: Vec<Point2> = boundary
        .iter()
        .map(|p| face_frame.to_plane(cap_frame.to_model(*p)))
        .collect();
    let strictly_inside = |p: &Point2| {
        face_profile.contains(*p, 0.0) && face_profile.boundary_distance(*p) > tol
    };
    let inside = in_face.iter().filter(|p| strictly_inside(p)).count();
    if inside == in_face.len() {
        return Containment::Inside;
    }
    let touching = in_face.iter().any(|p| face_profile.contains(*p, tol));
    let face_centroid = cap_frame.to_plane(face_frame.to_model(face_profile.centroid()));
    if inside == 0 && !touching && !cap_profile.contains(face_centroid, tol) {
        Containment::Disjoint
    } else {
        Containment::Crossing
    }
}

/// Room available on `face` next to a circular edge before a chamfer or
/// fillet runs into the face's other boundaries.
fn face_clearance(
    body: &MockBody,
    face: &MockFace,
    edge: KernelId,
    center: Point3,
    axis: Vector3,
    radius: f64,
) -> f64 {
    let others: Vec<EdgeCurve> = face
        .loops
        .iter()
        .flat_map(|l| l.edges.iter())
        .filter(|&&e| e != edge)
        .filter_map(|&e| body.edge(e).map(|m| m.curve))
        .collect();
    let room = others
        .iter()
        .filter_map(|curve| match (face.surface, curve) {
            (FaceSurface::Planar { .. }, EdgeCurve::Circle { center: c2, radius: r2, .. }) => {
                Some((radius - r2).abs() + center.distance_to(c2))
            }
            (FaceSurface::Planar { .. }, EdgeCurve::Line { start, end }) => {
                Some((distance_to_segment_3d(center, *start, *end) - radius).abs())
            }
            (FaceSurface::Cylindrical { .. }, EdgeCurve::Circle { center: c2, .. }) => {
                Some((*c2 - center).dot(&axis).abs())
            }
            (_, EdgeCurve::Circle { center: c2, radius: r2, .. }) => {
                let axial = (*c2 - center).dot(&axis);
                Some(((radius - r2).powi(2) + axial.powi(2)).sqrt())
            }
            _ => None,
        })
        .fold(f64::INFINITY, f64::min);
    match face.surface {
        FaceSurface::Planar { .. } if others.is_empty() => radius,
        _ => room,
    }
}

/// The circle a chamfer or fillet boundary lands on when a circular edge is
/// pushed `amount` into `face`.
fn offset_into_face(
    body: &MockBody,
    face: &MockFace,
    edge: KernelId,
    center: Point3,
    axis: Vector3,
    radius: f64,
    amount: f64,
) -> (Point3, f64) {
    match face.surface {
        FaceSurface::Planar { .. } => {
            let outer = face
                .loops
                .iter()
                .find(|l| l.edges.contains(&edge))
                .map(|l| l.is_outer)
                .unwrap_or(true);
            if outer {
                (center, radius - amount)
            } else {
                (center, radius + amount)
            }
        }
        _ => {
            let toward = face
                .loops
                .iter()
                .flat_map(|l| l.edges.iter())
                .filter(|&&e| e != edge)
                .filter_map(|&e| match body.edge(e).map(|m| m.curve) {
                    Some(EdgeCurve::Circle { center: c2, .. }) => Some((c2 - center).dot(&axis)),
                    _ => None,
                })
                .min_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(std::cmp::Ordering::Equal))
                .unwrap_or(1.0);
            (center + axis * (amount * toward.signum()), radius)
        }
    }
}

fn distance_to_segment_3d(p: Point3, a: Point3, b: Point3) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(&ab);
    if len_sq < 1e-24 {
        return p.distance_to(&a);
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&(a + ab * t))
}

/// Chain lines drawn end to start (or, failing that, end to end) into closed
/// loops. Circles are loops on their own. Returns loops ordered by their first
/// curve, each with the index of that curve.
fn extract_loops(curves: &[SketchCurve], tol: f64) -> Vec<(usize, Vec<SketchCurve>)> {
    let mut used = vec![false; curves.len()];
    let mut loops = Vec::new();
    for (i, curve) in curves.iter().enumerate() {
        if used[i] {
            continue;
        }
        let SketchCurve::Line { start, end } = *curve else {
            used[i] = true;
            loops.push((i, vec![*curve]));
            continue;
        };
        let mut chain = vec![*curve];
        let mut members = vec![i];
        let mut cursor = end;
        let closed = loop {
            if cursor.distance_to(&start) <= tol {
                break true;
            }
            let candidate = |forward: bool| {
                curves.iter().enumerate().find_map(|(j, c)| {
                    if used[j] || members.contains(&j) {
                        return None;
                    }
                    match *c {
                        SketchCurve::Line { start: s, end: e } if forward && s.distance_to(&cursor) <= tol => {
                            Some((j, s, e))
                        }
                        SketchCurve::Line { start: s, end: e } if !forward && e.distance_to(&cursor) <= tol => {
                            Some((j, e, s))
                        }
                        _ => None,
                    }
                })
            };
            let Some((j, s, e)) = candidate(true).or_else(|| candidate(false)) else {
                break false;
            };
            chain.push(SketchCurve::Line { start: s, end: e });
            members.push(j);
            cursor = e;
        };
        if closed {
            for j in members {
                used[j] = true;
            }
            loops.push((i, chain));
        }
    }
    loops
}

impl Kernel for MockKernel {
    fn create_component(&mut self, name: &str) -> Result<ComponentId, KernelError> {
        if self.reject_components {
            return Err(KernelError::ComponentFailed {
                reason: "document does not accept new components".to_string(),
            });
        }
        let id = ComponentId(self.alloc_raw());
        self.components.insert(id.0, name.to_string());
        Ok(id)
    }

    fn create_sketch(
        &mut self,
        component: ComponentId,
        plane: ConstructionPlane,
    ) -> Result<SketchId, KernelError> {
        if !self.components.contains_key(&component.0) {
            return Err(KernelError::UnknownHandle {
                kind: "component",
                id: component.0,
            });
        }
        let id = SketchId(self.alloc_raw());
        self.sketches.insert(
            id.0,
            MockSketch {
                component,
                plane,
                curves: Vec::new(),
            },
        );
        Ok(id)
    }

    fn add_line(&mut self, sketch: SketchId, start: Point2, end: Point2) -> Result<(), KernelError> {
        if self.tolerance.is_zero_length(start.distance_to(&end)) {
            return Err(KernelError::DegenerateProfile {
                reason: format!("zero-length line at ({}, {})", start.x, start.y),
            });
        }
        let entry = self
            .sketches
            .get_mut(&sketch.0)
            .ok_or(KernelError::UnknownHandle {
                kind: "sketch",
                id: sketch.0,
            })?;
        entry.curves.push(SketchCurve::Line { start, end });
        Ok(())
    }

    fn add_circle(
        &mut self,
        sketch: SketchId,
        center: Point2,
        radius: f64,
    ) -> Result<(), KernelError> {
        if !radius.is_finite() || self.tolerance.is_zero_length(radius) || radius < 0.0 {
            return Err(KernelError::DegenerateProfile {
                reason: format!("circle radius must be positive, got {}", radius),
            });
        }
        let entry = self
            .sketches
            .get_mut(&sketch.0)
            .ok_or(KernelError::UnknownHandle {
                kind: "sketch",
                id: sketch.0,
            })?;
        entry.curves.push(SketchCurve::Circle { center, radius });
        Ok(())
    }

    fn profiles(&mut self, sketch: SketchId) -> Result<Vec<ProfileId>, KernelError> {
        let entry = self
            .sketches
            .get(&sketch.0)
            .ok_or(KernelError::UnknownHandle {
                kind: "sketch",
                id: sketch.0,
            })?
            .clone();
        let mut extracted = Vec::new();
        for (_, curves) in extract_loops(&entry.curves, self.tolerance.coincidence) {
            let profile = SketchProfile::from_loop(entry.plane, curves);
            if self.tolerance.is_zero_area(profile.area()) {
                return Err(KernelError::DegenerateProfile {
                    reason: format!("closed loop in {} encloses no area", sketch),
                });
            }
            extracted.push(profile);
        }
        let mut ids = Vec::new();
        for profile in extracted {
            let id = ProfileId(self.alloc_raw());
            self.profiles.insert(
                id.0,
                MockProfile {
                    component: entry.component,
                    profile,
                    consumed: false,
                },
            );
            ids.push(id);
        }
        Ok(ids)
    }

    fn extrude(
        &mut self,
        profile_id: ProfileId,
        spec: &ExtrudeSpec,
    ) -> Result<ExtrudeOutput, KernelError> {
        if !spec.distance.is_finite() || spec.distance <= self.tolerance.coincidence {
            return Err(KernelError::Other {
                message: format!("extrude distance must be positive, got {}", spec.distance),
            });
        }
        if spec.operation == FeatureOperation::Cut {
            return Err(KernelError::NotSupported {
                operation: "extrude cut".to_string(),
            });
        }
        let entry = self.available_profile(profile_id)?.clone();
        let target = match spec.operation {
            FeatureOperation::Join => {
                let target = spec.target.ok_or_else(|| KernelError::Other {
                    message: "join extrude needs a target body".to_string(),
                })?;
                self.body(target)?;
                Some(target)
            }
            _ => None,
        };

        let far = spec.direction.sign() * spec.distance;
        let topo = self.build_prism(&entry.profile, far);
        let merges = match target {
            Some(t) => self.plan_join(self.body(t)?, &topo),
            None => Vec::new(),
        };
        self.consume_profile(profile_id);

        let frame = entry.profile.plane.frame();
        let solid = Prism {
            frame,
            profile: entry.profile.clone(),
            low: far.min(0.0),
            high: far.max(0.0),
        };
        let (start, end) = match entry.profile.winding {
            Winding::CounterClockwise => (topo.sketch_cap, topo.far_cap),
            Winding::Clockwise => (topo.far_cap, topo.sketch_cap),
        };
        let consumed: Vec<KernelId> = merges.iter().map(|m| m.cap).collect();

        let body = match target {
            Some(handle) => {
                let caps: HashMap<KernelId, Vec<KernelId>> = topo
                    .faces
                    .iter()
                    .filter(|f| consumed.contains(&f.id))
                    .map(|f| (f.id, f.loops[0].edges.clone()))
                    .collect();
                let body = self
                    .bodies
                    .get_mut(&handle.0)
                    .ok_or(KernelError::UnknownHandle {
                        kind: "body",
                        id: handle.0,
                    })?;
                for merge in &merges {
                    if let Some(face) = body.faces.iter_mut().find(|f| f.id == merge.face) {
                        face.loops.push(FaceLoop {
                            edges: caps.get(&merge.cap).cloned().unwrap_or_default(),
                            is_outer: false,
                        });
                        face.area -= merge.overlap;
                    }
                }
                body.faces
                    .extend(topo.faces.into_iter().filter(|f| !consumed.contains(&f.id)));
                body.edges.extend(topo.edges);
                body.solids.push(solid);
                debug!(body = handle.0, merged = merges.len(), "joined extrude");
                handle
            }
            None => {
                let handle = BodyHandle(self.alloc_raw());
                let name = self.next_body_name(entry.component);
                self.bodies.insert(
                    handle.0,
                    MockBody {
                        component: entry.component,
                        name,
                        faces: topo.faces,
                        edges: topo.edges,
                        solids: vec![solid],
                        cuts: Vec::new(),
                    },
                );
                handle
            }
        };

        let keep = |id: KernelId| -> Vec<KernelId> {
            if consumed.contains(&id) {
                Vec::new()
            } else {
                vec![id]
            }
        };
        Ok(ExtrudeOutput {
            feature: FeatureId(self.alloc_raw()),
            body,
            start_faces: keep(start),
            end_faces: keep(end),
            side_faces: topo.sides,
        })
    }

    fn revolve(
        &mut self,
        profile_id: ProfileId,
        spec: &RevolveSpec,
    ) -> Result<FeatureOutput, KernelError> {
        if !spec.angle.is_finite() || spec.angle <= self.tolerance.angular {
            return Err(KernelError::RevolveFailed {
                reason: format!("revolve angle must be positive, got {}", spec.angle),
            });
        }
        if (spec.angle - TAU).abs() > 1e-9 {
            return Err(KernelError::NotSupported {
                operation: "partial revolve".to_string(),
            });
        }
        let target = match (spec.operation, spec.target) {
            (FeatureOperation::Cut, Some(target)) => target,
            (FeatureOperation::Cut, None) => {
                return Err(KernelError::Other {
                    message: "revolve cut needs a target body".to_string(),
                })
            }
            (operation, _) => {
                return Err(KernelError::NotSupported {
                    operation: format!("revolve with {:?}", operation),
                })
            }
        };
        let entry = self.available_profile(profile_id)?.clone();
        let origin = spec.axis.origin();
        let axis = spec.axis.direction();
        let (section, e1) = self.revolve_section(&entry.profile, origin, axis)?;
        let patches = self.plan_revolve_cut(self.body(target)?, &section, origin, axis, e1)?;
        self.consume_profile(profile_id);

        let mut new_faces = Vec::new();
        let mut new_edges = Vec::new();
        for patch in patches {
            let edge = MockEdge {
                id: self.alloc_id(),
                curve: EdgeCurve::Intersection {
                    anchor: patch.anchor,
                    length: patch.boundary_length,
                },
            };
            new_faces.push(MockFace {
                id: self.alloc_id(),
                surface: patch.surface,
                loops: vec![FaceLoop {
                    edges: vec![edge.id],
                    is_outer: true,
                }],
                area: patch.area,
                anchor: patch.anchor,
                outline: None,
                thread: None,
            });
            new_edges.push(edge);
        }
        let face_ids: Vec<KernelId> = new_faces.iter().map(|f| f.id).collect();
        let body = self
            .bodies
            .get_mut(&target.0)
            .ok_or(KernelError::UnknownHandle {
                kind: "body",
                id: target.0,
            })?;
        body.faces.extend(new_faces);
        body.edges.extend(new_edges);
        body.cuts.push(Revolution {
            origin,
            axis,
            section,
        });
        debug!(body = target.0, faces = face_ids.len(), "revolve cut");
        Ok(FeatureOutput {
            feature: FeatureId(self.alloc_raw()),
            body: target,
            faces: face_ids,
        })
    }

    fn chamfer(
        &mut self,
        body: BodyHandle,
        edges: &[KernelId],
        distance: f64,
    ) -> Result<FeatureOutput, KernelError> {
        self.finish_edges(body, edges, distance, FinishKind::Chamfer)
    }

    fn fillet(
        &mut self,
        body: BodyHandle,
        edges: &[KernelId],
        radius: f64,
        tangent_chain: bool,
    ) -> Result<FeatureOutput, KernelError> {
        // Closed circles have no tangent neighbours, and straight edges are
        // rejected below, so chaining never adds edges here.
        debug!(tangent_chain, edges = edges.len(), "fillet");
        self.finish_edges(body, edges, radius, FinishKind::Fillet)
    }

    fn rename_body(&mut self, body: BodyHandle, name: &str) -> Result<(), KernelError> {
        let entry = self
            .bodies
            .get_mut(&body.0)
            .ok_or(KernelError::UnknownHandle {
                kind: "body",
                id: body.0,
            })?;
        entry.name = name.to_string();
        Ok(())
    }

    fn default_metric_thread_type(&mut self) -> String {
        self.thread_data.default_metric_thread_type()
    }

    fn recommend_thread_data(
        &mut self,
        diameter: f64,
        internal: bool,
        thread_type: &str,
    ) -> Option<ThreadRecommendation> {
        self.thread_data
            .recommend_thread_data(diameter, internal, thread_type)
    }

    fn apply_thread(
        &mut self,
        body: BodyHandle,
        face: KernelId,
        info: &ThreadInfo,
    ) -> Result<FeatureOutput, KernelError> {
        let entry = self
            .bodies
            .get_mut(&body.0)
            .ok_or(KernelError::UnknownHandle {
                kind: "body",
                id: body.0,
            })?;
        let target = entry
            .faces
            .iter_mut()
            .find(|f| f.id == face)
            .ok_or(KernelError::EntityNotFound { id: face })?;
        if !matches!(target.surface, FaceSurface::Cylindrical { .. }) {
            return Err(KernelError::ThreadFailed {
                reason: format!(
                    "threads need a cylindrical face, {} is {}",
                    face,
                    target.surface.kind_name()
                ),
            });
        }
        target.thread = Some(info.clone());
        Ok(FeatureOutput {
            feature: FeatureId(self.alloc_raw()),
            body,
            faces: vec![face],
        })
    }
}

impl KernelIntrospect for MockKernel {
    fn profile(&self, profile: ProfileId) -> Option<SketchProfile> {
        self.profiles.get(&profile.0).map(|p| p.profile.clone())
    }

    fn body_name(&self, body: BodyHandle) -> Option<String> {
        self.bodies.get(&body.0).map(|b| b.name.clone())
    }

    fn body_faces(&self, body: BodyHandle) -> Vec<KernelId> {
        self.bodies
            .get(&body.0)
            .map(|b| b.faces.iter().map(|f| f.id).collect())
            .unwrap_or_default()
    }

    fn body_edges(&self, body: BodyHandle) -> Vec<KernelId> {
        self.bodies
            .get(&body.0)
            .map(|b| b.edges.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    fn face_loops(&self, face: KernelId) -> Vec<FaceLoop> {
        self.find_face(face)
            .map(|f| f.loops.clone())
            .unwrap_or_default()
    }

    fn edge_faces(&self, edge: KernelId) -> Vec<KernelId> {
        self.bodies
            .values()
            .flat_map(|b| b.faces.iter())
            .filter(|f| f.has_edge(edge))
            .map(|f| f.id)
            .collect()
    }

    fn edge_curve(&self, edge: KernelId) -> Option<EdgeCurve> {
        self.find_edge(edge).map(|e| e.curve)
    }

    fn face_surface(&self, face: KernelId) -> Option<FaceSurface> {
        self.find_face(face).map(|f| f.surface)
    }

    fn face_thread(&self, face: KernelId) -> Option<ThreadInfo> {
        self.find_face(face).and_then(|f| f.thread.clone())
    }

    fn compute_signature(&self, entity: KernelId, kind: TopoKind) -> TopoSignature {
        match kind {
            TopoKind::Face => {
                let Some(face) = self.find_face(entity) else {
                    return TopoSignature::empty();
                };
                let a = face.anchor;
                TopoSignature {
                    surface_type: Some(face.surface.kind_name().to_string()),
                    area: Some(face.area),
                    centroid: Some([a.x, a.y, a.z]),
                    normal: match face.surface {
                        FaceSurface::Planar { normal, .. } => Some([normal.x, normal.y, normal.z]),
                        _ => None,
                    },
                    length: None,
                    loop_count: Some(face.loops.len()),
                }
            }
            TopoKind::Edge => {
                let Some(edge) = self.find_edge(entity) else {
                    return TopoSignature::empty();
                };
                let a = edge.curve.anchor();
                TopoSignature {
                    surface_type: Some(edge.curve.kind_name().to_string()),
                    centroid: Some([a.x, a.y, a.z]),
                    length: Some(edge.curve.length()),
                    ..TopoSignature::empty()
                }
            }
            TopoKind::Body => TopoSignature::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bolt_types::{ConstructionAxis, ExtentDirection};

    const HEAD_RADIUS: f64 = 0.375;
    const HEAD_HEIGHT: f64 = 0.3125;

    fn hexagon_points(radius: f64) -> Vec<Point2> {
        (0..6)
            .map(|i| {
                let t = PI * i as f64 / 3.0;
                Point2::new(radius * t.cos(), radius * t.sin())
            })
            .collect()
    }

    fn sketch_on(kernel: &mut MockKernel, plane: ConstructionPlane) -> SketchId {
        let component = kernel.create_component("Test").unwrap();
        kernel.create_sketch(component, plane).unwrap()
    }

    /// Hexagonal prism z in [0, HEAD_HEIGHT], drawn in reverse order.
    fn make_head(kernel: &mut MockKernel) -> ExtrudeOutput {
        let sketch = sketch_on(kernel, ConstructionPlane::XY);
        let v = hexagon_points(HEAD_RADIUS);
        for i in 0..6 {
            kernel.add_line(sketch, v[(i + 1) % 6], v[i]).unwrap();
        }
        let profile = kernel.profiles(sketch).unwrap()[0];
        kernel
            .extrude(
                profile,
                &ExtrudeSpec {
                    distance: HEAD_HEIGHT,
                    direction: ExtentDirection::Positive,
                    operation: FeatureOperation::NewBody,
                    target: None,
                },
            )
            .unwrap()
    }

    fn join_shaft(
        kernel: &mut MockKernel,
        body: BodyHandle,
        radius: f64,
    ) -> Result<ExtrudeOutput, KernelError> {
        let sketch = sketch_on(kernel, ConstructionPlane::XY);
        kernel.add_circle(sketch, Point2::ORIGIN, radius).unwrap();
        let profile = kernel.profiles(sketch).unwrap()[0];
        kernel.extrude(
            profile,
            &ExtrudeSpec {
                distance: 2.0,
                direction: ExtentDirection::Negative,
                operation: FeatureOperation::Join,
                target: Some(body),
            },
        )
    }

    fn revolve_triangle(
        kernel: &mut MockKernel,
        body: BodyHandle,
        pts: [Point2; 3],
    ) -> Result<FeatureOutput, KernelError> {
        let sketch = sketch_on(kernel, ConstructionPlane::XZ);
        for i in 0..3 {
            kernel.add_line(sketch, pts[i], pts[(i + 1) % 3]).unwrap();
        }
        let profile = kernel.profiles(sketch).unwrap()[0];
        kernel.revolve(
            profile,
            &RevolveSpec {
                axis: ConstructionAxis::Z,
                angle: TAU,
                operation: FeatureOperation::Cut,
                target: Some(body),
            },
        )
    }

    #[test]
    fn test_reverse_hexagon_is_one_clockwise_profile() {
        let mut kernel = MockKernel::new();
        let sketch = sketch_on(&mut kernel, ConstructionPlane::XY);
        let v = hexagon_points(HEAD_RADIUS);
        for i in 0..6 {
            kernel.add_line(sketch, v[(i + 1) % 6], v[i]).unwrap();
        }
        let profiles = kernel.profiles(sketch).unwrap();
        assert_eq!(profiles.len(), 1);
        let profile = kernel.profile(profiles[0]).unwrap();
        assert_eq!(profile.winding, Winding::Clockwise);
        assert_eq!(profile.curves.len(), 6);
    }

    #[test]
    fn test_profiles_follow_drawing_order() {
        let mut kernel = MockKernel::new();
        let sketch = sketch_on(&mut kernel, ConstructionPlane::XZ);
        let a = [Point2::new(1.0, 0.0), Point2::new(2.0, 0.0), Point2::new(2.0, 1.0)];
        let b = [Point2::new(1.0, 5.0), Point2::new(2.0, 5.0), Point2::new(2.0, 4.0)];
        for tri in [a, b] {
            for i in 0..3 {
                kernel.add_line(sketch, tri[i], tri[(i + 1) % 3]).unwrap();
            }
        }
        let profiles = kernel.profiles(sketch).unwrap();
        assert_eq!(profiles.len(), 2);
        let first = kernel.profile(profiles[0]).unwrap();
        assert_relative_eq!(first.centroid().y, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_open_chain_has_no_profile() {
        let mut kernel = MockKernel::new();
        let sketch = sketch_on(&mut kernel, ConstructionPlane::XY);
        kernel
            .add_line(sketch, Point2::new(0.0, 0.0), Point2::new(1.0, 0.0))
            .unwrap();
        kernel
            .add_line(sketch, Point2::new(1.0, 0.0), Point2::new(1.0, 1.0))
            .unwrap();
        assert!(kernel.profiles(sketch).unwrap().is_empty());
    }

    #[test]
    fn test_zero_length_line_rejected() {
        let mut kernel = MockKernel::new();
        let sketch = sketch_on(&mut kernel, ConstructionPlane::XY);
        let p = Point2::new(0.5, 0.5);
        let err = kernel.add_line(sketch, p, p).unwrap_err();
        assert!(matches!(err, KernelError::DegenerateProfile { .. }));
    }

    #[test]
    fn test_hexagon_prism_topology() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        assert_eq!(kernel.body_faces(head.body).len(), 8);
        assert_eq!(kernel.body_edges(head.body).len(), 18);
        assert_eq!(head.side_faces.len(), 6);
        for side in &head.side_faces {
            assert_eq!(kernel.face_edges(*side).len(), 4);
        }
        assert_eq!(kernel.body_name(head.body).as_deref(), Some("Body1"));
    }

    #[test]
    fn test_clockwise_profile_puts_end_face_on_sketch_plane() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let end = kernel.compute_signature(head.end_faces[0], TopoKind::Face);
        let start = kernel.compute_signature(head.start_faces[0], TopoKind::Face);
        assert_relative_eq!(end.centroid.unwrap()[2], 0.0);
        assert_relative_eq!(start.centroid.unwrap()[2], HEAD_HEIGHT);
        assert_eq!(end.normal, Some([0.0, 0.0, -1.0]));
    }

    #[test]
    fn test_join_inside_face_adds_single_edge_loop() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let shaft = join_shaft(&mut kernel, head.body, 0.25).unwrap();

        assert_eq!(shaft.body, head.body);
        assert!(shaft.start_faces.is_empty(), "sketch cap merged into head");
        assert_eq!(shaft.end_faces.len(), 1);
        assert_eq!(kernel.body_faces(head.body).len(), 10);

        let loops = kernel.face_loops(head.end_faces[0]);
        let counts: Vec<usize> = loops.iter().map(|l| l.edges.len()).collect();
        assert_eq!(counts, vec![6, 1]);
        let junction = loops[1].edges[0];
        assert_eq!(kernel.edge_faces(junction).len(), 2);
    }

    #[test]
    fn test_join_crossing_face_boundary_trims_face() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let hexagon_area = kernel
            .compute_signature(head.end_faces[0], TopoKind::Face)
            .area
            .unwrap();
        // Between the apothem (0.3248) and the corner radius.
        let radius = 0.35;
        let shaft = join_shaft(&mut kernel, head.body, radius).unwrap();

        assert!(shaft.start_faces.is_empty(), "sketch cap merged into head");
        assert_eq!(kernel.body_faces(head.body).len(), 10);
        let counts: Vec<usize> = kernel
            .face_loops(head.end_faces[0])
            .iter()
            .map(|l| l.edges.len())
            .collect();
        assert_eq!(counts, vec![6, 1]);

        let trimmed = kernel
            .compute_signature(head.end_faces[0], TopoKind::Face)
            .area
            .unwrap();
        // The disk covers the inscribed circle but not the corners.
        let apothem = HEAD_RADIUS * (PI / 6.0).cos();
        assert!(trimmed > 0.0, "corners stay on the face");
        assert!(trimmed < hexagon_area - PI * apothem * apothem);
    }

    #[test]
    fn test_join_touching_nothing_keeps_caps() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let sketch = sketch_on(&mut kernel, ConstructionPlane::XY);
        kernel.add_circle(sketch, Point2::new(2.0, 0.0), 0.2).unwrap();
        let profile = kernel.profiles(sketch).unwrap()[0];
        let out = kernel
            .extrude(
                profile,
                &ExtrudeSpec {
                    distance: 1.0,
                    direction: ExtentDirection::Negative,
                    operation: FeatureOperation::Join,
                    target: Some(head.body),
                },
            )
            .unwrap();
        assert_eq!(out.start_faces.len(), 1);
        assert_eq!(kernel.body_faces(head.body).len(), 11);
    }

    #[test]
    fn test_profile_consumed_once() {
        let mut kernel = MockKernel::new();
        let sketch = sketch_on(&mut kernel, ConstructionPlane::XY);
        kernel.add_circle(sketch, Point2::ORIGIN, 1.0).unwrap();
        let profile = kernel.profiles(sketch).unwrap()[0];
        let spec = ExtrudeSpec {
            distance: 1.0,
            direction: ExtentDirection::Positive,
            operation: FeatureOperation::NewBody,
            target: None,
        };
        kernel.extrude(profile, &spec).unwrap();
        let err = kernel.extrude(profile, &spec).unwrap_err();
        assert!(matches!(err, KernelError::ProfileConsumed { .. }));
    }

    #[test]
    fn test_chamfer_circular_edge() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let shaft = join_shaft(&mut kernel, head.body, 0.25).unwrap();
        let edges = kernel.face_edges(shaft.end_faces[0]);
        assert_eq!(edges.len(), 1);

        let out = kernel.chamfer(head.body, &edges, 0.03845).unwrap();
        assert_eq!(out.faces.len(), 1);
        assert_eq!(kernel.body_faces(head.body).len(), 11);
        assert!(kernel.edge_curve(edges[0]).is_none(), "chamfered edge is gone");
        assert_eq!(
            kernel.face_surface(out.faces[0]).map(|s| s.kind_name()),
            Some("conical")
        );
        let cap_edge = kernel.face_edges(shaft.end_faces[0])[0];
        match kernel.edge_curve(cap_edge) {
            Some(EdgeCurve::Circle { radius, .. }) => assert_relative_eq!(radius, 0.25 - 0.03845),
            other => panic!("expected circle, got {:?}", other),
        }
    }

    #[test]
    fn test_chamfer_larger_than_cap_fails() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let shaft = join_shaft(&mut kernel, head.body, 0.25).unwrap();
        let edges = kernel.face_edges(shaft.end_faces[0]);
        let err = kernel.chamfer(head.body, &edges, 0.3).unwrap_err();
        assert!(matches!(err, KernelError::ChamferFailed { .. }), "{err}");
        assert_eq!(kernel.body_faces(head.body).len(), 10);
    }

    #[test]
    fn test_fillet_junction_and_limit() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        join_shaft(&mut kernel, head.body, 0.25).unwrap();
        let junction = kernel.face_loops(head.end_faces[0])[1].edges.clone();

        // Room on the head face is apothem - shaft radius, about 0.0748.
        let err = kernel.fillet(head.body, &junction, 0.08, true).unwrap_err();
        assert!(matches!(err, KernelError::FilletFailed { .. }), "{err}");

        let out = kernel.fillet(head.body, &junction, 0.02994, true).unwrap();
        assert_eq!(
            kernel.face_surface(out.faces[0]).map(|s| s.kind_name()),
            Some("toroidal")
        );
        let hole = &kernel.face_loops(head.end_faces[0])[1];
        match kernel.edge_curve(hole.edges[0]) {
            Some(EdgeCurve::Circle { radius, .. }) => assert_relative_eq!(radius, 0.25 + 0.02994),
            other => panic!("expected circle, got {:?}", other),
        }
    }

    #[test]
    fn test_fillet_straight_edge_not_supported() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let edge = kernel.face_edges(head.side_faces[0])[0];
        let err = kernel.fillet(head.body, &[edge], 0.01, false).unwrap_err();
        assert!(matches!(err, KernelError::NotSupported { .. }));
    }

    #[test]
    fn test_revolve_cut_trims_six_corners() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let apothem = HEAD_RADIUS * (PI / 6.0).cos();
        let rise = (HEAD_RADIUS - apothem) * (PI / 6.0).tan();
        let out = revolve_triangle(
            &mut kernel,
            head.body,
            [
                Point2::new(apothem, 0.0),
                Point2::new(HEAD_RADIUS, 0.0),
                Point2::new(HEAD_RADIUS, rise),
            ],
        )
        .unwrap();
        assert_eq!(out.faces.len(), 6);
        for face in &out.faces {
            assert_eq!(kernel.face_surface(*face).map(|s| s.kind_name()), Some("conical"));
            assert_eq!(kernel.face_loops(*face).len(), 1);
        }
        assert_eq!(kernel.body_faces(head.body).len(), 14);
    }

    #[test]
    fn test_revolve_cut_missing_body_fails() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let err = revolve_triangle(
            &mut kernel,
            head.body,
            [
                Point2::new(1.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 1.0),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, KernelError::BooleanFailed { .. }), "{err}");
    }

    #[test]
    fn test_revolve_cut_removing_everything_fails() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let err = revolve_triangle(
            &mut kernel,
            head.body,
            [
                Point2::new(0.0, -1.0),
                Point2::new(3.0, -1.0),
                Point2::new(0.0, 3.0),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("entire body"), "{err}");
    }

    #[test]
    fn test_revolve_axis_crossing_profile_rejected() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let err = revolve_triangle(
            &mut kernel,
            head.body,
            [
                Point2::new(-0.1, 0.0),
                Point2::new(0.1, 0.0),
                Point2::new(0.1, 0.1),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, KernelError::RevolveFailed { .. }));
    }

    #[test]
    fn test_revolve_new_body_not_supported() {
        let mut kernel = MockKernel::new();
        let sketch = sketch_on(&mut kernel, ConstructionPlane::XZ);
        let pts = [
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 1.0),
            Point2::new(1.0, 1.0),
        ];
        for i in 0..4 {
            kernel.add_line(sketch, pts[i], pts[(i + 1) % 4]).unwrap();
        }
        let profile = kernel.profiles(sketch).unwrap()[0];
        let err = kernel
            .revolve(
                profile,
                &RevolveSpec {
                    axis: ConstructionAxis::Z,
                    angle: TAU,
                    operation: FeatureOperation::NewBody,
                    target: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, KernelError::NotSupported { .. }), "{err}");
        assert!(kernel.bodies().is_empty());
    }

    #[test]
    fn test_steep_revolve_cuts_trim_six_corners_each() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let apothem = HEAD_RADIUS * (PI / 6.0).cos();
        let rise = (HEAD_RADIUS - apothem) * 89f64.to_radians().tan();
        assert!(rise > HEAD_HEIGHT, "triangle taller than the head");

        let low = revolve_triangle(
            &mut kernel,
            head.body,
            [
                Point2::new(apothem, 0.0),
                Point2::new(HEAD_RADIUS, 0.0),
                Point2::new(HEAD_RADIUS, rise),
            ],
        )
        .unwrap();
        assert_eq!(low.faces.len(), 6);

        let high = revolve_triangle(
            &mut kernel,
            head.body,
            [
                Point2::new(apothem, HEAD_HEIGHT),
                Point2::new(HEAD_RADIUS, HEAD_HEIGHT),
                Point2::new(HEAD_RADIUS, HEAD_HEIGHT - rise),
            ],
        )
        .unwrap();
        assert_eq!(high.faces.len(), 6);
        for face in low.faces.iter().chain(&high.faces) {
            assert_eq!(kernel.face_surface(*face).map(|s| s.kind_name()), Some("conical"));
        }
        assert_eq!(kernel.body_faces(head.body).len(), 20);
    }

    #[test]
    fn test_revolve_cut_exposes_shoulder_of_wide_shaft() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        join_shaft(&mut kernel, head.body, 0.35).unwrap();
        let apothem = HEAD_RADIUS * (PI / 6.0).cos();
        let rise = (HEAD_RADIUS - apothem) * (PI / 6.0).tan();
        let out = revolve_triangle(
            &mut kernel,
            head.body,
            [
                Point2::new(apothem, 0.0),
                Point2::new(HEAD_RADIUS, 0.0),
                Point2::new(HEAD_RADIUS, rise),
            ],
        )
        .unwrap();
        let kinds: Vec<&str> = out
            .faces
            .iter()
            .filter_map(|f| kernel.face_surface(*f).map(|s| s.kind_name()))
            .collect();
        assert_eq!(kinds.iter().filter(|k| **k == "conical").count(), 6);
        assert_eq!(kinds.iter().filter(|k| **k == "planar").count(), 1);
    }

    #[test]
    fn test_thread_needs_cylinder() {
        let mut kernel = MockKernel::new();
        let head = make_head(&mut kernel);
        let shaft = join_shaft(&mut kernel, head.body, 0.25).unwrap();
        let info = ThreadInfo {
            internal: false,
            thread_type: MetricThreadTable::THREAD_TYPE.to_string(),
            designation: "M5x0.8".to_string(),
            class: "6g".to_string(),
        };
        let err = kernel
            .apply_thread(head.body, shaft.end_faces[0], &info)
            .unwrap_err();
        assert!(matches!(err, KernelError::ThreadFailed { .. }));

        kernel
            .apply_thread(head.body, shaft.side_faces[0], &info)
            .unwrap();
        assert_eq!(kernel.face_thread(shaft.side_faces[0]), Some(info));
    }

    #[test]
    fn test_rejected_component() {
        let mut kernel = MockKernel::new();
        kernel.set_reject_components(true);
        let err = kernel.create_component("Bolt").unwrap_err();
        assert!(matches!(err, KernelError::ComponentFailed { .. }));
    }

    #[test]
    fn test_angular_runs_wrap_around() {
        let mut flags = vec![false; 12];
        flags[0] = true;
        flags[11] = true;
        flags[5] = true;
        let runs = angular_runs(&flags);
        assert_eq!(runs.len(), 2);
        assert!(runs.contains(&(11, 2)));
        assert!(runs.contains(&(5, 1)));
        assert_eq!(angular_runs(&[true; 4]), vec![(0, 4)]);
        assert!(angular_runs(&[false; 4]).is_empty());
    }
}
