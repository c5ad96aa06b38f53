use bolt_kernel::{BodyHandle, Kernel, KernelIntrospect};

use crate::diff::{self, TopoSnapshot};

/// A kernel session usable by the modeling operations: mutating calls plus
/// read-only introspection on the same object.
///
/// Operations hold one `&mut dyn KernelBundle` and reach the read-only side
/// through `as_introspect` between kernel calls.
pub trait KernelBundle: Kernel + KernelIntrospect {
    fn as_introspect(&self) -> &dyn KernelIntrospect;

    /// Topology snapshot of `body`, taken before and after a feature.
    fn snapshot_body(&self, body: BodyHandle) -> TopoSnapshot {
        diff::snapshot(self.as_introspect(), body)
    }

    fn face_count(&self, body: BodyHandle) -> usize {
        self.as_introspect().body_faces(body).len()
    }
}

impl<T: Kernel + KernelIntrospect> KernelBundle for T {
    fn as_introspect(&self) -> &dyn KernelIntrospect {
        self
    }
}
