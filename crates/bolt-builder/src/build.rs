use bolt_kernel::{BodyHandle, ComponentId};
use bolt_types::ThreadInfo;
use modeling_ops::KernelBundle;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::body::build_body;
use crate::context::{BuildContext, StageRecord};
use crate::error::{BuildError, ResourceError};
use crate::finish::{chamfer_shaft_tip, fillet_head_junction};
use crate::head::build_head;
use crate::params::{BoltParameters, RawBoltParameters};
use crate::resolve::resolve_parameters;
use crate::thread::thread_shaft;
use crate::undercut::cut_under_head;
use crate::units::LengthResolver;

/// Outcome of one successful bolt build.
#[derive(Debug, Clone, Serialize)]
pub struct BoltBuild {
    pub build_id: Uuid,
    pub name: String,
    pub component: ComponentId,
    pub body: BodyHandle,
    /// Faces on the finished body.
    pub face_count: usize,
    /// The thread applied to the shaft, if the tables had one.
    pub thread: Option<ThreadInfo>,
    pub stages: Vec<StageRecord>,
}

impl BoltBuild {
    pub fn threaded(&self) -> bool {
        self.thread.is_some()
    }
}

/// Drives the bolt pipeline against one kernel session.
///
/// Every build creates its own component and body. A failing stage aborts
/// the build and leaves whatever geometry earlier stages made in place.
pub struct BoltBuilder<'a> {
    kb: &'a mut dyn KernelBundle,
    threads: bool,
}

impl<'a> BoltBuilder<'a> {
    pub fn new(kb: &'a mut dyn KernelBundle) -> Self {
        Self { kb, threads: true }
    }

    /// Enable or disable the thread stage.
    pub fn with_threads(mut self, enabled: bool) -> Self {
        self.threads = enabled;
        self
    }

    /// Resolve raw inputs, then build. Invalid input fails before the
    /// kernel sees any call.
    pub fn build_from_raw(
        &mut self,
        raw: &RawBoltParameters,
        resolver: &dyn LengthResolver,
    ) -> Result<BoltBuild, BuildError> {
        let params = resolve_parameters(raw, resolver)?;
        self.build(&params)
    }

    #[instrument(skip(self, params), fields(name = params.name()))]
    pub fn build(&mut self, params: &BoltParameters) -> Result<BoltBuild, BuildError> {
        let kb = &mut *self.kb;
        let component = kb
            .create_component(params.name())
            .map_err(|source| ResourceError { source })?;
        let mut ctx = BuildContext::new(component);

        let head = build_head(kb, &mut ctx, params)?;
        let body = head.body;
        let shaft = build_body(kb, &mut ctx, body, params)?;
        chamfer_shaft_tip(kb, &mut ctx, body, &shaft, params.chamfer_distance())?;
        fillet_head_junction(kb, &mut ctx, body, &head, params.fillet_radius())?;
        cut_under_head(kb, &mut ctx, body, params)?;

        let thread = if self.threads {
            thread_shaft(kb, &mut ctx, body, &shaft, params.body_diameter())?
        } else {
            warn!("thread stage disabled");
            None
        };

        let face_count = kb.face_count(body);
        info!(
            build_id = %ctx.build_id,
            %body,
            face_count,
            threaded = thread.is_some(),
            "bolt built"
        );
        Ok(BoltBuild {
            build_id: ctx.build_id,
            name: params.name().to_string(),
            component,
            body,
            face_count,
            thread,
            stages: ctx.records,
        })
    }
}
