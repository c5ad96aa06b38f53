//! Parametric hex bolt construction.
//!
//! A bolt is built in six stages against any [`modeling_ops::KernelBundle`]:
//! hexagonal head, joined shaft, shaft-tip chamfer, head junction fillet,
//! under-head revolve cuts and an optional cosmetic thread. Raw inputs go
//! through [`resolve_parameters`] first, so invalid dimensions never reach
//! the kernel.

pub mod body;
pub mod build;
pub mod context;
pub mod error;
pub mod finish;
pub mod head;
pub mod params;
pub mod resolve;
pub mod thread;
pub mod undercut;
pub mod units;

pub use build::{BoltBuild, BoltBuilder};
pub use context::{BuildContext, StageRecord};
pub use error::{BuildError, GeometryError, ResourceError, Stage, ValidationError};
pub use head::hexagon_vertices;
pub use params::{BoltParameters, RawBoltParameters, RawValue};
pub use resolve::resolve_parameters;
pub use undercut::under_head_triangles;
pub use units::{LengthResolver, UnitsError, UnitsManager};
