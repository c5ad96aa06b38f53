use std::fmt;

use bolt_kernel::KernelError;
use modeling_ops::OpError;
use serde::Serialize;

use crate::units::UnitsError;

/// Pipeline stage, for error reporting and per-stage records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Head,
    Body,
    Chamfer,
    Fillet,
    UnderHeadCut,
    Thread,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Head => "head",
            Stage::Body => "body",
            Stage::Chamfer => "chamfer",
            Stage::Fillet => "fillet",
            Stage::UnderHeadCut => "under-head cut",
            Stage::Thread => "thread",
        };
        f.write_str(name)
    }
}

/// Parameter input rejected before any kernel call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("bolt name must not be empty")]
    EmptyName,

    #[error("{field}: {source}")]
    Expression {
        field: &'static str,
        #[source]
        source: UnitsError,
    },

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NonPositiveLength { field: &'static str, value: f64 },

    #[error("head diameter {head} must be larger than body diameter {body}")]
    HeadNotWiderThanBody { head: f64, body: f64 },

    #[error("cut angle must lie strictly between 0 and 90 degrees, got {degrees} degrees")]
    CutAngleOutOfRange { degrees: f64 },
}

/// A modeling stage failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct GeometryError {
    pub stage: Stage,
    #[source]
    pub source: OpError,
}

impl GeometryError {
    pub fn new(stage: Stage, source: impl Into<OpError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// The host could not provide a resource the build needs.
#[derive(Debug, Clone, thiserror::Error)]
#[error("could not create component: {source}")]
pub struct ResourceError {
    #[source]
    pub source: KernelError,
}

/// Top-level build error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("invalid parameters: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}

impl BuildError {
    /// The stage that failed, for geometry errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            BuildError::Geometry(e) => Some(e.stage),
            _ => None,
        }
    }
}
