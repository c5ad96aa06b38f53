use bolt_kernel::{ComponentId, FeatureId};
use bolt_types::TopoKind;
use modeling_ops::FeatureResult;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Stage;

/// What one kernel feature did to the bolt body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub feature: FeatureId,
    pub faces_created: usize,
    pub edges_created: usize,
    pub faces_modified: usize,
    pub kernel_time_ms: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl StageRecord {
    pub fn from_result(stage: Stage, result: &FeatureResult) -> Self {
        Self {
            stage,
            feature: result.feature,
            faces_created: result.created_count(TopoKind::Face),
            edges_created: result.created_count(TopoKind::Edge),
            faces_modified: result
                .provenance
                .modified
                .iter()
                .filter(|r| r.kind == TopoKind::Face)
                .count(),
            kernel_time_ms: result.diagnostics.kernel_time_ms,
            warnings: result.diagnostics.warnings.clone(),
        }
    }
}

/// State carried from one build stage to the next: the build id, the
/// component every sketch goes into and one record per kernel feature.
///
/// Body handles and feature results are passed to the stages directly.
#[derive(Debug)]
pub struct BuildContext {
    pub build_id: Uuid,
    pub component: ComponentId,
    pub records: Vec<StageRecord>,
}

impl BuildContext {
    pub fn new(component: ComponentId) -> Self {
        Self {
            build_id: Uuid::new_v4(),
            component,
            records: Vec::new(),
        }
    }

    pub fn record(&mut self, stage: Stage, result: &FeatureResult) {
        self.records.push(StageRecord::from_result(stage, result));
    }
}
