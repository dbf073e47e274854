//! End-to-end orchestration: preprocess a decomposition, detect its
//! boundaries, and aggregate the API surface in one call.

use indexmap::IndexMap;

use crate::decomposition::{Decomposition, UpdatedDecomposition};
use crate::errors::FissionResult;
use crate::model::AppModel;
use crate::planning::boundaries::{
    ApiClass, ApiClassAggregator, BoundaryDetector, PartitionBoundaries,
};
use crate::planning::preprocessing::DecompositionPreprocessor;

/// Knobs forwarded to the preprocessing stage.
#[derive(Clone, Debug, Default)]
pub struct PipelineOptions {
    pub include_tests: bool,
    pub restrictive_selection: bool,
    pub project_root: Option<String>,
}

/// Everything boundary detection produces for one decomposition.
#[derive(Clone, Debug)]
pub struct ApiSurface {
    /// The decomposition after inheritance and completeness duplication.
    pub decomposition: UpdatedDecomposition,
    /// Per-partition inner-to-outer interactions, in declared order.
    pub boundaries: IndexMap<String, PartitionBoundaries>,
    /// Classes exposed across at least one boundary, keyed by FQN.
    pub api_classes: IndexMap<String, ApiClass>,
}

/// Run preprocessing, boundary detection, and API-class aggregation.
pub fn detect_api_surface(
    model: &dyn AppModel,
    decomposition: &Decomposition,
    options: &PipelineOptions,
) -> FissionResult<ApiSurface> {
    let updated = DecompositionPreprocessor::new(
        model,
        options.include_tests,
        options.restrictive_selection,
        options.project_root.clone(),
    )
    .update_decomposition(decomposition);
    let boundaries = BoundaryDetector::new(model, &updated).find_partition_boundaries()?;
    let api_classes = ApiClassAggregator::new(&updated).to_api_classes(&boundaries);
    Ok(ApiSurface {
        decomposition: updated,
        boundaries,
        api_classes,
    })
}
