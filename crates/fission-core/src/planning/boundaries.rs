//! Boundary detection over a preprocessed decomposition.
//!
//! The detector lifts the method-level call graph to class level
//! (`CM @ calls @ CM^T`), then for every partition splits the class universe
//! into `inner` (owned plus duplicated) and `outer` (everything else) and
//! extracts the inner-to-outer interaction pairs at class, method, and
//! non-invocation granularity.  The aggregator folds those pairs into the
//! per-callee-class API surface.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::decomposition::UpdatedDecomposition;
use crate::errors::FissionResult;
use crate::matrix::{align_class_references, align_method_matrices, BoolMatrix};
use crate::model::AppModel;

// ---------------------------------------------------------------------------
// Boundary data
// ---------------------------------------------------------------------------

/// Inner-to-outer interactions of one partition.
#[derive(Clone, Debug)]
pub struct PartitionBoundaries {
    /// Owned plus duplicated classes, deduplicated, restricted to the
    /// analyzed class universe.
    pub inner_classes: Vec<String>,
    /// The rest of the analyzed class universe.
    pub outer_classes: Vec<String>,
    /// `(caller method, callee method)` pairs crossing the boundary outward.
    pub method_calls: Vec<(String, String)>,
    /// `(caller class, callee class)` pairs derived from the call graph.
    pub class_interactions: Vec<(String, String)>,
    /// `(referencing class, referenced class)` pairs from fields, parameter
    /// types, and return types.
    pub other_interactions: Vec<(String, String)>,
}

/// How one boundary crossing was observed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionKind {
    Invocation,
    Field,
    Input,
    Output,
}

/// One flattened boundary crossing, for diagnostics and reporting.
#[derive(Clone, Debug)]
pub struct InteractionRecord {
    /// Caller method FQN for invocations, referencing class FQN otherwise.
    pub source: String,
    /// Referenced class FQN.
    pub target: String,
    pub partition: String,
    pub kind: InteractionKind,
}

/// A class exposed across at least one partition boundary.
#[derive(Clone, Debug)]
pub struct ApiClass {
    pub name: String,
    /// Exposed method FQNs.
    pub methods: IndexSet<String>,
    /// `(caller method, calling partition)` pairs.
    pub interactions: IndexSet<(String, String)>,
    /// `(referencing class, referencing partition)` pairs.
    pub other_interactions: IndexSet<(String, String)>,
    /// Owning partition, when the decomposition declares one.
    pub microservice: Option<String>,
    /// Fields selected by a refactoring decision; populated by the planner.
    pub fields: Option<Vec<String>>,
    pub referenced_classes: IndexSet<String>,
    pub referencing_classes: IndexSet<String>,
}

impl ApiClass {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            methods: IndexSet::new(),
            interactions: IndexSet::new(),
            other_interactions: IndexSet::new(),
            microservice: None,
            fields: None,
            referenced_classes: IndexSet::new(),
            referencing_classes: IndexSet::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// BoundaryDetector
// ---------------------------------------------------------------------------

pub struct BoundaryDetector<'a> {
    model: &'a dyn AppModel,
    decomposition: &'a UpdatedDecomposition,
}

impl<'a> BoundaryDetector<'a> {
    pub fn new(model: &'a dyn AppModel, decomposition: &'a UpdatedDecomposition) -> Self {
        Self {
            model,
            decomposition,
        }
    }

    /// `partitions x classes` membership matrix over the analyzed class
    /// universe; duplicated classes count as members.
    pub fn build_decomposition_matrix(&self) -> BoolMatrix {
        let mut matrix = BoolMatrix::new(
            self.decomposition.partitions.iter().map(|p| p.name.clone()),
            self.model.get_class_names(),
        );
        for partition in &self.decomposition.partitions {
            for class_name in partition.inner_classes() {
                matrix.set(&partition.name, &class_name, true);
            }
        }
        matrix
    }

    /// Classes referenced (as field, parameter, or return type) from a class
    /// in a different service: the data-transfer candidates.
    ///
    /// Returned in column (class-universe) order.
    pub fn find_new_dtos(&self) -> FissionResult<Vec<String>> {
        let references = self
            .model
            .get_field_references()
            .or(&self.model.get_input_references())?
            .or(&self.model.get_output_references())?;
        let decomposition = self.build_decomposition_matrix();
        let (aligned_decomposition, aligned_references) =
            align_class_references(&decomposition, &references);
        // same_service[c1][c2]: some partition holds both classes
        let same_service = aligned_decomposition
            .transpose()
            .matmul(&aligned_decomposition)?;
        let cross_service = aligned_references.and_not(&same_service)?;
        Ok(cross_service.columns_with_any_true())
    }

    /// Per-partition inner-to-outer interactions, keyed by partition name in
    /// declared order.
    pub fn find_partition_boundaries(&self) -> FissionResult<IndexMap<String, PartitionBoundaries>> {
        let (class_methods, calls) = align_method_matrices(
            &self.model.build_class_methods_matrix(),
            &self.model.get_inter_method_calls(),
        );
        let class_interactions = class_methods.matmul(&calls)?.matmul(&class_methods.transpose())?;
        let universe: Vec<String> = class_interactions
            .row_labels()
            .map(str::to_string)
            .collect();
        let other = self
            .model
            .get_class_other_interactions()
            .select(&universe, &universe);

        let mut methods_by_class: IndexMap<String, Vec<String>> = IndexMap::new();
        for (class_name, method_name) in class_methods.true_entries() {
            methods_by_class.entry(class_name).or_default().push(method_name);
        }

        let mut boundaries = IndexMap::new();
        for partition in &self.decomposition.partitions {
            let inner_set: IndexSet<String> = partition
                .inner_classes()
                .into_iter()
                .filter(|c| universe.contains(c))
                .collect();
            let inner: Vec<String> = inner_set.iter().cloned().collect();
            let outer: Vec<String> = universe
                .iter()
                .filter(|c| !inner_set.contains(c.as_str()))
                .cloned()
                .collect();
            let methods_of = |classes: &[String]| -> Vec<String> {
                classes
                    .iter()
                    .flat_map(|c| methods_by_class.get(c).cloned().unwrap_or_default())
                    .collect()
            };
            let inner_methods = methods_of(&inner);
            let outer_methods = methods_of(&outer);
            boundaries.insert(
                partition.name.clone(),
                PartitionBoundaries {
                    method_calls: calls.select(&inner_methods, &outer_methods).true_entries(),
                    class_interactions: class_interactions.select(&inner, &outer).true_entries(),
                    other_interactions: other.select(&inner, &outer).true_entries(),
                    inner_classes: inner,
                    outer_classes: outer,
                },
            );
        }
        Ok(boundaries)
    }

    /// Flatten the boundary lists into per-crossing records, classifying the
    /// non-invocation pairs by probing the per-kind reference matrices.
    pub fn interaction_records(
        &self,
        boundaries: &IndexMap<String, PartitionBoundaries>,
    ) -> Vec<InteractionRecord> {
        let fields = self.model.get_field_references();
        let inputs = self.model.get_input_references();
        let outputs = self.model.get_output_references();
        let mut records = Vec::new();
        for (partition, boundary) in boundaries {
            for (caller, callee) in &boundary.method_calls {
                let Some(target) = class_of_method(callee) else {
                    debug!("Skipping callee without a class prefix: {callee}");
                    continue;
                };
                records.push(InteractionRecord {
                    source: caller.clone(),
                    target: target.to_string(),
                    partition: partition.clone(),
                    kind: InteractionKind::Invocation,
                });
            }
            for (source, target) in &boundary.other_interactions {
                let kinds = [
                    (&fields, InteractionKind::Field),
                    (&inputs, InteractionKind::Input),
                    (&outputs, InteractionKind::Output),
                ];
                for (matrix, kind) in kinds {
                    if matrix.get(source, target) == Some(true) {
                        records.push(InteractionRecord {
                            source: source.clone(),
                            target: target.clone(),
                            partition: partition.clone(),
                            kind,
                        });
                    }
                }
            }
        }
        records
    }
}

// ---------------------------------------------------------------------------
// ApiClassAggregator
// ---------------------------------------------------------------------------

/// Folds per-partition boundary pairs into the per-callee-class API surface.
pub struct ApiClassAggregator<'a> {
    decomposition: &'a UpdatedDecomposition,
}

impl<'a> ApiClassAggregator<'a> {
    pub fn new(decomposition: &'a UpdatedDecomposition) -> Self {
        Self { decomposition }
    }

    /// One [`ApiClass`] per callee class reached across a boundary, keyed by
    /// class FQN in discovery order (method calls over all partitions first,
    /// then non-invocation references).
    pub fn to_api_classes(
        &self,
        boundaries: &IndexMap<String, PartitionBoundaries>,
    ) -> IndexMap<String, ApiClass> {
        let mut api_classes: IndexMap<String, ApiClass> = IndexMap::new();
        for (partition, boundary) in boundaries {
            for (caller, callee) in &boundary.method_calls {
                let Some(class_name) = class_of_method(callee) else {
                    debug!("Skipping callee without a class prefix: {callee}");
                    continue;
                };
                let api = api_classes
                    .entry(class_name.to_string())
                    .or_insert_with(|| ApiClass::new(class_name));
                api.methods.insert(callee.clone());
                api.interactions.insert((caller.clone(), partition.clone()));
            }
        }
        for (partition, boundary) in boundaries {
            for (source, target) in &boundary.other_interactions {
                if !api_classes.contains_key(target.as_str()) {
                    debug!("Class {target} is referenced across a boundary but never called");
                }
                let api = api_classes
                    .entry(target.clone())
                    .or_insert_with(|| ApiClass::new(target));
                api.other_interactions.insert((source.clone(), partition.clone()));
            }
        }
        for (name, api) in &mut api_classes {
            api.microservice = self
                .decomposition
                .find_owner(name)
                .map(str::to_string);
        }
        api_classes
    }
}

/// Class FQN prefix of a `ClassFQN::signature` method name.
fn class_of_method(method_name: &str) -> Option<&str> {
    let (class_name, _) = method_name.split_once("::")?;
    Some(class_name)
}
