//! Transitive proxy planning.
//!
//! Every API class carries an externally-made refactoring decision.  Planning
//! walks the classes those decisions expose (method signatures, constructors,
//! and for DTO-style decisions the field types), pulling newly referenced
//! application classes into the plan as DTO-only entries until the reference
//! set closes, with a hard round cap as a safety net.

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::decomposition::UpdatedDecomposition;
use crate::errors::{FissionError, FissionResult};
use crate::model::AppModel;
use crate::planning::boundaries::ApiClass;

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// How an API class is carried across the service boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApproachType {
    /// Remote calls pass entity identifiers; the class stays put.
    IdBased,
    /// Remote calls pass a data-transfer copy with selected fields.
    DtoBased,
    /// The class crosses only as data, never as a call target.
    DtoOnly,
}

/// One externally-made decision for an API class.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefactoringDecision {
    pub decision: ApproachType,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub suggested_fields: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Planned classes
// ---------------------------------------------------------------------------

/// An API class with its decision applied and its reference closure resolved.
#[derive(Clone, Debug)]
pub struct PlannedApiClass {
    pub name: String,
    pub simple_name: String,
    pub package_name: String,
    pub microservice: Option<String>,
    pub decision: ApproachType,
    pub reasoning: String,
    pub methods: IndexSet<String>,
    pub interactions: IndexSet<(String, String)>,
    pub other_interactions: IndexSet<(String, String)>,
    pub fields: Option<Vec<String>>,
    pub referenced_classes: IndexSet<String>,
    pub referencing_classes: IndexSet<String>,
}

impl PlannedApiClass {
    fn from_api(api: &ApiClass, decision: &RefactoringDecision) -> Self {
        let (package_name, simple_name) = split_class_name(&api.name);
        Self {
            name: api.name.clone(),
            simple_name,
            package_name,
            microservice: api.microservice.clone(),
            decision: decision.decision,
            reasoning: decision.reasoning.clone(),
            methods: api.methods.clone(),
            interactions: api.interactions.clone(),
            other_interactions: api.other_interactions.clone(),
            fields: decision.suggested_fields.clone(),
            referenced_classes: IndexSet::new(),
            referencing_classes: IndexSet::new(),
        }
    }

    fn dto_only(name: &str, reasoning: String) -> Self {
        let (package_name, simple_name) = split_class_name(name);
        Self {
            name: name.to_string(),
            simple_name,
            package_name,
            microservice: None,
            decision: ApproachType::DtoOnly,
            reasoning,
            methods: IndexSet::new(),
            interactions: IndexSet::new(),
            other_interactions: IndexSet::new(),
            fields: None,
            referenced_classes: IndexSet::new(),
            referencing_classes: IndexSet::new(),
        }
    }
}

fn split_class_name(name: &str) -> (String, String) {
    match name.rsplit_once('.') {
        Some((package, simple)) => (package.to_string(), simple.to_string()),
        None => (String::new(), name.to_string()),
    }
}

// ---------------------------------------------------------------------------
// ProxyPlanner
// ---------------------------------------------------------------------------

pub struct ProxyPlanner<'a> {
    model: &'a dyn AppModel,
    all_classes: IndexSet<String>,
}

impl<'a> ProxyPlanner<'a> {
    /// Round cap for the reference-closure loop.
    const MAX_ITERATIONS: usize = 10;

    pub fn new(model: &'a dyn AppModel) -> Self {
        Self {
            model,
            all_classes: model.get_class_names().into_iter().collect(),
        }
    }

    /// Plan every API class and the transitive closure of the application
    /// classes their decisions expose.
    ///
    /// Every initial API class must have a decision; classes discovered
    /// during the walk are planned as [`ApproachType::DtoOnly`] with the
    /// accumulated discovery reasons as their reasoning.
    pub fn plan(
        &self,
        decisions: &IndexMap<String, RefactoringDecision>,
        api_classes: &IndexMap<String, ApiClass>,
    ) -> FissionResult<IndexMap<String, PlannedApiClass>> {
        let mut planned: IndexMap<String, PlannedApiClass> = IndexMap::new();
        let mut reasons: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut worklist: Vec<String> = Vec::new();

        for (name, api) in api_classes {
            let decision = decisions
                .get(name)
                .ok_or_else(|| FissionError::MissingDecision(name.clone()))?;
            let mut entry = PlannedApiClass::from_api(api, decision);
            for (referenced, reason) in
                self.collect_references(name, decision.decision, &entry.methods)
            {
                if referenced == *name {
                    continue;
                }
                entry.referenced_classes.insert(referenced.clone());
                push_reason(&mut reasons, &referenced, reason);
                worklist.push(referenced);
            }
            planned.insert(name.clone(), entry);
        }

        let mut visited: IndexSet<String> = planned.keys().cloned().collect();
        let mut rounds = 0;
        while !worklist.is_empty() {
            rounds += 1;
            if rounds > Self::MAX_ITERATIONS {
                warn!(
                    "Maximum iterations reached after {} rounds; {} classes left unplanned",
                    Self::MAX_ITERATIONS,
                    worklist.len()
                );
                break;
            }
            let mut next = Vec::new();
            for class_name in worklist.drain(..) {
                if !visited.insert(class_name.clone()) {
                    continue;
                }
                let reasoning = reasons
                    .get(&class_name)
                    .map(|r| r.join("\n"))
                    .unwrap_or_default();
                let mut entry = PlannedApiClass::dto_only(&class_name, reasoning);
                let own_methods = IndexSet::new();
                for (referenced, reason) in
                    self.collect_references(&class_name, ApproachType::DtoOnly, &own_methods)
                {
                    if referenced == class_name {
                        continue;
                    }
                    entry.referenced_classes.insert(referenced.clone());
                    push_reason(&mut reasons, &referenced, reason);
                    if !visited.contains(referenced.as_str()) {
                        next.push(referenced);
                    }
                }
                planned.insert(class_name, entry);
            }
            worklist = next;
        }

        reverse_map_referenced_classes(&mut planned);
        Ok(planned)
    }

    /// Application classes reachable from one class's exposed surface, each
    /// paired with a human-readable discovery reason.
    ///
    /// ID- and DTO-based classes expose their methods and constructors
    /// (parameter types, return type, and the element types of generic
    /// containers on both); DTO-style classes additionally expose their
    /// field types.  Types that cannot be planned (external, or without
    /// resolvable source) are dropped here, so they never reach the
    /// reference edges or the worklist.
    fn collect_references(
        &self,
        class_name: &str,
        approach: ApproachType,
        exposed_methods: &IndexSet<String>,
    ) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if approach != ApproachType::DtoOnly {
            let surface: Vec<String> = exposed_methods
                .iter()
                .cloned()
                .chain(self.model.get_class_constructors(class_name))
                .collect();
            for method_name in &surface {
                let mut types = self.model.get_method_parameter_types(method_name);
                types.extend(self.model.get_method_return_type(method_name));
                types.extend(self.model.get_method_generics_in_parameters(method_name));
                types.extend(self.model.get_method_generics_in_return_type(method_name));
                for type_name in types {
                    if self.is_plannable(&type_name) {
                        out.push((
                            type_name.clone(),
                            format!(
                                "Class {type_name} was used within the input/output of methods of {class_name}."
                            ),
                        ));
                    }
                }
            }
        }
        if matches!(approach, ApproachType::DtoBased | ApproachType::DtoOnly) {
            for type_name in self.model.get_field_types(class_name) {
                if self.is_plannable(&type_name) {
                    out.push((
                        type_name.clone(),
                        format!("Class {type_name} was used within the fields of {class_name}."),
                    ));
                }
            }
        }
        out
    }

    /// An application class with a resolvable source file.  External and
    /// synthetic types carry no file path, no source, or a self-referential
    /// source sentinel; they cannot be planned.
    fn is_plannable(&self, class_name: &str) -> bool {
        if !self.all_classes.contains(class_name) {
            return false;
        }
        if self.has_resolvable_source(class_name) {
            return true;
        }
        debug!("Skipping referenced class without resolvable source: {class_name}");
        false
    }

    fn has_resolvable_source(&self, class_name: &str) -> bool {
        if self.model.get_class_file_path(class_name).is_none() {
            return false;
        }
        match self.model.get_class_source(class_name) {
            None => false,
            Some(source) => source != class_name,
        }
    }
}

fn push_reason(reasons: &mut IndexMap<String, Vec<String>>, class_name: &str, reason: String) {
    let list = reasons.entry(class_name.to_string()).or_default();
    if !list.contains(&reason) {
        list.push(reason);
    }
}

/// Fill `referencing_classes` from the forward `referenced_classes` edges.
pub fn reverse_map_referenced_classes(planned: &mut IndexMap<String, PlannedApiClass>) {
    let edges: Vec<(String, String)> = planned
        .iter()
        .flat_map(|(name, entry)| {
            entry
                .referenced_classes
                .iter()
                .map(|referenced| (name.clone(), referenced.clone()))
        })
        .collect();
    for (referencer, referenced) in edges {
        match planned.get_mut(&referenced) {
            Some(entry) => {
                entry.referencing_classes.insert(referencer);
            }
            None => debug!("Referenced class was never planned: {referenced}"),
        }
    }
}

/// Resolve the owning partition of every planned class that does not carry
/// one yet.  A class no partition owns is the one failure boundary detection
/// cannot absorb.
pub fn assign_owners(
    decomposition: &UpdatedDecomposition,
    planned: &mut IndexMap<String, PlannedApiClass>,
) -> FissionResult<()> {
    for (name, entry) in planned.iter_mut() {
        if entry.microservice.is_some() {
            continue;
        }
        let owner = decomposition
            .find_owner(name)
            .ok_or_else(|| FissionError::UnknownOwner(name.clone()))?;
        entry.microservice = Some(owner.to_string());
    }
    Ok(())
}
