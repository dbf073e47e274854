//! Fission core library — boundary detection for monolith decompositions.
//!
//! Given the static-analysis facts of a monolithic application (classes,
//! methods, the call graph, type references) and a proposed partition of its
//! classes into candidate microservices, this crate computes which classes
//! and methods each partition exposes across its boundary, aggregates them
//! into per-class API surfaces, and plans the transitive closure of data
//! classes those surfaces drag along.  The analysis is pure matrix algebra
//! over labeled boolean matrices; no source code is parsed or generated here.

pub mod decomposition;
pub mod errors;
pub mod matrix;
pub mod model;
pub mod pipeline;
pub mod planning;

pub use decomposition::{Decomposition, DuplicatedClass, UpdatedDecomposition, UpdatedPartition};
pub use errors::{FissionError, FissionResult};
pub use matrix::BoolMatrix;
pub use model::{AppModel, InMemoryModel};
pub use pipeline::{detect_api_surface, ApiSurface, PipelineOptions};
pub use planning::boundaries::{ApiClass, BoundaryDetector, InteractionKind, InteractionRecord};
pub use planning::proxies::{ApproachType, PlannedApiClass, ProxyPlanner, RefactoringDecision};
