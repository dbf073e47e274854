//! The application model: the read-only static-analysis facts the pipeline
//! consumes.
//!
//! The analysis itself (parsing, call-graph extraction) happens outside this
//! crate; components only depend on the [`AppModel`] trait.  Method names use
//! the `ClassFQN::signature` format, e.g.
//! `com.example.library.Library::findBookById(java.lang.String)`.

pub mod generics;
pub mod memory;

pub use memory::{ClassRecord, InMemoryModel, MethodRecord};

use crate::matrix::BoolMatrix;

/// Read-only query contract over one analyzed application.
///
/// Implementations must be stable for the duration of one analysis run:
/// repeated calls return identical data in identical order.
pub trait AppModel {
    fn app_name(&self) -> &str;

    /// All class FQNs, in a stable order.
    fn get_class_names(&self) -> Vec<String>;

    /// All method FQNs (`ClassFQN::signature`), in a stable order.
    fn get_method_names(&self) -> Vec<String>;

    /// Boolean `classes x methods` ownership matrix.
    fn build_class_methods_matrix(&self) -> BoolMatrix;

    /// Boolean `methods x methods` call matrix (caller row, callee column).
    fn get_inter_method_calls(&self) -> BoolMatrix;

    /// Boolean `classes x classes` matrix of all non-invocation references
    /// (fields, parameters, return types).
    fn get_class_other_interactions(&self) -> BoolMatrix;

    /// Boolean `classes x classes` field-type reference matrix.
    fn get_field_references(&self) -> BoolMatrix;

    /// Boolean `classes x classes` parameter-type reference matrix.
    fn get_input_references(&self) -> BoolMatrix;

    /// Boolean `classes x classes` return-type reference matrix.
    fn get_output_references(&self) -> BoolMatrix;

    /// Boolean `methods x classes` parameter-type reference matrix.
    fn get_input_references_in_methods(&self) -> BoolMatrix;

    /// Boolean `methods x classes` return-type reference matrix.
    fn get_output_references_in_methods(&self) -> BoolMatrix;

    /// Direct superclasses and implemented interfaces of a class.
    fn get_inheritance(&self, class_name: &str) -> Vec<String>;

    /// Owning class of a method, when known.
    fn get_method_parent(&self, method_name: &str) -> Option<String>;

    fn get_method_parameter_types(&self, method_name: &str) -> Vec<String>;

    fn get_method_return_type(&self, method_name: &str) -> Option<String>;

    /// Element types of generic/array parameter types, innermost first
    /// recovered (e.g. `List<Foo>` contributes `Foo`).
    fn get_method_generics_in_parameters(&self, method_name: &str) -> Vec<String>;

    /// Element types of a generic/array return type.
    fn get_method_generics_in_return_type(&self, method_name: &str) -> Vec<String>;

    fn get_field_types(&self, class_name: &str) -> Vec<String>;

    /// Constructor FQNs of a class, in `ClassFQN::signature` format.
    fn get_class_constructors(&self, class_name: &str) -> Vec<String>;

    /// Source file path of a class.  `None` marks an external/library type.
    fn get_class_file_path(&self, class_name: &str) -> Option<String>;

    /// Source text of a class.  `None`, or a self-referential sentinel equal
    /// to the class name, marks an external/library type.
    fn get_class_source(&self, class_name: &str) -> Option<String>;

    /// Methods tagged as tests by the static analysis.
    fn get_test_methods(&self) -> Vec<String>;
}
