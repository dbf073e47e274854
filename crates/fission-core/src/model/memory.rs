//! In-memory [`AppModel`] backed by per-class and per-method analysis
//! records, deserializable from the static-analysis JSON dumps
//! (`typeData.json` / `methodData.json`).
//!
//! The record field names stay camelCase so the original analysis documents
//! load unchanged; fields this crate does not consume are simply ignored by
//! serde.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::errors::FissionResult;
use crate::matrix::BoolMatrix;
use crate::model::generics::{base_type, generic_arguments};
use crate::model::AppModel;

// ---------------------------------------------------------------------------
// Analysis records
// ---------------------------------------------------------------------------

/// Static-analysis facts for one class.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub full_name: String,
    #[serde(default)]
    pub field_types: Vec<String>,
    #[serde(default)]
    pub parameter_types: Vec<String>,
    #[serde(default)]
    pub return_types: Vec<String>,
    #[serde(default)]
    pub inherited_types: Vec<String>,
    /// Constructor signatures without the class prefix, e.g.
    /// `Book(java.lang.String)`.
    #[serde(default)]
    pub constructors: Vec<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Static-analysis facts for one method.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRecord {
    /// `ClassFQN::signature`.
    pub full_name: String,
    pub parent_name: Option<String>,
    #[serde(default)]
    pub parameter_types: Vec<String>,
    #[serde(default)]
    pub return_type: Option<String>,
    /// Callee method FQNs.
    #[serde(default)]
    pub invocations: Vec<String>,
    #[serde(default)]
    pub is_test: bool,
}

#[derive(Deserialize)]
struct TypeDataDoc {
    classes: Vec<ClassRecord>,
}

#[derive(Deserialize)]
struct MethodDataDoc {
    methods: Vec<MethodRecord>,
}

// ---------------------------------------------------------------------------
// InMemoryModel
// ---------------------------------------------------------------------------

/// Application model built from in-memory record tables, keyed by FQN in
/// record order.
pub struct InMemoryModel {
    app_name: String,
    classes: IndexMap<String, ClassRecord>,
    methods: IndexMap<String, MethodRecord>,
}

impl InMemoryModel {
    pub fn new(
        app_name: impl Into<String>,
        classes: Vec<ClassRecord>,
        methods: Vec<MethodRecord>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            classes: classes.into_iter().map(|c| (c.full_name.clone(), c)).collect(),
            methods: methods.into_iter().map(|m| (m.full_name.clone(), m)).collect(),
        }
    }

    /// Load a model from `typeData.json` / `methodData.json` documents
    /// (`{"classes": [...]}` and `{"methods": [...]}`).
    pub fn from_json(
        app_name: impl Into<String>,
        type_data: &str,
        method_data: &str,
    ) -> FissionResult<Self> {
        let type_doc: TypeDataDoc = serde_json::from_str(type_data)?;
        let method_doc: MethodDataDoc = serde_json::from_str(method_data)?;
        Ok(Self::new(app_name, type_doc.classes, method_doc.methods))
    }

    /// `classes x classes` matrix with one true entry per (class, referenced
    /// application class) pair drawn from the given per-class type lists.
    fn class_reference_matrix<F>(&self, types_of: F) -> BoolMatrix
    where
        F: Fn(&ClassRecord) -> &[String],
    {
        let mut matrix = BoolMatrix::square(self.classes.keys().cloned());
        for (name, record) in &self.classes {
            for type_name in types_of(record) {
                // set() drops types outside the analyzed class set
                matrix.set(name, &base_type(type_name), true);
            }
        }
        matrix
    }
}

impl AppModel for InMemoryModel {
    fn app_name(&self) -> &str {
        &self.app_name
    }

    fn get_class_names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }

    fn get_method_names(&self) -> Vec<String> {
        self.methods.keys().cloned().collect()
    }

    fn build_class_methods_matrix(&self) -> BoolMatrix {
        let mut matrix =
            BoolMatrix::new(self.classes.keys().cloned(), self.methods.keys().cloned());
        for (name, record) in &self.methods {
            if let Some(parent) = &record.parent_name {
                matrix.set(parent, name, true);
            }
        }
        matrix
    }

    fn get_inter_method_calls(&self) -> BoolMatrix {
        let mut matrix = BoolMatrix::square(self.methods.keys().cloned());
        for (name, record) in &self.methods {
            for callee in &record.invocations {
                matrix.set(name, callee, true);
            }
        }
        matrix
    }

    fn get_class_other_interactions(&self) -> BoolMatrix {
        let mut matrix = BoolMatrix::square(self.classes.keys().cloned());
        for (name, record) in &self.classes {
            for type_name in record
                .field_types
                .iter()
                .chain(&record.parameter_types)
                .chain(&record.return_types)
            {
                matrix.set(name, &base_type(type_name), true);
            }
        }
        matrix
    }

    fn get_field_references(&self) -> BoolMatrix {
        self.class_reference_matrix(|record| &record.field_types)
    }

    fn get_input_references(&self) -> BoolMatrix {
        self.class_reference_matrix(|record| &record.parameter_types)
    }

    fn get_output_references(&self) -> BoolMatrix {
        self.class_reference_matrix(|record| &record.return_types)
    }

    fn get_input_references_in_methods(&self) -> BoolMatrix {
        let mut matrix =
            BoolMatrix::new(self.methods.keys().cloned(), self.classes.keys().cloned());
        for (name, record) in &self.methods {
            for type_name in &record.parameter_types {
                matrix.set(name, &base_type(type_name), true);
            }
        }
        matrix
    }

    fn get_output_references_in_methods(&self) -> BoolMatrix {
        let mut matrix =
            BoolMatrix::new(self.methods.keys().cloned(), self.classes.keys().cloned());
        for (name, record) in &self.methods {
            if let Some(return_type) = &record.return_type {
                matrix.set(name, &base_type(return_type), true);
            }
        }
        matrix
    }

    fn get_inheritance(&self, class_name: &str) -> Vec<String> {
        self.classes
            .get(class_name)
            .map(|record| record.inherited_types.clone())
            .unwrap_or_default()
    }

    fn get_method_parent(&self, method_name: &str) -> Option<String> {
        self.methods.get(method_name)?.parent_name.clone()
    }

    fn get_method_parameter_types(&self, method_name: &str) -> Vec<String> {
        self.methods
            .get(method_name)
            .map(|record| record.parameter_types.iter().map(|t| base_type(t)).collect())
            .unwrap_or_default()
    }

    fn get_method_return_type(&self, method_name: &str) -> Option<String> {
        let return_type = self.methods.get(method_name)?.return_type.as_deref()?;
        Some(base_type(return_type))
    }

    fn get_method_generics_in_parameters(&self, method_name: &str) -> Vec<String> {
        self.methods
            .get(method_name)
            .map(|record| {
                record
                    .parameter_types
                    .iter()
                    .flat_map(|t| generic_arguments(t))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get_method_generics_in_return_type(&self, method_name: &str) -> Vec<String> {
        self.methods
            .get(method_name)
            .and_then(|record| record.return_type.as_deref())
            .map(generic_arguments)
            .unwrap_or_default()
    }

    fn get_field_types(&self, class_name: &str) -> Vec<String> {
        self.classes
            .get(class_name)
            .map(|record| record.field_types.iter().map(|t| base_type(t)).collect())
            .unwrap_or_default()
    }

    fn get_class_constructors(&self, class_name: &str) -> Vec<String> {
        self.classes
            .get(class_name)
            .map(|record| {
                record
                    .constructors
                    .iter()
                    .map(|c| format!("{class_name}::{c}"))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn get_class_file_path(&self, class_name: &str) -> Option<String> {
        self.classes.get(class_name)?.file_path.clone()
    }

    fn get_class_source(&self, class_name: &str) -> Option<String> {
        self.classes.get(class_name)?.content.clone()
    }

    fn get_test_methods(&self) -> Vec<String> {
        self.methods
            .iter()
            .filter(|(_, record)| record.is_test)
            .map(|(name, _)| name.clone())
            .collect()
    }
}
