//! Decomposition documents: named partitions (candidate microservices) and
//! their owned classes, plus the duplicated-class bookkeeping added during
//! preprocessing.
//!
//! A class belongs to exactly one partition's `classes` (the owning
//! partition) but may be duplicated into any number of other partitions, each
//! duplicate tagged with its origin service and a reason code.

use indexmap::IndexSet;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Input document
// ---------------------------------------------------------------------------

/// One candidate microservice as declared by the decomposition source.
#[derive(Clone, Debug, Deserialize)]
pub struct Partition {
    pub name: String,
    pub classes: Vec<String>,
}

/// A proposed decomposition of one application, as produced by an external
/// clustering tool.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decomposition {
    pub name: String,
    pub app_name: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_level")]
    pub level: String,
    pub partitions: Vec<Partition>,
}

fn default_language() -> String {
    "java".to_string()
}

fn default_level() -> String {
    "class".to_string()
}

// ---------------------------------------------------------------------------
// Updated (analysis-time) decomposition
// ---------------------------------------------------------------------------

/// A class copied into a non-owning partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicatedClass {
    pub name: String,
    /// Partition that owns the class, when known.  Completeness duplicates
    /// of classes outside the decomposition carry `None`.
    pub origin: Option<String>,
    pub reason: String,
}

/// A partition augmented with the duplicated classes discovered during
/// preprocessing (inheritance and completeness duplication).
#[derive(Clone, Debug)]
pub struct UpdatedPartition {
    pub name: String,
    pub classes: Vec<String>,
    pub duplicated_classes: Vec<DuplicatedClass>,
}

impl UpdatedPartition {
    pub fn from_partition(partition: &Partition) -> Self {
        Self {
            name: partition.name.clone(),
            classes: partition.classes.clone(),
            duplicated_classes: Vec::new(),
        }
    }

    /// Record a duplicate.  No-op when the partition already owns the class
    /// or already holds a duplicate for the same `(class, origin)` pair.
    pub fn add_duplicated_class(&mut self, name: &str, origin: Option<&str>, reason: &str) {
        if self.classes.iter().any(|c| c == name) {
            return;
        }
        if self
            .duplicated_classes
            .iter()
            .any(|d| d.name == name && d.origin.as_deref() == origin)
        {
            return;
        }
        self.duplicated_classes.push(DuplicatedClass {
            name: name.to_string(),
            origin: origin.map(str::to_string),
            reason: reason.to_string(),
        });
    }

    pub fn extend_duplicated_classes<I>(&mut self, duplicates: I)
    where
        I: IntoIterator<Item = DuplicatedClass>,
    {
        for dup in duplicates {
            self.add_duplicated_class(&dup.name, dup.origin.as_deref(), &dup.reason);
        }
    }

    /// Owned classes followed by duplicated classes, deduplicated, in
    /// insertion order.  This is the `inner` set for boundary detection.
    pub fn inner_classes(&self) -> Vec<String> {
        let mut inner: IndexSet<String> = self.classes.iter().cloned().collect();
        for dup in &self.duplicated_classes {
            inner.insert(dup.name.clone());
        }
        inner.into_iter().collect()
    }
}

/// The decomposition as seen by the analysis pipeline: declared partitions in
/// declared order, each with its growing duplicate set.
#[derive(Clone, Debug)]
pub struct UpdatedDecomposition {
    pub name: String,
    pub app_name: String,
    pub language: String,
    pub level: String,
    pub partitions: Vec<UpdatedPartition>,
}

impl UpdatedDecomposition {
    pub fn from_decomposition(decomposition: &Decomposition) -> Self {
        Self {
            name: decomposition.name.clone(),
            app_name: decomposition.app_name.clone(),
            language: decomposition.language.clone(),
            level: decomposition.level.clone(),
            partitions: decomposition
                .partitions
                .iter()
                .map(UpdatedPartition::from_partition)
                .collect(),
        }
    }

    /// First partition (in declared order) that owns `class_name`.
    /// Duplicates never confer ownership.
    pub fn find_owner(&self, class_name: &str) -> Option<&str> {
        self.partitions
            .iter()
            .find(|p| p.classes.iter().any(|c| c == class_name))
            .map(|p| p.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(name: &str, classes: &[&str]) -> UpdatedPartition {
        UpdatedPartition {
            name: name.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            duplicated_classes: Vec::new(),
        }
    }

    #[test]
    fn test_add_duplicated_class_is_idempotent() {
        let mut p = partition("cluster_1", &["A"]);
        p.add_duplicated_class("B", Some("cluster_2"), "inheritance");
        p.add_duplicated_class("B", Some("cluster_2"), "inheritance");
        assert_eq!(p.duplicated_classes.len(), 1);
    }

    #[test]
    fn test_add_duplicated_class_noop_for_owned_class() {
        let mut p = partition("cluster_1", &["A"]);
        p.add_duplicated_class("A", Some("cluster_2"), "inheritance");
        assert!(p.duplicated_classes.is_empty());
    }

    #[test]
    fn test_same_class_different_origin_is_kept() {
        let mut p = partition("cluster_1", &["A"]);
        p.add_duplicated_class("B", Some("cluster_2"), "inheritance");
        p.add_duplicated_class("B", Some("cluster_3"), "inheritance");
        assert_eq!(p.duplicated_classes.len(), 2);
    }

    #[test]
    fn test_inner_classes_deduplicates() {
        let mut p = partition("cluster_1", &["A", "B"]);
        p.add_duplicated_class("C", Some("cluster_2"), "inheritance");
        p.add_duplicated_class("C", Some("cluster_3"), "inheritance");
        assert_eq!(p.inner_classes(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_find_owner_first_partition_wins() {
        let decomposition = UpdatedDecomposition {
            name: "d".to_string(),
            app_name: "app".to_string(),
            language: "java".to_string(),
            level: "class".to_string(),
            partitions: vec![partition("cluster_1", &["A"]), partition("cluster_2", &["A", "B"])],
        };
        assert_eq!(decomposition.find_owner("A"), Some("cluster_1"));
        assert_eq!(decomposition.find_owner("B"), Some("cluster_2"));
        assert_eq!(decomposition.find_owner("Z"), None);
    }

    #[test]
    fn test_decomposition_document_deserializes() {
        let doc = r#"{
            "name": "decomp_1",
            "appName": "library",
            "partitions": [
                {"name": "cluster_1", "classes": ["com.example.A"]},
                {"name": "cluster_2", "classes": ["com.example.B"]}
            ]
        }"#;
        let decomposition: Decomposition = serde_json::from_str(doc).unwrap();
        assert_eq!(decomposition.language, "java");
        assert_eq!(decomposition.level, "class");
        let updated = UpdatedDecomposition::from_decomposition(&decomposition);
        assert_eq!(updated.partitions.len(), 2);
        assert_eq!(updated.find_owner("com.example.B"), Some("cluster_2"));
    }
}
