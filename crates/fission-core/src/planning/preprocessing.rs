//! Decomposition preprocessing: inheritance duplication followed by
//! completeness duplication.
//!
//! After preprocessing, every class the application model knows appears in
//! every partition, either owned or duplicated, so later stages can treat a
//! partition's `inner` set as a complete compilation unit.

use std::path::Path;
use std::sync::LazyLock;

use indexmap::IndexSet;
use regex::Regex;
use tracing::{debug, warn};

use crate::decomposition::{Decomposition, UpdatedDecomposition};
use crate::model::AppModel;
use crate::planning::inheritance::InheritanceResolver;

static MAIN_SOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^src/main/java/.*\.java").unwrap());

// ---------------------------------------------------------------------------
// DecompositionPreprocessor
// ---------------------------------------------------------------------------

/// Runs the full preprocessing chain on a raw decomposition document.
pub struct DecompositionPreprocessor<'a> {
    model: &'a dyn AppModel,
    include_tests: bool,
    restrictive_selection: bool,
    project_root: Option<String>,
}

impl<'a> DecompositionPreprocessor<'a> {
    pub fn new(
        model: &'a dyn AppModel,
        include_tests: bool,
        restrictive_selection: bool,
        project_root: Option<String>,
    ) -> Self {
        Self {
            model,
            include_tests,
            restrictive_selection,
            project_root,
        }
    }

    pub fn update_decomposition(&self, decomposition: &Decomposition) -> UpdatedDecomposition {
        let mut updated = UpdatedDecomposition::from_decomposition(decomposition);
        InheritanceResolver::new(self.model).update_decomposition(&mut updated);
        CompletionResolver::new(self.model, self.project_root.clone()).duplicate_missing_classes(
            &mut updated,
            self.include_tests,
            self.restrictive_selection,
        );
        updated
    }
}

// ---------------------------------------------------------------------------
// CompletionResolver
// ---------------------------------------------------------------------------

/// Duplicates classes missing from the decomposition into every partition.
pub struct CompletionResolver<'a> {
    model: &'a dyn AppModel,
    project_root: Option<String>,
}

impl<'a> CompletionResolver<'a> {
    pub fn new(model: &'a dyn AppModel, project_root: Option<String>) -> Self {
        Self {
            model,
            project_root,
        }
    }

    /// Duplicate every application class not yet present in any partition
    /// into all partitions, with origin `None` and reason `missing_class`.
    ///
    /// `include_tests = false` excludes classes owning test methods;
    /// `restrictive_selection = true` excludes generic/ill-formed classes and
    /// classes outside the canonical `src/main/java` tree.
    pub fn duplicate_missing_classes(
        &self,
        decomposition: &mut UpdatedDecomposition,
        include_tests: bool,
        restrictive_selection: bool,
    ) {
        let included: IndexSet<String> = decomposition
            .partitions
            .iter()
            .flat_map(|p| {
                p.classes
                    .iter()
                    .cloned()
                    .chain(p.duplicated_classes.iter().map(|d| d.name.clone()))
            })
            .collect();
        let missing: Vec<String> = self
            .model
            .get_class_names()
            .into_iter()
            .filter(|c| !included.contains(c))
            .collect();

        let mut to_duplicate = missing;
        if !include_tests {
            let test_classes: IndexSet<String> = self
                .model
                .get_test_methods()
                .iter()
                .filter_map(|m| self.model.get_method_parent(m))
                .collect();
            let before = to_duplicate.len();
            to_duplicate.retain(|c| !test_classes.contains(c));
            debug!(
                "Excluding {} test classes from duplication",
                before - to_duplicate.len()
            );
        }
        if restrictive_selection {
            let before = to_duplicate.len();
            to_duplicate.retain(|c| self.validate_conditions(c));
            debug!(
                "Excluding {} generic or invalid classes from duplication",
                before - to_duplicate.len()
            );
        }

        debug!("Duplicating {} classes", to_duplicate.len());
        for partition in &mut decomposition.partitions {
            for class_name in &to_duplicate {
                partition.add_duplicated_class(class_name, None, "missing_class");
            }
        }
    }

    /// A class qualifies for restrictive duplication when it is not generic
    /// or ill-formed and its source file lives under `src/main/java`.
    fn validate_conditions(&self, class_name: &str) -> bool {
        let in_main = match &self.project_root {
            None => {
                warn!("Project root not set; cannot validate the source-tree condition for {class_name}");
                true
            }
            Some(root) => match self.model.get_class_file_path(class_name) {
                None => return false,
                Some(file_path) => {
                    let relative = Path::new(&file_path)
                        .strip_prefix(root)
                        .map(|p| p.to_string_lossy().into_owned())
                        .unwrap_or(file_path);
                    MAIN_SOURCE_RE.is_match(&relative)
                }
            },
        };
        !is_generic(class_name) && in_main
    }
}

/// Ill-formed class names: no package prefix, or a nested/anonymous `$` part.
fn is_generic(class_name: &str) -> bool {
    class_name.split('.').count() < 2 || class_name.contains('$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassRecord, InMemoryModel, MethodRecord};

    fn class(name: &str, file_path: Option<&str>) -> ClassRecord {
        ClassRecord {
            full_name: name.to_string(),
            file_path: file_path.map(str::to_string),
            content: Some(format!("class {name} {{}}")),
            ..Default::default()
        }
    }

    fn decomposition(partitions: &[(&str, &[&str])]) -> Decomposition {
        let partitions = partitions
            .iter()
            .map(|(name, classes)| {
                format!(
                    r#"{{"name": "{name}", "classes": [{}]}}"#,
                    classes
                        .iter()
                        .map(|c| format!(r#""{c}""#))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        serde_json::from_str(&format!(
            r#"{{"name": "d", "appName": "app", "partitions": [{partitions}]}}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_every_class_lands_in_every_partition() {
        let model = InMemoryModel::new(
            "app",
            vec![
                class("com.example.A", Some("src/main/java/com/example/A.java")),
                class("com.example.B", Some("src/main/java/com/example/B.java")),
                class("com.example.Util", Some("src/main/java/com/example/Util.java")),
            ],
            vec![],
        );
        let doc = decomposition(&[
            ("cluster_1", &["com.example.A"]),
            ("cluster_2", &["com.example.B"]),
        ]);
        let preprocessor = DecompositionPreprocessor::new(&model, true, false, None);
        let updated = preprocessor.update_decomposition(&doc);
        for partition in &updated.partitions {
            let inner = partition.inner_classes();
            assert!(inner.contains(&"com.example.Util".to_string()));
            assert_eq!(inner.len(), 2, "owned class plus the missing duplicate");
        }
        let dup = &updated.partitions[0].duplicated_classes[0];
        assert_eq!(dup.origin, None);
        assert_eq!(dup.reason, "missing_class");
    }

    #[test]
    fn test_include_tests_false_excludes_test_classes() {
        let model = InMemoryModel::new(
            "app",
            vec![
                class("com.example.A", None),
                class("com.example.ATest", None),
            ],
            vec![MethodRecord {
                full_name: "com.example.ATest::testRun()".to_string(),
                parent_name: Some("com.example.ATest".to_string()),
                is_test: true,
                ..Default::default()
            }],
        );
        let doc = decomposition(&[("cluster_1", &["com.example.A"])]);
        let updated =
            DecompositionPreprocessor::new(&model, false, false, None).update_decomposition(&doc);
        assert!(updated.partitions[0].duplicated_classes.is_empty());
    }

    #[test]
    fn test_restrictive_selection_filters_paths_and_generics() {
        let model = InMemoryModel::new(
            "app",
            vec![
                class("com.example.A", Some("/repo/src/main/java/com/example/A.java")),
                class("com.example.Gen$1", Some("/repo/src/main/java/com/example/Gen.java")),
                class("NoPackage", Some("/repo/src/main/java/NoPackage.java")),
                class("com.example.T", Some("/repo/src/test/java/com/example/T.java")),
                class("com.example.External", None),
                class("com.example.Owned", Some("/repo/src/main/java/com/example/Owned.java")),
            ],
            vec![],
        );
        let doc = decomposition(&[("cluster_1", &["com.example.Owned"])]);
        let updated = DecompositionPreprocessor::new(&model, true, true, Some("/repo".to_string()))
            .update_decomposition(&doc);
        let duplicated: Vec<&str> = updated.partitions[0]
            .duplicated_classes
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(duplicated, vec!["com.example.A"]);
    }

    #[test]
    fn test_missing_project_root_waives_path_condition() {
        let model = InMemoryModel::new(
            "app",
            vec![
                class("com.example.Anywhere", Some("/elsewhere/A.java")),
                class("com.example.Owned", None),
            ],
            vec![],
        );
        let doc = decomposition(&[("cluster_1", &["com.example.Owned"])]);
        let updated =
            DecompositionPreprocessor::new(&model, true, true, None).update_decomposition(&doc);
        let duplicated: Vec<&str> = updated.partitions[0]
            .duplicated_classes
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(duplicated, vec!["com.example.Anywhere"]);
    }
}
