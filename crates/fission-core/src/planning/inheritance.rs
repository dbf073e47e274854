//! Inheritance-driven class duplication.
//!
//! Generated code in each partition must compile against the full type
//! hierarchy of its classes.  For every owned class, the resolver walks the
//! superclass/interface chain and duplicates every ancestor that another
//! partition owns into the walking partition, transitively.

use indexmap::IndexSet;

use crate::decomposition::{DuplicatedClass, UpdatedDecomposition};
use crate::model::AppModel;

pub struct InheritanceResolver<'a> {
    model: &'a dyn AppModel,
}

impl<'a> InheritanceResolver<'a> {
    pub fn new(model: &'a dyn AppModel) -> Self {
        Self { model }
    }

    /// Transitive `(ancestor, origin_partition)` pairs for one class.
    ///
    /// Ancestors that no partition owns (JDK and library supertypes) are
    /// skipped and not walked further.
    fn collect_inheritances(
        &self,
        decomposition: &UpdatedDecomposition,
        class_name: &str,
        visited: &mut IndexSet<String>,
        out: &mut Vec<(String, String)>,
    ) {
        for ancestor in self.model.get_inheritance(class_name) {
            if !visited.insert(ancestor.clone()) {
                continue;
            }
            if let Some(origin) = decomposition.find_owner(&ancestor) {
                out.push((ancestor.clone(), origin.to_string()));
                self.collect_inheritances(decomposition, &ancestor, visited, out);
            }
        }
    }

    /// Duplicate cross-partition ancestors into every partition that needs
    /// them.  Ancestors owned by the walking partition itself are absorbed by
    /// the idempotent duplicate insertion.
    pub fn update_decomposition(&self, decomposition: &mut UpdatedDecomposition) {
        let mut additions: Vec<Vec<DuplicatedClass>> = Vec::with_capacity(decomposition.partitions.len());
        for partition in &decomposition.partitions {
            let mut pairs: Vec<(String, String)> = Vec::new();
            for class_name in &partition.classes {
                let mut visited = IndexSet::new();
                self.collect_inheritances(decomposition, class_name, &mut visited, &mut pairs);
            }
            additions.push(
                pairs
                    .into_iter()
                    .map(|(name, origin)| DuplicatedClass {
                        name,
                        origin: Some(origin),
                        reason: "inheritance".to_string(),
                    })
                    .collect(),
            );
        }
        for (partition, duplicates) in decomposition.partitions.iter_mut().zip(additions) {
            partition.extend_duplicated_classes(duplicates);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decomposition::Decomposition;
    use crate::model::{ClassRecord, InMemoryModel};

    const BASIC: &str = "com.example.library.services.BasicService";
    const EXTENDED: &str = "com.example.library.services.ExtendedBasicService";
    const BORROW: &str = "com.example.library.services.BorrowService";
    const SPECIAL: &str = "com.example.library.services.SpecialBorrowService";
    const NOTIFICATION: &str = "com.example.library.services.NotificationService";
    const AUDIT: &str = "com.example.library.services.AuditService";

    fn class(name: &str, inherited: &[&str]) -> ClassRecord {
        ClassRecord {
            full_name: name.to_string(),
            inherited_types: inherited.iter().map(|i| i.to_string()).collect(),
            ..Default::default()
        }
    }

    fn hierarchy_fixture() -> (InMemoryModel, UpdatedDecomposition) {
        let model = InMemoryModel::new(
            "example-project-2",
            vec![
                class(NOTIFICATION, &[BASIC]),
                class(BASIC, &["java.lang.Object"]),
                class(BORROW, &[]),
                class(EXTENDED, &[BASIC]),
                class(SPECIAL, &[BORROW]),
                class(AUDIT, &[EXTENDED]),
            ],
            vec![],
        );
        let decomposition: Decomposition = serde_json::from_str(&format!(
            r#"{{
                "name": "manual",
                "appName": "example-project-2",
                "partitions": [
                    {{"name": "cluster_1", "classes": ["{NOTIFICATION}"]}},
                    {{"name": "cluster_2", "classes": ["{BASIC}", "{BORROW}"]}},
                    {{"name": "cluster_3", "classes": ["{EXTENDED}"]}},
                    {{"name": "cluster_4", "classes": ["{SPECIAL}"]}},
                    {{"name": "cluster_5", "classes": ["{AUDIT}"]}}
                ]
            }}"#
        ))
        .unwrap();
        (model, UpdatedDecomposition::from_decomposition(&decomposition))
    }

    fn duplicates_of(decomposition: &UpdatedDecomposition, partition: &str) -> Vec<(String, String)> {
        decomposition
            .partitions
            .iter()
            .find(|p| p.name == partition)
            .unwrap()
            .duplicated_classes
            .iter()
            .map(|d| (d.name.clone(), d.origin.clone().unwrap_or_default()))
            .collect()
    }

    #[test]
    fn test_update_decomposition_duplicates_hierarchy() {
        let (model, mut decomposition) = hierarchy_fixture();
        InheritanceResolver::new(&model).update_decomposition(&mut decomposition);

        assert_eq!(
            duplicates_of(&decomposition, "cluster_1"),
            vec![(BASIC.to_string(), "cluster_2".to_string())]
        );
        assert_eq!(
            duplicates_of(&decomposition, "cluster_3"),
            vec![(BASIC.to_string(), "cluster_2".to_string())]
        );
        assert_eq!(
            duplicates_of(&decomposition, "cluster_4"),
            vec![(BORROW.to_string(), "cluster_2".to_string())]
        );
        // Transitive: AuditService -> ExtendedBasicService -> BasicService
        assert_eq!(
            duplicates_of(&decomposition, "cluster_5"),
            vec![
                (EXTENDED.to_string(), "cluster_3".to_string()),
                (BASIC.to_string(), "cluster_2".to_string())
            ]
        );
        // The owning cluster never receives duplicates
        assert!(duplicates_of(&decomposition, "cluster_2").is_empty());
    }

    #[test]
    fn test_duplicates_tagged_with_inheritance_reason() {
        let (model, mut decomposition) = hierarchy_fixture();
        InheritanceResolver::new(&model).update_decomposition(&mut decomposition);
        for partition in &decomposition.partitions {
            for dup in &partition.duplicated_classes {
                assert_eq!(dup.reason, "inheritance");
            }
        }
    }

    #[test]
    fn test_library_ancestors_are_skipped() {
        let model = InMemoryModel::new("app", vec![class("com.example.A", &["java.lang.Object"])], vec![]);
        let decomposition: Decomposition = serde_json::from_str(
            r#"{"name": "d", "appName": "app",
                "partitions": [{"name": "cluster_1", "classes": ["com.example.A"]}]}"#,
        )
        .unwrap();
        let mut updated = UpdatedDecomposition::from_decomposition(&decomposition);
        InheritanceResolver::new(&model).update_decomposition(&mut updated);
        assert!(updated.partitions[0].duplicated_classes.is_empty());
    }
}
