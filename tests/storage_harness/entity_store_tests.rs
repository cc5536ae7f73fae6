//! Contract tests every `EntityStore` backend must pass

/// Generate the reference-entity contract suite
///
/// `$factory` is an expression (may be `.await`ed) producing a fresh, empty
/// `Repositories` value for each test.
#[macro_export]
macro_rules! entity_store_tests {
    ($factory:expr) => {
        mod entity_store_contract_tests {
            use super::*;
            use comex::core::error::StorageError;
            use comex::core::query::{PageRequest, SortDirection};
            use comex::core::store::{FieldFilter, constraints};
            use comex::entities::OperationType;
            use uuid::Uuid;

            #[tokio::test]
            async fn test_insert_and_get() {
                let repos = $factory;
                let stored = repos
                    .exporters
                    .insert(exporter("EXP001", "Acme Export"))
                    .await
                    .unwrap();

                let fetched = repos.exporters.get(&stored.id).await.unwrap().unwrap();
                assert_eq!(fetched, stored);
                assert_eq!(fetched.address.city, "Sao Paulo");
                assert_eq!(fetched.lead_times.total, 45);
            }

            #[tokio::test]
            async fn test_get_unknown_id_is_none() {
                let repos = $factory;
                assert!(repos.users.get(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_list_is_scoped_to_entity_type() {
                let repos = $factory;
                repos.users.insert(user("a@comex.com", "Ana")).await.unwrap();
                repos.users.insert(user("b@comex.com", "Bruno")).await.unwrap();
                repos
                    .delivery_places
                    .insert(delivery_place("Port of Santos"))
                    .await
                    .unwrap();

                assert_eq!(repos.users.list().await.unwrap().len(), 2);
                assert_eq!(repos.delivery_places.list().await.unwrap().len(), 1);
                assert!(repos.importers.list().await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_unique_key_is_enforced_on_insert() {
                let repos = $factory;
                repos.importers.insert(importer("BR01")).await.unwrap();

                let err = repos.importers.insert(importer("BR01")).await.unwrap_err();
                assert!(matches!(
                    err,
                    StorageError::UniqueViolation { ref constraint }
                        if constraint == constraints::IMPORTER_PLANT
                ));
            }

            #[tokio::test]
            async fn test_same_key_on_other_entity_type_is_allowed() {
                let repos = $factory;
                repos
                    .exporters
                    .insert(exporter("MAT-1", "Acme Export"))
                    .await
                    .unwrap();
                repos
                    .materials
                    .insert(material("MAT-1", "Ball bearing"))
                    .await
                    .unwrap();
            }

            #[tokio::test]
            async fn test_update_replaces_entity() {
                let repos = $factory;
                let mut stored = repos
                    .users
                    .insert(user("jane@comex.com", "Jane"))
                    .await
                    .unwrap();
                stored.email = "jane.doe@comex.com".to_string();

                let updated = repos.users.update(stored.clone()).await.unwrap().unwrap();
                assert_eq!(updated.email, "jane.doe@comex.com");

                let fetched = repos.users.get(&stored.id).await.unwrap().unwrap();
                assert_eq!(fetched.email, "jane.doe@comex.com");
            }

            #[tokio::test]
            async fn test_update_unknown_id_is_none() {
                let repos = $factory;
                let result = repos
                    .users
                    .update(user("ghost@comex.com", "Ghost"))
                    .await
                    .unwrap();
                assert!(result.is_none());
            }

            #[tokio::test]
            async fn test_update_cannot_steal_unique_key() {
                let repos = $factory;
                repos.users.insert(user("a@comex.com", "Ana")).await.unwrap();
                let mut other = repos.users.insert(user("b@comex.com", "Bruno")).await.unwrap();
                other.email = "a@comex.com".to_string();

                let err = repos.users.update(other).await.unwrap_err();
                assert!(matches!(err, StorageError::UniqueViolation { .. }));
            }

            #[tokio::test]
            async fn test_delete_returns_snapshot() {
                let repos = $factory;
                let stored = repos
                    .delivery_places
                    .insert(delivery_place("Port of Santos"))
                    .await
                    .unwrap();

                let deleted = repos.delivery_places.delete(&stored.id).await.unwrap();
                assert_eq!(deleted, Some(stored.clone()));
                assert!(repos.delivery_places.get(&stored.id).await.unwrap().is_none());
                assert!(repos.delivery_places.delete(&stored.id).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_search_exact_and_contains() {
                let repos = $factory;
                repos
                    .materials
                    .insert(material("MAT-1", "Ball bearing"))
                    .await
                    .unwrap();
                repos
                    .materials
                    .insert(material("MAT-2", "Roller bearing"))
                    .await
                    .unwrap();
                repos
                    .materials
                    .insert(material("MAT-3", "Gasket"))
                    .await
                    .unwrap();

                let exact = repos
                    .materials
                    .search(&FieldFilter::exact("code", "MAT-2"))
                    .await
                    .unwrap();
                assert_eq!(exact.len(), 1);
                assert_eq!(exact[0].description, "Roller bearing");

                let partial = repos
                    .materials
                    .search(&FieldFilter::exact("code", "MAT"))
                    .await
                    .unwrap();
                assert!(partial.is_empty());

                let contains = repos
                    .materials
                    .search(&FieldFilter::contains("description", "bearing"))
                    .await
                    .unwrap();
                assert_eq!(contains.len(), 2);
            }

            #[tokio::test]
            async fn test_exists() {
                let repos = $factory;
                repos
                    .exporters
                    .insert(exporter("EXP001", "Acme Export"))
                    .await
                    .unwrap();

                assert!(repos
                    .exporters
                    .exists(&FieldFilter::exact("code", "EXP001"))
                    .await
                    .unwrap());
                assert!(!repos
                    .exporters
                    .exists(&FieldFilter::exact("code", "EXP002"))
                    .await
                    .unwrap());
            }

            #[tokio::test]
            async fn test_search_page_sorts_and_slices() {
                let repos = $factory;
                for (code, description) in [
                    ("MAT-1", "Ball bearing"),
                    ("MAT-2", "Roller bearing"),
                    ("MAT-3", "Needle bearing"),
                    ("MAT-4", "Gasket"),
                ] {
                    repos
                        .materials
                        .insert(material(code, description))
                        .await
                        .unwrap();
                }

                let filter = FieldFilter::contains("description", "bearing");
                let request = PageRequest::new(0, 2).sorted_by("code", SortDirection::Desc);
                let page = repos
                    .materials
                    .search_page(Some(&filter), "code", &request)
                    .await
                    .unwrap();

                assert_eq!(page.total_size, 3);
                assert_eq!(page.total_pages(), 2);
                let codes: Vec<_> = page.content.iter().map(|m| m.code.as_str()).collect();
                assert_eq!(codes, vec!["MAT-3", "MAT-2"]);

                let second = repos
                    .materials
                    .search_page(Some(&filter), "code", &PageRequest::new(1, 2).sorted_by("code", SortDirection::Desc))
                    .await
                    .unwrap();
                assert_eq!(second.content.len(), 1);
                assert_eq!(second.content[0].code, "MAT-1");
            }

            #[tokio::test]
            async fn test_search_page_without_filter() {
                let repos = $factory;
                repos
                    .materials
                    .insert(material("MAT-1", "Ball bearing"))
                    .await
                    .unwrap();
                repos
                    .materials
                    .insert(material("MAT-2", "Gasket"))
                    .await
                    .unwrap();

                let page = repos
                    .materials
                    .search_page(None, "description", &PageRequest::default().sorted_by("description", SortDirection::Asc))
                    .await
                    .unwrap();
                assert_eq!(page.total_size, 2);
                assert_eq!(page.content[0].description, "Ball bearing");
            }

            #[tokio::test]
            async fn test_reference_targets_must_exist() {
                let repos = $factory;
                let jane = repos.users.insert(user("jane@comex.com", "Jane")).await.unwrap();
                let brazil = repos
                    .operations
                    .insert(operation("Brazil", OperationType::Import))
                    .await
                    .unwrap();

                let ghost_user = user("ghost@comex.com", "Ghost");
                let err = repos
                    .processes
                    .insert(process("SAMPLE", &ghost_user, &brazil))
                    .await
                    .unwrap_err();
                assert!(matches!(
                    err,
                    StorageError::ForeignKeyViolation { ref constraint }
                        if constraint == constraints::PROCESS_RESPONSIBLE
                ));

                // an id of the wrong entity type does not satisfy the reference
                let mut mistyped = process("SAMPLE", &jane, &brazil);
                mistyped.operation_id = jane.id;
                let err = repos.processes.insert(mistyped).await.unwrap_err();
                assert!(matches!(
                    err,
                    StorageError::ForeignKeyViolation { ref constraint }
                        if constraint == constraints::PROCESS_OPERATION
                ));
                assert!(repos.processes.list().await.unwrap().is_empty());

                let stored = repos
                    .processes
                    .insert(process("SAMPLE", &jane, &brazil))
                    .await
                    .unwrap();
                assert_eq!(repos.processes.get(&stored.id).await.unwrap(), Some(stored));
            }

            #[tokio::test]
            async fn test_referenced_entities_survive_delete() {
                let repos = $factory;
                let jane = repos.users.insert(user("jane@comex.com", "Jane")).await.unwrap();
                let john = repos.users.insert(user("john@comex.com", "John")).await.unwrap();
                let brazil = repos
                    .operations
                    .insert(operation("Brazil", OperationType::Import))
                    .await
                    .unwrap();
                let mut sample = repos
                    .processes
                    .insert(process("SAMPLE", &jane, &brazil))
                    .await
                    .unwrap();

                let err = repos.users.delete(&jane.id).await.unwrap_err();
                assert!(matches!(err, StorageError::ForeignKeyViolation { .. }));
                let err = repos.operations.delete(&brazil.id).await.unwrap_err();
                assert!(matches!(err, StorageError::ForeignKeyViolation { .. }));

                // moving the process to John releases Jane
                sample.responsible_id = john.id;
                repos.processes.update(sample.clone()).await.unwrap().unwrap();
                assert!(repos.users.delete(&jane.id).await.unwrap().is_some());
                let err = repos.users.delete(&john.id).await.unwrap_err();
                assert!(matches!(err, StorageError::ForeignKeyViolation { .. }));

                assert!(repos.processes.delete(&sample.id).await.unwrap().is_some());
                assert!(repos.users.delete(&john.id).await.unwrap().is_some());
                assert!(repos.operations.delete(&brazil.id).await.unwrap().is_some());
            }

            #[tokio::test]
            async fn test_point_and_process_names_are_unique() {
                let repos = $factory;
                repos.points.insert(point("Santos")).await.unwrap();
                let err = repos.points.insert(point("Santos")).await.unwrap_err();
                assert!(matches!(
                    err,
                    StorageError::UniqueViolation { ref constraint }
                        if constraint == constraints::POINT_NAME
                ));

                let jane = repos.users.insert(user("jane@comex.com", "Jane")).await.unwrap();
                let brazil = repos
                    .operations
                    .insert(operation("Brazil", OperationType::Import))
                    .await
                    .unwrap();
                repos
                    .processes
                    .insert(process("SAMPLE", &jane, &brazil))
                    .await
                    .unwrap();
                let err = repos
                    .processes
                    .insert(process("SAMPLE", &jane, &brazil))
                    .await
                    .unwrap_err();
                assert!(matches!(
                    err,
                    StorageError::UniqueViolation { ref constraint }
                        if constraint == constraints::PROCESS_NAME
                ));
            }
        }
    };
}
