//! Contract tests every `OrderStore` backend must pass

/// Generate the order aggregate contract suite
///
/// `$factory` is an expression (may be `.await`ed) producing a fresh, empty
/// `Repositories` value for each test.
#[macro_export]
macro_rules! order_store_tests {
    ($factory:expr) => {
        mod order_store_contract_tests {
            use super::*;
            use chrono::Duration;
            use comex::core::error::StorageError;
            use comex::core::query::{PageRequest, SortDirection};
            use comex::core::store::constraints;
            use comex::entities::{Modal, OrderChanges, OrderStatus};
            use rust_decimal::Decimal;
            use uuid::Uuid;

            #[tokio::test]
            async fn test_insert_and_get_hydrated() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                let order = seed.order("4200212121", "Santos");
                repos.orders.insert(&order).await.unwrap();

                let fetched = repos.orders.get(&order.id).await.unwrap().unwrap();
                assert_eq!(fetched.number, "4200212121");
                assert_eq!(fetched.status, OrderStatus::PendingApproval);
                assert_eq!(fetched.exporter, seed.exporter);
                assert_eq!(fetched.importer, seed.importer);
                assert_eq!(fetched.responsible, seed.user);
                assert_eq!(fetched.delivery_place, Some(seed.delivery_place.clone()));
                assert_eq!(fetched.items.len(), 1);
                assert_eq!(fetched.items[0].material, seed.material);
                assert_eq!(fetched.items[0].quantity, Decimal::new(1000, 0));
                assert_eq!(fetched.event.id, order.event.id);
                assert!(fetched.event.availability.is_none());
            }

            #[tokio::test]
            async fn test_exists_by_number() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                repos
                    .orders
                    .insert(&seed.order("4200212121", "Santos"))
                    .await
                    .unwrap();

                assert!(repos.orders.exists_by_number("4200212121").await.unwrap());
                assert!(!repos.orders.exists_by_number("4200212122").await.unwrap());
            }

            #[tokio::test]
            async fn test_duplicate_number_is_rejected() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                repos
                    .orders
                    .insert(&seed.order("4200212121", "Santos"))
                    .await
                    .unwrap();

                let err = repos
                    .orders
                    .insert(&seed.order("4200212121", "Paranagua"))
                    .await
                    .unwrap_err();
                assert!(matches!(
                    err,
                    StorageError::UniqueViolation { ref constraint }
                        if constraint == constraints::ORDER_NUMBER
                ));
                assert_eq!(
                    repos.orders.find_all(&PageRequest::default()).await.unwrap().total_size,
                    1
                );
            }

            #[tokio::test]
            async fn test_dangling_reference_writes_nothing() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                let mut order = seed.order("4200212121", "Santos");
                order.items.push(comex::entities::Item::new(
                    material("MAT-9", "Never stored"),
                    Decimal::ONE,
                ));

                let err = repos.orders.insert(&order).await.unwrap_err();
                assert!(matches!(err, StorageError::ForeignKeyViolation { .. }));
                assert!(repos.orders.get(&order.id).await.unwrap().is_none());
                assert!(!repos.orders.exists_by_number("4200212121").await.unwrap());
            }

            #[tokio::test]
            async fn test_update_persists_mutable_fields() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                let mut order = seed.order("4200212121", "Santos");
                repos.orders.insert(&order).await.unwrap();

                let new_user = repos
                    .users
                    .insert(user("john@comex.com", "John"))
                    .await
                    .unwrap();
                order.apply(OrderChanges {
                    delivery_place: None,
                    modal: Modal::Air,
                    necessity: today() + Duration::days(10),
                    responsible: new_user.clone(),
                    deadline: today() + Duration::days(20),
                    route: Some("EUA-BR".to_string()),
                });
                order.observation = Some("fragile".to_string());
                order.broker_reference = Some("AB-0123-45".to_string());
                assert!(repos.orders.update(&order).await.unwrap());

                let fetched = repos.orders.get(&order.id).await.unwrap().unwrap();
                assert_eq!(fetched.modal, Modal::Air);
                assert_eq!(fetched.responsible, new_user);
                assert_eq!(fetched.delivery_place, Some(seed.delivery_place.clone()));
                assert_eq!(fetched.route.as_deref(), Some("EUA-BR"));
                assert_eq!(fetched.observation.as_deref(), Some("fragile"));
                assert_eq!(fetched.broker_reference.as_deref(), Some("AB-0123-45"));
                assert_eq!(fetched.number, "4200212121");
                assert_eq!(fetched.items.len(), 1);
            }

            #[tokio::test]
            async fn test_broker_reference_is_unique() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                let mut first = seed.order("4201010101", "Santos");
                let mut second = seed.order("4201010102", "Santos");
                repos.orders.insert(&first).await.unwrap();
                repos.orders.insert(&second).await.unwrap();

                first.broker_reference = Some("AB-0123-45".to_string());
                assert!(repos.orders.update(&first).await.unwrap());
                assert!(repos
                    .orders
                    .exists_by_broker_reference("AB-0123-45")
                    .await
                    .unwrap());

                second.broker_reference = Some("AB-0123-45".to_string());
                let err = repos.orders.update(&second).await.unwrap_err();
                assert!(matches!(
                    err,
                    StorageError::UniqueViolation { ref constraint }
                        if constraint == constraints::ORDER_BROKER_REFERENCE
                ));
            }

            #[tokio::test]
            async fn test_update_of_deleted_order_reports_missing() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                let mut order = seed.order("4200212121", "Santos");
                repos.orders.insert(&order).await.unwrap();
                assert!(repos.orders.delete(&order.id).await.unwrap());

                order.observation = Some("late".to_string());
                assert!(!repos.orders.update(&order).await.unwrap());
                assert!(repos.orders.get(&order.id).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_quantities_keep_scale_and_magnitude() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                let mut tiny = seed.order("4200000001", "Santos");
                tiny.items[0].quantity = Decimal::new(1, 5);
                let mut huge = seed.order("4200000002", "Santos");
                huge.items[0].quantity = Decimal::new(1_000_000_000_000_000_001, 1);
                repos.orders.insert(&tiny).await.unwrap();
                repos.orders.insert(&huge).await.unwrap();

                let fetched = repos.orders.get(&tiny.id).await.unwrap().unwrap();
                assert_eq!(fetched.items[0].quantity, Decimal::new(1, 5));
                assert_eq!(fetched.items[0].quantity.to_string(), "0.00001");
                let fetched = repos.orders.get(&huge.id).await.unwrap().unwrap();
                assert_eq!(
                    fetched.items[0].quantity,
                    Decimal::new(1_000_000_000_000_000_001, 1)
                );
            }

            #[tokio::test]
            async fn test_orders_without_reference_sort_first() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                let mut referenced = seed.order("4200000001", "Santos");
                referenced.broker_reference = Some("AB-0123-45".to_string());
                let unreferenced = seed.order("4200000002", "Santos");
                repos.orders.insert(&referenced).await.unwrap();
                repos.orders.insert(&unreferenced).await.unwrap();

                let asc = repos
                    .orders
                    .find_all(&PageRequest::default().sorted_by("brokerReference", SortDirection::Asc))
                    .await
                    .unwrap();
                let numbers: Vec<_> = asc.content.iter().map(|o| o.number.as_str()).collect();
                assert_eq!(numbers, vec!["4200000002", "4200000001"]);

                let desc = repos
                    .orders
                    .find_all(&PageRequest::default().sorted_by("brokerReference", SortDirection::Desc))
                    .await
                    .unwrap();
                let numbers: Vec<_> = desc.content.iter().map(|o| o.number.as_str()).collect();
                assert_eq!(numbers, vec!["4200000001", "4200000002"]);
            }

            #[tokio::test]
            async fn test_delete_removes_aggregate() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                let order = seed.order("4200212121", "Santos");
                repos.orders.insert(&order).await.unwrap();

                assert!(repos.orders.delete(&order.id).await.unwrap());
                assert!(repos.orders.get(&order.id).await.unwrap().is_none());
                assert!(!repos.orders.delete(&order.id).await.unwrap());
                assert!(!repos.orders.delete(&Uuid::new_v4()).await.unwrap());

                // references are free again once the order is gone
                assert!(repos.materials.delete(&seed.material.id).await.unwrap().is_some());
            }

            #[tokio::test]
            async fn test_referenced_entities_cannot_be_deleted() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                repos
                    .orders
                    .insert(&seed.order("4200212121", "Santos"))
                    .await
                    .unwrap();

                let err = repos.exporters.delete(&seed.exporter.id).await.unwrap_err();
                assert!(matches!(err, StorageError::ForeignKeyViolation { .. }));
                let err = repos.materials.delete(&seed.material.id).await.unwrap_err();
                assert!(matches!(err, StorageError::ForeignKeyViolation { .. }));
                assert!(repos.exporters.get(&seed.exporter.id).await.unwrap().is_some());
            }

            #[tokio::test]
            async fn test_find_by_filters() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                let other_exporter = repos
                    .exporters
                    .insert(exporter("EXP002", "Beta Export"))
                    .await
                    .unwrap();

                repos
                    .orders
                    .insert(&seed.order("4200000001", "Santos"))
                    .await
                    .unwrap();
                repos
                    .orders
                    .insert(&seed.order("4200000002", "Santos Dumont"))
                    .await
                    .unwrap();
                let mut third = seed.order("4200000003", "Paranagua");
                third.origin = "China".to_string();
                third.exporter = other_exporter.clone();
                repos.orders.insert(&third).await.unwrap();

                let page = PageRequest::default().sorted_by("number", SortDirection::Asc);

                let santos = repos.orders.find_by_destination("Santos", &page).await.unwrap();
                assert_eq!(santos.total_size, 1);
                assert_eq!(santos.content[0].number, "4200000001");

                let china = repos.orders.find_by_origin("China", &page).await.unwrap();
                assert_eq!(china.total_size, 1);

                let by_number = repos.orders.find_by_number("4200000002", &page).await.unwrap();
                assert_eq!(by_number.content[0].destination, "Santos Dumont");

                let by_exporter = repos
                    .orders
                    .find_by_exporter_id(&seed.exporter.id, &page)
                    .await
                    .unwrap();
                assert_eq!(by_exporter.total_size, 2);

                let by_other = repos
                    .orders
                    .find_by_exporter_id(&other_exporter.id, &page)
                    .await
                    .unwrap();
                assert_eq!(by_other.content[0].number, "4200000003");

                let by_importer = repos
                    .orders
                    .find_by_importer_id(&seed.importer.id, &page)
                    .await
                    .unwrap();
                assert_eq!(by_importer.total_size, 3);

                let none = repos
                    .orders
                    .find_by_importer_id(&Uuid::new_v4(), &page)
                    .await
                    .unwrap();
                assert_eq!(none.total_size, 0);
                assert!(none.content.is_empty());
            }

            #[tokio::test]
            async fn test_find_all_pages_and_sorts() {
                let repos = $factory;
                let seed = Seed::store(&repos).await;
                for number in ["4200000003", "4200000001", "4200000002"] {
                    repos
                        .orders
                        .insert(&seed.order(number, "Santos"))
                        .await
                        .unwrap();
                }

                let first = repos
                    .orders
                    .find_all(&PageRequest::new(0, 2).sorted_by("number", SortDirection::Desc))
                    .await
                    .unwrap();
                assert_eq!(first.total_size, 3);
                assert_eq!(first.total_pages(), 2);
                let numbers: Vec<_> = first.content.iter().map(|o| o.number.as_str()).collect();
                assert_eq!(numbers, vec!["4200000003", "4200000002"]);

                let second = repos
                    .orders
                    .find_all(&PageRequest::new(1, 2).sorted_by("number", SortDirection::Desc))
                    .await
                    .unwrap();
                assert_eq!(second.content.len(), 1);
                assert_eq!(second.content[0].number, "4200000001");
            }
        }
    };
}
