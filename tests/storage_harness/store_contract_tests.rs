//! Store contract test macro
//!
//! `store_contract_tests!` generates the behavioral suite every
//! `Store<Publication>` implementation must pass.
//!
//! ## CRUD
//! - `test_insert_and_get`
//! - `test_get_nonexistent`
//! - `test_find_returns_insertion_order`
//! - `test_duplicate_id_is_rejected`
//!
//! ## Filters
//! - `test_equality_filters`
//! - `test_live_filter_hides_soft_deleted`
//! - `test_count_and_find_one`
//!
//! ## Updates
//! - `test_update_returns_post_update_record`
//! - `test_update_cannot_change_id`
//! - `test_update_nonexistent`
//!
//! ## Soft delete
//! - `test_soft_delete_keeps_record_readable_by_id`
//! - `test_soft_delete_twice_keeps_first_timestamp`
//!
//! ## Concurrency
//! - `test_concurrent_inserts`

/// Generate a full `Store<Publication>` conformance test suite.
///
/// `$factory` must evaluate to an instance implementing `Store<Publication>`.
/// It is re-evaluated for each test to ensure isolation. For the concurrent
/// access test, the returned store must also implement `Clone + 'static`.
#[macro_export]
macro_rules! store_contract_tests {
    ($factory:expr) => {
        mod store_contract_tests {
            use super::*;
            use market::core::entity::Record;
            use market::core::id::RecordId;
            use market::core::store::{Filter, Patch, Store};
            use serde_json::json;

            // ==================================================================
            // CRUD
            // ==================================================================

            #[tokio::test]
            async fn test_insert_and_get() {
                let store = $factory;
                let owner = RecordId::new();
                let record = publication(owner, "Fresh apples", "fruit");

                let saved = store.insert(record.clone()).await.unwrap();
                assert_eq!(saved.id, record.id);

                let fetched = store.get(&record.id).await.unwrap().unwrap();
                assert_eq!(fetched.message, "Fresh apples");
                assert_eq!(fetched.kind, "fruit");
                assert_eq!(fetched.user_id, owner);
                assert!((fetched.weight - 12.5).abs() < f64::EPSILON);
                assert!(fetched.is_active);
                assert!(fetched.is_live());
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                assert!(store.get(&RecordId::new()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_find_returns_insertion_order() {
                let store = $factory;
                let batch = sample_batch(4);
                for record in &batch {
                    store.insert(record.clone()).await.unwrap();
                }

                let found: Vec<RecordId> = store
                    .find(&Filter::any())
                    .await
                    .unwrap()
                    .iter()
                    .map(|r| r.id)
                    .collect();
                let expected: Vec<RecordId> = batch.iter().map(|r| r.id).collect();
                assert_eq!(found, expected);
            }

            #[tokio::test]
            async fn test_duplicate_id_is_rejected() {
                let store = $factory;
                let record = publication(RecordId::new(), "Once", "fruit");

                store.insert(record.clone()).await.unwrap();
                assert!(store.insert(record).await.is_err());
            }

            // ==================================================================
            // Filters
            // ==================================================================

            #[tokio::test]
            async fn test_equality_filters() {
                let store = $factory;
                for record in sample_batch(6) {
                    store.insert(record).await.unwrap();
                }

                let fruit = store.find(&Filter::any().eq("type", "fruit")).await.unwrap();
                assert_eq!(fruit.len(), 3);
                assert!(fruit.iter().all(|r| r.kind == "fruit"));

                let active_grain = store
                    .find(&Filter::any().eq("type", "grain").eq("isActive", true))
                    .await
                    .unwrap();
                // Lots 1 and 5; lot 3 is inactive
                assert_eq!(active_grain.len(), 2);

                let exact = store.find(&Filter::any().eq("message", "Lot 4")).await.unwrap();
                assert_eq!(exact.len(), 1);

                let none = store.find(&Filter::any().eq("message", "Lot")).await.unwrap();
                assert!(none.is_empty());
            }

            #[tokio::test]
            async fn test_live_filter_hides_soft_deleted() {
                let store = $factory;
                let batch = sample_batch(3);
                for record in &batch {
                    store.insert(record.clone()).await.unwrap();
                }
                store.soft_delete(&batch[1].id).await.unwrap().unwrap();

                let live = store.find(&Filter::live()).await.unwrap();
                assert_eq!(live.len(), 2);
                assert!(live.iter().all(|r| r.id != batch[1].id));

                let all = store.find(&Filter::any()).await.unwrap();
                assert_eq!(all.len(), 3);
            }

            #[tokio::test]
            async fn test_count_and_find_one() {
                let store = $factory;
                let batch = sample_batch(4);
                for record in &batch {
                    store.insert(record.clone()).await.unwrap();
                }

                assert_eq!(store.count(&Filter::any()).await.unwrap(), 4);
                assert_eq!(
                    store
                        .count(&Filter::live().with_id(batch[2].id))
                        .await
                        .unwrap(),
                    1
                );
                assert_eq!(
                    store
                        .count(&Filter::live().with_id(RecordId::new()))
                        .await
                        .unwrap(),
                    0
                );

                let first = store
                    .find_one(&Filter::any().eq("type", "grain"))
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(first.id, batch[1].id);
            }

            // ==================================================================
            // Updates
            // ==================================================================

            #[tokio::test]
            async fn test_update_returns_post_update_record() {
                let store = $factory;
                let record = publication(RecordId::new(), "Before", "fruit");
                store.insert(record.clone()).await.unwrap();

                let mut patch = Patch::new();
                patch.insert("message".into(), json!("After"));
                patch.insert("price".into(), json!(9.5));

                let updated = store
                    .update(&Filter::any().with_id(record.id), patch)
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(updated.message, "After");
                assert!((updated.price - 9.5).abs() < f64::EPSILON);
                assert_eq!(updated.kind, "fruit");
                assert!(updated.updated_at >= record.updated_at);

                let fetched = store.get(&record.id).await.unwrap().unwrap();
                assert_eq!(fetched.message, "After");
            }

            #[tokio::test]
            async fn test_update_cannot_change_id() {
                let store = $factory;
                let record = publication(RecordId::new(), "Pinned", "fruit");
                store.insert(record.clone()).await.unwrap();

                let mut patch = Patch::new();
                patch.insert("id".into(), json!(RecordId::new().to_string()));
                patch.insert("message".into(), json!("Still pinned"));

                let updated = store
                    .update(&Filter::any().with_id(record.id), patch)
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(updated.id, record.id);
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let store = $factory;
                let mut patch = Patch::new();
                patch.insert("message".into(), json!("Ghost"));

                let result = store
                    .update(&Filter::any().with_id(RecordId::new()), patch)
                    .await
                    .unwrap();
                assert!(result.is_none());
            }

            // ==================================================================
            // Soft delete
            // ==================================================================

            #[tokio::test]
            async fn test_soft_delete_keeps_record_readable_by_id() {
                let store = $factory;
                let record = publication(RecordId::new(), "Going away", "fruit");
                store.insert(record.clone()).await.unwrap();

                let deleted = store.soft_delete(&record.id).await.unwrap().unwrap();
                assert!(!deleted.is_live());

                let fetched = store.get(&record.id).await.unwrap().unwrap();
                assert!(fetched.lifecycle().deleted_at().is_some());
            }

            #[tokio::test]
            async fn test_soft_delete_twice_keeps_first_timestamp() {
                let store = $factory;
                let record = publication(RecordId::new(), "Once only", "fruit");
                store.insert(record.clone()).await.unwrap();

                let first = store.soft_delete(&record.id).await.unwrap().unwrap();
                let stamp = first.lifecycle().deleted_at();

                assert!(store.soft_delete(&record.id).await.unwrap().is_none());
                assert!(store.soft_delete(&RecordId::new()).await.unwrap().is_none());

                let fetched = store.get(&record.id).await.unwrap().unwrap();
                assert_eq!(fetched.lifecycle().deleted_at(), stamp);
            }

            // ==================================================================
            // Concurrency
            // ==================================================================

            #[tokio::test]
            async fn test_concurrent_inserts() {
                let store = $factory;
                let mut handles = Vec::new();

                for record in sample_batch(10) {
                    let store = store.clone();
                    handles.push(tokio::spawn(async move { store.insert(record).await }));
                }
                for handle in handles {
                    handle.await.unwrap().unwrap();
                }

                assert_eq!(store.count(&Filter::any()).await.unwrap(), 10);
            }
        }
    };
}
