use shared_lib::structs::StockUpdateOutcome;

use crate::DbService;

/// Decrements stock for one sku. Database errors are logged and reported as
/// [`StockUpdateOutcome::Failed`], never returned to the caller.
pub async fn update_stock(db: &DbService, sku: &str, quantity: u32) -> StockUpdateOutcome {
    match db.decrement_stock(sku, quantity).await {
        Ok(0) => {
            tracing::warn!("No product found with SKU: {}", sku);
            StockUpdateOutcome::NotFound
        }
        Ok(_) => {
            tracing::info!("Updated stock for {}, reduced by {}", sku, quantity);
            StockUpdateOutcome::Updated
        }
        Err(error) => {
            tracing::error!("Database update error for {}: {:?}", sku, error);
            StockUpdateOutcome::Failed(format!("{error:#}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{test_support::seeded_db, DBTable};

    #[tokio::test]
    async fn updates_existing_product() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir, &[("A1", 10)]).await;

        assert_eq!(update_stock(&db, "A1", 2).await, StockUpdateOutcome::Updated);
        assert_eq!(db.get_stock("A1").await.unwrap(), Some(8));
    }

    #[tokio::test]
    async fn unknown_sku_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir, &[("A1", 10)]).await;

        assert_eq!(
            update_stock(&db, "NOPE", 1).await,
            StockUpdateOutcome::NotFound
        );
        assert_eq!(db.get_stock("A1").await.unwrap(), Some(10));
    }

    #[tokio::test]
    async fn database_error_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir, &[("A1", 10)]).await;
        db.execute("DROP TABLE products", libsql::params!(), DBTable::Products)
            .await
            .unwrap();

        let outcome = update_stock(&db, "A1", 1).await;

        assert!(matches!(outcome, StockUpdateOutcome::Failed(_)));
        assert_eq!(db.pool().checked_out(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_decrements_to_one_sku_all_land() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(seeded_db(&dir, &[("A1", 1000)]).await);

        let tasks: Vec<_> = (0..10)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move {
                    let mut outcomes = Vec::with_capacity(20);
                    for _ in 0..20 {
                        outcomes.push(update_stock(&db, "A1", 1).await);
                    }
                    outcomes
                })
            })
            .collect();

        for task in tasks {
            let outcomes = task.await.unwrap();
            assert!(
                outcomes
                    .iter()
                    .all(|outcome| *outcome == StockUpdateOutcome::Updated),
                "{outcomes:?}"
            );
        }

        assert_eq!(db.get_stock("A1").await.unwrap(), Some(800));
        assert_eq!(db.pool().checked_out(), 0);
    }
}
