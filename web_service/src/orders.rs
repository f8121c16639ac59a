use db_service::{stock::update_stock, DbService};
use shared_lib::structs::{LineItemResult, Order, StockUpdateOutcome};

/// Applies every line item in order, one at a time. A failing item does not
/// stop the ones after it.
pub async fn process_order(db: &DbService, order: &Order) -> Vec<LineItemResult> {
    let mut results = Vec::with_capacity(order.line_items.len());

    for item in &order.line_items {
        let outcome = update_stock(db, &item.sku, item.quantity).await;
        results.push(LineItemResult {
            sku: item.sku.clone(),
            quantity: item.quantity,
            outcome,
        });
    }

    results
}

pub fn log_summary(results: &[LineItemResult]) {
    let updated = results
        .iter()
        .filter(|result| result.outcome == StockUpdateOutcome::Updated)
        .count();
    let not_found = results
        .iter()
        .filter(|result| result.outcome == StockUpdateOutcome::NotFound)
        .count();
    let failed = results.len() - updated - not_found;

    if failed > 0 {
        tracing::warn!(
            "Order processed with failures: {} updated, {} not found, {} failed",
            updated,
            not_found,
            failed
        );
    } else {
        tracing::info!(
            "Order processed: {} updated, {} not found",
            updated,
            not_found
        );
    }

    match serde_json::to_string(results) {
        Ok(results) => tracing::debug!("Line item results: {}", results),
        Err(error) => tracing::debug!("Failed to serialize line item results: {:?}", error),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use db_service::test_support::{reject_updates_for, seeded_db};
    use shared_lib::structs::LineItem;

    use super::*;

    fn order(items: &[(&str, u32)]) -> Order {
        Order {
            line_items: items
                .iter()
                .map(|(sku, quantity)| LineItem {
                    sku: sku.to_string(),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn each_item_gets_its_own_connection() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir, &[("A1", 10), ("B2", 10), ("C3", 10)]).await;
        let before = db.pool().total_checkouts();

        let results = process_order(&db, &order(&[("A1", 1), ("B2", 2), ("C3", 3)])).await;

        assert_eq!(results.len(), 3);
        assert!(results
            .iter()
            .all(|result| result.outcome == StockUpdateOutcome::Updated));
        assert_eq!(db.pool().total_checkouts() - before, 3);
        assert_eq!(db.pool().checked_out(), 0);
        assert_eq!(db.get_stock("C3").await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn results_keep_line_item_order() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir, &[("A1", 10)]).await;

        let results = process_order(&db, &order(&[("GHOST", 1), ("A1", 4)])).await;

        assert_eq!(
            results,
            vec![
                LineItemResult {
                    sku: "GHOST".to_string(),
                    quantity: 1,
                    outcome: StockUpdateOutcome::NotFound,
                },
                LineItemResult {
                    sku: "A1".to_string(),
                    quantity: 4,
                    outcome: StockUpdateOutcome::Updated,
                },
            ]
        );
    }

    #[tokio::test]
    async fn failure_does_not_stop_later_items() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir, &[("A1", 10), ("BAD", 10), ("C3", 10)]).await;
        reject_updates_for(&db, "BAD").await;

        let results = process_order(&db, &order(&[("A1", 5), ("BAD", 1), ("C3", 2)])).await;

        assert_eq!(results[0].outcome, StockUpdateOutcome::Updated);
        assert!(matches!(results[1].outcome, StockUpdateOutcome::Failed(_)));
        assert_eq!(results[2].outcome, StockUpdateOutcome::Updated);
        assert_eq!(db.get_stock("A1").await.unwrap(), Some(5));
        assert_eq!(db.get_stock("BAD").await.unwrap(), Some(10));
        assert_eq!(db.get_stock("C3").await.unwrap(), Some(8));
    }

    #[tokio::test]
    async fn empty_order_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(&dir, &[("A1", 10)]).await;
        let before = db.pool().total_checkouts();

        let results = process_order(&db, &order(&[])).await;

        assert!(results.is_empty());
        assert_eq!(db.pool().total_checkouts(), before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_orders_share_the_pool() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(seeded_db(&dir, &[("A1", 1000), ("B2", 1000)]).await);
        let order = Arc::new(order(&[("A1", 1), ("B2", 2)]));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let db = db.clone();
                let order = order.clone();
                tokio::spawn(async move {
                    let mut results = Vec::new();
                    for _ in 0..5 {
                        results.extend(process_order(&db, &order).await);
                    }
                    results
                })
            })
            .collect();

        for task in tasks {
            let results = task.await.unwrap();
            assert_eq!(results.len(), 10);
            assert!(results
                .iter()
                .all(|result| result.outcome == StockUpdateOutcome::Updated));
        }

        assert_eq!(db.get_stock("A1").await.unwrap(), Some(920));
        assert_eq!(db.get_stock("B2").await.unwrap(), Some(840));
        assert_eq!(db.pool().checked_out(), 0);
        assert!(db.pool().total_checkouts() >= 160);
    }
}
