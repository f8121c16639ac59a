//! Helpers for tests that need a seeded products table.

use crate::{DBTable, DbService};

pub async fn seed_products(db: &DbService, products: &[(&str, i64)]) -> anyhow::Result<()> {
    for (sku, stock) in products {
        db.execute(
            "INSERT INTO products (sku, stock) VALUES (?, ?)",
            libsql::params![*sku, *stock],
            DBTable::Products,
        )
        .await?;
    }
    Ok(())
}

/// Fresh local db in `dir` with the products table created and seeded.
pub async fn seeded_db(dir: &tempfile::TempDir, products: &[(&str, i64)]) -> DbService {
    let db = DbService::open_local(dir.path().join("stock.db"))
        .await
        .expect("Failed to open test db");
    db.init_tables().await.expect("Failed to create tables");
    seed_products(&db, products)
        .await
        .expect("Failed to seed products");
    db
}

/// Makes any stock update for `sku` fail inside the database.
pub async fn reject_updates_for(db: &DbService, sku: &str) {
    let statement = format!(
        "CREATE TRIGGER reject_{sku} BEFORE UPDATE ON products WHEN OLD.sku = '{sku}' \
        BEGIN SELECT RAISE(ABORT, 'stock update rejected'); END"
    );
    db.execute(&statement, libsql::params!(), DBTable::Products)
        .await
        .expect("Failed to install trigger");
}
