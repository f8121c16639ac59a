mod pool;
pub mod stock;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

use std::{
    fmt::{Display, Formatter},
    path::Path,
};

use anyhow::Context;
use libsql::params::IntoParams;

use shared_lib::structs::DatabaseConfig;

pub use crate::pool::{
    ConnectionPool, PooledConnection, DEFAULT_BUSY_TIMEOUT, DEFAULT_POOL_SIZE,
};

pub enum DBTable {
    Products,
}

impl Display for DBTable {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            DBTable::Products => write!(f, "products"),
        }
    }
}

/// Owns the connection pool. Built once at startup and handed to the web
/// layer as state.
pub struct DbService {
    pool: ConnectionPool,
}

impl DbService {
    pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let service = match config {
            DatabaseConfig::Local { path } => Self::open_local(path).await,
            DatabaseConfig::Remote { url, auth_token } => {
                libsql::Builder::new_remote(url.clone(), auth_token.clone())
                    .build()
                    .await
                    .map(Self::from_database)
                    .map_err(anyhow::Error::from)
            }
        }
        .with_context(|| format!("Failed to create database for {config}"))?;

        tracing::debug!("Initialized {}", config);

        Ok(service)
    }

    // local files take one writer at a time, concurrent updates wait on the lock
    pub async fn open_local(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let db = libsql::Builder::new_local(path.as_ref())
            .build()
            .await
            .context("Failed to create local database")?;
        Ok(DbService {
            pool: ConnectionPool::new(db, DEFAULT_POOL_SIZE)
                .with_busy_timeout(DEFAULT_BUSY_TIMEOUT),
        })
    }

    pub fn from_database(db: libsql::Database) -> Self {
        DbService {
            pool: ConnectionPool::new(db, DEFAULT_POOL_SIZE),
        }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub async fn init_tables(&self) -> anyhow::Result<()> {
        let conn = self.pool.acquire().await?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS products (sku TEXT PRIMARY KEY NOT NULL, stock INTEGER NOT NULL DEFAULT 0)",
            libsql::params!(),
        )
        .await
        .with_context(|| format!("Failed to create table {}", DBTable::Products))?;

        Ok(())
    }

    // execute the statement and return the number of rows affected
    pub async fn execute(
        &self,
        statement: &str,
        params: impl IntoParams,
        table: DBTable,
    ) -> anyhow::Result<u64> {
        let conn = self.pool.acquire().await?;
        let affected = conn
            .execute(statement, params)
            .await
            .with_context(|| format!("Failed to write to {table}"))?;

        tracing::trace!("{} row(s) written to {}", affected, table);

        Ok(affected)
    }

    /// Single server-side decrement, so concurrent orders for the same sku
    /// never lose a write. There is no floor, stock may go negative.
    pub async fn decrement_stock(&self, sku: &str, quantity: u32) -> anyhow::Result<u64> {
        self.execute(
            "UPDATE products SET stock = stock - ? WHERE sku = ?",
            libsql::params![i64::from(quantity), sku],
            DBTable::Products,
        )
        .await
    }

    pub async fn get_stock(&self, sku: &str) -> anyhow::Result<Option<i64>> {
        let conn = self.pool.acquire().await?;
        let mut rows = conn
            .query(
                "SELECT stock FROM products WHERE sku = ?",
                libsql::params![sku],
            )
            .await
            .context("Failed to get data from database")?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<i64>(0)?)),
            None => Ok(None),
        }
    }
}
