use std::{
    ops::Deref,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
    time::Duration,
};

use anyhow::Context;
use tokio::sync::{Semaphore, SemaphorePermit};

pub const DEFAULT_POOL_SIZE: usize = 10;
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounded set of libsql connections. Callers beyond `max_size` wait for a
/// connection to be handed back.
pub struct ConnectionPool {
    db: libsql::Database,
    idle: Mutex<Vec<libsql::Connection>>,
    permits: Semaphore,
    max_size: usize,
    checkouts: AtomicU64,
    busy_timeout: Option<Duration>,
}

impl ConnectionPool {
    pub fn new(db: libsql::Database, max_size: usize) -> Self {
        let max_size = max_size.max(1);
        ConnectionPool {
            db,
            idle: Mutex::new(Vec::with_capacity(max_size)),
            permits: Semaphore::new(max_size),
            max_size,
            checkouts: AtomicU64::new(0),
            busy_timeout: None,
        }
    }

    /// Local sqlite files only allow one writer at a time. With a busy
    /// timeout a connection waits for the lock instead of failing with
    /// `database is locked`.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    pub async fn acquire(&self) -> anyhow::Result<PooledConnection<'_>> {
        let permit = self
            .permits
            .acquire()
            .await
            .context("Connection pool is closed")?;

        let conn = match self.take_idle() {
            Some(conn) => conn,
            None => self.open_connection().await?,
        };

        self.checkouts.fetch_add(1, Ordering::Relaxed);

        Ok(PooledConnection {
            conn,
            pool: self,
            _permit: permit,
        })
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Connections currently handed out.
    pub fn checked_out(&self) -> usize {
        self.max_size - self.permits.available_permits()
    }

    /// Total number of successful `acquire` calls since the pool was built.
    pub fn total_checkouts(&self) -> u64 {
        self.checkouts.load(Ordering::Relaxed)
    }

    async fn open_connection(&self) -> anyhow::Result<libsql::Connection> {
        tracing::trace!("Opening new db connection");
        let conn = self.db.connect().context("Failed to connect to db")?;

        if let Some(timeout) = self.busy_timeout {
            conn.query(
                &format!("PRAGMA busy_timeout = {}", timeout.as_millis()),
                libsql::params!(),
            )
            .await
            .context("Failed to set busy timeout on db connection")?;
        }

        Ok(conn)
    }

    fn take_idle(&self) -> Option<libsql::Connection> {
        self.idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop()
    }

    fn give_back(&self, conn: libsql::Connection) {
        self.idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(conn);
    }
}

/// Returned to the pool on drop, whichever way the caller exits.
pub struct PooledConnection<'a> {
    conn: libsql::Connection,
    pool: &'a ConnectionPool,
    _permit: SemaphorePermit<'a>,
}

impl Deref for PooledConnection<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        // libsql connections are handles, the clone shares the same session
        self.pool.give_back(self.conn.clone());
    }
}
