//! Explicit store handle.
//!
//! A `Store` owns one SQLite connection, opened lazily on first access and
//! closed idempotently. It is shared by cloning an `Arc<Store>` into the
//! repositories instead of living in a global.

use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use tracing;

use super::notify::{ChangeNotifier, Table};
use super::sqlite::open_database;
use super::DatabaseError;
use crate::config::StoreConfig;

#[derive(Debug)]
pub struct Store {
    config: StoreConfig,
    conn: Mutex<Option<Connection>>,
    notifier: ChangeNotifier,
}

impl Store {
    /// Create a handle without touching the disk; the store opens on first use.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            conn: Mutex::new(None),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Create a handle and open the store immediately.
    pub fn open(config: StoreConfig) -> Result<Self, DatabaseError> {
        let store = Self::new(config);
        store.with_connection(|_| Ok::<(), DatabaseError>(()))?;
        Ok(store)
    }

    /// In-memory store (for testing and previews).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::open(StoreConfig::in_memory())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn is_open(&self) -> bool {
        self.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Run a read against the open connection, opening it if needed.
    pub fn with_connection<T, E>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        let mut guard = self.lock()?;
        let conn = Self::ensure_open(&mut guard, &self.config)?;
        f(&*conn)
    }

    /// Run `f` inside one transaction. On success the transaction commits
    /// and a change event is published for each table in `touched`; on
    /// error it rolls back and nothing is published.
    pub fn write<T, E>(
        &self,
        touched: &[Table],
        f: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        let out = {
            let mut guard = self.lock()?;
            let conn = Self::ensure_open(&mut guard, &self.config)?;
            let tx = conn.transaction().map_err(DatabaseError::from)?;
            let out = f(&*tx)?;
            tx.commit().map_err(DatabaseError::from)?;
            out
        };
        for table in touched {
            self.notifier.publish(*table);
        }
        Ok(out)
    }

    /// Close the connection. Closing an already closed store is a no-op.
    pub fn close(&self) -> Result<(), DatabaseError> {
        let mut guard = self.lock()?;
        if let Some(conn) = guard.take() {
            conn.close().map_err(|(_, e)| DatabaseError::Sqlite(e))?;
            tracing::info!(location = ?self.config.location, "Store closed");
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    fn ensure_open<'a>(
        slot: &'a mut Option<Connection>,
        config: &StoreConfig,
    ) -> Result<&'a mut Connection, DatabaseError> {
        let conn = match slot.take() {
            Some(conn) => conn,
            None => {
                let conn = open_database(config)?;
                tracing::info!(
                    location = ?config.location,
                    schema_version = config.schema_version,
                    "Store opened"
                );
                conn
            }
        };
        Ok(slot.insert(conn))
    }
}
