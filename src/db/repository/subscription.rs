//! Live query results.
//!
//! A subscription yields the current result set first, then a fresh full
//! result set after every committed write to its table. It never ends on
//! its own; dropping it drops the broadcast receiver and releases the
//! listener.

use std::sync::Arc;

use futures_util::stream::{self, Stream};
use rusqlite::Connection;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

use super::{run_blocking, RepositoryError};
use crate::db::{DatabaseError, Store, Table};

type Query<T> = Arc<dyn Fn(&Connection) -> Result<T, DatabaseError> + Send + Sync>;

pub struct Subscription<T> {
    store: Arc<Store>,
    table: Table,
    query: Query<T>,
    events: broadcast::Receiver<Table>,
    primed: bool,
}

impl<T: Send + 'static> Subscription<T> {
    /// The receiver is registered before the first snapshot is read, so a
    /// write racing the initial query is never missed.
    pub(crate) fn new<Q>(store: Arc<Store>, table: Table, query: Q) -> Self
    where
        Q: Fn(&Connection) -> Result<T, DatabaseError> + Send + Sync + 'static,
    {
        let events = store.notifier().subscribe();
        Self {
            store,
            table,
            query: Arc::new(query),
            events,
            primed: false,
        }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Wait for the next snapshot. The first call returns immediately.
    pub async fn next(&mut self) -> Result<T, RepositoryError> {
        if self.primed {
            self.wait_for_change().await?;
        } else {
            self.drain_pending();
        }
        self.primed = true;
        self.snapshot().await
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<T, RepositoryError>> {
        stream::unfold(self, |mut sub| async move {
            let item = sub.next().await;
            Some((item, sub))
        })
    }

    async fn wait_for_change(&mut self) -> Result<(), RepositoryError> {
        loop {
            match self.events.recv().await {
                Ok(table) if table == self.table => break,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(table = self.table.as_str(), skipped, "Subscription lagged");
                    break;
                }
                Err(RecvError::Closed) => return Err(RepositoryError::StoreUnavailable),
            }
        }
        self.drain_pending();
        Ok(())
    }

    /// Events already queued are covered by the snapshot about to be read.
    fn drain_pending(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    async fn snapshot(&self) -> Result<T, RepositoryError> {
        let store = Arc::clone(&self.store);
        let query = Arc::clone(&self.query);
        let table = self.table;
        run_blocking(move || {
            let result = store.with_connection(|conn| query(conn).map_err(RepositoryError::from));
            tracing::debug!(table = table.as_str(), "Subscription refreshed");
            result
        })
        .await
    }
}
