//! Table-level change events published after each committed write.

use tokio::sync::broadcast;

use crate::config::SUBSCRIPTION_BUFFER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Patients,
    Visits,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Patients => "patients",
            Self::Visits => "visits",
        }
    }
}

/// Fan-out of change events. Each live subscription owns one receiver;
/// dropping the receiver unregisters it.
#[derive(Debug)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<Table>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(SUBSCRIPTION_BUFFER);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Table> {
        self.tx.subscribe()
    }

    pub fn publish(&self, table: Table) {
        // Err only means nobody is listening.
        let _ = self.tx.send(table);
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_without_listeners_is_silent() {
        let notifier = ChangeNotifier::new();
        notifier.publish(Table::Patients);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[test]
    fn dropping_receiver_releases_listener() {
        let notifier = ChangeNotifier::new();
        let rx = notifier.subscribe();
        assert_eq!(notifier.listener_count(), 1);
        drop(rx);
        assert_eq!(notifier.listener_count(), 0);
    }

    #[tokio::test]
    async fn receivers_see_published_tables() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();
        notifier.publish(Table::Visits);
        assert_eq!(rx.recv().await.unwrap(), Table::Visits);
    }
}
