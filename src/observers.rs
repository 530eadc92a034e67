use crate::events::CatalogEvent;

/// Trait for catalog activity observation
pub trait CatalogObserver {
    /// Called after the catalog applied `event`
    fn on_event(&self, event: &CatalogEvent);
}

/// Writes every event to the `log` facade
///
/// Loans, returns and reassignments are logged at `info`, deferrals and
/// dropped requests at `warn`, registrations at `debug`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActivityLogger;

impl CatalogObserver for ActivityLogger {
    fn on_event(&self, event: &CatalogEvent) {
        match event {
            CatalogEvent::Loaned { .. }
            | CatalogEvent::Returned { .. }
            | CatalogEvent::Reassigned { .. }
            | CatalogEvent::PatronRemoved { .. } => log::info!("{event}"),
            CatalogEvent::Deferred { .. } | CatalogEvent::RequestDropped { .. } => {
                log::warn!("{event}");
            }
            CatalogEvent::BookRegistered { .. } | CatalogEvent::PatronRegistered { .. } => {
                log::debug!("{event}");
            }
        }
    }
}
