// Asset Tracker - the command/event boundary the front ends talk to
//
// Commands come in from a UI (category clicked, form field typed, save
// pressed, entry deleted). The tracker routes them to the session, catalog
// and view, then tells every subscriber what changed.

use crate::catalog::{AssetCatalog, MutationReport};
use crate::entities::{AssetGroup, AssetId, AssetRecord, AssetType};
use crate::error::{CatalogError, TrackerError};
use crate::persistence::PersistenceGateway;
use crate::session::{CommitOutcome, Draft, DraftField, EditSession, SessionMode};
use crate::view::{CatalogView, CategoryIndicator, ViewState};
use tracing::{debug, info};

/// What subscribers are told
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// Catalog contents or the selection changed
    CatalogChanged(ViewState),

    /// The edit session moved or its draft changed
    EditSessionChanged {
        mode: SessionMode,
        can_commit: bool,
        draft: Draft,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&TrackerEvent) + Send>;

pub struct AssetTracker<G: PersistenceGateway> {
    catalog: AssetCatalog<G>,
    view: CatalogView,
    session: EditSession,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<G: PersistenceGateway> AssetTracker<G> {
    /// Load the catalog from `gateway` and show `capacity` entry slots
    pub fn open(gateway: G, capacity: usize) -> Self {
        Self::with_catalog(AssetCatalog::load(gateway), capacity)
    }

    pub fn with_catalog(catalog: AssetCatalog<G>, capacity: usize) -> Self {
        AssetTracker {
            catalog,
            view: CatalogView::new(capacity),
            session: EditSession::new(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    // ========================================================================
    // OBSERVERS
    // ========================================================================

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&TrackerEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(callback)));
        id
    }

    /// Returns false when `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn emit(&mut self, event: TrackerEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
    }

    fn catalog_changed(&mut self) {
        self.view.reconcile(&self.catalog);
        let state = self.view.compute(&self.catalog);
        debug!(state = state.name(), "catalog view recomputed");
        self.emit(TrackerEvent::CatalogChanged(state));
    }

    fn session_changed(&mut self) {
        let event = TrackerEvent::EditSessionChanged {
            mode: self.session.mode(),
            can_commit: self.session.can_commit(),
            draft: self.session.draft().clone(),
        };
        self.emit(event);
    }

    // ========================================================================
    // LIST SCREEN COMMANDS
    // ========================================================================

    pub fn select_category(&mut self, asset_type: AssetType) -> ViewState {
        self.view.select_category(asset_type);
        self.catalog_changed();
        self.view_state()
    }

    pub fn select_group(&mut self, group: AssetGroup) {
        self.view.select_group(group);
    }

    /// Delete an entry straight from the list
    pub fn delete_record(&mut self, id: AssetId) -> Result<MutationReport, TrackerError> {
        let report = self.catalog.remove(id)?;
        self.catalog_changed();
        Ok(report)
    }

    /// Add a complete record without going through the form (CLI, import, API)
    pub fn add_record(&mut self, record: AssetRecord) -> Result<MutationReport, TrackerError> {
        let report = self.catalog.add(record)?;
        self.catalog_changed();
        Ok(report)
    }

    /// Replace a record without going through the form (API)
    pub fn replace_record(
        &mut self,
        id: AssetId,
        record: AssetRecord,
    ) -> Result<MutationReport, TrackerError> {
        let report = self.catalog.update(id, record)?;
        self.catalog_changed();
        Ok(report)
    }

    // ========================================================================
    // FORM COMMANDS
    // ========================================================================

    pub fn request_create(&mut self) {
        self.session.open_for_create();
        self.session_changed();
    }

    pub fn request_view(&mut self, id: AssetId) -> Result<(), TrackerError> {
        let record = self.catalog.get(id).ok_or(CatalogError::NotFound(id))?;
        self.session.open_for_view(record);
        self.session_changed();
        Ok(())
    }

    pub fn request_edit(&mut self) -> Result<(), TrackerError> {
        self.session.enter_edit()?;
        self.session_changed();
        Ok(())
    }

    /// Returns the new `can_commit`
    pub fn set_field(&mut self, field: DraftField, text: &str) -> Result<bool, TrackerError> {
        let can_commit = self.session.set_field(field, text)?;
        self.session_changed();
        Ok(can_commit)
    }

    /// Returns the new `can_commit`
    pub fn select_draft_type(&mut self, asset_type: AssetType) -> Result<bool, TrackerError> {
        let can_commit = self.session.select_type(asset_type)?;
        self.session_changed();
        Ok(can_commit)
    }

    /// Commit the form into the catalog
    ///
    /// The session closes once the draft is accepted, even if the catalog
    /// then reports the edited record as gone.
    pub fn commit_edit(&mut self) -> Result<MutationReport, TrackerError> {
        let outcome = self.session.commit()?;
        self.session_changed();

        let report = match outcome {
            CommitOutcome::Created(record) => self.catalog.add(record),
            CommitOutcome::Updated { original, record } => self.catalog.update(original, record),
        }?;

        info!(id = %report.id(), persisted = report.is_persisted(), "edit committed");
        self.catalog_changed();
        Ok(report)
    }

    pub fn cancel_edit(&mut self) {
        self.session.cancel();
        self.session_changed();
    }

    // ========================================================================
    // STATE
    // ========================================================================

    pub fn view_state(&self) -> ViewState {
        self.view.compute(&self.catalog)
    }

    pub fn indicators(&self) -> Vec<CategoryIndicator> {
        self.view.indicators(&self.catalog)
    }

    pub fn catalog(&self) -> &AssetCatalog<G> {
        &self.catalog
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryGateway;
    use std::sync::{Arc, Mutex};

    fn tracker() -> AssetTracker<MemoryGateway> {
        AssetTracker::open(MemoryGateway::new(), 8)
    }

    fn recorder(tracker: &mut AssetTracker<MemoryGateway>) -> Arc<Mutex<Vec<TrackerEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        tracker.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        events
    }

    fn create(tracker: &mut AssetTracker<MemoryGateway>, asset_type: AssetType, name: &str) -> AssetId {
        tracker.request_create();
        tracker.select_draft_type(asset_type).unwrap();
        tracker.set_field(DraftField::Name, name).unwrap();
        tracker.set_field(DraftField::Description, "something").unwrap();
        tracker.set_field(DraftField::Value, "10").unwrap();
        tracker.commit_edit().unwrap().id()
    }

    #[test]
    fn test_commit_emits_session_then_catalog_events() {
        let mut tracker = tracker();
        tracker.select_category(AssetType::Hobby);
        let events = recorder(&mut tracker);

        create(&mut tracker, AssetType::Hobby, "Kite");

        let events = events.lock().unwrap();
        let last = events.last().unwrap();
        match last {
            TrackerEvent::CatalogChanged(ViewState::ShowingEntries { entries, .. }) => {
                assert_eq!(entries[0].name(), "Kite");
            }
            other => panic!("unexpected last event {:?}", other),
        }
        assert!(events.iter().any(|e| matches!(
            e,
            TrackerEvent::EditSessionChanged { mode: SessionMode::Closed, .. }
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            TrackerEvent::EditSessionChanged { can_commit: true, .. }
        )));
    }

    #[test]
    fn test_unsubscribe_stops_events() {
        let mut tracker = tracker();
        let events = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&events);
        let id = tracker.subscribe(move |_| *sink.lock().unwrap() += 1);

        tracker.select_category(AssetType::Hobby);
        assert!(tracker.unsubscribe(id));
        assert!(!tracker.unsubscribe(id));
        tracker.select_category(AssetType::Furniture);

        assert_eq!(*events.lock().unwrap(), 1);
    }

    #[test]
    fn test_edit_flow_updates_in_place() {
        let mut tracker = tracker();
        let first = create(&mut tracker, AssetType::Hobby, "Kite");
        create(&mut tracker, AssetType::Hobby, "Drone");

        tracker.request_view(first).unwrap();
        tracker.request_edit().unwrap();
        tracker.select_draft_type(AssetType::Furniture).unwrap();
        tracker.set_field(DraftField::Name, "Stool").unwrap();
        let report = tracker.commit_edit().unwrap();

        assert_eq!(report.id(), first);
        let records = tracker.catalog().records();
        assert_eq!(records[0].id(), first);
        assert_eq!(records[0].name(), "Stool");
        assert_eq!(records[1].name(), "Drone");
    }

    #[test]
    fn test_commit_after_concurrent_delete_is_not_found() {
        let mut tracker = tracker();
        let id = create(&mut tracker, AssetType::Hobby, "Kite");
        create(&mut tracker, AssetType::Hobby, "Drone");

        tracker.request_view(id).unwrap();
        tracker.request_edit().unwrap();
        tracker.delete_record(id).unwrap();

        let err = tracker.commit_edit().unwrap_err();
        assert!(matches!(err, TrackerError::Catalog(CatalogError::NotFound(_))));
        assert!(!tracker.session().is_open());
        assert_eq!(tracker.catalog().len(), 1);
    }

    #[test]
    fn test_request_view_unknown_record() {
        let mut tracker = tracker();
        assert!(matches!(
            tracker.request_view(AssetId::new()),
            Err(TrackerError::Catalog(CatalogError::NotFound(_)))
        ));
    }

    #[test]
    fn test_commit_without_session_is_rejected() {
        let mut tracker = tracker();
        assert!(matches!(tracker.commit_edit(), Err(TrackerError::Session(_))));
        assert!(tracker.catalog().is_empty());
    }

    #[test]
    fn test_deleting_last_record_resets_selection() {
        let mut tracker = tracker();
        let id = create(&mut tracker, AssetType::Hobby, "Kite");
        tracker.select_category(AssetType::Hobby);

        tracker.delete_record(id).unwrap();

        assert_eq!(tracker.view_state(), ViewState::Empty);
        assert_eq!(tracker.view().selected_type(), AssetType::None);
    }

    #[test]
    fn test_cancel_has_no_catalog_effect() {
        let mut tracker = tracker();
        tracker.request_create();
        tracker.select_draft_type(AssetType::Hobby).unwrap();
        tracker.cancel_edit();

        assert!(tracker.catalog().is_empty());
        assert_eq!(tracker.catalog().gateway().save_count(), 0);
    }
}
