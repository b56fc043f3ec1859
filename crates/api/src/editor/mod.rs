//! The editor facade: the single writer over the assignment store.
//!
//! Every operation runs one store mutation. When the mutation produced a
//! [`StateChange`], the publish step follows before the call returns:
//!
//! 1. persist the state the change touched,
//! 2. project the selected event and publish it to the sink,
//! 3. broadcast a [`DisplayEvent`] on the bus.
//!
//! Persistence failures are logged and never block the edit. Photo files are
//! different: the file a reference points at is deleted before the reference
//! moves, and a failed delete aborts the edit with the old reference intact.

pub mod console;

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use vox_core::assignments::{AssignmentStore, ChangeKind, StateChange};
use vox_core::error::CoreError;
use vox_core::publish::PublishSink;
use vox_core::roster::{filter_team_members, PlanTeamMember, RosterPlan, TeamMember};
use vox_core::types::{EventId, PositionId, Timestamp};
use vox_events::{DisplayEvent, EventBus};
use vox_core::assignments::normalize_person_name;
use vox_storage::images::detect_extension;
use vox_storage::{ImageStore, StateStore, StorageError};

/// Errors surfaced by editor operations that can fail.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A roster export: upcoming plans plus the team scheduled on them.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterImport {
    pub plans: Vec<RosterPlan>,
    #[serde(default)]
    pub members: Vec<PlanTeamMember>,
    /// Only list members of this team, when set.
    #[serde(default)]
    pub team_id: Option<String>,
}

pub struct Editor {
    store: AssignmentStore,
    sink: Arc<PublishSink>,
    state: StateStore,
    images: Arc<ImageStore>,
    bus: Option<Arc<EventBus>>,
}

impl Editor {
    /// Load persisted state, fill in defaults and publish the selected event.
    pub fn open(
        state: StateStore,
        images: Arc<ImageStore>,
        sink: Arc<PublishSink>,
        bus: Option<Arc<EventBus>>,
    ) -> Result<Self, StorageError> {
        let store = AssignmentStore::from_parts(
            state.load_positions()?,
            state.load_events()?,
            state.load_person_photos()?,
        );

        let mut editor = Self {
            store,
            sink,
            state,
            images,
            bus,
        };
        editor.bootstrap(Utc::now());
        Ok(editor)
    }

    fn bootstrap(&mut self, now: Timestamp) {
        let change = self.store.bootstrap(now);
        if let Err(e) = self.persist_all() {
            tracing::warn!(error = %e, "Failed to persist initial editor state");
        }
        if let Some(change) = change {
            self.commit(change);
        }
        tracing::info!(
            positions = self.store.positions().len(),
            events = self.store.events().len(),
            selected = ?self.store.selected_event_id(),
            "Editor ready"
        );
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &AssignmentStore {
        &self.store
    }

    // -- Positions ----------------------------------------------------------

    /// Append a position and return its number.
    pub fn add_position(&mut self) -> u32 {
        let change = self.store.add_position();
        let number = match change.kind {
            ChangeKind::PositionAdded { number, .. } => number,
            _ => unreachable!("add_position always reports PositionAdded"),
        };
        self.commit(change);
        number
    }

    /// Remove a position, deleting its reference photo first.
    pub fn remove_position(&mut self, id: PositionId) -> Result<bool, EditorError> {
        let Some(position) = self.store.position(id) else {
            return Ok(false);
        };
        self.delete_photo(position.angle_photo_filename.as_deref())?;
        let change = self.store.remove_position(id);
        Ok(self.apply(change))
    }

    pub fn set_label(&mut self, id: PositionId, label: Option<String>) -> bool {
        let change = self.store.set_label(id, label);
        self.apply(change)
    }

    /// Store `bytes` as the position's reference photo, replacing any
    /// previous one. Returns `Ok(false)` for an unknown position without
    /// touching image storage.
    ///
    /// The previous photo is deleted before the new one is stored. If that
    /// delete fails the edit is aborted and the old reference stays.
    pub fn set_position_photo(
        &mut self,
        id: PositionId,
        bytes: &[u8],
    ) -> Result<bool, EditorError> {
        let Some(position) = self.store.position(id) else {
            return Ok(false);
        };
        let previous = position.angle_photo_filename.clone();
        detect_extension(bytes)?;
        self.delete_photo(previous.as_deref())?;

        let filename = match self.images.save(bytes) {
            Ok(filename) => filename,
            Err(e) => {
                // The old file is already gone.
                if previous.is_some() {
                    let change = self.store.clear_position_photo(id);
                    self.apply(change);
                }
                return Err(e.into());
            }
        };
        let change = self.store.set_position_photo(id, filename);
        Ok(self.apply(change))
    }

    pub fn clear_position_photo(&mut self, id: PositionId) -> Result<bool, EditorError> {
        let Some(position) = self.store.position(id) else {
            return Ok(false);
        };
        self.delete_photo(position.angle_photo_filename.as_deref())?;
        let change = self.store.clear_position_photo(id);
        Ok(self.apply(change))
    }

    // -- Assignments --------------------------------------------------------

    pub fn assign(
        &mut self,
        id: PositionId,
        person_name: &str,
        roster_id: Option<String>,
    ) -> bool {
        let change = self.store.assign(id, person_name, roster_id);
        self.apply(change)
    }

    pub fn unassign(&mut self, id: PositionId) -> bool {
        let change = self.store.unassign(id);
        self.apply(change)
    }

    // -- Person photos ------------------------------------------------------

    /// Store `bytes` as the personal photo of `person_name` and return the
    /// stored file name. Replacement deletes the previous file first, like
    /// [`Editor::set_position_photo`].
    pub fn set_person_photo(
        &mut self,
        person_name: &str,
        bytes: &[u8],
    ) -> Result<String, EditorError> {
        let person_name = normalize_person_name(person_name)
            .ok_or_else(|| CoreError::Validation("Person name must not be empty".into()))?;
        let previous = self.store.person_photo(person_name).map(str::to_string);
        detect_extension(bytes)?;
        self.delete_photo(previous.as_deref())?;

        let filename = match self.images.save(bytes) {
            Ok(filename) => filename,
            Err(e) => {
                if previous.is_some() {
                    let change = self.store.remove_person_photo(person_name);
                    self.commit(change);
                }
                return Err(e.into());
            }
        };
        let change = self.store.set_person_photo(person_name, filename.clone())?;
        self.commit(change);
        Ok(filename)
    }

    pub fn remove_person_photo(&mut self, person_name: &str) -> Result<(), EditorError> {
        self.delete_photo(self.store.person_photo(person_name))?;
        let change = self.store.remove_person_photo(person_name);
        self.commit(change);
        Ok(())
    }

    // -- Events -------------------------------------------------------------

    pub fn select_event(&mut self, id: EventId) -> bool {
        let change = self.store.select_event(id);
        self.apply(change)
    }

    pub fn add_event(
        &mut self,
        name: &str,
        service_date: Timestamp,
    ) -> Result<EventId, EditorError> {
        let (id, change) = self.store.add_event(name, service_date)?;
        self.commit(change);
        Ok(id)
    }

    pub fn rename_event(&mut self, id: EventId, name: &str) -> Result<(), EditorError> {
        let change = self.store.rename_event(id, name)?;
        self.commit(change);
        Ok(())
    }

    /// Merge the roster's plans into the event list and return the team
    /// members available for assignment.
    pub fn import_roster(&mut self, import: &RosterImport) -> Vec<TeamMember> {
        let change = self.store.import_plans(&import.plans);
        self.commit(change);
        tracing::info!(plans = import.plans.len(), "Imported roster plans");

        filter_team_members(
            &import.members,
            import.team_id.as_deref(),
            self.store.person_photos(),
        )
    }

    // -- Publish step -------------------------------------------------------

    fn apply(&mut self, change: Option<StateChange>) -> bool {
        match change {
            Some(change) => {
                self.commit(change);
                true
            }
            None => {
                tracing::debug!("Edit targeted an unknown id, nothing changed");
                false
            }
        }
    }

    fn commit(&mut self, change: StateChange) {
        if let Err(e) = self.persist(&change.kind) {
            tracing::warn!(
                change = change.kind.name(),
                error = %e,
                "Failed to persist editor state"
            );
        }

        let snapshot = self.store.snapshot();
        let entries = snapshot.as_ref().map(|s| s.vocalists.len());
        if let Some(snapshot) = snapshot {
            if let Err(e) = self.state.save_published(&snapshot) {
                tracing::warn!(error = %e, "Failed to persist published snapshot");
            }
            self.sink.publish(snapshot);
        }

        tracing::debug!(change = change.kind.name(), ?entries, "Published display snapshot");

        if let Some(bus) = &self.bus {
            bus.publish(
                DisplayEvent::from_change(&change)
                    .with_event(self.store.selected_event_id())
                    .with_published_entries(entries),
            );
        }
    }

    fn delete_photo(&self, photo: Option<&str>) -> Result<(), StorageError> {
        match photo {
            Some(photo) => self.images.delete(photo),
            None => Ok(()),
        }
    }

    fn persist(&self, kind: &ChangeKind) -> Result<(), StorageError> {
        if kind.touches_positions() {
            self.state.save_positions(self.store.positions())?;
        }

        match kind {
            ChangeKind::PersonPhotoChanged { .. } => {
                self.state.save_person_photos(self.store.person_photos())?;
            }
            ChangeKind::EventsChanged => {
                for event in self.store.events() {
                    self.state.save_event(event)?;
                }
            }
            _ => {}
        }

        if let Some(event) = self.store.selected_event() {
            self.state.save_event(event)?;
        }
        Ok(())
    }

    fn persist_all(&self) -> Result<(), StorageError> {
        self.state.save_positions(self.store.positions())?;
        self.state.save_person_photos(self.store.person_photos())?;
        for event in self.store.events() {
            self.state.save_event(event)?;
        }
        Ok(())
    }
}
