//! The Assignment Store: authoritative in-memory model for the editor.
//!
//! Every mutation either returns a [`StateChange`] describing what happened,
//! or `None` when it targeted an id that does not exist. The store performs
//! no I/O; callers react to the returned change (re-project, publish,
//! persist). Photo files are deleted by the caller before the mutation that
//! releases them.
//!
//! Invariants held after every call:
//!
//! - position numbers are exactly `1..=N` in list order;
//! - a person name is held by at most one assignment of the selected event;
//! - the selected event has an assignment record for every position;
//! - person names are stored trimmed and never blank.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::calendar::{next_sunday, DEFAULT_EVENT_NAME};
use crate::error::CoreError;
use crate::models::{Assignment, EventInstance, Position};
use crate::roster::{self, RosterPlan};
use crate::snapshot::{self, PublishedSnapshot};
use crate::types::{EventId, PositionId, Timestamp};

/// Number of positions created for a brand new setup.
pub const DEFAULT_POSITION_COUNT: u32 = 5;

// ---------------------------------------------------------------------------
// Change notifications
// ---------------------------------------------------------------------------

/// What a mutation changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    PositionAdded { position_id: PositionId, number: u32 },
    PositionRemoved { position_id: PositionId },
    /// Label or reference photo changed.
    PositionUpdated { position_id: PositionId },
    Assigned { position_id: PositionId, operator_name: String },
    Unassigned { position_id: PositionId },
    PersonPhotoChanged { person_name: String },
    EventSelected { event_id: EventId },
    /// Events were created, renamed or re-dated.
    EventsChanged,
}

impl ChangeKind {
    /// Dot-separated name used for logging and the event bus.
    pub fn name(&self) -> &'static str {
        match self {
            ChangeKind::PositionAdded { .. } => "position.added",
            ChangeKind::PositionRemoved { .. } => "position.removed",
            ChangeKind::PositionUpdated { .. } => "position.updated",
            ChangeKind::Assigned { .. } => "assignment.assigned",
            ChangeKind::Unassigned { .. } => "assignment.cleared",
            ChangeKind::PersonPhotoChanged { .. } => "person_photo.changed",
            ChangeKind::EventSelected { .. } => "event.selected",
            ChangeKind::EventsChanged => "events.changed",
        }
    }

    /// Whether the position list must be persisted.
    pub fn touches_positions(&self) -> bool {
        matches!(
            self,
            ChangeKind::PositionAdded { .. }
                | ChangeKind::PositionRemoved { .. }
                | ChangeKind::PositionUpdated { .. }
        )
    }
}

/// Notification returned by every successful store mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateChange {
    pub kind: ChangeKind,
    /// The stored image the mutation stopped referencing.
    pub released_photo: Option<String>,
}

impl StateChange {
    fn new(kind: ChangeKind) -> Self {
        Self {
            kind,
            released_photo: None,
        }
    }

    fn releasing(kind: ChangeKind, photo: Option<String>) -> Self {
        Self {
            kind,
            released_photo: photo,
        }
    }
}

// ---------------------------------------------------------------------------
// AssignmentStore
// ---------------------------------------------------------------------------

/// Positions, event instances, the selected event and the person photo map.
#[derive(Debug, Clone, Default)]
pub struct AssignmentStore {
    positions: Vec<Position>,
    events: Vec<EventInstance>,
    selected_event_id: Option<EventId>,
    person_photos: BTreeMap<String, String>,
}

impl AssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted state. Nothing is selected yet.
    ///
    /// Positions are renumbered in their stored order so a hand-edited file
    /// cannot break the contiguous numbering.
    pub fn from_parts(
        positions: Vec<Position>,
        events: Vec<EventInstance>,
        person_photos: BTreeMap<String, String>,
    ) -> Self {
        let mut store = Self {
            positions,
            events,
            selected_event_id: None,
            person_photos,
        };
        store.positions.sort_by_key(|p| p.number);
        store.renumber();
        store.events.sort_by_key(|e| e.service_date);
        store
    }

    /// Fill in defaults for a fresh setup and select the first event.
    ///
    /// Creates a "This Weekend" event dated the next Sunday when no events
    /// exist, and [`DEFAULT_POSITION_COUNT`] positions when none exist.
    pub fn bootstrap(&mut self, now: Timestamp) -> Option<StateChange> {
        if self.events.is_empty() {
            self.events
                .push(EventInstance::new(DEFAULT_EVENT_NAME, next_sunday(now)));
        }

        if self.positions.is_empty() {
            self.positions = (1..=DEFAULT_POSITION_COUNT).map(Position::new).collect();
        }

        let target = self
            .selected_event_id
            .or_else(|| self.events.first().map(|e| e.id))?;
        self.select_event(target)
    }

    // -- Queries ------------------------------------------------------------

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn position(&self, id: PositionId) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    pub fn position_by_number(&self, number: u32) -> Option<&Position> {
        self.positions.iter().find(|p| p.number == number)
    }

    pub fn events(&self) -> &[EventInstance] {
        &self.events
    }

    pub fn event(&self, id: EventId) -> Option<&EventInstance> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn selected_event_id(&self) -> Option<EventId> {
        self.selected_event_id
    }

    pub fn selected_event(&self) -> Option<&EventInstance> {
        self.selected_event_id.and_then(|id| self.event(id))
    }

    /// Working assignments of the selected event (empty when none selected).
    pub fn working_assignments(&self) -> &[Assignment] {
        self.selected_event()
            .map(|e| e.assignments.as_slice())
            .unwrap_or(&[])
    }

    pub fn assignment_for(&self, position_id: PositionId) -> Option<&Assignment> {
        self.selected_event()
            .and_then(|e| e.assignment_for(position_id))
    }

    pub fn person_photos(&self) -> &BTreeMap<String, String> {
        &self.person_photos
    }

    pub fn person_photo(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.person_photos.get(name).map(String::as_str)
    }

    /// Project the selected event, or `None` when nothing is selected.
    pub fn snapshot(&self) -> Option<PublishedSnapshot> {
        self.selected_event()
            .map(|event| snapshot::project(event, &self.positions, &self.person_photos))
    }

    // -- Positions ----------------------------------------------------------

    /// Append a position numbered one past the current maximum.
    pub fn add_position(&mut self) -> StateChange {
        let next_number = self.positions.iter().map(|p| p.number).max().unwrap_or(0) + 1;
        let position = Position::new(next_number);
        let position_id = position.id;
        self.positions.push(position);

        if let Some(working) = self.working_mut() {
            working.push(Assignment::empty(position_id));
        }

        StateChange::new(ChangeKind::PositionAdded {
            position_id,
            number: next_number,
        })
    }

    /// Remove a position and its assignment, then renumber the rest.
    pub fn remove_position(&mut self, id: PositionId) -> Option<StateChange> {
        let index = self.positions.iter().position(|p| p.id == id)?;
        let removed = self.positions.remove(index);
        self.renumber();

        if let Some(working) = self.working_mut() {
            working.retain(|a| a.position_id != id);
        }

        Some(StateChange::releasing(
            ChangeKind::PositionRemoved { position_id: id },
            removed.angle_photo_filename,
        ))
    }

    /// Set or clear a position's label. Blank labels are stored as `None`.
    pub fn set_label(&mut self, id: PositionId, label: Option<String>) -> Option<StateChange> {
        let position = self.positions.iter_mut().find(|p| p.id == id)?;
        position.label = label
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        Some(StateChange::new(ChangeKind::PositionUpdated { position_id: id }))
    }

    /// Point a position at a stored reference photo.
    ///
    /// The previous photo, if different, is reported as released.
    pub fn set_position_photo(&mut self, id: PositionId, filename: String) -> Option<StateChange> {
        let position = self.positions.iter_mut().find(|p| p.id == id)?;
        let previous = position.angle_photo_filename.replace(filename.clone());
        Some(StateChange::releasing(
            ChangeKind::PositionUpdated { position_id: id },
            previous.filter(|p| *p != filename),
        ))
    }

    pub fn clear_position_photo(&mut self, id: PositionId) -> Option<StateChange> {
        let position = self.positions.iter_mut().find(|p| p.id == id)?;
        let previous = position.angle_photo_filename.take();
        Some(StateChange::releasing(
            ChangeKind::PositionUpdated { position_id: id },
            previous,
        ))
    }

    // -- Assignments --------------------------------------------------------

    /// Put `person_name` on a position, clearing it from every other one.
    ///
    /// The name is trimmed first; a blank name clears the position.
    /// No-op (`None`) when the selected event has no assignment for
    /// `position_id`. Re-assigning the same person to the same position still
    /// reports a change.
    pub fn assign(
        &mut self,
        position_id: PositionId,
        person_name: &str,
        roster_id: Option<String>,
    ) -> Option<StateChange> {
        let Some(person_name) = normalize_person_name(person_name) else {
            return self.unassign(position_id);
        };
        let working = self.working_mut()?;
        let target = working.iter().position(|a| a.position_id == position_id)?;

        for assignment in working.iter_mut() {
            if assignment.operator_name.as_deref() == Some(person_name) {
                assignment.clear();
            }
        }

        let slot = &mut working[target];
        slot.operator_name = Some(person_name.to_string());
        slot.operator_roster_id = roster_id;

        Some(StateChange::new(ChangeKind::Assigned {
            position_id,
            operator_name: person_name.to_string(),
        }))
    }

    /// Clear the person from one position.
    pub fn unassign(&mut self, position_id: PositionId) -> Option<StateChange> {
        let slot = self
            .working_mut()?
            .iter_mut()
            .find(|a| a.position_id == position_id)?;
        slot.clear();
        Some(StateChange::new(ChangeKind::Unassigned { position_id }))
    }

    // -- Person photos ------------------------------------------------------

    /// Map a person to a stored photo. Blank names are rejected.
    pub fn set_person_photo(
        &mut self,
        name: &str,
        filename: String,
    ) -> Result<StateChange, CoreError> {
        let name = normalize_person_name(name)
            .ok_or_else(|| CoreError::Validation("Person name must not be empty".into()))?;
        let previous = self.person_photos.insert(name.to_string(), filename.clone());
        Ok(StateChange::releasing(
            ChangeKind::PersonPhotoChanged {
                person_name: name.to_string(),
            },
            previous.filter(|p| *p != filename),
        ))
    }

    pub fn remove_person_photo(&mut self, name: &str) -> StateChange {
        let name = name.trim();
        let previous = self.person_photos.remove(name);
        StateChange::releasing(
            ChangeKind::PersonPhotoChanged {
                person_name: name.to_string(),
            },
            previous,
        )
    }

    // -- Events -------------------------------------------------------------

    /// Make `id` the selected event and fill in missing assignment records.
    pub fn select_event(&mut self, id: EventId) -> Option<StateChange> {
        let event = self.events.iter_mut().find(|e| e.id == id)?;

        for position in &self.positions {
            if event.assignment_for(position.id).is_none() {
                event.assignments.push(Assignment::empty(position.id));
            }
        }

        self.selected_event_id = Some(id);
        Some(StateChange::new(ChangeKind::EventSelected { event_id: id }))
    }

    /// Create a manual event. Returns its id alongside the change.
    pub fn add_event(
        &mut self,
        name: &str,
        service_date: Timestamp,
    ) -> Result<(EventId, StateChange), CoreError> {
        let name = validate_event_name(name)?;
        let event = EventInstance::new(name, service_date);
        let id = event.id;
        self.events.push(event);
        self.events.sort_by_key(|e| e.service_date);
        Ok((id, StateChange::new(ChangeKind::EventsChanged)))
    }

    pub fn rename_event(&mut self, id: EventId, name: &str) -> Result<StateChange, CoreError> {
        let name = validate_event_name(name)?;
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "Event",
                id: id.to_string(),
            })?;
        event.service_name = name.to_string();
        Ok(StateChange::new(ChangeKind::EventsChanged))
    }

    /// Merge roster plans into the event list.
    ///
    /// Selects the first event when nothing was selected before.
    pub fn import_plans(&mut self, plans: &[RosterPlan]) -> StateChange {
        roster::merge_plans(&mut self.events, plans);

        if self.selected_event_id.is_none() {
            if let Some(first) = self.events.first().map(|e| e.id) {
                self.select_event(first);
            }
        }

        StateChange::new(ChangeKind::EventsChanged)
    }

    // -- Internals ----------------------------------------------------------

    fn working_mut(&mut self) -> Option<&mut Vec<Assignment>> {
        let id = self.selected_event_id?;
        self.events
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.assignments)
    }

    fn renumber(&mut self) {
        for (index, position) in self.positions.iter_mut().enumerate() {
            position.number = index as u32 + 1;
        }
    }
}

/// Person names are matched after trimming; `None` for a blank name.
pub fn normalize_person_name(name: &str) -> Option<&str> {
    let trimmed = name.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn validate_event_name(name: &str) -> Result<&str, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Event name must not be empty".into()));
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
