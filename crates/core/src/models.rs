//! Persisted domain records: positions, assignments and event instances.

use serde::{Deserialize, Serialize};

use crate::types::{EventId, PositionId, Timestamp};

/// A numbered vocalist slot.
///
/// `number` is always part of the contiguous sequence `1..=N` across all
/// positions; the `id` never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub number: u32,
    pub label: Option<String>,
    /// Reference photo of the stage angle for this slot.
    pub angle_photo_filename: Option<String>,
}

impl Position {
    pub fn new(number: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            number,
            label: None,
            angle_photo_filename: None,
        }
    }
}

/// The person (if any) bound to one position for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: uuid::Uuid,
    pub position_id: PositionId,
    pub operator_name: Option<String>,
    /// Person id in the external roster, when the name came from an import.
    pub operator_roster_id: Option<String>,
}

impl Assignment {
    /// An empty assignment for `position_id`.
    pub fn empty(position_id: PositionId) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            position_id,
            operator_name: None,
            operator_roster_id: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.operator_name.is_some()
    }

    pub fn clear(&mut self) {
        self.operator_name = None;
        self.operator_roster_id = None;
    }
}

/// One dated occurrence (a service) with its own assignment set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInstance {
    pub id: EventId,
    /// Plan id in the external roster, used to de-duplicate imports.
    pub roster_plan_id: Option<String>,
    pub service_date: Timestamp,
    pub service_name: String,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl EventInstance {
    pub fn new(service_name: impl Into<String>, service_date: Timestamp) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            roster_plan_id: None,
            service_date,
            service_name: service_name.into(),
            assignments: Vec::new(),
        }
    }

    /// Attach the external roster plan id.
    pub fn with_roster_plan(mut self, plan_id: impl Into<String>) -> Self {
        self.roster_plan_id = Some(plan_id.into());
        self
    }

    /// The assignment for `position_id`, if one exists.
    pub fn assignment_for(&self, position_id: PositionId) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.position_id == position_id)
    }
}
