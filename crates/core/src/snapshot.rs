//! Published snapshot: the display-ready projection of the selected event.
//!
//! [`project`] is a pure function of (event, positions, person photos). The
//! JSON shape uses camelCase keys because the display surfaces consume it
//! directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{EventInstance, Position};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

/// The full structure served to displays from `GET /api/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedSnapshot {
    pub service_name: String,
    pub service_date: Timestamp,
    pub vocalists: Vec<SnapshotEntry>,
}

/// One column on the display, one per position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub number: u32,
    pub label: Option<String>,
    /// The position's own reference photo.
    pub angle_photo_filename: Option<String>,
    /// `None` means the position is unassigned.
    pub operator_name: Option<String>,
    /// The assigned operator's personal photo.
    pub operator_photo_filename: Option<String>,
    /// Photo to draw behind the column: operator photo, else angle photo.
    #[serde(default)]
    pub background_photo_filename: Option<String>,
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Project the selected event into a snapshot.
///
/// Emits exactly one entry per position, in ascending number order,
/// regardless of the order of `positions` or of the event's assignments.
pub fn project(
    event: &EventInstance,
    positions: &[Position],
    person_photos: &BTreeMap<String, String>,
) -> PublishedSnapshot {
    let mut ordered: Vec<&Position> = positions.iter().collect();
    ordered.sort_by_key(|p| p.number);

    let vocalists = ordered
        .into_iter()
        .map(|position| {
            let operator_name = event
                .assignment_for(position.id)
                .and_then(|a| a.operator_name.clone());
            let operator_photo_filename = operator_name
                .as_ref()
                .and_then(|name| person_photos.get(name))
                .cloned();
            let background_photo_filename = operator_photo_filename
                .clone()
                .or_else(|| position.angle_photo_filename.clone());

            SnapshotEntry {
                number: position.number,
                label: position.label.clone(),
                angle_photo_filename: position.angle_photo_filename.clone(),
                operator_name,
                operator_photo_filename,
                background_photo_filename,
            }
        })
        .collect();

    PublishedSnapshot {
        service_name: event.service_name.clone(),
        service_date: event.service_date,
        vocalists,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
