//! Folding external roster data (service plans, team members) into the
//! local model.
//!
//! The roster API client itself lives outside this crate; these functions
//! only consume its results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::EventInstance;
use crate::types::{EventId, Timestamp};

/// An upcoming service plan as returned by the roster API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterPlan {
    pub id: String,
    pub title: Option<String>,
    /// Human-readable date text, used as the name when `title` is missing.
    pub dates: String,
    pub sort_date: Timestamp,
}

impl RosterPlan {
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.dates)
    }
}

/// A person scheduled on a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTeamMember {
    pub id: String,
    pub person_name: String,
    pub team_id: Option<String>,
    pub photo_thumbnail_url: Option<String>,
}

/// A person the editor can drag onto a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub photo_url: Option<String>,
    /// Locally stored personal photo, if one was uploaded.
    pub photo_filename: Option<String>,
}

/// Merge roster plans into `events`.
///
/// An event already linked to a plan id gets its date and name refreshed;
/// other plans become new events. The list is re-sorted by date afterwards.
/// Returns the ids of every event created or updated.
pub fn merge_plans(events: &mut Vec<EventInstance>, plans: &[RosterPlan]) -> Vec<EventId> {
    let mut touched = Vec::with_capacity(plans.len());

    for plan in plans {
        let existing = events
            .iter_mut()
            .find(|e| e.roster_plan_id.as_deref() == Some(plan.id.as_str()));

        match existing {
            Some(event) => {
                event.service_date = plan.sort_date;
                event.service_name = plan.display_name().to_string();
                touched.push(event.id);
            }
            None => {
                let event = EventInstance::new(plan.display_name(), plan.sort_date)
                    .with_roster_plan(plan.id.clone());
                touched.push(event.id);
                events.push(event);
            }
        }
    }

    events.sort_by_key(|e| e.service_date);
    touched
}

/// Members of a plan, narrowed to `team_id` when one is selected, with known
/// personal photos attached.
pub fn filter_team_members(
    members: &[PlanTeamMember],
    team_id: Option<&str>,
    person_photos: &BTreeMap<String, String>,
) -> Vec<TeamMember> {
    members
        .iter()
        .filter(|m| team_id.is_none() || m.team_id.as_deref() == team_id)
        .map(|m| TeamMember {
            id: m.id.clone(),
            name: m.person_name.clone(),
            photo_url: m.photo_thumbnail_url.clone(),
            photo_filename: person_photos.get(m.person_name.trim()).cloned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn plan(id: &str, title: Option<&str>, day: u32) -> RosterPlan {
        RosterPlan {
            id: id.to_string(),
            title: title.map(str::to_string),
            dates: format!("October {day}, 2026"),
            sort_date: Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn new_plans_become_events_sorted_by_date() {
        let mut events = Vec::new();
        let touched = merge_plans(
            &mut events,
            &[plan("p2", Some("Late"), 25), plan("p1", None, 18)],
        );

        assert_eq!(touched.len(), 2);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].roster_plan_id.as_deref(), Some("p1"));
        assert_eq!(events[0].service_name, "October 18, 2026");
        assert_eq!(events[1].service_name, "Late");
    }

    #[test]
    fn existing_plan_is_updated_not_duplicated() {
        let mut events = Vec::new();
        merge_plans(&mut events, &[plan("p1", Some("Original"), 18)]);
        let id = events[0].id;

        let touched = merge_plans(&mut events, &[plan("p1", Some("Renamed"), 19)]);

        assert_eq!(events.len(), 1);
        assert_eq!(touched, vec![id]);
        assert_eq!(events[0].service_name, "Renamed");
        assert_eq!(
            events[0].service_date,
            Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()
        );
    }

    #[test]
    fn manual_events_are_kept() {
        let mut events = vec![EventInstance::new(
            "Manual",
            Utc.with_ymd_and_hms(2026, 11, 1, 9, 0, 0).unwrap(),
        )];
        merge_plans(&mut events, &[plan("p1", None, 25)]);

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].service_name, "Manual");
    }

    #[test]
    fn team_filter_and_photo_lookup() {
        let members = vec![
            PlanTeamMember {
                id: "1".into(),
                person_name: "Alice".into(),
                team_id: Some("vox".into()),
                photo_thumbnail_url: None,
            },
            PlanTeamMember {
                id: "2".into(),
                person_name: "Bob".into(),
                team_id: Some("band".into()),
                photo_thumbnail_url: Some("https://example.test/bob.png".into()),
            },
        ];
        let photos = BTreeMap::from([("Alice".to_string(), "alice.jpg".to_string())]);

        let vox = filter_team_members(&members, Some("vox"), &photos);
        assert_eq!(vox.len(), 1);
        assert_eq!(vox[0].name, "Alice");
        assert_eq!(vox[0].photo_filename.as_deref(), Some("alice.jpg"));

        let all = filter_team_members(&members, None, &photos);
        assert_eq!(all.len(), 2);
        assert!(all[1].photo_filename.is_none());
    }
}
