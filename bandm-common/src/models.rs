//! Domain models exchanged with the band-management backend
//!
//! Field names follow the backend's camelCase JSON. Identifiers go through
//! [`Id`](crate::Id) parsing, timestamps through [`time::flexible`](crate::time::flexible).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::{EscalationId, EventId, LineupId, RoleId, SlotId, UserId};
use crate::time::flexible;
use crate::Error;

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Global role catalog entry (e.g. "Guitarrista")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable key for escalation linkage
    pub id: RoleId,
    pub name: String,
    /// Stable key for priority lookups; empty when the backend omits it
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
}

/// Band member (integrant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    #[serde(rename = "id", alias = "userId")]
    pub user_id: UserId,
    pub name: String,
}

/// Wire shape of one entry of a band's member listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integrant {
    pub user: Member,
}

/// One desired role within a lineup
///
/// Two slots with the same role are distinct occurrences and keep their own id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupRoleSlot {
    pub id: SlotId,
    pub role: Role,
    #[serde(default)]
    pub description: Option<String>,
}

/// Reusable staffing template owned by a band
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lineup {
    pub id: LineupId,
    pub name: String,
    #[serde(default, alias = "roles", deserialize_with = "null_as_default")]
    pub role_slots: Vec<LineupRoleSlot>,
}

/// Band event as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    #[serde(with = "flexible")]
    pub starting_time: DateTime<Utc>,
    #[serde(with = "flexible")]
    pub ending_time: DateTime<Utc>,
    #[serde(default)]
    pub lineup_id: Option<LineupId>,
    /// Confirmed escalations for this event
    #[serde(default, deserialize_with = "null_as_default")]
    pub escalations_count: u32,
    /// Expected slot count of the linked lineup (admin payloads only)
    #[serde(default)]
    pub lineup_roles_count: Option<u32>,
}

/// Confirmed assignment of one member to one role for one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Escalation {
    pub id: EscalationId,
    pub event_id: EventId,
    pub role: Role,
    pub user: Member,
}

/// Historical suitability of one member for one role within a band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityEntry {
    pub user_id: UserId,
    /// Higher value means more suitable
    pub priority: i64,
}

/// Payload of an escalation create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEscalation {
    pub role_id: RoleId,
    pub user_id: UserId,
}

/// Server-side event list filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventFilter {
    Today,
    Future,
    Past,
    All,
}

impl EventFilter {
    /// Query-string value understood by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            EventFilter::Today => "today",
            EventFilter::Future => "future",
            EventFilter::Past => "past",
            EventFilter::All => "all",
        }
    }
}

impl fmt::Display for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            // "now" is the label the event filter bar uses for today
            "today" | "now" => Ok(EventFilter::Today),
            "future" => Ok(EventFilter::Future),
            "past" => Ok(EventFilter::Past),
            "all" => Ok(EventFilter::All),
            other => Err(Error::InvalidInput(format!("unknown event filter: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Id;
    use chrono::TimeZone;

    #[test]
    fn test_lineup_accepts_roles_alias_and_numeric_ids() {
        let json = r#"{
            "id": 3,
            "name": "Sunday Band",
            "roles": [
                {"id": 10, "role": {"id": 1, "name": "Guitar", "slug": "guitar"}},
                {"id": 11, "role": {"id": 1, "name": "Guitar", "slug": "guitar"}, "description": "rhythm"}
            ]
        }"#;

        let lineup: Lineup = serde_json::from_str(json).unwrap();
        assert_eq!(lineup.role_slots.len(), 2);
        assert_ne!(lineup.role_slots[0].id, lineup.role_slots[1].id);
        assert_eq!(lineup.role_slots[0].role.id, Id::from(1));
        assert_eq!(lineup.role_slots[1].description.as_deref(), Some("rhythm"));
    }

    #[test]
    fn test_lineup_role_slots_field() {
        let json = r#"{"id": "l1", "name": "Empty", "roleSlots": []}"#;
        let lineup: Lineup = serde_json::from_str(json).unwrap();
        assert!(lineup.role_slots.is_empty());
    }

    #[test]
    fn test_event_optional_fields_default() {
        let json = r#"{
            "id": 5,
            "name": "Culto",
            "startingTime": "2025-03-01T19:00:00",
            "endingTime": "2025-03-01T21:00:00Z"
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.escalations_count, 0);
        assert!(event.lineup_id.is_none());
        assert!(event.lineup_roles_count.is_none());
        assert_eq!(event.starting_time, Utc.with_ymd_and_hms(2025, 3, 1, 19, 0, 0).unwrap());
    }

    #[test]
    fn test_null_escalations_count_is_zero() {
        let json = r#"{
            "id": 6,
            "name": "Ensaio",
            "escalationsCount": null,
            "lineupId": null,
            "startingTime": "2025-03-02T19:00:00Z",
            "endingTime": "2025-03-02T21:00:00Z"
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.escalations_count, 0);
        assert!(event.lineup_id.is_none());
    }

    #[test]
    fn test_null_slug_is_empty() {
        let json = r#"[
            {"id": 1, "name": "Guitar", "slug": null},
            {"id": 2, "name": "Drums"},
            {"id": 3, "name": "Bass", "slug": "bass"}
        ]"#;

        let roles: Vec<Role> = serde_json::from_str(json).unwrap();
        let slugs: Vec<_> = roles.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["", "", "bass"]);
    }

    #[test]
    fn test_null_role_slots_is_empty() {
        let json = r#"{"id": 4, "name": "Acoustic", "roleSlots": null}"#;
        let lineup: Lineup = serde_json::from_str(json).unwrap();
        assert!(lineup.role_slots.is_empty());
    }

    #[test]
    fn test_member_accepts_id_or_user_id() {
        let a: Member = serde_json::from_str(r#"{"id": 9, "name": "Ana"}"#).unwrap();
        let b: Member = serde_json::from_str(r#"{"userId": "9", "name": "Ana"}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_new_escalation_serializes_camel_case() {
        let body = NewEscalation {
            role_id: Id::from(1),
            user_id: Id::from(2),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["roleId"], "1");
        assert_eq!(json["userId"], "2");
    }

    #[test]
    fn test_event_filter_parse() {
        assert_eq!("future".parse::<EventFilter>().unwrap(), EventFilter::Future);
        assert_eq!("NOW".parse::<EventFilter>().unwrap(), EventFilter::Today);
        assert!("soon".parse::<EventFilter>().is_err());
        assert_eq!(EventFilter::Past.to_string(), "past");
    }
}
