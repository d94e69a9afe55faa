//! Event scale-status evaluation
//!
//! Pure reductions over already-fetched event records: no network access, no
//! state. Callers recompute on every render; "now" is always passed in, so a
//! result is a snapshot of the moment it was computed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use bandm_common::models::{Escalation, Event, Role};
use bandm_common::{EscalationId, UserId};

use crate::context::SessionContext;

/// Staffing readiness of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaleStatus {
    /// Nobody escalated
    None,
    /// Fewer escalations than the linked lineup's slot count
    Incomplete,
    /// Staffed, and either no target is known or the target is met
    Complete,
}

/// Status plus how many slots are still open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleReport {
    pub status: ScaleStatus,
    /// Non-zero only when `status` is `Incomplete`
    pub missing_count: u32,
}

/// Classify a staffed count against an optional expected slot count
pub fn classify(escalations: u32, expected: Option<u32>) -> ScaleReport {
    if escalations == 0 {
        return ScaleReport {
            status: ScaleStatus::None,
            missing_count: 0,
        };
    }

    match expected {
        Some(expected) if escalations < expected => ScaleReport {
            status: ScaleStatus::Incomplete,
            missing_count: expected - escalations,
        },
        _ => ScaleReport {
            status: ScaleStatus::Complete,
            missing_count: 0,
        },
    }
}

/// Evaluate an event record as delivered
///
/// The expected count only applies when the event links a lineup. Events
/// without a lineup count as complete as soon as anybody is escalated.
pub fn evaluate(event: &Event) -> ScaleReport {
    let expected = event.lineup_id.as_ref().and(event.lineup_roles_count);
    classify(event.escalations_count, expected)
}

/// Evaluate an event for a viewer; only administrators see lineup targets
pub fn evaluate_for(event: &Event, ctx: &SessionContext) -> ScaleReport {
    if ctx.viewer_is_admin {
        evaluate(event)
    } else {
        classify(event.escalations_count, None)
    }
}

/// Secondary sort for pre-filtered event lists: start time, then name, then id
pub fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.starting_time
            .cmp(&b.starting_time)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Earliest event starting after `now`
pub fn next_event(events: &[Event], now: DateTime<Utc>) -> Option<&Event> {
    events
        .iter()
        .filter(|e| e.starting_time > now)
        .min_by(|a, b| a.starting_time.cmp(&b.starting_time))
}

pub fn future_event_count(events: &[Event], now: DateTime<Utc>) -> usize {
    events.iter().filter(|e| e.starting_time > now).count()
}

/// One future event the viewer is escalated in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub escalation_id: EscalationId,
    pub event: Event,
    pub role: Role,
}

/// The viewer's escalations on events starting after `now`, soonest first
///
/// A viewer holding two roles in one event gets one entry per role.
pub fn my_assignments(
    events: &[Event],
    escalations: &[Escalation],
    viewer: &UserId,
    now: DateTime<Utc>,
) -> Vec<Assignment> {
    let mut assignments: Vec<Assignment> = escalations
        .iter()
        .filter(|esc| &esc.user.user_id == viewer)
        .filter_map(|esc| {
            events
                .iter()
                .find(|e| e.id == esc.event_id && e.starting_time > now)
                .map(|event| Assignment {
                    escalation_id: esc.id.clone(),
                    event: event.clone(),
                    role: esc.role.clone(),
                })
        })
        .collect();

    assignments.sort_by(|a, b| {
        a.event
            .starting_time
            .cmp(&b.event.starting_time)
            .then_with(|| a.role.name.cmp(&b.role.name))
    });
    assignments
}

/// Band home summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub next_event: Option<Event>,
    pub next_event_status: Option<ScaleReport>,
    pub future_events: usize,
    /// Only populated for non-admin viewers
    pub my_assignments: Vec<Assignment>,
}

/// Build the band home summary from fetched events and escalations
pub fn dashboard(
    events: &[Event],
    escalations: &[Escalation],
    ctx: &SessionContext,
    now: DateTime<Utc>,
) -> Dashboard {
    let next = next_event(events, now);
    let my_assignments = if ctx.viewer_is_admin {
        Vec::new()
    } else {
        my_assignments(events, escalations, &ctx.viewer_id, now)
    };

    Dashboard {
        next_event: next.cloned(),
        next_event_status: next.map(|e| evaluate_for(e, ctx)),
        future_events: future_event_count(events, now),
        my_assignments,
    }
}
