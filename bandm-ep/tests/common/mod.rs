//! In-memory band backend for planner integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bandm_common::models::{
    Escalation, Event, EventFilter, Lineup, LineupRoleSlot, Member, NewEscalation, PriorityEntry, Role,
};
use bandm_common::{BandId, EscalationId, EventId, Id, LineupId};
use bandm_ep::api::{ApiError, ApiResult, BandApi};
use bandm_ep::SessionContext;
use chrono::{Duration, Utc};

pub const BAND: u64 = 1;
pub const EVENT: u64 = 500;
pub const LINEUP: u64 = 100;
pub const VIEWER: u64 = 9;

#[derive(Default)]
struct State {
    roles: Vec<Role>,
    members: Vec<Member>,
    lineups: HashMap<LineupId, Lineup>,
    priorities: HashMap<String, Vec<PriorityEntry>>,
    escalations: Vec<Escalation>,
    events: Vec<Event>,
    next_id: u64,
}

/// Fake backend with call counters and switchable failures
#[derive(Default)]
pub struct FakeBandApi {
    state: Mutex<State>,
    pub priority_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    /// Role slugs whose priority endpoint fails
    pub failing_priority: Mutex<HashSet<String>>,
    /// Every create is rejected as a conflict
    pub reject_creates: Mutex<bool>,
    /// List calls fail with a transport error
    pub fail_listing: Mutex<bool>,
    /// Lineup fetches fail with a transport error
    pub fail_lineup: Mutex<bool>,
}

pub fn role(id: u64, name: &str) -> Role {
    Role {
        id: Id::from(id),
        name: name.to_string(),
        slug: name.to_lowercase(),
    }
}

pub fn member(id: u64, name: &str) -> Member {
    Member {
        user_id: Id::from(id),
        name: name.to_string(),
    }
}

pub fn guitar() -> Role {
    role(1, "Guitar")
}

pub fn drums() -> Role {
    role(2, "Drums")
}

pub fn bass() -> Role {
    role(3, "Bass")
}

pub fn event(lineup: Option<u64>) -> Event {
    let start = Utc::now() + Duration::days(3);
    Event {
        id: Id::from(EVENT),
        name: "Sunday Service".to_string(),
        starting_time: start,
        ending_time: start + Duration::hours(2),
        lineup_id: lineup.map(Id::from),
        escalations_count: 0,
        lineup_roles_count: None,
    }
}

pub fn admin() -> SessionContext {
    SessionContext::new(Id::from(BAND), Id::from(VIEWER), true)
}

impl FakeBandApi {
    /// Band with Guitar, Drums, Bass; four members; lineup [Guitar, Guitar, Drums]
    pub fn band() -> Arc<Self> {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.next_id = 1000;
            state.roles = vec![guitar(), drums(), bass()];
            state.members = vec![
                member(11, "Ana"),
                member(12, "Bruno"),
                member(13, "Carla"),
                member(14, "Davi"),
            ];
            state.lineups.insert(
                Id::from(LINEUP),
                Lineup {
                    id: Id::from(LINEUP),
                    name: "Full Band".to_string(),
                    role_slots: vec![
                        slot(1, guitar()),
                        slot(2, guitar()),
                        slot(3, drums()),
                    ],
                },
            );
            state.priorities.insert(
                "guitar".to_string(),
                vec![
                    PriorityEntry { user_id: Id::from(13), priority: 8 },
                    PriorityEntry { user_id: Id::from(12), priority: 3 },
                ],
            );
            state.priorities.insert(
                "drums".to_string(),
                vec![PriorityEntry { user_id: Id::from(14), priority: 5 }],
            );
            state.events.push(event(Some(LINEUP)));
        }
        Arc::new(api)
    }

    pub fn remove_lineup(&self, lineup_id: u64) {
        self.state.lock().unwrap().lineups.remove(&Id::from(lineup_id));
    }

    pub fn fail_priority_for(&self, slug: &str) {
        self.failing_priority.lock().unwrap().insert(slug.to_string());
    }

    pub fn heal_priority(&self) {
        self.failing_priority.lock().unwrap().clear();
    }

    pub fn set_reject_creates(&self, reject: bool) {
        *self.reject_creates.lock().unwrap() = reject;
    }

    pub fn set_fail_listing(&self, fail: bool) {
        *self.fail_listing.lock().unwrap() = fail;
    }

    pub fn set_fail_lineup(&self, fail: bool) {
        *self.fail_lineup.lock().unwrap() = fail;
    }

    /// Escalation added behind the planner's back, as another admin would
    pub fn seed_escalation(&self, role: Role, user: Member) -> EscalationId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = Id::from(state.next_id);
        state.escalations.push(Escalation {
            id: id.clone(),
            event_id: Id::from(EVENT),
            role,
            user,
        });
        id
    }

    pub fn stored_escalations(&self) -> Vec<Escalation> {
        self.state.lock().unwrap().escalations.clone()
    }

    pub fn priority_calls(&self) -> usize {
        self.priority_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

fn slot(id: u64, role: Role) -> LineupRoleSlot {
    LineupRoleSlot {
        id: Id::from(id),
        role,
        description: None,
    }
}

#[async_trait]
impl BandApi for FakeBandApi {
    async fn list_escalations(&self, event_id: &EventId) -> ApiResult<Vec<Escalation>> {
        if *self.fail_listing.lock().unwrap() {
            return Err(ApiError::Transport("connection reset".to_string()));
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .escalations
            .iter()
            .filter(|e| &e.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn create_escalation(&self, event_id: &EventId, body: &NewEscalation) -> ApiResult<Escalation> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if *self.reject_creates.lock().unwrap() {
            return Err(ApiError::Conflict("escalation rejected".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        let duplicate = state.escalations.iter().any(|e| {
            &e.event_id == event_id && e.role.id == body.role_id && e.user.user_id == body.user_id
        });
        if duplicate {
            return Err(ApiError::Conflict("member already escalated for this role".to_string()));
        }

        let role = state
            .roles
            .iter()
            .find(|r| r.id == body.role_id)
            .cloned()
            .ok_or_else(|| ApiError::Conflict(format!("unknown role {}", body.role_id)))?;
        let user = state
            .members
            .iter()
            .find(|m| m.user_id == body.user_id)
            .cloned()
            .ok_or_else(|| ApiError::Conflict(format!("unknown member {}", body.user_id)))?;

        state.next_id += 1;
        let escalation = Escalation {
            id: Id::from(state.next_id),
            event_id: event_id.clone(),
            role,
            user,
        };
        state.escalations.push(escalation.clone());
        Ok(escalation)
    }

    async fn delete_escalation(&self, escalation_id: &EscalationId) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        let before = state.escalations.len();
        state.escalations.retain(|e| &e.id != escalation_id);
        if state.escalations.len() == before {
            return Err(ApiError::NotFound(format!("escalation {escalation_id}")));
        }
        Ok(())
    }

    async fn get_lineup(&self, lineup_id: &LineupId) -> ApiResult<Lineup> {
        if *self.fail_lineup.lock().unwrap() {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        self.state
            .lock()
            .unwrap()
            .lineups
            .get(lineup_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("lineup {lineup_id}")))
    }

    async fn get_priority_list(&self, role_slug: &str, _band_id: &BandId) -> ApiResult<Vec<PriorityEntry>> {
        self.priority_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_priority.lock().unwrap().contains(role_slug) {
            return Err(ApiError::Transport("priority service unavailable".to_string()));
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .priorities
            .get(role_slug)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_band_members(&self, _band_id: &BandId) -> ApiResult<Vec<Member>> {
        Ok(self.state.lock().unwrap().members.clone())
    }

    async fn list_roles(&self) -> ApiResult<Vec<Role>> {
        Ok(self.state.lock().unwrap().roles.clone())
    }

    async fn list_band_events(&self, _band_id: &BandId, _filter: Option<EventFilter>) -> ApiResult<Vec<Event>> {
        Ok(self.state.lock().unwrap().events.clone())
    }
}
