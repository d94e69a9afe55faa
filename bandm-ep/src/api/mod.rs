//! Collaborator API
//!
//! The planner never talks to the network directly. Everything it needs from
//! the band-management backend goes through [`BandApi`]; [`HttpBandApi`] is
//! the production implementation.
//!
//! Status-code interpretation happens here, in the client layer. The planner
//! only sees the [`ApiError`] classification.

use async_trait::async_trait;
use bandm_common::models::{Escalation, Event, EventFilter, Lineup, Member, NewEscalation, PriorityEntry, Role};
use bandm_common::{BandId, EscalationId, EventId, LineupId};
use thiserror::Error;

pub mod http;

pub use http::HttpBandApi;

/// Collaborator failure as classified by the client layer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend refused a mutation on business-rule grounds
    #[error("Rejected by server: {0}")]
    Conflict(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the planner consumes from the backend
#[async_trait]
pub trait BandApi: Send + Sync {
    async fn list_escalations(&self, event_id: &EventId) -> ApiResult<Vec<Escalation>>;

    async fn create_escalation(
        &self,
        event_id: &EventId,
        escalation: &NewEscalation,
    ) -> ApiResult<Escalation>;

    async fn delete_escalation(&self, escalation_id: &EscalationId) -> ApiResult<()>;

    async fn get_lineup(&self, lineup_id: &LineupId) -> ApiResult<Lineup>;

    /// Priority history for one role (by slug) within one band
    async fn get_priority_list(&self, role_slug: &str, band_id: &BandId) -> ApiResult<Vec<PriorityEntry>>;

    async fn list_band_members(&self, band_id: &BandId) -> ApiResult<Vec<Member>>;

    async fn list_roles(&self) -> ApiResult<Vec<Role>>;

    /// Events of a band, already filtered server-side
    async fn list_band_events(
        &self,
        band_id: &BandId,
        filter: Option<EventFilter>,
    ) -> ApiResult<Vec<Event>>;
}
