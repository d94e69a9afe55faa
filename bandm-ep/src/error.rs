//! Error types for the escalation planner
//!
//! Every failure is local to the operation attempted; none of these should
//! take down the surrounding application.

use bandm_common::{EscalationId, RoleId};
use thiserror::Error;

use crate::api::ApiError;
use crate::staging::SuggestionKey;

/// Planner error
#[derive(Debug, Error)]
pub enum PlanError {
    /// Required field missing client-side (no role or member chosen)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend rejected a create (duplicate or invalid pairing)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Network or server failure, opaque to the planner
    #[error("Transport error: {0}")]
    Transport(String),

    /// Referenced lineup or event no longer exists
    #[error("Not found: {0}")]
    NotFound(String),

    /// Escalation removal failed; local roster left untouched
    #[error("Could not remove escalation {id}: {reason}")]
    Removal { id: EscalationId, reason: String },

    /// No staged suggestion carries this key
    #[error("No staged suggestion with key {0}")]
    UnknownSuggestion(SuggestionKey),

    /// Role id not present in the role catalog
    #[error("Unknown role: {0}")]
    UnknownRole(RoleId),
}

/// Result type for planner operations
pub type PlanResult<T> = Result<T, PlanError>;

impl PlanError {
    /// Whether the error belongs inline next to the form rather than in a
    /// failure notification
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            PlanError::Validation(_) | PlanError::UnknownSuggestion(_) | PlanError::UnknownRole(_)
        )
    }
}

impl From<ApiError> for PlanError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(what) => PlanError::NotFound(what),
            ApiError::Conflict(msg) => PlanError::Conflict(msg),
            ApiError::Transport(msg) => PlanError::Transport(msg),
            ApiError::Parse(msg) => PlanError::Transport(format!("unreadable response: {msg}")),
        }
    }
}
