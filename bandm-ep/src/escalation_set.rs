//! Escalation set
//!
//! Local view of the confirmed roster of one event. The backend is the source
//! of truth: other band admins edit the same roster, so every successful
//! mutation is followed by a refetch, and the view is only ever replaced by
//! what the backend returned.
//!
//! Uniqueness of (event, role, member) is the backend's call. The planner does
//! not know slot cardinality well enough to pre-validate it and forwards the
//! backend's rejection as [`PlanError::Conflict`].

use std::cmp::Ordering;

use bandm_common::models::{Escalation, NewEscalation};
use bandm_common::{EscalationId, EventId, RoleId, UserId};

use crate::api::BandApi;
use crate::error::{PlanError, PlanResult};
use crate::scale_status::{classify, ScaleReport};

/// Role/member pair as entered in a form, possibly incomplete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscalationDraft {
    pub role_id: Option<RoleId>,
    pub user_id: Option<UserId>,
}

impl EscalationDraft {
    pub fn new(role_id: Option<RoleId>, user_id: Option<UserId>) -> Self {
        Self { role_id, user_id }
    }

    /// Pick a role; a member chosen for a different role is cleared
    pub fn set_role(&mut self, role_id: Option<RoleId>) {
        if self.role_id != role_id {
            self.user_id = None;
        }
        self.role_id = role_id;
    }

    /// Create payload, or a validation error naming the missing field
    pub fn validate(&self) -> PlanResult<NewEscalation> {
        match (&self.role_id, &self.user_id) {
            (Some(role_id), Some(user_id)) => Ok(NewEscalation {
                role_id: role_id.clone(),
                user_id: user_id.clone(),
            }),
            (None, None) => Err(PlanError::Validation("select a role and a member".to_string())),
            (None, Some(_)) => Err(PlanError::Validation("select a role".to_string())),
            (Some(_), None) => Err(PlanError::Validation("select a member".to_string())),
        }
    }
}

/// Roster display order: role name, then member name (case-sensitive)
pub fn display_order(a: &Escalation, b: &Escalation) -> Ordering {
    a.role
        .name
        .cmp(&b.role.name)
        .then_with(|| a.user.name.cmp(&b.user.name))
}

/// Confirmed roster of one event
#[derive(Debug)]
pub struct EscalationSet {
    event_id: EventId,
    /// Kept in display order
    escalations: Vec<Escalation>,
}

impl EscalationSet {
    /// Empty view; call [`refresh`](Self::refresh) to populate
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            escalations: Vec::new(),
        }
    }

    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Roster in display order
    pub fn escalations(&self) -> &[Escalation] {
        &self.escalations
    }

    pub fn len(&self) -> usize {
        self.escalations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.escalations.is_empty()
    }

    /// Completion of the roster against an expected slot count
    pub fn report(&self, expected_slots: Option<u32>) -> ScaleReport {
        let staffed = u32::try_from(self.escalations.len()).unwrap_or(u32::MAX);
        classify(staffed, expected_slots)
    }

    fn replace(&mut self, mut escalations: Vec<Escalation>) {
        escalations.sort_by(display_order);
        self.escalations = escalations;
    }

    /// Refetch the roster from the backend
    pub async fn refresh(&mut self, api: &dyn BandApi) -> PlanResult<&[Escalation]> {
        self.fetch(api).await?;
        Ok(&self.escalations)
    }

    async fn fetch(&mut self, api: &dyn BandApi) -> PlanResult<()> {
        let fetched = api.list_escalations(&self.event_id).await?;
        tracing::debug!(event_id = %self.event_id, count = fetched.len(), "Refreshed escalations");
        self.replace(fetched);
        Ok(())
    }

    /// Validate and create an escalation, then refetch
    ///
    /// Validation failures never reach the backend. When the create succeeds
    /// but the refetch does not, the created escalation is inserted locally so
    /// the caller does not resubmit it; the next refresh replaces it.
    pub async fn create(&mut self, api: &dyn BandApi, draft: &EscalationDraft) -> PlanResult<Escalation> {
        let body = draft.validate()?;

        let created = api.create_escalation(&self.event_id, &body).await?;
        tracing::info!(
            event_id = %self.event_id,
            escalation_id = %created.id,
            role = %created.role.name,
            member = %created.user.name,
            "Escalation created"
        );

        if let Err(e) = self.fetch(api).await {
            tracing::warn!(event_id = %self.event_id, error = %e, "Refresh after create failed");
            let mut local = self.escalations.clone();
            local.push(created.clone());
            self.replace(local);
        }

        Ok(created)
    }

    /// Delete an escalation, then refetch
    ///
    /// A failed delete (including a repeated one) leaves the local roster
    /// exactly as it was.
    pub async fn remove(&mut self, api: &dyn BandApi, escalation_id: &EscalationId) -> PlanResult<()> {
        if let Err(e) = api.delete_escalation(escalation_id).await {
            tracing::warn!(escalation_id = %escalation_id, error = %e, "Escalation removal failed");
            return Err(PlanError::Removal {
                id: escalation_id.clone(),
                reason: e.to_string(),
            });
        }
        tracing::info!(event_id = %self.event_id, escalation_id = %escalation_id, "Escalation removed");

        if let Err(e) = self.fetch(api).await {
            tracing::warn!(event_id = %self.event_id, error = %e, "Refresh after removal failed");
            self.escalations.retain(|esc| &esc.id != escalation_id);
        }
        Ok(())
    }
}
