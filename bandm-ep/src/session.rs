//! Planning session
//!
//! One open escalation planner for one event. The session owns the priority
//! cache, the staging area and the local roster; closing it drops all three.
//!
//! Every mutating operation takes `&mut self`, so a session can never have two
//! mutations against its roster in flight at once. Double submits from two
//! different sessions are left to the backend's uniqueness rules.

use std::collections::HashSet;
use std::sync::Arc;

use bandm_common::config::RankingPolicy;
use bandm_common::models::{Escalation, Event, Lineup, Member, Role};
use bandm_common::{EscalationId, Id, RoleId, UserId};

use crate::api::BandApi;
use crate::context::SessionContext;
use crate::error::{PlanError, PlanResult};
use crate::escalation_set::{EscalationDraft, EscalationSet};
use crate::lineup::{expand_lineup, Expansion};
use crate::priority::PriorityRanker;
use crate::scale_status::ScaleReport;
use crate::staging::{PendingSuggestion, StagingArea, SuggestionKey};

/// Result of applying the event's lineup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// This many new suggestions were staged
    Staged(usize),
    /// The lineup is fully staffed or staged already, or no longer exists
    NothingToSuggest,
    /// The event has no linked lineup
    NoLineup,
}

pub struct PlanningSession {
    session_id: Id,
    api: Arc<dyn BandApi>,
    ctx: SessionContext,
    event: Event,
    roles: Vec<Role>,
    members: Vec<Member>,
    lineup: Option<Lineup>,
    ranker: PriorityRanker,
    staging: StagingArea,
    escalations: EscalationSet,
}

impl PlanningSession {
    /// Open a session for `event`, loading the role catalog, band members,
    /// current roster and linked lineup
    ///
    /// A missing or unreachable lineup does not prevent opening; the session
    /// simply has nothing to suggest.
    pub async fn open(
        api: Arc<dyn BandApi>,
        ctx: SessionContext,
        event: Event,
        policy: RankingPolicy,
    ) -> PlanResult<Self> {
        let mut session = Self {
            session_id: Id::generate(),
            escalations: EscalationSet::new(event.id.clone()),
            api,
            ctx,
            event,
            roles: Vec::new(),
            members: Vec::new(),
            lineup: None,
            ranker: PriorityRanker::new(policy),
            staging: StagingArea::new(),
        };
        session.load().await?;

        tracing::info!(
            session_id = %session.session_id,
            event_id = %session.event.id,
            policy = %policy,
            roster = session.escalations.len(),
            "Planning session opened"
        );
        Ok(session)
    }

    async fn load(&mut self) -> PlanResult<()> {
        self.roles = self.api.list_roles().await?;
        self.members = self.api.list_band_members(&self.ctx.band_id).await?;
        self.escalations.refresh(self.api.as_ref()).await?;
        self.lineup = self.fetch_lineup().await;
        Ok(())
    }

    async fn fetch_lineup(&self) -> Option<Lineup> {
        let lineup_id = self.event.lineup_id.as_ref()?;
        match self.api.get_lineup(lineup_id).await {
            Ok(lineup) => Some(lineup),
            Err(e) => {
                tracing::warn!(
                    event_id = %self.event.id,
                    lineup_id = %lineup_id,
                    error = %e,
                    "Linked lineup unavailable, retrying on apply"
                );
                None
            }
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Linked lineup, for previewing its slots before applying it
    pub fn lineup(&self) -> Option<&Lineup> {
        self.lineup.as_ref()
    }

    pub fn policy(&self) -> RankingPolicy {
        self.ranker.policy()
    }

    /// Confirmed roster in display order
    pub fn roster(&self) -> &[Escalation] {
        self.escalations.escalations()
    }

    pub fn staged(&self) -> &[PendingSuggestion] {
        self.staging.items()
    }

    /// Completion of the local roster; the lineup target is admin-only
    pub fn report(&self) -> ScaleReport {
        let expected = match (&self.lineup, self.ctx.viewer_is_admin) {
            (Some(lineup), true) => Some(u32::try_from(lineup.role_slots.len()).unwrap_or(u32::MAX)),
            _ => None,
        };
        self.escalations.report(expected)
    }

    fn role(&self, role_id: &RoleId) -> PlanResult<&Role> {
        self.roles
            .iter()
            .find(|r| &r.id == role_id)
            .ok_or_else(|| PlanError::UnknownRole(role_id.clone()))
    }

    /// Stage suggestions for every lineup slot not yet staffed or staged
    ///
    /// A lineup that no longer exists yields `NothingToSuggest`; any other
    /// fetch failure is returned. Priority lists for the newly introduced roles are loaded so the member
    /// pickers are ready when opened.
    pub async fn apply_lineup(&mut self) -> PlanResult<ApplyOutcome> {
        let Some(lineup_id) = self.event.lineup_id.clone() else {
            return Ok(ApplyOutcome::NoLineup);
        };

        if self.lineup.is_none() {
            match self.api.get_lineup(&lineup_id).await {
                Ok(lineup) => self.lineup = Some(lineup),
                Err(e) => match PlanError::from(e) {
                    PlanError::NotFound(what) => {
                        tracing::warn!(lineup_id = %lineup_id, what = %what, "Lineup no longer exists");
                        return Ok(ApplyOutcome::NothingToSuggest);
                    }
                    err => {
                        tracing::warn!(lineup_id = %lineup_id, error = %err, "Lineup fetch failed");
                        return Err(err);
                    }
                },
            }
        }
        let Some(lineup) = self.lineup.clone() else {
            return Ok(ApplyOutcome::NothingToSuggest);
        };

        let expansion = expand_lineup(&lineup, self.escalations.escalations(), self.staging.items());
        let new_roles: Vec<Role> = expansion.new_roles(&lineup).into_iter().cloned().collect();

        let suggestions = match expansion {
            Expansion::Suggestions(items) => items,
            Expansion::NothingToSuggest => {
                tracing::info!(event_id = %self.event.id, lineup = %lineup.name, "Nothing new to suggest");
                return Ok(ApplyOutcome::NothingToSuggest);
            }
        };

        for role in &new_roles {
            self.ranker.load(self.api.as_ref(), &self.ctx.band_id, role).await;
        }

        let staged = self.staging.merge(suggestions);
        tracing::info!(
            event_id = %self.event.id,
            lineup = %lineup.name,
            staged,
            "Lineup applied as suggestions"
        );
        Ok(ApplyOutcome::Staged(staged))
    }

    /// Change the role of a staged suggestion; clears its member
    pub async fn set_role(&mut self, key: &SuggestionKey, role_id: &RoleId) -> PlanResult<()> {
        let role = self.role(role_id)?.clone();
        self.staging.set_role(key, &role)?;
        self.ranker.load(self.api.as_ref(), &self.ctx.band_id, &role).await;
        Ok(())
    }

    pub fn set_member(&mut self, key: &SuggestionKey, user_id: Option<UserId>) -> PlanResult<()> {
        self.staging.set_member(key, user_id)
    }

    /// Ranked member picker for a staged suggestion
    pub fn candidates(&self, key: &SuggestionKey) -> PlanResult<Vec<Member>> {
        let item = self
            .staging
            .get(key)
            .ok_or_else(|| PlanError::UnknownSuggestion(key.clone()))?;
        Ok(self.ranker.rank(&item.role_id, &self.members))
    }

    /// Ranked member picker for a role chosen in the manual add form
    ///
    /// Loads the role's priority list on first use.
    pub async fn candidates_for_role(&mut self, role_id: &RoleId) -> PlanResult<Vec<Member>> {
        let role = self.role(role_id)?.clone();
        Ok(self
            .ranker
            .rank_members(self.api.as_ref(), &self.ctx.band_id, &role, &self.members)
            .await)
    }

    /// Change the role of the manual add form and return its ranked picker
    pub async fn set_draft_role(
        &mut self,
        draft: &mut EscalationDraft,
        role_id: &RoleId,
    ) -> PlanResult<Vec<Member>> {
        let candidates = self.candidates_for_role(role_id).await?;
        draft.set_role(Some(role_id.clone()));
        Ok(candidates)
    }

    /// Turn one staged suggestion into an escalation
    ///
    /// On success the item leaves staging and the roster is refetched. On any
    /// failure the item stays staged, untouched, so the user can retry. Other
    /// staged items are never read or written.
    pub async fn confirm(&mut self, key: &SuggestionKey) -> PlanResult<Escalation> {
        let draft = self
            .staging
            .get(key)
            .ok_or_else(|| PlanError::UnknownSuggestion(key.clone()))?
            .draft();

        let created = self.escalations.create(self.api.as_ref(), &draft).await?;
        self.staging.settle(key)?;
        Ok(created)
    }

    pub fn discard(&mut self, key: &SuggestionKey) -> PlanResult<PendingSuggestion> {
        self.staging.discard(key)
    }

    /// Add an escalation from the manual form, outside the lineup flow
    pub async fn add_manual(&mut self, draft: &EscalationDraft) -> PlanResult<Escalation> {
        self.escalations.create(self.api.as_ref(), draft).await
    }

    pub async fn remove(&mut self, escalation_id: &EscalationId) -> PlanResult<()> {
        self.escalations.remove(self.api.as_ref(), escalation_id).await
    }

    /// Refetch the roster
    pub async fn refresh(&mut self) -> PlanResult<&[Escalation]> {
        self.escalations.refresh(self.api.as_ref()).await
    }

    /// Start over: drop cached priorities and staged suggestions, reload
    /// everything from the backend
    pub async fn restart(&mut self) -> PlanResult<()> {
        self.ranker.clear();
        let dropped = self.staging.clear();
        self.lineup = None;
        tracing::info!(session_id = %self.session_id, dropped, "Planning session restarted");
        self.load().await
    }

    /// Close the session; staged suggestions are discarded
    pub fn close(self) -> usize {
        let dropped = self.staging.len();
        tracing::debug!(session_id = %self.session_id, dropped, "Planning session closed");
        dropped
    }

    /// Roles referenced by staged suggestions whose priority list is not cached
    pub fn unranked_roles(&self) -> Vec<RoleId> {
        let mut seen = HashSet::new();
        self.staging
            .items()
            .iter()
            .map(|p| &p.role_id)
            .filter(|id| !self.ranker.is_loaded(id))
            .filter(|id| seen.insert((*id).clone()))
            .cloned()
            .collect()
    }
}
