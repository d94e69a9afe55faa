//! Suggestion staging area
//!
//! Holds the pending suggestions of one planning session. Each suggestion is
//! its own small state machine: it enters the list staged, is edited in place,
//! and leaves it exactly once, either confirmed (an escalation was created) or
//! discarded. Items are always addressed by their slot-derived key, never by
//! position, so removing one item can never retarget an operation meant for
//! another.
//!
//! Nothing here is persisted. Dropping the staging area drops the drafts.

use std::fmt;

use bandm_common::models::{LineupRoleSlot, Role};
use bandm_common::{LineupId, RoleId, SlotId, UserId};

use crate::error::{PlanError, PlanResult};
use crate::escalation_set::EscalationDraft;

/// Identity of one pending suggestion, derived from the lineup slot it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SuggestionKey(String);

impl SuggestionKey {
    pub fn for_slot(lineup_id: &LineupId, slot_id: &SlotId) -> Self {
        Self(format!("{lineup_id}/{slot_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SuggestionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unconfirmed role/member pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSuggestion {
    pub key: SuggestionKey,
    /// Slot the suggestion was expanded from
    pub slot_id: SlotId,
    pub role_id: RoleId,
    pub role_name: String,
    /// Member chosen in the picker, if any
    pub user_id: Option<UserId>,
}

impl PendingSuggestion {
    /// Fresh suggestion for a lineup slot, no member chosen yet
    pub fn from_slot(lineup_id: &LineupId, slot: &LineupRoleSlot) -> Self {
        Self {
            key: SuggestionKey::for_slot(lineup_id, &slot.id),
            slot_id: slot.id.clone(),
            role_id: slot.role.id.clone(),
            role_name: slot.role.name.clone(),
            user_id: None,
        }
    }

    pub fn draft(&self) -> EscalationDraft {
        EscalationDraft {
            role_id: Some(self.role_id.clone()),
            user_id: self.user_id.clone(),
        }
    }
}

/// Ordered list of pending suggestions keyed by [`SuggestionKey`]
#[derive(Debug, Default)]
pub struct StagingArea {
    items: Vec<PendingSuggestion>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[PendingSuggestion] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, key: &SuggestionKey) -> Option<&PendingSuggestion> {
        self.items.iter().find(|p| &p.key == key)
    }

    fn get_mut(&mut self, key: &SuggestionKey) -> PlanResult<&mut PendingSuggestion> {
        self.items
            .iter_mut()
            .find(|p| &p.key == key)
            .ok_or_else(|| PlanError::UnknownSuggestion(key.clone()))
    }

    /// Append new suggestions after the existing ones
    ///
    /// Never clears. A suggestion whose key is already staged is skipped so
    /// keys stay unique. Returns the number actually appended.
    pub fn merge(&mut self, suggestions: Vec<PendingSuggestion>) -> usize {
        let mut added = 0;
        for suggestion in suggestions {
            if self.get(&suggestion.key).is_some() {
                tracing::debug!(key = %suggestion.key, "Suggestion already staged, skipping");
                continue;
            }
            self.items.push(suggestion);
            added += 1;
        }
        added
    }

    /// Reassign the role of a staged item
    ///
    /// The chosen member is cleared: the member pool of the old role says
    /// nothing about the new one.
    pub fn set_role(&mut self, key: &SuggestionKey, role: &Role) -> PlanResult<()> {
        let item = self.get_mut(key)?;
        item.role_id = role.id.clone();
        item.role_name = role.name.clone();
        item.user_id = None;
        Ok(())
    }

    pub fn set_member(&mut self, key: &SuggestionKey, user_id: Option<UserId>) -> PlanResult<()> {
        self.get_mut(key)?.user_id = user_id;
        Ok(())
    }

    /// Remove an item after its escalation was created
    pub fn settle(&mut self, key: &SuggestionKey) -> PlanResult<PendingSuggestion> {
        let item = self.take(key)?;
        tracing::debug!(key = %key, "Suggestion confirmed");
        Ok(item)
    }

    /// Drop an item without any persisted effect
    pub fn discard(&mut self, key: &SuggestionKey) -> PlanResult<PendingSuggestion> {
        let item = self.take(key)?;
        tracing::debug!(key = %key, "Suggestion discarded");
        Ok(item)
    }

    fn take(&mut self, key: &SuggestionKey) -> PlanResult<PendingSuggestion> {
        let index = self
            .items
            .iter()
            .position(|p| &p.key == key)
            .ok_or_else(|| PlanError::UnknownSuggestion(key.clone()))?;
        Ok(self.items.remove(index))
    }

    /// Drop every staged item, returning how many were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.items.len();
        self.items.clear();
        dropped
    }
}
