//! Lineup template resolver
//!
//! Expands a lineup into pending suggestions for one event. A lineup may ask
//! for the same role more than once; every slot is its own occurrence, so one
//! confirmed guitarist only accounts for one of two guitar slots.
//!
//! Slot matching:
//! 1. Slots whose key is already staged are represented by that suggestion.
//! 2. Each existing escalation then accounts for the first remaining slot of
//!    its role, in lineup order.
//! 3. Whatever is left is suggested, with no member chosen.

use std::collections::{HashMap, HashSet};

use bandm_common::models::{Escalation, Lineup, Role};
use bandm_common::RoleId;

use crate::staging::{PendingSuggestion, SuggestionKey};

/// Result of expanding a lineup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// New suggestions, in lineup slot order
    Suggestions(Vec<PendingSuggestion>),
    /// Every slot is already staffed or staged; informational, not a failure
    NothingToSuggest,
}

impl Expansion {
    pub fn suggestions(&self) -> &[PendingSuggestion] {
        match self {
            Expansion::Suggestions(items) => items,
            Expansion::NothingToSuggest => &[],
        }
    }

    /// Distinct roles introduced by the expansion, first occurrence order
    pub fn new_roles<'a>(&self, lineup: &'a Lineup) -> Vec<&'a Role> {
        let slot_ids: HashSet<_> = self.suggestions().iter().map(|s| &s.slot_id).collect();
        let mut seen = HashSet::new();
        lineup
            .role_slots
            .iter()
            .filter(|slot| slot_ids.contains(&slot.id))
            .map(|slot| &slot.role)
            .filter(|role| seen.insert(role.id.clone()))
            .collect()
    }
}

/// Expand `lineup` against the current roster and staging list
pub fn expand_lineup(
    lineup: &Lineup,
    existing: &[Escalation],
    pending: &[PendingSuggestion],
) -> Expansion {
    let staged: HashSet<&SuggestionKey> = pending.iter().map(|p| &p.key).collect();

    let mut unmatched_staffing: HashMap<&RoleId, usize> = HashMap::new();
    for escalation in existing {
        *unmatched_staffing.entry(&escalation.role.id).or_insert(0) += 1;
    }

    let mut suggestions = Vec::new();
    for slot in &lineup.role_slots {
        let key = SuggestionKey::for_slot(&lineup.id, &slot.id);
        if staged.contains(&key) {
            continue;
        }

        if let Some(count) = unmatched_staffing.get_mut(&slot.role.id) {
            if *count > 0 {
                *count -= 1;
                continue;
            }
        }

        suggestions.push(PendingSuggestion::from_slot(&lineup.id, slot));
    }

    tracing::debug!(
        lineup_id = %lineup.id,
        slots = lineup.role_slots.len(),
        suggested = suggestions.len(),
        "Expanded lineup"
    );

    if suggestions.is_empty() {
        Expansion::NothingToSuggest
    } else {
        Expansion::Suggestions(suggestions)
    }
}
