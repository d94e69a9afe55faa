//! Priority ranker
//!
//! Orders a band's members for a role using the backend's priority history.
//!
//! # Cache
//! Entries are cached per role id for the lifetime of the planning session.
//! A role that loaded successfully is never fetched again; only
//! [`PriorityRanker::clear`] (session restart) empties the cache. Failed
//! fetches are not cached, so the next interaction retries.
//!
//! # Degradation
//! Priority is an enhancement. A role with no cached entries (not loaded yet,
//! fetch failed, or no slug) ranks as the plain member list.

use std::collections::HashMap;

use bandm_common::config::RankingPolicy;
use bandm_common::models::{Member, PriorityEntry, Role};
use bandm_common::{BandId, RoleId, UserId};

use crate::api::BandApi;

/// Outcome of a cache load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityLoad {
    /// Already cached, no request made
    Cached,
    /// Fetched now; number of entries received
    Fetched(usize),
    /// Could not be loaded; ranking falls back to the plain member list
    Unavailable,
}

/// Per-session member ranking for roles
#[derive(Debug)]
pub struct PriorityRanker {
    policy: RankingPolicy,
    cache: HashMap<RoleId, Vec<PriorityEntry>>,
}

impl PriorityRanker {
    pub fn new(policy: RankingPolicy) -> Self {
        Self {
            policy,
            cache: HashMap::new(),
        }
    }

    pub fn policy(&self) -> RankingPolicy {
        self.policy
    }

    pub fn is_loaded(&self, role_id: &RoleId) -> bool {
        self.cache.contains_key(role_id)
    }

    pub fn entries(&self, role_id: &RoleId) -> Option<&[PriorityEntry]> {
        self.cache.get(role_id).map(Vec::as_slice)
    }

    /// Load the priority list for `role` unless it is already cached
    pub async fn load(&mut self, api: &dyn BandApi, band_id: &BandId, role: &Role) -> PriorityLoad {
        if self.cache.contains_key(&role.id) {
            tracing::debug!(role_id = %role.id, "Priority list cache hit");
            return PriorityLoad::Cached;
        }

        if role.slug.is_empty() {
            tracing::warn!(role_id = %role.id, "Role has no slug, priority ranking unavailable");
            return PriorityLoad::Unavailable;
        }

        match api.get_priority_list(&role.slug, band_id).await {
            Ok(entries) => {
                let count = entries.len();
                tracing::debug!(role_id = %role.id, slug = %role.slug, entries = count, "Cached priority list");
                self.cache.insert(role.id.clone(), entries);
                PriorityLoad::Fetched(count)
            }
            Err(e) => {
                tracing::warn!(role_id = %role.id, slug = %role.slug, error = %e, "Priority list unavailable");
                PriorityLoad::Unavailable
            }
        }
    }

    /// Rank `members` for a role using whatever is cached
    pub fn rank(&self, role_id: &RoleId, members: &[Member]) -> Vec<Member> {
        let Some(entries) = self.cache.get(role_id) else {
            return members.to_vec();
        };

        // Duplicate entries for one member keep the highest priority
        let mut priorities: HashMap<&UserId, i64> = HashMap::new();
        for entry in entries {
            priorities
                .entry(&entry.user_id)
                .and_modify(|p| *p = (*p).max(entry.priority))
                .or_insert(entry.priority);
        }

        match self.policy {
            RankingPolicy::RestrictAndList => members
                .iter()
                .filter(|m| priorities.contains_key(&m.user_id))
                .cloned()
                .collect(),
            RankingPolicy::RankAll => {
                let mut ranked: Vec<(Option<i64>, &Member)> = members
                    .iter()
                    .map(|m| (priorities.get(&m.user_id).copied(), m))
                    .collect();
                // Stable sort: ties keep member catalog order
                ranked.sort_by(|(a, _), (b, _)| match (a, b) {
                    (Some(a), Some(b)) => b.cmp(a),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                });
                ranked.into_iter().map(|(_, m)| m.clone()).collect()
            }
        }
    }

    /// Load (if needed) then rank
    pub async fn rank_members(
        &mut self,
        api: &dyn BandApi,
        band_id: &BandId,
        role: &Role,
        members: &[Member],
    ) -> Vec<Member> {
        self.load(api, band_id, role).await;
        self.rank(&role.id, members)
    }

    /// Forget every cached list
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}
