//! Per-organization cache of invitation lists.
//!
//! Reads go through [`InvitationCache::get`]; mutations invalidate. Entries
//! older than the time to live are treated as missing and pruned on the next
//! write. Invalidation never fails and never waits on the backend.
//!
//! Every invalidation bumps a generation. A reader takes the generation
//! before fetching and stores its result with [`InvitationCache::put_if_current`],
//! so a list fetched before an invalidation is never written back after it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::types::Invitation;

#[derive(Debug, Clone)]
struct Entry {
    invitations: Vec<Invitation>,
    fetched_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<Uuid, Entry>,
    generations: HashMap<Uuid, u64>,
    epoch: u64,
}

impl State {
    // Both counters only grow, so the sum changes whenever either does.
    fn generation(&self, organization_id: Uuid) -> u64 {
        self.epoch + self.generations.get(&organization_id).copied().unwrap_or(0)
    }

    fn prune(&mut self, ttl: Duration, now: DateTime<Utc>) {
        self.entries.retain(|_, entry| now - entry.fetched_at < ttl);
    }
}

#[derive(Debug, Clone)]
pub struct InvitationCache {
    state: Arc<RwLock<State>>,
    ttl: Duration,
}

impl Default for InvitationCache {
    fn default() -> Self {
        Self::new(Duration::seconds(30))
    }
}

impl InvitationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            ttl,
        }
    }

    /// Returns the cached list for an organization if it is still fresh.
    pub fn get(&self, organization_id: Uuid) -> Option<Vec<Invitation>> {
        let state = self.state.read().ok()?;
        let entry = state.entries.get(&organization_id)?;

        (Utc::now() - entry.fetched_at < self.ttl).then(|| entry.invitations.clone())
    }

    /// Current generation of an organization's entry. Pass it to
    /// [`put_if_current`](Self::put_if_current) after fetching.
    pub fn generation(&self, organization_id: Uuid) -> u64 {
        self.state
            .read()
            .map(|state| state.generation(organization_id))
            .unwrap_or(0)
    }

    /// Stores a list unconditionally.
    pub fn put(&self, organization_id: Uuid, invitations: Vec<Invitation>) {
        if let Ok(mut state) = self.state.write() {
            let now = Utc::now();
            state.prune(self.ttl, now);
            state.entries.insert(
                organization_id,
                Entry {
                    invitations,
                    fetched_at: now,
                },
            );
        }
    }

    /// Stores a list fetched at `generation`. Returns `false` and stores
    /// nothing when the organization was invalidated in the meantime.
    pub fn put_if_current(
        &self,
        organization_id: Uuid,
        generation: u64,
        invitations: Vec<Invitation>,
    ) -> bool {
        let Ok(mut state) = self.state.write() else {
            return false;
        };
        if state.generation(organization_id) != generation {
            return false;
        }

        let now = Utc::now();
        state.prune(self.ttl, now);
        state.entries.insert(
            organization_id,
            Entry {
                invitations,
                fetched_at: now,
            },
        );
        true
    }

    pub fn invalidate(&self, organization_id: Uuid) {
        if let Ok(mut state) = self.state.write() {
            state.entries.remove(&organization_id);
            *state.generations.entry(organization_id).or_insert(0) += 1;
        }
    }

    /// Drops every entry. Used after token-only mutations, where the
    /// organization is not known to the caller.
    pub fn invalidate_all(&self) {
        if let Ok(mut state) = self.state.write() {
            state.entries.clear();
            state.epoch += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|state| state.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
