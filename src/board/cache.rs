//! Keyed cache of fetched lists.
//!
//! Reads go through the cache; successful mutations invalidate the affected
//! keys so the next read refetches. Nothing is updated optimistically.

use std::collections::HashMap;
use std::sync::Arc;

use okr_common::{KanbanItem, LifeDomain, UserObjectiveInstance, Wheel};

use super::controller::BoardSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    KanbanItems(BoardSource),
    UserObjectiveInstances { user_id: i64 },
    Wheels,
    LifeDomains,
}

#[derive(Debug, Clone)]
pub enum CachedValue {
    KanbanItems(Arc<Vec<KanbanItem>>),
    UserObjectiveInstances(Arc<Vec<UserObjectiveInstance>>),
    Wheels(Arc<Vec<Wheel>>),
    LifeDomains(Arc<Vec<LifeDomain>>),
}

#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CachedValue>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<&CachedValue> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: QueryKey, value: CachedValue) {
        self.entries.insert(key, value);
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns whether an entry was dropped.
    pub fn invalidate(&mut self, key: &QueryKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            tracing::debug!(?key, "cache entry invalidated");
        }
        removed
    }

    /// Drop every entry whose key matches; returns how many were dropped.
    pub fn invalidate_where(&mut self, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !predicate(key));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn kanban_items(&self, source: BoardSource) -> Option<Arc<Vec<KanbanItem>>> {
        match self.get(&QueryKey::KanbanItems(source)) {
            Some(CachedValue::KanbanItems(items)) => Some(items.clone()),
            _ => None,
        }
    }

    pub fn wheels(&self) -> Option<Arc<Vec<Wheel>>> {
        match self.get(&QueryKey::Wheels) {
            Some(CachedValue::Wheels(wheels)) => Some(wheels.clone()),
            _ => None,
        }
    }

    pub fn life_domains(&self) -> Option<Arc<Vec<LifeDomain>>> {
        match self.get(&QueryKey::LifeDomains) {
            Some(CachedValue::LifeDomains(domains)) => Some(domains.clone()),
            _ => None,
        }
    }

    pub fn user_objective_instances(
        &self,
        user_id: i64,
    ) -> Option<Arc<Vec<UserObjectiveInstance>>> {
        match self.get(&QueryKey::UserObjectiveInstances { user_id }) {
            Some(CachedValue::UserObjectiveInstances(instances)) => Some(instances.clone()),
            _ => None,
        }
    }
}
