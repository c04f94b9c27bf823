//! Entity store: live topic records, their version history, and the
//! hierarchy index derived from them.
//!
//! All state sits behind a single `RwLock`. Mutations hold the write lock
//! across validation, the record write and the index update, so version
//! numbers stay gap-free, concurrent moves cannot race past the cycle check,
//! and readers never observe a half-applied change. Each query holds the read
//! lock for its whole duration.
//!
//! Mutations do not notify anyone themselves. They return a [`Committed`]
//! value carrying the list of [`TopicChange`]s the caller should forward.

use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::Serialize;

use crate::analysis::{self, HierarchyStatistics, Relationship};
use crate::diff::{compute_line_diff, DiffLine};
use crate::error::CoreError;
use crate::hierarchy::HierarchyIndex;
use crate::path::{self, TopicAtDistance};
use crate::search::{self, SearchResult};
use crate::topic::{validate_fields, NewTopic, StoreSnapshot, Topic, TopicRecord, TopicUpdate};
use crate::traversal::{self, TraversalMethod, TraversalStatistics};
use crate::types::{TopicId, Version};

// ---------------------------------------------------------------------------
// Outbound changes
// ---------------------------------------------------------------------------

/// A committed mutation, for forwarding to external collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TopicChange {
    Created {
        topic: Topic,
    },
    Updated {
        topic: Topic,
        previous_version: Version,
    },
    Moved {
        topic: Topic,
        from: Option<TopicId>,
        to: Option<TopicId>,
    },
    Deleted {
        id: TopicId,
        version: Version,
    },
}

impl TopicChange {
    pub fn topic_id(&self) -> TopicId {
        match self {
            TopicChange::Created { topic }
            | TopicChange::Updated { topic, .. }
            | TopicChange::Moved { topic, .. } => topic.id,
            TopicChange::Deleted { id, .. } => *id,
        }
    }

    /// Version of the topic after the change (the removed version for deletes).
    pub fn version(&self) -> Version {
        match self {
            TopicChange::Created { topic }
            | TopicChange::Updated { topic, .. }
            | TopicChange::Moved { topic, .. } => topic.version,
            TopicChange::Deleted { version, .. } => *version,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            TopicChange::Created { .. } => "created",
            TopicChange::Updated { .. } => "updated",
            TopicChange::Moved { .. } => "moved",
            TopicChange::Deleted { .. } => "deleted",
        }
    }
}

/// The result of a mutation plus the changes it produced (empty if nothing
/// changed).
#[derive(Debug, Clone)]
pub struct Committed<T> {
    pub value: T,
    pub changes: Vec<TopicChange>,
}

impl<T> Committed<T> {
    fn new(value: T, changes: Vec<TopicChange>) -> Self {
        Self { value, changes }
    }

    pub fn into_parts(self) -> (T, Vec<TopicChange>) {
        (self.value, self.changes)
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StoreState {
    index: HierarchyIndex,
    /// Snapshots per id in ascending version order, children stripped.
    history: HashMap<TopicId, Vec<Topic>>,
}

impl StoreState {
    /// Fill the derived children of a snapshot from the live index.
    fn with_children(&self, mut topic: Topic) -> Topic {
        topic.child_ids = self.index.child_ids(topic.id).collect();
        topic
    }

    fn live(&self, id: TopicId) -> Result<Topic, CoreError> {
        self.index.get(id).ok_or_else(|| CoreError::topic_not_found(id))
    }

    fn chain(&self, id: TopicId) -> Result<&Vec<Topic>, CoreError> {
        self.history
            .get(&id)
            .ok_or_else(|| CoreError::topic_not_found(id))
    }
}

/// Versioned topic store with a live hierarchy index.
#[derive(Debug, Default)]
pub struct TopicStore {
    state: RwLock<StoreState>,
}

impl TopicStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Poisoning is recovered: state is only written after every check passes.
    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the index under one read lock, after confirming that
    /// every id in `ids` is live.
    ///
    /// Callers that answer `NotFound` for unknown ids use this so the check
    /// and the query observe the same state.
    pub fn with_live<R>(
        &self,
        ids: &[TopicId],
        f: impl FnOnce(&HierarchyIndex) -> R,
    ) -> Result<R, CoreError> {
        let state = self.read();
        if let Some(&missing) = ids.iter().find(|&&id| !state.index.contains(id)) {
            return Err(CoreError::topic_not_found(missing));
        }
        Ok(f(&state.index))
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Rebuild a store from a persisted snapshot.
    ///
    /// Rejects snapshots whose version chains have gaps, whose live records
    /// and chains disagree, whose parents do not resolve, or whose hierarchy
    /// contains a cycle. Every problem found is reported.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, CoreError> {
        let mut violations = Vec::new();

        let mut live: HashMap<TopicId, TopicRecord> = HashMap::new();
        for record in snapshot.topics {
            if live.contains_key(&record.id) {
                violations.push(format!("Topic {} appears more than once", record.id));
                continue;
            }
            live.insert(record.id, record);
        }

        let mut history: HashMap<TopicId, Vec<Topic>> = HashMap::new();
        for record in snapshot.versions {
            history.entry(record.id).or_default().push(Topic::from(record));
        }
        for (id, chain) in history.iter_mut() {
            chain.sort_by_key(|t| t.version);
            let dense = chain
                .iter()
                .enumerate()
                .all(|(i, t)| t.version as usize == i + 1);
            if !dense {
                violations.push(format!("Topic {id} has non-contiguous versions"));
            }
            match live.get(id) {
                None => violations.push(format!("Topic {id} has history but no live record")),
                Some(record) if chain.last().map(|t| t.version) != Some(record.version) => {
                    violations.push(format!(
                        "Topic {id} live version {} does not match its history",
                        record.version
                    ));
                }
                Some(_) => {}
            }
        }

        for record in live.values() {
            if !history.contains_key(&record.id) {
                violations.push(format!("Topic {} has no version history", record.id));
            }
            if let Some(parent) = record.parent_id {
                if !live.contains_key(&parent) {
                    violations.push(format!(
                        "Topic {} references missing parent {parent}",
                        record.id
                    ));
                }
            }
        }

        if let Some(id) = find_cycle(&live) {
            violations.push(format!("Topic {id} is part of a parent cycle"));
        }

        if !violations.is_empty() {
            return Err(CoreError::Validation(violations));
        }

        let index = HierarchyIndex::from_topics(live.into_values().map(Topic::from));
        Ok(Self {
            state: RwLock::new(StoreState { index, history }),
        })
    }

    /// Export every live record and every historical version.
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.read();
        let order = state.index.ordered_ids();

        let topics = order
            .iter()
            .filter_map(|id| state.index.get(*id))
            .map(|t| t.to_record())
            .collect();
        let versions = order
            .iter()
            .filter_map(|id| state.history.get(id))
            .flatten()
            .map(Topic::to_record)
            .collect();

        StoreSnapshot { topics, versions }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Create a topic at version 1, optionally under an existing parent.
    pub fn create(&self, input: NewTopic) -> Result<Committed<Topic>, CoreError> {
        validate_fields(&input.name, &input.content)?;

        let mut state = self.write();
        if let Some(parent) = input.parent_id {
            if !state.index.contains(parent) {
                return Err(CoreError::topic_not_found(parent));
            }
        }

        let now = Utc::now();
        let topic = Topic {
            id: TopicId::new_v4(),
            version: 1,
            name: input.name.trim().to_string(),
            content: input.content,
            parent_id: input.parent_id,
            child_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let id = topic.id;

        state.history.insert(id, vec![topic.clone()]);
        state.index.insert(topic);

        let created = state.live(id)?;
        Ok(Committed::new(
            created.clone(),
            vec![TopicChange::Created { topic: created }],
        ))
    }

    /// Append a new version with updated name and/or content.
    ///
    /// The parent is carried over and the children are re-derived from the
    /// index. Fails if neither field is supplied.
    pub fn create_new_version(
        &self,
        id: TopicId,
        update: TopicUpdate,
    ) -> Result<Committed<Topic>, CoreError> {
        if update.name.is_none() && update.content.is_none() {
            return Err(CoreError::validation(
                "At least one of name or content must be provided",
            ));
        }

        let mut state = self.write();
        let current = state.live(id)?;

        let name = update
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| current.name.clone());
        let content = update.content.unwrap_or_else(|| current.content.clone());
        validate_fields(&name, &content)?;

        let next = Topic {
            id,
            version: current.version + 1,
            name,
            content,
            parent_id: current.parent_id,
            child_ids: Vec::new(),
            created_at: current.created_at,
            updated_at: Utc::now(),
        };

        state.history.entry(id).or_default().push(next.clone());
        state.index.replace(next);

        let updated = state.live(id)?;
        Ok(Committed::new(
            updated.clone(),
            vec![TopicChange::Updated {
                topic: updated,
                previous_version: current.version,
            }],
        ))
    }

    /// Re-parent a topic in place. The version is not bumped.
    ///
    /// Moving under the topic itself or any of its descendants fails with
    /// `CircularReference` and leaves the tree untouched. Moving to the
    /// current parent is a no-op with no changes.
    pub fn move_topic(
        &self,
        id: TopicId,
        new_parent: Option<TopicId>,
    ) -> Result<Committed<Topic>, CoreError> {
        let mut state = self.write();
        let current = state.live(id)?;

        if let Some(parent) = new_parent {
            if parent == id {
                return Err(CoreError::CircularReference {
                    id,
                    parent_id: parent,
                });
            }
            if !state.index.contains(parent) {
                return Err(CoreError::topic_not_found(parent));
            }
            if state.index.descendant_ids(id).contains(&parent) {
                return Err(CoreError::CircularReference {
                    id,
                    parent_id: parent,
                });
            }
        }

        if current.parent_id == new_parent {
            return Ok(Committed::new(current, Vec::new()));
        }

        let from = state.index.set_parent(id, new_parent, Utc::now());
        let moved = state.live(id)?;
        Ok(Committed::new(
            moved.clone(),
            vec![TopicChange::Moved {
                topic: moved,
                from,
                to: new_parent,
            }],
        ))
    }

    /// Remove a leaf topic and its whole version chain.
    ///
    /// Returns `false` (with no changes) when the id is unknown.
    pub fn delete(&self, id: TopicId) -> Result<Committed<bool>, CoreError> {
        let mut state = self.write();
        let Some(current) = state.index.get(id) else {
            return Ok(Committed::new(false, Vec::new()));
        };

        let child_count = current.child_ids.len();
        if child_count > 0 {
            return Err(CoreError::HasChildren { id, child_count });
        }

        state.index.remove(id);
        state.history.remove(&id);
        Ok(Committed::new(
            true,
            vec![TopicChange::Deleted {
                id,
                version: current.version,
            }],
        ))
    }

    // -----------------------------------------------------------------------
    // Records and history
    // -----------------------------------------------------------------------

    pub fn get(&self, id: TopicId) -> Option<Topic> {
        self.read().index.get(id)
    }

    /// Like [`get`](Self::get) but fails with `NotFound`.
    pub fn require(&self, id: TopicId) -> Result<Topic, CoreError> {
        self.read().live(id)
    }

    pub fn contains(&self, id: TopicId) -> bool {
        self.read().index.contains(id)
    }

    pub fn len(&self) -> usize {
        self.read().index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().index.is_empty()
    }

    /// All live topics, tree by tree in level order.
    pub fn list(&self) -> Vec<Topic> {
        let state = self.read();
        state.index.materialize(state.index.ordered_ids())
    }

    pub fn roots(&self) -> Vec<Topic> {
        let state = self.read();
        state.index.materialize(state.index.root_ids())
    }

    pub fn children(&self, id: TopicId) -> Result<Vec<Topic>, CoreError> {
        let state = self.read();
        state.live(id)?;
        Ok(state.index.materialize(state.index.child_ids(id)))
    }

    /// Every version of `id`, newest first.
    pub fn history(&self, id: TopicId) -> Result<Vec<Topic>, CoreError> {
        let state = self.read();
        let chain = state.chain(id)?;
        Ok(chain
            .iter()
            .rev()
            .map(|t| state.with_children(t.clone()))
            .collect())
    }

    /// One historical snapshot of `id`.
    pub fn get_version(&self, id: TopicId, version: Version) -> Result<Topic, CoreError> {
        let state = self.read();
        state
            .chain(id)?
            .iter()
            .find(|t| t.version == version)
            .map(|t| state.with_children(t.clone()))
            .ok_or(CoreError::VersionNotFound { id, version })
    }

    /// Line diff of the content of two versions of `id`.
    pub fn diff_versions(
        &self,
        id: TopicId,
        from: Version,
        to: Version,
    ) -> Result<Vec<DiffLine>, CoreError> {
        let old = self.get_version(id, from)?;
        let new = self.get_version(id, to)?;
        Ok(compute_line_diff(&old.content, &new.content))
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    pub fn traverse(&self, root: TopicId, method: TraversalMethod) -> Vec<Topic> {
        traversal::traverse(&self.read().index, root, method)
    }

    pub fn statistics(&self, root: TopicId) -> TraversalStatistics {
        traversal::statistics(&self.read().index, root)
    }

    pub fn subtree_height(&self, id: TopicId) -> Option<usize> {
        traversal::subtree_height(&self.read().index, id)
    }

    pub fn depth_from_root(&self, id: TopicId) -> Option<usize> {
        traversal::depth_from_root(&self.read().index, id)
    }

    // -----------------------------------------------------------------------
    // Paths
    // -----------------------------------------------------------------------

    pub fn shortest_path(&self, from: TopicId, to: TopicId) -> Option<Vec<Topic>> {
        path::shortest_path(&self.read().index, from, to)
    }

    pub fn all_paths(&self, from: TopicId, to: TopicId, limit: usize) -> Vec<Vec<Topic>> {
        path::all_paths(&self.read().index, from, to, limit)
    }

    pub fn topics_within_distance(&self, center: TopicId, max_distance: usize) -> Vec<TopicAtDistance> {
        path::topics_within_distance(&self.read().index, center, max_distance)
    }

    pub fn path_distance(&self, from: TopicId, to: TopicId) -> Option<usize> {
        path::path_distance(&self.read().index, from, to)
    }

    // -----------------------------------------------------------------------
    // Hierarchy analysis
    // -----------------------------------------------------------------------

    pub fn ancestors(&self, id: TopicId) -> Vec<Topic> {
        analysis::ancestors(&self.read().index, id)
    }

    pub fn descendants(&self, id: TopicId) -> Vec<Topic> {
        analysis::descendants(&self.read().index, id)
    }

    pub fn common_ancestor(&self, a: TopicId, b: TopicId) -> Option<Topic> {
        analysis::common_ancestor(&self.read().index, a, b)
    }

    pub fn relationship(&self, a: TopicId, b: TopicId) -> Result<Relationship, CoreError> {
        analysis::relationship(&self.read().index, a, b)
    }

    pub fn hierarchy_statistics(&self, root: Option<TopicId>) -> HierarchyStatistics {
        analysis::hierarchy_statistics(&self.read().index, root)
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Relevance search over every live topic, at most `limit` results.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let mut results = search::search(query, &self.list());
        results.truncate(limit);
        results
    }

    /// Fuzzy search over every live topic, at most `limit` results.
    pub fn fuzzy_search(
        &self,
        query: &str,
        threshold: f64,
        limit: usize,
    ) -> Result<Vec<SearchResult>, CoreError> {
        search::validate_threshold(threshold)?;
        let mut results = search::fuzzy_search(query, &self.list(), threshold);
        results.truncate(limit);
        Ok(results)
    }
}

/// First id found on a parent cycle, if any.
fn find_cycle(live: &HashMap<TopicId, TopicRecord>) -> Option<TopicId> {
    let mut cleared: HashSet<TopicId> = HashSet::new();
    for &start in live.keys() {
        let mut on_walk = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if cleared.contains(&id) {
                break;
            }
            if !on_walk.insert(id) {
                return Some(id);
            }
            current = live.get(&id).and_then(|r| r.parent_id);
        }
        cleared.extend(on_walk);
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
