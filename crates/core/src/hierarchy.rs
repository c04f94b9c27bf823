//! Hierarchy index: id → live record plus parent → ordered children.
//!
//! The index is the only structure the traversal, path and analysis modules
//! read. Links are plain ids resolved through flat maps, so every walk is a
//! pure graph traversal over ids. The store keeps the index in step with the
//! live records inside the same critical section as the record write.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexSet;

use crate::topic::Topic;
use crate::types::{Timestamp, TopicId};

/// Derived lookup over the live topic records.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    records: HashMap<TopicId, Topic>,
    children: HashMap<TopicId, IndexSet<TopicId>>,
    roots: IndexSet<TopicId>,
}

impl HierarchyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a set of live records.
    ///
    /// Children are linked in `(created_at, id)` order. A record whose parent
    /// is not among `topics` is indexed as a root; callers that need strict
    /// referential integrity check parents before building.
    pub fn from_topics(topics: impl IntoIterator<Item = Topic>) -> Self {
        let mut sorted: Vec<Topic> = topics.into_iter().collect();
        sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let mut index = Self::new();
        for topic in &sorted {
            index.records.insert(topic.id, Self::strip(topic.clone()));
        }
        for topic in &sorted {
            let parent = topic.parent_id.filter(|p| index.records.contains_key(p));
            if parent.is_none() && topic.parent_id.is_some() {
                if let Some(record) = index.records.get_mut(&topic.id) {
                    record.parent_id = None;
                }
            }
            index.link(topic.id, parent);
        }
        index
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: TopicId) -> bool {
        self.records.contains_key(&id)
    }

    /// Materialize the live record of `id` with its children filled in.
    pub fn get(&self, id: TopicId) -> Option<Topic> {
        self.records.get(&id).map(|record| {
            let mut topic = record.clone();
            topic.child_ids = self.child_ids(id).collect();
            topic
        })
    }

    /// Materialize several records, skipping ids that do not resolve.
    pub fn materialize(&self, ids: impl IntoIterator<Item = TopicId>) -> Vec<Topic> {
        ids.into_iter().filter_map(|id| self.get(id)).collect()
    }

    pub fn parent_of(&self, id: TopicId) -> Option<TopicId> {
        self.records.get(&id).and_then(|record| record.parent_id)
    }

    /// Children of `id` in insertion order.
    pub fn child_ids(&self, id: TopicId) -> impl Iterator<Item = TopicId> + '_ {
        self.children.get(&id).into_iter().flatten().copied()
    }

    pub fn child_count(&self, id: TopicId) -> usize {
        self.children.get(&id).map_or(0, IndexSet::len)
    }

    /// Root topics in insertion order.
    pub fn root_ids(&self) -> impl Iterator<Item = TopicId> + '_ {
        self.roots.iter().copied()
    }

    /// Every live id, tree by tree, each tree in level order.
    pub fn ordered_ids(&self) -> Vec<TopicId> {
        let mut ordered = Vec::with_capacity(self.records.len());
        let mut queue: VecDeque<TopicId> = self.roots.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            ordered.push(id);
            queue.extend(self.child_ids(id));
        }
        ordered
    }

    /// Undirected adjacency of `id`: its parent (if any) followed by its
    /// children.
    pub fn neighbors(&self, id: TopicId) -> Vec<TopicId> {
        let mut adjacent: Vec<TopicId> = self.parent_of(id).into_iter().collect();
        adjacent.extend(self.child_ids(id));
        adjacent
    }

    /// Ancestors of `id`, nearest parent first. Empty for roots and unknown ids.
    pub fn ancestor_ids(&self, id: TopicId) -> Vec<TopicId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if !seen.insert(parent) {
                break;
            }
            chain.push(parent);
            current = self.parent_of(parent);
        }
        chain
    }

    /// Descendants of `id` in pre-order, excluding `id` itself.
    pub fn descendant_ids(&self, id: TopicId) -> Vec<TopicId> {
        let mut found = Vec::new();
        let mut visited = HashSet::from([id]);
        let mut stack: Vec<TopicId> = self.child_ids(id).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            found.push(current);
            let mut next: Vec<TopicId> = self.child_ids(current).collect();
            next.reverse();
            stack.extend(next);
        }
        found
    }

    /// Whether `ancestor` lies strictly above `id`.
    pub fn is_ancestor_of(&self, ancestor: TopicId, id: TopicId) -> bool {
        ancestor != id && self.ancestor_ids(id).contains(&ancestor)
    }

    /// Number of edges from `id` up to its root.
    pub fn depth_from_root(&self, id: TopicId) -> Option<usize> {
        self.contains(id).then(|| self.ancestor_ids(id).len())
    }

    // -----------------------------------------------------------------------
    // Maintenance (store only)
    // -----------------------------------------------------------------------

    /// Register a new live record under its parent (or as a root).
    pub(crate) fn insert(&mut self, topic: Topic) {
        let id = topic.id;
        let parent = topic.parent_id;
        self.records.insert(id, Self::strip(topic));
        self.link(id, parent);
    }

    /// Replace the content of a live record, keeping its position.
    pub(crate) fn replace(&mut self, topic: Topic) {
        if let Some(record) = self.records.get_mut(&topic.id) {
            let parent = record.parent_id;
            *record = Self::strip(topic);
            record.parent_id = parent;
        }
    }

    /// Re-link `id` under `new_parent`, returning the previous parent.
    pub(crate) fn set_parent(
        &mut self,
        id: TopicId,
        new_parent: Option<TopicId>,
        updated_at: Timestamp,
    ) -> Option<TopicId> {
        let old_parent = self.parent_of(id);
        self.unlink(id, old_parent);
        if let Some(record) = self.records.get_mut(&id) {
            record.parent_id = new_parent;
            record.updated_at = updated_at;
        }
        self.link(id, new_parent);
        old_parent
    }

    /// Drop a live record. Its children, if any, are left dangling, so the
    /// store only calls this for leaves.
    pub(crate) fn remove(&mut self, id: TopicId) -> Option<Topic> {
        let parent = self.parent_of(id);
        let removed = self.records.remove(&id)?;
        self.unlink(id, parent);
        self.children.remove(&id);
        Some(removed)
    }

    fn link(&mut self, id: TopicId, parent: Option<TopicId>) {
        match parent {
            Some(parent) => {
                self.children.entry(parent).or_default().insert(id);
            }
            None => {
                self.roots.insert(id);
            }
        }
    }

    fn unlink(&mut self, id: TopicId, parent: Option<TopicId>) {
        match parent {
            Some(parent) => {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.shift_remove(&id);
                    if siblings.is_empty() {
                        self.children.remove(&parent);
                    }
                }
            }
            None => {
                self.roots.shift_remove(&id);
            }
        }
    }

    fn strip(mut topic: Topic) -> Topic {
        topic.child_ids.clear();
        topic
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
