//! Ancestry queries, pairwise relationship classification, and hierarchy
//! statistics.

use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::Serialize;

use crate::error::CoreError;
use crate::hierarchy::HierarchyIndex;
use crate::topic::Topic;
use crate::types::TopicId;

/// Distance reported for topics with no common ancestor.
pub const UNRELATED_DISTANCE: i64 = -1;

// ---------------------------------------------------------------------------
// Ancestry
// ---------------------------------------------------------------------------

/// Ancestors of `id`, nearest parent first, ending at the root.
pub fn ancestors(index: &HierarchyIndex, id: TopicId) -> Vec<Topic> {
    index.materialize(index.ancestor_ids(id))
}

/// Every topic below `id`, in pre-order.
pub fn descendants(index: &HierarchyIndex, id: TopicId) -> Vec<Topic> {
    index.materialize(index.descendant_ids(id))
}

/// `id` followed by its ancestors.
fn chain_including_self(index: &HierarchyIndex, id: TopicId) -> Vec<TopicId> {
    let mut chain = vec![id];
    chain.extend(index.ancestor_ids(id));
    chain
}

fn common_ancestor_id(index: &HierarchyIndex, a: TopicId, b: TopicId) -> Option<TopicId> {
    if !index.contains(a) || !index.contains(b) {
        return None;
    }
    let chain_a = chain_including_self(index, a);
    let chain_b = chain_including_self(index, b);
    chain_a.into_iter().find(|id| chain_b.contains(id))
}

/// Lowest common ancestor of `a` and `b`, where each topic counts as its own
/// ancestor. `None` if they sit in different trees or either id is unknown.
pub fn common_ancestor(index: &HierarchyIndex, a: TopicId, b: TopicId) -> Option<Topic> {
    common_ancestor_id(index, a, b).and_then(|id| index.get(id))
}

// ---------------------------------------------------------------------------
// Relationship classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    Same,
    ParentChild,
    ChildParent,
    Siblings,
    AncestorDescendant,
    DescendantAncestor,
    Cousins,
    Unrelated,
}

impl RelationshipKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipKind::Same => "same",
            RelationshipKind::ParentChild => "parent-child",
            RelationshipKind::ChildParent => "child-parent",
            RelationshipKind::Siblings => "siblings",
            RelationshipKind::AncestorDescendant => "ancestor-descendant",
            RelationshipKind::DescendantAncestor => "descendant-ancestor",
            RelationshipKind::Cousins => "cousins",
            RelationshipKind::Unrelated => "unrelated",
        }
    }
}

/// How topic `a` relates to topic `b`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Relationship {
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    pub description: String,
    /// Edges between the two topics through the tree, or
    /// [`UNRELATED_DISTANCE`].
    pub distance: i64,
    pub common_ancestor: Option<Topic>,
}

/// Classify the relationship of `a` to `b`.
///
/// Checks run in a fixed order: same topic, direct parent link, shared
/// parent, transitive ancestry, common ancestor, and finally unrelated.
pub fn relationship(
    index: &HierarchyIndex,
    a: TopicId,
    b: TopicId,
) -> Result<Relationship, CoreError> {
    let topic_a = index.get(a).ok_or_else(|| CoreError::topic_not_found(a))?;
    let topic_b = index.get(b).ok_or_else(|| CoreError::topic_not_found(b))?;
    let (name_a, name_b) = (&topic_a.name, &topic_b.name);

    let classify = |kind: RelationshipKind, description: String, distance: i64, lca: Option<Topic>| {
        Relationship {
            kind,
            description,
            distance,
            common_ancestor: lca,
        }
    };

    if a == b {
        return Ok(classify(
            RelationshipKind::Same,
            format!("'{name_a}' is the same topic"),
            0,
            None,
        ));
    }
    if topic_b.parent_id == Some(a) {
        return Ok(classify(
            RelationshipKind::ParentChild,
            format!("'{name_a}' is the parent of '{name_b}'"),
            1,
            None,
        ));
    }
    if topic_a.parent_id == Some(b) {
        return Ok(classify(
            RelationshipKind::ChildParent,
            format!("'{name_a}' is a child of '{name_b}'"),
            1,
            None,
        ));
    }
    if let (Some(pa), Some(pb)) = (topic_a.parent_id, topic_b.parent_id) {
        if pa == pb {
            return Ok(classify(
                RelationshipKind::Siblings,
                format!("'{name_a}' and '{name_b}' share the same parent"),
                2,
                index.get(pa),
            ));
        }
    }

    let depth_a = index.ancestor_ids(a).len() as i64;
    let depth_b = index.ancestor_ids(b).len() as i64;

    if index.is_ancestor_of(a, b) {
        let distance = depth_b - depth_a;
        return Ok(classify(
            RelationshipKind::AncestorDescendant,
            format!("'{name_a}' is an ancestor of '{name_b}' ({distance} levels up)"),
            distance,
            None,
        ));
    }
    if index.is_ancestor_of(b, a) {
        let distance = depth_a - depth_b;
        return Ok(classify(
            RelationshipKind::DescendantAncestor,
            format!("'{name_a}' is a descendant of '{name_b}' ({distance} levels down)"),
            distance,
            None,
        ));
    }

    match common_ancestor_id(index, a, b) {
        Some(lca) => {
            let depth_lca = index.ancestor_ids(lca).len() as i64;
            let distance = (depth_a - depth_lca) + (depth_b - depth_lca);
            let lca_topic = index.get(lca);
            let lca_name = lca_topic.as_ref().map(|t| t.name.as_str()).unwrap_or_default();
            Ok(classify(
                RelationshipKind::Cousins,
                format!("'{name_a}' and '{name_b}' are cousins through '{lca_name}'"),
                distance,
                lca_topic,
            ))
        }
        None => Ok(classify(
            RelationshipKind::Unrelated,
            format!("'{name_a}' and '{name_b}' are in different trees"),
            UNRELATED_DISTANCE,
            None,
        )),
    }
}

// ---------------------------------------------------------------------------
// Hierarchy statistics
// ---------------------------------------------------------------------------

/// Shape summary of a tree, or of the whole forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HierarchyStatistics {
    pub total_topics: usize,
    pub max_depth: usize,
    pub leaf_topics: usize,
    /// Average child count over internal (non-leaf) topics.
    pub branching_factor: f64,
    pub topics_by_level: BTreeMap<usize, usize>,
}

/// Summarize the tree under `root`, or every tree when `root` is `None`.
/// Levels count from the starting topic(s) at level 0. An unknown root
/// reports zeros.
pub fn hierarchy_statistics(index: &HierarchyIndex, root: Option<TopicId>) -> HierarchyStatistics {
    let starts: Vec<TopicId> = match root {
        Some(id) if index.contains(id) => vec![id],
        Some(_) => return HierarchyStatistics::default(),
        None => index.root_ids().collect(),
    };

    let mut stats = HierarchyStatistics::default();
    let mut internal = 0usize;
    let mut child_total = 0usize;
    let mut visited: HashSet<TopicId> = starts.iter().copied().collect();
    let mut queue: VecDeque<(TopicId, usize)> = starts.into_iter().map(|id| (id, 0)).collect();

    while let Some((id, level)) = queue.pop_front() {
        stats.total_topics += 1;
        stats.max_depth = stats.max_depth.max(level);
        *stats.topics_by_level.entry(level).or_insert(0) += 1;

        let children = index.child_count(id);
        if children == 0 {
            stats.leaf_topics += 1;
        } else {
            internal += 1;
            child_total += children;
        }
        for child in index.child_ids(id) {
            if visited.insert(child) {
                queue.push_back((child, level + 1));
            }
        }
    }

    stats.branching_factor = if internal == 0 {
        0.0
    } else {
        child_total as f64 / internal as f64
    };
    stats
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
