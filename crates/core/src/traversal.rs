//! Tree traversal orders and subtree statistics.
//!
//! Every walk is iterative with an explicit stack or queue, so deep trees
//! cannot overflow the call stack. An unknown root yields an empty result.
//!
//! Two depth metrics exist and are named apart:
//! - [`subtree_height`]: edges from a topic down to its deepest leaf.
//! - [`depth_from_root`]: edges from a topic up to the root of its tree.
//!
//! [`statistics`] measures depth from the statistics root.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::hierarchy::HierarchyIndex;
use crate::topic::Topic;
use crate::types::TopicId;

// ---------------------------------------------------------------------------
// Traversal method
// ---------------------------------------------------------------------------

/// Enumeration order for [`traverse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalMethod {
    DepthFirst,
    BreadthFirst,
    PreOrder,
    PostOrder,
}

impl TraversalMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            TraversalMethod::DepthFirst => "depth-first",
            TraversalMethod::BreadthFirst => "breadth-first",
            TraversalMethod::PreOrder => "pre-order",
            TraversalMethod::PostOrder => "post-order",
        }
    }
}

impl FromStr for TraversalMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "depth-first" | "dfs" => Ok(TraversalMethod::DepthFirst),
            "breadth-first" | "bfs" => Ok(TraversalMethod::BreadthFirst),
            "pre-order" | "preorder" => Ok(TraversalMethod::PreOrder),
            "post-order" | "postorder" => Ok(TraversalMethod::PostOrder),
            other => Err(CoreError::validation(format!(
                "Invalid traversal method '{other}'. Must be one of: \
                 depth-first, breadth-first, pre-order, post-order"
            ))),
        }
    }
}

/// Enumerate the subtree rooted at `root` in the requested order.
pub fn traverse(index: &HierarchyIndex, root: TopicId, method: TraversalMethod) -> Vec<Topic> {
    match method {
        TraversalMethod::DepthFirst => depth_first(index, root),
        TraversalMethod::BreadthFirst => breadth_first(index, root),
        TraversalMethod::PreOrder => pre_order(index, root),
        TraversalMethod::PostOrder => post_order(index, root),
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Depth-first descent, each node visited once.
///
/// The visited set guards against malformed input even though the store
/// never admits a cycle.
pub fn depth_first(index: &HierarchyIndex, root: TopicId) -> Vec<Topic> {
    if !index.contains(root) {
        return Vec::new();
    }

    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        order.push(id);
        let children: Vec<TopicId> = index.child_ids(id).collect();
        stack.extend(children.into_iter().rev());
    }
    index.materialize(order)
}

/// Level-order enumeration via a FIFO queue.
pub fn breadth_first(index: &HierarchyIndex, root: TopicId) -> Vec<Topic> {
    if !index.contains(root) {
        return Vec::new();
    }

    let mut order = Vec::new();
    let mut visited = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    while let Some(id) = queue.pop_front() {
        order.push(id);
        for child in index.child_ids(id) {
            if visited.insert(child) {
                queue.push_back(child);
            }
        }
    }
    index.materialize(order)
}

/// Root first, then each child subtree left to right.
pub fn pre_order(index: &HierarchyIndex, root: TopicId) -> Vec<Topic> {
    if !index.contains(root) {
        return Vec::new();
    }

    let mut order = vec![root];
    order.extend(index.descendant_ids(root));
    index.materialize(order)
}

/// Each child subtree left to right, then the root.
pub fn post_order(index: &HierarchyIndex, root: TopicId) -> Vec<Topic> {
    if !index.contains(root) {
        return Vec::new();
    }

    // (id, children already pushed)
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![(root, false)];
    while let Some((id, expanded)) = stack.pop() {
        if expanded {
            order.push(id);
            continue;
        }
        if !visited.insert(id) {
            continue;
        }
        stack.push((id, true));
        let children: Vec<TopicId> = index.child_ids(id).collect();
        stack.extend(children.into_iter().rev().map(|child| (child, false)));
    }
    index.materialize(order)
}

// ---------------------------------------------------------------------------
// Depth metrics
// ---------------------------------------------------------------------------

/// Distance from `id` down to its deepest leaf descendant (0 for a leaf).
pub fn subtree_height(index: &HierarchyIndex, id: TopicId) -> Option<usize> {
    if !index.contains(id) {
        return None;
    }
    Some(levels(index, id).keys().next_back().copied().unwrap_or(0))
}

/// Distance from `id` up to the root of its tree (0 for a root).
pub fn depth_from_root(index: &HierarchyIndex, id: TopicId) -> Option<usize> {
    index.depth_from_root(id)
}

/// Number of nodes at each depth below `root` (root at depth 0).
fn levels(index: &HierarchyIndex, root: TopicId) -> BTreeMap<usize, usize> {
    let mut by_depth = BTreeMap::new();
    let mut visited = HashSet::from([root]);
    let mut queue = VecDeque::from([(root, 0usize)]);
    while let Some((id, depth)) = queue.pop_front() {
        *by_depth.entry(depth).or_insert(0) += 1;
        for child in index.child_ids(id) {
            if visited.insert(child) {
                queue.push_back((child, depth + 1));
            }
        }
    }
    by_depth
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Shape summary of one subtree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TraversalStatistics {
    pub total_nodes: usize,
    pub max_depth: usize,
    pub leaf_count: usize,
    pub average_depth: f64,
    pub nodes_by_depth: BTreeMap<usize, usize>,
}

/// Summarize the subtree rooted at `root`. An unknown root reports zeros.
pub fn statistics(index: &HierarchyIndex, root: TopicId) -> TraversalStatistics {
    if !index.contains(root) {
        return TraversalStatistics::default();
    }

    let nodes_by_depth = levels(index, root);
    let total_nodes: usize = nodes_by_depth.values().sum();
    let depth_sum: usize = nodes_by_depth.iter().map(|(depth, n)| depth * n).sum();
    let leaf_count = std::iter::once(root)
        .chain(index.descendant_ids(root))
        .filter(|id| index.child_count(*id) == 0)
        .count();

    TraversalStatistics {
        total_nodes,
        max_depth: nodes_by_depth.keys().next_back().copied().unwrap_or(0),
        leaf_count,
        average_depth: if total_nodes == 0 {
            0.0
        } else {
            depth_sum as f64 / total_nodes as f64
        },
        nodes_by_depth,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
