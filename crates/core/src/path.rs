//! Path finding over the live tree viewed as an undirected graph.
//!
//! Each parent–child link is one edge of weight 1 that may be walked in
//! either direction. Within one tree there is exactly one simple path between
//! two topics; topics in different trees are disconnected.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::hierarchy::HierarchyIndex;
use crate::topic::Topic;
use crate::types::TopicId;

/// Default cap on the number of paths returned by [`all_paths`].
pub const DEFAULT_MAX_PATHS: usize = 100;

/// Hard upper bound for a caller-supplied path limit.
pub const MAX_PATHS_LIMIT: usize = 1000;

/// Clamp a caller-supplied path limit to `1..=MAX_PATHS_LIMIT`.
pub fn clamp_path_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_MAX_PATHS).clamp(1, MAX_PATHS_LIMIT)
}

/// A topic found by [`topics_within_distance`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicAtDistance {
    pub topic: Topic,
    pub distance: usize,
}

/// Shortest path from `from` to `to`, both ends included.
///
/// Uniform edge weights make breadth-first order equivalent to Dijkstra;
/// among equally short candidates the first one discovered wins. Returns
/// `None` if either id is unknown or the two are disconnected.
pub fn shortest_path(index: &HierarchyIndex, from: TopicId, to: TopicId) -> Option<Vec<Topic>> {
    shortest_path_ids(index, from, to).map(|ids| index.materialize(ids))
}

fn shortest_path_ids(index: &HierarchyIndex, from: TopicId, to: TopicId) -> Option<Vec<TopicId>> {
    if !index.contains(from) || !index.contains(to) {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }

    // node → predecessor on the first-discovered shortest route
    let mut previous: HashMap<TopicId, TopicId> = HashMap::new();
    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);

    while let Some(current) = queue.pop_front() {
        for neighbor in index.neighbors(current) {
            if !visited.insert(neighbor) {
                continue;
            }
            previous.insert(neighbor, current);
            if neighbor == to {
                let mut path = vec![to];
                let mut step = to;
                while let Some(&prev) = previous.get(&step) {
                    path.push(prev);
                    step = prev;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(neighbor);
        }
    }

    None
}

/// Number of edges on the shortest path, or `None` if there is no path.
pub fn path_distance(index: &HierarchyIndex, from: TopicId, to: TopicId) -> Option<usize> {
    shortest_path_ids(index, from, to).map(|path| path.len() - 1)
}

/// Enumerate simple paths from `from` to `to`, stopping after `limit` paths.
///
/// Depth-first with a visited set scoped to the current path, so a topic may
/// appear on several paths but never twice on one. The walk keeps its own
/// stack of neighbor cursors instead of recursing.
pub fn all_paths(
    index: &HierarchyIndex,
    from: TopicId,
    to: TopicId,
    limit: usize,
) -> Vec<Vec<Topic>> {
    if !index.contains(from) || !index.contains(to) || limit == 0 {
        return Vec::new();
    }
    if from == to {
        return vec![index.materialize([from])];
    }

    let mut found: Vec<Vec<TopicId>> = Vec::new();
    let mut path = vec![from];
    let mut on_path = HashSet::from([from]);
    // One frame per path element: its neighbors and the next one to try.
    let mut frames: Vec<(Vec<TopicId>, usize)> = vec![(index.neighbors(from), 0)];

    while let Some((neighbors, cursor)) = frames.last_mut() {
        if *cursor >= neighbors.len() {
            frames.pop();
            if let Some(done) = path.pop() {
                on_path.remove(&done);
            }
            continue;
        }

        let next = neighbors[*cursor];
        *cursor += 1;
        if on_path.contains(&next) {
            continue;
        }
        if next == to {
            let mut complete = path.clone();
            complete.push(to);
            found.push(complete);
            if found.len() >= limit {
                break;
            }
            continue;
        }

        path.push(next);
        on_path.insert(next);
        frames.push((index.neighbors(next), 0));
    }

    found
        .into_iter()
        .map(|ids| index.materialize(ids))
        .collect()
}

/// Every topic reachable from `center` within `max_distance` edges,
/// ascending by distance (the center itself at distance 0).
pub fn topics_within_distance(
    index: &HierarchyIndex,
    center: TopicId,
    max_distance: usize,
) -> Vec<TopicAtDistance> {
    if !index.contains(center) {
        return Vec::new();
    }

    let mut reached: Vec<(TopicId, usize)> = Vec::new();
    let mut visited = HashSet::from([center]);
    let mut queue = VecDeque::from([(center, 0usize)]);

    while let Some((current, distance)) = queue.pop_front() {
        reached.push((current, distance));
        if distance == max_distance {
            continue;
        }
        for neighbor in index.neighbors(current) {
            if visited.insert(neighbor) {
                queue.push_back((neighbor, distance + 1));
            }
        }
    }

    // FIFO order already ascends by distance; keep the sort stable anyway.
    reached.sort_by_key(|(_, distance)| *distance);
    reached
        .into_iter()
        .filter_map(|(id, distance)| {
            index
                .get(id)
                .map(|topic| TopicAtDistance { topic, distance })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::tests::{fixture, topic};

    fn ids(topics: &[Topic]) -> Vec<TopicId> {
        topics.iter().map(|t| t.id).collect()
    }

    // -- shortest_path -------------------------------------------------------

    #[test]
    fn shortest_path_goes_up_then_down() {
        let f = fixture();
        let path = shortest_path(&f.index, f.a1, f.b1).unwrap();
        assert_eq!(ids(&path), vec![f.a1, f.a, f.root, f.b, f.b1]);
    }

    #[test]
    fn shortest_path_to_self_is_single_element() {
        let f = fixture();
        let path = shortest_path(&f.index, f.a, f.a).unwrap();
        assert_eq!(ids(&path), vec![f.a]);
        assert_eq!(path_distance(&f.index, f.a, f.a), Some(0));
    }

    #[test]
    fn shortest_path_unknown_id_is_none() {
        let f = fixture();
        assert!(shortest_path(&f.index, f.a, TopicId::new_v4()).is_none());
        assert!(shortest_path(&f.index, TopicId::new_v4(), f.a).is_none());
    }

    #[test]
    fn disconnected_trees_have_no_path() {
        let one = topic("one", None, 0);
        let two = topic("two", None, 1);
        let (a, b) = (one.id, two.id);
        let index = HierarchyIndex::from_topics(vec![one, two]);
        assert!(shortest_path(&index, a, b).is_none());
        assert_eq!(path_distance(&index, a, b), None);
        assert!(all_paths(&index, a, b, DEFAULT_MAX_PATHS).is_empty());
    }

    #[test]
    fn path_length_matches_distance_for_every_pair() {
        let f = fixture();
        let all = [f.root, f.a, f.a1, f.a2, f.b, f.b1];
        for &x in &all {
            for &y in &all {
                let path = shortest_path(&f.index, x, y).unwrap();
                assert_eq!(Some(path.len() - 1), path_distance(&f.index, x, y));
            }
        }
    }

    // -- all_paths -----------------------------------------------------------

    #[test]
    fn all_paths_in_tree_is_the_unique_path() {
        let f = fixture();
        let paths = all_paths(&f.index, f.a2, f.b, DEFAULT_MAX_PATHS);
        assert_eq!(paths.len(), 1);
        assert_eq!(ids(&paths[0]), vec![f.a2, f.a, f.root, f.b]);
    }

    #[test]
    fn all_paths_to_self() {
        let f = fixture();
        let paths = all_paths(&f.index, f.b, f.b, DEFAULT_MAX_PATHS);
        assert_eq!(paths.len(), 1);
        assert_eq!(ids(&paths[0]), vec![f.b]);
    }

    #[test]
    fn all_paths_zero_limit_is_empty() {
        let f = fixture();
        assert!(all_paths(&f.index, f.a, f.b, 0).is_empty());
    }

    #[test]
    fn clamp_path_limit_bounds() {
        assert_eq!(clamp_path_limit(None), DEFAULT_MAX_PATHS);
        assert_eq!(clamp_path_limit(Some(0)), 1);
        assert_eq!(clamp_path_limit(Some(5000)), MAX_PATHS_LIMIT);
        assert_eq!(clamp_path_limit(Some(7)), 7);
    }

    // -- topics_within_distance ----------------------------------------------

    #[test]
    fn within_distance_one() {
        let f = fixture();
        let found = topics_within_distance(&f.index, f.a, 1);
        let pairs: Vec<_> = found.iter().map(|t| (t.topic.id, t.distance)).collect();
        assert_eq!(
            pairs,
            vec![(f.a, 0), (f.root, 1), (f.a1, 1), (f.a2, 1)]
        );
    }

    #[test]
    fn within_distance_sorted_ascending() {
        let f = fixture();
        let found = topics_within_distance(&f.index, f.a1, 10);
        assert_eq!(found.len(), 6);
        assert!(found.windows(2).all(|w| w[0].distance <= w[1].distance));
        let b1 = found.iter().find(|t| t.topic.id == f.b1).unwrap();
        assert_eq!(b1.distance, 4);
    }

    #[test]
    fn within_distance_zero_is_center_only() {
        let f = fixture();
        let found = topics_within_distance(&f.index, f.b, 0);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].topic.id, f.b);
    }

    #[test]
    fn within_distance_unknown_center_is_empty() {
        let f = fixture();
        assert!(topics_within_distance(&f.index, TopicId::new_v4(), 3).is_empty());
    }
}
