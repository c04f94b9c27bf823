//! Line-level diff between two versions of topic content.
//!
//! The alignment is a longest common subsequence computed in linear space
//! (Hirschberg): each step keeps two DP rows, splits the old side in half and
//! recurses, so memory stays proportional to the line count even for content
//! at the maximum length.

use serde::Serialize;

/// The type of a line in a diff result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffLineType {
    Added,
    Removed,
    Unchanged,
}

/// A single line in a diff result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub line_type: DiffLineType,
    pub content: String,
}

/// Compute a minimal line-level diff from `old` to `new`.
///
/// Lines present in both are `Unchanged`; where a region is replaced, its
/// removed lines come before its added ones.
pub fn compute_line_diff(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    // Shared head and tail never need the DP.
    let head = old_lines
        .iter()
        .zip(&new_lines)
        .take_while(|(a, b)| a == b)
        .count();
    let tail = old_lines[head..]
        .iter()
        .rev()
        .zip(new_lines[head..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let mut diff = Vec::with_capacity(old_lines.len().max(new_lines.len()));
    emit(&mut diff, DiffLineType::Unchanged, &old_lines[..head]);
    align(
        &old_lines[head..old_lines.len() - tail],
        &new_lines[head..new_lines.len() - tail],
        &mut diff,
    );
    emit(&mut diff, DiffLineType::Unchanged, &old_lines[old_lines.len() - tail..]);
    diff
}

fn emit(diff: &mut Vec<DiffLine>, line_type: DiffLineType, lines: &[&str]) {
    diff.extend(lines.iter().map(|content| DiffLine {
        line_type,
        content: (*content).to_string(),
    }));
}

fn align(old: &[&str], new: &[&str], diff: &mut Vec<DiffLine>) {
    match old {
        [] => emit(diff, DiffLineType::Added, new),
        _ if new.is_empty() => emit(diff, DiffLineType::Removed, old),
        [line] => match new.iter().position(|candidate| candidate == line) {
            Some(at) => {
                emit(diff, DiffLineType::Added, &new[..at]);
                emit(diff, DiffLineType::Unchanged, &new[at..=at]);
                emit(diff, DiffLineType::Added, &new[at + 1..]);
            }
            None => {
                emit(diff, DiffLineType::Removed, old);
                emit(diff, DiffLineType::Added, new);
            }
        },
        _ => {
            let (upper, lower) = old.split_at(old.len() / 2);
            let forward = lcs_row(upper, new);

            let lower_rev: Vec<&str> = lower.iter().rev().copied().collect();
            let new_rev: Vec<&str> = new.iter().rev().copied().collect();
            let backward = lcs_row(&lower_rev, &new_rev);

            // Split `new` where the two halves together keep the most lines.
            let n = new.len();
            let mut split = 0;
            for k in 1..=n {
                if forward[k] + backward[n - k] > forward[split] + backward[n - split] {
                    split = k;
                }
            }

            align(upper, &new[..split], diff);
            align(lower, &new[split..], diff);
        }
    }
}

/// LCS lengths of all of `a` against each prefix of `b`.
fn lcs_row(a: &[&str], b: &[&str]) -> Vec<usize> {
    let mut prev = vec![0; b.len() + 1];
    let mut curr = vec![0; b.len() + 1];

    for line in a {
        for (j, other) in b.iter().enumerate() {
            curr[j + 1] = if line == other {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev
}
