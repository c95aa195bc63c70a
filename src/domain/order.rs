//! Ordering engine
//!
//! Rearranges a flat sequence of items in place until every item sits after
//! its dependencies and every parent is immediately followed by its
//! children. Work is done in fixed-point passes, each bounded by
//! [`BuildOptions::max_passes`]:
//!
//! 1. forward: push dependents after their dependencies
//! 2. window: pull top-level stragglers next to blocks sharing their highest
//!    dependency
//! 3. contiguity: lay every subtree out right after its parent
//! 4. forward again, to repair what the contiguity pass disturbed
//!
//! A child depending on an item in another top-level block is satisfied by
//! ordering the blocks: its top-level ancestor inherits the dependency.
//!
//! A final verification turns any remaining violation into an error, so a
//! successful build always satisfies both invariants.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, trace};

use super::id::ParentRef;
use super::item::Item;
use super::tree::TreeError;

/// Iteration cap for each fixed-point pass
pub const DEFAULT_MAX_PASSES: usize = 1000;

/// Tunables for [`DependencyTree::build`](super::DependencyTree::build)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Upper bound on iterations of any single pass
    pub max_passes: usize,

    /// Run the window correction pass after the first forward pass
    pub window_pass: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
            window_pass: true,
        }
    }
}

/// Fixed-point pass that can exhaust its iteration cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Forward,
    Window,
    Contiguity,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pass::Forward => "forward",
            Pass::Window => "window",
            Pass::Contiguity => "contiguity",
        })
    }
}

/// Progress of a build; each stage is entered once its pass completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum BuildStage {
    #[default]
    Initial,
    ForwardOrdered,
    WindowCorrected,
    ChildrenContiguous,
    FinalForwardOrdered,
    Verified,
    TreeAssembled,
}

impl BuildStage {
    /// Stage that follows this one, or None once the flat order is final
    fn next(self, options: &BuildOptions) -> Option<BuildStage> {
        match self {
            BuildStage::Initial => Some(BuildStage::ForwardOrdered),
            BuildStage::ForwardOrdered if options.window_pass => Some(BuildStage::WindowCorrected),
            BuildStage::ForwardOrdered | BuildStage::WindowCorrected => {
                Some(BuildStage::ChildrenContiguous)
            }
            BuildStage::ChildrenContiguous => Some(BuildStage::FinalForwardOrdered),
            BuildStage::FinalForwardOrdered => Some(BuildStage::Verified),
            BuildStage::Verified | BuildStage::TreeAssembled => None,
        }
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BuildStage::Initial => "initial",
            BuildStage::ForwardOrdered => "forward-ordered",
            BuildStage::WindowCorrected => "window-corrected",
            BuildStage::ChildrenContiguous => "children-contiguous",
            BuildStage::FinalForwardOrdered => "final-forward-ordered",
            BuildStage::Verified => "verified",
            BuildStage::TreeAssembled => "tree-assembled",
        })
    }
}

/// Position of the item addressed by `key` (id or name)
pub(crate) fn index_of<T>(items: &[Item<T>], key: &str) -> Option<usize> {
    items.iter().position(|item| item.matches(key))
}

/// Moves the element at `from` to `to`
///
/// Elements strictly between the two indices slide one slot towards `from`;
/// everything outside the range keeps its place. Sequences with fewer than
/// two elements are left untouched.
pub fn shift_to<E>(seq: &mut [E], from: usize, to: usize) -> Result<(), TreeError> {
    let len = seq.len();
    if from >= len || to >= len {
        return Err(TreeError::IndexOutOfRange { from, to, len });
    }

    if from < to {
        trace!(from, to, "shifting forwards");
        seq[from..=to].rotate_left(1);
    } else if from > to {
        trace!(from, to, "shifting backwards");
        seq[to..=from].rotate_right(1);
    }

    Ok(())
}

/// Runs every ordering stage, recording progress in `stage`
///
/// On error `stage` holds the last stage that completed and the sequence is
/// left as the failing pass found it.
pub(crate) fn arrange<T>(
    items: &mut [Item<T>],
    options: &BuildOptions,
    stage: &mut BuildStage,
) -> Result<(), TreeError> {
    *stage = BuildStage::Initial;

    while let Some(next) = stage.next(options) {
        let iterations = match next {
            BuildStage::ForwardOrdered | BuildStage::FinalForwardOrdered => {
                order_forward(items, options.max_passes)?
            }
            BuildStage::WindowCorrected => order_window(items, options.max_passes)?,
            BuildStage::ChildrenContiguous => order_children(items, options.max_passes)?,
            BuildStage::Verified => {
                verify(items)?;
                0
            }
            BuildStage::Initial | BuildStage::TreeAssembled => 0,
        };

        debug!(stage = %next, iterations, "ordering stage complete");
        *stage = next;
    }

    Ok(())
}

/// Dependency positions resolved against one arrangement of the sequence
///
/// A dependency that crosses into another top-level block can only be met
/// by ordering the two blocks, so besides its own declared dependencies
/// every top-level item also carries the blocks its descendants depend on.
struct Constraints {
    /// Position of the top-level item owning each position's block
    block: Vec<usize>,
    /// Positions each item must follow: declared dependencies in order,
    /// then lifted blocks for top-level items
    after: Vec<Vec<usize>>,
}

impl Constraints {
    fn resolve<T>(items: &[Item<T>]) -> Result<Self, TreeError> {
        let block = (0..items.len())
            .map(|position| block_of(items, position))
            .collect::<Result<Vec<_>, _>>()?;

        let mut after = items
            .iter()
            .map(|item| {
                item.dependencies()
                    .iter()
                    .map(|dependency| {
                        index_of(items, dependency).ok_or_else(|| TreeError::UnresolvedDependency {
                            item: item.id().to_string(),
                            dependency: dependency.clone(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        for position in 0..items.len() {
            let owner = block[position];
            for declared in 0..after[position].len() {
                let target = block[after[position][declared]];
                if target != owner && !after[owner].contains(&target) {
                    after[owner].push(target);
                }
            }
        }

        Ok(Self { block, after })
    }

    fn is_top_level(&self, position: usize) -> bool {
        self.block[position] == position
    }
}

/// Position of the top-level item whose subtree holds `position`
fn block_of<T>(items: &[Item<T>], position: usize) -> Result<usize, TreeError> {
    let mut current = position;
    for _ in 0..=items.len() {
        match items[current].parent() {
            ParentRef::Root => return Ok(current),
            ParentRef::Item(parent) => {
                current = index_of(items, parent).ok_or_else(|| TreeError::ItemNotFound(parent.clone()))?;
            }
        }
    }

    Err(TreeError::ConflictingConstraints {
        item: items[position].id().to_string(),
        detail: "parent chain never reaches a top-level item".to_string(),
    })
}

/// Forward pass: moves every item behind its dependencies
///
/// Returns the number of shifting iterations it took.
pub(crate) fn order_forward<T>(items: &mut [Item<T>], max_passes: usize) -> Result<usize, TreeError> {
    for iteration in 0..max_passes {
        if !forward_step(items)? {
            return Ok(iteration);
        }
    }

    Err(TreeError::OrderingDidNotConverge {
        pass: Pass::Forward,
        cap: max_passes,
    })
}

/// Performs the first forward shift found, if any
fn forward_step<T>(items: &mut [Item<T>]) -> Result<bool, TreeError> {
    let constraints = Constraints::resolve(items)?;
    let found = constraints.after.iter().enumerate().find_map(|(position, after)| {
        after
            .iter()
            .find(|&&dep_position| dep_position > position)
            .map(|&target| (position, target))
    });

    let Some((position, target)) = found else {
        return Ok(false);
    };

    trace!(item = items[position].id(), from = position, to = target, "moving after dependency");
    shift_to(items, position, target)?;
    pull_children(items, target)?;
    Ok(true)
}

/// Places the direct children of the item at `parent_position` right after it
fn pull_children<T>(items: &mut [Item<T>], parent_position: usize) -> Result<(), TreeError> {
    let parent_id = items[parent_position].id().to_string();
    let children = items[parent_position].children().to_vec();

    for (offset, child) in children.iter().enumerate() {
        let parent_position = index_of(items, &parent_id)
            .ok_or_else(|| TreeError::ItemNotFound(parent_id.clone()))?;
        let child_position = index_of(items, child).ok_or_else(|| TreeError::UnresolvedDependency {
            item: parent_id.clone(),
            dependency: child.clone(),
        })?;

        // moving a child forward over its parent drags the parent back one slot
        let target = if child_position < parent_position {
            parent_position + offset
        } else {
            parent_position + 1 + offset
        };

        if child_position != target {
            trace!(parent = %parent_id, child = %child, from = child_position, to = target, "pulling child");
            shift_to(items, child_position, target)?;
        }
    }

    Ok(())
}

/// Window scratch for one top-level item, recomputed before every iteration
///
/// Indices are ranks among the top-level items, so children scattered
/// between blocks do not affect the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Scratch {
    rank: usize,
    highest: Option<usize>,
    lowest: Option<usize>,
}

impl Scratch {
    /// Items that are not directly behind their highest dependency
    fn is_candidate(&self) -> bool {
        match (self.lowest, self.highest) {
            (Some(lowest), Some(highest)) => self.rank < lowest || self.rank > highest + 1,
            _ => false,
        }
    }
}

/// Positions of the top-level items, with one scratch record per rank
fn scratch_table<T>(items: &[Item<T>]) -> Result<(Vec<usize>, Vec<Scratch>), TreeError> {
    let constraints = Constraints::resolve(items)?;
    let roots: Vec<usize> = (0..items.len())
        .filter(|&position| constraints.is_top_level(position))
        .collect();

    let mut rank_of = vec![0; items.len()];
    for (rank, &position) in roots.iter().enumerate() {
        rank_of[position] = rank;
    }

    let table = roots
        .iter()
        .enumerate()
        .map(|(rank, &position)| {
            let mut highest: Option<usize> = None;
            let mut lowest: Option<usize> = None;

            for &dep_position in &constraints.after[position] {
                let owner = constraints.block[dep_position];
                if owner == position {
                    continue;
                }
                let dep_rank = rank_of[owner];

                if highest.map_or(true, |h| dep_rank > h) {
                    highest = Some(dep_rank);
                    lowest.get_or_insert(dep_rank);
                }
                if let (Some(h), Some(l)) = (highest, lowest) {
                    if dep_rank < h && dep_rank > l {
                        lowest = Some(dep_rank);
                    }
                }
            }

            trace!(rank, item = items[position].id(), ?highest, ?lowest, "scratch");
            Scratch {
                rank,
                highest,
                lowest,
            }
        })
        .collect();

    Ok((roots, table))
}

/// Window pass: groups top-level items that share their highest dependency
pub(crate) fn order_window<T>(items: &mut [Item<T>], max_passes: usize) -> Result<usize, TreeError> {
    for iteration in 0..max_passes {
        if !window_step(items)? {
            return Ok(iteration);
        }
    }

    Err(TreeError::OrderingDidNotConverge {
        pass: Pass::Window,
        cap: max_passes,
    })
}

fn window_step<T>(items: &mut [Item<T>]) -> Result<bool, TreeError> {
    let (roots, table) = scratch_table(items)?;

    for candidate in table.iter().filter(|s| s.is_candidate()) {
        let peer = table
            .iter()
            .filter(|s| s.highest == candidate.highest && s.rank != candidate.rank)
            .map(|s| s.rank)
            .max();

        if let Some(peer) = peer {
            if candidate.rank > peer + 1 {
                let (from, to) = (roots[candidate.rank], roots[peer] + 1);
                trace!(item = items[from].id(), after = items[roots[peer]].id(), "moving next to peer");
                shift_to(items, from, to)?;
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// Subtree placement in progress for one parent
struct Frame {
    parent: String,
    children: Vec<String>,
    next: usize,
    /// Last item placed in this subtree; the next child goes right after it
    anchor: String,
}

impl Frame {
    fn new<T>(parent: &Item<T>) -> Self {
        Self {
            parent: parent.id().to_string(),
            children: parent.children().to_vec(),
            next: 0,
            anchor: parent.id().to_string(),
        }
    }
}

/// Contiguity pass: lays every subtree out right after its parent
pub(crate) fn order_children<T>(items: &mut [Item<T>], max_passes: usize) -> Result<usize, TreeError> {
    for iteration in 0..max_passes {
        let parents: Vec<String> = items
            .iter()
            .filter(|item| item.has_children())
            .map(|item| item.id().to_string())
            .collect();

        let mut shifts = 0;
        for parent in &parents {
            shifts += place_subtree(items, parent)?;
        }

        if shifts == 0 {
            return Ok(iteration);
        }
    }

    Err(TreeError::OrderingDidNotConverge {
        pass: Pass::Contiguity,
        cap: max_passes,
    })
}

/// Lays out the subtree of `root` in pre-order, returning the shift count
fn place_subtree<T>(items: &mut [Item<T>], root: &str) -> Result<usize, TreeError> {
    let root_position = index_of(items, root).ok_or_else(|| TreeError::ItemNotFound(root.to_string()))?;
    let mut stack = vec![Frame::new(&items[root_position])];
    let mut visited: HashSet<String> = HashSet::from([items[root_position].id().to_lowercase()]);
    let mut shifts = 0;

    while let Some(frame) = stack.last_mut() {
        let Some(child) = frame.children.get(frame.next).cloned() else {
            let done = stack.pop();
            if let (Some(done), Some(outer)) = (done, stack.last_mut()) {
                outer.anchor = done.anchor;
            }
            continue;
        };
        frame.next += 1;

        if !visited.insert(child.to_lowercase()) {
            return Err(TreeError::ConflictingConstraints {
                item: child,
                detail: format!("appears more than once below '{}'", root),
            });
        }

        let anchor_position = index_of(items, &frame.anchor)
            .ok_or_else(|| TreeError::ItemNotFound(frame.anchor.clone()))?;
        let current = index_of(items, &child).ok_or_else(|| TreeError::UnresolvedDependency {
            item: frame.parent.clone(),
            dependency: child.clone(),
        })?;
        let target = if current <= anchor_position {
            anchor_position
        } else {
            anchor_position + 1
        };

        if current != target {
            trace!(parent = %frame.parent, child = %child, from = current, to = target, "placing child");
            shift_to(items, current, target)?;
            items[target].notify_shift();
            shifts += 1;
        }

        frame.anchor = items[target].id().to_string();
        if items[target].has_children() {
            stack.push(Frame::new(&items[target]));
        }
    }

    Ok(shifts)
}

/// Checks both ordering invariants on the current sequence
///
/// Dependencies must precede their dependents, and walking the hierarchy in
/// pre-order (top-level items in sequence order, children in declared order)
/// must reproduce the sequence exactly.
pub(crate) fn verify<T>(items: &[Item<T>]) -> Result<(), TreeError> {
    for (position, item) in items.iter().enumerate() {
        for dependency in item.dependencies() {
            let dep_position = index_of(items, dependency).ok_or_else(|| TreeError::UnresolvedDependency {
                item: item.id().to_string(),
                dependency: dependency.clone(),
            })?;
            if dep_position > position {
                return Err(TreeError::ConflictingConstraints {
                    item: item.id().to_string(),
                    detail: format!("ordered before its dependency '{}'", dependency),
                });
            }
        }
    }

    let listed: HashSet<String> = items
        .iter()
        .flat_map(|item| item.children().iter().map(|c| c.to_lowercase()))
        .collect();
    let mut stack: Vec<&str> = items
        .iter()
        .rev()
        .filter(|item| !listed.contains(&item.id().to_lowercase()))
        .map(|item| item.id())
        .collect();

    let mut position = 0;
    while let Some(key) = stack.pop() {
        let Some(expected) = items.iter().find(|item| item.matches(key)) else {
            return Err(TreeError::ItemNotFound(key.to_string()));
        };
        let Some(actual) = items.get(position) else {
            return Err(TreeError::ConflictingConstraints {
                item: expected.id().to_string(),
                detail: "appears more than once in the hierarchy".to_string(),
            });
        };
        if actual.id() != expected.id() {
            return Err(TreeError::ConflictingConstraints {
                item: expected.id().to_string(),
                detail: format!("expected at position {} but found '{}'", position, actual.id()),
            });
        }

        stack.extend(expected.children().iter().rev().map(String::as_str));
        position += 1;
    }

    if position != items.len() {
        return Err(TreeError::ConflictingConstraints {
            item: items[position].id().to_string(),
            detail: "not reachable from any top-level item".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn items(ids: &[&str]) -> Vec<Item<()>> {
        ids.iter().map(|id| Item::new(*id, *id, ()).unwrap()).collect()
    }

    fn ids(items: &[Item<()>]) -> Vec<&str> {
        items.iter().map(|i| i.id()).collect()
    }

    fn position(items: &[Item<()>], id: &str) -> usize {
        index_of(items, id).unwrap()
    }

    fn depend(items: &mut [Item<()>], item: &str, dependency: &str) {
        let idx = position(items, item);
        items[idx].depends_on(dependency).unwrap();
    }

    fn adopt(items: &mut [Item<()>], parent: &str, child: &str) {
        let p = position(items, parent);
        items[p].add_child(child);
        let c = position(items, child);
        items[c].set_parent(parent);
    }

    #[test]
    fn shift_forward_slides_range_back() {
        let mut seq = vec!['a', 'b', 'c', 'd', 'e'];
        shift_to(&mut seq, 1, 3).unwrap();
        assert_eq!(seq, ['a', 'c', 'd', 'b', 'e']);
    }

    #[test]
    fn shift_backward_slides_range_forward() {
        let mut seq = vec!['a', 'b', 'c', 'd', 'e'];
        shift_to(&mut seq, 4, 1).unwrap();
        assert_eq!(seq, ['a', 'e', 'b', 'c', 'd']);
    }

    #[test]
    fn shift_same_index_is_noop() {
        let mut seq = vec![1, 2, 3];
        shift_to(&mut seq, 2, 2).unwrap();
        assert_eq!(seq, [1, 2, 3]);
    }

    #[test]
    fn shift_rejects_out_of_range() {
        let mut seq = vec!["item 6"];
        let err = shift_to(&mut seq, 0, 4).unwrap_err();
        assert_eq!(err, TreeError::IndexOutOfRange { from: 0, to: 4, len: 1 });

        let mut empty: Vec<u8> = vec![];
        assert!(shift_to(&mut empty, 0, 0).is_err());
    }

    #[test]
    fn forward_orders_chain() {
        let mut seq = items(&["6", "4", "1", "3", "2", "5"]);
        for (a, b) in [("6", "5"), ("5", "4"), ("4", "3"), ("3", "2"), ("2", "1")] {
            depend(&mut seq, a, b);
        }

        let iterations = order_forward(&mut seq, DEFAULT_MAX_PASSES).unwrap();
        assert_eq!(ids(&seq), ["1", "2", "3", "4", "5", "6"]);
        assert_eq!(iterations, 4);
    }

    #[test]
    fn forward_pulls_children_behind_moved_parent() {
        let mut seq = items(&["p", "c1", "d", "c2"]);
        adopt(&mut seq, "p", "c1");
        adopt(&mut seq, "p", "c2");
        depend(&mut seq, "p", "d");

        order_forward(&mut seq, DEFAULT_MAX_PASSES).unwrap();
        assert_eq!(ids(&seq), ["d", "p", "c1", "c2"]);
    }

    #[test]
    fn constraints_lift_child_dependencies_to_blocks() {
        let mut seq = items(&["api", "worker", "db", "replica"]);
        adopt(&mut seq, "api", "worker");
        adopt(&mut seq, "db", "replica");
        depend(&mut seq, "worker", "replica");

        let constraints = Constraints::resolve(&seq).unwrap();
        assert_eq!(constraints.block, [0, 0, 2, 2]);
        assert_eq!(constraints.after[0], [2]);
        assert_eq!(constraints.after[1], [3]);
        assert!(constraints.after[2].is_empty());
    }

    #[test]
    fn forward_moves_whole_block_behind_child_dependency() {
        let mut seq = items(&["a", "a1", "b"]);
        adopt(&mut seq, "a", "a1");
        depend(&mut seq, "a1", "b");

        order_forward(&mut seq, DEFAULT_MAX_PASSES).unwrap();
        assert_eq!(ids(&seq), ["b", "a", "a1"]);
    }

    #[test]
    fn forward_fails_on_unresolved_dependency() {
        let mut seq = items(&["a"]);
        depend(&mut seq, "a", "ghost");

        let err = order_forward(&mut seq, DEFAULT_MAX_PASSES).unwrap_err();
        assert!(matches!(err, TreeError::UnresolvedDependency { .. }));
    }

    #[test]
    fn forward_cycle_hits_cap() {
        let mut seq = items(&["a", "b"]);
        depend(&mut seq, "a", "b");
        depend(&mut seq, "b", "a");

        let err = order_forward(&mut seq, 50).unwrap_err();
        assert_eq!(
            err,
            TreeError::OrderingDidNotConverge {
                pass: Pass::Forward,
                cap: 50
            }
        );
    }

    #[test]
    fn scratch_tracks_highest_and_next_lower_dependency() {
        let mut seq = items(&["a", "b", "c", "x"]);
        depend(&mut seq, "x", "a");
        depend(&mut seq, "x", "c");
        depend(&mut seq, "x", "b");

        let (roots, table) = scratch_table(&seq).unwrap();
        assert_eq!(roots, [0, 1, 2, 3]);
        assert_eq!(table[3].highest, Some(2));
        assert_eq!(table[3].lowest, Some(1));
        assert_eq!(table[0].highest, None);
        assert!(!table[3].is_candidate());
    }

    #[test]
    fn window_groups_items_sharing_a_dependency() {
        let mut seq = items(&["a", "b", "d", "c"]);
        depend(&mut seq, "b", "a");
        depend(&mut seq, "c", "a");
        depend(&mut seq, "d", "b");

        let iterations = order_window(&mut seq, DEFAULT_MAX_PASSES).unwrap();
        assert_eq!(ids(&seq), ["a", "b", "c", "d"]);
        assert_eq!(iterations, 1);
    }

    #[test]
    fn window_ranks_blocks_not_positions() {
        let mut seq = items(&["a", "b", "x", "c"]);
        adopt(&mut seq, "b", "x");
        depend(&mut seq, "b", "a");
        depend(&mut seq, "c", "a");

        let iterations = order_window(&mut seq, DEFAULT_MAX_PASSES).unwrap();
        assert_eq!(ids(&seq), ["a", "b", "x", "c"]);
        assert_eq!(iterations, 0);
    }

    #[test]
    fn window_leaves_lone_stragglers() {
        let mut seq = items(&["a", "b", "c"]);
        depend(&mut seq, "c", "a");

        order_window(&mut seq, DEFAULT_MAX_PASSES).unwrap();
        assert_eq!(ids(&seq), ["a", "b", "c"]);
    }

    #[test]
    fn contiguity_places_nested_children_in_preorder() {
        let mut seq = items(&["g1", "x", "c2", "p", "g2", "c1"]);
        adopt(&mut seq, "p", "c1");
        adopt(&mut seq, "p", "c2");
        adopt(&mut seq, "c1", "g1");
        adopt(&mut seq, "c1", "g2");

        order_children(&mut seq, DEFAULT_MAX_PASSES).unwrap();
        assert_eq!(ids(&seq), ["x", "p", "c1", "g1", "g2", "c2"]);
        verify(&seq).unwrap();
    }

    #[test]
    fn contiguity_notifies_moved_children_once() {
        let mut seq = items(&["p", "other", "c"]);
        adopt(&mut seq, "p", "c");

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let c = position(&seq, "c");
        seq[c].on_shift(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        order_children(&mut seq, DEFAULT_MAX_PASSES).unwrap();
        assert_eq!(ids(&seq), ["p", "c", "other"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        order_children(&mut seq, DEFAULT_MAX_PASSES).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn verify_reports_dependency_violation() {
        let mut seq = items(&["a", "b"]);
        depend(&mut seq, "a", "b");

        let err = verify(&seq).unwrap_err();
        assert!(matches!(err, TreeError::ConflictingConstraints { ref item, .. } if item == "a"));
    }

    #[test]
    fn verify_reports_broken_contiguity() {
        let mut seq = items(&["p", "x", "c"]);
        adopt(&mut seq, "p", "c");

        let err = verify(&seq).unwrap_err();
        assert!(matches!(err, TreeError::ConflictingConstraints { ref item, .. } if item == "c"));
    }

    #[test]
    fn arrange_walks_every_stage() {
        let mut seq = items(&["b", "a"]);
        depend(&mut seq, "b", "a");

        let mut stage = BuildStage::Initial;
        arrange(&mut seq, &BuildOptions::default(), &mut stage).unwrap();
        assert_eq!(stage, BuildStage::Verified);
        assert_eq!(ids(&seq), ["a", "b"]);
    }

    #[test]
    fn arrange_keeps_last_completed_stage_on_error() {
        let mut seq = items(&["a", "b"]);
        depend(&mut seq, "a", "b");
        depend(&mut seq, "b", "a");

        let mut stage = BuildStage::Initial;
        let options = BuildOptions {
            max_passes: 10,
            window_pass: true,
        };
        assert!(arrange(&mut seq, &options, &mut stage).is_err());
        assert_eq!(stage, BuildStage::Initial);
    }

    #[test]
    fn stage_sequence_skips_window_when_disabled() {
        let options = BuildOptions {
            max_passes: 10,
            window_pass: false,
        };
        assert_eq!(
            BuildStage::ForwardOrdered.next(&options),
            Some(BuildStage::ChildrenContiguous)
        );
        assert_eq!(
            BuildStage::ForwardOrdered.next(&BuildOptions::default()),
            Some(BuildStage::WindowCorrected)
        );
        assert_eq!(BuildStage::Verified.next(&options), None);
    }
}
