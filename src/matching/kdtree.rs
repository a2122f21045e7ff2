//! K-d tree over tile colours with nearest neighbour search and removal
//!
//! Nodes live in an arena and refer to each other by index, including the
//! parent link used when unlinking a leaf. Splits cycle through the colour
//! space axes by depth. Every node satisfies `left <= node <= right` on its
//! split axis, which lets equal coordinates fall on either side and keeps
//! pools of identical colours balanced.
//!
//! The split value is an approximate median taken from a bounded random
//! sample, so construction stays near-linear per level on large pools.
//! Removal never rebalances: many removals can skew the tree and degrade
//! queries towards a linear scan.

use crate::color::argb::Argb;
use crate::color::space::{ColorPoint, ColorSpace};
use crate::io::configuration::{KD_MEDIAN_SAMPLE_FRACTION, KD_MEDIAN_SAMPLE_MIN};
use crate::matching::tile::Tile;
use crate::math::sampling::RandomSelector;
use std::collections::HashMap;

/// Stable handle of a node in the tree arena
pub type NodeId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Extreme {
    Min,
    Max,
}

#[derive(Debug)]
struct KdNode {
    tile: Tile,
    point: ColorPoint,
    axis: usize,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
}

impl KdNode {
    fn split_value(&self) -> i32 {
        self.point.coordinate(self.axis)
    }
}

struct BuildTask {
    items: Vec<(Tile, ColorPoint)>,
    depth: usize,
    parent: Option<(NodeId, Side)>,
}

/// Binary space partitioning index over tile colours
#[derive(Debug)]
pub struct KdColorTree {
    nodes: Vec<Option<KdNode>>,
    free: Vec<NodeId>,
    root: Option<NodeId>,
    space: ColorSpace,
    lookup: HashMap<String, NodeId>,
}

impl KdColorTree {
    /// Build a tree over the given tiles
    ///
    /// Tiles sharing a source identifier are indexed once.
    pub fn build(tiles: Vec<Tile>, space: ColorSpace, selector: &mut RandomSelector) -> Self {
        let mut tree = Self {
            nodes: Vec::with_capacity(tiles.len()),
            free: Vec::new(),
            root: None,
            space,
            lookup: HashMap::with_capacity(tiles.len()),
        };

        let mut seen = std::collections::HashSet::with_capacity(tiles.len());
        let items: Vec<(Tile, ColorPoint)> = tiles
            .into_iter()
            .filter(|tile| seen.insert(tile.source.clone()))
            .map(|tile| {
                let point = space.point(tile.average_argb);
                (tile, point)
            })
            .collect();

        let dimension = space.dimension().max(1);
        // Explicit work stack: degenerate colour pools must not exhaust the call stack
        let mut tasks = vec![BuildTask {
            items,
            depth: 0,
            parent: None,
        }];

        while let Some(BuildTask {
            mut items,
            depth,
            parent,
        }) = tasks.pop()
        {
            if items.is_empty() {
                continue;
            }
            let axis = depth % dimension;
            let pivot_index = approximate_median(&items, axis, selector);
            let (tile, point) = items.swap_remove(pivot_index);
            let split = point.coordinate(axis);

            let mut left = Vec::with_capacity(items.len() / 2);
            let mut right = Vec::with_capacity(items.len() / 2);
            for item in items {
                let value = item.1.coordinate(axis);
                if value < split || (value == split && left.len() < right.len()) {
                    left.push(item);
                } else {
                    right.push(item);
                }
            }

            let id = tree.allocate(KdNode {
                tile,
                point,
                axis,
                left: None,
                right: None,
                parent: parent.map(|(id, _)| id),
            });
            match parent {
                Some((parent_id, side)) => tree.link(parent_id, side, Some(id)),
                None => tree.root = Some(id),
            }

            tasks.push(BuildTask {
                items: right,
                depth: depth + 1,
                parent: Some((id, Side::Right)),
            });
            tasks.push(BuildTask {
                items: left,
                depth: depth + 1,
                parent: Some((id, Side::Left)),
            });
        }

        tracing::debug!(
            nodes = tree.len(),
            dimension = space.dimension(),
            "built colour k-d tree"
        );
        tree
    }

    /// Colour space the tree partitions
    pub const fn space(&self) -> ColorSpace {
        self.space
    }

    /// Number of indexed tiles
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    /// Whether the tree holds no tiles
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Whether a tile is indexed
    pub fn contains(&self, tile: &Tile) -> bool {
        self.lookup.contains_key(&tile.source)
    }

    /// All indexed tiles in arena order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.nodes.iter().flatten().map(|node| &node.tile)
    }

    /// Consume the tree, returning its tiles
    pub fn into_tiles(self) -> Vec<Tile> {
        self.nodes
            .into_iter()
            .flatten()
            .map(|node| node.tile)
            .collect()
    }

    /// Length of the longest root to leaf path
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|id| (id, 1)).into_iter().collect();
        while let Some((id, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Some(node) = self.node(id) {
                stack.extend(node.left.map(|child| (child, level + 1)));
                stack.extend(node.right.map(|child| (child, level + 1)));
            }
        }
        deepest
    }

    /// Tile closest to `color` under the tree's colour space
    ///
    /// A greedy descent supplies the first candidate; the depth-first
    /// search from the root then visits each node's own half-plane before
    /// the other and skips any far side whose split distance already
    /// exceeds the best distance. Ties keep the first tile found.
    pub fn nearest(&self, color: Argb) -> Option<&Tile> {
        let root = self.root?;
        let query = self.space.point(color);
        let metric = self.space.metric();

        let mut best_id = root;
        let mut cursor = root;
        while let Some(node) = self.node(cursor) {
            best_id = cursor;
            let toward_left = query.coordinate(node.axis) < node.split_value();
            let next = if toward_left { node.left } else { node.right };
            match next {
                Some(child) => cursor = child,
                None => break,
            }
        }
        let mut best_distance = self
            .node(best_id)
            .map_or(u64::MAX, |node| self.space.point_distance(&query, &node.point));

        // Each entry carries the split distance that must not exceed the best
        let mut stack: Vec<(NodeId, u64)> = vec![(root, 0)];
        while let Some((id, bound)) = stack.pop() {
            if bound > best_distance {
                continue;
            }
            let Some(node) = self.node(id) else {
                continue;
            };

            let distance = self.space.point_distance(&query, &node.point);
            if distance < best_distance {
                best_distance = distance;
                best_id = id;
            }

            let delta = query.coordinate(node.axis) - node.split_value();
            let (near, far) = if delta < 0 {
                (node.left, node.right)
            } else {
                (node.right, node.left)
            };
            if let Some(far) = far {
                stack.push((far, metric.axis_term(delta)));
            }
            if let Some(near) = near {
                stack.push((near, 0));
            }
        }

        self.node(best_id).map(|node| &node.tile)
    }

    /// Remove a tile, returning whether it was indexed
    pub fn remove(&mut self, tile: &Tile) -> bool {
        match self.lookup.remove(&tile.source) {
            Some(id) => {
                self.remove_node(id);
                true
            }
            None => false,
        }
    }

    /// Check the partitioning invariant of every node
    pub fn is_valid(&self) -> bool {
        let dimension = self.space.dimension();
        let Some(root) = self.root else {
            return true;
        };
        let mut stack = vec![(root, vec![i32::MIN; dimension], vec![i32::MAX; dimension])];
        while let Some((id, low, high)) = stack.pop() {
            let Some(node) = self.node(id) else {
                return false;
            };
            for axis in 0..dimension {
                let value = node.point.coordinate(axis);
                let lower = low.get(axis).copied().unwrap_or(i32::MIN);
                let upper = high.get(axis).copied().unwrap_or(i32::MAX);
                if value < lower || value > upper {
                    return false;
                }
            }
            let split = node.split_value();
            if let Some(left) = node.left {
                if self.node(left).and_then(|child| child.parent) != Some(id) {
                    return false;
                }
                let mut child_high = high.clone();
                if let Some(bound) = child_high.get_mut(node.axis) {
                    *bound = split;
                }
                stack.push((left, low.clone(), child_high));
            }
            if let Some(right) = node.right {
                if self.node(right).and_then(|child| child.parent) != Some(id) {
                    return false;
                }
                let mut child_low = low;
                if let Some(bound) = child_low.get_mut(node.axis) {
                    *bound = split;
                }
                stack.push((right, child_low, high));
            }
        }
        true
    }

    // Replaces the node's payload from a donor and repeats at the donor's
    // position until a childless node can be unlinked.
    fn remove_node(&mut self, id: NodeId) {
        let mut current = id;
        loop {
            let Some((axis, left, right)) = self
                .node(current)
                .map(|node| (node.axis, node.left, node.right))
            else {
                return;
            };

            let donor = match (right, left) {
                (Some(right), _) => self.find_extreme(right, axis, Extreme::Min),
                (None, Some(left)) => self.find_extreme(left, axis, Extreme::Max),
                (None, None) => {
                    self.unlink(current);
                    return;
                }
            };

            let Some((tile, point)) = self
                .node(donor)
                .map(|node| (node.tile.clone(), node.point))
            else {
                return;
            };
            self.lookup.insert(tile.source.clone(), current);
            if let Some(node) = self.node_mut(current) {
                node.tile = tile;
                node.point = point;
            }
            current = donor;
        }
    }

    fn find_extreme(&self, root: NodeId, axis: usize, extreme: Extreme) -> NodeId {
        let mut best = root;
        let mut best_value = self
            .node(root)
            .map_or(0, |node| node.point.coordinate(axis));
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            let value = node.point.coordinate(axis);
            let better = match extreme {
                Extreme::Min => value < best_value,
                Extreme::Max => value > best_value,
            };
            if better {
                best = id;
                best_value = value;
            }

            if node.axis == axis {
                // The other side cannot hold a more extreme value on this axis
                let toward = match extreme {
                    Extreme::Min => node.left,
                    Extreme::Max => node.right,
                };
                stack.extend(toward);
            } else {
                stack.extend(node.right);
                stack.extend(node.left);
            }
        }
        best
    }

    fn unlink(&mut self, id: NodeId) {
        let parent = self.node(id).and_then(|node| node.parent);
        match parent {
            Some(parent_id) => {
                if let Some(parent) = self.node_mut(parent_id) {
                    if parent.left == Some(id) {
                        parent.left = None;
                    } else if parent.right == Some(id) {
                        parent.right = None;
                    }
                }
            }
            None => self.root = None,
        }
        if let Some(slot) = self.nodes.get_mut(id) {
            *slot = None;
        }
        self.free.push(id);
    }

    fn allocate(&mut self, node: KdNode) -> NodeId {
        let source = node.tile.source.clone();
        let id = if let Some(id) = self.free.pop() {
            if let Some(slot) = self.nodes.get_mut(id) {
                *slot = Some(node);
            }
            id
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        };
        self.lookup.insert(source, id);
        id
    }

    fn link(&mut self, parent: NodeId, side: Side, child: Option<NodeId>) {
        if let Some(node) = self.node_mut(parent) {
            match side {
                Side::Left => node.left = child,
                Side::Right => node.right = child,
            }
        }
    }

    fn node(&self, id: NodeId) -> Option<&KdNode> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut KdNode> {
        self.nodes.get_mut(id).and_then(Option::as_mut)
    }
}

/// Index of an item whose coordinate approximates the median on `axis`
///
/// Uses a random sample of `max(10, 1%)` items instead of the full set.
fn approximate_median(
    items: &[(Tile, ColorPoint)],
    axis: usize,
    selector: &mut RandomSelector,
) -> usize {
    let sample_size =
        KD_MEDIAN_SAMPLE_MIN.max((items.len() as f64 * KD_MEDIAN_SAMPLE_FRACTION) as usize);
    if sample_size >= items.len() {
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by_key(|&i| items.get(i).map_or(0, |item| item.1.coordinate(axis)));
        return order.get(order.len() / 2).copied().unwrap_or(0);
    }

    let mut sample = selector.sample_indices(items.len(), sample_size);
    sample.sort_by_key(|&i| items.get(i).map_or(0, |item| item.1.coordinate(axis)));
    sample.get(sample.len() / 2).copied().unwrap_or(0)
}
