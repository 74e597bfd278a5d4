//! A bulk-loadable R-tree over feature vectors.
//!
//! Overview
//! -----------------
//! The tree stores `(FeatureVector, handle)` entries and answers closed-box queries
//! and k-nearest-neighbor queries. Handles are opaque to the index: it copies them
//! out of query results and never dereferences them.
//!
//! Construction
//! -----------------
//! * [`RTree::insert_points`] into an empty tree bulk-loads top-down: entry runs are
//!   sorted along the axis of largest spread and sliced into node-sized groups,
//!   recursively.
//! * [`RTree::insert_point`] descends to the leaf needing the least volume
//!   enlargement and splits overfull nodes along their longest axis.
//!
//! Both paths are deterministic: identical input order produces an identical tree,
//! which the clustering layer relies on for reproducible labels.
//!
//! Concurrency: a fully built tree may be shared by concurrent readers; concurrent
//! writers are not supported.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;
use smallvec::SmallVec;

use crate::constants::{RTREE_MAX_NODE_ENTRIES, RTREE_MIN_NODE_ENTRIES};
use crate::index::FeatureVector;
use crate::trajkit_errors::TrajkitError;

type Coords = SmallVec<[f64; 8]>;

#[derive(Debug, Clone)]
struct Rect {
    min: Coords,
    max: Coords,
}

impl Rect {
    fn from_point(point: &FeatureVector) -> Self {
        Rect {
            min: SmallVec::from_slice(point.coordinates()),
            max: SmallVec::from_slice(point.coordinates()),
        }
    }

    fn expand(&mut self, other: &Rect) {
        for i in 0..self.min.len() {
            self.min[i] = self.min[i].min(other.min[i]);
            self.max[i] = self.max[i].max(other.max[i]);
        }
    }

    fn volume(&self) -> f64 {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(lo, hi)| hi - lo)
            .product()
    }

    fn enlargement(&self, other: &Rect) -> f64 {
        let mut union = self.clone();
        union.expand(other);
        union.volume() - self.volume()
    }

    fn margin(&self) -> f64 {
        self.min.iter().zip(&self.max).map(|(lo, hi)| hi - lo).sum()
    }

    fn longest_axis(&self) -> usize {
        let mut axis = 0;
        let mut best = f64::NEG_INFINITY;
        for (i, (lo, hi)) in self.min.iter().zip(&self.max).enumerate() {
            if hi - lo > best {
                best = hi - lo;
                axis = i;
            }
        }
        axis
    }

    fn center(&self, axis: usize) -> f64 {
        (self.min[axis] + self.max[axis]) / 2.0
    }

    fn intersects_box(&self, min: &[f64], max: &[f64]) -> bool {
        self.min
            .iter()
            .zip(&self.max)
            .zip(min.iter().zip(max))
            .all(|((lo, hi), (qlo, qhi))| *lo <= *qhi && *qlo <= *hi)
    }

    fn min_distance_squared(&self, query: &[f64]) -> f64 {
        self.min
            .iter()
            .zip(&self.max)
            .zip(query)
            .map(|((lo, hi), q)| {
                let d = if q < lo {
                    lo - q
                } else if q > hi {
                    q - hi
                } else {
                    0.0
                };
                d * d
            })
            .sum()
    }
}

#[derive(Debug)]
enum NodeKind {
    /// Indices into the entry arena.
    Leaf(Vec<usize>),
    /// Indices into the node arena.
    Branch(Vec<usize>),
}

#[derive(Debug)]
struct Node {
    rect: Rect,
    kind: NodeKind,
}

/// Spatial index over `(FeatureVector, handle)` entries.
#[derive(Debug)]
pub struct RTree<H> {
    dimension: usize,
    entries: Vec<(FeatureVector, H)>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl<H: Clone> RTree<H> {
    /// Empty tree over vectors of the given dimension.
    pub fn new(dimension: usize) -> Result<Self, TrajkitError> {
        // Reuse the FeatureVector dimension check.
        FeatureVector::new(&vec![0.0; dimension]).map(|_| ())?;
        Ok(RTree {
            dimension,
            entries: Vec::new(),
            nodes: Vec::new(),
            root: None,
        })
    }

    /// Number of stored entries.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Add one entry.
    pub fn insert_point(&mut self, feature: FeatureVector, handle: H) -> Result<(), TrajkitError> {
        feature.check_dimension(self.dimension)?;
        let entry_id = self.entries.len();
        let entry_rect = Rect::from_point(&feature);
        self.entries.push((feature, handle));
        match self.root {
            None => {
                self.root = Some(self.push_node(Node {
                    rect: entry_rect,
                    kind: NodeKind::Leaf(vec![entry_id]),
                }));
            }
            Some(root) => {
                if let Some(sibling) = self.insert_into(root, entry_id, &entry_rect) {
                    let mut rect = self.nodes[root].rect.clone();
                    rect.expand(&self.nodes[sibling].rect);
                    self.root = Some(self.push_node(Node {
                        rect,
                        kind: NodeKind::Branch(vec![root, sibling]),
                    }));
                }
            }
        }
        Ok(())
    }

    /// Add many entries. Into an empty tree this bulk-loads; otherwise the entries
    /// are inserted one by one. A dimension error on any entry aborts the whole
    /// operation before the tree is touched.
    pub fn insert_points<I>(&mut self, points: I) -> Result<(), TrajkitError>
    where
        I: IntoIterator<Item = (FeatureVector, H)>,
    {
        let incoming: Vec<(FeatureVector, H)> = points.into_iter().collect();
        for (feature, _) in &incoming {
            feature.check_dimension(self.dimension)?;
        }
        if self.root.is_none() && !incoming.is_empty() {
            let first = self.entries.len();
            self.entries.extend(incoming);
            let ids: Vec<usize> = (first..self.entries.len()).collect();
            let root = self.build_subtree(ids);
            self.root = Some(root);
            debug!("rtree: bulk loaded {} entries", self.entries.len());
        } else {
            for (feature, handle) in incoming {
                self.insert_point(feature, handle)?;
            }
        }
        Ok(())
    }

    /// Handles of every entry inside the closed axis-aligned box, in insertion order.
    pub fn find_points_in_box(
        &self,
        min: &FeatureVector,
        max: &FeatureVector,
    ) -> Result<Vec<H>, TrajkitError> {
        min.check_dimension(self.dimension)?;
        max.check_dimension(self.dimension)?;
        let mut hits: Vec<usize> = Vec::new();
        let mut stack = match self.root {
            None => return Ok(Vec::new()),
            Some(root) => vec![root],
        };
        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id];
            if !node.rect.intersects_box(min.coordinates(), max.coordinates()) {
                continue;
            }
            match &node.kind {
                NodeKind::Leaf(children) => {
                    for &entry_id in children {
                        let inside = self.entries[entry_id]
                            .0
                            .coordinates()
                            .iter()
                            .zip(min.coordinates().iter().zip(max.coordinates()))
                            .all(|(c, (lo, hi))| lo <= c && c <= hi);
                        if inside {
                            hits.push(entry_id);
                        }
                    }
                }
                NodeKind::Branch(children) => stack.extend(children),
            }
        }
        hits.sort_unstable();
        Ok(hits.into_iter().map(|id| self.entries[id].1.clone()).collect())
    }

    /// Handles of the `k` entries closest to `query` in Euclidean distance, nearest
    /// first; ties broken by insertion order.
    pub fn find_nearest_neighbors(
        &self,
        query: &FeatureVector,
        k: usize,
    ) -> Result<Vec<H>, TrajkitError> {
        query.check_dimension(self.dimension)?;
        let mut results = Vec::with_capacity(k.min(self.entries.len()));
        let root = match self.root {
            None => return Ok(Vec::new()),
            Some(root) => root,
        };
        if k == 0 {
            return Ok(Vec::new());
        }
        let mut frontier = BinaryHeap::new();
        frontier.push(Candidate {
            distance: self.nodes[root].rect.min_distance_squared(query.coordinates()),
            target: Target::Node(root),
        });
        while let Some(candidate) = frontier.pop() {
            match candidate.target {
                Target::Entry(entry_id) => {
                    results.push(self.entries[entry_id].1.clone());
                    if results.len() == k {
                        break;
                    }
                }
                Target::Node(node_id) => match &self.nodes[node_id].kind {
                    NodeKind::Leaf(children) => {
                        for &entry_id in children {
                            let d = self.entries[entry_id]
                                .0
                                .distance_squared(query)
                                .unwrap_or(f64::INFINITY);
                            frontier.push(Candidate {
                                distance: d,
                                target: Target::Entry(entry_id),
                            });
                        }
                    }
                    NodeKind::Branch(children) => {
                        for &child in children {
                            frontier.push(Candidate {
                                distance: self.nodes[child]
                                    .rect
                                    .min_distance_squared(query.coordinates()),
                                target: Target::Node(child),
                            });
                        }
                    }
                },
            }
        }
        Ok(results)
    }

    fn push_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Recursive single insert; returns a freshly split sibling when the child
    /// overflows.
    fn insert_into(&mut self, node_id: usize, entry_id: usize, entry_rect: &Rect) -> Option<usize> {
        self.nodes[node_id].rect.expand(entry_rect);
        match &self.nodes[node_id].kind {
            NodeKind::Leaf(_) => {
                if let NodeKind::Leaf(children) = &mut self.nodes[node_id].kind {
                    children.push(entry_id);
                }
                if self.leaf_len(node_id) > RTREE_MAX_NODE_ENTRIES {
                    Some(self.split(node_id))
                } else {
                    None
                }
            }
            NodeKind::Branch(children) => {
                // Least volume enlargement, ties by margin then child order.
                let mut best_child = children[0];
                let mut best_key = (f64::INFINITY, f64::INFINITY);
                for &child in children {
                    let rect = &self.nodes[child].rect;
                    let key = (rect.enlargement(entry_rect), rect.margin());
                    if key < best_key {
                        best_key = key;
                        best_child = child;
                    }
                }
                let split = self.insert_into(best_child, entry_id, entry_rect);
                if let Some(sibling) = split {
                    if let NodeKind::Branch(children) = &mut self.nodes[node_id].kind {
                        children.push(sibling);
                    }
                    if self.branch_len(node_id) > RTREE_MAX_NODE_ENTRIES {
                        return Some(self.split(node_id));
                    }
                }
                None
            }
        }
    }

    fn leaf_len(&self, node_id: usize) -> usize {
        match &self.nodes[node_id].kind {
            NodeKind::Leaf(children) => children.len(),
            NodeKind::Branch(children) => children.len(),
        }
    }

    fn branch_len(&self, node_id: usize) -> usize {
        self.leaf_len(node_id)
    }

    fn child_rect(&self, kind_is_leaf: bool, child: usize) -> Rect {
        if kind_is_leaf {
            Rect::from_point(&self.entries[child].0)
        } else {
            self.nodes[child].rect.clone()
        }
    }

    /// Split an overfull node along its longest axis; the upper half moves to a new
    /// sibling, which is returned.
    fn split(&mut self, node_id: usize) -> usize {
        let axis = self.nodes[node_id].rect.longest_axis();
        let (is_leaf, mut children) = match &mut self.nodes[node_id].kind {
            NodeKind::Leaf(children) => (true, std::mem::take(children)),
            NodeKind::Branch(children) => (false, std::mem::take(children)),
        };
        children.sort_by(|&a, &b| {
            let ca = self.child_rect(is_leaf, a).center(axis);
            let cb = self.child_rect(is_leaf, b).center(axis);
            ca.total_cmp(&cb).then(a.cmp(&b))
        });
        let keep = (children.len() / 2).max(RTREE_MIN_NODE_ENTRIES.min(children.len() - 1));
        let moved: Vec<usize> = children.split_off(keep);

        let rect_of = |tree: &Self, ids: &[usize]| -> Rect {
            let mut rect = tree.child_rect(is_leaf, ids[0]);
            for &id in &ids[1..] {
                rect.expand(&tree.child_rect(is_leaf, id));
            }
            rect
        };
        let kept_rect = rect_of(self, &children);
        let moved_rect = rect_of(self, &moved);

        self.nodes[node_id].rect = kept_rect;
        self.nodes[node_id].kind = if is_leaf {
            NodeKind::Leaf(children)
        } else {
            NodeKind::Branch(children)
        };
        self.push_node(Node {
            rect: moved_rect,
            kind: if is_leaf {
                NodeKind::Leaf(moved)
            } else {
                NodeKind::Branch(moved)
            },
        })
    }

    /// Top-down bulk load: sort along the widest axis, slice into node-sized runs,
    /// recurse.
    fn build_subtree(&mut self, mut entry_ids: Vec<usize>) -> usize {
        let mut rect = Rect::from_point(&self.entries[entry_ids[0]].0);
        for &id in &entry_ids[1..] {
            rect.expand(&Rect::from_point(&self.entries[id].0));
        }
        if entry_ids.len() <= RTREE_MAX_NODE_ENTRIES {
            return self.push_node(Node {
                rect,
                kind: NodeKind::Leaf(entry_ids),
            });
        }
        let axis = rect.longest_axis();
        entry_ids.sort_by(|&a, &b| {
            self.entries[a].0.coordinates()[axis]
                .total_cmp(&self.entries[b].0.coordinates()[axis])
                .then(a.cmp(&b))
        });
        let group_size = entry_ids.len().div_ceil(RTREE_MAX_NODE_ENTRIES);
        let mut child_nodes = Vec::new();
        for chunk in entry_ids.chunks(group_size) {
            let child = self.build_subtree(chunk.to_vec());
            child_nodes.push(child);
        }
        self.push_node(Node {
            rect,
            kind: NodeKind::Branch(child_nodes),
        })
    }
}

enum Target {
    Node(usize),
    Entry(usize),
}

impl Target {
    /// Nodes expand before entries at equal distance so that entry ties resolve by
    /// insertion order alone.
    fn rank(&self) -> (u8, usize) {
        match self {
            Target::Node(id) => (0, *id),
            Target::Entry(id) => (1, *id),
        }
    }
}

struct Candidate {
    distance: f64,
    target: Target,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so that the nearest candidate pops first.
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.target.rank().cmp(&other.target.rank()))
            .reverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(coords: &[f64]) -> FeatureVector {
        FeatureVector::new(coords).unwrap()
    }

    fn grid_tree() -> RTree<usize> {
        // 10×10 integer grid, handle = row*10 + column.
        let mut tree = RTree::new(2).unwrap();
        let points: Vec<(FeatureVector, usize)> = (0..100)
            .map(|i| (feature(&[(i / 10) as f64, (i % 10) as f64]), i))
            .collect();
        tree.insert_points(points).unwrap();
        tree
    }

    #[test]
    fn box_query_on_bulk_loaded_grid() {
        let tree = grid_tree();
        assert_eq!(tree.size(), 100);
        let hits = tree
            .find_points_in_box(&feature(&[2.0, 3.0]), &feature(&[4.0, 5.0]))
            .unwrap();
        assert_eq!(hits.len(), 9);
        // Closed box: boundary points included; insertion order preserved.
        assert_eq!(hits, vec![23, 24, 25, 33, 34, 35, 43, 44, 45]);
    }

    #[test]
    fn incremental_inserts_answer_the_same_queries() {
        let mut tree = RTree::new(2).unwrap();
        for i in 0..100usize {
            tree.insert_point(feature(&[(i / 10) as f64, (i % 10) as f64]), i)
                .unwrap();
        }
        let hits = tree
            .find_points_in_box(&feature(&[2.0, 3.0]), &feature(&[4.0, 5.0]))
            .unwrap();
        assert_eq!(hits, vec![23, 24, 25, 33, 34, 35, 43, 44, 45]);
    }

    #[test]
    fn nearest_neighbors_ordered_by_distance_then_insertion() {
        let tree = grid_tree();
        let neighbors = tree
            .find_nearest_neighbors(&feature(&[5.0, 5.0]), 5)
            .unwrap();
        assert_eq!(neighbors[0], 55);
        // The four axis neighbors are all at distance 1; insertion order decides.
        assert_eq!(&neighbors[1..], &[45, 54, 56, 65]);
    }

    #[test]
    fn nearest_neighbors_clamped_to_population() {
        let mut tree = RTree::new(1).unwrap();
        tree.insert_point(feature(&[1.0]), "a").unwrap();
        tree.insert_point(feature(&[2.0]), "b").unwrap();
        let neighbors = tree.find_nearest_neighbors(&feature(&[0.0]), 10).unwrap();
        assert_eq!(neighbors, vec!["a", "b"]);
        assert!(tree
            .find_nearest_neighbors(&feature(&[0.0]), 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let mut tree: RTree<usize> = RTree::new(2).unwrap();
        assert!(matches!(
            tree.insert_point(feature(&[1.0]), 0),
            Err(TrajkitError::DimensionMismatch { .. })
        ));
        let tree = grid_tree();
        assert!(tree
            .find_points_in_box(&feature(&[0.0]), &feature(&[1.0]))
            .is_err());
    }

    #[test]
    fn empty_tree_queries() {
        let tree: RTree<usize> = RTree::new(3).unwrap();
        assert_eq!(tree.size(), 0);
        assert!(tree
            .find_points_in_box(&feature(&[0.0, 0.0, 0.0]), &feature(&[1.0, 1.0, 1.0]))
            .unwrap()
            .is_empty());
        assert!(tree
            .find_nearest_neighbors(&feature(&[0.0, 0.0, 0.0]), 4)
            .unwrap()
            .is_empty());
    }
}
