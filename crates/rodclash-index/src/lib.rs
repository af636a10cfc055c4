#![warn(missing_docs)]

//! Broad-phase bounding-volume tree for rodclash.
//!
//! A binary AABB tree over opaque payloads. Bulk construction uses the
//! Surface Area Heuristic (12-bucket sweep, midpoint fallback) and is the
//! preferred path for a full analysis run; incremental insertion descends
//! by least surface-area enlargement and is average-case logarithmic.
//!
//! Region queries never miss an overlapping entry; each candidate is
//! checked against its own stored box, so the caller receives the exact
//! candidate set (the narrow phase still decides actual interference).
//! Duplicate and degenerate (zero-volume) boxes are fine. There is no
//! deletion: a new analysis run rebuilds the tree.

use rodclash_geom::Aabb3;
use rodclash_math::Point3;

/// Leaf capacity for SAH bulk construction.
const BULK_LEAF_SIZE: usize = 4;
/// Leaf capacity before an incremental insert splits a leaf.
const INSERT_LEAF_SIZE: usize = 8;
/// Bucket count for the SAH sweep.
const NUM_BUCKETS: usize = 12;

/// A node — either a leaf holding slab indices or an internal split.
#[derive(Debug, Clone)]
enum Node {
    Leaf { aabb: Aabb3, entries: Vec<usize> },
    Internal {
        aabb: Aabb3,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn aabb(&self) -> Aabb3 {
        match self {
            Node::Leaf { aabb, .. } => *aabb,
            Node::Internal { aabb, .. } => *aabb,
        }
    }
}

/// Opaque handle to an inserted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(usize);

/// Bounding-volume tree over payloads of type `T`.
#[derive(Debug, Clone)]
pub struct BoundsTree<T> {
    root: Option<Node>,
    slab: Vec<(Aabb3, T)>,
}

impl<T> Default for BoundsTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BoundsTree<T> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            root: None,
            slab: Vec::new(),
        }
    }

    /// Build a tree from a full entry set using SAH construction.
    pub fn bulk_load(entries: Vec<(Aabb3, T)>) -> Self {
        let mut build: Vec<(usize, Aabb3, Point3)> = entries
            .iter()
            .enumerate()
            .map(|(i, (aabb, _))| (i, *aabb, aabb.center()))
            .collect();

        let root = if build.is_empty() {
            None
        } else {
            Some(build_node(&mut build))
        };

        Self {
            root,
            slab: entries,
        }
    }

    /// Insert a single entry, returning its handle.
    ///
    /// Descends by least surface-area enlargement. Bulk loading gives
    /// better query locality; use this for late additions only.
    pub fn insert(&mut self, aabb: Aabb3, item: T) -> EntryHandle {
        let idx = self.slab.len();
        self.slab.push((aabb, item));

        let root = self.root.take();
        self.root = Some(match root {
            None => Node::Leaf {
                aabb,
                entries: vec![idx],
            },
            Some(node) => insert_entry(node, idx, &aabb, &self.slab),
        });

        EntryHandle(idx)
    }

    /// Number of entries in the tree.
    pub fn len(&self) -> usize {
        self.slab.len()
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.slab.is_empty()
    }

    /// Payload for a handle, if it exists.
    pub fn get(&self, handle: EntryHandle) -> Option<&T> {
        self.slab.get(handle.0).map(|(_, item)| item)
    }

    /// Iterate over every payload whose box overlaps `bounds`.
    ///
    /// Candidates are verified against their own stored boxes, so the
    /// result is exactly the overlapping set, in deterministic tree
    /// order for a fixed build.
    pub fn query(&self, bounds: &Aabb3) -> Query<'_, T> {
        let mut stack = Vec::new();
        if let Some(root) = &self.root {
            stack.push(root);
        }
        Query {
            slab: &self.slab,
            bounds: *bounds,
            stack,
            leaf: [].iter(),
        }
    }
}

/// Iterator over payloads whose boxes overlap a query box.
pub struct Query<'a, T> {
    slab: &'a [(Aabb3, T)],
    bounds: Aabb3,
    stack: Vec<&'a Node>,
    leaf: std::slice::Iter<'a, usize>,
}

impl<'a, T> Iterator for Query<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            for &idx in self.leaf.by_ref() {
                let (aabb, item) = &self.slab[idx];
                if aabb.overlaps(&self.bounds) {
                    return Some(item);
                }
            }
            match self.stack.pop()? {
                Node::Leaf { aabb, entries } => {
                    if aabb.overlaps(&self.bounds) {
                        self.leaf = entries.iter();
                    }
                }
                Node::Internal { aabb, left, right } => {
                    if aabb.overlaps(&self.bounds) {
                        self.stack.push(left);
                        self.stack.push(right);
                    }
                }
            }
        }
    }
}

/// Insert an entry into a subtree, rebuilding the spine.
fn insert_entry<T>(node: Node, idx: usize, aabb: &Aabb3, slab: &[(Aabb3, T)]) -> Node {
    match node {
        Node::Leaf {
            aabb: mut node_aabb,
            mut entries,
        } => {
            node_aabb.include_aabb(aabb);
            entries.push(idx);
            if entries.len() > INSERT_LEAF_SIZE {
                split_leaf(node_aabb, entries, slab)
            } else {
                Node::Leaf {
                    aabb: node_aabb,
                    entries,
                }
            }
        }
        Node::Internal {
            aabb: mut node_aabb,
            left,
            right,
        } => {
            node_aabb.include_aabb(aabb);

            // Descend into the child whose box grows the least.
            let grow = |child: &Node| {
                let mut grown = child.aabb();
                grown.include_aabb(aabb);
                grown.surface_area() - child.aabb().surface_area()
            };

            if grow(&left) <= grow(&right) {
                Node::Internal {
                    aabb: node_aabb,
                    left: Box::new(insert_entry(*left, idx, aabb, slab)),
                    right,
                }
            } else {
                Node::Internal {
                    aabb: node_aabb,
                    left,
                    right: Box::new(insert_entry(*right, idx, aabb, slab)),
                }
            }
        }
    }
}

/// Split an overfull leaf at the centroid median of its longest axis.
fn split_leaf<T>(aabb: Aabb3, mut entries: Vec<usize>, slab: &[(Aabb3, T)]) -> Node {
    let mut centroid_bounds = Aabb3::empty();
    for &idx in &entries {
        centroid_bounds.include_point(&slab[idx].0.center());
    }
    let extent = centroid_bounds.max - centroid_bounds.min;
    let axis = if extent.x >= extent.y && extent.x >= extent.z {
        0
    } else if extent.y >= extent.z {
        1
    } else {
        2
    };

    entries.sort_by(|&a, &b| {
        let ca = slab[a].0.center()[axis];
        let cb = slab[b].0.center()[axis];
        ca.partial_cmp(&cb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mid = entries.len() / 2;
    let right_entries = entries.split_off(mid);
    let make_leaf = |entries: Vec<usize>| {
        let mut aabb = Aabb3::empty();
        for &idx in &entries {
            aabb.include_aabb(&slab[idx].0);
        }
        Node::Leaf { aabb, entries }
    };

    Node::Internal {
        aabb,
        left: Box::new(make_leaf(entries)),
        right: Box::new(make_leaf(right_entries)),
    }
}

/// Build a subtree recursively using SAH.
fn build_node(entries: &mut [(usize, Aabb3, Point3)]) -> Node {
    let mut bounds = Aabb3::empty();
    for (_, aabb, _) in entries.iter() {
        bounds.include_aabb(aabb);
    }

    if entries.len() <= BULK_LEAF_SIZE {
        return Node::Leaf {
            aabb: bounds,
            entries: entries.iter().map(|(idx, _, _)| *idx).collect(),
        };
    }

    let (best_axis, best_pos) = find_best_split(entries, &bounds);
    let mid = partition_entries(entries, best_axis, best_pos);

    // Degenerate partition (coincident centroids): split in the middle.
    let mid = if mid == 0 || mid == entries.len() {
        entries.len() / 2
    } else {
        mid
    };

    let (left, right) = entries.split_at_mut(mid);
    Node::Internal {
        aabb: bounds,
        left: Box::new(build_node(left)),
        right: Box::new(build_node(right)),
    }
}

/// Find the best split axis and position using the SAH bucket sweep.
fn find_best_split(entries: &[(usize, Aabb3, Point3)], bounds: &Aabb3) -> (usize, f64) {
    let extent = bounds.max - bounds.min;

    let mut best_cost = f64::INFINITY;
    let mut best_axis = 0;
    let mut best_pos = 0.0;

    for axis in 0..3 {
        let axis_extent = extent[axis];
        if axis_extent < 1e-10 {
            continue;
        }
        let axis_min = bounds.min[axis];

        let mut bucket_counts = [0usize; NUM_BUCKETS];
        let mut bucket_bounds = [Aabb3::empty(); NUM_BUCKETS];

        for (_, aabb, centroid) in entries {
            let b = ((centroid[axis] - axis_min) / axis_extent * NUM_BUCKETS as f64) as usize;
            let b = b.min(NUM_BUCKETS - 1);
            bucket_counts[b] += 1;
            bucket_bounds[b].include_aabb(aabb);
        }

        for split in 1..NUM_BUCKETS {
            let mut left_count = 0;
            let mut left_bounds = Aabb3::empty();
            for i in 0..split {
                left_count += bucket_counts[i];
                if bucket_counts[i] > 0 {
                    left_bounds.include_aabb(&bucket_bounds[i]);
                }
            }

            let mut right_count = 0;
            let mut right_bounds = Aabb3::empty();
            for i in split..NUM_BUCKETS {
                right_count += bucket_counts[i];
                if bucket_counts[i] > 0 {
                    right_bounds.include_aabb(&bucket_bounds[i]);
                }
            }

            if left_count == 0 || right_count == 0 {
                continue;
            }

            // SAH cost: traversal + P(left) * N_left + P(right) * N_right
            let total_area = bounds.surface_area();
            let cost = 0.125
                + left_bounds.surface_area() / total_area * left_count as f64
                + right_bounds.surface_area() / total_area * right_count as f64;

            if cost < best_cost {
                best_cost = cost;
                best_axis = axis;
                best_pos = axis_min + (split as f64 / NUM_BUCKETS as f64) * axis_extent;
            }
        }
    }

    (best_axis, best_pos)
}

/// Partition entries by centroid along an axis.
fn partition_entries(entries: &mut [(usize, Aabb3, Point3)], axis: usize, pos: f64) -> usize {
    let mut left = 0;
    let mut right = entries.len();

    while left < right {
        if entries[left].2[axis] < pos {
            left += 1;
        } else {
            right -= 1;
            entries.swap(left, right);
        }
    }

    left
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic LCG for reproducible box soup.
    struct Lcg(u64);

    impl Lcg {
        fn next_f64(&mut self) -> f64 {
            self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (self.0 >> 11) as f64 / (1u64 << 53) as f64
        }
    }

    fn random_boxes(count: usize, seed: u64) -> Vec<(Aabb3, usize)> {
        let mut rng = Lcg(seed);
        (0..count)
            .map(|i| {
                let min = Point3::new(
                    rng.next_f64() * 100.0,
                    rng.next_f64() * 100.0,
                    rng.next_f64() * 100.0,
                );
                let size = rng.next_f64() * 10.0;
                let max = Point3::new(min.x + size, min.y + size, min.z + size);
                (Aabb3::new(min, max), i)
            })
            .collect()
    }

    fn brute_force(boxes: &[(Aabb3, usize)], query: &Aabb3) -> Vec<usize> {
        let mut hits: Vec<usize> = boxes
            .iter()
            .filter(|(aabb, _)| aabb.overlaps(query))
            .map(|&(_, id)| id)
            .collect();
        hits.sort_unstable();
        hits
    }

    fn tree_query(tree: &BoundsTree<usize>, query: &Aabb3) -> Vec<usize> {
        let mut hits: Vec<usize> = tree.query(query).copied().collect();
        hits.sort_unstable();
        hits
    }

    #[test]
    fn test_empty_tree() {
        let tree: BoundsTree<usize> = BoundsTree::new();
        assert!(tree.is_empty());
        let query = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(tree.query(&query).count(), 0);
    }

    #[test]
    fn test_bulk_matches_brute_force() {
        let boxes = random_boxes(200, 42);
        let tree = BoundsTree::bulk_load(boxes.clone());
        assert_eq!(tree.len(), 200);

        let mut rng = Lcg(7);
        for _ in 0..50 {
            let min = Point3::new(
                rng.next_f64() * 100.0,
                rng.next_f64() * 100.0,
                rng.next_f64() * 100.0,
            );
            let max = Point3::new(min.x + 15.0, min.y + 15.0, min.z + 15.0);
            let query = Aabb3::new(min, max);
            assert_eq!(tree_query(&tree, &query), brute_force(&boxes, &query));
        }
    }

    #[test]
    fn test_insert_matches_brute_force() {
        let boxes = random_boxes(120, 99);
        let mut tree = BoundsTree::new();
        for (aabb, id) in &boxes {
            tree.insert(*aabb, *id);
        }

        let query = Aabb3::new(Point3::new(20.0, 20.0, 20.0), Point3::new(60.0, 60.0, 60.0));
        assert_eq!(tree_query(&tree, &query), brute_force(&boxes, &query));
    }

    #[test]
    fn test_duplicate_and_degenerate_boxes() {
        let p = Point3::new(5.0, 5.0, 5.0);
        let dup = Aabb3::new(p, Point3::new(6.0, 6.0, 6.0));
        let degenerate = Aabb3::new(p, p);
        let tree = BoundsTree::bulk_load(vec![
            (dup, 0usize),
            (dup, 1),
            (dup, 2),
            (degenerate, 3),
            (degenerate, 4),
        ]);

        let query = Aabb3::new(Point3::new(4.0, 4.0, 4.0), Point3::new(5.5, 5.5, 5.5));
        let mut hits: Vec<usize> = tree.query(&query).copied().collect();
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_query_filters_by_entry_box() {
        // Two far-apart boxes share a leaf ancestor; querying near one
        // must not return the other.
        let a = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb3::new(Point3::new(50.0, 0.0, 0.0), Point3::new(51.0, 1.0, 1.0));
        let tree = BoundsTree::bulk_load(vec![(a, 'a'), (b, 'b')]);

        let query = Aabb3::new(Point3::new(0.5, 0.5, 0.5), Point3::new(2.0, 2.0, 2.0));
        let hits: Vec<char> = tree.query(&query).copied().collect();
        assert_eq!(hits, vec!['a']);
    }

    #[test]
    fn test_handle_lookup() {
        let mut tree = BoundsTree::new();
        let aabb = Aabb3::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let handle = tree.insert(aabb, "duct");
        assert_eq!(tree.get(handle), Some(&"duct"));
    }

    #[test]
    fn test_insert_grows_past_leaf_split() {
        // Push enough entries through the incremental path to force
        // leaf splits, then verify nothing is lost.
        let boxes = random_boxes(40, 3);
        let mut tree = BoundsTree::new();
        for (aabb, id) in &boxes {
            tree.insert(*aabb, *id);
        }
        let everything = Aabb3::new(
            Point3::new(-10.0, -10.0, -10.0),
            Point3::new(200.0, 200.0, 200.0),
        );
        assert_eq!(tree.query(&everything).count(), 40);
    }
}
