// Copyright @yucwang 2026

use crate::math::aabb::AABB;
use crate::math::constants::{Float, Vector3f, EPSILON};
use crate::math::ray::Ray3f;

/// Where a diffuser's extent lies relative to a split plane.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Both,
}

/// Axis-aligned cell of the partition with the diffusers it overlaps.
///
/// The list holds indices into the scene's diffuser array; the scene owns
/// the diffusers and outlives any tree built over them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BspBox {
    bounds: AABB,
    label: usize,
    diffusers: Vec<usize>,
}

impl BspBox {
    /// Root cell spanning the scene extents and listing every diffuser.
    pub fn seed_root<I>(scene_min: Vector3f, scene_max: Vector3f, diffusers: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Self {
            bounds: AABB::new(scene_min, scene_max),
            label: 0,
            diffusers: diffusers.into_iter().collect(),
        }
    }

    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    pub fn min(&self, axis: usize) -> Float {
        self.bounds.p_min[axis]
    }

    pub fn max(&self, axis: usize) -> Float {
        self.bounds.p_max[axis]
    }

    pub fn label(&self) -> usize {
        self.label
    }

    pub fn set_label(&mut self, label: usize) {
        self.label = label;
    }

    pub fn diffusers(&self) -> &[usize] {
        &self.diffusers
    }

    pub fn len(&self) -> usize {
        self.diffusers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diffusers.is_empty()
    }

    pub fn add(&mut self, diffuser: usize) {
        self.diffusers.push(diffuser);
    }

    pub fn contains(&self, p: &Vector3f) -> bool {
        self.bounds.contains(p)
    }

    /// Releases the cell's own list. Diffusers are untouched.
    pub fn clear(&mut self) {
        self.diffusers = Vec::new();
    }

    pub fn copy_into(&self, dest: &mut BspBox) {
        dest.bounds = self.bounds;
        dest.label = self.label;
        dest.diffusers.clear();
        dest.diffusers.extend_from_slice(&self.diffusers);
    }

    /// Two children equal to this cell except along `axis`, where the first
    /// ends and the second starts at `position`. Both start empty.
    pub fn split(&self, axis: usize, position: Float) -> (BspBox, BspBox) {
        let mut left = BspBox::default();
        let mut right = BspBox::default();
        self.copy_into(&mut left);
        self.copy_into(&mut right);
        left.clear();
        right.clear();
        left.bounds.p_max[axis] = position;
        right.bounds.p_min[axis] = position;
        (left, right)
    }

    /// Classifies `extent` against the plane closing `left` along `axis`.
    /// Touching the plane counts as straddling, since both closed children
    /// contain the contact points.
    pub fn classify(extent: &AABB, left: &BspBox, axis: usize) -> Side {
        let plane = left.max(axis);
        if extent.p_max[axis] < plane {
            Side::Left
        } else if extent.p_min[axis] > plane {
            Side::Right
        } else {
            Side::Both
        }
    }

    /// Appends every diffuser of this cell to the child (or children) its
    /// extent overlaps. `extents` is indexed by diffuser.
    pub fn distribute(&self, left: &mut BspBox, right: &mut BspBox, axis: usize, extents: &[AABB]) {
        for &d in &self.diffusers {
            match BspBox::classify(&extents[d], left, axis) {
                Side::Left => left.add(d),
                Side::Right => right.add(d),
                Side::Both => {
                    left.add(d);
                    right.add(d);
                }
            }
        }
    }
}

/// Build-time tunables of the partition.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BspPolicy {
    pub max_leaf_size: usize,
    pub max_depth: usize,
}

impl Default for BspPolicy {
    fn default() -> Self {
        Self { max_leaf_size: 8, max_depth: 16 }
    }
}

#[derive(Debug, Clone)]
struct BspNode {
    cell: BspBox,
    children: Option<[usize; 2]>,
    start: usize,
    count: usize,
}

/// Partition tree stored as an arena. Leaves address ranges of `refs`;
/// a diffuser straddling splits appears in every leaf it overlaps.
#[derive(Debug, Clone)]
pub struct Bsp {
    nodes: Vec<BspNode>,
    refs: Vec<usize>,
    policy: BspPolicy,
    depth: usize,
}

impl Bsp {
    pub fn build(root: BspBox, extents: &[AABB], policy: BspPolicy) -> Self {
        let mut bsp = Self {
            nodes: Vec::new(),
            refs: Vec::new(),
            policy: BspPolicy {
                max_leaf_size: policy.max_leaf_size.max(1),
                max_depth: policy.max_depth,
            },
            depth: 0,
        };
        bsp.build_node(root, 0, extents);
        log::debug!("BSP built: {} nodes, {} leaf references, depth {}.",
                    bsp.nodes.len(), bsp.refs.len(), bsp.depth);
        bsp
    }

    fn push_leaf(&mut self, mut cell: BspBox) -> usize {
        let node_idx = self.nodes.len();
        let start = self.refs.len();
        let count = cell.len();
        self.refs.extend_from_slice(cell.diffusers());
        cell.clear();
        cell.set_label(node_idx);
        self.nodes.push(BspNode { cell, children: None, start, count });
        node_idx
    }

    fn build_node(&mut self, mut cell: BspBox, depth: usize, extents: &[AABB]) -> usize {
        self.depth = self.depth.max(depth);
        if cell.len() <= self.policy.max_leaf_size || depth >= self.policy.max_depth {
            return self.push_leaf(cell);
        }

        let axis = cell.bounds().max_extent();
        if cell.max(axis) - cell.min(axis) < EPSILON {
            return self.push_leaf(cell);
        }
        let position = 0.5 * (cell.min(axis) + cell.max(axis));

        let (mut left, mut right) = cell.split(axis, position);
        cell.distribute(&mut left, &mut right, axis, extents);
        if left.len() == cell.len() && right.len() == cell.len() {
            // Everything straddles; splitting further only duplicates.
            return self.push_leaf(cell);
        }

        let node_idx = self.nodes.len();
        cell.clear();
        cell.set_label(node_idx);
        self.nodes.push(BspNode { cell, children: None, start: 0, count: 0 });
        let left_idx = self.build_node(left, depth + 1, extents);
        let right_idx = self.build_node(right, depth + 1, extents);
        self.nodes[node_idx].children = Some([left_idx, right_idx]);
        node_idx
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Leaf cells with the diffusers they reference.
    pub fn leaves(&self) -> Vec<(&BspBox, &[usize])> {
        self.nodes
            .iter()
            .filter(|node| node.children.is_none())
            .map(|node| (&node.cell, &self.refs[node.start..node.start + node.count]))
            .collect()
    }

    /// Closest hit reported by `hit_fn` along `ray`. Every cell the current
    /// segment crosses is visited and the segment shrinks as hits are found.
    pub fn ray_intersection<F, T>(&self, ray: &Ray3f, mut hit_fn: F) -> Option<(usize, T)>
    where
        F: FnMut(usize) -> Option<(T, Float)>,
    {
        if self.nodes.is_empty() {
            return None;
        }

        let mut segment = *ray;
        let mut closest: Option<(usize, T)> = None;
        let mut stack = vec![0usize];

        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if !node.cell.bounds().ray_intersect(&segment) {
                continue;
            }

            match node.children {
                Some([left, right]) => {
                    stack.push(left);
                    stack.push(right);
                }
                None => {
                    for &d in &self.refs[node.start..node.start + node.count] {
                        if let Some((hit, t)) = hit_fn(d) {
                            if segment.test_segment(t) {
                                segment.max_t = t;
                                closest = Some((d, hit));
                            }
                        }
                    }
                }
            }
        }

        closest
    }
}
