//! A surface-area-heuristic KD-tree accelerator over bounded scene objects.
//!
//! Nodes are packed into 8 bytes each: the low 2 bits of the first `u32` tag
//! the node as an X/Y/Z-split internal node or a leaf, the remaining 30 bits
//! hold either the left child's index or the leaf's primitive count, and the
//! second `u32` holds either the leaf's first object-pointer index or the
//! internal split position (reinterpreted as bits). The right child of an
//! internal node is never stored explicitly — it's always the node
//! immediately following its parent in the flat node array, since the build
//! always finishes the right subtree before starting the left.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use tracer_core::ray::Ray;
use tracer_core::scene::Object;

const MIN_LEAF_LOAD: usize = 4;
const NUM_BUCKETS: u32 = 32;
const INTERSECT_COST: f32 = 1.0;
const RIGHT_NODE_RELATIVE_COST: f32 = 0.95;
const EMPTY_BONUS: f32 = 0.5;
const TRAVERSAL_COST: f32 = 1.0;
const LEFT_NODE_RELATIVE_COST: f32 = 1.0 + (1.0 - RIGHT_NODE_RELATIVE_COST);

/// 30-bit fields cap how many nodes or primitive references a tree can hold.
const MAX_PACKED_INDEX: usize = (1 << 30) - 1;

#[derive(thiserror::Error, Debug)]
pub enum AccelError {
    #[error("{0} objects exceed the KD-tree's 30-bit index packing limit")]
    TooManyObjects(usize),
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct KdNode {
    tag_and_payload: u32,
    aux: u32,
}

const LEAF_TAG: u32 = 3;

impl KdNode {
    fn leaf(len: u32, obj_index: u32) -> Self {
        Self {
            tag_and_payload: (len << 2) | LEAF_TAG,
            aux: obj_index,
        }
    }

    fn internal(axis: usize, left_index: u32, split: f32) -> Self {
        Self {
            tag_and_payload: (left_index << 2) | (axis as u32),
            aux: split.to_bits(),
        }
    }

    fn is_leaf(&self) -> bool {
        (self.tag_and_payload & 0b11) == LEAF_TAG
    }

    fn axis(&self) -> usize {
        (self.tag_and_payload & 0b11) as usize
    }

    fn payload(&self) -> u32 {
        self.tag_and_payload >> 2
    }

    fn split(&self) -> f32 {
        f32::from_bits(self.aux)
    }
}

/// A box paired with the index into the scene's object slice it bounds.
#[derive(Clone, Copy)]
struct KdBox {
    index: usize,
    bbox: tracer_core::bbox::BoundingBox,
}

fn surface_area(b: tracer_core::bbox::BoundingBox) -> f32 {
    b.surface_area()
}

fn split_box(
    b: tracer_core::bbox::BoundingBox,
    split: f32,
    axis: usize,
) -> (tracer_core::bbox::BoundingBox, tracer_core::bbox::BoundingBox) {
    let mut left = b;
    let mut right = b;
    left.max[axis] = split;
    right.min[axis] = split;
    (left, right)
}

fn compute_split_sah(items: &[KdBox], split: f32, axis: usize, parent: tracer_core::bbox::BoundingBox) -> f32 {
    let parent_sa = surface_area(parent);
    let (left_box, right_box) = split_box(parent, split, axis);

    let mut left_prims = 0usize;
    let mut right_prims = 0usize;

    for item in items {
        let (lo, hi) = item.bbox.axis_range(axis);
        if hi < split {
            left_prims += 1;
        } else if lo > split {
            right_prims += 1;
        } else {
            left_prims += 1;
            right_prims += 1;
        }
    }

    let left_cost = (surface_area(left_box) / parent_sa) * left_prims as f32 * INTERSECT_COST * LEFT_NODE_RELATIVE_COST;
    let right_cost =
        (surface_area(right_box) / parent_sa) * right_prims as f32 * INTERSECT_COST * RIGHT_NODE_RELATIVE_COST;
    let empty_bonus = if left_prims == 0 || right_prims == 0 {
        EMPTY_BONUS
    } else {
        0.0
    };

    TRAVERSAL_COST + (1.0 - empty_bonus) * (left_cost + right_cost)
}

fn bounding_all(items: &[KdBox]) -> tracer_core::bbox::BoundingBox {
    let mut b = items[0].bbox;
    for item in &items[1..] {
        b = b.union(&item.bbox);
    }
    b
}

/// A surface-area-heuristic KD-tree over a scene's bounded objects.
pub struct KdTree {
    nodes: Vec<KdNode>,
    obj_indices: Vec<usize>,
    world_box: tracer_core::bbox::BoundingBox,
    root: usize,
}

impl KdTree {
    /// Builds a tree over `objects[indices]`. Returns `Ok(None)` if `indices`
    /// is empty (the reference leaves `kdTree` null in that case).
    pub fn build(objects: &[Object], indices: &[usize]) -> Result<Option<KdTree>, AccelError> {
        if indices.is_empty() {
            return Ok(None);
        }
        if indices.len() > MAX_PACKED_INDEX {
            return Err(AccelError::TooManyObjects(indices.len()));
        }

        let items: Vec<KdBox> = indices
            .iter()
            .map(|&idx| KdBox {
                index: idx,
                bbox: objects[idx].bounding_box(),
            })
            .collect();

        let world_box = bounding_all(&items);
        let max_depth = (8.0 + 1.8 * (items.len() as f64).log2()) as u32;

        let mut nodes = Vec::new();
        let mut obj_indices = Vec::new();
        let root = build_node(&mut nodes, &mut obj_indices, &items, world_box, max_depth)?;

        Ok(Some(KdTree {
            nodes,
            obj_indices,
            world_box,
            root,
        }))
    }

    pub fn world_box(&self) -> tracer_core::bbox::BoundingBox {
        self.world_box
    }

    /// Finds the closest object this ray intersects in `(RT_EPSILON, t_max)`.
    pub fn hit(
        &self,
        objects: &[Object],
        ray: &Ray,
        t_max: f32,
    ) -> Option<(usize, tracer_core::hit::HitInfo)> {
        self.check_hit_next_node(self.root, objects, ray, t_max)
    }

    fn check_hit_next_node(
        &self,
        node_idx: usize,
        objects: &[Object],
        ray: &Ray,
        t_max: f32,
    ) -> Option<(usize, tracer_core::hit::HitInfo)> {
        let node = self.nodes[node_idx];
        if node.is_leaf() {
            self.check_hit_leaf(&node, objects, ray, t_max)
        } else {
            self.check_hit_internal(node_idx, &node, objects, ray, t_max)
        }
    }

    fn check_hit_leaf(
        &self,
        node: &KdNode,
        objects: &[Object],
        ray: &Ray,
        t_max: f32,
    ) -> Option<(usize, tracer_core::hit::HitInfo)> {
        let len = node.payload() as usize;
        let first = node.aux as usize;

        let mut best: Option<(usize, tracer_core::hit::HitInfo)> = None;

        for slot in first..first + len {
            let obj_index = self.obj_indices[slot];
            if let Some(hit) = objects[obj_index].surface.hit(ray, 0.001, t_max) {
                let closer = match &best {
                    Some((_, best_hit)) => hit.t_intersect < best_hit.t_intersect,
                    None => true,
                };
                if closer {
                    best = Some((obj_index, hit));
                }
            }
        }

        best
    }

    fn check_hit_internal(
        &self,
        node_idx: usize,
        node: &KdNode,
        objects: &[Object],
        ray: &Ray,
        t_max: f32,
    ) -> Option<(usize, tracer_core::hit::HitInfo)> {
        const EPSILON_PARALLEL: f32 = 0.0001;
        const EPSILON_INTERSECT: f32 = 0.001;

        let axis = node.axis();
        let split = node.split();
        let left_idx = node.payload() as usize;
        let right_idx = node_idx + 1;

        let dir_axis = ray.dir[axis];

        if dir_axis.abs() < EPSILON_PARALLEL {
            return if ray.origin[axis] >= split {
                self.check_hit_next_node(right_idx, objects, ray, t_max)
            } else {
                self.check_hit_next_node(left_idx, objects, ray, t_max)
            };
        }

        let t_intersect = split * ray.inv_dir()[axis] - ray.origin_div_dir()[axis];
        let t_max_new = t_max.min(t_intersect);

        if t_intersect < EPSILON_INTERSECT {
            if ray.origin[axis] > split {
                self.check_hit_next_node(right_idx, objects, ray, t_max)
            } else if ray.origin[axis] < split {
                self.check_hit_next_node(left_idx, objects, ray, t_max)
            } else {
                let ray_at = ray.at(1.0)[axis];
                if ray_at >= split {
                    self.check_hit_next_node(right_idx, objects, ray, t_max)
                } else {
                    self.check_hit_next_node(left_idx, objects, ray, t_max)
                }
            }
        } else {
            let (origin_idx, opposite_idx) = if ray.origin[axis] >= split {
                (right_idx, left_idx)
            } else {
                (left_idx, right_idx)
            };

            if let Some(result) = self.check_hit_next_node(origin_idx, objects, ray, t_max_new) {
                Some(result)
            } else if t_max_new == t_intersect {
                self.check_hit_next_node(opposite_idx, objects, ray, t_max)
            } else {
                None
            }
        }
    }
}

fn build_leaf_node(nodes: &mut Vec<KdNode>, obj_indices: &mut Vec<usize>, items: &[KdBox]) -> Result<usize, AccelError> {
    let node_index = nodes.len();
    if node_index > MAX_PACKED_INDEX || obj_indices.len() + items.len() > MAX_PACKED_INDEX {
        return Err(AccelError::TooManyObjects(obj_indices.len() + items.len()));
    }

    let first_obj_index = obj_indices.len() as u32;
    nodes.push(KdNode::leaf(items.len() as u32, first_obj_index));
    obj_indices.extend(items.iter().map(|item| item.index));

    Ok(node_index)
}

fn build_parent_node(
    nodes: &mut Vec<KdNode>,
    obj_indices: &mut Vec<usize>,
    left_items: &[KdBox],
    left_container: tracer_core::bbox::BoundingBox,
    right_items: &[KdBox],
    right_container: tracer_core::bbox::BoundingBox,
    split: f32,
    axis: usize,
    depth: u32,
) -> Result<usize, AccelError> {
    let parent_index = nodes.len();
    nodes.push(KdNode { tag_and_payload: 0, aux: 0 });

    // Build right before left so the right child always lands at
    // `parent_index + 1`, letting traversal find it without storing an index.
    let right_node = build_node(nodes, obj_indices, right_items, right_container, depth)?;
    debug_assert_eq!(right_node, parent_index + 1);
    let left_node = build_node(nodes, obj_indices, left_items, left_container, depth)?;

    nodes[parent_index] = KdNode::internal(axis, left_node as u32, split);

    Ok(parent_index)
}

fn build_node(
    nodes: &mut Vec<KdNode>,
    obj_indices: &mut Vec<usize>,
    items: &[KdBox],
    container: tracer_core::bbox::BoundingBox,
    depth: u32,
) -> Result<usize, AccelError> {
    if items.len() <= MIN_LEAF_LOAD || depth == 0 {
        return build_leaf_node(nodes, obj_indices, items);
    }

    let mut best_split = 0.0f32;
    let mut best_axis = 0usize;
    let mut best_sah = f32::INFINITY;

    for axis in 0..3 {
        let (lo, hi) = container.axis_range(axis);
        let stride = (hi - lo) / NUM_BUCKETS as f32;
        if stride <= 0.0 {
            continue;
        }

        for k in 1..NUM_BUCKETS {
            let split = lo + stride * k as f32;
            let sah = compute_split_sah(items, split, axis, container);
            if sah < best_sah {
                best_sah = sah;
                best_axis = axis;
                best_split = split;
            }
        }
    }

    let parent_sah = items.len() as f32 * INTERSECT_COST;
    if parent_sah <= best_sah {
        return build_leaf_node(nodes, obj_indices, items);
    }

    let mut left_items = Vec::with_capacity(items.len());
    let mut right_items = Vec::with_capacity(items.len());

    for item in items {
        let (lo, hi) = item.bbox.axis_range(best_axis);
        if hi < best_split {
            left_items.push(*item);
        } else if lo > best_split {
            right_items.push(*item);
        } else {
            left_items.push(*item);
            right_items.push(*item);
        }
    }

    let (left_container, right_container) = split_box(container, best_split, best_axis);

    build_parent_node(
        nodes,
        obj_indices,
        &left_items,
        left_container,
        &right_items,
        right_container,
        best_split,
        best_axis,
        depth - 1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tracer_core::material::Material;
    use tracer_core::surface::{Sphere, Surface};
    use tracer_core::texture::Texture;

    fn grid_of_spheres(n: usize) -> Vec<Object> {
        let material = Arc::new(Material::diffuse(Texture::solid(Vec3::splat(0.5))));
        (0..n)
            .map(|i| {
                let x = (i as f32) * 3.0;
                Object::new(
                    Surface::Sphere(Sphere::new(Vec3::new(x, 0.0, 0.0), 1.0)),
                    material.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn empty_indices_yield_no_tree() {
        let objects = grid_of_spheres(3);
        let tree = KdTree::build(&objects, &[]).unwrap();
        assert!(tree.is_none());
    }

    #[test]
    fn kdtree_hit_matches_linear_scan_over_a_grid() {
        let objects = grid_of_spheres(50);
        let indices: Vec<usize> = (0..objects.len()).collect();
        let tree = KdTree::build(&objects, &indices).unwrap().unwrap();

        let mut scene = tracer_core::scene::Scene::new(Arc::new(tracer_core::skybox::Skybox::solid(Vec3::ZERO)));
        for obj in &objects {
            scene.add_object(obj.clone());
        }

        for i in 0..objects.len() {
            let x = (i as f32) * 3.0;
            let ray = Ray::new(Vec3::new(x, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0), 0.0);

            let linear = scene.closest_hit_linear(&ray, 0.001, f32::INFINITY);
            let accelerated = tree.hit(&objects, &ray, f32::INFINITY);

            match (linear, accelerated) {
                (Some((li, lh)), Some((ai, ah))) => {
                    assert_eq!(li, ai);
                    assert!((lh.t_intersect - ah.t_intersect).abs() < 1e-3);
                }
                (None, None) => {}
                other => panic!("linear/accelerated disagreement: {:?}", other.0.is_some()),
            }
        }
    }

    #[test]
    fn kdtree_hit_matches_linear_scan_for_misses() {
        let objects = grid_of_spheres(50);
        let indices: Vec<usize> = (0..objects.len()).collect();
        let tree = KdTree::build(&objects, &indices).unwrap().unwrap();

        let ray = Ray::new(Vec3::new(0.0, 100.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 0.0);
        assert!(tree.hit(&objects, &ray, f32::INFINITY).is_none());
    }
}
