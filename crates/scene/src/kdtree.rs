//! Arena KD-tree over scene primitives

// crate modules
use crate::error::{Error, Result};
use crate::primitive::{Hit, Primitive, VisiblePoint};

// external crates
use gray_vrmath::{Aabb, Vec3};
use log::debug;

/// Cost ratio steering the split/leaf decision during construction
const DEFAULT_OBJECT_COST: f64 = 8.0;
const MAX_DEPTH: usize = 24;

/// Tree node; children are arena indices, never pointers
///
/// The left child of an interior node is always the next node in the arena,
/// so only the right child index is stored.
#[derive(Debug, Clone, Copy)]
enum KdNode {
    Leaf {
        first: u32,
        count: u32,
    },
    Interior {
        axis: usize,
        split: f64,
        right_child: u32,
    },
}

/// Spatial acceleration structure for ray-primitive queries
///
/// Built once per scene and immutable afterwards, so it can be shared by
/// reference across simulation ranks.
#[derive(Debug, Clone, Default)]
pub struct IntersectKdTree {
    nodes: Vec<KdNode>,
    /// Primitive indices referenced by the leaves
    ordered: Vec<u32>,
    bounds: Aabb,
}

impl IntersectKdTree {
    /// Build over the given primitives with the default object cost
    pub fn build(primitives: &[Primitive]) -> Result<Self> {
        Self::build_with_cost(primitives, DEFAULT_OBJECT_COST)
    }

    /// Build with an explicit object cost
    ///
    /// Leaves stop splitting once they hold no more than `object_cost`
    /// primitives or the depth cap is reached.
    pub fn build_with_cost(primitives: &[Primitive], object_cost: f64) -> Result<Self> {
        if primitives.is_empty() {
            return Err(Error::EmptyScene);
        }
        let mut bounds = Aabb::empty();
        for (idx, primitive) in primitives.iter().enumerate() {
            let primitive_bounds = primitive.bounds();
            if !primitive_bounds.min.iter().all(|v| v.is_finite())
                || !primitive_bounds.max.iter().all(|v| v.is_finite())
            {
                return Err(Error::NonFiniteExtent(idx));
            }
            bounds = bounds.union(&primitive_bounds);
        }

        let mut tree = Self {
            nodes: Vec::new(),
            ordered: Vec::new(),
            bounds,
        };
        let mut indices: Vec<u32> = (0..primitives.len() as u32).collect();
        let max_leaf = object_cost.max(1.0) as usize;
        tree.split(primitives, &mut indices, bounds, max_leaf, MAX_DEPTH);
        debug!(
            "kd-tree built: {} nodes over {} primitives",
            tree.nodes.len(),
            primitives.len()
        );
        Ok(tree)
    }

    /// Scene extents the tree was built over
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Nearest intersection along `dir`, ignoring the primitive `avoid_id`
    ///
    /// `avoid_id` is the primitive the ray just left, so grazing re-hits of
    /// the same surface never trap the photon on it.
    pub fn seek_intersection(
        &self,
        primitives: &[Primitive],
        origin: &Vec3,
        dir: &Vec3,
        avoid_id: Option<u32>,
    ) -> Option<Hit> {
        let (t_min, t_max) = self.bounds.intersect(origin, dir)?;
        let mut best: Option<Hit> = None;
        let mut stack = vec![(0u32, t_min, t_max)];

        while let Some((node_idx, t_near, t_far)) = stack.pop() {
            if let Some(hit) = &best {
                if hit.distance < t_near {
                    continue;
                }
            }
            match self.nodes[node_idx as usize] {
                KdNode::Leaf { first, count } => {
                    for &prim_idx in &self.ordered[first as usize..(first + count) as usize] {
                        if avoid_id == Some(prim_idx) {
                            continue;
                        }
                        let primitive = &primitives[prim_idx as usize];
                        if let Some((distance, normal, front_facing)) =
                            primitive.intersect(origin, dir, 0.0)
                        {
                            let closer = best
                                .as_ref()
                                .map(|hit| distance < hit.distance)
                                .unwrap_or(true);
                            if closer {
                                best = Some(Hit {
                                    distance,
                                    point: VisiblePoint {
                                        position: origin + dir * distance,
                                        normal,
                                        front_facing,
                                        material_id: primitive.material_id,
                                        detector_id: primitive.detector_id,
                                    },
                                    object_id: prim_idx,
                                });
                            }
                        }
                    }
                }
                KdNode::Interior {
                    axis,
                    split,
                    right_child,
                } => {
                    let left_child = node_idx + 1;
                    let origin_axis = origin[axis];
                    let dir_axis = dir[axis];
                    let (near, far) = if origin_axis < split
                        || (origin_axis == split && dir_axis <= 0.0)
                    {
                        (left_child, right_child)
                    } else {
                        (right_child, left_child)
                    };
                    if dir_axis == 0.0 {
                        stack.push((near, t_near, t_far));
                        continue;
                    }
                    let t_split = (split - origin_axis) / dir_axis;
                    if t_split > t_far || t_split <= 0.0 {
                        stack.push((near, t_near, t_far));
                    } else if t_split < t_near {
                        stack.push((far, t_near, t_far));
                    } else {
                        // push far first so the near side is traversed first
                        stack.push((far, t_split, t_far));
                        stack.push((near, t_near, t_split));
                    }
                }
            }
        }
        best
    }

    fn split(
        &mut self,
        primitives: &[Primitive],
        indices: &mut [u32],
        bounds: Aabb,
        max_leaf: usize,
        depth: usize,
    ) -> u32 {
        let node_idx = self.nodes.len() as u32;
        if indices.len() <= max_leaf || depth == 0 {
            let first = self.ordered.len() as u32;
            self.ordered.extend_from_slice(indices);
            self.nodes.push(KdNode::Leaf {
                first,
                count: indices.len() as u32,
            });
            return node_idx;
        }

        let axis = bounds.longest_axis();
        // median split on primitive centroids keeps the tree balanced without
        // a full surface-area heuristic
        let mut centroids: Vec<f64> = indices
            .iter()
            .map(|&idx| primitives[idx as usize].bounds().center()[axis])
            .collect();
        centroids.sort_by(|a, b| a.total_cmp(b));
        let split = centroids[centroids.len() / 2];

        let (mut left, mut right): (Vec<u32>, Vec<u32>) = (Vec::new(), Vec::new());
        for &idx in indices.iter() {
            let prim_bounds = primitives[idx as usize].bounds();
            if prim_bounds.min[axis] < split {
                left.push(idx);
            }
            if prim_bounds.max[axis] >= split {
                right.push(idx);
            }
        }
        // a degenerate split that separates nothing becomes a leaf
        if left.len() == indices.len() || right.len() == indices.len() {
            let first = self.ordered.len() as u32;
            self.ordered.extend_from_slice(indices);
            self.nodes.push(KdNode::Leaf {
                first,
                count: indices.len() as u32,
            });
            return node_idx;
        }

        self.nodes.push(KdNode::Interior {
            axis,
            split,
            right_child: 0,
        });

        let mut left_bounds = bounds;
        left_bounds.max[axis] = split;
        let mut right_bounds = bounds;
        right_bounds.min[axis] = split;

        self.split(primitives, &mut left, left_bounds, max_leaf, depth - 1);
        let right_child = self.split(primitives, &mut right, right_bounds, max_leaf, depth - 1);
        if let KdNode::Interior {
            right_child: slot, ..
        } = &mut self.nodes[node_idx as usize]
        {
            *slot = right_child;
        }
        node_idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::Shape;

    fn sphere_at(x: f64, detector_id: i32) -> Primitive {
        Primitive {
            shape: Shape::Sphere {
                center: Vec3::new(x, 0.0, 0.0),
                radius: 0.4,
            },
            material_id: 0,
            detector_id,
        }
    }

    #[test]
    fn finds_nearest_of_many() {
        let primitives: Vec<Primitive> = (0..64).map(|i| sphere_at(i as f64, i)).collect();
        let tree = IntersectKdTree::build(&primitives).unwrap();

        let hit = tree
            .seek_intersection(
                &primitives,
                &Vec3::new(-5.0, 0.0, 0.0),
                &Vec3::new(1.0, 0.0, 0.0),
                None,
            )
            .unwrap();
        assert_eq!(hit.object_id, 0);
        assert!((hit.distance - 4.6).abs() < 1e-9);
        assert!(hit.point.is_front_facing());
    }

    #[test]
    fn avoid_id_skips_the_exited_surface() {
        let primitives = vec![sphere_at(0.0, -1), sphere_at(2.0, 5)];
        let tree = IntersectKdTree::build(&primitives).unwrap();

        let hit = tree
            .seek_intersection(
                &primitives,
                &Vec3::new(0.4, 0.0, 0.0),
                &Vec3::new(1.0, 0.0, 0.0),
                Some(0),
            )
            .unwrap();
        assert_eq!(hit.object_id, 1);
        assert_eq!(hit.point.detector_id, 5);
    }

    #[test]
    fn miss_outside_bounds_is_none() {
        let primitives = vec![sphere_at(0.0, -1)];
        let tree = IntersectKdTree::build(&primitives).unwrap();
        assert!(tree
            .seek_intersection(
                &primitives,
                &Vec3::new(0.0, 5.0, 0.0),
                &Vec3::new(1.0, 0.0, 0.0),
                None
            )
            .is_none());
    }

    #[test]
    fn empty_scene_is_an_error() {
        assert!(matches!(
            IntersectKdTree::build(&[]),
            Err(Error::EmptyScene)
        ));
    }
}
