//! Axis-aligned bounding boxes

use crate::Vec3;

/// Axis-aligned bounding box
///
/// Used for scene extents, KD-tree construction, and the rejection sampling
/// of closed-surface sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An empty box that unions correctly with anything
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f64::INFINITY),
            max: Vec3::repeat(f64::NEG_INFINITY),
        }
    }

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing a set of points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vec3>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand(point);
        }
        aabb
    }

    /// Grow to include a point
    pub fn expand(&mut self, point: &Vec3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Union of two boxes
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Whether a point lies inside or on the boundary
    pub fn contains(&self, point: &Vec3) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Index of the widest axis
    pub fn longest_axis(&self) -> usize {
        let extent = self.extent();
        if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        }
    }

    /// Slab-method ray intersection
    ///
    /// Returns the `[t_near, t_far]` parameter interval along `dir`, or
    /// `None` when the ray misses. The interval is clipped to `t >= 0`.
    pub fn intersect(&self, origin: &Vec3, dir: &Vec3) -> Option<(f64, f64)> {
        let mut t_near = 0.0_f64;
        let mut t_far = f64::INFINITY;
        for axis in 0..3 {
            let inv = 1.0 / dir[axis];
            let mut t0 = (self.min[axis] - origin[axis]) * inv;
            let mut t1 = (self.max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }
        Some((t_near, t_far))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_contains() {
        let a = Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(0.0, 0.0, 0.0));
        let b = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let u = a.union(&b);
        assert!(u.contains(&Vec3::new(1.5, 0.5, 0.5)));
        assert!(!u.contains(&Vec3::new(2.5, 0.5, 0.5)));
        assert_eq!(u.longest_axis(), 0);
    }

    #[test]
    fn ray_hits_unit_box() {
        let aabb = Aabb::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5));
        let (t0, t1) = aabb
            .intersect(&Vec3::new(0.0, 0.0, -2.0), &Vec3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert!((t0 - 1.5).abs() < 1e-12);
        assert!((t1 - 2.5).abs() < 1e-12);
    }

    #[test]
    fn ray_misses_off_axis() {
        let aabb = Aabb::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5));
        assert!(aabb
            .intersect(&Vec3::new(2.0, 2.0, -2.0), &Vec3::new(0.0, 0.0, 1.0))
            .is_none());
    }
}
