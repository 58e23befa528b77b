use glam::Vec3;

use crate::math::ray::Ray;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn new(point1: Vec3, point2: Vec3) -> AABB {
        let min = point1.min(point2);
        let max = point1.max(point2);
        AABB { min, max }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<AABB> {
        points.into_iter().fold(None, |bounds, point| match bounds {
            None => Some(AABB::new(point, point)),
            Some(AABB { min, max }) => Some(AABB {
                min: min.min(point),
                max: max.max(point),
            }),
        })
    }

    /// Slab test. Returns the distance along the ray to the entry point, or
    /// `None` when the ray misses or the box is entirely behind the origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let inverse_direction = ray.direction.recip();

        let t1 = (self.min - ray.origin) * inverse_direction;
        let t2 = (self.max - ray.origin) * inverse_direction;

        let t_near = t1.min(t2).max_element();
        let t_far = t1.max(t2).min_element();

        if t_near.is_nan() || t_far.is_nan() || t_far < t_near.max(0.0) {
            return None;
        }

        Some(t_near.max(0.0))
    }
}
