use glam::{Mat4, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Builds a world-space ray through a point in normalized device
    /// coordinates by unprojecting it onto the near and far planes.
    /// Expects a projection with a [0, 1] depth range.
    pub fn from_ndc(ndc: Vec2, inverse_view_projection: &Mat4) -> Self {
        let near = inverse_view_projection.project_point3(ndc.extend(0.0));
        let far = inverse_view_projection.project_point3(ndc.extend(1.0));

        Self::new(near, far - near)
    }

    /// Moves the ray into another space. The direction is not renormalized, so
    /// distances stay comparable with the untransformed ray.
    pub fn transform(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }

    /// Möller–Trumbore intersection, double sided. Returns the distance along
    /// the ray to the hit point.
    pub fn intersect_triangle(&self, [a, b, c]: [Vec3; 3]) -> Option<f32> {
        // Relative to the operand magnitudes, so tiny meshes and the
        // unnormalized directions of object-space rays behave the same
        const EPSILON: f32 = 1e-6;

        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let determinant = edge1.dot(p);

        let scale = edge1.length() * edge2.length() * self.direction.length();
        if determinant.abs() <= EPSILON * scale {
            return None;
        }

        let inverse_determinant = 1.0 / determinant;
        let s = self.origin - a;
        let u = s.dot(p) * inverse_determinant;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inverse_determinant;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inverse_determinant;
        (t >= 0.0).then_some(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: [Vec3; 3] = [
        Vec3::new(-1.0, -1.0, 0.0),
        Vec3::new(1.0, -1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ];

    #[test]
    fn hits_triangle_from_either_side() {
        let front = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let back = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);

        assert!((front.intersect_triangle(TRIANGLE).unwrap() - 3.0).abs() < 1e-6);
        assert!((back.intersect_triangle(TRIANGLE).unwrap() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn misses_outside_triangle() {
        let ray = Ray::new(Vec3::new(0.9, 0.9, 3.0), Vec3::NEG_Z);
        assert_eq!(ray.intersect_triangle(TRIANGLE), None);
    }

    #[test]
    fn ignores_triangles_behind_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::Z);
        assert_eq!(ray.intersect_triangle(TRIANGLE), None);
    }

    #[test]
    fn parallel_ray_misses() {
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert_eq!(ray.intersect_triangle(TRIANGLE), None);
    }

    #[test]
    fn hits_millimetre_sized_triangle() {
        let tiny = TRIANGLE.map(|vertex| vertex * 1e-3);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);

        assert!((ray.intersect_triangle(tiny).unwrap() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn ndc_centre_points_down_the_view_axis() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 100.0);
        let inverse = (projection * view).inverse();

        let ray = Ray::from_ndc(Vec2::ZERO, &inverse);

        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
        assert!((ray.origin - Vec3::new(0.0, 0.0, 4.9)).length() < 1e-3);
    }
}
