//! Ray picking.
//!
//! A click is turned into a world-space ray through the camera, then tested
//! against every triangle of every mesh node. The nearest hit by ray
//! parameter wins; there is no other occlusion logic.

use glam::{Mat4, Vec3, Vec4};

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// Result of a pick: the flattened node index and the ray parameter of the
/// nearest intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub node_index: usize,
    pub distance: f32,
}

/// Unproject a cursor position (physical pixels, top-left origin) into a
/// world-space ray through the camera.
pub fn screen_to_ray(view_projection: Mat4, width: f32, height: f32, x: f32, y: f32) -> Ray {
    let ndc_x = (x / width.max(1.0)) * 2.0 - 1.0;
    let ndc_y = -((y / height.max(1.0)) * 2.0 - 1.0);

    let inverse = view_projection.inverse();
    let near = unproject(inverse, Vec3::new(ndc_x, ndc_y, 0.0));
    let far = unproject(inverse, Vec3::new(ndc_x, ndc_y, 1.0));

    Ray {
        origin: near,
        dir: (far - near).normalize_or_zero(),
    }
}

fn unproject(inverse_view_projection: Mat4, ndc: Vec3) -> Vec3 {
    let clip = Vec4::new(ndc.x, ndc.y, ndc.z, 1.0);
    let world = inverse_view_projection * clip;
    world.truncate() / world.w
}

/// Möller–Trumbore ray/triangle intersection. Returns the ray parameter of
/// the hit, or None for misses, hits behind the origin, and triangles the
/// ray is parallel to.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.dir.cross(edge2);
    let a = edge1.dot(h);

    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

/// Nearest intersection of the ray with an indexed triangle list.
pub fn intersect_mesh(ray: &Ray, positions: &[Vec3], indices: &[u32]) -> Option<f32> {
    let mut nearest: Option<f32> = None;
    for triangle in indices.chunks_exact(3) {
        let (Some(&v0), Some(&v1), Some(&v2)) = (
            positions.get(triangle[0] as usize),
            positions.get(triangle[1] as usize),
            positions.get(triangle[2] as usize),
        ) else {
            continue;
        };
        if let Some(t) = ray_triangle_intersect(ray, v0, v1, v2) {
            if nearest.map(|best| t < best).unwrap_or(true) {
                nearest = Some(t);
            }
        }
    }
    nearest
}

#[cfg(test)]
mod tests {
    use super::{intersect_mesh, ray_triangle_intersect, screen_to_ray, Ray};
    use glam::{Mat4, Vec3};

    fn ray(origin: [f32; 3], dir: [f32; 3]) -> Ray {
        Ray {
            origin: Vec3::from_array(origin),
            dir: Vec3::from_array(dir).normalize(),
        }
    }

    const V0: Vec3 = Vec3::new(-1.0, -1.0, 0.0);
    const V1: Vec3 = Vec3::new(1.0, -1.0, 0.0);
    const V2: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    #[test]
    fn direct_hit_reports_the_ray_parameter() {
        let t = ray_triangle_intersect(&ray([0.0, 0.0, 5.0], [0.0, 0.0, -1.0]), V0, V1, V2);
        assert!((t.unwrap() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn miss_outside_the_triangle() {
        let t = ray_triangle_intersect(&ray([5.0, 5.0, 5.0], [0.0, 0.0, -1.0]), V0, V1, V2);
        assert!(t.is_none());
    }

    #[test]
    fn parallel_ray_is_rejected() {
        let t = ray_triangle_intersect(&ray([0.0, 0.0, 1.0], [1.0, 0.0, 0.0]), V0, V1, V2);
        assert!(t.is_none());
    }

    #[test]
    fn hit_behind_the_origin_is_rejected() {
        let t = ray_triangle_intersect(&ray([0.0, 0.0, -5.0], [0.0, 0.0, -1.0]), V0, V1, V2);
        assert!(t.is_none());
    }

    #[test]
    fn mesh_scan_returns_the_nearest_triangle() {
        let positions = vec![
            // Quad at z = 0
            V0,
            V1,
            V2,
            // Same triangle pushed back
            V0 + Vec3::new(0.0, 0.0, -4.0),
            V1 + Vec3::new(0.0, 0.0, -4.0),
            V2 + Vec3::new(0.0, 0.0, -4.0),
        ];
        let indices = vec![3, 4, 5, 0, 1, 2];
        let t = intersect_mesh(&ray([0.0, 0.0, 2.0], [0.0, 0.0, -1.0]), &positions, &indices);
        assert!((t.unwrap() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn center_of_screen_unprojects_toward_the_view_direction() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0);
        let picked = screen_to_ray(projection * view, 1600.0, 900.0, 800.0, 450.0);
        assert!(picked.origin.distance(eye) < 0.2);
        assert!(picked.dir.dot(Vec3::new(0.0, 0.0, -1.0)) > 0.999);
    }

    #[test]
    fn corner_rays_diverge_from_the_center_ray() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
        let center = screen_to_ray(projection * view, 800.0, 800.0, 400.0, 400.0);
        let corner = screen_to_ray(projection * view, 800.0, 800.0, 0.0, 0.0);
        assert!(center.dir.dot(corner.dir) < 0.999);
        // Top-left of the screen leans up and to the left in world space.
        assert!(corner.dir.x < center.dir.x);
        assert!(corner.dir.y > center.dir.y);
    }
}
