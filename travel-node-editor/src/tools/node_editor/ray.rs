use bevy::prelude::*;
use constants::render_settings::DRAG_PLANE_EPSILON;

// Distance from a point to the ray, or None when the point lies behind the origin.
// `dir` must be normalised.
pub fn ray_point_distance(origin: Vec3, dir: Vec3, point: Vec3) -> Option<f32> {
    let t = (point - origin).dot(dir);
    if t < 0.0 {
        return None;
    }
    Some((origin + dir * t).distance(point))
}

// Ray–plane intersection, returns the hit point or None for parallel rays and hits behind the origin.
pub fn ray_plane_intersection(
    origin: Vec3,
    dir: Vec3,
    plane_point: Vec3,
    plane_normal: Vec3,
) -> Option<Vec3> {
    let denom = plane_normal.dot(dir);
    if denom.abs() <= DRAG_PLANE_EPSILON {
        return None;
    }
    let t = (plane_point - origin).dot(plane_normal) / denom;
    if t < 0.0 {
        return None;
    }
    Some(origin + dir * t)
}
