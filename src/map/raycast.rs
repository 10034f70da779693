//! Ray marching through a [`CollisionField`].

use glam::Vec2;
use smallvec::SmallVec;

use crate::map::CollisionField;

/// Whether a cone's rays stop at walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occlusion {
    Walls,
    /// Rays always run to full length. Cameras see through walls.
    None,
}

/// Marches from `origin` along `angle` in `step` pixel increments.
///
/// On the first wall sample the last clear point is returned; with no wall in reach the
/// result lies exactly `max_distance` away. The result is never further than `max_distance`.
pub fn cast_ray(field: &CollisionField, origin: Vec2, angle: f32, max_distance: f32, step: f32) -> Vec2 {
    let direction = Vec2::from_angle(angle);
    if max_distance <= 0.0 {
        return origin;
    }
    let step = if step > 0.0 { step } else { max_distance };

    let mut travelled = 0.0f32;
    loop {
        let next = (travelled + step).min(max_distance);
        if field.is_wall_at(origin + direction * next) {
            return origin + direction * travelled;
        }
        if next >= max_distance {
            return origin + direction * max_distance;
        }
        travelled = next;
    }
}

/// A fan polygon: the origin followed by `rays + 1` endpoints swept from `facing - half` to
/// `facing + half`.
#[allow(clippy::too_many_arguments)]
pub fn vision_cone(
    field: &CollisionField,
    origin: Vec2,
    facing: f32,
    angle: f32,
    range: f32,
    rays: usize,
    step: f32,
    occlusion: Occlusion,
) -> SmallVec<[Vec2; 64]> {
    let half = angle / 2.0;
    let rays = rays.max(1);
    let mut polygon = SmallVec::with_capacity(rays + 2);
    polygon.push(origin);

    for i in 0..=rays {
        let theta = facing - half + angle * (i as f32 / rays as f32);
        let end = match occlusion {
            Occlusion::Walls => cast_ray(field, origin, theta, range, step),
            Occlusion::None => origin + Vec2::from_angle(theta) * range,
        };
        polygon.push(end);
    }

    polygon
}

/// Whether every interior sample along `from -> to`, spaced `step` apart, is clear.
///
/// The endpoints themselves are not sampled; bodies standing flush against a wall can still
/// see each other.
pub fn segment_clear(field: &CollisionField, from: Vec2, to: Vec2, step: f32) -> bool {
    let distance = from.distance(to);
    let steps = (distance / step.max(f32::EPSILON)).ceil() as usize;
    (1..steps).all(|i| {
        let t = i as f32 / steps as f32;
        !field.is_wall_at(from.lerp(to, t))
    })
}
