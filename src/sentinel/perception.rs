//! Vision and hearing tests for sentinels.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use smallvec::SmallVec;

use crate::map::raycast::{segment_clear, vision_cone, Occlusion};
use crate::map::CollisionField;

/// A sentinel's vision cone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vision {
    pub range: f32,
    /// Half the full cone width, in radians.
    pub half_angle: f32,
    pub occlusion: Occlusion,
}

impl Vision {
    /// A cone `degrees` wide in total.
    pub fn new(range: f32, degrees: f32, occlusion: Occlusion) -> Self {
        Self {
            range,
            half_angle: (degrees / 2.0).to_radians(),
            occlusion,
        }
    }
}

/// Everything a sentinel can sense with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Senses {
    pub vision: Option<Vision>,
    pub hearing_range: Option<f32>,
}

/// Wraps an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Bearing from `from` to `to`, in radians.
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    delta.y.atan2(delta.x)
}

/// Whether a sentinel at `origin` facing `facing` sees `target`.
///
/// Rejects on range first, then on the angular offset from the facing, then (for occluded
/// cones) on any wall sample along the segment.
pub fn can_see(
    field: &CollisionField,
    origin: Vec2,
    facing: f32,
    vision: &Vision,
    target: Vec2,
    sight_step: f32,
) -> bool {
    if origin.distance(target) > vision.range {
        return false;
    }
    if wrap_angle(bearing(origin, target) - facing).abs() > vision.half_angle {
        return false;
    }
    match vision.occlusion {
        Occlusion::Walls => segment_clear(field, origin, target, sight_step),
        Occlusion::None => true,
    }
}

/// Whether `target` is inside a hearing radius around `origin`. Walls do not block sound.
pub fn can_hear(origin: Vec2, hearing_range: f32, target: Vec2) -> bool {
    origin.distance(target) <= hearing_range
}

/// The render polygon for a cone.
pub fn cone_polygon(
    field: &CollisionField,
    origin: Vec2,
    facing: f32,
    vision: &Vision,
    rays: usize,
    ray_step: f32,
) -> SmallVec<[Vec2; 64]> {
    vision_cone(
        field,
        origin,
        facing,
        vision.half_angle * 2.0,
        vision.range,
        rays,
        ray_step,
        vision.occlusion,
    )
}
