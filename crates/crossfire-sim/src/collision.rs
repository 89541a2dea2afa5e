//! Collision primitives against the static collider set.
//!
//! Boxes that merely touch do not intersect. Rays use the slab method.

use glam::DVec3;

use crossfire_core::constants::{PLAYER_HALF_WIDTH, PLAYER_HEIGHT, RAY_PARALLEL_EPSILON};
use crossfire_core::enums::SurfaceKind;
use crossfire_core::types::AxisAlignedBox;

/// Nearest collider struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Parametric distance along the ray (meters for a unit direction).
    pub distance: f64,
    pub point: DVec3,
    /// Index into the collider slice.
    pub collider: usize,
    pub surface: SurfaceKind,
}

/// True iff the boxes overlap on all three axes (strict inequalities).
#[inline]
pub fn intersects_strict(a: &AxisAlignedBox, b: &AxisAlignedBox) -> bool {
    a.min.x < b.max.x
        && a.max.x > b.min.x
        && a.min.y < b.max.y
        && a.max.y > b.min.y
        && a.min.z < b.max.z
        && a.max.z > b.min.z
}

/// The player's box for a feet position.
#[inline]
pub fn player_box(position: DVec3) -> AxisAlignedBox {
    AxisAlignedBox {
        min: DVec3::new(
            position.x - PLAYER_HALF_WIDTH,
            position.y,
            position.z - PLAYER_HALF_WIDTH,
        ),
        max: DVec3::new(
            position.x + PLAYER_HALF_WIDTH,
            position.y + PLAYER_HEIGHT,
            position.z + PLAYER_HALF_WIDTH,
        ),
        surface: SurfaceKind::default(),
    }
}

/// Slab-method ray/box test.
///
/// Returns the entry distance `t` when the ray enters the box within
/// `[t_min, t_max]`. A direction component below `RAY_PARALLEL_EPSILON` is
/// parallel to that slab: the origin must then lie strictly inside it.
pub fn ray_intersect_box(
    origin: DVec3,
    direction: DVec3,
    aabb: &AxisAlignedBox,
    t_min: f64,
    t_max: f64,
) -> Option<f64> {
    let mut near = f64::NEG_INFINITY;
    let mut far = f64::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        let lo = aabb.min[axis];
        let hi = aabb.max[axis];

        if d.abs() < RAY_PARALLEL_EPSILON {
            if o <= lo || o >= hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (lo - o) * inv;
        let mut t1 = (hi - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        near = near.max(t0);
        far = far.min(t1);
        if near > far {
            return None;
        }
    }

    if near < t_min || near > t_max {
        return None;
    }
    Some(near)
}

/// Nearest collider hit along `direction` from `origin`, up to `max_range`.
/// Ties go to the earlier collider in the list.
pub fn raycast_world(
    origin: DVec3,
    direction: DVec3,
    colliders: &[AxisAlignedBox],
    max_range: f64,
) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;
    for (index, collider) in colliders.iter().enumerate() {
        let limit = best.map_or(max_range, |hit| hit.distance);
        if let Some(t) = ray_intersect_box(origin, direction, collider, 0.0, limit) {
            if best.is_none_or(|hit| t < hit.distance) {
                best = Some(RayHit {
                    distance: t,
                    point: origin + direction * t,
                    collider: index,
                    surface: collider.surface,
                });
            }
        }
    }
    best
}
