//! Built-in maps for tests, tools and offline sessions.

use glam::DVec3;

use crossfire_core::enums::SurfaceKind;
use crossfire_core::map::MapData;
use crossfire_core::types::AxisAlignedBox;

/// Half extent of the training yard's walled area on X and Z (meters).
pub const TRAINING_YARD_HALF_EXTENT: f64 = 20.0;

const WALL_HEIGHT: f64 = 4.0;
const WALL_THICKNESS: f64 = 1.0;

/// A square walled yard with crates and a central wall segment.
pub fn training_yard() -> MapData {
    let e = TRAINING_YARD_HALF_EXTENT;
    let t = WALL_THICKNESS;
    let h = WALL_HEIGHT;

    let mut colliders = vec![
        // Ground slab. Its top sits at ground level, so it never intersects a player.
        AxisAlignedBox::new(
            DVec3::new(-e - t, -1.0, -e - t),
            DVec3::new(e + t, 0.0, e + t),
            SurfaceKind::Sand,
        ),
        // Perimeter.
        AxisAlignedBox::new(
            DVec3::new(-e - t, 0.0, e),
            DVec3::new(e + t, h, e + t),
            SurfaceKind::Concrete,
        ),
        AxisAlignedBox::new(
            DVec3::new(-e - t, 0.0, -e - t),
            DVec3::new(e + t, h, -e),
            SurfaceKind::Concrete,
        ),
        AxisAlignedBox::new(
            DVec3::new(e, 0.0, -e),
            DVec3::new(e + t, h, e),
            SurfaceKind::Concrete,
        ),
        AxisAlignedBox::new(
            DVec3::new(-e - t, 0.0, -e),
            DVec3::new(-e, h, e),
            SurfaceKind::Concrete,
        ),
        // Mid wall.
        AxisAlignedBox::new(
            DVec3::new(-6.0, 0.0, 4.0),
            DVec3::new(6.0, 3.0, 4.6),
            SurfaceKind::Stone,
        ),
    ];

    for (x, z) in [(-9.0, -8.0), (9.0, -8.0), (-12.0, 10.0), (12.0, 10.0)] {
        colliders.push(AxisAlignedBox::from_center(
            DVec3::new(x, 0.6, z),
            DVec3::new(0.6, 0.6, 0.6),
            SurfaceKind::Wood,
        ));
    }
    colliders.push(AxisAlignedBox::from_center(
        DVec3::new(0.0, 1.0, -12.0),
        DVec3::new(2.0, 1.0, 0.5),
        SurfaceKind::Metal,
    ));

    MapData {
        name: "training_yard".into(),
        colliders,
        spawns: vec![
            DVec3::new(0.0, 0.0, -16.0),
            DVec3::new(0.0, 0.0, 16.0),
            DVec3::new(-16.0, 0.0, 0.0),
            DVec3::new(16.0, 0.0, 0.0),
        ],
    }
}

/// An open map with no colliders and a single spawn at the origin.
pub fn empty_field() -> MapData {
    MapData {
        name: "empty_field".into(),
        colliders: Vec::new(),
        spawns: vec![DVec3::ZERO],
    }
}
