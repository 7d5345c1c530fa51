//! Collision detection and response against tile terrain
//!
//! Two flavors:
//! - point probes for small fast projectiles
//! - axis-separated AABB resolution for players (horizontal first, then vertical)
//!
//! plus the linear damage falloff applied around a detonation.

use glam::Vec2;

use super::terrain::{Rect, TerrainGrid};

/// Which sides of an entity touched terrain this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Collisions {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Collisions {
    pub fn any(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }

    pub fn vertical(&self) -> bool {
        self.top || self.bottom
    }

    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }
}

/// Probe a point-sized projectile against solid terrain.
///
/// One probe per axis actually in motion, `offset` pixels ahead of `pos`
/// along that axis. A probe that lands in a solid cell sets its side.
pub fn probe_terrain(terrain: &TerrainGrid, pos: Vec2, motion: Vec2, offset: f32) -> Collisions {
    let mut hits = Collisions::default();

    if motion.x < 0.0 {
        hits.left = terrain.is_solid(pos - Vec2::new(offset, 0.0));
    } else if motion.x > 0.0 {
        hits.right = terrain.is_solid(pos + Vec2::new(offset, 0.0));
    }

    // Screen space: positive y is falling
    if motion.y > 0.0 {
        hits.bottom = terrain.is_solid(pos + Vec2::new(0.0, offset));
    } else if motion.y < 0.0 {
        hits.top = terrain.is_solid(pos - Vec2::new(0.0, offset));
    }

    hits
}

/// Move an AABB by `delta`, resolving horizontal then vertical overlap.
///
/// `pos` is the top-left corner. Overlapping solid rects snap the box to
/// their edge on the axis being resolved. Returns the sides that collided.
pub fn move_and_collide(terrain: &TerrainGrid, pos: &mut Vec2, size: Vec2, delta: Vec2) -> Collisions {
    let mut collisions = Collisions::default();

    pos.x += delta.x;
    let mut rect = Rect::from_pos_size(*pos, size);
    for tile in terrain.physics_rects_near(rect.center()) {
        if rect.overlaps(&tile) {
            if delta.x > 0.0 {
                rect.x = tile.left() - rect.w;
                collisions.right = true;
            } else if delta.x < 0.0 {
                rect.x = tile.right();
                collisions.left = true;
            }
            pos.x = rect.x;
        }
    }

    pos.y += delta.y;
    let mut rect = Rect::from_pos_size(*pos, size);
    for tile in terrain.physics_rects_near(rect.center()) {
        if rect.overlaps(&tile) {
            if delta.y > 0.0 {
                rect.y = tile.top() - rect.h;
                collisions.bottom = true;
            } else if delta.y < 0.0 {
                rect.y = tile.bottom();
                collisions.top = true;
            }
            pos.y = rect.y;
        }
    }

    collisions
}

/// Linear damage falloff: full `damage` at the epicenter, zero at `radius`
#[inline]
pub fn falloff_damage(distance: f32, radius: f32, damage: f32) -> f32 {
    if radius <= 0.0 || distance > radius {
        return 0.0;
    }
    damage * (1.0 - distance / radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::terrain::TileKind;
    use glam::IVec2;
    use proptest::prelude::*;

    fn ground(tile_size: u32) -> TerrainGrid {
        let mut grid = TerrainGrid::new(tile_size);
        for x in -10..10 {
            grid.set_tile(IVec2::new(x, 4), TileKind::Stone, 0);
        }
        grid
    }

    #[test]
    fn test_probe_only_axes_in_motion() {
        let grid = ground(16);
        // Just above the floor at y = 64
        let pos = Vec2::new(8.0, 63.0);

        let falling = probe_terrain(&grid, pos, Vec2::new(0.0, 1.0), 2.0);
        assert!(falling.bottom);
        assert!(!falling.horizontal());

        let rising = probe_terrain(&grid, pos, Vec2::new(0.0, -1.0), 2.0);
        assert!(!rising.any());
    }

    #[test]
    fn test_probe_walls() {
        let mut grid = TerrainGrid::new(16);
        grid.set_tile(IVec2::new(1, 0), TileKind::Grass, 0);
        let pos = Vec2::new(15.0, 8.0);
        assert!(probe_terrain(&grid, pos, Vec2::new(3.0, 0.0), 2.0).right);
        assert!(!probe_terrain(&grid, pos, Vec2::new(-3.0, 0.0), 2.0).left);
    }

    #[test]
    fn test_landing_snaps_to_surface() {
        let grid = ground(16);
        let size = Vec2::new(8.0, 15.0);
        let mut pos = Vec2::new(0.0, 48.0);
        let hits = move_and_collide(&grid, &mut pos, size, Vec2::new(0.0, 3.0));
        assert!(hits.bottom);
        assert_eq!(pos.y, 64.0 - 15.0);
    }

    #[test]
    fn test_wall_blocks_horizontal_first() {
        let mut grid = ground(16);
        grid.set_tile(IVec2::new(1, 3), TileKind::Stone, 0);
        let size = Vec2::new(8.0, 15.0);
        let mut pos = Vec2::new(7.0, 49.0);
        let hits = move_and_collide(&grid, &mut pos, size, Vec2::new(3.0, 0.0));
        assert!(hits.right);
        assert_eq!(pos.x, 16.0 - 8.0);
        assert!(!hits.vertical());
    }

    #[test]
    fn test_ceiling() {
        let mut grid = TerrainGrid::new(16);
        grid.set_tile(IVec2::new(0, 0), TileKind::Grass, 0);
        let mut pos = Vec2::new(4.0, 17.0);
        let hits = move_and_collide(&grid, &mut pos, Vec2::new(8.0, 15.0), Vec2::new(0.0, -2.0));
        assert!(hits.top);
        assert_eq!(pos.y, 16.0);
    }

    #[test]
    fn test_falloff_endpoints() {
        assert_eq!(falloff_damage(0.0, 80.0, 50.0), 50.0);
        assert_eq!(falloff_damage(80.0, 80.0, 50.0), 0.0);
        assert_eq!(falloff_damage(81.0, 80.0, 50.0), 0.0);
        assert!((falloff_damage(40.0, 80.0, 50.0) - 25.0).abs() < 1e-4);
        assert_eq!(falloff_damage(0.0, 0.0, 50.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_falloff_monotone(a in 0.0f32..200.0, b in 0.0f32..200.0) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(falloff_damage(near, 120.0, 30.0) >= falloff_damage(far, 120.0, 30.0));
            prop_assert!(falloff_damage(far, 120.0, 30.0) >= 0.0);
        }
    }
}
