//! Sparse destructible tile terrain
//!
//! The grid maps integer cell coordinates to tiles. Only grass and stone take
//! part in collision; every other kind is decoration. Off-grid decorations sit
//! at continuous positions and never collide.
//!
//! Lookups never fail: a missing cell is simply empty.

use std::collections::HashMap;
use std::ops::Range;

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

/// Terrain tile families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Grass,
    Stone,
    Decor,
    LargeDecor,
    /// Player start markers, consumed when a match begins
    Spawners,
}

impl TileKind {
    pub const ALL: [TileKind; 5] = [
        TileKind::Grass,
        TileKind::Stone,
        TileKind::Decor,
        TileKind::LargeDecor,
        TileKind::Spawners,
    ];

    /// Whether tiles of this kind block players and projectiles
    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }

    /// Whether `TerrainGrid::autotile` picks the variant for this kind
    pub fn autotiles(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::Grass => "grass",
            TileKind::Stone => "stone",
            TileKind::Decor => "decor",
            TileKind::LargeDecor => "large_decor",
            TileKind::Spawners => "spawners",
        }
    }
}

/// A tile snapped to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    #[serde(rename = "type")]
    pub kind: TileKind,
    pub variant: u8,
    /// Cell coordinate (column, row)
    pub pos: IVec2,
}

/// A decoration placed at an arbitrary world position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffgridTile {
    #[serde(rename = "type")]
    pub kind: TileKind,
    pub variant: u8,
    pub pos: Vec2,
}

/// A tile removed by [`TerrainGrid::extract_and_remove`], in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedTile {
    pub kind: TileKind,
    pub variant: u8,
    pub pos: Vec2,
}

/// Axis-aligned rectangle in world space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap: rectangles that only share an edge do not collide
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }
}

/// 3x3 neighborhood, self included
const NEIGHBOR_OFFSETS: [IVec2; 9] = [
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 0),
    IVec2::new(0, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

const RIGHT: u8 = 1;
const LEFT: u8 = 2;
const UP: u8 = 4;
const DOWN: u8 = 8;

const AUTOTILE_SHIFTS: [(IVec2, u8); 4] = [
    (IVec2::new(1, 0), RIGHT),
    (IVec2::new(-1, 0), LEFT),
    (IVec2::new(0, -1), UP),
    (IVec2::new(0, 1), DOWN),
];

/// Same-kind neighbor mask -> sprite variant
const AUTOTILE_MAP: [(u8, u8); 9] = [
    (RIGHT | DOWN, 0),               // top-left
    (RIGHT | DOWN | LEFT, 1),        // top
    (LEFT | DOWN, 2),                // top-right
    (LEFT | DOWN | UP, 3),           // right
    (LEFT | UP, 4),                  // bottom-right
    (LEFT | UP | RIGHT, 5),          // bottom
    (RIGHT | UP, 6),                 // bottom-left
    (RIGHT | UP | DOWN, 7),          // left
    (RIGHT | LEFT | UP | DOWN, 8),   // middle
];

fn autotile_variant(mask: u8) -> Option<u8> {
    AUTOTILE_MAP
        .iter()
        .find(|(m, _)| *m == mask)
        .map(|(_, variant)| *variant)
}

/// Cells covered by a square editor brush centered on a cell
fn brush_range(center: i32, brush_size: u32) -> Range<i32> {
    let half = (brush_size / 2) as i32;
    let odd = (brush_size % 2) as i32;
    (center - half)..(center + half + odd)
}

/// The destructible map
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainGrid {
    tile_size: u32,
    tiles: HashMap<IVec2, Tile>,
    offgrid: Vec<OffgridTile>,
}

impl Default for TerrainGrid {
    fn default() -> Self {
        Self::new(crate::consts::DEFAULT_TILE_SIZE)
    }
}

impl TerrainGrid {
    /// Empty grid. A zero tile size is bumped to 1.
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            tiles: HashMap::new(),
            offgrid: Vec::new(),
        }
    }

    /// Assemble a grid from already-validated parts (map loading)
    pub fn from_parts(tile_size: u32, tiles: HashMap<IVec2, Tile>, offgrid: Vec<OffgridTile>) -> Self {
        Self {
            tile_size: tile_size.max(1),
            tiles,
            offgrid,
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn offgrid(&self) -> &[OffgridTile] {
        &self.offgrid
    }

    /// Cell containing a world position
    #[inline]
    pub fn cell_of(&self, world: Vec2) -> IVec2 {
        (world / self.tile_size as f32).floor().as_ivec2()
    }

    /// World-space square covered by a cell
    pub fn cell_rect(&self, cell: IVec2) -> Rect {
        let ts = self.tile_size as f32;
        Rect::new(cell.x as f32 * ts, cell.y as f32 * ts, ts, ts)
    }

    pub fn tile(&self, cell: IVec2) -> Option<&Tile> {
        self.tiles.get(&cell)
    }

    pub fn tile_at(&self, world: Vec2) -> Option<&Tile> {
        self.tiles.get(&self.cell_of(world))
    }

    /// True iff the cell under `world` holds a physics-solid tile
    pub fn is_solid(&self, world: Vec2) -> bool {
        self.tile_at(world).is_some_and(|t| t.kind.is_solid())
    }

    /// Rectangle of the occupied cell under `world`, solid or not
    pub fn tile_rect_at(&self, world: Vec2) -> Option<Rect> {
        self.tile_at(world).map(|t| self.cell_rect(t.pos))
    }

    /// Solid cells in the 3x3 neighborhood around `world`
    pub fn physics_rects_near(&self, world: Vec2) -> Vec<Rect> {
        let center = self.cell_of(world);
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|offset| self.tiles.get(&(center + *offset)))
            .filter(|t| t.kind.is_solid())
            .map(|t| self.cell_rect(t.pos))
            .collect()
    }

    /// Carve a crater.
    ///
    /// Removes every cell whose center is within `radius_in_cells` of `center`
    /// (measured in cell units) and every off-grid decoration within
    /// `radius_in_cells * tile_size` world units. Returns the number of grid
    /// cells removed.
    pub fn remove_disk(&mut self, center: Vec2, radius_in_cells: f32) -> usize {
        if !(radius_in_cells >= 0.0) {
            return 0;
        }

        let ts = self.tile_size as f32;
        let c = center / ts;
        let r_sq = radius_in_cells * radius_in_cells;
        let inside = |cell: IVec2| (cell.as_vec2() + Vec2::splat(0.5)).distance_squared(c) <= r_sq;

        // Scan the stored tiles instead of the bounding box once the box holds more cells
        let reach = radius_in_cells.ceil() + 1.0;
        let mut removed = 0;
        if (2.0 * reach + 1.0).powi(2) > self.tiles.len() as f32 {
            let before = self.tiles.len();
            self.tiles.retain(|cell, _| !inside(*cell));
            removed = before - self.tiles.len();
        } else {
            let base = c.floor().as_ivec2();
            let reach = reach as i32;
            for dy in -reach..=reach {
                for dx in -reach..=reach {
                    let cell = base + IVec2::new(dx, dy);
                    if inside(cell) && self.tiles.remove(&cell).is_some() {
                        removed += 1;
                    }
                }
            }
        }

        let world_r_sq = (radius_in_cells * ts).powi(2);
        self.offgrid.retain(|t| t.pos.distance_squared(center) > world_r_sq);

        removed
    }

    /// First point along `p0 -> p1` that lies in a solid cell.
    ///
    /// Sampled at quarter-tile resolution, so thin diagonal corners can be
    /// skipped; good enough to clip an aiming preview at the surface.
    pub fn segment_first_solid_hit(&self, p0: Vec2, p1: Vec2) -> Option<Vec2> {
        let step = (self.tile_size as f32 / 4.0).max(1.0);
        let steps = (p0.distance(p1) / step).ceil().max(1.0) as u32;
        (0..=steps)
            .map(|i| p0.lerp(p1, i as f32 / steps as f32))
            .find(|p| self.is_solid(*p))
    }

    /// Recompute sprite variants of grass/stone from their same-kind neighbors.
    /// Configurations outside the table keep their current variant.
    pub fn autotile(&mut self) {
        let updates: Vec<(IVec2, u8)> = self
            .tiles
            .values()
            .filter(|tile| tile.kind.autotiles())
            .filter_map(|tile| {
                let mask = AUTOTILE_SHIFTS
                    .iter()
                    .filter(|(shift, _)| {
                        self.tiles
                            .get(&(tile.pos + *shift))
                            .is_some_and(|n| n.kind == tile.kind)
                    })
                    .fold(0u8, |acc, (_, bit)| acc | bit);
                autotile_variant(mask).map(|variant| (tile.pos, variant))
            })
            .collect();

        for (cell, variant) in updates {
            if let Some(tile) = self.tiles.get_mut(&cell) {
                tile.variant = variant;
            }
        }
    }

    /// Remove every tile matching one of the `(kind, variant)` pairs.
    ///
    /// Off-grid matches come first in their stored order, followed by grid
    /// matches in row-major order with positions scaled to world space.
    pub fn extract_and_remove(&mut self, pairs: &[(TileKind, u8)]) -> Vec<ExtractedTile> {
        let matches = |kind: TileKind, variant: u8| pairs.contains(&(kind, variant));

        let mut extracted: Vec<ExtractedTile> = Vec::new();
        self.offgrid.retain(|tile| {
            if matches(tile.kind, tile.variant) {
                extracted.push(ExtractedTile {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: tile.pos,
                });
                false
            } else {
                true
            }
        });

        let mut cells: Vec<IVec2> = self
            .tiles
            .values()
            .filter(|t| matches(t.kind, t.variant))
            .map(|t| t.pos)
            .collect();
        cells.sort_by_key(|c| (c.y, c.x));

        let ts = self.tile_size as f32;
        for cell in cells {
            if let Some(tile) = self.tiles.remove(&cell) {
                extracted.push(ExtractedTile {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: cell.as_vec2() * ts,
                });
            }
        }

        extracted
    }

    /// Lowest occupied row, if any
    pub fn lowest_row(&self) -> Option<i32> {
        self.tiles.keys().map(|c| c.y).max()
    }

    // --- Editing ---

    pub fn set_tile(&mut self, cell: IVec2, kind: TileKind, variant: u8) {
        self.tiles.insert(
            cell,
            Tile {
                kind,
                variant,
                pos: cell,
            },
        );
    }

    pub fn remove_tile(&mut self, cell: IVec2) -> Option<Tile> {
        self.tiles.remove(&cell)
    }

    /// Fill a `brush_size` square around `cell`
    pub fn paint_brush(&mut self, cell: IVec2, brush_size: u32, kind: TileKind, variant: u8) {
        for x in brush_range(cell.x, brush_size) {
            for y in brush_range(cell.y, brush_size) {
                self.set_tile(IVec2::new(x, y), kind, variant);
            }
        }
    }

    /// Clear a `brush_size` square around `cell`, returning how many tiles went
    pub fn erase_brush(&mut self, cell: IVec2, brush_size: u32) -> usize {
        let mut removed = 0;
        for x in brush_range(cell.x, brush_size) {
            for y in brush_range(cell.y, brush_size) {
                if self.tiles.remove(&IVec2::new(x, y)).is_some() {
                    removed += 1;
                }
            }
        }
        removed
    }

    pub fn place_offgrid(&mut self, kind: TileKind, variant: u8, pos: Vec2) {
        self.offgrid.push(OffgridTile { kind, variant, pos });
    }

    /// Remove decorations whose sprite box contains `point`.
    /// `sprite_size` supplies the box size for a decoration.
    pub fn erase_offgrid_at<F>(&mut self, point: Vec2, sprite_size: F) -> usize
    where
        F: Fn(&OffgridTile) -> Vec2,
    {
        let before = self.offgrid.len();
        self.offgrid
            .retain(|tile| !Rect::from_pos_size(tile.pos, sprite_size(tile)).contains_point(point));
        before - self.offgrid.len()
    }
}
