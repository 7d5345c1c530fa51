//! Platform abstraction layer
//!
//! Things the host supplies to the simulation:
//! - Input events, folded into per-tick commands ([`input`])
//! - Asset sizes, for editor hit tests ([`AssetCatalog`])

pub mod input;

use std::collections::HashMap;

use glam::{UVec2, Vec2};

use crate::sim::terrain::{OffgridTile, TileKind};

pub use input::{InputEvent, InputState, Key, MouseButton};

/// A loaded image; only its size matters outside the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    pub size: UVec2,
}

/// Lookup of images by logical path (e.g. `"tiles/grass"`)
pub trait AssetCatalog {
    fn image(&self, path: &str) -> Option<ImageHandle>;

    /// Every frame of an animation or tile family, in variant order
    fn frames(&self, path: &str) -> Option<&[ImageHandle]>;
}

/// Logical path of a tile family's images
pub fn tile_asset_path(kind: TileKind) -> String {
    format!("tiles/{}", kind.as_str())
}

/// Sprite box of an off-grid decoration, falling back to one cell when the
/// catalog has no image for it
pub fn offgrid_sprite_size<C: AssetCatalog + ?Sized>(catalog: &C, tile: &OffgridTile, tile_size: u32) -> Vec2 {
    catalog
        .frames(&tile_asset_path(tile.kind))
        .and_then(|frames| frames.get(tile.variant as usize))
        .map(|image| image.size.as_vec2())
        .unwrap_or(Vec2::splat(tile_size as f32))
}

/// In-memory catalog of known sizes (headless hosts and tests)
#[derive(Debug, Default, Clone)]
pub struct FixedSizeCatalog {
    families: HashMap<String, Vec<ImageHandle>>,
}

impl FixedSizeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `count` frames of the same size under `path`
    pub fn with_family(mut self, path: &str, size: UVec2, count: usize) -> Self {
        self.families.insert(path.to_string(), vec![ImageHandle { size }; count]);
        self
    }

    /// Square frames of `tile_size` for every tile kind
    pub fn tiles(tile_size: u32, variants: usize) -> Self {
        TileKind::ALL.iter().fold(Self::new(), |catalog, kind| {
            catalog.with_family(&tile_asset_path(*kind), UVec2::splat(tile_size), variants)
        })
    }
}

impl AssetCatalog for FixedSizeCatalog {
    fn image(&self, path: &str) -> Option<ImageHandle> {
        self.families.get(path).and_then(|frames| frames.first().copied())
    }

    fn frames(&self, path: &str) -> Option<&[ImageHandle]> {
        self.families.get(path).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::terrain::TerrainGrid;

    #[test]
    fn test_sprite_size_lookup() {
        let catalog = FixedSizeCatalog::tiles(16, 4).with_family("tiles/large_decor", UVec2::new(48, 32), 3);
        let big = OffgridTile {
            kind: TileKind::LargeDecor,
            variant: 2,
            pos: Vec2::ZERO,
        };
        assert_eq!(offgrid_sprite_size(&catalog, &big, 16), Vec2::new(48.0, 32.0));

        // Unknown variant falls back to one cell
        let odd = OffgridTile { variant: 9, ..big };
        assert_eq!(offgrid_sprite_size(&catalog, &odd, 16), Vec2::splat(16.0));
        assert_eq!(catalog.image("tiles/grass"), Some(ImageHandle { size: UVec2::splat(16) }));
        assert!(catalog.image("tiles/nope").is_none());
    }

    #[test]
    fn test_erase_offgrid_uses_sprite_box() {
        let catalog = FixedSizeCatalog::new().with_family("tiles/large_decor", UVec2::new(48, 32), 1);
        let mut grid = TerrainGrid::new(16);
        grid.place_offgrid(TileKind::LargeDecor, 0, Vec2::new(100.0, 100.0));
        grid.place_offgrid(TileKind::Decor, 0, Vec2::new(100.0, 100.0));

        // Inside the large sprite, outside the one-cell decor fallback
        let removed = grid.erase_offgrid_at(Vec2::new(140.0, 120.0), |tile| offgrid_sprite_size(&catalog, tile, 16));
        assert_eq!(removed, 1);
        assert_eq!(grid.offgrid()[0].kind, TileKind::Decor);
    }
}
