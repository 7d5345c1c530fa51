//! Terrain map save/load
//!
//! Maps are JSON documents:
//!
//! ```json
//! {
//!   "tilemap": { "3;5": { "type": "grass", "variant": 1, "pos": [3, 5] } },
//!   "tile_size": 16,
//!   "offgrid": [ { "type": "decor", "variant": 0, "pos": [40.0, 72.5] } ]
//! }
//! ```
//!
//! The `"x;y"` keys exist only in the file; in memory cells are `IVec2`.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::sim::terrain::{OffgridTile, TerrainGrid, Tile};

/// Why a map could not be read or written
#[derive(Debug)]
pub enum MapError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// A `tilemap` key that isn't `"x;y"` integers
    BadKey(String),
    /// A tile whose stored `pos` disagrees with its key
    PositionMismatch { key: String, pos: IVec2 },
    ZeroTileSize,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::Io(e) => write!(f, "map I/O error: {e}"),
            MapError::Json(e) => write!(f, "map JSON error: {e}"),
            MapError::BadKey(key) => write!(f, "malformed tile key {key:?} (expected \"x;y\")"),
            MapError::PositionMismatch { key, pos } => {
                write!(f, "tile {key:?} stores position [{}, {}]", pos.x, pos.y)
            }
            MapError::ZeroTileSize => write!(f, "tile size must be positive"),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Io(e) => Some(e),
            MapError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for MapError {
    fn from(e: std::io::Error) -> Self {
        MapError::Io(e)
    }
}

impl From<serde_json::Error> for MapError {
    fn from(e: serde_json::Error) -> Self {
        MapError::Json(e)
    }
}

/// On-disk layout. Keys are sorted so saved files diff cleanly.
#[derive(Debug, Serialize, Deserialize)]
struct MapFile {
    tilemap: BTreeMap<String, Tile>,
    tile_size: u32,
    #[serde(default)]
    offgrid: Vec<OffgridTile>,
}

pub fn cell_key(cell: IVec2) -> String {
    format!("{};{}", cell.x, cell.y)
}

pub fn parse_cell_key(key: &str) -> Result<IVec2, MapError> {
    let bad = || MapError::BadKey(key.to_string());
    let (x, y) = key.split_once(';').ok_or_else(bad)?;
    let x = x.trim().parse().map_err(|_| bad())?;
    let y = y.trim().parse().map_err(|_| bad())?;
    Ok(IVec2::new(x, y))
}

pub fn to_json(terrain: &TerrainGrid) -> Result<String, MapError> {
    let file = MapFile {
        tilemap: terrain.tiles().map(|tile| (cell_key(tile.pos), *tile)).collect(),
        tile_size: terrain.tile_size(),
        offgrid: terrain.offgrid().to_vec(),
    };
    Ok(serde_json::to_string_pretty(&file)?)
}

pub fn from_json(json: &str) -> Result<TerrainGrid, MapError> {
    let file: MapFile = serde_json::from_str(json)?;
    if file.tile_size == 0 {
        return Err(MapError::ZeroTileSize);
    }

    let mut tiles = HashMap::with_capacity(file.tilemap.len());
    for (key, tile) in file.tilemap {
        let cell = parse_cell_key(&key)?;
        if cell != tile.pos {
            return Err(MapError::PositionMismatch { key, pos: tile.pos });
        }
        tiles.insert(cell, tile);
    }

    Ok(TerrainGrid::from_parts(file.tile_size, tiles, file.offgrid))
}

pub fn save_map(terrain: &TerrainGrid, path: &Path) -> Result<(), MapError> {
    std::fs::write(path, to_json(terrain)?)?;
    log::info!("Saved {} tiles to {}", terrain.len(), path.display());
    Ok(())
}

pub fn load_map(path: &Path) -> Result<TerrainGrid, MapError> {
    let terrain = from_json(&std::fs::read_to_string(path)?)?;
    log::info!(
        "Loaded map {} ({} tiles, {} decorations, tile size {})",
        path.display(),
        terrain.len(),
        terrain.offgrid().len(),
        terrain.tile_size()
    );
    Ok(terrain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::terrain::TileKind;
    use glam::Vec2;

    fn sample() -> TerrainGrid {
        let mut grid = TerrainGrid::new(12);
        grid.paint_brush(IVec2::new(0, 4), 3, TileKind::Grass, 1);
        grid.set_tile(IVec2::new(-7, 2), TileKind::Spawners, 0);
        grid.place_offgrid(TileKind::LargeDecor, 2, Vec2::new(40.0, 72.5));
        grid
    }

    #[test]
    fn test_round_trip() {
        let grid = sample();
        let loaded = from_json(&to_json(&grid).unwrap()).unwrap();
        assert_eq!(loaded, grid);
    }

    #[test]
    fn test_reads_file_format() {
        let json = r#"{
            "tilemap": {
                "3;5": { "type": "grass", "variant": 1, "pos": [3, 5] },
                "-2;0": { "type": "stone", "variant": 0, "pos": [-2, 0] }
            },
            "tile_size": 16,
            "offgrid": [ { "type": "decor", "variant": 4, "pos": [10.5, 20.0] } ]
        }"#;
        let grid = from_json(json).unwrap();
        assert_eq!(grid.tile_size(), 16);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.tile(IVec2::new(-2, 0)).map(|t| t.kind), Some(TileKind::Stone));
        assert_eq!(grid.offgrid()[0].pos, Vec2::new(10.5, 20.0));
    }

    #[test]
    fn test_rejects_bad_maps() {
        let bad_key = r#"{ "tilemap": { "3,5": { "type": "grass", "variant": 0, "pos": [3, 5] } }, "tile_size": 16 }"#;
        assert!(matches!(from_json(bad_key), Err(MapError::BadKey(_))));

        let mismatch = r#"{ "tilemap": { "3;5": { "type": "grass", "variant": 0, "pos": [3, 6] } }, "tile_size": 16 }"#;
        assert!(matches!(from_json(mismatch), Err(MapError::PositionMismatch { .. })));

        let zero = r#"{ "tilemap": {}, "tile_size": 0 }"#;
        assert!(matches!(from_json(zero), Err(MapError::ZeroTileSize)));

        assert!(matches!(from_json("not json"), Err(MapError::Json(_))));
    }

    #[test]
    fn test_cell_keys() {
        assert_eq!(cell_key(IVec2::new(-3, 8)), "-3;8");
        assert_eq!(parse_cell_key("-3;8").unwrap(), IVec2::new(-3, 8));
        assert!(parse_cell_key("x;8").is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let path = std::env::temp_dir().join(format!("worms-duel-map-{}.json", std::process::id()));
        let grid = sample();
        save_map(&grid, &path).unwrap();
        assert_eq!(load_map(&path).unwrap(), grid);
        let _ = std::fs::remove_file(&path);
        assert!(matches!(load_map(&path), Err(MapError::Io(_))));
    }
}
