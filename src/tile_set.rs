//! Fixed collection of tiles for one cubemap
//!
//! The set is built once with a [`Division`] and never changes shape. Tiles are
//! stored in `face·d² + row·d + col` order so that index order is also the
//! tie-break order used by the priority strategies.

use crate::tile::{CubeFace, Division, Tile, TileId};

/// All tiles of one streamed cubemap
#[derive(Debug, Clone)]
pub struct TileSet {
    division: Division,
    size: f32,
    tiles: Vec<Tile>,
}

impl TileSet {
    /// Build every tile of a cube with edge length `size`
    pub fn new(division: Division, size: f32) -> Self {
        let d = division.factor();
        let mut tiles = Vec::with_capacity(division.tile_count());

        for face in CubeFace::ALL {
            for row in 0..d {
                for col in 0..d {
                    tiles.push(Tile::place(face, division, row, col, size));
                }
            }
        }

        Self {
            division,
            size,
            tiles,
        }
    }

    pub fn division(&self) -> Division {
        self.division
    }

    /// Edge length of the cube
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Look up a tile by id
    pub fn find(&self, id: &TileId) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.id() == id)
    }

    /// Indices of tiles that are not loaded yet, in index order
    pub fn unloaded_indices(&self) -> Vec<usize> {
        self.tiles
            .iter()
            .filter(|tile| !tile.is_loaded())
            .map(Tile::index)
            .collect()
    }

    pub fn loaded_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_loaded()).count()
    }

    pub fn is_fully_loaded(&self) -> bool {
        self.tiles.iter().all(Tile::is_loaded)
    }

    /// Fraction of tiles loaded (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.tiles.is_empty() {
            return 1.0;
        }
        self.loaded_count() as f32 / self.tiles.len() as f32
    }

    /// Forget every loaded texture so the next run fetches the whole set again
    pub fn clear_loaded(&mut self) {
        for tile in &mut self.tiles {
            tile.clear();
        }
    }

    pub(crate) fn mark_loaded(&mut self, index: usize) {
        if let Some(tile) = self.tiles.get_mut(index) {
            tile.mark_loaded();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_tile_count_matches_division() {
        for division in [
            Division::Matrix1x1,
            Division::Matrix2x2,
            Division::Matrix4x4,
        ] {
            let set = TileSet::new(division, 100.0);
            let d = division.factor() as usize;
            assert_eq!(set.len(), 6 * d * d);
        }
    }

    #[test]
    fn test_ids_are_the_full_cross_product() {
        let set = TileSet::new(Division::Matrix4x4, 1.0);
        let ids: HashSet<String> = set.tiles().iter().map(|t| t.id().to_string()).collect();
        assert_eq!(ids.len(), set.len());

        for face in 0..6 {
            for row in 0..4 {
                for col in 0..4 {
                    assert!(ids.contains(&format!("{face}_2048_{row}_{col}")));
                }
            }
        }
    }

    #[test]
    fn test_index_matches_storage_order() {
        let set = TileSet::new(Division::Matrix2x2, 1.0);
        for (i, tile) in set.tiles().iter().enumerate() {
            assert_eq!(tile.index(), i);
        }
        assert_eq!(set.get(5).unwrap().id().to_string(), "1_1024_0_1");
    }

    #[test]
    fn test_mark_and_clear() {
        let mut set = TileSet::new(Division::Matrix1x1, 1.0);
        assert_eq!(set.unloaded_indices(), vec![0, 1, 2, 3, 4, 5]);

        set.mark_loaded(2);
        set.mark_loaded(4);
        assert_eq!(set.loaded_count(), 2);
        assert_eq!(set.unloaded_indices(), vec![0, 1, 3, 5]);
        assert!((set.progress() - 2.0 / 6.0).abs() < 1e-6);

        set.clear_loaded();
        assert_eq!(set.loaded_count(), 0);
        assert!(!set.is_fully_loaded());
    }

    #[test]
    fn test_find_by_id() {
        let set = TileSet::new(Division::Matrix1x1, 1.0);
        let id = *set.get(3).unwrap().id();
        assert_eq!(set.find(&id).unwrap().index(), 3);
    }
}
