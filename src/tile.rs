//! Tile identity and placement
//!
//! A cubemap face is split into `division × division` quads. Each quad is a
//! [`Tile`] with a stable [`TileId`], a world-space centre used for priority
//! scoring, and a `loaded` flag owned by the scheduler.

use glam::Vec3;
use std::fmt;

use crate::error::{Result, StreamError};

/// Pixel edge length of one tile image
pub const TILE_RESOLUTION: u32 = 512;

/// Number of faces on a cubemap
pub const FACE_COUNT: usize = 6;

/// How many tiles each face is split into along one edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Division {
    /// One tile per face (6 tiles)
    Matrix1x1 = 1,
    /// 2×2 tiles per face (24 tiles)
    Matrix2x2 = 2,
    /// 4×4 tiles per face (96 tiles)
    Matrix4x4 = 4,
}

impl Division {
    /// Parse a division from its per-edge factor
    pub fn from_factor(factor: u32) -> Result<Self> {
        match factor {
            1 => Ok(Self::Matrix1x1),
            2 => Ok(Self::Matrix2x2),
            4 => Ok(Self::Matrix4x4),
            other => Err(StreamError::InvalidConfig(format!(
                "division must be 1, 2 or 4, got {other}"
            ))),
        }
    }

    /// Tiles along one face edge
    pub const fn factor(self) -> u32 {
        self as u32
    }

    /// Tiles per face
    pub const fn tiles_per_face(self) -> usize {
        (self.factor() * self.factor()) as usize
    }

    /// Total tiles across all six faces
    pub const fn tile_count(self) -> usize {
        FACE_COUNT * self.tiles_per_face()
    }

    /// Pixel resolution of a whole face at this division
    pub const fn face_resolution(self) -> u32 {
        self.factor() * TILE_RESOLUTION
    }
}

/// One face of the cube, in fetch-naming order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CubeFace {
    Front = 0,
    Right = 1,
    Back = 2,
    Left = 3,
    Up = 4,
    Down = 5,
}

impl CubeFace {
    /// All faces in index order
    pub const ALL: [CubeFace; FACE_COUNT] = [
        CubeFace::Front,
        CubeFace::Right,
        CubeFace::Back,
        CubeFace::Left,
        CubeFace::Up,
        CubeFace::Down,
    ];

    /// Numeric index used in tile ids
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Orientation of quads on this face
    pub fn basis(self) -> FaceBasis {
        match self {
            CubeFace::Front => FaceBasis::new(Vec3::Z, Vec3::X, Vec3::Y),
            CubeFace::Right => FaceBasis::new(Vec3::X, Vec3::NEG_Z, Vec3::Y),
            CubeFace::Back => FaceBasis::new(Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            CubeFace::Left => FaceBasis::new(Vec3::NEG_X, Vec3::Z, Vec3::Y),
            CubeFace::Up => FaceBasis::new(Vec3::Y, Vec3::X, Vec3::NEG_Z),
            CubeFace::Down => FaceBasis::new(Vec3::NEG_Y, Vec3::X, Vec3::Z),
        }
    }
}

/// Orthonormal frame of a cube face (outward forward, right, up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl FaceBasis {
    const fn new(forward: Vec3, right: Vec3, up: Vec3) -> Self {
        Self { forward, right, up }
    }
}

/// Stable identity of a tile within its set
///
/// Renders as `{face}_{resolution}_{row}_{col}`, which is also the suffix of
/// the tile's fetch location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId {
    pub face: CubeFace,
    pub resolution: u32,
    pub row: u32,
    pub col: u32,
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}",
            self.face.index(),
            self.resolution,
            self.row,
            self.col
        )
    }
}

/// One independently fetchable quad of the panorama
#[derive(Debug, Clone)]
pub struct Tile {
    id: TileId,
    index: usize,
    position: Vec3,
    basis: FaceBasis,
    edge_length: f32,
    loaded: bool,
}

impl Tile {
    /// Place tile (`row`, `col`) of `face` on a cube of edge `size` centred at the origin
    pub(crate) fn place(face: CubeFace, division: Division, row: u32, col: u32, size: f32) -> Self {
        let d = division.factor();
        let tile_size = 1.0 / d as f32;
        let half_span = (d as f32 - 1.0) / 2.0;
        let basis = face.basis();

        let local = 0.5 * basis.forward
            + tile_size * (col as f32 - half_span) * basis.right
            + tile_size * (row as f32 - half_span) * -basis.up;

        let index = face.index() * division.tiles_per_face() + (row * d + col) as usize;

        Self {
            id: TileId {
                face,
                resolution: division.face_resolution(),
                row,
                col,
            },
            index,
            position: local * size,
            basis,
            edge_length: tile_size * size,
            loaded: false,
        }
    }

    pub fn id(&self) -> &TileId {
        &self.id
    }

    /// Position of this tile in its set
    pub fn index(&self) -> usize {
        self.index
    }

    /// World-space centre of the quad
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn basis(&self) -> FaceBasis {
        self.basis
    }

    /// World-space edge length of the quad
    pub fn edge_length(&self) -> f32 {
        self.edge_length
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub(crate) fn clear(&mut self) {
        self.loaded = false;
    }
}
