use anyhow::Context;
use glam::Vec2;
use std::fs::read_to_string;
use std::path::Path;

/// A rectangular grid of tile values. `0` is open floor, `n > 0` is a wall drawn with
/// wall texture `n - 1`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct GridMap {
    width: usize,
    height: usize,
    tiles: Vec<u8>,
}

impl GridMap {
    /// A map with no cells. Every lookup lands out of bounds and reads as a wall.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(name: &Path) -> anyhow::Result<Self> {
        log::info!("loading map at {}", name.display());
        let file = read_to_string(name)
            .with_context(|| format!("failed to open map data file: {}", name.display()))?;
        Ok(Self::parse(&file))
    }

    /// Every ASCII digit on a line is one tile, everything else is skipped. Rows keep
    /// their order. Short rows are padded with open cells so the grid stays rectangular.
    pub fn parse(src: &str) -> Self {
        let rows = src
            .lines()
            .map(|line| {
                line.bytes()
                    .filter(u8::is_ascii_digit)
                    .map(|b| b - b'0')
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let height = rows.len();
        let mut tiles = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                log::warn!(
                    "map row {y} has {} tiles, expected {width}; padding with open cells",
                    row.len()
                );
            }
            tiles.extend_from_slice(row);
            tiles.resize((y + 1) * width, 0);
        }

        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Self {
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut tiles = Vec::with_capacity(width * rows.len());
        for row in rows {
            let row = row.as_ref();
            tiles.extend(row.iter().copied().take(width));
            tiles.resize(tiles.len() + width.saturating_sub(row.len()), 0);
        }

        Self {
            width,
            height: rows.len(),
            tiles,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Tile value at a cell, or `None` outside the grid.
    pub fn tile(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        self.tiles.get(y as usize * self.width + x as usize).copied()
    }

    /// Out-of-bounds cells count as walls.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).map_or(true, |t| t > 0)
    }

    pub fn is_inside_wall(&self, pos: Vec2) -> bool {
        self.is_wall(pos.x.floor() as i32, pos.y.floor() as i32)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        // chunks(0) panics, and an empty map has no rows anyway
        self.tiles.chunks(self.width.max(1)).take(self.height)
    }
}
