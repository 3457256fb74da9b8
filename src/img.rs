//! PNG-backed pixel buffers plus the tile splitter and merger.

use crate::error::Error;
use crate::tile::Tile;
use image::{ColorType, DynamicImage};
use std::path::Path;

/// A decoded image: row-major interleaved bytes.
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Decode an image file. RGBA8 input keeps its alpha channel, everything
    /// else is converted to RGB8.
    pub fn load(path: &Path) -> Result<Bitmap, Error> {
        let decoded = image::open(path)?;
        let bitmap = match decoded {
            DynamicImage::ImageRgba8(buffer) => {
                let (width, height) = buffer.dimensions();
                Bitmap {
                    width: width as usize,
                    height: height as usize,
                    channels: 4,
                    data: buffer.into_raw(),
                }
            }
            other => {
                let buffer = other.to_rgb8();
                let (width, height) = buffer.dimensions();
                Bitmap {
                    width: width as usize,
                    height: height as usize,
                    channels: 3,
                    data: buffer.into_raw(),
                }
            }
        };
        Ok(bitmap)
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let color = if self.channels == 4 {
            ColorType::Rgba8
        } else {
            ColorType::Rgb8
        };
        image::save_buffer(
            path,
            &self.data,
            self.width as u32,
            self.height as u32,
            color,
        )?;
        Ok(())
    }

    fn row(&self, row: usize, column: usize, pixels: usize) -> &[u8] {
        let at = (row * self.width + column) * self.channels;
        &self.data[at..at + pixels * self.channels]
    }
}

/// Cut the image into row-major square tiles of side `piece_size`.
pub fn split(bitmap: &Bitmap, piece_size: usize) -> Result<Vec<Tile>, Error> {
    if piece_size == 0 || bitmap.width % piece_size != 0 || bitmap.height % piece_size != 0 {
        return Err(Error::PieceSize {
            width: bitmap.width,
            height: bitmap.height,
            piece_size,
        });
    }

    let mut tiles = Vec::with_capacity((bitmap.width / piece_size) * (bitmap.height / piece_size));
    for tile_row in (0..bitmap.height).step_by(piece_size) {
        for tile_col in (0..bitmap.width).step_by(piece_size) {
            let mut data = Vec::with_capacity(piece_size * piece_size * bitmap.channels);
            for row in 0..piece_size {
                data.extend_from_slice(bitmap.row(tile_row + row, tile_col, piece_size));
            }
            tiles.push(Tile::new(piece_size, bitmap.channels, data));
        }
    }
    Ok(tiles)
}

/// Reassemble a full bitmap by laying `tiles` out according to the
/// permutation `pieces`.
pub fn merge(
    tiles: &[Tile],
    pieces: &[usize],
    rows: usize,
    columns: usize,
) -> Result<Bitmap, Error> {
    let size = match tiles.first() {
        Some(tile) => tile.size(),
        None => return Err(Error::NoTiles),
    };
    let channels = tiles[0].channels();
    let width = columns * size;
    let height = rows * size;

    let mut data = vec![0u8; width * height * channels];
    for row in 0..rows {
        for column in 0..columns {
            let tile = &tiles[pieces[row * columns + column]];
            for line in 0..size {
                let at = ((row * size + line) * width + column * size) * channels;
                data[at..at + size * channels].copy_from_slice(tile.line(line));
            }
        }
    }

    Ok(Bitmap {
        width,
        height,
        channels,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::stitched_tiles;

    fn stitched_bitmap() -> Bitmap {
        let rows = [0u8, 40, 40, 80];
        let cols = [0u8, 4, 4, 8];
        let mut data = Vec::with_capacity(4 * 4 * 3);
        for &row in &rows {
            for &col in &cols {
                let v = row + col;
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Bitmap {
            width: 4,
            height: 4,
            channels: 3,
            data,
        }
    }

    #[test]
    fn split_yields_row_major_tiles() {
        let tiles = split(&stitched_bitmap(), 2).unwrap();
        assert_eq!(tiles, stitched_tiles());
    }

    #[test]
    fn merge_is_the_inverse_of_split() {
        let bitmap = stitched_bitmap();
        let tiles = split(&bitmap, 2).unwrap();
        let rebuilt = merge(&tiles, &[0, 1, 2, 3], 2, 2).unwrap();
        assert_eq!(rebuilt.data, bitmap.data);
        assert_eq!(rebuilt.width, bitmap.width);
        assert_eq!(rebuilt.height, bitmap.height);

        let swapped = merge(&tiles, &[1, 0, 2, 3], 2, 2).unwrap();
        assert_ne!(swapped.data, bitmap.data);
    }

    #[test]
    fn split_rejects_sizes_that_do_not_tile_the_image() {
        assert!(matches!(
            split(&stitched_bitmap(), 3),
            Err(Error::PieceSize { .. })
        ));
        assert!(matches!(
            split(&stitched_bitmap(), 0),
            Err(Error::PieceSize { .. })
        ));
        assert!(matches!(
            merge(&[], &[], 0, 0),
            Err(Error::NoTiles)
        ));
    }
}
