use thiserror::Error;

/// Everything that can go wrong while loading a puzzle or solving it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no tiles to arrange")]
    NoTiles,

    #[error("grid is {rows}x{columns} but {count} tiles were provided")]
    GridMismatch {
        rows: usize,
        columns: usize,
        count: usize,
    },

    #[error("tiles must share one side length and channel count")]
    MismatchedTiles,

    #[error("unsupported channel count {0}, expected 3 or 4")]
    UnsupportedChannels(usize),

    #[error("population must hold at least one individual")]
    EmptyPopulation,

    #[error("elite size {elite} exceeds population size {population}")]
    EliteSize { elite: usize, population: usize },

    #[error("piece arrangement is not a permutation of the tile ids")]
    NotAPermutation,

    #[error("piece size {piece_size} does not tile the {width}x{height} image")]
    PieceSize {
        width: usize,
        height: usize,
        piece_size: usize,
    },

    #[error(transparent)]
    Image(#[from] image::ImageError),
}
