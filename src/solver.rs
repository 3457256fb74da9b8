use crate::compat::CompatibilityTables;
use crate::ea::population::Population;
use crate::error::Error;
use crate::tile::Tile;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Knobs for one evolution run.
#[derive(Clone, Debug)]
pub struct Params {
    pub population_size: usize,
    pub elite_size: usize,
    pub generations: usize,
    pub seed: u64,
}

/// Reconstruct the arrangement of `tiles` on a `rows` x `columns` grid.
///
/// Returns the best permutation found across the configured generations:
/// `permutation[row * columns + column]` is the tile id that belongs at that
/// cell. Runs with identical inputs and seed return identical permutations.
pub fn solve(
    tiles: &[Tile],
    rows: usize,
    columns: usize,
    params: &Params,
) -> Result<Vec<usize>, Error> {
    validate(tiles, rows, columns, params)?;
    if tiles.len() == 1 {
        return Ok(vec![0]);
    }

    let tables = CompatibilityTables::build(tiles);
    let rng = StdRng::seed_from_u64(params.seed);
    let mut population = Population::new(rows, columns, &tables, params, rng);
    let best = population.evolve(params.generations);
    Ok(best.into_pieces())
}

fn validate(tiles: &[Tile], rows: usize, columns: usize, params: &Params) -> Result<(), Error> {
    if tiles.is_empty() {
        return Err(Error::NoTiles);
    }
    if rows * columns != tiles.len() {
        return Err(Error::GridMismatch {
            rows,
            columns,
            count: tiles.len(),
        });
    }

    let size = tiles[0].size();
    let channels = tiles[0].channels();
    if tiles
        .iter()
        .any(|tile| tile.size() != size || tile.channels() != channels)
    {
        return Err(Error::MismatchedTiles);
    }
    if channels != 3 && channels != 4 {
        return Err(Error::UnsupportedChannels(channels));
    }

    if params.population_size == 0 {
        return Err(Error::EmptyPopulation);
    }
    if params.elite_size > params.population_size {
        return Err(Error::EliteSize {
            elite: params.elite_size,
            population: params.population_size,
        });
    }
    Ok(())
}
