use crate::compat::CompatibilityTables;
use crate::error::Error;
use crate::tile::Orientation;
use rand::seq::SliceRandom;
use rand::Rng;

/// One grid arrangement: a permutation of tile ids, its inverse map, and the
/// fitness cached after the first evaluation.
#[derive(Clone, Debug)]
pub struct Individual {
    rows: usize,
    columns: usize,
    pieces: Vec<usize>,
    index: Vec<usize>,
    fitness: Option<f64>,
}

impl Individual {
    /// A uniformly random arrangement.
    pub fn random(rows: usize, columns: usize, rng: &mut impl Rng) -> Individual {
        let mut pieces: Vec<usize> = (0..rows * columns).collect();
        pieces.shuffle(rng);
        Individual::from_pieces_unchecked(rows, columns, pieces)
    }

    /// Builds an individual from an existing arrangement, rejecting anything
    /// that is not a permutation of `0..rows * columns`.
    pub fn from_pieces(rows: usize, columns: usize, pieces: Vec<usize>) -> Result<Individual, Error> {
        let n = rows * columns;
        if pieces.len() != n {
            return Err(Error::NotAPermutation);
        }
        let mut seen = vec![false; n];
        for &piece in &pieces {
            if piece >= n || seen[piece] {
                return Err(Error::NotAPermutation);
            }
            seen[piece] = true;
        }
        Ok(Individual::from_pieces_unchecked(rows, columns, pieces))
    }

    pub(crate) fn from_pieces_unchecked(
        rows: usize,
        columns: usize,
        pieces: Vec<usize>,
    ) -> Individual {
        let mut index = vec![0; pieces.len()];
        for (at, &piece) in pieces.iter().enumerate() {
            index[piece] = at;
        }
        Individual {
            rows,
            columns,
            pieces,
            index,
            fitness: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// `pieces[row * columns + column]` is the tile occupying that cell.
    pub fn pieces(&self) -> &[usize] {
        &self.pieces
    }

    pub fn into_pieces(self) -> Vec<usize> {
        self.pieces
    }

    /// The tile sitting next to `piece_id` in direction `orientation`, or
    /// `None` when `piece_id` sits on that border of the grid.
    pub fn edge(&self, piece_id: usize, orientation: Orientation) -> Option<usize> {
        let at = self.index[piece_id];
        let row = at / self.columns;
        let column = at % self.columns;
        match orientation {
            Orientation::Up if row > 0 => Some(self.pieces[at - self.columns]),
            Orientation::Down if row + 1 < self.rows => Some(self.pieces[at + self.columns]),
            Orientation::Left if column > 0 => Some(self.pieces[at - 1]),
            Orientation::Right if column + 1 < self.columns => Some(self.pieces[at + 1]),
            _ => None,
        }
    }

    /// Fitness of the arrangement, larger is better. Computed from the seam
    /// costs on the first call and cached afterwards.
    pub fn evaluate(&mut self, tables: &CompatibilityTables) -> f64 {
        if let Some(fitness) = self.fitness {
            return fitness;
        }
        let mut raw = 0.001;
        for row in 0..self.rows {
            for column in 0..self.columns - 1 {
                let at = row * self.columns + column;
                raw += tables.dissimilarity(self.pieces[at], self.pieces[at + 1], Orientation::Right);
            }
        }
        for row in 0..self.rows - 1 {
            for column in 0..self.columns {
                let at = row * self.columns + column;
                raw += tables.dissimilarity(
                    self.pieces[at],
                    self.pieces[at + self.columns],
                    Orientation::Down,
                );
            }
        }
        let fitness = 1000.0 / raw;
        self.fitness = Some(fitness);
        fitness
    }

    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }
}
