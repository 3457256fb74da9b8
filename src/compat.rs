//! Pairwise edge-compatibility tables, built once per puzzle and shared
//! read-only by everything that follows.

use crate::tile::{dissimilarity, Orientation, Tile};

/// The dissimilarity tensor plus, for every tile and side, the other tiles
/// sorted from the cheapest seam up.
pub struct CompatibilityTables {
    piece_count: usize,
    measure: Vec<f64>,
    best_match: Vec<Vec<(f64, usize)>>,
}

impl CompatibilityTables {
    pub fn build(tiles: &[Tile]) -> CompatibilityTables {
        let n = tiles.len();

        let mut measure = vec![0.0; n * n * 4];
        for i in 0..n {
            for j in 0..n {
                for &orientation in &Orientation::ALL {
                    measure[(i * n + j) * 4 + orientation.index()] =
                        dissimilarity(&tiles[i], &tiles[j], orientation);
                }
            }
        }

        let mut best_match = Vec::with_capacity(n * 4);
        for i in 0..n {
            for &orientation in &Orientation::ALL {
                let mut matches: Vec<(f64, usize)> = (0..n)
                    .filter(|&j| j != i)
                    .map(|j| (measure[(i * n + j) * 4 + orientation.index()], j))
                    .collect();
                matches.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                best_match.push(matches);
            }
        }

        CompatibilityTables {
            piece_count: n,
            measure,
            best_match,
        }
    }

    pub fn piece_count(&self) -> usize {
        self.piece_count
    }

    /// Cost of placing `j` against side `orientation` of `i`.
    pub fn dissimilarity(&self, i: usize, j: usize, orientation: Orientation) -> f64 {
        self.measure[(i * self.piece_count + j) * 4 + orientation.index()]
    }

    /// Neighbours of `i` on side `orientation`, cheapest first, ties broken
    /// toward the smaller tile id.
    pub fn best_matches(&self, i: usize, orientation: Orientation) -> &[(f64, usize)] {
        &self.best_match[i * 4 + orientation.index()]
    }
}
