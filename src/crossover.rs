//! Kernel-growing crossover: the child grid is assembled one tile at a time
//! on an unbounded lattice, steered by three ranked edge heuristics, then
//! translated into a row-major permutation.

use crate::compat::CompatibilityTables;
use crate::ea::individual::Individual;
use crate::tile::Orientation;
use rand::Rng;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct Position {
    row: i32,
    column: i32,
}

impl Position {
    fn step(self, orientation: Orientation) -> Position {
        let (row, column) = orientation.delta();
        Position {
            row: self.row + row,
            column: self.column + column,
        }
    }
}

/// Agreement level behind a candidate; lower ranks win the queue outright.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Rank {
    SharedEdge,
    BestBuddy,
    BestMatch,
}

/// One queued placement: `piece` should go at `position`, proposed by the
/// already-placed `source` looking toward `orientation`.
#[derive(Debug)]
struct Candidate {
    rank: Rank,
    cost: f64,
    seq: u64,
    source: usize,
    orientation: Orientation,
    piece: usize,
    position: Position,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then(self.cost.total_cmp(&other.cost))
            .then(self.seq.cmp(&other.seq))
    }
}

/// The partially-assembled child plus all the scratch state of one run.
/// Cursors into the best-match tables are local to the assembly, so separate
/// crossovers never see each other's progress.
struct Assembly<'a> {
    tables: &'a CompatibilityTables,
    parent1: &'a Individual,
    parent2: &'a Individual,
    rows: usize,
    columns: usize,
    kernel: HashMap<usize, Position>,
    used: HashSet<Position>,
    min_row: i32,
    max_row: i32,
    min_column: i32,
    max_column: i32,
    queue: BinaryHeap<Reverse<Candidate>>,
    cursors: Vec<[usize; 4]>,
    seq: u64,
}

impl<'a> Assembly<'a> {
    fn new(
        parent1: &'a Individual,
        parent2: &'a Individual,
        tables: &'a CompatibilityTables,
    ) -> Assembly<'a> {
        Assembly {
            tables,
            parent1,
            parent2,
            rows: parent1.rows(),
            columns: parent1.columns(),
            kernel: HashMap::new(),
            used: HashSet::new(),
            min_row: 0,
            max_row: 0,
            min_column: 0,
            max_column: 0,
            queue: BinaryHeap::new(),
            cursors: vec![[0; 4]; tables.piece_count()],
            seq: 0,
        }
    }

    /// Would the occupied bounding box still fit the target grid with
    /// `position` filled in?
    fn in_range(&self, position: Position) -> bool {
        let height = self.max_row.max(position.row) - self.min_row.min(position.row) + 1;
        let width = self.max_column.max(position.column) - self.min_column.min(position.column) + 1;
        height <= self.rows as i32 && width <= self.columns as i32
    }

    fn place(&mut self, piece: usize, position: Position) {
        self.kernel.insert(piece, position);
        self.used.insert(position);
        debug_assert_eq!(self.kernel.len(), self.used.len());
        self.min_row = self.min_row.min(position.row);
        self.max_row = self.max_row.max(position.row);
        self.min_column = self.min_column.min(position.column);
        self.max_column = self.max_column.max(position.column);
        for &orientation in &Orientation::ALL {
            let next = position.step(orientation);
            if !self.used.contains(&next) && self.in_range(next) {
                self.add_candidate(piece, next, orientation);
            }
        }
    }

    /// Queue the best available fill for side `orientation` of `source`:
    /// a neighbour both parents agree on, failing that a best buddy at least
    /// one parent backs, failing that the cheapest untried best-match entry.
    fn add_candidate(&mut self, source: usize, position: Position, orientation: Orientation) {
        if let (Some(piece), Some(other)) = (
            self.parent1.edge(source, orientation),
            self.parent2.edge(source, orientation),
        ) {
            if piece == other && !self.kernel.contains_key(&piece) {
                self.push(Rank::SharedEdge, 0.0, source, orientation, piece, position);
                return;
            }
        }

        let matches = self.tables.best_matches(source, orientation);
        if let Some(&(cost, buddy)) = matches.first() {
            let back = self.tables.best_matches(buddy, orientation.opposite());
            let mutual = back.first().map_or(false, |&(_, piece)| piece == source);
            if mutual
                && !self.kernel.contains_key(&buddy)
                && (self.parent1.edge(source, orientation) == Some(buddy)
                    || self.parent2.edge(source, orientation) == Some(buddy))
            {
                self.push(Rank::BestBuddy, cost, source, orientation, buddy, position);
                return;
            }
        }

        let mut found = None;
        let cursor = &mut self.cursors[source][orientation.index()];
        while *cursor < matches.len() {
            let (cost, piece) = matches[*cursor];
            *cursor += 1;
            if !self.kernel.contains_key(&piece) {
                found = Some((cost, piece));
                break;
            }
        }
        if let Some((cost, piece)) = found {
            self.push(Rank::BestMatch, cost, source, orientation, piece, position);
        }
    }

    fn push(
        &mut self,
        rank: Rank,
        cost: f64,
        source: usize,
        orientation: Orientation,
        piece: usize,
        position: Position,
    ) {
        self.seq += 1;
        self.queue.push(Reverse(Candidate {
            rank,
            cost,
            seq: self.seq,
            source,
            orientation,
            piece,
            position,
        }));
    }

    fn run(&mut self, root: usize) {
        self.place(
            root,
            Position {
                row: 0,
                column: 0,
            },
        );
        while self.kernel.len() < self.tables.piece_count() {
            let candidate = match self.queue.pop() {
                Some(Reverse(candidate)) => candidate,
                None => break,
            };
            // The box may have grown since this was queued.
            if self.used.contains(&candidate.position) || !self.in_range(candidate.position) {
                continue;
            }
            if self.kernel.contains_key(&candidate.piece) {
                // Placed elsewhere in the meantime; look for the next best
                // fill for this seam.
                self.add_candidate(candidate.source, candidate.position, candidate.orientation);
                continue;
            }
            self.place(candidate.piece, candidate.position);
        }
    }

    /// Translate the kernel into a row-major permutation, handing any cells
    /// the queue never reached to the leftover tiles in ascending order.
    fn into_pieces(self) -> Vec<usize> {
        let n = self.rows * self.columns;
        let mut slots: Vec<Option<usize>> = vec![None; n];
        for (&piece, &position) in &self.kernel {
            let row = (position.row - self.min_row) as usize;
            let column = (position.column - self.min_column) as usize;
            slots[row * self.columns + column] = Some(piece);
        }
        let mut leftover = (0..n).filter(|piece| !self.kernel.contains_key(piece));
        slots
            .into_iter()
            .map(|slot| slot.or_else(|| leftover.next()).unwrap_or(0))
            .collect()
    }
}

/// Produce a child arrangement from two parents, seeded with a uniformly
/// random tile of `parent1` at the lattice origin. Fitness of the child is
/// left for a later evaluation.
pub fn crossover(
    parent1: &Individual,
    parent2: &Individual,
    tables: &CompatibilityTables,
    rng: &mut impl Rng,
) -> Individual {
    let root = parent1.pieces()[rng.gen_range(0..tables.piece_count())];
    let mut assembly = Assembly::new(parent1, parent2, tables);
    assembly.run(root);
    let rows = parent1.rows();
    let columns = parent1.columns();
    Individual::from_pieces_unchecked(rows, columns, assembly.into_pieces())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::{stitched_tiles, strip_tiles};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ground_truth() -> Individual {
        Individual::from_pieces_unchecked(2, 2, vec![0, 1, 2, 3])
    }

    #[test]
    fn identical_parents_reproduce_the_parent() {
        let tables = CompatibilityTables::build(&stitched_tiles());
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..8 {
            let child = crossover(&ground_truth(), &ground_truth(), &tables, &mut rng);
            assert_eq!(child.pieces(), &[0, 1, 2, 3]);
        }
    }

    #[test]
    fn best_buddies_repair_a_disagreeing_parent() {
        let tables = CompatibilityTables::build(&stitched_tiles());
        let parent1 = ground_truth();
        let parent2 = Individual::from_pieces_unchecked(2, 2, vec![0, 1, 3, 2]);
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..8 {
            let child = crossover(&parent1, &parent2, &tables, &mut rng);
            assert_eq!(child.pieces(), &[0, 1, 2, 3]);
        }
    }

    #[test]
    fn collisions_advance_the_best_match_cursor() {
        let tables = CompatibilityTables::build(&strip_tiles());
        let parent1 = Individual::from_pieces_unchecked(1, 3, vec![0, 1, 2]);
        let parent2 = Individual::from_pieces_unchecked(1, 3, vec![0, 2, 1]);
        let mut assembly = Assembly::new(&parent1, &parent2, &tables);

        // Tile 2, the cheapest match to the right of tile 0, is already down.
        assembly.kernel.insert(2, Position { row: 0, column: 2 });
        assembly.used.insert(Position { row: 0, column: 2 });

        assembly.add_candidate(0, Position { row: 0, column: 1 }, Orientation::Right);

        assert_eq!(assembly.cursors[0][Orientation::Right.index()], 2);
        let Reverse(candidate) = assembly.queue.pop().unwrap();
        assert_eq!(candidate.piece, 1);
        assert_eq!(candidate.rank, Rank::BestMatch);
        assert!(assembly.queue.is_empty());
    }

    #[test]
    fn placements_cannot_stretch_the_bounding_box() {
        let tables = CompatibilityTables::build(&stitched_tiles());
        let parent = ground_truth();
        let mut assembly = Assembly::new(&parent, &parent, &tables);
        assembly.place(0, Position { row: 0, column: 0 });
        assembly.place(2, Position { row: 1, column: 0 });
        assembly.place(1, Position { row: 0, column: 1 });
        assert!(!assembly.in_range(Position { row: 2, column: 0 }));
        assert!(!assembly.in_range(Position { row: -1, column: 0 }));
        assert!(!assembly.in_range(Position { row: 0, column: 2 }));
        assert!(assembly.in_range(Position { row: 1, column: 1 }));
    }

    #[test]
    fn a_dried_up_queue_falls_back_to_ascending_fill() {
        let tables = CompatibilityTables::build(&stitched_tiles());
        let parent = ground_truth();
        let mut assembly = Assembly::new(&parent, &parent, &tables);
        assembly.place(3, Position { row: 0, column: 0 });
        assembly.queue.clear();
        assert_eq!(assembly.into_pieces(), vec![3, 0, 1, 2]);
    }

    #[test]
    fn children_are_always_permutations() {
        let tables = CompatibilityTables::build(&stitched_tiles());
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let parent1 = Individual::random(2, 2, &mut rng);
            let parent2 = Individual::random(2, 2, &mut rng);
            let child = crossover(&parent1, &parent2, &tables, &mut rng);
            let mut sorted = child.pieces().to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn crossover_is_deterministic_per_seed() {
        let tables = CompatibilityTables::build(&stitched_tiles());
        let mut seed_rng = StdRng::seed_from_u64(9);
        let parent1 = Individual::random(2, 2, &mut seed_rng);
        let parent2 = Individual::random(2, 2, &mut seed_rng);
        let first = crossover(&parent1, &parent2, &tables, &mut StdRng::seed_from_u64(3));
        let second = crossover(&parent1, &parent2, &tables, &mut StdRng::seed_from_u64(3));
        assert_eq!(first.pieces(), second.pieces());
    }
}
