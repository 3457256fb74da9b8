use super::individual::Individual;
use crate::compat::CompatibilityTables;
use crate::crossover::crossover;
use crate::solver::Params;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::Rng;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Display;
use std::time::SystemTime;

/// Rolling status of one evolution run.
#[derive(Debug, Default)]
struct EvolutionStats {
    generation: usize,
    max_generations: usize,
    fitness: f64,
    stagnation: usize,
    elapsed: f32,
}

impl Display for EvolutionStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}/{}] ({:.3}s) F: {:.3} S: {}",
            self.generation, self.max_generations, self.elapsed, self.fitness, self.stagnation,
        )
    }
}

/// Evaluate a collection of individuals against the shared tables.
fn evaluate(population: &mut Vec<Individual>, tables: &CompatibilityTables) {
    for individual in population.iter_mut() {
        individual.evaluate(tables);
    }
}

/// Sort a collection of individuals, least fit first. The sort is stable, so
/// equal fitness keeps insertion order.
fn sort(population: &mut Vec<Individual>) {
    population.sort_by(|a, b| {
        a.fitness()
            .partial_cmp(&b.fitness())
            .unwrap_or(Ordering::Equal)
    });
}

/// Pick one index by fitness-proportionate roulette over the given weights.
fn roulette_select(weights: &[f64], total: f64, rng: &mut impl Rng) -> usize {
    let target = rng.gen_range(0.0..total);
    let mut accumulated = 0.0;
    for (at, weight) in weights.iter().enumerate() {
        accumulated += weight;
        if accumulated >= target {
            return at;
        }
    }
    weights.len() - 1
}

/// Generational population: elites survive each turnover, the rest of the
/// next generation is bred by kernel-growing crossover.
pub struct Population<'a> {
    tables: &'a CompatibilityTables,
    population_size: usize,
    elite_size: usize,
    individuals: Vec<Individual>,
    rng: StdRng,
    stats: EvolutionStats,
    best: Individual,
    best_fitness: f64,
    started: SystemTime,
}

impl<'a> Population<'a> {
    pub fn new(
        rows: usize,
        columns: usize,
        tables: &'a CompatibilityTables,
        params: &Params,
        mut rng: StdRng,
    ) -> Population<'a> {
        let mut individuals = Vec::with_capacity(params.population_size);
        for _ in 0..params.population_size {
            individuals.push(Individual::random(rows, columns, &mut rng));
        }
        evaluate(&mut individuals, tables);
        sort(&mut individuals);

        let best = individuals[individuals.len() - 1].clone();
        let best_fitness = best.fitness().unwrap_or(0.0);
        Population {
            tables,
            population_size: params.population_size,
            elite_size: params.elite_size,
            individuals,
            rng,
            stats: EvolutionStats {
                max_generations: params.generations,
                fitness: best_fitness,
                ..Default::default()
            },
            best,
            best_fitness,
            started: SystemTime::now(),
        }
    }

    /// Run the generational loop and return the fittest individual seen
    /// anywhere in the run.
    pub fn evolve(&mut self, generations: usize) -> Individual {
        info!(
            "evolving {} individuals for {} generations ({} elites)",
            self.population_size, generations, self.elite_size
        );
        for _ in 0..generations {
            self.next();
        }
        self.best.clone()
    }

    /// Select parent pairs for breeding. Both draws are independent, so an
    /// individual may be paired with itself.
    fn select_parents(&mut self, count: usize) -> Vec<(usize, usize)> {
        let weights: Vec<f64> = self
            .individuals
            .iter()
            .map(|individual| individual.fitness().unwrap_or(0.0))
            .collect();
        let total: f64 = weights.iter().sum();
        let mut pairs = Vec::with_capacity(count);
        for _ in 0..count {
            let first = roulette_select(&weights, total, &mut self.rng);
            let second = roulette_select(&weights, total, &mut self.rng);
            pairs.push((first, second));
        }
        pairs
    }

    /// Advance one generation.
    fn next(&mut self) {
        self.stats.generation += 1;

        let elite_from = self.population_size - self.elite_size;
        let mut next_generation: Vec<Individual> = self.individuals[elite_from..]
            .iter()
            .rev()
            .cloned()
            .collect();

        for (first, second) in self.select_parents(self.population_size - self.elite_size) {
            let child = crossover(
                &self.individuals[first],
                &self.individuals[second],
                self.tables,
                &mut self.rng,
            );
            next_generation.push(child);
        }

        evaluate(&mut next_generation, self.tables);
        sort(&mut next_generation);
        self.individuals = next_generation;

        let fittest = &self.individuals[self.population_size - 1];
        let fitness = fittest.fitness().unwrap_or(0.0);
        if fitness > self.best_fitness {
            self.best_fitness = fitness;
            self.best = fittest.clone();
        } else {
            self.stats.stagnation += 1;
        }

        self.stats.fitness = fitness;
        self.stats.elapsed = self
            .started
            .elapsed()
            .map(|elapsed| elapsed.as_secs_f32())
            .unwrap_or(0.0);
        info!("{}", self.stats);
        debug!(
            "{:?}",
            self.individuals
                .iter()
                .map(|individual| individual.fitness().unwrap_or(0.0))
                .collect::<Vec<f64>>()
        );
    }

    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Generations elapsed without an improvement of the best fitness.
    pub fn stagnation(&self) -> usize {
        self.stats.stagnation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::stitched_tiles;
    use rand::SeedableRng;

    fn snapshot(population: &Population) -> Vec<Vec<usize>> {
        let mut pieces: Vec<Vec<usize>> = population
            .individuals
            .iter()
            .map(|individual| individual.pieces().to_vec())
            .collect();
        pieces.sort();
        pieces
    }

    #[test]
    fn roulette_favours_heavy_weights_proportionally() {
        let weights = [1.0, 1.0, 1.0, 97.0];
        let total: f64 = weights.iter().sum();
        let mut rng = StdRng::seed_from_u64(17);
        let mut hits = 0;
        for _ in 0..10_000 {
            if roulette_select(&weights, total, &mut rng) == 3 {
                hits += 1;
            }
        }
        let frequency = f64::from(hits) / 10_000.0;
        assert!(
            (0.95..=0.99).contains(&frequency),
            "frequency {}",
            frequency
        );
    }

    #[test]
    fn full_elitism_freezes_the_population() {
        let tables = CompatibilityTables::build(&stitched_tiles());
        let params = Params {
            population_size: 4,
            elite_size: 4,
            generations: 3,
            seed: 0,
        };
        let mut population = Population::new(2, 2, &tables, &params, StdRng::seed_from_u64(21));
        let before = snapshot(&population);
        population.evolve(params.generations);
        assert_eq!(snapshot(&population), before);
    }

    #[test]
    fn evolve_never_regresses_the_best_fitness() {
        let tables = CompatibilityTables::build(&stitched_tiles());
        let params = Params {
            population_size: 8,
            elite_size: 2,
            generations: 5,
            seed: 0,
        };
        let mut population = Population::new(2, 2, &tables, &params, StdRng::seed_from_u64(33));
        let initial_best = population.best_fitness();
        let mut best = population.evolve(params.generations);

        assert!(population.best_fitness() >= initial_best);
        assert_eq!(best.evaluate(&tables), population.best_fitness());
        let mut sorted = best.pieces().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);
    }

    #[test]
    fn populations_stay_sorted_least_fit_first() {
        let tables = CompatibilityTables::build(&stitched_tiles());
        let params = Params {
            population_size: 6,
            elite_size: 0,
            generations: 2,
            seed: 0,
        };
        let mut population = Population::new(2, 2, &tables, &params, StdRng::seed_from_u64(8));
        population.evolve(params.generations);
        let fitnesses: Vec<f64> = population
            .individuals
            .iter()
            .map(|individual| individual.fitness().unwrap_or(0.0))
            .collect();
        assert!(fitnesses.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
