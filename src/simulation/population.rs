//! Fixed-size population of brains with elitist selection and mutation.

use std::sync::Arc;

use rand::Rng;

use super::brain::NeuralNetwork;
use super::error::{Result, SteerError};

/// Number of brains carried unchanged into the next generation.
///
/// The top fifth of the population, and never fewer than one.
pub fn survivor_count(population_size: usize) -> usize {
    (population_size / 5).max(1)
}

/// Indices of `fitness` ordered from best to worst.
///
/// The sort is stable, so equal fitness keeps the original population order.
pub fn rank_by_fitness(fitness: &[f32]) -> Vec<usize> {
    let mut ranking: Vec<usize> = (0..fitness.len()).collect();
    ranking.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
    ranking
}

/// Ordered collection of brains whose size never changes.
#[derive(Debug, Clone)]
pub struct Population {
    members: Vec<Arc<NeuralNetwork>>,
}

impl Population {
    /// Creates `size` brains with random weights.
    pub fn new_random<R: Rng>(
        size: usize,
        input_count: usize,
        hidden_count: usize,
        output_count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if size == 0 {
            return Err(SteerError::InvalidConfig(
                "population_size must be positive".to_string(),
            ));
        }
        let members = (0..size)
            .map(|_| NeuralNetwork::with_rng(input_count, hidden_count, output_count, rng).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { members })
    }

    /// Wraps an existing set of brains.
    pub fn from_members(members: Vec<NeuralNetwork>) -> Result<Self> {
        if members.is_empty() {
            return Err(SteerError::InvalidConfig(
                "population must contain at least one brain".to_string(),
            ));
        }
        Ok(Self {
            members: members.into_iter().map(Arc::new).collect(),
        })
    }

    /// Replaces the population with the next generation.
    ///
    /// `fitness[i]` scores `members[i]`. The top [`survivor_count`] brains are
    /// kept unmutated at the front, in rank order; the remaining slots are
    /// filled with mutated copies of survivors picked uniformly at random.
    /// The whole collection is swapped in at once.
    ///
    /// Returns the ranking of the evaluated generation.
    ///
    /// # Panics
    ///
    /// Panics if `fitness` does not score every member, or if the new
    /// generation does not have the same size as the old one.
    pub fn evolve<R: Rng>(&mut self, fitness: &[f32], mutation_range: f32, rng: &mut R) -> Vec<usize> {
        let size = self.members.len();
        assert_eq!(
            fitness.len(),
            size,
            "fitness must score every member of the population"
        );

        let ranking = rank_by_fitness(fitness);
        let survivors = survivor_count(size);

        let mut next: Vec<Arc<NeuralNetwork>> = Vec::with_capacity(size);
        next.extend(ranking[..survivors].iter().map(|&i| Arc::clone(&self.members[i])));
        assert!(!next.is_empty(), "survivor set is empty");

        while next.len() < size {
            let parent = Arc::clone(&next[rng.random_range(0..survivors)]);
            next.push(Arc::new(parent.mutated(mutation_range, rng)));
        }

        assert_eq!(next.len(), size, "population size drifted during evolution");
        self.members = next;
        ranking
    }

    /// All brains, in population order.
    pub fn members(&self) -> &[Arc<NeuralNetwork>] {
        &self.members
    }

    /// Brain in slot `index`.
    pub fn get(&self, index: usize) -> Option<&Arc<NeuralNetwork>> {
        self.members.get(index)
    }

    /// Number of brains.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always `false`; a population is never empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
