use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Fitness summary of one evaluated generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Index of the generation that was evaluated (0 for the initial population).
    pub generation: u32,
    /// Highest fitness in the generation.
    pub best: f32,
    /// Mean fitness over agents that took at least one step.
    pub mean: f32,
    /// Lowest fitness over agents that took at least one step.
    pub worst: f32,
    /// Agents that never stepped and were scored with the sentinel.
    pub unscored: usize,
}

impl GenerationStats {
    /// Summarizes a generation's fitness values.
    ///
    /// Sentinel scores (`f32::NEG_INFINITY`) are counted in `unscored` and left
    /// out of `mean` and `worst`. If every agent is unscored all three figures
    /// are the sentinel.
    pub fn from_fitness(generation: u32, fitness: &[f32]) -> Self {
        let scored: Vec<f32> = fitness.iter().copied().filter(|f| f.is_finite()).collect();
        let unscored = fitness.len() - scored.len();

        if scored.is_empty() {
            return Self {
                generation,
                best: f32::NEG_INFINITY,
                mean: f32::NEG_INFINITY,
                worst: f32::NEG_INFINITY,
                unscored,
            };
        }

        Self {
            generation,
            best: scored.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            mean: scored.iter().sum::<f32>() / scored.len() as f32,
            worst: scored.iter().copied().fold(f32::INFINITY, f32::min),
            unscored,
        }
    }
}

/// Bounded history of generation summaries, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessHistory {
    /// Recent generation summaries.
    pub records: VecDeque<GenerationStats>,
    /// Maximum number of summaries to keep.
    pub max_history: usize,
}

impl Default for FitnessHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl FitnessHistory {
    /// Creates an empty history holding at most `max_history` entries.
    pub fn new(max_history: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Records a summary, dropping the oldest one when full.
    pub fn record(&mut self, stats: GenerationStats) {
        if self.max_history == 0 {
            return;
        }
        self.records.push_back(stats);
        if self.records.len() > self.max_history {
            self.records.pop_front();
        }
    }

    /// Most recent summary.
    pub fn latest(&self) -> Option<&GenerationStats> {
        self.records.back()
    }

    /// Best fitness seen across the retained history.
    pub fn best_ever(&self) -> Option<f32> {
        self.records
            .iter()
            .map(|s| s.best)
            .max_by(f32::total_cmp)
    }

    /// Number of summaries retained.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no generation has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use super::*;

    #[test]
    fn sentinel_scores_are_counted_separately() {
        let stats = GenerationStats::from_fitness(3, &[-1.0, -3.0, f32::NEG_INFINITY]);
        assert_eq!(stats.generation, 3);
        assert_eq!(stats.best, -1.0);
        assert_eq!(stats.worst, -3.0);
        assert_eq!(stats.mean, -2.0);
        assert_eq!(stats.unscored, 1);
    }

    #[test]
    fn history_is_bounded() {
        let mut history = FitnessHistory::new(2);
        for generation in 0..5 {
            history.record(GenerationStats::from_fitness(generation, &[generation as f32]));
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().map(|s| s.generation), Some(4));
        assert_eq!(history.best_ever(), Some(4.0));
    }
}
