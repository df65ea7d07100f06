//! Fixed-topology feedforward network used as an agent brain.
//!
//! One hidden layer, no bias terms, `tanh` on both the hidden and the output
//! sums. Weights are stored as `input × hidden` and `hidden × output` so that
//! `hidden[h] = tanh(Σ_i input[i] · w1[i, h])`.

use ndarray::{Array1, Array2, ArrayView1};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::{Result, SteerError};

/// Feedforward network with a single hidden layer.
///
/// The topology is fixed at construction. Evaluation never mutates the
/// network, and mutation always produces a new instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralNetwork {
    input_count: usize,
    hidden_count: usize,
    output_count: usize,
    /// Input → hidden weights (`input_count` × `hidden_count`).
    w1: Array2<f32>,
    /// Hidden → output weights (`hidden_count` × `output_count`).
    w2: Array2<f32>,
}

impl NeuralNetwork {
    /// Creates a network with weights drawn uniformly from `[-1, 1]` using the
    /// thread-local generator.
    pub fn new(input_count: usize, hidden_count: usize, output_count: usize) -> Result<Self> {
        check_topology(input_count, hidden_count, output_count)?;
        Ok(Self {
            input_count,
            hidden_count,
            output_count,
            w1: Array2::random((input_count, hidden_count), Uniform::new_inclusive(-1.0, 1.0)),
            w2: Array2::random((hidden_count, output_count), Uniform::new_inclusive(-1.0, 1.0)),
        })
    }

    /// Creates a network with weights drawn uniformly from `[-1, 1]` using `rng`.
    ///
    /// Weights are drawn row-major, input layer first, so a seeded generator
    /// always reproduces the same network.
    pub fn with_rng<R: Rng>(
        input_count: usize,
        hidden_count: usize,
        output_count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        check_topology(input_count, hidden_count, output_count)?;

        let w1 = Array2::from_shape_fn((input_count, hidden_count), |_| {
            rng.random_range(-1.0..=1.0)
        });
        let w2 = Array2::from_shape_fn((hidden_count, output_count), |_| {
            rng.random_range(-1.0..=1.0)
        });

        Ok(Self {
            input_count,
            hidden_count,
            output_count,
            w1,
            w2,
        })
    }

    /// Builds a network from explicit weight matrices.
    ///
    /// `w1` must be `input × hidden` and `w2` must be `hidden × output`.
    pub fn from_weights(w1: Array2<f32>, w2: Array2<f32>) -> Result<Self> {
        let (input_count, hidden_count) = w1.dim();
        let (w2_rows, output_count) = w2.dim();
        if w2_rows != hidden_count {
            return Err(SteerError::InvalidConfig(format!(
                "hidden layer mismatch: w1 has {hidden_count} columns, w2 has {w2_rows} rows"
            )));
        }
        check_topology(input_count, hidden_count, output_count)?;

        Ok(Self {
            input_count,
            hidden_count,
            output_count,
            w1,
            w2,
        })
    }

    /// Runs a forward pass.
    ///
    /// Fails if `input` does not have exactly `input_count` elements; the
    /// vector is never truncated or padded.
    pub fn forward(&self, input: &Array1<f32>) -> Result<Array1<f32>> {
        if input.len() != self.input_count {
            return Err(SteerError::InputLength {
                expected: self.input_count,
                actual: input.len(),
            });
        }
        Ok(self.evaluate(input.view()))
    }

    /// Forward pass without the length check. Callers guarantee the length.
    #[inline]
    pub(crate) fn evaluate(&self, input: ArrayView1<'_, f32>) -> Array1<f32> {
        debug_assert_eq!(input.len(), self.input_count);
        let hidden = input.dot(&self.w1).mapv_into(f32::tanh);
        hidden.dot(&self.w2).mapv_into(f32::tanh)
    }

    /// Returns a copy of this network with every weight perturbed by an
    /// independent uniform sample from `[-range, range]`.
    ///
    /// `self` is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if `range` is negative or not finite.
    pub fn mutated<R: Rng>(&self, range: f32, rng: &mut R) -> Self {
        assert!(
            range.is_finite() && range >= 0.0,
            "mutation range must be finite and non-negative, got {range}"
        );

        let mut child = self.clone();
        child.w1.mapv_inplace(|w| w + rng.random_range(-range..=range));
        child.w2.mapv_inplace(|w| w + rng.random_range(-range..=range));
        child
    }

    /// Number of inputs the network expects.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Number of hidden units.
    pub fn hidden_count(&self) -> usize {
        self.hidden_count
    }

    /// Number of outputs produced.
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Input → hidden weight matrix.
    pub fn input_weights(&self) -> &Array2<f32> {
        &self.w1
    }

    /// Hidden → output weight matrix.
    pub fn output_weights(&self) -> &Array2<f32> {
        &self.w2
    }

    /// Flattens all weights into a single vector, input layer first.
    pub fn to_flat_vector(&self) -> Vec<f32> {
        self.w1.iter().chain(self.w2.iter()).copied().collect()
    }
}

fn check_topology(input_count: usize, hidden_count: usize, output_count: usize) -> Result<()> {
    if input_count == 0 || hidden_count == 0 || output_count == 0 {
        return Err(SteerError::InvalidConfig(format!(
            "network layers must be non-empty, got {input_count}-{hidden_count}-{output_count}"
        )));
    }
    Ok(())
}
