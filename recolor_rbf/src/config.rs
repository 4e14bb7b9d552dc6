/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares configuration types for grid evaluation, memory limits, and worker threads.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Declares configuration types for grid evaluation, memory limits, and worker threads.
use serde::{Deserialize, Serialize};

/// How the evaluation kernel matrix (all pixels against all samples) is held in memory.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Rows of the evaluation matrix are built and consumed one block at a time.
    /// Peak memory scales with the block size and the number of worker threads.
    Blocked,

    /// The full `(H * W) x N` evaluation matrix is materialized before prediction.
    Dense,
}

impl Default for EvaluationMode {
    fn default() -> Self {
        EvaluationMode::Blocked
    }
}

/// Engine parameters that affect performance and resource use but never the result.
///
/// ### Default Values
/// - `mode`: [`EvaluationMode::Blocked`]
/// - `eval_chunk_size`: `1024`
/// - `max_kernel_matrix_bytes`: `2 GiB`
/// - `num_threads`: `None` (the global rayon pool)
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Params {
    /// Evaluation matrix storage strategy.
    pub mode: EvaluationMode,

    /// Number of pixels evaluated in each block.
    pub eval_chunk_size: usize,

    /// Upper bound on the bytes any kernel matrix allocation may request.
    /// Checked before any matrix is built.
    pub max_kernel_matrix_bytes: usize,

    /// Fixed worker count for evaluation. `None` uses the global pool.
    pub num_threads: Option<usize>,
}

impl Params {
    /// Returns a new [`ParamsBuilder`] populated with defaults.
    pub fn builder() -> ParamsBuilder {
        ParamsBuilder::new()
    }

    /// Number of worker threads evaluation will run on.
    pub(crate) fn worker_count(&self) -> usize {
        self.num_threads
            .unwrap_or_else(rayon::current_num_threads)
            .max(1)
    }
}

impl Default for Params {
    fn default() -> Self {
        Params::builder().build()
    }
}

/// A convenience builder for constructing a [`Params`] instance.
///
/// The builder should be called via the [`Params::builder`] method.
///
/// See [`Params`] for details on each field.
#[derive(Debug, Clone, Copy)]
pub struct ParamsBuilder {
    pub mode: EvaluationMode,
    pub eval_chunk_size: usize,
    pub max_kernel_matrix_bytes: usize,
    pub num_threads: Option<usize>,
}

impl ParamsBuilder {
    /// Creates a new builder with default values.
    fn new() -> Self {
        Self {
            mode: EvaluationMode::default(),
            eval_chunk_size: 1024,
            max_kernel_matrix_bytes: 1 << 31,
            num_threads: None,
        }
    }

    /// Sets the evaluation mode.
    pub fn mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the number of pixels per evaluation block.
    pub fn eval_chunk_size(mut self, eval_chunk_size: usize) -> Self {
        self.eval_chunk_size = eval_chunk_size;
        self
    }

    /// Sets the kernel matrix memory budget in bytes.
    pub fn max_kernel_matrix_bytes(mut self, max_kernel_matrix_bytes: usize) -> Self {
        self.max_kernel_matrix_bytes = max_kernel_matrix_bytes;
        self
    }

    /// Runs evaluation on a dedicated pool of `num_threads` workers.
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Builds and returns a [`Params`] instance.
    pub fn build(self) -> Params {
        Params {
            mode: self.mode,
            eval_chunk_size: self.eval_chunk_size,
            max_kernel_matrix_bytes: self.max_kernel_matrix_bytes,
            num_threads: self.num_threads,
        }
    }
}
