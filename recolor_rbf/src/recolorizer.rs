/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the recolorization engine that fits kernel coefficients and evaluates the full grid.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    config::{EvaluationMode, Params},
    evaluation::{GridEvaluator, quantize},
    greyscale::GreyscaleMap,
    interpolant_config::KernelSettings,
    linalg::CoefficientSolver,
    progress::{CancelFlag, ProgressMsg, ProgressSink},
    samples::SampleSet,
};
use faer::Mat;
use image::RgbImage;
use recolor_rbf_utils::{KernelParams, get_kernel_matrix_symmetric};
use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, info, info_span};

const F64_BYTES: usize = std::mem::size_of::<f64>();

/// Errors reported by a recolorization.
///
/// Every check on the inputs happens before any kernel matrix is allocated.
#[derive(Debug, Clone, PartialEq)]
pub enum RecolorError {
    /// Inputs or parameters lie outside their valid domain.
    InvalidInput { reason: String },

    /// The regularized training system could not be solved.
    Numerical {
        num_samples: usize,
        delta: f64,
        reason: String,
    },

    /// A kernel matrix would exceed the configured memory budget.
    Resource {
        requested_bytes: usize,
        budget_bytes: usize,
    },

    /// A dedicated worker pool could not be created.
    ThreadPool { reason: String },

    /// The cancel flag was observed during evaluation.
    Cancelled,
}

impl RecolorError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        RecolorError::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RecolorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecolorError::InvalidInput { reason } => write!(f, "invalid input: {}", reason),
            RecolorError::Numerical {
                num_samples,
                delta,
                reason,
            } => write!(
                f,
                "solving for {} colorpoints with delta = {:e} failed: {}",
                num_samples, delta, reason
            ),
            RecolorError::Resource {
                requested_bytes,
                budget_bytes,
            } => write!(
                f,
                "kernel matrix needs {} bytes, exceeding the budget of {} bytes",
                requested_bytes, budget_bytes
            ),
            RecolorError::ThreadPool { reason } => {
                write!(f, "building the worker pool failed: {}", reason)
            }
            RecolorError::Cancelled => write!(f, "recolorization was cancelled"),
        }
    }
}

impl std::error::Error for RecolorError {}

/// Result of a successful recolorization.
#[derive(Debug, Clone)]
pub struct Recolorization {
    /// Recolored image with the same dimensions as the greyscale input.
    pub image: RgbImage,

    /// Wall time spent building the evaluation kernel matrix and predicting,
    /// excluding the coefficient solve and the final clip.
    pub evaluation_time: Duration,

    /// `N x 3` solved coefficients, one row per colorpoint.
    pub coefficients: Mat<f64>,
}

/// A convenience builder for constructing a [`Recolorizer`].
///
/// The builder should be called via the [`Recolorizer::builder`] method.
pub struct RecolorizerBuilder {
    settings: KernelSettings,
    params: Params,
    progress_callback: Option<Arc<dyn ProgressSink>>,
    cancel: Option<CancelFlag>,
}

impl RecolorizerBuilder {
    fn new(settings: KernelSettings) -> Self {
        Self {
            settings,
            params: Params::default(),
            progress_callback: None,
            cancel: None,
        }
    }

    /// Sets custom evaluation and resource parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Optional sink for evaluation progress and the final timing message.
    pub fn progress_callback(mut self, progress_callback: Arc<dyn ProgressSink>) -> Self {
        self.progress_callback = Some(progress_callback);
        self
    }

    /// Flag checked between evaluation blocks.
    pub fn cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Builds and returns the configured [`Recolorizer`].
    pub fn build(self) -> Recolorizer {
        Recolorizer {
            settings: self.settings,
            params: self.params,
            progress_callback: self.progress_callback,
            cancel: self.cancel,
        }
    }
}

/// Recolors greyscale images from sparse colorpoints.
///
/// The pipeline is linear: validate, build the training kernel matrix, solve
/// for coefficients, evaluate every pixel, clip. Any failure aborts the call.
///
/// # Example
/// ```
/// use recolor_rbf::{
///     ColorSample, GreyscaleMap, Recolorizer, SampleSet,
///     interpolant_config::{KernelSettings, KernelType},
/// };
///
/// let greyscale = GreyscaleMap::new(10, 10, vec![128; 100]).unwrap();
/// let samples = SampleSet::new(vec![ColorSample::new(5, 5, [200, 50, 10])]);
///
/// let settings = KernelSettings::builder(KernelType::Gaussian).build();
/// let result = Recolorizer::builder(settings)
///     .build()
///     .recolorize(&samples, &greyscale)
///     .unwrap();
///
/// assert_eq!(result.image.dimensions(), (10, 10));
/// ```
#[derive(Debug)]
pub struct Recolorizer {
    settings: KernelSettings,
    params: Params,
    progress_callback: Option<Arc<dyn ProgressSink>>,
    cancel: Option<CancelFlag>,
}

impl Recolorizer {
    /// Returns a new [`RecolorizerBuilder`] with default [`Params`].
    pub fn builder(settings: KernelSettings) -> RecolorizerBuilder {
        RecolorizerBuilder::new(settings)
    }

    pub fn settings(&self) -> &KernelSettings {
        &self.settings
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Recolors `greyscale` from the known colors in `samples`.
    ///
    /// # Errors
    /// - [`RecolorError::InvalidInput`] for an empty sample set, samples outside
    ///   the grid, or out-of-domain settings and params.
    /// - [`RecolorError::Resource`] if a kernel matrix would exceed the budget.
    /// - [`RecolorError::Numerical`] if the training system cannot be solved.
    /// - [`RecolorError::ThreadPool`] if a fixed worker count was requested and
    ///   the pool could not be built.
    /// - [`RecolorError::Cancelled`] if the cancel flag was raised.
    pub fn recolorize(
        &self,
        samples: &SampleSet,
        greyscale: &GreyscaleMap,
    ) -> Result<Recolorization, RecolorError> {
        let (height, width) = greyscale.shape();
        let num_samples = samples.len();

        let _span = info_span!("recolorize", height, width, num_samples).entered();
        let total_start = Instant::now();

        self.validate(samples, greyscale)?;

        info!(
            kernel = %self.settings.kernel_type,
            sig1 = self.settings.sig1,
            sig2 = self.settings.sig2,
            p = self.settings.p,
            delta = self.settings.delta,
            mode = ?self.params.mode,
            "recolorizing {} x {} image from {} colorpoints",
            height,
            width,
            num_samples
        );

        let kernel_params: KernelParams = self.settings.into();
        let sources = greyscale.features(samples.positions());

        let k_d = get_kernel_matrix_symmetric(&sources, &kernel_params, greyscale.shape());
        debug!("built {} x {} training kernel matrix", num_samples, num_samples);

        let coefficients = CoefficientSolver::new(self.settings.delta)
            .solve(k_d.as_ref(), samples.colors_matrix().as_ref())?;
        drop(k_d);
        debug!("solved coefficients");

        let evaluator = GridEvaluator::new(
            greyscale,
            &sources,
            coefficients.as_ref(),
            kernel_params,
            &self.params,
        )?
        .cancel_flag(self.cancel.as_ref())
        .progress_callback(self.progress_callback.as_ref());

        let (predictions, evaluation_time) = match self.params.num_threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| RecolorError::ThreadPool {
                        reason: e.to_string(),
                    })?;
                pool.install(|| timed(|| evaluator.predict()))
            }
            None => timed(|| evaluator.predict()),
        };
        let predictions = predictions?;
        debug!(?evaluation_time, "evaluated {} pixels", predictions.len());

        let image = quantize(&predictions, height, width);

        let total_time = total_start.elapsed();
        info!(?total_time, ?evaluation_time, "recolorization finished");

        if let Some(sink) = &self.progress_callback {
            let msg = format!(
                "Took {:?} to recolorize a {} x {} image from {} colorpoints \
                ({:?} evaluating) using the following settings:\n\
                Kernel: {}, sig1: {}, sig2: {}, p: {}, delta: {}",
                total_time,
                height,
                width,
                num_samples,
                evaluation_time,
                self.settings.kernel_type,
                self.settings.sig1,
                self.settings.sig2,
                self.settings.p,
                self.settings.delta,
            );

            sink.emit(ProgressMsg::Message { message: msg });
        }

        Ok(Recolorization {
            image,
            evaluation_time,
            coefficients,
        })
    }

    /// Checks all inputs and the memory budget before any matrix is built.
    fn validate(&self, samples: &SampleSet, greyscale: &GreyscaleMap) -> Result<(), RecolorError> {
        self.settings.validate().map_err(RecolorError::invalid)?;

        if self.params.eval_chunk_size == 0 {
            return Err(RecolorError::invalid("eval_chunk_size must be at least 1"));
        }
        if self.params.num_threads == Some(0) {
            return Err(RecolorError::invalid("num_threads must be at least 1"));
        }

        if samples.is_empty() {
            return Err(RecolorError::invalid("at least one colorpoint is required"));
        }

        let (height, width) = greyscale.shape();
        if let Some(s) = samples.first_out_of_bounds(height, width) {
            return Err(RecolorError::invalid(format!(
                "colorpoint ({}, {}) lies outside the {} x {} image",
                s.row, s.col, height, width
            )));
        }

        let n = samples.len();
        let budget = self.params.max_kernel_matrix_bytes;

        let training_bytes = matrix_bytes(&[n, n]);
        check_budget(training_bytes, budget)?;

        let num_pixels = greyscale.num_pixels();
        let block_rows = self.params.eval_chunk_size.min(num_pixels);
        let blocks_bytes = matrix_bytes(&[block_rows, n, self.params.worker_count()]);
        let evaluation_bytes = match self.params.mode {
            EvaluationMode::Blocked => blocks_bytes,
            EvaluationMode::Dense => {
                matrix_bytes(&[num_pixels, n]).and_then(|full| full.checked_add(blocks_bytes?))
            }
        };
        check_budget(evaluation_bytes, budget)?;

        Ok(())
    }
}

/// Recolors `greyscale` with default [`Params`].
///
/// Shorthand for `Recolorizer::builder(settings).build().recolorize(samples, greyscale)`.
pub fn recolorize(
    samples: &SampleSet,
    greyscale: &GreyscaleMap,
    settings: KernelSettings,
) -> Result<Recolorization, RecolorError> {
    Recolorizer::builder(settings)
        .build()
        .recolorize(samples, greyscale)
}

/// Bytes for a matrix of `f64` whose element count is the product of `dims`,
/// or `None` on overflow.
fn matrix_bytes(dims: &[usize]) -> Option<usize> {
    dims.iter()
        .try_fold(F64_BYTES, |acc, &d| acc.checked_mul(d))
}

fn check_budget(requested: Option<usize>, budget: usize) -> Result<(), RecolorError> {
    let requested_bytes = requested.unwrap_or(usize::MAX);
    if requested_bytes > budget {
        return Err(RecolorError::Resource {
            requested_bytes,
            budget_bytes: budget,
        });
    }
    Ok(())
}

fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let out = f();
    (out, start.elapsed())
}
