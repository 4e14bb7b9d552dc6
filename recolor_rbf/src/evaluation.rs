/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements block-parallel evaluation of the fitted kernel model over every pixel of the grid.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # evaluation
//!
//! Computes `F = K_omega * a` for every pixel, where `K_omega` pairs each pixel
//! with each sample. Rows of `K_omega` are produced in blocks of
//! `eval_chunk_size` pixels and blocks are processed in parallel.
//!
//! Every pixel's channel values are accumulated sample by sample in a fixed
//! order, so the output does not depend on the block size, the evaluation mode
//! or the number of worker threads.

use crate::{
    config::{EvaluationMode, Params},
    greyscale::GreyscaleMap,
    progress::{CancelFlag, ProgressMsg, ProgressSink, progress_fraction},
    recolorizer::RecolorError,
};
use faer::{Mat, MatRef};
use image::{Rgb, RgbImage};
use rayon::prelude::*;
use recolor_rbf_utils::{KernelParams, PixelFeature, get_kernel_matrix};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// Applies solved coefficients to every pixel of a greyscale grid.
pub struct GridEvaluator<'a> {
    greyscale: &'a GreyscaleMap,
    sources: &'a [PixelFeature],
    coefficients: MatRef<'a, f64>,
    kernel_params: KernelParams,
    mode: EvaluationMode,
    eval_chunk_size: usize,
    batch_blocks: usize,
    cancel: Option<&'a CancelFlag>,
    progress_callback: Option<&'a Arc<dyn ProgressSink>>,
}

impl<'a> GridEvaluator<'a> {
    /// # Arguments
    /// * `greyscale` - Grid to evaluate; also supplies every pixel's intensity.
    /// * `sources` - Sample features, in the row order of `coefficients`.
    /// * `coefficients` - `N x 3` solved coefficients.
    /// * `kernel_params` - Kernel used to build the training matrix.
    /// * `params` - Evaluation mode and block size.
    ///
    /// # Errors
    /// [`RecolorError::InvalidInput`] if `coefficients` is not `sources.len() x 3`.
    pub fn new(
        greyscale: &'a GreyscaleMap,
        sources: &'a [PixelFeature],
        coefficients: MatRef<'a, f64>,
        kernel_params: KernelParams,
        params: &Params,
    ) -> Result<Self, RecolorError> {
        if coefficients.nrows() != sources.len() || coefficients.ncols() != 3 {
            return Err(RecolorError::invalid(format!(
                "coefficients are {} x {}, expected {} x 3",
                coefficients.nrows(),
                coefficients.ncols(),
                sources.len()
            )));
        }

        Ok(Self {
            greyscale,
            sources,
            coefficients,
            kernel_params,
            mode: params.mode,
            eval_chunk_size: params.eval_chunk_size.max(1),
            batch_blocks: params.worker_count(),
            cancel: None,
            progress_callback: None,
        })
    }

    /// Checks `cancel` between blocks.
    pub fn cancel_flag(mut self, cancel: Option<&'a CancelFlag>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reports [`ProgressMsg::EvaluationProgress`] after each block.
    pub fn progress_callback(mut self, progress_callback: Option<&'a Arc<dyn ProgressSink>>) -> Self {
        self.progress_callback = progress_callback;
        self
    }

    /// Unclipped predicted colors for every pixel in row-major order.
    ///
    /// Runs on the current rayon pool.
    ///
    /// # Errors
    /// [`RecolorError::Cancelled`] if the cancel flag is observed between blocks.
    pub fn predict(&self) -> Result<Vec<[f64; 3]>, RecolorError> {
        match self.mode {
            EvaluationMode::Blocked => self.predict_blocked(),
            EvaluationMode::Dense => self.predict_dense(),
        }
    }

    /// Predicts, then clips and quantizes to an RGB image.
    pub fn evaluate(&self) -> Result<RgbImage, RecolorError> {
        let predictions = self.predict()?;
        let (height, width) = self.greyscale.shape();
        Ok(quantize(&predictions, height, width))
    }

    fn block_starts(&self) -> Vec<usize> {
        (0..self.greyscale.num_pixels())
            .step_by(self.eval_chunk_size)
            .collect()
    }

    #[inline]
    fn block_len(&self, start: usize) -> usize {
        self.eval_chunk_size
            .min(self.greyscale.num_pixels() - start)
    }

    #[inline]
    fn check_cancelled(&self) -> Result<(), RecolorError> {
        match self.cancel {
            Some(flag) if flag.is_cancelled() => Err(RecolorError::Cancelled),
            _ => Ok(()),
        }
    }

    fn report(&self, completed: &AtomicUsize, block_len: usize) {
        if let Some(sink) = self.progress_callback {
            let total = self.greyscale.num_pixels();
            let done = completed.fetch_add(block_len, Ordering::Relaxed) + block_len;
            sink.emit(ProgressMsg::EvaluationProgress {
                completed_pixels: done,
                total_pixels: total,
                progress: progress_fraction(done, total),
            });
        }
    }

    /// Rows `start..start + len` of the evaluation kernel matrix.
    fn kernel_block(&self, start: usize, len: usize) -> Mat<f64> {
        let targets = self.greyscale.features_for_range(start, len);
        get_kernel_matrix(
            &targets,
            self.sources,
            &self.kernel_params,
            self.greyscale.shape(),
        )
    }

    fn predict_blocked(&self) -> Result<Vec<[f64; 3]>, RecolorError> {
        let completed = AtomicUsize::new(0);

        let blocks = self
            .block_starts()
            .into_par_iter()
            .map(|start| -> Result<Vec<[f64; 3]>, RecolorError> {
                self.check_cancelled()?;

                let len = self.block_len(start);
                let k_block = self.kernel_block(start, len);
                let predicted = predict_rows(k_block.as_ref(), self.coefficients);

                self.report(&completed, len);
                Ok(predicted)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(blocks.into_iter().flatten().collect())
    }

    fn predict_dense(&self) -> Result<Vec<[f64; 3]>, RecolorError> {
        let total = self.greyscale.num_pixels();
        let n = self.sources.len();
        let starts = self.block_starts();

        // Build the full matrix one batch of blocks at a time so only a bounded
        // number of blocks is held alongside it.
        let mut k_omega = Mat::<f64>::zeros(total, n);

        for batch in starts.chunks(self.batch_blocks.max(1)) {
            self.check_cancelled()?;

            let blocks: Vec<(usize, Mat<f64>)> = batch
                .par_iter()
                .map(|&start| (start, self.kernel_block(start, self.block_len(start))))
                .collect();

            for (start, block) in blocks {
                for j in 0..n {
                    for i in 0..block.nrows() {
                        k_omega[(start + i, j)] = block[(i, j)];
                    }
                }
            }
        }

        let completed = AtomicUsize::new(0);
        let k_omega = k_omega.as_ref();

        let blocks = starts
            .into_par_iter()
            .map(|start| -> Result<Vec<[f64; 3]>, RecolorError> {
                self.check_cancelled()?;

                let len = self.block_len(start);
                let rows = k_omega.subrows(start, len);
                let predicted = predict_rows(rows, self.coefficients);

                self.report(&completed, len);
                Ok(predicted)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(blocks.into_iter().flatten().collect())
    }
}

/// Multiplies kernel rows by the coefficient matrix, accumulating each pixel's
/// channels over the samples in index order.
fn predict_rows(k_rows: MatRef<'_, f64>, coefficients: MatRef<'_, f64>) -> Vec<[f64; 3]> {
    let n = k_rows.ncols();

    (0..k_rows.nrows())
        .map(|i| {
            let mut rgb = [0.0f64; 3];
            for j in 0..n {
                let k_ij = k_rows[(i, j)];
                for (c, value) in rgb.iter_mut().enumerate() {
                    *value += k_ij * coefficients[(j, c)];
                }
            }
            rgb
        })
        .collect()
}

/// Clips a predicted channel value to `[0, 255]` and floors it.
///
/// `NaN` maps to `0`.
#[inline]
pub fn clip_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 255.0).floor() as u8
}

/// Assembles row-major predictions into an `H x W` RGB image, clipping every channel.
pub fn quantize(predictions: &[[f64; 3]], height: usize, width: usize) -> RgbImage {
    debug_assert_eq!(predictions.len(), height * width);

    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let rgb = predictions[y as usize * width + x as usize];
        Rgb(rgb.map(clip_channel))
    })
}
