/////////////////////////////////////////////////////////////////////////////////////////////
//
// Declares traits for radial profiles, pairwise kernels, and shared kernel parameter sets.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{kernel_helpers::KernelParams, utils::PixelFeature};

/// Converts a shared [`KernelParams`] configuration into a concrete profile type.
pub trait KernelFromParams: Sized {
    /// Constructs `Self` from a set of uniform kernel parameters.
    fn from_params(p: &KernelParams) -> Self;
}

/// A radial profile `phi(r)` evaluated on non-negative, already normalised distances.
pub trait RadialProfile {
    fn phi(&self, r: f64) -> f64;

    /// Elementwise evaluation. The output has the same length as `r`.
    fn phi_slice(&self, r: &[f64]) -> Vec<f64> {
        r.iter().map(|&ri| self.phi(ri)).collect()
    }
}

/// Evaluates a kernel between a target and a source pixel.
pub trait KernelFunction {
    fn evaluate(&self, target: &PixelFeature, source: &PixelFeature) -> f64;
}
