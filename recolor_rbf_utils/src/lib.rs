/////////////////////////////////////////////////////////////////////////////////////////////
//
// Re-exports kernel profiles, kernel parameters, and kernel-matrix builders used by recolor_rbf.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Utilities for the `recolor_rbf` crate
//!
//! Holds the radial profiles (Gaussian and Wendland), the product kernel that couples
//! spatial distance with greyscale intensity difference, and the dense kernel-matrix
//! builders used both for the training system and for grid evaluation.
mod constants;
mod rbf_kernels;
mod traits;
mod utils;
mod kernel_helpers;

/// Implemented kernels for use in the `recolor_rbf` crate.
pub mod kernels {
    pub use super::rbf_kernels::*;
}

pub use {
    constants::{DEFAULT_DELTA, DEFAULT_P, DEFAULT_SIG1, DEFAULT_SIG2, MAX_INTENSITY},
    kernel_helpers::{KernelParams, KernelParamsBuilder},
    utils::{
        KernelType, PixelFeature, get_distance, get_kernel_matrix, get_kernel_matrix_symmetric,
        get_kernel_matrix_symmetric_typed, get_kernel_matrix_typed, image_diagonal, kernel_phi,
        kernel_phi_slice,
    },
    traits::{KernelFromParams, KernelFunction, RadialProfile},
};
