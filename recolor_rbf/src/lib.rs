/////////////////////////////////////////////////////////////////////////////////////////////
//
// Exposes the public API and high-level documentation for RBF image recolorization.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! # Recolorization of greyscale images with Radial Basis Functions (RBF).
//!
//! Given a greyscale image and a sparse set of pixels whose colors are known
//! ("colorpoints"), this crate reconstructs a full color image by kernel
//! regression. The kernel couples spatial proximity with greyscale similarity:
//!
//! `K(x, y) = phi(|x - y| / (sig1 * diag)) * phi(|g(x) - g(y)|^p / (sig2 * 255^p))`
//!
//! where `diag` is the image diagonal and `phi` is either a Gaussian or a
//! compactly supported Wendland profile. Coefficients are found by solving
//! `(K_D + delta * N * I) a = F` with a Cholesky factorisation, and every pixel
//! is then predicted as `K_omega * a`, clipped to `[0, 255]`.
//!
//! Evaluation over the grid is split into blocks of pixels processed in
//! parallel with [`rayon`], and is bitwise reproducible for any thread count
//! or block size.
//!
//! # Features
//! - Gaussian and Wendland radial profiles
//! - Streaming (blocked) or fully materialized evaluation with a memory budget
//! - Progress reporting and cooperative cancellation
//! - Greyscale conversion, uniform and random colorpoint selection and CSV
//!   sample I/O helpers
//! - Built on [`faer`](https://docs.rs/faer/latest/faer/) for linear algebra
//!
//! # Examples
//!
//! ```
//! use recolor_rbf::{
//!     GreyscaleMap, GreyscaleMethod, RecolorTestImages, SampleSet,
//!     interpolant_config::{KernelSettings, KernelType},
//!     random_positions, recolorize,
//! };
//!
//! // A synthetic color image stands in for a photograph.
//! let original = RecolorTestImages::gradient(24, 32);
//! let greyscale = GreyscaleMap::from_rgb_image(&original, GreyscaleMethod::Perceptual).unwrap();
//!
//! // Keep the colors of 40 random pixels.
//! let positions = random_positions(24, 32, 40, Some(42)).unwrap();
//! let samples = SampleSet::from_image(&original, &positions).unwrap();
//!
//! let settings = KernelSettings::builder(KernelType::Gaussian)
//!     .sig1(0.2)
//!     .sig2(1.0)
//!     .build();
//!
//! let result = recolorize(&samples, &greyscale, settings).unwrap();
//! assert_eq!(result.image.dimensions(), original.dimensions());
//! ```
pub mod interpolant_config;

pub mod config;

pub mod progress;

mod greyscale;

mod samples;

mod linalg;

mod evaluation;

mod recolorizer;

mod recolor_test_functions;

pub use {
    evaluation::{GridEvaluator, clip_channel, quantize},
    greyscale::{GreyscaleMap, GreyscaleMethod},
    linalg::CoefficientSolver,
    recolor_test_functions::RecolorTestImages,
    recolorizer::{
        RecolorError, Recolorization, Recolorizer, RecolorizerBuilder, recolorize,
    },
    samples::{ColorSample, SampleSet, random_positions, uniform_positions},
};
