/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines intensity normalisation and default kernel parameter constants.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

/// Largest 8-bit greyscale intensity. Intensity differences are normalised by
/// `MAX_INTENSITY^p`.
pub const MAX_INTENSITY: f64 = 255.0;

/// Default spatial bandwidth, relative to the image diagonal.
pub const DEFAULT_SIG1: f64 = 100.0;

/// Default intensity bandwidth.
pub const DEFAULT_SIG2: f64 = 100.0;

/// Default exponent applied to the absolute intensity difference.
pub const DEFAULT_P: f64 = 0.5;

/// Default ridge regularisation weight. Scaled by the sample count in the solve.
pub const DEFAULT_DELTA: f64 = 2e-4;
