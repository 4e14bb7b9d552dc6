/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides parameter and builder types for configuring the product recolorization kernel.
//
// Created on: 15 Nov 2025     Author: Daniel Owen 
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License. 
//
/////////////////////////////////////////////////////////////////////////////////////////////

use serde::{Deserialize, Serialize};
use crate::{
    constants::{DEFAULT_P, DEFAULT_SIG1, DEFAULT_SIG2},
    utils::KernelType,
};

/// Defines the [`KernelType`] to use, along with the bandwidths of the spatial
/// and intensity factors of the product kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelParams {
    /// KernelType enum variant to use for both factors.
    pub kernel_type: KernelType,

    /// Spatial bandwidth. Pixel distances are divided by `sig1` times the image
    /// diagonal, so the same value behaves alike across image sizes.
    pub sig1: f64,

    /// Intensity bandwidth. Intensity differences raised to `p` are divided by
    /// `sig2 * 255^p`.
    pub sig2: f64,

    /// Exponent applied to the absolute greyscale difference.
    pub p: f64,
}

impl KernelParams {
    /// Begins building a [`KernelParams`] instance for the given kernel type.
    pub fn builder(kernel_type: KernelType) -> KernelParamsBuilder {
        KernelParamsBuilder {
            kernel_type,
            sig1: DEFAULT_SIG1,
            sig2: DEFAULT_SIG2,
            p: DEFAULT_P,
        }
    }
}

/// Builder for [`KernelParams`].
///
/// No range checks happen here; the recolorization engine validates the
/// finished parameters and reports out-of-domain values as errors.
#[derive(Debug, Clone, Copy)]
pub struct KernelParamsBuilder {
    kernel_type: KernelType,
    sig1: f64,
    sig2: f64,
    p: f64,
}

impl KernelParamsBuilder {
    /// Sets the spatial bandwidth.
    pub fn sig1(mut self, v: f64) -> Self {
        self.sig1 = v;
        self
    }

    /// Sets the intensity bandwidth.
    pub fn sig2(mut self, v: f64) -> Self {
        self.sig2 = v;
        self
    }

    /// Sets the intensity-difference exponent.
    pub fn p(mut self, v: f64) -> Self {
        self.p = v;
        self
    }

    /// Finalises the builder into a [`KernelParams`] value.
    pub fn build(self) -> KernelParams {
        KernelParams {
            kernel_type: self.kernel_type,
            sig1: self.sig1,
            sig2: self.sig2,
            p: self.p,
        }
    }
}
