/////////////////////////////////////////////////////////////////////////////////////////////
//
// Specifies kernel profile, bandwidth, exponent, and regularization options for recolorization.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Specifies kernel profile, bandwidth, exponent, and regularization options for recolorization.
use recolor_rbf_utils::{DEFAULT_DELTA, DEFAULT_P, DEFAULT_SIG1, DEFAULT_SIG2, KernelParams};
use serde::{Deserialize, Serialize};

pub use recolor_rbf_utils::KernelType;

/// A convenience builder for constructing a [`KernelSettings`] instance.
///
/// The builder should be called via the [`KernelSettings::builder`] method.
///
/// See [`KernelSettings`] for details on each field.
#[derive(Debug, Clone, Copy)]
pub struct KernelSettingsBuilder {
    pub kernel_type: KernelType,
    pub sig1: f64,
    pub sig2: f64,
    pub p: f64,
    pub delta: f64,
}

impl KernelSettingsBuilder {
    /// Creates a new instance of the [`KernelSettingsBuilder`].
    fn new(kernel_type: KernelType) -> Self {
        Self {
            kernel_type,
            sig1: DEFAULT_SIG1,
            sig2: DEFAULT_SIG2,
            p: DEFAULT_P,
            delta: DEFAULT_DELTA,
        }
    }

    /// Sets the spatial bandwidth.
    pub fn sig1(mut self, sig1: f64) -> Self {
        self.sig1 = sig1;
        self
    }

    /// Sets the intensity bandwidth.
    pub fn sig2(mut self, sig2: f64) -> Self {
        self.sig2 = sig2;
        self
    }

    /// Sets the exponent applied to the intensity difference.
    pub fn p(mut self, p: f64) -> Self {
        self.p = p;
        self
    }

    /// Sets the Tikhonov regularization weight.
    pub fn delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Builds and returns an instance of [`KernelSettings`] from the values
    /// defined in the builder.
    pub fn build(self) -> KernelSettings {
        KernelSettings {
            kernel_type: self.kernel_type,
            sig1: self.sig1,
            sig2: self.sig2,
            p: self.p,
            delta: self.delta,
        }
    }
}

/// Kernel and regularization settings for a single recolorization.
///
/// # Defaults
/// - `sig1`: `100.0`
/// - `sig2`: `100.0`
/// - `p`: `0.5`
/// - `delta`: `2e-4`
///
/// Values are not clamped. Out-of-domain values are reported by the engine as
/// [`RecolorError::InvalidInput`](crate::RecolorError::InvalidInput).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelSettings {
    /// Radial profile shared by the spatial and intensity factors.
    pub kernel_type: KernelType,

    /// Spatial bandwidth, relative to the image diagonal. Must be positive.
    ///
    /// Large values let every sample influence the whole image. Small values
    /// keep colors local to where they were placed.
    pub sig1: f64,

    /// Intensity bandwidth, relative to `255^p`. Must be positive.
    ///
    /// Small values stop colors bleeding across edges in the greyscale image.
    pub sig2: f64,

    /// Exponent on the absolute greyscale difference, in `(0, 2]`.
    pub p: f64,

    /// Regularization weight. The system solved is `(K + delta * N * I) a = F`,
    /// so a value of `0.0` requests exact interpolation of the samples.
    ///
    /// Any positive value makes the system positive definite in exact
    /// arithmetic. In `f64` the shift `delta * N` must still survive being
    /// added to the unit diagonal: with duplicated colorpoints, values below
    /// roughly `1e-16 / N` vanish in rounding and the solve reports
    /// [`RecolorError::Numerical`](crate::RecolorError::Numerical).
    pub delta: f64,
}

impl KernelSettings {
    /// Returns a new [`KernelSettingsBuilder`] for the given kernel type.
    pub fn builder(kernel_type: KernelType) -> KernelSettingsBuilder {
        KernelSettingsBuilder::new(kernel_type)
    }

    /// Checks every field against its domain, returning a description of the
    /// first violation.
    pub(crate) fn validate(&self) -> Result<(), String> {
        let finite = [
            ("sig1", self.sig1),
            ("sig2", self.sig2),
            ("p", self.p),
            ("delta", self.delta),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}"));
            }
        }

        if self.sig1 <= 0.0 {
            return Err(format!("sig1 must be positive, got {}", self.sig1));
        }
        if self.sig2 <= 0.0 {
            return Err(format!("sig2 must be positive, got {}", self.sig2));
        }
        if self.p <= 0.0 || self.p > 2.0 {
            return Err(format!("p must lie in (0, 2], got {}", self.p));
        }
        if self.delta < 0.0 {
            return Err(format!("delta must be non-negative, got {}", self.delta));
        }

        Ok(())
    }
}

impl Default for KernelSettings {
    fn default() -> Self {
        KernelSettings::builder(KernelType::Gaussian).build()
    }
}

impl From<KernelSettings> for KernelParams {
    /// Converts a [`KernelSettings`] instance into a
    /// [`recolor_rbf_utils::KernelParams`].
    ///
    /// The regularization weight is dropped; it only enters the solve.
    fn from(v: KernelSettings) -> Self {
        KernelParams::builder(v.kernel_type)
            .sig1(v.sig1)
            .sig2(v.sig2)
            .p(v.p)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let settings = KernelSettings::builder(KernelType::Wendland).build();
        assert_eq!(settings.kernel_type, KernelType::Wendland);
        assert_eq!(settings.sig1, 100.0);
        assert_eq!(settings.sig2, 100.0);
        assert_eq!(settings.p, 0.5);
        assert_eq!(settings.delta, 2e-4);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn conversion_keeps_kernel_fields() {
        let settings = KernelSettings::builder(KernelType::Gaussian)
            .sig1(0.3)
            .sig2(0.7)
            .p(1.5)
            .delta(0.0)
            .build();
        let params: KernelParams = settings.into();
        assert_eq!(params.kernel_type, KernelType::Gaussian);
        assert_eq!(params.sig1, 0.3);
        assert_eq!(params.sig2, 0.7);
        assert_eq!(params.p, 1.5);
    }

    #[test]
    fn validation_rejects_out_of_domain_values() {
        let base = KernelSettings::builder(KernelType::Gaussian);

        assert!(base.sig1(0.0).build().validate().is_err());
        assert!(base.sig1(-1.0).build().validate().is_err());
        assert!(base.sig2(0.0).build().validate().is_err());
        assert!(base.p(0.0).build().validate().is_err());
        assert!(base.p(2.5).build().validate().is_err());
        assert!(base.delta(-1e-9).build().validate().is_err());
        assert!(base.sig1(f64::NAN).build().validate().is_err());
        assert!(base.delta(f64::INFINITY).build().validate().is_err());

        assert!(base.p(2.0).build().validate().is_ok());
        assert!(base.delta(0.0).build().validate().is_ok());
    }
}
