/////////////////////////////////////////////////////////////////////////////////////////////
//
// Implements the radial profiles and the spatial-intensity product kernel.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{
    KernelFromParams, KernelFunction, KernelParams, RadialProfile,
    constants::MAX_INTENSITY,
    utils::{PixelFeature, get_distance, image_diagonal},
};

/// Gaussian profile with `phi(r) = exp(-r^2)`.
///
/// Strictly positive for every finite `r`, so the resulting kernel matrices are dense.
#[derive(Clone, Debug, Copy)]
pub struct GaussianKernel;

impl RadialProfile for GaussianKernel {
    #[inline(always)]
    fn phi(&self, r: f64) -> f64 {
        (-r * r).exp()
    }
}

impl KernelFromParams for GaussianKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Self {
        GaussianKernel
    }
}

/// Wendland profile with `phi(r) = (1 - r)_+^4 (4r + 1)`.
///
/// Compactly supported: `phi(r) = 0` for `r >= 1`.
#[derive(Clone, Debug, Copy)]
pub struct WendlandKernel;

impl RadialProfile for WendlandKernel {
    #[inline(always)]
    fn phi(&self, r: f64) -> f64 {
        let t = (1.0 - r).max(0.0);
        t.powi(4) * (4.0 * r + 1.0)
    }
}

impl KernelFromParams for WendlandKernel {
    #[inline(always)]
    fn from_params(_: &KernelParams) -> Self {
        WendlandKernel
    }
}

/// Product of a spatial and an intensity factor sharing one radial profile:
///
/// `K(x, y) = phi(|x - y| / (sig1 * diag)) * phi(|g(x) - g(y)|^p / (sig2 * 255^p))`
///
/// The normalisers are computed once from the grid shape so the training and
/// evaluation matrices of a single recolorization agree.
#[derive(Clone, Debug, Copy)]
pub struct ProductKernel<K: RadialProfile> {
    pub profile: K,

    // derived (computed once)
    spatial_scale: f64,   // sig1 * sqrt(H^2 + W^2)
    intensity_scale: f64, // sig2 * 255^p
    exponent: f64,
}

impl<K: RadialProfile> ProductKernel<K> {
    #[inline(always)]
    pub fn new(profile: K, params: &KernelParams, grid_shape: (usize, usize)) -> Self {
        let (height, width) = grid_shape;
        Self {
            profile,
            spatial_scale: params.sig1 * image_diagonal(height, width),
            intensity_scale: params.sig2 * MAX_INTENSITY.powf(params.p),
            exponent: params.p,
        }
    }

    /// Normalised spatial distance fed to the first factor.
    #[inline(always)]
    pub fn spatial_argument(&self, target: &PixelFeature, source: &PixelFeature) -> f64 {
        get_distance(target, source) / self.spatial_scale
    }

    /// Normalised intensity difference fed to the second factor.
    #[inline(always)]
    pub fn intensity_argument(&self, target: &PixelFeature, source: &PixelFeature) -> f64 {
        (target.intensity - source.intensity).abs().powf(self.exponent) / self.intensity_scale
    }
}

impl<K: RadialProfile> KernelFunction for ProductKernel<K> {
    #[inline(always)]
    fn evaluate(&self, target: &PixelFeature, source: &PixelFeature) -> f64 {
        self.profile.phi(self.spatial_argument(target, source))
            * self.profile.phi(self.intensity_argument(target, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::KernelType;

    fn radii() -> Vec<f64> {
        (0..=400).map(|i| i as f64 * 0.01).collect()
    }

    fn check_profile<K: RadialProfile>(profile: &K) {
        assert_eq!(profile.phi(0.0), 1.0);

        let values = profile.phi_slice(&radii());
        for pair in values.windows(2) {
            assert!(pair[1] <= pair[0], "profile increased: {} -> {}", pair[0], pair[1]);
        }
        assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn gaussian_is_one_at_origin_and_non_increasing() {
        check_profile(&GaussianKernel);
        assert!((GaussianKernel.phi(1.0) - (-1.0f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn gaussian_has_no_compact_support() {
        assert!(GaussianKernel.phi(1.0) > 0.0);
        assert!(GaussianKernel.phi(3.0) > 0.0);
    }

    #[test]
    fn wendland_is_one_at_origin_and_non_increasing() {
        check_profile(&WendlandKernel);
    }

    #[test]
    fn wendland_has_compact_support() {
        for r in [1.0, 1.0 + 1e-12, 1.5, 2.0, 100.0] {
            assert_eq!(WendlandKernel.phi(r), 0.0);
        }
        // phi(0.5) = 0.5^4 * 3
        assert!((WendlandKernel.phi(0.5) - 0.1875).abs() < 1e-15);
    }

    #[test]
    fn phi_slice_preserves_length() {
        let r = vec![0.0, 0.25, 0.5, 2.0];
        assert_eq!(GaussianKernel.phi_slice(&r).len(), r.len());
        assert_eq!(WendlandKernel.phi_slice(&r).len(), r.len());
        assert!(GaussianKernel.phi_slice(&[]).is_empty());
    }

    #[test]
    fn product_kernel_factors_multiply() {
        let params = KernelParams::builder(KernelType::Gaussian)
            .sig1(0.5)
            .sig2(2.0)
            .p(1.0)
            .build();
        let kernel = ProductKernel::new(GaussianKernel, &params, (6, 8));

        let a = PixelFeature::new(0, 0, 10);
        let b = PixelFeature::new(3, 4, 61);

        // distance 5 over diag 10, so the spatial argument is 5 / (0.5 * 10) = 1
        assert!((kernel.spatial_argument(&a, &b) - 1.0).abs() < 1e-15);
        // |10 - 61| / (2 * 255) = 0.1
        assert!((kernel.intensity_argument(&a, &b) - 0.1).abs() < 1e-15);

        let expected = (-1.0f64).exp() * (-0.01f64).exp();
        assert!((kernel.evaluate(&a, &b) - expected).abs() < 1e-15);
    }

    #[test]
    fn product_kernel_is_one_for_identical_pixels() {
        let params = KernelParams::builder(KernelType::Wendland).build();
        let kernel = ProductKernel::new(WendlandKernel, &params, (10, 10));
        let a = PixelFeature::new(4, 7, 200);
        assert_eq!(kernel.evaluate(&a, &a), 1.0);
    }

    #[test]
    fn either_factor_suppresses_the_pairing() {
        let params = KernelParams::builder(KernelType::Wendland)
            .sig1(0.1)
            .sig2(0.5)
            .p(1.0)
            .build();
        let kernel = ProductKernel::new(WendlandKernel, &params, (100, 100));

        // Far apart but same intensity.
        let a = PixelFeature::new(0, 0, 50);
        let b = PixelFeature::new(99, 99, 50);
        assert_eq!(kernel.evaluate(&a, &b), 0.0);

        // Adjacent but very different intensity: |0 - 255| / (0.5 * 255) = 2.
        let c = PixelFeature::new(0, 1, 0);
        let d = PixelFeature::new(0, 0, 255);
        assert_eq!(kernel.evaluate(&c, &d), 0.0);
    }
}
