/////////////////////////////////////////////////////////////////////////////////////////////
//
// Supplies pixel features, distances, kernel matrix builders, and the kernel registry.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{KernelFunction, RadialProfile};
use faer::Mat;
use serde::{Deserialize, Serialize};

/// A pixel described by its grid position and greyscale intensity.
///
/// Coordinates are stored as `f64` so kernel evaluation never has to convert
/// inside the inner loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelFeature {
    pub row: f64,
    pub col: f64,
    pub intensity: f64,
}

impl PixelFeature {
    /// Creates a feature from integer pixel coordinates and an 8-bit intensity.
    #[inline(always)]
    pub fn new(row: usize, col: usize, intensity: u8) -> Self {
        Self {
            row: row as f64,
            col: col as f64,
            intensity: intensity as f64,
        }
    }
}

/// Calculates the euclidean distance between the positions of two pixels.
///
/// Intensities are ignored.
///
/// # Examples
///
/// ```
/// use recolor_rbf_utils::{PixelFeature, get_distance};
///
/// let target = PixelFeature::new(1, 2, 0);
/// let source = PixelFeature::new(4, 6, 255);
///
/// assert_eq!(get_distance(&target, &source), 5.0);
/// ```
#[inline(always)]
pub fn get_distance(target: &PixelFeature, source: &PixelFeature) -> f64 {
    let dr = target.row - source.row;
    let dc = target.col - source.col;
    (dr * dr + dc * dc).sqrt()
}

/// Returns the diagonal length `sqrt(H^2 + W^2)` of an `H x W` grid.
///
/// # Examples
///
/// ```
/// use recolor_rbf_utils::image_diagonal;
///
/// assert_eq!(image_diagonal(3, 4), 5.0);
/// ```
#[inline(always)]
pub fn image_diagonal(height: usize, width: usize) -> f64 {
    let h = height as f64;
    let w = width as f64;
    (h * h + w * w).sqrt()
}

/// Builds a dense `M x N` kernel matrix using a typed kernel function.
///
/// Entry `(i, j)` is `K(targets[i], sources[j])`.
#[inline(always)]
pub fn get_kernel_matrix_typed<K>(
    targets: &[PixelFeature],
    sources: &[PixelFeature],
    kernel_function: &K,
) -> Mat<f64>
where
    K: KernelFunction,
{
    Mat::from_fn(targets.len(), sources.len(), |i, j| {
        kernel_function.evaluate(&targets[i], &sources[j])
    })
}

/// Builds a symmetric `N x N` kernel matrix over a single point set.
///
/// Only the lower triangle is evaluated and mirrored, so the result is exactly
/// symmetric regardless of floating point rounding in the kernel.
#[inline(always)]
pub fn get_kernel_matrix_symmetric_typed<K>(points: &[PixelFeature], kernel_function: &K) -> Mat<f64>
where
    K: KernelFunction,
{
    let n = points.len();

    let mut k_matrix = Mat::<f64>::zeros(n, n);

    for j in 0..n {
        let source = &points[j];

        for i in j..n {
            let k_val = kernel_function.evaluate(&points[i], source);

            k_matrix[(i, j)] = k_val;
            k_matrix[(j, i)] = k_val;
        }
    }

    k_matrix
}

// K-free dispatcher generated from the kernel registry below.
// Each profile is wrapped in a `ProductKernel` built from the shared `KernelParams`
// and the grid shape.
macro_rules! for_each_kernel {
    ( registry = [ $( ($V:ident, $Kty:path) ),* $(,)? ] ) => {

        /// Runtime radial profile selector built from the kernel registry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum KernelType {
            $( $V, )*
        }

        impl KernelType {
            /// Every registered kernel, in registry order.
            pub const ALL: &'static [KernelType] = &[ $( KernelType::$V, )* ];

            /// Whether the profile vanishes beyond a finite radius.
            #[inline]
            pub fn is_compactly_supported(&self) -> bool {
                match self {
                    $(
                        KernelType::$V => {
                            let params = crate::KernelParams::builder(*self).build();
                            let k = <$Kty as crate::KernelFromParams>::from_params(&params);
                            k.phi(1.0) == 0.0
                        }
                    ),*
                }
            }
        }

        impl std::fmt::Display for KernelType {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $( KernelType::$V => write!(f, "{}", stringify!($V)), )*
                }
            }
        }

        /// Builds a dense `M x N` product kernel matrix for the selected [`KernelType`].
        #[inline(always)]
        pub fn get_kernel_matrix(
            targets: &[PixelFeature],
            sources: &[PixelFeature],
            params: &crate::KernelParams,
            grid_shape: (usize, usize),
        ) -> Mat<f64> {
            match params.kernel_type {
                $(
                    KernelType::$V => {
                        let profile = <$Kty as crate::KernelFromParams>::from_params(params);
                        let k = crate::kernels::ProductKernel::new(profile, params, grid_shape);
                        crate::utils::get_kernel_matrix_typed(targets, sources, &k)
                    }
                ),*
            }
        }

        /// Builds the symmetric training matrix for the selected [`KernelType`].
        #[inline(always)]
        pub fn get_kernel_matrix_symmetric(
            points: &[PixelFeature],
            params: &crate::KernelParams,
            grid_shape: (usize, usize),
        ) -> Mat<f64> {
            match params.kernel_type {
                $(
                    KernelType::$V => {
                        let profile = <$Kty as crate::KernelFromParams>::from_params(params);
                        let k = crate::kernels::ProductKernel::new(profile, params, grid_shape);
                        crate::utils::get_kernel_matrix_symmetric_typed(points, &k)
                    }
                ),*
            }
        }

        /// Evaluates the selected radial profile at `r`.
        #[inline(always)]
        pub fn kernel_phi(
            r: f64,
            params: &crate::KernelParams,
        ) -> f64 {
            match params.kernel_type {
                $(
                    KernelType::$V => {
                        let k = <$Kty as crate::KernelFromParams>::from_params(params);
                        k.phi(r)
                    }
                ), *
            }
        }

        /// Evaluates the selected radial profile elementwise over `r`.
        #[inline(always)]
        pub fn kernel_phi_slice(
            r: &[f64],
            params: &crate::KernelParams,
        ) -> Vec<f64> {
            match params.kernel_type {
                $(
                    KernelType::$V => {
                        let k = <$Kty as crate::KernelFromParams>::from_params(params);
                        k.phi_slice(r)
                    }
                ), *
            }
        }
    };
}

for_each_kernel! {
    registry = [
        (Gaussian, crate::kernels::GaussianKernel),
        (Wendland, crate::kernels::WendlandKernel),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KernelParams;

    fn corners() -> Vec<PixelFeature> {
        vec![
            PixelFeature::new(0, 0, 0),
            PixelFeature::new(0, 1, 85),
            PixelFeature::new(1, 0, 170),
            PixelFeature::new(1, 1, 255),
        ]
    }

    #[test]
    fn symmetric_matrix_has_unit_diagonal_and_is_symmetric() {
        let points = corners();
        for &kernel_type in KernelType::ALL {
            let params = KernelParams::builder(kernel_type).sig1(0.8).sig2(1.0).build();
            let k = get_kernel_matrix_symmetric(&points, &params, (2, 2));

            assert_eq!(k.nrows(), 4);
            assert_eq!(k.ncols(), 4);
            for i in 0..4 {
                assert_eq!(k[(i, i)], 1.0);
                for j in 0..4 {
                    assert_eq!(k[(i, j)], k[(j, i)]);
                    assert!((0.0..=1.0).contains(&k[(i, j)]));
                }
            }
        }
    }

    #[test]
    fn symmetric_builder_agrees_with_rectangular_builder() {
        let points = corners();
        let params = KernelParams::builder(KernelType::Gaussian).build();
        let sym = get_kernel_matrix_symmetric(&points, &params, (2, 2));
        let full = get_kernel_matrix(&points, &points, &params, (2, 2));

        for i in 0..4 {
            for j in 0..=i {
                assert_eq!(sym[(i, j)], full[(i, j)]);
            }
        }
    }

    #[test]
    fn rectangular_matrix_shape_follows_inputs() {
        let sources = corners();
        let targets = vec![PixelFeature::new(0, 0, 10), PixelFeature::new(1, 1, 20)];
        let params = KernelParams::builder(KernelType::Wendland).build();

        let k = get_kernel_matrix(&targets, &sources, &params, (2, 2));
        assert_eq!((k.nrows(), k.ncols()), (2, 4));

        let empty = get_kernel_matrix(&[], &sources, &params, (2, 2));
        assert_eq!((empty.nrows(), empty.ncols()), (0, 4));
    }

    #[test]
    fn gaussian_entries_match_closed_form() {
        let params = KernelParams::builder(KernelType::Gaussian)
            .sig1(1.0)
            .sig2(1.0)
            .p(1.0)
            .build();
        let points = corners();
        let k = get_kernel_matrix_symmetric(&points, &params, (2, 2));

        // (0,0,0) vs (1,1,255): spatial r = sqrt(2)/sqrt(8) = 0.5, intensity r = 1.
        let expected = (-0.25f64).exp() * (-1.0f64).exp();
        assert!((k[(3, 0)] - expected).abs() < 1e-14);
    }

    #[test]
    fn compact_support_flags() {
        assert!(!KernelType::Gaussian.is_compactly_supported());
        assert!(KernelType::Wendland.is_compactly_supported());
    }

    #[test]
    fn kernel_phi_dispatches_by_type() {
        let gaussian = KernelParams::builder(KernelType::Gaussian).build();
        let wendland = KernelParams::builder(KernelType::Wendland).build();

        assert_eq!(kernel_phi(0.0, &gaussian), 1.0);
        assert_eq!(kernel_phi(2.0, &wendland), 0.0);
        assert!(kernel_phi(2.0, &gaussian) > 0.0);
        assert_eq!(kernel_phi_slice(&[0.0, 2.0], &wendland), vec![1.0, 0.0]);
    }

    #[test]
    fn kernel_type_display_uses_variant_name() {
        assert_eq!(KernelType::Gaussian.to_string(), "Gaussian");
        assert_eq!(KernelType::Wendland.to_string(), "Wendland");
    }
}
