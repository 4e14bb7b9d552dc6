/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines the greyscale intensity map and the RGB to greyscale conversion methods.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::recolorizer::RecolorError;
use image::{GrayImage, Luma, Rgb, RgbImage};
use recolor_rbf_utils::PixelFeature;
use serde::{Deserialize, Serialize};

/// Weighting used to collapse an RGB pixel into a single intensity.
///
/// All methods are computed in `f64` and truncated to `u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GreyscaleMethod {
    /// `0.3 R + 0.59 G + 0.11 B`, weighted by human visual sensitivity.
    Perceptual,

    /// `(R + G + B) / 3`.
    Average,

    /// `0.2126 R + 0.7152 G + 0.0722 B` (Rec. 709 luma).
    Luminance,

    /// `(max(R, G, B) + min(R, G, B)) / 2`, the HSL lightness.
    Lightness,
}

impl Default for GreyscaleMethod {
    fn default() -> Self {
        GreyscaleMethod::Perceptual
    }
}

impl GreyscaleMethod {
    /// Converts a single RGB triple to an intensity.
    #[inline]
    pub fn convert(&self, rgb: [u8; 3]) -> u8 {
        let [r, g, b] = rgb.map(f64::from);
        let grey = match self {
            GreyscaleMethod::Perceptual => 0.3 * r + 0.59 * g + 0.11 * b,
            GreyscaleMethod::Average => (r + g + b) / 3.0,
            GreyscaleMethod::Luminance => 0.2126 * r + 0.7152 * g + 0.0722 * b,
            GreyscaleMethod::Lightness => (r.max(g).max(b) + r.min(g).min(b)) / 2.0,
        };
        // `as` truncates toward zero and saturates at the u8 bounds.
        grey as u8
    }
}

/// An immutable `H x W` grid of 8-bit intensities stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreyscaleMap {
    height: usize,
    width: usize,
    data: Vec<u8>,
}

impl GreyscaleMap {
    /// Wraps row-major intensity data.
    ///
    /// # Errors
    /// [`RecolorError::InvalidInput`] if either dimension is zero, does not fit
    /// in a `u32`, or `data.len() != height * width`.
    pub fn new(height: usize, width: usize, data: Vec<u8>) -> Result<Self, RecolorError> {
        if height == 0 || width == 0 {
            return Err(RecolorError::invalid(format!(
                "greyscale map must have at least one pixel, got {height} x {width}"
            )));
        }
        if u32::try_from(height).is_err() || u32::try_from(width).is_err() {
            return Err(RecolorError::invalid(format!(
                "greyscale map dimensions {height} x {width} exceed the supported image size"
            )));
        }
        let expected = height.checked_mul(width).ok_or_else(|| {
            RecolorError::invalid(format!("greyscale map {height} x {width} overflows"))
        })?;
        if data.len() != expected {
            return Err(RecolorError::invalid(format!(
                "greyscale data holds {} values, expected {} for a {height} x {width} map",
                data.len(),
                expected
            )));
        }

        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// Builds a map from a single-channel image.
    pub fn from_gray_image(img: &GrayImage) -> Result<Self, RecolorError> {
        let (width, height) = img.dimensions();
        Self::new(height as usize, width as usize, img.as_raw().clone())
    }

    /// Converts an RGB image to greyscale with the given method.
    pub fn from_rgb_image(img: &RgbImage, method: GreyscaleMethod) -> Result<Self, RecolorError> {
        let (width, height) = img.dimensions();
        let data = img.pixels().map(|px| method.convert(px.0)).collect();
        Self::new(height as usize, width as usize, data)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// `(height, width)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[inline]
    pub fn num_pixels(&self) -> usize {
        self.data.len()
    }

    /// Row-major intensities.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Intensity at `(row, col)`, or `None` outside the grid.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row < self.height && col < self.width {
            Some(self.data[row * self.width + col])
        } else {
            None
        }
    }

    /// Kernel feature of the pixel at a row-major linear index.
    #[inline]
    pub(crate) fn feature_at_index(&self, index: usize) -> PixelFeature {
        PixelFeature::new(index / self.width, index % self.width, self.data[index])
    }

    /// Kernel features for `len` consecutive pixels starting at row-major index `start`.
    pub(crate) fn features_for_range(&self, start: usize, len: usize) -> Vec<PixelFeature> {
        (start..start + len)
            .map(|idx| self.feature_at_index(idx))
            .collect()
    }

    /// Kernel features for a list of `(row, col)` positions.
    ///
    /// Positions must already be known to lie inside the grid.
    pub(crate) fn features(&self, positions: impl Iterator<Item = (usize, usize)>) -> Vec<PixelFeature> {
        positions
            .map(|(row, col)| self.feature_at_index(row * self.width + col))
            .collect()
    }

    /// Returns the map as a single-channel image.
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([self.data[y as usize * self.width + x as usize]])
        })
    }

    /// Returns the map as an RGB image with the intensity repeated in every channel.
    pub fn to_rgb_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let g = self.data[y as usize * self.width + x as usize];
            Rgb([g, g, g])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_formulas() {
        let px = [200, 100, 50];
        // 60 + 59 + 5.5
        assert_eq!(GreyscaleMethod::Perceptual.convert(px), 124);
        assert_eq!(GreyscaleMethod::Average.convert(px), 116);
        assert_eq!(GreyscaleMethod::Luminance.convert(px), 117);
        assert_eq!(GreyscaleMethod::Lightness.convert(px), 125);
    }

    #[test]
    fn wide_channels_do_not_wrap() {
        let white = [255, 255, 255];
        assert_eq!(GreyscaleMethod::Average.convert(white), 255);
        assert_eq!(GreyscaleMethod::Lightness.convert(white), 255);
        assert_eq!(GreyscaleMethod::Lightness.convert([255, 0, 255]), 127);
        assert_eq!(GreyscaleMethod::Average.convert([0, 0, 0]), 0);
    }

    #[test]
    fn new_validates_shape() {
        assert!(GreyscaleMap::new(0, 4, vec![]).is_err());
        assert!(GreyscaleMap::new(2, 0, vec![]).is_err());
        assert!(GreyscaleMap::new(2, 2, vec![0; 3]).is_err());

        let map = GreyscaleMap::new(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(map.shape(), (2, 3));
        assert_eq!(map.num_pixels(), 6);
        assert_eq!(map.get(1, 0), Some(4));
        assert_eq!(map.get(2, 0), None);
        assert_eq!(map.get(0, 3), None);
    }

    #[test]
    fn features_follow_row_major_order() {
        let map = GreyscaleMap::new(2, 3, vec![10, 20, 30, 40, 50, 60]).unwrap();

        let block = map.features_for_range(2, 3);
        assert_eq!(block[0], PixelFeature::new(0, 2, 30));
        assert_eq!(block[1], PixelFeature::new(1, 0, 40));
        assert_eq!(block[2], PixelFeature::new(1, 1, 50));

        let picked = map.features([(1, 2), (0, 0)].into_iter());
        assert_eq!(picked, vec![PixelFeature::new(1, 2, 60), PixelFeature::new(0, 0, 10)]);
    }

    #[test]
    fn image_round_trip_keeps_orientation() {
        let rgb = RgbImage::from_fn(3, 2, |x, y| Rgb([(10 * x + 100 * y) as u8, 0, 0]));
        let map = GreyscaleMap::from_rgb_image(&rgb, GreyscaleMethod::Lightness).unwrap();

        assert_eq!(map.shape(), (2, 3));
        // Lightness of (v, 0, 0) is v / 2.
        assert_eq!(map.get(1, 2), Some(60));

        let grey_rgb = map.to_rgb_image();
        assert_eq!(grey_rgb.dimensions(), (3, 2));
        assert_eq!(grey_rgb.get_pixel(2, 1).0, [60, 60, 60]);

        let gray = map.to_gray_image();
        let back = GreyscaleMap::from_gray_image(&gray).unwrap();
        assert_eq!(back, map);
    }
}
