/////////////////////////////////////////////////////////////////////////////////////////////
//
// Provides deterministic synthetic color images for testing and demonstrating recolorization.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Synthetic RGB images with known structure. Sizes are `height x width` and
//! every generator is deterministic.
use image::{Rgb, RgbImage};

/// Struct that implements various synthetic color images for testing recolorization.
pub struct RecolorTestImages;

impl RecolorTestImages {
    /// Smooth bilinear gradient: red increases left to right, green top to
    /// bottom and blue is their complement.
    pub fn gradient(height: usize, width: usize) -> RgbImage {
        let sx = 255.0 / (width.max(2) - 1) as f64;
        let sy = 255.0 / (height.max(2) - 1) as f64;

        RgbImage::from_fn(width as u32, height as u32, |x, y| {
            let r = x as f64 * sx;
            let g = y as f64 * sy;
            let b = 255.0 - 0.5 * (r + g);
            Rgb([r as u8, g as u8, b as u8])
        })
    }

    /// Four flat blocks of red, green, blue and yellow. Each block has a
    /// distinct greyscale intensity, so edges are visible to the intensity kernel.
    pub fn quadrants(height: usize, width: usize) -> RgbImage {
        let mid_row = height / 2;
        let mid_col = width / 2;

        RgbImage::from_fn(width as u32, height as u32, |x, y| {
            let top = (y as usize) < mid_row;
            let left = (x as usize) < mid_col;
            match (top, left) {
                (true, true) => Rgb([220, 30, 30]),
                (true, false) => Rgb([30, 200, 40]),
                (false, true) => Rgb([20, 40, 230]),
                (false, false) => Rgb([240, 230, 20]),
            }
        })
    }

    /// Color image built from Franke's two-dimensional test function on the
    /// unit square, one channel per orientation of the function.
    ///
    /// <div>
    /// $$
    /// \begin{aligned}
    /// F(x,y) &=
    /// \tfrac{3}{4}\exp\!\left[-\frac{(9x-2)^2 + (9y-2)^2}{4}\right]
    /// + \tfrac{3}{4}\exp\!\left[-\frac{(9x+1)^2}{49} - \frac{(9y+1)^2}{10}\right] \\[6pt]
    /// &\quad+ \tfrac{1}{2}\exp\!\left[-\frac{(9x-7)^2 + (9y-3)^2}{4}\right]
    /// - \tfrac{1}{5}\exp\!\left[-(9x-4)^2 - (9y-7)^2\right]
    /// \end{aligned}
    /// $$
    /// </div>
    pub fn franke(height: usize, width: usize) -> RgbImage {
        let sx = 1.0 / (width.max(2) - 1) as f64;
        let sy = 1.0 / (height.max(2) - 1) as f64;

        RgbImage::from_fn(width as u32, height as u32, |x, y| {
            let u = x as f64 * sx;
            let v = y as f64 * sy;

            // F lies within [-0.01, 1.05] on the unit square.
            let to_u8 = |f: f64| (f / 1.05 * 255.0).clamp(0.0, 255.0) as u8;

            Rgb([
                to_u8(franke_2d(u, v)),
                to_u8(franke_2d(v, u)),
                to_u8(franke_2d(1.0 - u, 1.0 - v)),
            ])
        })
    }
}

fn franke_2d(x: f64, y: f64) -> f64 {
    let nx = 9.0 * x;
    let ny = 9.0 * y;

    let term1 = 0.75 * (-((nx - 2.0).powi(2) + (ny - 2.0).powi(2)) / 4.0).exp();
    let term2 = 0.75 * (-(nx + 1.0).powi(2) / 49.0 - (ny + 1.0).powi(2) / 10.0).exp();
    let term3 = 0.5 * (-((nx - 7.0).powi(2) + (ny - 3.0).powi(2)) / 4.0).exp();
    let term4 = -0.2 * (-(nx - 4.0).powi(2) - (ny - 7.0).powi(2)).exp();

    term1 + term2 + term3 + term4
}
