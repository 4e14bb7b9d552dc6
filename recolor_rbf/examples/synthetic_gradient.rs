/////////////////////////////////////////////////////////////////////////////////////////////
//
// Recolors a synthetic Franke image from a regular lattice of colorpoints with both kernels.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use recolor_rbf::{
    GreyscaleMap, GreyscaleMethod, RecolorTestImages, SampleSet,
    interpolant_config::{KernelSettings, KernelType},
    recolorize, uniform_positions,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (height, width) = (96usize, 128usize);

    // A smooth color image with a known ground truth
    let original = RecolorTestImages::franke(height, width);
    let greyscale = GreyscaleMap::from_rgb_image(&original, GreyscaleMethod::Perceptual)?;

    // One colorpoint every 8 pixels in both directions
    let positions = uniform_positions(height, width, 7, 7);
    let samples = SampleSet::from_image(&original, &positions)?;

    for kernel_type in [KernelType::Gaussian, KernelType::Wendland] {
        let settings = KernelSettings::builder(kernel_type).sig1(0.1).build();
        let result = recolorize(&samples, &greyscale, settings)?;

        let mse = original
            .pixels()
            .zip(result.image.pixels())
            .flat_map(|(a, b)| a.0.into_iter().zip(b.0))
            .map(|(a, b)| (a as f64 - b as f64).powi(2))
            .sum::<f64>()
            / (3 * height * width) as f64;

        println!(
            "{}: {} colorpoints, mse {:.2}, evaluated in {:?}",
            kernel_type,
            samples.len(),
            mse,
            result.evaluation_time
        );
    }

    Ok(())
}
