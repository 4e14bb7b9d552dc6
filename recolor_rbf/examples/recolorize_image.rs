/////////////////////////////////////////////////////////////////////////////////////////////
//
// Recolors a greyscale copy of an image file from a subset of its original colors.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

//! Usage: `cargo run --release --example recolorize_image -- <input> [random|uniform] [n] [output_dir]`
//!
//! `random` keeps `n` pixels chosen at random (default 500). `uniform` keeps
//! one pixel every `n + 1` rows and columns.

use recolor_rbf::{
    GreyscaleMap, GreyscaleMethod, Recolorizer, SampleSet,
    config::Params,
    interpolant_config::{KernelSettings, KernelType},
    progress::{ProgressMsg, closure_sink},
    random_positions, uniform_positions,
};
use std::{env, error::Error, path::PathBuf};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_target(false).init();

    let mut args = env::args().skip(1);
    let input = args
        .next()
        .ok_or("expected the path of an image to recolor")?;
    let selection = args.next().unwrap_or_else(|| "random".to_string());
    let n: Option<usize> = args.next().map(|s| s.parse()).transpose()?;
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));

    // Decode the original and throw its colors away.
    let original = image::open(&input)?.to_rgb8();
    let greyscale = GreyscaleMap::from_rgb_image(&original, GreyscaleMethod::Perceptual)?;
    let (height, width) = greyscale.shape();

    // Keep the true colors of a subset of pixels.
    let positions = match selection.as_str() {
        "random" => random_positions(height, width, n.unwrap_or(500), Some(42))?,
        "uniform" => {
            let interval = n.unwrap_or(15);
            uniform_positions(height, width, interval, interval)
        }
        other => return Err(format!("unknown colorpoint selection '{other}'").into()),
    };
    let samples = SampleSet::from_image(&original, &positions)?;

    let settings = KernelSettings::builder(KernelType::Gaussian)
        .sig1(0.05)
        .sig2(1.0)
        .p(0.5)
        .delta(2e-4)
        .build();

    let (sink, listener) = closure_sink(64, |msg| match msg {
        ProgressMsg::EvaluationProgress { progress, .. } => {
            println!("evaluated {:>5.1}%", progress * 100.0)
        }
        ProgressMsg::Message { message } => println!("{message}"),
    });

    let recolorizer = Recolorizer::builder(settings)
        .params(Params::builder().eval_chunk_size(4096).build())
        .progress_callback(sink)
        .build();

    let result = recolorizer.recolorize(&samples, &greyscale)?;

    // Dropping the last sink ends the listener thread.
    drop(recolorizer);
    let _ = listener.join();

    greyscale.to_gray_image().save(output_dir.join("greyscale.png"))?;
    samples
        .mixed_image(&greyscale)?
        .save(output_dir.join("colorpoints.png"))?;
    result.image.save(output_dir.join("recolored.png"))?;
    samples.to_csv(output_dir.join("colorpoints.csv"))?;

    println!(
        "wrote results for a {} x {} image to {}",
        height,
        width,
        output_dir.display()
    );

    Ok(())
}
