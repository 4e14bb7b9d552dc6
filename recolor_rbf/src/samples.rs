/////////////////////////////////////////////////////////////////////////////////////////////
//
// Defines known color samples, colorpoint selection, preview images, and sample CSV I/O.
//
// Created on: 15 Nov 2025     Author: Daniel Owen
//
// Copyright (c) 2025, Maptek Pty Ltd. All rights reserved. Licensed under the MIT License.
//
/////////////////////////////////////////////////////////////////////////////////////////////

use crate::{greyscale::GreyscaleMap, recolorizer::RecolorError};
use csv::{ReaderBuilder, Writer};
use faer::Mat;
use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::{SeedableRng, seq::index};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::path::Path;

/// A pixel position with a known RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSample {
    pub row: usize,
    pub col: usize,
    pub rgb: [u8; 3],
}

impl ColorSample {
    pub fn new(row: usize, col: usize, rgb: [u8; 3]) -> Self {
        Self { row, col, rgb }
    }
}

/// Ordered collection of [`ColorSample`]s. Duplicated positions are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSet {
    samples: Vec<ColorSample>,
}

impl From<Vec<ColorSample>> for SampleSet {
    fn from(samples: Vec<ColorSample>) -> Self {
        Self { samples }
    }
}

impl FromIterator<ColorSample> for SampleSet {
    fn from_iter<I: IntoIterator<Item = ColorSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

impl SampleSet {
    pub fn new(samples: Vec<ColorSample>) -> Self {
        Self { samples }
    }

    /// Reads the known colors of `img` at the given `(row, col)` positions.
    ///
    /// # Errors
    /// [`RecolorError::InvalidInput`] if any position lies outside the image.
    pub fn from_image(img: &RgbImage, positions: &[(usize, usize)]) -> Result<Self, RecolorError> {
        let (width, height) = img.dimensions();
        let (height, width) = (height as usize, width as usize);

        positions
            .iter()
            .map(|&(row, col)| {
                if row >= height || col >= width {
                    return Err(RecolorError::invalid(format!(
                        "colorpoint ({row}, {col}) lies outside the {height} x {width} image"
                    )));
                }
                let px = img.get_pixel(col as u32, row as u32);
                Ok(ColorSample::new(row, col, px.0))
            })
            .collect()
    }

    pub fn push(&mut self, sample: ColorSample) {
        self.samples.push(sample);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColorSample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[ColorSample] {
        &self.samples
    }

    /// Iterates the `(row, col)` position of every sample in order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.samples.iter().map(|s| (s.row, s.col))
    }

    /// Returns the first sample lying outside an `H x W` grid, if any.
    pub(crate) fn first_out_of_bounds(&self, height: usize, width: usize) -> Option<&ColorSample> {
        self.samples
            .iter()
            .find(|s| s.row >= height || s.col >= width)
    }

    /// Known colors as an `N x 3` matrix of `f64`.
    pub(crate) fn colors_matrix(&self) -> Mat<f64> {
        Mat::from_fn(self.samples.len(), 3, |i, j| self.samples[i].rgb[j] as f64)
    }

    /// Greyscale preview with every sample pixel painted in its known color.
    ///
    /// Later samples overwrite earlier ones at duplicated positions.
    ///
    /// # Errors
    /// [`RecolorError::InvalidInput`] if any sample lies outside the map.
    pub fn mixed_image(&self, greyscale: &GreyscaleMap) -> Result<RgbImage, RecolorError> {
        let (height, width) = greyscale.shape();
        if let Some(s) = self.first_out_of_bounds(height, width) {
            return Err(RecolorError::invalid(format!(
                "colorpoint ({}, {}) lies outside the {height} x {width} image",
                s.row, s.col
            )));
        }

        let mut img = greyscale.to_rgb_image();
        for s in &self.samples {
            img.put_pixel(s.col as u32, s.row as u32, Rgb(s.rgb));
        }
        Ok(img)
    }

    /// Load a sample set from a CSV file with columns `row, col, r, g, b`.
    ///
    /// # Arguments
    /// * `file_path` - Path to the CSV file.
    /// * `has_headers` - Whether the file has a single header row to skip.
    pub fn from_csv<P: AsRef<Path>>(file_path: P, has_headers: bool) -> Result<Self, Box<dyn Error>> {
        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(has_headers)
            .from_reader(file);

        let mut samples = Vec::new();

        for result in reader.records() {
            let record = result?;
            if record.len() != 5 {
                return Err(format!(
                    "Expected 5 columns (row, col, r, g, b) in CSV, found {}",
                    record.len()
                )
                .into());
            }

            let row: usize = record[0].trim().parse()?;
            let col: usize = record[1].trim().parse()?;
            let mut rgb = [0u8; 3];
            for (c, value) in rgb.iter_mut().enumerate() {
                *value = record[c + 2].trim().parse()?;
            }

            samples.push(ColorSample::new(row, col, rgb));
        }

        Ok(Self { samples })
    }

    /// Write the sample set to a CSV file with headers `row, col, r, g, b`.
    ///
    /// # Errors
    /// Returns an error if writing to disk fails.
    pub fn to_csv<P: AsRef<Path>>(&self, file_path: P) -> Result<(), Box<dyn Error>> {
        let mut wtr = Writer::from_path(file_path)?;

        wtr.write_record(["row", "col", "r", "g", "b"])?;

        for s in &self.samples {
            wtr.write_record(&[
                s.row.to_string(),
                s.col.to_string(),
                s.rgb[0].to_string(),
                s.rgb[1].to_string(),
                s.rgb[2].to_string(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a ColorSample;
    type IntoIter = std::slice::Iter<'a, ColorSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Selects a regular lattice of colorpoints.
///
/// The first row and column are always selected, followed by every
/// `interval + 1`-th row and column. `interval` is the number of skipped
/// pixels between two selected ones. Positions are returned in row-major order.
///
/// # Example
/// ```
/// use recolor_rbf::uniform_positions;
///
/// let positions = uniform_positions(5, 4, 1, 2);
/// assert_eq!(positions, vec![(0, 0), (0, 3), (2, 0), (2, 3), (4, 0), (4, 3)]);
/// ```
pub fn uniform_positions(
    height: usize,
    width: usize,
    row_interval: usize,
    col_interval: usize,
) -> Vec<(usize, usize)> {
    let rows = (0..height).step_by(row_interval.saturating_add(1));
    let cols: Vec<usize> = (0..width).step_by(col_interval.saturating_add(1)).collect();

    rows.flat_map(|row| cols.iter().map(move |&col| (row, col)))
        .collect()
}

/// Selects `count` distinct colorpoints uniformly at random.
///
/// # Parameters
/// - `seed`: Optional random seed.
///   - If `Some(seed)` is provided, the same positions are selected on every run.
///   - If `None`, the generator is seeded from the operating system's randomness source.
///
/// # Returns
/// Positions in row-major order.
///
/// # Errors
/// [`RecolorError::InvalidInput`] if `count` exceeds the number of pixels.
pub fn random_positions(
    height: usize,
    width: usize,
    count: usize,
    seed: Option<u64>,
) -> Result<Vec<(usize, usize)>, RecolorError> {
    let total = height.checked_mul(width).ok_or_else(|| {
        RecolorError::invalid(format!("grid {height} x {width} overflows"))
    })?;
    if count > total {
        return Err(RecolorError::invalid(format!(
            "cannot select {count} distinct colorpoints from {total} pixels"
        )));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut picked = index::sample(&mut rng, total, count).into_vec();
    picked.sort_unstable();

    Ok(picked
        .into_iter()
        .map(|idx| (idx / width, idx % width))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_csv(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("recolor_rbf_{}_{}.csv", name, std::process::id()))
    }

    #[test]
    fn uniform_lattice_matches_interval_rule() {
        // interval 0 selects everything
        assert_eq!(uniform_positions(2, 2, 0, 0).len(), 4);

        // 10 columns, interval 2: 0, 3, 6, 9
        let positions = uniform_positions(1, 10, 0, 2);
        assert_eq!(positions, vec![(0, 0), (0, 3), (0, 6), (0, 9)]);

        // 8 columns, interval 2: trailing columns are left unselected
        let positions = uniform_positions(1, 8, 0, 2);
        assert_eq!(positions, vec![(0, 0), (0, 3), (0, 6)]);

        // intervals larger than the grid still keep the origin
        assert_eq!(uniform_positions(3, 3, 10, 10), vec![(0, 0)]);
    }

    #[test]
    fn random_positions_are_distinct_sorted_and_reproducible() {
        let a = random_positions(20, 30, 100, Some(7)).unwrap();
        let b = random_positions(20, 30, 100, Some(7)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);

        for pair in a.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(a.iter().all(|&(r, c)| r < 20 && c < 30));
    }

    #[test]
    fn random_positions_can_take_every_pixel() {
        let all = random_positions(3, 4, 12, Some(1)).unwrap();
        assert_eq!(all, uniform_positions(3, 4, 0, 0));
        assert!(random_positions(3, 4, 13, Some(1)).is_err());
        assert!(random_positions(3, 4, 0, None).unwrap().is_empty());
    }

    #[test]
    fn samples_read_from_image() {
        let img = RgbImage::from_fn(4, 3, |x, y| Rgb([x as u8, y as u8, 9]));
        let set = SampleSet::from_image(&img, &[(2, 3), (0, 1)]).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0], ColorSample::new(2, 3, [3, 2, 9]));
        assert_eq!(set.as_slice()[1], ColorSample::new(0, 1, [1, 0, 9]));

        assert!(SampleSet::from_image(&img, &[(3, 0)]).is_err());
        assert!(SampleSet::from_image(&img, &[(0, 4)]).is_err());
    }

    #[test]
    fn colors_matrix_shape_and_values() {
        let set = SampleSet::new(vec![
            ColorSample::new(0, 0, [1, 2, 3]),
            ColorSample::new(1, 1, [4, 5, 6]),
        ]);
        let f = set.colors_matrix();
        assert_eq!((f.nrows(), f.ncols()), (2, 3));
        assert_eq!(f[(1, 2)], 6.0);
        assert_eq!(f[(0, 0)], 1.0);
    }

    #[test]
    fn mixed_image_paints_samples_over_greyscale() {
        let grey = GreyscaleMap::new(2, 2, vec![10, 20, 30, 40]).unwrap();
        let set = SampleSet::new(vec![ColorSample::new(1, 0, [255, 0, 0])]);

        let mixed = set.mixed_image(&grey).unwrap();
        assert_eq!(mixed.get_pixel(0, 1).0, [255, 0, 0]);
        assert_eq!(mixed.get_pixel(1, 1).0, [40, 40, 40]);
        assert_eq!(mixed.get_pixel(1, 0).0, [20, 20, 20]);

        let outside = SampleSet::new(vec![ColorSample::new(2, 0, [0, 0, 0])]);
        assert!(outside.mixed_image(&grey).is_err());
    }

    #[test]
    fn csv_write_then_read() {
        let path = temp_csv("write_read");
        let set = SampleSet::new(vec![
            ColorSample::new(0, 5, [200, 50, 10]),
            ColorSample::new(7, 1, [0, 255, 128]),
        ]);

        set.to_csv(&path).unwrap();
        let loaded = SampleSet::from_csv(&path, true).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, set);
    }

    #[test]
    fn csv_rejects_bad_rows() {
        let path = temp_csv("bad_rows");

        std::fs::write(&path, "1,2,3,4\n").unwrap();
        assert!(SampleSet::from_csv(&path, false).is_err());

        std::fs::write(&path, "1,2,3,4,300\n").unwrap();
        assert!(SampleSet::from_csv(&path, false).is_err());

        std::fs::write(&path, "1,2,3,4,5\n").unwrap();
        let ok = SampleSet::from_csv(&path, false).unwrap();
        assert_eq!(ok.as_slice(), &[ColorSample::new(1, 2, [3, 4, 5])]);

        std::fs::remove_file(&path).unwrap();
    }
}
