//! Rho/theta vote accumulator.
//!
//! Every sample strictly above the vote threshold is treated as an edge pixel
//! and casts one vote per angle bin along the curve
//! `rho = x·cos(θ) + y·sin(θ)`. Rho is shifted by the image diagonal so that
//! bin indices are never negative.

use std::f64::consts::PI;

use rayon::prelude::*;

use crate::config::HoughConfig;
use crate::error::{HoughError, Result};
use crate::matrix::Matrix;

/// `ceil(hypot(height, width))`, the bound on `|rho|` for an image.
pub fn diagonal_length(width: usize, height: usize) -> usize {
    (height as f64).hypot(width as f64).ceil() as usize
}

/// Edge strength of a brightness sample: the inverted brightness.
///
/// Vote weight does not depend on it; only the raw sample is compared with
/// the vote threshold.
#[inline]
pub fn edge_strength(value: f64, config: &HoughConfig) -> f64 {
    config.max_brightness - value
}

/// Votes in `angle_bins` columns by `2 * diagonal_length` rows.
///
/// Row `r` holds rho values rounding to `r - diagonal_length`; column `k` holds
/// theta `-90° + k·180°/angle_bins`.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    votes: Matrix,
    diagonal_length: usize,
}

impl Accumulator {
    /// Empty accumulator sized for an image of `image_width × image_height`.
    pub fn new(image_width: usize, image_height: usize, angle_bins: usize) -> Result<Self> {
        if angle_bins == 0 {
            return Err(HoughError::InvalidAngleBins);
        }
        let diagonal_length = diagonal_length(image_width, image_height);
        Ok(Self {
            votes: Matrix::zeros(angle_bins, 2 * diagonal_length),
            diagonal_length,
        })
    }

    #[inline]
    pub fn angle_bins(&self) -> usize {
        self.votes.width()
    }

    #[inline]
    pub fn rho_bins(&self) -> usize {
        self.votes.height()
    }

    #[inline]
    pub fn diagonal_length(&self) -> usize {
        self.diagonal_length
    }

    /// Flat position of a `(rho_bin, angle_bin)` cell, `None` when outside.
    ///
    /// This is the only place the accumulator layout is spelled out.
    #[inline]
    pub fn cell_index(&self, rho_bin: usize, angle_bin: usize) -> Option<usize> {
        if rho_bin >= self.rho_bins() || angle_bin >= self.angle_bins() {
            return None;
        }
        Some(rho_bin * self.angle_bins() + angle_bin)
    }

    /// Rho bin for a signed rho value.
    #[inline]
    pub fn rho_bin(&self, rho: f64) -> Option<usize> {
        let shifted = (rho + self.diagonal_length as f64).round();
        (shifted >= 0.0).then_some(shifted as usize)
    }

    /// Vote count stored at a cell, zero for positions outside the grid.
    pub fn votes_at(&self, rho_bin: usize, angle_bin: usize) -> f64 {
        self.cell_index(rho_bin, angle_bin)
            .map_or(0.0, |i| self.votes.as_slice()[i])
    }

    /// Casts one vote per angle bin for the edge pixel at `(x, y)`.
    ///
    /// `trig` holds `(cos θ, sin θ)` per angle bin, see [`angle_table`].
    /// Returns the number of votes that landed inside the grid.
    pub fn vote(&mut self, x: usize, y: usize, trig: &[(f64, f64)]) -> usize {
        let (xf, yf) = (x as f64, y as f64);
        let mut cast = 0;
        for (angle_bin, &(cos, sin)) in trig.iter().enumerate() {
            let rho = xf * cos + yf * sin;
            let cell = self
                .rho_bin(rho)
                .and_then(|rho_bin| self.cell_index(rho_bin, angle_bin));
            if let Some(i) = cell {
                self.votes.as_mut_slice()[i] += 1.0;
                cast += 1;
            }
        }
        cast
    }

    /// Adds another accumulator of the same shape into this one.
    pub fn merge(mut self, other: Accumulator) -> Self {
        for (a, b) in self
            .votes
            .as_mut_slice()
            .iter_mut()
            .zip(other.votes.as_slice())
        {
            *a += *b;
        }
        self
    }

    /// Sum of all votes.
    pub fn total_votes(&self) -> f64 {
        self.votes.as_slice().iter().sum()
    }

    pub fn matrix(&self) -> &Matrix {
        &self.votes
    }

    pub fn into_matrix(self) -> Matrix {
        self.votes
    }
}

/// `(cos θ, sin θ)` for each angle bin, theta spanning `[-90°, 90°)`.
pub fn angle_table(angle_bins: usize) -> Vec<(f64, f64)> {
    let step = 180.0 / angle_bins as f64;
    (0..angle_bins)
        .map(|k| {
            let degrees = -90.0 + k as f64 * step;
            let theta = PI * degrees / 180.0;
            (theta.cos(), theta.sin())
        })
        .collect()
}

/// Builds the rho/theta accumulator of a single-channel matrix.
///
/// A pixel votes iff its sample is strictly greater than
/// `config.vote_threshold`; each voting pixel adds exactly one vote to each
/// angle column. The input is left untouched.
///
/// # Examples
///
/// ```rust
/// use hough_edges::{hough_transform, HoughConfig, Matrix};
///
/// let mut image = Matrix::zeros(4, 4);
/// image.set(2, 2, 200.0);
///
/// let acc = hough_transform(&image, &HoughConfig::default()).unwrap();
/// assert_eq!(acc.angle_bins(), 180);
/// assert_eq!(acc.rho_bins(), 2 * 6);
/// assert_eq!(acc.total_votes(), 180.0);
/// ```
pub fn hough_transform(image: &Matrix, config: &HoughConfig) -> Result<Accumulator> {
    let (width, height) = (image.width(), image.height());
    let mut acc = Accumulator::new(width, height, config.angle_bins)?;
    let trig = angle_table(config.angle_bins);
    debug!(
        "hough accumulator {}x{}, diagonal {}",
        acc.angle_bins(),
        acc.rho_bins(),
        acc.diagonal_length()
    );

    for (i, &value) in image.as_slice().iter().enumerate() {
        if value > config.vote_threshold {
            let (x, y) = image.coords(i);
            acc.vote(x, y, &trig);
        }
    }
    debug!("hough total votes {}", acc.total_votes());
    Ok(acc)
}

/// Parallel variant of [`hough_transform`].
///
/// Rows are folded into per-thread accumulators that are summed at the end,
/// so the result is identical to the sequential builder.
pub fn par_hough_transform(image: &Matrix, config: &HoughConfig) -> Result<Accumulator> {
    let (width, height) = (image.width(), image.height());
    let empty = Accumulator::new(width, height, config.angle_bins)?;
    let trig = angle_table(config.angle_bins);
    let data = image.as_slice();

    let acc = (0..height)
        .into_par_iter()
        .fold(
            || empty.clone(),
            |mut acc, y| {
                let row = &data[y * width..(y + 1) * width];
                for (x, &value) in row.iter().enumerate() {
                    if value > config.vote_threshold {
                        acc.vote(x, y, &trig);
                    }
                }
                acc
            },
        )
        .reduce(|| empty.clone(), Accumulator::merge);

    debug!("par hough total votes {}", acc.total_votes());
    Ok(acc)
}
