//! Owned single-channel `f64` matrix in row-major layout.
//!
//! This is the one data type exchanged between stages. The length invariant
//! `data.len() == width * height` holds for every constructed value.

use image::{GrayImage, ImageBuffer, Luma};

use crate::error::{HoughError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Zero-filled matrix of `width × height` samples.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Wraps an existing buffer, checking it matches the dimensions.
    ///
    /// Dimensions whose product overflows `usize` report an expected length
    /// of `usize::MAX`, which no buffer can match.
    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        let expected = width.checked_mul(height).unwrap_or(usize::MAX);
        if data.len() != expected {
            return Err(HoughError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Copies an 8-bit grayscale image, one sample per pixel.
    pub fn from_luma(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width: width as usize,
            height: height as usize,
            data: image.as_raw().iter().map(|&p| p as f64).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat index of column `x`, row `y`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Column and row of a flat index.
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[self.index(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        let i = self.index(x, y);
        self.data[i] = value;
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Arithmetic mean of all samples, `0.0` for an empty matrix.
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Largest sample, `None` for an empty matrix.
    pub fn max(&self) -> Option<f64> {
        self.data.iter().copied().reduce(f64::max)
    }

    /// Renders the matrix as an 8-bit image for an external writer.
    ///
    /// Samples are rescaled linearly so the smallest maps to 0 and the largest
    /// to 255. A constant matrix is clamped into `[0, 255]` instead.
    pub fn to_luma8(&self) -> GrayImage {
        let (lo, hi) = self
            .data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let range = hi - lo;
        let pixels = self
            .data
            .iter()
            .map(|&v| {
                let scaled = if range > 0.0 {
                    (v - lo) * 255.0 / range
                } else {
                    v
                };
                scaled.round().clamp(0.0, 255.0) as u8
            })
            .collect();
        // Length is width * height by construction.
        ImageBuffer::<Luma<u8>, Vec<u8>>::from_raw(self.width as u32, self.height as u32, pixels)
            .unwrap_or_else(|| GrayImage::new(self.width as u32, self.height as u32))
    }
}
