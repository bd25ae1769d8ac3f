//! RGB to brightness conversion.
//!
//! Each pixel's color magnitude `sqrt(R² + G² + B²)` is computed, and with
//! normalization enabled the magnitudes are rescaled into the brightness
//! range and inverted: the strongest pixel becomes `min_brightness` and a
//! black pixel becomes `max_brightness`.

use image::RgbImage;
use rayon::prelude::*;

use crate::config::HoughConfig;
use crate::error::{HoughError, Result};
use crate::matrix::Matrix;

#[inline]
fn magnitude(rgb: &[u8]) -> f64 {
    let r = rgb[0] as f64;
    let g = rgb[1] as f64;
    let b = rgb[2] as f64;
    (r * r + g * g + b * b).sqrt()
}

fn check_rgb_len(data: &[u8], width: usize, height: usize) -> Result<()> {
    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(3))
        .unwrap_or(usize::MAX);
    if data.len() != expected {
        return Err(HoughError::BufferSize {
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Normalization factor mapping `max_magnitude` onto the brightness span.
fn alpha(max_magnitude: f64, config: &HoughConfig) -> Result<f64> {
    if max_magnitude <= 0.0 {
        return Err(HoughError::DegenerateImage);
    }
    Ok((config.max_brightness - config.min_brightness) / max_magnitude)
}

/// Converts interleaved RGB bytes into a brightness matrix.
///
/// # Arguments
///
/// * `data` - `3 * width * height` bytes, row-major, R then G then B
/// * `width`, `height` - image dimensions in pixels
/// * `config` - brightness range and the `normalize` switch
///
/// # Errors
///
/// * [`HoughError::BufferSize`] if `data` has the wrong length
/// * [`HoughError::DegenerateImage`] if normalization is enabled and every
///   pixel is black
///
/// # Examples
///
/// ```rust
/// use hough_edges::{color_to_gray, HoughConfig};
///
/// // one white pixel, one black pixel
/// let rgb = [255u8, 255, 255, 0, 0, 0];
/// let gray = color_to_gray(&rgb, 2, 1, &HoughConfig::default()).unwrap();
/// assert!(gray.as_slice()[0].abs() < 1e-9);
/// assert_eq!(gray.as_slice()[1], 255.0);
/// ```
pub fn color_to_gray(
    data: &[u8],
    width: usize,
    height: usize,
    config: &HoughConfig,
) -> Result<Matrix> {
    check_rgb_len(data, width, height)?;

    let mut most_bright = 0.0f64;
    let magnitudes: Vec<f64> = data
        .chunks_exact(3)
        .map(|rgb| {
            let m = magnitude(rgb);
            most_bright = most_bright.max(m);
            m
        })
        .collect();

    let mut gray = Matrix::from_vec(width, height, magnitudes)?;
    debug!("gray {}x{}, brightest magnitude {}", width, height, most_bright);

    if config.normalize {
        let alpha = alpha(most_bright, config)?;
        let max = config.max_brightness;
        for v in gray.as_mut_slice() {
            *v = max - *v * alpha;
        }
    }
    Ok(gray)
}

/// Parallel variant of [`color_to_gray`] producing identical output.
///
/// The max reduction finishes before the rewrite pass starts.
pub fn par_color_to_gray(
    data: &[u8],
    width: usize,
    height: usize,
    config: &HoughConfig,
) -> Result<Matrix> {
    check_rgb_len(data, width, height)?;

    let mut magnitudes: Vec<f64> = data.par_chunks_exact(3).map(magnitude).collect();
    let most_bright = magnitudes.par_iter().copied().reduce(|| 0.0, f64::max);
    debug!("par gray {}x{}, brightest magnitude {}", width, height, most_bright);

    if config.normalize {
        let alpha = alpha(most_bright, config)?;
        let max = config.max_brightness;
        magnitudes.par_iter_mut().for_each(|v| *v = max - *v * alpha);
    }
    Matrix::from_vec(width, height, magnitudes)
}

/// Converts an `image` RGB buffer, see [`color_to_gray`].
pub fn color_to_gray_image(image: &RgbImage, config: &HoughConfig) -> Result<Matrix> {
    let (width, height) = image.dimensions();
    color_to_gray(image.as_raw(), width as usize, height as usize, config)
}
