//! Local window statistics and the polygon edge-count heuristic.
//!
//! A square window is scanned around a center sample to get the local mean
//! and maximum. The maximum is a *dominant peak* when it is far above the
//! local mean, above an absolute floor, and not already saturated.
//! Querying ([`kernel_stats`]) never touches the matrix; marking a peak is a
//! separate, explicit step ([`mark_peak`]).

use image::{Rgb, RgbImage, buffer::ConvertBuffer};
use imageproc::drawing::draw_cross_mut;

use crate::config::{PeakConfig, WindowBounds};
use crate::error::{HoughError, Result};
use crate::matrix::Matrix;

/// Largest sample found in a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Flat index into the scanned matrix.
    pub position: usize,
    pub value: f64,
}

/// Result of scanning one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelStats {
    /// Mean of the in-bounds samples.
    pub mean: f64,
    /// Number of in-bounds samples.
    pub count: usize,
    /// First strictly positive maximum, `None` if no sample is above zero.
    pub peak: Option<Peak>,
    /// Whether `peak` passes [`is_dominant`].
    pub dominant: bool,
}

impl KernelStats {
    /// The peak, only when it is dominant.
    pub fn dominant_peak(&self) -> Option<Peak> {
        self.peak.filter(|_| self.dominant)
    }
}

/// Peak rule: `max > factor * mean`, `max > floor` and `max != saturation`.
#[inline]
pub fn is_dominant(max: f64, mean: f64, config: &PeakConfig) -> bool {
    max > config.dominance_factor * mean
        && max > config.absolute_floor
        && max != config.saturation_value
}

/// Flat index of a window cell, or `None` when the bounds policy skips it.
#[inline]
fn window_cell(
    matrix: &Matrix,
    offset: usize,
    dx: isize,
    dy: isize,
    bounds: WindowBounds,
) -> Option<usize> {
    match bounds {
        WindowBounds::FlatIndex => {
            let idx = offset as isize + dx + matrix.width() as isize * dy;
            (idx >= 0 && (idx as usize) < matrix.len()).then_some(idx as usize)
        }
        WindowBounds::Clipped => {
            let (cx, cy) = matrix.coords(offset);
            let x = cx as isize + dx;
            let y = cy as isize + dy;
            let inside = x >= 0
                && y >= 0
                && (x as usize) < matrix.width()
                && (y as usize) < matrix.height();
            inside.then(|| matrix.index(x as usize, y as usize))
        }
    }
}

/// Scans the `kernel_size` window centered at flat index `offset`.
///
/// The window covers offsets `-kernel_size/2 ..= kernel_size/2` on both axes.
/// The `kernel_size` argument always wins; `config.kernel_size` is only read
/// by the grid sweep in [`find_peaks`], which passes it through here.
/// Cells rejected by `config.bounds` are skipped and do not count toward the
/// mean. The matrix is not modified.
///
/// # Errors
///
/// * [`HoughError::InvalidKernelSize`] for a zero kernel
/// * [`HoughError::OffsetOutOfBounds`] if `offset` is not a valid index
///
/// # Examples
///
/// ```rust
/// use hough_edges::{kernel_stats, Matrix, PeakConfig};
///
/// let matrix = Matrix::from_vec(3, 3, vec![4.0; 9]).unwrap();
/// let stats = kernel_stats(&matrix, 4, 3, &PeakConfig::default()).unwrap();
/// assert_eq!(stats.mean, 4.0);
/// assert_eq!(stats.count, 9);
/// assert!(!stats.dominant);
/// ```
pub fn kernel_stats(
    matrix: &Matrix,
    offset: usize,
    kernel_size: usize,
    config: &PeakConfig,
) -> Result<KernelStats> {
    if kernel_size == 0 {
        return Err(HoughError::InvalidKernelSize);
    }
    if offset >= matrix.len() {
        return Err(HoughError::OffsetOutOfBounds {
            offset,
            len: matrix.len(),
        });
    }

    let half = (kernel_size / 2) as isize;
    let data = matrix.as_slice();
    let mut sum = 0.0;
    let mut count = 0usize;
    let mut peak: Option<Peak> = None;

    for dx in -half..=half {
        for dy in -half..=half {
            let Some(idx) = window_cell(matrix, offset, dx, dy, config.bounds) else {
                continue;
            };
            let value = data[idx];
            sum += value;
            count += 1;
            if value > peak.map_or(0.0, |p| p.value) {
                peak = Some(Peak {
                    position: idx,
                    value,
                });
            }
        }
    }

    // The center is always in bounds, so count >= 1.
    let mean = sum / count as f64;
    let dominant = peak.is_some_and(|p| is_dominant(p.value, mean, config));
    Ok(KernelStats {
        mean,
        count,
        peak,
        dominant,
    })
}

/// Overwrites the peak position with the saturation value.
pub fn mark_peak(matrix: &mut Matrix, peak: &Peak, config: &PeakConfig) {
    if let Some(v) = matrix.as_mut_slice().get_mut(peak.position) {
        *v = config.saturation_value;
    }
}

/// Window mean at `offset`, marking a dominant peak in place.
///
/// Returns the mean and the peak that was marked, if any. Callers should be
/// aware that `matrix` may change. As in [`kernel_stats`], the `kernel_size`
/// argument is used and `config.kernel_size` is ignored.
pub fn kernel_mean(
    matrix: &mut Matrix,
    offset: usize,
    kernel_size: usize,
    config: &PeakConfig,
) -> Result<(f64, Option<Peak>)> {
    let stats = kernel_stats(matrix, offset, kernel_size, config)?;
    let marked = stats.dominant_peak();
    if let Some(peak) = &marked {
        debug!(
            "offset:{}, mean:{}, count:{}, max:{}",
            offset, stats.mean, stats.count, peak.value
        );
        mark_peak(matrix, peak, config);
    }
    Ok((stats.mean, marked))
}

/// Sweeps a grid of window centers and marks every dominant peak.
///
/// Centers start at `kernel_size / 2` on both axes and step by `kernel_size`,
/// columns in the outer loop. Returns the peaks in the order they were marked.
pub fn find_peaks(matrix: &mut Matrix, config: &PeakConfig) -> Result<Vec<Peak>> {
    let kernel_size = config.kernel_size;
    if kernel_size == 0 {
        return Err(HoughError::InvalidKernelSize);
    }
    let half = kernel_size / 2;
    let mut peaks = Vec::new();

    for x in (half..matrix.width()).step_by(kernel_size) {
        for y in (half..matrix.height()).step_by(kernel_size) {
            let offset = matrix.index(x, y);
            if let (_, Some(peak)) = kernel_mean(matrix, offset, kernel_size, config)? {
                peaks.push(peak);
            }
        }
    }
    debug!("marked {} peaks with kernel {}", peaks.len(), kernel_size);
    Ok(peaks)
}

/// Rough polygon edge count of a matrix.
///
/// Runs [`find_peaks`] (mutating `matrix`), then counts samples strictly above
/// `config.reference_mean * config.edge_multiplier`. With the default
/// reference mean of zero this is the number of strictly positive samples.
///
/// # Examples
///
/// ```rust
/// use hough_edges::{detect_polygon_edge_count, Matrix, PeakConfig};
///
/// let mut matrix = Matrix::zeros(40, 40);
/// assert_eq!(detect_polygon_edge_count(&mut matrix, &PeakConfig::default()).unwrap(), 0);
/// ```
pub fn detect_polygon_edge_count(matrix: &mut Matrix, config: &PeakConfig) -> Result<usize> {
    find_peaks(matrix, config)?;

    let cutoff = config.reference_mean * config.edge_multiplier;
    let count = matrix.as_slice().iter().filter(|&&v| v > cutoff).count();
    debug!("edge count {} above {}", count, cutoff);
    Ok(count)
}

/// Polygon orientation is not provided; always returns
/// [`HoughError::Unsupported`].
pub fn detect_polygon_orientation(_matrix: &Matrix) -> Result<f64> {
    Err(HoughError::Unsupported("polygon orientation"))
}

/// Renders a matrix in gray and marks each peak with a red cross.
pub fn visualize_peaks(matrix: &Matrix, peaks: &[Peak]) -> RgbImage {
    let mut canvas: RgbImage = matrix.to_luma8().convert();
    let red = Rgb([255u8, 0, 0]);
    for peak in peaks {
        let (x, y) = matrix.coords(peak.position);
        draw_cross_mut(&mut canvas, red, x as i32, y as i32);
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clipped() -> PeakConfig {
        PeakConfig::default().with_bounds(WindowBounds::Clipped)
    }

    #[test]
    fn test_uniform_window_mean_is_exact() {
        let matrix = Matrix::from_vec(5, 5, vec![7.25; 25]).unwrap();
        for config in [PeakConfig::default(), clipped()] {
            let stats = kernel_stats(&matrix, matrix.index(2, 2), 5, &config).unwrap();
            assert_eq!(stats.mean, 7.25);
            assert_eq!(stats.count, 25);
        }
    }

    #[test]
    fn test_kernel_size_argument_overrides_config() {
        let matrix = Matrix::from_vec(9, 9, vec![1.0; 81]).unwrap();
        let config = PeakConfig::default().with_kernel_size(9);
        let stats = kernel_stats(&matrix, matrix.index(4, 4), 3, &config).unwrap();
        assert_eq!(stats.count, 9);
    }

    #[test]
    fn test_custom_dominance_flags_what_defaults_reject() {
        // 5x5 window: 20 + 24 * 1.25 = 50, mean 2
        let mut data = vec![1.25; 25];
        data[12] = 20.0;
        let matrix = Matrix::from_vec(5, 5, data).unwrap();

        let stats = kernel_stats(&matrix, 12, 5, &clipped()).unwrap();
        assert_eq!(stats.mean, 2.0);
        assert!(!stats.dominant);

        let relaxed = clipped().with_dominance(5.0, 10.0);
        let stats = kernel_stats(&matrix, 12, 5, &relaxed).unwrap();
        assert_eq!(stats.dominant_peak(), Some(Peak { position: 12, value: 20.0 }));

        let mut marked = matrix.clone();
        let (_, peak) = kernel_mean(&mut marked, 12, 5, &relaxed).unwrap();
        assert!(peak.is_some());
        assert_eq!(marked.as_slice()[12], 255.0);
    }

    #[test]
    fn test_dominance_rule() {
        let config = PeakConfig::default();
        assert!(is_dominant(30.0, 1.0, &config));
        assert!(!is_dominant(30.0, 5.0, &config));
        assert!(!is_dominant(20.0, 0.5, &config));
        assert!(!is_dominant(255.0, 1.0, &config));
        assert!(!is_dominant(25.0, 0.0, &config));
    }

    #[test]
    fn test_window_with_mean_one_and_max_thirty_flags() {
        // 7x7 window: 30 + 19 ones + 29 zeros = 49
        let mut data = vec![0.0; 49];
        data[24] = 30.0;
        for v in data.iter_mut().take(19) {
            *v = 1.0;
        }
        let matrix = Matrix::from_vec(7, 7, data).unwrap();
        let stats = kernel_stats(&matrix, 24, 7, &clipped()).unwrap();
        assert_eq!(stats.mean, 1.0);
        assert_eq!(stats.peak, Some(Peak { position: 24, value: 30.0 }));
        assert!(stats.dominant);
    }

    #[test]
    fn test_window_with_mean_five_and_max_thirty_does_not_flag() {
        // 5x5 window: 30 + 19 fives + 5 zeros = 125
        let mut data = vec![0.0; 25];
        for i in (0..20).filter(|&i| i != 12) {
            data[i] = 5.0;
        }
        data[12] = 30.0;
        let matrix = Matrix::from_vec(5, 5, data).unwrap();
        let stats = kernel_stats(&matrix, 12, 5, &clipped()).unwrap();
        assert_eq!(stats.mean, 5.0);
        assert!(!stats.dominant);
        assert_eq!(stats.dominant_peak(), None);
    }

    #[test]
    fn test_query_does_not_mutate() {
        let mut matrix = Matrix::zeros(9, 9);
        matrix.set(4, 4, 100.0);
        let before = matrix.clone();
        let stats = kernel_stats(&matrix, matrix.index(4, 4), 9, &PeakConfig::default()).unwrap();
        assert!(stats.dominant);
        assert_eq!(matrix, before);
    }

    #[test]
    fn test_kernel_mean_marks_dominant_peak() {
        let mut matrix = Matrix::zeros(9, 9);
        matrix.set(3, 5, 100.0);
        let config = PeakConfig::default();
        let center = matrix.index(4, 4);

        let (mean, peak) = kernel_mean(&mut matrix, center, 9, &config).unwrap();
        assert_eq!(mean, 100.0 / 81.0);
        assert_eq!(peak.map(|p| p.position), Some(matrix.index(3, 5)));
        assert_eq!(matrix.get(3, 5), 255.0);

        // saturated samples are never flagged again
        let (_, again) = kernel_mean(&mut matrix, center, 9, &config).unwrap();
        assert_eq!(again, None);
    }

    #[test]
    fn test_first_maximum_wins_ties() {
        let mut matrix = Matrix::zeros(3, 3);
        matrix.set(0, 1, 50.0);
        matrix.set(2, 1, 50.0);
        let stats = kernel_stats(&matrix, 4, 3, &clipped()).unwrap();
        // dx runs in the outer loop, so column 0 is seen first
        assert_eq!(stats.peak.map(|p| p.position), Some(3));
    }

    #[test]
    fn test_no_peak_without_positive_samples() {
        let matrix = Matrix::from_vec(3, 3, vec![-1.0; 9]).unwrap();
        let stats = kernel_stats(&matrix, 4, 3, &PeakConfig::default()).unwrap();
        assert_eq!(stats.peak, None);
        assert!(!stats.dominant);
    }

    #[test]
    fn test_flat_index_bounds_wrap_rows() {
        let mut matrix = Matrix::zeros(10, 3);
        matrix.set(0, 1, 100.0);
        let center = matrix.index(9, 1);

        let flat = kernel_stats(&matrix, center, 3, &PeakConfig::default()).unwrap();
        assert_eq!(flat.count, 8);
        assert_eq!(flat.peak.map(|p| p.position), Some(matrix.index(0, 1)));

        let clip = kernel_stats(&matrix, center, 3, &clipped()).unwrap();
        assert_eq!(clip.count, 6);
        assert_eq!(clip.peak, None);
    }

    #[test]
    fn test_flat_index_skips_negative_cells() {
        let matrix = Matrix::from_vec(4, 4, vec![2.0; 16]).unwrap();
        let stats = kernel_stats(&matrix, 0, 3, &PeakConfig::default()).unwrap();
        // -5, -4, -3 and -1 are dropped; (-1, +1) wraps to index 3 on row 0
        assert_eq!(stats.count, 5);
        assert_eq!(stats.mean, 2.0);
    }

    #[test]
    fn test_invalid_arguments() {
        let matrix = Matrix::zeros(4, 4);
        let config = PeakConfig::default();
        assert_eq!(
            kernel_stats(&matrix, 16, 3, &config).unwrap_err(),
            HoughError::OffsetOutOfBounds { offset: 16, len: 16 }
        );
        assert_eq!(
            kernel_stats(&matrix, 0, 0, &config).unwrap_err(),
            HoughError::InvalidKernelSize
        );
        let mut matrix = matrix;
        assert_eq!(
            detect_polygon_edge_count(&mut matrix, &config.with_kernel_size(0)).unwrap_err(),
            HoughError::InvalidKernelSize
        );
    }

    #[test]
    fn test_edge_count_of_zero_matrix_is_zero() {
        let mut matrix = Matrix::zeros(50, 30);
        let count = detect_polygon_edge_count(&mut matrix, &PeakConfig::default()).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_edge_count_with_zero_reference_counts_positive_samples() {
        let mut matrix = Matrix::zeros(40, 40);
        matrix.set(10, 10, 100.0);
        matrix.set(35, 2, 3.0);
        let config = PeakConfig::default();

        let count = detect_polygon_edge_count(&mut matrix, &config).unwrap();
        assert_eq!(count, 2);
        assert_eq!(matrix.get(10, 10), 255.0);
        assert_eq!(matrix.get(35, 2), 3.0);
    }

    #[test]
    fn test_edge_count_with_reference_mean() {
        let mut matrix = Matrix::zeros(20, 20);
        matrix.set(1, 1, 40.0);
        matrix.set(2, 2, 60.0);
        let config = PeakConfig::default().with_reference_mean(1.0);
        // cutoff 51: only the 60 and any saturated marks survive
        let count = detect_polygon_edge_count(&mut matrix, &config).unwrap();
        assert_eq!(count, 1);
        assert_eq!(matrix.get(2, 2), 255.0);
    }

    #[test]
    fn test_find_peaks_grid_centers() {
        let mut matrix = Matrix::zeros(12, 12);
        matrix.set(1, 1, 90.0);
        matrix.set(10, 10, 80.0);
        let config = PeakConfig::default().with_kernel_size(4).with_bounds(WindowBounds::Clipped);

        let peaks = find_peaks(&mut matrix, &config).unwrap();
        let positions: Vec<_> = peaks.iter().map(|p| p.position).collect();
        assert_eq!(positions, vec![matrix.index(1, 1), matrix.index(10, 10)]);
    }

    #[test]
    fn test_orientation_is_unsupported() {
        let err = detect_polygon_orientation(&Matrix::zeros(3, 3)).unwrap_err();
        assert_eq!(err, HoughError::Unsupported("polygon orientation"));
    }

    #[test]
    fn test_visualize_peaks_draws_red_cross() {
        let matrix = Matrix::zeros(8, 8);
        let peak = Peak {
            position: matrix.index(4, 3),
            value: 255.0,
        };
        let img = visualize_peaks(&matrix, &[peak]);
        assert_eq!(img.dimensions(), (8, 8));
        assert_eq!(*img.get_pixel(4, 3), Rgb([255, 0, 0]));
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 0]));
    }
}
