//! Tunable constants for the brightness, voting and peak stages.
//!
//! Every value that used to be a compile-time constant is a field here, with
//! `Default` reproducing the classic settings.

/// Lower bound of the brightness range.
pub const MIN_BRIGHTNESS: f64 = 0.0;
/// Upper bound of the brightness range.
pub const MAX_BRIGHTNESS: f64 = 255.0;
/// Pixels must strictly exceed this sample value to vote.
pub const HOUGH_THRESHOLD: f64 = 1.0;
/// One bin per integer degree in `[-90, 90)`.
pub const DEFAULT_ANGLE_BINS: usize = 180;
/// Side length of the square window used by the edge-count sweep.
pub const DEFAULT_KERNEL_SIZE: usize = 20;

/// Settings for brightness conversion and accumulator voting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughConfig {
    pub min_brightness: f64,
    pub max_brightness: f64,
    /// Rescale magnitudes into the brightness range and invert polarity.
    pub normalize: bool,
    /// Strict lower bound a sample must exceed to cast votes.
    pub vote_threshold: f64,
    /// Number of theta samples spread evenly over `[-90°, 90°)`.
    pub angle_bins: usize,
}

impl Default for HoughConfig {
    fn default() -> Self {
        Self {
            min_brightness: MIN_BRIGHTNESS,
            max_brightness: MAX_BRIGHTNESS,
            normalize: true,
            vote_threshold: HOUGH_THRESHOLD,
            angle_bins: DEFAULT_ANGLE_BINS,
        }
    }
}

impl HoughConfig {
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_vote_threshold(mut self, threshold: f64) -> Self {
        self.vote_threshold = threshold;
        self
    }

    pub fn with_angle_bins(mut self, bins: usize) -> Self {
        self.angle_bins = bins;
        self
    }

    pub fn with_brightness_range(mut self, min: f64, max: f64) -> Self {
        self.min_brightness = min;
        self.max_brightness = max;
        self
    }
}

/// How window cells falling off the matrix are filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowBounds {
    /// Only the flattened index is checked. A window crossing the left or
    /// right border reads samples from the neighbouring row.
    #[default]
    FlatIndex,
    /// Column and row are checked independently, so windows never wrap.
    Clipped,
}

/// Settings for the local peak detector and the edge-count sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakConfig {
    pub kernel_size: usize,
    /// The window maximum must exceed `dominance_factor * mean`.
    pub dominance_factor: f64,
    /// The window maximum must exceed this absolute value.
    pub absolute_floor: f64,
    /// Value written to mark a peak; samples already at this value never qualify.
    pub saturation_value: f64,
    /// Baseline for the final counting pass.
    ///
    /// Zero is a valid setting: the count then degenerates to the number of
    /// strictly positive samples.
    pub reference_mean: f64,
    pub edge_multiplier: f64,
    pub bounds: WindowBounds,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            kernel_size: DEFAULT_KERNEL_SIZE,
            dominance_factor: 10.0,
            absolute_floor: 25.0,
            saturation_value: MAX_BRIGHTNESS,
            reference_mean: 0.0,
            edge_multiplier: 51.0,
            bounds: WindowBounds::FlatIndex,
        }
    }
}

impl PeakConfig {
    pub fn with_kernel_size(mut self, kernel_size: usize) -> Self {
        self.kernel_size = kernel_size;
        self
    }

    pub fn with_reference_mean(mut self, mean: f64) -> Self {
        self.reference_mean = mean;
        self
    }

    pub fn with_bounds(mut self, bounds: WindowBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_dominance(mut self, factor: f64, floor: f64) -> Self {
        self.dominance_factor = factor;
        self.absolute_floor = floor;
        self
    }
}
