//! # Hough Edges
//!
//! This crate turns raw RGB pixel buffers into a brightness matrix, builds a
//! rho/theta Hough accumulator from it, and runs a local-window peak heuristic
//! that gives a rough polygon edge count.
//!
//! ## Features
//!
//! - RGB magnitude conversion with normalized, inverted brightness
//! - Hough line voting over 180 one-degree theta bins
//! - Parallel variants of both stages using rayon
//! - Local window mean/maximum with an explicit peak-marking step
//! - Edge-count heuristic over a grid of windows
//! - Rendering helpers for handing matrices to `image` writers
//! - Optional debug logging (enable with `logger` feature)
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use image::open;
//! use hough_edges::{color_to_gray_image, hough_transform, HoughConfig};
//!
//! let image = open("example.png").unwrap().to_rgb8();
//! let config = HoughConfig::default();
//!
//! let gray = color_to_gray_image(&image, &config).unwrap();
//! let accumulator = hough_transform(&gray, &config).unwrap();
//!
//! accumulator.matrix().to_luma8().save("hough.png").unwrap();
//! println!("{} votes cast", accumulator.total_votes());
//! ```
//!
//! ## Optional Features
//!
//! ### Logger Feature
//!
//! Enable debug logging to follow the pipeline:
//!
//! ```toml
//! [dependencies]
//! hough-edges = { version = "0.1.0", features = ["logger"] }
//! log = "0.4"
//! env_logger = "0.11"
//! ```
//!
//! ```rust,no_run
//! use hough_edges::{hough_transform, HoughConfig, Matrix};
//!
//! env_logger::init();
//!
//! let image = Matrix::zeros(64, 64);
//! let accumulator = hough_transform(&image, &HoughConfig::default()).unwrap();
//! // With logger feature, you'll see debug messages like:
//! // DEBUG hough_edges::hough: hough accumulator 180x182, diagonal 91
//! // DEBUG hough_edges::hough: hough total votes 0
//! ```
//!
//! ## Edge Counting
//!
//! ```rust
//! use hough_edges::{detect_polygon_edge_count, Matrix, PeakConfig};
//!
//! let mut matrix = Matrix::zeros(40, 40);
//! matrix.set(10, 10, 120.0);
//!
//! // The sweep marks the dominant sample as 255 before counting.
//! let count = detect_polygon_edge_count(&mut matrix, &PeakConfig::default()).unwrap();
//! assert_eq!(count, 1);
//! assert_eq!(matrix.get(10, 10), 255.0);
//! ```

// Conditional logging macros
#[cfg(feature = "logger")]
macro_rules! debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(feature = "logger"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

pub mod config;
pub mod error;
pub mod gray;
pub mod hough;
pub mod matrix;
pub mod peaks;

pub use config::{
    HoughConfig, PeakConfig, WindowBounds, DEFAULT_ANGLE_BINS, DEFAULT_KERNEL_SIZE,
    HOUGH_THRESHOLD, MAX_BRIGHTNESS, MIN_BRIGHTNESS,
};
pub use error::{HoughError, Result};
pub use gray::{color_to_gray, color_to_gray_image, par_color_to_gray};
pub use hough::{
    angle_table, diagonal_length, edge_strength, hough_transform, par_hough_transform,
    Accumulator,
};
pub use matrix::Matrix;
pub use peaks::{
    detect_polygon_edge_count, detect_polygon_orientation, find_peaks, is_dominant,
    kernel_mean, kernel_stats, mark_peak, visualize_peaks, KernelStats, Peak,
};
