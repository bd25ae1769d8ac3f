use std::{env, time::Instant};

use env_logger::Builder;
use image::open;
use log::info;

use hough_edges::{
    color_to_gray_image, detect_polygon_edge_count, find_peaks, par_hough_transform,
    visualize_peaks, HoughConfig, PeakConfig,
};

fn main() {
    Builder::from_default_env().format_timestamp_nanos().init();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "test_image/polygon.png".to_string());
    let img = open(&path).unwrap().to_rgb8();
    info!("Loading image: {}x{}", img.width(), img.height());

    let config = HoughConfig::default();
    let instance = Instant::now();

    let gray = color_to_gray_image(&img, &config).unwrap();
    let accumulator = par_hough_transform(&gray, &config).unwrap();

    let elapsed = instance.elapsed();
    info!(
        "hough {}x{} built in {elapsed:?}, {} votes",
        accumulator.angle_bins(),
        accumulator.rho_bins(),
        accumulator.total_votes()
    );

    gray.to_luma8().save("test_image/gray.png").unwrap();
    accumulator
        .matrix()
        .to_luma8()
        .save("test_image/hough.png")
        .unwrap();

    let peak_config = PeakConfig::default();
    let mut votes = accumulator.into_matrix();
    let peaks = find_peaks(&mut votes.clone(), &peak_config).unwrap();
    visualize_peaks(&votes, &peaks)
        .save("test_image/hough_peaks.png")
        .unwrap();

    let edges = detect_polygon_edge_count(&mut votes, &peak_config).unwrap();
    info!("{} peaks marked, edge count {}", peaks.len(), edges);
}
