use kmeans_segment::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MODES: [ExecutionMode; 3] = [
    ExecutionMode::Serial,
    ExecutionMode::WorkerPool,
    ExecutionMode::TaskParallel,
];

fn config(channels: Channels, k: usize, mode: ExecutionMode) -> SegmentConfig {
    SegmentConfig::new()
        .channels(channels)
        .centroid_count(k)
        .max_iterations(50)
        .execution_mode(mode)
        .worker_count(4)
}

fn gradient_rgb(width: usize, height: usize) -> PixelGrid {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width) as u8);
            data.push((y * 255 / height) as u8);
            data.push(((x * y) % 256) as u8);
        }
    }
    PixelGrid::new(width, height, Channels::Rgb, data).unwrap()
}

fn noise(width: usize, height: usize, channels: Channels, seed: u64) -> PixelGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let data = (0..width * height * channels.count()).map(|_| rng.gen()).collect();
    PixelGrid::new(width, height, channels, data).unwrap()
}

/// Four flat quadrants with a little per-pixel jitter.
fn noisy_quadrants(size: usize) -> (PixelGrid, [Color; 4]) {
    let bases = [
        Color::rgb(20, 20, 20),
        Color::rgb(230, 40, 40),
        Color::rgb(40, 220, 60),
        Color::rgb(50, 60, 210),
    ];
    let mut rng = StdRng::seed_from_u64(99);
    let mut colors = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let q = (y >= size / 2) as usize * 2 + (x >= size / 2) as usize;
            let b = bases[q];
            let j = |v: u8, rng: &mut StdRng| v.saturating_add(rng.gen_range(0..6));
            colors.push(Color::rgb(j(b.values[0], &mut rng), j(b.values[1], &mut rng), j(b.values[2], &mut rng)));
        }
    }
    let seeds = [colors[0], colors[size - 1], colors[size * (size - 1)], colors[size * size - 1]];
    (PixelGrid::from_colors(size, size, Channels::Rgb, &colors).unwrap(), seeds)
}

#[test]
fn two_by_two_gray_scenario() {
    for mode in MODES {
        for seed in 0..25 {
            let cfg = config(Channels::Gray, 2, mode).max_iterations(10).seed(seed);
            let mut grid = PixelGrid::from_gray_rows(&[[10u8, 12], [200, 210]]).unwrap();
            let result = segment(&mut grid, &cfg).unwrap();

            assert!(result.converged, "mode {mode} seed {seed}");
            assert_eq!(grid.data(), &[11, 11, 205, 205], "mode {mode} seed {seed}");
            let labels = result.labels.as_slice();
            assert_eq!(labels[0], labels[1]);
            assert_eq!(labels[2], labels[3]);
            assert_ne!(labels[0], labels[2]);
        }
    }
}

#[test]
fn terminates_within_max_iterations() {
    for mode in MODES {
        for (k, max) in [(3usize, 1usize), (7, 4), (16, 25)] {
            let cfg = config(Channels::Rgb, k, mode).max_iterations(max).seed(k as u64);
            let mut grid = noise(19, 11, Channels::Rgb, 3);
            let result = segment(&mut grid, &cfg).unwrap();
            assert!(result.iterations >= 1);
            assert!(result.iterations <= max);
            assert_eq!(result.labels.len(), grid.len());
            assert!(result.labels.as_slice().iter().all(|&l| (l as usize) < k));
        }
    }
}

#[test]
fn output_pixels_are_their_cluster_colors() {
    let cfg = config(Channels::Rgb, 6, ExecutionMode::WorkerPool).seed(11);
    let mut grid = gradient_rgb(40, 30);
    let result = segment(&mut grid, &cfg).unwrap();
    for idx in 0..grid.len() {
        let label = result.labels.as_slice()[idx] as usize;
        assert_eq!(grid.color(idx), result.centroids[label]);
    }
    assert!(grid.unique_colors() <= 6);
}

#[test]
fn single_centroid_yields_integer_mean_in_every_mode() {
    let source = gradient_rgb(33, 17);
    let mut sums = [0u64; 3];
    for idx in 0..source.len() {
        for (ch, s) in sums.iter_mut().enumerate() {
            *s += source.pixel(idx)[ch] as u64;
        }
    }
    let n = source.len() as u64;
    let mean = Color::rgb((sums[0] / n) as u8, (sums[1] / n) as u8, (sums[2] / n) as u8);

    for mode in MODES {
        let mut grid = source.clone();
        let result = segment(&mut grid, &config(Channels::Rgb, 1, mode).seed(4)).unwrap();
        assert!(result.converged);
        assert_eq!(result.centroids, vec![mean], "mode {mode}");
        assert_eq!(grid, PixelGrid::filled(33, 17, Channels::Rgb, mean));
    }
}

#[test]
fn strategies_produce_equivalent_partitions() {
    for (channels, k) in [(Channels::Rgb, 5usize), (Channels::Gray, 4)] {
        let source = noise(29, 21, channels, 8);
        let mut baseline = source.clone();
        let expected = segment(&mut baseline, &config(channels, k, ExecutionMode::Serial).seed(77)).unwrap();

        for mode in [ExecutionMode::WorkerPool, ExecutionMode::TaskParallel] {
            for workers in [1usize, 3, 8] {
                let cfg = config(channels, k, mode).worker_count(workers).seed(77);
                let mut grid = source.clone();
                let result = segment(&mut grid, &cfg).unwrap();
                assert_eq!(result.iterations, expected.iterations, "{mode} x{workers}");
                assert!(result.labels.same_partition(&expected.labels), "{mode} x{workers}");
                assert_eq!(grid, baseline, "{mode} x{workers}");
            }
        }
    }
}

#[test]
fn more_workers_than_pixels() {
    let cfg = config(Channels::Gray, 2, ExecutionMode::WorkerPool).worker_count(16);
    let mut engine = SegmentationEngine::new(cfg).unwrap();
    let mut grid = PixelGrid::from_gray_rows(&[[0u8, 255, 250]]).unwrap();
    let result = engine
        .process_with_seeds(&mut grid, &[Color::gray(0), Color::gray(255)])
        .unwrap();
    assert_eq!(grid.data(), &[0, 252, 252]);
    assert_eq!(result.cluster_sizes(), vec![1, 2]);
}

#[test]
fn pre_converged_seeds_finish_in_one_iteration() {
    for mode in MODES {
        let mut engine = SegmentationEngine::new(config(Channels::Gray, 2, mode)).unwrap();
        let mut grid = PixelGrid::from_gray_rows(&[[10u8, 12], [200, 210]]).unwrap();
        let result = engine
            .process_with_seeds(&mut grid, &[Color::gray(11), Color::gray(205)])
            .unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(engine.state(), kmeans_segment::EngineState::Remapped);
    }
}

#[test]
fn rerun_on_quantized_image_is_idempotent() {
    for mode in MODES {
        let (mut grid, seeds) = noisy_quadrants(24);
        let mut engine = SegmentationEngine::new(config(Channels::Rgb, 4, mode)).unwrap();
        let first = engine.process_with_seeds(&mut grid, &seeds).unwrap();
        assert!(first.converged);
        assert_eq!(grid.unique_colors(), 4);

        let quantized = grid.clone();
        let second = engine.process_with_seeds(&mut grid, &first.centroids).unwrap();
        assert!(second.converged);
        assert_eq!(second.iterations, 1);
        assert_eq!(second.labels, first.labels);
        assert_eq!(grid, quantized);
    }
}

#[test]
fn distinct_colors_as_centroids_leave_no_empty_cluster() {
    let colors = [
        Color::rgb(0, 0, 0),
        Color::rgb(255, 255, 255),
        Color::rgb(255, 0, 0),
        Color::rgb(0, 255, 0),
        Color::rgb(0, 0, 255),
        Color::rgb(128, 128, 0),
    ];
    for mode in MODES {
        let mut grid = PixelGrid::from_colors(3, 2, Channels::Rgb, &colors).unwrap();
        let mut engine = SegmentationEngine::new(config(Channels::Rgb, 6, mode)).unwrap();
        let result = engine.process_with_seeds(&mut grid, &colors).unwrap();
        assert_eq!(result.empty_cluster_events, 0);
        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.cluster_sizes(), vec![1; 6]);
        assert_eq!(grid, PixelGrid::from_colors(3, 2, Channels::Rgb, &colors).unwrap());
    }
}

#[test]
fn injected_rng_is_reproducible() {
    let source = noise(16, 16, Channels::Rgb, 21);
    let run = || {
        let cfg = config(Channels::Rgb, 5, ExecutionMode::Serial);
        let mut engine = SegmentationEngine::with_rng(cfg, StdRng::seed_from_u64(1234)).unwrap();
        let mut grid = source.clone();
        let result = engine.process(&mut grid).unwrap();
        (grid, result.centroids, result.iterations)
    };
    assert_eq!(run(), run());
}

#[test]
fn mode_strings_round_trip() {
    for mode in MODES {
        assert_eq!(mode.as_str().parse::<ExecutionMode>().unwrap(), mode);
    }
    assert!(matches!(
        "threads".parse::<ExecutionMode>(),
        Err(SegmentError::UnknownExecutionMode(_))
    ));
}

#[cfg(feature = "native")]
#[test]
fn quantize_dynamic_image() {
    let mut img = image::RgbImage::new(8, 8);
    for (x, _, px) in img.enumerate_pixels_mut() {
        *px = if x < 4 { image::Rgb([250, 10, 10]) } else { image::Rgb([10, 10, 250]) };
    }
    let out = kmeans_segment::quantize(&image::DynamicImage::ImageRgb8(img.clone()), Channels::Rgb, 2).unwrap();
    assert_eq!(out.to_rgb8(), img);

    let gray = kmeans_segment::quantize(&image::DynamicImage::ImageRgb8(img), Channels::Gray, 1).unwrap();
    let luma = gray.to_luma8();
    let first = luma.get_pixel(0, 0)[0];
    assert!(luma.pixels().all(|p| p[0] == first));
}
