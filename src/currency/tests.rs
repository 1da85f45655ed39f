use super::*;
use crate::config::CashsightConfig;
use crate::frame::{Frame, FrameFormat};

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

const TWENTY_GREEN: [u8; 3] = [100, 160, 80];
const DIME_SILVER: [u8; 3] = [190, 190, 190];

fn create_test_classifier() -> CurrencyClassifier {
    CurrencyClassifierBuilder::new()
        .config(CashsightConfig::default())
        .build()
        .unwrap()
}

fn fill(width: u32, height: u32, rgb: [u8; 3]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// Dark one-pixel stripes on odd columns; the color sampler never lands on them
fn paint_stripes(image: &mut RgbaImage) {
    let (width, height) = image.dimensions();
    for y in 0..height {
        for x in (3..width).step_by(8) {
            image.put_pixel(x, y, Rgba([0, 0, 0, 255]));
        }
    }
}

fn paint_disc(image: &mut RgbaImage, radius: f64, rgb: [u8; 3]) {
    let (width, height) = image.dimensions();
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            if dx * dx + dy * dy <= radius * radius {
                image.put_pixel(x, y, Rgba([rgb[0], rgb[1], rgb[2], 255]));
            }
        }
    }
}

fn striped_note(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
    let mut image = fill(width, height, rgb);
    paint_stripes(&mut image);
    Frame::from_rgba_image(1, image)
}

fn notes(results: &[ClassificationResult]) -> Vec<&ClassificationResult> {
    results.iter().filter(|r| r.kind == ShapeClass::Note).collect()
}

fn coins(results: &[ClassificationResult]) -> Vec<&ClassificationResult> {
    results.iter().filter(|r| r.kind == ShapeClass::Coin).collect()
}

#[test]
fn test_zero_dimension_frames_yield_nothing() {
    let classifier = create_test_classifier();

    let no_width = Frame::new(1, Vec::new(), 0, 480, FrameFormat::Rgba32).unwrap();
    let no_height = Frame::new(2, Vec::new(), 640, 0, FrameFormat::Rgb24).unwrap();

    assert!(classifier.classify(&no_width).is_empty());
    assert!(classifier.classify(&no_height).is_empty());
}

#[test]
fn test_oversized_hand_built_frame_yields_nothing() {
    let classifier = create_test_classifier();
    let frame = Frame {
        id: 3,
        data: Arc::new(vec![0u8; 16]),
        width: u32::MAX,
        height: u32::MAX,
        format: FrameFormat::Rgba32,
    };

    assert!(classifier.classify(&frame).is_empty());
}

#[test]
fn test_note_colored_frame_matches_template() {
    let classifier = create_test_classifier();
    let frame = striped_note(200, 100, TWENTY_GREEN);

    let results = classifier.classify(&frame);
    let found = notes(&results);

    assert_eq!(found.len(), 1);
    let note = found[0];
    assert_eq!(note.denomination, "$20");
    assert_eq!(note.currency, "USD");
    assert_eq!(note.value, 20.0);
    assert!(note.confidence >= 60 && note.confidence <= 95);
    assert_eq!(
        note.bounding_box,
        Some(BoundingBox {
            x: 40,
            y: 30,
            width: 120,
            height: 40
        })
    );
}

#[test]
fn test_far_color_yields_no_note() {
    let classifier = create_test_classifier();
    let frame = striped_note(200, 100, [0, 255, 255]);

    let signals = classifier.signals(&frame);
    assert!(detect_rectangle(&frame, &signals.edges, &CashsightConfig::default().shape).is_some());

    let results = classifier.classify(&frame);
    assert!(notes(&results).is_empty());
}

#[test]
fn test_uniform_frame_has_no_note() {
    let classifier = create_test_classifier();
    let frame = Frame::from_rgba_image(1, fill(200, 100, TWENTY_GREEN));

    let results = classifier.classify(&frame);
    assert!(notes(&results).is_empty());
}

#[test]
fn test_coin_on_dark_background() {
    let classifier = create_test_classifier();
    let mut image = fill(200, 200, [0, 0, 0]);
    paint_disc(&mut image, 70.0, DIME_SILVER);
    let frame = Frame::from_rgba_image(1, image);

    let results = classifier.classify(&frame);
    assert_eq!(results.len(), 1);

    let coin = &results[0];
    assert_eq!(coin.kind, ShapeClass::Coin);
    assert_eq!(coin.denomination, "$0.10");
    assert_eq!(coin.confidence, 90);
    assert_eq!(
        coin.bounding_box,
        Some(BoundingBox {
            x: 40,
            y: 40,
            width: 120,
            height: 120
        })
    );
}

#[test]
fn test_note_and_coin_in_one_frame() {
    let classifier = create_test_classifier();
    let mut image = fill(200, 200, TWENTY_GREEN);
    paint_stripes(&mut image);
    paint_disc(&mut image, 70.0, DIME_SILVER);
    let frame = Frame::from_rgba_image(1, image);

    let results = classifier.classify(&frame);
    assert!(results.len() <= 2);

    let found_notes = notes(&results);
    let found_coins = coins(&results);
    assert_eq!(found_notes.len(), 1);
    assert_eq!(found_coins.len(), 1);
    assert_eq!(found_notes[0].denomination, "$20");
    assert_eq!(found_coins[0].denomination, "$0.10");
}

#[test]
fn test_classification_is_deterministic() {
    let classifier = create_test_classifier();
    let mut image = fill(160, 120, TWENTY_GREEN);
    paint_stripes(&mut image);
    paint_disc(&mut image, 40.0, DIME_SILVER);
    let frame = Frame::from_rgba_image(1, image);

    let first = classifier.classify(&frame);
    for _ in 0..5 {
        assert_eq!(classifier.classify(&frame.clone()), first);
    }
}

#[test]
fn test_seeded_noise_is_reproducible() {
    let classifier = create_test_classifier();
    let frame = striped_note(200, 100, [100, 160, 60]);

    let a = classifier.classify_with_noise(&frame, &mut SeededJitter::new(11, 4.0));
    let b = classifier.classify_with_noise(&frame, &mut SeededJitter::new(11, 4.0));
    assert_eq!(a, b);

    // 20 units off the $20 primary plus the contrast bonus leaves room for jitter
    let note = notes(&a)[0];
    assert!((85..=89).contains(&note.confidence));
}

#[test]
fn test_rgb24_frames_match_rgba() {
    let classifier = create_test_classifier();
    let rgba = striped_note(200, 100, TWENTY_GREEN);

    let rgb_data: Vec<u8> = rgba
        .data
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let rgb = Frame::new(2, rgb_data, 200, 100, FrameFormat::Rgb24).unwrap();

    assert_eq!(classifier.classify(&rgb), classifier.classify(&rgba));
}

#[test]
fn test_inr_table() {
    let classifier = CurrencyClassifierBuilder::new()
        .table(TemplateTable::inr())
        .build()
        .unwrap();
    let frame = striped_note(200, 100, [200, 60, 140]);

    let results = classifier.classify(&frame);
    let note = notes(&results)[0];
    assert_eq!(note.denomination, "₹2000");
    assert_eq!(note.currency, "INR");
}

#[test]
fn test_invalid_config_rejected_by_builder() {
    let mut config = CashsightConfig::default();
    config.sampling.top_k = 0;

    let result = CurrencyClassifierBuilder::new().config(config).build();
    assert!(matches!(result, Err(crate::error::CashsightError::Config(_))));
}

#[test]
fn test_randomized_frames_respect_invariants() {
    let classifier = create_test_classifier();
    let config = CashsightConfig::default();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for id in 0..64 {
        let width = rng.random_range(1..48u32);
        let height = rng.random_range(1..48u32);
        let mut data = vec![0u8; (width * height * 4) as usize];
        rng.fill(&mut data[..]);

        let frame = Frame::new(id, data, width, height, FrameFormat::Rgba32).unwrap();
        let mut noise = SeededJitter::new(id, config.matcher.seeded_jitter_max);
        let results = classifier.classify_with_noise(&frame, &mut noise);

        assert!(results.len() <= 2);
        assert!(notes(&results).len() <= 1);
        assert!(coins(&results).len() <= 1);
        for result in &results {
            assert!(result.confidence <= 100);
            let cap = config.matcher.confidence_cap(result.kind);
            assert!(result.confidence as u32 <= cap);
            let bbox = result.bounding_box.expect("detected regions carry a box");
            assert!(bbox.fits_within(width, height));
        }
    }
}

#[test]
fn test_shared_across_threads() {
    let classifier = Arc::new(create_test_classifier());
    let frame = striped_note(200, 100, TWENTY_GREEN);
    let expected = classifier.classify(&frame);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let classifier = Arc::clone(&classifier);
            let frame = frame.clone();
            std::thread::spawn(move || classifier.classify(&frame))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_signals_on_single_color_frame() {
    let classifier = create_test_classifier();
    let frame = Frame::from_rgba_image(1, fill(40, 10, DIME_SILVER));

    let signals = classifier.signals(&frame);
    assert_eq!(signals.colors.len(), 1);
    assert_eq!(signals.colors[0].count, 40);
    assert_eq!(signals.colors[0].color, Rgb::new(180, 180, 180));
    assert!(!signals.high_contrast);
    assert!((signals.average_brightness - 190.0).abs() < 0.01);
}
