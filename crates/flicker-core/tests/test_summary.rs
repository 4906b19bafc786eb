#[allow(dead_code)]
mod common;

use approx::assert_abs_diff_eq;

use flicker_core::analysis::{aggregate, summarize, DatasetAggregate};
use flicker_core::error::FlickerError;
use flicker_core::stack::ImageInput;

#[test]
fn test_std_across_images() {
    // Same frequency, amplitudes 2 and 6: mean 4, population std 2.
    let images = vec![
        ImageInput::new(1, common::cosine_stack(20, 3, 10.0, 2, 2.0)),
        ImageInput::new(2, common::cosine_stack(20, 3, 10.0, 2, 6.0)),
    ];
    let agg = aggregate("pair", &images, 10.0).unwrap();
    let summary = summarize("pair", 4, agg).unwrap();

    assert_eq!(summary.name, "pair");
    assert_eq!(summary.dataset_id, 4);
    assert_eq!(summary.mean_amplitude_profile.len(), 10);
    assert_abs_diff_eq!(summary.mean_amplitude_profile[2], 4.0, epsilon = 1e-9);
    assert_abs_diff_eq!(summary.std_amplitude_profile[2], 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(summary.std_amplitude_profile[5], 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(summary.mean_frequency_profile[2], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(summary.mean_velocity_scalar, 100.0, epsilon = 1e-9);
}

#[test]
fn test_single_image_has_zero_spread() {
    let images = vec![ImageInput::new(1, common::patterned_stack(16, 4, 4))];
    let agg = aggregate("solo", &images, 5.6).unwrap();
    let expected = agg.images[0].amplitude_profile.clone();
    let summary = summarize("solo", 1, agg).unwrap();
    assert!(summary.std_amplitude_profile.iter().all(|v| *v == 0.0));
    for (a, b) in summary.mean_amplitude_profile.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn test_mean_frequency_with_mixed_sample_rates() {
    let images = vec![
        ImageInput::new(1, common::constant_stack(10, 2, 2, 1.0)).with_sample_frequency(2.0),
        ImageInput::new(2, common::constant_stack(10, 2, 2, 1.0)).with_sample_frequency(4.0),
    ];
    let agg = aggregate("rates", &images, 5.6).unwrap();
    let summary = summarize("rates", 1, agg).unwrap();
    // Bin 1: (0.2 + 0.4) / 2.
    assert_abs_diff_eq!(summary.mean_frequency_profile[1], 0.3, epsilon = 1e-12);
}

#[test]
fn test_empty_aggregate_rejected() {
    let err = summarize("void", 1, DatasetAggregate::default()).unwrap_err();
    assert!(matches!(err, FlickerError::EmptyDataset(_)));
}
