#[allow(dead_code)]
mod common;

use approx::assert_abs_diff_eq;
use ndarray::{ArrayD, Axis, IxDyn};

use flicker_core::analysis::fluctuation::frequency_axis;
use flicker_core::analysis::{analyze, decompose};
use flicker_core::error::FlickerError;
use flicker_core::stack::IntensityStack;

#[test]
fn test_decomposition_reconstructs_stack() {
    let stack = common::patterned_stack(12, 5, 7);
    let (mean, fluct) = decompose(&stack).unwrap();
    assert_eq!(mean.shape(), &[5, 7]);
    assert_eq!(fluct.shape(), stack.data.shape());

    let rebuilt = &fluct + &mean.view().insert_axis(Axis(0));
    for (a, b) in rebuilt.iter().zip(stack.data.iter()) {
        assert!((a - b).abs() < 1e-9, "{a} vs {b}");
    }
}

#[test]
fn test_fluctuation_has_zero_temporal_mean() {
    let stack = common::patterned_stack(9, 4, 4);
    let (_, fluct) = decompose(&stack).unwrap();
    let temporal_mean = fluct.mean_axis(Axis(0)).unwrap();
    for v in temporal_mean.iter() {
        assert!(v.abs() < 1e-9);
    }
}

#[test]
fn test_sinusoid_peak_at_expected_bin() {
    let (t, fs, bin, amp) = (30, 5.6, 3, 12.0);
    let stack = common::cosine_stack(t, 6, fs, bin, amp);
    let stats = analyze(&stack, fs).unwrap();

    assert_eq!(stats.amplitude.shape(), &[15, 6, 6]);
    for k in 0..stats.bins() {
        let plane = stats.amplitude.index_axis(Axis(0), k);
        for &v in plane.iter() {
            if k == bin {
                assert_abs_diff_eq!(v, amp, epsilon = 1e-9);
            } else {
                assert_abs_diff_eq!(v, 0.0, epsilon = 1e-9);
            }
        }
    }
    assert_abs_diff_eq!(stats.frequency_axis[bin], fs * bin as f64 / t as f64, epsilon = 1e-12);
}

#[test]
fn test_sinusoid_peak_on_parallel_path() {
    // 64x64 pixels crosses the parallel threshold.
    let (t, fs, bin, amp) = (16, 10.0, 5, 3.0);
    let stack = common::cosine_stack(t, 64, fs, bin, amp);
    let stats = analyze(&stack, fs).unwrap();
    let peak = stats.amplitude.index_axis(Axis(0), bin);
    assert!(peak.iter().all(|&v| (v - amp).abs() < 1e-9));
    let off = stats.amplitude.index_axis(Axis(0), bin + 1);
    assert!(off.iter().all(|&v| v.abs() < 1e-9));
}

#[test]
fn test_fluctuation_strength_of_cosine() {
    // Population std of A*cos over whole periods is A / sqrt(2).
    let stack = common::cosine_stack(40, 3, 4.0, 4, 10.0);
    let stats = analyze(&stack, 4.0).unwrap();
    let expected = 10.0 / 2f64.sqrt();
    for &v in stats.fluctuation_strength.iter() {
        assert_abs_diff_eq!(v, expected, epsilon = 1e-9);
    }
    for &v in stats.mean_intensity.iter() {
        assert_abs_diff_eq!(v, 100.0, epsilon = 1e-9);
    }
}

#[test]
fn test_constant_stack_has_no_fluctuation() {
    let stack = common::constant_stack(20, 4, 4, 42.0);
    let stats = analyze(&stack, 5.6).unwrap();
    assert!(stats.fluctuation_strength.iter().all(|v| v.abs() < 1e-12));
    assert!(stats.amplitude.iter().all(|v| v.abs() < 1e-12));
    assert!(stats.mean_intensity.iter().all(|v| (v - 42.0).abs() < 1e-12));
}

#[test]
fn test_frequency_axis_formula() {
    for &t in &[2usize, 3, 10, 31, 64] {
        for &fs in &[1.0, 5.6, 100.0] {
            let axis = frequency_axis(t, fs);
            assert_eq!(axis.len(), t / 2);
            for (k, &f) in axis.iter().enumerate() {
                assert_eq!(f, fs * k as f64 / t as f64);
            }
        }
    }
}

#[test]
fn test_odd_time_points_floor_bins() {
    let stack = common::patterned_stack(7, 2, 2);
    let stats = analyze(&stack, 1.0).unwrap();
    assert_eq!(stats.bins(), 3);
    assert_eq!(stats.amplitude.shape(), &[3, 2, 2]);
}

#[test]
fn test_two_time_points_minimum() {
    let stack = common::patterned_stack(2, 3, 3);
    let stats = analyze(&stack, 5.6).unwrap();
    assert_eq!(stats.bins(), 1);
    // The only bin is DC of a zero-mean series.
    assert!(stats.amplitude.iter().all(|v| v.abs() < 1e-9));
}

#[test]
fn test_single_time_point_rejected() {
    let stack = common::constant_stack(1, 4, 4, 1.0);
    assert!(matches!(analyze(&stack, 5.6), Err(FlickerError::InvalidInput(_))));
}

#[test]
fn test_missing_spatial_axes_rejected() {
    let stack = IntensityStack::new(ArrayD::zeros(IxDyn(&[10])));
    assert!(matches!(decompose(&stack), Err(FlickerError::InvalidInput(_))));
}

#[test]
fn test_bad_sample_frequency_rejected() {
    let stack = common::constant_stack(4, 2, 2, 1.0);
    assert!(analyze(&stack, 0.0).is_err());
    assert!(analyze(&stack, -1.0).is_err());
    assert!(analyze(&stack, f64::NAN).is_err());
}

#[test]
fn test_channel_axis_is_spatial() {
    // [T, H, W, C]: statistics keep the channel axis.
    let data = ArrayD::from_shape_fn(IxDyn(&[8, 2, 3, 2]), |ix| {
        (ix[0] % 2) as f64 * (ix[3] + 1) as f64
    });
    let stats = analyze(&IntensityStack::new(data), 2.0).unwrap();
    assert_eq!(stats.mean_intensity.shape(), &[2, 3, 2]);
    assert_eq!(stats.amplitude.shape(), &[4, 2, 3, 2]);
    assert_abs_diff_eq!(stats.mean_intensity[[0, 0, 0]], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(stats.mean_intensity[[0, 0, 1]], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(stats.fluctuation_strength[[1, 2, 1]], 1.0, epsilon = 1e-12);
}
