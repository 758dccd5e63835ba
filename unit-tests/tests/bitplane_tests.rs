//! Tests for bit-plane encoding, output processing and dithering.

use myrtio_matrix_composer::config::MAX_PWM_BITS;
use myrtio_matrix_composer::processor::{Dither, max_target};
use myrtio_matrix_composer::{
    BitPlaneEncoder, Framebuffer, LedSequence, MatrixOptions, OutputProcessor, Rgb,
};
use tests::{blank_frame, linear_options, panel, scan};

/// Place every 8-bit value once on a 32x32 frame, red channel only
fn value_ramp(frame: &mut Framebuffer) {
    for value in 0..=255u8 {
        let (x, y) = (i32::from(value % 32), i32::from(value / 32));
        frame
            .set_pixel(x, y, Rgb { r: value, g: 0, b: 0 })
            .expect("ramp fits a 32x32 frame");
    }
}

// -----------------------------------------------------------------------------
// Binary-coded modulation
// -----------------------------------------------------------------------------

#[test]
fn plane_dwell_sum_reproduces_every_target() {
    for pwm_bits in 1..=MAX_PWM_BITS {
        let config = panel(&linear_options(32, 32, 1, pwm_bits));
        let processor = OutputProcessor::from_config(&config);
        let mut frame = blank_frame(&config);
        value_ramp(&mut frame);

        let planes = BitPlaneEncoder::new(&config).encode(&frame).clone();
        let driver = scan(&config, &frame, 1);
        let sink = driver.sink();

        let mut reached = vec![false; 1 << pwm_bits];
        for value in 0..=255u8 {
            let target = processor.target(value);
            reached[usize::from(target)] = true;
            let (x, y) = (usize::from(value % 32), usize::from(value / 32));
            assert_eq!(planes.emitted(x, y), [target, 0, 0], "value {value} at {pwm_bits} bits");
            assert_eq!(
                sink.exposure(x, y),
                [u64::from(target) * 100, 0, 0],
                "value {value} at {pwm_bits} bits"
            );
        }
        // Deeper planes have more levels than 8-bit input values.
        if pwm_bits <= 8 {
            assert!(reached.iter().all(|hit| *hit), "targets at {pwm_bits} bits");
        } else {
            assert!(reached[0] && reached[(1 << pwm_bits) - 1], "ends at {pwm_bits} bits");
        }
    }
}

#[test]
fn full_depth_dithered_exposure_matches_the_target() {
    // 11 planes plus 5 dither bits, the full 16-bit precision
    let config = panel(&MatrixOptions {
        pwm_dither_bits: 5,
        luminance_correct: true,
        ..linear_options(32, 32, 1, MAX_PWM_BITS)
    });
    let processor = OutputProcessor::from_config(&config);
    let mut frame = blank_frame(&config);
    value_ramp(&mut frame);

    let window = processor.dither().window();
    assert_eq!(window, 32);
    let driver = scan(&config, &frame, 32);
    let sink = driver.sink();
    for value in 0..=255u8 {
        let (x, y) = (usize::from(value % 32), usize::from(value / 32));
        assert_eq!(
            sink.exposure(x, y),
            [u64::from(processor.target(value)) * 100, 0, 0],
            "value {value}"
        );
    }
    assert_eq!(
        u32::from(processor.target(255)),
        max_target(MAX_PWM_BITS, 5)
    );
}

#[test]
fn full_depth_linear_response_is_identity() {
    let config = panel(&linear_options(32, 32, 1, 8));
    let processor = OutputProcessor::from_config(&config);
    for value in 0..=255u8 {
        assert_eq!(processor.target(value), u16::from(value));
    }
}

#[test]
fn emitted_value_is_rebuilt_from_planes() {
    let config = panel(&linear_options(32, 32, 1, 8));
    let mut encoder = BitPlaneEncoder::new(&config);
    let mut frame = blank_frame(&config);
    frame
        .set_pixel(3, 4, Rgb { r: 200, g: 17, b: 1 })
        .expect("inside the canvas");

    let planes = encoder.encode(&frame);
    assert_eq!(planes.plane_count(), 8);
    assert_eq!(planes.emitted(3, 4), [200, 17, 1]);
    assert_eq!(planes.emitted(4, 4), [0, 0, 0]);
    // 200 = 0b1100_1000
    assert_eq!(planes.bits(3, 3, 4) & 1, 1);
    assert_eq!(planes.bits(2, 3, 4) & 1, 0);
}

#[test]
fn luminance_correction_is_monotonic_and_full_scale() {
    let processor = OutputProcessor::new(11, 0, true, false);
    assert_eq!(processor.target(0), 0);
    assert_eq!(processor.target(255), 2047);

    let mut previous = 0;
    for value in 1..=255u8 {
        let target = processor.target(value);
        assert!(target >= previous, "target drops at {value}");
        previous = target;
    }
    // Mid lightness is far below mid luminance.
    assert!(processor.target(128) < 2047 / 4);
}

#[test]
fn luminance_correction_can_be_toggled() {
    let mut processor = OutputProcessor::new(8, 0, true, false);
    assert!(processor.luminance_correct());
    processor.set_luminance_correct(false);
    assert!(!processor.luminance_correct());
    assert_eq!(processor.target(128), 128);
}

#[test]
fn pwm_bits_can_be_reduced_live() {
    let config = panel(&linear_options(32, 32, 1, 8));
    let mut encoder = BitPlaneEncoder::new(&config);
    let mut frame = blank_frame(&config);
    frame.fill(None, Rgb { r: 255, g: 255, b: 255 });

    encoder.set_pwm_bits(4);
    let planes = encoder.encode(&frame);
    assert_eq!(planes.plane_count(), 4);
    assert_eq!(planes.emitted(0, 0), [15, 15, 15]);
}

// -----------------------------------------------------------------------------
// Channel order and inversion
// -----------------------------------------------------------------------------

#[test]
fn led_sequence_routes_channels_to_wires() {
    let config = panel(&MatrixOptions {
        led_sequence: LedSequence::Gbr,
        ..linear_options(32, 32, 1, 8)
    });
    let mut encoder = BitPlaneEncoder::new(&config);
    let mut frame = blank_frame(&config);
    frame
        .set_pixel(0, 0, Rgb { r: 10, g: 20, b: 30 })
        .expect("inside the canvas");

    // R pin carries green, G pin blue, B pin red.
    assert_eq!(encoder.encode(&frame).emitted(0, 0), [20, 30, 10]);
}

#[test]
fn inverse_colors_light_black_pixels() {
    let config = panel(&MatrixOptions {
        inverse_colors: true,
        ..linear_options(32, 32, 1, 8)
    });
    let mut encoder = BitPlaneEncoder::new(&config);
    let mut frame = blank_frame(&config);
    frame
        .set_pixel(1, 1, Rgb { r: 255, g: 0, b: 55 })
        .expect("inside the canvas");

    let planes = encoder.encode(&frame);
    assert_eq!(planes.emitted(0, 0), [255, 255, 255]);
    assert_eq!(planes.emitted(1, 1), [0, 255, 200]);
}

#[test]
fn mapped_pixels_land_on_hardware_coordinates() {
    let config = panel(&MatrixOptions {
        chain_length: 2,
        pixel_mapper_config: "Rotate:90",
        ..linear_options(32, 32, 2, 8)
    });
    let mut encoder = BitPlaneEncoder::new(&config);
    let mut frame = blank_frame(&config);
    assert_eq!((frame.width(), frame.height()), (32, 64));
    frame
        .set_pixel(0, 0, Rgb { r: 77, g: 0, b: 0 })
        .expect("inside the canvas");

    let planes = encoder.encode(&frame);
    assert_eq!(planes.emitted(63, 0), [77, 0, 0]);
    assert_eq!(planes.emitted(0, 0), [0, 0, 0]);
}

#[test]
#[should_panic(expected = "encoder expects 32x32")]
fn mismatched_framebuffer_panics() {
    let config = panel(&linear_options(32, 32, 1, 8));
    let mut encoder = BitPlaneEncoder::new(&config);
    encoder.encode(&Framebuffer::new(64, 32));
}

// -----------------------------------------------------------------------------
// Temporal dithering
// -----------------------------------------------------------------------------

#[test]
fn dither_window_sums_to_target() {
    for bits in 1..=4 {
        let dither = Dither::new(bits);
        let limit = max_target(11 - bits, bits);
        for target in 0..=limit {
            let target = u16::try_from(target).expect("targets fit u16");
            let sum: u32 = (0..dither.window())
                .map(|frame| u32::from(dither.emit(target, frame)))
                .sum();
            assert_eq!(sum, u32::from(target), "target {target} with {bits} bits");
        }
    }
}

#[test]
fn dither_output_stays_within_plane_range() {
    let dither = Dither::new(3);
    let top = u16::try_from(max_target(5, 3)).expect("fits u16");
    for frame in 0..8 {
        assert!(dither.emit(top, frame) <= 31);
    }
}

#[test]
fn dithered_frames_average_to_the_extended_value() {
    let config = panel(&MatrixOptions {
        pwm_dither_bits: 2,
        ..linear_options(32, 32, 1, 4)
    });
    let processor = OutputProcessor::from_config(&config);
    let mut encoder = BitPlaneEncoder::new(&config);
    let mut frame = blank_frame(&config);
    value_ramp(&mut frame);

    let mut sums = vec![0u32; 256];
    for _ in 0..4 {
        let planes = encoder.encode(&frame);
        for value in 0..=255u8 {
            let (x, y) = (usize::from(value % 32), usize::from(value / 32));
            sums[usize::from(value)] += u32::from(planes.emitted(x, y)[0]);
        }
    }
    for value in 0..=255u8 {
        assert_eq!(sums[usize::from(value)], u32::from(processor.target(value)));
    }
    assert_eq!(encoder.frame(), 4);
}

#[test]
fn zero_dither_bits_pass_targets_through() {
    let dither = Dither::new(0);
    assert_eq!(dither.window(), 1);
    assert_eq!(dither.emit(1234, 7), 1234);
}
