//! Tests for the scan driver state machine over the simulated panel.

use myrtio_matrix_composer::scan::{CheckerMultiplex, MultiplexStrategy, StripeMultiplex};
use myrtio_matrix_composer::{
    BitPlaneEncoder, DwellTiming, MatrixOptions, Multiplexing, PanelSink, Rect, Rgb,
    RowAddressType, ScanDriver, ScanMode, ScanPhase, SimulatedSink,
};
use tests::{blank_frame, linear_options, panel, scan};

const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

/// Exposure of a full-white linear 8-bit pixel with a 100 ns LSB
const FULL_EXPOSURE: u64 = 255 * 100;

// -----------------------------------------------------------------------------
// Exposure
// -----------------------------------------------------------------------------

#[test]
fn every_pixel_of_a_chain_is_exposed_once_per_cycle() {
    let config = panel(&MatrixOptions {
        parallel: 2,
        ..linear_options(16, 32, 2, 8)
    });
    let mut frame = blank_frame(&config);
    frame.fill(None, WHITE);

    let driver = scan(&config, &frame, 1);
    for y in 0..config.canvas_height() {
        for x in 0..config.canvas_width() {
            assert_eq!(driver.sink().exposure(x, y), [FULL_EXPOSURE; 3], "pixel ({x}, {y})");
        }
    }
}

#[test]
fn a_single_pixel_only_lights_itself() {
    let config = panel(&linear_options(32, 64, 1, 8));
    let mut frame = blank_frame(&config);
    frame
        .set_pixel(45, 20, Rgb { r: 0, g: 99, b: 0 })
        .expect("inside the canvas");

    let driver = scan(&config, &frame, 1);
    for y in 0..32 {
        for x in 0..64 {
            let expected = if (x, y) == (45, 20) { [0, 9900, 0] } else { [0; 3] };
            assert_eq!(driver.sink().exposure(x, y), expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn brightness_scales_dwell() {
    let config = panel(&linear_options(32, 32, 1, 8));
    let mut frame = blank_frame(&config);
    frame.fill(None, WHITE);

    let mut encoder = BitPlaneEncoder::new(&config);
    let mut driver = ScanDriver::new(&config, SimulatedSink::new(&config));
    let planes = encoder.encode(&frame);
    let report = driver
        .run_cycle(planes, &DwellTiming::new(100, 50))
        .expect("simulated sink never fails");

    assert_eq!(driver.sink().exposure(7, 7), [FULL_EXPOSURE / 2; 3]);
    assert_eq!(report.dwell_ns, config.cycle_nanoseconds(50));
}

// -----------------------------------------------------------------------------
// State machine
// -----------------------------------------------------------------------------

#[test]
fn phases_follow_the_scan_order() {
    let config = panel(&linear_options(16, 16, 1, 2));
    let frame = blank_frame(&config);
    let mut encoder = BitPlaneEncoder::new(&config);
    let mut driver = ScanDriver::new(&config, SimulatedSink::new(&config));
    let timing = DwellTiming::from_config(&config);
    let planes = encoder.encode(&frame);

    assert_eq!(driver.phase(), ScanPhase::Idle);
    let mut phases = Vec::new();
    loop {
        let phase = driver.step(planes, &timing).expect("simulated sink never fails");
        phases.push(phase);
        if phase == ScanPhase::Complete {
            break;
        }
    }

    use ScanPhase::{BitPlaneEmit, Complete, Dwell, RowSelect};
    assert_eq!(
        &phases[..7],
        &[RowSelect, BitPlaneEmit, Dwell, BitPlaneEmit, Dwell, RowSelect, BitPlaneEmit]
    );
    // 8 rows of one select and two planes (emit + dwell), then completion
    assert_eq!(phases.len(), 8 * 5 + 1);
    assert_eq!(phases.last(), Some(&Complete));
    assert_eq!(driver.state().elapsed_ns, config.cycle_nanoseconds(100));
}

#[test]
fn cycle_report_counts_latches_and_rows() {
    let config = panel(&linear_options(32, 32, 1, 6));
    let frame = blank_frame(&config);
    let mut encoder = BitPlaneEncoder::new(&config);
    let mut driver = ScanDriver::new(&config, SimulatedSink::new(&config));
    let report = driver
        .run_cycle(encoder.encode(&frame), &DwellTiming::from_config(&config))
        .expect("simulated sink never fails");

    assert_eq!(report.rows, 0xFFFF);
    assert_eq!(report.latches, 16 * 6);
    assert_eq!(report.field, 0);

    let stats = driver.sink().stats();
    assert_eq!(stats.latches, 16 * 6);
    assert_eq!(stats.shifts, 16 * 6 * 32);
    assert_eq!(stats.address_writes, 16);
}

// -----------------------------------------------------------------------------
// Interlacing
// -----------------------------------------------------------------------------

#[test]
fn interlaced_fields_cover_every_row_exactly_once() {
    let config = panel(&MatrixOptions {
        scan_mode: ScanMode::Interlaced,
        ..linear_options(32, 32, 1, 4)
    });
    let frame = blank_frame(&config);
    let mut encoder = BitPlaneEncoder::new(&config);
    let mut driver = ScanDriver::new(&config, SimulatedSink::new(&config));
    let timing = DwellTiming::from_config(&config);

    let first = driver
        .run_cycle(encoder.encode(&frame), &timing)
        .expect("simulated sink never fails");
    let second = driver
        .run_cycle(encoder.encode(&frame), &timing)
        .expect("simulated sink never fails");

    assert_eq!((first.field, second.field), (0, 1));
    assert_eq!(first.rows, 0x5555);
    assert_eq!(second.rows, 0xAAAA);
    assert_eq!(first.rows & second.rows, 0);
    assert_eq!(first.rows | second.rows, 0xFFFF);
}

#[test]
fn interlaced_pair_matches_one_progressive_cycle() {
    let options = linear_options(16, 32, 1, 8);
    let progressive = panel(&options);
    let interlaced = panel(&MatrixOptions {
        scan_mode: ScanMode::Interlaced,
        ..options
    });
    let mut frame = blank_frame(&progressive);
    frame.fill(None, Rgb { r: 12, g: 34, b: 56 });

    let once = scan(&progressive, &frame, 1);
    let twice = scan(&interlaced, &frame, 2);
    for y in 0..16 {
        for x in 0..32 {
            assert_eq!(once.sink().exposure(x, y), twice.sink().exposure(x, y));
        }
    }
}

// -----------------------------------------------------------------------------
// Row addressing
// -----------------------------------------------------------------------------

#[test]
fn ab_addressing_selects_the_right_rows() {
    // (rows, lit rows)
    let cases: [(u8, [i32; 2]); 2] = [(32, [5, 27]), (64, [10, 50])];
    for (rows, lit_rows) in cases {
        let config = panel(&MatrixOptions {
            row_address_type: RowAddressType::AB,
            ..linear_options(rows, 32, 1, 3)
        });
        let mut frame = blank_frame(&config);
        for y in lit_rows {
            frame.fill(Some(Rect::new(0, y, 31, y)), WHITE);
        }

        let driver = scan(&config, &frame, 1);
        let sink = driver.sink();
        for y in 0..usize::from(rows) {
            let lit = sink.exposure(0, y) != [0; 3];
            let expected = lit_rows.iter().any(|&row| usize::try_from(row) == Ok(y));
            assert_eq!(lit, expected, "{rows} rows, row {y}");
        }
        // Two writes (A low, A high) per clocked bit, one bit per row address
        let double_rows = u64::from(rows) / 2;
        assert_eq!(sink.stats().address_writes, double_rows * double_rows * 2);
        assert_eq!(sink.selected_row(), Some(usize::from(rows) / 2 - 1));
    }
}

#[test]
fn repeated_row_selection_is_skipped() {
    let config = panel(&linear_options(16, 16, 1, 4));
    let frame = blank_frame(&config);
    let driver = scan(&config, &frame, 1);
    // One write per row, none for the other planes
    assert_eq!(driver.sink().stats().address_writes, 8);

    let mut sink = SimulatedSink::new(&config);
    sink.set_address_lines(3).expect("simulated sink never fails");
    assert_eq!(sink.selected_row(), Some(3));
}

// -----------------------------------------------------------------------------
// Multiplexing
// -----------------------------------------------------------------------------

#[test]
fn multiplex_strategies_partition_pixels() {
    let strategies: [&dyn MultiplexStrategy; 2] = [&StripeMultiplex, &CheckerMultiplex];
    for strategy in strategies {
        assert_eq!(strategy.passes(), 2);
        for y in 0..8 {
            for x in 0..8 {
                let lit = (0..strategy.passes())
                    .filter(|&pass| strategy.is_lit(pass, x, y))
                    .count();
                assert_eq!(lit, 1, "pixel ({x}, {y})");
            }
        }
    }
}

#[test]
fn multiplexed_panels_expose_each_pixel_once() {
    for multiplexing in [Multiplexing::Stripe, Multiplexing::Checker] {
        let config = panel(&MatrixOptions {
            multiplexing,
            ..linear_options(32, 32, 2, 8)
        });
        let mut frame = blank_frame(&config);
        frame.fill(None, WHITE);

        let driver = scan(&config, &frame, 1);
        for y in 0..32 {
            for x in 0..64 {
                assert_eq!(driver.sink().exposure(x, y), [FULL_EXPOSURE; 3]);
            }
        }
        // Two passes per row and plane
        assert_eq!(driver.sink().stats().latches, 16 * 8 * 2);
    }
}
