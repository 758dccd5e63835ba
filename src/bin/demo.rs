//! Runs the refresh loop against the simulated panel and animates a gradient.
//!
//! Usage: `myrtio-led-matrix-demo [MATRIX_OPTIONS_JSON] [SECONDS]`
//!
//! Example: `myrtio-led-matrix-demo '{"cols": 64, "chain_length": 2, "show_refresh_rate": true}' 5`

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use myrtio_led_matrix::{
    PanelConfig, Rgb, RuntimeController, RuntimeEvent, RuntimeOptions, SimulatedSink, StdDelay,
};

const DEFAULT_SECONDS: u64 = 3;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(json) => PanelConfig::from_json(json.as_bytes())
            .with_context(|| format!("invalid matrix options: {json}"))?,
        None => PanelConfig::default(),
    };
    let seconds = match args.next() {
        Some(value) => value.parse().context("invalid duration")?,
        None => DEFAULT_SECONDS,
    };

    if let Some(layout) = config.hardware_mapping().pin_layout() {
        log::info!(
            "{} wiring: OE {}, clock {}, strobe {}, {} parallel chains",
            config.hardware_mapping().name(),
            layout.output_enable,
            layout.clock,
            layout.strobe,
            layout.chains.len()
        );
    }

    let sink = SimulatedSink::with_delay(&config, StdDelay::new());
    let (mut controller, mut canvas) =
        RuntimeController::new(config, RuntimeOptions::default(), sink)?;
    controller.start()?;

    let started = Instant::now();
    let mut frame = 0u32;
    while started.elapsed() < Duration::from_secs(seconds) {
        draw_gradient(&mut canvas, frame);
        canvas.swap();
        frame = frame.wrapping_add(1);

        while let Some(event) = controller.poll_event() {
            log::info!("event: {event:?}");
            if let RuntimeEvent::Fault(error) = event {
                return Err(anyhow::Error::new(error).context("refresh loop failed"));
            }
        }
    }

    let snapshot = controller.snapshot();
    controller.stop()?;
    log::info!(
        "drew {frame} frames, {} cycles at {} Hz (longest cycle {} us)",
        snapshot.cycles,
        snapshot.refresh_rate_hz,
        snapshot.longest_cycle_us
    );
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn draw_gradient(canvas: &mut myrtio_led_matrix::Canvas, frame: u32) {
    let (width, height) = (canvas.width(), canvas.height());
    for y in 0..height {
        for x in 0..width {
            let color = Rgb {
                r: ((x * 255) / width.max(1)) as u8,
                g: ((y * 255) / height.max(1)) as u8,
                b: (frame % 256) as u8,
            };
            // Coordinates come from the canvas size.
            let _ = canvas.set_pixel(x as i32, y as i32, color);
        }
    }
}
