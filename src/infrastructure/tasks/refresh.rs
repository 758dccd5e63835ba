use std::sync::Arc;

use embassy_time::{Duration, Instant};

use myrtio_matrix_composer::{
    BitPlaneEncoder, DwellTiming, HardwareIoError, PanelSink, RuntimeStatus, ScanDriver,
    SharedState, Tunables,
};

use crate::core::sync::FrameReader;
use crate::runtime::RuntimeEvents;

/// Interval of the refresh rate log line
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// State owned by whoever runs the refresh loop
pub(crate) struct RefreshParts<S: PanelSink> {
    pub(crate) driver: ScanDriver<S>,
    pub(crate) encoder: BitPlaneEncoder,
    pub(crate) frames: FrameReader,
}

/// Shared handles and fixed parameters of the refresh loop
pub(crate) struct RefreshContext {
    pub(crate) shared: Arc<SharedState>,
    pub(crate) events: Arc<RuntimeEvents>,
    pub(crate) lsb_nanoseconds: u32,
    pub(crate) show_refresh_rate: bool,
}

/// Body of the `matrix-refresh` thread
///
/// Runs scan cycles until a stop is requested or the sink fails. The stop
/// flag, pending frames and tunables are only looked at between cycles.
/// Outputs are blanked on exit.
pub(crate) fn refresh_task<S: PanelSink>(
    mut parts: RefreshParts<S>,
    context: &RefreshContext,
) -> (RefreshParts<S>, Result<(), HardwareIoError>) {
    parts.frames.attach();

    let mut applied: Option<Tunables> = None;
    let mut next_report = Instant::now() + REPORT_INTERVAL;

    let result = loop {
        if context.shared.stop_requested() {
            break Ok(());
        }

        let tunables = context.shared.tunables();
        if applied != Some(tunables) {
            apply_tunables(&mut parts.encoder, tunables);
            applied = Some(tunables);
        }

        let started = Instant::now();
        let planes = parts.encoder.encode(parts.frames.acquire());
        let timing = DwellTiming::new(context.lsb_nanoseconds, tunables.brightness);
        if let Err(error) = parts.driver.run_cycle(planes, &timing) {
            break Err(error);
        }
        let elapsed = started.elapsed().as_micros();
        context
            .shared
            .record_cycle(u32::try_from(elapsed).unwrap_or(u32::MAX));

        if context.show_refresh_rate && Instant::now() >= next_report {
            log::info!(
                "refresh rate: {} Hz (longest cycle {} us)",
                context.shared.refresh_rate_hz(),
                context.shared.longest_cycle_us()
            );
            next_report += REPORT_INTERVAL;
        }
    };

    if let Err(error) = &result {
        log::error!("refresh loop stopped: {error}");
        context.events.fault(*error);
        context.shared.set_status(RuntimeStatus::Faulted);
    }
    if let Err(error) = parts.driver.blank() {
        log::error!("failed to blank outputs: {error}");
    }
    parts.frames.detach();

    (parts, result)
}

fn apply_tunables(encoder: &mut BitPlaneEncoder, tunables: Tunables) {
    log::debug!(
        "applying tunables: brightness {}%, {} bit planes, luminance correction {}",
        tunables.brightness,
        tunables.pwm_bits,
        tunables.luminance_correct
    );
    if encoder.pwm_bits() != tunables.pwm_bits {
        encoder.set_pwm_bits(tunables.pwm_bits);
    }
    if encoder.luminance_correct() != tunables.luminance_correct {
        encoder.set_luminance_correct(tunables.luminance_correct);
    }
}
