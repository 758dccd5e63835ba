use std::cell::RefCell;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use myrtio_matrix_composer::config::check_brightness;
use myrtio_matrix_composer::{
    BitPlaneEncoder, HardwareIoError, PanelConfig, PanelSink, RefreshSnapshot, RuntimeOptions,
    RuntimeStatus, ScanDriver, SharedState,
};

use super::events::{RuntimeEvent, RuntimeEvents};
use super::RuntimeError;
use crate::core::sync::{Canvas, GpioLease, frame_exchange};
use crate::infrastructure::tasks::{RefreshContext, RefreshParts, refresh_task};

/// Name of the refresh thread
const REFRESH_THREAD_NAME: &str = "matrix-refresh";

type RefreshOutcome<S> = (RefreshParts<S>, Result<(), HardwareIoError>);

/// Parts handed to the refresh thread, left in place when the spawn fails
type Handoff<S> = Mutex<CriticalSectionRawMutex, RefCell<Option<RefreshParts<S>>>>;

/// Owns the refresh loop of one panel chain
///
/// Created stopped. Dropping the controller stops the refresh thread and
/// releases the GPIO lease.
pub struct RuntimeController<S: PanelSink + Send + 'static> {
    config: PanelConfig,
    options: RuntimeOptions,
    shared: Arc<SharedState>,
    events: Arc<RuntimeEvents>,
    /// Present while stopped
    parts: Option<RefreshParts<S>>,
    /// Present while the refresh thread exists
    worker: Option<JoinHandle<Option<RefreshOutcome<S>>>>,
    /// Refresh thread stack size, platform default when unset
    stack_size: Option<usize>,
    lease: GpioLease,
}

impl<S: PanelSink + Send + 'static> RuntimeController<S> {
    /// Create a stopped controller and the application's canvas
    ///
    /// Fails with [`RuntimeError::HardwareBusy`] when `sink` drives GPIO
    /// lines already leased to another controller.
    pub fn new(
        config: PanelConfig,
        options: RuntimeOptions,
        sink: S,
    ) -> Result<(Self, Canvas), RuntimeError> {
        let lease = GpioLease::acquire(sink.drives_gpio())?;

        let visible = config.visible_size();
        let (canvas, frames) = frame_exchange(visible.width, visible.height);
        let parts = RefreshParts {
            driver: ScanDriver::new(&config, sink),
            encoder: BitPlaneEncoder::new(&config),
            frames,
        };

        log::info!(
            "matrix: {}x{} hardware canvas, {}x{} visible, {} bit planes",
            config.canvas_width(),
            config.canvas_height(),
            visible.width,
            visible.height,
            config.pwm_bits()
        );
        if !config.mappers().is_identity() {
            log::info!("matrix: pixel mappers {}", config.mappers());
        }
        if config.hardware_pulsing() {
            log::debug!("matrix: no PWM peripheral, output enable is timed in software");
        }

        let controller = Self {
            shared: Arc::new(SharedState::from_config(&config)),
            events: Arc::new(RuntimeEvents::new()),
            config,
            options,
            parts: Some(parts),
            worker: None,
            stack_size: None,
            lease,
        };
        Ok((controller, canvas))
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Visible canvas width
    pub fn width(&self) -> usize {
        self.config.visible_size().width
    }

    /// Visible canvas height
    pub fn height(&self) -> usize {
        self.config.visible_size().height
    }

    pub fn holds_gpio_lease(&self) -> bool {
        self.lease.is_claimed()
    }

    /// Stack size of the refresh thread spawned by the next [`start`](Self::start)
    pub fn set_refresh_stack_size(&mut self, stack_size: Option<usize>) {
        self.stack_size = stack_size;
    }

    /// Spawn the refresh thread
    pub fn start(&mut self) -> Result<(), RuntimeError> {
        if self.worker.as_ref().is_some_and(|worker| !worker.is_finished()) {
            return Err(RuntimeError::AlreadyRunning);
        }
        // A faulted thread may still need reaping.
        if let Err(error) = self.reap() {
            log::warn!("restarting after: {error}");
        }
        let parts = self.parts.take().ok_or(RuntimeError::DriverLost)?;

        self.shared.clear_stop();
        self.shared.set_status(RuntimeStatus::Running);

        let context = RefreshContext {
            shared: Arc::clone(&self.shared),
            events: Arc::clone(&self.events),
            lsb_nanoseconds: self.config.pwm_lsb_nanoseconds(),
            show_refresh_rate: self.config.show_refresh_rate(),
        };
        let handoff: Arc<Handoff<S>> = Arc::new(Mutex::new(RefCell::new(Some(parts))));
        let thread_handoff = Arc::clone(&handoff);

        let mut builder = thread::Builder::new().name(REFRESH_THREAD_NAME.into());
        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }
        let spawned = builder.spawn(move || {
            let parts = thread_handoff.lock(|slot| slot.borrow_mut().take())?;
            Some(refresh_task(parts, &context))
        });

        match spawned {
            Ok(worker) => {
                self.worker = Some(worker);
                self.events.publish(RuntimeEvent::Started);
                log::info!("refresh thread started");
                Ok(())
            }
            Err(error) => {
                log::error!("failed to spawn refresh thread: {error}");
                self.parts = handoff.lock(|slot| slot.borrow_mut().take());
                self.shared.set_status(RuntimeStatus::Stopped);
                Err(RuntimeError::Spawn)
            }
        }
    }

    /// Stop the refresh thread after its current cycle and blank the panel
    ///
    /// Returns the hardware error that stopped the thread, if any.
    pub fn stop(&mut self) -> Result<(), RuntimeError> {
        if self.worker.is_none() {
            log::warn!("stop requested while the refresh thread is not running");
            return Ok(());
        }
        self.shared.request_stop();
        let result = self.reap();
        if result.is_ok() {
            self.shared.set_status(RuntimeStatus::Stopped);
            self.events.publish(RuntimeEvent::Stopped {
                cycles: self.shared.cycles(),
            });
            log::info!("refresh thread stopped after {} cycles", self.shared.cycles());
        }
        result
    }

    /// Join a finished or stopping refresh thread and take its parts back
    fn reap(&mut self) -> Result<(), RuntimeError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        match worker.join() {
            Ok(Some((parts, result))) => {
                self.parts = Some(parts);
                result.map_err(RuntimeError::Hardware)
            }
            Ok(None) => {
                log::error!("refresh thread started without the scan driver");
                self.shared.set_status(RuntimeStatus::Faulted);
                Err(RuntimeError::DriverLost)
            }
            Err(_) => {
                log::error!("refresh thread panicked");
                self.shared.set_status(RuntimeStatus::Faulted);
                Err(RuntimeError::RefreshPanicked)
            }
        }
    }

    pub fn status(&self) -> RuntimeStatus {
        self.shared.status()
    }

    pub fn is_running(&self) -> bool {
        self.status() == RuntimeStatus::Running
    }

    // === Tunables ===

    /// Brightness in percent
    pub fn brightness(&self) -> u8 {
        self.shared.brightness()
    }

    /// Applied at the start of the next cycle
    pub fn set_brightness(&self, brightness: u8) -> Result<(), RuntimeError> {
        check_brightness(brightness)?;
        self.shared.set_brightness(brightness);
        Ok(())
    }

    pub fn pwm_bits(&self) -> u8 {
        self.shared.pwm_bits()
    }

    /// Applied at the start of the next cycle
    pub fn set_pwm_bits(&self, pwm_bits: u8) -> Result<(), RuntimeError> {
        self.config.check_pwm_bits(pwm_bits)?;
        self.shared.set_pwm_bits(pwm_bits);
        Ok(())
    }

    pub fn luminance_correct(&self) -> bool {
        self.shared.luminance_correct()
    }

    /// Applied at the start of the next cycle
    pub fn set_luminance_correct(&self, enabled: bool) {
        self.shared.set_luminance_correct(enabled);
    }

    // === Telemetry ===

    /// Smoothed refresh rate in Hz
    pub fn refresh_rate(&self) -> u32 {
        self.shared.refresh_rate_hz()
    }

    pub fn cycles(&self) -> u64 {
        self.shared.cycles()
    }

    /// Longest scan cycle so far, in microseconds
    pub fn longest_cycle(&self) -> u32 {
        self.shared.longest_cycle_us()
    }

    pub fn snapshot(&self) -> RefreshSnapshot {
        RefreshSnapshot::from_shared(&self.shared)
    }

    /// Next lifecycle or fault event, if any
    pub fn poll_event(&self) -> Option<RuntimeEvent> {
        self.events.poll()
    }

    pub fn last_fault(&self) -> Option<HardwareIoError> {
        self.events.last_fault()
    }

    /// The sink, while the refresh thread is not running
    pub fn sink(&self) -> Option<&S> {
        self.parts.as_ref().map(|parts| parts.driver.sink())
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.parts.as_mut().map(|parts| parts.driver.sink_mut())
    }
}

impl<S: PanelSink + Send + 'static> Drop for RuntimeController<S> {
    fn drop(&mut self) {
        if self.worker.is_none() {
            return;
        }
        if let Err(error) = self.stop() {
            log::error!("refresh thread ended with: {error}");
        }
    }
}
