use std::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use myrtio_matrix_composer::HardwareIoError;

/// Event channel capacity
const EVENT_CHANNEL_SIZE: usize = 4;

/// Lifecycle and fault notifications of the refresh loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEvent {
    Started,
    Stopped { cycles: u64 },
    Fault(HardwareIoError),
}

/// Event queue plus the last fault, shared with the refresh thread
pub struct RuntimeEvents {
    channel: Channel<CriticalSectionRawMutex, RuntimeEvent, EVENT_CHANNEL_SIZE>,
    last_fault: Mutex<CriticalSectionRawMutex, Cell<Option<HardwareIoError>>>,
}

impl RuntimeEvents {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            last_fault: Mutex::new(Cell::new(None)),
        }
    }

    /// Queue an event
    ///
    /// When nobody polls, the oldest event makes room, so the latest
    /// lifecycle change or fault is always queued.
    pub fn publish(&self, event: RuntimeEvent) {
        let Err(TrySendError::Full(event)) = self.channel.try_send(event) else {
            return;
        };
        if let Ok(evicted) = self.channel.try_receive() {
            log::warn!("event queue full, dropped {:?}", evicted);
        }
        if self.channel.try_send(event).is_err() {
            log::warn!("event queue full, dropped {:?}", event);
        }
    }

    pub fn poll(&self) -> Option<RuntimeEvent> {
        self.channel.try_receive().ok()
    }

    /// Remember and announce a hardware fault
    pub fn fault(&self, error: HardwareIoError) {
        self.last_fault.lock(|fault| fault.set(Some(error)));
        self.publish(RuntimeEvent::Fault(error));
    }

    pub fn last_fault(&self) -> Option<HardwareIoError> {
        self.last_fault.lock(Cell::get)
    }
}

impl Default for RuntimeEvents {
    fn default() -> Self {
        Self::new()
    }
}
