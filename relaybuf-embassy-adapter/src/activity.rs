//! Status LED driven by relay traffic
//!
//! The LED goes high when a byte arrives and low when a byte leaves, so it
//! stays lit while data is backing up in the buffer and flickers while the
//! relay keeps up.

use embedded_hal::digital::OutputPin;
use relaybuf_core::ActivityIndicator;

/// [`ActivityIndicator`] over an `embedded-hal` output pin
#[derive(Debug)]
pub struct LedActivity<P> {
    pin: P,
    pin_errors: u32,
}

impl<P: OutputPin> LedActivity<P> {
    pub fn new(pin: P) -> Self {
        Self { pin, pin_errors: 0 }
    }

    /// Number of failed pin writes; the relay is never affected by them
    pub fn pin_errors(&self) -> u32 {
        self.pin_errors
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> ActivityIndicator for LedActivity<P> {
    fn on_receive(&mut self) {
        if self.pin.set_high().is_err() {
            self.pin_errors = self.pin_errors.wrapping_add(1);
        }
    }

    fn on_send(&mut self) {
        if self.pin.set_low().is_err() {
            self.pin_errors = self.pin_errors.wrapping_add(1);
        }
    }
}
