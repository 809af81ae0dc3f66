//! Activity hook
//!
//! Side effects that mirror relay traffic, typically a status LED. The hook
//! runs after the byte has been handled and never influences what the relay
//! does with it.

/// Receives a notification for every byte moved by the relay
pub trait ActivityIndicator {
    /// Called after the inbound step consumed a byte, queued or dropped
    fn on_receive(&mut self) {}

    /// Called after the outbound step sent a byte
    fn on_send(&mut self) {}
}

/// Indicator that does nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoActivity;

impl ActivityIndicator for NoActivity {}

impl<T: ActivityIndicator + ?Sized> ActivityIndicator for &mut T {
    fn on_receive(&mut self) {
        (**self).on_receive()
    }

    fn on_send(&mut self) {
        (**self).on_send()
    }
}
