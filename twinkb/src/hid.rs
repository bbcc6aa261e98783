//! Traits and types for talking to the host.
use twinkb_types::led_indicator::LedIndicator;

use crate::report::Report;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HidError {
    /// The host link has been put to sleep
    Disabled,
    /// The endpoint refused the report
    EndpointError,
}

/// The host-facing link, usually a USB HID keyboard interface.
///
/// The link layer itself lives outside this crate; the firmware only polls enumeration, hands over
/// finished reports and reads back the lock state written by the host.
pub trait HostLink {
    /// Whether the host has enumerated and configured the device.
    fn is_enumerated(&mut self) -> bool;

    /// Stop offering the host-facing link, for good.
    fn go_dormant(&mut self);

    /// Hand a finished report to the link layer.
    fn send_report(&mut self, report: &Report) -> Result<(), HidError>;

    /// Lock state last written by the host.
    fn lock_state(&mut self) -> LedIndicator;
}
