//! Merging the key state of both halves into the outgoing keyboard report.

use heapless::Vec;
use twinkb_types::keycode::HidKeyCode;
use twinkb_types::led_indicator::LedIndicator;
use twinkb_types::modifier::HidModifiers;
use usbd_hid::descriptor::KeyboardReport;

use crate::config::Side;
use crate::keymap::{HalfState, KeyMapper};
use crate::split::CrossHalfPacket;

/// Key slots of a boot keyboard report
pub const REPORT_KEY_SLOTS: usize = 6;
/// Size of a boot keyboard report
pub const REPORT_SIZE: usize = 2 + REPORT_KEY_SLOTS;

/// HID boot keyboard input report: modifier byte, reserved byte and six key slots.
///
/// Rebuilt from scratch every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report {
    pub modifier: HidModifiers,
    pub keycodes: [u8; REPORT_KEY_SLOTS],
}

impl Report {
    pub fn to_bytes(&self) -> [u8; REPORT_SIZE] {
        let mut buf = [0; REPORT_SIZE];
        buf[0] = self.modifier.into_bits();
        buf[2..].copy_from_slice(&self.keycodes);
        buf
    }

    /// Number of used key slots
    pub fn key_count(&self) -> usize {
        self.keycodes.iter().filter(|&&k| k != 0).count()
    }
}

impl From<Report> for KeyboardReport {
    fn from(report: Report) -> Self {
        KeyboardReport {
            modifier: report.modifier.into_bits(),
            reserved: 0,
            leds: 0,
            keycodes: report.keycodes,
        }
    }
}

/// Builds the report of the master, or the packet of the slave, from the state of the halves.
pub struct ReportComposer<'a, const N: usize> {
    mapper: &'a KeyMapper<N>,
    /// The half this composer runs on
    side: Side,
}

impl<'a, const N: usize> ReportComposer<'a, N> {
    pub fn new(mapper: &'a KeyMapper<N>, side: Side) -> Self {
        Self { mapper, side }
    }

    /// Merge the local half with the peer's packet, if any.
    ///
    /// Fn on either half selects the Fn layer for both. Local keys come first in ascending index
    /// order, then the peer's keys in slot order, until the six slots are full. The rest is dropped,
    /// and no deduplication happens across halves. Modifier and Fn indices of the peer never take
    /// a slot, even if its packet carries them.
    pub fn compose(&self, local: &HalfState<N>, remote: Option<&CrossHalfPacket>, locks: LedIndicator) -> Report {
        let mut modifier = local.modifiers;
        let mut fn_active = local.fn_active;
        if let Some(packet) = remote {
            modifier |= packet.modifiers;
            fn_active |= packet.fn_active;
        }
        let numlock = locks.num_lock();

        let mut keys: Vec<u8, REPORT_KEY_SLOTS> = Vec::new();
        let local_codes = local
            .keys_down
            .iter()
            .map(|&index| self.mapper.map(index, self.side, fn_active, numlock));
        let local_dropped = push_codes(&mut keys, local_codes);

        let mut remote_dropped = false;
        if let Some(packet) = remote {
            let remote_side = self.side.opposite();
            let remote_keymap = self.mapper.side(remote_side);
            let remote_codes = packet
                .keys()
                .filter(|&index| !remote_keymap.is_excluded(index))
                .map(|index| self.mapper.map(index, remote_side, fn_active, numlock));
            remote_dropped = push_codes(&mut keys, remote_codes);
        }
        if local_dropped || remote_dropped {
            debug!("More than {} keys down, extra keys dropped", REPORT_KEY_SLOTS);
        }

        let mut keycodes = [0; REPORT_KEY_SLOTS];
        keycodes[..keys.len()].copy_from_slice(&keys);
        Report { modifier, keycodes }
    }

    /// Pack the local half into a packet for the master.
    pub fn pack(&self, local: &HalfState<N>) -> CrossHalfPacket {
        CrossHalfPacket::new(local.modifiers, local.fn_active, local.keys_down.iter().copied())
    }
}

/// Push mapped codes until the report is full, skipping no-op codes.
/// Returns `true` if some code did not fit.
fn push_codes(keys: &mut Vec<u8, REPORT_KEY_SLOTS>, codes: impl Iterator<Item = HidKeyCode>) -> bool {
    for code in codes.filter(|code| !code.is_no_op()) {
        if keys.push(code.into()).is_err() {
            return true;
        }
    }
    false
}
