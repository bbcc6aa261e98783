//! Communication between the two halves.
//!
//! The halves share a two-wire bus. The master issues one read per tick and the slave answers
//! from interrupt context with the last packet its scan loop published. Every exchange is a
//! fixed [`PACKET_SIZE`] byte [`CrossHalfPacket`].

use twinkb_types::modifier::HidModifiers;

/// Common abstraction layer of split driver
pub mod driver;
pub mod master;
pub mod slave;

/// Size of every packet on the bus
pub const PACKET_SIZE: usize = 16;
/// Key slots in a packet
pub const KEY_SLOTS: usize = PACKET_SIZE - 2;
/// Value of the first byte of a role handshake, `'S'`: "you are the slave"
pub const ROLE_HANDSHAKE_MAGIC: u8 = b'S';

const FLAG_FN_ACTIVE: u8 = 1 << 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// The buffer is not [`PACKET_SIZE`] bytes long
    WrongLength(usize),
}

/// Key state of one half, as sent over the bus.
///
/// Wire format:
///
/// | byte | content |
/// | --- | --- |
/// | 0 | modifier byte |
/// | 1 | bit0: Fn active, other bits zero |
/// | 2..16 | key slots, 0 = empty, otherwise physical index + 1 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CrossHalfPacket {
    pub modifiers: HidModifiers,
    pub fn_active: bool,
    slots: [u8; KEY_SLOTS],
}

impl CrossHalfPacket {
    /// Build a packet from the keys down of a half. Keys beyond [`KEY_SLOTS`] are dropped, in order.
    pub fn new(modifiers: HidModifiers, fn_active: bool, keys_down: impl IntoIterator<Item = u8>) -> Self {
        let mut slots = [0; KEY_SLOTS];
        let mut keys = keys_down.into_iter();
        for (slot, index) in slots.iter_mut().zip(keys.by_ref()) {
            *slot = index.saturating_add(1);
        }
        if keys.next().is_some() {
            debug!("More than {} keys down, extra keys are not sent", KEY_SLOTS);
        }
        Self {
            modifiers,
            fn_active,
            slots,
        }
    }

    /// Raw key slots
    pub fn slots(&self) -> &[u8; KEY_SLOTS] {
        &self.slots
    }

    /// Physical indices of the keys down, in slot order
    pub fn keys(&self) -> impl Iterator<Item = u8> + '_ {
        self.slots.iter().filter(|&&slot| slot > 0).map(|&slot| slot - 1)
    }

    pub fn to_bytes(&self) -> [u8; PACKET_SIZE] {
        let mut buf = [0; PACKET_SIZE];
        buf[0] = self.modifiers.into_bits();
        buf[1] = if self.fn_active { FLAG_FN_ACTIVE } else { 0 };
        buf[2..].copy_from_slice(&self.slots);
        buf
    }

    /// Parse a packet. Reserved flag bits are ignored.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, PacketError> {
        if buf.len() != PACKET_SIZE {
            return Err(PacketError::WrongLength(buf.len()));
        }
        let mut slots = [0; KEY_SLOTS];
        slots.copy_from_slice(&buf[2..]);
        Ok(Self {
            modifiers: HidModifiers::from_bits(buf[0]),
            fn_active: buf[1] & FLAG_FN_ACTIVE != 0,
            slots,
        })
    }
}

/// The packet the master sends once after it wins arbitration.
pub const fn handshake_packet() -> [u8; PACKET_SIZE] {
    let mut buf = [0; PACKET_SIZE];
    buf[0] = ROLE_HANDSHAKE_MAGIC;
    buf
}

/// Whether the buffer is a role handshake.
pub fn is_handshake(buf: &[u8]) -> bool {
    buf.len() == PACKET_SIZE && buf[0] == ROLE_HANDSHAKE_MAGIC
}
