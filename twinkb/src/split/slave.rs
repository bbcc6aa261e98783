use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use super::{CrossHalfPacket, PACKET_SIZE, is_handshake};
use crate::role::Role;

/// State shared between the scan loop and the bus transport's callbacks.
///
/// The transport calls [`SplitEndpoint::on_receive`] and [`SplitEndpoint::on_request`] from
/// interrupt context, at any point of the scan loop. Everything in here is either atomic or behind
/// a critical section, so the endpoint can live in a `static` and be shared by reference.
pub struct SplitEndpoint {
    /// Current role, see [`Role`]
    role: AtomicU8,
    /// Set when a role handshake arrived before the role was decided
    handshake: AtomicBool,
    /// Single-slot mailbox for the outgoing packet: a new packet overwrites an unconsumed one
    outbox: Signal<CriticalSectionRawMutex, CrossHalfPacket>,
}

impl Default for SplitEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitEndpoint {
    pub const fn new() -> Self {
        Self {
            role: AtomicU8::new(Role::Undetermined as u8),
            handshake: AtomicBool::new(false),
            outbox: Signal::new(),
        }
    }

    pub fn role(&self) -> Role {
        Role::from(self.role.load(Ordering::Acquire))
    }

    pub(crate) fn set_role(&self, role: Role) {
        self.role.store(role as u8, Ordering::Release);
    }

    /// Whether a role handshake has been received.
    pub fn handshake_received(&self) -> bool {
        self.handshake.load(Ordering::Acquire)
    }

    /// Transport callback: the peer wrote `data` to us.
    ///
    /// Only a role handshake received while the role is undecided means anything.
    pub fn on_receive(&self, data: &[u8]) {
        if self.role() == Role::Undetermined && is_handshake(data) {
            self.handshake.store(true, Ordering::Release);
        }
    }

    /// Transport callback: the peer reads a packet from us. Fills `buf` and returns the number of bytes.
    ///
    /// Hands out the ready packet and clears it, or an all-zero packet when nothing is ready.
    /// Never waits for the scan loop.
    pub fn on_request(&self, buf: &mut [u8]) -> usize {
        let packet = match self.role() {
            Role::Slave => self.outbox.try_take().unwrap_or_default(),
            _ => CrossHalfPacket::default(),
        };
        let bytes = packet.to_bytes();
        let n = buf.len().min(PACKET_SIZE);
        buf[..n].copy_from_slice(&bytes[..n]);
        n
    }

    /// Publish a packet, replacing any packet not yet taken by the transport.
    pub(crate) fn publish(&self, packet: CrossHalfPacket) {
        self.outbox.signal(packet);
    }

    /// Whether a packet is waiting for the transport.
    pub fn packet_ready(&self) -> bool {
        self.outbox.signaled()
    }
}

/// Slave side of the cross-half channel.
pub struct SlaveChannel<'a> {
    endpoint: &'a SplitEndpoint,
}

impl<'a> SlaveChannel<'a> {
    pub fn new(endpoint: &'a SplitEndpoint) -> Self {
        Self { endpoint }
    }

    /// Make this tick's packet the ready one.
    pub fn serve(&mut self, packet: CrossHalfPacket) {
        self.endpoint.publish(packet);
    }
}
