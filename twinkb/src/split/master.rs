use super::driver::{SplitBus, SplitDriverError};
use super::{CrossHalfPacket, PACKET_SIZE, handshake_packet};

/// Master side of the cross-half channel: sends the role handshake and pulls one packet per tick.
pub struct MasterChannel<B: SplitBus> {
    bus: B,
    peer_address: u8,
    /// Whether the handshake reached a peer
    have_slave: bool,
}

impl<B: SplitBus> MasterChannel<B> {
    pub fn new(bus: B, peer_address: u8) -> Self {
        Self {
            bus,
            peer_address,
            have_slave: false,
        }
    }

    pub fn have_slave(&self) -> bool {
        self.have_slave
    }

    /// Tell the peer it is the slave. Sent once, a failure makes this a standalone master.
    pub fn send_handshake(&mut self) -> bool {
        self.have_slave = match self.bus.write_packet(self.peer_address, &handshake_packet()) {
            Ok(PACKET_SIZE) => true,
            Ok(n) => {
                warn!("Handshake partially sent: {} bytes, running without peer", n);
                false
            }
            Err(e) => {
                warn!("Handshake not acknowledged: {:?}, running without peer", e);
                false
            }
        };
        self.have_slave
    }

    /// Read the peer's packet for this tick.
    ///
    /// Any failure means there is no peer data this tick. Nothing is retried, the next tick reads again.
    pub fn pull(&mut self) -> Option<CrossHalfPacket> {
        if !self.have_slave {
            return None;
        }
        match self.read() {
            Ok(packet) => Some(packet),
            Err(e) => {
                debug!("No peer data this tick: {:?}", e);
                None
            }
        }
    }

    fn read(&mut self) -> Result<CrossHalfPacket, SplitDriverError> {
        let mut buf = [0_u8; PACKET_SIZE];
        let n_bytes = self.bus.read_packet(self.peer_address, &mut buf)?;
        if n_bytes != PACKET_SIZE {
            return Err(SplitDriverError::WrongLength(n_bytes));
        }
        CrossHalfPacket::from_bytes(&buf).map_err(|_| SplitDriverError::WrongLength(n_bytes))
    }

    /// Give the bus back.
    pub fn release(self) -> B {
        self.bus
    }
}
