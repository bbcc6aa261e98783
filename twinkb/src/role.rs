//! One-shot master/slave arbitration at boot.
//!
//! The half that gets enumerated by a host becomes the master. The half that instead receives a
//! role handshake from its peer becomes the slave. Both conditions are polled in the same loop and
//! whichever shows up first wins; real-world timing resolves the race, as only the half with a
//! host cable ever gets enumerated.

use crate::hid::HostLink;
use crate::split::driver::SplitBus;
use crate::split::master::MasterChannel;
use crate::split::slave::SplitEndpoint;

/// Role of this half, decided once per boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Role {
    Undetermined = 0,
    /// Talks to the host and merges both halves
    Master = 1,
    /// Only reports its keys to the master
    Slave = 2,
}

impl From<u8> for Role {
    fn from(value: u8) -> Self {
        match value {
            1 => Role::Master,
            2 => Role::Slave,
            _ => Role::Undetermined,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RoleError {
    /// Gave up waiting before either condition was met
    Undecided,
}

pub struct RoleArbiter<'a> {
    endpoint: &'a SplitEndpoint,
}

impl<'a> RoleArbiter<'a> {
    pub fn new(endpoint: &'a SplitEndpoint) -> Self {
        Self { endpoint }
    }

    /// Block until a role is decided.
    ///
    /// There is no timeout: if the host never enumerates and no handshake ever arrives, this never returns.
    pub fn arbitrate<H: HostLink, B: SplitBus>(&mut self, host: &mut H, master: &mut MasterChannel<B>) -> Role {
        let decided = self.endpoint.role();
        if decided != Role::Undetermined {
            return decided;
        }

        loop {
            if let Some(role) = self.poll(host, master) {
                return role;
            }
        }
    }

    /// Poll for a role until `keep_waiting` returns `false`.
    ///
    /// `keep_waiting` is called once per unsuccessful poll. Once decided, the role never changes:
    /// later calls return it without polling.
    pub fn arbitrate_with<H: HostLink, B: SplitBus>(
        &mut self,
        host: &mut H,
        master: &mut MasterChannel<B>,
        mut keep_waiting: impl FnMut() -> bool,
    ) -> Result<Role, RoleError> {
        let decided = self.endpoint.role();
        if decided != Role::Undetermined {
            return Ok(decided);
        }

        loop {
            if let Some(role) = self.poll(host, master) {
                return Ok(role);
            }
            if !keep_waiting() {
                return Err(RoleError::Undecided);
            }
        }
    }

    /// Check both conditions once, enumeration first.
    fn poll<H: HostLink, B: SplitBus>(&mut self, host: &mut H, master: &mut MasterChannel<B>) -> Option<Role> {
        if host.is_enumerated() {
            self.endpoint.set_role(Role::Master);
            let have_slave = master.send_handshake();
            info!("Host enumerated, running as master, peer present: {}", have_slave);
            return Some(Role::Master);
        }
        if self.endpoint.handshake_received() {
            self.endpoint.set_role(Role::Slave);
            host.go_dormant();
            info!("Handshake received, running as slave");
            return Some(Role::Slave);
        }
        None
    }
}
