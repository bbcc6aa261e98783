pub mod common;

use twinkb::config::PEER_ADDRESS;
use twinkb::role::{Role, RoleArbiter, RoleError};
use twinkb::split::driver::SplitDriverError;
use twinkb::split::master::MasterChannel;
use twinkb::split::slave::SplitEndpoint;
use twinkb::split::{PACKET_SIZE, handshake_packet};

use crate::common::{FakeHost, ScriptedBus};

#[test]
fn test_handshake_makes_slave() {
    let endpoint = SplitEndpoint::new();
    let mut host = FakeHost::unplugged();
    let mut master = MasterChannel::new(ScriptedBus::default(), PEER_ADDRESS);

    let mut handshake = [0u8; PACKET_SIZE];
    handshake[0] = 0x53;
    endpoint.on_receive(&handshake);
    assert!(endpoint.handshake_received());

    let role = RoleArbiter::new(&endpoint).arbitrate(&mut host, &mut master);
    assert_eq!(role, Role::Slave);
    assert_eq!(endpoint.role(), Role::Slave);
    assert!(host.dormant);
    // A slave never writes to the bus
    assert!(master.release().written.is_empty());
}

#[test]
fn test_enumeration_makes_master() {
    let endpoint = SplitEndpoint::new();
    let mut host = FakeHost::enumerated();
    let mut master = MasterChannel::new(ScriptedBus::default(), PEER_ADDRESS);

    let role = RoleArbiter::new(&endpoint).arbitrate(&mut host, &mut master);
    assert_eq!(role, Role::Master);
    assert_eq!(endpoint.role(), Role::Master);
    assert!(!host.dormant);
    assert!(master.have_slave());
    assert_eq!(master.release().written, vec![handshake_packet().to_vec()]);
}

#[test]
fn test_failed_handshake_makes_standalone_master() {
    let endpoint = SplitEndpoint::new();
    let mut host = FakeHost::enumerated();
    let mut bus = ScriptedBus::default();
    bus.writes.push_back(Err(SplitDriverError::BusError));
    bus.reads.push_back(Ok(vec![0; PACKET_SIZE]));
    let mut master = MasterChannel::new(bus, PEER_ADDRESS);

    let role = RoleArbiter::new(&endpoint).arbitrate(&mut host, &mut master);
    assert_eq!(role, Role::Master);
    assert!(!master.have_slave());

    // A standalone master never reads the bus
    assert_eq!(master.pull(), None);
    let bus = master.release();
    assert_eq!(bus.written.len(), 1);
    assert_eq!(bus.reads.len(), 1);
}

#[test]
fn test_partial_handshake_makes_standalone_master() {
    let endpoint = SplitEndpoint::new();
    let mut host = FakeHost::enumerated();
    let mut bus = ScriptedBus::default();
    bus.writes.push_back(Ok(3));
    let mut master = MasterChannel::new(bus, PEER_ADDRESS);

    assert_eq!(RoleArbiter::new(&endpoint).arbitrate(&mut host, &mut master), Role::Master);
    assert!(!master.have_slave());
}

#[test]
fn test_late_enumeration() {
    let endpoint = SplitEndpoint::new();
    let mut host = FakeHost {
        enumerated: true,
        enumerate_after: 5,
        ..Default::default()
    };
    let mut master = MasterChannel::new(ScriptedBus::default(), PEER_ADDRESS);

    let mut polls = 0;
    let role = RoleArbiter::new(&endpoint).arbitrate_with(&mut host, &mut master, || {
        polls += 1;
        true
    });
    assert_eq!(role, Ok(Role::Master));
    assert_eq!(polls, 5);
}

#[test]
fn test_give_up_leaves_role_undetermined() {
    let endpoint = SplitEndpoint::new();
    let mut host = FakeHost::unplugged();
    let mut master = MasterChannel::new(ScriptedBus::default(), PEER_ADDRESS);

    let mut polls = 0;
    let role = RoleArbiter::new(&endpoint).arbitrate_with(&mut host, &mut master, || {
        polls += 1;
        polls < 3
    });
    assert_eq!(role, Err(RoleError::Undecided));
    assert_eq!(endpoint.role(), Role::Undetermined);
    assert!(!host.dormant);

    // The handshake can still arrive afterwards
    endpoint.on_receive(&handshake_packet());
    let role = RoleArbiter::new(&endpoint).arbitrate_with(&mut host, &mut master, || false);
    assert_eq!(role, Ok(Role::Slave));
}

#[test]
fn test_role_is_decided_once() {
    let endpoint = SplitEndpoint::new();
    let mut host = FakeHost::enumerated();
    let mut master = MasterChannel::new(ScriptedBus::default(), PEER_ADDRESS);
    assert_eq!(RoleArbiter::new(&endpoint).arbitrate(&mut host, &mut master), Role::Master);

    // A handshake after the decision is ignored
    endpoint.on_receive(&handshake_packet());
    assert!(!endpoint.handshake_received());

    let mut unplugged = FakeHost::unplugged();
    let role = RoleArbiter::new(&endpoint).arbitrate_with(&mut unplugged, &mut master, || false);
    assert_eq!(role, Ok(Role::Master));
    assert!(!unplugged.dormant);
    // The handshake went out once
    assert_eq!(master.release().written.len(), 1);
}

#[test]
fn test_blocking_arbitration_polls_until_enumerated() {
    let endpoint = SplitEndpoint::new();
    let mut host = FakeHost {
        enumerated: true,
        enumerate_after: 5,
        ..Default::default()
    };
    let mut master = MasterChannel::new(ScriptedBus::default(), PEER_ADDRESS);

    assert_eq!(RoleArbiter::new(&endpoint).arbitrate(&mut host, &mut master), Role::Master);
    assert_eq!(host.polls, 6);

    // Decided roles are returned without polling the host again
    let mut unplugged = FakeHost::unplugged();
    assert_eq!(RoleArbiter::new(&endpoint).arbitrate(&mut unplugged, &mut master), Role::Master);
    assert_eq!(unplugged.polls, 0);
    assert_eq!(master.release().written.len(), 1);
}

#[test]
fn test_only_handshakes_are_recorded() {
    let endpoint = SplitEndpoint::new();
    endpoint.on_receive(&[0; PACKET_SIZE]);
    endpoint.on_receive(&[0x53]);
    endpoint.on_receive(&[]);
    assert!(!endpoint.handshake_received());

    endpoint.on_receive(&handshake_packet());
    assert!(endpoint.handshake_received());
}
