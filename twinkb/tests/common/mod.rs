#![allow(dead_code)]

use std::collections::VecDeque;

use twinkb::config::KEY_COUNT;
use twinkb::hid::{HidError, HostLink};
use twinkb::matrix::MatrixScanner;
use twinkb::report::Report;
use twinkb::split::driver::{SplitBus, SplitDriverError};
use twinkb::split::slave::SplitEndpoint;
use twinkb::types::led_indicator::LedIndicator;

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub const KC_LCTRL: u8 = 1 << 0;
pub const KC_LSHIFT: u8 = 1 << 1;
pub const KC_RSHIFT: u8 = 1 << 5;

/// A frame with the given physical indices pressed
pub fn frame(pressed: &[usize]) -> [bool; KEY_COUNT] {
    let mut frame = [false; KEY_COUNT];
    for &index in pressed {
        frame[index] = true;
    }
    frame
}

/// Host link that records every report it gets.
#[derive(Default)]
pub struct FakeHost {
    pub enumerated: bool,
    pub dormant: bool,
    pub locks: LedIndicator,
    pub reports: Vec<Report>,
    /// Number of `is_enumerated` polls before the host shows up
    pub enumerate_after: usize,
    pub polls: usize,
}

impl FakeHost {
    pub fn enumerated() -> Self {
        Self {
            enumerated: true,
            ..Default::default()
        }
    }

    pub fn unplugged() -> Self {
        Self::default()
    }
}

impl HostLink for FakeHost {
    fn is_enumerated(&mut self) -> bool {
        self.polls += 1;
        self.enumerated && self.polls > self.enumerate_after
    }

    fn go_dormant(&mut self) {
        self.dormant = true;
    }

    fn send_report(&mut self, report: &Report) -> Result<(), HidError> {
        if self.dormant {
            return Err(HidError::Disabled);
        }
        self.reports.push(*report);
        Ok(())
    }

    fn lock_state(&mut self) -> LedIndicator {
        self.locks
    }
}

/// Matrix that plays back a fixed list of raw frames, then repeats the last one.
pub struct ScriptedMatrix {
    frames: VecDeque<[bool; KEY_COUNT]>,
    last: [bool; KEY_COUNT],
}

impl ScriptedMatrix {
    pub fn new(frames: impl IntoIterator<Item = [bool; KEY_COUNT]>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            last: [false; KEY_COUNT],
        }
    }

    /// Hold the given keys for every following scan
    pub fn holding(pressed: &[usize]) -> Self {
        let mut matrix = Self::new([]);
        matrix.last = frame(pressed);
        matrix
    }
}

impl MatrixScanner<KEY_COUNT> for ScriptedMatrix {
    fn scan(&mut self) -> [bool; KEY_COUNT] {
        if let Some(frame) = self.frames.pop_front() {
            self.last = frame;
        }
        self.last
    }
}

/// Bus that delivers straight into the peer's endpoint callbacks, like the transport's interrupt would.
pub struct LoopbackBus<'a> {
    pub peer: &'a SplitEndpoint,
}

impl SplitBus for LoopbackBus<'_> {
    fn read_packet(&mut self, _address: u8, buf: &mut [u8]) -> Result<usize, SplitDriverError> {
        Ok(self.peer.on_request(buf))
    }

    fn write_packet(&mut self, _address: u8, data: &[u8]) -> Result<usize, SplitDriverError> {
        self.peer.on_receive(data);
        Ok(data.len())
    }
}

/// Bus with scripted results, for failures the loopback can't produce.
///
/// Unscripted reads fail, unscripted writes succeed.
#[derive(Default)]
pub struct ScriptedBus {
    pub reads: VecDeque<Result<Vec<u8>, SplitDriverError>>,
    pub writes: VecDeque<Result<usize, SplitDriverError>>,
    pub written: Vec<Vec<u8>>,
}

impl SplitBus for ScriptedBus {
    fn read_packet(&mut self, _address: u8, buf: &mut [u8]) -> Result<usize, SplitDriverError> {
        let data = self.reads.pop_front().unwrap_or(Err(SplitDriverError::BusError))?;
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn write_packet(&mut self, _address: u8, data: &[u8]) -> Result<usize, SplitDriverError> {
        self.written.push(data.to_vec());
        self.writes.pop_front().unwrap_or(Ok(data.len()))
    }
}

/// Make `endpoint` a slave the way a real boot does: the handshake arrives, then arbitration runs.
pub fn become_slave(endpoint: &SplitEndpoint) {
    endpoint.on_receive(&twinkb::split::handshake_packet());
    let mut master = twinkb::split::master::MasterChannel::new(ScriptedBus::default(), twinkb::config::PEER_ADDRESS);
    let role = twinkb::role::RoleArbiter::new(endpoint)
        .arbitrate_with(&mut FakeHost::unplugged(), &mut master, || false)
        .unwrap();
    assert_eq!(role, twinkb::Role::Slave);
}
