use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::config::{KeyboardConfig, Side};
use crate::debounce::{DebounceEngine, KeyEvent, KeyFrames};
use crate::hid::HostLink;
use crate::keymap::{HalfState, KeyMapper};
use crate::light::LightService;
use crate::matrix::MatrixScanner;
use crate::report::{Report, ReportComposer};
use crate::role::{Role, RoleArbiter, RoleError};
use crate::split::driver::SplitBus;
use crate::split::master::MasterChannel;
use crate::split::slave::{SlaveChannel, SplitEndpoint};

/// Delay between two scan ticks
const TICK_INTERVAL_US: u32 = 1000;

/// What a tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutput {
    /// Role not decided yet, nothing was scanned
    Idle,
    /// Master: the report handed to the host link
    Report(Report),
    /// Slave: the packet made ready for the master
    Served(crate::split::CrossHalfPacket),
}

/// Device context of one half.
///
/// Owns every piece of per-session state and runs one scan tick at a time:
/// scan, debounce, map, then either pull the peer and compose a report (master) or
/// pack and serve the local state (slave).
pub struct Keyboard<'a, M: MatrixScanner<N>, H: HostLink, B: SplitBus, const N: usize> {
    matrix: M,
    host: H,
    endpoint: &'a SplitEndpoint,
    master: MasterChannel<B>,
    debouncer: DebounceEngine<N>,
    frames: KeyFrames<N>,
    keymap: KeyMapper<N>,
    side: Side,
    role: Role,
}

impl<'a, M: MatrixScanner<N>, H: HostLink, B: SplitBus, const N: usize> Keyboard<'a, M, H, B, N> {
    pub fn new(config: KeyboardConfig<N>, matrix: M, host: H, bus: B, endpoint: &'a SplitEndpoint) -> Self {
        Self {
            matrix,
            host,
            endpoint,
            master: MasterChannel::new(bus, config.split_config.peer_address),
            debouncer: DebounceEngine::new(config.debounce_config),
            frames: KeyFrames::new(),
            keymap: KeyMapper::new(config.keymap),
            side: config.side,
            role: endpoint.role(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Whether the master reached a peer during arbitration.
    pub fn have_slave(&self) -> bool {
        self.master.have_slave()
    }

    pub fn host(&mut self) -> &mut H {
        &mut self.host
    }

    /// Decide the role of this half, blocking until the host enumerates or a handshake arrives.
    pub fn boot(&mut self) -> Role {
        self.role = RoleArbiter::new(self.endpoint).arbitrate(&mut self.host, &mut self.master);
        self.role
    }

    /// Like [`Keyboard::boot`], but gives up once `keep_waiting` returns `false`.
    pub fn boot_with(&mut self, keep_waiting: impl FnMut() -> bool) -> Result<Role, RoleError> {
        self.role = RoleArbiter::new(self.endpoint).arbitrate_with(&mut self.host, &mut self.master, keep_waiting)?;
        Ok(self.role)
    }

    /// Stable transitions of the last tick.
    pub fn key_events(&self) -> impl Iterator<Item = KeyEvent> + '_ {
        self.frames.transitions()
    }

    /// Stable state of every key after the last tick.
    pub fn stable_frame(&self) -> &[bool; N] {
        self.frames.current()
    }

    /// Run one scan tick.
    pub fn tick(&mut self) -> TickOutput {
        if self.role == Role::Undetermined {
            return TickOutput::Idle;
        }

        let raw = self.matrix.scan();
        self.debouncer.tick(&raw, self.frames.advance());
        for event in self.frames.transitions() {
            trace!("Key {} pressed: {}", event.index, event.pressed);
        }
        let local = self.keymap.half_state(self.frames.current(), self.side);

        match self.role {
            Role::Master => TickOutput::Report(self.report(&local)),
            Role::Slave => {
                let packet = ReportComposer::new(&self.keymap, self.side).pack(&local);
                SlaveChannel::new(self.endpoint).serve(packet);
                TickOutput::Served(packet)
            }
            Role::Undetermined => TickOutput::Idle,
        }
    }

    fn report(&mut self, local: &HalfState<N>) -> Report {
        let remote = self.master.pull();
        let locks = self.host.lock_state();
        let report = ReportComposer::new(&self.keymap, self.side).compose(local, remote.as_ref(), locks);
        if let Err(e) = self.host.send_report(&report) {
            warn!("Send keyboard report error: {:?}", e);
        }
        report
    }

    /// Boot, then scan forever, keeping the lock LEDs in sync with the host on the master.
    pub fn run<D: DelayNs, P: OutputPin>(&mut self, delay: &mut D, light: &mut LightService<P>) -> ! {
        self.boot();
        loop {
            self.tick();
            if self.role == Role::Master && light.set_leds(self.host.lock_state()).is_err() {
                error!("Set lock LEDs error");
            }
            delay.delay_us(TICK_INTERVAL_US);
        }
    }
}
