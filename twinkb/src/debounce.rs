//! Per-key debouncer driven by scan ticks.
//!
//! When a raw sample disagrees with the accepted state, the key enters a pending state for
//! [`DebounceConfig::ticks`] ticks. Samples taken while pending are ignored, so contact bounce never
//! reaches the stable state. When the countdown expires the sample of that tick is accepted, which
//! also drops spikes that are shorter than the debounce time.

use crate::config::DebounceConfig;

/// Debounce state of a single key
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceState {
    /// Accepted state, `true` if pressed
    Settled(bool),
    /// Ignoring samples for the remaining ticks
    Pending(u16),
}

/// A physical key and its debounce countdown.
#[derive(Copy, Clone, Debug)]
struct Switch {
    pressed: bool,
    /// Ticks remaining, 0 means settled
    countdown: u16,
}

impl Switch {
    const fn new() -> Self {
        Self {
            pressed: false,
            countdown: 0,
        }
    }
}

pub struct DebounceEngine<const N: usize> {
    switches: [Switch; N],
    debounce_ticks: u16,
}

impl<const N: usize> Default for DebounceEngine<N> {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

impl<const N: usize> DebounceEngine<N> {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            switches: [Switch::new(); N],
            debounce_ticks: config.ticks,
        }
    }

    /// Feed one tick of raw samples, `true` = pressed, and write the stable state of every key to `stable`.
    pub fn tick(&mut self, raw: &[bool; N], stable: &mut [bool; N]) {
        for ((switch, &sample), out) in self.switches.iter_mut().zip(raw.iter()).zip(stable.iter_mut()) {
            if switch.countdown > 0 {
                switch.countdown -= 1;
                if switch.countdown == 0 {
                    switch.pressed = sample;
                }
            } else if sample != switch.pressed && self.debounce_ticks > 0 {
                switch.countdown = self.debounce_ticks;
            } else {
                switch.pressed = sample;
            }
            *out = switch.pressed;
        }
    }

    pub fn state(&self, index: usize) -> Option<DebounceState> {
        self.switches.get(index).map(|switch| match switch.countdown {
            0 => DebounceState::Settled(switch.pressed),
            remaining => DebounceState::Pending(remaining),
        })
    }
}

/// A stable press or release of a physical key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub index: u8,
    pub pressed: bool,
}

/// Stable states of the current and previous tick.
///
/// The two frames are swapped by toggling an index, nothing is copied.
pub struct KeyFrames<const N: usize> {
    frames: [[bool; N]; 2],
    current: usize,
}

impl<const N: usize> Default for KeyFrames<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> KeyFrames<N> {
    pub const fn new() -> Self {
        Self {
            frames: [[false; N]; 2],
            current: 0,
        }
    }

    /// Start a new tick. The current frame becomes the previous one, and the returned frame is
    /// the one to fill for this tick.
    pub fn advance(&mut self) -> &mut [bool; N] {
        self.current ^= 1;
        &mut self.frames[self.current]
    }

    pub fn current(&self) -> &[bool; N] {
        &self.frames[self.current]
    }

    pub fn previous(&self) -> &[bool; N] {
        &self.frames[self.current ^ 1]
    }

    /// Stable transitions between the previous and the current frame, in ascending index order.
    pub fn transitions(&self) -> impl Iterator<Item = KeyEvent> + '_ {
        self.current()
            .iter()
            .zip(self.previous().iter())
            .enumerate()
            .filter(|(_, (now, before))| now != before)
            .map(|(index, (now, _))| KeyEvent {
                index: index as u8,
                pressed: *now,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_is_accepted_after_countdown() {
        let mut engine: DebounceEngine<1> = DebounceEngine::new(DebounceConfig { ticks: 3 });
        let mut stable = [false];

        engine.tick(&[true], &mut stable);
        assert_eq!(engine.state(0), Some(DebounceState::Pending(3)));
        assert_eq!(stable, [false]);
        engine.tick(&[true], &mut stable);
        engine.tick(&[true], &mut stable);
        assert_eq!(stable, [false]);
        engine.tick(&[true], &mut stable);
        assert_eq!(stable, [true]);
        assert_eq!(engine.state(0), Some(DebounceState::Settled(true)));
    }

    #[test]
    fn test_spike_is_dropped() {
        let mut engine: DebounceEngine<1> = DebounceEngine::new(DebounceConfig { ticks: 2 });
        let mut stable = [false];

        engine.tick(&[true], &mut stable);
        engine.tick(&[false], &mut stable);
        engine.tick(&[false], &mut stable);
        assert_eq!(stable, [false]);
        assert_eq!(engine.state(0), Some(DebounceState::Settled(false)));
    }

    #[test]
    fn test_frames_swap() {
        let mut frames: KeyFrames<3> = KeyFrames::new();
        *frames.advance() = [true, false, true];
        let events: heapless::Vec<KeyEvent, 3> = frames.transitions().collect();
        assert_eq!(
            events.as_slice(),
            &[
                KeyEvent { index: 0, pressed: true },
                KeyEvent { index: 2, pressed: true }
            ]
        );

        *frames.advance() = [true, false, false];
        assert_eq!(frames.previous(), &[true, false, true]);
        let events: heapless::Vec<KeyEvent, 3> = frames.transitions().collect();
        assert_eq!(events.as_slice(), &[KeyEvent { index: 2, pressed: false }]);
    }
}
