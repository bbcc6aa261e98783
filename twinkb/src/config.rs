use embedded_hal::digital::OutputPin;

use crate::keymap::{KeymapConfig, default_left_keymap, default_right_keymap};

/// Number of standalone function keys wired to their own pins, they take physical indices `0..FUNCTION_KEYS`.
pub const FUNCTION_KEYS: usize = 3;
/// Rows of the switch matrix of one half.
pub const MATRIX_ROWS: usize = 5;
/// Columns of the switch matrix of one half.
pub const MATRIX_COLS: usize = 6;
/// Total number of physical keys on one half.
pub const KEY_COUNT: usize = FUNCTION_KEYS + MATRIX_ROWS * MATRIX_COLS;

/// Default debounce time, in scan ticks.
pub const DEBOUNCE_TICKS: u16 = 100;

/// Default bus address of the peer half.
pub const PEER_ADDRESS: u8 = 0x20;

/// Which half of the keyboard this firmware runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The other half.
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// The config struct for a twinkb half.
///
/// Everything that used to be chosen at compile time per hardware side lives here,
/// so both halves can be built from one image and tested together.
pub struct KeyboardConfig<const N: usize> {
    /// The half this image runs on
    pub side: Side,
    pub debounce_config: DebounceConfig,
    pub split_config: SplitConfig,
    /// Layer tables for both halves, the master maps its peer's keys too
    pub keymap: KeymapConfig<N>,
}

impl KeyboardConfig<KEY_COUNT> {
    /// Reference configuration for the given side.
    pub fn for_side(side: Side) -> Self {
        Self {
            side,
            debounce_config: DebounceConfig::default(),
            split_config: SplitConfig::default(),
            keymap: KeymapConfig {
                left: default_left_keymap(),
                right: default_right_keymap(),
            },
        }
    }
}

impl Default for KeyboardConfig<KEY_COUNT> {
    fn default() -> Self {
        Self::for_side(Side::Left)
    }
}

/// Config for the debouncer
#[derive(Clone, Copy, Debug)]
pub struct DebounceConfig {
    /// Ticks a changed key is held in the pending state before the change is accepted
    pub ticks: u16,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { ticks: DEBOUNCE_TICKS }
    }
}

/// Config for the link between the two halves
#[derive(Clone, Copy, Debug)]
pub struct SplitConfig {
    /// Bus address the master uses to reach the slave
    pub peer_address: u8,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            peer_address: PEER_ADDRESS,
        }
    }
}

/// Config for the lock indicator LEDs
pub struct LightConfig<O: OutputPin> {
    pub capslock: Option<LightPinConfig<O>>,
    pub scrolllock: Option<LightPinConfig<O>>,
    pub numslock: Option<LightPinConfig<O>>,
}

pub struct LightPinConfig<O: OutputPin> {
    pub pin: O,
    pub low_active: bool,
}

impl<O: OutputPin> Default for LightConfig<O> {
    fn default() -> Self {
        Self {
            capslock: None,
            scrolllock: None,
            numslock: None,
        }
    }
}
