//! Physical key index to HID usage mapping, with Fn and NumLock layers.

use heapless::Vec;
use twinkb_types::keycode::HidKeyCode;
use twinkb_types::modifier::HidModifiers;

use crate::config::{KEY_COUNT, Side};

/// A layer maps every physical index of one half to a HID usage code.
pub type Layer<const N: usize> = [HidKeyCode; N];

/// Layer selected for a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayerKind {
    Base,
    Fn,
    NumLock,
}

/// Keymap of one half.
#[derive(Clone, Debug)]
pub struct SideKeymap<const N: usize> {
    pub base: Layer<N>,
    pub fn_layer: Layer<N>,
    /// Only honored on the right half
    pub numlock: Option<Layer<N>>,
    /// Physical indices that only contribute to the modifier byte
    pub modifier_indices: &'static [u8],
    /// Physical index of the Fn key, if this half has one
    pub fn_index: Option<u8>,
}

impl<const N: usize> SideKeymap<N> {
    fn layer(&self, kind: LayerKind) -> &Layer<N> {
        match kind {
            LayerKind::Base => &self.base,
            LayerKind::Fn => &self.fn_layer,
            LayerKind::NumLock => self.numlock.as_ref().unwrap_or(&self.base),
        }
    }

    /// Modifier and Fn indices never show up in the key slots.
    pub fn is_excluded(&self, index: u8) -> bool {
        self.fn_index == Some(index) || self.modifier_indices.contains(&index)
    }
}

/// Keymaps of both halves.
#[derive(Clone, Debug)]
pub struct KeymapConfig<const N: usize> {
    pub left: SideKeymap<N>,
    pub right: SideKeymap<N>,
}

/// Everything one half contributes to a report in a tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HalfState<const N: usize> {
    /// Pressed physical indices in ascending order, modifier and Fn indices excluded
    pub keys_down: Vec<u8, N>,
    pub modifiers: HidModifiers,
    pub fn_active: bool,
}

/// Translates physical key indices of either half into HID usage codes.
pub struct KeyMapper<const N: usize> {
    keymap: KeymapConfig<N>,
}

impl<const N: usize> KeyMapper<N> {
    pub fn new(keymap: KeymapConfig<N>) -> Self {
        const { assert!(N < u8::MAX as usize, "physical index + 1 must fit in a packet slot") };
        Self { keymap }
    }

    pub fn side(&self, side: Side) -> &SideKeymap<N> {
        match side {
            Side::Left => &self.keymap.left,
            Side::Right => &self.keymap.right,
        }
    }

    /// Layer used for a lookup. NumLock on the right half beats Fn, Fn beats base.
    pub fn active_layer(&self, side: Side, fn_active: bool, numlock_active: bool) -> LayerKind {
        if side == Side::Right && numlock_active && self.side(side).numlock.is_some() {
            LayerKind::NumLock
        } else if fn_active {
            LayerKind::Fn
        } else {
            LayerKind::Base
        }
    }

    /// Map a physical index to its HID usage. Out of range indices map to [`HidKeyCode::No`].
    pub fn map(&self, index: u8, side: Side, fn_active: bool, numlock_active: bool) -> HidKeyCode {
        let layer = self.active_layer(side, fn_active, numlock_active);
        self.side(side)
            .layer(layer)
            .get(index as usize)
            .copied()
            .unwrap_or(HidKeyCode::No)
    }

    /// Collect the keys down, modifier byte and Fn flag of one half from its stable frame.
    pub fn half_state(&self, frame: &[bool; N], side: Side) -> HalfState<N> {
        let keymap = self.side(side);
        let mut state = HalfState::default();

        for (index, _) in frame.iter().enumerate().filter(|(_, pressed)| **pressed) {
            let index = index as u8;
            if keymap.fn_index == Some(index) {
                state.fn_active = true;
            } else if keymap.modifier_indices.contains(&index) {
                state.modifiers |= keymap.base[index as usize].to_hid_modifiers();
            } else {
                // Capacity is N, every index fits
                let _ = state.keys_down.push(index);
            }
        }

        state
    }
}

impl KeyMapper<KEY_COUNT> {
    /// Mapper with the reference tables of both halves.
    pub fn with_default_keymaps() -> Self {
        Self::new(KeymapConfig {
            left: default_left_keymap(),
            right: default_right_keymap(),
        })
    }
}

/// Modifier indices of the reference left half: left GUI, right Alt, left Shift, left Ctrl, left Alt.
const LEFT_MODIFIER_INDICES: [u8; 5] = [1, 2, 21, 27, 28];
/// Modifier indices of the reference right half: right Shift.
const RIGHT_MODIFIER_INDICES: [u8; 1] = [26];

#[rustfmt::skip]
pub const fn default_left_keymap() -> SideKeymap<KEY_COUNT> {
    use HidKeyCode::*;
    SideKeymap {
        base: [
            No, LGui, RAlt,
            Kc1, Kc2, Kc3, Kc4, Kc5, Minus,
            LeftBracket, Q, W, E, R, T,
            NonusHash, A, S, D, F, G,
            LShift, Z, X, C, V, B,
            LCtrl, LAlt, No, Grave, Backspace, Enter,
        ],
        fn_layer: [
            No, LGui, RAlt,
            F1, F2, F3, F4, F5, F11,
            No, Home, Up, End, PageUp, No,
            No, Left, Down, Right, PageDown, No,
            LShift, No, No, No, No, No,
            LCtrl, LAlt, No, Escape, Delete, Enter,
        ],
        numlock: None,
        modifier_indices: &LEFT_MODIFIER_INDICES,
        fn_index: Some(0),
    }
}

#[rustfmt::skip]
pub const fn default_right_keymap() -> SideKeymap<KEY_COUNT> {
    use HidKeyCode::*;
    SideKeymap {
        base: [
            Application, Insert, PrintScreen,
            Equal, Kc6, Kc7, Kc8, Kc9, Kc0,
            Y, U, I, O, P, RightBracket,
            H, J, K, L, Semicolon, Quote,
            N, M, Comma, Dot, Slash, RShift,
            Space, Delete, Tab, CapsLock, Backslash, Escape,
        ],
        fn_layer: [
            Application, ScrollLock, Pause,
            F12, F6, F7, F8, F9, F10,
            Insert, Home, Up, End, PageUp, No,
            Delete, Left, Down, Right, PageDown, No,
            No, No, No, No, No, RShift,
            Space, Delete, Tab, NumLock, Backslash, Escape,
        ],
        numlock: Some([
            Application, Insert, PrintScreen,
            Equal, No, NumLock, KpSlash, KpAsterisk, KpMinus,
            Y, Kp7, Kp8, Kp9, KpPlus, RightBracket,
            H, Kp4, Kp5, Kp6, KpPlus, Quote,
            N, Kp1, Kp2, Kp3, KpEnter, RShift,
            Kp0, KpDot, Tab, CapsLock, Backslash, KpEnter,
        ]),
        modifier_indices: &RIGHT_MODIFIER_INDICES,
        fn_index: None,
    }
}
