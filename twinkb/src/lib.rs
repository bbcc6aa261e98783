//! # twinkb
//!
//! Firmware core of a split keyboard. Each half scans its own switches, and the half that is
//! plugged into the host merges both halves into a HID boot keyboard report.
//!
//! Hardware access goes through `embedded-hal` traits, so the same code runs on the target and
//! against mocks on the host.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod debounce;
pub mod hid;
pub mod keyboard;
pub mod keymap;
pub mod light;
pub mod matrix;
pub mod report;
pub mod role;
pub mod split;

pub use config::{KeyboardConfig, Side};
pub use keyboard::{Keyboard, TickOutput};
pub use role::Role;
pub use twinkb_types as types;
