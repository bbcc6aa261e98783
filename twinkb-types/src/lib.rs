//! # twinkb types
//!
//! Plain data types shared by the twinkb firmware core.
//!
//! - [`keycode`] - HID keyboard usage codes that fit the boot keyboard report
//! - [`modifier`] - The modifier byte of a HID keyboard report
//! - [`led_indicator`] - Lock-key state reported by the host

#![cfg_attr(not(test), no_std)]

pub mod keycode;
pub mod led_indicator;
pub mod modifier;
