use embedded_hal::digital::{OutputPin, PinState};
use twinkb_types::led_indicator::{LedIndicator, LedIndicatorType};

use crate::config::{LightConfig, LightPinConfig};

/// A single lock indicator LED
struct SingleLed<P: OutputPin> {
    /// Last applied state, `None` until the first update
    state: Option<bool>,

    /// Pin state when turning LED on
    on_state: PinState,

    /// GPIO for controlling the LED
    pin: P,
}

impl<P: OutputPin> SingleLed<P> {
    fn new(config: LightPinConfig<P>) -> Self {
        Self {
            state: None,
            on_state: if config.low_active { PinState::Low } else { PinState::High },
            pin: config.pin,
        }
    }

    /// Apply `on`, touching the pin only when the state changes
    fn set(&mut self, on: bool) -> Result<(), P::Error> {
        if self.state == Some(on) {
            return Ok(());
        }
        let level = if on { self.on_state } else { !self.on_state };
        self.pin.set_state(level)?;
        self.state = Some(on);
        Ok(())
    }
}

/// Drives the Caps/Num/Scroll lock LEDs from the lock state written by the host.
pub struct LightService<P: OutputPin> {
    pub enabled: bool,
    capslock: Option<SingleLed<P>>,
    scrolllock: Option<SingleLed<P>>,
    numslock: Option<SingleLed<P>>,
}

impl<P: OutputPin> LightService<P> {
    pub fn from_config(light_config: LightConfig<P>) -> Self {
        let enabled =
            light_config.capslock.is_some() || light_config.numslock.is_some() || light_config.scrolllock.is_some();
        Self {
            enabled,
            capslock: light_config.capslock.map(SingleLed::new),
            scrolllock: light_config.scrolllock.map(SingleLed::new),
            numslock: light_config.numslock.map(SingleLed::new),
        }
    }

    fn led(&mut self, indicator: LedIndicatorType) -> Option<&mut SingleLed<P>> {
        match indicator {
            LedIndicatorType::CapsLock => self.capslock.as_mut(),
            LedIndicatorType::NumLock => self.numslock.as_mut(),
            LedIndicatorType::ScrollLock => self.scrolllock.as_mut(),
        }
    }

    /// Update every configured LED from the host lock state.
    pub fn set_leds(&mut self, led_indicator: LedIndicator) -> Result<(), P::Error> {
        if !self.enabled {
            return Ok(());
        }
        for indicator in [LedIndicatorType::CapsLock, LedIndicatorType::NumLock, LedIndicatorType::ScrollLock] {
            if let Some(led) = self.led(indicator) {
                led.set(led_indicator.is_on(indicator))?;
            }
        }
        Ok(())
    }
}
