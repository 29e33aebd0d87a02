//! Device configuration file format.

use crate::error::ConfigError;
use crate::slot::{EffectSlot, build_chain};
use serde::Deserialize;
use std::path::Path;
use stompbox_core::Effect;
use stompbox_platform::{ControlLayout, EncoderPins, PedalConfig, Polarity, SchedulerConfig};

/// Control timing section (`[controls]`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlsConfig {
    /// Control timer rate in Hz.
    pub base_rate_hz: f32,
    /// Encoder sampling divisor.
    pub encoder_divisor: u32,
    /// Switch sampling divisor.
    pub switch_divisor: u32,
    /// Knob sampling divisor.
    pub knob_divisor: u32,
    /// Hold threshold in milliseconds.
    pub hold_threshold_ms: u32,
    /// Knob smoothing time constant in seconds.
    pub knob_slew_seconds: f32,
    /// Minimum normalized knob travel that produces an event.
    pub knob_deadband: f32,
    /// Event queue capacity.
    pub queue_capacity: usize,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        SchedulerConfig::default().into()
    }
}

impl From<SchedulerConfig> for ControlsConfig {
    fn from(c: SchedulerConfig) -> Self {
        Self {
            base_rate_hz: c.base_rate_hz,
            encoder_divisor: c.encoder_divisor,
            switch_divisor: c.switch_divisor,
            knob_divisor: c.knob_divisor,
            hold_threshold_ms: c.hold_threshold_ms,
            knob_slew_seconds: c.knob_slew_seconds,
            knob_deadband: c.knob_deadband,
            queue_capacity: c.queue_capacity,
        }
    }
}

impl From<ControlsConfig> for SchedulerConfig {
    fn from(c: ControlsConfig) -> Self {
        Self {
            base_rate_hz: c.base_rate_hz,
            encoder_divisor: c.encoder_divisor,
            switch_divisor: c.switch_divisor,
            knob_divisor: c.knob_divisor,
            hold_threshold_ms: c.hold_threshold_ms,
            knob_slew_seconds: c.knob_slew_seconds,
            knob_deadband: c.knob_deadband,
            queue_capacity: c.queue_capacity,
        }
    }
}

/// Switch wiring polarity as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolarityConfig {
    /// High reads as pressed.
    Normal,
    /// Low reads as pressed (pull-up wiring).
    #[default]
    Inverted,
}

/// Encoder pins (`{ a = 4, b = 5, button = 6 }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncoderPinsConfig {
    /// Channel A pin.
    pub a: usize,
    /// Channel B pin.
    pub b: usize,
    /// Push switch pin.
    pub button: usize,
}

/// Wiring section (`[layout]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// ADC channel per knob.
    pub knob_channels: Vec<usize>,
    /// GPIO pin per footswitch.
    pub switch_pins: Vec<usize>,
    /// Pins per encoder.
    pub encoders: Vec<EncoderPinsConfig>,
    /// Polarity of switches and encoder buttons.
    pub polarity: PolarityConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let layout = ControlLayout::default();
        Self {
            knob_channels: layout.knob_channels,
            switch_pins: layout.switch_pins,
            encoders: layout
                .encoders
                .iter()
                .map(|p| EncoderPinsConfig {
                    a: p.a,
                    b: p.b,
                    button: p.button,
                })
                .collect(),
            polarity: match layout.polarity {
                Polarity::Normal => PolarityConfig::Normal,
                Polarity::Inverted => PolarityConfig::Inverted,
            },
        }
    }
}

impl From<&LayoutConfig> for ControlLayout {
    fn from(c: &LayoutConfig) -> Self {
        Self {
            knob_channels: c.knob_channels.clone(),
            switch_pins: c.switch_pins.clone(),
            encoders: c
                .encoders
                .iter()
                .map(|p| EncoderPins {
                    a: p.a,
                    b: p.b,
                    button: p.button,
                })
                .collect(),
            polarity: match c.polarity {
                PolarityConfig::Normal => Polarity::Normal,
                PolarityConfig::Inverted => Polarity::Inverted,
            },
        }
    }
}

/// Pedal section (`[pedal]`).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PedalSection {
    /// Audio sample rate.
    pub sample_rate: f32,
    /// Tap-tempo window in milliseconds.
    pub tap_timeout_ms: u32,
    /// Tap footswitch index.
    pub tap_switch: usize,
    /// Bypass footswitch index.
    pub bypass_switch: usize,
    /// Effect-select encoder index.
    pub select_encoder: usize,
    /// Bypass at power-up.
    pub bypass: bool,
}

impl Default for PedalSection {
    fn default() -> Self {
        let p = PedalConfig::default();
        Self {
            sample_rate: p.sample_rate,
            tap_timeout_ms: p.tap_timeout_ms,
            tap_switch: p.tap_switch,
            bypass_switch: p.bypass_switch,
            select_encoder: p.select_encoder,
            bypass: p.bypass,
        }
    }
}

impl From<PedalSection> for PedalConfig {
    fn from(p: PedalSection) -> Self {
        Self {
            sample_rate: p.sample_rate,
            tap_timeout_ms: p.tap_timeout_ms,
            tap_switch: p.tap_switch,
            bypass_switch: p.bypass_switch,
            select_encoder: p.select_encoder,
            bypass: p.bypass,
        }
    }
}

/// A complete device description.
///
/// Every section is optional; missing sections and fields take the
/// defaults of the runtime structs.
///
/// # TOML Format
///
/// ```toml
/// [controls]
/// base_rate_hz = 2000
/// knob_divisor = 200
///
/// [layout]
/// knob_channels = [0, 1, 2]
/// switch_pins = [10, 11, 12, 13]
/// encoders = [{ a = 4, b = 5, button = 6 }, { a = 7, b = 8, button = 9 }]
/// polarity = "normal"
///
/// [pedal]
/// tap_switch = 2
/// bypass = false
///
/// [[effects]]
/// type = "delay"
/// params = { Mix = 0.4 }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Control timing.
    pub controls: ControlsConfig,
    /// Control wiring.
    pub layout: LayoutConfig,
    /// Pedal wiring and power-up state.
    pub pedal: PedalSection,
    /// Effect chain, in selection order.
    pub effects: Vec<EffectSlot>,
}

impl DeviceConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), effects = config.effects.len(), "device config loaded");
        Ok(config)
    }

    /// Parse and validate a configuration string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks timing and wiring, and that every effect slot builds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_timing()?;
        self.validate_wiring()?;
        self.build_effects(self.pedal.sample_rate).map(drop)
    }

    fn validate_timing(&self) -> Result<(), ConfigError> {
        let c = &self.controls;
        if !(c.base_rate_hz.is_finite() && c.base_rate_hz > 0.0) {
            return Err(ConfigError::InvalidTiming(format!(
                "base_rate_hz must be positive, got {}",
                c.base_rate_hz
            )));
        }
        for (name, divisor) in [
            ("encoder_divisor", c.encoder_divisor),
            ("switch_divisor", c.switch_divisor),
            ("knob_divisor", c.knob_divisor),
        ] {
            if divisor == 0 {
                return Err(ConfigError::InvalidTiming(format!("{name} must be at least 1")));
            }
        }
        if !(c.knob_slew_seconds.is_finite() && c.knob_slew_seconds >= 0.0) {
            return Err(ConfigError::InvalidTiming(format!(
                "knob_slew_seconds must be non-negative, got {}",
                c.knob_slew_seconds
            )));
        }
        if !(0.0..1.0).contains(&c.knob_deadband) {
            return Err(ConfigError::InvalidTiming(format!(
                "knob_deadband must be in [0, 1), got {}",
                c.knob_deadband
            )));
        }
        if c.queue_capacity == 0 {
            return Err(ConfigError::InvalidTiming("queue_capacity must be at least 1".into()));
        }
        if !(self.pedal.sample_rate.is_finite() && self.pedal.sample_rate > 0.0) {
            return Err(ConfigError::InvalidTiming(format!(
                "sample_rate must be positive, got {}",
                self.pedal.sample_rate
            )));
        }
        Ok(())
    }

    fn validate_wiring(&self) -> Result<(), ConfigError> {
        let l = &self.layout;
        for (family, count) in [
            ("knobs", l.knob_channels.len()),
            ("switches", l.switch_pins.len()),
            ("encoders", l.encoders.len()),
        ] {
            if count > usize::from(u8::MAX) + 1 {
                return Err(ConfigError::InvalidWiring(format!("too many {family}: {count}")));
            }
        }
        let p = &self.pedal;
        if p.tap_switch >= l.switch_pins.len() {
            return Err(ConfigError::InvalidWiring(format!(
                "tap_switch {} but only {} switches",
                p.tap_switch,
                l.switch_pins.len()
            )));
        }
        if p.bypass_switch >= l.switch_pins.len() {
            return Err(ConfigError::InvalidWiring(format!(
                "bypass_switch {} but only {} switches",
                p.bypass_switch,
                l.switch_pins.len()
            )));
        }
        if p.select_encoder >= l.encoders.len() {
            return Err(ConfigError::InvalidWiring(format!(
                "select_encoder {} but only {} encoders",
                p.select_encoder,
                l.encoders.len()
            )));
        }
        Ok(())
    }

    /// Control timing for the scheduler.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        self.controls.into()
    }

    /// Control wiring for the scheduler.
    pub fn control_layout(&self) -> ControlLayout {
        (&self.layout).into()
    }

    /// Pedal wiring.
    pub fn pedal_config(&self) -> PedalConfig {
        self.pedal.into()
    }

    /// Builds the effect chain at `sample_rate`.
    pub fn build_effects(&self, sample_rate: f32) -> Result<Vec<Box<dyn Effect>>, ConfigError> {
        build_chain(&self.effects, sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = DeviceConfig::from_toml("").unwrap();
        assert_eq!(config, DeviceConfig::default());
        assert_eq!(config.scheduler_config(), SchedulerConfig::default());
        assert_eq!(config.pedal_config(), PedalConfig::default());
        assert_eq!(config.control_layout(), ControlLayout::default());
        assert!(config.effects.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = DeviceConfig::from_toml(
            r#"
            [controls]
            knob_divisor = 100

            [pedal]
            bypass = false
            "#,
        )
        .unwrap();
        assert_eq!(config.controls.knob_divisor, 100);
        assert_eq!(config.controls.switch_divisor, 16);
        assert_eq!(config.scheduler_config().knob_rate_hz(), 20.0);
        assert!(!config.pedal.bypass);
        assert_eq!(config.pedal.tap_switch, 2);
    }

    #[test]
    fn zero_divisor_rejected() {
        let err = DeviceConfig::from_toml("[controls]\nswitch_divisor = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTiming(ref m) if m.contains("switch_divisor")));
    }

    #[test]
    fn non_positive_rate_rejected() {
        assert!(matches!(
            DeviceConfig::from_toml("[controls]\nbase_rate_hz = 0"),
            Err(ConfigError::InvalidTiming(_))
        ));
        assert!(matches!(
            DeviceConfig::from_toml("[pedal]\nsample_rate = -48000"),
            Err(ConfigError::InvalidTiming(_))
        ));
    }

    #[test]
    fn wiring_must_fit_layout() {
        let err = DeviceConfig::from_toml("[layout]\nswitch_pins = [0, 1]").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWiring(ref m) if m.contains("tap_switch")));
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(matches!(
            DeviceConfig::from_toml("[controls]\nknob_divider = 3"),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn polarity_defaults_to_pull_up() {
        let config = DeviceConfig::from_toml("[layout]\nswitch_pins = [0, 1, 2, 3]").unwrap();
        assert_eq!(config.layout.polarity, PolarityConfig::Inverted);
        assert_eq!(config.control_layout().polarity, Polarity::Inverted);

        let config = DeviceConfig::from_toml("[layout]\npolarity = \"normal\"").unwrap();
        assert_eq!(config.control_layout().polarity, Polarity::Normal);
    }
}
