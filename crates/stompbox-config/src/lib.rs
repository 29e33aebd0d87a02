//! TOML device configuration for stompbox pedals.
//!
//! A device file describes how the controls are sampled, how the pedal's
//! built-in listeners are wired, and which effects the pedal carries.
//! Every section is optional and falls back to the runtime defaults.
//!
//! # Example
//!
//! ```rust
//! use stompbox_config::DeviceConfig;
//!
//! let config = DeviceConfig::from_toml(r#"
//!     [pedal]
//!     bypass = false
//!
//!     [[effects]]
//!     type = "tremolo"
//!     params = { Depth = 0.8 }
//!
//!     [[effects]]
//!     type = "compound"
//!     routing = "parallel"
//!     effects = [{ type = "delay" }, { type = "gain" }]
//! "#).unwrap();
//!
//! let effects = config.build_effects(48000.0).unwrap();
//! assert_eq!(effects.len(), 2);
//! assert_eq!(effects[0].name(), "Tremolo");
//! assert!(!config.pedal_config().bypass);
//! ```

mod device;
mod error;
mod slot;

pub use device::{
    ControlsConfig, DeviceConfig, EncoderPinsConfig, LayoutConfig, PedalSection, PolarityConfig,
};
pub use error::ConfigError;
pub use slot::{CurveSpec, EffectSlot, RoutingConfig, build_chain};
