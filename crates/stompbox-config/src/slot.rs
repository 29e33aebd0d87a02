//! Effect chain declarations.

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use stompbox_core::{CompoundEffect, Curve, Effect, Parameter, Routing, Taper};
use stompbox_effects::EffectKind;

/// Compound routing as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingConfig {
    /// Each child feeds the next.
    #[default]
    Series,
    /// Children share the input; outputs are mixed.
    Parallel,
}

impl From<RoutingConfig> for Routing {
    fn from(routing: RoutingConfig) -> Self {
        match routing {
            RoutingConfig::Series => Routing::Series,
            RoutingConfig::Parallel => Routing::Parallel,
        }
    }
}

/// A curve given by name (`"log_a"`) or as a custom taper midpoint (`0.3`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CurveSpec {
    /// Built-in curve name.
    Named(String),
    /// Midpoint of a custom log taper.
    Taper(f32),
}

impl CurveSpec {
    /// Resolves the curve for parameter `param`.
    pub fn resolve(&self, param: &str) -> Result<Curve, ConfigError> {
        match self {
            CurveSpec::Named(name) => {
                Curve::from_name(&name.to_ascii_lowercase()).ok_or_else(|| ConfigError::UnknownCurve {
                    param: param.to_string(),
                    curve: name.clone(),
                })
            }
            CurveSpec::Taper(ym) => Taper::new(*ym).map(Curve::Taper).map_err(|source| {
                ConfigError::InvalidTaper {
                    param: param.to_string(),
                    source,
                }
            }),
        }
    }
}

/// One entry of the effect chain.
///
/// # TOML Format
///
/// ```toml
/// [[effects]]
/// type = "delay"
/// params = { Mix = 0.3, Feedback = 0.6 }
/// curves = { Mix = "w_taper" }
/// controls = { Feedback = 4 }
///
/// [[effects]]
/// type = "compound"
/// name = "Wobble Echo"
/// routing = "parallel"
/// effects = [{ type = "tremolo" }, { type = "delay", enabled = false }]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EffectSlot {
    /// Registry id (`delay`, `tremolo`, `gain`, `compound`).
    #[serde(rename = "type")]
    pub effect_type: String,

    /// Display name of a compound.
    #[serde(default)]
    pub name: Option<String>,

    /// Whether the effect processes audio.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Parameter values in the parameter's own units, by name.
    #[serde(default)]
    pub params: BTreeMap<String, f32>,

    /// Curve overrides for continuous parameters.
    #[serde(default)]
    pub curves: BTreeMap<String, CurveSpec>,

    /// Control index overrides.
    #[serde(default)]
    pub controls: BTreeMap<String, usize>,

    /// Routing of a compound.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Children of a compound.
    #[serde(default)]
    pub effects: Vec<EffectSlot>,
}

fn default_enabled() -> bool {
    true
}

impl EffectSlot {
    /// A single effect with default settings.
    pub fn new(effect_type: impl Into<String>) -> Self {
        Self {
            effect_type: effect_type.into(),
            name: None,
            enabled: true,
            params: BTreeMap::new(),
            curves: BTreeMap::new(),
            controls: BTreeMap::new(),
            routing: RoutingConfig::Series,
            effects: Vec::new(),
        }
    }

    /// Builder: sets a parameter value.
    pub fn with_param(mut self, name: impl Into<String>, value: f32) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Builder: adds a child (compounds only).
    pub fn with_child(mut self, child: EffectSlot) -> Self {
        self.effects.push(child);
        self
    }

    /// Builder: compound routing.
    pub fn with_routing(mut self, routing: RoutingConfig) -> Self {
        self.routing = routing;
        self
    }

    /// Creates, initializes and configures the effect.
    ///
    /// # Errors
    ///
    /// Unknown effect or parameter names, unknown curves, illegal tapers, and
    /// children on a non-compound effect.
    pub fn build(&self, sample_rate: f32) -> Result<Box<dyn Effect>, ConfigError> {
        let kind = EffectKind::from_name(&self.effect_type)
            .ok_or_else(|| ConfigError::UnknownEffect(self.effect_type.clone()))?;

        let mut effect = if kind == EffectKind::Compound {
            let name = self.name.clone().unwrap_or_else(|| "Compound".to_string());
            let mut compound = CompoundEffect::new(name, self.routing.into());
            for child in &self.effects {
                compound.add_effect(child.build(sample_rate)?);
            }
            Box::new(compound) as Box<dyn Effect>
        } else {
            if !self.effects.is_empty() {
                return Err(ConfigError::UnexpectedChildren(self.effect_type.clone()));
            }
            kind.create()
        };

        effect.init(sample_rate);
        self.apply(effect.as_mut())?;
        effect.set_enabled(self.enabled);

        tracing::debug!(
            effect = %effect.name(),
            enabled = self.enabled,
            params = self.params.len(),
            "effect built"
        );
        Ok(effect)
    }

    fn apply(&self, effect: &mut (dyn Effect + 'static)) -> Result<(), ConfigError> {
        for (name, &value) in &self.params {
            self.param(effect, name)?.set_value(value);
        }
        for (name, spec) in &self.curves {
            let curve = spec.resolve(name)?;
            self.param(effect, name)?.set_curve(curve);
        }
        for (name, &index) in &self.controls {
            self.param(effect, name)?.set_control_index(Some(index));
        }
        effect.update();
        Ok(())
    }

    fn param<'a>(
        &self,
        effect: &'a mut (dyn Effect + 'static),
        name: &str,
    ) -> Result<&'a mut Parameter, ConfigError> {
        effect
            .params_mut()
            .iter_mut()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownParameter {
                effect: self.effect_type.clone(),
                param: name.to_string(),
            })
    }
}

/// Builds every slot in order.
pub fn build_chain(slots: &[EffectSlot], sample_rate: f32) -> Result<Vec<Box<dyn Effect>>, ConfigError> {
    slots.iter().map(|slot| slot.build(sample_rate)).collect()
}
