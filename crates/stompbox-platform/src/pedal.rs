//! The pedal processor: effect list, bypass, tap tempo and control wiring.
//!
//! [`Pedal`] owns the consumer end of the event queue. Each main-loop
//! iteration calls [`Pedal::poll`], which drains the queue through the
//! [`Dispatcher`] with the [`PedalState`] as listener context. Between
//! polls the audio callback calls [`Pedal::process_audio`], which only reads
//! parameter values the listeners already committed.

use crate::ControlId;
use crate::dispatcher::Dispatcher;
use crate::event::{ControlEvent, EventKind};
use crate::queue::EventConsumer;
use crate::scheduler::ProcessingFlag;
use stompbox_core::{
    ControlKind, DEFAULT_SAMPLE_RATE, DEFAULT_TAP_TIMEOUT_MS, Effect, TapTempo, bpm_from_tempo_hz,
};

/// Which controls the built-in listeners use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PedalConfig {
    /// Audio sample rate the effects are initialized at.
    pub sample_rate: f32,
    /// Longest interval between two taps that still forms a tempo.
    pub tap_timeout_ms: u32,
    /// Footswitch whose press is a tempo tap.
    pub tap_switch: usize,
    /// Footswitch whose release toggles bypass.
    pub bypass_switch: usize,
    /// Encoder whose rotation selects the active effect.
    pub select_encoder: usize,
    /// Bypass state at power-up.
    pub bypass: bool,
}

impl Default for PedalConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            tap_timeout_ms: DEFAULT_TAP_TIMEOUT_MS,
            tap_switch: 2,
            bypass_switch: 1,
            select_encoder: 1,
            bypass: true,
        }
    }
}

/// Everything the listeners may mutate.
pub struct PedalState {
    effects: Vec<Box<dyn Effect>>,
    active: usize,
    bypass: bool,
    tap: TapTempo,
    tempo_hz: Option<f32>,
}

impl PedalState {
    /// Effects in selection order.
    pub fn effects(&self) -> &[Box<dyn Effect>] {
        &self.effects
    }

    /// Effect at `index`.
    pub fn effect_mut(&mut self, index: usize) -> Option<&mut (dyn Effect + 'static)> {
        self.effects.get_mut(index).map(|e| &mut **e)
    }

    /// Index of the active effect.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// The effect controls and audio are routed to.
    pub fn active_effect(&self) -> Option<&(dyn Effect + 'static)> {
        self.effects.get(self.active).map(|e| &**e)
    }

    /// Mutable active effect.
    pub fn active_effect_mut(&mut self) -> Option<&mut (dyn Effect + 'static)> {
        self.effects.get_mut(self.active).map(|e| &mut **e)
    }

    /// Makes `index` the active effect. Out-of-range indices are ignored.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.effects.len() {
            return false;
        }
        self.active = index;
        tracing::debug!(index, effect = self.effects[index].name(), "effect selected");
        true
    }

    /// Moves the selection by `steps`, wrapping around the list.
    pub fn cycle_active(&mut self, steps: i32) {
        let n = self.effects.len();
        if n == 0 {
            return;
        }
        let next = (self.active as i64 + i64::from(steps)).rem_euclid(n as i64) as usize;
        self.set_active(next);
    }

    /// Whether audio passes through untouched.
    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    /// Sets bypass.
    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    /// Flips bypass.
    pub fn toggle_bypass(&mut self) {
        self.bypass = !self.bypass;
        tracing::info!(bypass = self.bypass, "bypass toggled");
    }

    /// Registers a tap; a completed pair sets the tempo of the active effect.
    pub fn tap_tempo(&mut self, now_ms: u32) -> Option<f32> {
        let tempo = self.tap.tap(now_ms)?;
        self.set_tempo(tempo);
        Some(tempo)
    }

    /// Sends `tempo_hz` to the active effect.
    pub fn set_tempo(&mut self, tempo_hz: f32) {
        self.tempo_hz = Some(tempo_hz);
        tracing::info!(tempo_hz, bpm = bpm_from_tempo_hz(tempo_hz), "tempo set");
        if let Some(effect) = self.active_effect_mut() {
            effect.set_tempo(tempo_hz);
        }
    }

    /// Last tempo set by tapping or [`set_tempo`](Self::set_tempo).
    pub fn tempo_hz(&self) -> Option<f32> {
        self.tempo_hz
    }

    /// Tap detector.
    pub fn tap(&self) -> &TapTempo {
        &self.tap
    }
}

impl std::fmt::Debug for PedalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.effects.iter().map(|e| e.name()).collect();
        f.debug_struct("PedalState")
            .field("effects", &names)
            .field("active", &self.active)
            .field("bypass", &self.bypass)
            .field("tap", &self.tap)
            .field("tempo_hz", &self.tempo_hz)
            .finish()
    }
}

/// The pedal processor.
///
/// # Example
///
/// ```rust
/// use stompbox_platform::{
///     ControlEvent, ControlId, Pedal, PedalConfig, ProcessingFlag, event_queue,
/// };
/// use stompbox_effects::Gain;
///
/// let (mut tx, rx) = event_queue(16);
/// let mut pedal = Pedal::new(
///     vec![Box::new(Gain::new())],
///     PedalConfig::default(),
///     rx,
///     ProcessingFlag::new(),
/// );
/// assert!(pedal.state().is_bypassed());
///
/// // releasing the bypass footswitch engages the effect
/// tx.push(ControlEvent::button_released(ControlId::switch(1), 1, 0)).unwrap();
/// assert_eq!(pedal.poll(), 1);
/// assert!(!pedal.state().is_bypassed());
/// ```
pub struct Pedal {
    config: PedalConfig,
    dispatcher: Dispatcher<PedalState>,
    state: PedalState,
    queue: EventConsumer,
    flag: ProcessingFlag,
}

impl Pedal {
    /// Initializes `effects` and wires the default listeners.
    pub fn new(
        mut effects: Vec<Box<dyn Effect>>,
        config: PedalConfig,
        queue: EventConsumer,
        flag: ProcessingFlag,
    ) -> Self {
        for effect in &mut effects {
            effect.init(config.sample_rate);
        }
        let mut pedal = Self {
            config,
            dispatcher: Dispatcher::new(),
            state: PedalState {
                effects,
                active: 0,
                bypass: config.bypass,
                tap: TapTempo::new(config.tap_timeout_ms),
                tempo_hz: None,
            },
            queue,
            flag,
        };
        pedal.register_default_listeners();
        pedal
    }

    /// Clears every listener and installs the built-in wiring again.
    pub fn register_default_listeners(&mut self) {
        let config = self.config;
        let d = &mut self.dispatcher;
        d.clear_listeners();

        d.register(EventKind::KnobChanged, None, |event, state| {
            let Some(value) = event.value() else { return };
            if let Some(effect) = state.active_effect_mut() {
                if let Some(param) = effect.find_param_mut(ControlKind::Knob, event.index) {
                    param.set_normalized_with_curve(value);
                    effect.update();
                }
            }
        });

        d.register(EventKind::EncoderRotated, None, |event, state| {
            let Some(steps) = event.steps() else { return };
            if let Some(effect) = state.active_effect_mut() {
                if let Some(param) = effect.find_param_mut(ControlKind::Encoder, event.index) {
                    param.increment(steps);
                    effect.update();
                }
            }
        });

        d.register(EventKind::ButtonPressed, None, |event, state| {
            if let Some(effect) = state.active_effect_mut() {
                if let Some(param) = effect.find_param_mut(ControlKind::Switch, event.index) {
                    param.toggle_state();
                    effect.update();
                }
            }
        });

        d.register(
            EventKind::ButtonReleased,
            Some(ControlId::switch(config.bypass_switch as u8)),
            |_, state| state.toggle_bypass(),
        );

        d.register(
            EventKind::ButtonPressed,
            Some(ControlId::switch(config.tap_switch as u8)),
            |event, state| {
                state.tap_tempo(event.timestamp_ms);
            },
        );

        d.register(
            EventKind::EncoderRotated,
            Some(ControlId::encoder(config.select_encoder as u8)),
            |event, state| {
                if let Some(steps) = event.steps() {
                    state.cycle_active(steps);
                }
            },
        );
    }

    /// One main-loop iteration: drains the queue and dispatches every event
    /// with the processing flag raised. Returns the number of events.
    pub fn poll(&mut self) -> usize {
        self.flag.raise();
        let n = self
            .dispatcher
            .process_events(&mut self.queue, &mut self.state);
        self.flag.lower();
        n
    }

    /// Dispatches one event directly, bypassing the queue.
    pub fn handle_event(&mut self, event: &ControlEvent) -> usize {
        self.dispatcher.dispatch(event, &mut self.state)
    }

    /// Audio callback. Runs the active effect, or copies input to output
    /// when bypassed or when there is no effect.
    ///
    /// The block is the shortest of the four slices.
    pub fn process_audio(&mut self, in_l: &[f32], in_r: &[f32], out_l: &mut [f32], out_r: &mut [f32]) {
        let n = in_l.len().min(in_r.len()).min(out_l.len()).min(out_r.len());
        let (in_l, in_r) = (&in_l[..n], &in_r[..n]);
        let (out_l, out_r) = (&mut out_l[..n], &mut out_r[..n]);

        let bypass = self.state.bypass;
        match self.state.active_effect_mut() {
            Some(effect) if !bypass => effect.process_stereo(in_l, in_r, out_l, out_r),
            _ => {
                out_l.copy_from_slice(in_l);
                out_r.copy_from_slice(in_r);
            }
        }
    }

    /// Listener context.
    pub fn state(&self) -> &PedalState {
        &self.state
    }

    /// Mutable listener context.
    pub fn state_mut(&mut self) -> &mut PedalState {
        &mut self.state
    }

    /// The dispatcher, for extra listeners.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<PedalState> {
        &mut self.dispatcher
    }

    /// Wiring in effect.
    pub fn config(&self) -> &PedalConfig {
        &self.config
    }

    /// Shared re-entrancy guard.
    pub fn processing_flag(&self) -> &ProcessingFlag {
        &self.flag
    }

    /// Events waiting in the queue.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Events dropped because the queue was full.
    pub fn dropped_events(&self) -> usize {
        self.queue.dropped()
    }
}

impl std::fmt::Debug for Pedal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pedal")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("listeners", &self.dispatcher.listener_count())
            .field("queue", &self.queue)
            .finish()
    }
}
