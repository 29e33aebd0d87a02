//! Integration tests for stompbox-core.
//!
//! Drives effects the way the control path does: look a parameter up by
//! control, write it through its curve, recompute, then process audio.

use stompbox_core::{
    CompoundEffect, ControlKind, Curve, DelayLine, Effect, EffectState, Parameter, Routing,
    Subdivision, TapTempo, bpm_from_tempo_hz, delay_seconds,
};

const SAMPLE_RATE: f32 = 48000.0;

/// Minimal echo used to exercise the parameter contract.
struct Echo {
    state: EffectState,
    line: Option<DelayLine>,
    delay_samples: f32,
    mix: f32,
}

impl Echo {
    fn new() -> Self {
        Self {
            state: EffectState::new("Echo"),
            line: None,
            delay_samples: 0.0,
            mix: 0.0,
        }
    }
}

impl Effect for Echo {
    fn state(&self) -> &EffectState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EffectState {
        &mut self.state
    }

    fn init(&mut self, sample_rate: f32) {
        if self.state.begin_init(sample_rate) {
            self.state
                .add_param(Parameter::continuous("Mix", 0.0, 1.0, 0.5, Curve::Linear).with_control(0));
            self.state
                .add_param(Parameter::stepped("Time", 0.001, 0.1, 0.01, 0.001).with_control(0));
            self.state
                .add_param(Parameter::continuous("Division", 0.0, 1.0, 0.5, Curve::Linear).with_control(1));
        }
        self.line = Some(DelayLine::from_time(sample_rate, 0.1));
        self.update();
    }

    fn process_mono(&mut self, input: &[f32], output: &mut [f32]) {
        let Some(line) = self.line.as_mut() else {
            output.copy_from_slice(input);
            return;
        };
        for (o, &x) in output.iter_mut().zip(input) {
            line.write(x);
            let wet = line.read(self.delay_samples);
            *o = x + (wet - x) * self.mix;
        }
    }

    fn update(&mut self) {
        if let Some(mix) = self.state.value(0) {
            self.mix = mix;
        }
        if let Some(time) = self.state.value(1) {
            self.delay_samples = time * self.state.sample_rate();
        }
    }
}

#[test]
fn knob_write_then_update_changes_audio() {
    let mut echo = Echo::new();
    echo.init(SAMPLE_RATE);

    let mix = echo.find_param_mut(ControlKind::Knob, 0).unwrap();
    mix.set_normalized_with_curve(0.0);
    echo.update();

    let input: Vec<f32> = (0..32).map(|i| i as f32).collect();
    let mut out = vec![0.0; 32];
    echo.process_mono(&input, &mut out);
    assert_eq!(out, input);
}

#[test]
fn encoder_steps_delay_time() {
    let mut echo = Echo::new();
    echo.init(SAMPLE_RATE);
    let time = echo.find_param_mut(ControlKind::Encoder, 0).unwrap();
    time.increment(-9);
    assert!((time.value() - 0.001).abs() < 1e-6);
    echo.update();
    assert!((echo.delay_samples - 48.0).abs() < 0.1);

    // full wet: an impulse comes back 48 samples later
    echo.find_param_mut(ControlKind::Knob, 0).unwrap().set_value(1.0);
    echo.update();
    let mut input = vec![0.0; 64];
    input[0] = 1.0;
    let mut out = vec![0.0; 64];
    echo.process_mono(&input, &mut out);
    let peak = out
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i);
    assert_eq!(peak, Some(48));
}

#[test]
fn knob_and_encoder_share_index_space_separately() {
    let mut echo = Echo::new();
    echo.init(SAMPLE_RATE);
    assert_eq!(echo.find_param_mut(ControlKind::Knob, 0).map(|p| p.name().to_owned()).as_deref(), Some("Mix"));
    assert_eq!(echo.find_param_mut(ControlKind::Encoder, 0).map(|p| p.name().to_owned()).as_deref(), Some("Time"));
    assert!(echo.find_param_mut(ControlKind::Encoder, 1).is_none());
}

#[test]
fn tap_tempo_to_synced_delay_time() {
    let mut tap = TapTempo::default();
    tap.tap(1_000);
    let tempo_hz = tap.tap(1_500).unwrap();
    let bpm = bpm_from_tempo_hz(tempo_hz);
    assert_eq!(bpm, 120.0);

    let mut echo = Echo::new();
    echo.init(SAMPLE_RATE);
    let division = &echo.params()[2];
    let sub = Subdivision::from_param(division);
    assert_eq!(sub, Subdivision::Quarter);
    assert_eq!(delay_seconds(bpm, sub), 0.5);
}

#[test]
fn compound_routes_knob_lookups_to_children() {
    let mut rack = CompoundEffect::new("Rack", Routing::Series)
        .with_effect(Box::new(Echo::new()))
        .with_effect(Box::new(Echo::new()));
    rack.init(SAMPLE_RATE);

    rack.find_param_mut(ControlKind::Knob, 0).unwrap().set_value(0.0);
    rack.update();
    let first_mix = rack.effect(0).map(|e| e.params()[0].value());
    let second_mix = rack.effect(1).map(|e| e.params()[0].value());
    assert_eq!(first_mix, Some(0.0));
    assert_eq!(second_mix, Some(0.5));
}

#[test]
fn compound_survives_block_size_changes() {
    let mut rack = CompoundEffect::new("Rack", Routing::Parallel)
        .with_effect(Box::new(Echo::new()))
        .with_effect(Box::new(Echo::new()));
    rack.init(SAMPLE_RATE);
    for &n in &[16usize, 512, 64, 1024, 1] {
        let input = vec![0.25; n];
        let mut l = vec![0.0; n];
        let mut r = vec![0.0; n];
        rack.process_stereo(&input, &input, &mut l, &mut r);
        assert!(l.iter().chain(&r).all(|s| s.is_finite()));
    }
    assert!(rack.scratch_capacity() >= 1024);
}
