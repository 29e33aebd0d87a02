//! Tap-tempo calculator.

#![allow(clippy::print_literal)]

use clap::Args;
use stompbox_core::{DEFAULT_TAP_TIMEOUT_MS, Subdivision, TapTempo, bpm_from_tempo_hz, delay_seconds};

#[derive(Args)]
pub struct TapArgs {
    /// Tap timestamps in milliseconds, in order
    #[arg(value_name = "MS", required = true, num_args = 2..)]
    taps: Vec<u32>,

    /// Longest interval between taps that still forms a tempo
    #[arg(long, default_value_t = DEFAULT_TAP_TIMEOUT_MS)]
    timeout_ms: u32,
}

pub fn run(args: TapArgs) -> anyhow::Result<()> {
    let tempo_hz = tempo_from_taps(&args.taps, args.timeout_ms).ok_or_else(|| {
        anyhow::anyhow!(
            "No tempo: the last two taps must be less than {} ms apart",
            args.timeout_ms
        )
    })?;

    let bpm = bpm_from_tempo_hz(tempo_hz);
    println!("Tempo: {:.3} Hz ({:.1} BPM)", tempo_hz, tempo_hz * 60.0);
    if (bpm - tempo_hz * 60.0).abs() > f32::EPSILON {
        println!("  delay times use {:.1} BPM (clamped)", bpm);
    }
    println!();
    println!("  {:6}  {}", "Note", "Delay");
    for subdivision in Subdivision::ALL {
        println!(
            "  {:6}  {:.1} ms",
            subdivision.label(),
            delay_seconds(bpm, subdivision) * 1000.0
        );
    }
    Ok(())
}

/// Tempo produced by the final tap, if any.
fn tempo_from_taps(taps: &[u32], timeout_ms: u32) -> Option<f32> {
    let mut tap = TapTempo::new(timeout_ms);
    taps.iter().map(|&t| tap.tap(t)).last().flatten()
}
