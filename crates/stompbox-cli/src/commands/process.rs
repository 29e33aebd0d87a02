//! File-based pedal processing command.

use crate::wav::{StereoBuffer, read_stereo, write_stereo};
use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use stompbox_config::{DeviceConfig, EffectSlot};
use stompbox_platform::{Pedal, ProcessingFlag, event_queue};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Device file (TOML) declaring the effect chain
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Effect to apply; repeat to run several in series
    #[arg(short, long)]
    effect: Vec<String>,

    /// Index of the active effect in the device file's chain
    #[arg(long, default_value = "0")]
    select: usize,

    /// Fixed tempo in BPM, as if tapped in
    #[arg(long)]
    tempo_bpm: Option<f32>,

    /// Processing block size
    #[arg(long, default_value = "512")]
    block: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if ![16, 24, 32].contains(&args.bit_depth) {
        anyhow::bail!("Unsupported bit depth {} (expected 16, 24 or 32)", args.bit_depth);
    }
    if args.block == 0 {
        anyhow::bail!("Block size must be at least 1");
    }

    println!("Reading {}...", args.input.display());
    let input = read_stereo(&args.input)?;
    let sample_rate = input.sample_rate as f32;
    println!(
        "  {} frames, {} Hz, {:.2}s",
        input.len(),
        input.sample_rate,
        input.len() as f32 / sample_rate
    );

    let mut device = match &args.config {
        Some(path) => DeviceConfig::load(path)
            .with_context(|| format!("loading device file {}", path.display()))?,
        None => DeviceConfig::default(),
    };
    if !args.effect.is_empty() {
        device.effects = vec![slot_for(&args.effect)];
    }
    if device.effects.is_empty() {
        anyhow::bail!("No effect specified. Use --effect or --config");
    }

    let mut pedal_config = device.pedal_config();
    pedal_config.sample_rate = sample_rate;
    pedal_config.bypass = false;
    let effects = device.build_effects(sample_rate)?;

    // nothing drives the controls offline; the producer only has to exist
    let (_controls, queue) = event_queue(device.scheduler_config().queue_capacity);
    let mut pedal = Pedal::new(effects, pedal_config, queue, ProcessingFlag::new());

    if !pedal.state_mut().set_active(args.select) {
        anyhow::bail!(
            "No effect at index {} (chain has {})",
            args.select,
            pedal.state().effects().len()
        );
    }
    if let Some(bpm) = args.tempo_bpm {
        if !(bpm.is_finite() && bpm > 0.0) {
            anyhow::bail!("Tempo must be a positive BPM, got {bpm}");
        }
        pedal.state_mut().set_tempo(bpm / 60.0);
    }

    let name = pedal
        .state()
        .active_effect()
        .map(|e| e.name().to_string())
        .unwrap_or_default();
    println!("Processing with {name}...");

    let output = process(&mut pedal, &input, args.block);

    println!("\nWriting {}...", args.output.display());
    write_stereo(&args.output, &output, args.bit_depth)?;
    println!("Done!");
    Ok(())
}

/// A single slot for one effect, or a series compound for several.
fn slot_for(names: &[String]) -> EffectSlot {
    match names {
        [one] => EffectSlot::new(one.as_str()),
        many => many
            .iter()
            .fold(EffectSlot::new("compound"), |slot, name| {
                slot.with_child(EffectSlot::new(name.as_str()))
            }),
    }
}

fn process(pedal: &mut Pedal, input: &StereoBuffer, block: usize) -> StereoBuffer {
    let frames = input.len();
    let pb = ProgressBar::new(frames as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("##-"));
    }

    let mut left = vec![0.0; frames];
    let mut right = vec![0.0; frames];
    for (((in_l, in_r), out_l), out_r) in input
        .left
        .chunks(block)
        .zip(input.right.chunks(block))
        .zip(left.chunks_mut(block))
        .zip(right.chunks_mut(block))
    {
        pedal.poll();
        pedal.process_audio(in_l, in_r, out_l, out_r);
        pb.inc(in_l.len() as u64);
    }
    pb.finish_with_message("done");

    StereoBuffer {
        left,
        right,
        sample_rate: input.sample_rate,
    }
}
