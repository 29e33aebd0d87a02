//! Effect listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use stompbox_core::{DEFAULT_SAMPLE_RATE, ParamKind, Parameter};
use stompbox_effects::EffectKind;

#[derive(Args)]
pub struct EffectsArgs {
    /// Show only this effect
    #[arg(value_name = "EFFECT")]
    effect: Option<String>,
}

pub fn run(args: EffectsArgs) -> anyhow::Result<()> {
    let kinds: Vec<EffectKind> = match &args.effect {
        Some(name) => vec![
            EffectKind::from_name(name).ok_or_else(|| anyhow::anyhow!("Unknown effect: {}", name))?,
        ],
        None => EffectKind::ALL.to_vec(),
    };

    println!("Available Effects");
    println!("=================");

    for kind in kinds {
        let mut effect = kind.create();
        effect.init(DEFAULT_SAMPLE_RATE);

        println!();
        println!("{:10} - {}", kind.id(), kind.description());

        if effect.params().is_empty() {
            println!("  (no parameters; children are declared in the device file)");
            continue;
        }

        println!(
            "  {:12}  {:16}  {:8}  {:10}  {}",
            "Name", "Range", "Default", "Control", "Curve"
        );
        println!(
            "  {:12}  {:16}  {:8}  {:10}  {}",
            "----", "-----", "-------", "-------", "-----"
        );
        for param in effect.params() {
            println!(
                "  {:12}  {:16}  {:8}  {:10}  {}",
                param.name(),
                format!("{} .. {}", param.min(), param.max()),
                format_value(param),
                format_control(param),
                format_curve(param)
            );
        }
    }

    println!();
    println!("Use 'stompbox process input.wav output.wav --effect <name>' to hear one.");
    Ok(())
}

fn format_value(param: &Parameter) -> String {
    match param.kind() {
        ParamKind::Toggle { on } => if on { "on" } else { "off" }.to_string(),
        _ => format!("{:.3}", param.value()),
    }
}

fn format_control(param: &Parameter) -> String {
    match param.control_index() {
        Some(index) => format!("{} {}", param.control_kind().name(), index),
        None => "-".to_string(),
    }
}

fn format_curve(param: &Parameter) -> String {
    match param.kind() {
        ParamKind::Continuous { curve } => curve.name().to_string(),
        ParamKind::Stepped { step } => format!("step {step}"),
        ParamKind::Toggle { .. } => "-".to_string(),
    }
}
