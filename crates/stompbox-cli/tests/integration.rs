//! Integration tests for the `stompbox` binary.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn stompbox_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_stompbox"))
}

fn write_sine(path: &Path, channels: u16, frames: usize) {
    let spec = WavSpec {
        channels,
        sample_rate: 48000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let s = ((i as f32 * 0.05).sin() * 16000.0) as i16;
        for _ in 0..channels {
            writer.write_sample(s).unwrap();
        }
    }
    writer.finalize().unwrap();
}

#[test]
fn test_effects_lists_registry() {
    let output = stompbox_bin().arg("effects").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["delay", "tremolo", "gain", "compound"] {
        assert!(stdout.contains(name), "listing should contain '{name}'");
    }
    assert!(stdout.contains("Tempo Sync"));
    assert!(stdout.contains("log_a"));
}

#[test]
fn test_effects_unknown_name_fails() {
    let output = stompbox_bin().args(["effects", "flanger"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_tap_prints_subdivisions() {
    let output = stompbox_bin().args(["tap", "0", "500"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("120.0 BPM"), "got: {stdout}");
    assert!(stdout.contains("1/4"));
    assert!(stdout.contains("500.0 ms"));
}

#[test]
fn test_tap_too_slow_fails() {
    let output = stompbox_bin().args(["tap", "0", "2500"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_process_mono_file_writes_stereo() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");
    write_sine(&input, 1, 4800);

    let output = stompbox_bin()
        .arg("process")
        .arg(&input)
        .arg(&output_path)
        .args(["--effect", "tremolo", "--tempo-bpm", "120", "--block", "100"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let reader = WavReader::open(&output_path).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 48000);
    assert_eq!(reader.len(), 4800 * 2);
}

#[test]
fn test_process_with_device_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output_path = dir.path().join("out.wav");
    let device = dir.path().join("device.toml");
    write_sine(&input, 2, 2400);
    std::fs::write(
        &device,
        r#"
[[effects]]
type = "gain"
params = { Level = 0.0 }

[[effects]]
type = "delay"
"#,
    )
    .unwrap();

    let output = stompbox_bin()
        .arg("process")
        .arg(&input)
        .arg(&output_path)
        .arg("--config")
        .arg(&device)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    // the first effect is active and mutes everything
    let mut reader = WavReader::open(&output_path).unwrap();
    assert!(reader.samples::<f32>().all(|s| s.unwrap() == 0.0));
}

#[test]
fn test_process_without_effect_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    write_sine(&input, 1, 100);

    let output = stompbox_bin()
        .arg("process")
        .arg(&input)
        .arg(dir.path().join("out.wav"))
        .output()
        .unwrap();
    assert!(!output.status.success());
}
