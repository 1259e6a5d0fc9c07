//! Configuration loading from files and the environment

use echo_playback::{PlaybackConfig, PlaybackController, PlaybackError, RecordingMedia, VolumeCurve};
use std::fs;
use tempfile::TempDir;

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let config = PlaybackConfig::load(Some(&path)).unwrap();

    assert_eq!(config.volume, PlaybackConfig::default().volume);
    assert!(!config.repeat);
}

#[test]
fn file_values_override_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("playback.toml");
    fs::write(
        &path,
        "volume = 35\nrepeat = true\nvolume_curve = \"logarithmic\"\nshuffle_seed = 7\n",
    )
    .unwrap();

    let config = PlaybackConfig::load(Some(&path)).unwrap();

    assert_eq!(config.volume, 35);
    assert!(config.repeat);
    assert!(!config.shuffle);
    assert_eq!(config.volume_curve, VolumeCurve::Logarithmic);
    assert_eq!(config.shuffle_seed, Some(7));
}

#[test]
fn malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "volume = \"loud\"\n").unwrap();

    let result = PlaybackConfig::load(Some(&path));

    assert!(matches!(result, Err(PlaybackError::Config(_))));
}

#[test]
fn environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("playback.toml");
    fs::write(&path, "seek_step_secs = 5.0\n").unwrap();

    std::env::set_var("ECHO_SEEK_STEP_SECS", "15");
    let result = PlaybackConfig::load(Some(&path));
    std::env::remove_var("ECHO_SEEK_STEP_SECS");

    assert_eq!(result.unwrap().seek_step_secs, 15.0);
}

#[test]
fn loaded_config_seeds_controller() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("playback.toml");
    fs::write(&path, "volume = 0\nshuffle = true\n").unwrap();

    let config = PlaybackConfig::load(Some(&path)).unwrap();
    let controller = PlaybackController::new(RecordingMedia::new(), config);

    assert_eq!(controller.volume(), 0);
    assert!(controller.is_muted());
    assert!(controller.media().muted);
    assert!(controller.state().is_shuffle);
}
