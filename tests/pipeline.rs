use std::f64::consts::PI;
use std::path::Path;

use eeg_band_analyzer::{
    bandpass, compute_power, AnalysisConfig, AnalysisError, AnalysisSession, Band, FailurePolicy,
};

const FS: f64 = 160.0;

fn write_recording(path: &Path, freq: f64, amplitude: f64, phase: f64, seconds: f64) {
    let n = (seconds * FS) as usize;
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(["Fp1..", "O1.."]).unwrap();
    for i in 0..n {
        let t = i as f64 / FS;
        let o1 = amplitude * (2.0 * PI * freq * t + phase).sin();
        writer
            .write_record([format!("{:.9}", 0.1 * o1), format!("{o1:.9}")])
            .unwrap();
    }
    writer.flush().unwrap();
}

fn dataset(root: &Path) -> AnalysisConfig {
    let closed = root.join("closed");
    let open = root.join("open");
    std::fs::create_dir_all(&closed).unwrap();
    std::fs::create_dir_all(&open).unwrap();
    AnalysisConfig {
        closed_dir: closed,
        open_dir: open,
        ..Default::default()
    }
}

#[test]
fn matched_alpha_gives_matched_averages() {
    let dir = tempfile::tempdir().unwrap();
    let config = dataset(dir.path());
    write_recording(&config.closed_dir.join("S001.csv"), 10.0, 10.0, 0.0, 60.0);
    write_recording(&config.closed_dir.join("S002.csv"), 10.0, 10.0, 1.3, 60.0);
    write_recording(&config.open_dir.join("S001.csv"), 10.0, 10.0, 0.4, 60.0);
    write_recording(&config.open_dir.join("S002.csv"), 10.0, 10.0, 2.9, 60.0);

    let session = AnalysisSession::initialize(config).unwrap();
    let closed = session.closed_avg_band();
    let open = session.open_avg_band();

    let expected = 10.0 * 10.0 / 2.0;
    for table in [closed, open] {
        let alpha = table["Alpha"];
        assert!((alpha - expected).abs() < 0.05 * expected, "alpha {alpha}");
        for band in ["Delta", "Theta", "Beta", "Gamma"] {
            let p = table[band];
            assert!(p < 0.02 * alpha, "{band} = {p} vs alpha {alpha}");
        }
    }
    assert!((closed["Alpha"] / open["Alpha"] - 1.0).abs() < 0.05);
    assert_eq!(session.subject_counts(), (2, 2));
}

#[test]
fn stronger_closed_alpha_shows_up() {
    let dir = tempfile::tempdir().unwrap();
    let config = dataset(dir.path());
    write_recording(&config.closed_dir.join("S001.csv"), 10.0, 20.0, 0.0, 30.0);
    write_recording(&config.open_dir.join("S001.csv"), 10.0, 5.0, 0.0, 30.0);

    let session = AnalysisSession::initialize(config).unwrap();
    let alpha = session
        .comparison()
        .into_iter()
        .find(|row| row.band == "Alpha")
        .unwrap();
    let ratio = alpha.ratio.unwrap();
    assert!((ratio - 16.0).abs() < 0.5, "ratio {ratio}");
}

#[test]
fn two_second_recording_keeps_length() {
    let x: Vec<f64> = (0..320)
        .map(|i| (2.0 * PI * 10.0 * i as f64 / FS).sin())
        .collect();
    let y = bandpass(&x, 8.0, 13.0, FS, 4).unwrap();
    assert_eq!(y.len(), 320);
    assert!(compute_power(&y).unwrap() > 0.0);
}

#[test]
fn short_recording_fails_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let config = dataset(dir.path());
    write_recording(&config.closed_dir.join("S001.csv"), 10.0, 1.0, 0.0, 10.0);
    write_recording(&config.closed_dir.join("S002.csv"), 10.0, 1.0, 0.0, 0.1);
    write_recording(&config.open_dir.join("S001.csv"), 10.0, 1.0, 0.0, 10.0);

    let err = AnalysisSession::initialize(config.clone()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("S002.csv"), "{msg}");
    assert!(matches!(err.root(), AnalysisError::SignalTooShort { .. }));

    let config = AnalysisConfig {
        failure_policy: FailurePolicy::SkipSubject,
        ..config
    };
    let session = AnalysisSession::initialize(config).unwrap();
    let alpha = session.closed_avg_band().entry("Alpha").unwrap();
    assert_eq!(alpha.subjects, 1);
    assert_eq!(alpha.skipped, vec!["S002".to_string()]);
}

#[test]
fn empty_condition_folder_is_no_subjects() {
    let dir = tempfile::tempdir().unwrap();
    let config = dataset(dir.path());
    write_recording(&config.closed_dir.join("S001.csv"), 10.0, 1.0, 0.0, 10.0);

    let err = AnalysisSession::initialize(config).unwrap_err();
    assert!(matches!(err, AnalysisError::NoSubjects { .. }));
}

#[test]
fn missing_channel_is_data_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = AnalysisConfig {
        channel: "Oz..".to_string(),
        ..dataset(dir.path())
    };
    write_recording(&config.closed_dir.join("S001.csv"), 10.0, 1.0, 0.0, 10.0);
    write_recording(&config.open_dir.join("S001.csv"), 10.0, 1.0, 0.0, 10.0);

    let err = AnalysisSession::initialize(config).unwrap_err();
    assert!(matches!(err, AnalysisError::DataFormat { .. }));
}

#[test]
fn nyquist_band_in_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = dataset(dir.path());
    config.bands.push(Band::new("High", 40.0, 80.0));
    let err = AnalysisSession::initialize(config).unwrap_err();
    assert!(err.to_string().contains("High"), "{err}");
    assert!(matches!(err.root(), AnalysisError::InvalidBand { .. }));
}
