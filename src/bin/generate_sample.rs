//! Writes a synthetic eyes-closed / eyes-open dataset for trying the analyzer.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

const SAMPLING_RATE: f64 = 160.0;
const CHANNELS: [&str; 4] = ["Fp1..", "C3..", "O1..", "O2.."];

#[derive(Parser)]
#[command(
    name = "generate_sample",
    about = "Generate a synthetic closed/open EEG dataset"
)]
struct Args {
    /// Output folder; `closed/` and `open/` are created inside it
    #[arg(long, default_value = "data")]
    out: PathBuf,

    /// Subjects per condition
    #[arg(long, default_value_t = 5)]
    subjects: usize,

    /// Recording length in seconds
    #[arg(long, default_value_t = 60.0)]
    seconds: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Seeded splitmix64 stream for rhythm parameters and sensor noise.
struct Noise {
    state: u64,
    spare: Option<f64>,
}

impl Noise {
    fn new(seed: u64) -> Self {
        Noise {
            state: seed,
            spare: None,
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        low + (high - low) * unit
    }

    fn phase(&mut self) -> f64 {
        self.uniform(0.0, 2.0 * PI)
    }

    /// Zero-mean Gaussian sample, Marsaglia polar method.
    fn gaussian(&mut self, std_dev: f64) -> f64 {
        if let Some(z) = self.spare.take() {
            return std_dev * z;
        }
        loop {
            let u = self.uniform(-1.0, 1.0);
            let v = self.uniform(-1.0, 1.0);
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let k = (-2.0 * s.ln() / s).sqrt();
                self.spare = Some(v * k);
                return std_dev * u * k;
            }
        }
    }
}

/// One oscillatory component: frequency (Hz), amplitude (µV), phase.
struct Rhythm {
    freq: f64,
    amplitude: f64,
    phase: f64,
}

impl Rhythm {
    fn at(&self, t: f64) -> f64 {
        self.amplitude * (2.0 * PI * self.freq * t + self.phase).sin()
    }
}

/// Alpha amplitude in µV by channel; occipital sites dominate.
fn alpha_amplitude(channel: &str, eyes_closed: bool) -> f64 {
    let occipital = channel.starts_with('O');
    match (eyes_closed, occipital) {
        (true, true) => 20.0,
        (true, false) => 8.0,
        (false, true) => 6.0,
        (false, false) => 3.0,
    }
}

fn write_subject(
    path: &Path,
    eyes_closed: bool,
    n_samples: usize,
    noise: &mut Noise,
) -> Result<()> {
    let subject_gain = noise.uniform(0.8, 1.2);
    let alpha_freq = noise.uniform(9.0, 11.0);

    let rhythms: Vec<Vec<Rhythm>> = CHANNELS
        .iter()
        .map(|ch| {
            vec![
                Rhythm {
                    freq: alpha_freq,
                    amplitude: alpha_amplitude(ch, eyes_closed) * subject_gain,
                    phase: noise.phase(),
                },
                Rhythm {
                    freq: noise.uniform(5.0, 7.0),
                    amplitude: 4.0 * subject_gain,
                    phase: noise.phase(),
                },
                Rhythm {
                    freq: noise.uniform(16.0, 24.0),
                    amplitude: 3.0,
                    phase: noise.phase(),
                },
            ]
        })
        .collect();

    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(CHANNELS)?;
    for i in 0..n_samples {
        let t = i as f64 / SAMPLING_RATE;
        let row: Vec<String> = rhythms
            .iter()
            .map(|components| {
                let v = components.iter().map(|r| r.at(t)).sum::<f64>() + noise.gaussian(5.0);
                format!("{v:.3}")
            })
            .collect();
        writer.write_record(&row)?;
    }
    writer
        .flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut noise = Noise::new(args.seed);
    let n_samples = (args.seconds * SAMPLING_RATE).round() as usize;

    for (folder, eyes_closed) in [("closed", true), ("open", false)] {
        let dir = args.out.join(folder);
        std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        for subject in 1..=args.subjects {
            let path = dir.join(format!("S{subject:03}.csv"));
            write_subject(&path, eyes_closed, n_samples, &mut noise)?;
        }
    }

    println!(
        "Wrote {} subjects per condition ({n_samples} samples, {} channels each) to {}",
        args.subjects,
        CHANNELS.len(),
        args.out.display()
    );
    Ok(())
}
