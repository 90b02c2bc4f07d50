use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use eeg_band_analyzer::data::model::{Band, BandPowerTable, Signal};
use eeg_band_analyzer::state::BandComparison;
use eeg_band_analyzer::{
    band_powers, list_channels, load_channel, AnalysisConfig, AnalysisSession, FailurePolicy,
    SignalPowers,
};

use crate::cli::{BandPowerArgs, ChannelsArgs, Command, CompareArgs};
use crate::output;

pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Compare(args) => compare(args),
        Command::BandPower(args) => band_power(args),
        Command::Channels(args) => channels(args),
    }
}

// ---------------------------------------------------------------------------
// compare
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CompareOutput<'a> {
    config: &'a AnalysisConfig,
    closed_avg_band: &'a BandPowerTable,
    open_avg_band: &'a BandPowerTable,
    comparison: Vec<BandComparison>,
}

/// File config first, then flag overrides.
fn resolve_config(args: &CompareArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(dir) = &args.closed_dir {
        config.closed_dir = dir.clone();
    }
    if let Some(dir) = &args.open_dir {
        config.open_dir = dir.clone();
    }
    if let Some(channel) = &args.channel {
        config.channel = channel.clone();
    }
    if let Some(rate) = args.sampling_rate {
        config.sampling_rate = rate;
    }
    if let Some(order) = args.order {
        config.filter_order = order;
    }
    if args.skip_failed {
        config.failure_policy = FailurePolicy::SkipSubject;
    }
    Ok(config)
}

fn compare(args: CompareArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    log::info!(
        "Comparing {} (closed) with {} (open)",
        config.closed_dir.display(),
        config.open_dir.display()
    );
    let session = AnalysisSession::initialize(config).context("band power analysis failed")?;

    if args.json {
        output::write_json(&CompareOutput {
            config: session.config(),
            closed_avg_band: session.closed_avg_band(),
            open_avg_band: session.open_avg_band(),
            comparison: session.comparison(),
        })
    } else {
        output::print_comparison(&session);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// band-power
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct PairOutput {
    closed: SignalPowers,
    open: SignalPowers,
    comparison: Vec<BandComparison>,
}

fn select_bands(names: &[String]) -> Result<Vec<Band>> {
    let canonical = Band::canonical();
    if names.is_empty() {
        return Ok(canonical);
    }
    let known = canonical
        .iter()
        .map(|b| b.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    names
        .iter()
        .map(|name| {
            canonical
                .iter()
                .find(|b| b.name.eq_ignore_ascii_case(name))
                .cloned()
                .with_context(|| format!("Unknown band '{name}'. Known bands: {known}"))
        })
        .collect()
}

fn recording_powers(
    file: &Path,
    args: &BandPowerArgs,
    bands: &[Band],
) -> Result<(Signal, SignalPowers)> {
    let channel = &args.channel;
    let signal = load_channel(file, channel)
        .with_context(|| format!("loading '{channel}' from {}", file.display()))?;
    let powers = band_powers(&signal, bands, args.sampling_rate, args.order)
        .with_context(|| format!("filtering {}", file.display()))?;
    Ok((signal, powers))
}

fn band_power(args: BandPowerArgs) -> Result<()> {
    let bands = select_bands(&args.bands)?;
    let (signal, powers) = recording_powers(&args.file, &args, &bands)?;

    if let Some(open_file) = &args.compare {
        let (_, open) = recording_powers(open_file, &args, &bands)?;
        let comparison = BandComparison::between(&powers, &open);
        return if args.json {
            output::write_json(&PairOutput {
                closed: powers,
                open,
                comparison,
            })
        } else {
            println!(
                "{} (closed) vs {} (open), channel {}",
                args.file.display(),
                open_file.display(),
                args.channel
            );
            output::print_comparison_rows(&comparison);
            Ok(())
        };
    }

    if args.json {
        output::write_json(&powers)
    } else {
        println!(
            "{} ({}, {} samples, {:.1} s)",
            args.file.display(),
            args.channel,
            signal.len(),
            signal.duration(args.sampling_rate)
        );
        output::print_band_powers(&powers);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// channels
// ---------------------------------------------------------------------------

fn channels(args: ChannelsArgs) -> Result<()> {
    let names = list_channels(&args.file)?;
    if args.json {
        output::write_json(&names)
    } else {
        for name in &names {
            println!("{name}");
        }
        Ok(())
    }
}
