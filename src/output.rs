use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use eeg_band_analyzer::analysis::SignalPowers;
use eeg_band_analyzer::{AnalysisSession, BandComparison};

/// Pretty-print `value` as JSON on stdout.
pub fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).context("JSON serialization failed")?;
    handle.write_all(b"\n").context("writing to stdout")?;
    Ok(())
}

pub fn print_comparison(session: &AnalysisSession) {
    let (n_closed, n_open) = session.subject_counts();
    let config = session.config();
    println!(
        "Channel {} @ {} Hz, order {} | closed: {n_closed} subjects, open: {n_open} subjects",
        config.channel, config.sampling_rate, config.filter_order
    );
    print_comparison_rows(&session.comparison());

    for table in [session.closed_avg_band(), session.open_avg_band()] {
        if !table.is_partial() {
            continue;
        }
        for entry in table.iter().filter(|e| !e.skipped.is_empty()) {
            println!(
                "note: {} {} averaged over {} subjects, skipped {}",
                table.condition,
                entry.band,
                entry.subjects,
                entry.skipped.join(", ")
            );
        }
    }
}

/// Closed, open and ratio per band; `-` where the ratio is undefined.
pub fn print_comparison_rows(rows: &[BandComparison]) {
    println!(
        "{:<10} {:>12} {:>14} {:>14} {:>12}",
        "Band", "Range (Hz)", "Closed", "Open", "Closed/Open"
    );
    for row in rows {
        let ratio = match row.ratio {
            Some(r) => format!("{r:.3}"),
            None => "-".to_string(),
        };
        println!(
            "{:<10} {:>12} {:>14.4} {:>14.4} {:>12}",
            row.band,
            format!("{}-{}", row.low, row.high),
            row.closed,
            row.open,
            ratio
        );
    }
}

pub fn print_band_powers(powers: &SignalPowers) {
    println!(
        "{:<10} {:>12} {:>14} {:>10}",
        "Band", "Range (Hz)", "Power", "Share"
    );
    for b in &powers.bands {
        let share = if powers.broadband > 0.0 {
            format!("{:.1}%", 100.0 * b.power / powers.broadband)
        } else {
            "-".to_string()
        };
        println!(
            "{:<10} {:>12} {:>14.4} {:>10}",
            b.band,
            format!("{}-{}", b.low, b.high),
            b.power,
            share
        );
    }
    println!("{:<10} {:>12} {:>14.4}", "Total", "", powers.broadband);
}
