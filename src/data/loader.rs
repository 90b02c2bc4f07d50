use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{AnalysisError, Result};

use super::model::{Condition, Signal, Subject, SubjectCollection};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one channel column from a CSV recording.
///
/// CSV layout: a header row naming the channels, then one row per sample in
/// acquisition order. Other columns are ignored.
pub fn load_channel(path: &Path, channel: &str) -> Result<Signal> {
    let file = File::open(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_channel_from_reader(file, channel, &path.display().to_string())
}

/// Same as [`load_channel`] for any reader. `source_name` only appears in
/// error messages.
pub fn load_channel_from_reader<R: Read>(
    reader: R,
    channel: &str,
    source_name: &str,
) -> Result<Signal> {
    let bad = |message: String| AnalysisError::data_format(source_name, message);
    let mut reader = csv_reader(reader);
    let headers = reader
        .headers()
        .map_err(|e| bad(format!("reading CSV headers: {e}")))?
        .clone();

    let col_idx = headers
        .iter()
        .position(|h| h == channel)
        .ok_or_else(|| bad(format!("no column named '{channel}'")))?;

    let mut samples = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        // Row numbers in messages count the header as row 1.
        let line = row_no + 2;
        let record = result.map_err(|e| bad(format!("CSV row {line}: {e}")))?;
        let cell = record.get(col_idx).unwrap_or("");
        let at = format!("row {line}, '{channel}'");
        if cell.is_empty() {
            return Err(bad(format!("{at}: empty cell")));
        }
        let value = cell
            .parse::<f64>()
            .map_err(|_| bad(format!("{at}: '{cell}' is not a number")))?;
        if !value.is_finite() {
            return Err(bad(format!("{at}: non-finite value '{cell}'")));
        }
        samples.push(value);
    }

    if samples.is_empty() {
        return Err(bad(format!("column '{channel}' has no samples")));
    }

    log::debug!(
        "{source_name}: loaded {} samples from '{channel}'",
        samples.len()
    );
    Signal::new(samples).map_err(|e| bad(e.to_string()))
}

/// Channel names from the header row of a CSV recording.
pub fn list_channels(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv_reader(file);
    let headers = reader.headers().map_err(|e| {
        AnalysisError::data_format(
            path.display().to_string(),
            format!("reading CSV headers: {e}"),
        )
    })?;
    Ok(headers.iter().map(|h| h.to_string()).collect())
}

/// Load every `*.csv` file in `dir` as one subject of `condition`.
///
/// Files are taken in file-name order; sub-directories and other extensions
/// are skipped. The first file that fails to load aborts the whole load.
pub fn load_condition(
    dir: &Path,
    condition: Condition,
    channel: &str,
) -> Result<SubjectCollection> {
    let mut subjects = Vec::new();
    for path in csv_files(dir)? {
        let signal = load_channel(&path, channel)?;
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        subjects.push(Subject {
            id,
            path: Some(path),
            signal,
        });
    }

    log::info!(
        "Loaded {} {condition} subjects from {} (channel '{channel}')",
        subjects.len(),
        dir.display()
    );
    Ok(SubjectCollection::new(condition, subjects))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let io_err = |source| AnalysisError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_named_column() {
        let csv = "Fp1..,O1..,O2..\n1,2.5,3\n4, -5.0 ,6\n";
        let sig = load_channel_from_reader(csv.as_bytes(), "O1..", "mem").unwrap();
        assert_eq!(sig.samples(), &[2.5, -5.0]);
    }

    #[test]
    fn missing_channel_is_format_error() {
        let csv = "Fp1..,O2..\n1,2\n";
        let err = load_channel_from_reader(csv.as_bytes(), "O1..", "mem").unwrap_err();
        assert!(matches!(err, AnalysisError::DataFormat { .. }));
        assert!(err.to_string().contains("O1.."));
    }

    #[test]
    fn bad_cells_are_format_errors() {
        for csv in [
            "O1..\n1\nabc\n",
            "O1..,O2..\n1,2\n,3\n",
            "O1..\n1\nNaN\n",
            "O1..\n",
            "O1..,O2..\n1,2\n3\n",
        ] {
            let err = load_channel_from_reader(csv.as_bytes(), "O1..", "mem").unwrap_err();
            assert!(
                matches!(err, AnalysisError::DataFormat { .. }),
                "{csv:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn lists_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.csv", "Fp1.., O1..\n1,2\n");
        assert_eq!(list_channels(&path).unwrap(), vec!["Fp1..", "O1.."]);
    }

    #[test]
    fn condition_dir_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "S002.csv", "O1..\n2\n");
        write_file(dir.path(), "S001.CSV", "O1..\n1\n");
        write_file(dir.path(), "notes.txt", "not a recording");
        std::fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let coll = load_condition(dir.path(), Condition::Open, "O1..").unwrap();
        assert_eq!(coll.condition, Condition::Open);
        let ids: Vec<_> = coll.subjects().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["S001", "S002"]);
        assert_eq!(coll.subjects()[1].signal.samples(), &[2.0]);
    }

    #[test]
    fn condition_dir_reports_failing_file() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "S001.csv", "O2..\n1\n");
        let err = load_condition(dir.path(), Condition::Closed, "O1..").unwrap_err();
        assert!(err.to_string().contains("S001.csv"));
    }

    #[test]
    fn missing_dir_is_io_error() {
        let missing = Path::new("/definitely/not/here");
        let err = load_condition(missing, Condition::Closed, "O1..").unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }
}
