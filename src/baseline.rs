//! The `BASELINE_METRICS` text format used to persist a [`MetricsSnapshot`]
//!
//! ```text
//! BASELINE_METRICS
//! init_swapchain=<int>
//! init_commands=<int>
//! init_synch_structures=<int>
//! init_descriptors=<int>
//! init_pipelines=<int>
//! total_time=<int>
//! ```

use std::{
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use eyre::WrapErr;
use thiserror::Error;
use tracing as trc;

use crate::metrics::{MetricsSnapshot, Phase};

/// The first line of every baseline file
pub const HEADER: &str = "BASELINE_METRICS";

/// A recoverable problem found while reading a baseline
///
/// These are reported to the operator but never abort the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BaselineWarning {
    #[error("Baseline file format not recognized")]
    MissingHeader,
}

/// The result of reading a baseline source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub snapshot: MetricsSnapshot,
    pub warning: Option<BaselineWarning>,
}

/// Encode a snapshot as a header line followed by one `key=value` line per phase
pub fn write<W: Write>(snapshot: &MetricsSnapshot, mut writer: W) -> io::Result<()> {
    writeln!(writer, "{}", HEADER)?;
    for (phase, micros) in snapshot.iter() {
        writeln!(writer, "{}={}", phase.key(), micros)?;
    }
    writer.flush()
}

/// Decode a snapshot
///
/// A source whose first line is not exactly [`HEADER`] decodes to an all-zero
/// snapshot with [`BaselineWarning::MissingHeader`]; nothing after it is read.
/// Lines are taken as raw bytes, so binary or non-UTF-8 input is never an
/// error. Unknown keys are skipped and repeated keys keep their last value.
pub fn read<R: BufRead>(reader: R) -> io::Result<Decoded> {
    let mut lines = reader.split(b'\n');

    let header = lines.next().transpose()?;
    if header.as_deref().map(trim_cr) != Some(HEADER.as_bytes()) {
        return Ok(Decoded {
            snapshot: MetricsSnapshot::new(),
            warning: Some(BaselineWarning::MissingHeader),
        });
    }

    let mut snapshot = MetricsSnapshot::new();
    for line in lines {
        let line = line?;
        let line = String::from_utf8_lossy(trim_cr(&line));
        let (key, value) = match line.find('=') {
            Some(i) => (&line[..i], &line[i + 1..]),
            None => continue,
        };
        if let Some(phase) = Phase::from_key(key) {
            snapshot.set(phase, leading_integer(value));
        }
    }

    Ok(Decoded {
        snapshot,
        warning: None,
    })
}

fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// The integer at the start of a value, after any whitespace
///
/// No digits reads as `0`; a value too large for `u64` saturates.
fn leading_integer(value: &str) -> u64 {
    let value = value.trim_start();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or_else(|| value.len());
    if end == 0 {
        return 0;
    }
    value[..end].parse().unwrap_or(u64::MAX)
}

/// Write a snapshot to a baseline file, replacing anything already there
#[trc::instrument(skip(snapshot))]
pub fn save(snapshot: &MetricsSnapshot, path: &Path) -> eyre::Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .wrap_err_with(|| format!("Could not create baseline file {}", path.display()))?;
    write(snapshot, BufWriter::new(file)).wrap_err("Could not write baseline metrics")?;

    Ok(())
}

/// Read a baseline file
#[trc::instrument]
pub fn load(path: &Path) -> eyre::Result<Decoded> {
    let file = File::open(path)
        .wrap_err_with(|| format!("Could not open baseline file {}", path.display()))?;
    let decoded = read(BufReader::new(file)).wrap_err("Could not read baseline metrics")?;

    if let Some(warning) = &decoded.warning {
        trc::warn!("{}", warning);
    }

    Ok(decoded)
}
