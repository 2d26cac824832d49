//! Line-buffered extraction of phase timings from a program's output

use std::io::{self, Write};

use tracing as trc;

use crate::{
    duration::parse_micros,
    metrics::{MetricsSnapshot, Phase},
};

/// Where the duration text starts relative to a marker line's anchor
#[derive(Clone, Copy, Debug)]
enum Anchor {
    /// After the first `took`, skipping 5 characters
    Took,
    /// After the first `:`, skipping 2 characters
    Colon,
}

impl Anchor {
    fn duration_text(self, line: &str) -> Option<&str> {
        let (token, skip) = match self {
            Anchor::Took => ("took", 5),
            Anchor::Colon => (":", 2),
        };
        let pos = line.find(token)?;
        line.get(pos + skip..)
    }
}

/// Marker substrings, checked in order; the first match wins
static MARKERS: &[(&str, Phase, Anchor)] = &[
    ("init_swapchain()", Phase::InitSwapchain, Anchor::Took),
    ("init_commands()", Phase::InitCommands, Anchor::Took),
    ("init_synch_structures()", Phase::InitSynchStructures, Anchor::Took),
    ("init_descriptors()", Phase::InitDescriptors, Anchor::Took),
    ("init_pipelines()", Phase::InitPipelines, Anchor::Took),
    ("Total time taken", Phase::TotalTime, Anchor::Colon),
];

/// Classify one line, returning the phase it reports and its duration
///
/// A marker line whose duration can't be found reports `0`.
pub fn classify(line: &str) -> Option<(Phase, u64)> {
    let &(_, phase, anchor) = MARKERS.iter().find(|(marker, _, _)| line.contains(marker))?;
    let micros = anchor.duration_text(line).map(parse_micros).unwrap_or(0);
    Some((phase, micros))
}

/// A writer that records phase timings while passing bytes through untouched
///
/// Bytes are held until a `\n` completes the line, then the line is
/// classified and forwarded whole to the inner writer. Bytes of a trailing
/// line with no `\n` are only forwarded by [`LineExtractor::finish`] and are
/// never classified.
pub struct LineExtractor<W: Write> {
    inner: W,
    line: Vec<u8>,
    metrics: MetricsSnapshot,
}

impl<W: Write> LineExtractor<W> {
    pub fn new(inner: W) -> Self {
        LineExtractor {
            inner,
            line: Vec::new(),
            metrics: MetricsSnapshot::new(),
        }
    }

    /// The timings observed so far
    pub fn metrics(&self) -> &MetricsSnapshot {
        &self.metrics
    }

    /// Forward any unterminated line and hand back the metrics and the writer
    pub fn finish(mut self) -> io::Result<(MetricsSnapshot, W)> {
        if !self.line.is_empty() {
            self.inner.write_all(&self.line)?;
            self.line.clear();
        }
        self.inner.flush()?;
        Ok((self.metrics, self.inner))
    }

    fn complete_line(&mut self) -> io::Result<()> {
        if let Some((phase, micros)) = classify(&String::from_utf8_lossy(&self.line)) {
            trc::debug!(phase = phase.key(), micros, "Captured phase timing");
            self.metrics.set(phase, micros);
        }
        let result = self.inner.write_all(&self.line);
        self.line.clear();
        result
    }
}

impl<W: Write> Write for LineExtractor<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.line.push(byte);
            if byte == b'\n' {
                self.complete_line()?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
