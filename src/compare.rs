//! Per-phase comparison of a run against a baseline

use std::fmt;

use serde::Serialize;

use crate::metrics::{MetricsSnapshot, Phase};

/// Percentage change from `baseline` to `current`
///
/// A zero baseline gives `0.0`. That is a placeholder for "no reference", not
/// a claim that the two runs performed the same.
pub fn percent_delta(current: u64, baseline: u64) -> f64 {
    if baseline == 0 {
        0.0
    } else {
        (current as f64 - baseline as f64) / baseline as f64 * 100.
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct PhaseDelta {
    pub phase: Phase,
    pub current_us: u64,
    pub baseline_us: u64,
    pub percent: f64,
}

impl PhaseDelta {
    pub fn is_slower(&self) -> bool {
        self.percent > 0.
    }
}

impl fmt::Display for PhaseDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}\u{b5}s vs {}\u{b5}s (",
            self.phase.label(),
            self.current_us,
            self.baseline_us
        )?;
        if self.is_slower() {
            write!(f, "{:+.2}% slower)", self.percent)
        } else {
            write!(f, "{:.2}% faster)", self.percent)
        }
    }
}

/// A full comparison report, one row per phase with total time last
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Comparison {
    pub phases: Vec<PhaseDelta>,
}

impl Comparison {
    pub fn new(current: &MetricsSnapshot, baseline: &MetricsSnapshot) -> Self {
        let phases = Phase::ALL
            .iter()
            .map(|&phase| {
                let current_us = current.get(phase);
                let baseline_us = baseline.get(phase);
                PhaseDelta {
                    phase,
                    current_us,
                    baseline_us,
                    percent: percent_delta(current_us, baseline_us),
                }
            })
            .collect();

        Comparison { phases }
    }

    pub fn get(&self, phase: Phase) -> Option<&PhaseDelta> {
        self.phases.iter().find(|d| d.phase == phase)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(
            f,
            "=== Performance Comparison vs Baseline (in microseconds) ==="
        )?;
        for delta in &self.phases {
            writeln!(f, "{}", delta)?;
        }
        Ok(())
    }
}
