use std::{fs, io::Write};

use startup_benchmark::{
    baseline,
    compare::Comparison,
    engine::{run_engine, Engine},
    extract::LineExtractor,
    metrics::{MetricsSnapshot, Phase},
    tee::Tee,
};

/// An engine that reports fixed phase timings
struct FakeEngine {
    scale: u64,
}

impl Engine for FakeEngine {
    fn init(&mut self, out: &mut dyn Write) -> eyre::Result<()> {
        writeln!(out, "Vulkan device selected")?;
        writeln!(out, "init_swapchain() took {} milliseconds", 4 * self.scale)?;
        writeln!(out, "init_commands() took {} microseconds", 350 * self.scale)?;
        writeln!(out, "init_synch_structures() took {} microseconds", 90 * self.scale)?;
        writeln!(out, "init_descriptors() took {} microseconds", 410 * self.scale)?;
        writeln!(out, "init_pipelines() took {} milliseconds", 21 * self.scale)?;
        Ok(())
    }

    fn run(&mut self, out: &mut dyn Write) -> eyre::Result<()> {
        writeln!(out, "Rendered 300 frames")?;
        Ok(())
    }

    fn cleanup(&mut self, _out: &mut dyn Write) -> eyre::Result<()> {
        Ok(())
    }
}

fn capture(engine: &mut FakeEngine) -> (MetricsSnapshot, Vec<u8>, Vec<u8>) {
    let mut out = Tee::new(LineExtractor::new(Vec::new()), Vec::new());
    run_engine(engine, &mut out).unwrap();

    let (extractor, log) = out.into_inner();
    let (metrics, console) = extractor.finish().unwrap();
    (metrics, console, log)
}

#[test]
fn console_and_log_see_the_same_run() {
    let (metrics, console, log) = capture(&mut FakeEngine { scale: 1 });

    assert_eq!(console, log);
    let text = String::from_utf8(log).unwrap();
    assert!(text.contains("Vulkan device selected\n"));
    assert!(text.contains("Total time taken for init and run: "));

    assert_eq!(metrics.init_swapchain, 4_000);
    assert_eq!(metrics.init_commands, 350);
    assert_eq!(metrics.init_synch_structures, 90);
    assert_eq!(metrics.init_descriptors, 410);
    assert_eq!(metrics.init_pipelines, 21_000);
}

#[test]
fn baseline_then_compare() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("baseline_performance.txt");

    let (recorded, _, _) = capture(&mut FakeEngine { scale: 1 });
    baseline::save(&recorded, &path).unwrap();

    let stored = fs::read_to_string(&path).unwrap();
    assert!(stored.starts_with("BASELINE_METRICS\ninit_swapchain=4000\n"));

    let (current, _, _) = capture(&mut FakeEngine { scale: 2 });
    let decoded = baseline::load(&path).unwrap();
    assert_eq!(decoded.warning, None);
    assert_eq!(decoded.snapshot, recorded);

    let comparison = Comparison::new(&current, &decoded.snapshot);
    for phase in &[
        Phase::InitSwapchain,
        Phase::InitCommands,
        Phase::InitSynchStructures,
        Phase::InitDescriptors,
        Phase::InitPipelines,
    ] {
        let delta = comparison.get(*phase).unwrap();
        assert_eq!(delta.percent, 100.);
        assert!(delta.is_slower());
    }

    let report = comparison.to_string();
    assert!(report.contains("init_pipelines: 42000\u{b5}s vs 21000\u{b5}s (+100.00% slower)"));
}

#[test]
fn malformed_baseline_compares_against_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "init_swapchain=10\ntotal_time=20\n").unwrap();

    let decoded = baseline::load(&path).unwrap();
    assert!(decoded.warning.is_some());
    assert!(decoded.snapshot.is_zero());

    let (current, _, _) = capture(&mut FakeEngine { scale: 1 });
    let comparison = Comparison::new(&current, &decoded.snapshot);
    assert!(comparison.phases.iter().all(|d| d.percent == 0.));
}
