//! The seam between the benchmark harness and the program being measured

use std::{
    io::Write,
    time::{Duration, Instant},
};

use tracing as trc;

/// A program whose startup is being benchmarked
///
/// Each hook writes its output, including its own phase timing lines, to the
/// sink it is given. Hooks are always called in the order `init`, `run`,
/// `cleanup`.
pub trait Engine {
    fn init(&mut self, out: &mut dyn Write) -> eyre::Result<()>;
    fn run(&mut self, out: &mut dyn Write) -> eyre::Result<()>;
    fn cleanup(&mut self, out: &mut dyn Write) -> eyre::Result<()>;
}

/// Run an engine to completion, timing `init` and `run` together
///
/// A run banner goes to `out` first and a `Total time taken` line last, so
/// the total is captured alongside the engine's own timings. `cleanup` is
/// outside the timed window and runs even if an earlier hook failed.
#[trc::instrument(skip(engine, out))]
pub fn run_engine(engine: &mut dyn Engine, out: &mut dyn Write) -> eyre::Result<Duration> {
    write!(
        out,
        "\n=== Run at {} ===\n",
        chrono::Local::now().format("%a %b %e %H:%M:%S %Y")
    )?;

    let instant = Instant::now();
    let result = match engine.init(out) {
        Ok(()) => engine.run(out),
        Err(e) => Err(e),
    };
    let elapsed = instant.elapsed();

    let cleanup = engine.cleanup(out);
    result?;
    cleanup?;

    trc::debug!(?elapsed, "Engine finished");
    writeln!(
        out,
        "Total time taken for init and run: {} milliseconds.",
        elapsed.as_millis()
    )?;
    out.flush()?;

    Ok(elapsed)
}
