use color_eyre::{Section, SectionExt};
use eyre::WrapErr;
use tracing as trc;

use std::io::{self, Write};
use std::process::{Child, Command, Stdio};

use startup_benchmark::engine::Engine;

/// An [`Engine`] backed by a child process
///
/// The child's stdout is streamed into the run's sink; its stderr goes
/// straight to ours and is not captured.
pub struct ChildEngine {
    command: Command,
    child: Option<Child>,
}

impl ChildEngine {
    pub fn new(program: &str, args: &[String]) -> Self {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        ChildEngine {
            command,
            child: None,
        }
    }

    fn describe(&self) -> String {
        format!("{:?}", self.command)
    }
}

impl Engine for ChildEngine {
    #[trc::instrument(level = "debug", skip(self, _out))]
    fn init(&mut self, _out: &mut dyn Write) -> eyre::Result<()> {
        let child = self
            .command
            .spawn()
            .wrap_err("Could not start benchmarked program")
            .with_section(|| self.describe().header("Command:"))?;
        self.child = Some(child);

        Ok(())
    }

    #[trc::instrument(level = "debug", skip(self, out))]
    fn run(&mut self, out: &mut dyn Write) -> eyre::Result<()> {
        let child = match self.child.as_mut() {
            Some(child) => child,
            None => eyre::bail!("Benchmarked program was not started"),
        };

        if let Some(mut stdout) = child.stdout.take() {
            io::copy(&mut stdout, out).wrap_err("Could not capture program output")?;
        }

        let status = child.wait().wrap_err("Could not wait for program")?;
        self.child = None;

        if !status.success() {
            let command = self.describe();
            return Err(eyre::format_err!(
                "cmd exited with non-zero status code: {}",
                status
                    .code()
                    .map(|x| x.to_string())
                    .unwrap_or_else(|| "none".to_string())
            ))
            .with_section(move || command.header("Command:"));
        }

        Ok(())
    }

    #[trc::instrument(level = "debug", skip(self, _out))]
    fn cleanup(&mut self, _out: &mut dyn Write) -> eyre::Result<()> {
        if let Some(mut child) = self.child.take() {
            trc::warn!("Stopping benchmarked program that is still running");
            if let Ok(None) = child.try_wait() {
                child.kill().wrap_err("Could not stop program")?;
            }
            child.wait().wrap_err("Could not wait for program")?;
        }

        Ok(())
    }
}

#[cfg(all(test, unix))]
mod test {
    use super::*;
    use startup_benchmark::{engine::run_engine, extract::LineExtractor};

    fn shell(script: &str) -> ChildEngine {
        ChildEngine::new("sh", &["-c".to_string(), script.to_string()])
    }

    #[test]
    fn captures_child_output() {
        let mut engine = shell(
            "echo 'init_commands() took 12 microseconds'; \
             echo 'init_pipelines() took 3 milliseconds'",
        );
        let mut extractor = LineExtractor::new(Vec::new());
        run_engine(&mut engine, &mut extractor).unwrap();

        let (metrics, out) = extractor.finish().unwrap();
        assert_eq!(metrics.init_commands, 12);
        assert_eq!(metrics.init_pipelines, 3000);
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("init_commands() took 12 microseconds\n"));
    }

    #[test]
    fn failing_child_is_an_error() {
        let mut engine = shell("echo partial; exit 3");
        let mut out = Vec::new();
        let err = run_engine(&mut engine, &mut out).unwrap_err();
        assert!(err.to_string().contains("3"));
        assert!(engine.child.is_none());
    }

    #[test]
    fn missing_program_is_an_error() {
        let mut engine = ChildEngine::new("./definitely-not-a-real-program", &[]);
        assert!(run_engine(&mut engine, &mut Vec::new()).is_err());
    }
}
