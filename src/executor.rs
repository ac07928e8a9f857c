use std::io::Write;
use std::process::{Command, ExitStatus};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::manifest::ManifestError;
use crate::planner::{LaunchPlan, PlannedStep};
use crate::runtime_env::{ExecutionContext, tool_available};

/// Exit code used when no entrypoint is recognized.
pub const NO_ENTRYPOINT_EXIT_CODE: i32 = 1;

#[derive(Debug)]
pub struct ExecutionResult {
    pub completed_steps: usize,
    pub total_steps: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("step {index} failed: `{command}` exited with code {code}")]
    CommandFailed {
        index: usize,
        command: String,
        code: i32,
    },
    #[error("step {index} could not be started: {source:#}")]
    Spawn {
        index: usize,
        #[source]
        source: anyhow::Error,
    },
}

impl ExecutionError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecutionError::CommandFailed { code, .. } => *code,
            ExecutionError::Spawn { .. } => 1,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("no recognizable Python entrypoint found")]
    NoEntrypoint,
    #[error(transparent)]
    Detect(#[from] ManifestError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl LaunchError {
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::NoEntrypoint => NO_ENTRYPOINT_EXIT_CODE,
            LaunchError::Detect(_) => 1,
            LaunchError::Execution(err) => err.exit_code(),
        }
    }
}

/// Spawns a command line and waits for it.
pub trait CommandRunner {
    /// Run `command` to completion and return its exit code.
    fn run(&mut self, command: &str, ctx: &ExecutionContext) -> anyhow::Result<i32>;
}

/// Runs commands through the platform shell with inherited stdio.
#[derive(Debug, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&mut self, command: &str, ctx: &ExecutionContext) -> anyhow::Result<i32> {
        let shell = if cfg!(windows) {
            ("cmd", vec!["/C"])
        } else {
            ("/bin/sh", vec!["-c"])
        };

        let mut child = Command::new(shell.0);
        child.args(&shell.1).arg(command);
        ctx.apply(&mut child);

        let status = child
            .status()
            .with_context(|| format!("running shell command: {command}"))?;
        Ok(exit_code(status))
    }
}

/// Exit code of a finished child. Signal deaths map to `128 + signal` the
/// way shells report them.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// Print a progress line and flush so it stays ordered with child output.
pub fn announce(message: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "{message}");
    let _ = stdout.flush();
}

/// Run the dependency install step. A failure aborts the whole launch.
pub fn install_dependencies<R: CommandRunner + ?Sized>(
    install: &PlannedStep,
    base: &ExecutionContext,
    runner: &mut R,
) -> Result<(), LaunchError> {
    announce("Installing Python dependencies...");
    execute_step(0, install, base, runner)?;
    Ok(())
}

/// Run the launch steps in order, stopping at the first failure.
pub fn execute_plan<R: CommandRunner + ?Sized>(
    plan: &LaunchPlan,
    base: &ExecutionContext,
    runner: &mut R,
) -> Result<ExecutionResult, LaunchError> {
    let total_steps = plan.steps.len();
    let mut completed_steps = 0;

    announce(&plan.banner);
    if !plan.is_runnable() {
        return Err(LaunchError::NoEntrypoint);
    }

    info!(framework = ?plan.framework, port = plan.port, "launching");
    for step in &plan.steps {
        execute_step(completed_steps, step, base, runner)?;
        completed_steps += 1;
    }

    Ok(ExecutionResult {
        completed_steps,
        total_steps,
    })
}

fn execute_step<R: CommandRunner + ?Sized>(
    index: usize,
    step: &PlannedStep,
    base: &ExecutionContext,
    runner: &mut R,
) -> Result<(), ExecutionError> {
    if let Some(program) = step.program().filter(|program| !tool_available(program)) {
        warn!(program, "not found on PATH; the shell will report the failure");
    }

    let ctx = base.for_step(step);
    debug!(index, description = %step.description, env = ?ctx.env, "starting step");
    announce(&format!("Running: {}", step.command));

    let code = match runner.run(&step.command, &ctx) {
        Ok(code) => code,
        Err(source) => {
            announce(&format!("❌ Command failed: {} ({source:#})", step.command));
            return Err(ExecutionError::Spawn { index, source });
        }
    };

    if code != 0 {
        announce(&format!(
            "❌ Command failed: {} (exit code {code})",
            step.command
        ));
        return Err(ExecutionError::CommandFailed {
            index,
            command: step.command.clone(),
            code,
        });
    }

    Ok(())
}
