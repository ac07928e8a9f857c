pub mod cli;
pub mod config;
pub mod env_detect;
pub mod executor;
pub mod logging;
pub mod manifest;
pub mod planner;
pub mod runtime_env;

use crate::config::LaunchConfig;
use crate::env_detect::detect_project;
use crate::executor::{
    CommandRunner, ExecutionResult, LaunchError, execute_plan, install_dependencies,
};
use crate::planner::{plan_install, plan_launch};
use crate::runtime_env::ExecutionContext;

/// Run the command line interface and return an exit code.
pub fn run_cli() -> i32 {
    cli::run()
}

/// Install the requirements of the project in `config.workdir`, then detect
/// and run it with `runner`.
///
/// The manifest is only read for detection after pip has run, so an
/// unreadable `requirements.txt` surfaces as pip's own failure first.
pub fn launch<R: CommandRunner + ?Sized>(
    config: &LaunchConfig,
    runner: &mut R,
) -> Result<ExecutionResult, LaunchError> {
    let ctx = ExecutionContext::new(&config.workdir);
    if let Some(install) = plan_install(&config.workdir) {
        install_dependencies(&install, &ctx, runner)?;
    }

    let detection = detect_project(&config.workdir)?;
    let plan = plan_launch(&detection, config);
    execute_plan(&plan, &ctx, runner)
}
