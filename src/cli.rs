use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::{DEFAULT_PORT, LaunchConfig};
use crate::env_detect::detect_project;
use crate::executor::{LaunchError, ShellRunner, announce};
use crate::launch;
use crate::logging::init_logging;
use crate::planner::{plan_install, plan_launch};

#[derive(Debug, Parser)]
#[command(
    name = "pylaunch",
    version,
    about = "Detect a Python web app, install its requirements and start it"
)]
pub struct Cli {
    /// Project directory to inspect and run in
    #[arg(long, global = true, default_value = ".")]
    dir: PathBuf,
    /// Port the application server binds to
    #[arg(long, global = true, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Detect the project framework and print it as JSON
    Detect {
        /// Emit compact JSON instead of pretty output
        #[arg(long)]
        raw: bool,
    },
    /// Build the launch plan without executing it
    Plan {
        /// Emit compact JSON instead of pretty output
        #[arg(long)]
        raw: bool,
    },
    /// Install requirements and start the app (the default)
    Launch,
}

impl Cli {
    fn config(&self) -> LaunchConfig {
        LaunchConfig::new(&self.dir)
            .with_port(self.port)
            .with_ambient_flask_app()
    }
}

pub fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match dispatch(cli) {
        Ok(()) => 0,
        Err(err) => match err.downcast_ref::<LaunchError>() {
            Some(LaunchError::Detect(detect)) => {
                announce(&format!("❌ {detect}"));
                1
            }
            // The executor prints a ❌ line for every failed or unstartable step.
            Some(other) => other.exit_code(),
            None => {
                announce(&format!("❌ {err:#}"));
                1
            }
        },
    }
}

fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config();

    match cli.command.unwrap_or(Commands::Launch) {
        Commands::Detect { raw } => {
            let detection = detect_project(&config.workdir)
                .with_context(|| format!("inspecting {}", config.workdir.display()))?;
            print_json(&detection, raw)?;
        }
        Commands::Plan { raw } => {
            let detection = detect_project(&config.workdir)
                .with_context(|| format!("inspecting {}", config.workdir.display()))?;
            let plan = serde_json::json!({
                "install": plan_install(&config.workdir),
                "launch": plan_launch(&detection, &config),
            });
            print_json(&plan, raw)?;
        }
        Commands::Launch => {
            launch(&config, &mut ShellRunner)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T, raw: bool) -> anyhow::Result<()> {
    if raw {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Commands};

    #[test]
    fn no_arguments_means_launch_in_current_dir() {
        let cli = Cli::try_parse_from(["pylaunch"]).expect("bare invocation parses");
        assert!(cli.command.is_none());
        assert_eq!(cli.dir, std::path::PathBuf::from("."));
    }

    #[test]
    fn parses_plan_with_port_and_dir() {
        let cli = Cli::try_parse_from(["pylaunch", "plan", "--raw", "--port", "8080", "--dir", "/srv"])
            .expect("plan invocation parses");
        assert_eq!(cli.port, 8080);
        assert!(matches!(cli.command, Some(Commands::Plan { raw: true })));
        assert_eq!(cli.config().port, 8080);
    }

    #[test]
    fn rejects_out_of_range_port() {
        assert!(Cli::try_parse_from(["pylaunch", "--port", "70000"]).is_err());
    }
}
