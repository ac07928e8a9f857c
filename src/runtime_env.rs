use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;

use which::which;

use crate::planner::PlannedStep;

/// Where and with which extra variables a child process runs. Everything
/// else is inherited from the launcher.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub workdir: PathBuf,
    pub env: BTreeMap<String, String>,
}

impl ExecutionContext {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            env: BTreeMap::new(),
        }
    }

    /// Context for a single step: the base context plus the step's own
    /// variables, the step winning on conflict.
    pub fn for_step(&self, step: &PlannedStep) -> Self {
        let mut env = self.env.clone();
        env.extend(step.env.clone());
        Self {
            workdir: self.workdir.clone(),
            env,
        }
    }

    pub fn apply(&self, command: &mut Command) {
        command.current_dir(&self.workdir).envs(&self.env);
    }
}

pub fn tool_available(program: &str) -> bool {
    which(program).is_ok()
}
