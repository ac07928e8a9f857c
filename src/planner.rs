use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::config::{BIND_ADDRESS, DEFAULT_FLASK_APP, FLASK_APP_VAR, LaunchConfig};
use crate::env_detect::{DJANGO_MARKER, Detection, Framework};
use crate::manifest::{REQUIREMENTS_FILE, requirements_present};

#[derive(Debug, Serialize)]
pub struct LaunchPlan {
    pub framework: Framework,
    pub port: u16,
    /// Banner printed once the framework is known.
    pub banner: String,
    pub steps: Vec<PlannedStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
    pub description: String,
    pub command: String,
    /// Extra variables for the child on top of the inherited environment.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl PlannedStep {
    fn new(description: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            command: command.into(),
            env: BTreeMap::new(),
        }
    }

    fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// First word of the command, used to check the tool is on `PATH`.
    pub fn program(&self) -> Option<&str> {
        self.command.split_whitespace().next()
    }
}

impl LaunchPlan {
    pub fn is_runnable(&self) -> bool {
        self.framework != Framework::Unrecognized
    }
}

/// The dependency install step, if `dir` has a manifest. Only existence is
/// checked so pip runs, and reports, even when the file can't be read here.
pub fn plan_install(dir: &Path) -> Option<PlannedStep> {
    requirements_present(dir).then(install_step)
}

pub fn plan_launch(detection: &Detection, config: &LaunchConfig) -> LaunchPlan {
    LaunchPlan {
        framework: detection.framework.clone(),
        port: config.port,
        banner: banner(&detection.framework),
        steps: launch_steps(&detection.framework, config),
    }
}

fn install_step() -> PlannedStep {
    PlannedStep::new(
        "Install Python dependencies",
        format!("pip install --no-cache-dir -r {REQUIREMENTS_FILE}"),
    )
}

fn banner(framework: &Framework) -> String {
    match framework {
        Framework::Django => "Detected Django app".to_string(),
        Framework::Streamlit { .. } => "Detected Streamlit app".to_string(),
        Framework::FastApi { .. } => "Detected FastAPI app".to_string(),
        Framework::Flask => "Detected Flask app".to_string(),
        Framework::Generic { entrypoint } => {
            format!("Running generic Python app: {entrypoint}")
        }
        Framework::Unrecognized => "❌ No recognizable Python entrypoint found".to_string(),
    }
}

fn launch_steps(framework: &Framework, config: &LaunchConfig) -> Vec<PlannedStep> {
    let port = config.port;

    match framework {
        Framework::Django => vec![
            PlannedStep::new(
                "Apply database migrations",
                format!("python {DJANGO_MARKER} migrate"),
            ),
            PlannedStep::new(
                "Start Django development server",
                format!("python {DJANGO_MARKER} runserver {BIND_ADDRESS}:{port}"),
            ),
        ],
        Framework::Streamlit { entrypoint } => vec![PlannedStep::new(
            "Start Streamlit app",
            format!(
                "streamlit run {entrypoint} --server.port {port} --server.address {BIND_ADDRESS}"
            ),
        )],
        Framework::FastApi { module } => vec![PlannedStep::new(
            "Start FastAPI app with uvicorn",
            format!("uvicorn {module} --host {BIND_ADDRESS} --port {port}"),
        )],
        Framework::Flask => {
            let step = PlannedStep::new(
                "Start Flask app",
                format!("flask run --host={BIND_ADDRESS} --port={port}"),
            );
            // An ambient FLASK_APP reaches the child through inheritance.
            if config.flask_app.is_some() {
                vec![step]
            } else {
                vec![step.with_env(FLASK_APP_VAR, DEFAULT_FLASK_APP)]
            }
        }
        Framework::Generic { entrypoint } => vec![PlannedStep::new(
            format!("Run {entrypoint}"),
            format!("python {entrypoint}"),
        )],
        Framework::Unrecognized => Vec::new(),
    }
}
