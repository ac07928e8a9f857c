use std::ffi::OsString;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const BIND_ADDRESS: &str = "0.0.0.0";
pub const FLASK_APP_VAR: &str = "FLASK_APP";
pub const DEFAULT_FLASK_APP: &str = "app.py";

/// Settings for one run. Built once at startup and passed down explicitly so
/// detection and planning never read the process environment.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub workdir: PathBuf,
    pub port: u16,
    /// `FLASK_APP` as found in the ambient environment. Kept as raw bytes so
    /// a non-UTF-8 value still counts as set.
    pub flask_app: Option<OsString>,
}

impl LaunchConfig {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            port: DEFAULT_PORT,
            flask_app: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_flask_app(mut self, flask_app: Option<OsString>) -> Self {
        self.flask_app = flask_app;
        self
    }

    /// Capture the ambient `FLASK_APP` so a default is only applied when the
    /// user hasn't set one.
    pub fn with_ambient_flask_app(self) -> Self {
        self.with_flask_app_from(|key| std::env::var_os(key))
    }

    fn with_flask_app_from(self, lookup: impl FnOnce(&str) -> Option<OsString>) -> Self {
        let ambient = lookup(FLASK_APP_VAR);
        self.with_flask_app(ambient)
    }
}
