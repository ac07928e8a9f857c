use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::manifest::{ManifestError, Requirements, load_requirements};

pub const DJANGO_MARKER: &str = "manage.py";
pub const STREAMLIT_MARKER: &str = "streamlit_app.py";
pub const APP_MARKER: &str = "app.py";
pub const MAIN_MARKER: &str = "main.py";

/// Marker files and manifest found in a project directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectLayout {
    pub manage_py: bool,
    pub streamlit_app_py: bool,
    pub app_py: bool,
    pub main_py: bool,
    #[serde(skip)]
    pub requirements: Option<Requirements>,
    pub has_requirements: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Framework {
    Django,
    Streamlit { entrypoint: String },
    FastApi { module: String },
    Flask,
    Generic { entrypoint: String },
    Unrecognized,
}

#[derive(Debug, Serialize)]
pub struct Detection {
    pub layout: ProjectLayout,
    pub framework: Framework,
}

impl ProjectLayout {
    pub fn probe(dir: &Path) -> Result<Self, ManifestError> {
        let requirements = load_requirements(dir)?;
        let layout = Self {
            manage_py: dir.join(DJANGO_MARKER).exists(),
            streamlit_app_py: dir.join(STREAMLIT_MARKER).exists(),
            app_py: dir.join(APP_MARKER).exists(),
            main_py: dir.join(MAIN_MARKER).exists(),
            has_requirements: requirements.is_some(),
            requirements,
        };
        debug!(dir = %dir.display(), ?layout, "probed project layout");
        Ok(layout)
    }

    fn requirements_mention(&self, token: &str) -> bool {
        self.requirements
            .as_ref()
            .is_some_and(|reqs| reqs.mentions(token))
    }

    pub fn is_django(&self) -> bool {
        self.manage_py
    }

    /// `app.py` only counts as Streamlit when the manifest names it.
    pub fn is_streamlit(&self) -> bool {
        self.streamlit_app_py || (self.app_py && self.requirements_mention("streamlit"))
    }

    pub fn is_fastapi(&self) -> bool {
        self.requirements_mention("fastapi")
    }

    pub fn is_flask(&self) -> bool {
        self.requirements_mention("flask")
    }
}

/// Classify a layout. Checks run in priority order and the first match wins.
pub fn classify(layout: &ProjectLayout) -> Framework {
    if layout.is_django() {
        Framework::Django
    } else if layout.is_streamlit() {
        let entrypoint = if layout.streamlit_app_py {
            STREAMLIT_MARKER
        } else {
            APP_MARKER
        };
        Framework::Streamlit {
            entrypoint: entrypoint.to_string(),
        }
    } else if layout.is_fastapi() {
        let module = if layout.main_py { "main:app" } else { "app:app" };
        Framework::FastApi {
            module: module.to_string(),
        }
    } else if layout.is_flask() {
        Framework::Flask
    } else if layout.main_py {
        Framework::Generic {
            entrypoint: MAIN_MARKER.to_string(),
        }
    } else if layout.app_py {
        Framework::Generic {
            entrypoint: APP_MARKER.to_string(),
        }
    } else {
        Framework::Unrecognized
    }
}

pub fn detect_project(dir: &Path) -> Result<Detection, ManifestError> {
    let layout = ProjectLayout::probe(dir)?;
    let framework = classify(&layout);
    debug!(?framework, "classified project");
    Ok(Detection { layout, framework })
}

#[cfg(test)]
mod tests {
    use super::{Framework, ProjectLayout, classify, detect_project};
    use crate::manifest::{REQUIREMENTS_FILE, Requirements};

    fn reqs(text: &str) -> Requirements {
        Requirements::from_text(text)
    }

    impl ProjectLayout {
        fn with_requirements(mut self, requirements: Requirements) -> Self {
            self.requirements = Some(requirements);
            self.has_requirements = true;
            self
        }
    }

    #[test]
    fn manage_py_wins_over_everything() {
        let layout = ProjectLayout {
            manage_py: true,
            streamlit_app_py: true,
            app_py: true,
            main_py: true,
            ..Default::default()
        }
        .with_requirements(reqs("fastapi\nflask\nstreamlit\n"));

        assert_eq!(classify(&layout), Framework::Django);
    }

    #[test]
    fn streamlit_via_app_py_needs_manifest_mention() {
        let without = ProjectLayout {
            app_py: true,
            ..Default::default()
        };
        assert!(!without.is_streamlit());

        let with = without.clone().with_requirements(reqs("streamlit==1.30"));
        assert_eq!(
            classify(&with),
            Framework::Streamlit {
                entrypoint: "app.py".to_string()
            }
        );
    }

    #[test]
    fn streamlit_app_py_is_preferred_entrypoint() {
        let layout = ProjectLayout {
            streamlit_app_py: true,
            app_py: true,
            ..Default::default()
        };
        assert_eq!(
            classify(&layout),
            Framework::Streamlit {
                entrypoint: "streamlit_app.py".to_string()
            }
        );
    }

    #[test]
    fn fastapi_outranks_flask_and_picks_module() {
        let layout = ProjectLayout {
            main_py: true,
            ..Default::default()
        }
        .with_requirements(reqs("Flask\nFastAPI\n"));
        assert_eq!(
            classify(&layout),
            Framework::FastApi {
                module: "main:app".to_string()
            }
        );

        let no_main = ProjectLayout::default().with_requirements(reqs("fastapi"));
        assert_eq!(
            classify(&no_main),
            Framework::FastApi {
                module: "app:app".to_string()
            }
        );
    }

    #[test]
    fn flask_matches_any_case() {
        let layout = ProjectLayout {
            app_py: true,
            ..Default::default()
        }
        .with_requirements(reqs("FLASK>=2\n"));
        assert_eq!(classify(&layout), Framework::Flask);
    }

    #[test]
    fn no_manifest_means_no_manifest_matches() {
        let layout = ProjectLayout {
            app_py: true,
            ..Default::default()
        };
        assert!(!layout.is_fastapi());
        assert!(!layout.is_flask());
        assert!(!layout.is_streamlit());
    }

    #[test]
    fn generic_prefers_main_over_app() {
        let both = ProjectLayout {
            main_py: true,
            app_py: true,
            ..Default::default()
        }
        .with_requirements(reqs("requests\n"));
        assert_eq!(
            classify(&both),
            Framework::Generic {
                entrypoint: "main.py".to_string()
            }
        );

        assert_eq!(classify(&ProjectLayout::default()), Framework::Unrecognized);
    }

    #[test]
    fn detect_project_reads_the_directory() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        std::fs::write(dir.path().join("manage.py"), "").unwrap();
        std::fs::write(dir.path().join(REQUIREMENTS_FILE), "Django==4.2\n").unwrap();

        let detection = detect_project(dir.path()).expect("detection should succeed");
        assert!(detection.layout.has_requirements);
        assert_eq!(detection.framework, Framework::Django);
    }
}
