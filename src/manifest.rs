use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the dependency manifest looked up in the working directory.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Contents of a `requirements.txt`, read once per run.
#[derive(Debug, Clone)]
pub struct Requirements {
    lowered: String,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("reading manifest at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Requirements {
    pub fn from_text(text: &str) -> Self {
        Self {
            lowered: text.to_lowercase(),
        }
    }

    /// Case-insensitive substring match against the whole manifest text.
    ///
    /// This is deliberately loose: `flask-cors` or a comment mentioning
    /// flask both count.
    pub fn mentions(&self, token: &str) -> bool {
        self.lowered.contains(&token.to_lowercase())
    }
}

/// Whether `dir` has a manifest entry, readable or not.
pub fn requirements_present(dir: &Path) -> bool {
    dir.join(REQUIREMENTS_FILE).exists()
}

/// Load `requirements.txt` from `dir`. A missing file is `Ok(None)`.
pub fn load_requirements(dir: &Path) -> Result<Option<Requirements>, ManifestError> {
    let path = dir.join(REQUIREMENTS_FILE);
    let bytes = match fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(ManifestError::Read { path, source }),
    };

    let text = String::from_utf8_lossy(&bytes);
    Ok(Some(Requirements::from_text(&text)))
}
