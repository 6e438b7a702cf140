//! On-disk layout.
//!
//! ```text
//! ~/.agora/
//!   config.json
//!   session.json
//!   logs/client.jsonl
//! ```
//!
//! `AGORA_HOME` replaces `~/.agora` wholesale.

use std::path::{Path, PathBuf};

use crate::{CoreError, CoreResult};

const HOME_VAR: &str = "AGORA_HOME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    /// `$AGORA_HOME` if set, otherwise `.agora` under the home directory.
    pub fn new() -> CoreResult<Self> {
        if let Some(root) = std::env::var_os(HOME_VAR).filter(|v| !v.is_empty()) {
            return Ok(Self::with_base_dir(PathBuf::from(root)));
        }
        dirs::home_dir()
            .map(|home| Self::with_base_dir(home.join(".agora")))
            .ok_or_else(|| CoreError::Path(format!("no home directory and {HOME_VAR} is unset")))
    }

    pub fn with_base_dir(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Holds the bearer token between launches.
    pub fn session_file(&self) -> PathBuf {
        self.root.join("session.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("client.jsonl")
    }

    /// Create the root and log directories. The root is owner-only on
    /// unix since it holds the session token.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(self.logs_dir())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.root, std::fs::Permissions::from_mode(0o700))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_hangs_off_the_root() {
        let paths = Paths::with_base_dir("/srv/agora");

        assert_eq!(paths.base_dir(), Path::new("/srv/agora"));
        assert_eq!(paths.config_file(), PathBuf::from("/srv/agora/config.json"));
        assert_eq!(paths.session_file(), PathBuf::from("/srv/agora/session.json"));
        assert_eq!(paths.log_file(), PathBuf::from("/srv/agora/logs/client.jsonl"));
    }

    #[test]
    fn ensure_dirs_creates_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("a/b"));

        paths.ensure_dirs().unwrap();
        paths.ensure_dirs().unwrap();

        assert!(paths.logs_dir().is_dir());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(paths.base_dir()).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }
}
