//! Project facade
//!
//! Ties the git checkout, its packaging metadata and the virtual
//! environment together. Everything is resolved once at construction
//! and read-only afterwards.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::git;
use crate::interpreter;
use crate::metadata::PyProject;
use crate::venv::{self, EnvBuilder, PipMode, VenvContext};

/// Directory name the environment is provisioned under, inside the
/// repository top-level.
pub const VENV_DIR_NAME: &str = "venv";

#[derive(Debug, Clone)]
pub struct Project {
    /// Repository top-level directory
    pub top: PathBuf,
    /// Packaging metadata read from the top-level
    pub metadata: PyProject,
    /// Base interpreter used for environment creation
    pub python_exe: PathBuf,
    /// `major.minor` of the base interpreter
    pub python_version: String,
}

impl Project {
    /// Discover the project containing `start`: resolve the git
    /// top-level, read packaging metadata and locate a base interpreter.
    pub fn discover(start: &Path) -> Result<Self> {
        Self::discover_with_python(start, None)
    }

    /// Like [`discover`](Self::discover) with an explicit interpreter.
    pub fn discover_with_python(start: &Path, python: Option<&Path>) -> Result<Self> {
        let top = git::top_level(start)
            .with_context(|| format!("No git repository found from {}", start.display()))?;
        let metadata = PyProject::load(&top)?;
        let python_exe = interpreter::find_python(python)?;
        let python_version = interpreter::python_version(&python_exe)?;

        Ok(Self {
            top,
            metadata,
            python_exe,
            python_version,
        })
    }

    /// Project name: pypi distribution name when declared, otherwise the
    /// top-level directory name.
    pub fn name(&self) -> String {
        self.metadata.name.clone().unwrap_or_else(|| {
            self.top
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    /// Owner/repo pair parsed from the origin remote
    pub fn owner_repo(&self) -> Result<git::OwnerRepo> {
        let url = git::origin_url(&self.top)?;
        git::OwnerRepo::parse(&url)
    }

    /// Environment directory: `{top}/venv`
    pub fn venv_dir(&self) -> PathBuf {
        self.top.join(VENV_DIR_NAME)
    }

    /// Provision the project environment (create or ensure)
    pub fn provision_venv(&self, clear: bool) -> Result<VenvContext> {
        EnvBuilder::new(self.venv_dir(), &self.python_exe)
            .clear(clear)
            .provision()
    }

    /// Install the combined requirement list into the environment
    pub fn install_requirements(&self, context: &VenvContext, upgrade: bool) -> Result<()> {
        let mode = if upgrade {
            PipMode::Upgrade
        } else {
            PipMode::Install
        };
        venv::pip_install(context, &self.metadata.requirements(), mode)
    }

    /// Install the combined requirement list with the base interpreter
    /// instead of the environment's own (site installs).
    pub fn install_requirements_site(&self, upgrade: bool) -> Result<()> {
        let mode = if upgrade {
            PipMode::Upgrade
        } else {
            PipMode::Install
        };
        venv::pip_install_with(&self.python_exe, &self.metadata.requirements(), mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn tools_available() -> bool {
        which::which("git").is_ok() && interpreter::find_python(None).is_ok()
    }

    fn init_repo(dir: &Path) {
        let status = Command::new("git")
            .args(["init", "-q"])
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_discover_reads_metadata() {
        if !tools_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path());
        std::fs::write(
            tmp.path().join("pyproject.toml"),
            "[project]\nname = \"demo\"\ndependencies = [\"requests\"]\n",
        )
        .unwrap();

        let project = Project::discover(tmp.path()).unwrap();
        assert_eq!(project.name(), "demo");
        assert!(project
            .metadata
            .install_requires
            .contains(&"requests".to_string()));
        assert!(project.python_version.contains('.'));
        assert!(project.venv_dir().ends_with("venv"));
    }

    #[test]
    fn test_discover_outside_repo_fails() {
        if which::which("git").is_err() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        assert!(Project::discover(tmp.path()).is_err());
    }

    #[test]
    fn test_name_falls_back_to_directory() {
        if !tools_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path());

        let project = Project::discover(tmp.path()).unwrap();
        let dir_name = tmp
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert_eq!(project.name(), dir_name);
    }

    #[test]
    fn test_owner_repo_from_origin() {
        if !tools_available() {
            return;
        }
        let tmp = TempDir::new().unwrap();
        init_repo(tmp.path());
        let status = Command::new("git")
            .args([
                "remote",
                "add",
                "origin",
                "git@github.com:octocat/hello-world.git",
            ])
            .current_dir(tmp.path())
            .status()
            .unwrap();
        assert!(status.success());

        let project = Project::discover(tmp.path()).unwrap();
        let or = project.owner_repo().unwrap();
        assert_eq!(or.owner, "octocat");
        assert_eq!(or.repo, "hello-world");
    }
}
