//! Python virtual environment provisioning
//!
//! Wraps `python -m venv` and the environment's pip. Provisioning is
//! idempotent: an existing, non-empty environment directory is never
//! recreated, only its directory skeleton is ensured.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Baseline packages installed into every environment alongside the
/// project's own requirements.
pub const CORE_VENV_DEPS: &[&str] = &[
    "build",
    "darling",
    "icecream",
    "ipython",
    "pip",
    "pip-tools",
    "pytest",
    "pytest-asyncio",
    "rich",
    "setuptools",
    "setuptools_scm",
    "tox",
    "wheel",
];

/// pip invocation tail for quiet installs
pub const PIP_INSTALL_OPTIONS: &[&str] =
    &["-m", "pip", "install", "--quiet", "--no-warn-script-location"];

/// Whether pip should upgrade already-installed packages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipMode {
    Install,
    Upgrade,
}

/// Resolved paths inside a provisioned environment
#[derive(Debug, Clone, Serialize)]
pub struct VenvContext {
    pub env_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub python_exe: PathBuf,
    pub cfg_path: PathBuf,
}

impl VenvContext {
    /// Compute the context paths for an environment directory. Pure path
    /// arithmetic, no filesystem access.
    pub fn resolve(env_dir: &Path) -> Self {
        let bin_dir = if cfg!(windows) {
            env_dir.join("Scripts")
        } else {
            env_dir.join("bin")
        };
        let python_exe = if cfg!(windows) {
            bin_dir.join("python.exe")
        } else {
            bin_dir.join("python")
        };
        Self {
            env_dir: env_dir.to_path_buf(),
            bin_dir,
            python_exe,
            cfg_path: env_dir.join("pyvenv.cfg"),
        }
    }

    /// An environment counts as provisioned once its interpreter exists
    pub fn is_provisioned(&self) -> bool {
        self.python_exe.exists()
    }
}

/// Builder for an isolated Python environment.
///
/// Defaults mirror the interactive tool: pip available, prompt "."
/// and the system site-packages hidden.
#[derive(Debug, Clone)]
pub struct EnvBuilder {
    /// Target directory the environment lives in
    pub env_dir: PathBuf,
    /// Base interpreter used to create the environment
    pub python: PathBuf,
    /// Delete existing contents before creation
    pub clear: bool,
    /// Ensure pip is installed in the environment
    pub with_pip: bool,
    /// Expose the system site-packages to the environment
    pub system_site_packages: bool,
    /// Upgrade the seeded base modules (pip, setuptools) to the latest
    /// releases during creation
    pub upgrade_deps: bool,
    /// Terminal prefix for the activated environment
    pub prompt: Option<String>,
}

impl EnvBuilder {
    pub fn new(env_dir: impl Into<PathBuf>, python: impl Into<PathBuf>) -> Self {
        Self {
            env_dir: env_dir.into(),
            python: python.into(),
            clear: false,
            with_pip: true,
            system_site_packages: false,
            upgrade_deps: false,
            prompt: Some(".".to_string()),
        }
    }

    pub fn clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    pub fn with_pip(mut self, with_pip: bool) -> Self {
        self.with_pip = with_pip;
        self
    }

    pub fn system_site_packages(mut self, enabled: bool) -> Self {
        self.system_site_packages = enabled;
        self
    }

    pub fn upgrade_deps(mut self, enabled: bool) -> Self {
        self.upgrade_deps = enabled;
        self
    }

    pub fn prompt(mut self, prompt: Option<String>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Create the environment if it does not exist yet, otherwise only
    /// ensure its directory skeleton. Returns the resolved context.
    pub fn provision(&self) -> Result<VenvContext> {
        if !self.clear && self.env_dir.exists() && !dir_is_empty(&self.env_dir)? {
            return self.ensure_directories();
        }
        self.create()
    }

    /// Unconditionally create the environment via `python -m venv`
    pub fn create(&self) -> Result<VenvContext> {
        let mut cmd = Command::new(&self.python);
        cmd.arg("-m").arg("venv");
        if self.clear {
            cmd.arg("--clear");
        }
        if !self.with_pip {
            cmd.arg("--without-pip");
        }
        if self.system_site_packages {
            cmd.arg("--system-site-packages");
        }
        if self.upgrade_deps {
            cmd.arg("--upgrade-deps");
        }
        if let Some(prompt) = &self.prompt {
            cmd.arg("--prompt").arg(prompt);
        }
        cmd.arg(&self.env_dir);

        let output = cmd
            .output()
            .with_context(|| format!("Failed to run {} -m venv", self.python.display()))?;
        if !output.status.success() {
            anyhow::bail!(
                "venv creation failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        self.ensure_directories()
    }

    /// Recreate the standard subdirectories and resolve the context.
    /// Never touches the interpreter or installed packages.
    pub fn ensure_directories(&self) -> Result<VenvContext> {
        let context = VenvContext::resolve(&self.env_dir);
        let lib_dir = if cfg!(windows) {
            self.env_dir.join("Lib")
        } else {
            self.env_dir.join("lib")
        };
        for dir in [&context.env_dir, &context.bin_dir, &lib_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(context)
    }
}

/// Install packages into the environment with its own pip.
///
/// pip and wheel are upgraded first so installs run against a current
/// toolchain, then the requested packages are installed quietly, with
/// `--upgrade` added in [`PipMode::Upgrade`].
pub fn pip_install(context: &VenvContext, deps: &[String], mode: PipMode) -> Result<()> {
    run_pip(
        &context.python_exe,
        PipMode::Upgrade,
        &["pip".to_string(), "wheel".to_string()],
    )?;
    if deps.is_empty() {
        return Ok(());
    }
    run_pip(&context.python_exe, mode, deps)
}

/// Install packages using an arbitrary interpreter (e.g. the base site
/// interpreter instead of the environment's own).
pub fn pip_install_with(python: &Path, deps: &[String], mode: PipMode) -> Result<()> {
    run_pip(
        python,
        PipMode::Upgrade,
        &["pip".to_string(), "wheel".to_string()],
    )?;
    if deps.is_empty() {
        return Ok(());
    }
    run_pip(python, mode, deps)
}

fn run_pip(python: &Path, mode: PipMode, deps: &[String]) -> Result<()> {
    let mut cmd = Command::new(python);
    cmd.args(PIP_INSTALL_OPTIONS);
    if mode == PipMode::Upgrade {
        cmd.arg("--upgrade");
    }
    cmd.args(deps);

    let output = cmd
        .output()
        .with_context(|| format!("Failed to run {} -m pip install", python.display()))?;
    if !output.status.success() {
        anyhow::bail!(
            "pip install failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

fn dir_is_empty(dir: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;
    Ok(entries.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_paths() {
        let context = VenvContext::resolve(Path::new("/proj/venv"));
        assert_eq!(context.env_dir, Path::new("/proj/venv"));
        assert_eq!(context.cfg_path, Path::new("/proj/venv/pyvenv.cfg"));
        if cfg!(windows) {
            assert_eq!(context.bin_dir, Path::new("/proj/venv/Scripts"));
        } else {
            assert_eq!(context.bin_dir, Path::new("/proj/venv/bin"));
            assert_eq!(context.python_exe, Path::new("/proj/venv/bin/python"));
        }
    }

    #[test]
    fn test_builder_defaults() {
        let builder = EnvBuilder::new("/proj/venv", "python3");
        assert!(builder.with_pip);
        assert!(!builder.clear);
        assert!(!builder.system_site_packages);
        assert!(!builder.upgrade_deps);
        assert_eq!(builder.prompt.as_deref(), Some("."));
    }

    #[cfg(unix)]
    #[test]
    fn test_create_forwards_upgrade_deps() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let log = tmp.path().join("args.log");
        let fake = tmp.path().join("python");
        std::fs::write(
            &fake,
            format!("#!/bin/sh\necho \"$@\" > {}\n", log.display()),
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let env_dir = tmp.path().join("venv");
        EnvBuilder::new(&env_dir, &fake)
            .upgrade_deps(true)
            .create()
            .unwrap();

        let args = std::fs::read_to_string(&log).unwrap();
        assert!(args.contains("-m venv"));
        assert!(args.contains("--upgrade-deps"));

        // not emitted when left off
        EnvBuilder::new(&env_dir, &fake).create().unwrap();
        let args = std::fs::read_to_string(&log).unwrap();
        assert!(!args.contains("--upgrade-deps"));
    }

    #[test]
    fn test_ensure_directories_creates_skeleton() {
        let tmp = TempDir::new().unwrap();
        let env_dir = tmp.path().join("venv");

        let builder = EnvBuilder::new(&env_dir, "python3");
        let context = builder.ensure_directories().unwrap();

        assert!(context.env_dir.is_dir());
        assert!(context.bin_dir.is_dir());
        assert!(env_dir.join("lib").is_dir());
        assert!(!context.is_provisioned());
    }

    #[test]
    fn test_provision_existing_env_does_not_recreate() {
        let tmp = TempDir::new().unwrap();
        let env_dir = tmp.path().join("venv");
        std::fs::create_dir_all(env_dir.join("bin")).unwrap();
        std::fs::write(env_dir.join("pyvenv.cfg"), "home = /usr/bin\n").unwrap();

        // the interpreter path is bogus on purpose: provision must not
        // spawn it when the directory already has contents
        let builder = EnvBuilder::new(&env_dir, "/nonexistent/python");
        let context = builder.provision().unwrap();

        assert!(context.cfg_path.exists());
        assert_eq!(
            std::fs::read_to_string(context.cfg_path).unwrap(),
            "home = /usr/bin\n"
        );
    }

    #[test]
    fn test_provision_missing_env_requires_interpreter() {
        let tmp = TempDir::new().unwrap();
        let env_dir = tmp.path().join("venv");

        let builder = EnvBuilder::new(&env_dir, "/nonexistent/python");
        assert!(builder.provision().is_err());
    }

    #[test]
    fn test_core_venv_deps_sorted_unique() {
        let mut deps = CORE_VENV_DEPS.to_vec();
        deps.sort();
        deps.dedup();
        assert_eq!(deps, CORE_VENV_DEPS);
    }
}
