//! Base Python interpreter discovery

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Locate a base Python interpreter.
///
/// An explicit override must exist; otherwise `python3` then `python`
/// are searched on PATH.
pub fn find_python(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        if !path.exists() {
            bail!("Python interpreter not found: {}", path.display());
        }
        return Ok(path.to_path_buf());
    }

    for name in ["python3", "python"] {
        if let Ok(path) = which::which(name) {
            return Ok(path);
        }
    }
    bail!("python3 or python not found in PATH")
}

/// Report an interpreter's `major.minor` version, e.g. "3.12"
pub fn python_version(python: &Path) -> Result<String> {
    let output = Command::new(python)
        .arg("--version")
        .output()
        .with_context(|| format!("Failed to run {} --version", python.display()))?;

    if !output.status.success() {
        bail!(
            "{} --version failed: {}",
            python.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    // "Python 3.12.1" (some interpreters print to stderr)
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = if stdout.trim().is_empty() {
        stderr
    } else {
        stdout
    };
    major_minor(line.trim()).with_context(|| format!("Unparseable version: {}", line.trim()))
}

fn major_minor(version_line: &str) -> Option<String> {
    let number = version_line.split_whitespace().last()?;
    let mut parts = number.split('.');
    let major = parts.next()?;
    let minor = parts.next()?;
    Some(format!("{major}.{minor}"))
}
