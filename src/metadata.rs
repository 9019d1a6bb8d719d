//! Python packaging metadata
//!
//! Reads `pyproject.toml` (PEP 621 `[project]` table) and `setup.cfg`
//! from a project top-level and flattens them into one record of
//! dependency lists plus the declared python version requirement.
//! Missing files are not errors; their fields simply stay empty.
//!
//! setup.cfg is INI-shaped, which no crate in our stack parses, so a
//! small reader folds it into the same `toml::Value` tree pyproject.toml
//! parses into. Only the subset setuptools defines for metadata and
//! options is interpreted.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::venv::CORE_VENV_DEPS;

/// A configuration file path paired with its parsed contents
#[derive(Debug, Clone)]
pub struct FileConfig {
    pub file: PathBuf,
    pub config: toml::Value,
}

impl FileConfig {
    /// Load and parse a TOML file
    pub fn load_toml(file: &Path) -> Result<Self> {
        let content = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let config: toml::Value = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", file.display()))?;
        Ok(Self {
            file: file.to_path_buf(),
            config,
        })
    }

    /// Load an INI-shaped file (setup.cfg) into a TOML value tree:
    /// sections become tables, every option value stays a string.
    pub fn load_ini(file: &Path) -> Result<Self> {
        let content = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        Ok(Self {
            file: file.to_path_buf(),
            config: parse_ini(&content),
        })
    }
}

/// Flat record of a project's packaging metadata
#[derive(Debug, Clone, Default, Serialize)]
pub struct PyProject {
    /// Distribution name from pyproject.toml or setup.cfg metadata
    pub name: Option<String>,
    /// Declared runtime dependencies, in declaration order
    pub install_requires: Vec<String>,
    /// Optional dependencies flattened across extras groups, deduped and sorted
    pub extras_require: Vec<String>,
    /// Declared python packages (setup.cfg options.packages)
    pub packages: Vec<String>,
    /// Raw python version specifier set, e.g. ">=3.9"
    pub python_requires: Option<String>,
    #[serde(skip)]
    pub pyproject_toml: Option<FileConfig>,
    #[serde(skip)]
    pub setup_cfg: Option<FileConfig>,
}

impl PyProject {
    /// Read packaging metadata from a project top-level directory.
    ///
    /// pyproject.toml's `[project]` table wins where both files declare a
    /// field; setup.cfg fills the gaps.
    pub fn load(top: &Path) -> Result<Self> {
        let mut meta = Self::default();

        let pyproject = top.join("pyproject.toml");
        if pyproject.exists() {
            meta.pyproject_toml = Some(FileConfig::load_toml(&pyproject)?);
        }

        let setup_cfg = top.join("setup.cfg");
        if setup_cfg.exists() {
            meta.setup_cfg = Some(FileConfig::load_ini(&setup_cfg)?);
        }

        meta.derive_fields();
        Ok(meta)
    }

    fn derive_fields(&mut self) {
        if let Some(project) = self
            .pyproject_toml
            .as_ref()
            .and_then(|fc| fc.config.get("project"))
            .cloned()
        {
            self.name = project
                .get("name")
                .and_then(|v| v.as_str())
                .map(String::from);
            self.python_requires = project
                .get("requires-python")
                .and_then(|v| v.as_str())
                .map(String::from);
            if let Some(deps) = project.get("dependencies").and_then(|v| v.as_array()) {
                self.install_requires = deps
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(String::from)
                    .collect();
            }
            if let Some(extras) = project
                .get("optional-dependencies")
                .and_then(|v| v.as_table())
            {
                let mut flat: Vec<String> = extras
                    .values()
                    .filter_map(|v| v.as_array())
                    .flatten()
                    .filter_map(|v| v.as_str())
                    .map(String::from)
                    .collect();
                flat.sort();
                flat.dedup();
                self.extras_require = flat;
            }
        }

        if let Some(cfg) = self.setup_cfg.as_ref().map(|fc| fc.config.clone()) {
            let metadata = cfg.get("metadata");
            let options = cfg.get("options");

            if self.name.is_none() {
                self.name = metadata
                    .and_then(|m| m.get("name"))
                    .and_then(|v| v.as_str())
                    .map(|s| s.trim().to_string());
            }
            if self.python_requires.is_none() {
                self.python_requires = options
                    .and_then(|o| o.get("python_requires"))
                    .and_then(|v| v.as_str())
                    .map(|s| s.trim().to_string());
            }
            if self.install_requires.is_empty() {
                if let Some(value) = options
                    .and_then(|o| o.get("install_requires"))
                    .and_then(|v| v.as_str())
                {
                    self.install_requires = split_ini_list(value);
                }
            }
            if self.extras_require.is_empty() {
                if let Some(extras) = cfg
                    .get("options.extras_require")
                    .and_then(|v| v.as_table())
                {
                    let mut flat: Vec<String> = extras
                        .values()
                        .filter_map(|v| v.as_str())
                        .flat_map(split_ini_list)
                        .collect();
                    flat.sort();
                    flat.dedup();
                    self.extras_require = flat;
                }
            }
            if self.packages.is_empty() {
                if let Some(value) = options
                    .and_then(|o| o.get("packages"))
                    .and_then(|v| v.as_str())
                {
                    self.packages = split_ini_list(value)
                        .into_iter()
                        .filter(|p| p != "find:")
                        .collect();
                }
            }
        }
    }

    /// All requirements: install, extras and the core venv deps, deduped
    /// by bare distribution name (case-insensitive, as pip treats names)
    /// and sorted. The first declaration of a name keeps its version
    /// specifier.
    pub fn requirements(&self) -> Vec<String> {
        let mut by_name: BTreeMap<String, String> = BTreeMap::new();
        let declared = self
            .install_requires
            .iter()
            .chain(self.extras_require.iter())
            .map(String::as_str)
            .chain(CORE_VENV_DEPS.iter().copied());
        for dep in declared {
            by_name
                .entry(bare_name(dep).to_lowercase())
                .or_insert_with(|| dep.to_string());
        }
        let mut requirements: Vec<String> = by_name.into_values().collect();
        requirements.sort();
        requirements
    }

    /// Minimum python version from the requires specifier, e.g. ">=3.9,<4"
    /// yields "3.9". Returns None when nothing is declared.
    pub fn min_python_version(&self) -> Option<String> {
        let spec = self.python_requires.as_deref()?;
        let first = spec.split(',').next()?.trim();
        let version = first.trim_start_matches(['>', '<', '=', '!', '~', ' ']);
        if version.is_empty() {
            None
        } else {
            Some(version.to_string())
        }
    }
}

/// Bare distribution name of a requirement string: everything up to the
/// first specifier, extras bracket or environment marker.
pub fn bare_name(dep: &str) -> &str {
    let end = dep
        .find(['<', '>', '=', '!', '~', '[', ';', ' '])
        .unwrap_or(dep.len());
    dep[..end].trim()
}

/// Split a setup.cfg list value: entries separated by newlines or commas.
fn split_ini_list(value: &str) -> Vec<String> {
    value
        .split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Fold INI text into a TOML table-of-tables with string values.
///
/// Continuation lines (indented, as setuptools writes multi-line option
/// values) are appended to the previous option with a newline.
fn parse_ini(content: &str) -> toml::Value {
    let mut root = toml::Table::new();
    let mut section: Option<String> = None;
    let mut last_key: Option<String> = None;

    for raw in content.lines() {
        let line = raw.trim_end();
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            let name = trimmed[1..trimmed.len() - 1].trim().to_string();
            root.entry(name.clone())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            section = Some(name);
            last_key = None;
            continue;
        }

        let Some(section_name) = section.as_ref() else {
            continue;
        };
        let Some(table) = root.get_mut(section_name).and_then(|v| v.as_table_mut()) else {
            continue;
        };

        let indented = line.len() != trimmed.len();
        let assignment = trimmed
            .split_once('=')
            .or_else(|| trimmed.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()));

        match assignment {
            Some((key, value)) if !indented => {
                table.insert(key.clone(), toml::Value::String(value));
                last_key = Some(key);
            }
            _ => {
                // continuation of the previous option
                if let Some(key) = last_key.as_ref() {
                    if let Some(toml::Value::String(existing)) = table.get_mut(key) {
                        if !existing.is_empty() {
                            existing.push('\n');
                        }
                        existing.push_str(trimmed);
                    }
                }
            }
        }
    }

    toml::Value::Table(root)
}
