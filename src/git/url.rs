//! Owner/repo naming and hosted URL derivation
//!
//! A repository is identified by its two trailing path segments
//! (organization-or-user, repository name). From that pair a URL can be
//! derived for any of the supported schemes, and the pair can be recovered
//! from a remote URL in any of the forms git prints.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Hosting domain for all derived URLs
pub const GITHUB_DOMAIN: &str = "github.com";

/// Scheme used when none is asked for explicitly
pub const DEFAULT_SCHEME: GitScheme = GitScheme::Https;

/// REST API base for the hosting domain
pub fn api_url() -> String {
    format!("https://api.{GITHUB_DOMAIN}/")
}

/// URL schemes a repository address can be rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitScheme {
    GitFile,
    GitHttps,
    GitSsh,
    Https,
    Ssh,
}

impl GitScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            GitScheme::GitFile => "git+file",
            GitScheme::GitHttps => "git+https",
            GitScheme::GitSsh => "git+ssh",
            GitScheme::Https => "https",
            GitScheme::Ssh => "ssh",
        }
    }

    /// URL prefix the owner/repo path is joined onto (no separator needed)
    pub fn prefix(&self) -> String {
        match self {
            GitScheme::GitFile => "git+file:///".to_string(),
            GitScheme::GitHttps => format!("git+https://{GITHUB_DOMAIN}/"),
            GitScheme::GitSsh => format!("git+ssh://git@{GITHUB_DOMAIN}/"),
            GitScheme::Https => format!("https://{GITHUB_DOMAIN}/"),
            GitScheme::Ssh => format!("git@{GITHUB_DOMAIN}:"),
        }
    }

    pub fn all() -> &'static [GitScheme] {
        &[
            GitScheme::GitFile,
            GitScheme::GitHttps,
            GitScheme::GitSsh,
            GitScheme::Https,
            GitScheme::Ssh,
        ]
    }
}

impl fmt::Display for GitScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GitScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "git+file" => Ok(GitScheme::GitFile),
            "git+https" => Ok(GitScheme::GitHttps),
            "git+ssh" => Ok(GitScheme::GitSsh),
            "https" => Ok(GitScheme::Https),
            "ssh" => Ok(GitScheme::Ssh),
            other => bail!("Unknown git URL scheme: {other}"),
        }
    }
}

/// The two path segments identifying a hosted repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerRepo {
    pub owner: String,
    pub repo: String,
}

impl OwnerRepo {
    /// Build a pair, rejecting empty components
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let repo = repo.into();
        if owner.is_empty() || repo.is_empty() {
            bail!("Invalid owner/repo: {owner}/{repo}");
        }
        Ok(Self { owner, repo })
    }

    /// Derive the pair from a filesystem path: parent directory name as
    /// owner, final component as repo.
    pub fn from_path(path: &Path) -> Result<Self> {
        let repo = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.trim_end_matches(".git").to_string())
            .with_context(|| format!("Path has no final component: {}", path.display()))?;
        let owner = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(String::from)
            .with_context(|| format!("Path has no parent component: {}", path.display()))?;
        Self::new(owner, repo)
    }

    /// Parse a remote URL into owner and repo.
    ///
    /// Accepts every form `url()` can produce plus the bare `owner/repo`
    /// shorthand. The two trailing path segments are taken, so deeper
    /// hosting paths (e.g. GitLab subgroups) resolve to their final pair.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            bail!("Empty repository URL");
        }

        // scp-like form: git@github.com:owner/repo.git
        let path = if let Some((userhost, path)) = url.split_once(':') {
            if userhost.contains('@') && !path.starts_with("//") {
                path
            } else if let Some(rest) = url.split_once("://").map(|(_, r)| r) {
                // scheme form: drop the authority (git+file has an empty one)
                match rest.split_once('/') {
                    Some((_authority, path)) => path,
                    None => rest,
                }
            } else {
                url
            }
        } else {
            url
        };

        let cleaned = path.trim_matches('/').trim_end_matches(".git");
        let segments: Vec<&str> = cleaned.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() < 2 {
            bail!("Invalid repository URL (need owner/repo): {url}");
        }
        Self::new(
            segments[segments.len() - 2].to_string(),
            segments[segments.len() - 1].to_string(),
        )
    }

    /// Derive the repository URL for a scheme.
    ///
    /// For `git+file` the repo component is treated as a local absolute
    /// path and the owner is not part of the URL; a relative path is a
    /// hard error.
    pub fn url(&self, scheme: GitScheme) -> Result<String> {
        match scheme {
            GitScheme::GitFile => {
                if !self.repo.starts_with('/') {
                    bail!(
                        "Repo must be an absolute path for '{}': {}",
                        scheme,
                        self.repo
                    );
                }
                let path = self.repo.trim_end_matches(".git").trim_end_matches('/');
                Ok(format!("git+file://{path}.git"))
            }
            _ => Ok(format!("{}{}/{}.git", scheme.prefix(), self.owner, self.repo)),
        }
    }

    /// URL in the default (https) scheme
    pub fn https_url(&self) -> String {
        self.url(DEFAULT_SCHEME).unwrap_or_default()
    }
}

impl fmt::Display for OwnerRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
