//! Git plumbing for mproject
//!
//! Handles:
//! - Repository detection and top-level resolution
//! - Remote URL lookup
//! - Owner/repo derivation across URL schemes

mod operations;
mod url;

pub use operations::{is_git_repo, origin_url, remote_url, top_level};
pub use url::{api_url, GitScheme, OwnerRepo, DEFAULT_SCHEME, GITHUB_DOMAIN};
