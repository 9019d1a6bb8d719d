pub mod git;
pub mod interpreter;
pub mod metadata;
pub mod project;
pub mod venv;

// Re-export commonly used types
pub use git::{GitScheme, OwnerRepo};
pub use metadata::{FileConfig, PyProject};
pub use project::Project;
pub use venv::{EnvBuilder, PipMode, VenvContext, CORE_VENV_DEPS};
