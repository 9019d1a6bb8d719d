pub mod info;
pub mod venv;
pub mod version;
