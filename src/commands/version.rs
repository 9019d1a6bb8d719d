use anyhow::Result;
use serde_json::json;
use std::process::Command;

const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn execute(json: bool) -> Result<()> {
    if json {
        output_json()?;
    } else {
        println!("mproject {CORE_VERSION}");
    }
    Ok(())
}

fn output_json() -> Result<()> {
    let mut version_info = json!({
        "mproject": CORE_VERSION,
    });

    if let Some(git) = get_git_version() {
        version_info["git"] = json!(git);
    }
    if let Ok(python) = mproject::interpreter::find_python(None) {
        if let Ok(version) = mproject::interpreter::python_version(&python) {
            version_info["python"] = json!(version);
        }
    }

    println!("{}", serde_json::to_string_pretty(&version_info)?);
    Ok(())
}

fn get_git_version() -> Option<String> {
    Command::new("git")
        .arg("--version")
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().replace("git version ", ""))
}
