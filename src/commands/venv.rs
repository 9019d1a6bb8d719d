use anyhow::Result;
use colored::*;
use std::env;

use mproject::Project;

pub fn execute(clear: bool, upgrade: bool, site: bool) -> Result<()> {
    let cwd = env::current_dir()?;
    let project = Project::discover(&cwd)?;
    let requirements = project.metadata.requirements();

    if site {
        println!(
            "{}",
            format!(
                "Installing {} packages with {}...",
                requirements.len(),
                project.python_exe.display()
            )
            .bright_cyan()
        );
        project.install_requirements_site(upgrade)?;
        println!("{}", "Done".bright_green());
        return Ok(());
    }

    let venv_dir = project.venv_dir();
    let existed = venv_dir.exists();
    let context = project.provision_venv(clear)?;
    if existed && !clear {
        println!("Reusing environment at {}", venv_dir.display());
    } else {
        println!(
            "{}",
            format!("Created environment at {}", venv_dir.display()).bright_green()
        );
    }

    println!(
        "{}",
        format!("Installing {} packages...", requirements.len()).bright_cyan()
    );
    project.install_requirements(&context, upgrade)?;
    println!("{}", "Done".bright_green());

    Ok(())
}
