use anyhow::Result;
use colored::*;
use serde_json::json;
use std::env;

use mproject::{GitScheme, Project};

pub fn execute(json: bool) -> Result<()> {
    let cwd = env::current_dir()?;
    let project = Project::discover(&cwd)?;
    let owner_repo = project.owner_repo().ok();

    if json {
        output_json(&project, owner_repo.as_ref())?;
    } else {
        output_human(&project, owner_repo.as_ref())?;
    }
    Ok(())
}

fn output_json(project: &Project, owner_repo: Option<&mproject::OwnerRepo>) -> Result<()> {
    let mut info = json!({
        "name": project.name(),
        "top": &project.top,
        "python": {
            "executable": &project.python_exe,
            "version": &project.python_version,
        },
        "venv_dir": project.venv_dir(),
        "install_requires": &project.metadata.install_requires,
        "extras_require": &project.metadata.extras_require,
        "requirements": project.metadata.requirements(),
    });

    if let Some(requires) = &project.metadata.python_requires {
        info["python_requires"] = json!(requires);
    }
    if let Some(or) = owner_repo {
        info["owner"] = json!(&or.owner);
        info["repo"] = json!(&or.repo);
        info["urls"] = json!(scheme_urls(or));
    }

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn output_human(project: &Project, owner_repo: Option<&mproject::OwnerRepo>) -> Result<()> {
    println!("{}", project.name().bright_cyan().bold());
    println!("  top: {}", project.top.display());
    println!(
        "  python: {} ({})",
        project.python_version,
        project.python_exe.display()
    );
    if let Some(requires) = &project.metadata.python_requires {
        println!("  python_requires: {requires}");
    }

    match owner_repo {
        Some(or) => {
            println!("  origin: {}", or.to_string().bright_green());
            for (scheme, url) in scheme_urls(or) {
                println!("    {scheme}: {url}");
            }
        }
        None => println!("  origin: {}", "none".dimmed()),
    }

    let requirements = project.metadata.requirements();
    println!("  requirements ({}):", requirements.len());
    for dep in &requirements {
        println!("    {dep}");
    }

    Ok(())
}

fn scheme_urls(or: &mproject::OwnerRepo) -> Vec<(String, String)> {
    GitScheme::all()
        .iter()
        .filter_map(|scheme| {
            or.url(*scheme)
                .ok()
                .map(|url| (scheme.to_string(), url))
        })
        .collect()
}
