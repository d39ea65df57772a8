use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use bmb_codegen::{generate_project, Layout, ProjectSpec, TemplateStore};
use bmb_core::BmbConfig;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Create a project from the core template.
#[derive(Parser)]
pub struct InitCommand {
    /// Project name.
    pub name: String,

    /// Template directory to copy instead of the bundled one.
    #[arg(long)]
    pub template: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command.
    pub fn execute(self) -> Result<()> {
        let spec = project_spec(&self.name, None)?;
        create_project(&spec, Layout::Core, self.template.as_deref())?;
        print_next_steps(&spec);
        Ok(())
    }
}

/// Create a project with web assets.
#[derive(Parser)]
pub struct NewCommand {
    /// Project name.
    pub name: String,

    /// Use the core template only (no HTML templates or static assets).
    #[arg(long)]
    pub minimal: bool,

    /// Output directory (defaults to project name).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Template directory to copy instead of the bundled one.
    #[arg(long)]
    pub template: Option<PathBuf>,
}

impl NewCommand {
    /// Execute the new project command.
    pub fn execute(self) -> Result<()> {
        let layout = if self.minimal { Layout::Core } else { Layout::Full };
        let spec = project_spec(&self.name, self.output.as_deref())?;
        create_project(&spec, layout, self.template.as_deref())?;
        print_next_steps(&spec);
        Ok(())
    }
}

/// Resolve the project spec from the name, output override and environment.
fn project_spec(name: &str, output: Option<&str>) -> Result<ProjectSpec> {
    let config = BmbConfig::from_env().context("Invalid environment configuration")?;
    let cwd = std::env::current_dir()?;

    let mut spec = ProjectSpec::new(name, &cwd)?
        .with_port(config.server.port)
        .with_host(config.server.host);
    if let Some(output) = output {
        spec.root = cwd.join(output);
    }
    Ok(spec)
}

/// Generate the project files, showing a spinner while it runs.
pub fn create_project(spec: &ProjectSpec, layout: Layout, template: Option<&Path>) -> Result<()> {
    let store = match template {
        Some(dir) => TemplateStore::from_dir(dir)
            .with_context(|| format!("Cannot read template directory {}", dir.display()))?,
        None => TemplateStore::bundled(layout),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Creating {}...", spec.name));

    let result = generate_project(spec, &store);
    pb.finish_and_clear();

    let files = result?;
    println!(
        "{} Created BMB project: {} ({} files)",
        style("✅").green(),
        style(&spec.name).cyan(),
        files.len()
    );
    Ok(())
}

fn print_next_steps(spec: &ProjectSpec) {
    println!();
    println!("Next steps:");
    println!("  {} {}", style("cd").dim(), spec.root.display());
    println!("  {}", style("pip install -r requirements.txt").dim());
    println!("  {}", style("cp .env.example .env").dim());
    println!(
        "  {} to start on port {}",
        style("python run.py").dim(),
        spec.port
    );
    println!();
}
