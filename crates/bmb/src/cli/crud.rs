use std::path::Path;

use anyhow::Result;
use bmb_codegen::crud::{crud_route_path, registration_lines};
use bmb_codegen::{register_blueprint, write_crud_routes, ProjectInfo, Registration};
use bmb_core::schema::is_valid_identifier;
use clap::Parser;
use console::style;
use dialoguer::Confirm;

/// Generate CRUD routes for a model.
#[derive(Parser)]
pub struct GenerateCrudCommand {
    /// Model name (e.g. Product).
    pub model: String,

    /// Overwrite an existing route file without asking.
    #[arg(short, long)]
    pub force: bool,
}

/// What happened to the route file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudOutcome {
    Written(Registration),
    Declined,
}

impl GenerateCrudCommand {
    /// Execute the generate-crud command.
    pub fn execute(self) -> Result<()> {
        let root = std::env::current_dir()?;
        let outcome = generate_crud(&root, &self.model, self.force, confirm_overwrite)?;

        let file = crud_route_path(&self.model);
        match outcome {
            CrudOutcome::Declined => {
                println!("{} Aborted, {} left unchanged", style("ℹ").blue(), file);
            }
            CrudOutcome::Written(registration) => {
                println!(
                    "{} Generated CRUD routes for {}: {}",
                    style("✅").green(),
                    style(&self.model).cyan(),
                    file
                );
                match registration {
                    Registration::Added => {
                        println!("  Registered blueprint in routes/__init__.py")
                    }
                    Registration::AlreadyRegistered => {
                        println!("  Blueprint already registered in routes/__init__.py")
                    }
                    Registration::MarkerMissing => {
                        let (import, register) = registration_lines(&self.model);
                        println!();
                        println!(
                            "{} Register the blueprint in routes/__init__.py (inside register_routes):",
                            style("⚠").yellow()
                        );
                        println!("    {}", style(import).dim());
                        println!("    {}", style(register).dim());
                    }
                }
            }
        }
        Ok(())
    }
}

fn confirm_overwrite(file: &str) -> Result<bool> {
    let answer = Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", file))
        .default(false)
        .interact()?;
    Ok(answer)
}

/// Write and register the CRUD routes for `model` under `root`.
///
/// `confirm` is asked before an existing file is overwritten, unless `force`.
pub fn generate_crud<F>(root: &Path, model: &str, force: bool, confirm: F) -> Result<CrudOutcome>
where
    F: FnOnce(&str) -> Result<bool>,
{
    if !is_valid_identifier(model) {
        anyhow::bail!("Invalid model name '{}': use letters, digits and underscores", model);
    }

    let info = ProjectInfo::detect(root);
    if !info.is_project || !info.has_routes {
        anyhow::bail!("Not in a BMB project. Run `bmb init <name>` or `bmb new <name>` first.");
    }

    let file = crud_route_path(model);
    if root.join(&file).exists() && !force && !confirm(&file)? {
        return Ok(CrudOutcome::Declined);
    }

    write_crud_routes(root, model)?;
    let registration = register_blueprint(root, model)?;
    Ok(CrudOutcome::Written(registration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmb_codegen::{generate_project, Layout, ProjectSpec, TemplateStore};
    use std::fs;
    use tempfile::tempdir;

    fn project(dir: &Path) -> std::path::PathBuf {
        let spec = ProjectSpec::new("myapp", dir).unwrap();
        generate_project(&spec, &TemplateStore::bundled(Layout::Core)).unwrap();
        spec.root
    }

    #[test]
    fn test_generate_and_register() {
        let dir = tempdir().unwrap();
        let root = project(dir.path());

        let outcome = generate_crud(&root, "Product", false, |_| panic!("no prompt expected")).unwrap();

        assert_eq!(outcome, CrudOutcome::Written(Registration::Added));
        assert!(root.join("routes/product.py").exists());
        let init = fs::read_to_string(root.join("routes/__init__.py")).unwrap();
        assert!(init.contains("    from routes.product import product_bp\n    app.register_blueprint(product_bp)\n"));
    }

    #[test]
    fn test_existing_file_declined() {
        let dir = tempdir().unwrap();
        let root = project(dir.path());
        fs::write(root.join("routes/product.py"), "# mine\n").unwrap();

        let outcome = generate_crud(&root, "Product", false, |_| Ok(false)).unwrap();

        assert_eq!(outcome, CrudOutcome::Declined);
        assert_eq!(fs::read_to_string(root.join("routes/product.py")).unwrap(), "# mine\n");
    }

    #[test]
    fn test_existing_file_forced() {
        let dir = tempdir().unwrap();
        let root = project(dir.path());
        fs::write(root.join("routes/product.py"), "# mine\n").unwrap();

        let outcome = generate_crud(&root, "Product", true, |_| panic!("no prompt expected")).unwrap();

        assert!(matches!(outcome, CrudOutcome::Written(_)));
        assert!(fs::read_to_string(root.join("routes/product.py"))
            .unwrap()
            .contains("product_bp"));
    }

    #[test]
    fn test_outside_project() {
        let dir = tempdir().unwrap();
        assert!(generate_crud(dir.path(), "Product", true, |_| Ok(true)).is_err());
    }

    #[test]
    fn test_invalid_model() {
        let dir = tempdir().unwrap();
        let root = project(dir.path());
        assert!(generate_crud(&root, "bad-name", true, |_| Ok(true)).is_err());
    }
}
