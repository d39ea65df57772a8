//! CRUD route generation for a single model.

use std::fs;
use std::path::{Path, PathBuf};

use bmb_core::schema::is_valid_identifier;
use bmb_core::{BmbError, Result};

use crate::imports::rewrite_relative_imports;
use crate::template::render;
use crate::template_vars;

const CRUD_TEMPLATE: &str = include_str!("../templates/crud_routes.py.tmpl");

/// Line in `routes/__init__.py` above which generated blueprints are registered.
pub const REGISTER_MARKER: &str = "# bmb:register-crud";

/// Relative path of the route file for a model.
pub fn crud_route_path(model: &str) -> String {
    format!("routes/{}.py", model.to_lowercase())
}

/// Render the route module for a model.
pub fn render_crud_routes(model: &str) -> Result<String> {
    if !is_valid_identifier(model) {
        return Err(BmbError::Validation(format!(
            "'{}' is not a valid model name",
            model
        )));
    }

    let lower = model.to_lowercase();
    let vars = template_vars!("model" => model, "model_lower" => lower.as_str());
    Ok(rewrite_relative_imports(&render(CRUD_TEMPLATE, &vars)))
}

/// Write `routes/<model>.py` under a project root.
///
/// Overwrites an existing file; callers decide whether that is allowed.
pub fn write_crud_routes(project_root: &Path, model: &str) -> Result<PathBuf> {
    let source = render_crud_routes(model)?;
    let path = project_root.join(crud_route_path(model));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, source)?;
    tracing::info!(model, path = %path.display(), "Generated CRUD routes");
    Ok(path)
}

/// Outcome of registering a blueprint in `routes/__init__.py`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    AlreadyRegistered,
    /// The file or its marker line is missing.
    MarkerMissing,
}

/// The two lines a project needs to register a model's blueprint.
pub fn registration_lines(model: &str) -> (String, String) {
    let lower = model.to_lowercase();
    (
        format!("from routes.{lower} import {lower}_bp"),
        format!("app.register_blueprint({lower}_bp)"),
    )
}

/// Register a model's blueprint inside `register_routes`, above the marker.
pub fn register_blueprint(project_root: &Path, model: &str) -> Result<Registration> {
    let init = project_root.join("routes").join("__init__.py");
    if !init.is_file() {
        return Ok(Registration::MarkerMissing);
    }

    let content = fs::read_to_string(&init)?;
    let (import, register) = registration_lines(model);
    if content.lines().any(|line| line.trim() == register) {
        return Ok(Registration::AlreadyRegistered);
    }

    let mut out = String::with_capacity(content.len() + 96);
    let mut inserted = false;
    for line in content.split_inclusive('\n') {
        if !inserted && line.trim() == REGISTER_MARKER {
            let indent = &line[..line.len() - line.trim_start().len()];
            out.push_str(&format!("{indent}{import}\n{indent}{register}\n"));
            inserted = true;
        }
        out.push_str(line);
    }

    if !inserted {
        return Ok(Registration::MarkerMissing);
    }

    fs::write(&init, out)?;
    tracing::info!(model, "Registered blueprint");
    Ok(Registration::Added)
}
