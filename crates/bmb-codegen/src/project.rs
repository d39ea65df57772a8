//! Project generation and project inspection.

use std::fs;
use std::path::{Path, PathBuf};

use bmb_core::schema::bmdb::MODELS_FILE;
use bmb_core::{BmbError, Result};

use crate::copier::copy_templates;
use crate::store::{join_relative, TemplateStore};
use crate::synth::{synthesize, FileRole};

/// Parameters of one generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    /// Project name, also the directory name.
    pub name: String,
    /// Directory the project is generated into.
    pub root: PathBuf,
    /// Port written into `run.py` and `.env.example`.
    pub port: u16,
    pub host: String,
}

impl ProjectSpec {
    /// A project named `name` under `parent`, on `0.0.0.0:5000`.
    pub fn new(name: impl Into<String>, parent: &Path) -> Result<Self> {
        let name = name.into();
        validate_project_name(&name)?;
        let root = parent.join(&name);
        Ok(Self {
            name,
            root,
            port: 5000,
            host: "0.0.0.0".to_string(),
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

fn validate_project_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control);
    if bad {
        return Err(BmbError::Validation(format!(
            "'{}' is not a usable project name",
            name
        )));
    }
    Ok(())
}

/// Generate a project: copy the template store, then write synthesized files.
///
/// The destination must not exist. If anything fails after the directory was
/// created, it is removed again. Two concurrent runs against the same
/// destination are not coordinated.
pub fn generate_project(spec: &ProjectSpec, store: &TemplateStore) -> Result<Vec<PathBuf>> {
    if spec.root.exists() {
        return Err(BmbError::ProjectExists(spec.root.display().to_string()));
    }

    fs::create_dir_all(&spec.root)?;

    match write_project(spec, store) {
        Ok(files) => Ok(files),
        Err(e) => {
            if let Err(cleanup) = fs::remove_dir_all(&spec.root) {
                tracing::warn!(
                    path = %spec.root.display(),
                    error = %cleanup,
                    "Failed to remove partial project"
                );
            }
            Err(e)
        }
    }
}

fn write_project(spec: &ProjectSpec, store: &TemplateStore) -> Result<Vec<PathBuf>> {
    copy_templates(store, &spec.root)?;

    let mut files: Vec<PathBuf> = store
        .files()
        .iter()
        .map(|f| join_relative(&spec.root, &f.path))
        .collect();
    files.extend(synthesize(spec)?);

    tracing::info!(project = %spec.name, files = files.len(), "Project generated");
    Ok(files)
}

/// What the current directory looks like.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    /// `app.py` and `requirements.txt` are both present.
    pub is_project: bool,
    pub has_models: bool,
    pub has_routes: bool,
    pub route_count: usize,
}

impl ProjectInfo {
    pub fn detect(dir: &Path) -> Self {
        let has_routes = dir.join("routes").is_dir();
        Self {
            is_project: dir.join("app.py").is_file()
                && dir.join(FileRole::Requirements.relative_path()).is_file(),
            has_models: dir.join(MODELS_FILE).is_file(),
            has_routes,
            route_count: if has_routes {
                list_route_files(dir).map(|r| r.len()).unwrap_or(0)
            } else {
                0
            },
        }
    }
}

/// Route modules in `routes/`, excluding `__init__.py`, sorted by name.
pub fn list_route_files(project_root: &Path) -> Result<Vec<String>> {
    let routes = project_root.join("routes");
    if !routes.is_dir() {
        return Err(BmbError::NotAProject(format!(
            "no routes directory in {}",
            project_root.display()
        )));
    }

    let mut names: Vec<String> = fs::read_dir(&routes)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| name.ends_with(".py") && name != "__init__.py")
        .collect();
    names.sort();
    Ok(names)
}
