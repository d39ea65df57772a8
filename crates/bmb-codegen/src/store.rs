//! Template sources for project generation.
//!
//! The bundled store is compiled into the binary, so a generated project
//! never depends on where the tool was installed. A directory on disk can
//! stand in for it with `--template`.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use bmb_core::{BmbError, Result};
use walkdir::WalkDir;

/// Which part of the bundled tree a project gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Application files only.
    Core,
    /// Application files plus HTML templates, static assets and `uploads/`.
    Full,
}

/// One file in a template tree.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    pub content: Cow<'static, [u8]>,
}

impl TemplateFile {
    fn bundled(path: &'static str, content: &'static str) -> Self {
        Self {
            path: path.to_string(),
            content: Cow::Borrowed(content.as_bytes()),
        }
    }

    /// Whether this is a Python source whose imports need rewriting.
    pub fn is_python(&self) -> bool {
        self.path.ends_with(".py")
    }
}

const CORE: &[(&str, &str)] = &[
    ("app.py", include_str!("../templates/core/app.py")),
    ("config.py", include_str!("../templates/core/config.py")),
    ("utils.py", include_str!("../templates/core/utils.py")),
    (
        "models_loader.py",
        include_str!("../templates/core/models_loader.py"),
    ),
    ("models.bmdb", include_str!("../templates/core/models.bmdb")),
    (
        "routes/__init__.py",
        include_str!("../templates/core/routes/__init__.py"),
    ),
    (
        "routes/health.py",
        include_str!("../templates/core/routes/health.py"),
    ),
    (
        "routes/auth.py",
        include_str!("../templates/core/routes/auth.py"),
    ),
    (
        "routes/users.py",
        include_str!("../templates/core/routes/users.py"),
    ),
    (
        "routes/stats.py",
        include_str!("../templates/core/routes/stats.py"),
    ),
];

const WEB: &[(&str, &str)] = &[
    (
        "templates/index.html",
        include_str!("../templates/web/templates/index.html"),
    ),
    (
        "templates/dashboard.html",
        include_str!("../templates/web/templates/dashboard.html"),
    ),
    (
        "static/css/style.css",
        include_str!("../templates/web/static/css/style.css"),
    ),
    (
        "static/js/app.js",
        include_str!("../templates/web/static/js/app.js"),
    ),
    ("uploads/.gitkeep", ""),
];

/// An ordered set of template files.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    files: Vec<TemplateFile>,
}

impl TemplateStore {
    /// The store compiled into the binary.
    pub fn bundled(layout: Layout) -> Self {
        let mut files: Vec<TemplateFile> = CORE
            .iter()
            .map(|(path, content)| TemplateFile::bundled(path, content))
            .collect();

        if layout == Layout::Full {
            files.extend(
                WEB.iter()
                    .map(|(path, content)| TemplateFile::bundled(path, content)),
            );
        }

        Self { files }
    }

    /// Read a template tree from disk, skipping bytecode caches.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            return Err(BmbError::Template(format!(
                "template directory not found: {}",
                dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_cache_artifact(e.path()))
        {
            let entry = entry.map_err(|e| BmbError::Template(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(dir)
                .map_err(|e| BmbError::Template(e.to_string()))?;
            let content = std::fs::read(entry.path())?;
            tracing::debug!(file = %relative.display(), "Loaded template file");

            files.push(TemplateFile {
                path: to_slash_path(relative),
                content: Cow::Owned(content),
            });
        }

        if files.is_empty() {
            return Err(BmbError::Template(format!(
                "template directory is empty: {}",
                dir.display()
            )));
        }

        Ok(Self { files })
    }

    pub fn files(&self) -> &[TemplateFile] {
        &self.files
    }

    /// Look up a file by its relative path.
    pub fn get(&self, path: &str) -> Option<&TemplateFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// `__pycache__` directories and compiled Python files.
pub fn is_cache_artifact(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some("__pycache__") => true,
        Some(name) => name.ends_with(".pyc") || name.ends_with(".pyo"),
        None => false,
    }
}

fn to_slash_path(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

/// Join a `/`-separated relative path onto a root.
pub fn join_relative(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}
