use std::fs;
use std::path::Path;

use bmb_core::Result;

use crate::imports::rewrite_relative_imports;
use crate::store::{join_relative, TemplateStore};

/// Copy every file of a template store under `dest`.
///
/// Python sources have their relative imports rewritten on the way; all
/// other files are copied byte for byte. Returns the number of files written.
pub fn copy_templates(store: &TemplateStore, dest: &Path) -> Result<usize> {
    for file in store.files() {
        let target = join_relative(dest, &file.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        match std::str::from_utf8(&file.content) {
            Ok(text) if file.is_python() => {
                fs::write(&target, rewrite_relative_imports(text))?;
            }
            _ => fs::write(&target, &file.content)?,
        }
        tracing::debug!(file = %file.path, "Copied template file");
    }

    Ok(store.len())
}
