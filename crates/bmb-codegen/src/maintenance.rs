//! In-place text rewrites over the files of one directory.
//!
//! Only regular files directly inside the directory are touched. Files that
//! are not valid UTF-8 are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use bmb_core::Result;

const ACCENTS: &[(char, char)] = &[('é', 'e'), ('è', 'e'), ('ê', 'e'), ('à', 'a')];

/// Replace accented vowels with their plain form.
pub fn strip_accent_chars(text: &str) -> String {
    text.chars()
        .map(|c| {
            ACCENTS
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect()
}

/// Strip accents from every file in `dir`. Returns the files that changed.
pub fn strip_accents(dir: &Path) -> Result<Vec<PathBuf>> {
    rewrite_files(dir, &[], strip_accent_chars)
}

/// Replace `old` with `new` in every file in `dir` except those named in `skip`.
/// Returns the files that changed.
pub fn replace_version(dir: &Path, old: &str, new: &str, skip: &[String]) -> Result<Vec<PathBuf>> {
    rewrite_files(dir, skip, |text| text.replace(old, new))
}

fn rewrite_files<F>(dir: &Path, skip: &[String], rewrite: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&str) -> String,
{
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    entries.sort();

    let mut changed = Vec::new();
    for path in entries {
        let skipped = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| skip.iter().any(|s| s == name));
        if skipped {
            continue;
        }

        let Ok(content) = fs::read_to_string(&path) else {
            tracing::debug!(file = %path.display(), "Skipping non-UTF-8 file");
            continue;
        };

        let updated = rewrite(&content);
        if updated != content {
            fs::write(&path, updated)?;
            changed.push(path);
        }
    }

    Ok(changed)
}
