use std::path::PathBuf;

use anyhow::{Context, Result};
use bmb_codegen::maintenance::{replace_version, strip_accents};
use clap::Parser;
use console::style;

/// Replace é, è, ê and à in the files of a directory.
#[derive(Parser)]
pub struct StripAccentsCommand {
    /// Directory whose files are rewritten (not recursive).
    pub dir: PathBuf,
}

impl StripAccentsCommand {
    pub fn execute(self) -> Result<()> {
        let changed = strip_accents(&self.dir)
            .with_context(|| format!("Cannot rewrite files in {}", self.dir.display()))?;
        report("Updated", &changed);
        Ok(())
    }
}

/// Replace a version string in the files of a directory.
#[derive(Parser)]
pub struct BumpVersionCommand {
    /// Version to replace.
    pub old: String,

    /// Replacement version.
    pub new: String,

    /// Directory whose files are rewritten (not recursive).
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// File names to leave untouched.
    #[arg(long)]
    pub skip: Vec<String>,
}

impl BumpVersionCommand {
    pub fn execute(self) -> Result<()> {
        if self.old.is_empty() {
            anyhow::bail!("The version to replace must not be empty");
        }
        let changed = replace_version(&self.dir, &self.old, &self.new, &self.skip)
            .with_context(|| format!("Cannot rewrite files in {}", self.dir.display()))?;
        report("Version updated", &changed);
        Ok(())
    }
}

fn report(label: &str, changed: &[PathBuf]) {
    if changed.is_empty() {
        println!("{} Nothing to change", style("ℹ").blue());
    }
    for path in changed {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        println!("{} {}: {}", style("✅").green(), label, name);
    }
}
