use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use bmb_core::schema::bmdb::{append_model, AppendOutcome, MODELS_FILE};
use bmb_core::schema::is_valid_identifier;
use bmb_core::{BmbError, ModelFieldSpec};
use clap::Parser;
use console::style;

/// Declare a model in models.bmdb and run the BMDB generator.
#[derive(Parser)]
pub struct CreateCommand {
    /// Model name (e.g. Product).
    pub model: String,

    /// Fields as name:type tokens.
    #[arg(long, num_args = 1..)]
    pub fields: Vec<String>,

    /// Only edit models.bmdb; do not run `bmdb generate` and `bmdb migrate`.
    #[arg(long)]
    pub skip_generate: bool,

    /// BMDB executable.
    #[arg(long, default_value = "bmdb")]
    pub bmdb: String,
}

impl CreateCommand {
    /// Execute the create command.
    pub fn execute(self) -> Result<()> {
        let root = std::env::current_dir()?;
        let outcome = declare_model(&root, &self.model, &self.fields)?;

        println!(
            "{} Model {} written to {} ({} fields)",
            style("✅").green(),
            style(&self.model).cyan(),
            MODELS_FILE,
            outcome.fields_written
        );

        if self.skip_generate {
            return Ok(());
        }

        for step in ["generate", "migrate"] {
            println!("{} bmdb {}", style("→").dim(), step);
            run_tool(&root, &self.bmdb, step)?;
        }
        Ok(())
    }
}

/// Parse field tokens and append the model to `models.bmdb` under `root`.
pub fn declare_model<S: AsRef<str>>(root: &Path, model: &str, tokens: &[S]) -> Result<AppendOutcome> {
    if !is_valid_identifier(model) {
        anyhow::bail!("Invalid model name '{}': use letters, digits and underscores", model);
    }

    let (fields, rejected) = ModelFieldSpec::parse_all(tokens);
    for token in &rejected {
        tracing::warn!(token = %token, "Skipping field without a type");
        println!(
            "{} Skipping '{}': expected name:type",
            style("⚠").yellow(),
            token
        );
    }
    if fields.is_empty() {
        println!("{} No fields given for {}", style("⚠").yellow(), model);
    }

    let path = root.join(MODELS_FILE);
    let outcome = append_model(&path, model, &fields)
        .with_context(|| format!("Failed to update {}", path.display()))?;

    if !outcome.new_model && !fields.is_empty() {
        println!(
            "{} {} is already declared; fields were appended at the end of {}",
            style("⚠").yellow(),
            model,
            MODELS_FILE
        );
    }
    Ok(outcome)
}

/// Run `<program> <step>` in `root`, failing on a nonzero exit.
fn run_tool(root: &Path, program: &str, step: &str) -> Result<()> {
    let status = Command::new(program)
        .arg(step)
        .current_dir(root)
        .status()
        .map_err(|e| BmbError::ExternalTool(format!("cannot start {} {}: {}", program, step, e)))?;

    if !status.success() {
        return Err(BmbError::ExternalTool(format!("{} {} exited with {}", program, step, status)).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_declare_new_model() {
        let dir = tempdir().unwrap();
        let outcome = declare_model(dir.path(), "Post", &["title:string", "body:text"]).unwrap();

        assert!(outcome.created_file);
        assert_eq!(
            fs::read_to_string(dir.path().join(MODELS_FILE)).unwrap(),
            "Post:\n  title: string\n  body: text\n"
        );
    }

    #[test]
    fn test_malformed_tokens_are_skipped() {
        let dir = tempdir().unwrap();
        let outcome = declare_model(dir.path(), "Post", &["title:string", "oops"]).unwrap();
        assert_eq!(outcome.fields_written, 1);
    }

    #[test]
    fn test_invalid_model_name() {
        let dir = tempdir().unwrap();
        assert!(declare_model(dir.path(), "no spaces", &["a:b"]).is_err());
        assert!(!dir.path().join(MODELS_FILE).exists());
    }

    #[test]
    fn test_missing_tool_is_an_error() {
        let dir = tempdir().unwrap();
        let err = run_tool(dir.path(), "bmdb-definitely-not-installed", "generate").unwrap_err();
        assert!(err.to_string().contains("External tool failed"));
    }
}
