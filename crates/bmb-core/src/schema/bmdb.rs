//! The `models.bmdb` declaration file.
//!
//! ```text
//! User:
//!   name: string(100)
//!   email: string(255) unique
//! ```
//!
//! The generator only appends to this file. Reading it back is lenient:
//! anything that is not a model header or a field line is skipped.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::field::{FieldDef, ModelFieldSpec};
use super::is_valid_identifier;
use super::registry::ModelDescriptor;
use crate::error::Result;

/// File name of the model declaration file at a project root.
pub const MODELS_FILE: &str = "models.bmdb";

/// What an append did to the declaration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// The file did not exist and was created.
    pub created_file: bool,
    /// A new `Model:` header was written.
    pub new_model: bool,
    /// Number of field lines written.
    pub fields_written: usize,
}

/// Append a model and its fields to a declaration file.
///
/// A header is written only when the model is not declared yet. Field lines
/// always go to the end of the file, so fields for a model that is not the
/// last block end up under whichever block is last.
pub fn append_model(path: &Path, model: &str, fields: &[ModelFieldSpec]) -> Result<AppendOutcome> {
    let created_file = !path.exists();

    let new_model = if created_file {
        fs::write(path, format!("{}:\n", model))?;
        true
    } else {
        let mut content = fs::read_to_string(path)?;
        if declares_model(&content, model) {
            false
        } else {
            content.push_str(&format!("\n{}:\n", model));
            fs::write(path, content)?;
            true
        }
    };

    let mut file = fs::OpenOptions::new().append(true).open(path)?;
    for field in fields {
        writeln!(file, "{}", field.to_bmdb_line())?;
    }

    Ok(AppendOutcome {
        created_file,
        new_model,
        fields_written: fields.len(),
    })
}

/// Check whether a header line for `model` exists.
pub fn declares_model(content: &str, model: &str) -> bool {
    content
        .lines()
        .filter_map(header_name)
        .any(|name| name == model)
}

/// Read model declarations back into descriptors.
pub fn parse_models(content: &str) -> Vec<ModelDescriptor> {
    let mut models: Vec<ModelDescriptor> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(name) = header_name(line) {
            match models.iter().position(|m| m.name == name) {
                // Re-declared headers continue the earlier block.
                Some(index) => {
                    let model = models.remove(index);
                    models.push(model);
                }
                None => models.push(ModelDescriptor::new(name)),
            }
            continue;
        }

        let indented = line.starts_with(' ') || line.starts_with('\t');
        match (indented, models.last_mut()) {
            (true, Some(model)) => match FieldDef::parse_declaration(trimmed) {
                Some(field) => model.push_field(field),
                None => tracing::debug!(line = trimmed, "Skipping unreadable field line"),
            },
            _ => tracing::debug!(line = trimmed, "Skipping line outside a model block"),
        }
    }

    models
}

/// Read and parse a declaration file. A missing file yields no models.
pub fn load_models(path: &Path) -> Result<Vec<ModelDescriptor>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    Ok(parse_models(&fs::read_to_string(path)?))
}

fn header_name(line: &str) -> Option<&str> {
    if line.starts_with(' ') || line.starts_with('\t') {
        return None;
    }
    let name = line.trim_end().strip_suffix(':')?;
    is_valid_identifier(name).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn specs(tokens: &[&str]) -> Vec<ModelFieldSpec> {
        ModelFieldSpec::parse_all(tokens).0
    }

    #[test]
    fn test_append_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MODELS_FILE);

        let outcome = append_model(&path, "Post", &specs(&["title:string", "body:text"])).unwrap();

        assert!(outcome.created_file);
        assert!(outcome.new_model);
        assert_eq!(outcome.fields_written, 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Post:\n  title: string\n  body: text\n"
        );
    }

    #[test]
    fn test_append_new_model_to_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MODELS_FILE);
        fs::write(&path, "User:\n  name: string\n").unwrap();

        let outcome = append_model(&path, "Tag", &specs(&["label:string"])).unwrap();

        assert!(!outcome.created_file);
        assert!(outcome.new_model);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "User:\n  name: string\n\nTag:\n  label: string\n"
        );
    }

    #[test]
    fn test_append_existing_model_adds_fields_at_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(MODELS_FILE);
        fs::write(&path, "User:\n  name: string\n").unwrap();

        let outcome = append_model(&path, "User", &specs(&["age:integer"])).unwrap();

        assert!(!outcome.new_model);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "User:\n  name: string\n  age: integer\n"
        );
    }

    #[test]
    fn test_header_match_is_exact() {
        assert!(!declares_model("SuperUser:\n", "User"));
        assert!(declares_model("# models\nUser:\n", "User"));
        assert!(!declares_model("  User:\n", "User"));
    }

    #[test]
    fn test_parse_models() {
        let content = "# Models\n\nUser:\n  name: string(100)\n  email: string(255) unique\n\nOrder:\n  status: string(20) default:'pending'\n  total_price: float\n";
        let models = parse_models(content);

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "User");
        assert_eq!(models[0].fields.len(), 2);
        assert!(models[0].field("email").unwrap().is_unique());
        assert_eq!(models[1].name, "Order");
        assert_eq!(
            models[1].field("status").unwrap().modifiers,
            vec!["default:'pending'".to_string()]
        );
    }

    #[test]
    fn test_parse_models_is_lenient() {
        let content = "  orphan: string\nnot a header\nUser:\n  ???\n  name: string\n";
        let models = parse_models(content);
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].fields.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let models = load_models(&dir.path().join(MODELS_FILE)).unwrap();
        assert!(models.is_empty());
    }
}
