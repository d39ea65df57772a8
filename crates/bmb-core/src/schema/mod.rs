pub mod bmdb;
mod field;
mod registry;

pub use field::{FieldDef, ModelFieldSpec};
pub use registry::{ModelDescriptor, ModelRegistry};

/// Check that a model name is usable as a class name and a file stem.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
