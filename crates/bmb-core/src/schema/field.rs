use serde::{Deserialize, Serialize};

/// A `name:type` token given on the command line.
///
/// The token is split at the first colon only and neither half is
/// interpreted further; the BMDB generator owns type validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFieldSpec {
    pub name: String,
    pub field_type: String,
}

impl ModelFieldSpec {
    /// Parse a single token. Returns `None` when it has no colon.
    pub fn parse(token: &str) -> Option<Self> {
        let (name, field_type) = token.split_once(':')?;
        Some(Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
        })
    }

    /// Parse a token list, returning the accepted specs and the rejected tokens.
    ///
    /// Order is preserved and duplicates are kept.
    pub fn parse_all<S: AsRef<str>>(tokens: &[S]) -> (Vec<Self>, Vec<String>) {
        let mut specs = Vec::new();
        let mut rejected = Vec::new();

        for token in tokens {
            match Self::parse(token.as_ref()) {
                Some(spec) => specs.push(spec),
                None => rejected.push(token.as_ref().to_string()),
            }
        }

        (specs, rejected)
    }

    /// The indented declaration line written to `models.bmdb`.
    pub fn to_bmdb_line(&self) -> String {
        format!("  {}: {}", self.name, self.field_type)
    }
}

/// A field declared on a model, as read back from `models.bmdb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name.
    pub name: String,

    /// Base type, e.g. `string(100)` or `integer`.
    pub field_type: String,

    /// Trailing modifiers, e.g. `unique` or `default:true`.
    pub modifiers: Vec<String>,
}

impl FieldDef {
    /// Create a field with no modifiers.
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            modifiers: Vec::new(),
        }
    }

    /// Parse a `name: type modifier...` declaration.
    pub fn parse_declaration(line: &str) -> Option<Self> {
        let (name, rest) = line.split_once(':')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut parts = rest.split_whitespace();
        let field_type = parts.next()?.to_string();

        Some(Self {
            name: name.to_string(),
            field_type,
            modifiers: parts.map(String::from).collect(),
        })
    }

    /// Check if this field carries the `unique` modifier.
    pub fn is_unique(&self) -> bool {
        self.modifiers.iter().any(|m| m == "unique")
    }
}
