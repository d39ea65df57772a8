//! `{{key}}` placeholder rendering for bundled and synthesized files.
//!
//! Placeholders without a value are left in place, so rendered output can be
//! checked for leftovers with [`unresolved`].

use std::collections::HashMap;

/// Render a template by replacing `{{key}}` placeholders with values.
///
/// The template is scanned once, left to right; substituted values are never
/// scanned again.
pub fn render(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let known = after
            .find("}}")
            .and_then(|close| vars.get(&after[..close]).map(|value| (close, value)));
        match known {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Names of placeholders still present in rendered output.
pub fn unresolved(rendered: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = rendered;
    while let Some(open) = rest.find("{{") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            break;
        };
        let name = &after[..close];
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            names.push(name);
        }
        rest = &after[close + 2..];
    }
    names
}

/// Build a map of template variables.
#[macro_export]
macro_rules! template_vars {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(map.insert($key, $value);)*
        map
    }};
}
