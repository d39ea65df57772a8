use std::collections::BTreeMap;
use std::sync::Arc;

use super::field::FieldDef;

/// Everything the runtime needs to know about one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Model name as declared (e.g. `User`).
    pub name: String,

    /// URL segment under `/api/` (the lowercased name).
    pub endpoint: String,

    /// Declared fields, in declaration order.
    pub fields: Vec<FieldDef>,
}

impl ModelDescriptor {
    /// Create a descriptor with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let endpoint = name.to_lowercase();
        Self {
            name,
            endpoint,
            fields: Vec::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.push_field(field);
        self
    }

    /// Add a field, replacing an earlier one with the same name.
    pub fn push_field(&mut self, field: FieldDef) {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }

    /// Check whether the model declares a field.
    pub fn has_field(&self, name: &str) -> bool {
        name == "id" || self.fields.iter().any(|f| f.name == name)
    }

    /// Get a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields marked `unique`.
    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| f.is_unique())
    }

    /// Mount path for this model's CRUD routes.
    pub fn base_path(&self) -> String {
        format!("/api/{}", self.endpoint)
    }
}

/// Registry of models known to the runtime.
///
/// Populated once at startup; route handlers receive the resolved
/// `Arc<ModelDescriptor>` rather than looking models up by name per request.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<ModelDescriptor>>,
}

impl ModelRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, replacing any earlier model with the same name.
    pub fn register(&mut self, model: ModelDescriptor) -> Arc<ModelDescriptor> {
        let model = Arc::new(model);
        self.models.insert(model.name.clone(), Arc::clone(&model));
        model
    }

    /// Get a model by name.
    pub fn get(&self, name: &str) -> Option<Arc<ModelDescriptor>> {
        self.models.get(name).cloned()
    }

    /// Check whether a model is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// All registered models, ordered by name.
    pub fn all(&self) -> impl Iterator<Item = &Arc<ModelDescriptor>> {
        self.models.values()
    }

    /// Names of all registered models, ordered.
    pub fn names(&self) -> Vec<String> {
        self.models.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_endpoint() {
        let model = ModelDescriptor::new("BlogPost");
        assert_eq!(model.endpoint, "blogpost");
        assert_eq!(model.base_path(), "/api/blogpost");
    }

    #[test]
    fn test_has_field_includes_id() {
        let model = ModelDescriptor::new("User").with_field(FieldDef::new("name", "string"));
        assert!(model.has_field("id"));
        assert!(model.has_field("name"));
        assert!(!model.has_field("is_admin"));
    }

    #[test]
    fn test_push_field_replaces() {
        let mut model = ModelDescriptor::new("User");
        model.push_field(FieldDef::new("age", "string"));
        model.push_field(FieldDef::new("age", "integer"));
        assert_eq!(model.fields.len(), 1);
        assert_eq!(model.field("age").unwrap().field_type, "integer");
    }

    #[test]
    fn test_registry() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelDescriptor::new("Product"));
        registry.register(ModelDescriptor::new("Order"));

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("Order"));
        assert!(registry.get("Missing").is_none());
        assert_eq!(registry.names(), vec!["Order", "Product"]);
    }
}
