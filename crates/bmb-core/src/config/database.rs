use serde::{Deserialize, Serialize};

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection string handed to the BMDB ORM (`DB_CONNECTION`).
    pub connection: String,
}

impl DatabaseConfig {
    /// Database backend named by the connection string scheme.
    pub fn backend(&self) -> &str {
        self.connection
            .split_once("://")
            .map(|(scheme, _)| scheme.split('+').next().unwrap_or(scheme))
            .unwrap_or("unknown")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection: "sqlite:///app.db".to_string(),
        }
    }
}
