use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use bmb_core::schema::bmdb::{load_models, MODELS_FILE};
use bmb_core::{BmbConfig, ModelRegistry};
use bmb_runtime::{BmbServer, MemoryStore};
use clap::Parser;
use console::style;
use tracing::info;

use super::init_tracing;

/// Run the development API server.
#[derive(Parser)]
pub struct RunCommand {
    /// Port to listen on (overrides PORT).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides HOST).
    #[arg(long)]
    pub host: Option<String>,
}

impl RunCommand {
    /// Execute the run command.
    pub async fn execute(self, verbose: bool) -> Result<()> {
        init_tracing(if verbose { "debug" } else { "info" });

        let mut config = BmbConfig::from_env().context("Invalid environment configuration")?;
        self.apply_overrides(&mut config);

        let registry = if config.auto_load_models {
            load_registry(&std::env::current_dir()?)?
        } else {
            ModelRegistry::new()
        };

        let address = format!("http://{}:{}", config.server.host, config.server.port);
        let debug = config.server.debug;
        let backend = config.database.backend().to_string();
        let server = BmbServer::new(config, registry, Arc::new(MemoryStore::new()));

        println!();
        println!(
            "  {} v{}",
            style("BMB").bold().cyan(),
            env!("CARGO_PKG_VERSION")
        );
        println!();
        println!("  {} Listening on {}", style("🌐").bold(), style(address).cyan());
        println!(
            "  {} Models: {}",
            style("📦").bold(),
            server.state().registry.names().join(", ")
        );
        println!(
            "  {} Storage: in-memory ({} from DB_CONNECTION is not opened)",
            style("💾").bold(),
            backend
        );
        if debug {
            println!("  {} Debug mode enabled", style("🔧").bold());
        }
        println!();

        server.run().await?;

        println!("\n  {} Goodbye!", style("👋").bold());
        Ok(())
    }

    fn apply_overrides(&self, config: &mut BmbConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
    }
}

/// Register every model declared in the project's `models.bmdb`.
fn load_registry(root: &Path) -> Result<ModelRegistry> {
    let path = root.join(MODELS_FILE);
    let models = load_models(&path).with_context(|| format!("Cannot read {}", path.display()))?;

    let mut registry = ModelRegistry::new();
    for model in models {
        info!(model = %model.name, fields = model.fields.len(), "Loaded model");
        registry.register(model);
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_overrides() {
        let cmd = RunCommand {
            port: Some(3000),
            host: Some("127.0.0.1".to_string()),
        };
        let mut config = BmbConfig::default();
        cmd.apply_overrides(&mut config);

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let cmd = RunCommand {
            port: None,
            host: None,
        };
        let mut config = BmbConfig::default();
        cmd.apply_overrides(&mut config);

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_registry() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(MODELS_FILE),
            "User:\n  name: string\n\nProduct:\n  name: string\n  price: float\n",
        )
        .unwrap();

        let registry = load_registry(dir.path()).unwrap();
        assert_eq!(registry.names(), vec!["Product", "User"]);
        assert_eq!(registry.get("Product").unwrap().fields.len(), 2);
    }

    #[test]
    fn test_load_registry_without_file() {
        let dir = tempdir().unwrap();
        assert!(load_registry(dir.path()).unwrap().is_empty());
    }
}
