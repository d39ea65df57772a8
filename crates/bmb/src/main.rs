mod cli;

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal outside a project.
    dotenvy::dotenv().ok();

    match cli::Cli::parse_args() {
        Some(cli) => cli.execute().await,
        None => Ok(()),
    }
}
