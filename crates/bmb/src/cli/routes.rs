use anyhow::Result;
use bmb_codegen::list_route_files;
use console::style;

/// Print the route modules of the current project. Never fails the process.
pub fn list_routes() -> Result<()> {
    let root = std::env::current_dir()?;
    println!("{}", style("Routes").bold());

    match list_route_files(&root) {
        Err(e) => {
            tracing::debug!(error = %e, "No routes directory");
            println!("{} You must be inside a BMB project", style("❌").red());
        }
        Ok(files) if files.is_empty() => {
            println!("{} No routes found", style("⚠").yellow());
        }
        Ok(files) => {
            for file in files {
                println!("  {} {}", style("📄").green(), file);
            }
        }
    }
    Ok(())
}
