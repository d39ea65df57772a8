use anyhow::Result;
use bmb_codegen::ProjectInfo;
use console::style;

const COMMANDS: &[(&str, &str)] = &[
    ("init <name>", "create a project from the core template"),
    ("new <name>", "create a project with web assets"),
    ("generate-crud <Model>", "generate CRUD routes for a model"),
    ("create <Model> --fields f:t ...", "declare a model and run bmdb"),
    ("list-routes", "list route modules"),
    ("run", "start the development API server"),
    ("info", "show this information"),
    ("version", "print the version"),
];

pub fn show_version() -> Result<()> {
    println!("bmb {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

pub fn show_info() -> Result<()> {
    println!("{}", style("BMB Backend Framework").bold().cyan());
    println!();
    println!("{} {}", style("Version:").bold(), env!("CARGO_PKG_VERSION"));
    println!("{} {}", style("Description:").bold(), env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("{}", style("Commands:").bold());
    for (usage, what) in COMMANDS {
        println!("  {:<34} {}", usage, style(what).dim());
    }
    println!();

    let cwd = std::env::current_dir()?;
    let info = ProjectInfo::detect(&cwd);
    println!("{}", style("Current directory:").bold());
    println!("  BMB project:  {}", yes_no(info.is_project));
    println!("  models.bmdb:  {}", yes_no(info.has_models));
    println!("  routes/:      {}", yes_no(info.has_routes));
    if info.has_routes {
        println!("  route files:  {}", info.route_count);
    }
    Ok(())
}

fn yes_no(flag: bool) -> console::StyledObject<&'static str> {
    if flag {
        style("yes").green()
    } else {
        style("no").red()
    }
}
