pub mod copier;
pub mod crud;
pub mod imports;
pub mod maintenance;
pub mod project;
pub mod store;
pub mod synth;
pub mod template;

pub use copier::copy_templates;
pub use crud::{register_blueprint, render_crud_routes, write_crud_routes, Registration};
pub use imports::rewrite_relative_imports;
pub use project::{generate_project, list_route_files, ProjectInfo, ProjectSpec};
pub use store::{Layout, TemplateFile, TemplateStore};
pub use synth::{synthesize, FileRole};
pub use template::render;
