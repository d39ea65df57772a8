pub mod auth;
pub mod config;
pub mod error;
pub mod pagination;
pub mod schema;

pub use auth::{Claims, ClaimsBuilder};
pub use config::BmbConfig;
pub use error::{BmbError, Result};
pub use pagination::{PageInfo, PageRequest};
pub use schema::{FieldDef, ModelDescriptor, ModelFieldSpec, ModelRegistry};
