pub mod gateway;
pub mod password;
pub mod store;

pub use gateway::{ApiError, ApiResponse, AppState, AuthError, BmbServer, TokenService};
pub use store::{MemoryStore, ModelStore, Record};
