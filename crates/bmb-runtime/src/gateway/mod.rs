mod accounts;
mod auth;
mod crud;
mod response;
mod server;

use std::sync::Arc;

use bmb_core::config::PaginationConfig;
use bmb_core::ModelRegistry;

use crate::store::ModelStore;

pub use auth::{bearer_token, public_record, AuthError, CurrentUser, TokenService, USER_MODEL};
pub use crud::model_routes;
pub use response::{ApiError, ApiResponse};
pub use server::{default_user_model, BmbServer};

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ModelStore>,
    pub tokens: Arc<TokenService>,
    pub registry: Arc<ModelRegistry>,
    pub pagination: PaginationConfig,
}
