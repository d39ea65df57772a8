use serde::{Deserialize, Serialize};

/// Paging limits for list endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when the request does not give one.
    pub default_page_size: usize,

    /// Upper bound applied to any requested page size.
    pub max_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}
