//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Free-text search (`?search=`). Missing and blank terms match everything.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

impl SearchParams {
    pub fn term(&self) -> &str {
        self.search.as_deref().unwrap_or("").trim()
    }
}

/// Token passed in the query string where headers cannot be set
/// (WebSocket upgrades from browsers).
#[derive(Debug, Deserialize)]
pub struct TokenParams {
    pub token: Option<String>,
}
