pub mod auth;
pub mod json_body;
pub mod query;

pub use auth::{AuthUser, RequireServiceKey};
pub use json_body::ApiJson;
pub use query::{ApiPath, ApiQuery};
