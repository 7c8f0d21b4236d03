pub mod auth;
pub mod json;

pub use auth::{cookie_auth_middleware, AuthUser, SESSION_COOKIE};
pub use json::JsonBody;
