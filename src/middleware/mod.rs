// middleware/mod.rs - Request middleware

pub mod auth;

pub use auth::{jwt_auth_middleware, optional_auth_middleware, AuthUser, OptionalUser};
