pub mod server;
pub mod templates;
pub mod token;
