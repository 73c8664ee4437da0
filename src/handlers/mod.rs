pub mod auth;
pub mod resources;
