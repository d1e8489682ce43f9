pub mod auth_config;
pub mod declaration;
