pub mod auth;
pub mod config;
pub mod integrations;
pub mod load;
pub mod session;
