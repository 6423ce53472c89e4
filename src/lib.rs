pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod providers;
pub mod server;
pub mod status;
