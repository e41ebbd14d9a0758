pub mod account;
pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod interactive;
pub mod session;
