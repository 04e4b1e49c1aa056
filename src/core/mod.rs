pub mod config;
pub mod error;
pub mod intent;
pub mod message;
pub mod prompt;
pub mod provider;
pub mod session;
