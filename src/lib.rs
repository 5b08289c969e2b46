// Public API for integration tests and potential library usage

pub mod broadcast;
pub mod config;
pub mod error;
pub mod protocol;
pub mod state;
pub mod types;
pub mod words;
pub mod ws;
