//! Core Tina library (config, session, chat client, transcript export).

pub mod client;
pub mod config;
pub mod core;
pub mod logging;
pub mod transcript;
