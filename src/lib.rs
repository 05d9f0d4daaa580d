//! Px2 Connect: update and settings lifecycle core of the Px2 Connect browser extension.
//!
//! This library crate exposes all modules for use by the host bridge binary and integration tests.

pub mod app;
pub mod config;
pub mod database;
pub mod host;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod storage;
pub mod types;
