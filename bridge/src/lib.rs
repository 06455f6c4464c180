//! Voucher Bridge Library
//!
//! Core modules for the voucher-scoped device platform bridge.

pub mod adapter;
pub mod app;
pub mod cache;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod mqtt;
pub mod response;
pub mod secret;
pub mod server;
pub mod settings;
pub mod utils;
pub mod voucher;
pub mod workers;
