//! shttpd - a small static file server
//!
//! Core library for HTTP parsing, file responses and connection handling.

pub mod config;
pub mod http;
pub mod server;
