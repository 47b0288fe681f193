//! HTTP protocol implementation.
//!
//! This module implements a small HTTP/1.x static file server. Every
//! connection carries exactly one request and is closed after the reply.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`tokenizer`**: Splits raw bytes into tokens and finds the end of the header block
//! - **`headers`**: The table of recognised header names and the per-request header map
//! - **`request`**: HTTP request representation (method, path, version, headers)
//! - **`parser`**: Reads a header block from the socket and parses it into a request
//! - **`response`**: Status codes and response heads
//! - **`writer`**: Serializes response heads and streams file bodies
//! - **`files`**: Maps a request to a file and answers it
//! - **`mime`**: MIME type detection based on file extensions
//! - **`connection`**: The per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for a complete header block
//!        └──────┬──────┘
//!               ├─ Parsed ─────────────┐
//!               │                      ▼
//!               │             ┌──────────────────┐
//!               │             │    Responding    │ ← Head + file body
//!               │             └────────┬─────────┘
//!               ├─ Malformed / unknown method
//!               ▼                      │
//!        ┌──────────────────┐          │
//!        │    Rejecting     │ ← 400 / 501
//!        └──────┬───────────┘          │
//!               ▼                      ▼
//!        ┌──────────────────────────────────┐
//!        │              Closed              │
//!        └──────────────────────────────────┘
//! ```
//!
//! A peer that disconnects, or a read error, goes straight from Reading to
//! Closed without a reply.

pub mod tokenizer;
pub mod headers;
pub mod request;
pub mod parser;
pub mod response;
pub mod writer;
pub mod files;
pub mod mime;
pub mod connection;
