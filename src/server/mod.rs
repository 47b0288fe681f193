//! Connection multiplexing.
//!
//! - **`clients`**: The table of tracked sockets
//! - **`listener`**: The readiness loop that accepts and dispatches clients

pub mod clients;
pub mod listener;

pub use clients::{Client, ClientId, ClientTable, ClientTableError};
pub use listener::{Server, Socket};
