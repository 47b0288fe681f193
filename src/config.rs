use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

/// Number of bytes a request's header block may take.
pub const BUFFER_SIZE: usize = 4096;
/// Upper bound on tracked sockets, the listening one included.
pub const MAX_CLIENTS: usize = 1024;
pub const DEFAULT_DOCUMENT: &str = "index.html";
pub const LISTEN_BACKLOG: u32 = 128;

/// Command line: `shttpd <address> <port>`.
#[derive(Debug, Parser)]
#[command(name = "shttpd", about = "Serve files from the current directory over HTTP", disable_help_flag = true)]
pub struct Cli {
    /// IPv4 address to listen on, or `localhost`
    pub address: String,
    /// TCP port to listen on
    pub port: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid port: {0}")]
    InvalidPort(String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Directory requested paths are resolved against.
    pub root: PathBuf,
    /// File served for `/`.
    pub default_document: String,
    pub max_clients: usize,
    pub buffer_size: usize,
    pub backlog: u32,
}

impl Config {
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            root: PathBuf::from("."),
            default_document: DEFAULT_DOCUMENT.to_string(),
            max_clients: MAX_CLIENTS,
            buffer_size: BUFFER_SIZE,
            backlog: LISTEN_BACKLOG,
        }
    }

    /// Builds the configuration from the two positional arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let ip = parse_address(&cli.address)?;
        let port = parse_port(&cli.port)?;
        Ok(Self::new(SocketAddr::from((ip, port))))
    }
}

/// Accepts a dotted quad, or `localhost` for the loopback address.
pub fn parse_address(address: &str) -> Result<Ipv4Addr, ConfigError> {
    let address = if address == "localhost" { "127.0.0.1" } else { address };
    address
        .parse()
        .map_err(|_| ConfigError::InvalidAddress(address.to_string()))
}

pub fn parse_port(port: &str) -> Result<u16, ConfigError> {
    port.parse()
        .map_err(|_| ConfigError::InvalidPort(port.to_string()))
}
