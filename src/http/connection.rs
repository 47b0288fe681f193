use std::net::SocketAddr;

use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::http::files::{send_status, serve, ServeError};
use crate::http::parser::{parse_request, RequestError};
use crate::http::request::{Request, Version};
use crate::http::response::StatusCode;

/// One accepted client, handled once and then closed.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Responding(Request),
    Rejecting(StatusCode),
    Closed,
}

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// File sent; carries the number of body bytes.
    Served(u64),
    /// Only a status line was sent.
    Answered(StatusCode),
    /// Gave up part way through a reply.
    Failed,
    /// Closed without sending anything.
    Aborted,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream,
            peer,
            state: ConnectionState::Reading,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Reads one request, answers it, and leaves the connection closed.
    ///
    /// Every failure stays in here: the caller only learns the [`Outcome`].
    pub async fn handle(&mut self, config: &Config) -> Outcome {
        let mut outcome = Outcome::Aborted;

        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    self.state = self.read_request(config).await;
                }

                ConnectionState::Responding(request) => {
                    outcome = match serve(&mut self.stream, &request, config).await {
                        Ok(sent) => {
                            info!(peer = %self.peer, "{} {} 200 ({} bytes)", request.method, request.path, sent);
                            Outcome::Served(sent)
                        }
                        Err(ServeError::Open { status, source, .. }) => {
                            info!(peer = %self.peer, "{} {} {}: {}", request.method, request.path, status.as_u16(), source);
                            Outcome::Answered(status)
                        }
                        Err(e) => {
                            error!(peer = %self.peer, "{} {} failed: {}", request.method, request.path, e);
                            Outcome::Failed
                        }
                    };
                }

                ConnectionState::Rejecting(status) => {
                    outcome = match send_status(&mut self.stream, Version::default(), status).await {
                        Ok(()) => Outcome::Answered(status),
                        Err(e) => {
                            error!(peer = %self.peer, "Failed to send {}: {}", status.as_u16(), e);
                            Outcome::Failed
                        }
                    };
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        outcome
    }

    async fn read_request(&mut self, config: &Config) -> ConnectionState {
        match parse_request(&mut self.stream, config).await {
            Ok((request, consumed)) => {
                debug!("{} {} ({} header bytes)", request.method, request.path, consumed);
                for (header, value) in request.headers.known() {
                    debug!("{}: {}", header, value);
                }
                for (name, value) in request.headers.extra() {
                    debug!("{}: {} (unrecognised)", name, value);
                }
                ConnectionState::Responding(request)
            }

            Err(RequestError::UnknownMethod(method)) => {
                warn!(peer = %self.peer, "Unknown method: {}", method);
                ConnectionState::Rejecting(StatusCode::NotImplemented)
            }

            Err(RequestError::BadRequest(reason)) => {
                warn!(peer = %self.peer, "Malformed request: {}", reason);
                ConnectionState::Rejecting(StatusCode::BadRequest)
            }

            Err(e) => {
                // Peer is gone or unusable, nothing to answer.
                debug!(peer = %self.peer, "Dropping connection: {}", e);
                ConnectionState::Closed
            }
        }
    }
}
