use std::future::{poll_fn, Future};
use std::io;
use std::net::SocketAddr;
use std::task::{Context, Poll};

use anyhow::Context as _;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::http::connection::Connection;
use crate::server::clients::{ClientId, ClientTable};

/// What the client table tracks: the listening socket or an accepted one.
#[derive(Debug)]
pub enum Socket {
    Listener(TcpListener),
    Stream(TcpStream),
}

/// One entry of the readiness set produced by a wait.
#[derive(Debug)]
enum Readiness {
    Incoming(TcpStream, SocketAddr),
    AcceptFailed(io::Error),
    Readable(ClientId),
}

/// The multiplexer: a listening socket, the clients it accepted, and the
/// shutdown flag.
///
/// Everything runs on one task. A wait covers all tracked sockets at once,
/// but a client chosen as ready is read, answered and closed before the
/// next wait.
pub struct Server {
    config: Config,
    clients: ClientTable<Socket>,
    shutdown: bool,
}

fn listen(config: &Config) -> io::Result<TcpListener> {
    let socket = match config.listen_addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.set_reuseaddr(true)?;
    socket.bind(config.listen_addr)?;
    socket.listen(config.backlog)
}

impl Server {
    /// Binds the listening socket. Must be called from within a runtime.
    pub async fn bind(config: Config) -> anyhow::Result<Self> {
        let listener = listen(&config)
            .with_context(|| format!("cannot listen on {}", config.listen_addr))?;
        let clients = ClientTable::new(Socket::Listener(listener), config.max_clients);

        Ok(Self {
            config,
            clients,
            shutdown: false,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clients(&self) -> &ClientTable<Socket> {
        &self.clients
    }

    /// Address actually bound, useful when the configured port was 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        match self.clients.listener().map(|c| &c.socket) {
            Some(Socket::Listener(listener)) => listener.local_addr(),
            _ => Err(io::Error::new(io::ErrorKind::NotConnected, "listener closed")),
        }
    }

    /// Serves until `shutdown` resolves, then closes every socket.
    ///
    /// A shutdown request is noticed between cycles; a request being
    /// answered at that moment is finished first.
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        info!("Listening on {}", self.config.listen_addr);

        while !self.shutdown {
            let ready = tokio::select! {
                ready = self.wait_ready() => Some(ready),
                _ = &mut shutdown => None,
            };

            match ready {
                Some(ready) => self.dispatch(ready).await,
                None => {
                    info!("Shutdown signal received");
                    self.shutdown = true;
                }
            }
        }

        self.close_all();
    }

    /// Waits until at least one tracked socket is ready.
    ///
    /// The readiness set is rebuilt from the table on every call, so only
    /// live sockets are watched.
    async fn wait_ready(&self) -> Vec<Readiness> {
        poll_fn(|cx| poll_ready(&self.clients, cx)).await
    }

    async fn dispatch(&mut self, ready: Vec<Readiness>) {
        for event in ready {
            match event {
                Readiness::Incoming(stream, peer) => self.accept(stream, peer),
                Readiness::AcceptFailed(e) => error!("Accept failed: {}", e),
                Readiness::Readable(id) => self.service(id).await,
            }
        }
    }

    fn accept(&mut self, stream: TcpStream, peer: SocketAddr) {
        match self.clients.add_client(Socket::Stream(stream), peer) {
            Ok(id) => info!("Accepted connection from {} ({})", peer, id),
            // The rejected stream was dropped, which closes it.
            Err(e) => warn!("Rejected connection from {}: {}", peer, e),
        }
    }

    async fn service(&mut self, id: ClientId) {
        let Some(client) = self.clients.delete_client(id) else {
            return;
        };
        let (Socket::Stream(stream), Some(peer)) = (client.socket, client.peer) else {
            return;
        };

        let mut conn = Connection::new(stream, peer);
        let outcome = conn.handle(&self.config).await;
        debug!(?outcome, "Closed connection from {} ({})", peer, id);
    }

    fn close_all(&mut self) {
        let closed = self.clients.delete_all_clients();
        info!("Closed {} sockets", closed.len());
    }
}

fn poll_ready(clients: &ClientTable<Socket>, cx: &mut Context<'_>) -> Poll<Vec<Readiness>> {
    let mut ready = Vec::new();

    for client in clients.iter() {
        match &client.socket {
            Socket::Listener(listener) => match listener.poll_accept(cx) {
                Poll::Ready(Ok((stream, peer))) => ready.push(Readiness::Incoming(stream, peer)),
                Poll::Ready(Err(e)) => ready.push(Readiness::AcceptFailed(e)),
                Poll::Pending => {}
            },
            Socket::Stream(stream) => {
                // An error also counts as ready; the read will report it.
                if stream.poll_read_ready(cx).is_ready() {
                    ready.push(Readiness::Readable(client.id));
                }
            }
        }
    }

    if ready.is_empty() {
        Poll::Pending
    } else {
        Poll::Ready(ready)
    }
}

/// Binds `cfg.listen_addr` and serves until `shutdown` resolves.
pub async fn run<F>(cfg: Config, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()>,
{
    let server = Server::bind(cfg).await?;
    server.run(shutdown).await;
    Ok(())
}
