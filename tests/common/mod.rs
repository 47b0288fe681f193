//! Shared utilities for end-to-end tests.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use shttpd::config::Config;
use shttpd::server::Server;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

static NEXT_ROOT: AtomicUsize = AtomicUsize::new(0);

/// A server bound to an ephemeral port, serving a fresh temporary directory.
pub struct TestServer {
    pub addr: SocketAddr,
    pub root: PathBuf,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut Config)) -> Self {
        let root = std::env::temp_dir().join(format!(
            "shttpd-test-{}-{}",
            std::process::id(),
            NEXT_ROOT.fetch_add(1, Ordering::Relaxed)
        ));
        std::fs::create_dir_all(&root).unwrap();

        let mut config = Config::new("127.0.0.1:0".parse().unwrap());
        config.root = root.clone();
        configure(&mut config);

        let server = Server::bind(config).await.unwrap();
        let addr = server.local_addr().unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run(async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            root,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn write_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Sends `raw` on a fresh connection and returns everything received
    /// until the server closes it.
    pub async fn request(&self, raw: &[u8]) -> Vec<u8> {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        stream.write_all(raw).await.unwrap();
        read_all(&mut stream).await
    }

    /// Stops the server and waits for it to finish.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap();
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub async fn read_all(stream: &mut TcpStream) -> Vec<u8> {
    let mut received = Vec::new();
    let _ = stream.read_to_end(&mut received).await;
    received
}

/// Splits a response into its head lines and body.
pub fn split_response(raw: &[u8]) -> (Vec<String>, Vec<u8>) {
    let end = raw
        .windows(2)
        .position(|w| w == b"\n\n")
        .map(|p| p + 2)
        .unwrap_or(raw.len());
    let head = String::from_utf8_lossy(&raw[..end]);
    let lines = head
        .lines()
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    (lines, raw[end..].to_vec())
}

pub fn header<'a>(lines: &'a [String], name: &str) -> Option<&'a str> {
    lines.iter().find_map(|line| {
        let (k, v) = line.split_once(": ")?;
        k.eq_ignore_ascii_case(name).then_some(v)
    })
}

#[allow(dead_code)]
pub fn file_len(path: &Path) -> u64 {
    std::fs::metadata(path).unwrap().len()
}
