//! Static file responses.

use std::fs::File;
use std::io;
use std::path::Path;

use chrono::Utc;
use thiserror::Error;
use tokio::io::AsyncWrite;
use tokio::net::TcpStream;
use tracing::debug;

use crate::config::Config;
use crate::http::mime::mime_for_path;
use crate::http::request::{Request, Version};
use crate::http::response::{Response, StatusCode};
use crate::http::writer::{transfer_file, ResponseWriter};

#[derive(Debug, Error)]
pub enum ServeError {
    /// The file could not be opened; the client already got `status`.
    #[error("cannot open {path}: {source} (answered {})", .status.as_u16())]
    Open {
        path: String,
        status: StatusCode,
        #[source]
        source: io::Error,
    },
    #[error("write failed: {0}")]
    Write(#[from] io::Error),
    #[error("file transfer failed: {0}")]
    Transfer(#[source] io::Error),
}

/// Status to answer with when opening a file fails.
pub fn status_for_open_error(err: &io::Error) -> StatusCode {
    match err.kind() {
        io::ErrorKind::PermissionDenied => StatusCode::Forbidden,
        io::ErrorKind::NotFound => StatusCode::NotFound,
        _ => StatusCode::InternalServerError,
    }
}

/// Sends a bare status reply.
pub async fn send_status<W>(stream: &mut W, version: Version, status: StatusCode) -> Result<(), ServeError>
where
    W: AsyncWrite + Unpin,
{
    debug!("Sending back {} {}", status.as_u16(), status.reason_phrase());
    let response = Response::status_only(version, status);
    ResponseWriter::new(&response).write_to_stream(stream).await?;
    Ok(())
}

fn open_regular_file(path: &Path) -> io::Result<(File, u64)> {
    let file = File::open(path)?;
    let metadata = file.metadata()?;
    if metadata.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "directory listings are not served",
        ));
    }
    Ok((file, metadata.len()))
}

/// Answers `request` with the file it names, relative to `config.root`.
///
/// GET sends the head followed by the file contents, HEAD only the head.
/// Returns the number of body bytes sent.
pub async fn serve(stream: &mut TcpStream, request: &Request, config: &Config) -> Result<u64, ServeError> {
    let path = config.root.join(&request.path);

    let (file, len) = match open_regular_file(&path) {
        Ok(opened) => opened,
        Err(source) => {
            let status = status_for_open_error(&source);
            send_status(stream, request.version, status).await?;
            return Err(ServeError::Open {
                path: request.path.clone(),
                status,
                source,
            });
        }
    };

    let head = Response::file(mime_for_path(&request.path), len, Utc::now());
    ResponseWriter::new(&head).write_to_stream(stream).await?;

    if !request.wants_body() {
        return Ok(0);
    }

    debug!("Sending {}", path.display());
    let sent = transfer_file(stream, &file, len)
        .await
        .map_err(ServeError::Transfer)?;
    debug!("{} bytes sent", sent);

    Ok(sent)
}
