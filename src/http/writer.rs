use std::fs::File;
use std::io;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::http::response::Response;

/// Serializes a response head.
///
/// Lines end with a bare `\n`, and a blank line closes the head.
fn serialize_response(resp: &Response) -> BytesMut {
    let mut buf = BytesMut::with_capacity(256);

    // Status line
    let status_line = format!(
        "{} {} {}\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.put_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        buf.put_slice(k.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(v.as_bytes());
        buf.put_u8(b'\n');
    }

    // Header/body separator
    buf.put_u8(b'\n');

    buf
}

pub struct ResponseWriter {
    buffer: BytesMut,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    /// The serialized head.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.written += n;
        }

        Ok(())
    }
}

fn short_transfer(sent: u64, len: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("transfer stopped after {sent} of {len} bytes"),
    )
}

/// Streams `len` bytes of `file` to the socket with `sendfile(2)`.
///
/// The socket is non-blocking, so each call may move only part of the file;
/// the loop waits for writability in between. A call that moves nothing
/// means the file ended early, which is an error.
#[cfg(target_os = "linux")]
pub async fn transfer_file(stream: &mut TcpStream, file: &File, len: u64) -> io::Result<u64> {
    use std::os::fd::AsRawFd;
    use tokio::io::Interest;

    let stream: &TcpStream = stream;
    let out_fd = stream.as_raw_fd();
    let in_fd = file.as_raw_fd();
    let mut offset: libc::off_t = 0;

    while (offset as u64) < len {
        let remaining = (len - offset as u64) as usize;
        let sent = stream
            .async_io(Interest::WRITABLE, || {
                let ret = unsafe { libc::sendfile(out_fd, in_fd, &mut offset, remaining) };
                if ret < 0 {
                    Err(io::Error::last_os_error())
                } else {
                    Ok(ret as usize)
                }
            })
            .await?;

        if sent == 0 {
            return Err(short_transfer(offset as u64, len));
        }
    }

    Ok(offset as u64)
}

/// Fallback for platforms without `sendfile(2)`: a plain buffered copy.
#[cfg(not(target_os = "linux"))]
pub async fn transfer_file(stream: &mut TcpStream, file: &File, len: u64) -> io::Result<u64> {
    use tokio::io::AsyncReadExt;

    let file = tokio::fs::File::from_std(file.try_clone()?);
    let sent = tokio::io::copy(&mut file.take(len), stream).await?;
    if sent < len {
        return Err(short_transfer(sent, len));
    }
    Ok(sent)
}
