use bytes::BytesMut;
use tokio::io::AsyncReadExt;
use tokio::time::{timeout, timeout_at, Duration, Instant};
use tracing::{debug, instrument};

use super::ClientStream;

/// Once the request line is in, wait at most this long for the rest of the
/// header block before answering.
const HEADER_DRAIN_TIMEOUT: Duration = Duration::from_millis(200);

/// Bounds on discarding leftover client input after a rejection.
const DISCARD_TIMEOUT: Duration = Duration::from_millis(200);
const DISCARD_LIMIT_BYTES: usize = 256 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RequestRead {
    /// Whatever the client sent, ready for the request codec.
    Received(String),
    /// The client exceeded the request size limit.
    TooLarge,
    /// The client closed or stayed silent without sending a byte.
    Idle,
}

/// Reads the inbound request.
///
/// Stops at the end of the header block, at EOF, or when the client pauses
/// after a complete request line. Headers are read only so the socket is
/// drained before the response; nothing past the first line is interpreted.
#[instrument(skip(stream))]
pub(crate) async fn read_request(
    stream: &mut dyn ClientStream,
    read_timeout: Duration,
    max_bytes: usize,
) -> anyhow::Result<RequestRead> {
    let mut buf = BytesMut::with_capacity(4096);

    loop {
        if find_headers_end(&buf) {
            break;
        }

        if buf.len() > max_bytes {
            return Ok(RequestRead::TooLarge);
        }

        let timeout_dur = if has_request_line(&buf) {
            HEADER_DRAIN_TIMEOUT.min(read_timeout)
        } else {
            read_timeout
        };

        match timeout(timeout_dur, stream.read_buf(&mut buf)).await {
            Ok(Ok(0)) | Err(_) => break,
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(e.into()),
        }
    }

    if buf.is_empty() {
        return Ok(RequestRead::Idle);
    }

    debug!(target: "pxcache::http", bytes = buf.len(), "Read client request");
    Ok(RequestRead::Received(String::from_utf8_lossy(&buf).into_owned()))
}

/// Reads and drops whatever the client is still sending, so closing the
/// socket does not reset the connection before the reply is delivered.
pub(crate) async fn discard_input(stream: &mut dyn ClientStream) -> usize {
    let deadline = Instant::now() + DISCARD_TIMEOUT;
    let mut scratch = [0u8; 4096];
    let mut discarded = 0;

    while discarded < DISCARD_LIMIT_BYTES {
        match timeout_at(deadline, stream.read(&mut scratch)).await {
            Ok(Ok(n)) if n > 0 => discarded += n,
            _ => break,
        }
    }

    debug!(target: "pxcache::http", discarded, "Discarded unread client input");
    discarded
}

fn has_request_line(buf: &BytesMut) -> bool {
    buf.contains(&b'\n')
}

fn find_headers_end(buf: &BytesMut) -> bool {
    buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.windows(2).any(|w| w == b"\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    const READ_TIMEOUT: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn reads_full_header_block() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client
            .write_all(b"GET http://example.com/ HTTP/1.0\r\nHost: example.com\r\n\r\n")
            .await
            .unwrap();

        let read = read_request(&mut server, READ_TIMEOUT, 1024).await.unwrap();
        assert_eq!(
            read,
            RequestRead::Received(
                "GET http://example.com/ HTTP/1.0\r\nHost: example.com\r\n\r\n".into()
            )
        );
    }

    #[tokio::test]
    async fn bare_request_line_is_accepted_after_pause() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client
            .write_all(b"GET http://example.com/ HTTP/1.0\r\n")
            .await
            .unwrap();

        let read = read_request(&mut server, READ_TIMEOUT, 1024).await.unwrap();
        assert!(matches!(read, RequestRead::Received(ref raw) if raw.starts_with("GET ")));
        drop(client);
    }

    #[tokio::test]
    async fn request_without_newline_is_taken_at_eof() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client
            .write_all(b"GET http://example.com/ HTTP/1.0")
            .await
            .unwrap();
        drop(client);

        let read = read_request(&mut server, READ_TIMEOUT, 1024).await.unwrap();
        assert_eq!(
            read,
            RequestRead::Received("GET http://example.com/ HTTP/1.0".into())
        );
    }

    #[tokio::test]
    async fn silent_client_is_idle() {
        let (client, mut server) = tokio::io::duplex(1024);
        let read = read_request(&mut server, Duration::from_millis(50), 1024)
            .await
            .unwrap();
        assert_eq!(read, RequestRead::Idle);
        drop(client);
    }

    #[tokio::test]
    async fn discard_stops_at_eof() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        client.write_all(&[b'B'; 300]).await.unwrap();
        drop(client);

        assert_eq!(discard_input(&mut server).await, 300);
    }

    #[tokio::test]
    async fn oversized_request_is_rejected() {
        let (mut client, mut server) = tokio::io::duplex(8192);
        client.write_all(&[b'A'; 200]).await.unwrap();

        let read = read_request(&mut server, READ_TIMEOUT, 64).await.unwrap();
        assert_eq!(read, RequestRead::TooLarge);
    }
}
