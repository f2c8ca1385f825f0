use bytes::BytesMut;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    time::{timeout, Duration},
};
use tracing::debug;

use crate::OriginError;

/// Reads an origin response until the origin closes the connection.
///
/// The request always carries `Connection: close`, so EOF marks the end of
/// the response. Each read gets `read_timeout`; the accumulated size is
/// capped at `max_bytes`. Non-UTF-8 bytes are replaced.
pub(crate) async fn read_until_close<S>(
    stream: &mut S,
    addr: &str,
    read_timeout: Duration,
    max_bytes: usize,
) -> Result<String, OriginError>
where
    S: AsyncRead + Unpin + ?Sized,
{
    let mut buf = BytesMut::with_capacity(4096);
    let mut tmp = [0u8; 4096];

    loop {
        let n = match timeout(read_timeout, stream.read(&mut tmp)).await {
            Ok(Ok(n)) => n,
            Ok(Err(source)) => {
                return Err(OriginError::Io {
                    addr: addr.to_string(),
                    source,
                });
            }
            Err(_) => {
                return Err(OriginError::Timeout {
                    addr: addr.to_string(),
                    phase: "read",
                });
            }
        };

        if n == 0 {
            break;
        }

        if buf.len() + n > max_bytes {
            return Err(OriginError::TooLarge {
                addr: addr.to_string(),
                limit: max_bytes,
            });
        }
        buf.extend_from_slice(&tmp[..n]);
    }

    if buf.is_empty() {
        return Err(OriginError::EmptyResponse {
            addr: addr.to_string(),
        });
    }

    debug!(target: "pxcache::proxy", origin = %addr, bytes = buf.len(), "Origin closed connection");
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
