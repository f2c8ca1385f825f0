use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::{build_client_response, INTERNAL_ERROR_BODY};

/// Generic helper to write a proxy response to the client.
pub async fn send_response<W>(
    stream: &mut W,
    cache_hit: bool,
    status_code: &str,
    body: &str,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let response = build_client_response(cache_hit, status_code, body);
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await?;
    Ok(())
}

pub async fn send_500<W>(stream: &mut W) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    send_response(stream, false, "500", INTERNAL_ERROR_BODY).await
}
