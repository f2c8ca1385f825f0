use http::StatusCode;

use crate::{CodecError, SUPPORTED_VERSION};

const HEADER_TERMINATOR: &str = "\r\n\r\n";

/// Serializes the response sent back to the client.
///
/// Layout: status line, `Cache-Hit` header, blank line, body, CRLF.
pub fn build_client_response(cache_hit: bool, status_code: &str, body: &str) -> String {
    format!(
        "{SUPPORTED_VERSION} {status_code} {}\r\n\
         Cache-Hit: {}\r\n\
         \r\n\
         {body}\r\n",
        reason_phrase(status_code),
        u8::from(cache_hit)
    )
}

fn reason_phrase(status_code: &str) -> &'static str {
    status_code
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .and_then(|status| status.canonical_reason())
        .unwrap_or("OK")
}

/// Second whitespace-delimited token of the status line.
pub fn parse_status_code(raw: &str) -> Result<String, CodecError> {
    raw.lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .ok_or(CodecError::MalformedResponse("missing status code"))
}

/// Everything after the header block, with a CRLF appended.
pub fn parse_body(raw: &str) -> Result<String, CodecError> {
    let (_, body) = raw
        .split_once(HEADER_TERMINATOR)
        .ok_or(CodecError::MalformedResponse("missing header terminator"))?;
    Ok(format!("{body}\r\n"))
}
