use crate::uri::host_header;
use crate::{CodecError, SUPPORTED_METHOD, SUPPORTED_VERSION};

/// A validated client request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub uri: String,
    pub version: String,
}

/// Parses the request line of a raw client message.
///
/// Only the first line is examined; any headers that follow are ignored.
/// The line must hold exactly `METHOD URI VERSION`, with `GET` and
/// `HTTP/1.0` as the only accepted values.
pub fn parse_request(raw: &str) -> Result<Request, CodecError> {
    let request_line = raw.split('\n').next().unwrap_or("");
    let tokens: Vec<&str> = request_line.split_whitespace().collect();

    let [method, uri, version] = tokens.as_slice() else {
        return Err(CodecError::MalformedRequest(tokens.len()));
    };

    if *method != SUPPORTED_METHOD {
        return Err(CodecError::UnsupportedMethod(method.to_string()));
    }

    if version.trim_end() != SUPPORTED_VERSION {
        return Err(CodecError::UnsupportedVersion(version.to_string()));
    }

    Ok(Request {
        method: method.to_string(),
        uri: uri.to_string(),
        version: version.trim_end().to_string(),
    })
}

/// Builds the request sent to the origin: relative path, `Host` header and
/// `Connection: close`.
pub fn build_origin_request(method: &str, host: &str, port: u16, path: &str) -> String {
    format!(
        "{} {path} {SUPPORTED_VERSION}\r\n\
         Host: {}\r\n\
         Connection: close\r\n\
         \r\n",
        method.to_ascii_uppercase(),
        host_header(host, port)
    )
}
