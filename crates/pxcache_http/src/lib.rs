//! HTTP/1.0 codec used by the forward proxy.
//!
//! Everything here is pure string handling except `responses`, which writes
//! finished responses to a client socket.

mod error;
pub mod request;
pub mod response;
pub mod responses;
pub mod uri;

pub use error::CodecError;
pub use request::{build_origin_request, parse_request, Request};
pub use response::{build_client_response, parse_body, parse_status_code};
pub use uri::{host_header, origin_addr, resolve, ResolvedTarget};

/// The only method the proxy forwards.
pub const SUPPORTED_METHOD: &str = "GET";
/// The only protocol version accepted from clients and spoken to origins.
pub const SUPPORTED_VERSION: &str = "HTTP/1.0";
/// Body sent with every proxy-generated 500.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";
