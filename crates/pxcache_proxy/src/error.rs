use thiserror::Error;

/// Failures talking to an origin server.
#[derive(Debug, Error)]
pub enum OriginError {
    #[error("could not connect to origin {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("origin {addr} timed out during {phase}")]
    Timeout { addr: String, phase: &'static str },

    #[error("origin {addr} response exceeded {limit} bytes")]
    TooLarge { addr: String, limit: usize },

    #[error("origin {addr} closed the connection without sending a response")]
    EmptyResponse { addr: String },

    #[error("I/O error with origin {addr}: {source}")]
    Io {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}
