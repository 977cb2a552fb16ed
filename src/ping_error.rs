use std::{error::Error, fmt};

pub type GenericError = Box<dyn Error + Send + Sync + 'static>;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Host name could not be turned into an IPv4 address.
    Resolution,
    /// Socket creation, configuration or teardown failed.
    Transport,
    /// Echo request was not written, or only partially.
    Send,
    /// Waiting for or reading a datagram failed.
    Receive,
    /// Datagram too short to hold the headers it claims to carry.
    Malformed,
    InvalidArgument,
}

#[derive(Debug)]
pub struct PingError {
    pub kind: ErrorKind,
    pub message: String,
    // no chained error
}

impl PingError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        PingError {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for PingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "PingError")?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl Error for PingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl From<std::io::Error> for PingError {
    fn from(error: std::io::Error) -> PingError {
        PingError {
            kind: ErrorKind::Transport,
            message: error.to_string(),
        }
    }
}
