use derive_more::From;

use crate::config::ConfigError;
use crate::k8s::client::ConnectionError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    /// The cluster could not be reached at all
    #[from]
    Connection(ConnectionError),

    /// A list/get against the control plane failed
    #[from]
    Query(kube::Error),

    #[from]
    Config(ConfigError),

    /// Custom error message
    Custom(String),
}

impl Error {
    /// True when the failure means no further cluster work is possible
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Self::Connection(e) => write!(fmt, "connection failed: {e}"),
            Self::Query(e) => write!(fmt, "query failed: {e}"),
            Self::Config(e) => write!(fmt, "bad configuration: {e}"),
            _ => write!(fmt, "{self:?}"),
        }
    }
}

impl std::error::Error for Error {}
