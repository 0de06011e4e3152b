//! Error types for MDFe client operations

use thiserror::Error;

use crate::transport::TransportError;

/// Secondary code attached to every wrapped request failure
pub const REQUEST_ERROR_CODE: i32 = 1;

/// Result type alias for MDFe client operations
pub type Result<T> = std::result::Result<T, MdfeClientError>;

/// Errors that can occur during MDFe client operations
#[derive(Error, Debug)]
pub enum MdfeClientError {
    /// The base client failed to complete the request
    #[error("Request failed (code {code}): {source}")]
    Request {
        code: i32,
        #[source]
        source: TransportError,
    },

    /// The API rejected a pre-print request
    #[error("{message}")]
    RemoteValidation { status: u16, message: String },

    /// Every request must be scoped to a company
    #[error("Company CNPJ must not be empty")]
    MissingCompanyCnpj,

    /// Endpoint path needs a document id but none was supplied
    #[error("Endpoint {0} requires a resource id")]
    MissingResourceId(&'static str),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MdfeClientError {
    /// Wrap a transport failure with the fixed request error code
    pub fn request(source: TransportError) -> Self {
        Self::Request {
            code: REQUEST_ERROR_CODE,
            source,
        }
    }

    /// Secondary code of a wrapped request failure
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::Request { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<TransportError> for MdfeClientError {
    fn from(err: TransportError) -> Self {
        Self::request(err)
    }
}
