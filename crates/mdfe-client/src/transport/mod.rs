//! Base HTTP client used by the MDFe dispatcher
//!
//! This module provides the transport layer the dispatcher delegates to:
//! - [`Transport`] trait with the `get`/`post`/`delete` verbs
//! - [`HttpTransport`], the reqwest implementation talking to the API
//!
//! Encoding and decoding are chosen per request through [`RequestOptions`],
//! so a transport carries no mode state between calls.
//!
//! # Example
//!
//! ```ignore
//! use mdfe_client::transport::{HttpTransport, RequestOptions, Transport};
//!
//! let transport = HttpTransport::new("https://api.nfhub.com.br/")?;
//! let headers = vec![("company-cnpj".to_string(), "12345678000190".to_string())];
//! let response = transport
//!     .get("mdfes/42", &Default::default(), &headers, RequestOptions::default())
//!     .await?;
//! ```

mod error;
mod http;

pub use error::TransportError;
pub use http::HttpTransport;

use async_trait::async_trait;

use crate::types::{Params, Payload, RequestHeaders, ResponseEnvelope};

/// How the request payload is encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestEncoding {
    /// JSON body (default)
    #[default]
    Json,
    /// multipart/form-data, used for file uploads
    Multipart,
}

/// How the response body is handed back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Parse the body as JSON (default)
    #[default]
    Decoded,
    /// Keep the body bytes as received (PDF, XML)
    Raw,
}

/// Options applied to a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestOptions {
    pub encoding: RequestEncoding,
    pub response_format: ResponseFormat,
}

/// Transport-agnostic interface to the API
///
/// Implementations return non-2xx responses as envelopes and only fail on
/// transport problems (connection, timeout, undecodable body).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request
    async fn get(
        &self,
        path: &str,
        params: &Params,
        headers: &RequestHeaders,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, TransportError>;

    /// Issue a POST request with an optional body
    async fn post(
        &self,
        path: &str,
        body: Option<&Payload>,
        params: &Params,
        headers: &RequestHeaders,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, TransportError>;

    /// Issue a DELETE request
    async fn delete(
        &self,
        path: &str,
        params: &Params,
        headers: &RequestHeaders,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, TransportError>;
}
