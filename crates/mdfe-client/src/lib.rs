//! NFHub MDFe Client Library
//!
//! Typed client for the NFHub document API: certificate registration and
//! the MDFe lifecycle (transmit, query, print, close, cancel, discard).
//!
//! # Example
//!
//! ```rust,no_run
//! use mdfe_client::MdfeClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = MdfeClient::new("https://api.nfhub.com.br/")?;
//!     let cnpj = "12345678000190";
//!
//!     // Transmit a document, then fetch its DAMDFE
//!     let sent = client
//!         .transmit(cnpj, json!({"serie": 1, "numero": 10}), Default::default())
//!         .await?;
//!     println!("transmit answered {}", sent.status);
//!
//!     let pdf = client.print_damdfe(cnpj, 42, Default::default()).await?;
//!     let _pdf_bytes = pdf.body.as_bytes();
//!
//!     Ok(())
//! }
//! ```
//!
//! Every operation returns the [`ResponseEnvelope`] unchanged, whatever its
//! status code. Only the pre-print operation turns non-200 answers into
//! [`MdfeClientError::RemoteValidation`].
//!
//! # Testing
//!
//! The `testing` module provides a recording transport and an axum-backed
//! server for integration tests:
//!
//! ```rust,ignore
//! use mdfe_client::testing::RecordingTransport;
//!
//! let transport = RecordingTransport::new();
//! let client = MdfeClient::with_transport(transport.clone());
//! client.query("12345678000190", 42, Default::default()).await?;
//! assert_eq!(transport.last_request().unwrap().path, "mdfes/42");
//! ```

mod client;
pub mod config;
pub mod endpoint;
mod error;
pub mod testing;
pub mod transport;
mod types;

pub use client::{MdfeClient, RequestContext, COMPANY_CNPJ_HEADER};
pub use config::ClientConfig;
pub use endpoint::{Endpoint, HttpMethod, ENDPOINTS};
pub use error::{MdfeClientError, Result, REQUEST_ERROR_CODE};
pub use transport::{
    HttpTransport, RequestEncoding, RequestOptions, ResponseFormat, Transport, TransportError,
};
pub use types::*;
