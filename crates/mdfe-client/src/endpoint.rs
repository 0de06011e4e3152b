//! Endpoint descriptors for the NFHub MDFe API
//!
//! Every client operation is one entry of this table. The dispatcher reads
//! the HTTP method, path template and request options from here instead of
//! hard-coding them per method.

use std::fmt;

use crate::error::{MdfeClientError, Result};
use crate::transport::{RequestEncoding, RequestOptions, ResponseFormat};

/// Placeholder replaced with the document id
const ID_PLACEHOLDER: &str = "{id}";

/// HTTP verb used by an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one API endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Operation name, used in logs and errors
    pub name: &'static str,
    pub method: HttpMethod,
    /// Path relative to the API base URL, optionally containing `{id}`
    pub path_template: &'static str,
    /// Send the payload as multipart form data
    pub upload: bool,
    /// Return the body bytes without JSON decoding
    pub raw_response: bool,
}

impl Endpoint {
    const fn new(
        name: &'static str,
        method: HttpMethod,
        path_template: &'static str,
        upload: bool,
        raw_response: bool,
    ) -> Self {
        Self {
            name,
            method,
            path_template,
            upload,
            raw_response,
        }
    }

    pub const REGISTER_CERTIFICATE: Endpoint = Endpoint::new(
        "register_certificate",
        HttpMethod::Post,
        "certificates",
        true,
        false,
    );
    pub const TRANSMIT: Endpoint = Endpoint::new("transmit", HttpMethod::Post, "mdfes", false, false);
    pub const QUERY: Endpoint = Endpoint::new("query", HttpMethod::Get, "mdfes/{id}", false, false);
    pub const PRINT_DAMDFE: Endpoint = Endpoint::new(
        "print_damdfe",
        HttpMethod::Get,
        "mdfes/{id}/damdfe",
        false,
        true,
    );
    pub const FETCH_XML: Endpoint =
        Endpoint::new("fetch_xml", HttpMethod::Get, "mdfes/{id}/xml", false, true);
    pub const CLOSE: Endpoint =
        Endpoint::new("close", HttpMethod::Post, "mdfes/{id}/close", false, false);
    pub const CLOSE_EXTERNAL: Endpoint = Endpoint::new(
        "close_external",
        HttpMethod::Post,
        "mdfes/close",
        false,
        false,
    );
    pub const CANCEL: Endpoint =
        Endpoint::new("cancel", HttpMethod::Post, "mdfes/{id}/cancel", false, false);
    pub const INCLUDE_CONDUCTOR: Endpoint = Endpoint::new(
        "include_conductor",
        HttpMethod::Post,
        "mdfes/{id}/condutor",
        false,
        false,
    );
    pub const PRINT_CANCELLATION: Endpoint = Endpoint::new(
        "print_cancellation",
        HttpMethod::Get,
        "mdfes/{id}/cancel/pdf",
        false,
        true,
    );
    pub const PRE_PRINT: Endpoint = Endpoint::new(
        "pre_print",
        HttpMethod::Post,
        "mdfes/predamdfe",
        false,
        true,
    );
    pub const DISCARD: Endpoint =
        Endpoint::new("discard", HttpMethod::Delete, "mdfes/{id}", false, false);

    /// Whether the path template contains the document id placeholder
    pub fn requires_id(&self) -> bool {
        self.path_template.contains(ID_PLACEHOLDER)
    }

    /// Build the request path, substituting the document id
    ///
    /// The id is forwarded as given; the API decides whether it is valid.
    pub fn path(&self, resource_id: Option<u64>) -> Result<String> {
        if !self.requires_id() {
            return Ok(self.path_template.to_string());
        }

        let id = resource_id.ok_or(MdfeClientError::MissingResourceId(self.name))?;
        Ok(self.path_template.replace(ID_PLACEHOLDER, &id.to_string()))
    }

    /// Per-request encoding and decoding options for this endpoint
    pub fn options(&self) -> RequestOptions {
        RequestOptions {
            encoding: if self.upload {
                RequestEncoding::Multipart
            } else {
                RequestEncoding::Json
            },
            response_format: if self.raw_response {
                ResponseFormat::Raw
            } else {
                ResponseFormat::Decoded
            },
        }
    }
}

/// Every endpoint exposed by the client
pub const ENDPOINTS: [Endpoint; 12] = [
    Endpoint::REGISTER_CERTIFICATE,
    Endpoint::TRANSMIT,
    Endpoint::QUERY,
    Endpoint::PRINT_DAMDFE,
    Endpoint::FETCH_XML,
    Endpoint::CLOSE,
    Endpoint::CLOSE_EXTERNAL,
    Endpoint::CANCEL,
    Endpoint::INCLUDE_CONDUCTOR,
    Endpoint::PRINT_CANCELLATION,
    Endpoint::PRE_PRINT,
    Endpoint::DISCARD,
];

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Endpoint::QUERY, "mdfes/42")]
    #[case(Endpoint::PRINT_DAMDFE, "mdfes/42/damdfe")]
    #[case(Endpoint::FETCH_XML, "mdfes/42/xml")]
    #[case(Endpoint::CLOSE, "mdfes/42/close")]
    #[case(Endpoint::CANCEL, "mdfes/42/cancel")]
    #[case(Endpoint::INCLUDE_CONDUCTOR, "mdfes/42/condutor")]
    #[case(Endpoint::PRINT_CANCELLATION, "mdfes/42/cancel/pdf")]
    #[case(Endpoint::DISCARD, "mdfes/42")]
    fn test_path_with_id(#[case] endpoint: Endpoint, #[case] expected: &str) {
        assert!(endpoint.requires_id());
        assert_eq!(endpoint.path(Some(42)).unwrap(), expected);
    }

    #[rstest]
    #[case(Endpoint::REGISTER_CERTIFICATE, "certificates")]
    #[case(Endpoint::TRANSMIT, "mdfes")]
    #[case(Endpoint::CLOSE_EXTERNAL, "mdfes/close")]
    #[case(Endpoint::PRE_PRINT, "mdfes/predamdfe")]
    fn test_path_without_id(#[case] endpoint: Endpoint, #[case] expected: &str) {
        assert!(!endpoint.requires_id());
        assert_eq!(endpoint.path(None).unwrap(), expected);
        // An id passed to a fixed path is ignored
        assert_eq!(endpoint.path(Some(7)).unwrap(), expected);
    }

    #[test]
    fn test_missing_id() {
        let err = Endpoint::QUERY.path(None).unwrap_err();
        assert!(matches!(err, MdfeClientError::MissingResourceId("query")));
    }

    #[test]
    fn test_id_is_not_validated() {
        assert_eq!(Endpoint::QUERY.path(Some(0)).unwrap(), "mdfes/0");
    }

    #[test]
    fn test_options() {
        let upload: Vec<_> = ENDPOINTS.iter().filter(|e| e.upload).collect();
        assert_eq!(upload, vec![&Endpoint::REGISTER_CERTIFICATE]);

        let raw: Vec<_> = ENDPOINTS
            .iter()
            .filter(|e| e.options().response_format == ResponseFormat::Raw)
            .map(|e| e.name)
            .collect();
        assert_eq!(
            raw,
            vec!["print_damdfe", "fetch_xml", "print_cancellation", "pre_print"]
        );

        assert_eq!(Endpoint::TRANSMIT.options(), RequestOptions::default());
        assert_eq!(
            Endpoint::REGISTER_CERTIFICATE.options().encoding,
            RequestEncoding::Multipart
        );
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Endpoint::DISCARD.method.to_string(), "DELETE");
        assert_eq!(Endpoint::QUERY.method.as_str(), "GET");
    }
}
