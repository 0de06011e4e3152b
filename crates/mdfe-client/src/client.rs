//! MDFe request dispatcher

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::endpoint::{Endpoint, HttpMethod};
use crate::error::{MdfeClientError, Result};
use crate::transport::{HttpTransport, Transport, TransportError};
use crate::types::{Params, Payload, RequestHeaders, ResponseEnvelope};

/// Header scoping every request to a company
pub const COMPANY_CNPJ_HEADER: &str = "company-cnpj";

/// Per-call request data
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Company tax id sent in the `company-cnpj` header; must not be blank
    pub company_cnpj: String,
    /// Document id substituted into the path template
    pub resource_id: Option<u64>,
    /// Body for POST endpoints
    pub payload: Option<Payload>,
    /// Extra options forwarded as query parameters
    pub params: Params,
}

impl RequestContext {
    pub fn new(company_cnpj: impl Into<String>) -> Self {
        Self {
            company_cnpj: company_cnpj.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, resource_id: u64) -> Self {
        self.resource_id = Some(resource_id);
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    fn headers(&self) -> RequestHeaders {
        vec![(COMPANY_CNPJ_HEADER.to_string(), self.company_cnpj.clone())]
    }
}

/// NFHub MDFe API client
///
/// Every operation is a lookup into the [`Endpoint`] table followed by
/// [`MdfeClient::call`].
#[derive(Clone)]
pub struct MdfeClient {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for MdfeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MdfeClient").finish_non_exhaustive()
    }
}

impl MdfeClient {
    /// Create a client talking HTTP to the given API root
    pub fn new(base_url: &str) -> Result<Self> {
        let transport = HttpTransport::new(base_url).map_err(MdfeClientError::request)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config).map_err(MdfeClientError::request)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client over any base client implementation
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    // =========================================================================
    // Generic dispatch
    // =========================================================================

    /// Issue the single request described by `endpoint`
    ///
    /// Returns the envelope unchanged, whatever its status code. Only
    /// transport failures become errors.
    #[instrument(
        skip(self, endpoint, ctx),
        fields(endpoint = endpoint.name, cnpj = %ctx.company_cnpj)
    )]
    pub async fn call(
        &self,
        endpoint: &Endpoint,
        ctx: RequestContext,
    ) -> Result<ResponseEnvelope> {
        if ctx.company_cnpj.trim().is_empty() {
            return Err(MdfeClientError::MissingCompanyCnpj);
        }
        let path = endpoint.path(ctx.resource_id)?;
        let headers = ctx.headers();
        let options = endpoint.options();
        debug!("{} {}", endpoint.method, path);

        let response = match endpoint.method {
            HttpMethod::Get => {
                self.transport
                    .get(&path, &ctx.params, &headers, options)
                    .await
            }
            HttpMethod::Post => {
                self.transport
                    .post(&path, ctx.payload.as_ref(), &ctx.params, &headers, options)
                    .await
            }
            HttpMethod::Delete => {
                self.transport
                    .delete(&path, &ctx.params, &headers, options)
                    .await
            }
        };

        wrap(response)
    }

    // =========================================================================
    // Certificates
    // =========================================================================

    /// Register a digital certificate (multipart upload)
    #[instrument(skip(self, payload, params))]
    pub async fn register_certificate(
        &self,
        company_cnpj: &str,
        payload: impl Into<Payload>,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_payload(payload)
            .with_params(params);
        self.call(&Endpoint::REGISTER_CERTIFICATE, ctx).await
    }

    // =========================================================================
    // MDFe lifecycle
    // =========================================================================

    /// Transmit a new MDFe
    #[instrument(skip(self, payload, params))]
    pub async fn transmit(
        &self,
        company_cnpj: &str,
        payload: impl Into<Payload>,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_payload(payload)
            .with_params(params);
        self.call(&Endpoint::TRANSMIT, ctx).await
    }

    /// Query an MDFe
    #[instrument(skip(self, params))]
    pub async fn query(
        &self,
        company_cnpj: &str,
        id: u64,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_id(id)
            .with_params(params);
        self.call(&Endpoint::QUERY, ctx).await
    }

    /// Close an MDFe
    #[instrument(skip(self, payload, params))]
    pub async fn close(
        &self,
        company_cnpj: &str,
        id: u64,
        payload: impl Into<Payload>,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_id(id)
            .with_payload(payload)
            .with_params(params);
        self.call(&Endpoint::CLOSE, ctx).await
    }

    /// Close an MDFe issued outside this API
    #[instrument(skip(self, payload, params))]
    pub async fn close_external(
        &self,
        company_cnpj: &str,
        payload: impl Into<Payload>,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_payload(payload)
            .with_params(params);
        self.call(&Endpoint::CLOSE_EXTERNAL, ctx).await
    }

    /// Cancel an MDFe
    #[instrument(skip(self, payload, params))]
    pub async fn cancel(
        &self,
        company_cnpj: &str,
        id: u64,
        payload: impl Into<Payload>,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_id(id)
            .with_payload(payload)
            .with_params(params);
        self.call(&Endpoint::CANCEL, ctx).await
    }

    /// Add a conductor to an MDFe
    #[instrument(skip(self, payload, params))]
    pub async fn include_conductor(
        &self,
        company_cnpj: &str,
        id: u64,
        payload: impl Into<Payload>,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_id(id)
            .with_payload(payload)
            .with_params(params);
        self.call(&Endpoint::INCLUDE_CONDUCTOR, ctx).await
    }

    /// Discard an MDFe
    #[instrument(skip(self, params))]
    pub async fn discard(
        &self,
        company_cnpj: &str,
        id: u64,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_id(id)
            .with_params(params);
        self.call(&Endpoint::DISCARD, ctx).await
    }

    // =========================================================================
    // Documents (raw responses)
    // =========================================================================

    /// Fetch the DAMDFE (PDF) of an MDFe
    #[instrument(skip(self, params))]
    pub async fn print_damdfe(
        &self,
        company_cnpj: &str,
        id: u64,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_id(id)
            .with_params(params);
        self.call(&Endpoint::PRINT_DAMDFE, ctx).await
    }

    /// Fetch the XML of an MDFe
    #[instrument(skip(self, params))]
    pub async fn fetch_xml(
        &self,
        company_cnpj: &str,
        id: u64,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_id(id)
            .with_params(params);
        self.call(&Endpoint::FETCH_XML, ctx).await
    }

    /// Fetch the cancellation PDF of an MDFe
    #[instrument(skip(self, params))]
    pub async fn print_cancellation(
        &self,
        company_cnpj: &str,
        id: u64,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_id(id)
            .with_params(params);
        self.call(&Endpoint::PRINT_CANCELLATION, ctx).await
    }

    /// Generate a preview DAMDFE from document data
    ///
    /// Unlike the other operations, a non-200 answer is an error carrying
    /// the message(s) the API returned.
    #[instrument(skip(self, payload, params))]
    pub async fn pre_print(
        &self,
        company_cnpj: &str,
        payload: impl Into<Payload>,
        params: Params,
    ) -> Result<ResponseEnvelope> {
        let ctx = RequestContext::new(company_cnpj)
            .with_payload(payload)
            .with_params(params);
        let response = self.call(&Endpoint::PRE_PRINT, ctx).await?;
        pre_print_outcome(response)
    }
}

/// Wrap every transport failure in the generic request error
fn wrap<T>(result: std::result::Result<T, TransportError>) -> Result<T> {
    result.map_err(MdfeClientError::request)
}

/// Accept a 200 pre-print response or derive the error it describes
fn pre_print_outcome(response: ResponseEnvelope) -> Result<ResponseEnvelope> {
    if response.status == 200 {
        return Ok(response);
    }

    warn!("Pre-print rejected with status {}", response.status);
    let body = response.body.to_json();

    let message = match body.as_ref() {
        Some(Value::Object(map)) => match (map.get("errors"), map.get("message")) {
            (Some(Value::Array(errors)), _) => Some(
                errors
                    .iter()
                    .map(text_of)
                    .collect::<Vec<_>>()
                    .join("\r\n"),
            ),
            (_, Some(message)) if !message.is_null() => Some(text_of(message)),
            _ => None,
        },
        _ => None,
    };

    Err(MdfeClientError::RemoteValidation {
        status: response.status,
        message: message.unwrap_or_else(|| response.to_json_string()),
    })
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
