//! reqwest implementation of the base client

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{RequestEncoding, RequestOptions, ResponseFormat, Transport, TransportError};
use crate::config::ClientConfig;
use crate::types::{Params, Payload, RequestHeaders, ResponseBody, ResponseEnvelope};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP base client for the NFHub API
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport with default timeouts
    ///
    /// # Arguments
    /// * `base_url` - API root (e.g., "https://api.nfhub.com.br/v1/")
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_config(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a transport with custom timeouts
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
        })
    }

    /// Create a transport from a loaded configuration
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect());

        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        Ok(Self {
            client: builder.build()?,
            base_url: normalize_base_url(&config.base_url)?,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path against the base URL
    pub fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn prepare(
        &self,
        builder: RequestBuilder,
        params: &Params,
        headers: &RequestHeaders,
    ) -> Result<RequestBuilder, TransportError> {
        let query: Vec<(&str, String)> = params
            .iter()
            .map(|(key, value)| (key.as_str(), query_value(value)))
            .collect();

        Ok(builder.query(&query).headers(header_map(headers)?))
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, TransportError> {
        let response = builder.send().await.map_err(TransportError::from_reqwest)?;
        let status = response.status().as_u16();
        debug!("Response status {}", status);

        let headers = collect_headers(response.headers());

        let bytes = response.bytes().await.map_err(TransportError::from_reqwest)?;

        let body = match options.response_format {
            ResponseFormat::Raw => ResponseBody::Raw(bytes),
            ResponseFormat::Decoded => ResponseBody::Json(decode_json(&bytes)?),
        };

        Ok(ResponseEnvelope {
            status,
            body,
            headers,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        params: &Params,
        headers: &RequestHeaders,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, TransportError> {
        let url = self.url_for(path)?;
        debug!("GET {}", url);

        let builder = self.prepare(self.client.get(url), params, headers)?;
        self.send(builder, options).await
    }

    async fn post(
        &self,
        path: &str,
        body: Option<&Payload>,
        params: &Params,
        headers: &RequestHeaders,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, TransportError> {
        let url = self.url_for(path)?;
        debug!("POST {} ({:?})", url, options.encoding);

        let mut builder = self.prepare(self.client.post(url), params, headers)?;
        if let Some(payload) = body {
            builder = match options.encoding {
                RequestEncoding::Json => {
                    if !payload.files.is_empty() {
                        return Err(TransportError::InvalidRequest(
                            "file parts require multipart encoding".to_string(),
                        ));
                    }
                    builder.json(&payload.fields)
                }
                RequestEncoding::Multipart => builder.multipart(multipart_form(payload)?),
            };
        }

        self.send(builder, options).await
    }

    async fn delete(
        &self,
        path: &str,
        params: &Params,
        headers: &RequestHeaders,
        options: RequestOptions,
    ) -> Result<ResponseEnvelope, TransportError> {
        let url = self.url_for(path)?;
        debug!("DELETE {}", url);

        let builder = self.prepare(self.client.delete(url), params, headers)?;
        self.send(builder, options).await
    }
}

/// Parse the base URL, making sure relative paths append to it
fn normalize_base_url(base_url: &str) -> Result<Url, TransportError> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Text form of a parameter or multipart field
fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Flatten response headers, joining repeated names with `", "`
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut collected: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    collected
}

fn header_map(headers: &RequestHeaders) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| TransportError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| TransportError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

fn multipart_form(payload: &Payload) -> Result<Form, TransportError> {
    let mut form = Form::new();

    for (name, value) in &payload.fields {
        form = form.text(name.clone(), query_value(value));
    }

    for file in &payload.files {
        let part = Part::bytes(file.content.to_vec())
            .file_name(file.file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        form = form.part(file.field.clone(), part);
    }

    Ok(form)
}

fn decode_json(bytes: &Bytes) -> Result<Value, TransportError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|e| TransportError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transport_creation() {
        assert!(HttpTransport::new("http://localhost:8080").is_ok());
        assert!(HttpTransport::new("not a url").is_err());
    }

    #[test]
    fn test_url_for_appends_to_base_path() {
        let transport = HttpTransport::new("https://api.example.com/v1").unwrap();
        assert_eq!(
            transport.url_for("mdfes/42/xml").unwrap().as_str(),
            "https://api.example.com/v1/mdfes/42/xml"
        );
        assert_eq!(
            transport.url_for("/certificates").unwrap().as_str(),
            "https://api.example.com/v1/certificates"
        );
    }

    #[test]
    fn test_query_value() {
        assert_eq!(query_value(&json!("abc")), "abc");
        assert_eq!(query_value(&json!(10)), "10");
        assert_eq!(query_value(&json!(true)), "true");
        assert_eq!(query_value(&Value::Null), "");
        assert_eq!(query_value(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_invalid_header_rejected() {
        let headers = vec![("company-cnpj".to_string(), "bad\nvalue".to_string())];
        let err = header_map(&headers).unwrap_err();
        assert!(matches!(err, TransportError::InvalidHeader { .. }));
    }

    #[test]
    fn test_decode_json() {
        assert_eq!(decode_json(&Bytes::new()).unwrap(), Value::Null);
        assert_eq!(
            decode_json(&Bytes::from_static(b"{\"id\":1}")).unwrap(),
            json!({"id": 1})
        );
        assert!(matches!(
            decode_json(&Bytes::from_static(b"%PDF")),
            Err(TransportError::Decode(_))
        ));
    }

    #[test]
    fn test_collect_headers_keeps_repeated_and_opaque_values() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.insert(
            "content-disposition",
            HeaderValue::from_bytes("attachment; filename=\"manifesto-ç.pdf\"".as_bytes()).unwrap(),
        );

        let collected = collect_headers(&headers);
        assert_eq!(collected["set-cookie"], "a=1, b=2");
        assert_eq!(
            collected["content-disposition"],
            "attachment; filename=\"manifesto-ç.pdf\""
        );
    }
}
