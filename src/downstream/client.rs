//! HTTP client for the product service.
//!
//! # Responsibilities
//! - Build the outbound request for each product operation
//! - Forward the inbound request ID
//! - Turn non-2xx answers into [`ClientError::Status`] with the body text
//! - Decode responses into [`Product`]s

use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method, RequestBuilder, Response};
use url::Url;

use crate::downstream::decode::{self, ProductStream};
use crate::downstream::error::{ClientError, ClientResult};
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;
use crate::products::Product;

/// A file forwarded to the product service's upload endpoint.
#[derive(Debug)]
pub struct UploadFile {
    /// Filename as sent by the client.
    pub filename: String,
    /// Content type of the inbound part, if any.
    pub content_type: Option<String>,
    /// Streamed file contents.
    pub content: Body,
}

/// Client for the product service.
///
/// Cheap to clone: clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ProductClient {
    http: reqwest::Client,
    base_url: Url,
    request_id: Option<HeaderValue>,
}

impl ProductClient {
    /// Create a client for the product collection at `base_url`.
    pub fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            request_id: None,
        }
    }

    /// Copy of this client that tags every call with the given request ID.
    pub fn with_request_id(&self, request_id: Option<HeaderValue>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            request_id,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Stream every product.
    ///
    /// Resolves once the response status is known; products are decoded
    /// while the body arrives.
    pub async fn list(&self) -> ClientResult<ProductStream> {
        let builder = self.request(Method::GET, self.base_url.clone());
        let response = self.send("list", builder).await?;
        Ok(decode::product_stream(response.bytes_stream()))
    }

    /// Fetch one product. An empty 2xx body means no product.
    pub async fn get(&self, id: &str) -> ClientResult<Option<Product>> {
        let builder = self.request(Method::GET, self.url_for(&[id]));
        let response = self.send("get", builder).await?;

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&body)?))
    }

    pub async fn create(&self, product: &Product) -> ClientResult<Product> {
        let builder = self
            .request(Method::POST, self.base_url.clone())
            .json(product);
        let response = self.send("create", builder).await?;
        read_product(response).await
    }

    pub async fn update(&self, id: &str, product: &Product) -> ClientResult<Product> {
        let builder = self.request(Method::PUT, self.url_for(&[id])).json(product);
        let response = self.send("update", builder).await?;
        read_product(response).await
    }

    /// Delete one product. Any response body is ignored.
    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, self.url_for(&[id]));
        self.send("delete", builder).await?;
        Ok(())
    }

    /// Send a file as the `file` part of a multipart request.
    ///
    /// The part body is streamed; nothing here buffers the whole file.
    pub async fn upload(&self, id: &str, file: UploadFile) -> ClientResult<Product> {
        let mut part = Part::stream(file.content).file_name(file.filename);
        if let Some(content_type) = file.content_type {
            part = part.mime_str(&content_type)?;
        }
        let form = Form::new().part("file", part);

        let builder = self
            .request(Method::POST, self.url_for(&["upload", id]))
            .multipart(form);
        let response = self.send("upload", builder).await?;
        read_product(response).await
    }

    /// `base_url` with `segments` appended, each percent-encoded.
    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        match &self.request_id {
            Some(id) => builder.header(X_REQUEST_ID, id.clone()),
            None => builder,
        }
    }

    async fn send(&self, operation: &'static str, builder: RequestBuilder) -> ClientResult<Response> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().to_string();

        tracing::debug!(operation, method = %method, url = %url, "Calling product service");

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let err = ClientError::from(e);
                metrics::record_downstream(operation, err.outcome());
                return Err(err);
            }
        };

        let status = response.status();
        tracing::debug!(operation, status = %status, "Product service answered");

        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(operation, status = %status, error = %e, "Could not read error body");
                    String::new()
                }
            };
            let err = ClientError::Status {
                status,
                method,
                url,
                body,
            };
            metrics::record_downstream(operation, err.outcome());
            return Err(err);
        }

        metrics::record_downstream(operation, "success");
        Ok(response)
    }
}

async fn read_product(response: Response) -> ClientResult<Product> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
