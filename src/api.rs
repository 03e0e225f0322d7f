//! Typed client for the image and VM management API.
//!
//! Every call resolves to `Result<_, ApiError>`; nothing is retried and no
//! timeout is applied unless the configuration asks for one.
//!
//! ```no_run
//! use virt_console::api::{ApiClient, HttpApiClient};
//!
//! # async fn example() -> Result<(), virt_console::api::ApiError> {
//! let client = HttpApiClient::new("http://127.0.0.1:8080")?;
//! for image in client.list_images().await? {
//!     println!("{}", image.name);
//! }
//! # Ok(())
//! # }
//! ```

use crate::config::ApiConfig;
use crate::log_debug;
use crate::models::{
    CommandReceipt, CreateVmRequest, Image, ImageListEnvelope, RenameRequest, UploadImageRequest,
    Vm, VmListEnvelope, VmNameRequest,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Server-side success code carried inside JSON envelopes.
const ENVELOPE_OK: u16 = 200;

/// A detached, owned API call that can be handed to an executor.
pub type ApiFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'static>>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("API URL '{0}' cannot carry a path")]
    CannotBeABase(String),
    #[error("Server responded with {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Request rejected ({code}): {message}")]
    Rejected { code: u16, message: String },
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// True when the request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Http(_))
    }
}

/// The REST endpoints the views talk to.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// `GET /v1/images/`
    async fn list_images(&self) -> Result<Vec<Image>, ApiError>;
    /// `POST /v1/images/`
    async fn upload_image(&self, request: &UploadImageRequest) -> Result<CommandReceipt, ApiError>;
    /// `PUT /v1/images/{name}`
    async fn rename_image(&self, name: &str, new_name: &str) -> Result<CommandReceipt, ApiError>;
    /// `DELETE /v1/images/{name}`
    async fn delete_image(&self, name: &str) -> Result<CommandReceipt, ApiError>;

    /// `GET /v1/vms/`
    async fn list_vms(&self) -> Result<Vec<Vm>, ApiError>;
    /// `GET /v1/vms/{name}`
    async fn get_vm(&self, name: &str) -> Result<Vm, ApiError>;
    /// `POST /v1/vms/`
    async fn create_vm(&self, request: &CreateVmRequest) -> Result<CommandReceipt, ApiError>;
    /// `PUT /v1/vms/{name}`
    async fn rename_vm(&self, name: &str, new_name: &str) -> Result<CommandReceipt, ApiError>;
    /// `DELETE /v1/vms/{name}`
    async fn delete_vm(&self, name: &str) -> Result<CommandReceipt, ApiError>;
    /// `POST /v1/vms/start/`
    async fn start_vm(&self, name: &str) -> Result<CommandReceipt, ApiError>;
    /// `POST /v1/vms/stop/`
    async fn stop_vm(&self, name: &str) -> Result<CommandReceipt, ApiError>;
}

/// `ApiClient` over HTTP with reqwest. Cheap to share behind an `Arc`.
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
}

impl HttpApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::CannotBeABase(base_url.to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::with_timeout(&config.base_url, config.timeout_secs.map(Duration::from_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base path. Each segment is percent-encoded,
    /// so names containing `/` or spaces stay a single path segment. A
    /// trailing `""` keeps the trailing slash collection endpoints expect.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ApiError::CannotBeABase(self.base_url.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send_get(&self, url: Url) -> Result<Response, ApiError> {
        log_debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }

    async fn send_delete(&self, url: Url) -> Result<Response, ApiError> {
        log_debug!("DELETE {}", url);
        Ok(self.client.delete(url).send().await?)
    }

    async fn send_json<B: serde::Serialize + Sync>(
        &self,
        method: reqwest::Method,
        url: Url,
        body: &B,
    ) -> Result<Response, ApiError> {
        log_debug!("{} {}", method, url);
        Ok(self.client.request(method, url).json(body).send().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

fn check_envelope(status_code: Option<u16>, message: Option<&str>) -> Result<(), ApiError> {
    match status_code {
        Some(code) if code != ENVELOPE_OK => Err(ApiError::Rejected {
            code,
            message: message.unwrap_or_default().to_string(),
        }),
        _ => Ok(()),
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

async fn read_receipt(response: Response) -> Result<CommandReceipt, ApiError> {
    let response = ensure_success(response).await?;
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(CommandReceipt::default());
    }

    let receipt: CommandReceipt = serde_json::from_str(&body).unwrap_or_default();
    check_envelope(receipt.status_code, receipt.message.as_deref())?;
    Ok(receipt)
}

/// Accepts either a bare VM object or `{StatusCode, Message, VM}`.
fn unwrap_vm(value: Value) -> Result<Vm, ApiError> {
    if let Some(code) = value.get("StatusCode").and_then(Value::as_u64) {
        let code = u16::try_from(code).unwrap_or(u16::MAX);
        check_envelope(Some(code), value.get("Message").and_then(Value::as_str))?;
    }

    let vm = match value {
        Value::Object(mut envelope) if envelope.get("VM").is_some_and(Value::is_object) => {
            envelope.remove("VM").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(vm)?)
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn list_images(&self) -> Result<Vec<Image>, ApiError> {
        let url = self.endpoint(&["v1", "images", ""])?;
        let envelope: ImageListEnvelope = read_json(self.send_get(url).await?).await?;
        check_envelope(envelope.status_code, envelope.message.as_deref())?;
        Ok(envelope.images.unwrap_or_default())
    }

    async fn upload_image(&self, request: &UploadImageRequest) -> Result<CommandReceipt, ApiError> {
        let url = self.endpoint(&["v1", "images", ""])?;
        read_receipt(self.send_json(reqwest::Method::POST, url, request).await?).await
    }

    async fn rename_image(&self, name: &str, new_name: &str) -> Result<CommandReceipt, ApiError> {
        let url = self.endpoint(&["v1", "images", name])?;
        let body = RenameRequest {
            new_name: new_name.to_string(),
        };
        read_receipt(self.send_json(reqwest::Method::PUT, url, &body).await?).await
    }

    async fn delete_image(&self, name: &str) -> Result<CommandReceipt, ApiError> {
        let url = self.endpoint(&["v1", "images", name])?;
        read_receipt(self.send_delete(url).await?).await
    }

    async fn list_vms(&self) -> Result<Vec<Vm>, ApiError> {
        let url = self.endpoint(&["v1", "vms", ""])?;
        let envelope: VmListEnvelope = read_json(self.send_get(url).await?).await?;
        check_envelope(envelope.status_code, envelope.message.as_deref())?;
        Ok(envelope.vms.unwrap_or_default())
    }

    async fn get_vm(&self, name: &str) -> Result<Vm, ApiError> {
        let url = self.endpoint(&["v1", "vms", name])?;
        let value: Value = read_json(self.send_get(url).await?).await?;
        unwrap_vm(value)
    }

    async fn create_vm(&self, request: &CreateVmRequest) -> Result<CommandReceipt, ApiError> {
        let url = self.endpoint(&["v1", "vms", ""])?;
        read_receipt(self.send_json(reqwest::Method::POST, url, request).await?).await
    }

    async fn rename_vm(&self, name: &str, new_name: &str) -> Result<CommandReceipt, ApiError> {
        let url = self.endpoint(&["v1", "vms", name])?;
        let body = RenameRequest {
            new_name: new_name.to_string(),
        };
        read_receipt(self.send_json(reqwest::Method::PUT, url, &body).await?).await
    }

    async fn delete_vm(&self, name: &str) -> Result<CommandReceipt, ApiError> {
        let url = self.endpoint(&["v1", "vms", name])?;
        read_receipt(self.send_delete(url).await?).await
    }

    async fn start_vm(&self, name: &str) -> Result<CommandReceipt, ApiError> {
        let url = self.endpoint(&["v1", "vms", "start", ""])?;
        let body = VmNameRequest {
            name: name.to_string(),
        };
        read_receipt(self.send_json(reqwest::Method::POST, url, &body).await?).await
    }

    async fn stop_vm(&self, name: &str) -> Result<CommandReceipt, ApiError> {
        let url = self.endpoint(&["v1", "vms", "stop", ""])?;
        let body = VmNameRequest {
            name: name.to_string(),
        };
        read_receipt(self.send_json(reqwest::Method::POST, url, &body).await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn collection_endpoints_keep_trailing_slash() {
        let client = HttpApiClient::new("http://127.0.0.1:8080").unwrap();
        let url = client.endpoint(&["v1", "images", ""]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/v1/images/");

        let url = client.endpoint(&["v1", "vms", "start", ""]).unwrap();
        assert_eq!(url.path(), "/v1/vms/start/");
    }

    #[test]
    fn names_are_percent_encoded_as_one_segment() {
        let client = HttpApiClient::new("http://localhost:8080").unwrap();
        let url = client.endpoint(&["v1", "vms", "my vm/2"]).unwrap();
        assert_eq!(url.path(), "/v1/vms/my%20vm%2F2");
    }

    #[test]
    fn base_path_prefix_is_preserved() {
        let client = HttpApiClient::new("https://gateway.lab/console/").unwrap();
        let url = client.endpoint(&["v1", "images", "cirros"]).unwrap();
        assert_eq!(url.as_str(), "https://gateway.lab/console/v1/images/cirros");
    }

    #[test]
    fn base_url_is_normalized() {
        let client = HttpApiClient::new("  http://localhost:8080 ").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn rejects_urls_without_a_path() {
        assert!(matches!(
            HttpApiClient::new("mailto:ops@example.com"),
            Err(ApiError::CannotBeABase(_))
        ));
        assert!(matches!(HttpApiClient::new("::"), Err(ApiError::Url(_))));
    }

    #[test]
    fn envelope_codes_other_than_200_are_rejections() {
        assert!(check_envelope(None, None).is_ok());
        assert!(check_envelope(Some(200), Some("ok")).is_ok());
        match check_envelope(Some(500), Some("Failed to delete web.")) {
            Err(ApiError::Rejected { code, message }) => {
                assert_eq!(code, 500);
                assert_eq!(message, "Failed to delete web.");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn vm_detail_accepts_envelope_or_bare_object() {
        let wrapped = unwrap_vm(json!({
            "StatusCode": 200,
            "Message": "1 get success.",
            "VM": {"Name": "1", "Image": "image1", "Size": 0, "Status": "Running"}
        }))
        .unwrap();
        assert_eq!(wrapped.name, "1");
        assert_eq!(wrapped.status.as_deref(), Some("Running"));

        let bare = unwrap_vm(json!({"Name": "db", "Image": "fedora", "Size": 1})).unwrap();
        assert_eq!(bare.image, "fedora");

        assert!(matches!(
            unwrap_vm(json!({"StatusCode": 500, "Message": "Failed to get x."})),
            Err(ApiError::Rejected { code: 500, .. })
        ));
    }
}
