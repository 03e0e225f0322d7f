use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Anything a list view can select by row and address by name.
pub trait Named {
    fn name(&self) -> &str;
}

/// A disk image as listed by `GET /v1/images/`. The server usually fills in
/// only `Name`; the remaining fields mirror the upload payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Image {
    pub name: String,
    #[serde(default)]
    pub file_path: String,
    /// Storage quantity such as `10Gi`, passed through untouched
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub upload_proxy_url: String,
}

impl Named for Image {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vm {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, rename = "YAML", skip_serializing_if = "Option::is_none")]
    pub yaml: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    /// Server-defined fields this client has no dedicated slot for
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Vm {
    /// `Status` from the detail endpoint, or the `Ready` column the list
    /// endpoint reports instead.
    pub fn status_label(&self) -> Option<&str> {
        self.status
            .as_deref()
            .or_else(|| self.extra.get("Ready").and_then(Value::as_str))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status_label(), Some("Ready") | Some("Running"))
    }
}

impl Named for Vm {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadImageRequest {
    pub name: String,
    pub file_path: String,
    pub size: String,
    pub upload_proxy_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateVmRequest {
    pub name: String,
    pub image: String,
    pub size: i64,
}

/// Body of the start and stop endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VmNameRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenameRequest {
    pub new_name: String,
}

/// What a mutating endpoint answered. Both fields are absent when the body
/// was empty or not JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommandReceipt {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ImageListEnvelope {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    /// `null` when the server has no images
    #[serde(default)]
    pub images: Option<Vec<Image>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct VmListEnvelope {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "VMs")]
    pub vms: Option<Vec<Vm>>,
}
