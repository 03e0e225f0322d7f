//! In-memory `ApiClient` for driving the views without a server.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use virt_console::api::{ApiClient, ApiError};
use virt_console::models::{CommandReceipt, CreateVmRequest, Image, UploadImageRequest, Vm};
use virt_console::navigation::{MenuOption, Navigator};

#[derive(Default)]
struct State {
    images: Vec<Image>,
    vms: Vec<Vm>,
    calls: Vec<String>,
    failing: HashSet<&'static str>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_images(names: &[&str]) -> Arc<Self> {
        let api = Self::new();
        api.set_images(names);
        api
    }

    pub fn with_vms(names: &[&str]) -> Arc<Self> {
        let api = Self::new();
        api.set_vms(names);
        api
    }

    pub fn set_images(&self, names: &[&str]) {
        self.state.lock().unwrap().images = names.iter().map(|n| image(n)).collect();
    }

    pub fn set_vms(&self, names: &[&str]) {
        self.state.lock().unwrap().vms = names.iter().map(|n| vm(n)).collect();
    }

    pub fn image_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.images.iter().map(|i| i.name.clone()).collect()
    }

    pub fn vm_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.vms.iter().map(|v| v.name.clone()).collect()
    }

    /// Makes every later call of `operation` fail until `recover` is called.
    pub fn fail(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.remove(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_to(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(' ').next() == Some(operation))
            .count()
    }

    fn enter(&self, operation: &'static str, detail: &str) -> Result<std::sync::MutexGuard<'_, State>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{} {}", operation, detail).trim_end().to_string());
        if state.failing.contains(operation) {
            return Err(ApiError::Rejected {
                code: 500,
                message: format!("{} failed", operation),
            });
        }
        Ok(state)
    }
}

fn ok(message: &str) -> CommandReceipt {
    CommandReceipt {
        status_code: Some(200),
        message: Some(message.to_string()),
    }
}

fn not_found(name: &str) -> ApiError {
    ApiError::Rejected {
        code: 500,
        message: format!("{} not found", name),
    }
}

pub fn image(name: &str) -> Image {
    Image {
        name: name.to_string(),
        ..Default::default()
    }
}

pub fn vm(name: &str) -> Vm {
    let mut vm = Vm {
        name: name.to_string(),
        image: "ubuntu".to_string(),
        namespace: Some("default".to_string()),
        ..Default::default()
    };
    vm.extra
        .insert("Ready".to_string(), Value::String("Not Ready".to_string()));
    vm
}

#[async_trait]
impl ApiClient for FakeApi {
    async fn list_images(&self) -> Result<Vec<Image>, ApiError> {
        let state = self.enter("list_images", "")?;
        Ok(state.images.clone())
    }

    async fn upload_image(&self, request: &UploadImageRequest) -> Result<CommandReceipt, ApiError> {
        let mut state = self.enter("upload_image", &request.name)?;
        state.images.push(Image {
            name: request.name.clone(),
            file_path: request.file_path.clone(),
            size: request.size.clone(),
            upload_proxy_url: request.upload_proxy_url.clone(),
        });
        Ok(ok("uploaded"))
    }

    async fn rename_image(&self, name: &str, new_name: &str) -> Result<CommandReceipt, ApiError> {
        let mut state = self.enter("rename_image", &format!("{} {}", name, new_name))?;
        let image = state
            .images
            .iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| not_found(name))?;
        image.name = new_name.to_string();
        Ok(ok("renamed"))
    }

    async fn delete_image(&self, name: &str) -> Result<CommandReceipt, ApiError> {
        let mut state = self.enter("delete_image", name)?;
        let index = state
            .images
            .iter()
            .position(|i| i.name == name)
            .ok_or_else(|| not_found(name))?;
        state.images.remove(index);
        Ok(ok("deleted"))
    }

    async fn list_vms(&self) -> Result<Vec<Vm>, ApiError> {
        let state = self.enter("list_vms", "")?;
        Ok(state.vms.clone())
    }

    async fn get_vm(&self, name: &str) -> Result<Vm, ApiError> {
        let state = self.enter("get_vm", name)?;
        state
            .vms
            .iter()
            .find(|v| v.name == name)
            .cloned()
            .ok_or_else(|| not_found(name))
    }

    async fn create_vm(&self, request: &CreateVmRequest) -> Result<CommandReceipt, ApiError> {
        let mut state = self.enter("create_vm", &request.name)?;
        let mut created = vm(&request.name);
        created.image = request.image.clone();
        created.size = request.size;
        state.vms.push(created);
        Ok(ok("created"))
    }

    async fn rename_vm(&self, name: &str, new_name: &str) -> Result<CommandReceipt, ApiError> {
        let mut state = self.enter("rename_vm", &format!("{} {}", name, new_name))?;
        let vm = state
            .vms
            .iter_mut()
            .find(|v| v.name == name)
            .ok_or_else(|| not_found(name))?;
        vm.name = new_name.to_string();
        Ok(ok("renamed"))
    }

    async fn delete_vm(&self, name: &str) -> Result<CommandReceipt, ApiError> {
        let mut state = self.enter("delete_vm", name)?;
        let index = state
            .vms
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| not_found(name))?;
        state.vms.remove(index);
        Ok(ok("deleted"))
    }

    async fn start_vm(&self, name: &str) -> Result<CommandReceipt, ApiError> {
        let mut state = self.enter("start_vm", name)?;
        set_ready(&mut state.vms, name, "Ready")?;
        Ok(ok("started"))
    }

    async fn stop_vm(&self, name: &str) -> Result<CommandReceipt, ApiError> {
        let mut state = self.enter("stop_vm", name)?;
        set_ready(&mut state.vms, name, "Not Ready")?;
        Ok(ok("stopped"))
    }
}

fn set_ready(vms: &mut [Vm], name: &str, ready: &str) -> Result<(), ApiError> {
    let vm = vms
        .iter_mut()
        .find(|v| v.name == name)
        .ok_or_else(|| not_found(name))?;
    vm.extra
        .insert("Ready".to_string(), Value::String(ready.to_string()));
    Ok(())
}

/// Records every `set_active` call.
#[derive(Default)]
pub struct RecordingNavigator {
    seen: Mutex<Vec<MenuOption>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seen(&self) -> Vec<MenuOption> {
        self.seen.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn set_active(&self, option: MenuOption) {
        self.seen.lock().unwrap().push(option);
    }
}
