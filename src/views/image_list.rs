use super::{DeleteSelection, ErrorLog, Lifecycle, Mirror, Mutation, Ticket, ViewError, ViewPhase, name_at};
use crate::api::{ApiClient, ApiError, ApiFuture};
use crate::models::{Image, UploadImageRequest};
use crate::navigation::{MenuOption, Navigator};
use crate::{log_debug, log_info};
use std::sync::Arc;

/// Upload form fields. Forwarded as typed, without validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadForm {
    pub name: String,
    pub file_path: String,
    pub size: String,
    pub upload_proxy_url: String,
}

impl UploadForm {
    pub fn to_request(&self) -> UploadImageRequest {
        UploadImageRequest {
            name: self.name.clone(),
            file_path: self.file_path.clone(),
            size: self.size.clone(),
            upload_proxy_url: self.upload_proxy_url.clone(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub struct ImageListView {
    client: Arc<dyn ApiClient>,
    navigator: Arc<dyn Navigator>,
    lifecycle: Lifecycle,
    images: Mirror<Image>,
    selection: DeleteSelection,
    errors: ErrorLog,
    pub form: UploadForm,
}

impl ImageListView {
    pub const MENU: MenuOption = MenuOption::Images;

    pub fn new(client: Arc<dyn ApiClient>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            navigator,
            lifecycle: Lifecycle::default(),
            images: Mirror::default(),
            selection: DeleteSelection::default(),
            errors: ErrorLog::default(),
            form: UploadForm::default(),
        }
    }

    pub fn with_error_capacity(mut self, capacity: usize) -> Self {
        self.errors = ErrorLog::with_capacity(capacity);
        self
    }

    /// Highlights the Images menu entry and starts a new mount. The caller
    /// follows up with `fetch_images` and hands the result to `apply_images`.
    pub fn activate(&mut self) -> Ticket {
        self.navigator.set_active(Self::MENU);
        let ticket = self.lifecycle.mount();
        self.images.begin_loading();
        ticket
    }

    pub fn deactivate(&mut self) {
        self.lifecycle.unmount();
        self.images.unmount();
    }

    /// Marks a refetch as in flight under the current mount.
    pub fn begin_refresh(&mut self) -> Ticket {
        if self.lifecycle.is_mounted() {
            self.images.begin_loading();
        }
        self.lifecycle.issue()
    }

    pub fn fetch_images(&self) -> ApiFuture<Vec<Image>> {
        let client = Arc::clone(&self.client);
        Box::pin(async move { client.list_images().await })
    }

    pub fn apply_images(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Image>, ApiError>,
    ) -> Result<usize, ViewError> {
        if !self.lifecycle.accepts(ticket) {
            log_debug!("Dropping image list for an image view that was left");
            return Err(ViewError::Detached);
        }
        let count = self.images.apply(ticket, "list images", result, &mut self.errors)?;
        log_debug!("Image list holds {} entries", count);
        Ok(count)
    }

    pub async fn mount(&mut self) -> Result<usize, ViewError> {
        let ticket = self.activate();
        let result = self.fetch_images().await;
        self.apply_images(ticket, result)
    }

    pub async fn refresh(&mut self) -> Result<usize, ViewError> {
        let ticket = self.begin_refresh();
        let result = self.fetch_images().await;
        self.apply_images(ticket, result)
    }

    pub fn images(&self) -> &[Image] {
        self.images.items()
    }

    pub fn phase(&self) -> ViewPhase {
        self.images.phase()
    }

    pub fn generation(&self) -> u64 {
        self.images.generation()
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    pub fn selected_for_delete(&self) -> Option<&str> {
        self.selection.target()
    }

    pub fn select_for_delete(&mut self, index: usize) -> Result<&str, ViewError> {
        self.selection
            .select(self.images.items(), index, self.images.generation())
    }

    pub async fn upload(&mut self) -> Result<Mutation, ViewError> {
        let request = self.form.to_request();
        log_info!("Uploading image '{}' from '{}'", request.name, request.file_path);

        let result = self.client.upload_image(&request).await;
        let receipt = self.errors.check("upload image", result)?;
        let refreshed = self.resync().await;

        Ok(Mutation {
            target: request.name,
            receipt,
            refreshed,
            stale_selection: false,
        })
    }

    pub async fn delete_selected(&mut self) -> Result<Mutation, ViewError> {
        let confirmed = self.selection.confirm(self.images.generation())?;
        log_info!("Deleting image '{}'", confirmed.name);

        let result = self.client.delete_image(&confirmed.name).await;
        let receipt = self.errors.check("delete image", result)?;
        let refreshed = self.resync().await;

        Ok(Mutation {
            target: confirmed.name,
            receipt,
            refreshed,
            stale_selection: confirmed.stale,
        })
    }

    pub async fn rename(&mut self, index: usize, new_name: &str) -> Result<Mutation, ViewError> {
        let name = name_at(self.images.items(), index)?;
        log_info!("Renaming image '{}' to '{}'", name, new_name);

        let result = self.client.rename_image(&name, new_name).await;
        let receipt = self.errors.check("rename image", result)?;
        let refreshed = self.resync().await;

        Ok(Mutation {
            target: name,
            receipt,
            refreshed,
            stale_selection: false,
        })
    }

    /// Drops transient input and refetches after a successful mutation.
    async fn resync(&mut self) -> bool {
        self.form.clear();
        self.selection.clear();
        self.refresh().await.is_ok()
    }
}
