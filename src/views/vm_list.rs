use super::{DeleteSelection, ErrorLog, Lifecycle, Mirror, Mutation, Ticket, ViewError, ViewPhase, name_at};
use crate::api::{ApiClient, ApiError, ApiFuture};
use crate::models::{CreateVmRequest, Vm};
use crate::navigation::{MenuOption, Navigator};
use crate::{log_debug, log_info};
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateVmForm {
    pub name: String,
    pub image: String,
    pub size: i64,
}

impl CreateVmForm {
    pub fn to_request(&self) -> CreateVmRequest {
        CreateVmRequest {
            name: self.name.clone(),
            image: self.image.clone(),
            size: self.size,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PowerAction {
    Start,
    Stop,
}

impl PowerAction {
    fn label(self) -> &'static str {
        match self {
            PowerAction::Start => "start VM",
            PowerAction::Stop => "stop VM",
        }
    }
}

pub struct VmListView {
    client: Arc<dyn ApiClient>,
    navigator: Arc<dyn Navigator>,
    lifecycle: Lifecycle,
    vms: Mirror<Vm>,
    selection: DeleteSelection,
    errors: ErrorLog,
    pub form: CreateVmForm,
}

impl VmListView {
    pub const MENU: MenuOption = MenuOption::VirtualMachines;

    pub fn new(client: Arc<dyn ApiClient>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            navigator,
            lifecycle: Lifecycle::default(),
            vms: Mirror::default(),
            selection: DeleteSelection::default(),
            errors: ErrorLog::default(),
            form: CreateVmForm::default(),
        }
    }

    pub fn with_error_capacity(mut self, capacity: usize) -> Self {
        self.errors = ErrorLog::with_capacity(capacity);
        self
    }

    pub fn activate(&mut self) -> Ticket {
        self.navigator.set_active(Self::MENU);
        let ticket = self.lifecycle.mount();
        self.vms.begin_loading();
        ticket
    }

    pub fn deactivate(&mut self) {
        self.lifecycle.unmount();
        self.vms.unmount();
    }

    pub fn begin_refresh(&mut self) -> Ticket {
        if self.lifecycle.is_mounted() {
            self.vms.begin_loading();
        }
        self.lifecycle.issue()
    }

    pub fn fetch_vms(&self) -> ApiFuture<Vec<Vm>> {
        let client = Arc::clone(&self.client);
        Box::pin(async move { client.list_vms().await })
    }

    pub fn apply_vms(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Vm>, ApiError>,
    ) -> Result<usize, ViewError> {
        if !self.lifecycle.accepts(ticket) {
            log_debug!("Dropping VM list for a VM view that was left");
            return Err(ViewError::Detached);
        }
        self.vms.apply(ticket, "list VMs", result, &mut self.errors)
    }

    pub async fn mount(&mut self) -> Result<usize, ViewError> {
        let ticket = self.activate();
        let result = self.fetch_vms().await;
        self.apply_vms(ticket, result)
    }

    pub async fn refresh(&mut self) -> Result<usize, ViewError> {
        let ticket = self.begin_refresh();
        let result = self.fetch_vms().await;
        self.apply_vms(ticket, result)
    }

    pub fn vms(&self) -> &[Vm] {
        self.vms.items()
    }

    pub fn phase(&self) -> ViewPhase {
        self.vms.phase()
    }

    pub fn generation(&self) -> u64 {
        self.vms.generation()
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
            .select(self.vms.items(), index, self.vms.generation())
    }

    pub async fn create(&mut self) -> Result<Mutation, ViewError> {
        let request = self.form.to_request();
        log_info!(
            "Creating VM '{}' from image '{}' (size {})",
            request.name,
            request.image,
            request.size
        );

        let result = self.client.create_vm(&request).await;
        let receipt = self.errors.check("create VM", result)?;
        let refreshed = self.resync().await;

        Ok(Mutation {
            target: request.name,
            receipt,
            refreshed,
            stale_selection: false,
        })
    }

    pub async fn delete_selected(&mut self) -> Result<Mutation, ViewError> {
        let confirmed = self.selection.confirm(self.vms.generation())?;
        log_info!("Deleting VM '{}'", confirmed.name);

        let result = self.client.delete_vm(&confirmed.name).await;
        let receipt = self.errors.check("delete VM", result)?;
        let refreshed = self.resync().await;

        Ok(Mutation {
            target: confirmed.name,
            receipt,
            refreshed,
            stale_selection: confirmed.stale,
        })
    }

    pub async fn rename(&mut self, index: usize, new_name: &str) -> Result<Mutation, ViewError> {
        let name = name_at(self.vms.items(), index)?;
        log_info!("Renaming VM '{}' to '{}'", name, new_name);

        let result = self.client.rename_vm(&name, new_name).await;
        let receipt = self.errors.check("rename VM", result)?;
        let refreshed = self.resync().await;

        Ok(Mutation {
            target: name,
            receipt,
            refreshed,
            stale_selection: false,
        })
    }

    /// Powers on the VM shown at `index`. The list is not refetched, so its
    /// status column stays as it was until the next refresh.
    pub async fn start(&mut self, index: usize) -> Result<Mutation, ViewError> {
        self.power(index, PowerAction::Start).await
    }

    /// Counterpart of `start`; same staleness.
    pub async fn stop(&mut self, index: usize) -> Result<Mutation, ViewError> {
        self.power(index, PowerAction::Stop).await
    }

    async fn power(&mut self, index: usize, action: PowerAction) -> Result<Mutation, ViewError> {
        let name = name_at(self.vms.items(), index)?;
        log_info!("Requesting {} for '{}'", action.label(), name);

        let result = match action {
            PowerAction::Start => self.client.start_vm(&name).await,
            PowerAction::Stop => self.client.stop_vm(&name).await,
        };
        let receipt = self.errors.check(action.label(), result)?;
        self.vms.mark_stale();

        Ok(Mutation {
            target: name,
            receipt,
            refreshed: false,
            stale_selection: false,
        })
    }

    async fn resync(&mut self) -> bool {
        self.form.clear();
        self.selection.clear();
        self.refresh().await.is_ok()
    }
}
