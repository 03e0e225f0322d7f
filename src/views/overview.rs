use super::{ErrorLog, Lifecycle, Mirror, Ticket, ViewError, ViewPhase};
use crate::api::{ApiClient, ApiError, ApiFuture};
use crate::models::{Image, Vm};
use crate::navigation::{MenuOption, Navigator};
use crate::{log_debug, log_info};
use std::sync::Arc;

/// Read-only dashboard over both collections. Each collection loads and
/// fails on its own.
pub struct OverviewView {
    client: Arc<dyn ApiClient>,
    navigator: Arc<dyn Navigator>,
    lifecycle: Lifecycle,
    images: Mirror<Image>,
    vms: Mirror<Vm>,
    errors: ErrorLog,
}

/// Outcome of loading the dashboard, one entry per collection.
#[derive(Debug)]
pub struct OverviewLoad {
    pub images: Result<usize, ViewError>,
    pub vms: Result<usize, ViewError>,
}

impl OverviewLoad {
    pub fn is_complete(&self) -> bool {
        self.images.is_ok() && self.vms.is_ok()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverviewSummary {
    pub images: usize,
    pub vms: usize,
    pub ready_vms: usize,
}

impl OverviewView {
    pub const MENU: MenuOption = MenuOption::Overview;

    pub fn new(client: Arc<dyn ApiClient>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            navigator,
            lifecycle: Lifecycle::default(),
            images: Mirror::default(),
            vms: Mirror::default(),
            errors: ErrorLog::default(),
        }
    }

    pub fn with_error_capacity(mut self, capacity: usize) -> Self {
        self.errors = ErrorLog::with_capacity(capacity);
        self
    }

    pub fn activate(&mut self) -> Ticket {
        self.navigator.set_active(Self::MENU);
        let ticket = self.lifecycle.mount();
        self.images.begin_loading();
        self.vms.begin_loading();
        ticket
    }

    pub fn deactivate(&mut self) {
        self.lifecycle.unmount();
        self.images.unmount();
        self.vms.unmount();
    }

    pub fn begin_refresh(&mut self) -> Ticket {
        if self.lifecycle.is_mounted() {
            self.images.begin_loading();
            self.vms.begin_loading();
        }
        self.lifecycle.issue()
    }

    pub fn fetch_images(&self) -> ApiFuture<Vec<Image>> {
        let client = Arc::clone(&self.client);
        Box::pin(async move { client.list_images().await })
    }

    pub fn fetch_vms(&self) -> ApiFuture<Vec<Vm>> {
        let client = Arc::clone(&self.client);
        Box::pin(async move { client.list_vms().await })
    }

    pub fn apply_images(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Image>, ApiError>,
    ) -> Result<usize, ViewError> {
        if !self.lifecycle.accepts(ticket) {
            log_debug!("Dropping overview image list for a view that was left");
            return Err(ViewError::Detached);
        }
        self.images.apply(ticket, "list images", result, &mut self.errors)
    }

    pub fn apply_vms(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Vm>, ApiError>,
    ) -> Result<usize, ViewError> {
        if !self.lifecycle.accepts(ticket) {
            log_debug!("Dropping overview VM list for a view that was left");
            return Err(ViewError::Detached);
        }
        self.vms.apply(ticket, "list VMs", result, &mut self.errors)
    }

    pub async fn mount(&mut self) -> OverviewLoad {
        let ticket = self.activate();
        self.load(ticket).await
    }

    pub async fn refresh(&mut self) -> OverviewLoad {
        let ticket = self.begin_refresh();
        self.load(ticket).await
    }

    async fn load(&mut self, ticket: Ticket) -> OverviewLoad {
        let (images, vms) = tokio::join!(self.fetch_images(), self.fetch_vms());
        let load = OverviewLoad {
            images: self.apply_images(ticket, images),
            vms: self.apply_vms(ticket, vms),
        };
        if load.is_complete() {
            let summary = self.summary();
            log_info!(
                "Overview loaded: {} images, {} VMs ({} ready)",
                summary.images,
                summary.vms,
                summary.ready_vms
            );
        }
        load
    }

    pub fn images(&self) -> &[Image] {
        self.images.items()
    }

    pub fn vms(&self) -> &[Vm] {
        self.vms.items()
    }

    pub fn images_phase(&self) -> ViewPhase {
        self.images.phase()
    }

    pub fn vms_phase(&self) -> ViewPhase {
        self.vms.phase()
    }

    /// Loading while either collection is in flight, otherwise the furthest
    /// state either collection reached.
    pub fn phase(&self) -> ViewPhase {
        match (self.images.phase(), self.vms.phase()) {
            (ViewPhase::Loading, _) | (_, ViewPhase::Loading) => ViewPhase::Loading,
            (ViewPhase::Unmounted, ViewPhase::Unmounted) => ViewPhase::Unmounted,
            _ => ViewPhase::Ready,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    pub fn summary(&self) -> OverviewSummary {
        OverviewSummary {
            images: self.images.items().len(),
            vms: self.vms.items().len(),
            ready_vms: self.vms.items().iter().filter(|vm| vm.is_ready()).count(),
        }
    }
}
