use super::{ErrorLog, Lifecycle, Ticket, ViewError, ViewPhase};
use crate::api::{ApiClient, ApiError, ApiFuture};
use crate::log_debug;
use crate::models::Vm;
use crate::navigation::{MenuOption, Navigator};
use serde_json::Value;
use std::sync::Arc;

/// Single VM looked up by the name it was opened with.
pub struct VmDetailView {
    client: Arc<dyn ApiClient>,
    navigator: Arc<dyn Navigator>,
    name: String,
    lifecycle: Lifecycle,
    phase: ViewPhase,
    resume: ViewPhase,
    newest: u64,
    vm: Option<Vm>,
    errors: ErrorLog,
}

impl VmDetailView {
    pub const MENU: MenuOption = MenuOption::VirtualMachines;

    pub fn new(
        client: Arc<dyn ApiClient>,
        navigator: Arc<dyn Navigator>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            navigator,
            name: name.into(),
            lifecycle: Lifecycle::default(),
            phase: ViewPhase::Unmounted,
            resume: ViewPhase::Unmounted,
            newest: 0,
            vm: None,
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
        self.begin_loading();
        ticket
    }

    pub fn deactivate(&mut self) {
        self.lifecycle.unmount();
        self.phase = ViewPhase::Unmounted;
        self.resume = ViewPhase::Unmounted;
    }

    pub fn begin_refresh(&mut self) -> Ticket {
        if self.lifecycle.is_mounted() {
            self.begin_loading();
        }
        self.lifecycle.issue()
    }

    fn begin_loading(&mut self) {
        if self.phase != ViewPhase::Loading {
            self.resume = self.phase;
        }
        self.phase = ViewPhase::Loading;
    }

    pub fn fetch_vm(&self) -> ApiFuture<Vm> {
        let client = Arc::clone(&self.client);
        let name = self.name.clone();
        Box::pin(async move { client.get_vm(&name).await })
    }

    pub fn apply_vm(&mut self, ticket: Ticket, result: Result<Vm, ApiError>) -> Result<(), ViewError> {
        if !self.lifecycle.accepts(ticket) {
            log_debug!("Dropping details of '{}' for a view that was left", self.name);
            return Err(ViewError::Detached);
        }
        if ticket.seq < self.newest {
            log_debug!("Dropping older details of '{}'", self.name);
            return Err(ViewError::Superseded);
        }
        self.newest = ticket.seq;
        match self.errors.check("get VM", result) {
            Ok(vm) => {
                self.vm = Some(vm);
                self.phase = ViewPhase::Ready;
                Ok(())
            }
            Err(err) => {
                self.phase = self.resume;
                Err(err)
            }
        }
    }

    pub async fn mount(&mut self) -> Result<(), ViewError> {
        let ticket = self.activate();
        let result = self.fetch_vm().await;
        self.apply_vm(ticket, result)
    }

    pub async fn refresh(&mut self) -> Result<(), ViewError> {
        let ticket = self.begin_refresh();
        let result = self.fetch_vm().await;
        self.apply_vm(ticket, result)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vm(&self) -> Option<&Vm> {
        self.vm.as_ref()
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.is_mounted()
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Label/value rows in display order: the fixed fields first, then any
    /// extra fields in the order the server sent them. `YAML` and `Log` are
    /// left to `vm()` since they are multi-line.
    pub fn attributes(&self) -> Vec<(String, String)> {
        let Some(vm) = &self.vm else {
            return Vec::new();
        };

        let mut rows = vec![
            ("Name".to_string(), vm.name.clone()),
            ("Image".to_string(), vm.image.clone()),
            ("Size".to_string(), vm.size.to_string()),
        ];
        if let Some(namespace) = &vm.namespace {
            rows.push(("Namespace".to_string(), namespace.clone()));
        }
        if let Some(status) = &vm.status {
            rows.push(("Status".to_string(), status.clone()));
        }
        for (key, value) in &vm.extra {
            let rendered = match value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            rows.push((key.clone(), rendered));
        }
        rows
    }
}
