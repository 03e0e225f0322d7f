use eframe::egui;
use virt_console::{
    ApiClient, ApiError, ConsoleConfig, HttpApiClient, ImageListView, MenuOption, Mutation,
    NavigationState, OverviewView, ViewError, ViewPhase, VmDetailView, VmListView, log_error,
    log_info, logger,
    api::ApiFuture,
    models::{Image, Vm},
    theme,
    views::{ErrorLog, Ticket},
};

use chrono::Local;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use tokio::runtime::Runtime;

const MAX_EVENT_LINES: usize = 200;

fn main() -> Result<(), eframe::Error> {
    logger::init_logger();

    let config = match ConsoleConfig::load(None).and_then(|config| config.with_env_override()) {
        Ok(config) => config,
        Err(e) => {
            log_error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let client = match HttpApiClient::from_config(&config.api) {
        Ok(client) => client,
        Err(e) => {
            log_error!("Invalid API URL '{}': {}", config.api.base_url, e);
            std::process::exit(1);
        }
    };

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            log_error!("Failed to initialize Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([760.0, 520.0])
            .with_title("Virt Console"),
        ..Default::default()
    };

    let api_url = client.base_url().to_string();
    let client: Arc<dyn ApiClient> = Arc::new(client);

    log_info!("Starting Virt Console against {}", api_url);
    eframe::run_native(
        "Virt Console",
        options,
        Box::new(move |cc| Box::new(ConsoleApp::new(cc, runtime, client, api_url, config))),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Overview,
    Images,
    Vms,
    VmDetail,
}

impl From<MenuOption> for Screen {
    fn from(option: MenuOption) -> Self {
        match option {
            MenuOption::Overview => Screen::Overview,
            MenuOption::Images => Screen::Images,
            MenuOption::VirtualMachines => Screen::Vms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Images,
    Vms,
}

/// Fetch results coming back from the runtime.
enum Completion {
    Images(Ticket, Result<Vec<Image>, ApiError>),
    Vms(Ticket, Result<Vec<Vm>, ApiError>),
    OverviewImages(Ticket, Result<Vec<Image>, ApiError>),
    OverviewVms(Ticket, Result<Vec<Vm>, ApiError>),
    VmDetail(Ticket, Result<Vm, ApiError>),
}

enum RowAction {
    Delete(usize),
    BeginRename(usize),
    CommitRename,
    CancelRename,
    Start(usize),
    Stop(usize),
    Details(String),
}

struct RenameState {
    collection: Collection,
    index: usize,
    new_name: String,
}

struct ConsoleApp {
    runtime: Runtime,
    client: Arc<dyn ApiClient>,
    navigation: Arc<NavigationState>,
    api_url: String,
    error_capacity: usize,

    screen: Screen,
    overview: OverviewView,
    images: ImageListView,
    vms: VmListView,
    detail: Option<VmDetailView>,

    completions_tx: Sender<Completion>,
    completions_rx: Receiver<Completion>,

    pending_delete: Option<Collection>,
    rename: Option<RenameState>,
    show_event_log: bool,
    event_log: Vec<String>,
}

/// Suffix for errors where the request never reached the server.
fn unreachable_hint(error: &ViewError) -> &'static str {
    match error {
        ViewError::Api(e) if e.is_transport() => " (API server unreachable)",
        _ => "",
    }
}

impl ConsoleApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Runtime,
        client: Arc<dyn ApiClient>,
        api_url: String,
        config: ConsoleConfig,
    ) -> Self {
        theme::configure_ocean_theme(&cc.egui_ctx);

        let navigation = Arc::new(NavigationState::new(config.ui.start_view));
        let capacity = config.ui.max_recorded_errors;
        let (completions_tx, completions_rx) = mpsc::channel();

        let mut app = Self {
            runtime,
            overview: OverviewView::new(Arc::clone(&client), navigation.clone())
                .with_error_capacity(capacity),
            images: ImageListView::new(Arc::clone(&client), navigation.clone())
                .with_error_capacity(capacity),
            vms: VmListView::new(Arc::clone(&client), navigation.clone())
                .with_error_capacity(capacity),
            detail: None,
            client,
            navigation,
            api_url,
            error_capacity: capacity,
            screen: Screen::from(config.ui.start_view),
            completions_tx,
            completions_rx,
            pending_delete: None,
            rename: None,
            show_event_log: config.ui.show_event_log,
            event_log: Vec::new(),
        };

        app.enter(&cc.egui_ctx, app.screen);
        app
    }

    fn log_event(&mut self, message: impl Into<String>) {
        let timestamp = Local::now().format("%H:%M:%S");
        let line = format!("[{timestamp}] {}", message.into());
        self.event_log.push(line);
        if self.event_log.len() > MAX_EVENT_LINES {
            let overflow = self.event_log.len() - MAX_EVENT_LINES;
            self.event_log.drain(0..overflow);
        }
    }

    fn spawn_fetch<T, F>(&self, ctx: &egui::Context, fetch: ApiFuture<T>, wrap: F)
    where
        T: Send + 'static,
        F: FnOnce(Result<T, ApiError>) -> Completion + Send + 'static,
    {
        let tx = self.completions_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let result = fetch.await;
            if tx.send(wrap(result)).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    /// Leaves the current screen and mounts `screen`, starting its fetches.
    fn open(&mut self, ctx: &egui::Context, screen: Screen) {
        self.leave();
        self.screen = screen;
        self.enter(ctx, screen);
    }

    fn leave(&mut self) {
        self.pending_delete = None;
        self.rename = None;
        match self.screen {
            Screen::Overview => self.overview.deactivate(),
            Screen::Images => self.images.deactivate(),
            Screen::Vms => self.vms.deactivate(),
            Screen::VmDetail => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.deactivate();
                }
            }
        }
    }

    fn enter(&mut self, ctx: &egui::Context, screen: Screen) {
        match screen {
            Screen::Overview => {
                let ticket = self.overview.activate();
                self.load_overview(ctx, ticket);
            }
            Screen::Images => {
                let ticket = self.images.activate();
                self.load_images(ctx, ticket);
            }
            Screen::Vms => {
                let ticket = self.vms.activate();
                self.load_vms(ctx, ticket);
            }
            Screen::VmDetail => {
                if let Some(detail) = self.detail.as_mut() {
                    let ticket = detail.activate();
                    self.load_detail(ctx, ticket);
                }
            }
        }
    }

    fn refresh_current(&mut self, ctx: &egui::Context) {
        match self.screen {
            Screen::Overview => {
                let ticket = self.overview.begin_refresh();
                self.load_overview(ctx, ticket);
            }
            Screen::Images => {
                let ticket = self.images.begin_refresh();
                self.load_images(ctx, ticket);
            }
            Screen::Vms => {
                let ticket = self.vms.begin_refresh();
                self.load_vms(ctx, ticket);
            }
            Screen::VmDetail => {
                if let Some(detail) = self.detail.as_mut() {
                    let ticket = detail.begin_refresh();
                    self.load_detail(ctx, ticket);
                }
            }
        }
    }

    fn load_overview(&self, ctx: &egui::Context, ticket: Ticket) {
        self.spawn_fetch(ctx, self.overview.fetch_images(), move |r| {
            Completion::OverviewImages(ticket, r)
        });
        self.spawn_fetch(ctx, self.overview.fetch_vms(), move |r| {
            Completion::OverviewVms(ticket, r)
        });
    }

    fn load_images(&self, ctx: &egui::Context, ticket: Ticket) {
        self.spawn_fetch(ctx, self.images.fetch_images(), move |r| {
            Completion::Images(ticket, r)
        });
    }

    fn load_vms(&self, ctx: &egui::Context, ticket: Ticket) {
        self.spawn_fetch(ctx, self.vms.fetch_vms(), move |r| Completion::Vms(ticket, r));
    }

    fn load_detail(&self, ctx: &egui::Context, ticket: Ticket) {
        if let Some(detail) = self.detail.as_ref() {
            self.spawn_fetch(ctx, detail.fetch_vm(), move |r| {
                Completion::VmDetail(ticket, r)
            });
        }
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            let (what, outcome) = match completion {
                Completion::Images(ticket, result) => {
                    ("images", self.images.apply_images(ticket, result))
                }
                Completion::Vms(ticket, result) => ("VMs", self.vms.apply_vms(ticket, result)),
                Completion::OverviewImages(ticket, result) => {
                    ("images", self.overview.apply_images(ticket, result))
                }
                Completion::OverviewVms(ticket, result) => {
                    ("VMs", self.overview.apply_vms(ticket, result))
                }
                Completion::VmDetail(ticket, result) => match self.detail.as_mut() {
                    Some(detail) => ("VM details", detail.apply_vm(ticket, result).map(|_| 1)),
                    None => continue,
                },
            };

            match outcome {
                Ok(count) => self.log_event(format!("Loaded {} ({})", what, count)),
                Err(ViewError::Detached | ViewError::Superseded) => {}
                Err(e) => self.log_event(format!("Loading {} failed: {}{}", what, e, unreachable_hint(&e))),
            }
        }
    }

    fn finish_mutation(&mut self, verb: &str, result: Result<Mutation, ViewError>) {
        match result {
            Ok(mutation) => {
                let mut line = format!("{} '{}'", verb, mutation.target);
                if let Some(message) = &mutation.receipt.message {
                    line.push_str(&format!(": {}", message));
                }
                if mutation.stale_selection {
                    line.push_str(" (list had changed since selection)");
                }
                if !mutation.refreshed {
                    line.push_str(" (list not refreshed)");
                }
                self.log_event(line);
            }
            Err(e) => self.log_event(format!("{} failed: {}{}", verb, e, unreachable_hint(&e))),
        }
    }

    fn draw_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("console.header")
            .frame(
                egui::Frame::default()
                    .fill(theme::BG_ELEVATED)
                    .inner_margin(8.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Virt Console");
                    ui.label(egui::RichText::new(&self.api_url).color(theme::TEXT_SECONDARY));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.checkbox(&mut self.show_event_log, "Event log");
                        if ui.button("🔄 Refresh").clicked() {
                            self.refresh_current(ctx);
                            self.log_event("Manual refresh");
                        }
                    });
                });
            });
    }

    fn draw_tab_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("console.tab_bar")
            .frame(egui::Frame::default().fill(theme::BG_CONSOLE).inner_margin(egui::Margin {
                left: 12.0,
                right: 12.0,
                top: 8.0,
                bottom: 8.0,
            }))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(4.0, 0.0);
                    for option in MenuOption::ALL {
                        let button = if self.navigation.is_active(option) {
                            egui::Button::new(option.label())
                                .fill(theme::BG_ELEVATED)
                                .stroke(egui::Stroke::new(1.0, theme::BORDER_FOCUS))
                        } else {
                            egui::Button::new(option.label()).fill(theme::BG_PANEL)
                        };
                        if ui.add_sized([150.0, 30.0], button).clicked() {
                            self.open(ctx, Screen::from(option));
                        }
                    }
                });
            });
    }

    fn draw_event_log_panel(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("console.event_log")
            .default_height(150.0)
            .min_height(100.0)
            .show(ctx, |ui| {
                ui.heading("Event log");
                ui.separator();
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in &self.event_log {
                            ui.monospace(line);
                        }
                    });
            });
    }

    fn draw_phase(ui: &mut egui::Ui, phase: ViewPhase, errors: &ErrorLog) {
        match phase {
            ViewPhase::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading...");
                });
            }
            ViewPhase::Stale => {
                ui.colored_label(
                    theme::STATUS_WARNING,
                    "Status may be outdated. Refresh to see the server's view.",
                );
            }
            ViewPhase::Unmounted | ViewPhase::Ready => {}
        }
        if let Some(last) = errors.last() {
            ui.colored_label(
                theme::STATUS_NOT_READY,
                format!(
                    "{} failed at {}: {}",
                    last.action,
                    last.at.with_timezone(&Local).format("%H:%M:%S"),
                    last.message
                ),
            );
        }
    }

    fn summary_chip(ui: &mut egui::Ui, label: &str, value: usize, color: egui::Color32) {
        egui::Frame::default()
            .fill(theme::BG_SECONDARY)
            .stroke(egui::Stroke::new(1.0, color))
            .rounding(6.0)
            .inner_margin(10.0)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(value.to_string()).size(22.0).color(color));
                    ui.small(label);
                });
            });
    }

    fn draw_overview(&mut self, ui: &mut egui::Ui) {
        Self::draw_phase(ui, self.overview.phase(), self.overview.errors());

        let summary = self.overview.summary();
        ui.horizontal(|ui| {
            Self::summary_chip(ui, "Images", summary.images, theme::ACTION_PRIMARY);
            Self::summary_chip(ui, "VMs", summary.vms, theme::TEXT_PRIMARY);
            Self::summary_chip(ui, "Ready", summary.ready_vms, theme::STATUS_READY);
        });
        ui.add_space(8.0);

        ui.columns(2, |columns| {
            columns[0].heading("Images");
            for image in self.overview.images() {
                columns[0].label(&image.name);
            }
            columns[1].heading("Virtual Machines");
            for vm in self.overview.vms() {
                let status = vm.status_label();
                columns[1].horizontal(|ui| {
                    ui.colored_label(theme::status_color(status), theme::status_icon(status));
                    ui.label(&vm.name);
                });
            }
        });
    }

    fn draw_images(&mut self, ui: &mut egui::Ui) {
        Self::draw_phase(ui, self.images.phase(), self.images.errors());

        let mut upload = false;
        ui.group(|ui| {
            ui.strong("Upload image");
            egui::Grid::new("console.upload_form").num_columns(2).show(ui, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut self.images.form.name);
                ui.end_row();
                ui.label("File path");
                ui.text_edit_singleline(&mut self.images.form.file_path);
                ui.end_row();
                ui.label("Size");
                ui.text_edit_singleline(&mut self.images.form.size);
                ui.end_row();
                ui.label("Upload proxy");
                ui.text_edit_singleline(&mut self.images.form.upload_proxy_url);
                ui.end_row();
            });
            upload = ui.button("Upload").clicked();
        });
        if upload {
            let result = self.runtime.block_on(self.images.upload());
            self.finish_mutation("Upload", result);
        }

        ui.add_space(8.0);
        let mut action = None;
        egui::ScrollArea::vertical()
            .id_source("console.image_table")
            .show(ui, |ui| {
                egui::Grid::new("console.images")
                    .striped(true)
                    .num_columns(5)
                    .show(ui, |ui| {
                        ui.strong("#");
                        ui.strong("Name");
                        ui.strong("Size");
                        ui.strong("File");
                        ui.strong("");
                        ui.end_row();

                        for (row, image) in self.images.images().iter().enumerate() {
                            ui.label(row.to_string());
                            Self::name_cell(ui, &mut self.rename, Collection::Images, row, &image.name, &mut action);
                            ui.label(&image.size);
                            ui.label(&image.file_path);
                            ui.horizontal(|ui| {
                                if ui.small_button("Rename").clicked() {
                                    action = Some(RowAction::BeginRename(row));
                                }
                                if ui
                                    .add(egui::Button::new("Delete").small().fill(theme::ACTION_DANGER))
                                    .clicked()
                                {
                                    action = Some(RowAction::Delete(row));
                                }
                            });
                            ui.end_row();
                        }
                    });
                if self.images.images().is_empty() && self.images.phase() == ViewPhase::Ready {
                    ui.label("No images uploaded yet.");
                }
            });

        if let Some(action) = action {
            self.handle_row_action(ui.ctx(), Collection::Images, action);
        }
    }

    fn draw_vms(&mut self, ui: &mut egui::Ui) {
        Self::draw_phase(ui, self.vms.phase(), self.vms.errors());

        let mut create = false;
        ui.group(|ui| {
            ui.strong("Create virtual machine");
            egui::Grid::new("console.create_form").num_columns(2).show(ui, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut self.vms.form.name);
                ui.end_row();
                ui.label("Image");
                ui.text_edit_singleline(&mut self.vms.form.image);
                ui.end_row();
                ui.label("Size");
                ui.add(egui::DragValue::new(&mut self.vms.form.size).clamp_range(0..=64));
                ui.end_row();
            });
            create = ui.button("Create").clicked();
        });
        if create {
            let result = self.runtime.block_on(self.vms.create());
            self.finish_mutation("Create", result);
        }

        ui.add_space(8.0);
        let mut action = None;
        egui::ScrollArea::vertical()
            .id_source("console.vm_table")
            .show(ui, |ui| {
                egui::Grid::new("console.vms")
                    .striped(true)
                    .num_columns(6)
                    .show(ui, |ui| {
                        ui.strong("#");
                        ui.strong("Name");
                        ui.strong("Image");
                        ui.strong("Size");
                        ui.strong("Status");
                        ui.strong("");
                        ui.end_row();

                        for (row, vm) in self.vms.vms().iter().enumerate() {
                            ui.label(row.to_string());
                            Self::name_cell(ui, &mut self.rename, Collection::Vms, row, &vm.name, &mut action);
                            ui.label(&vm.image);
                            ui.label(vm.size.to_string());
                            let status = vm.status_label();
                            ui.colored_label(
                                theme::status_color(status),
                                format!("{} {}", theme::status_icon(status), status.unwrap_or("Unknown")),
                            );
                            ui.horizontal(|ui| {
                                if ui.small_button("▶ Start").clicked() {
                                    action = Some(RowAction::Start(row));
                                }
                                if ui.small_button("⏹ Stop").clicked() {
                                    action = Some(RowAction::Stop(row));
                                }
                                if ui.small_button("Details →").clicked() {
                                    action = Some(RowAction::Details(vm.name.clone()));
                                }
                                if ui.small_button("Rename").clicked() {
                                    action = Some(RowAction::BeginRename(row));
                                }
                                if ui
                                    .add(egui::Button::new("Delete").small().fill(theme::ACTION_DANGER))
                                    .clicked()
                                {
                                    action = Some(RowAction::Delete(row));
                                }
                            });
                            ui.end_row();
                        }
                    });
                if self.vms.vms().is_empty() && self.vms.phase() == ViewPhase::Ready {
                    ui.label("No virtual machines.");
                }
            });

        if let Some(action) = action {
            self.handle_row_action(ui.ctx(), Collection::Vms, action);
        }
    }

    /// Name column; becomes an editor while this row is being renamed.
    fn name_cell(
        ui: &mut egui::Ui,
        rename: &mut Option<RenameState>,
        collection: Collection,
        row: usize,
        name: &str,
        action: &mut Option<RowAction>,
    ) {
        match rename {
            Some(state) if state.collection == collection && state.index == row => {
                ui.horizontal(|ui| {
                    let response = ui.text_edit_singleline(&mut state.new_name);
                    let submitted =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if ui.small_button("✔").clicked() || submitted {
                        *action = Some(RowAction::CommitRename);
                    }
                    if ui.small_button("✖").clicked() {
                        *action = Some(RowAction::CancelRename);
                    }
                });
            }
            _ => {
                ui.label(name);
            }
        }
    }

    fn handle_row_action(&mut self, ctx: &egui::Context, collection: Collection, action: RowAction) {
        match action {
            RowAction::Delete(row) => {
                let selected = match collection {
                    Collection::Images => self.images.select_for_delete(row).map(|_| ()),
                    Collection::Vms => self.vms.select_for_delete(row).map(|_| ()),
                };
                match selected {
                    Ok(()) => self.pending_delete = Some(collection),
                    Err(e) => self.log_event(format!("Cannot select row {}: {}", row, e)),
                }
            }
            RowAction::BeginRename(row) => {
                let current = match collection {
                    Collection::Images => self.images.images().get(row).map(|i| i.name.clone()),
                    Collection::Vms => self.vms.vms().get(row).map(|vm| vm.name.clone()),
                };
                self.rename = current.map(|new_name| RenameState {
                    collection,
                    index: row,
                    new_name,
                });
            }
            RowAction::CommitRename => {
                if let Some(state) = self.rename.take() {
                    let new_name = state.new_name.trim().to_string();
                    let result = match state.collection {
                        Collection::Images => {
                            self.runtime.block_on(self.images.rename(state.index, &new_name))
                        }
                        Collection::Vms => {
                            self.runtime.block_on(self.vms.rename(state.index, &new_name))
                        }
                    };
                    self.finish_mutation("Rename", result);
                }
            }
            RowAction::CancelRename => self.rename = None,
            RowAction::Start(row) => {
                let result = self.runtime.block_on(self.vms.start(row));
                self.finish_mutation("Start", result);
            }
            RowAction::Stop(row) => {
                let result = self.runtime.block_on(self.vms.stop(row));
                self.finish_mutation("Stop", result);
            }
            RowAction::Details(name) => {
                self.leave();
                self.detail = Some(
                    VmDetailView::new(Arc::clone(&self.client), self.navigation.clone(), name)
                        .with_error_capacity(self.error_capacity),
                );
                self.screen = Screen::VmDetail;
                self.enter(ctx, Screen::VmDetail);
            }
        }
    }

    fn draw_delete_confirmation(&mut self, ctx: &egui::Context) {
        let Some(collection) = self.pending_delete else {
            return;
        };
        let target = match collection {
            Collection::Images => self.images.selected_for_delete(),
            Collection::Vms => self.vms.selected_for_delete(),
        }
        .unwrap_or_default()
        .to_string();

        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Confirm delete")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Delete '{}'? This cannot be undone.", target));
                ui.horizontal(|ui| {
                    if ui
                        .add(egui::Button::new("Delete").fill(theme::ACTION_DANGER))
                        .clicked()
                    {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });

        if confirmed {
            self.pending_delete = None;
            let result = match collection {
                Collection::Images => self.runtime.block_on(self.images.delete_selected()),
                Collection::Vms => self.runtime.block_on(self.vms.delete_selected()),
            };
            self.finish_mutation("Delete", result);
        } else if cancelled {
            self.pending_delete = None;
        }
    }

    fn draw_vm_detail(&mut self, ui: &mut egui::Ui) {
        let mut back = false;
        let Some(detail) = self.detail.as_ref() else {
            return;
        };

        ui.horizontal(|ui| {
            if ui.button("← Virtual Machines").clicked() {
                back = true;
            }
            ui.heading(detail.name());
        });
        Self::draw_phase(ui, detail.phase(), detail.errors());

        egui::ScrollArea::vertical()
            .id_source("console.vm_detail")
            .show(ui, |ui| {
                egui::Grid::new("console.vm_attributes")
                    .striped(true)
                    .num_columns(2)
                    .show(ui, |ui| {
                        for (label, value) in detail.attributes() {
                            ui.strong(label.as_str());
                            if label == "Status" {
                                ui.colored_label(theme::status_color(Some(value.as_str())), value);
                            } else {
                                ui.label(value);
                            }
                            ui.end_row();
                        }
                    });

                if let Some(vm) = detail.vm() {
                    if let Some(yaml) = &vm.yaml {
                        egui::CollapsingHeader::new("YAML").show(ui, |ui| {
                            ui.monospace(yaml);
                        });
                    }
                    if let Some(log) = &vm.log {
                        egui::CollapsingHeader::new("Log").show(ui, |ui| {
                            ui.monospace(log);
                        });
                    }
                }
            });

        if back {
            self.open(ui.ctx(), Screen::Vms);
        }
    }
}

impl eframe::App for ConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_completions();

        self.draw_header(ctx);
        self.draw_tab_bar(ctx);
        if self.show_event_log {
            self.draw_event_log_panel(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.screen {
            Screen::Overview => self.draw_overview(ui),
            Screen::Images => self.draw_images(ui),
            Screen::Vms => self.draw_vms(ui),
            Screen::VmDetail => self.draw_vm_detail(ui),
        });

        self.draw_delete_confirmation(ctx);
    }
}
