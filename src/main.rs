use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use virt_console::{
    ApiClient, ConsoleConfig, HttpApiClient, ImageListView, Mutation, NavigationState,
    OverviewView, VmDetailView, VmListView, log_debug, log_warn, logger,
    models::{Image, Vm},
};

#[derive(Parser)]
#[command(name = "virt-console")]
#[command(about = "Console for the image and virtual machine management API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file (defaults to the per-user config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the API; wins over the config file and VIRT_CONSOLE_API_URL
    #[arg(long)]
    api_url: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show image and VM counts with both lists
    Overview,
    /// Image management
    Images {
        #[command(subcommand)]
        image_command: ImageCommands,
    },
    /// Virtual machine management
    #[command(alias = "vm")]
    Vms {
        #[command(subcommand)]
        vm_command: VmCommands,
    },
}

#[derive(Subcommand)]
enum ImageCommands {
    /// List uploaded images
    #[command(alias = "ls")]
    List,
    /// Upload a new image
    Upload {
        #[arg(long)]
        name: String,
        /// Path of the image file on the API host
        #[arg(long)]
        path: String,
        /// Requested storage size, e.g. 10Gi
        #[arg(long, default_value = "")]
        size: String,
        /// Upload proxy to use instead of the cluster default
        #[arg(long, default_value = "")]
        proxy_url: String,
    },
    /// Delete the image at a row of `images list`
    Delete { index: usize },
    /// Rename the image at a row of `images list`
    Rename { index: usize, new_name: String },
}

#[derive(Subcommand)]
enum VmCommands {
    /// List virtual machines
    #[command(alias = "ls")]
    List,
    /// Show all attributes of one VM
    Show { name: String },
    /// Create a virtual machine
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        image: String,
        /// Size class understood by the server (0 = single core)
        #[arg(long, default_value_t = 0)]
        size: i64,
    },
    /// Delete the VM at a row of `vms list`
    Delete { index: usize },
    /// Start the VM at a row of `vms list`
    Start { index: usize },
    /// Stop the VM at a row of `vms list`
    Stop { index: usize },
    /// Rename the VM at a row of `vms list`
    Rename { index: usize, new_name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_with_verbosity(cli.verbose);

    let config = ConsoleConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?
        .with_env_override()?
        .with_api_override(cli.api_url.clone())?;

    let client = HttpApiClient::from_config(&config.api)
        .with_context(|| format!("invalid API URL '{}'", config.api.base_url))?;
    log_debug!("Using API at {}", client.base_url());
    let client: Arc<dyn ApiClient> = Arc::new(client);
    let navigation = Arc::new(NavigationState::new(config.ui.start_view));

    match cli.command {
        Commands::Overview => run_overview(client, navigation).await,
        Commands::Images { image_command } => run_images(image_command, client, navigation).await,
        Commands::Vms { vm_command } => run_vms(vm_command, client, navigation).await,
    }
}

async fn run_overview(
    client: Arc<dyn ApiClient>,
    navigation: Arc<NavigationState>,
) -> anyhow::Result<()> {
    let mut view = OverviewView::new(client, navigation);
    let load = view.mount().await;

    if let (Err(images_err), Err(vms_err)) = (&load.images, &load.vms) {
        bail!("overview unavailable: images: {}; VMs: {}", images_err, vms_err);
    }

    let summary = view.summary();
    println!(
        "Images: {}    VMs: {} ({} ready)",
        summary.images, summary.vms, summary.ready_vms
    );
    println!();

    match &load.images {
        Ok(_) => print_images(view.images()),
        Err(err) => println!("Images unavailable: {}", err),
    }
    println!();
    match &load.vms {
        Ok(_) => print_vms(view.vms()),
        Err(err) => println!("VMs unavailable: {}", err),
    }
    Ok(())
}

async fn run_images(
    command: ImageCommands,
    client: Arc<dyn ApiClient>,
    navigation: Arc<NavigationState>,
) -> anyhow::Result<()> {
    let mut view = ImageListView::new(client, navigation);

    match command {
        ImageCommands::List => {
            view.mount().await.context("failed to list images")?;
            print_images(view.images());
        }
        ImageCommands::Upload {
            name,
            path,
            size,
            proxy_url,
        } => {
            if let Err(err) = view.mount().await {
                log_warn!("Image list unavailable before upload: {}", err);
            }
            view.form.name = name;
            view.form.file_path = path;
            view.form.size = size;
            view.form.upload_proxy_url = proxy_url;

            let mutation = view.upload().await.context("upload failed")?;
            report("Uploaded", &mutation);
            print_images(view.images());
        }
        ImageCommands::Delete { index } => {
            view.mount().await.context("failed to list images")?;
            view.select_for_delete(index)?;
            let mutation = view.delete_selected().await.context("delete failed")?;
            report("Deleted", &mutation);
            print_images(view.images());
        }
        ImageCommands::Rename { index, new_name } => {
            view.mount().await.context("failed to list images")?;
            let mutation = view.rename(index, &new_name).await.context("rename failed")?;
            report("Renamed", &mutation);
            print_images(view.images());
        }
    }
    Ok(())
}

async fn run_vms(
    command: VmCommands,
    client: Arc<dyn ApiClient>,
    navigation: Arc<NavigationState>,
) -> anyhow::Result<()> {
    let mut view = VmListView::new(Arc::clone(&client), navigation.clone());

    match command {
        VmCommands::List => {
            view.mount().await.context("failed to list VMs")?;
            print_vms(view.vms());
        }
        VmCommands::Show { name } => {
            let mut detail = VmDetailView::new(client, navigation, name.clone());
            detail
                .mount()
                .await
                .with_context(|| format!("failed to load VM '{}'", name))?;
            print_vm_detail(&detail);
        }
        VmCommands::Create { name, image, size } => {
            if let Err(err) = view.mount().await {
                log_warn!("VM list unavailable before create: {}", err);
            }
            view.form.name = name;
            view.form.image = image;
            view.form.size = size;

            let mutation = view.create().await.context("create failed")?;
            report("Created", &mutation);
            print_vms(view.vms());
        }
        VmCommands::Delete { index } => {
            view.mount().await.context("failed to list VMs")?;
            view.select_for_delete(index)?;
            let mutation = view.delete_selected().await.context("delete failed")?;
            report("Deleted", &mutation);
            print_vms(view.vms());
        }
        VmCommands::Start { index } => {
            view.mount().await.context("failed to list VMs")?;
            let mutation = view.start(index).await.context("start failed")?;
            report("Start requested for", &mutation);
            println!("Status shown by `vms list` updates once the server reports it.");
        }
        VmCommands::Stop { index } => {
            view.mount().await.context("failed to list VMs")?;
            let mutation = view.stop(index).await.context("stop failed")?;
            report("Stop requested for", &mutation);
            println!("Status shown by `vms list` updates once the server reports it.");
        }
        VmCommands::Rename { index, new_name } => {
            view.mount().await.context("failed to list VMs")?;
            let mutation = view.rename(index, &new_name).await.context("rename failed")?;
            report("Renamed", &mutation);
            print_vms(view.vms());
        }
    }
    Ok(())
}

fn report(verb: &str, mutation: &Mutation) {
    println!("{} '{}'", verb, mutation.target);
    if let Some(message) = &mutation.receipt.message {
        println!("  server: {}", message);
    }
    if mutation.stale_selection {
        println!("  warning: the list changed between selection and deletion");
    }
    if !mutation.refreshed {
        println!("  warning: list could not be refreshed, rows below may be outdated");
    }
}

fn print_images(images: &[Image]) {
    println!("{:<5} {:<28} {:<10} {:<30}", "ROW", "NAME", "SIZE", "FILE");
    println!("{}", "=".repeat(75));
    for (row, image) in images.iter().enumerate() {
        println!(
            "{:<5} {:<28} {:<10} {:<30}",
            row,
            image.name,
            dash_if_empty(&image.size),
            dash_if_empty(&image.file_path)
        );
    }
    if images.is_empty() {
        println!("No images");
    }
}

fn print_vms(vms: &[Vm]) {
    println!(
        "{:<5} {:<24} {:<20} {:<6} {:<12}",
        "ROW", "NAME", "IMAGE", "SIZE", "STATUS"
    );
    println!("{}", "=".repeat(71));
    for (row, vm) in vms.iter().enumerate() {
        println!(
            "{:<5} {:<24} {:<20} {:<6} {:<12}",
            row,
            vm.name,
            dash_if_empty(&vm.image),
            vm.size,
            vm.status_label().unwrap_or("-")
        );
    }
    if vms.is_empty() {
        println!("No virtual machines");
    }
}

fn print_vm_detail(view: &VmDetailView) {
    for (label, value) in view.attributes() {
        println!("{:<12} {}", format!("{}:", label), value);
    }
    if let Some(vm) = view.vm() {
        if let Some(yaml) = &vm.yaml {
            println!("\nYAML:\n{}", yaml);
        }
        if let Some(log) = &vm.log {
            println!("\nLog:\n{}", log);
        }
    }
}

fn dash_if_empty(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
