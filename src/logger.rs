use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "virt_console=info";
const VERBOSE_FILTER: &str = "virt_console=debug";

pub fn init_logger() {
    init_with_verbosity(false);
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over the verbosity flag.
/// Calling this more than once keeps the first subscriber.
pub fn init_with_verbosity(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { ::tracing::info!($($arg)*) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { ::tracing::warn!($($arg)*) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { ::tracing::error!($($arg)*) };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { ::tracing::debug!($($arg)*) };
}
