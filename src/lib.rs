pub mod api;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod navigation;
pub mod theme;
pub mod views;

pub use error::ConsoleError;

pub type Result<T> = std::result::Result<T, ConsoleError>;

pub use api::{ApiClient, ApiError, HttpApiClient};
pub use config::ConsoleConfig;
pub use models::{CommandReceipt, Image, Vm};
pub use navigation::{MenuOption, NavigationState, Navigator};
pub use views::{
    ImageListView, Mutation, OverviewView, ViewError, ViewPhase, VmDetailView, VmListView,
};
