use crate::log_debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// The three top-level menu entries. The numeric ids are what the views
/// report when they become active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MenuOption {
    #[default]
    Overview = 0,
    Images = 1,
    VirtualMachines = 2,
}

impl MenuOption {
    pub const ALL: [MenuOption; 3] = [
        MenuOption::Overview,
        MenuOption::Images,
        MenuOption::VirtualMachines,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(MenuOption::Overview),
            1 => Some(MenuOption::Images),
            2 => Some(MenuOption::VirtualMachines),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuOption::Overview => "Overview",
            MenuOption::Images => "Images",
            MenuOption::VirtualMachines => "Virtual Machines",
        }
    }
}

/// Capability handed to each view so it can report which menu entry it
/// belongs to. Fire-and-forget: there is nothing to acknowledge.
pub trait Navigator: Send + Sync {
    fn set_active(&self, option: MenuOption);
}

/// Shared highlight state read by whatever draws the menu.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    active: Arc<AtomicU8>,
}

impl NavigationState {
    pub fn new(initial: MenuOption) -> Self {
        Self {
            active: Arc::new(AtomicU8::new(initial.id())),
        }
    }

    pub fn active(&self) -> MenuOption {
        MenuOption::from_id(self.active.load(Ordering::Acquire)).unwrap_or_default()
    }

    pub fn is_active(&self, option: MenuOption) -> bool {
        self.active() == option
    }
}

impl Navigator for NavigationState {
    fn set_active(&self, option: MenuOption) {
        log_debug!("Menu option {} ({}) is now active", option.id(), option.label());
        self.active.store(option.id(), Ordering::Release);
    }
}
