//! View controllers: one local mirror of server state per screen.
//!
//! A view moves through `Unmounted -> Loading -> Ready`, drops to `Stale`
//! after a power action and goes back through `Loading` whenever it refetches.
//! Failed fetches leave the mirror and phase exactly as they were. Results are
//! only written while the `Ticket` they were started under is still current,
//! so a view that was left (or re-entered) never receives an old answer.

pub mod image_list;
pub mod overview;
pub mod vm_detail;
pub mod vm_list;

pub use image_list::{ImageListView, UploadForm};
pub use overview::{OverviewLoad, OverviewSummary, OverviewView};
pub use vm_detail::VmDetailView;
pub use vm_list::{CreateVmForm, VmListView};

use crate::api::ApiError;
use crate::models::{CommandReceipt, Named};
use crate::{log_debug, log_warn};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use thiserror::Error;

pub const DEFAULT_ERROR_CAPACITY: usize = 32;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("No row at index {index} (list has {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Nothing is selected for deletion")]
    NothingSelected,
    #[error("View is no longer mounted; result discarded")]
    Detached,
    #[error("A newer result was already applied; result discarded")]
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewPhase {
    #[default]
    Unmounted,
    Loading,
    Ready,
    /// A mutation went through but the mirror was not refetched
    Stale,
}

/// Identifies the mount a request was issued under and its place in the
/// order requests were issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct Lifecycle {
    mounted: bool,
    epoch: u64,
    issued: u64,
}

impl Lifecycle {
    pub fn mount(&mut self) -> Ticket {
        self.epoch += 1;
        self.mounted = true;
        self.issue()
    }

    pub fn unmount(&mut self) {
        self.epoch += 1;
        self.mounted = false;
    }

    /// Ticket for one more request under the current mount.
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket {
            epoch: self.epoch,
            seq: self.issued,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn accepts(&self, ticket: Ticket) -> bool {
        self.mounted && ticket.epoch == self.epoch
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedError {
    pub at: DateTime<Utc>,
    pub action: &'static str,
    pub message: String,
}

/// Bounded, oldest-first record of failures a view swallowed.
#[derive(Debug)]
pub struct ErrorLog {
    entries: VecDeque<RecordedError>,
    capacity: usize,
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ERROR_CAPACITY)
    }
}

impl ErrorLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, action: &'static str, error: &dyn std::fmt::Display) {
        log_warn!("{} failed: {}", action, error);
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(RecordedError {
            at: Utc::now(),
            action,
            message: error.to_string(),
        });
    }

    /// Passes `result` through, recording the failure branch under `action`.
    pub fn check<T>(
        &mut self,
        action: &'static str,
        result: Result<T, ApiError>,
    ) -> Result<T, ViewError> {
        result.map_err(|err| {
            self.record(action, &err);
            ViewError::Api(err)
        })
    }

    pub fn last(&self) -> Option<&RecordedError> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordedError> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}

/// Local copy of one server collection plus its place in the view state
/// machine. `generation` counts successful replacements; `newest` is the
/// sequence number of the last request whose result was applied.
#[derive(Debug)]
pub struct Mirror<T> {
    items: Vec<T>,
    phase: ViewPhase,
    resume: ViewPhase,
    generation: u64,
    newest: u64,
}

impl<T> Default for Mirror<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            phase: ViewPhase::Unmounted,
            resume: ViewPhase::Unmounted,
            generation: 0,
            newest: 0,
        }
    }
}

impl<T> Mirror<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn begin_loading(&mut self) {
        if self.phase != ViewPhase::Loading {
            self.resume = self.phase;
        }
        self.phase = ViewPhase::Loading;
    }

    /// Replaces the whole collection on success; on failure puts the phase
    /// back and records the error, leaving the items alone. Results of
    /// requests issued before the last applied one are dropped untouched.
    pub(crate) fn apply(
        &mut self,
        ticket: Ticket,
        action: &'static str,
        result: Result<Vec<T>, ApiError>,
        errors: &mut ErrorLog,
    ) -> Result<usize, ViewError> {
        if ticket.seq < self.newest {
            log_debug!("Dropping {} result #{}, #{} already applied", action, ticket.seq, self.newest);
            return Err(ViewError::Superseded);
        }
        self.newest = ticket.seq;
        match errors.check(action, result) {
            Ok(items) => {
                self.items = items;
                self.generation += 1;
                self.phase = ViewPhase::Ready;
                Ok(self.items.len())
            }
            Err(err) => {
                self.phase = self.resume;
                Err(err)
            }
        }
    }

    pub(crate) fn mark_stale(&mut self) {
        if self.phase == ViewPhase::Ready {
            self.phase = ViewPhase::Stale;
        }
    }

    pub(crate) fn unmount(&mut self) {
        self.phase = ViewPhase::Unmounted;
        self.resume = ViewPhase::Unmounted;
    }
}

/// Result of a mutating action that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// Name of the entity the request addressed
    pub target: String,
    pub receipt: CommandReceipt,
    /// False when the follow-up refetch failed; that error is in the view's log
    pub refreshed: bool,
    /// The list was replaced between selecting the row and confirming
    pub stale_selection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selected {
    name: String,
    index: usize,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedDelete {
    pub name: String,
    pub index: usize,
    pub stale: bool,
}

/// Row picked for deletion. The row is captured by name at selection time;
/// if the list is refetched before confirmation the name may no longer be at
/// that row, or present at all. That is reported, not prevented.
#[derive(Debug, Default)]
pub struct DeleteSelection {
    selected: Option<Selected>,
}

impl DeleteSelection {
    pub fn select<T: Named>(
        &mut self,
        items: &[T],
        index: usize,
        generation: u64,
    ) -> Result<&str, ViewError> {
        let item = items.get(index).ok_or(ViewError::IndexOutOfRange {
            index,
            len: items.len(),
        })?;
        log_debug!("Selected row {} ({}) for deletion", index, item.name());
        let selected = self.selected.insert(Selected {
            name: item.name().to_string(),
            index,
            generation,
        });
        Ok(&selected.name)
    }

    pub fn target(&self) -> Option<&str> {
        self.selected.as_ref().map(|s| s.name.as_str())
    }

    pub fn confirm(&self, current_generation: u64) -> Result<ConfirmedDelete, ViewError> {
        let selected = self.selected.as_ref().ok_or(ViewError::NothingSelected)?;
        let stale = selected.generation != current_generation;
        if stale {
            log_warn!(
                "Deleting '{}' selected at row {} before the list was refetched",
                selected.name,
                selected.index
            );
        }
        Ok(ConfirmedDelete {
            name: selected.name.clone(),
            index: selected.index,
            stale,
        })
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }
}

/// Name at `index` in the currently displayed list.
pub(crate) fn name_at<T: Named>(items: &[T], index: usize) -> Result<String, ViewError> {
    items
        .get(index)
        .map(|item| item.name().to_string())
        .ok_or(ViewError::IndexOutOfRange {
            index,
            len: items.len(),
        })
}
