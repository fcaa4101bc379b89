//! Session states of the dashboard and the transitions between them.

use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardState {
    /// No rows loaded
    Idle,
    /// Files are being uploaded to the stage
    Uploading,
    /// The stage directory is being refreshed and the view reloaded
    Refreshing,
    /// Rows loaded, none selected
    Ready,
    /// Rows loaded, one selected
    RowSelected(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEvent {
    DataLoaded { rows: usize },
    UploadStarted,
    UploadFinished { all_succeeded: bool, rows: usize },
    RefreshStarted,
    RefreshFinished { rows: usize },
    RefreshFailed { rows: usize },
    RowSelected(usize),
    SelectionCleared,
}

impl DashboardState {
    fn settled(rows: usize) -> Self {
        if rows == 0 {
            Self::Idle
        } else {
            Self::Ready
        }
    }

    fn is_busy(self) -> bool {
        matches!(self, Self::Uploading | Self::Refreshing)
    }

    /// Applies `event`, returning the next state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if `event` cannot happen in this
    /// state, e.g. selecting a row while uploading.
    pub fn on(self, event: DashboardEvent) -> Result<Self> {
        use DashboardEvent as E;

        let next = match (self, event) {
            (state, E::DataLoaded { rows }) if !state.is_busy() => Self::settled(rows),
            (state, E::UploadStarted) if !state.is_busy() => Self::Uploading,
            (Self::Uploading, E::UploadFinished { all_succeeded: true, .. }) => Self::Refreshing,
            (Self::Uploading, E::UploadFinished { all_succeeded: false, rows }) => Self::settled(rows),
            (state, E::RefreshStarted) if !state.is_busy() => Self::Refreshing,
            (Self::Refreshing, E::RefreshFinished { rows } | E::RefreshFailed { rows }) => {
                Self::settled(rows)
            }
            (Self::Ready | Self::RowSelected(_), E::RowSelected(index)) => Self::RowSelected(index),
            (Self::RowSelected(_), E::SelectionCleared) => Self::Ready,
            (state, event) => {
                return Err(Error::InvalidTransition {
                    state: state.to_string(),
                    event: format!("{event:?}"),
                })
            }
        };

        Ok(next)
    }
}

impl Display for DashboardState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => formatter.write_str("idle"),
            Self::Uploading => formatter.write_str("uploading"),
            Self::Refreshing => formatter.write_str("refreshing"),
            Self::Ready => formatter.write_str("ready"),
            Self::RowSelected(index) => write!(formatter, "row {index} selected"),
        }
    }
}
