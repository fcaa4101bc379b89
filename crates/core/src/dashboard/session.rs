//! The dashboard session: stage upload, refresh, view reload and row details.
//!
//! Service failures never abort the session. Each one is recorded as a
//! [`Notice`] and the affected step yields no result.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{info, warn};
use serde_json::Value;

use crate::dashboard::analytics::{CrowdObservation, ViewRow};
use crate::dashboard::metadata::FileMetadata;
use crate::dashboard::service::{StageLocation, StageService, PRESIGNED_URL_EXPIRY};
use crate::dashboard::state::{DashboardEvent, DashboardState};
use crate::error::{Error, Result};

/// Wait after a stage refresh so the view picks up new files
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Display for Notice {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(formatter, "[{label}] {}", self.message)
    }
}

/// What happened to one batch of uploads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadReport {
    /// Already uploaded earlier in this session
    pub skipped: Vec<String>,
    pub uploaded: Vec<String>,
    /// File name and failure message
    pub failed: Vec<(String, String)>,
    pub refreshed: bool,
}

impl UploadReport {
    /// Some files reached the stage and others did not.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.uploaded.is_empty() && !self.failed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowDetails {
    pub index: usize,
    pub relative_path: Option<String>,
    pub image_url: Option<String>,
    pub metadata: Option<FileMetadata>,
    pub observation: Option<CrowdObservation>,
}

pub struct Dashboard<S: StageService> {
    service: S,
    location: StageLocation,
    state: DashboardState,
    rows: Vec<ViewRow>,
    uploaded: HashSet<String>,
    notices: Vec<Notice>,
    settle_delay: Duration,
}

impl<S: StageService> Dashboard<S> {
    pub fn new(service: S, location: StageLocation) -> Self {
        Self {
            service,
            location,
            state: DashboardState::Idle,
            rows: Vec::new(),
            uploaded: HashSet::new(),
            notices: Vec::new(),
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    #[must_use]
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    #[must_use]
    pub fn state(&self) -> DashboardState {
        self.state
    }

    #[must_use]
    pub fn rows(&self) -> &[ViewRow] {
        &self.rows
    }

    #[must_use]
    pub fn location(&self) -> &StageLocation {
        &self.location
    }

    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Removes and returns the notices gathered so far.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, level: NoticeLevel, message: String) {
        match level {
            NoticeLevel::Warning | NoticeLevel::Error => warn!("{message}"),
            NoticeLevel::Success | NoticeLevel::Info => info!("{message}"),
        }
        self.notices.push(Notice { level, message });
    }

    fn apply(&mut self, event: DashboardEvent) -> Result<()> {
        self.state = self.state.on(event)?;
        Ok(())
    }

    /// Ensures the stage exists and loads the view.
    ///
    /// A failed load leaves the table empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if called during an upload or
    /// refresh.
    pub fn open(&mut self) -> Result<()> {
        if let Err(e) = self.service.create_stage_if_not_exists(&self.location) {
            self.notify(NoticeLevel::Error, format!("Error creating stage: {e}"));
        }

        match self.service.query_view(&self.location.view_fqn()) {
            Ok(rows) => self.rows = rows,
            Err(e) => {
                self.notify(NoticeLevel::Warning, format!("Could not load data: {e}"));
                self.rows.clear();
            }
        }

        self.apply(DashboardEvent::DataLoaded {
            rows: self.rows.len(),
        })
    }

    /// Uploads files not yet uploaded in this session, then refreshes the
    /// stage and reloads the view if every upload succeeded.
    ///
    /// A file name repeated within `files` is uploaded once and the repeats
    /// are reported as skipped. Files are uploaded independently; a failure does not stop the others
    /// and nothing already uploaded is rolled back. Failed files are not
    /// remembered, so passing them again retries them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if called during an upload or
    /// refresh.
    pub fn upload(&mut self, files: &[PathBuf]) -> Result<UploadReport> {
        let mut report = UploadReport::default();
        let mut pending = Vec::new();

        let mut batch = HashSet::new();

        for path in files {
            let name = file_name(path);
            if self.uploaded.contains(&name) || !batch.insert(name.clone()) {
                report.skipped.push(name);
            } else {
                pending.push((name, path));
            }
        }

        if pending.is_empty() {
            return Ok(report);
        }

        self.apply(DashboardEvent::UploadStarted)?;

        for (name, path) in pending {
            match self.service.put_file(path, &self.location) {
                Ok(()) => {
                    self.notify(NoticeLevel::Success, format!("Uploaded: {name}"));
                    self.uploaded.insert(name.clone());
                    report.uploaded.push(name);
                }
                Err(e) => report.failed.push((name, e.to_string())),
            }
        }

        let all_succeeded = report.failed.is_empty();
        self.apply(DashboardEvent::UploadFinished {
            all_succeeded,
            rows: self.rows.len(),
        })?;

        if all_succeeded {
            report.refreshed = self.refresh_and_reload("Error refreshing stage")?;
        }

        for (name, message) in &report.failed {
            self.notify(
                NoticeLevel::Error,
                format!("Error uploading {name}: {message}"),
            );
        }

        Ok(report)
    }

    /// Manually refreshes the stage and reloads the view.
    ///
    /// Returns whether the refresh succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if called during an upload or
    /// refresh.
    pub fn refresh(&mut self) -> Result<bool> {
        self.apply(DashboardEvent::RefreshStarted)?;
        self.refresh_and_reload("Error refreshing data")
    }

    fn refresh_and_reload(&mut self, failure_context: &str) -> Result<bool> {
        let refreshed = self
            .service
            .refresh_stage(&self.location)
            .and_then(|()| {
                thread::sleep(self.settle_delay);
                self.service.query_view(&self.location.view_fqn())
            });

        match refreshed {
            Ok(rows) => {
                self.rows = rows;
                self.notify(
                    NoticeLevel::Success,
                    "Stage refreshed successfully!".to_string(),
                );
                self.apply(DashboardEvent::RefreshFinished {
                    rows: self.rows.len(),
                })?;
                Ok(true)
            }
            Err(e) => {
                self.notify(NoticeLevel::Error, format!("{failure_context}: {e}"));
                self.apply(DashboardEvent::RefreshFailed {
                    rows: self.rows.len(),
                })?;
                Ok(false)
            }
        }
    }

    /// Selects a row of the current table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowOutOfRange`] for an index past the table, or
    /// [`Error::InvalidTransition`] during an upload or refresh.
    pub fn select_row(&mut self, index: usize) -> Result<()> {
        if index >= self.rows.len() {
            return Err(Error::RowOutOfRange(index, self.rows.len()));
        }

        self.apply(DashboardEvent::RowSelected(index))
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if no row is selected.
    pub fn clear_selection(&mut self) -> Result<()> {
        self.apply(DashboardEvent::SelectionCleared)
    }

    /// Image and analytics for the selected row.
    pub fn selected_details(&mut self) -> Option<RowDetails> {
        let DashboardState::RowSelected(index) = self.state else {
            return None;
        };
        let row = self.rows.get(index)?.clone();

        let metadata = match row.get("FILE_NAME") {
            None | Some(Value::Null) => None,
            Some(value) => match FileMetadata::from_value(value) {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    self.notify(
                        NoticeLevel::Warning,
                        format!("Could not parse filename JSON: {e}"),
                    );
                    None
                }
            },
        };

        let relative_path = metadata
            .as_ref()
            .and_then(|metadata| metadata.relative_path.clone());
        let image_url = metadata
            .as_ref()
            .and_then(|metadata| self.image_url(metadata));

        match (&image_url, &relative_path) {
            (None, Some(relative_path)) => {
                self.notify(
                    NoticeLevel::Error,
                    format!("Could not generate presigned URL for: {relative_path}"),
                );
                self.notify(
                    NoticeLevel::Info,
                    "Check Snowflake permissions for GET_PRESIGNED_URL function".to_string(),
                );
            }
            (None, None) => self.notify(
                NoticeLevel::Info,
                "No valid image file found in selected row".to_string(),
            ),
            _ => {}
        }

        let observation = match CrowdObservation::from_row(&row) {
            Ok(observation) => Some(observation),
            Err(e) => {
                self.notify(NoticeLevel::Warning, format!("Could not read analytics: {e}"));
                None
            }
        };

        Some(RowDetails {
            index,
            relative_path,
            image_url,
            metadata,
            observation,
        })
    }

    fn image_url(&mut self, metadata: &FileMetadata) -> Option<String> {
        let Some((stage, relative_path)) = metadata.stage_and_path() else {
            self.notify(
                NoticeLevel::Warning,
                "Missing STAGE or RELATIVE_PATH in file metadata".to_string(),
            );
            return None;
        };

        match self
            .service
            .presigned_url(stage, relative_path, PRESIGNED_URL_EXPIRY)
        {
            Ok(url) => url,
            Err(e) => {
                self.notify(
                    NoticeLevel::Error,
                    format!("Error getting presigned URL: {e}"),
                );
                None
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().to_string(),
    )
}
