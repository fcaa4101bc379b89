//! Plain-text presentation of a dashboard session.

use std::io::Write;

use itertools::Itertools;
use serde_json::Value;
use snowrun_core::dashboard::{
    visible_columns, Dashboard, Notice, RowDetails, StageService, UploadReport, ViewRow,
};
use snowrun_core::error::{Error, Result};

use crate::cli_args::DashboardAction;

/// Opens the dashboard, performs `action` and writes the result to `out`.
///
/// Service failures show up as notices in the output; only misuse, such as
/// an out-of-range row, is returned as an error.
///
/// # Errors
///
/// Returns an error if the row index is out of range or writing fails.
pub fn run<S: StageService, W: Write>(
    dashboard: &mut Dashboard<S>,
    action: &DashboardAction,
    out: &mut W,
) -> Result<()> {
    dashboard.open()?;
    write_location(dashboard, out).map_err(Error::Stdio)?;
    write_notices(&dashboard.take_notices(), out).map_err(Error::Stdio)?;

    match action {
        DashboardAction::Status => {}
        DashboardAction::Upload { files } => {
            let report = dashboard.upload(files)?;
            write_notices(&dashboard.take_notices(), out).map_err(Error::Stdio)?;
            write_upload_report(&report, out).map_err(Error::Stdio)?;
        }
        DashboardAction::Refresh => {
            dashboard.refresh()?;
        }
        DashboardAction::Show { row } => {
            dashboard.select_row(*row)?;
            let details = dashboard.selected_details();
            write_notices(&dashboard.take_notices(), out).map_err(Error::Stdio)?;
            if let Some(details) = details {
                write_details(&details, out).map_err(Error::Stdio)?;
            }
            return Ok(());
        }
    }

    write_notices(&dashboard.take_notices(), out).map_err(Error::Stdio)?;
    write_table(dashboard.rows(), out).map_err(Error::Stdio)
}

fn write_location<S: StageService, W: Write>(
    dashboard: &Dashboard<S>,
    out: &mut W,
) -> std::io::Result<()> {
    let location = dashboard.location();
    writeln!(
        out,
        "Database: `{}` | Schema: `{}` | Stage: `{}`",
        location.database, location.schema, location.stage
    )
}

/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_notices<W: Write>(notices: &[Notice], out: &mut W) -> std::io::Result<()> {
    for notice in notices {
        writeln!(out, "{notice}")?;
    }
    Ok(())
}

/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_upload_report<W: Write>(report: &UploadReport, out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        "Upload: {} uploaded, {} failed, {} skipped",
        report.uploaded.len(),
        report.failed.len(),
        report.skipped.len()
    )?;

    if !report.skipped.is_empty() {
        writeln!(out, "Already uploaded: {}", report.skipped.iter().join(", "))?;
    }
    if report.is_partial() {
        writeln!(
            out,
            "Stage not refreshed because some uploads failed. Run `snowrun dashboard upload` again to retry: {}",
            report.failed.iter().map(|(name, _)| name).join(", ")
        )?;
    }

    Ok(())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Writes the rows as a `|`-separated table, leaving out internal columns.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_table<W: Write>(rows: &[ViewRow], out: &mut W) -> std::io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "No data yet. Upload some images to get started.");
    }

    let columns = visible_columns(rows);
    writeln!(out, "# | {}", columns.iter().join(" | "))?;

    for (index, row) in rows.iter().enumerate() {
        writeln!(
            out,
            "{index} | {}",
            columns.iter().map(|column| cell(row.get(*column))).join(" | ")
        )?;
    }

    Ok(())
}

/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_details<W: Write>(details: &RowDetails, out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        "Row {}: {}",
        details.index,
        details.relative_path.as_deref().unwrap_or("(no file)")
    )?;

    if let Some(url) = &details.image_url {
        writeln!(out, "Image: {url}")?;
    }

    if let Some(observation) = &details.observation {
        if let Some(caption) = &observation.caption {
            writeln!(out, "Caption: {caption}")?;
        }
        writeln!(out, "Total Attendees: {}", observation.total_attendees)?;
        writeln!(out, "Raised Hands: {}", observation.raised_hands)?;
        writeln!(out, "Hands Up: {:.1}%", observation.conversion_rate())?;
        writeln!(
            out,
            "Ratio: {}",
            observation
                .ratio()
                .iter()
                .map(|slice| format!("{} {}", slice.category, slice.count))
                .join(" / ")
        )?;
    }

    if let Some(metadata) = &details.metadata {
        let facts = [
            metadata.content_type.clone(),
            metadata.size.map(|size| format!("{size} bytes")),
            metadata.last_modified.clone(),
            metadata.short_etag().map(|etag| format!("etag {etag}")),
        ];
        let facts = facts.into_iter().flatten().join(", ");
        if !facts.is_empty() {
            writeln!(out, "File: {facts}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use serde_json::json;
    use snowrun_core::dashboard::StageLocation;

    use super::*;

    #[derive(Default)]
    struct FakeService {
        rows: Vec<ViewRow>,
        fail_upload: bool,
        fail_view: bool,
    }

    impl StageService for FakeService {
        fn create_stage_if_not_exists(&mut self, _location: &StageLocation) -> Result<()> {
            Ok(())
        }

        fn put_file(&mut self, _local_path: &Path, _location: &StageLocation) -> Result<()> {
            if self.fail_upload {
                return Err(Error::service("Uploading file", "denied"));
            }
            Ok(())
        }

        fn refresh_stage(&mut self, _location: &StageLocation) -> Result<()> {
            Ok(())
        }

        fn presigned_url(
            &mut self,
            _stage: &str,
            relative_path: &str,
            _expiry: Duration,
        ) -> Result<Option<String>> {
            Ok(Some(format!("https://files.example.com/{relative_path}")))
        }

        fn query_view(&mut self, _view_fqn: &str) -> Result<Vec<ViewRow>> {
            if self.fail_view {
                return Err(Error::service("Loading view", "warehouse suspended"));
            }
            Ok(self.rows.clone())
        }
    }

    fn row() -> ViewRow {
        json!({
            "CAPTION": "Keynote",
            "FILE_NAME": {"STAGE": "@CROWD.DATA.SNAPS", "RELATIVE_PATH": "keynote.jpg", "SIZE": 2048},
            "TOTAL_ATTENDEES": 120,
            "RAISED_HANDS": 30,
            "PERCENTAGE_WITH_HANDS_UP": 25.0
        })
        .as_object()
        .unwrap()
        .clone()
    }

    fn render(service: FakeService, action: &DashboardAction) -> (Result<()>, String) {
        let location = StageLocation {
            database: "CROWD".to_string(),
            schema: "DATA".to_string(),
            stage: "SNAPS".to_string(),
        };
        let mut dashboard = Dashboard::new(service, location).with_settle_delay(Duration::ZERO);
        let mut out = Vec::new();
        let result = run(&mut dashboard, action, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_status_lists_visible_columns() {
        let (result, output) = render(
            FakeService {
                rows: vec![row()],
                ..FakeService::default()
            },
            &DashboardAction::Status,
        );

        result.unwrap();
        assert_eq!(
            output,
            "Database: `CROWD` | Schema: `DATA` | Stage: `SNAPS`\n\
             # | TOTAL_ATTENDEES | RAISED_HANDS | PERCENTAGE_WITH_HANDS_UP\n\
             0 | 120 | 30 | 25.0\n"
        );
    }

    #[test]
    fn test_empty_status() {
        let (result, output) = render(
            FakeService::default(),
            &DashboardAction::Status,
        );

        result.unwrap();
        assert!(output.ends_with("No data yet. Upload some images to get started.\n"));
    }

    #[test]
    fn test_failed_upload_is_reported_without_error() {
        let (result, output) = render(
            FakeService {
                fail_upload: true,
                ..FakeService::default()
            },
            &DashboardAction::Upload {
                files: vec![PathBuf::from("a.jpg")],
            },
        );

        result.unwrap();
        assert!(output.contains("[error] Error uploading a.jpg: Uploading file failed: denied\n"));
        assert!(output.contains("Upload: 0 uploaded, 1 failed, 0 skipped\n"));
    }

    #[test]
    fn test_show_row_details() {
        let (result, output) = render(
            FakeService {
                rows: vec![row()],
                ..FakeService::default()
            },
            &DashboardAction::Show { row: 0 },
        );

        result.unwrap();
        assert!(output.contains("Row 0: keynote.jpg\n"));
        assert!(output.contains("Image: https://files.example.com/keynote.jpg\n"));
        assert!(output.contains("Caption: Keynote\n"));
        assert!(output.contains("Hands Up: 25.0%\n"));
        assert!(output.contains("Ratio: Total Attendees 120 / Raised Hands 30\n"));
        assert!(output.contains("File: 2048 bytes\n"));
    }

    #[test]
    fn test_show_out_of_range() {
        let (result, _) = render(
            FakeService {
                rows: vec![row()],
                ..FakeService::default()
            },
            &DashboardAction::Show { row: 5 },
        );

        assert!(matches!(result, Err(Error::RowOutOfRange(5, 1))));
    }

    #[test]
    fn test_show_reports_failed_view_load() {
        let (result, output) = render(
            FakeService {
                fail_view: true,
                ..FakeService::default()
            },
            &DashboardAction::Show { row: 0 },
        );

        assert!(matches!(result, Err(Error::RowOutOfRange(0, 0))));
        assert!(output.contains(
            "[warning] Could not load data: Loading view failed: warehouse suspended\n"
        ));
    }

    #[test]
    fn test_repeated_upload_argument_is_skipped() {
        let (result, output) = render(
            FakeService::default(),
            &DashboardAction::Upload {
                files: vec![PathBuf::from("a.jpg"), PathBuf::from("a.jpg")],
            },
        );

        result.unwrap();
        assert!(output.contains("Upload: 1 uploaded, 0 failed, 1 skipped\n"));
        assert!(output.contains("Already uploaded: a.jpg\n"));
    }
}
