//! [`StageService`] backed by the `snow` command-line tool.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use indexmap::IndexMap;
use log::debug;

use crate::dashboard::analytics::ViewRow;
use crate::dashboard::service::{StageLocation, StageService};
use crate::error::{Error, Result};
use crate::execution::capture_command;

#[derive(Debug, Clone)]
pub struct SnowCliService {
    executable: String,
    connection: String,
    environment: IndexMap<String, String>,
}

impl SnowCliService {
    #[must_use]
    pub fn new(executable: &str, connection: &str, environment: IndexMap<String, String>) -> Self {
        Self {
            executable: executable.to_string(),
            connection: connection.to_string(),
            environment,
        }
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.executable);
        command.envs(&self.environment);
        command
    }

    fn query(&self, operation: &str, sql: &str) -> Result<Vec<ViewRow>> {
        debug!("{operation}: {sql}");

        let mut command = self.command();
        command.args(query_args(&self.connection, sql));

        let output = capture_command(command).map_err(|e| Error::service(operation, e))?;
        parse_rows(operation, &output)
    }
}

fn query_args(connection: &str, sql: &str) -> Vec<String> {
    vec![
        "sql".to_string(),
        "-c".to_string(),
        connection.to_string(),
        "-q".to_string(),
        sql.to_string(),
        "--format".to_string(),
        "json".to_string(),
    ]
}

fn parse_rows(operation: &str, output: &str) -> Result<Vec<ViewRow>> {
    if output.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(output).map_err(|original| Error::ServiceOutput {
        operation: operation.to_string(),
        original,
    })
}

/// Quotes a value as a SQL string literal.
fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn create_stage_sql(location: &StageLocation) -> String {
    format!(
        "CREATE STAGE IF NOT EXISTS {} ENCRYPTION = (TYPE = 'SNOWFLAKE_SSE') DIRECTORY = (ENABLE = TRUE AUTO_REFRESH = TRUE)",
        location.fqn()
    )
}

fn presigned_url_sql(stage: &str, relative_path: &str, expiry: Duration) -> String {
    format!(
        "SELECT GET_PRESIGNED_URL({}, {}, {}) AS URL",
        sql_literal(stage),
        sql_literal(relative_path),
        expiry.as_secs()
    )
}

impl StageService for SnowCliService {
    fn create_stage_if_not_exists(&mut self, location: &StageLocation) -> Result<()> {
        self.query("Creating stage", &create_stage_sql(location))
            .map(|_| ())
    }

    fn put_file(&mut self, local_path: &Path, location: &StageLocation) -> Result<()> {
        let mut command = self.command();
        command.args(["stage", "copy"]);
        command.arg(local_path);
        command.arg(format!("{}/", location.stage_ref()));
        command.args(["-c", self.connection.as_str(), "--overwrite", "--no-auto-compress"]);

        capture_command(command)
            .map(|_| ())
            .map_err(|e| Error::service("Uploading file", e))
    }

    fn refresh_stage(&mut self, location: &StageLocation) -> Result<()> {
        self.query("Refreshing stage", &format!("ALTER STAGE {} REFRESH", location.fqn()))
            .map(|_| ())
    }

    fn presigned_url(
        &mut self,
        stage: &str,
        relative_path: &str,
        expiry: Duration,
    ) -> Result<Option<String>> {
        let rows = self.query(
            "Getting presigned URL",
            &presigned_url_sql(stage, relative_path, expiry),
        )?;

        Ok(rows
            .first()
            .and_then(|row| row.get("URL"))
            .and_then(|url| url.as_str())
            .map(str::to_string))
    }

    fn query_view(&mut self, view_fqn: &str) -> Result<Vec<ViewRow>> {
        self.query("Loading view", &format!("SELECT * FROM {view_fqn}"))
    }
}
