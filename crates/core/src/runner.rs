//! The end-to-end pipeline for one operation.
//!
//! locate SQL directory → load settings → validate required settings → build
//! template variables → locate SQL file → preview or execute.

use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use log::info;

use crate::config::{self, DEFAULT_EXECUTABLE};
use crate::error::{Error, Result};
use crate::execution::Executor;
use crate::interpolation::{build_context, render_variables, resolve_parameters};
use crate::invocation::Invocation;
use crate::operation_definitions::OperationDefinition;
use crate::settings::Settings;

/// Options shared by every operation on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub env_file: Option<String>,
    pub sql_dir: Option<String>,
    pub dry_run: bool,
    pub executable: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            env_file: None,
            sql_dir: None,
            dry_run: false,
            executable: DEFAULT_EXECUTABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Previewed,
    Executed,
}

/// Builds the invocation for `definition` from already loaded settings.
///
/// # Errors
///
/// Returns an error if required settings are missing, a parameter is missing
/// or unknown, a template cannot be rendered, or the SQL file does not exist.
pub fn prepare_invocation(
    definition: &OperationDefinition,
    parameters: &IndexMap<String, String>,
    settings: &Settings,
    sql_dir: &Path,
    executable: &str,
) -> Result<Invocation> {
    let required = settings.require(&definition.required_settings)?;
    let parameters = resolve_parameters(definition, parameters)?;
    let variables = render_variables(definition, &build_context(&required, &parameters))?;

    let connection = required
        .get(&definition.connection_setting)
        .cloned()
        .ok_or_else(|| {
            Error::missing_settings(
                vec![definition.connection_setting.clone()],
                settings.searched().map(Path::to_path_buf),
            )
        })?;

    let sql_path = config::locate_sql_file(sql_dir, &definition.sql_file)?;

    Ok(Invocation {
        executable: executable.to_string(),
        connection,
        sql_path,
        variables,
        environment: settings.file_values().clone(),
    })
}

/// Runs `definition` with settings that are already loaded.
///
/// # Errors
///
/// See [`prepare_invocation`]; additionally returns the executor's error,
/// including [`Error::SubProcessExit`] carrying the tool's exit code.
pub fn run_with_settings<E: Executor, W: Write>(
    definition: &OperationDefinition,
    parameters: &IndexMap<String, String>,
    settings: &Settings,
    sql_dir: &Path,
    options: &RunOptions,
    executor: &mut E,
    out: &mut W,
) -> Result<Outcome> {
    let invocation = prepare_invocation(definition, parameters, settings, sql_dir, &options.executable)?;

    if options.dry_run {
        invocation.write_preview(out).map_err(Error::Stdio)?;
        return Ok(Outcome::Previewed);
    }

    invocation.write_progress(out).map_err(Error::Stdio)?;
    out.flush().map_err(Error::Stdio)?;
    info!("Executing {invocation}");
    executor.execute(&invocation)?;

    Ok(Outcome::Executed)
}

/// Resolves paths and settings from `options`, then runs `definition`.
///
/// The SQL directory is resolved first so a bad `--sql-dir` fails before any
/// settings are read.
///
/// # Errors
///
/// Returns an error if the SQL directory or settings file cannot be resolved,
/// and otherwise as [`run_with_settings`].
pub fn run_operation<E: Executor, W: Write>(
    definition: &OperationDefinition,
    parameters: &IndexMap<String, String>,
    options: &RunOptions,
    executor: &mut E,
    out: &mut W,
) -> Result<Outcome> {
    let sql_dir = config::get_sql_dir(options.sql_dir.as_deref())?;
    let env_file = config::get_env_file_path(options.env_file.as_deref());
    let settings = Settings::load(env_file.as_deref())?;

    run_with_settings(definition, parameters, &settings, &sql_dir, options, executor, out)
}
