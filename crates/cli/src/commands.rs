//! Dispatches parsed arguments to the core pipeline.

use std::io::Write;
use std::time::Duration;

use itertools::Itertools;
use log::debug;
use snowrun_core::catalog::Catalog;
use snowrun_core::config::{self, DEFAULT_CONNECTION_SETTING};
use snowrun_core::dashboard::{Dashboard, SnowCliService, StageLocation, DEFAULT_STAGE_NAME};
use snowrun_core::error::{Error, Result};
use snowrun_core::execution::Executor;
use snowrun_core::runner::{self, Outcome};
use snowrun_core::settings::Settings;

use crate::arguments::{process_command_line, Provider};
use crate::cli_args::{Args, BuiltinOperation, Commands, DashboardArgs, RunArgs};
use crate::dashboard_view;

/// Settings the dashboard reads its stage location from
const DASHBOARD_SETTINGS: [&str; 3] = [DEFAULT_CONNECTION_SETTING, "DEMO_DATABASE", "DEMO_SCHEMA"];

/// Runs the parsed command line, writing user-facing output to `out`.
///
/// # Errors
///
/// Returns the first error of the selected command. External tool failures
/// carry the tool's exit code.
pub fn execute<E: Executor, W: Write>(args: &Args, executor: &mut E, out: &mut W) -> Result<()> {
    match &args.command {
        Commands::Hirc { operation } => run_builtin(operation, &args.executable, executor, out),
        Commands::Scc { operation } => run_builtin(operation, &args.executable, executor, out),
        Commands::Run(run_args) => run_from_file(run_args, &args.executable, executor, out),
        Commands::List { operations_file } => list(operations_file.as_deref(), out),
        Commands::Dashboard(dashboard_args) => dashboard(dashboard_args, &args.executable, out),
    }
}

fn run_builtin<O: BuiltinOperation, E: Executor, W: Write>(
    operation: &O,
    executable: &str,
    executor: &mut E,
    out: &mut W,
) -> Result<()> {
    let catalog = Catalog::builtin(operation.catalog())?;
    let definition = catalog.find(operation.operation_id())?;
    let options = operation.common().run_options(executable);

    let outcome = runner::run_operation(definition, &operation.parameters(), &options, executor, out)?;
    debug!("`{} {}` finished: {outcome:?}", catalog.name, definition.id);

    Ok(())
}

fn run_from_file<E: Executor, W: Write>(
    run_args: &RunArgs,
    executable: &str,
    executor: &mut E,
    out: &mut W,
) -> Result<()> {
    let path = config::expand_path(&run_args.operations_file);
    let catalog = Catalog::from_file(&path.to_string_lossy())?;
    let definition = catalog.find(&run_args.operation_id)?;
    let parameters = process_command_line(run_args.get_style()?, definition)?;
    let options = run_args.common.run_options(executable);

    if runner::run_operation(definition, &parameters, &options, executor, out)? == Outcome::Previewed {
        debug!("Dry run of `{}` complete", definition.id);
    }

    Ok(())
}

fn list<W: Write>(operations_file: Option<&str>, out: &mut W) -> Result<()> {
    let catalogs = match operations_file {
        Some(path) => vec![Catalog::from_file(&config::expand_path(path).to_string_lossy())?],
        None => Catalog::builtins()?,
    };

    for catalog in &catalogs {
        write_catalog(catalog, out).map_err(Error::Stdio)?;
    }

    Ok(())
}

/// Writes one catalog: a heading, then one line per operation with its SQL
/// file and parameters.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_catalog<W: Write>(catalog: &Catalog, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}:", catalog.name)?;

    let width = catalog
        .operations
        .iter()
        .map(|operation| operation.id.len())
        .max()
        .unwrap_or(0);

    for operation in &catalog.operations {
        writeln!(
            out,
            "  {:<width$}  {}  [{}]",
            operation.id,
            operation.description.as_deref().unwrap_or(""),
            operation.sql_file
        )?;

        if !operation.parameters.is_empty() {
            writeln!(
                out,
                "  {:<width$}    parameters: {}",
                "",
                operation.parameters.iter().join(", ")
            )?;
        }
    }

    Ok(())
}

fn dashboard<W: Write>(dashboard_args: &DashboardArgs, executable: &str, out: &mut W) -> Result<()> {
    let env_file = config::get_env_file_path(dashboard_args.env_file.as_deref());
    let settings = Settings::load(env_file.as_deref())?;
    let location = stage_location(&settings, dashboard_args.stage.as_deref())?;
    let connection = settings.require(&[DEFAULT_CONNECTION_SETTING])?;

    let service = SnowCliService::new(
        executable,
        &connection[DEFAULT_CONNECTION_SETTING],
        settings.file_values().clone(),
    );
    let mut dashboard = Dashboard::new(service, location)
        .with_settle_delay(Duration::from_secs(dashboard_args.settle_secs));

    dashboard_view::run(&mut dashboard, &dashboard_args.action, out)
}

/// Stage location from settings, with `stage` overriding `DEMO_STAGE`.
///
/// # Errors
///
/// Returns [`Error::MissingSettings`] naming every missing setting.
pub fn stage_location(settings: &Settings, stage: Option<&str>) -> Result<StageLocation> {
    let values = settings.require(&DASHBOARD_SETTINGS)?;
    let stage = stage
        .or_else(|| settings.get("DEMO_STAGE"))
        .unwrap_or(DEFAULT_STAGE_NAME);

    Ok(StageLocation {
        database: values["DEMO_DATABASE"].clone(),
        schema: values["DEMO_SCHEMA"].clone(),
        stage: stage.to_string(),
    })
}

/// Process exit status for `error`.
///
/// An external tool's own status is passed through when it fits a process
/// exit status and is not zero. Everything else exits with `1`.
#[must_use]
pub fn exit_status(error: &Error) -> u8 {
    match u8::try_from(error.exit_code()) {
        Ok(code) if code != 0 => code,
        _ => 1,
    }
}

/// Writes an error and its hint, if any, the way the binary reports failures.
///
/// # Errors
///
/// Returns an error if writing to `err` fails.
pub fn report_error<W: Write>(error: &Error, err: &mut W) -> std::io::Result<()> {
    writeln!(err, "{error}")?;
    if let Some(hint) = error.hint() {
        writeln!(err, "{hint}")?;
    }
    Ok(())
}
