//! Integration tests for the operation pipeline
//!
//! These tests drive complete operations through settings, templating, SQL
//! file lookup and a recording executor.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use snowrun_core::{
    catalog::{Catalog, HIRC, SCC},
    error::{Error, Result},
    execution::Executor,
    invocation::Invocation,
    runner::{run_operation, run_with_settings, Outcome, RunOptions},
    settings::Settings,
};
use tempfile::TempDir;

/// Records invocations instead of spawning anything.
#[derive(Default)]
struct RecordingExecutor {
    invocations: Vec<Invocation>,
    exit_code: Option<i32>,
}

impl Executor for RecordingExecutor {
    fn execute(&mut self, invocation: &Invocation) -> Result<()> {
        self.invocations.push(invocation.clone());
        match self.exit_code {
            Some(code) => Err(Error::SubProcessExit { code }),
            None => Ok(()),
        }
    }
}

fn sql_dir_with(files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in files {
        fs::write(dir.path().join(file), "SELECT 1;").unwrap();
    }
    dir
}

fn setup_settings() -> Settings {
    Settings::from_pairs([
        ("SNOWFLAKE_DEFAULT_CONNECTION_NAME", "c1"),
        ("ADMIN_ROLE", "A"),
        ("DEMO_DATABASE", "D"),
        ("SA_ROLE", "S"),
        ("EXTERNAL_VOLUME_NAME", "V"),
    ])
}

fn run(
    catalog: &str,
    operation: &str,
    parameters: &IndexMap<String, String>,
    settings: &Settings,
    sql_dir: &Path,
    options: &RunOptions,
    executor: &mut RecordingExecutor,
) -> (Result<Outcome>, String) {
    let catalog = Catalog::builtin(catalog).unwrap();
    let definition = catalog.find(operation).unwrap();
    let mut out = Vec::new();

    let result = run_with_settings(
        definition, parameters, settings, sql_dir, options, executor, &mut out,
    );

    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_setup_runs_snow_with_mapped_variables() {
    let sql_dir = sql_dir_with(&["demo_setup.sql"]);
    let mut executor = RecordingExecutor::default();

    let (result, output) = run(
        HIRC,
        "setup",
        &IndexMap::new(),
        &setup_settings(),
        sql_dir.path(),
        &RunOptions::default(),
        &mut executor,
    );

    assert_eq!(result.unwrap(), Outcome::Executed);
    assert_eq!(output, "Running: snow sql -f demo_setup.sql\n");
    assert_eq!(executor.invocations.len(), 1);

    let sql_path = sql_dir.path().join("demo_setup.sql");
    assert_eq!(
        executor.invocations[0].to_args(),
        vec![
            "sql".to_string(),
            "-c".to_string(),
            "c1".to_string(),
            "-f".to_string(),
            sql_path.display().to_string(),
            "--enable-templating".to_string(),
            "ALL".to_string(),
            "--variable".to_string(),
            "admin_role=A".to_string(),
            "--variable".to_string(),
            "database_name=D".to_string(),
            "--variable".to_string(),
            "sa_role=S".to_string(),
            "--variable".to_string(),
            "external_volume_name=V".to_string(),
        ]
    );
}

#[test]
fn test_missing_setting_stops_before_execution() {
    let sql_dir = sql_dir_with(&["demo_setup.sql"]);
    let settings = Settings::from_pairs([
        ("SNOWFLAKE_DEFAULT_CONNECTION_NAME", "c1"),
        ("ADMIN_ROLE", "A"),
        ("DEMO_DATABASE", "D"),
        ("EXTERNAL_VOLUME_NAME", "V"),
    ]);
    let mut executor = RecordingExecutor::default();

    let (result, _) = run(
        HIRC,
        "setup",
        &IndexMap::new(),
        &settings,
        sql_dir.path(),
        &RunOptions::default(),
        &mut executor,
    );

    let error = result.unwrap_err();
    assert!(matches!(&error, Error::MissingSettings { names, .. } if names == &["SA_ROLE"]));
    assert_eq!(error.exit_code(), 1);
    assert!(executor.invocations.is_empty());
}

#[test]
fn test_all_missing_settings_are_reported_together() {
    let sql_dir = sql_dir_with(&["demo_setup.sql"]);
    let mut executor = RecordingExecutor::default();

    let (result, _) = run(
        HIRC,
        "setup",
        &IndexMap::new(),
        &Settings::from_pairs([("ADMIN_ROLE", "A"), ("DEMO_DATABASE", "  ")]),
        sql_dir.path(),
        &RunOptions::default(),
        &mut executor,
    );

    assert_eq!(
        result.unwrap_err().to_string(),
        "Missing required .env variables: SNOWFLAKE_DEFAULT_CONNECTION_NAME, DEMO_DATABASE, SA_ROLE, EXTERNAL_VOLUME_NAME"
    );
    assert!(executor.invocations.is_empty());
}

#[test]
fn test_external_exit_code_is_propagated() {
    let sql_dir = sql_dir_with(&["demo_setup.sql"]);
    let mut executor = RecordingExecutor {
        exit_code: Some(2),
        ..RecordingExecutor::default()
    };

    let (result, _) = run(
        HIRC,
        "setup",
        &IndexMap::new(),
        &setup_settings(),
        sql_dir.path(),
        &RunOptions::default(),
        &mut executor,
    );

    let error = result.unwrap_err();
    assert_eq!(error.to_string(), "Command failed with exit code 2");
    assert_eq!(error.exit_code(), 2);
    assert_eq!(executor.invocations.len(), 1);
}

#[test]
fn test_dry_run_previews_without_executing() {
    let sql_dir = sql_dir_with(&["rbac.sql"]);
    let mut executor = RecordingExecutor::default();
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };

    let (result, output) = run(
        HIRC,
        "grant-rbac",
        &IndexMap::from([("table".to_string(), "ORDERS".to_string())]),
        &setup_settings(),
        sql_dir.path(),
        &options,
        &mut executor,
    );

    assert_eq!(result.unwrap(), Outcome::Previewed);
    assert!(executor.invocations.is_empty());

    let expected = format!(
        "Would run:\n  snow sql -c c1 -f {}\n    --variable admin_role=A\n    --variable database_name=D\n    --variable schema=PUBLIC\n    --variable table=ORDERS\n    --variable sa_role=S\n",
        sql_dir.path().join("rbac.sql").display()
    );
    assert_eq!(output, expected);
}

#[test]
fn test_missing_sql_file_is_reported() {
    let sql_dir = sql_dir_with(&[]);
    let mut executor = RecordingExecutor::default();

    let (result, _) = run(
        HIRC,
        "cleanup",
        &IndexMap::new(),
        &setup_settings(),
        sql_dir.path(),
        &RunOptions::default(),
        &mut executor,
    );

    let error = result.unwrap_err();
    assert!(matches!(&error, Error::SqlFileNotFound(path) if path.ends_with("cleanup.sql")));
    assert_eq!(error.exit_code(), 1);
    assert!(executor.invocations.is_empty());
}

#[test]
fn test_bad_sql_dir_fails_before_settings_are_read() {
    let workspace = TempDir::new().unwrap();
    let missing_env_file = workspace.path().join("missing.env");
    let options = RunOptions {
        sql_dir: Some(workspace.path().join("nope").display().to_string()),
        env_file: Some(missing_env_file.display().to_string()),
        ..RunOptions::default()
    };
    let catalog = Catalog::builtin(HIRC).unwrap();
    let mut executor = RecordingExecutor::default();

    let result = run_operation(
        catalog.find("setup").unwrap(),
        &IndexMap::new(),
        &options,
        &mut executor,
        &mut Vec::new(),
    );

    assert!(matches!(result, Err(Error::SqlDirNotFound(_))));
    assert!(executor.invocations.is_empty());
}

#[test]
fn test_run_operation_reads_env_file() {
    let workspace = TempDir::new().unwrap();
    let sql_dir = workspace.path().join("sql");
    fs::create_dir(&sql_dir).unwrap();
    fs::write(sql_dir.join("cleanup.sql"), "DROP DATABASE IF EXISTS <% database_name %>;").unwrap();

    let env_file = workspace.path().join(".env");
    fs::write(
        &env_file,
        "SNOWFLAKE_DEFAULT_CONNECTION_NAME=c9\nADMIN_ROLE=ACCOUNTADMIN\nDEMO_DATABASE=ICEBERG_DEMO\n",
    )
    .unwrap();

    let options = RunOptions {
        sql_dir: Some(sql_dir.display().to_string()),
        env_file: Some(env_file.display().to_string()),
        ..RunOptions::default()
    };
    let catalog = Catalog::builtin(HIRC).unwrap();
    let mut executor = RecordingExecutor::default();

    run_operation(
        catalog.find("cleanup").unwrap(),
        &IndexMap::new(),
        &options,
        &mut executor,
        &mut Vec::new(),
    )
    .unwrap();

    let invocation = &executor.invocations[0];
    assert_eq!(invocation.connection, "c9");
    assert_eq!(invocation.variables["database_name"], "ICEBERG_DEMO");
    assert_eq!(invocation.environment["ADMIN_ROLE"], "ACCOUNTADMIN");
}

#[test]
fn test_scc_roles_come_from_parameters() {
    let sql_dir = sql_dir_with(&["create_warehouse.sql"]);
    let mut executor = RecordingExecutor::default();
    let parameters = IndexMap::from([
        ("admin_role".to_string(), "ACCOUNTADMIN".to_string()),
        ("demo_role".to_string(), "CROWD_ROLE".to_string()),
        ("warehouse".to_string(), "CROWD_WH".to_string()),
    ]);

    let (result, _) = run(
        SCC,
        "create-warehouse",
        &parameters,
        &Settings::from_pairs([("SNOWFLAKE_DEFAULT_CONNECTION_NAME", "c1")]),
        sql_dir.path(),
        &RunOptions::default(),
        &mut executor,
    );

    result.unwrap();
    assert_eq!(
        executor.invocations[0].variables,
        IndexMap::from([
            ("admin_role".to_string(), "ACCOUNTADMIN".to_string()),
            ("demo_role".to_string(), "CROWD_ROLE".to_string()),
            ("warehouse".to_string(), "CROWD_WH".to_string()),
        ])
    );
}

#[test]
fn test_missing_required_flag_is_an_error() {
    let sql_dir = sql_dir_with(&["cleanup.sql"]);
    let mut executor = RecordingExecutor::default();

    let (result, _) = run(
        SCC,
        "cleanup",
        &IndexMap::new(),
        &Settings::from_pairs([
            ("SNOWFLAKE_DEFAULT_CONNECTION_NAME", "c1"),
            ("DEMO_DATABASE", "D"),
        ]),
        sql_dir.path(),
        &RunOptions::default(),
        &mut executor,
    );

    assert!(matches!(result, Err(Error::MissingParameter(_))));
    assert!(executor.invocations.is_empty());
}

#[test]
fn test_every_builtin_operation_resolves_its_sql_file() {
    let settings = Settings::from_pairs([
        ("SNOWFLAKE_DEFAULT_CONNECTION_NAME", "c1"),
        ("SNOWFLAKE_USER", "U"),
        ("SNOWFLAKE_WAREHOUSE", "W"),
        ("ADMIN_ROLE", "A"),
        ("DEMO_DATABASE", "D"),
        ("DEMO_SCHEMA", "S"),
        ("DEMO_STAGE", "ST"),
        ("AI_MODEL", "M"),
        ("SA_ROLE", "SA"),
        ("EXTERNAL_VOLUME_NAME", "V"),
    ]);
    let options = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };

    for catalog in Catalog::builtins().unwrap() {
        let files: Vec<&str> = catalog
            .operations
            .iter()
            .map(|operation| operation.sql_file.as_str())
            .collect();
        let sql_dir = sql_dir_with(&files);

        for operation in &catalog.operations {
            let parameters: IndexMap<String, String> = operation
                .parameters
                .iter()
                .map(|parameter| (parameter.id.clone(), "X".to_string()))
                .collect();
            let mut executor = RecordingExecutor::default();

            let (result, output) = run(
                &catalog.name,
                &operation.id,
                &parameters,
                &settings,
                sql_dir.path(),
                &options,
                &mut executor,
            );

            assert_eq!(result.unwrap(), Outcome::Previewed, "{}", operation.id);
            assert!(output.contains(&operation.sql_file));
        }
    }
}
