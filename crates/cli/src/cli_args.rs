//! Command-line argument parsing.
//!
//! This module defines the `snowrun` command-line interface with `clap` and
//! maps each built-in subcommand onto an operation id and its parameters.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use snowrun_core::catalog::{HIRC, SCC};
use snowrun_core::config::DEFAULT_EXECUTABLE;
use snowrun_core::error::Result;
use snowrun_core::runner::RunOptions;

use crate::arguments::{determine, Provider, Style};

/// Runs `snow sql` operations configured from a `.env` file.
///
/// # Examples
///
/// ```rust
/// use clap::Parser;
/// use snowrun_cli::cli_args::Args;
///
/// let args = Args::parse_from(["snowrun", "hirc", "setup", "--dry-run"]);
/// ```
#[derive(Parser, Debug)]
#[command(name = "snowrun", version, term_width = 0)]
pub struct Args {
    /// External SQL tool to run.
    #[arg(long, global = true, default_value = DEFAULT_EXECUTABLE)]
    pub executable: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Iceberg + DuckDB demo operations.
    Hirc {
        #[command(subcommand)]
        operation: HircOperation,
    },

    /// Smart Crowd Counter demo operations.
    Scc {
        #[command(subcommand)]
        operation: SccOperation,
    },

    /// Run an operation from a YAML operations file.
    Run(RunArgs),

    /// List the available operations.
    List {
        /// List a YAML operations file instead of the built-in catalogs.
        #[arg(long)]
        operations_file: Option<String>,
    },

    /// Crowd counter dashboard: upload images, refresh the stage and browse
    /// results.
    Dashboard(DashboardArgs),
}

/// Flags accepted by every operation.
#[derive(clap::Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonArgs {
    /// Print the command that would run without executing it.
    #[arg(long, short = 'd')]
    pub dry_run: bool,

    /// Path to the settings file. Defaults to `.env` in the current directory
    /// or a parent.
    #[arg(long)]
    pub env_file: Option<String>,

    /// Directory holding the SQL templates. Defaults to `./sql`, then `sql`
    /// next to the executable.
    #[arg(long)]
    pub sql_dir: Option<String>,
}

impl CommonArgs {
    #[must_use]
    pub fn run_options(&self, executable: &str) -> RunOptions {
        RunOptions {
            env_file: self.env_file.clone(),
            sql_dir: self.sql_dir.clone(),
            dry_run: self.dry_run,
            executable: executable.to_string(),
        }
    }
}

/// A subcommand bound to one operation of a built-in catalog.
pub trait BuiltinOperation {
    /// Name of the catalog the operation belongs to.
    fn catalog(&self) -> &'static str;

    fn operation_id(&self) -> &'static str;

    /// Flag values, keyed by parameter id. Flags left out use the
    /// operation's defaults.
    fn parameters(&self) -> IndexMap<String, String>;

    fn common(&self) -> &CommonArgs;
}

fn parameters<const N: usize>(pairs: [(&str, Option<&String>); N]) -> IndexMap<String, String> {
    pairs
        .into_iter()
        .filter_map(|(id, value)| value.map(|value| (id.to_string(), value.clone())))
        .collect()
}

#[derive(Subcommand, Debug)]
pub enum HircOperation {
    /// Create demo database with USAGE grants and set external volume.
    Setup(CommonArgs),

    /// Create Iceberg table and load sample data.
    LoadData(CommonArgs),

    /// Grant SELECT on Iceberg table to SA_ROLE.
    GrantRbac {
        /// Schema name [default: PUBLIC]
        #[arg(long)]
        schema: Option<String>,

        /// Table name [default: FRUITS]
        #[arg(long)]
        table: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Drop demo database and all its tables.
    Cleanup(CommonArgs),
}

impl BuiltinOperation for HircOperation {
    fn catalog(&self) -> &'static str {
        HIRC
    }

    fn operation_id(&self) -> &'static str {
        match self {
            Self::Setup(_) => "setup",
            Self::LoadData(_) => "load-data",
            Self::GrantRbac { .. } => "grant-rbac",
            Self::Cleanup(_) => "cleanup",
        }
    }

    fn parameters(&self) -> IndexMap<String, String> {
        match self {
            Self::GrantRbac { schema, table, .. } => {
                parameters([("schema", schema.as_ref()), ("table", table.as_ref())])
            }
            Self::Setup(_) | Self::LoadData(_) | Self::Cleanup(_) => IndexMap::new(),
        }
    }

    fn common(&self) -> &CommonArgs {
        match self {
            Self::Setup(common)
            | Self::LoadData(common)
            | Self::Cleanup(common)
            | Self::GrantRbac { common, .. } => common,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SccOperation {
    /// Create demo role, database, and grant privileges.
    CreateRole {
        /// Admin role
        #[arg(long)]
        admin_role: String,

        /// Demo role to create
        #[arg(long)]
        demo_role: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Create demo schema, stage, and AI-powered view.
    Setup {
        /// Demo role that owns the database
        #[arg(long)]
        demo_role: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Create a warehouse and grant access to the demo role.
    CreateWarehouse {
        /// Admin role
        #[arg(long)]
        admin_role: String,

        /// Demo role to grant warehouse access
        #[arg(long)]
        demo_role: String,

        /// Warehouse name to create
        #[arg(long)]
        warehouse: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Drop demo database and all its objects.
    Cleanup {
        /// Demo role that owns the database
        #[arg(long)]
        demo_role: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Revoke and drop the demo role.
    CleanupRole {
        /// Admin role
        #[arg(long)]
        admin_role: String,

        /// Demo role to drop
        #[arg(long)]
        demo_role: String,

        #[command(flatten)]
        common: CommonArgs,
    },
}

impl BuiltinOperation for SccOperation {
    fn catalog(&self) -> &'static str {
        SCC
    }

    fn operation_id(&self) -> &'static str {
        match self {
            Self::CreateRole { .. } => "create-role",
            Self::Setup { .. } => "setup",
            Self::CreateWarehouse { .. } => "create-warehouse",
            Self::Cleanup { .. } => "cleanup",
            Self::CleanupRole { .. } => "cleanup-role",
        }
    }

    fn parameters(&self) -> IndexMap<String, String> {
        match self {
            Self::CreateRole {
                admin_role,
                demo_role,
                ..
            }
            | Self::CleanupRole {
                admin_role,
                demo_role,
                ..
            } => parameters([("admin_role", Some(admin_role)), ("demo_role", Some(demo_role))]),
            Self::Setup { demo_role, .. } | Self::Cleanup { demo_role, .. } => {
                parameters([("demo_role", Some(demo_role))])
            }
            Self::CreateWarehouse {
                admin_role,
                demo_role,
                warehouse,
                ..
            } => parameters([
                ("admin_role", Some(admin_role)),
                ("demo_role", Some(demo_role)),
                ("warehouse", Some(warehouse)),
            ]),
        }
    }

    fn common(&self) -> &CommonArgs {
        match self {
            Self::CreateRole { common, .. }
            | Self::Setup { common, .. }
            | Self::CreateWarehouse { common, .. }
            | Self::Cleanup { common, .. }
            | Self::CleanupRole { common, .. } => common,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// ID of the operation to run.
    pub operation_id: String,

    /// YAML file declaring the operation.
    #[arg(long)]
    pub operations_file: String,

    /// Named parameters in the format key=value.
    ///
    /// Multiple parameters can be provided with repeated `-p` flags.
    /// Cannot be mixed with positional values.
    #[arg(long = "param", short = 'p', action = clap::ArgAction::Append)]
    pub parameters: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Parameter values in declaration order.
    ///
    /// Cannot be mixed with named parameters.
    #[arg(trailing_var_arg = true)]
    pub positional_arguments: Vec<String>,
}

impl Provider for RunArgs {
    fn get_style(&self) -> Result<Style> {
        determine(&self.parameters, &self.positional_arguments)
    }
}

#[derive(clap::Args, Debug)]
pub struct DashboardArgs {
    /// Path to the settings file.
    #[arg(long, global = true)]
    pub env_file: Option<String>,

    /// Stage holding the uploaded images [default: DEMO_STAGE setting, else SNAPS]
    #[arg(long, global = true)]
    pub stage: Option<String>,

    /// Seconds to wait after a stage refresh before reloading the view.
    #[arg(long, global = true, default_value_t = 2)]
    pub settle_secs: u64,

    #[command(subcommand)]
    pub action: DashboardAction,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    /// Show the stage location and the analysed images.
    Status,

    /// Upload images to the stage, then refresh it.
    ///
    /// Each invocation is a new session: only a file name given more than
    /// once on the same command line is skipped.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Refresh the stage and reload the view.
    Refresh,

    /// Show the image link and analytics for one row.
    Show {
        /// Zero-based row index, as listed by `status`.
        row: usize,
    },
}
